//! Graph analytics over catalog relations
//!
//! The algorithms themselves live in the `relgraph-algorithms` crate. This
//! module resolves relation names, runs an engine on the configured worker
//! pool, and turns its output into result and summary relations.

pub mod pagerank;
pub mod pathfinding;
pub mod sssp;

use crate::config::EngineConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::table::{Catalog, Table};

pub use pagerank::PageRankOutput;
pub use sssp::SsspOutput;

// Re-export engine types callers configure or inspect
pub use relgraph_algorithms::{
    ConvergencePolicy, DistanceRow, DistanceTable, PageRankConfig, PathResult, RankTable, VertexId,
};

/// Name of the summary relation written next to `out_table`
pub fn summary_table_name(out_table: &str) -> String {
    format!("{}_summary", out_table)
}

/// Reject result layouts whose column names collide, e.g. a weight column
/// named like the `parent` column SSSP adds.
pub(crate) fn check_result_columns(columns: &[(&str, &str)]) -> AnalyticsResult<()> {
    for (idx, (role, name)) in columns.iter().enumerate() {
        if let Some((other, _)) = columns[..idx].iter().find(|(_, prev)| prev == name) {
            return Err(AnalyticsError::Validation(format!(
                "result column '{}' is used for both the {} and the {}; rename one of them",
                name, other, role
            )));
        }
    }
    Ok(())
}

/// Output of a run that can be persisted as a result relation plus summary
pub trait Materialize {
    fn into_tables(self) -> (Table, Table);
}

/// Runs analytics against the relations of one catalog
pub struct GraphAnalytics<'a> {
    catalog: &'a Catalog,
    config: EngineConfig,
}

impl<'a> GraphAnalytics<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    pub fn with_config(catalog: &'a Catalog, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    /// Fail early if the output or its summary name is taken
    pub fn check_output(&self, out_table: &str) -> AnalyticsResult<()> {
        if out_table.trim().is_empty() {
            return Err(AnalyticsError::Validation("output table name must not be empty".to_string()));
        }
        for name in [out_table.to_string(), summary_table_name(out_table)] {
            if self.catalog.contains(&name) {
                return Err(AnalyticsError::TableExists(name));
            }
        }
        Ok(())
    }

    /// Publish a run's result and summary relations atomically
    pub fn materialize<M: Materialize>(&self, out_table: &str, output: M) -> AnalyticsResult<()> {
        let (result, summary) = output.into_tables();
        self.catalog.publish(vec![
            (out_table.to_string(), result),
            (summary_table_name(out_table), summary),
        ])
    }
}
