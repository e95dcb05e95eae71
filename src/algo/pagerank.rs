//! PageRank over catalog relations
//!
//! Result relation columns: (`<vertex id>`, `pagerank`), ordered by vertex id.

use super::{check_result_columns, GraphAnalytics, Materialize};
use crate::error::AnalyticsResult;
use crate::graph::{EdgeWeights, GraphDescription};
use crate::table::Table;
use relgraph_algorithms::{page_rank, PageRankConfig};
use tracing::info;

/// Name of the rank column in PageRank results
pub const RANK_COLUMN: &str = "pagerank";

/// PageRank result relation and run summary
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankOutput {
    pub result: Table,
    pub summary: Table,
    pub iterations: usize,
    pub converged: bool,
    pub last_delta: f64,
}

impl Materialize for PageRankOutput {
    fn into_tables(self) -> (Table, Table) {
        (self.result, self.summary)
    }
}

impl GraphAnalytics<'_> {
    /// PageRank of every vertex. Edge weights are ignored.
    pub fn run_pagerank(&self, graph: &GraphDescription, config: &PageRankConfig) -> AnalyticsResult<PageRankOutput> {
        self.config.validate()?;
        config.validate()?;
        check_result_columns(&[("vertex id", graph.vertex_id.as_str()), ("rank", RANK_COLUMN)])?;
        let input = graph.resolve(self.catalog, EdgeWeights::Ignored, self.config.partitions)?;

        info!(
            vertex_table = %graph.vertex_table,
            edge_table = %graph.edge_table,
            damping = config.damping_factor,
            max_iter = config.iterations,
            "running page rank"
        );
        let ranks = self.config.install(|| page_rank(&input, config))??;

        let rows = ranks.rows();
        let result = Table::new()
            .with_column(graph.vertex_id.as_str(), rows.iter().map(|row| row.vertex).collect::<Vec<_>>())?
            .with_column(RANK_COLUMN, rows.iter().map(|row| row.rank).collect::<Vec<_>>())?;

        let summary = Table::new()
            .with_column("vertex_table", vec![graph.vertex_table.as_str()])?
            .with_column("edge_table", vec![graph.edge_table.as_str()])?
            .with_column("iterations", vec![ranks.iterations() as i64])?
            .with_column("converged", vec![i64::from(ranks.converged())])?
            .with_column("last_delta", vec![ranks.last_delta()])?;

        Ok(PageRankOutput {
            result,
            summary,
            iterations: ranks.iterations(),
            converged: ranks.converged(),
            last_delta: ranks.last_delta(),
        })
    }

    /// Run PageRank and materialize it as `out_table` and `<out_table>_summary`
    pub fn run_pagerank_into(
        &self,
        graph: &GraphDescription,
        config: &PageRankConfig,
        out_table: &str,
    ) -> AnalyticsResult<PageRankOutput> {
        self.check_output(out_table)?;
        let output = self.run_pagerank(graph, config)?;
        self.materialize(out_table, output.clone())?;
        Ok(output)
    }
}
