//! Single-source shortest paths over catalog relations
//!
//! Result relation columns: (`<vertex id>`, `<weight column>`, `parent`),
//! ordered by vertex id. Unreachable vertices carry NULL distance and NULL
//! parent.

use super::{check_result_columns, GraphAnalytics, Materialize};
use crate::error::AnalyticsResult;
use crate::graph::{EdgeWeights, GraphDescription};
use crate::table::{Column, Table};
use relgraph_algorithms::{bellman_ford, DistanceTable, VertexId};
use tracing::info;

/// Name of the parent column in SSSP results
pub const PARENT_COLUMN: &str = "parent";

/// SSSP result relation and run summary
#[derive(Debug, Clone, PartialEq)]
pub struct SsspOutput {
    pub result: Table,
    pub summary: Table,
    pub passes: usize,
}

impl Materialize for SsspOutput {
    fn into_tables(self) -> (Table, Table) {
        (self.result, self.summary)
    }
}

impl GraphAnalytics<'_> {
    /// Shortest paths from `source` to every vertex.
    ///
    /// Fails with a negative-cycle error if one is reachable from `source`;
    /// nothing is produced in that case.
    pub fn run_sssp(&self, graph: &GraphDescription, source: VertexId) -> AnalyticsResult<SsspOutput> {
        self.config.validate()?;
        check_result_columns(&[
            ("vertex id", graph.vertex_id.as_str()),
            ("distance", graph.edge_columns.weight.as_str()),
            ("parent", PARENT_COLUMN),
        ])?;
        let input = graph.resolve(self.catalog, EdgeWeights::Required, self.config.partitions)?;

        info!(
            vertex_table = %graph.vertex_table,
            edge_table = %graph.edge_table,
            source,
            "running single-source shortest paths"
        );
        let distances = self.config.install(|| bellman_ford(&input, source))??;

        Ok(SsspOutput {
            result: distance_relation(graph, &distances)?,
            summary: Table::new()
                .with_column("vertex_table", vec![graph.vertex_table.as_str()])?
                .with_column("edge_table", vec![graph.edge_table.as_str()])?
                .with_column("source_vertex", vec![source])?
                .with_column("passes", vec![distances.passes() as i64])?,
            passes: distances.passes(),
        })
    }

    /// Run SSSP and materialize it as `out_table` and `<out_table>_summary`
    pub fn run_sssp_into(
        &self,
        graph: &GraphDescription,
        source: VertexId,
        out_table: &str,
    ) -> AnalyticsResult<SsspOutput> {
        self.check_output(out_table)?;
        let output = self.run_sssp(graph, source)?;
        self.materialize(out_table, output.clone())?;
        Ok(output)
    }
}

fn distance_relation(graph: &GraphDescription, distances: &DistanceTable) -> AnalyticsResult<Table> {
    let rows = distances.rows();
    Table::new()
        .with_column(graph.vertex_id.as_str(), rows.iter().map(|row| row.vertex).collect::<Vec<_>>())?
        .with_column(
            graph.edge_columns.weight.as_str(),
            Column::Float(rows.iter().map(|row| row.is_reachable().then_some(row.distance)).collect()),
        )?
        .with_column(PARENT_COLUMN, Column::Int(rows.iter().map(|row| row.parent).collect()))
}
