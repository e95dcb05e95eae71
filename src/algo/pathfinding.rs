//! Path lookups against materialized SSSP results

use super::GraphAnalytics;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::table::{Column, DataType, Table};
use relgraph_algorithms::{reconstruct_path, DistanceRow, DistanceTable, PathResult, VertexId};

impl GraphAnalytics<'_> {
    /// Minimum-weight path from the source of `result_table` to `destination`.
    ///
    /// The path is empty when `destination` is unreachable.
    pub fn get_path(&self, result_table: &str, destination: VertexId) -> AnalyticsResult<PathResult> {
        let table = self.catalog.get(result_table)?;
        let distances = distance_table(result_table, &table)?;
        Ok(reconstruct_path(&distances, destination)?)
    }
}

/// Read an SSSP result relation back into a distance table.
///
/// Columns are taken by position: vertex id, distance, parent. The source is
/// the row that is its own parent.
pub fn distance_table(table_name: &str, table: &Table) -> AnalyticsResult<DistanceTable> {
    let ids = positional(table_name, table, 0, DataType::Int)?.as_ints().unwrap_or_default();
    let distances = positional(table_name, table, 1, DataType::Float)?.as_floats().unwrap_or_default();
    let parents = positional(table_name, table, 2, DataType::Int)?.as_ints().unwrap_or_default();

    let mut rows = Vec::with_capacity(ids.len());
    let mut source = None;
    for ((id, distance), parent) in ids.iter().zip(distances).zip(parents) {
        let vertex = id.ok_or_else(|| {
            AnalyticsError::Validation(format!("{} contains a NULL vertex id", table_name))
        })?;
        if *parent == Some(vertex) {
            source = Some(vertex);
        }
        rows.push(DistanceRow {
            vertex,
            distance: distance.unwrap_or(f64::INFINITY),
            parent: *parent,
        });
    }

    let source = source.ok_or_else(|| {
        AnalyticsError::Validation(format!("{} has no source row", table_name))
    })?;
    Ok(DistanceTable::from_rows(source, rows, 0))
}

fn positional<'a>(table_name: &str, table: &'a Table, idx: usize, expected: DataType) -> AnalyticsResult<&'a Column> {
    match table.column_at(idx) {
        Some((_, col)) if col.data_type() == expected => Ok(col),
        Some((name, _)) => Err(AnalyticsError::ColumnType {
            table: table_name.to_string(),
            column: name.to_string(),
            expected,
        }),
        None => Err(AnalyticsError::Validation(format!(
            "{} is not a shortest-path result: missing column {}",
            table_name, idx
        ))),
    }
}
