//! Graph description: caller-supplied table and column names, resolved once
//!
//! The engines never see names. A [`GraphDescription`] is parsed up front,
//! checked against the catalog, and turned into a partitioned
//! [`GraphInput`] before the first pass runs.

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::table::{Catalog, Column, DataType, Table};
use relgraph_algorithms::{Edge, GraphInput, VertexId};
use std::str::FromStr;
use tracing::debug;

/// Default name of the vertex id column
pub const DEFAULT_VERTEX_ID: &str = "id";

/// Edge column names, parsed from a `src=a, dest=b, weight=w` argument string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeColumns {
    pub src: String,
    pub dest: String,
    pub weight: String,
}

impl Default for EdgeColumns {
    fn default() -> Self {
        Self {
            src: "src".to_string(),
            dest: "dest".to_string(),
            weight: "weight".to_string(),
        }
    }
}

impl FromStr for EdgeColumns {
    type Err = AnalyticsError;

    /// Unspecified keys keep their defaults; unknown or repeated keys are rejected
    fn from_str(args: &str) -> AnalyticsResult<Self> {
        let mut columns = Self::default();
        let mut seen: Vec<&str> = Vec::new();

        for item in args.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let (key, value) = item.split_once('=').ok_or_else(|| {
                AnalyticsError::Validation(format!("malformed edge argument '{}', expected key=value", item))
            })?;
            let (key, value) = (key.trim(), value.trim());

            if value.is_empty() {
                return Err(AnalyticsError::Validation(format!("edge argument '{}' has no column name", key)));
            }
            if seen.contains(&key) {
                return Err(AnalyticsError::Validation(format!("edge argument '{}' given twice", key)));
            }

            match key {
                "src" => columns.src = value.to_string(),
                "dest" => columns.dest = value.to_string(),
                "weight" => columns.weight = value.to_string(),
                other => {
                    return Err(AnalyticsError::Validation(format!(
                        "unknown edge argument '{}' (expected src, dest or weight)",
                        other
                    )))
                }
            }
            seen.push(key);
        }

        Ok(columns)
    }
}

/// Whether an engine reads the edge weight column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWeights {
    Required,
    /// Every edge weighs 1.0; the weight column need not exist
    Ignored,
}

/// Canonical description of the vertex and edge relations of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphDescription {
    pub vertex_table: String,
    pub vertex_id: String,
    pub edge_table: String,
    pub edge_columns: EdgeColumns,
}

impl GraphDescription {
    /// Parse caller arguments. An empty `vertex_id` means [`DEFAULT_VERTEX_ID`].
    pub fn new(vertex_table: &str, vertex_id: &str, edge_table: &str, edge_args: &str) -> AnalyticsResult<Self> {
        for (what, name) in [("vertex table", vertex_table), ("edge table", edge_table)] {
            if name.trim().is_empty() {
                return Err(AnalyticsError::Validation(format!("{} name must not be empty", what)));
            }
        }

        let vertex_id = match vertex_id.trim() {
            "" => DEFAULT_VERTEX_ID,
            name => name,
        };

        Ok(Self {
            vertex_table: vertex_table.trim().to_string(),
            vertex_id: vertex_id.to_string(),
            edge_table: edge_table.trim().to_string(),
            edge_columns: edge_args.parse()?,
        })
    }

    /// Look up both relations and build the partitioned graph input
    pub fn resolve(&self, catalog: &Catalog, weights: EdgeWeights, partitions: usize) -> AnalyticsResult<GraphInput> {
        let vertex_table = catalog.get(&self.vertex_table)?;
        let edge_table = catalog.get(&self.edge_table)?;

        let vertices = int_values(&vertex_table, &self.vertex_table, &self.vertex_id)?;
        let src = int_values(&edge_table, &self.edge_table, &self.edge_columns.src)?;
        let dest = int_values(&edge_table, &self.edge_table, &self.edge_columns.dest)?;
        let weight = match weights {
            EdgeWeights::Required => float_values(&edge_table, &self.edge_table, &self.edge_columns.weight)?,
            EdgeWeights::Ignored => vec![1.0; src.len()],
        };

        let edges: Vec<Edge> = src
            .into_iter()
            .zip(dest)
            .zip(weight)
            .map(|((s, d), w)| Edge::new(s, d, w))
            .collect();

        debug!(
            vertex_table = %self.vertex_table,
            edge_table = %self.edge_table,
            vertices = vertices.len(),
            edges = edges.len(),
            "resolved graph description"
        );
        Ok(GraphInput::new(vertices, edges, partitions)?)
    }
}

fn require_column<'a>(table: &'a Table, table_name: &str, column: &str) -> AnalyticsResult<&'a Column> {
    table.column(column).ok_or_else(|| AnalyticsError::ColumnNotFound {
        table: table_name.to_string(),
        column: column.to_string(),
    })
}

fn no_nulls<T: Copy>(values: &[Option<T>], table_name: &str, column: &str) -> AnalyticsResult<Vec<T>> {
    values
        .iter()
        .map(|value| {
            value.ok_or_else(|| {
                AnalyticsError::Validation(format!("column {} of table {} contains NULL", column, table_name))
            })
        })
        .collect()
}

fn int_values(table: &Table, table_name: &str, column: &str) -> AnalyticsResult<Vec<VertexId>> {
    let values = require_column(table, table_name, column)?
        .as_ints()
        .ok_or_else(|| AnalyticsError::ColumnType {
            table: table_name.to_string(),
            column: column.to_string(),
            expected: DataType::Int,
        })?;
    no_nulls(values, table_name, column)
}

fn float_values(table: &Table, table_name: &str, column: &str) -> AnalyticsResult<Vec<f64>> {
    let values = require_column(table, table_name, column)?
        .to_floats()
        .ok_or_else(|| AnalyticsError::ColumnType {
            table: table_name.to_string(),
            column: column.to_string(),
            expected: DataType::Float,
        })?;
    no_nulls(&values, table_name, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_args_defaults_and_overrides() {
        assert_eq!("".parse::<EdgeColumns>().unwrap(), EdgeColumns::default());

        let cols: EdgeColumns = " src = from_id,weight=cost ".parse().unwrap();
        assert_eq!(cols.src, "from_id");
        assert_eq!(cols.dest, "dest");
        assert_eq!(cols.weight, "cost");
    }

    #[test]
    fn test_edge_args_rejects_bad_input() {
        for bad in ["source=a", "src", "src=", "src=a,src=b"] {
            assert!(
                matches!(bad.parse::<EdgeColumns>(), Err(AnalyticsError::Validation(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_empty_vertex_id_uses_default() {
        let graph = GraphDescription::new("v", "", "e", "").unwrap();
        assert_eq!(graph.vertex_id, DEFAULT_VERTEX_ID);
        assert!(GraphDescription::new(" ", "id", "e", "").is_err());
    }

    #[test]
    fn test_resolve_checks_columns() {
        let catalog = Catalog::new();
        catalog
            .create_table("v", Table::new().with_column("id", vec![1i64, 2]).unwrap())
            .unwrap();
        catalog
            .create_table(
                "e",
                Table::new()
                    .with_column("src", vec![1i64])
                    .unwrap()
                    .with_column("dest", vec![2i64])
                    .unwrap()
                    .with_column("label", vec!["x"])
                    .unwrap(),
            )
            .unwrap();

        let weighted = GraphDescription::new("v", "id", "e", "").unwrap();
        assert!(matches!(
            weighted.resolve(&catalog, EdgeWeights::Required, 2),
            Err(AnalyticsError::ColumnNotFound { .. })
        ));
        let input = weighted.resolve(&catalog, EdgeWeights::Ignored, 2).unwrap();
        assert_eq!(input.edge_count(), 1);

        let text_weight = GraphDescription::new("v", "id", "e", "weight=label").unwrap();
        assert!(matches!(
            text_weight.resolve(&catalog, EdgeWeights::Required, 2),
            Err(AnalyticsError::ColumnType { .. })
        ));

        let missing = GraphDescription::new("nope", "id", "e", "").unwrap();
        assert!(matches!(
            missing.resolve(&catalog, EdgeWeights::Ignored, 2),
            Err(AnalyticsError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_null_ids() {
        let catalog = Catalog::new();
        catalog
            .create_table("v", Table::new().with_column("id", Column::Int(vec![Some(1), None])).unwrap())
            .unwrap();
        catalog
            .create_table(
                "e",
                Table::new()
                    .with_column("src", Vec::<i64>::new())
                    .unwrap()
                    .with_column("dest", Vec::<i64>::new())
                    .unwrap(),
            )
            .unwrap();

        let graph = GraphDescription::new("v", "id", "e", "").unwrap();
        assert!(matches!(
            graph.resolve(&catalog, EdgeWeights::Ignored, 2),
            Err(AnalyticsError::Validation(_))
        ));
    }
}
