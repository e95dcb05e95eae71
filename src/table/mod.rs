//! Named, typed relations and the catalog that holds them

pub mod catalog;
pub mod column;

pub use catalog::Catalog;
pub use column::{Column, DataType, Value};

use crate::error::{AnalyticsError, AnalyticsResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A relation: ordered, named columns of equal length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: IndexMap<String, Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Table::add_column`]
    pub fn with_column(mut self, name: impl Into<String>, column: impl Into<Column>) -> AnalyticsResult<Self> {
        self.add_column(name, column)?;
        Ok(self)
    }

    /// Append a column; names must be unique and lengths must match
    pub fn add_column(&mut self, name: impl Into<String>, column: impl Into<Column>) -> AnalyticsResult<()> {
        let name = name.into();
        let column = column.into();

        if self.columns.contains_key(&name) {
            return Err(AnalyticsError::Validation(format!("duplicate column {}", name)));
        }
        if !self.columns.is_empty() && column.len() != self.num_rows() {
            return Err(AnalyticsError::Validation(format!(
                "column {} has {} rows, expected {}",
                name,
                column.len(),
                self.num_rows()
            )));
        }

        self.columns.insert(name, column);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.columns.values().next().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn column_at(&self, idx: usize) -> Option<(&str, &Column)> {
        self.columns.get_index(idx).map(|(name, col)| (name.as_str(), col))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }

    /// All cells of one row, in column order
    pub fn row(&self, idx: usize) -> Vec<Value> {
        self.columns.values().map(|col| col.get(idx)).collect()
    }

    /// Check that all columns have the same length
    pub fn validate(&self) -> AnalyticsResult<()> {
        let rows = self.num_rows();
        match self.columns.iter().find(|(_, col)| col.len() != rows) {
            Some((name, col)) => Err(AnalyticsError::Validation(format!(
                "column {} has {} rows, expected {}",
                name,
                col.len(),
                rows
            ))),
            None => Ok(()),
        }
    }
}
