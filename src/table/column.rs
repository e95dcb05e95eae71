//! Columnar storage for relations.
//!
//! Values of one column live in a single contiguous vector; `None` is SQL
//! NULL.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Float,
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::Float => write!(f, "float"),
            DataType::Text => write!(f, "text"),
        }
    }
}

/// A single scalar cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => write!(f, "NULL"),
        }
    }
}

/// A single typed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum Column {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn data_type(&self) -> DataType {
        match self {
            Column::Int(_) => DataType::Int,
            Column::Float(_) => DataType::Float,
            Column::Text(_) => DataType::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Value {
        match self {
            Column::Int(v) => v.get(idx).and_then(|&o| o).map(Value::Int).unwrap_or(Value::Null),
            Column::Float(v) => v.get(idx).and_then(|&o| o).map(Value::Float).unwrap_or(Value::Null),
            Column::Text(v) => v
                .get(idx)
                .and_then(|o| o.as_ref())
                .map(|s| Value::Text(s.clone()))
                .unwrap_or(Value::Null),
        }
    }

    pub fn as_ints(&self) -> Option<&[Option<i64>]> {
        match self {
            Column::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric view of an int or float column
    pub fn to_floats(&self) -> Option<Vec<Option<f64>>> {
        match self {
            Column::Int(v) => Some(v.iter().map(|o| o.map(|i| i as f64)).collect()),
            Column::Float(v) => Some(v.clone()),
            Column::Text(_) => None,
        }
    }
}

impl From<Vec<i64>> for Column {
    fn from(values: Vec<i64>) -> Self {
        Column::Int(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Float(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Column::Text(values.into_iter().map(|s| Some(s.to_string())).collect())
    }
}
