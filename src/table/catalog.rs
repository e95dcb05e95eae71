//! In-memory catalog of named tables
//!
//! Tables are immutable once registered. Results are published all at once:
//! either every table of a run becomes visible or none does.

use super::Table;
use crate::error::{AnalyticsError, AnalyticsResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct Catalog {
    tables: RwLock<IndexMap<String, Arc<Table>>>,
}

#[derive(Serialize)]
struct CatalogDumpRef<'a> {
    tables: IndexMap<&'a str, &'a Table>,
}

#[derive(Deserialize)]
struct CatalogDump {
    tables: IndexMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new table under `name`
    pub fn create_table(&self, name: &str, table: Table) -> AnalyticsResult<()> {
        self.publish(vec![(name.to_string(), table)])
    }

    /// Register several tables atomically.
    ///
    /// Fails without registering anything if any name is taken or repeated.
    pub fn publish(&self, tables: Vec<(String, Table)>) -> AnalyticsResult<()> {
        for (_, table) in &tables {
            table.validate()?;
        }

        let mut guard = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        for (idx, (name, _)) in tables.iter().enumerate() {
            let repeated = tables[..idx].iter().any(|(other, _)| other == name);
            if repeated || guard.contains_key(name) {
                return Err(AnalyticsError::TableExists(name.clone()));
            }
        }

        for (name, table) in tables {
            debug!(table = %name, rows = table.num_rows(), "registered table");
            guard.insert(name, Arc::new(table));
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> AnalyticsResult<Arc<Table>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| AnalyticsError::TableNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn drop_table(&self, name: &str) -> AnalyticsResult<Arc<Table>> {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(name)
            .ok_or_else(|| AnalyticsError::TableNotFound(name.to_string()))
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn from_json(json: &str) -> AnalyticsResult<Self> {
        let dump: CatalogDump = serde_json::from_str(json)?;
        let catalog = Catalog::new();
        catalog.publish(dump.tables.into_iter().collect())?;
        Ok(catalog)
    }

    pub fn to_json(&self) -> AnalyticsResult<String> {
        let guard = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let dump = CatalogDumpRef {
            tables: guard.iter().map(|(name, table)| (name.as_str(), table.as_ref())).collect(),
        };
        Ok(serde_json::to_string_pretty(&dump)?)
    }

    /// Load a catalog dump from a JSON file
    pub fn load(path: impl AsRef<Path>) -> AnalyticsResult<Self> {
        let path = path.as_ref();
        info!("Loading catalog from {:?}", path);
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> AnalyticsResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        info!("Saved catalog to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: Vec<i64>) -> Table {
        Table::new().with_column("id", values).unwrap()
    }

    #[test]
    fn test_create_get_drop() {
        let catalog = Catalog::new();
        catalog.create_table("v", ids(vec![1, 2])).unwrap();

        assert!(catalog.contains("v"));
        assert_eq!(catalog.get("v").unwrap().num_rows(), 2);
        assert!(matches!(
            catalog.create_table("v", ids(vec![3])),
            Err(AnalyticsError::TableExists(_))
        ));

        catalog.drop_table("v").unwrap();
        assert!(matches!(catalog.get("v"), Err(AnalyticsError::TableNotFound(_))));
    }

    #[test]
    fn test_publish_is_all_or_nothing() {
        let catalog = Catalog::new();
        catalog.create_table("taken", ids(vec![1])).unwrap();

        let result = catalog.publish(vec![
            ("fresh".to_string(), ids(vec![1])),
            ("taken".to_string(), ids(vec![2])),
        ]);
        assert!(result.is_err());
        assert!(!catalog.contains("fresh"));

        let repeated = catalog.publish(vec![
            ("a".to_string(), ids(vec![1])),
            ("a".to_string(), ids(vec![2])),
        ]);
        assert!(repeated.is_err());
        assert!(!catalog.contains("a"));
    }

    #[test]
    fn test_json_round_trip_keeps_nulls() {
        let catalog = Catalog::new();
        let table = Table::new()
            .with_column("id", vec![1i64, 2])
            .unwrap()
            .with_column("w", crate::table::Column::Float(vec![Some(1.5), None]))
            .unwrap();
        catalog.create_table("t", table.clone()).unwrap();

        let restored = Catalog::from_json(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(*restored.get("t").unwrap(), table);
        assert_eq!(restored.table_names(), vec!["t".to_string()]);
    }
}
