//! Engine configuration

use crate::error::{AnalyticsError, AnalyticsResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Execution settings shared by every run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Number of hash partitions each collection is split into
    pub partitions: usize,
    /// Worker threads for a run (None = global rayon pool)
    pub threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            partitions: 8,
            threads: None,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> AnalyticsResult<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| AnalyticsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> AnalyticsResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.partitions == 0 {
            return Err(AnalyticsError::Config("partitions must be positive".to_string()));
        }
        if self.threads == Some(0) {
            return Err(AnalyticsError::Config("threads must be positive".to_string()));
        }
        Ok(())
    }

    /// Run `op` on the configured worker pool
    pub fn install<R, F>(&self, op: F) -> AnalyticsResult<R>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self.threads {
            None => Ok(op()),
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|idx| format!("relgraph-worker-{}", idx))
                    .build()
                    .map_err(|e| AnalyticsError::ThreadPool(e.to_string()))?;
                Ok(pool.install(op))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_overrides_defaults() {
        let config = EngineConfig::from_yaml_str("partitions: 3\n").unwrap();
        assert_eq!(config.partitions, 3);
        assert_eq!(config.threads, None);

        let config = EngineConfig::from_yaml_str("threads: 2").unwrap();
        assert_eq!(config.partitions, 8);
        assert_eq!(config.threads, Some(2));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(EngineConfig::from_yaml_str("partitions: 0").is_err());
        assert!(EngineConfig::from_yaml_str("threads: 0").is_err());
        assert!(EngineConfig::from_yaml_str("workers: 4").is_err());
    }

    #[test]
    fn test_install_runs_on_dedicated_pool() {
        let config = EngineConfig {
            threads: Some(2),
            ..EngineConfig::default()
        };
        let threads = config.install(rayon::current_num_threads).unwrap();
        assert_eq!(threads, 2);
    }
}
