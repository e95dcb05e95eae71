//! Relgraph
//!
//! Global graph analytics (single-source shortest paths and PageRank) over
//! vertex and edge relations, computed entirely with bulk relational passes:
//! filters, hash joins and grouped aggregations over partitioned collections.
//!
//! # Layout
//!
//! - [`table`]: typed columnar relations and the [`Catalog`] that names them
//! - [`graph`]: resolution of caller table/column names into engine input
//! - [`algo`]: `run_sssp`, `get_path` and `run_pagerank` against a catalog
//! - [`config`]: partitioning and worker-pool settings
//!
//! The engines themselves live in the `relgraph-algorithms` crate.
//!
//! ## Example Usage
//!
//! ```rust
//! use relgraph::{Catalog, GraphAnalytics, GraphDescription, Table};
//!
//! let catalog = Catalog::new();
//! catalog
//!     .create_table("vertex", Table::new().with_column("id", vec![0i64, 1, 2]).unwrap())
//!     .unwrap();
//! catalog
//!     .create_table(
//!         "edge",
//!         Table::new()
//!             .with_column("src", vec![0i64, 1])
//!             .unwrap()
//!             .with_column("dest", vec![1i64, 2])
//!             .unwrap()
//!             .with_column("weight", vec![2.0, 3.0])
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let graph = GraphDescription::new("vertex", "id", "edge", "").unwrap();
//! let analytics = GraphAnalytics::new(&catalog);
//! analytics.run_sssp_into(&graph, 0, "out").unwrap();
//!
//! let path = analytics.get_path("out", 2).unwrap();
//! assert_eq!(path.path, vec![0, 1, 2]);
//! assert_eq!(path.cost, 5.0);
//! ```

#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod error;
pub mod graph;
pub mod table;

pub use algo::{
    summary_table_name, ConvergencePolicy, GraphAnalytics, Materialize, PageRankConfig, PageRankOutput, PathResult,
    SsspOutput, VertexId,
};
pub use config::EngineConfig;
pub use error::{AnalyticsError, AnalyticsResult};
pub use graph::{EdgeColumns, EdgeWeights, GraphDescription, DEFAULT_VERTEX_ID};
pub use table::{Catalog, Column, DataType, Table, Value};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}
