//! Set-oriented graph algorithms
//!
//! Every algorithm here is expressed as repeated whole-collection passes
//! (filters, hash joins, grouped aggregations) over partitioned datasets,
//! never as pointer-chasing over an adjacency structure.

pub mod common;
pub mod dataset;
pub mod error;
pub mod pagerank;
pub mod path;
pub mod sssp;
pub mod state;

pub use common::{Edge, GraphInput, VertexId};
pub use dataset::{Dataset, Partitioner};
pub use error::{AlgoError, AlgoResult};
pub use pagerank::{page_rank, ConvergencePolicy, PageRankConfig, RankRow, RankTable};
pub use path::{reconstruct_path, PathResult};
pub use sssp::{bellman_ford, DistanceRow, DistanceTable};
pub use state::PassState;
