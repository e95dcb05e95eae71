//! Error types shared by the bulk engines

use crate::common::VertexId;
use thiserror::Error;

/// Errors raised by the relaxation engine, the power-iteration engine and
/// path reconstruction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgoError {
    /// Parameter out of range or malformed input collections
    #[error("Validation error: {0}")]
    Validation(String),

    /// A negative-weight cycle is reachable from the source
    #[error("Negative cycle reachable from vertex {source_vertex} (still relaxing after {passes} passes)")]
    NegativeCycle { source_vertex: VertexId, passes: usize },

    #[error("Vertex {0} not found")]
    VertexNotFound(VertexId),

    /// The parent chain did not terminate at the source within graph order
    #[error("Parent chain from vertex {vertex} did not reach the source within {hops} hops")]
    CycleGuard { vertex: VertexId, hops: usize },
}

pub type AlgoResult<T> = Result<T, AlgoError>;
