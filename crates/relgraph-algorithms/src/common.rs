//! Shared input types for graph algorithms
//!
//! Provides a read-only, partitioned view of the vertex and edge collections
//! that every bulk pass reads from.

use crate::dataset::{Dataset, Partitioner};
use crate::error::{AlgoError, AlgoResult};
use rustc_hash::FxHashSet;

/// Vertex identifier type (i64)
pub type VertexId = i64;

/// A directed, weighted edge
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub src: VertexId,
    pub dest: VertexId,
    pub weight: f64,
}

impl Edge {
    pub fn new(src: VertexId, dest: VertexId, weight: f64) -> Self {
        Self { src, dest, weight }
    }

    /// Edge with the default unit weight
    pub fn unweighted(src: VertexId, dest: VertexId) -> Self {
        Self::new(src, dest, 1.0)
    }
}

/// Vertex and edge collections, partitioned for bulk passes.
///
/// Vertices are hash-partitioned by id and edges by source id with the same
/// partitioner, so any table keyed by vertex id joins the edge set without a
/// shuffle. Input collections are read-only for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct GraphInput {
    partitioner: Partitioner,
    vertex_count: usize,
    edge_count: usize,
    vertices: Dataset<VertexId>,
    edges: Dataset<Edge>,
}

impl GraphInput {
    /// Validate and partition the vertex and edge collections.
    ///
    /// Rejects duplicate vertex ids, edges whose endpoints are not vertices,
    /// non-finite weights and a zero partition count.
    pub fn new(vertices: Vec<VertexId>, edges: Vec<Edge>, partitions: usize) -> AlgoResult<Self> {
        if partitions == 0 {
            return Err(AlgoError::Validation("partition count must be positive".to_string()));
        }

        let mut known = FxHashSet::default();
        known.reserve(vertices.len());
        for &v in &vertices {
            if !known.insert(v) {
                return Err(AlgoError::Validation(format!("duplicate vertex id {}", v)));
            }
        }

        for edge in &edges {
            for endpoint in [edge.src, edge.dest] {
                if !known.contains(&endpoint) {
                    return Err(AlgoError::Validation(format!(
                        "edge ({}, {}) references unknown vertex {}",
                        edge.src, edge.dest, endpoint
                    )));
                }
            }
            if !edge.weight.is_finite() {
                return Err(AlgoError::Validation(format!(
                    "edge ({}, {}) has non-finite weight {}",
                    edge.src, edge.dest, edge.weight
                )));
            }
        }

        let partitioner = Partitioner::new(partitions);
        let vertex_count = vertices.len();
        let edge_count = edges.len();

        Ok(Self {
            partitioner,
            vertex_count,
            edge_count,
            vertices: Dataset::from_rows(vertices, partitioner, |v| *v),
            edges: Dataset::from_rows(edges, partitioner, |e| e.src),
        })
    }

    pub fn partitioner(&self) -> Partitioner {
        self.partitioner
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Vertex ids, partitioned by id
    pub fn vertices(&self) -> &Dataset<VertexId> {
        &self.vertices
    }

    /// Edges, partitioned by source id
    pub fn edges(&self) -> &Dataset<Edge> {
        &self.edges
    }

    /// Membership test against the owning vertex partition only
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.partition_for(self.partitioner, &id).contains(&id)
    }
}
