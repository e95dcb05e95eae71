//! Single-source shortest paths by bulk Bellman-Ford relaxation
//!
//! Each relaxation pass is one set-wide transformation of the distance table:
//!
//! 1. filter the rows with a finite distance,
//! 2. join them with the edge set on `vertex = src`, producing one candidate
//!    `distance + weight` per edge,
//! 3. keep the best candidate per destination (smallest distance, then
//!    smallest source id),
//! 4. left-join the winners back onto the table, replacing a row only when
//!    the candidate is strictly smaller.
//!
//! At most `|V| - 1` passes are needed. A pass that changes nothing is a
//! fixpoint and ends the run; if the pass after the bound still lowers a
//! distance, a negative cycle is reachable from the source.

use crate::common::{Edge, GraphInput, VertexId};
use crate::dataset::{Dataset, Partitioner};
use crate::error::{AlgoError, AlgoResult};
use crate::state::PassState;
use tracing::{debug, info, info_span, warn};

/// One row of the distance table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceRow {
    pub vertex: VertexId,
    /// `f64::INFINITY` while unreachable
    pub distance: f64,
    /// `None` while unreachable; the source is its own parent
    pub parent: Option<VertexId>,
}

impl DistanceRow {
    pub fn unreachable(vertex: VertexId) -> Self {
        Self {
            vertex,
            distance: f64::INFINITY,
            parent: None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }
}

/// Completed distance table, ordered by vertex id
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    source: VertexId,
    rows: Vec<DistanceRow>,
    passes: usize,
}

impl DistanceTable {
    /// Build a table from rows in any order
    pub fn from_rows(source: VertexId, mut rows: Vec<DistanceRow>, passes: usize) -> Self {
        rows.sort_by_key(|row| row.vertex);
        Self { source, rows, passes }
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn rows(&self) -> &[DistanceRow] {
        &self.rows
    }

    /// Relaxation passes executed, including the one that found the fixpoint
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, vertex: VertexId) -> Option<&DistanceRow> {
        self.rows
            .binary_search_by_key(&vertex, |row| row.vertex)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    /// Distance to `vertex`; `None` if the vertex is unknown or unreachable
    pub fn distance(&self, vertex: VertexId) -> Option<f64> {
        self.get(vertex)
            .filter(|row| row.is_reachable())
            .map(|row| row.distance)
    }
}

/// Best relaxation found for one destination
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    via: VertexId,
}

impl Candidate {
    /// Smaller distance wins; equal distances go to the smaller source id
    fn beats(&self, other: &Candidate) -> bool {
        self.distance < other.distance || (self.distance == other.distance && self.via < other.via)
    }
}

/// Bellman-Ford from `source`.
///
/// Fails with [`AlgoError::NegativeCycle`] when a negative-weight cycle is
/// reachable from the source; no partial table is returned in that case.
pub fn bellman_ford(graph: &GraphInput, source: VertexId) -> AlgoResult<DistanceTable> {
    if !graph.contains_vertex(source) {
        return Err(AlgoError::Validation(format!(
            "source vertex {} is not in the vertex set",
            source
        )));
    }

    let span = info_span!(
        "bellman_ford",
        source,
        vertices = graph.vertex_count(),
        edges = graph.edge_count()
    );
    let _guard = span.enter();

    let initial = graph.vertices().map(|&v| {
        if v == source {
            DistanceRow {
                vertex: v,
                distance: 0.0,
                parent: Some(source),
            }
        } else {
            DistanceRow::unreachable(v)
        }
    });
    let mut state = PassState::new(initial);

    // Shortest simple paths have at most |V| - 1 edges
    let bound = graph.vertex_count().saturating_sub(1);
    let mut pass = 0;

    loop {
        pass += 1;
        let (next, changed) = relax(state.current(), graph.edges(), graph.partitioner())?;
        debug!(pass, changed, "relaxation pass");

        if changed == 0 {
            info!(passes = pass, "distances reached fixpoint");
            let rows = state.into_snapshot().rows().copied().collect();
            return Ok(DistanceTable::from_rows(source, rows, pass));
        }

        if pass > bound {
            warn!(passes = pass, changed, "distances still decreasing after relaxation bound");
            return Err(AlgoError::NegativeCycle {
                source_vertex: source,
                passes: pass,
            });
        }

        state.publish(next);
    }
}

/// One relaxation pass. Returns the next table and the number of improved rows.
///
/// A winning candidate that is not finite came from finite inputs, so the
/// path length overflowed `f64`; that is reported instead of being stored
/// as unreachable.
fn relax(
    current: &Dataset<DistanceRow>,
    edges: &Dataset<Edge>,
    partitioner: Partitioner,
) -> AlgoResult<(Dataset<DistanceRow>, usize)> {
    let reachable = current.filter(DistanceRow::is_reachable);

    let candidates = reachable.join(
        edges,
        |row| row.vertex,
        |edge| edge.src,
        |row, edge| {
            Some((
                edge.dest,
                Candidate {
                    distance: row.distance + edge.weight,
                    via: edge.src,
                },
            ))
        },
    );

    let best = candidates.aggregate_by_key(
        partitioner,
        |(dest, _)| *dest,
        |(_, candidate)| *candidate,
        |acc, (_, candidate)| {
            if candidate.beats(acc) {
                *acc = *candidate;
            }
        },
        |acc, other| {
            if other.beats(acc) {
                *acc = other;
            }
        },
    );

    if let Some((vertex, candidate)) = best.rows().find(|(_, candidate)| !candidate.distance.is_finite()) {
        return Err(AlgoError::Validation(format!(
            "path length to vertex {} via {} overflows: {}",
            vertex, candidate.via, candidate.distance
        )));
    }

    let merged = current.left_join(&best, |row| row.vertex, |row, best| match best {
        Some(candidate) if candidate.distance < row.distance => (
            DistanceRow {
                vertex: row.vertex,
                distance: candidate.distance,
                parent: Some(candidate.via),
            },
            true,
        ),
        _ => (*row, false),
    });

    let changed = merged.count_where(|(_, improved)| *improved);
    Ok((merged.map(|(row, _)| *row), changed))
}
