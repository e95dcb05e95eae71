//! PageRank by bulk power iteration
//!
//! The rank table carries each vertex's out-degree and teleport weight next
//! to its rank. A pass joins the non-dangling rows with the edge set, sums
//! `rank / out_degree` per destination, and left-joins the sums back onto
//! every vertex so that vertices without in-edges still receive the base
//! term:
//!
//! `R'(v) = (1 - d) * t(v) + d * (in(v) + D * t(v))`
//!
//! where `t(v)` is the teleport weight (`1/|V|`, or `1/|P|` on a
//! personalization set `P`) and `D` is the rank held by dangling vertices.
//! Redistributing `D` keeps the total mass at 1 after every pass.

use crate::common::{GraphInput, VertexId};
use crate::error::{AlgoError, AlgoResult};
use crate::state::PassState;
use rustc_hash::FxHashSet;
use tracing::{debug, info, info_span};

/// When the power iteration stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvergencePolicy {
    /// Always run the full iteration count; the tolerance is only reported
    #[default]
    FixedIterations,
    /// Stop after the first pass whose largest rank change is below the tolerance
    Tolerance,
}

/// PageRank configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRankConfig {
    /// Damping factor (usually 0.85)
    pub damping_factor: f64,
    /// Maximum number of iterations
    pub iterations: usize,
    /// Convergence threshold on the largest per-vertex change
    pub tolerance: f64,
    pub convergence: ConvergencePolicy,
    /// Restrict teleportation to these vertices
    pub personalization: Option<Vec<VertexId>>,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            iterations: 100,
            tolerance: 1e-5,
            convergence: ConvergencePolicy::FixedIterations,
            personalization: None,
        }
    }
}

impl PageRankConfig {
    /// Range checks that do not need the graph
    pub fn validate(&self) -> AlgoResult<()> {
        if !(0.0..=1.0).contains(&self.damping_factor) {
            return Err(AlgoError::Validation(format!(
                "damping factor must be in [0, 1], got {}",
                self.damping_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.tolerance) {
            return Err(AlgoError::Validation(format!(
                "threshold must be in [0, 1], got {}",
                self.tolerance
            )));
        }
        if self.iterations == 0 {
            return Err(AlgoError::Validation(
                "max iterations must be positive".to_string(),
            ));
        }
        if matches!(&self.personalization, Some(p) if p.is_empty()) {
            return Err(AlgoError::Validation(
                "personalization set must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rank state for one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
struct RankState {
    vertex: VertexId,
    rank: f64,
    out_degree: usize,
    teleport: f64,
}

/// Final rank of one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankRow {
    pub vertex: VertexId,
    pub rank: f64,
}

/// Completed rank table, ordered by vertex id
#[derive(Debug, Clone, PartialEq)]
pub struct RankTable {
    rows: Vec<RankRow>,
    iterations: usize,
    converged: bool,
    last_delta: f64,
}

impl RankTable {
    pub fn rows(&self) -> &[RankRow] {
        &self.rows
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the last pass changed no rank by `tolerance` or more
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Largest per-vertex change in the last pass
    pub fn last_delta(&self) -> f64 {
        self.last_delta
    }

    pub fn get(&self, vertex: VertexId) -> Option<f64> {
        self.rows
            .binary_search_by_key(&vertex, |row| row.vertex)
            .ok()
            .map(|idx| self.rows[idx].rank)
    }

    pub fn total_mass(&self) -> f64 {
        self.rows.iter().map(|row| row.rank).sum()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Calculate PageRank over the graph input
pub fn page_rank(graph: &GraphInput, config: &PageRankConfig) -> AlgoResult<RankTable> {
    config.validate()?;

    let n = graph.vertex_count();
    if n == 0 {
        return Ok(RankTable {
            rows: Vec::new(),
            iterations: 0,
            converged: true,
            last_delta: 0.0,
        });
    }

    let preferred = match &config.personalization {
        Some(vertices) => {
            let set: FxHashSet<VertexId> = vertices.iter().copied().collect();
            if let Some(missing) = set.iter().find(|v| !graph.contains_vertex(**v)) {
                return Err(AlgoError::Validation(format!(
                    "personalization vertex {} is not in the vertex set",
                    missing
                )));
            }
            Some(set)
        }
        None => None,
    };

    let span = info_span!(
        "page_rank",
        vertices = n,
        edges = graph.edge_count(),
        damping = config.damping_factor
    );
    let _guard = span.enter();

    let partitioner = graph.partitioner();
    let out_degrees = graph.edges().aggregate_by_key(
        partitioner,
        |edge| edge.src,
        |_| 1usize,
        |count, _| *count += 1,
        |count, other| *count += other,
    );

    let uniform = 1.0 / n as f64;
    let teleport_of = |v: VertexId| match &preferred {
        Some(set) if set.contains(&v) => 1.0 / set.len() as f64,
        Some(_) => 0.0,
        None => uniform,
    };

    let initial = graph.vertices().left_join(&out_degrees, |v| *v, |&v, degree| {
        let teleport = teleport_of(v);
        RankState {
            vertex: v,
            rank: teleport,
            out_degree: degree.copied().unwrap_or(0),
            teleport,
        }
    });
    let mut state = PassState::new(initial);

    let d = config.damping_factor;
    let mut last_delta = f64::INFINITY;
    let mut iterations = 0;

    while iterations < config.iterations {
        iterations += 1;
        let current = state.snapshot();

        let dangling_mass = current.sum_by(|row| if row.out_degree == 0 { row.rank } else { 0.0 });

        let contributions = current
            .filter(|row| row.out_degree > 0)
            .join(
                graph.edges(),
                |row| row.vertex,
                |edge| edge.src,
                |row, edge| Some((edge.dest, row.rank / row.out_degree as f64)),
            )
            .aggregate_by_key(
                partitioner,
                |(dest, _)| *dest,
                |(_, share)| *share,
                |sum, (_, share)| *sum += share,
                |sum, other| *sum += other,
            );

        let updated = current.left_join(&contributions, |row| row.vertex, |row, incoming| {
            let incoming = incoming.copied().unwrap_or(0.0);
            let rank = (1.0 - d) * row.teleport + d * (incoming + dangling_mass * row.teleport);
            (RankState { rank, ..*row }, (rank - row.rank).abs())
        });

        last_delta = updated.max_by(|(_, delta)| *delta).unwrap_or(0.0);
        debug!(iteration = iterations, dangling_mass, last_delta, "power iteration pass");
        state.publish(updated.map(|(row, _)| *row));

        if config.convergence == ConvergencePolicy::Tolerance && last_delta < config.tolerance {
            break;
        }
    }

    let converged = last_delta < config.tolerance;
    info!(iterations, converged, last_delta, "page rank finished");

    let mut rows: Vec<RankRow> = state
        .into_snapshot()
        .rows()
        .map(|row| RankRow {
            vertex: row.vertex,
            rank: row.rank,
        })
        .collect();
    rows.sort_by_key(|row| row.vertex);

    Ok(RankTable {
        rows,
        iterations,
        converged,
        last_delta,
    })
}
