//! Path reconstruction from a completed distance table

use crate::common::VertexId;
use crate::error::{AlgoError, AlgoResult};
use crate::sssp::DistanceTable;

/// Result of a path lookup
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    pub source: VertexId,
    pub target: VertexId,
    /// Vertices from source to target; empty when the target is unreachable
    pub path: Vec<VertexId>,
    pub cost: f64,
}

/// Walk parent pointers back from `destination` to the source.
///
/// The walk is bounded by the table size: a chain that has not reached a
/// self-parented vertex after `|V|` hops, or that breaks off, is reported as
/// [`AlgoError::CycleGuard`].
pub fn reconstruct_path(table: &DistanceTable, destination: VertexId) -> AlgoResult<PathResult> {
    let target = table
        .get(destination)
        .ok_or(AlgoError::VertexNotFound(destination))?;

    if !target.is_reachable() {
        return Ok(PathResult {
            source: table.source(),
            target: destination,
            path: Vec::new(),
            cost: f64::INFINITY,
        });
    }

    let mut path = vec![destination];
    let mut current = destination;
    let mut hops = 0;

    loop {
        let parent = table
            .get(current)
            .and_then(|row| row.parent)
            .ok_or(AlgoError::CycleGuard {
                vertex: destination,
                hops,
            })?;

        if parent == current {
            break;
        }

        hops += 1;
        if hops > table.len() {
            return Err(AlgoError::CycleGuard {
                vertex: destination,
                hops,
            });
        }
        path.push(parent);
        current = parent;
    }

    path.reverse();
    Ok(PathResult {
        source: current,
        target: destination,
        path,
        cost: target.distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sssp::DistanceRow;

    fn row(vertex: VertexId, distance: f64, parent: Option<VertexId>) -> DistanceRow {
        DistanceRow {
            vertex,
            distance,
            parent,
        }
    }

    fn chain() -> DistanceTable {
        DistanceTable::from_rows(
            1,
            vec![
                row(3, 5.0, Some(2)),
                row(1, 0.0, Some(1)),
                row(2, 2.0, Some(1)),
                row(4, f64::INFINITY, None),
            ],
            3,
        )
    }

    #[test]
    fn test_path_follows_parents() {
        let result = reconstruct_path(&chain(), 3).unwrap();
        assert_eq!(result.path, vec![1, 2, 3]);
        assert_eq!(result.cost, 5.0);
        assert_eq!(result.source, 1);
    }

    #[test]
    fn test_path_to_source_is_single_vertex() {
        let result = reconstruct_path(&chain(), 1).unwrap();
        assert_eq!(result.path, vec![1]);
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn test_unreachable_target_has_empty_path() {
        let result = reconstruct_path(&chain(), 4).unwrap();
        assert!(result.path.is_empty());
    }

    #[test]
    fn test_missing_vertex() {
        assert_eq!(reconstruct_path(&chain(), 99), Err(AlgoError::VertexNotFound(99)));
    }

    #[test]
    fn test_corrupted_parent_cycle_is_guarded() {
        let table = DistanceTable::from_rows(
            1,
            vec![
                row(1, 0.0, Some(1)),
                row(2, 1.0, Some(3)),
                row(3, 1.0, Some(2)),
            ],
            1,
        );
        assert!(matches!(
            reconstruct_path(&table, 2),
            Err(AlgoError::CycleGuard { vertex: 2, .. })
        ));
    }

    #[test]
    fn test_broken_chain_is_guarded() {
        let table = DistanceTable::from_rows(
            1,
            vec![row(1, 0.0, Some(1)), row(2, 1.0, Some(7))],
            1,
        );
        assert!(matches!(
            reconstruct_path(&table, 2),
            Err(AlgoError::CycleGuard { .. })
        ));
    }
}
