//! Partitioned datasets and the bulk primitives every pass is built from
//!
//! A [`Dataset`] is a horizontally partitioned collection of rows. Each
//! operation runs over all partitions in parallel and returns a new dataset;
//! inputs are never mutated. Joins and keyed aggregations expect both sides to
//! be hash-partitioned by the join key with the same [`Partitioner`].

use indexmap::map::Entry;
use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};

/// Grouping table that keeps first-seen order, so aggregate output order only
/// depends on input order.
type GroupMap<K, A> = IndexMap<K, A, FxBuildHasher>;

/// Hash partitioner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioner {
    partitions: usize,
}

impl Partitioner {
    /// Create a partitioner over `partitions` buckets (at least one)
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions: partitions.max(1),
        }
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Partition index owning `key`
    pub fn partition_of<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        (hasher.finish() % self.partitions as u64) as usize
    }

    fn buckets<T>(&self) -> Vec<Vec<T>> {
        (0..self.partitions).map(|_| Vec::new()).collect()
    }
}

/// A horizontally partitioned collection of rows
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<T> {
    partitions: Vec<Vec<T>>,
}

impl<T> Dataset<T> {
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    pub fn partitions(&self) -> &[Vec<T>] {
        &self.partitions
    }

    /// Total number of rows across partitions
    pub fn len(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(Vec::is_empty)
    }

    /// Iterate all rows in partition order
    pub fn rows(&self) -> impl Iterator<Item = &T> + '_ {
        self.partitions.iter().flatten()
    }

    pub fn into_rows(self) -> Vec<T> {
        self.partitions.into_iter().flatten().collect()
    }

    /// The partition that would own `key` under `partitioner`
    pub fn partition_for<K: Hash + ?Sized>(&self, partitioner: Partitioner, key: &K) -> &[T] {
        self.partitions
            .get(partitioner.partition_of(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl<T: Send + Sync> Dataset<T> {
    /// Hash-partition `rows` by `key`
    pub fn from_rows<K, F>(rows: Vec<T>, partitioner: Partitioner, key: F) -> Self
    where
        K: Hash,
        F: Fn(&T) -> K,
    {
        let mut partitions = partitioner.buckets();
        for row in rows {
            let target = partitioner.partition_of(&key(&row));
            partitions[target].push(row);
        }
        Self { partitions }
    }

    /// Row-wise projection; partitioning is preserved
    pub fn map<U, F>(&self, f: F) -> Dataset<U>
    where
        U: Send,
        F: Fn(&T) -> U + Sync,
    {
        Dataset {
            partitions: self
                .partitions
                .par_iter()
                .map(|part| part.iter().map(&f).collect())
                .collect(),
        }
    }

    pub fn filter<F>(&self, pred: F) -> Dataset<T>
    where
        T: Clone,
        F: Fn(&T) -> bool + Sync,
    {
        Dataset {
            partitions: self
                .partitions
                .par_iter()
                .map(|part| part.iter().filter(|row| pred(row)).cloned().collect())
                .collect(),
        }
    }

    /// Transform whole partitions at once
    pub fn map_partitions<U, F>(self, f: F) -> Dataset<U>
    where
        U: Send,
        F: Fn(Vec<T>) -> Vec<U> + Sync,
    {
        Dataset {
            partitions: self.partitions.into_par_iter().map(&f).collect(),
        }
    }

    /// Repartition rows by a new key.
    ///
    /// Every source partition routes its rows in parallel; each target
    /// partition then receives its rows in source-partition order.
    pub fn exchange<K, F>(self, partitioner: Partitioner, key: F) -> Dataset<T>
    where
        K: Hash,
        F: Fn(&T) -> K + Sync,
    {
        let routed: Vec<Vec<Vec<T>>> = self
            .partitions
            .into_par_iter()
            .map(|part| {
                let mut buckets = partitioner.buckets();
                for row in part {
                    let target = partitioner.partition_of(&key(&row));
                    buckets[target].push(row);
                }
                buckets
            })
            .collect();

        let mut partitions = partitioner.buckets();
        for buckets in routed {
            for (target, rows) in buckets.into_iter().enumerate() {
                partitions[target].extend(rows);
            }
        }
        Dataset { partitions }
    }

    /// Equi hash join of two co-partitioned datasets.
    ///
    /// `self` is the build side. Output rows follow probe order; `f` may
    /// return `None` to drop a matching pair.
    pub fn join<R, U, K, LK, RK, F>(
        &self,
        right: &Dataset<R>,
        left_key: LK,
        right_key: RK,
        f: F,
    ) -> Dataset<U>
    where
        R: Sync,
        U: Send,
        K: Hash + Eq,
        LK: Fn(&T) -> K + Sync,
        RK: Fn(&R) -> K + Sync,
        F: Fn(&T, &R) -> Option<U> + Sync,
    {
        assert_eq!(
            self.num_partitions(),
            right.num_partitions(),
            "join inputs must share a partitioner"
        );

        let partitions = self
            .partitions
            .par_iter()
            .zip(right.partitions.par_iter())
            .map(|(build, probe)| {
                let mut table: FxHashMap<K, Vec<&T>> = FxHashMap::default();
                for row in build {
                    table.entry(left_key(row)).or_default().push(row);
                }

                let mut joined = Vec::new();
                for other in probe {
                    if let Some(matches) = table.get(&right_key(other)) {
                        joined.extend(matches.iter().filter_map(|row| f(row, other)));
                    }
                }
                joined
            })
            .collect();

        Dataset { partitions }
    }

    /// Keep every row of `self`, paired with the keyed value from `right`
    /// when one exists. Output partitioning and order follow `self`.
    pub fn left_join<K, R, U, LK, F>(&self, right: &Dataset<(K, R)>, left_key: LK, f: F) -> Dataset<U>
    where
        K: Hash + Eq + Sync,
        R: Sync,
        U: Send,
        LK: Fn(&T) -> K + Sync,
        F: Fn(&T, Option<&R>) -> U + Sync,
    {
        assert_eq!(
            self.num_partitions(),
            right.num_partitions(),
            "join inputs must share a partitioner"
        );

        let partitions = self
            .partitions
            .par_iter()
            .zip(right.partitions.par_iter())
            .map(|(rows, keyed)| {
                let lookup: FxHashMap<&K, &R> = keyed.iter().map(|(k, v)| (k, v)).collect();
                rows.iter()
                    .map(|row| f(row, lookup.get(&left_key(row)).copied()))
                    .collect()
            })
            .collect();

        Dataset { partitions }
    }

    /// Two-phase grouped aggregation.
    ///
    /// Each partition pre-aggregates its rows (`init` on the first row of a
    /// group, `fold` on the rest), partial states are exchanged by key, and
    /// the owning partition combines them with `merge` in source-partition
    /// order. The result is partitioned by key under `partitioner`.
    pub fn aggregate_by_key<K, A, KF, I, F, M>(
        &self,
        partitioner: Partitioner,
        key: KF,
        init: I,
        fold: F,
        merge: M,
    ) -> Dataset<(K, A)>
    where
        K: Hash + Eq + Clone + Send + Sync,
        A: Send + Sync,
        KF: Fn(&T) -> K + Sync,
        I: Fn(&T) -> A + Sync,
        F: Fn(&mut A, &T) + Sync,
        M: Fn(&mut A, A) + Sync,
    {
        let partial = Dataset {
            partitions: self
                .partitions
                .par_iter()
                .map(|part| {
                    let mut groups: GroupMap<K, A> = GroupMap::default();
                    for row in part {
                        match groups.entry(key(row)) {
                            Entry::Occupied(mut slot) => fold(slot.get_mut(), row),
                            Entry::Vacant(slot) => {
                                slot.insert(init(row));
                            }
                        }
                    }
                    groups.into_iter().collect::<Vec<_>>()
                })
                .collect(),
        };

        partial
            .exchange(partitioner, |(k, _)| k.clone())
            .map_partitions(|part| {
                let mut groups: GroupMap<K, A> = GroupMap::default();
                for (k, state) in part {
                    match groups.entry(k) {
                        Entry::Occupied(mut slot) => merge(slot.get_mut(), state),
                        Entry::Vacant(slot) => {
                            slot.insert(state);
                        }
                    }
                }
                groups.into_iter().collect()
            })
    }

    /// Sum over all rows. Partition sums are combined in partition order.
    pub fn sum_by<F>(&self, f: F) -> f64
    where
        F: Fn(&T) -> f64 + Sync,
    {
        let partial: Vec<f64> = self
            .partitions
            .par_iter()
            .map(|part| part.iter().map(&f).sum::<f64>())
            .collect();
        partial.into_iter().sum()
    }

    pub fn count_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&T) -> bool + Sync,
    {
        self.partitions
            .par_iter()
            .map(|part| part.iter().filter(|row| pred(row)).count())
            .sum()
    }

    /// Largest value of `f` over all rows, `None` when empty
    pub fn max_by<F>(&self, f: F) -> Option<f64>
    where
        F: Fn(&T) -> f64 + Sync,
    {
        self.partitions
            .par_iter()
            .flat_map_iter(|part| part.iter().map(&f))
            .reduce_with(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<(i64, f64)> {
        vec![(1, 1.0), (2, 2.0), (1, 3.0), (3, 4.0), (2, 5.0), (1, 6.0)]
    }

    #[test]
    fn test_from_rows_colocates_keys() {
        let p = Partitioner::new(4);
        let ds = Dataset::from_rows(pairs(), p, |(k, _)| *k);
        assert_eq!(ds.num_partitions(), 4);
        assert_eq!(ds.len(), 6);
        for (idx, part) in ds.partitions().iter().enumerate() {
            for (k, _) in part {
                assert_eq!(p.partition_of(k), idx);
            }
        }
    }

    #[test]
    fn test_exchange_keeps_every_row() {
        let p = Partitioner::new(3);
        let ds = Dataset::from_rows(pairs(), p, |(_, v)| v.to_bits());
        let moved = ds.exchange(p, |(k, _)| *k);
        assert_eq!(moved.len(), 6);
        let mut ones: Vec<f64> = moved
            .partition_for(p, &1i64)
            .iter()
            .filter(|(k, _)| *k == 1)
            .map(|(_, v)| *v)
            .collect();
        ones.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(ones, vec![1.0, 3.0, 6.0]);
    }

    #[test]
    fn test_aggregate_by_key_sums_groups() {
        let p = Partitioner::new(2);
        let ds = Dataset::from_rows(pairs(), Partitioner::new(3), |(_, v)| v.to_bits());
        let sums = ds.aggregate_by_key(p, |(k, _)| *k, |(_, v)| *v, |acc, (_, v)| *acc += v, |acc, other| *acc += other);

        let mut rows = sums.into_rows();
        rows.sort_by_key(|(k, _)| *k);
        assert_eq!(rows, vec![(1, 10.0), (2, 7.0), (3, 4.0)]);
    }

    #[test]
    fn test_join_matches_all_pairs() {
        let p = Partitioner::new(4);
        let left = Dataset::from_rows(vec![(1i64, "a"), (2, "b"), (4, "d")], p, |(k, _)| *k);
        let right = Dataset::from_rows(pairs(), p, |(k, _)| *k);

        let joined = left.join(&right, |(k, _)| *k, |(k, _)| *k, |(_, name), (_, v)| Some((*name, *v)));
        let mut rows = joined.into_rows();
        rows.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(rows, vec![("a", 1.0), ("a", 3.0), ("a", 6.0), ("b", 2.0), ("b", 5.0)]);
    }

    #[test]
    fn test_join_filter_drops_pairs() {
        let p = Partitioner::new(2);
        let left = Dataset::from_rows(vec![1i64, 2], p, |k| *k);
        let right = Dataset::from_rows(pairs(), p, |(k, _)| *k);
        let joined = left.join(&right, |k| *k, |(k, _)| *k, |_, (_, v)| (*v > 2.0).then_some(*v));
        assert_eq!(joined.len(), 3);
    }

    #[test]
    fn test_left_join_keeps_unmatched_rows() {
        let p = Partitioner::new(3);
        let vertices = Dataset::from_rows(vec![1i64, 2, 3, 4], p, |v| *v);
        let totals = Dataset::from_rows(pairs(), p, |(k, _)| *k)
            .aggregate_by_key(p, |(k, _)| *k, |(_, v)| *v, |acc, (_, v)| *acc += v, |acc, other| *acc += other);

        let joined = vertices.left_join(&totals, |v| *v, |v, total| (*v, total.copied()));
        let mut rows = joined.into_rows();
        rows.sort_by_key(|(v, _)| *v);
        assert_eq!(rows, vec![(1, Some(10.0)), (2, Some(7.0)), (3, Some(4.0)), (4, None)]);
    }

    #[test]
    fn test_scalar_reductions() {
        let ds = Dataset::from_rows(pairs(), Partitioner::new(2), |(k, _)| *k);
        assert_eq!(ds.sum_by(|(_, v)| *v), 21.0);
        assert_eq!(ds.count_where(|(k, _)| *k == 1), 3);
        assert_eq!(ds.max_by(|(_, v)| *v), Some(6.0));

        let empty: Dataset<(i64, f64)> = Dataset::from_rows(Vec::new(), Partitioner::new(2), |(k, _)| *k);
        assert!(empty.is_empty());
        assert_eq!(empty.max_by(|(_, v)| *v), None);
    }
}
