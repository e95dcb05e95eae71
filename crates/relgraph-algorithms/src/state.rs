//! Double-buffered pass state
//!
//! The current table of an iterative run is an immutable snapshot. A pass
//! builds the next table from it and publishes it wholesale; the previous
//! snapshot is handed back and dropped once its last reader lets go.

use crate::dataset::Dataset;
use std::sync::Arc;

#[derive(Debug)]
pub struct PassState<T> {
    current: Arc<Dataset<T>>,
}

impl<T> PassState<T> {
    pub fn new(initial: Dataset<T>) -> Self {
        Self {
            current: Arc::new(initial),
        }
    }

    /// Shared handle to the current snapshot
    pub fn snapshot(&self) -> Arc<Dataset<T>> {
        Arc::clone(&self.current)
    }

    pub fn current(&self) -> &Dataset<T> {
        &self.current
    }

    /// Swap in the next table and return the one it replaces
    pub fn publish(&mut self, next: Dataset<T>) -> Arc<Dataset<T>> {
        std::mem::replace(&mut self.current, Arc::new(next))
    }

    pub fn into_snapshot(self) -> Arc<Dataset<T>> {
        self.current
    }
}
