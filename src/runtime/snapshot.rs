//! Copy-on-write publication cell.

use std::sync::{Arc, RwLock};

/// Holds the latest published value. Readers clone the `Arc` and never see a
/// half-written value; writers replace it wholesale.
#[derive(Debug)]
pub struct SnapshotCell<T> {
    inner: RwLock<Arc<T>>,
}

impl<T> SnapshotCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(Arc::new(value)),
        }
    }

    pub fn load(&self) -> Arc<T> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn store(&self, value: T) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(value);
    }
}
