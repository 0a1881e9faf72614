use scout_core::ProductRecord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Resolved products by barcode, for the life of the process.
///
/// Only successful lookups go in, and an entry is never replaced once
/// written. The lock is held for single map operations only.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<String, Arc<ProductRecord>>>,
}

impl ResultCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<ProductRecord>>> {
        // a panicking writer cannot leave a half-inserted entry behind
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached record for `barcode`.
    #[must_use]
    pub fn get(&self, barcode: &str) -> Option<Arc<ProductRecord>> {
        self.entries().get(barcode).cloned()
    }

    /// Store `record` under `barcode` unless something is already there.
    ///
    /// Returns the record that ends up cached, which is the earlier one if
    /// two lookups of the same barcode raced.
    pub fn insert(&self, barcode: &str, record: ProductRecord) -> Arc<ProductRecord> {
        Arc::clone(
            self.entries()
                .entry(barcode.to_string())
                .or_insert_with(|| Arc::new(record)),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
