use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// In-process registry of one mutex per slug.
///
/// Serializes requests that publish to the same slug through one orchestrator. Entries nobody
/// holds are pruned on the next lookup.
#[derive(Debug, Default)]
pub(crate) struct SlugLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SlugLocks {
    pub(crate) fn lock_for(&self, slug: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(map.entry(slug.to_string()).or_default())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/locks.rs"]
mod tests;
