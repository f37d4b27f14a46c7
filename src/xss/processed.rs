use crate::store::LineStore;
use std::collections::HashSet;

/// Combination targets already recorded, loaded from a prior result file
/// and grown as the current run claims work.
#[derive(Debug, Default)]
pub struct ProcessedSet {
    seen: HashSet<String>,
    loaded: usize,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty when the result file does not exist yet.
    pub fn load(results: &LineStore) -> Self {
        if !results.exists() {
            return Self::new();
        }

        let seen: HashSet<String> = results.read_or_empty().into_iter().collect();
        let loaded = seen.len();
        tracing::info!(
            "Resuming: {} combinations already recorded in {}",
            loaded,
            results.path().display()
        );
        Self { seen, loaded }
    }

    #[cfg(test)]
    pub fn contains(&self, target: &str) -> bool {
        self.seen.contains(target)
    }

    /// Returns true if `target` was not yet processed and is now claimed.
    pub fn claim(&mut self, target: &str) -> bool {
        if self.seen.contains(target) {
            return false;
        }
        self.seen.insert(target.to_string())
    }

    /// Entries that came from the result file.
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
