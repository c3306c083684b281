//! Duplicate suppression across handler runs.
//!
//! Every run re-scans a sliding window, so a message seen in one run is usually seen
//! again in the next. Without a [`SeenSet`] that remembers keys, each sighting produces
//! another task. [`NoDedup`] keeps that at-least-once behavior; [`InMemorySeen`]
//! suppresses repeats for as long as it lives.

use std::collections::HashSet;

/// Remembers which records have already produced output.
pub trait SeenSet {
    /// Records `key` and returns `true` if it had not been seen before.
    fn first_sighting(&mut self, key: &str) -> bool;
}

/// Treats every sighting as new.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDedup;

impl SeenSet for NoDedup {
    fn first_sighting(&mut self, _key: &str) -> bool {
        true
    }
}

/// Keys seen by this process.
#[derive(Debug, Clone, Default)]
pub struct InMemorySeen {
    keys: HashSet<String>,
}

impl InMemorySeen {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no key has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl SeenSet for InMemorySeen {
    fn first_sighting(&mut self, key: &str) -> bool {
        if self.keys.contains(key) {
            false
        } else {
            self.keys.insert(key.to_owned())
        }
    }
}

impl<S: SeenSet + ?Sized> SeenSet for &mut S {
    fn first_sighting(&mut self, key: &str) -> bool {
        (**self).first_sighting(key)
    }
}
