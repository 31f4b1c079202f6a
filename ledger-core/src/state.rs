//! Transactional state view
//!
//! The execution engine owns the authoritative key-value database and hands
//! each action a unit-of-work view of it. This module defines that
//! collaborator interface plus two implementations: an in-memory state for
//! tests and embedders, and a buffered overlay that actions use to make their
//! multi-key mutations all-or-nothing.

use crate::error::Result;
use std::collections::BTreeMap;

/// Unit-of-work view of the authoritative key-value store.
///
/// `get` returns `Ok(None)` for a missing key; that not-found outcome is
/// distinct from storage errors. Balance and credit reads map it to zero,
/// asset and order reads surface it to callers.
pub trait StateView {
    /// Point read
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite
    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove; removing an absent key is not an error
    fn remove(&mut self, key: &[u8]) -> Result<()>;
}

/// Ordered prefix scan, needed to rebuild derived indexes from open records
pub trait StateScan {
    /// All (key, value) pairs whose key starts with `prefix`, in key order
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;
}

/// In-memory state backed by a `BTreeMap`
#[derive(Debug, Default, Clone)]
pub struct MemState {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemState {
    /// New empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if no records exist
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl StateView for MemState {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.map.get(key).cloned())
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.map.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> Result<()> {
        self.map.remove(key);
        Ok(())
    }
}

impl StateScan for MemState {
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .map
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// Buffered write overlay over another state view.
///
/// Reads fall through to staged writes first, then the base. Mutations stage
/// in memory until [`StateOverlay::commit`] applies them to the base in key
/// order. Dropping the overlay discards everything, which is how actions
/// guarantee that a failure after the first mutation leaves the base
/// untouched.
pub struct StateOverlay<'a> {
    base: &'a mut dyn StateView,
    staged: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl std::fmt::Debug for StateOverlay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateOverlay")
            .field("staged", &self.staged.len())
            .finish_non_exhaustive()
    }
}

impl<'a> StateOverlay<'a> {
    /// Overlay on top of `base`
    pub fn new(base: &'a mut dyn StateView) -> Self {
        Self {
            base,
            staged: BTreeMap::new(),
        }
    }

    /// Apply all staged writes to the base
    pub fn commit(self) -> Result<()> {
        for (key, value) in self.staged {
            match value {
                Some(v) => self.base.insert(&key, &v)?,
                None => self.base.remove(&key)?,
            }
        }
        Ok(())
    }
}

impl StateView for StateOverlay<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(staged) = self.staged.get(key) {
            return Ok(staged.clone());
        }
        self.base.get(key)
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.staged.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> Result<()> {
        self.staged.insert(key.to_vec(), None);
        Ok(())
    }
}
