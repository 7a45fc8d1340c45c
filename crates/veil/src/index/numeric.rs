//! Numeric equality index.

use crate::paillier::Ciphertext;
use std::collections::BTreeMap;

/// Mapping from session identifier to the encryption of one integer attribute.
///
/// Insertion overwrites. There is no deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericIndex {
    entries: BTreeMap<String, Ciphertext>,
}

impl NumericIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the ciphertext of `session_id`, returning the previous one.
    pub fn insert(&mut self, session_id: &str, ct: Ciphertext) -> Option<Ciphertext> {
        self.entries.insert(session_id.to_string(), ct)
    }

    /// Returns the ciphertext of `session_id`, if indexed.
    pub fn get(&self, session_id: &str) -> Option<&Ciphertext> {
        self.entries.get(session_id)
    }

    /// Returns whether `session_id` is indexed.
    pub fn contains(&self, session_id: &str) -> bool {
        self.entries.contains_key(session_id)
    }

    /// Number of indexed sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in session identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Ciphertext)> {
        self.entries.iter()
    }
}
