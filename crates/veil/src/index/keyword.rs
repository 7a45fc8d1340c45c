//! Keyword inverted index.

use crate::index::{BooleanOperator, KeywordToken};
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from keyword token to the set of sessions holding that keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordIndex {
    postings: BTreeMap<KeywordToken, BTreeSet<String>>,
}

impl KeywordIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `session_id` to the posting set of `token`.
    ///
    /// Returns `false` when the pair was already present, in which case the
    /// index is left unchanged.
    pub fn insert(&mut self, token: KeywordToken, session_id: &str) -> bool {
        let posting = self.postings.entry(token).or_default();
        if posting.contains(session_id) {
            return false;
        }
        posting.insert(session_id.to_string())
    }

    /// Returns the posting set of `token`, if any.
    pub fn posting(&self, token: &KeywordToken) -> Option<&BTreeSet<String>> {
        self.postings.get(token)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Returns whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Iterate over the postings in token order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeywordToken, &BTreeSet<String>)> {
        self.postings.iter()
    }

    /// Combine the posting sets of `tokens` with `operator`.
    ///
    /// A missing token contributes an empty set, and an empty query matches
    /// nothing. The result is sorted.
    pub fn search(&self, tokens: &[KeywordToken], operator: BooleanOperator) -> Vec<String> {
        let empty = BTreeSet::new();
        let mut sets = tokens.iter().map(|t| self.postings.get(t).unwrap_or(&empty));
        let Some(first) = sets.next() else {
            return vec![];
        };
        let result = match operator {
            BooleanOperator::And => sets.fold(first.clone(), |acc, s| &acc & s),
            BooleanOperator::Or => sets.fold(first.clone(), |acc, s| &acc | s),
        };
        result.into_iter().collect()
    }
}
