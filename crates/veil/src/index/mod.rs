//! The homomorphic index engine.
//!
//! Two structures are maintained: a numeric equality index mapping sessions
//! to Paillier encryptions of one integer attribute, and a keyword inverted
//! index keyed by deterministic keyword tokens. Numeric queries are answered
//! by homomorphic equality tests; keyword queries by set operations.
//!
//! Keyword tokens are deterministic, so the inverted index reveals which
//! sessions share a keyword to anyone who can read it.

mod engine;
mod keyword;
mod numeric;
mod token;

pub use engine::SearchEngine;
pub use keyword::KeywordIndex;
pub use numeric::NumericIndex;
pub use token::{KeywordToken, KeywordTokenizer, TOKEN_BYTES};

use crate::Error;
use std::str::FromStr;

/// Combination of the per-term results of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOperator {
    /// Every term must match.
    And,
    /// At least one term must match.
    Or,
}

impl FromStr for BooleanOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("and") {
            Ok(Self::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Self::Or)
        } else {
            Err(Error::UnspecifiedInput(format!("Unknown boolean operator {:?}", s)))
        }
    }
}
