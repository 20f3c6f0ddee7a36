//! Formula complexity tiers
//!
//! A cheap, non-authoritative heuristic over three structural signals:
//! formula length, distinct function count, and opening-parenthesis count.
//! The paren count is a proxy for nesting depth, not a verified nesting
//! computation. Thresholds combine with OR semantics.

use serde::Serialize;
use std::fmt;

const HIGH_LENGTH: usize = 200;
const HIGH_FUNCTIONS: usize = 5;
const HIGH_PARENS: usize = 5;

const MEDIUM_LENGTH: usize = 100;
const MEDIUM_FUNCTIONS: usize = 3;
const MEDIUM_PARENS: usize = 3;

/// Complexity tier of a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Score a formula from its raw text and distinct function count
    pub fn assess(formula: &str, function_count: usize) -> Self {
        let length = formula.len();
        let parens = formula.chars().filter(|&c| c == '(').count();

        if length > HIGH_LENGTH || function_count > HIGH_FUNCTIONS || parens > HIGH_PARENS {
            Complexity::High
        } else if length > MEDIUM_LENGTH
            || function_count > MEDIUM_FUNCTIONS
            || parens > MEDIUM_PARENS
        {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        };
        write!(f, "{}", s)
    }
}
