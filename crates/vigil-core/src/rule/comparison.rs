//! Threshold comparisons such as `> 3` or `<= 10%`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{VigilError, VigilResult};

// Operator, number, optional percent sign, then free text that is ignored.
static COMPARISON_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(>=|<=|>|<)\s*(\d+(?:\.\d+)?)\s*(%?)(.*)$").expect("comparison pattern is valid")
});

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Operator {
    #[strum(serialize = "<")]
    #[serde(rename = "<")]
    Lt,
    #[strum(serialize = "<=")]
    #[serde(rename = "<=")]
    Lte,
    #[strum(serialize = ">")]
    #[serde(rename = ">")]
    Gt,
    #[strum(serialize = ">=")]
    #[serde(rename = ">=")]
    Gte,
}

impl Operator {
    /// Apply the operator as `lhs <op> rhs`.
    pub fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Operator::Lt => lhs < rhs,
            Operator::Lte => lhs <= rhs,
            Operator::Gt => lhs > rhs,
            Operator::Gte => lhs >= rhs,
        }
    }
}

/// A parsed threshold comparison.
///
/// `value` is never negative: the grammar has no sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub operator: Operator,
    pub value: f64,
    pub is_percent: bool,
}

impl Comparison {
    /// Parse a comparison that must be an absolute count.
    ///
    /// Used for `matchThreshold` and `totalMatchThreshold`.
    pub fn parse(input: &str) -> VigilResult<Self> {
        let comparison = Self::parse_inner(input)?;
        if comparison.is_percent {
            return Err(VigilError::invalid_comparison(
                input,
                "percentages are not allowed for this threshold",
            ));
        }
        Ok(comparison)
    }

    /// Parse a comparison that may be an absolute count or a percentage.
    ///
    /// Used for `activityMatchThreshold`.
    pub fn parse_with_percent(input: &str) -> VigilResult<Self> {
        Self::parse_inner(input)
    }

    fn parse_inner(input: &str) -> VigilResult<Self> {
        let caps = COMPARISON_PATTERN.captures(input).ok_or_else(|| {
            VigilError::invalid_comparison(input, "expected '<operator> <number>'")
        })?;

        let operator: Operator = caps[1]
            .parse()
            .map_err(|_| VigilError::invalid_comparison(input, "unknown operator"))?;
        let value: f64 = caps[2]
            .parse()
            .map_err(|_| VigilError::invalid_comparison(input, "value is not a number"))?;

        Ok(Self {
            operator,
            value,
            is_percent: !caps[3].is_empty(),
        })
    }

    /// Test `n` against this comparison.
    ///
    /// Percentages are not converted here; see [`Comparison::test_ratio`].
    pub fn test(&self, n: f64) -> bool {
        self.operator.apply(n, self.value)
    }

    /// Test a count against this comparison.
    pub fn test_count(&self, n: usize) -> bool {
        self.test(n as f64)
    }

    /// Test `part / whole` against this comparison's percentage.
    ///
    /// An empty whole has no defined ratio and never satisfies the comparison.
    pub fn test_ratio(&self, part: usize, whole: usize) -> bool {
        if whole == 0 {
            return false;
        }
        self.operator
            .apply(part as f64 / whole as f64, self.value / 100.0)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{}",
            self.operator,
            self.value,
            if self.is_percent { "%" } else { "" }
        )
    }
}
