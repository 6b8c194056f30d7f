//! Regex rule evaluation.
//!
//! A rule is a list of criteria. Each criterion is a pattern plus thresholds:
//! - `matchThreshold`: matches needed in one activity for it to count as matched
//! - `activityMatchThreshold`: matched activities needed to trigger (count or
//!   percentage of the history window)
//! - `totalMatchThreshold`: matches needed across the focal activity and its
//!   history to trigger
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vigil_core::{CriterionConfig, InMemoryHistorySource, RegexRule, RuleConfig};
//!
//! let config = RuleConfig::builder()
//!     .criterion(CriterionConfig::new("buy now").with_flags("i"))
//!     .build();
//! let rule = RegexRule::new(config, Arc::new(InMemoryHistorySource::new()))?;
//!
//! let result = rule.evaluate(&activity).await?;
//! if result.triggered {
//!     println!("{}", result.summary_text);
//! }
//! ```

mod comparison;
mod criterion;
mod humanize;
mod matcher;
mod regex_rule;
mod threshold;

pub use comparison::{Comparison, Operator};
pub use criterion::{normalize_test_on, Criterion};
pub use humanize::humanize;
pub use matcher::{MatchSet, PatternMatcher, MAX_SAMPLES};
pub use regex_rule::{evaluate_composite, evaluate_criterion, RegexRule, RuleResult};
pub use threshold::{Aggregate, AggregationMode, ThresholdState};
