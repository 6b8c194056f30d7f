//! vigil-core - Core library for vigil.
//!
//! This crate provides the regex rule evaluator: criteria configuration,
//! threshold parsing, pattern matching over activities, and optional
//! inspection of an author's recent history.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vigil_core::{ActivityWindow, CriterionConfig, InMemoryHistorySource, RegexRule, RuleConfig};
//!
//! let config = RuleConfig::builder()
//!     .name("link spam")
//!     .criterion(
//!         CriterionConfig::new(r"example\.com")
//!             .with_test_on(["url"])
//!             .with_activity_match_threshold(Some("> 30%"))
//!             .with_window(ActivityWindow::Count(50)),
//!     )
//!     .build();
//!
//! let rule = RegexRule::new(config, Arc::new(InMemoryHistorySource::new()))?;
//! let result = rule.run(&activity).await?;
//! println!("{}", result.result);
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod rule;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{CriterionConfig, JoinOperator, RuleConfig, RuleConfigBuilder};
pub use error::{ErrorCode, VigilError, VigilResult};
pub use history::InMemoryHistorySource;
pub use rule::{
    evaluate_composite, evaluate_criterion, Comparison, Criterion, MatchSet, Operator,
    PatternMatcher, RegexRule, RuleResult,
};
pub use traits::HistorySource;
pub use types::{
    Activity, ActivityWindow, Comment, CompositeResult, CriterionResult, CriterionSummary,
    LookAt, Post, TestOnField,
};
