//! Error types for vigil operations.
//!
//! Configuration problems (bad patterns, bad comparisons, empty criteria sets)
//! are detected when a rule is built. Fetch failures and cancellation only
//! happen while evaluating.

use thiserror::Error;

/// Result type alias for vigil operations.
pub type VigilResult<T> = Result<T, VigilError>;

/// Main error type for all vigil operations.
#[derive(Error, Debug)]
pub enum VigilError {
    /// The criterion pattern could not be compiled.
    #[error("Invalid pattern syntax in '{pattern}': {message}")]
    InvalidPatternSyntax {
        pattern: String,
        message: String,
        #[source]
        source: Option<regex::Error>,
    },

    /// A threshold string is not a valid comparison.
    #[error("Invalid comparison syntax: '{input}' ({reason})")]
    InvalidComparisonSyntax { input: String, reason: String },

    /// A rule was built without any criteria.
    #[error("Must provide at least one criterion")]
    EmptyCriteriaSet,

    /// Any other configuration problem.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The history source failed to return the author's activities.
    #[error("History fetch failed: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Evaluation was cancelled before a verdict was reached.
    #[error("Evaluation cancelled")]
    Cancelled,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Configuration (CFG_xxx)
    CfgInvalidPattern,
    CfgInvalidComparison,
    CfgEmptyCriteria,
    CfgInvalid,

    // Fetch (FETCH_xxx)
    FetchFailed,

    // Cancellation (CANCEL_xxx)
    Cancelled,

    // IO / serialization
    Io,
    Serialization,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CfgInvalidPattern => "CFG_001",
            ErrorCode::CfgInvalidComparison => "CFG_002",
            ErrorCode::CfgEmptyCriteria => "CFG_003",
            ErrorCode::CfgInvalid => "CFG_004",
            ErrorCode::FetchFailed => "FETCH_001",
            ErrorCode::Cancelled => "CANCEL_001",
            ErrorCode::Io => "IO_001",
            ErrorCode::Serialization => "SER_001",
        }
    }
}

impl VigilError {
    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPatternSyntax {
            pattern: pattern.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid comparison error.
    pub fn invalid_comparison(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidComparisonSyntax {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            source: None,
        }
    }

    /// Create a fetch error wrapping the underlying cause.
    pub fn fetch_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Fetch {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPatternSyntax { .. } => ErrorCode::CfgInvalidPattern,
            Self::InvalidComparisonSyntax { .. } => ErrorCode::CfgInvalidComparison,
            Self::EmptyCriteriaSet => ErrorCode::CfgEmptyCriteria,
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            Self::Fetch { .. } => ErrorCode::FetchFailed,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Io(_) => ErrorCode::Io,
            Self::Serialization(_) => ErrorCode::Serialization,
        }
    }

    /// Whether this error was caused by the rule configuration rather than
    /// by evaluating it.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidPatternSyntax { .. }
                | Self::InvalidComparisonSyntax { .. }
                | Self::EmptyCriteriaSet
                | Self::Configuration(_)
        )
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::InvalidPatternSyntax { .. } => {
                Some("Do not wrap the expression in forward slashes; pass flags via regexFlags")
            }
            Self::InvalidComparisonSyntax { .. } => {
                Some("Use the form '(< OR > OR <= OR >=) <number>', e.g. '> 3'")
            }
            Self::EmptyCriteriaSet => Some("Add at least one entry to criteria"),
            Self::Fetch { .. } => Some("Check the history source; the evaluation can be retried"),
            _ => None,
        }
    }
}
