//! Aggregate threshold state.
//!
//! Each aggregate threshold (activity count, total matches) moves through a
//! small monotone state machine while a criterion is evaluated:
//!
//! ```text
//! Unresolved ──observe(false)──▶ PendingHistory ──observe(true)──▶ Met
//!      └──────────────observe(true)───────────────────────────────▲
//! ```
//!
//! `Met` is absorbing: once a threshold is satisfied, later observations
//! cannot unset it.

use super::comparison::Comparison;

/// Progress of one aggregate threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThresholdState {
    /// Disabled, or not yet evaluated.
    #[default]
    Unresolved,
    /// Evaluated and not satisfied; the history window may still satisfy it.
    PendingHistory,
    /// Satisfied. Never left once entered.
    Met,
}

impl ThresholdState {
    /// Fold one observation into the state.
    #[must_use]
    pub fn observe(self, satisfied: bool) -> Self {
        match (self, satisfied) {
            (ThresholdState::Met, _) | (_, true) => ThresholdState::Met,
            (_, false) => ThresholdState::PendingHistory,
        }
    }

    /// Mark the threshold as waiting on history without evaluating it.
    #[must_use]
    pub fn defer(self) -> Self {
        self.observe(false)
    }

    /// Whether the threshold has been satisfied.
    pub fn is_met(&self) -> bool {
        matches!(self, ThresholdState::Met)
    }

    /// Whether the threshold was evaluated and is still unsatisfied.
    pub fn is_pending(&self) -> bool {
        matches!(self, ThresholdState::PendingHistory)
    }

    /// Reported form: `None` when never evaluated.
    pub fn as_option(&self) -> Option<bool> {
        match self {
            ThresholdState::Unresolved => None,
            ThresholdState::PendingHistory => Some(false),
            ThresholdState::Met => Some(true),
        }
    }
}

/// Which aggregate thresholds a criterion uses, derived once from its
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregationMode {
    /// Both aggregate thresholds disabled: the focal item's own match
    /// decides.
    PerActivityOnly,
    /// Only the matched-activity count threshold.
    ActivityCount(Comparison),
    /// Only the total match threshold.
    TotalCount(Comparison),
    /// Both thresholds; whichever is satisfied first wins.
    Both {
        activity: Comparison,
        total: Comparison,
    },
}

impl AggregationMode {
    /// Derive the mode from the optional thresholds.
    pub fn new(activity: Option<Comparison>, total: Option<Comparison>) -> Self {
        match (activity, total) {
            (None, None) => AggregationMode::PerActivityOnly,
            (Some(activity), None) => AggregationMode::ActivityCount(activity),
            (None, Some(total)) => AggregationMode::TotalCount(total),
            (Some(activity), Some(total)) => AggregationMode::Both { activity, total },
        }
    }

    /// The activity-count comparison, if enabled.
    pub fn activity(&self) -> Option<&Comparison> {
        match self {
            AggregationMode::ActivityCount(c) | AggregationMode::Both { activity: c, .. } => Some(c),
            _ => None,
        }
    }

    /// The total-match comparison, if enabled.
    pub fn total(&self) -> Option<&Comparison> {
        match self {
            AggregationMode::TotalCount(c) | AggregationMode::Both { total: c, .. } => Some(c),
            _ => None,
        }
    }
}

/// Reducer over the two aggregate thresholds of one criterion evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub activity: ThresholdState,
    pub total: ThresholdState,
}

impl Aggregate {
    /// Whether either threshold has been satisfied.
    pub fn any_met(&self) -> bool {
        self.activity.is_met() || self.total.is_met()
    }

    /// Whether some enabled threshold is still waiting on history.
    pub fn needs_history(&self) -> bool {
        self.activity.is_pending() || self.total.is_pending()
    }

    /// Whether fetching history could still change the verdict: nothing is
    /// met yet and at least one threshold is pending.
    pub fn wants_history(&self) -> bool {
        !self.any_met() && self.needs_history()
    }
}
