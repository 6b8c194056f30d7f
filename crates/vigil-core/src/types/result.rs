//! Evaluation results.

use serde::{Deserialize, Serialize};

use super::TestOnField;

/// Pass marker used in diagnostic summaries.
pub const PASS: &str = "✔";
/// Fail marker used in diagnostic summaries.
pub const FAIL: &str = "✘";

/// Render a pass/fail marker.
pub fn marker(passed: bool) -> &'static str {
    if passed {
        PASS
    } else {
        FAIL
    }
}

/// The configuration a criterion result was produced from, echoed for
/// diagnostics and templating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub regex: String,
    pub test_on: Vec<TestOnField>,
    pub match_threshold: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_match_threshold: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_match_threshold: Option<String>,
    /// Human description of the window that was actually examined.
    pub window: String,
}

/// Outcome of evaluating one criterion against one focal activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionResult {
    pub criterion: CriterionSummary,
    /// Retained match samples (at most 100).
    pub samples: Vec<String>,
    /// True number of matches across every tested activity.
    pub total_count: usize,
    pub activities_matched_count: usize,
    pub activities_tested: usize,
    /// `None` when the activity-count threshold is disabled.
    pub activity_threshold_met: Option<bool>,
    /// `None` when the total-match threshold is disabled.
    pub total_threshold_met: Option<bool>,
    pub triggered: bool,
    pub window_description: String,
}

impl CriterionResult {
    /// Name used in summaries: the configured name, else the 1-based position.
    pub fn label(&self, index: usize) -> String {
        self.criterion
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| (index + 1).to_string())
    }

    /// One-line diagnostic for this criterion.
    pub fn summary_line(&self, index: usize) -> String {
        let mut msg = format!("Crit {} {}", self.label(index), marker(self.triggered));
        if let Some(met) = self.activity_threshold_met {
            msg.push_str(&format!(
                " -- Activity Match=> {} {} {} (Threshold {})",
                marker(met),
                self.activities_matched_count,
                self.criterion
                    .activity_match_threshold
                    .as_deref()
                    .unwrap_or("(disabled)"),
                self.criterion.match_threshold
            ));
        }
        match self.total_threshold_met {
            Some(met) => msg.push_str(&format!(
                " -- Total Matches=> {} {} {}",
                marker(met),
                self.total_count,
                self.criterion.total_match_threshold.as_deref().unwrap_or("")
            )),
            None => msg.push_str(&format!(" and {} Total Matches", self.total_count)),
        }
        msg.push_str(&format!(" (Window: {})", self.window_description));
        msg
    }
}

/// Outcome of evaluating a set of criteria under an AND/OR join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResult {
    /// Results for the criteria that were actually evaluated, in order.
    pub per_criterion_results: Vec<CriterionResult>,
    pub triggered: bool,
    pub summary_text: String,
}
