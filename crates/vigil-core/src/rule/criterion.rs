//! Evaluation of a single criterion against a focal activity.
//!
//! The focal activity is matched first. History is only fetched when a
//! window is configured and the focal activity alone could not decide the
//! criterion, since fetching is the only expensive step.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::comparison::Comparison;
use super::humanize::humanize;
use super::matcher::{MatchSet, PatternMatcher};
use super::threshold::{Aggregate, AggregationMode};
use crate::config::CriterionConfig;
use crate::error::{VigilError, VigilResult};
use crate::traits::HistorySource;
use crate::types::{Activity, ActivityWindow, CriterionResult, CriterionSummary, LookAt, TestOnField};

/// A validated, compiled criterion.
///
/// Built once from a [`CriterionConfig`]; every pattern and comparison error
/// is reported here rather than during evaluation.
#[derive(Debug, Clone)]
pub struct Criterion {
    name: Option<String>,
    regex: String,
    matcher: PatternMatcher,
    match_threshold: Comparison,
    mode: AggregationMode,
    look_at: LookAt,
    window: Option<ActivityWindow>,
    match_threshold_text: String,
    activity_threshold_text: Option<String>,
    total_threshold_text: Option<String>,
}

impl Criterion {
    /// Compile a criterion configuration.
    pub fn new(config: &CriterionConfig) -> VigilResult<Self> {
        let test_on = normalize_test_on(&config.test_on)?;
        let matcher = PatternMatcher::new(&config.regex, config.regex_flags.as_deref(), test_on)?;

        let match_threshold = Comparison::parse(&config.match_threshold)?;
        let activity = config
            .activity_match_threshold
            .as_deref()
            .map(Comparison::parse_with_percent)
            .transpose()?;
        let total = config
            .total_match_threshold
            .as_deref()
            .map(Comparison::parse)
            .transpose()?;

        Ok(Self {
            name: config.name.clone(),
            regex: config.regex.clone(),
            matcher,
            match_threshold,
            mode: AggregationMode::new(activity, total),
            look_at: config.look_at,
            window: config.window,
            match_threshold_text: config.match_threshold.clone(),
            activity_threshold_text: config.activity_match_threshold.clone(),
            total_threshold_text: config.total_match_threshold.clone(),
        })
    }

    /// Configured name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Which aggregate thresholds this criterion uses.
    pub fn mode(&self) -> &AggregationMode {
        &self.mode
    }

    /// Normalized post fields tested by this criterion.
    pub fn test_on(&self) -> &[TestOnField] {
        self.matcher.test_on()
    }

    /// Evaluate against `focal`, fetching history from `history` if needed.
    pub async fn evaluate(
        &self,
        focal: &Activity,
        history: &dyn HistorySource,
    ) -> VigilResult<CriterionResult> {
        self.evaluate_with_cancel(focal, history, &CancellationToken::new())
            .await
    }

    /// Evaluate, abandoning with [`VigilError::Cancelled`] if `cancel` fires
    /// before a verdict is reached.
    pub async fn evaluate_with_cancel(
        &self,
        focal: &Activity,
        history: &dyn HistorySource,
        cancel: &CancellationToken,
    ) -> VigilResult<CriterionResult> {
        if cancel.is_cancelled() {
            return Err(VigilError::Cancelled);
        }

        let label = self.name.as_deref().unwrap_or(&self.regex);

        let mut matches = self.matcher.find_matches(focal);
        let single_matched = self.match_threshold.test_count(matches.total_count());
        let mut activities_matched = usize::from(single_matched);
        let mut activities_tested = 1;

        let mut aggregate = Aggregate::default();
        if let Some(activity) = self.mode.activity() {
            // A percentage needs the history length before it can be judged.
            aggregate.activity = if activity.is_percent {
                aggregate.activity.defer()
            } else {
                aggregate
                    .activity
                    .observe(activity.test_count(activities_matched))
            };
        }
        if let Some(total) = self.mode.total() {
            aggregate.total = aggregate.total.observe(total.test_count(matches.total_count()));
        }

        debug!(
            criterion = label,
            activity_id = focal.id(),
            matches = matches.total_count(),
            single_matched,
            "Evaluated focal activity"
        );

        let mut past: Vec<Activity> = Vec::new();
        if let Some(window) = &self.window {
            if aggregate.wants_history() {
                past = self.fetch_history(focal, window, history, cancel).await?;
                let history_len = past.len();

                for item in &past {
                    activities_tested += 1;
                    let found = self.matcher.find_matches(item);
                    if self.match_threshold.test_count(found.total_count()) {
                        activities_matched += 1;
                    }
                    matches.absorb(found);
                    aggregate = self.fold(aggregate, &matches, activities_matched, history_len);
                }

                debug!(
                    criterion = label,
                    history_len,
                    activities_matched,
                    matches = matches.total_count(),
                    "Evaluated history window"
                );
            } else {
                debug!(criterion = label, "Focal activity decided criterion, skipping history");
            }
        }

        let window_description = self.describe_window(&past);

        let (triggered, activity_threshold_met, total_threshold_met) =
            if matches!(self.mode, AggregationMode::PerActivityOnly) {
                (single_matched, Some(single_matched), None)
            } else {
                (
                    aggregate.any_met(),
                    aggregate.activity.as_option(),
                    aggregate.total.as_option(),
                )
            };

        Ok(CriterionResult {
            criterion: self.summary(window_description.clone()),
            total_count: matches.total_count(),
            samples: matches.into_samples(),
            activities_matched_count: activities_matched,
            activities_tested,
            activity_threshold_met,
            total_threshold_met,
            triggered,
            window_description,
        })
    }

    /// Re-evaluate the thresholds that are not yet met.
    fn fold(
        &self,
        mut aggregate: Aggregate,
        matches: &MatchSet,
        activities_matched: usize,
        history_len: usize,
    ) -> Aggregate {
        if let Some(activity) = self.mode.activity() {
            if !aggregate.activity.is_met() {
                let satisfied = if activity.is_percent {
                    activity.test_ratio(activities_matched, history_len)
                } else {
                    activity.test_count(activities_matched)
                };
                aggregate.activity = aggregate.activity.observe(satisfied);
            }
        }
        if let Some(total) = self.mode.total() {
            if !aggregate.total.is_met() {
                aggregate.total = aggregate.total.observe(total.test_count(matches.total_count()));
            }
        }
        aggregate
    }

    async fn fetch_history(
        &self,
        focal: &Activity,
        window: &ActivityWindow,
        history: &dyn HistorySource,
        cancel: &CancellationToken,
    ) -> VigilResult<Vec<Activity>> {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(VigilError::Cancelled),
            result = history.fetch(focal.author_id(), self.look_at, window) => result,
        };

        match fetched {
            Ok(mut items) => {
                items.retain(|item| item.id() != focal.id());
                Ok(items)
            }
            Err(e) => {
                warn!(
                    author_id = focal.author_id(),
                    scope = %self.look_at,
                    error = %e,
                    "History fetch failed"
                );
                Err(e)
            }
        }
    }

    fn describe_window(&self, past: &[Activity]) -> String {
        match (&self.window, past.first(), past.last()) {
            (Some(ActivityWindow::Count(_)), Some(_), _) => format!("{} Items", past.len()),
            (Some(ActivityWindow::Duration(_)), Some(newest), Some(oldest)) => {
                humanize(newest.created_at() - oldest.created_at())
            }
            _ => "1 Item".to_string(),
        }
    }

    fn summary(&self, window: String) -> CriterionSummary {
        CriterionSummary {
            name: self.name.clone(),
            regex: self.regex.clone(),
            test_on: self.matcher.test_on().to_vec(),
            match_threshold: self.match_threshold_text.clone(),
            activity_match_threshold: self.activity_threshold_text.clone(),
            total_match_threshold: self.total_threshold_text.clone(),
            window,
        }
    }
}

/// Lower-case, de-duplicate and parse `testOn` entries, keeping first-seen
/// order. An empty list means title and body.
pub fn normalize_test_on(raw: &[String]) -> VigilResult<Vec<TestOnField>> {
    if raw.is_empty() {
        return Ok(TestOnField::defaults());
    }
    let mut fields: Vec<TestOnField> = Vec::with_capacity(raw.len());
    for value in raw {
        let field: TestOnField = value.trim().to_lowercase().parse().map_err(|_| {
            VigilError::configuration(format!(
                "Unknown testOn field '{}': expected title, body or url",
                value
            ))
        })?;
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    Ok(fields)
}
