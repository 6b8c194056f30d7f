//! Regex rule: an ordered set of criteria joined by AND/OR.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::criterion::Criterion;
use crate::config::{CriterionConfig, JoinOperator, RuleConfig};
use crate::error::{VigilError, VigilResult};
use crate::traits::HistorySource;
use crate::types::{marker, Activity, CompositeResult, CriterionResult};

/// Outcome of running a rule, in the shape downstream actions consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    /// Rule kind, always `"regex"` here.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub triggered: bool,
    /// Diagnostic summary line.
    pub result: String,
    /// Per-criterion evidence.
    pub data: Vec<CriterionResult>,
}

/// Tests activities against a list of regex criteria.
///
/// Criteria run strictly in order. Under `OR` evaluation stops at the first
/// triggered criterion, under `AND` at the first one that did not trigger,
/// so later criteria never fetch history they cannot influence.
pub struct RegexRule {
    config: RuleConfig,
    criteria: Vec<Criterion>,
    history: Arc<dyn HistorySource>,
}

impl RegexRule {
    /// Rule kind identifier.
    pub const KIND: &'static str = "regex";

    /// Compile every criterion in `config`.
    pub fn new(config: RuleConfig, history: Arc<dyn HistorySource>) -> VigilResult<Self> {
        let criteria = compile(&config.criteria)?;
        Ok(Self {
            config,
            criteria,
            history,
        })
    }

    /// Rule kind.
    pub fn kind(&self) -> &'static str {
        Self::KIND
    }

    /// Rule name, if configured.
    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    /// Join between criteria.
    pub fn condition(&self) -> JoinOperator {
        self.config.condition
    }

    /// Compiled criteria, in evaluation order.
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// The configuration this rule acts on, for logging and templating.
    pub fn premise(&self) -> VigilResult<serde_json::Value> {
        Ok(serde_json::json!({
            "kind": Self::KIND,
            "criteria": serde_json::to_value(&self.config.criteria)?,
            "condition": self.config.condition,
        }))
    }

    /// Evaluate the criteria against `focal`.
    pub async fn evaluate(&self, focal: &Activity) -> VigilResult<CompositeResult> {
        self.evaluate_with_cancel(focal, &CancellationToken::new())
            .await
    }

    /// Evaluate, abandoning with [`VigilError::Cancelled`] if `cancel` fires.
    pub async fn evaluate_with_cancel(
        &self,
        focal: &Activity,
        cancel: &CancellationToken,
    ) -> VigilResult<CompositeResult> {
        let result = run_criteria(
            &self.criteria,
            self.config.condition,
            focal,
            self.history.as_ref(),
            cancel,
        )
        .await?;

        debug!(
            rule = self.name().unwrap_or(Self::KIND),
            activity_id = focal.id(),
            triggered = result.triggered,
            "{}",
            result.summary_text
        );
        Ok(result)
    }

    /// Evaluate and package the outcome as a [`RuleResult`].
    pub async fn run(&self, focal: &Activity) -> VigilResult<RuleResult> {
        let composite = self.evaluate(focal).await?;
        Ok(RuleResult {
            kind: Self::KIND.to_string(),
            name: self.config.name.clone(),
            triggered: composite.triggered,
            result: composite.summary_text,
            data: composite.per_criterion_results,
        })
    }
}

fn compile(configs: &[CriterionConfig]) -> VigilResult<Vec<Criterion>> {
    if configs.is_empty() {
        return Err(VigilError::EmptyCriteriaSet);
    }
    configs.iter().map(Criterion::new).collect()
}

/// Evaluate each criterion config against `focal` under `condition`.
///
/// Configuration errors are reported before any activity is examined.
pub async fn evaluate_composite(
    criteria: &[CriterionConfig],
    condition: JoinOperator,
    focal: &Activity,
    history: &dyn HistorySource,
) -> VigilResult<CompositeResult> {
    let compiled = compile(criteria)?;
    run_criteria(&compiled, condition, focal, history, &CancellationToken::new()).await
}

/// Evaluate a single criterion config against `focal`.
pub async fn evaluate_criterion(
    criterion: &CriterionConfig,
    focal: &Activity,
    history: &dyn HistorySource,
) -> VigilResult<CriterionResult> {
    Criterion::new(criterion)?.evaluate(focal, history).await
}

async fn run_criteria(
    criteria: &[Criterion],
    condition: JoinOperator,
    focal: &Activity,
    history: &dyn HistorySource,
    cancel: &CancellationToken,
) -> VigilResult<CompositeResult> {
    let mut results: Vec<CriterionResult> = Vec::with_capacity(criteria.len());

    for criterion in criteria {
        let result = criterion.evaluate_with_cancel(focal, history, cancel).await?;
        let decisive = match condition {
            JoinOperator::Or => result.triggered,
            JoinOperator::And => !result.triggered,
        };
        results.push(result);
        if decisive {
            break;
        }
    }

    let triggered = match condition {
        JoinOperator::Or => results.iter().any(|r| r.triggered),
        JoinOperator::And => results.iter().all(|r| r.triggered),
    };

    let lines: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, r)| r.summary_line(i))
        .collect();
    let summary_text = format!("{} {}", marker(triggered), lines.join(" || "));

    Ok(CompositeResult {
        per_criterion_results: results,
        triggered,
        summary_text,
    })
}
