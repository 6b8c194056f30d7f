//! Integration tests for rule evaluation against an in-memory history.

use std::io::Write;
use std::sync::Arc;

use chrono::{Duration, Utc};
use vigil_core::{
    evaluate_composite, evaluate_criterion, Activity, ActivityWindow, Comment, CriterionConfig,
    InMemoryHistorySource, JoinOperator, LookAt, Post, RegexRule, RuleConfig, VigilError,
};

fn comment(id: &str, body: &str) -> Activity {
    Comment::new(id, "u1", body, Utc::now()).into()
}

fn history(bodies: &[&str]) -> InMemoryHistorySource {
    let now = Utc::now();
    InMemoryHistorySource::with_activities(bodies.iter().enumerate().map(|(i, body)| {
        Activity::from(Comment::new(
            format!("h{}", i),
            "u1",
            *body,
            now - Duration::minutes(i as i64 + 1),
        ))
    }))
}

/// Single-activity match with no window never touches history.
#[tokio::test]
async fn test_focal_only_match() {
    let source = InMemoryHistorySource::new();
    let focal: Activity = Post::new("p0", "u1", "cat cat", Utc::now())
        .with_self_text("")
        .into();
    let criterion = CriterionConfig::new("cat").with_match_threshold("> 1");

    let result = evaluate_criterion(&criterion, &focal, &source).await.unwrap();

    assert_eq!(result.total_count, 2);
    assert_eq!(result.activities_matched_count, 1);
    assert!(result.triggered);
    assert_eq!(result.window_description, "1 Item");
    assert_eq!(source.fetch_count(), 0);
}

/// A non-matching focal activity pulls history and triggers on it.
#[tokio::test]
async fn test_history_decides_activity_threshold() {
    let source = history(&["spam", "fine", "more spam", "fine", "spam again"]);
    let criterion = CriterionConfig::new("spam")
        .with_activity_match_threshold(Some("> 2"))
        .with_window(ActivityWindow::Count(10));

    let result = evaluate_criterion(&criterion, &comment("c0", "hello"), &source)
        .await
        .unwrap();

    assert_eq!(source.fetch_count(), 1);
    assert_eq!(result.activities_matched_count, 3);
    assert_eq!(result.activities_tested, 6);
    assert_eq!(result.activity_threshold_met, Some(true));
    assert!(result.triggered);
    assert_eq!(result.window_description, "5 Items");
}

/// A ratio exactly at a strict percentage bound is not met.
#[tokio::test]
async fn test_percent_threshold_strict_bound() {
    let source = history(&["x", "no", "no", "no"]);
    let criterion = CriterionConfig::new("x")
        .with_activity_match_threshold(Some("> 50%"))
        .with_window(ActivityWindow::Count(10));

    let result = evaluate_criterion(&criterion, &comment("c0", "x marks"), &source)
        .await
        .unwrap();

    assert_eq!(source.fetch_count(), 1);
    assert_eq!(result.activities_matched_count, 2);
    assert_eq!(result.activity_threshold_met, Some(false));
    assert!(!result.triggered);
}

/// A percentage over an empty history is never satisfied.
#[tokio::test]
async fn test_percent_threshold_empty_history() {
    let source = InMemoryHistorySource::new();
    let criterion = CriterionConfig::new("x")
        .with_activity_match_threshold(Some(">= 0%"))
        .with_window(ActivityWindow::Count(10));

    let result = evaluate_criterion(&criterion, &comment("c0", "x"), &source)
        .await
        .unwrap();

    assert_eq!(source.fetch_count(), 1);
    assert_eq!(result.activity_threshold_met, Some(false));
    assert!(!result.triggered);
    assert_eq!(result.window_description, "1 Item");
}

#[tokio::test]
async fn test_empty_criteria_rejected() {
    let source = InMemoryHistorySource::new();
    let err = evaluate_composite(&[], JoinOperator::Or, &comment("c0", "x"), &source)
        .await
        .unwrap_err();

    assert!(matches!(err, VigilError::EmptyCriteriaSet));
    assert_eq!(source.fetch_count(), 0);
}

/// `lookAt` scopes the fetch; the focal post is still tested directly.
#[tokio::test]
async fn test_look_at_scopes_history_only() {
    let now = Utc::now();
    let source = InMemoryHistorySource::with_activities(vec![
        Post::new("p1", "u1", "spam title", now - Duration::hours(1)).into(),
        Comment::new("c1", "u1", "spam comment", now - Duration::hours(2)).into(),
    ]);
    let criterion = CriterionConfig::new("spam")
        .with_look_at(LookAt::Comments)
        .with_activity_match_threshold(Some("> 1"))
        .with_window(ActivityWindow::Count(10));
    let focal: Activity = Post::new("p0", "u1", "spam", now).into();

    let result = evaluate_criterion(&criterion, &focal, &source).await.unwrap();

    assert_eq!(result.activities_tested, 2);
    assert_eq!(result.activities_matched_count, 2);
    assert!(result.triggered);
}

/// The focal activity is not counted twice when history contains it.
#[tokio::test]
async fn test_focal_excluded_from_history() {
    let now = Utc::now();
    let source = InMemoryHistorySource::with_activities(vec![
        Comment::new("c0", "u1", "spam", now).into(),
        Comment::new("c1", "u1", "nothing", now - Duration::hours(1)).into(),
    ]);
    let criterion = CriterionConfig::new("spam")
        .with_activity_match_threshold(Some("> 1"))
        .with_window(ActivityWindow::Count(10));
    let focal: Activity = Comment::new("c0", "u1", "spam", now).into();

    let result = evaluate_criterion(&criterion, &focal, &source).await.unwrap();

    assert_eq!(result.activities_tested, 2);
    assert_eq!(result.activities_matched_count, 1);
    assert_eq!(result.total_count, 1);
    assert!(!result.triggered);
}

/// A focal activity that already meets a count threshold skips the fetch.
#[tokio::test]
async fn test_decided_focal_skips_fetch() {
    let source = history(&["spam", "spam"]);
    let criterion = CriterionConfig::new("spam")
        .with_total_match_threshold(Some("> 1"))
        .with_window(ActivityWindow::Count(10));

    let result = evaluate_criterion(&criterion, &comment("c0", "spam spam"), &source)
        .await
        .unwrap();

    assert!(result.triggered);
    assert_eq!(result.total_threshold_met, Some(true));
    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn test_duration_window_description() {
    let now = Utc::now();
    let source = InMemoryHistorySource::with_activities(vec![
        Comment::new("c1", "u1", "a", now - Duration::hours(1)).into(),
        Comment::new("c2", "u1", "b", now - Duration::days(3) - Duration::hours(1)).into(),
        Comment::new("c3", "u1", "c", now - Duration::days(30)).into(),
    ])
    .with_reference_time(now);
    let criterion = CriterionConfig::new("spam").with_window(ActivityWindow::Duration(Duration::days(7)));

    let result = evaluate_criterion(&criterion, &comment("c0", "hello"), &source)
        .await
        .unwrap();

    assert_eq!(result.activities_tested, 3);
    assert_eq!(result.window_description, "3 days");
    assert!(!result.triggered);
}

#[tokio::test]
async fn test_sample_cap() {
    let source = InMemoryHistorySource::new();
    let body = "a ".repeat(150);
    let result = evaluate_criterion(&CriterionConfig::new("a"), &comment("c0", &body), &source)
        .await
        .unwrap();

    assert_eq!(result.total_count, 150);
    assert_eq!(result.samples.len(), 100);
}

/// AND stops at the first failing criterion, so later windows are never fetched.
#[tokio::test]
async fn test_and_short_circuit_avoids_fetch() {
    let source = Arc::new(history(&["spam"]));
    let config = RuleConfig::builder()
        .condition(JoinOperator::And)
        .criterion(CriterionConfig::new("ham"))
        .criterion(CriterionConfig::new("spam").with_window(ActivityWindow::Count(5)))
        .build();
    let rule = RegexRule::new(config, source.clone()).unwrap();

    let result = rule.evaluate(&comment("c0", "nothing")).await.unwrap();

    assert!(!result.triggered);
    assert_eq!(result.per_criterion_results.len(), 1);
    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn test_rule_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "name": "crypto spam",
            "condition": "OR",
            "criteria": [
                {{"name": "coins", "regex": "free\\s+coins", "regexFlags": "i", "window": 10, "activityMatchThreshold": "> 1"}}
            ]
        }}"#
    )
    .unwrap();

    let config = RuleConfig::from_file(file.path()).unwrap();
    let source = Arc::new(history(&["Free coins here", "ok"]));
    let rule = RegexRule::new(config, source.clone()).unwrap();

    let outcome = rule.run(&comment("c0", "FREE   COINS")).await.unwrap();

    assert_eq!(outcome.name.as_deref(), Some("crypto spam"));
    assert!(outcome.triggered);
    assert_eq!(outcome.data[0].samples, vec!["FREE   COINS", "Free coins"]);
    assert!(outcome.result.starts_with("✔ Crit coins ✔"));
    assert_eq!(source.fetch_count(), 1);
}
