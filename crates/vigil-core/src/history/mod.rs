//! In-memory history source.
//!
//! Holds a fixed set of activities and answers window queries over them.
//! Useful for tests, fixtures and replaying exported data; production
//! deployments implement [`HistorySource`] over their platform API.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::VigilResult;
use crate::traits::HistorySource;
use crate::types::{Activity, ActivityWindow, LookAt};

/// History source backed by a vector of activities.
#[derive(Debug, Default)]
pub struct InMemoryHistorySource {
    activities: RwLock<Vec<Activity>>,
    /// Fixed "now" for duration windows; wall clock when unset.
    reference_time: Option<DateTime<Utc>>,
    fetch_counter: AtomicU32,
}

impl InMemoryHistorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding `activities`.
    pub fn with_activities(activities: impl IntoIterator<Item = Activity>) -> Self {
        Self {
            activities: RwLock::new(activities.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Pin the time duration windows are measured from.
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    /// Add an activity.
    pub async fn insert(&self, activity: Activity) {
        self.activities.write().await.push(activity);
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_counter.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HistorySource for InMemoryHistorySource {
    async fn fetch(
        &self,
        author_id: &str,
        scope: LookAt,
        window: &ActivityWindow,
    ) -> VigilResult<Vec<Activity>> {
        self.fetch_counter.fetch_add(1, Ordering::Relaxed);

        let activities = self.activities.read().await;
        let mut selected: Vec<Activity> = activities
            .iter()
            .filter(|a| a.author_id() == author_id && scope.includes(a))
            .cloned()
            .collect();

        // Newest first.
        selected.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        match window {
            ActivityWindow::Count(n) => selected.truncate(*n),
            ActivityWindow::Duration(span) => {
                // A span reaching past the earliest representable time has no lower bound.
                let now = self.reference_time.unwrap_or_else(Utc::now);
                if let Some(cutoff) = now.checked_sub_signed(*span) {
                    selected.retain(|a| a.created_at() >= cutoff);
                }
            }
        }

        debug!(author_id, %scope, %window, returned = selected.len(), "Served history fetch");
        Ok(selected)
    }
}
