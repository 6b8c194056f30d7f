//! History source trait.

use async_trait::async_trait;

use crate::error::VigilResult;
use crate::types::{Activity, ActivityWindow, LookAt};

/// Retrieves an author's past activities.
///
/// Implementations are backed by whatever the content platform offers
/// (an API listing, a database, a cache). Evaluators treat every call as one
/// opaque asynchronous operation; throttling and retries live here, not in
/// the evaluator.
///
/// # Ordering
///
/// Activities must be returned **newest first**. Window descriptions for
/// duration-bounded windows are computed from the first and last element.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch the author's activities of the given scope inside `window`.
    ///
    /// Failures should be reported as [`VigilError::Fetch`](crate::VigilError::Fetch).
    async fn fetch(
        &self,
        author_id: &str,
        scope: LookAt,
        window: &ActivityWindow,
    ) -> VigilResult<Vec<Activity>>;
}
