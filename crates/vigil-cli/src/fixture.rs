//! Activity fixtures: a focal activity plus the author's history.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use vigil_core::{Activity, InMemoryHistorySource};

/// Contents of a fixture file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    /// Activity under evaluation.
    pub focal: Activity,
    /// Other activities by the same author, any order.
    #[serde(default)]
    pub history: Vec<Activity>,
    /// Time duration windows are measured from. Defaults to the wall clock.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

impl Fixture {
    /// Load a fixture from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;

        let fixture = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
            _ => bail!("Unsupported fixture format. Use .json or .yaml"),
        };
        Ok(fixture)
    }

    /// Split into the focal activity and a history source over the rest.
    pub fn into_parts(self) -> (Activity, InMemoryHistorySource) {
        let source = InMemoryHistorySource::with_activities(self.history);
        let source = match self.now {
            Some(now) => source.with_reference_time(now),
            None => source,
        };
        (self.focal, source)
    }
}
