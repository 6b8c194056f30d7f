//! Configuration for regex rules.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{VigilError, VigilResult};
use crate::types::{ActivityWindow, LookAt};

/// How the results of several criteria combine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum JoinOperator {
    /// Every criterion must trigger.
    And,
    /// Any criterion triggering is enough.
    #[default]
    Or,
}

/// One pattern with its thresholds.
///
/// Field names are camelCase on the wire. Omitting `activityMatchThreshold`
/// keeps its default (`"> 0"`); setting it to `null` disables it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionConfig {
    /// Descriptive name used in logging and summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Regular expression, without surrounding slashes.
    pub regex: String,
    /// Regex flags (`i`, `m`, `s`, `x`, `u`, `g`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_flags: Option<String>,
    /// Which post fields to test. Comments are always tested on their body.
    #[serde(default = "default_test_on")]
    pub test_on: Vec<String>,
    /// Which activities to pull from history when `window` is set.
    #[serde(default)]
    pub look_at: LookAt,
    /// Matches needed in one activity for it to count as matched.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: String,
    /// Matched activities needed to trigger; may be a percentage of the
    /// history window.
    #[serde(default = "default_activity_match_threshold")]
    pub activity_match_threshold: Option<String>,
    /// Matches needed across the focal activity and its history to trigger.
    #[serde(default)]
    pub total_match_threshold: Option<String>,
    /// Author history to consider in addition to the focal activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<ActivityWindow>,
}

fn default_test_on() -> Vec<String> {
    vec!["title".to_string(), "body".to_string()]
}

fn default_match_threshold() -> String {
    "> 0".to_string()
}

fn default_activity_match_threshold() -> Option<String> {
    Some("> 0".to_string())
}

impl CriterionConfig {
    /// Create a criterion with default thresholds.
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            name: None,
            regex: regex.into(),
            regex_flags: None,
            test_on: default_test_on(),
            look_at: LookAt::default(),
            match_threshold: default_match_threshold(),
            activity_match_threshold: default_activity_match_threshold(),
            total_match_threshold: None,
            window: None,
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the regex flags.
    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.regex_flags = Some(flags.into());
        self
    }

    /// Set the tested post fields.
    pub fn with_test_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_on = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the history scope.
    pub fn with_look_at(mut self, look_at: LookAt) -> Self {
        self.look_at = look_at;
        self
    }

    /// Set the per-activity match threshold.
    pub fn with_match_threshold(mut self, threshold: impl Into<String>) -> Self {
        self.match_threshold = threshold.into();
        self
    }

    /// Set or disable (`None`) the matched-activity threshold.
    pub fn with_activity_match_threshold(mut self, threshold: Option<&str>) -> Self {
        self.activity_match_threshold = threshold.map(String::from);
        self
    }

    /// Set or disable (`None`) the total match threshold.
    pub fn with_total_match_threshold(mut self, threshold: Option<&str>) -> Self {
        self.total_match_threshold = threshold.map(String::from);
        self
    }

    /// Set the history window.
    pub fn with_window(mut self, window: ActivityWindow) -> Self {
        self.window = Some(window);
        self
    }
}

/// A regex rule: criteria plus the join between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rule name, used in logging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Criteria, evaluated in order.
    pub criteria: Vec<CriterionConfig>,
    /// Join between criteria.
    #[serde(default)]
    pub condition: JoinOperator,
}

impl RuleConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> VigilResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| VigilError::Configuration(e.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| VigilError::Configuration(e.to_string()))
            }
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| VigilError::Configuration(e.to_string()))
            }
            _ => Err(VigilError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> RuleConfigBuilder {
        RuleConfigBuilder::default()
    }
}

/// Builder for RuleConfig.
#[derive(Default)]
pub struct RuleConfigBuilder {
    name: Option<String>,
    criteria: Vec<CriterionConfig>,
    condition: JoinOperator,
}

impl RuleConfigBuilder {
    /// Set the rule name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a criterion.
    pub fn criterion(mut self, criterion: CriterionConfig) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Set the join between criteria.
    pub fn condition(mut self, condition: JoinOperator) -> Self {
        self.condition = condition;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> RuleConfig {
        RuleConfig {
            name: self.name,
            criteria: self.criteria,
            condition: self.condition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_criterion_defaults_from_json() {
        let c: CriterionConfig = serde_json::from_str(r#"{"regex": "spam"}"#).unwrap();
        assert_eq!(c.test_on, vec!["title", "body"]);
        assert_eq!(c.look_at, LookAt::All);
        assert_eq!(c.match_threshold, "> 0");
        assert_eq!(c.activity_match_threshold.as_deref(), Some("> 0"));
        assert!(c.total_match_threshold.is_none());
        assert!(c.window.is_none());
    }

    #[test]
    fn test_null_disables_activity_threshold() {
        let c: CriterionConfig = serde_json::from_str(
            r#"{"regex": "spam", "activityMatchThreshold": null, "totalMatchThreshold": "> 3", "window": "7 days", "lookAt": "comments"}"#,
        )
        .unwrap();
        assert!(c.activity_match_threshold.is_none());
        assert_eq!(c.total_match_threshold.as_deref(), Some("> 3"));
        assert_eq!(c.look_at, LookAt::Comments);
        assert!(matches!(c.window, Some(ActivityWindow::Duration(_))));
    }

    #[test]
    fn test_rule_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "condition: AND\ncriteria:\n  - name: links\n    regex: 'example\\.com'\n    testOn: [URL, title]\n    window: 25\n"
        )
        .unwrap();

        let config = RuleConfig::from_file(file.path()).unwrap();
        assert_eq!(config.condition, JoinOperator::And);
        assert_eq!(config.criteria.len(), 1);
        assert_eq!(config.criteria[0].test_on, vec!["URL", "title"]);
        assert_eq!(config.criteria[0].window, Some(ActivityWindow::Count(25)));
    }

    #[test]
    fn test_rule_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[[criteria]]\nregex = \"spam\"\nmatchThreshold = \"> 1\"\n"
        )
        .unwrap();

        let config = RuleConfig::from_file(file.path()).unwrap();
        assert_eq!(config.condition, JoinOperator::Or);
        assert_eq!(config.criteria[0].match_threshold, "> 1");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = RuleConfig::from_file(file.path()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_builder() {
        let config = RuleConfig::builder()
            .name("spam")
            .criterion(CriterionConfig::new("buy now").with_flags("i"))
            .condition(JoinOperator::And)
            .build();
        assert_eq!(config.name.as_deref(), Some("spam"));
        assert_eq!(config.criteria[0].regex_flags.as_deref(), Some("i"));
        assert_eq!(config.condition, JoinOperator::And);
    }
}
