//! Pattern matching over activity text.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{VigilError, VigilResult};
use crate::types::{Activity, TestOnField};

/// Maximum number of match samples retained per evaluation.
///
/// Patterns come from users and can match far more than intended; anything
/// past the cap is counted but not stored.
pub const MAX_SAMPLES: usize = 100;

/// Matches found across one or more activities.
///
/// Invariant: `samples.len() <= min(MAX_SAMPLES, total_count)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSet {
    samples: Vec<String>,
    total_count: usize,
}

impl MatchSet {
    /// Create an empty match set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one match.
    pub fn push(&mut self, sample: &str) {
        self.total_count += 1;
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(sample.to_string());
        }
    }

    /// Fold another set into this one, keeping the sample cap.
    pub fn absorb(&mut self, other: MatchSet) {
        self.total_count += other.total_count;
        let room = MAX_SAMPLES.saturating_sub(self.samples.len());
        self.samples.extend(other.samples.into_iter().take(room));
    }

    /// Retained samples, in match order.
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// True number of matches, including those past the cap.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Consume the set, returning the samples.
    pub fn into_samples(self) -> Vec<String> {
        self.samples
    }
}

/// A compiled pattern plus the post fields it is tested on.
///
/// Compiled once per criterion so configuration errors surface before any
/// activity is looked at.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
    test_on: Vec<TestOnField>,
}

impl PatternMatcher {
    /// Compile `pattern` with JavaScript-style `flags`.
    ///
    /// Supported flags: `i`, `m`, `s`, `x`, `u`, and `g` (a no-op since every
    /// match is always collected).
    pub fn new(pattern: &str, flags: Option<&str>, test_on: Vec<TestOnField>) -> VigilResult<Self> {
        let mut builder = RegexBuilder::new(pattern);
        for flag in flags.unwrap_or_default().chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                'u' => builder.unicode(true),
                'g' => &mut builder,
                other => {
                    return Err(VigilError::invalid_pattern(
                        pattern,
                        format!("unsupported flag '{}'", other),
                    ))
                }
            };
        }

        let regex = builder.build().map_err(|e| VigilError::InvalidPatternSyntax {
            pattern: pattern.to_string(),
            message: e.to_string(),
            source: Some(e),
        })?;

        Ok(Self { regex, test_on })
    }

    /// The fields tested on posts, in order.
    pub fn test_on(&self) -> &[TestOnField] {
        &self.test_on
    }

    /// Collect every match in the activity's relevant text.
    pub fn find_matches(&self, activity: &Activity) -> MatchSet {
        let mut set = MatchSet::new();
        for text in self.texts(activity) {
            for m in self.regex.find_iter(text) {
                set.push(m.as_str());
            }
        }
        set
    }

    /// Text fields of `activity` this matcher looks at, in order.
    ///
    /// Posts contribute their title, their body only if they are self posts,
    /// and their URL only if they link externally. Comments always contribute
    /// just their body.
    pub fn texts<'a>(&self, activity: &'a Activity) -> Vec<&'a str> {
        match activity {
            Activity::Comment(comment) => vec![comment.body.as_str()],
            Activity::Post(post) => self
                .test_on
                .iter()
                .filter_map(|field| match field {
                    TestOnField::Title => Some(post.title.as_str()),
                    TestOnField::Body if post.is_self_post => post.body.as_deref(),
                    TestOnField::Url if post.is_external_link => post.url.as_deref(),
                    _ => None,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Comment, Post};
    use chrono::Utc;

    fn all_fields() -> Vec<TestOnField> {
        vec![TestOnField::Title, TestOnField::Body, TestOnField::Url]
    }

    #[test]
    fn test_sample_cap() {
        let matcher = PatternMatcher::new("a", None, TestOnField::defaults()).unwrap();
        let comment: Activity = Comment::new("c1", "u", "a".repeat(250), Utc::now()).into();

        let set = matcher.find_matches(&comment);
        assert_eq!(set.samples().len(), MAX_SAMPLES);
        assert_eq!(set.total_count(), 250);
    }

    #[test]
    fn test_absorb_keeps_cap() {
        let matcher = PatternMatcher::new("x", None, TestOnField::defaults()).unwrap();
        let mut acc = MatchSet::new();
        for i in 0..3 {
            let c: Activity = Comment::new(format!("c{i}"), "u", "x".repeat(60), Utc::now()).into();
            acc.absorb(matcher.find_matches(&c));
        }
        assert_eq!(acc.total_count(), 180);
        assert_eq!(acc.samples().len(), MAX_SAMPLES);
    }

    #[test]
    fn test_post_field_extraction() {
        let matcher = PatternMatcher::new("cat", None, all_fields()).unwrap();
        let now = Utc::now();

        let self_post: Activity = Post::new("p1", "u", "cat", now).with_self_text("cat cat").into();
        assert_eq!(matcher.texts(&self_post), vec!["cat", "cat cat"]);
        assert_eq!(matcher.find_matches(&self_post).total_count(), 3);

        let link_post: Activity = Post::new("p2", "u", "a cat", now)
            .with_external_url("https://cat.example.com")
            .into();
        assert_eq!(matcher.texts(&link_post), vec!["a cat", "https://cat.example.com"]);

        // A body on a non-self post is ignored.
        let mut odd = Post::new("p3", "u", "dog", now);
        odd.body = Some("cat".to_string());
        assert_eq!(matcher.find_matches(&odd.into()).total_count(), 0);
    }

    #[test]
    fn test_field_order_follows_test_on() {
        let matcher =
            PatternMatcher::new(r"\w+", None, vec![TestOnField::Body, TestOnField::Title]).unwrap();
        let post: Activity = Post::new("p1", "u", "title", Utc::now()).with_self_text("body").into();
        assert_eq!(matcher.find_matches(&post).samples(), &["body", "title"]);
    }

    #[test]
    fn test_comment_ignores_test_on() {
        let matcher = PatternMatcher::new("spam", None, vec![TestOnField::Url]).unwrap();
        let comment: Activity = Comment::new("c1", "u", "spam and spam", Utc::now()).into();
        assert_eq!(matcher.find_matches(&comment).total_count(), 2);
    }

    #[test]
    fn test_flags() {
        let comment: Activity = Comment::new("c1", "u", "Spam SPAM spam", Utc::now()).into();

        let plain = PatternMatcher::new("spam", None, TestOnField::defaults()).unwrap();
        assert_eq!(plain.find_matches(&comment).total_count(), 1);

        let insensitive = PatternMatcher::new("spam", Some("gi"), TestOnField::defaults()).unwrap();
        assert_eq!(insensitive.find_matches(&comment).total_count(), 3);
    }

    #[test]
    fn test_invalid_pattern_and_flag() {
        let err = PatternMatcher::new("(unclosed", None, TestOnField::defaults()).unwrap_err();
        assert!(matches!(err, VigilError::InvalidPatternSyntax { .. }));

        let err = PatternMatcher::new("ok", Some("q"), TestOnField::defaults()).unwrap_err();
        assert!(err.to_string().contains("unsupported flag"));
    }
}
