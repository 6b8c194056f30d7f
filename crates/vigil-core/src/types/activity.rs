//! Activity types: the posts and comments a rule is evaluated against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A piece of user-authored content.
///
/// Only two shapes exist, so text extraction dispatches with a plain `match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activity {
    /// A submission (link or self post).
    Post(Post),
    /// A comment on a submission.
    Comment(Comment),
}

impl Activity {
    /// Unique identifier of the activity.
    pub fn id(&self) -> &str {
        match self {
            Activity::Post(p) => &p.id,
            Activity::Comment(c) => &c.id,
        }
    }

    /// Identifier of the author.
    pub fn author_id(&self) -> &str {
        match self {
            Activity::Post(p) => &p.author_id,
            Activity::Comment(c) => &c.author_id,
        }
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Activity::Post(p) => p.created_at,
            Activity::Comment(c) => c.created_at,
        }
    }

    /// Whether this activity is a post.
    pub fn is_post(&self) -> bool {
        matches!(self, Activity::Post(_))
    }

    /// Whether this activity is a comment.
    pub fn is_comment(&self) -> bool {
        matches!(self, Activity::Comment(_))
    }
}

impl From<Post> for Activity {
    fn from(post: Post) -> Self {
        Activity::Post(post)
    }
}

impl From<Comment> for Activity {
    fn from(comment: Comment) -> Self {
        Activity::Comment(comment)
    }
}

/// A submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    /// Self posts carry a text body instead of a link.
    #[serde(default)]
    pub is_self_post: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Links pointing outside the hosting site.
    #[serde(default)]
    pub is_external_link: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Post {
    /// Create a link-less post with only a title.
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            created_at,
            title: title.into(),
            is_self_post: false,
            body: None,
            is_external_link: false,
            url: None,
        }
    }

    /// Turn this into a self post with the given body.
    pub fn with_self_text(mut self, body: impl Into<String>) -> Self {
        self.is_self_post = true;
        self.is_external_link = false;
        self.body = Some(body.into());
        self
    }

    /// Turn this into an external link post.
    pub fn with_external_url(mut self, url: impl Into<String>) -> Self {
        self.is_self_post = false;
        self.is_external_link = true;
        self.url = Some(url.into());
        self
    }
}

/// A comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub body: String,
}

impl Comment {
    /// Create a new comment.
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            created_at,
            body: body.into(),
        }
    }
}

/// Which text of a post a pattern is tested against.
///
/// Comments ignore this and are always tested on their body.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TestOnField {
    Title,
    Body,
    Url,
}

impl TestOnField {
    /// Fields tested when a criterion does not say otherwise.
    pub fn defaults() -> Vec<TestOnField> {
        vec![TestOnField::Title, TestOnField::Body]
    }
}

/// Which kinds of activities to pull from an author's history.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LookAt {
    Submissions,
    Comments,
    #[default]
    All,
}

impl LookAt {
    /// Whether an activity falls inside this scope.
    pub fn includes(&self, activity: &Activity) -> bool {
        match self {
            LookAt::Submissions => activity.is_post(),
            LookAt::Comments => activity.is_comment(),
            LookAt::All => true,
        }
    }
}
