//! Journal posts and emoji reactions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;
use super::validation::FieldViolation;

/// Longest accepted post body, in characters.
pub const POST_CONTENT_MAX: usize = 5000;
/// Most images a post may carry.
pub const POST_IMAGES_MAX: usize = 10;
/// Longest accepted reaction, in bytes.
pub const EMOJI_MAX_BYTES: usize = 16;

/// Validation failures for posts and reactions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    #[error("post content must not be empty")]
    EmptyContent,
    #[error("post content must be at most {max} characters")]
    ContentTooLong { max: usize },
    #[error("a post may carry at most {max} images")]
    TooManyImages { max: usize },
    #[error("image url must be an absolute http or https url")]
    InvalidImageUrl,
    #[error("unknown visibility: {0}")]
    UnknownVisibility(String),
    #[error("emoji must not be empty")]
    EmptyEmoji,
    #[error("emoji must be at most {max} bytes without whitespace")]
    InvalidEmoji { max: usize },
}

impl FieldViolation for PostValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::EmptyContent | Self::ContentTooLong { .. } => "content",
            Self::TooManyImages { .. } | Self::InvalidImageUrl => "images",
            Self::UnknownVisibility(_) => "visibility",
            Self::EmptyEmoji | Self::InvalidEmoji { .. } => "emoji",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::EmptyContent | Self::EmptyEmoji => "empty",
            Self::ContentTooLong { .. } => "too_long",
            Self::TooManyImages { .. } => "too_many",
            Self::InvalidImageUrl | Self::InvalidEmoji { .. } => "invalid_format",
            Self::UnknownVisibility(_) => "unknown_value",
        }
    }
}

/// Who may read a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Every signed-in user.
    #[default]
    Public,
    /// The author and their accepted friends.
    Private,
}

impl Visibility {
    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = PostValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(PostValidationError::UnknownVisibility(other.to_owned())),
        }
    }
}

/// A single reaction glyph such as `☕`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Emoji(String);

impl Emoji {
    /// Validate a reaction glyph.
    ///
    /// # Examples
    /// ```
    /// use homecafe::domain::Emoji;
    ///
    /// assert!(Emoji::new("☕").is_ok());
    /// assert!(Emoji::new("").is_err());
    /// assert!(Emoji::new("a b").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, PostValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(PostValidationError::EmptyEmoji);
        }
        if value.len() > EMOJI_MAX_BYTES || value.chars().any(char::is_whitespace) {
            return Err(PostValidationError::InvalidEmoji {
                max: EMOJI_MAX_BYTES,
            });
        }
        Ok(Self(value))
    }

    /// The emoji text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Emoji> for String {
    fn from(value: Emoji) -> Self {
        value.0
    }
}

impl TryFrom<String> for Emoji {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unvalidated post parts.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub id: Uuid,
    pub author_id: UserId,
    pub content: String,
    pub visibility: Visibility,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A journal post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    id: Uuid,
    #[schema(value_type = String)]
    author_id: UserId,
    content: String,
    visibility: Visibility,
    images: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Post {
    /// Validate a draft. Content is trimmed before length checks.
    pub fn new(draft: PostDraft) -> Result<Self, PostValidationError> {
        let content = draft.content.trim().to_owned();
        if content.is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        if content.chars().count() > POST_CONTENT_MAX {
            return Err(PostValidationError::ContentTooLong {
                max: POST_CONTENT_MAX,
            });
        }
        if draft.images.len() > POST_IMAGES_MAX {
            return Err(PostValidationError::TooManyImages {
                max: POST_IMAGES_MAX,
            });
        }
        let images = draft
            .images
            .into_iter()
            .map(|raw| validate_image_url(&raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: draft.id,
            author_id: draft.author_id,
            content,
            visibility: draft.visibility,
            images,
            created_at: draft.created_at,
        })
    }

    /// Post id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Author of the post.
    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Post text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Who may read the post.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Attached image URLs.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// When the post was published.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Position of this post in the feed ordering.
    pub fn feed_key(&self) -> FeedKey {
        FeedKey {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

fn validate_image_url(raw: &str) -> Result<String, PostValidationError> {
    let url = Url::parse(raw.trim()).map_err(|_| PostValidationError::InvalidImageUrl)?;
    if matches!(url.scheme(), "http" | "https") && url.has_host() {
        Ok(url.into())
    } else {
        Err(PostValidationError::InvalidImageUrl)
    }
}

/// Keyset position in the feed: newest first, ties broken by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedKey {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl FeedKey {
    /// Whether a row at `(created_at, id)` sorts strictly after this key in
    /// newest-first order.
    pub fn precedes(&self, created_at: DateTime<Utc>, id: Uuid) -> bool {
        (created_at, id) < (self.created_at, self.id)
    }
}

/// Reaction tally for one emoji on one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReactionCount {
    #[schema(value_type = String, example = "☕")]
    pub emoji: Emoji,
    pub count: u64,
}

/// A post with its reaction tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub reactions: Vec<ReactionCount>,
}

/// Outcome of toggling a reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReactionToggle {
    #[schema(value_type = String)]
    pub emoji: Emoji,
    /// `true` when the reaction was added, `false` when removed.
    pub added: bool,
    /// Reactions with this emoji on the post after the toggle.
    pub count: u64,
}
