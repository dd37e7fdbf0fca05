//! Expo push tokens and delivery messages.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::FieldViolation;

/// Push token is not an Expo token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("push token must look like ExponentPushToken[...] or ExpoPushToken[...]")]
pub struct PushTokenValidationError;

impl FieldViolation for PushTokenValidationError {
    fn field(&self) -> &'static str {
        "token"
    }

    fn reason(&self) -> &'static str {
        "invalid_format"
    }
}

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"^Expo(nent)?PushToken\[[^\]]+\]$")
            .unwrap_or_else(|error| panic!("push token regex failed to compile: {error}"))
    })
}

/// A device push token issued by Expo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PushToken(String);

impl PushToken {
    /// Validate a token.
    ///
    /// # Examples
    /// ```
    /// use homecafe::domain::PushToken;
    ///
    /// assert!(PushToken::new("ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]").is_ok());
    /// assert!(PushToken::new("ExpoPushToken[abc]").is_ok());
    /// assert!(PushToken::new("apns:abc").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, PushTokenValidationError> {
        let value = value.into();
        let value = value.trim();
        if token_regex().is_match(value) {
            Ok(Self(value.to_owned()))
        } else {
            Err(PushTokenValidationError)
        }
    }

    /// The raw token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PushToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PushToken> for String {
    fn from(value: PushToken) -> Self {
        value.0
    }
}

impl TryFrom<String> for PushToken {
    type Error = PushTokenValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One message for one device.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub to: PushToken,
    pub title: String,
    pub body: String,
    pub data: Value,
}

/// Delivery result for a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Accepted by the push service.
    Accepted,
    /// The device no longer accepts pushes; the token should be dropped.
    DeviceNotRegistered,
    /// Rejected for another reason.
    Failed(String),
}

/// Outcome paired with the token it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReceipt {
    pub token: PushToken,
    pub outcome: PushOutcome,
}
