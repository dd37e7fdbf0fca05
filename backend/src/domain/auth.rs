//! Login credentials accepted by the development authenticator.
//!
//! Handlers convert raw payloads through [`LoginCredentials::try_from_parts`]
//! before talking to a [`crate::domain::ports::LoginService`].

use zeroize::Zeroizing;

/// Returned when a login payload is missing a username or password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed, lower-cased and non-empty.
/// - `password` is non-empty and kept verbatim; the buffer is wiped on drop.
///
/// # Examples
/// ```
/// use homecafe::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada ", "password").expect("valid credentials");
/// assert_eq!(creds.username(), "ada");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_lowercase(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised username used for account lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password exactly as provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
