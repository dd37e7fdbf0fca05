//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `HOMECAFE_*` environment variables, CLI flags or a
//! config file. Unset values fall back to the defaults below; the session
//! toggles are validated more strictly in release builds.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use url::Url;
use zeroize::Zeroize;

use crate::outbound::push::DEFAULT_EXPO_ENDPOINT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const DEFAULT_PUSH_TIMEOUT_SECS: u64 = 10;
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Start-up configuration for the HomeCafé server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HOMECAFE")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// File holding the cookie signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`.
    pub cookie_secure: Option<bool>,
    /// `SameSite` policy for the session cookie.
    pub same_site: Option<String>,
    /// Generate a throwaway session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session: bool,
    /// Expo push endpoint.
    pub expo_endpoint: Option<String>,
    /// Timeout for one push request, in seconds.
    pub push_timeout_secs: Option<u64>,
    /// Deliver push notifications. When disabled they are only stored.
    pub push_enabled: Option<bool>,
}

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds reject unsafe session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Session cookie settings derived from [`AppSettings`].
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Errors raised while validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("same_site=None requires cookie_secure=true")]
    InsecureSameSiteNone,
    #[error("allow_ephemeral_session must be false in release builds")]
    EphemeralNotAllowed,
}

impl AppSettings {
    /// Return the configured bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidValue`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidValue {
            name: "bind_addr",
            value: raw.to_owned(),
            expected: "host:port",
        })
    }

    /// Return the database URL, treating a blank value as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Return the session key path, falling back to the mounted secret.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH))
    }

    /// Return the Expo endpoint, falling back to the public Expo API.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidValue`] when the URL does not parse.
    pub fn expo_endpoint(&self) -> Result<Url, SettingsError> {
        let raw = self.expo_endpoint.as_deref().unwrap_or(DEFAULT_EXPO_ENDPOINT);
        Url::parse(raw).map_err(|_| SettingsError::InvalidValue {
            name: "expo_endpoint",
            value: raw.to_owned(),
            expected: "absolute URL",
        })
    }

    /// Return the push request timeout.
    pub fn push_timeout(&self) -> Duration {
        Duration::from_secs(self.push_timeout_secs.unwrap_or(DEFAULT_PUSH_TIMEOUT_SECS))
    }

    /// Whether push delivery is enabled; on unless switched off.
    pub fn push_enabled(&self) -> bool {
        self.push_enabled.unwrap_or(true)
    }

    /// Validate the session toggles and load the signing key.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when a toggle is invalid for `mode` or the
    /// key file cannot be used.
    pub fn session(&self, mode: BuildMode) -> Result<SessionSettings, SettingsError> {
        let cookie_secure = self.cookie_secure.unwrap_or(true);
        let same_site = self.same_site_policy(mode, cookie_secure)?;
        if self.allow_ephemeral_session && !mode.is_debug() {
            return Err(SettingsError::EphemeralNotAllowed);
        }
        let key = load_session_key(
            &self.session_key_file(),
            mode,
            self.allow_ephemeral_session,
        )?;
        Ok(SessionSettings {
            key,
            cookie_secure,
            same_site,
        })
    }

    fn same_site_policy(
        &self,
        mode: BuildMode,
        cookie_secure: bool,
    ) -> Result<SameSite, SettingsError> {
        let default_same_site = if mode.is_debug() {
            SameSite::Lax
        } else {
            SameSite::Strict
        };
        let Some(value) = self.same_site.as_deref() else {
            return Ok(default_same_site);
        };
        match value.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if cookie_secure => Ok(SameSite::None),
            "none" if mode.is_debug() => {
                warn!("same_site=None without a secure cookie; browsers may reject it");
                Ok(SameSite::None)
            }
            "none" => Err(SettingsError::InsecureSameSiteNone),
            _ if mode.is_debug() => {
                warn!(value, "invalid same_site, using default");
                Ok(default_same_site)
            }
            _ => Err(SettingsError::InvalidValue {
                name: "same_site",
                value: value.to_owned(),
                expected: SAMESITE_EXPECTED,
            }),
        }
    }
}

fn load_session_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SettingsError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SettingsError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SettingsError::KeyRead {
            path: path.to_path_buf(),
            source: error,
        }),
    }
}
