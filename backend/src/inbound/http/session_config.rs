//! Session cookie configuration.
//!
//! Centralises the environment-driven session toggles so the server
//! bootstrap validates them once and tests can drive every branch through
//! an injected environment. Key material arrives either inline via
//! `SESSION_KEY` or from a file named by `SESSION_KEY_FILE`; the inline
//! form wins when both are set.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

const SESSION_KEY_ENV: &str = "SESSION_KEY";
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";

const SESSION_KEY_MIN_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Strictness the session toggles are validated under.
///
/// Debug builds tolerate missing toggles with warnings; release builds
/// require explicit, valid values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
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

    /// Debug builds log `error` and continue with `fallback`; release
    /// builds reject the configuration outright.
    fn tolerate<T>(
        self,
        error: SessionConfigError,
        fallback: impl FnOnce() -> T,
    ) -> Result<T, SessionConfigError> {
        if self.is_debug() {
            warn!(reason = %error, "session setting fell back to a debug default");
            Ok(fallback())
        } else {
            Err(error)
        }
    }
}

/// Validated session settings handed to the session middleware.
pub struct SessionSettings {
    /// Key the session cookie is signed with.
    pub key: Key,
    /// Marks the session cookie `Secure` when set.
    pub cookie_secure: bool,
    /// `SameSite` policy for the session cookie.
    pub same_site: SameSite,
}

/// Rejections the session validators can produce.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A toggle release builds insist on was not provided.
    #[error("required environment variable {name} is not set")]
    MissingEnv { name: &'static str },
    /// A toggle is present but cannot be parsed.
    #[error("cannot parse {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Release builds must name a key source.
    #[error("release builds need SESSION_KEY or SESSION_KEY_FILE")]
    MissingKey,
    /// The named key file could not be read.
    #[error("could not read the session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configured key material is too short.
    #[error("session key material too short: need at least {min_len} bytes, got {length}")]
    KeyTooShort { length: usize, min_len: usize },
    /// `SameSite=None` cookies need the `Secure` attribute in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
}

/// Resolve the session settings from the environment under `mode`.
///
/// # Examples
///
/// ```rust
/// use crm_backend::inbound::http::session_config::{
///     BuildMode, SessionConfigError, session_settings_from_env,
/// };
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), SessionConfigError> {
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "SESSION_KEY" => Some("k".repeat(64)),
///     "SESSION_COOKIE_SECURE" => Some("1".to_string()),
///     "SESSION_SAMESITE" => Some("Strict".to_string()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Release)?;
/// assert!(settings.cookie_secure);
/// # Ok(())
/// # }
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = secure_flag(env, mode)?;
    let same_site = same_site_policy(env, mode, cookie_secure)?;
    let key = signing_key(env, mode)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Truncated SHA-256 of the signing key, logged at startup so operators
/// can tell which key is active without exposing the material.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

fn secure_flag<E: Env>(env: &E, mode: BuildMode) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(COOKIE_SECURE_ENV) else {
        let missing = SessionConfigError::MissingEnv {
            name: COOKIE_SECURE_ENV,
        };
        return mode.tolerate(missing, || false);
    };
    match parse_toggle(&value) {
        Some(flag) => Ok(flag),
        None => mode.tolerate(
            SessionConfigError::InvalidEnv {
                name: COOKIE_SECURE_ENV,
                value,
                expected: BOOL_EXPECTED,
            },
            || false,
        ),
    }
}

fn same_site_policy<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_policy = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };

    let Some(value) = env.string(SAMESITE_ENV) else {
        let missing = SessionConfigError::MissingEnv { name: SAMESITE_ENV };
        return mode.tolerate(missing, || default_policy);
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        // Browsers drop SameSite=None cookies that are not Secure.
        "none" => mode.tolerate(SessionConfigError::InsecureSameSiteNone, || SameSite::None),
        _ => mode.tolerate(
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
            || default_policy,
        ),
    }
}

fn signing_key<E: Env>(env: &E, mode: BuildMode) -> Result<Key, SessionConfigError> {
    if let Some(value) = env.string(SESSION_KEY_ENV) {
        let material = Zeroizing::new(value.into_bytes());
        return key_from_material(&material, mode);
    }

    if let Some(path) = env.string(KEY_FILE_ENV) {
        let path = PathBuf::from(path);
        return match std::fs::read(&path) {
            Ok(bytes) => key_from_material(&Zeroizing::new(bytes), mode),
            Err(source) => {
                mode.tolerate(SessionConfigError::KeyRead { path, source }, Key::generate)
            }
        };
    }

    mode.tolerate(SessionConfigError::MissingKey, Key::generate)
}

fn key_from_material(bytes: &[u8], mode: BuildMode) -> Result<Key, SessionConfigError> {
    let length = bytes.len();
    if length < SESSION_KEY_MIN_LEN {
        let short = SessionConfigError::KeyTooShort {
            length,
            min_len: SESSION_KEY_MIN_LEN,
        };
        return mode.tolerate(short, Key::generate);
    }
    Ok(Key::derive_from(bytes))
}

fn parse_toggle(value: &str) -> Option<bool> {
    let normalised = value.to_ascii_lowercase();
    match normalised.as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "session_config_tests.rs"]
mod tests;
