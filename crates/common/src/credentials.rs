//! Account credentials sourced from the environment
//!
//! All three values are required; loading stops at the first variable that
//! is unset or blank. Password and MFA secret are wrapped in newtypes whose
//! `Debug` output is redacted, so credentials never leak through logging.

use std::env;
use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};

/// Account email for the staging login
pub const LOGIN_EMAIL_VAR: &str = "LOGIN_EMAIL";

/// Account password for the staging login
pub const LOGIN_PASSWORD_VAR: &str = "LOGIN_PASSWORD";

/// Shared base32 TOTP secret enrolled with Login.gov
pub const LOGIN_MFA_KEY_VAR: &str = "LOGIN_MFA_KEY";

/// Read a required environment variable, rejecting unset and blank values.
pub fn require_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(Error::InvalidConfig(format!("{name} is empty"))),
        Err(_) => Err(Error::InvalidConfig(format!("{name} is not set"))),
    }
}

/// Account password. Redacted in debug output.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The underlying value, for filling the login form.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Shared TOTP secret. Redacted in debug output.
#[derive(Clone)]
pub struct MfaSecret(String);

impl MfaSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The underlying base32 value, for deriving one-time codes.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MfaSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MfaSecret(<redacted>)")
    }
}

/// Login inputs for one staging account.
///
/// Constant for the process lifetime and never persisted anywhere.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: Password,
    pub mfa_secret: MfaSecret,
}

impl Credentials {
    /// Load from `LOGIN_EMAIL` / `LOGIN_PASSWORD` / `LOGIN_MFA_KEY`,
    /// failing on the first missing or blank value.
    pub fn from_env() -> Result<Self> {
        let email = require_env(LOGIN_EMAIL_VAR)?;
        let password = Password::new(require_env(LOGIN_PASSWORD_VAR)?);
        let mfa_secret = MfaSecret::new(require_env(LOGIN_MFA_KEY_VAR)?);

        debug!("Loaded credentials for {}", email);

        Ok(Self {
            email,
            password,
            mfa_secret,
        })
    }
}
