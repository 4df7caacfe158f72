//! Error types for E2E login verification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Browser driver error: {0}")]
    Browser(String),

    #[error("Timed out after {timeout_ms} ms waiting for: {selector}")]
    Timeout { selector: String, timeout_ms: u64 },

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Scenario spec parse error: {0}")]
    SpecParse(String),

    #[error("Staging site unreachable: {0}")]
    Unreachable(String),

    #[error("TOTP error: {0}")]
    Totp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<authflow_common::Error> for E2eError {
    fn from(err: authflow_common::Error) -> Self {
        match err {
            authflow_common::Error::InvalidConfig(msg) => E2eError::Config(msg),
            authflow_common::Error::Totp(msg) => E2eError::Totp(msg),
            authflow_common::Error::Io(e) => E2eError::Io(e),
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_carries_the_variable_name() {
        let err: E2eError =
            authflow_common::Error::InvalidConfig("LOGIN_MFA_KEY is not set".to_string()).into();
        assert!(matches!(err, E2eError::Config(_)));
        assert!(err.to_string().contains("LOGIN_MFA_KEY"));
    }

    #[test]
    fn timeout_names_selector_and_bound() {
        let err = E2eError::Timeout {
            selector: "text=Sign In".to_string(),
            timeout_ms: 30_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("text=Sign In"));
        assert!(msg.contains("30000"));
    }
}
