//! Runner and environment configuration

use std::path::PathBuf;
use std::time::Duration;

use authflow_common::credentials::require_env;
use authflow_common::Credentials;

use crate::browser::BrowserConfig;
use crate::error::E2eResult;

/// Base URL of the staging site under test
pub const STAGING_BASE_URL_VAR: &str = "STAGING_BASE_URL";

/// Environment-sourced test inputs: who to log in as, and where.
#[derive(Debug, Clone)]
pub struct E2eConfig {
    pub base_url: String,
    pub credentials: Credentials,
}

impl E2eConfig {
    /// Read all four required values, failing before any browser is launched.
    pub fn from_env() -> E2eResult<Self> {
        let base_url = require_env(STAGING_BASE_URL_VAR)?;
        let credentials = Credentials::from_env()?;

        Ok(Self {
            base_url,
            credentials,
        })
    }
}

/// Tunables for how scenarios run. All have defaults; the test binary
/// overrides them from flags.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Browser choice, headless toggle and viewport
    pub browser: BrowserConfig,

    /// Default bound for every wait-then-act step
    pub step_timeout: Duration,

    /// Check the base URL answers HTTP before launching a browser
    pub preflight: bool,

    /// Directory containing YAML scenario specs
    pub specs_dir: PathBuf,

    /// Output directory for results
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            step_timeout: Duration::from_secs(30),
            preflight: true,
            specs_dir: PathBuf::from("scenarios"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}
