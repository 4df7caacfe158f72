//! AuthFlow E2E Framework
//!
//! This crate provides Rust-controlled end-to-end verification that the
//! staging site's Login.gov sign-in flow (email + password + TOTP MFA)
//! completes and the authenticated state becomes visible:
//! - Spawns one persistent Playwright sidecar per scenario
//! - Drives it over newline-delimited JSON on stdin/stdout
//! - Parses declarative YAML scenario specs
//! - Reports per-step timings and writes JSON results
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Runner (Rust)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                             │
//! │    ├── preflight() ............ staging answers HTTP        │
//! │    ├── PageSession::launch() .. node + Playwright sidecar   │
//! │    ├── execute_step()                                       │
//! │    │     ├── navigate_to_site                               │
//! │    │     └── ensure_logged_in                               │
//! │    └── write_results() ........ test-results.json           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  perform_login(session, credentials, base_url)              │
//! │    goto → "Sign In" → email/password → submit               │
//! │    → wait for OTP input → derive TOTP → submit              │
//! │    → account email visible in the nav dropdown              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod login;
pub mod runner;
pub mod scenario;

pub use browser::PageSession;
pub use config::{E2eConfig, RunnerConfig};
pub use error::{E2eError, E2eResult};
pub use runner::ScenarioRunner;
pub use scenario::{ScenarioSpec, ScenarioStep};
