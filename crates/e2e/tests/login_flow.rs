//! Single assertion-style login verification against live staging.
//!
//! Run with:
//! cargo test -p authflow-e2e --test login_flow -- --ignored --nocapture
//!
//! Requires LOGIN_EMAIL, LOGIN_PASSWORD, LOGIN_MFA_KEY and STAGING_BASE_URL
//! in the environment, plus a local Playwright install.

use authflow_e2e::browser::PageSession;
use authflow_e2e::config::{E2eConfig, RunnerConfig};
use authflow_e2e::login;

#[tokio::test]
#[ignore = "requires staging credentials and a Playwright install"]
async fn login_gov_authentication_with_mfa() {
    let env = E2eConfig::from_env().expect("required environment variables");
    let config = RunnerConfig::default();

    let mut session = PageSession::launch(&config.browser)
        .await
        .expect("playwright sidecar");

    let outcome = login::perform_login(
        &mut session,
        &env.credentials,
        &env.base_url,
        login::STEP_TIMEOUT,
    )
    .await;

    session.close().await.expect("session close");
    outcome.expect("login flow reaches the authenticated state");
}
