//! The Login.gov sign-in workflow
//!
//! Selectors encode the staging site's DOM contract: a "Sign In" text
//! control on the landing page, the Login.gov credential form, the
//! one-time-code input, and the post-login account dropdown that shows
//! the signed-in email.

use std::time::Duration;

use tracing::{debug, info};

use authflow_common::{totp, Authenticator, Credentials};

use crate::browser::PageSession;
use crate::error::{E2eError, E2eResult};

/// "Sign In" control on the staging landing page
pub const SIGN_IN: &str = "text=Sign In";

/// Login.gov email field
pub const EMAIL_INPUT: &str = r#"input[name="user[email]"]"#;

/// Login.gov password field
pub const PASSWORD_INPUT: &str = r#"input[name="user[password]"]"#;

/// Form submit button (credential form and MFA form alike)
pub const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;

/// One-time-code field on the MFA page
pub const OTP_INPUT: &str = r#"input[autocomplete="one-time-code"]"#;

/// Post-login account dropdown; contains the signed-in email as text
pub const NAV_DROPDOWN: &str = r#"button[data-testid="navDropDownButton"]"#;

/// Default bound for every wait-then-act step
pub const STEP_TIMEOUT: Duration = Duration::from_secs(30);

/// Drive the full flow from the landing page and verify the authenticated
/// state: navigate, then [`complete_login`].
pub async fn perform_login(
    session: &mut PageSession,
    credentials: &Credentials,
    base_url: &str,
    timeout: Duration,
) -> E2eResult<()> {
    info!("Navigating to {}", base_url);
    session.goto(base_url, timeout).await?;
    complete_login(session, credentials, timeout).await
}

/// Sign in through Login.gov starting from the staging landing page.
///
/// Each step is a strict precondition for the next; the first timeout is
/// terminal, with no retry. The one-time code is derived only after the
/// MFA prompt is visible, so it cannot expire to time-step skew before
/// submission.
pub async fn complete_login(
    session: &mut PageSession,
    credentials: &Credentials,
    timeout: Duration,
) -> E2eResult<()> {
    session.wait_for_visible(SIGN_IN, timeout).await?;
    session.click(SIGN_IN, timeout).await?;

    // Redirect to Login.gov
    session.wait_for_visible(EMAIL_INPUT, timeout).await?;
    session.fill(EMAIL_INPUT, &credentials.email, timeout).await?;
    session
        .fill(PASSWORD_INPUT, credentials.password.expose(), timeout)
        .await?;
    session.click(SUBMIT_BUTTON, timeout).await?;

    // The MFA prompt must be visible before the code is derived.
    session.wait_for_visible(OTP_INPUT, timeout).await?;
    let authenticator = Authenticator::new(credentials.mfa_secret.expose())?;
    let code = authenticator.generate()?;
    debug!("Generated a {}-digit one-time code", totp::CODE_DIGITS);
    session.fill(OTP_INPUT, &code, timeout).await?;
    session.click(SUBMIT_BUTTON, timeout).await?;

    // The account dropdown shows the signed-in email once the session is
    // live. Not seeing it is a failed assertion, not a flow timeout.
    session
        .wait_for_text_visible(NAV_DROPDOWN, &credentials.email, timeout)
        .await
        .map_err(|e| match e {
            E2eError::Timeout { timeout_ms, .. } => E2eError::AssertionFailed(format!(
                "expected {} to show {} within {} ms",
                NAV_DROPDOWN, credentials.email, timeout_ms
            )),
            other => other,
        })?;
    info!("Authenticated as {}", credentials.email);

    Ok(())
}
