//! AuthFlow Common Library
//!
//! Shared primitives for the AuthFlow E2E workspace: environment-sourced
//! account credentials and TOTP code generation.

pub mod credentials;
pub mod error;
pub mod totp;

// Re-export commonly used types
pub use credentials::{Credentials, MfaSecret, Password};
pub use error::{Error, Result};
pub use totp::Authenticator;

/// AuthFlow version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
