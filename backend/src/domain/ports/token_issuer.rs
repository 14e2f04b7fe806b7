//! Port abstraction for time-limited, single-purpose tokens.
//!
//! Confirmation and reset links carry an opaque token binding an email
//! address to a purpose and an issue time. Redemption failure is a modelled
//! outcome, not a fault: an expired or tampered link is ordinary user input.

use std::time::Duration;

use crate::domain::EmailAddress;

/// What a token authorises when redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    /// Confirm ownership of an email address.
    ConfirmEmail,
    /// Reset the account password.
    ResetPassword,
}

impl TokenPurpose {
    /// Stable identifier embedded in issued tokens.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ConfirmEmail => "confirm-email",
            Self::ResetPassword => "reset-password",
        }
    }
}

/// Errors raised while issuing a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenIssueError {
    /// The token payload could not be encoded or signed.
    #[error("token signing failed: {message}")]
    Signing { message: String },
}

impl TokenIssueError {
    /// Create a signing error with the given message.
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }
}

/// Recoverable redemption outcomes, distinguished from faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRedeemError {
    /// The token is malformed, tampered with, or for a different purpose.
    #[error("the token is invalid")]
    Invalid,
    /// The token was genuine but older than the permitted age.
    #[error("the token has expired")]
    Expired,
}

/// Token issuer port.
pub trait TokenIssuer: Send + Sync {
    /// Issue a token binding `email` to `purpose` at the current time.
    fn issue(
        &self,
        purpose: TokenPurpose,
        email: &EmailAddress,
    ) -> Result<String, TokenIssueError>;

    /// Validate a token and return the email it was issued for.
    ///
    /// Rejects tokens issued for a different purpose or older than `max_age`.
    fn redeem(
        &self,
        purpose: TokenPurpose,
        token: &str,
        max_age: Duration,
    ) -> Result<EmailAddress, TokenRedeemError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn purposes_have_distinct_identifiers() {
        assert_ne!(
            TokenPurpose::ConfirmEmail.as_str(),
            TokenPurpose::ResetPassword.as_str()
        );
    }

    #[test]
    fn redeem_errors_render_user_safe_messages() {
        assert_eq!(TokenRedeemError::Invalid.to_string(), "the token is invalid");
        assert_eq!(
            TokenRedeemError::Expired.to_string(),
            "the token has expired"
        );
    }
}
