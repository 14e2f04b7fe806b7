//! HMAC-signed token issuer.
//!
//! Tokens are `base64url(claims).base64url(mac)` where the claims carry the
//! purpose, recipient email, and issue timestamp, and the MAC is
//! HMAC-SHA256 truncated to 16 bytes. Clients treat tokens as opaque;
//! verification uses the MAC primitive's constant-time comparison.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::domain::EmailAddress;
use crate::domain::ports::{TokenIssueError, TokenIssuer, TokenPurpose, TokenRedeemError};

/// HMAC output length after truncation.
const MAC_LENGTH: usize = 16;

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    purpose: String,
    email: String,
    issued_at: i64,
}

/// Token issuer signing claims with a shared secret.
#[derive(Clone)]
pub struct HmacTokenIssuer {
    key: Vec<u8>,
}

impl HmacTokenIssuer {
    /// Create an issuer from the configured secret.
    ///
    /// Any secret length is accepted; HMAC-SHA256 keys longer than the block
    /// size are hashed down internally.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: secret.to_vec(),
        }
    }

    /// Create an issuer with a random, process-local secret.
    ///
    /// Tokens die with the process; suitable for development runs only.
    pub fn with_random_key() -> Self {
        use rand::RngCore;
        let mut key = vec![0_u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut key);
        Self { key }
    }

    fn mac_for(&self, payload: &[u8]) -> Result<Vec<u8>, TokenIssueError> {
        let mut mac = <Hmac<Sha256>>::new_from_slice(&self.key)
            .map_err(|err| TokenIssueError::signing(err.to_string()))?;
        mac.update(payload);
        let digest = mac.finalize().into_bytes();
        digest
            .get(..MAC_LENGTH)
            .map(|truncated| truncated.to_vec())
            .ok_or_else(|| TokenIssueError::signing("mac output shorter than expected"))
    }

    fn verify_mac(&self, payload: &[u8], mac_bytes: &[u8]) -> Result<(), TokenRedeemError> {
        let mut mac =
            <Hmac<Sha256>>::new_from_slice(&self.key).map_err(|_| TokenRedeemError::Invalid)?;
        mac.update(payload);
        mac.verify_truncated_left(mac_bytes)
            .map_err(|_| TokenRedeemError::Invalid)
    }
}

impl TokenIssuer for HmacTokenIssuer {
    fn issue(
        &self,
        purpose: TokenPurpose,
        email: &EmailAddress,
    ) -> Result<String, TokenIssueError> {
        let claims = TokenClaims {
            purpose: purpose.as_str().to_owned(),
            email: email.as_ref().to_owned(),
            issued_at: Utc::now().timestamp(),
        };
        let payload = serde_json::to_vec(&claims)
            .map_err(|err| TokenIssueError::signing(err.to_string()))?;
        let mac = self.mac_for(&payload)?;
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(&mac)
        ))
    }

    fn redeem(
        &self,
        purpose: TokenPurpose,
        token: &str,
        max_age: Duration,
    ) -> Result<EmailAddress, TokenRedeemError> {
        let (payload_part, mac_part) =
            token.split_once('.').ok_or(TokenRedeemError::Invalid)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| TokenRedeemError::Invalid)?;
        let mac_bytes = URL_SAFE_NO_PAD
            .decode(mac_part)
            .map_err(|_| TokenRedeemError::Invalid)?;
        if mac_bytes.len() != MAC_LENGTH {
            return Err(TokenRedeemError::Invalid);
        }
        self.verify_mac(&payload, &mac_bytes)?;

        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenRedeemError::Invalid)?;
        if claims.purpose != purpose.as_str() {
            return Err(TokenRedeemError::Invalid);
        }

        let now = Utc::now().timestamp();
        if claims.issued_at > now {
            return Err(TokenRedeemError::Invalid);
        }
        let age = now - claims.issued_at;
        let max_age_secs = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        if age > max_age_secs {
            return Err(TokenRedeemError::Expired);
        }

        EmailAddress::new(&claims.email).map_err(|_| TokenRedeemError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    const MAX_AGE: Duration = Duration::from_secs(3600);

    fn issuer() -> HmacTokenIssuer {
        HmacTokenIssuer::new(b"test-token-secret")
    }

    fn email() -> EmailAddress {
        EmailAddress::new("ada@example.com").expect("valid email")
    }

    #[rstest]
    #[case(TokenPurpose::ConfirmEmail)]
    #[case(TokenPurpose::ResetPassword)]
    fn issued_tokens_redeem_for_the_same_purpose(#[case] purpose: TokenPurpose) {
        let issuer = issuer();
        let token = issuer.issue(purpose, &email()).expect("issue token");
        let redeemed = issuer
            .redeem(purpose, &token, MAX_AGE)
            .expect("redeem token");
        assert_eq!(redeemed, email());
    }

    #[test]
    fn purpose_mismatch_is_invalid() {
        let issuer = issuer();
        let token = issuer
            .issue(TokenPurpose::ConfirmEmail, &email())
            .expect("issue token");
        let err = issuer
            .redeem(TokenPurpose::ResetPassword, &token, MAX_AGE)
            .expect_err("wrong purpose must fail");
        assert_eq!(err, TokenRedeemError::Invalid);
    }

    #[test]
    fn tampered_tokens_are_invalid() {
        let issuer = issuer();
        let token = issuer
            .issue(TokenPurpose::ConfirmEmail, &email())
            .expect("issue token");

        let mut tampered: String = token.clone();
        // Flip a character inside the payload part.
        let replacement = if token.starts_with('A') { "B" } else { "A" };
        tampered.replace_range(0..1, replacement);

        let err = issuer
            .redeem(TokenPurpose::ConfirmEmail, &tampered, MAX_AGE)
            .expect_err("tampered token must fail");
        assert_eq!(err, TokenRedeemError::Invalid);
    }

    #[test]
    fn tokens_from_a_different_key_are_invalid() {
        let token = issuer()
            .issue(TokenPurpose::ConfirmEmail, &email())
            .expect("issue token");
        let other = HmacTokenIssuer::with_random_key();
        let err = other
            .redeem(TokenPurpose::ConfirmEmail, &token, MAX_AGE)
            .expect_err("foreign token must fail");
        assert_eq!(err, TokenRedeemError::Invalid);
    }

    #[test]
    fn old_tokens_expire() {
        let issuer = issuer();
        let token = issuer
            .issue(TokenPurpose::ConfirmEmail, &email())
            .expect("issue token");
        let err = issuer
            .redeem(TokenPurpose::ConfirmEmail, &token, Duration::ZERO)
            .err();
        // A zero max-age only passes when issue and redeem land in the same
        // second; both outcomes are acceptable, expiry must not be Invalid.
        if let Some(err) = err {
            assert_eq!(err, TokenRedeemError::Expired);
        }
    }

    #[rstest]
    #[case("")]
    #[case("no-dot-here")]
    #[case("bad.base64!!")]
    fn malformed_tokens_are_invalid(#[case] token: &str) {
        let err = issuer()
            .redeem(TokenPurpose::ConfirmEmail, token, MAX_AGE)
            .expect_err("malformed token must fail");
        assert_eq!(err, TokenRedeemError::Invalid);
    }
}
