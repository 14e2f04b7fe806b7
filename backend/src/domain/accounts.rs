//! Account service: signup, authentication, profile lifecycle, email
//! confirmation, and password reset.
//!
//! Every effect happens synchronously within the triggering request. There
//! are no retries and no compensation: if the confirmation email fails after
//! a successful insert, the account exists unconfirmed and the request fails.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::domain::forum::ForumService;
use crate::domain::ports::{
    CredentialHasher, Mailer, TokenIssuer, TokenPurpose, TokenRedeemError, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    DisplayName, EmailAddress, Error, LoginCredentials, Password, Signup, User, UserId,
};

/// Settings for the emailed confirmation and reset links.
#[derive(Debug, Clone)]
pub struct AccountPolicy {
    /// Base URL links are built against (no trailing slash).
    pub public_base_url: String,
    /// How long a confirmation link stays valid.
    pub confirmation_max_age: Duration,
    /// How long a password-reset link stays valid.
    pub reset_max_age: Duration,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:8080".to_owned(),
            confirmation_max_age: Duration::from_secs(24 * 60 * 60),
            reset_max_age: Duration::from_secs(60 * 60),
        }
    }
}

/// Requested changes to a profile; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name, if changing.
    pub display_name: Option<DisplayName>,
    /// New email address, if changing. Resets the confirmed flag and
    /// triggers a fresh confirmation message.
    pub email: Option<EmailAddress>,
}

/// Account lifecycle service over the identity store and notifier.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    forum: ForumService,
    hasher: Arc<dyn CredentialHasher>,
    mailer: Arc<dyn Mailer>,
    tokens: Arc<dyn TokenIssuer>,
    policy: AccountPolicy,
}

const BAD_CREDENTIALS: &str = "the email or password you entered is invalid";

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => Error::service_unavailable(message),
        UserRepositoryError::Query { message } => Error::internal(message),
        UserRepositoryError::DuplicateEmail { .. } => duplicate_email_error(),
    }
}

fn duplicate_email_error() -> Error {
    Error::conflict("email is already associated with an account")
        .with_details(json!({ "field": "email", "code": "duplicate_email" }))
}

fn map_redeem_error(error: TokenRedeemError) -> Error {
    let code = match error {
        TokenRedeemError::Invalid => "invalid_token",
        TokenRedeemError::Expired => "expired_token",
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": "token",
        "code": code,
    }))
}

impl AccountService {
    /// Create a new service over the given collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        forum: ForumService,
        hasher: Arc<dyn CredentialHasher>,
        mailer: Arc<dyn Mailer>,
        tokens: Arc<dyn TokenIssuer>,
        policy: AccountPolicy,
    ) -> Self {
        Self {
            users,
            forum,
            hasher,
            mailer,
            tokens,
            policy,
        }
    }

    async fn require_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("account not found"))
    }

    fn hash_password(&self, password: &Password) -> Result<crate::domain::PasswordHash, Error> {
        self.hasher
            .hash(password.as_str())
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn send_confirmation(&self, user: &User) -> Result<(), Error> {
        let token = self
            .tokens
            .issue(TokenPurpose::ConfirmEmail, user.email())
            .map_err(|err| Error::internal(err.to_string()))?;
        #[expect(
            clippy::integer_division,
            clippy::integer_division_remainder_used,
            reason = "whole-hour display value for the email body"
        )]
        let hours = self.policy.confirmation_max_age.as_secs() / 3600;
        let body = format!(
            "Hi {name},\n\n\
             Confirm your email address by following the link below:\n\n\
             {base}/confirm-email?token={token}\n\n\
             The link expires in {hours} hours. If you did not create this \
             account, you can ignore this message.\n",
            name = user.display_name(),
            base = self.policy.public_base_url,
        );
        self.mailer
            .send(user.email(), "Confirm your email address", &body)
            .await
            .map_err(|err| Error::service_unavailable(err.to_string()))
    }

    /// Create an account, returning the stored user.
    ///
    /// Uniqueness is pre-checked for a friendly message, but correctness
    /// rests on the store's duplicate-email error: two racing signups cannot
    /// both insert. A confirmation message is sent before returning.
    pub async fn sign_up(&self, signup: Signup) -> Result<User, Error> {
        if self
            .users
            .find_by_email(signup.email())
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(duplicate_email_error());
        }

        let password_hash = self.hash_password(signup.password())?;
        let user = User::sign_up(
            signup.display_name().clone(),
            signup.email().clone(),
            password_hash,
            Utc::now(),
        );
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), "account created");

        self.send_confirmation(&user).await?;
        Ok(user)
    }

    /// Validate credentials and return the account.
    ///
    /// Unknown email and wrong password produce the same message so the
    /// endpoint cannot be used to enumerate accounts.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(BAD_CREDENTIALS))?;

        if !self
            .hasher
            .verify(credentials.password(), user.password_hash())
        {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }
        Ok(user)
    }

    /// Fetch the caller's own profile.
    pub async fn profile(&self, id: &UserId) -> Result<User, Error> {
        self.require_user(id).await
    }

    /// Apply profile changes.
    ///
    /// An email change resets the confirmed flag and sends a fresh
    /// confirmation message to the new address.
    pub async fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let mut user = self.require_user(id).await?;
        let mut email_changed = false;

        if let Some(display_name) = update.display_name {
            user = user.renamed(display_name);
        }
        if let Some(email) = update.email {
            if &email != user.email() {
                if self
                    .users
                    .find_by_email(&email)
                    .await
                    .map_err(map_user_error)?
                    .is_some()
                {
                    return Err(duplicate_email_error());
                }
                email_changed = true;
            }
            user = user.with_email(email);
        }

        self.users.update(&user).await.map_err(map_user_error)?;
        if email_changed {
            self.send_confirmation(&user).await?;
        }
        Ok(user)
    }

    /// Delete the account and everything it authored.
    ///
    /// Cascades are explicit: the caller's posts (with all comments under
    /// them) and their comments elsewhere go first, then the user record.
    pub async fn delete_account(&self, id: &UserId) -> Result<(), Error> {
        let user = self.require_user(id).await?;
        self.forum.purge_author(user.id()).await?;
        self.users.delete(user.id()).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), "account deleted");
        Ok(())
    }

    /// Send a fresh confirmation message for an unconfirmed account.
    pub async fn resend_confirmation(&self, id: &UserId) -> Result<(), Error> {
        let user = self.require_user(id).await?;
        if user.email_confirmed() {
            return Err(Error::invalid_request("email address is already confirmed"));
        }
        self.send_confirmation(&user).await
    }

    /// Redeem a confirmation token and mark the account confirmed.
    ///
    /// Confirming an already-confirmed account is a no-op rather than an
    /// error so a twice-clicked link does not alarm the user.
    pub async fn confirm_email(&self, token: &str) -> Result<(), Error> {
        let email = self
            .tokens
            .redeem(
                TokenPurpose::ConfirmEmail,
                token,
                self.policy.confirmation_max_age,
            )
            .map_err(map_redeem_error)?;

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(map_stale_token_error)?;

        if user.email_confirmed() {
            return Ok(());
        }
        self.users
            .update(&user.confirmed())
            .await
            .map_err(map_user_error)
    }

    /// Send a password-reset link if the address has an account.
    ///
    /// Always reports success: an unknown address gets no message and no
    /// distinguishable response, avoiding account enumeration.
    pub async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), Error> {
        let Some(user) = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
        else {
            info!("password reset requested for unknown address");
            return Ok(());
        };

        let token = self
            .tokens
            .issue(TokenPurpose::ResetPassword, user.email())
            .map_err(|err| Error::internal(err.to_string()))?;
        #[expect(
            clippy::integer_division,
            clippy::integer_division_remainder_used,
            reason = "whole-minute display value for the email body"
        )]
        let minutes = self.policy.reset_max_age.as_secs() / 60;
        let body = format!(
            "Hi {name},\n\n\
             Reset your password by following the link below:\n\n\
             {base}/reset-password?token={token}\n\n\
             The link expires in {minutes} minutes. If you did not request a \
             reset, you can ignore this message.\n",
            name = user.display_name(),
            base = self.policy.public_base_url,
        );
        self.mailer
            .send(user.email(), "Reset your password", &body)
            .await
            .map_err(|err| Error::service_unavailable(err.to_string()))
    }

    /// Redeem a reset token and store a new credential hash.
    pub async fn complete_password_reset(
        &self,
        token: &str,
        password: &Password,
    ) -> Result<(), Error> {
        let email = self
            .tokens
            .redeem(TokenPurpose::ResetPassword, token, self.policy.reset_max_age)
            .map_err(map_redeem_error)?;

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(map_stale_token_error)?;

        let password_hash = self.hash_password(password)?;
        self.users
            .update(&user.with_password_hash(password_hash))
            .await
            .map_err(map_user_error)
    }
}

/// A genuine token whose account has since vanished or changed address.
fn map_stale_token_error() -> Error {
    map_redeem_error(TokenRedeemError::Invalid)
}
