//! Account API handlers: signup, login, profile, confirmation, reset.
//!
//! ```text
//! POST /api/v1/signup {"displayName":"Ada Lovelace","email":"ada@example.com","password":"analytical1"}
//! POST /api/v1/login {"email":"ada@example.com","password":"analytical1","remember":true}
//! GET  /api/v1/profile
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AuthValidationError, DisplayName, EmailAddress, Error, LoginCredentials, Password,
    ProfileUpdate, Signup, User, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error};

/// Signup request body for `POST /api/v1/signup`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Display name shown to other users.
    pub display_name: String,
    /// Unique email address.
    pub email: String,
    /// Plaintext password; checked against the signup policy.
    pub password: String,
}

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address the account was registered with.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Keep the session beyond the freshness window.
    #[serde(default)]
    pub remember: bool,
}

/// Profile update body for `PUT /api/v1/profile`; omitted fields are unchanged.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// New email address; resets the confirmed flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Token payload for `POST /api/v1/confirm-email`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmEmailRequest {
    /// Token from the emailed confirmation link.
    pub token: String,
}

/// Request body for `POST /api/v1/password-reset`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    /// Address to send the reset link to.
    pub email: String,
}

/// Request body for `POST /api/v1/password-reset/complete`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletePasswordResetRequest {
    /// Token from the emailed reset link.
    pub token: String,
    /// Replacement password; checked against the signup policy.
    pub password: String,
}

/// Profile payload returned by account endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// Stable user identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    /// Display name shown to other users.
    #[schema(example = "Ada Lovelace")]
    pub display_name: String,
    /// Registered email address.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Whether the email address has been confirmed.
    pub email_confirmed: bool,
    /// Account creation time (RFC 3339).
    pub created_at: String,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            display_name: user.display_name().to_string(),
            email: user.email().to_string(),
            email_confirmed: user.email_confirmed(),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

fn map_user_validation_error(err: &UserValidationError) -> Error {
    let field = match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => FieldName::new("id"),
        UserValidationError::EmptyDisplayName
        | UserValidationError::DisplayNameTooShort { .. }
        | UserValidationError::DisplayNameTooLong { .. }
        | UserValidationError::DisplayNameInvalidCharacters => FieldName::new("displayName"),
        UserValidationError::EmptyEmail
        | UserValidationError::EmailTooLong { .. }
        | UserValidationError::InvalidEmail => FieldName::new("email"),
        UserValidationError::EmptyPasswordHash => FieldName::new("password"),
    };
    let code = match err {
        UserValidationError::EmptyId => "empty_id",
        UserValidationError::InvalidId => "invalid_id",
        UserValidationError::EmptyDisplayName => "empty_display_name",
        UserValidationError::DisplayNameTooShort { .. } => "display_name_too_short",
        UserValidationError::DisplayNameTooLong { .. } => "display_name_too_long",
        UserValidationError::DisplayNameInvalidCharacters => "display_name_invalid_characters",
        UserValidationError::EmptyEmail => "empty_email",
        UserValidationError::EmailTooLong { .. } => "email_too_long",
        UserValidationError::InvalidEmail => "invalid_email",
        UserValidationError::EmptyPasswordHash => "empty_password_hash",
    };
    field_error(field, code, err.to_string())
}

fn map_auth_validation_error(err: &AuthValidationError) -> Error {
    match err {
        AuthValidationError::User(user_err) => map_user_validation_error(user_err),
        AuthValidationError::EmptyPassword => {
            field_error(FieldName::new("password"), "empty_password", err.to_string())
        }
        AuthValidationError::PasswordTooShort { .. } => field_error(
            FieldName::new("password"),
            "password_too_short",
            err.to_string(),
        ),
        AuthValidationError::PasswordTooLong { .. } => field_error(
            FieldName::new("password"),
            "password_too_long",
            err.to_string(),
        ),
        AuthValidationError::PasswordMissingLetter => field_error(
            FieldName::new("password"),
            "password_missing_letter",
            err.to_string(),
        ),
        AuthValidationError::PasswordMissingDigit => field_error(
            FieldName::new("password"),
            "password_missing_digit",
            err.to_string(),
        ),
    }
}

/// Create a new account and send its confirmation email.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Confirmation email could not be sent", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let signup = Signup::try_from_parts(&body.display_name, &body.email, &body.password)
        .map_err(|err| map_auth_validation_error(&err))?;
    let user = state.accounts.sign_up(signup).await?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(&user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&body.email, &body.password)
        .map_err(|err| map_auth_validation_error(&err))?;
    let user = state.accounts.authenticate(&credentials).await?;
    session.establish(user.id(), body.remember, state.freshness_window)?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(&user)))
}

/// Destroy the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session destroyed")
    ),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.teardown();
    HttpResponse::NoContent().finish()
}

/// Fetch the caller's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "profile"
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.accounts.profile(&user_id).await?;
    Ok(web::Json(ProfileResponse::from(&user)))
}

/// Update the caller's display name and/or email address.
///
/// Requires a freshly-authenticated session. An email change resets the
/// confirmed flag and sends a new confirmation message.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Session is not fresh", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    session.require_fresh()?;

    let body = payload.into_inner();
    let display_name = body
        .display_name
        .map(DisplayName::new)
        .transpose()
        .map_err(|err| map_user_validation_error(&err))?;
    let email = body
        .email
        .as_deref()
        .map(EmailAddress::new)
        .transpose()
        .map_err(|err| map_user_validation_error(&err))?;

    let user = state
        .accounts
        .update_profile(
            &user_id,
            ProfileUpdate {
                display_name,
                email,
            },
        )
        .await?;
    Ok(web::Json(ProfileResponse::from(&user)))
}

/// Delete the caller's account and everything it authored.
#[utoipa::path(
    delete,
    path = "/api/v1/profile",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Session is not fresh", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "deleteProfile"
)]
#[delete("/profile")]
pub async fn delete_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    session.require_fresh()?;
    state.accounts.delete_account(&user_id).await?;
    session.teardown();
    Ok(HttpResponse::NoContent().finish())
}

/// Redeem an emailed confirmation token.
#[utoipa::path(
    post,
    path = "/api/v1/confirm-email",
    request_body = ConfirmEmailRequest,
    responses(
        (status = 204, description = "Email confirmed"),
        (status = 400, description = "Invalid or expired token", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "confirmEmail",
    security([])
)]
#[post("/confirm-email")]
pub async fn confirm_email(
    state: web::Data<HttpState>,
    payload: web::Json<ConfirmEmailRequest>,
) -> ApiResult<HttpResponse> {
    state.accounts.confirm_email(&payload.token).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Send a fresh confirmation message to the caller's address.
#[utoipa::path(
    post,
    path = "/api/v1/confirm-email/resend",
    responses(
        (status = 204, description = "Confirmation sent"),
        (status = 400, description = "Email already confirmed", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "resendConfirmation"
)]
#[post("/confirm-email/resend")]
pub async fn resend_confirmation(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.accounts.resend_confirmation(&user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Request a password-reset link.
///
/// Always answers 204, whether or not the address has an account.
#[utoipa::path(
    post,
    path = "/api/v1/password-reset",
    request_body = PasswordResetRequest,
    responses(
        (status = 204, description = "Reset link sent if the address is registered"),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/password-reset")]
pub async fn request_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetRequest>,
) -> ApiResult<HttpResponse> {
    let email = EmailAddress::new(&payload.email)
        .map_err(|err| map_user_validation_error(&err))?;
    state.accounts.request_password_reset(&email).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Redeem a reset token and store a new password.
#[utoipa::path(
    post,
    path = "/api/v1/password-reset/complete",
    request_body = CompletePasswordResetRequest,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 400, description = "Invalid token or weak password", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "completePasswordReset",
    security([])
)]
#[post("/password-reset/complete")]
pub async fn complete_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<CompletePasswordResetRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let password =
        Password::new(body.password).map_err(|err| map_auth_validation_error(&err))?;
    state
        .accounts
        .complete_password_reset(&body.token, &password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
