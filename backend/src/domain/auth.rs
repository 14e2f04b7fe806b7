//! Authentication primitives: password policy, login credentials, signup data.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::user::{DisplayName, EmailAddress, UserValidationError};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 8;
/// Maximum accepted password length.
pub const PASSWORD_MAX: usize = 128;

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// A user field (name or email) failed validation.
    User(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password fell short of the minimum length.
    PasswordTooShort { min: usize },
    /// Password exceeded the maximum length.
    PasswordTooLong { max: usize },
    /// Password policy requires at least one letter.
    PasswordMissingLetter,
    /// Password policy requires at least one digit.
    PasswordMissingDigit,
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
            Self::PasswordMissingLetter => write!(f, "password must contain at least one letter"),
            Self::PasswordMissingDigit => write!(f, "password must contain at least one digit"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl From<UserValidationError> for AuthValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Plaintext password that satisfies the signup policy.
///
/// The inner string is zeroised on drop. Policy applies to new credentials
/// only; login accepts whatever the caller stored originally.
#[derive(Debug, Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a candidate password against the policy.
    pub fn new(password: impl Into<String>) -> Result<Self, AuthValidationError> {
        let password = password.into();
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        let length = password.chars().count();
        if length < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(AuthValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        if !password.chars().any(|c| c.is_alphabetic()) {
            return Err(AuthValidationError::PasswordMissingLetter);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthValidationError::PasswordMissingDigit);
        }
        Ok(Self(Zeroizing::new(password)))
    }

    /// Plaintext for handing to the credential hasher.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is normalised the same way stored accounts are, so lookups match.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada@example.com", "secret1pw").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address to look the account up by.
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated signup payload.
#[derive(Debug, Clone)]
pub struct Signup {
    display_name: DisplayName,
    email: EmailAddress,
    password: Password,
}

impl Signup {
    /// Construct a signup from raw form inputs.
    pub fn try_from_parts(
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, AuthValidationError> {
        Ok(Self {
            display_name: DisplayName::new(display_name)?,
            email: EmailAddress::new(email)?,
            password: Password::new(password)?,
        })
    }

    /// Display name for the new account.
    pub const fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Email address for the new account.
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Policy-checked plaintext password.
    pub const fn password(&self) -> &Password {
        &self.password
    }
}
