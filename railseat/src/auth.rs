//! Sign-up, sign-in, and logout.
//!
//! Each flow validates its form, calls the backend, and stores the returned
//! token through a [`CredentialStore`]. The resulting [`Session`] is what the
//! seat map view is mounted with.

use crate::error::ValidationError;
use crate::session::{AuthToken, CredentialError, CredentialStore, Session};
use async_trait::async_trait;
use railseat_client::{
    ApiError, BookingClient, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
};
use std::sync::Arc;
use thiserror::Error;

/// Unauthenticated endpoints of the backend.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/signup`
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, ApiError>;

    /// `POST /auth/signin`
    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, ApiError>;
}

#[async_trait]
impl AuthApi for BookingClient {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, ApiError> {
        BookingClient::sign_up(self, request).await
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, ApiError> {
        BookingClient::sign_in(self, request).await
    }
}

/// Errors from the auth flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The form was rejected before sending.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend refused or could not be reached; shown verbatim.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// The backend answered with a blank token.
    #[error("Backend returned an empty token")]
    EmptyToken,

    /// The token could not be stored or removed.
    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

/// Sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl SignUpForm {
    /// Check every field is filled in and the email looks like one.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("First name", &self.first_name)?;
        require("Last name", &self.last_name)?;
        validate_email(&self.email)?;
        require("Password", &self.password)
    }

    fn to_request(&self) -> SignUpRequest {
        SignUpRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        }
    }
}

/// Sign-in form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl SignInForm {
    /// Check both fields are filled in and the email looks like one.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        require("Password", &self.password)
    }

    fn to_request(&self) -> SignInRequest {
        SignInRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    require("Email", email)?;
    match email.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// The new session
    pub session: Session,
    /// Greeting from the backend
    pub message: String,
}

/// Runs the auth flows against a backend and a credential store.
#[derive(Clone)]
pub struct Authenticator {
    api: Arc<dyn AuthApi>,
    credentials: Arc<dyn CredentialStore>,
}

impl Authenticator {
    /// Create an authenticator.
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { api, credentials }
    }

    /// Register and store the new token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the form is invalid, the backend refuses, or
    /// the token cannot be stored.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpOutcome, AuthError> {
        form.validate()?;
        let response = self.api.sign_up(&form.to_request()).await?;
        let session = self.store(response.token)?;
        tracing::info!("Signed up");

        Ok(SignUpOutcome {
            session,
            message: response.message,
        })
    }

    /// Sign in and store the token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the form is invalid, the backend refuses, or
    /// the token cannot be stored.
    pub async fn sign_in(&self, form: &SignInForm) -> Result<Session, AuthError> {
        form.validate()?;
        let response = self.api.sign_in(&form.to_request()).await?;
        let session = self.store(response.token)?;
        tracing::info!("Signed in");
        Ok(session)
    }

    /// Forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Credentials`] if the token cannot be removed.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.credentials.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Session from the stored token, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Credentials`] if the store cannot be read.
    pub fn resume(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.credentials.load()?.map(Session::new))
    }

    fn store(&self, token: String) -> Result<Session, AuthError> {
        let token = AuthToken::new(token).ok_or(AuthError::EmptyToken)?;
        self.credentials.save(&token)?;
        Ok(Session::new(token))
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}
