//! Booking backend client implementation

use crate::{
    error::ApiError,
    types::{
        BookSeatsRequest, BookSeatsResponse, ErrorBody, SeatRowRecord, SignInRequest,
        SignInResponse, SignUpRequest, SignUpResponse,
    },
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend the original front-end talks to
pub const DEFAULT_API_URL: &str = "https://booking-backend-9om1.onrender.com";

/// Fallback messages used when a rejection carries no `error` field
mod fallback {
    pub const SIGN_UP: &str = "Signup failed";
    pub const SIGN_IN: &str = "Signin failed";
    pub const FETCH_SEATS: &str = "Failed to fetch seats";
    pub const BOOK_SEATS: &str = "Failed to book seats";
    pub const RESET: &str = "Reset failed";
}

/// Booking backend client
#[derive(Clone, Debug)]
pub struct BookingClient {
    client: Client,
    api_url: String,
}

impl BookingClient {
    /// Create a client for the backend at `api_url`
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), api_url)
    }

    /// Create a client whose requests time out after `timeout`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn with_timeout(api_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self::with_http_client(client, api_url))
    }

    /// Create a client around an existing `reqwest::Client`
    #[must_use]
    pub fn with_http_client(client: Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Register a new account
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}/auth/signup", self.api_url))
            .json(request)
            .send()
            .await
            .map_err(network)?;

        decode(response, fallback::SIGN_UP).await
    }

    /// Sign in to an existing account
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}/auth/signin", self.api_url))
            .json(request)
            .send()
            .await
            .map_err(network)?;

        decode(response, fallback::SIGN_IN).await
    }

    /// Fetch every seat row
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn seats(&self, token: &str) -> Result<Vec<SeatRowRecord>, ApiError> {
        let response = self
            .client
            .get(format!("{}/seats", self.api_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(network)?;

        decode(response, fallback::FETCH_SEATS).await
    }

    /// Ask the backend to book `count` seats
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn book_seats(&self, token: &str, count: u32) -> Result<Vec<u32>, ApiError> {
        let response = self
            .client
            .post(format!("{}/book_seats", self.api_url))
            .bearer_auth(token)
            .json(&BookSeatsRequest { book_seats: count })
            .send()
            .await
            .map_err(network)?;

        let body: BookSeatsResponse = decode(response, fallback::BOOK_SEATS).await?;
        Ok(body.booked_seats)
    }

    /// Release every booking
    ///
    /// # Errors
    ///
    /// Returns errors for network failures or rejections
    pub async fn reset(&self, token: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}/reset", self.api_url))
            .bearer_auth(token)
            .header("content-type", "application/json")
            .send()
            .await
            .map_err(network)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response, fallback::RESET).await)
        }
    }
}

fn network(error: reqwest::Error) -> ApiError {
    ApiError::Network(error.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(rejection(response, fallback).await);
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Build a rejection from a non-2xx response
///
/// A body that is not JSON, or has no `error` field, gets the fallback message.
async fn rejection(response: Response, fallback: &str) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    tracing::debug!(status, %message, "Backend rejected request");
    ApiError::Rejected { status, message }
}
