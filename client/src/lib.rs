//! # Booking Backend Client
//!
//! Rust client for the train-seat booking backend: sign-up, sign-in, seat
//! map, booking, and reset.
//!
//! ## Example
//!
//! ```no_run
//! use railseat_client::{BookingClient, SignInRequest, DEFAULT_API_URL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BookingClient::new(DEFAULT_API_URL);
//!
//!     let signed_in = client
//!         .sign_in(&SignInRequest {
//!             email: "ada@example.com".to_string(),
//!             password: "secret".to_string(),
//!         })
//!         .await?;
//!
//!     let rows = client.seats(&signed_in.token).await?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```
//!
//! Non-2xx responses become [`ApiError::Rejected`] carrying the backend's
//! `error` string verbatim, or a per-operation fallback message.

pub mod client;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use client::{BookingClient, DEFAULT_API_URL};
pub use error::ApiError;
pub use types::{
    BookSeatsRequest, BookSeatsResponse, ErrorBody, SeatRowRecord, SignInRequest, SignInResponse,
    SignUpRequest, SignUpResponse,
};
