//! Wire types for the booking backend
//!
//! Field names follow the backend's JSON exactly (`firstName`, `seatbit`,
//! `bookSeats`); domain decoding happens in the `railseat` crate.

use serde::{Deserialize, Serialize};

/// Body of `POST /auth/signup`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

/// Success body of `POST /auth/signup`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignUpResponse {
    /// Bearer token for the new account
    pub token: String,
    /// Greeting shown after registration
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /auth/signin`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignInRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// Success body of `POST /auth/signin`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignInResponse {
    /// Bearer token
    pub token: String,
}

/// One row as returned by `GET /seats`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatRowRecord {
    /// Server-assigned row id
    pub id: i64,
    /// Occupancy bitmap, `'0'` free and `'1'` booked
    pub seatbit: String,
    /// 1-based row number
    pub seatrow: u32,
}

/// Body of `POST /book_seats`
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookSeatsRequest {
    /// Number of seats to book
    pub book_seats: u32,
}

/// Success body of `POST /book_seats`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookSeatsResponse {
    /// Seat numbers the server assigned, in its order
    pub booked_seats: Vec<u32>,
}

/// Body of any non-2xx response
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human readable reason
    #[serde(default)]
    pub error: Option<String>,
}
