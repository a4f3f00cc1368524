//! In-memory backend for tests and offline demos.
//!
//! [`MockBackend`] implements [`SeatApi`] and [`AuthApi`] over a coach held in
//! memory. It allocates the lowest-numbered free seats, counts calls, and can
//! be told to fail.

use crate::auth::AuthApi;
use crate::seats::{locate, seat_number, SeatCount, ROW_WIDTH};
use crate::session::Session;
use crate::sync::SeatApi;
use async_trait::async_trait;
use railseat_client::{
    ApiError, SeatRowRecord, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Calls received by a [`MockBackend`], per endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `GET /seats`
    pub fetch: usize,
    /// `POST /book_seats`
    pub book: usize,
    /// `POST /reset`
    pub reset: usize,
    /// `POST /auth/signup`
    pub sign_up: usize,
    /// `POST /auth/signin`
    pub sign_in: usize,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<SeatRowRecord>,
    accounts: HashMap<String, String>,
    fetch_error: Option<ApiError>,
    booking_error: Option<ApiError>,
    reset_error: Option<ApiError>,
    calls: CallCounts,
}

/// In-memory booking backend.
#[derive(Debug, Default)]
pub struct MockBackend {
    inner: Mutex<Inner>,
}

impl MockBackend {
    /// Backend serving exactly `rows`.
    #[must_use]
    pub fn new(rows: Vec<SeatRowRecord>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rows,
                ..Inner::default()
            }),
        }
    }

    /// An empty coach of `seats` seats, the last row possibly short.
    #[must_use]
    pub fn coach(seats: u32) -> Self {
        let rows = (1..=seats.div_ceil(ROW_WIDTH))
            .map(|row| {
                let width = (seats - (row - 1) * ROW_WIDTH).min(ROW_WIDTH);
                SeatRowRecord {
                    id: i64::from(row) * 10,
                    seatbit: "0".repeat(width as usize),
                    seatrow: row,
                }
            })
            .collect();
        Self::new(rows)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// Rows as the backend currently holds them.
    #[must_use]
    pub fn rows(&self) -> Vec<SeatRowRecord> {
        self.lock().rows.clone()
    }

    /// Replace one row's bitmap, as if another user had booked.
    pub fn set_row(&self, row_number: u32, seatbit: &str) {
        let mut inner = self.lock();
        if let Some(row) = inner.rows.iter_mut().find(|r| r.seatrow == row_number) {
            row.seatbit = seatbit.to_string();
        }
    }

    /// Make every fetch fail with `error` until cleared with `None`.
    pub fn fail_fetches(&self, error: Option<ApiError>) {
        self.lock().fetch_error = error;
    }

    /// Make the next booking fail with `error`.
    pub fn fail_next_booking(&self, error: ApiError) {
        self.lock().booking_error = Some(error);
    }

    /// Make the next reset fail with `error`.
    pub fn fail_next_reset(&self, error: ApiError) {
        self.lock().reset_error = Some(error);
    }
}

fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::Rejected {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl SeatApi for MockBackend {
    async fn fetch_seats(&self, _session: &Session) -> Result<Vec<SeatRowRecord>, ApiError> {
        let mut inner = self.lock();
        inner.calls.fetch += 1;
        match &inner.fetch_error {
            Some(error) => Err(error.clone()),
            None => Ok(inner.rows.clone()),
        }
    }

    async fn book_seats(&self, _session: &Session, count: SeatCount) -> Result<Vec<u32>, ApiError> {
        let mut inner = self.lock();
        inner.calls.book += 1;
        if let Some(error) = inner.booking_error.take() {
            return Err(error);
        }

        let mut free: Vec<u32> = inner
            .rows
            .iter()
            .flat_map(|row| {
                row.seatbit
                    .chars()
                    .zip(0..)
                    .filter(|(bit, _)| *bit == '0')
                    .map(move |(_, index)| seat_number(row.seatrow, index))
            })
            .collect();
        free.sort_unstable();
        if free.len() < count.get() as usize {
            return Err(rejected(400, "Not enough seats available"));
        }
        free.truncate(count.get() as usize);

        for number in &free {
            if let Some((row_number, index)) = locate(*number) {
                if let Some(row) = inner.rows.iter_mut().find(|r| r.seatrow == row_number) {
                    let mut bits: Vec<char> = row.seatbit.chars().collect();
                    if let Some(bit) = bits.get_mut(index as usize) {
                        *bit = '1';
                    }
                    row.seatbit = bits.into_iter().collect();
                }
            }
        }

        Ok(free)
    }

    async fn reset_seats(&self, _session: &Session) -> Result<(), ApiError> {
        let mut inner = self.lock();
        inner.calls.reset += 1;
        if let Some(error) = inner.reset_error.take() {
            return Err(error);
        }
        for row in &mut inner.rows {
            row.seatbit = "0".repeat(row.seatbit.len());
        }
        Ok(())
    }
}

#[async_trait]
impl AuthApi for MockBackend {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, ApiError> {
        let mut inner = self.lock();
        inner.calls.sign_up += 1;
        if inner.accounts.contains_key(&request.email) {
            return Err(rejected(409, "User already exists"));
        }
        inner
            .accounts
            .insert(request.email.clone(), request.password.clone());

        Ok(SignUpResponse {
            token: format!("mock-token-{}", request.email),
            message: "User created successfully".to_string(),
        })
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, ApiError> {
        let mut inner = self.lock();
        inner.calls.sign_in += 1;
        match inner.accounts.get(&request.email) {
            Some(password) if *password == request.password => Ok(SignInResponse {
                token: format!("mock-token-{}", request.email),
            }),
            _ => Err(rejected(401, "Invalid credentials")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::session::AuthToken;

    fn session() -> Session {
        Session::new(AuthToken::new("t").unwrap())
    }

    #[test]
    fn test_coach_has_short_last_row() {
        let rows = MockBackend::coach(80).rows();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[11].seatbit, "000");
        assert_eq!(rows[0].seatbit, "0000000");
    }

    #[tokio::test]
    async fn test_booking_takes_lowest_free_seats() {
        let backend = MockBackend::coach(14);
        backend.set_row(1, "1110000");

        let seats = backend
            .book_seats(&session(), SeatCount::new(3).unwrap())
            .await
            .unwrap();

        assert_eq!(seats, vec![4, 5, 6]);
        assert_eq!(backend.rows()[0].seatbit, "1111110");
    }

    #[tokio::test]
    async fn test_booking_more_than_free_is_rejected() {
        let backend = MockBackend::coach(3);

        let error = backend
            .book_seats(&session(), SeatCount::new(4).unwrap())
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Not enough seats available");
        assert_eq!(backend.rows()[0].seatbit, "000");
    }
}
