//! Dependencies injected into the seat map reducer.

use crate::seats::SeatCount;
use crate::session::Session;
use async_trait::async_trait;
use railseat_client::{ApiError, BookingClient, SeatRowRecord};
use railseat_core::environment::{Clock, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Default time between seat map refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Authenticated seat endpoints of the backend.
///
/// Production uses [`BookingClient`]; tests use
/// [`MockBackend`](crate::mocks::MockBackend).
#[async_trait]
pub trait SeatApi: Send + Sync {
    /// `GET /seats`
    async fn fetch_seats(&self, session: &Session) -> Result<Vec<SeatRowRecord>, ApiError>;

    /// `POST /book_seats`, returning the assigned seat numbers
    async fn book_seats(&self, session: &Session, count: SeatCount) -> Result<Vec<u32>, ApiError>;

    /// `POST /reset`
    async fn reset_seats(&self, session: &Session) -> Result<(), ApiError>;
}

#[async_trait]
impl SeatApi for BookingClient {
    async fn fetch_seats(&self, session: &Session) -> Result<Vec<SeatRowRecord>, ApiError> {
        self.seats(session.token().as_str()).await
    }

    async fn book_seats(&self, session: &Session, count: SeatCount) -> Result<Vec<u32>, ApiError> {
        BookingClient::book_seats(self, session.token().as_str(), count.get()).await
    }

    async fn reset_seats(&self, session: &Session) -> Result<(), ApiError> {
        self.reset(session.token().as_str()).await
    }
}

/// Environment for [`SeatMapReducer`](super::SeatMapReducer).
#[derive(Clone)]
pub struct SeatMapEnvironment {
    api: Arc<dyn SeatApi>,
    session: Session,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
}

impl SeatMapEnvironment {
    /// Environment with the system clock and the default poll interval.
    #[must_use]
    pub fn new(api: Arc<dyn SeatApi>, session: Session) -> Self {
        Self {
            api,
            session,
            clock: Arc::new(SystemClock),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Backend seat endpoints.
    #[must_use]
    pub fn api(&self) -> Arc<dyn SeatApi> {
        Arc::clone(&self.api)
    }

    /// Session used for every call.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Clock used to timestamp refreshes.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Time between polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl std::fmt::Debug for SeatMapEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatMapEnvironment")
            .field("session", &self.session)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
