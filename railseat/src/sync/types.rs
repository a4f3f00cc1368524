//! State for the seat map view.

use crate::seats::{BookingResult, SeatMapSnapshot};
use chrono::{DateTime, Utc};

/// Where the view is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// No session attached yet
    #[default]
    Unmounted,
    /// Polling
    Mounted,
    /// Timer cancelled; late results are ignored
    TornDown,
}

/// Observable status of a view, derived from its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatMapStatus {
    /// Not mounted with a session
    Unauthenticated,
    /// Mounted, no snapshot yet
    Loading,
    /// Snapshot held, nothing outstanding
    Ready,
    /// Snapshot held, a fetch is outstanding
    Refreshing,
    /// A booking request is outstanding
    BookingInFlight,
    /// Terminal
    TornDown,
}

/// Sequence numbers of issued and handled fetches.
///
/// Every fetch gets the next number. A `SeatsLoaded` is applied only if its
/// number is newer than the last applied one, so responses that arrive out
/// of order never roll the map back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshTracker {
    /// Highest sequence number handed to a fetch
    pub issued: u64,
    /// Sequence number of the snapshot currently held
    pub applied: u64,
    /// Highest sequence number whose outcome has been seen
    pub resolved: u64,
}

impl RefreshTracker {
    /// Reserve the next sequence number.
    pub const fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether a fetch is still outstanding.
    #[must_use]
    pub const fn pending(&self) -> bool {
        self.issued > self.resolved
    }
}

/// Booking channel: at most one request in flight, its result or its error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingState {
    /// A booking request is outstanding
    pub in_flight: bool,
    /// Seats assigned by the last successful booking
    pub result: Option<BookingResult>,
    /// Message from the last failed booking
    pub error: Option<String>,
}

/// State of one seat map view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeatMapState {
    /// Lifecycle of the view
    pub lifecycle: Lifecycle,
    /// Last successfully fetched seat map
    pub snapshot: Option<SeatMapSnapshot>,
    /// When `snapshot` was applied
    pub last_refreshed_at: Option<DateTime<Utc>>,
    /// Why the most recent fetch failed; cleared by the next applied one
    pub last_refresh_error: Option<String>,
    /// Fetch ordering
    pub refresh: RefreshTracker,
    /// Booking channel
    pub booking: BookingState,
    /// Reset channel, separate from the booking error
    pub reset_error: Option<String>,
}

impl SeatMapState {
    /// Fresh, unmounted state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Free seats in the held snapshot, 0 before the first fetch.
    #[must_use]
    pub fn free_seat_count(&self) -> usize {
        self.snapshot
            .as_ref()
            .map_or(0, SeatMapSnapshot::free_seat_count)
    }

    /// Whether the view accepts requests.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    /// Derived status.
    #[must_use]
    pub fn status(&self) -> SeatMapStatus {
        match self.lifecycle {
            Lifecycle::Unmounted => SeatMapStatus::Unauthenticated,
            Lifecycle::TornDown => SeatMapStatus::TornDown,
            Lifecycle::Mounted if self.booking.in_flight => SeatMapStatus::BookingInFlight,
            Lifecycle::Mounted if self.snapshot.is_none() => SeatMapStatus::Loading,
            Lifecycle::Mounted if self.refresh.pending() => SeatMapStatus::Refreshing,
            Lifecycle::Mounted => SeatMapStatus::Ready,
        }
    }
}
