//! Actions for the seat map view.

use crate::seats::{SeatCount, SeatMapSnapshot};

/// Everything that can happen to a seat map view.
///
/// User intents (`Mount`, `BookSeats`, `ResetSeats`, `Teardown`) come from
/// the view; the rest are produced by effects and fed back by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatMapAction {
    /// The view became active: fetch now and start the poll timer.
    Mount,

    /// Poll timer fired.
    Tick,

    /// Fetch outside the timer.
    Refresh,

    /// A fetch succeeded and decoded.
    SeatsLoaded {
        /// Sequence number the fetch was issued with
        seq: u64,
        /// Decoded seat map
        snapshot: SeatMapSnapshot,
    },

    /// A fetch failed (network, rejection, or undecodable payload).
    RefreshFailed {
        /// Sequence number the fetch was issued with
        seq: u64,
        /// Error description for the log
        error: String,
    },

    /// Book seats.
    BookSeats {
        /// Validated count
        count: SeatCount,
    },

    /// The backend assigned seats.
    BookingSucceeded {
        /// Seat numbers in server order
        seats: Vec<u32>,
    },

    /// The backend refused the booking or could not be reached.
    BookingFailed {
        /// Message for the booking error channel
        message: String,
    },

    /// Release every booking.
    ResetSeats,

    /// The reset went through.
    ResetSucceeded,

    /// The reset was refused or could not be sent.
    ResetFailed {
        /// Message for the reset error channel
        message: String,
    },

    /// The view is going away: stop polling, ignore late results.
    Teardown,
}

impl SeatMapAction {
    /// Whether this is the outcome of the fetch numbered `seq` or a later one.
    #[must_use]
    pub const fn resolves_refresh(&self, seq: u64) -> bool {
        match self {
            Self::SeatsLoaded { seq: got, .. } | Self::RefreshFailed { seq: got, .. } => *got >= seq,
            _ => false,
        }
    }

    /// Whether this is the outcome of a booking.
    #[must_use]
    pub const fn is_booking_outcome(&self) -> bool {
        matches!(self, Self::BookingSucceeded { .. } | Self::BookingFailed { .. })
    }

    /// Whether this is the outcome of a reset.
    #[must_use]
    pub const fn is_reset_outcome(&self) -> bool {
        matches!(self, Self::ResetSucceeded | Self::ResetFailed { .. })
    }
}
