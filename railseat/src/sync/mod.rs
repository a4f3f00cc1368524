//! Seat map synchronization.
//!
//! Keeps a local, periodically refreshed copy of the coach's seat map and
//! mediates booking and reset requests.
//!
//! # Architecture
//!
//! ```text
//! SeatMapView::mount ─→ Mount ─→ fetch + Delay(Tick) [cancellable]
//!                                  │          │
//!            SeatsLoaded{seq} ←────┘          └─→ Tick ─→ fetch + Delay(Tick)
//!            RefreshFailed{seq}
//!
//! BookSeats ─→ POST /book_seats ─→ BookingSucceeded ─→ fetch
//!                               └→ BookingFailed   (booking channel)
//! ResetSeats ─→ POST /reset ─→ ResetSucceeded ─→ fetch
//!                          └→ ResetFailed       (reset channel)
//!
//! Teardown ─→ Cancel(poll timer), store closed
//! ```
//!
//! Every fetch carries a sequence number and only a newer snapshot replaces
//! the held one, so a periodic fetch and a post-booking fetch may complete
//! in either order. A failed fetch leaves the held snapshot untouched.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod types;
pub mod view;

pub use actions::SeatMapAction;
pub use environment::{SeatApi, SeatMapEnvironment, DEFAULT_POLL_INTERVAL};
pub use reducer::{SeatMapReducer, POLL_TIMER};
pub use types::{BookingState, Lifecycle, RefreshTracker, SeatMapState, SeatMapStatus};
pub use view::{MountError, SeatMapStore, SeatMapView, SyncOptions, ViewError};
