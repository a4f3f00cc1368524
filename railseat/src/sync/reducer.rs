//! Reducer for the seat map view.

use crate::seats::{BookingResult, SeatCount, SeatMapSnapshot};
use crate::sync::{Lifecycle, SeatMapAction, SeatMapEnvironment, SeatMapState};
use railseat_core::effect::{Effect, EffectId};
use railseat_core::reducer::Reducer;
use smallvec::{smallvec, SmallVec};

/// Id the poll timer runs under; `Teardown` cancels it.
pub const POLL_TIMER: EffectId = EffectId::new("seat-map-poll");

/// Keeps a seat map view in sync with the backend.
///
/// - `Mount` fetches immediately and arms the poll timer
/// - every `Tick` fetches and re-arms the timer
/// - a successful booking or reset triggers an extra fetch
/// - `Teardown` cancels the timer; results arriving afterwards are dropped
#[derive(Debug, Clone, Copy, Default)]
pub struct SeatMapReducer;

impl SeatMapReducer {
    /// Create a new seat map reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Issue a fetch with the next sequence number.
    fn fetch(state: &mut SeatMapState, env: &SeatMapEnvironment) -> Effect<SeatMapAction> {
        let seq = state.refresh.issue();
        let api = env.api();
        let session = env.session().clone();

        tracing::trace!(seq, "Fetching seat map");
        Effect::Future(Box::pin(async move {
            let action = match api.fetch_seats(&session).await {
                Ok(records) => match SeatMapSnapshot::decode(&records) {
                    Ok(snapshot) => SeatMapAction::SeatsLoaded { seq, snapshot },
                    Err(error) => SeatMapAction::RefreshFailed {
                        seq,
                        error: error.to_string(),
                    },
                },
                Err(error) => SeatMapAction::RefreshFailed {
                    seq,
                    error: error.to_string(),
                },
            };
            Some(action)
        }))
    }

    fn arm_timer(env: &SeatMapEnvironment) -> Effect<SeatMapAction> {
        Effect::Delay {
            duration: env.poll_interval(),
            action: Box::new(SeatMapAction::Tick),
        }
        .cancellable(POLL_TIMER)
    }

    fn book(count: SeatCount, env: &SeatMapEnvironment) -> Effect<SeatMapAction> {
        let api = env.api();
        let session = env.session().clone();

        Effect::Future(Box::pin(async move {
            Some(match api.book_seats(&session, count).await {
                Ok(seats) => SeatMapAction::BookingSucceeded { seats },
                Err(error) => SeatMapAction::BookingFailed {
                    message: error.to_string(),
                },
            })
        }))
    }

    fn reset(env: &SeatMapEnvironment) -> Effect<SeatMapAction> {
        let api = env.api();
        let session = env.session().clone();

        Effect::Future(Box::pin(async move {
            Some(match api.reset_seats(&session).await {
                Ok(()) => SeatMapAction::ResetSucceeded,
                Err(error) => SeatMapAction::ResetFailed {
                    message: error.to_string(),
                },
            })
        }))
    }
}

impl Reducer for SeatMapReducer {
    type State = SeatMapState;
    type Action = SeatMapAction;
    type Environment = SeatMapEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if state.lifecycle == Lifecycle::TornDown {
            tracing::debug!(?action, "Ignoring action after teardown");
            return smallvec![Effect::None];
        }

        match action {
            SeatMapAction::Mount => {
                if state.lifecycle == Lifecycle::Mounted {
                    return smallvec![Effect::None];
                }
                state.lifecycle = Lifecycle::Mounted;
                tracing::info!(poll_interval = ?env.poll_interval(), "Seat map mounted");

                smallvec![Self::fetch(state, env), Self::arm_timer(env)]
            },

            SeatMapAction::Tick => {
                if !state.is_mounted() {
                    return smallvec![Effect::None];
                }
                smallvec![Self::fetch(state, env), Self::arm_timer(env)]
            },

            SeatMapAction::Refresh => {
                if !state.is_mounted() {
                    return smallvec![Effect::None];
                }
                smallvec![Self::fetch(state, env)]
            },

            SeatMapAction::SeatsLoaded { seq, snapshot } => {
                state.refresh.resolved = state.refresh.resolved.max(seq);

                if seq <= state.refresh.applied {
                    tracing::debug!(seq, applied = state.refresh.applied, "Discarding stale seat map");
                    return smallvec![Effect::None];
                }

                tracing::debug!(
                    seq,
                    rows = snapshot.rows().len(),
                    free = snapshot.free_seat_count(),
                    "Seat map refreshed"
                );
                state.refresh.applied = seq;
                state.snapshot = Some(snapshot);
                state.last_refreshed_at = Some(env.clock().now());
                state.last_refresh_error = None;
                smallvec![Effect::None]
            },

            SeatMapAction::RefreshFailed { seq, error } => {
                state.refresh.resolved = state.refresh.resolved.max(seq);

                if seq <= state.refresh.applied {
                    tracing::debug!(seq, %error, "Discarding stale refresh failure");
                    return smallvec![Effect::None];
                }

                tracing::warn!(seq, %error, "Seat map refresh failed, keeping previous snapshot");
                state.last_refresh_error = Some(error);
                smallvec![Effect::None]
            },

            SeatMapAction::BookSeats { count } => {
                if !state.is_mounted() {
                    return smallvec![Effect::None];
                }
                if state.booking.in_flight {
                    tracing::debug!(count = count.get(), "Booking already in flight, ignoring");
                    return smallvec![Effect::None];
                }

                tracing::info!(count = count.get(), "Booking seats");
                state.booking.in_flight = true;
                state.booking.error = None;
                state.booking.result = None;
                smallvec![Self::book(count, env)]
            },

            SeatMapAction::BookingSucceeded { seats } => {
                tracing::info!(?seats, "Seats booked");
                state.booking.in_flight = false;
                state.booking.error = None;
                state.booking.result = Some(BookingResult::new(seats));
                smallvec![Self::fetch(state, env)]
            },

            SeatMapAction::BookingFailed { message } => {
                tracing::info!(%message, "Booking failed");
                state.booking.in_flight = false;
                state.booking.error = Some(message);
                smallvec![Effect::None]
            },

            SeatMapAction::ResetSeats => {
                if !state.is_mounted() {
                    return smallvec![Effect::None];
                }
                tracing::info!("Resetting seats");
                state.reset_error = None;
                smallvec![Self::reset(env)]
            },

            SeatMapAction::ResetSucceeded => smallvec![Self::fetch(state, env)],

            SeatMapAction::ResetFailed { message } => {
                tracing::info!(%message, "Reset failed");
                state.reset_error = Some(message);
                smallvec![Effect::None]
            },

            SeatMapAction::Teardown => {
                tracing::info!("Seat map torn down");
                state.lifecycle = Lifecycle::TornDown;
                state.booking.in_flight = false;
                smallvec![Effect::Cancel(POLL_TIMER)]
            },
        }
    }
}
