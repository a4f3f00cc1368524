//! A mounted seat map: the store plus request/response helpers.

use crate::seats::{BookingResult, SeatCount, SeatMapSnapshot};
use crate::session::Session;
use crate::sync::{
    SeatApi, SeatMapAction, SeatMapEnvironment, SeatMapReducer, SeatMapState, SeatMapStatus,
};
use railseat_core::environment::{Clock, SystemClock};
use railseat_runtime::{wait_for, Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

/// Store type driving a seat map view.
pub type SeatMapStore = Store<SeatMapState, SeatMapAction, SeatMapEnvironment, SeatMapReducer>;

/// Mounting a view failed.
#[derive(Debug, Error)]
pub enum MountError {
    /// No stored credential; sign in first.
    #[error("Not signed in. Run `railseat signin` first.")]
    AuthRequired,

    /// The store rejected the mount.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A booking or reset requested through the view failed.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A booking is already outstanding.
    #[error("A booking is already in progress")]
    BookingInFlight,

    /// The booking was refused; the message is also in the booking channel.
    #[error("{0}")]
    Booking(String),

    /// The reset was refused; the message is also in the reset channel.
    #[error("{0}")]
    Reset(String),

    /// The store is closed or an outcome never arrived.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Settings for a mounted view.
#[derive(Clone)]
pub struct SyncOptions {
    /// Time between polls
    pub poll_interval: Duration,
    /// Longest wait for a booking, reset, or refresh outcome
    pub wait_timeout: Duration,
    /// Clock used to timestamp refreshes
    pub clock: Arc<dyn Clock>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            poll_interval: super::DEFAULT_POLL_INTERVAL,
            wait_timeout: Duration::from_secs(30),
            clock: Arc::new(SystemClock),
        }
    }
}

impl std::fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOptions")
            .field("poll_interval", &self.poll_interval)
            .field("wait_timeout", &self.wait_timeout)
            .finish_non_exhaustive()
    }
}

/// An active seat map view.
///
/// Polls the backend from [`mount`](Self::mount) until
/// [`teardown`](Self::teardown). Booking and reset return once their outcome
/// and the follow-up refresh have been applied.
pub struct SeatMapView {
    store: SeatMapStore,
    wait_timeout: Duration,
}

impl SeatMapView {
    /// Mount a view for `session`, fetching immediately and starting the poll.
    ///
    /// # Errors
    ///
    /// - [`MountError::AuthRequired`] if `session` is `None`
    /// - [`MountError::Store`] if the store rejects the mount
    pub async fn mount(
        session: Option<Session>,
        api: Arc<dyn SeatApi>,
        options: SyncOptions,
    ) -> Result<Self, MountError> {
        let Some(session) = session else {
            tracing::info!("No session at mount, sign-in required");
            return Err(MountError::AuthRequired);
        };

        let env = SeatMapEnvironment::new(api, session)
            .with_clock(options.clock)
            .with_poll_interval(options.poll_interval);
        let store = Store::new(SeatMapState::new(), SeatMapReducer::new(), env);
        store.send(SeatMapAction::Mount).await?;

        Ok(Self {
            store,
            wait_timeout: options.wait_timeout,
        })
    }

    /// Fetch now and wait until that fetch (or a later one) has been handled.
    ///
    /// A failed fetch is not an error here; it is in
    /// [`SeatMapState::last_refresh_error`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the view is torn down or the fetch outcome
    /// does not arrive in time.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let mut rx = self.store.subscribe_actions();
        self.store.send(SeatMapAction::Refresh).await?;
        self.await_refresh(&mut rx).await
    }

    /// Wait until the first fetch has been handled.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if it does not arrive in time.
    pub async fn loaded(&self) -> Result<(), StoreError> {
        let mut rx = self.store.subscribe_actions();
        if self.store.state(|s| s.refresh.resolved >= 1).await {
            return Ok(());
        }
        wait_for(&mut rx, |a| a.resolves_refresh(1), self.wait_timeout).await?;
        Ok(())
    }

    /// Book `count` seats and wait for the refreshed map.
    ///
    /// # Errors
    ///
    /// - [`ViewError::BookingInFlight`] if a booking is outstanding
    /// - [`ViewError::Booking`] with the backend's message on failure
    /// - [`ViewError::Store`] if the view is torn down or times out
    pub async fn book(&self, count: SeatCount) -> Result<BookingResult, ViewError> {
        if self.store.state(|s| s.booking.in_flight).await {
            return Err(ViewError::BookingInFlight);
        }

        let mut rx = self.store.subscribe_actions();
        self.store.send(SeatMapAction::BookSeats { count }).await?;
        let outcome = wait_for(
            &mut rx,
            SeatMapAction::is_booking_outcome,
            self.wait_timeout,
        )
        .await?;

        match outcome {
            SeatMapAction::BookingSucceeded { seats } => {
                self.await_refresh(&mut rx).await?;
                Ok(BookingResult::new(seats))
            },
            SeatMapAction::BookingFailed { message } => Err(ViewError::Booking(message)),
            _ => Err(ViewError::Store(StoreError::ChannelClosed)),
        }
    }

    /// Reset every booking and wait for the refreshed map.
    ///
    /// # Errors
    ///
    /// - [`ViewError::Reset`] with the backend's message on failure
    /// - [`ViewError::Store`] if the view is torn down or times out
    pub async fn reset(&self) -> Result<(), ViewError> {
        let mut rx = self.store.subscribe_actions();
        self.store.send(SeatMapAction::ResetSeats).await?;
        let outcome = wait_for(&mut rx, SeatMapAction::is_reset_outcome, self.wait_timeout).await?;

        match outcome {
            SeatMapAction::ResetSucceeded => {
                self.await_refresh(&mut rx).await?;
                Ok(())
            },
            SeatMapAction::ResetFailed { message } => Err(ViewError::Reset(message)),
            _ => Err(ViewError::Store(StoreError::ChannelClosed)),
        }
    }

    /// Read the view state through a closure.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&SeatMapState) -> T,
    {
        self.store.state(f).await
    }

    /// Derived status.
    pub async fn status(&self) -> SeatMapStatus {
        self.store.state(SeatMapState::status).await
    }

    /// The held snapshot, if any fetch has succeeded.
    pub async fn snapshot(&self) -> Option<SeatMapSnapshot> {
        self.store.state(|s| s.snapshot.clone()).await
    }

    /// Actions produced by the view's effects, for re-rendering on change.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SeatMapAction> {
        self.store.subscribe_actions()
    }

    /// Cancel polling and discard the results of in-flight requests.
    ///
    /// Idempotent.
    pub async fn teardown(&self) {
        if !self.store.is_open() {
            return;
        }
        if let Err(error) = self.store.send(SeatMapAction::Teardown).await {
            tracing::debug!(%error, "Teardown raced with close");
        }
        self.store.close();
    }

    /// Wait for the most recently issued fetch to be handled.
    async fn await_refresh(
        &self,
        rx: &mut broadcast::Receiver<SeatMapAction>,
    ) -> Result<(), StoreError> {
        let target = self.store.state(|s| s.refresh.issued).await;
        if self.store.state(|s| s.refresh.resolved >= target).await {
            return Ok(());
        }
        wait_for(rx, |a| a.resolves_refresh(target), self.wait_timeout).await?;
        Ok(())
    }
}

impl std::fmt::Debug for SeatMapView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatMapView")
            .field("open", &self.store.is_open())
            .field("wait_timeout", &self.wait_timeout)
            .finish_non_exhaustive()
    }
}
