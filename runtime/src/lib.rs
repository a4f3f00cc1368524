//! # Railseat Runtime
//!
//! Runtime implementation for the railseat client.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Cancellation registry**: Aborts effects registered under an [`EffectId`]
//!
//! ## Example
//!
//! ```ignore
//! use railseat_runtime::Store;
//!
//! let store = Store::new(SeatMapState::default(), SeatMapReducer::new(), environment);
//!
//! // Send an action
//! store.send(SeatMapAction::Mount).await?;
//!
//! // Read state
//! let free = store.state(|s| s.free_seat_count()).await;
//! ```

use railseat_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::AbortHandle;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned when `send()` is called after `close()`.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Timeout waiting for a terminal action
        ///
        /// Returned by `wait_for` when the timeout expires before a matching
        /// action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Running tasks registered under a cancellation id
#[derive(Default)]
struct CancellationRegistry {
    tasks: Mutex<HashMap<EffectId, Vec<AbortHandle>>>,
}

impl CancellationRegistry {
    fn register(&self, id: EffectId, handle: AbortHandle) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = tasks.entry(id).or_default();
        entry.retain(|h| !h.is_finished());
        entry.push(handle);
    }

    fn cancel(&self, id: EffectId) -> usize {
        let handles = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .unwrap_or_default();

        let mut aborted = 0;
        for handle in handles {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        aborted
    }

    fn cancel_all(&self) {
        let all: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .flat_map(|(_, handles)| handles)
            .collect();

        for handle in all {
            handle.abort();
        }
    }
}

/// Store module - the runtime for reducers
pub mod store {
    use super::{
        broadcast, Arc, AtomicBool, CancellationRegistry, Duration, Effect, EffectId, Ordering,
        Reducer, RwLock, StoreError,
    };

    /// Number of effect-produced actions buffered for slow observers
    const BROADCAST_CAPACITY: usize = 64;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (client logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    /// 5. Cancellation of effects registered under an id
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        shutdown: Arc<AtomicBool>,
        cancellations: Arc<CancellationRegistry>,
        /// Every action produced by an effect is broadcast here once it has
        /// been reduced, so views can react to refresh and booking outcomes.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (action_broadcast, _) = broadcast::channel(BROADCAST_CAPACITY);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                shutdown: Arc::new(AtomicBool::new(false)),
                cancellations: Arc::new(CancellationRegistry::default()),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer under the state write lock, then starts executing
        /// the returned effects. Returns as soon as the effects are started.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store was closed.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::debug!("Rejected action: store is shutting down");
                metrics::counter!("railseat.store.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("railseat.store.actions").increment(1);

            let effects = {
                let mut state = self.state.write().await;
                self.reducer.reduce(&mut *state, action, &*self.environment)
            };

            tracing::trace!("Reducer returned {} effects", effects.len());
            for effect in effects {
                self.execute_effect(effect, None);
            }

            Ok(())
        }

        /// Subscribe to all actions produced by effects
        ///
        /// Initial actions passed to [`Store::send`] are not broadcast.
        /// Subscribe before sending so an outcome cannot be missed.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Whether the store still accepts actions
        #[must_use]
        pub fn is_open(&self) -> bool {
            !self.shutdown.load(Ordering::Acquire)
        }

        /// Stop accepting actions and abort every cancellable effect
        ///
        /// Effects that were not registered as cancellable keep running; the
        /// actions they produce are rejected and therefore discarded.
        pub fn close(&self) {
            if !self.shutdown.swap(true, Ordering::AcqRel) {
                tracing::debug!("Store closed");
                self.cancellations.cancel_all();
            }
        }

        fn spawn<F>(&self, task: F, cancel_id: Option<EffectId>)
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
            let join = tokio::spawn(task);
            if let Some(id) = cancel_id {
                self.cancellations.register(id, join.abort_handle());
            }
        }

        /// Feed an effect-produced action back into the reducer, then broadcast it
        ///
        /// Observers woken by the broadcast see state with the action applied.
        /// Actions rejected by a closed store are not broadcast.
        async fn feed_back(&self, action: A) {
            match self.send(action.clone()).await {
                Ok(()) => {
                    let _ = self.action_broadcast.send(action);
                },
                Err(error) => {
                    tracing::debug!(%error, "Discarded action produced by effect");
                },
            }
        }

        /// Execute an effect
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Future`: Executes async computation, sends resulting action if `Some`
        /// - `Delay`: Waits for duration, then sends action
        /// - `Cancellable`: Executes the inner effect registered under an id
        /// - `Cancel`: Aborts everything registered under an id
        fn execute_effect(&self, effect: Effect<A>, cancel_id: Option<EffectId>) {
            match effect {
                Effect::None => {
                    metrics::counter!("railseat.store.effects", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("railseat.store.effects", "type" => "future").increment(1);
                    let store = self.clone();
                    self.spawn(
                        async move {
                            if let Some(action) = fut.await {
                                store.feed_back(action).await;
                            }
                        },
                        cancel_id,
                    );
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!("railseat.store.effects", "type" => "delay").increment(1);
                    let store = self.clone();
                    self.spawn(
                        async move {
                            tokio::time::sleep(duration).await;
                            store.feed_back(*action).await;
                        },
                        cancel_id,
                    );
                },
                Effect::Cancellable { id, effect } => {
                    self.execute_effect(*effect, Some(id));
                },
                Effect::Cancel(id) => {
                    let aborted = self.cancellations.cancel(id);
                    tracing::debug!(effect_id = %id, aborted, "Cancelled effects");
                    metrics::counter!("railseat.store.effects", "type" => "cancel").increment(1);
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                shutdown: Arc::clone(&self.shutdown),
                cancellations: Arc::clone(&self.cancellations),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }

    /// Wait on a subscription for the first action matching `predicate`
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: no matching action within `timeout`
    /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
    pub async fn wait_for<A, F>(
        rx: &mut broadcast::Receiver<A>,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        A: Clone,
        F: Fn(&A) -> bool,
    {
        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action observer lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }
}

// Re-export for convenience
pub use store::{wait_for, Store};
