//! # gopypi-admin runtime
//!
//! Store runtime for the admin console.
//!
//! This crate provides the [`Store`]: the single owner of the console state
//! tree. It runs the reducer for every action under a write lock, so state
//! transitions never interleave, and then executes the effect descriptions
//! the reducer returned.
//!
//! ## Core Components
//!
//! - **Store**: owns state, serializes reducer runs, executes effects
//! - **Effect Executor**: spawns futures and timers, feeds produced actions back
//! - **Cancellation registry**: tracks [`Effect::Cancellable`] tasks by id
//!
//! ## Example
//!
//! ```ignore
//! use gopypi_admin_runtime::Store;
//!
//! let store = Store::new(ConsoleState::default(), ConsoleReducer, environment);
//!
//! store.send(Mutation::Pending(PendingMutation::Add)).await?;
//! let pending = store.state(|s| s.pending.pending).await;
//! ```

use gopypi_admin_core::{effect::Effect, reducer::Reducer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, RwLock};

/// Metric names recorded by the store
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Timeout waiting for a matching action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is observed.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects started by
/// that action to complete. Effects started by actions that those effects
/// feed back are not included.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Mutation::Messages(MessageMutation::Add(msg))).await?;
/// handle.wait_with_timeout(Duration::from_secs(10)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects from this action still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Fires on normal completion, on panic and when a cancellable task is
/// aborted.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Internal: running cancellable tasks keyed by effect id
///
/// Each entry carries a generation number so a task that finishes only
/// removes its own registration, never a newer one under the same id.
type CancellationRegistry = Arc<Mutex<HashMap<String, (u64, tokio::task::AbortHandle)>>>;

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicU64, CancellationRegistry, DecrementGuard, Effect, EffectHandle,
        EffectTracking, HashMap, Mutex, Ordering, PoisonError, Reducer, RwLock, StoreError,
        metrics as names,
    };
    use futures::future::{join_all, BoxFuture, FutureExt};
    use std::time::Duration;
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the reducer runs under the write lock)
    /// 2. Reducer (the only code allowed to write state)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    ///
    /// Cloning a Store is cheap and yields a handle to the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        cancellations: CancellationRegistry,
        generation: Arc<AtomicU64>,
        /// Every action is broadcast here after its reducer ran, so views
        /// can re-read the slices they project.
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
        ///
        /// The action broadcast keeps the 64 most recent actions for slow
        /// observers; use [`Store::with_broadcast_capacity`] to change that.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 64)
        }

        /// Create a new Store with custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                cancellations: Arc::new(Mutex::new(HashMap::new())),
                generation: Arc::new(AtomicU64::new(0)),
                action_broadcast,
            }
        }

        /// The environment the reducer runs with
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Releases the lock and broadcasts the action
        /// 4. Starts the returned effects; they run in spawned tasks
        ///
        /// `send()` returns once effects are started, not finished. Use the
        /// returned [`EffectHandle`] to wait for them.
        ///
        /// # Errors
        ///
        /// Infallible today; the `Result` keeps call sites stable if the
        /// store ever learns to reject actions.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            metrics::counter!(names::ACTIONS_TOTAL).increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action.clone(), &self.environment);
                metrics::histogram!(names::REDUCER_DURATION).record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            // No receivers is fine
            let _ = self.action_broadcast.send(action);

            for effect in effects {
                self.execute_effect(effect, tracking.clone());
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching action to be observed
        ///
        /// Subscribes before sending so an action fed back by an effect
        /// cannot be missed.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action before `timeout`
        /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

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

        /// Subscribe to every action processed by this store
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// The read lock is held only for the duration of `f`.
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Number of cancellable effects currently registered
        #[must_use]
        pub fn running_cancellables(&self) -> usize {
            self.cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Execute an effect with tracking
        ///
        /// - `None`: no-op
        /// - `Future`: spawned; a produced action is sent back to the store
        /// - `Delay`: spawned sleep, then the action is sent
        /// - `Parallel`: each child executed independently
        /// - `Sequential`: spawned; children run one after another
        /// - `Cancellable`: spawned and registered under its id
        /// - `Cancel`: aborts the task registered under the id, if any
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned per effect
        fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!(names::EFFECTS_EXECUTED, "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking.clone());
                    }
                },
                Effect::Cancel(id) => {
                    let removed = self
                        .cancellations
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(id.as_str());
                    if let Some((_, task)) = removed {
                        tracing::debug!(effect_id = %id, "Cancelling effect");
                        metrics::counter!(names::EFFECTS_CANCELLED).increment(1);
                        task.abort();
                    } else {
                        tracing::trace!(effect_id = %id, "Cancel for unknown effect id ignored");
                    }
                },
                Effect::Cancellable { id, effect } => {
                    metrics::counter!(names::EFFECTS_EXECUTED, "type" => "cancellable").increment(1);
                    tracking.increment();

                    let generation = self.generation.fetch_add(1, Ordering::SeqCst);
                    let registry = Arc::clone(&self.cancellations);
                    let store = self.clone();
                    let key = id.as_str().to_string();
                    let task_key = key.clone();

                    // Hold the registry lock across spawn + insert so the task
                    // cannot deregister before it was registered.
                    let mut running = self
                        .cancellations
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);

                    let task = tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking);
                        store.run_inline(*effect).await;

                        let mut running = registry.lock().unwrap_or_else(PoisonError::into_inner);
                        if running.get(&task_key).is_some_and(|(g, _)| *g == generation) {
                            running.remove(&task_key);
                        }
                    });

                    if let Some((_, previous)) =
                        running.insert(key, (generation, task.abort_handle()))
                    {
                        tracing::debug!(effect_id = %id, "Replacing running cancellable effect");
                        previous.abort();
                    }
                },
                effect @ (Effect::Future(_) | Effect::Delay { .. } | Effect::Sequential(_)) => {
                    tracking.increment();
                    let store = self.clone();
                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking);
                        store.run_inline(effect).await;
                    });
                },
            }
        }

        /// Run an effect to completion on the current task
        ///
        /// Used inside spawned tasks so that aborting the task stops the
        /// whole effect tree below it.
        fn run_inline(&self, effect: Effect<A>) -> BoxFuture<'static, ()>
        where
            R: Clone,
            E: Clone,
        {
            let store = self.clone();
            async move {
                match effect {
                    Effect::None => {},
                    Effect::Future(fut) => {
                        metrics::counter!(names::EFFECTS_EXECUTED, "type" => "future").increment(1);
                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            let _ = store.send(action).await;
                        }
                    },
                    Effect::Delay { duration, action } => {
                        metrics::counter!(names::EFFECTS_EXECUTED, "type" => "delay").increment(1);
                        tokio::time::sleep(duration).await;
                        tracing::trace!("Effect::Delay completed, sending action");
                        let _ = store.send(*action).await;
                    },
                    Effect::Parallel(effects) => {
                        join_all(effects.into_iter().map(|e| store.run_inline(e))).await;
                    },
                    Effect::Sequential(effects) => {
                        metrics::counter!(names::EFFECTS_EXECUTED, "type" => "sequential")
                            .increment(1);
                        for effect in effects {
                            store.run_inline(effect).await;
                        }
                    },
                    effect @ (Effect::Cancellable { .. } | Effect::Cancel(_)) => {
                        let (_, tracking) = EffectHandle::new();
                        store.execute_effect(effect, tracking);
                    },
                }
            }
            .boxed()
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                cancellations: Arc::clone(&self.cancellations),
                generation: Arc::clone(&self.generation),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
