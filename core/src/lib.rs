//! # gopypi-admin core
//!
//! Core traits and types for the admin console state architecture.
//!
//! The console keeps all of its client-side state in a single tree that is
//! only ever written by reducers. Everything that talks to the outside world
//! (timers, navigation, id generation, the clock) is either described as an
//! [`Effect`](effect::Effect) value or injected through an environment trait.
//!
//! ## Core Concepts
//!
//! - **State**: a module's slice of the state tree
//! - **Action**: the input to a reducer (in the console these are mutations)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of work for the runtime, never the work itself
//! - **Environment**: injected dependencies behind traits
//!
//! ## Example
//!
//! ```
//! use gopypi_admin_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct PendingState {
//!     pending: usize,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum PendingAction {
//!     Add,
//!     Remove,
//! }
//!
//! struct PendingReducer;
//!
//! impl Reducer for PendingReducer {
//!     type State = PendingState;
//!     type Action = PendingAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut PendingState,
//!         action: PendingAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<PendingAction>; 4]> {
//!         match action {
//!             PendingAction::Add => state.pending += 1,
//!             PendingAction::Remove => state.pending = state.pending.saturating_sub(1),
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = PendingState::default();
//! PendingReducer.reduce(&mut state, PendingAction::Remove, &());
//! assert_eq!(state.pending, 0);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

pub use effect::{Effect, EffectId};
pub use reducer::Reducer;

/// Reducer composition utilities
pub mod composition;

/// Declarative macros for effect construction
pub mod effect_macros;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They are deterministic and synchronous. Anything asynchronous is returned
/// as an effect description and executed by the runtime.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state slice this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates `state` in place and returns effect descriptions for the
        /// runtime. Must not block, sleep or perform I/O.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers. The runtime executes them and
/// feeds any produced action back into the store.
pub mod effect {
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identifier used to cancel a running [`Effect::Cancellable`]
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EffectId(String);

    impl EffectId {
        /// Create an identifier from any string-like value
        #[must_use]
        pub fn new(id: impl Into<String>) -> Self {
            Self(id.into())
        }

        /// Borrow the identifier text
        #[must_use]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<&str> for EffectId {
        fn from(value: &str) -> Self {
            Self::new(value)
        }
    }

    impl From<String> for EffectId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (timeouts, expiry)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Run `effect` under `id` so that a later [`Effect::Cancel`] can stop it
        ///
        /// Starting a second cancellable effect under an id that is still
        /// running replaces (and cancels) the first one.
        Cancellable {
            /// Key used for cancellation
            id: EffectId,
            /// The wrapped effect
            effect: Box<Effect<Action>>,
        },

        /// Cancel the cancellable effect registered under this id
        ///
        /// Cancelling an id that is not running is a no-op.
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> fmt::Debug for Effect<Action>
    where
        Action: fmt::Debug,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Lift an effect over a child action type into the parent action type
        ///
        /// Used when a module reducer is scoped into the root reducer: every
        /// action the child effect would produce is wrapped with `f`.
        #[must_use]
        pub fn map<B>(self, f: fn(Action) -> B) -> Effect<B>
        where
            Action: Send + 'static,
            B: Send + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => {
                    Effect::Parallel(effects.into_iter().map(|e| e.map(f)).collect())
                },
                Effect::Sequential(effects) => {
                    Effect::Sequential(effects.into_iter().map(|e| e.map(f)).collect())
                },
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(f) })),
                Effect::Cancellable { id, effect } => Effect::Cancellable {
                    id,
                    effect: Box::new(effect.map(f)),
                },
                Effect::Cancel(id) => Effect::Cancel(id),
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies of reducers and actions sit behind these traits
/// so tests can substitute deterministic versions.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of unique identifiers that are not tied to any server resource
    pub trait IdGenerator: Send + Sync {
        /// Produce a fresh identifier
        fn next_id(&self) -> String;
    }

    /// Named views the console can be sent to as a side effect of a response
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Route {
        /// The login view
        Login,
        /// The admin dashboard
        Dashboard,
    }

    impl Route {
        /// Route name as used by the view layer
        #[must_use]
        pub const fn name(self) -> &'static str {
            match self {
                Self::Login => "login",
                Self::Dashboard => "admin.dashboard",
            }
        }
    }

    /// Navigation side-effect sink
    ///
    /// The view layer owns the actual route table; the core only asks for a
    /// route by name.
    pub trait Navigator: Send + Sync {
        /// Request navigation to `route`
        fn navigate(&self, route: Route);
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{Effect, EffectId};
    use super::environment::{Clock, Route, SystemClock};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Child {
        Tick(u32),
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Parent {
        Child(Child),
    }

    #[test]
    fn map_lifts_delay_action() {
        let effect = Effect::Delay {
            duration: Duration::from_millis(5),
            action: Box::new(Child::Tick(1)),
        };

        match effect.map(Parent::Child) {
            Effect::Delay { duration, action } => {
                assert_eq!(duration, Duration::from_millis(5));
                assert_eq!(*action, Parent::Child(Child::Tick(1)));
            },
            other => unreachable!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn map_keeps_cancellation_ids() {
        let effect: Effect<Child> = Effect::Cancellable {
            id: EffectId::from("a"),
            effect: Box::new(Effect::Delay {
                duration: Duration::from_secs(1),
                action: Box::new(Child::Tick(2)),
            }),
        };

        let Effect::Cancellable { id, effect } = effect.map(Parent::Child) else {
            unreachable!("cancellable must stay cancellable");
        };
        assert_eq!(id.as_str(), "a");
        assert!(matches!(*effect, Effect::Delay { .. }));

        let cancel: Effect<Parent> = Effect::<Child>::Cancel(EffectId::from("a")).map(Parent::Child);
        assert!(matches!(cancel, Effect::Cancel(id) if id.as_str() == "a"));
    }

    #[test]
    fn map_lifts_future_output() {
        let effect: Effect<Child> = Effect::Future(Box::pin(async { Some(Child::Tick(7)) }));

        let Effect::Future(fut) = effect.map(Parent::Child) else {
            unreachable!("future must stay a future");
        };
        assert_eq!(tokio_test::block_on(fut), Some(Parent::Child(Child::Tick(7))));
    }

    #[test]
    fn route_names() {
        assert_eq!(Route::Login.name(), "login");
        assert_eq!(Route::Dashboard.name(), "admin.dashboard");
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
