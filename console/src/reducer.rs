//! Root reducer and environment
//!
//! [`ConsoleReducer`] is a router: it hands each [`Mutation`] to the module
//! that owns it, scoped to that module's slice of [`ConsoleState`].

use crate::state::{
    AuthMutation, AuthReducer, ConsoleState, InfoMutation, InfoReducer, LicenseMutation,
    LicenseReducer, MessageMutation, MessagesReducer, PackageMutation, PackagesReducer,
    PendingMutation, PendingReducer, StatsMutation, StatsReducer,
};
use gopypi_admin_core::composition::scope;
use gopypi_admin_core::environment::{Clock, IdGenerator, SystemClock};
use gopypi_admin_core::{Effect, Reducer, SmallVec};
use gopypi_admin_runtime::Store;
use std::sync::Arc;
use std::time::Duration;

/// Every change the state tree accepts, grouped by owning module
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Session and users
    Auth(AuthMutation),
    /// Packages
    Packages(PackageMutation),
    /// Licenses
    Licenses(LicenseMutation),
    /// Statistics
    Stats(StatsMutation),
    /// Server information
    Info(InfoMutation),
    /// Flash messages
    Messages(MessageMutation),
    /// Requests in flight
    Pending(PendingMutation),
}

/// Dependencies shared by the reducer and the action layer
#[derive(Clone)]
pub struct ConsoleEnvironment {
    /// Timestamps for flash messages
    pub clock: Arc<dyn Clock>,
    /// Flash message ids
    pub ids: Arc<dyn IdGenerator>,
    /// How long a flash message stays visible
    pub flash_ttl: Duration,
}

impl ConsoleEnvironment {
    /// Environment with the given clock and id source
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, flash_ttl: Duration) -> Self {
        Self {
            clock,
            ids,
            flash_ttl,
        }
    }
}

impl Default for ConsoleEnvironment {
    /// Wall clock, random ids, five second flash messages
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(UuidIds), Duration::from_millis(5000))
    }
}

impl std::fmt::Debug for ConsoleEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleEnvironment")
            .field("flash_ttl", &self.flash_ttl)
            .finish_non_exhaustive()
    }
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Routes mutations to module reducers
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReducer;

impl Reducer for ConsoleReducer {
    type State = ConsoleState;
    type Action = Mutation;
    type Environment = ConsoleEnvironment;

    fn reduce(
        &self,
        state: &mut ConsoleState,
        action: Mutation,
        env: &ConsoleEnvironment,
    ) -> SmallVec<[Effect<Mutation>; 4]> {
        match action {
            Mutation::Auth(m) => scope(&AuthReducer, &mut state.auth, m, &(), Mutation::Auth),
            Mutation::Packages(m) => {
                scope(&PackagesReducer, &mut state.packages, m, &(), Mutation::Packages)
            },
            Mutation::Licenses(m) => {
                scope(&LicenseReducer, &mut state.licenses, m, &(), Mutation::Licenses)
            },
            Mutation::Stats(m) => scope(&StatsReducer, &mut state.stats, m, &(), Mutation::Stats),
            Mutation::Info(m) => scope(&InfoReducer, &mut state.info, m, &(), Mutation::Info),
            Mutation::Messages(m) => scope(
                &MessagesReducer,
                &mut state.messages,
                m,
                &env.flash_ttl,
                Mutation::Messages,
            ),
            Mutation::Pending(m) => {
                scope(&PendingReducer, &mut state.pending, m, &(), Mutation::Pending)
            },
        }
    }
}

/// The console's store
pub type ConsoleStore = Store<ConsoleState, Mutation, ConsoleEnvironment, ConsoleReducer>;

/// Create a store with empty state
#[must_use]
pub fn console_store(environment: ConsoleEnvironment) -> ConsoleStore {
    console_store_with(ConsoleState::default(), environment)
}

/// Create a store starting from `state`
#[must_use]
pub fn console_store_with(state: ConsoleState, environment: ConsoleEnvironment) -> ConsoleStore {
    Store::new(state, ConsoleReducer, environment)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::{FlashMessage, Level};
    use gopypi_admin_client::License;
    use gopypi_admin_testing::{assertions, test_clock, ReducerTest, SequentialIds};

    fn environment() -> ConsoleEnvironment {
        ConsoleEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(SequentialIds::new()),
            Duration::from_millis(50),
        )
    }

    #[test]
    fn routes_to_owning_slice_only() {
        ReducerTest::new(ConsoleReducer)
            .with_env(environment())
            .given_state(ConsoleState::default())
            .when_action(Mutation::Licenses(LicenseMutation::Receive(vec![License {
                id: 1,
                code: "MIT".to_string(),
                ..License::default()
            }])))
            .then_state(|state| {
                assert_eq!(state.licenses.all.len(), 1);
                assert_eq!(state.pending.pending, 0);
                assert!(state.messages.all.is_empty());
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn message_expiry_is_lifted_into_root_mutation() {
        let message = FlashMessage {
            id: "msg-1".to_string(),
            text: "hello".to_string(),
            level: Level::Info,
            created_at: test_clock().now(),
        };

        let mut state = ConsoleState::default();
        let effects = ConsoleReducer.reduce(
            &mut state,
            Mutation::Messages(MessageMutation::Add(message)),
            &environment(),
        );

        assertions::assert_has_cancellable(&effects, "msg-1");
        let Some(Effect::Cancellable { effect, .. }) = effects.into_iter().next() else {
            unreachable!("expected a cancellable effect");
        };
        let Effect::Delay { action, duration } = *effect else {
            unreachable!("expected a delay");
        };
        assert_eq!(duration, Duration::from_millis(50));
        assert_eq!(
            *action,
            Mutation::Messages(MessageMutation::Hide("msg-1".to_string()))
        );
    }

    #[test]
    fn uuid_ids_are_unique() {
        let ids = UuidIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[tokio::test]
    async fn store_expires_messages() {
        let store = console_store(environment());
        let message = FlashMessage {
            id: "msg-1".to_string(),
            text: "bye".to_string(),
            level: Level::Warning,
            created_at: test_clock().now(),
        };

        let mut handle = store
            .send(Mutation::Messages(MessageMutation::Add(message)))
            .await
            .unwrap();
        assert_eq!(store.state(|s| s.messages.all.len()).await, 1);

        handle.wait_with_timeout(Duration::from_secs(2)).await.unwrap();
        assert!(store.state(|s| s.messages.all.is_empty()).await);
    }
}
