//! Reducer composition utilities
//!
//! A root reducer is usually a router: it matches on which module an action
//! belongs to and hands the module reducer only that module's slice of state.
//! [`scope`] does the handing-off and lifts the module's effects back into the
//! root action type.
//!
//! # Examples
//!
//! ```
//! use gopypi_admin_core::{Effect, Reducer, SmallVec, smallvec};
//! use gopypi_admin_core::composition::scope;
//!
//! #[derive(Clone, Default)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut CounterState, action: CounterAction, _env: &()) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! #[derive(Clone, Default)]
//! struct AppState {
//!     counter: CounterState,
//!     title: String,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     Counter(CounterAction),
//! }
//!
//! let mut app = AppState::default();
//! let AppAction::Counter(action) = AppAction::Counter(CounterAction::Increment);
//! let effects = scope(&CounterReducer, &mut app.counter, action, &(), AppAction::Counter);
//! assert_eq!(app.counter.count, 1);
//! assert_eq!(effects.len(), 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Run `reducer` against a child slice of state and lift its effects.
///
/// The child reducer sees only `state` (a borrow of its own field of the
/// parent state), so it cannot touch any other module's slice. Every action
/// its effects may produce is wrapped with `embed` so that it re-enters the
/// parent reducer.
pub fn scope<R, A>(
    reducer: &R,
    state: &mut R::State,
    action: R::Action,
    env: &R::Environment,
    embed: fn(R::Action) -> A,
) -> SmallVec<[Effect<A>; 4]>
where
    R: Reducer,
    R::Action: Send + 'static,
    A: Send + 'static,
{
    reducer
        .reduce(state, action, env)
        .into_iter()
        .map(|effect| effect.map(embed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smallvec;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct SubState {
        value: i32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum SubAction {
        Add(i32),
        AddLater(i32),
    }

    struct SubReducer;

    impl Reducer for SubReducer {
        type State = SubState;
        type Action = SubAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                SubAction::Add(n) => {
                    state.value += n;
                    smallvec![Effect::None]
                },
                SubAction::AddLater(n) => smallvec![Effect::Delay {
                    duration: Duration::from_millis(1),
                    action: Box::new(SubAction::Add(n)),
                }],
            }
        }
    }

    #[derive(Clone, Default)]
    struct ParentState {
        sub: SubState,
        other: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum ParentAction {
        Sub(SubAction),
    }

    #[test]
    fn test_scope_only_touches_child_slice() {
        let mut state = ParentState {
            sub: SubState { value: 5 },
            other: "test".to_string(),
        };

        let _ = scope(&SubReducer, &mut state.sub, SubAction::Add(3), &(), ParentAction::Sub);

        assert_eq!(state.sub.value, 8);
        assert_eq!(state.other, "test");
    }

    #[test]
    fn test_scope_lifts_effects() {
        let mut state = ParentState::default();

        let effects = scope(
            &SubReducer,
            &mut state.sub,
            SubAction::AddLater(2),
            &(),
            ParentAction::Sub,
        );

        assert_eq!(effects.len(), 1);
        match effects.into_iter().next() {
            Some(Effect::Delay { action, .. }) => {
                assert_eq!(*action, ParentAction::Sub(SubAction::Add(2)));
            },
            other => unreachable!("unexpected effect {other:?}"),
        }
        assert_eq!(state.sub.value, 0);
    }
}
