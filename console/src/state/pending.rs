//! Requests in flight, for the busy indicator

use gopypi_admin_core::{smallvec, Effect, Reducer, SmallVec};

/// Number of requests dispatched but not yet completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingState {
    /// Never negative; a stray `Remove` at zero is ignored
    pub pending: usize,
}

/// Pending counter mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingMutation {
    /// A request was dispatched
    Add,
    /// A request completed, whatever its outcome
    Remove,
}

/// Reducer for [`PendingState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingReducer;

impl Reducer for PendingReducer {
    type State = PendingState;
    type Action = PendingMutation;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut PendingState,
        action: PendingMutation,
        _env: &(),
    ) -> SmallVec<[Effect<PendingMutation>; 4]> {
        match action {
            PendingMutation::Add => state.pending += 1,
            PendingMutation::Remove => state.pending = state.pending.saturating_sub(1),
        }
        smallvec![Effect::None]
    }
}
