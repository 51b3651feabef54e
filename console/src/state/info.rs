//! Server information and feature flags

use gopypi_admin_client::Info;
use gopypi_admin_core::{smallvec, Effect, Reducer, SmallVec};

/// Latest server information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoState {
    /// `None` until first fetched
    pub all: Option<Info>,
}

/// Info mutations
#[derive(Debug, Clone, PartialEq)]
pub enum InfoMutation {
    /// Replace the server information
    Receive(Info),
}

/// Reducer for [`InfoState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct InfoReducer;

impl Reducer for InfoReducer {
    type State = InfoState;
    type Action = InfoMutation;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut InfoState,
        action: InfoMutation,
        _env: &(),
    ) -> SmallVec<[Effect<InfoMutation>; 4]> {
        match action {
            InfoMutation::Receive(info) => state.all = Some(info),
        }
        smallvec![Effect::None]
    }
}
