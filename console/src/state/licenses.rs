//! Licenses known to the index

use gopypi_admin_client::License;
use gopypi_admin_core::{smallvec, Effect, Reducer, SmallVec};

/// Latest license listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseState {
    /// Every license, as last fetched
    pub all: Vec<License>,
}

/// License mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseMutation {
    /// Replace the listing
    Receive(Vec<License>),
}

/// Reducer for [`LicenseState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseReducer;

impl Reducer for LicenseReducer {
    type State = LicenseState;
    type Action = LicenseMutation;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut LicenseState,
        action: LicenseMutation,
        _env: &(),
    ) -> SmallVec<[Effect<LicenseMutation>; 4]> {
        match action {
            LicenseMutation::Receive(licenses) => state.all = licenses,
        }
        smallvec![Effect::None]
    }
}
