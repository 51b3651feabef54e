//! Server and download statistics
//!
//! Payloads are kept as the server sent them; the view layer interprets them.

use gopypi_admin_core::{smallvec, Effect, Reducer, SmallVec};
use serde_json::Value;

/// Latest statistics, one slot per report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsState {
    /// Server-wide figures
    pub server: Option<Value>,
    /// Downloads across all packages
    pub downloads: Option<Value>,
    /// Downloads of the package in focus
    pub package: Option<Value>,
    /// Downloads of the version in focus
    pub version: Option<Value>,
}

/// Statistics mutations; each replaces its slot
#[derive(Debug, Clone, PartialEq)]
pub enum StatsMutation {
    /// Server-wide figures
    ReceiveServer(Value),
    /// Downloads across all packages
    ReceiveDownloads(Value),
    /// Downloads of one package
    ReceivePackage(Value),
    /// Downloads of one package version
    ReceiveVersion(Value),
}

/// Reducer for [`StatsState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsReducer;

impl Reducer for StatsReducer {
    type State = StatsState;
    type Action = StatsMutation;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut StatsState,
        action: StatsMutation,
        _env: &(),
    ) -> SmallVec<[Effect<StatsMutation>; 4]> {
        match action {
            StatsMutation::ReceiveServer(stats) => state.server = Some(stats),
            StatsMutation::ReceiveDownloads(stats) => state.downloads = Some(stats),
            StatsMutation::ReceivePackage(stats) => state.package = Some(stats),
            StatsMutation::ReceiveVersion(stats) => state.version = Some(stats),
        }
        smallvec![Effect::None]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn each_report_has_its_own_slot() {
        let mut state = StatsState::default();
        StatsReducer.reduce(&mut state, StatsMutation::ReceiveServer(json!({"users": 3})), &());
        StatsReducer.reduce(&mut state, StatsMutation::ReceiveVersion(json!([1, 2])), &());

        assert_eq!(state.server, Some(json!({"users": 3})));
        assert_eq!(state.version, Some(json!([1, 2])));
        assert_eq!(state.downloads, None);
        assert_eq!(state.package, None);
    }
}
