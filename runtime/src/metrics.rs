//! Metric names and descriptions for the store runtime.
//!
//! The runtime only records through the `metrics` facade. Installing a
//! recorder/exporter is up to the embedding application; without one every
//! call is a no-op.

use metrics::{describe_counter, describe_histogram};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Actions processed by a store
pub const ACTIONS_TOTAL: &str = "store.actions.total";

/// Reducer wall time
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";

/// Effects started, labelled by `type`
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";

/// Cancellable effects stopped before completion
pub const EFFECTS_CANCELLED: &str = "store.effects.cancelled";

/// Register all metric descriptions with the installed recorder.
///
/// Safe to call more than once.
pub fn describe() {
    describe_counter!(ACTIONS_TOTAL, "Total number of actions processed by the store");
    describe_histogram!(REDUCER_DURATION, "Time taken to run the reducer for one action");
    describe_counter!(EFFECTS_EXECUTED, "Total number of effects started by the store");
    describe_counter!(
        EFFECTS_CANCELLED,
        "Total number of cancellable effects stopped before they finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_without_recorder_is_noop() {
        describe();
        describe();
        counter!(ACTIONS_TOTAL).increment(1);
    }
}
