//! Read-only projections of [`ConsoleState`]
//!
//! Use with [`Store::state`](gopypi_admin_runtime::Store::state):
//!
//! ```ignore
//! let packages = store.state(|s| selectors::all_packages(s).to_vec()).await;
//! ```

use crate::state::{ConsoleState, FlashMessage};
use gopypi_admin_client::{Info, License, Package, Paginator, User};
use serde_json::Value;

/// Server information, once fetched
#[must_use]
pub const fn all_info(state: &ConsoleState) -> Option<&Info> {
    state.info.all.as_ref()
}

/// Server-wide statistics
#[must_use]
pub const fn server_stats(state: &ConsoleState) -> Option<&Value> {
    state.stats.server.as_ref()
}

/// Downloads across all packages
#[must_use]
pub const fn all_download_stats(state: &ConsoleState) -> Option<&Value> {
    state.stats.downloads.as_ref()
}

/// Downloads of the package in focus
#[must_use]
pub const fn package_download_stats(state: &ConsoleState) -> Option<&Value> {
    state.stats.package.as_ref()
}

/// Downloads of the version in focus
#[must_use]
pub const fn version_download_stats(state: &ConsoleState) -> Option<&Value> {
    state.stats.version.as_ref()
}

/// Latest page of users
#[must_use]
pub fn all_users(state: &ConsoleState) -> &[User] {
    &state.auth.all
}

/// Paging metadata for [`all_users`]
#[must_use]
pub const fn all_users_paginator(state: &ConsoleState) -> &Paginator {
    &state.auth.paginator
}

/// Latest page of packages
#[must_use]
pub fn all_packages(state: &ConsoleState) -> &[Package] {
    &state.packages.all
}

/// Paging metadata for [`all_packages`]
#[must_use]
pub const fn all_packages_paginator(state: &ConsoleState) -> Option<&Paginator> {
    state.packages.paginator.as_ref()
}

/// The package in focus
#[must_use]
pub const fn single_package(state: &ConsoleState) -> Option<&Package> {
    state.packages.package.as_ref()
}

/// Every license
#[must_use]
pub fn all_licenses(state: &ConsoleState) -> &[License] {
    &state.licenses.all
}

/// The logged-in account
#[must_use]
pub const fn me(state: &ConsoleState) -> Option<&User> {
    state.auth.me.as_ref()
}

/// Packages the logged-in account maintains
#[must_use]
pub fn my_packages(state: &ConsoleState) -> &[Package] {
    &state.packages.mine
}

/// The user in focus
#[must_use]
pub const fn user(state: &ConsoleState) -> Option<&User> {
    state.auth.user.as_ref()
}

/// Flash messages on screen, oldest first
#[must_use]
pub fn messages(state: &ConsoleState) -> &[FlashMessage] {
    &state.messages.all
}

/// Requests in flight
#[must_use]
pub const fn spinner_pending_requests(state: &ConsoleState) -> usize {
    state.pending.pending
}

/// Whether any request is in flight
#[must_use]
pub const fn is_busy(state: &ConsoleState) -> bool {
    state.pending.pending > 0
}

/// Whether a login succeeded and no logout followed
#[must_use]
pub const fn is_logged_in(state: &ConsoleState) -> bool {
    state.auth.logged_in
}

/// Feature flag `id`; false until server information is loaded
#[must_use]
pub fn has_feature(state: &ConsoleState, id: &str) -> bool {
    all_info(state).is_some_and(|info| info.has_feature(id))
}

/// Display name for a user
#[must_use]
pub fn full_name(user: &User) -> String {
    user.full_name()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gopypi_admin_client::{Feature, FEATURE_DOWNLOAD_STATS};

    #[test]
    fn empty_state_projections() {
        let state = ConsoleState::default();
        assert!(all_info(&state).is_none());
        assert!(all_users(&state).is_empty());
        assert!(messages(&state).is_empty());
        assert_eq!(spinner_pending_requests(&state), 0);
        assert!(!is_busy(&state));
        assert!(!has_feature(&state, FEATURE_DOWNLOAD_STATS));
    }

    #[test]
    fn has_feature_reads_loaded_info() {
        let mut state = ConsoleState::default();
        state.info.all = Some(Info {
            version: "1.0".to_string(),
            features: vec![Feature {
                id: FEATURE_DOWNLOAD_STATS.to_string(),
                description: "Download statistics".to_string(),
                value: true,
            }],
            system: Value::Null,
        });

        assert!(has_feature(&state, FEATURE_DOWNLOAD_STATS));
        assert!(!has_feature(&state, "other"));
    }

    #[test]
    fn busy_follows_pending() {
        let mut state = ConsoleState::default();
        state.pending.pending = 2;
        assert!(is_busy(&state));
        assert_eq!(spinner_pending_requests(&state), 2);
    }
}
