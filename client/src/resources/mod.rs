//! One borrowed sub-client per API resource family
//!
//! Every method is exactly one round trip through the pipeline. Nothing is
//! retried or cached here.

mod auth;
mod features;
mod info;
mod licenses;
mod me;
mod packages;
mod stats;
mod users;

pub use auth::Auth;
pub use features::Features;
pub use info::InfoResource;
pub use licenses::Licenses;
pub use me::Me;
pub use packages::Packages;
pub use stats::Stats;
pub use users::Users;

use std::collections::BTreeMap;

/// Page and filter parameters for listings
///
/// Unset values are left out of the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Requested page, 1-based
    pub page: Option<u32>,
    /// Server-side filters (`is_active`, `username`...)
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    /// No page, no filters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `page`
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Add (or replace) a filter
    #[must_use]
    pub fn filter(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.filters.insert(name.into(), value.to_string());
        self
    }

    /// Query pairs: filters in name order, then `page`
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query: Vec<_> = self
            .filters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_give_empty_query() {
        assert!(ListParams::new().to_query().is_empty());
    }

    #[test]
    fn filters_then_page() {
        let params = ListParams::new().page(3).filter("is_active", true);
        assert_eq!(
            params.to_query(),
            vec![
                ("is_active".to_string(), "true".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
    }
}
