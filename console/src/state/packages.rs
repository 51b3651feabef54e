//! Package listings

use gopypi_admin_client::{Package, Page, Paginator};
use gopypi_admin_core::{smallvec, Effect, Reducer, SmallVec};

/// Latest package listings and the package in focus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagesState {
    /// Latest page of all packages
    pub all: Vec<Package>,
    /// Paging metadata for `all`, when the server sent any
    pub paginator: Option<Paginator>,
    /// Latest single package fetched
    pub package: Option<Package>,
    /// Packages the logged-in user maintains
    pub mine: Vec<Package>,
}

/// Package mutations; each replaces its slot wholesale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageMutation {
    /// A page of all packages
    ReceiveList(Page<Package>),
    /// A single package
    ReceivePackage(Package),
    /// The logged-in user's packages
    ReceiveMine(Vec<Package>),
}

/// Reducer for [`PackagesState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PackagesReducer;

impl Reducer for PackagesReducer {
    type State = PackagesState;
    type Action = PackageMutation;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut PackagesState,
        action: PackageMutation,
        _env: &(),
    ) -> SmallVec<[Effect<PackageMutation>; 4]> {
        match action {
            PackageMutation::ReceiveList(page) => {
                state.all = page.result;
                state.paginator = page.paginator;
            },
            PackageMutation::ReceivePackage(package) => state.package = Some(package),
            PackageMutation::ReceiveMine(packages) => state.mine = packages,
        }
        smallvec![Effect::None]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(id: u64, name: &str) -> Package {
        Package {
            id,
            name: name.to_string(),
            ..Package::default()
        }
    }

    #[test]
    fn receive_list_replaces_previous_listing() {
        let mut state = PackagesState {
            all: vec![package(1, "old")],
            ..PackagesState::default()
        };

        PackagesReducer.reduce(
            &mut state,
            PackageMutation::ReceiveList(Page {
                result: vec![package(2, "new")],
                paginator: None,
            }),
            &(),
        );

        assert_eq!(state.all, vec![package(2, "new")]);
        assert_eq!(state.paginator, None);
    }

    #[test]
    fn single_package_is_separate_from_listing() {
        let mut state = PackagesState::default();
        PackagesReducer.reduce(&mut state, PackageMutation::ReceivePackage(package(42, "x")), &());

        assert_eq!(state.package.as_ref().map(|p| p.id), Some(42));
        assert!(state.all.is_empty());
    }
}
