//! State modules
//!
//! Each module owns one slice of [`ConsoleState`], the mutation enum that
//! may change it and the reducer that applies those mutations. Mutations are
//! synchronous and only ever touch their own slice.

pub mod auth;
pub mod info;
pub mod licenses;
pub mod messages;
pub mod packages;
pub mod pending;
pub mod stats;

pub use auth::{AuthMutation, AuthReducer, AuthState};
pub use info::{InfoMutation, InfoReducer, InfoState};
pub use licenses::{LicenseMutation, LicenseReducer, LicenseState};
pub use messages::{FlashMessage, Level, MessageMutation, MessagesReducer, MessagesState};
pub use packages::{PackageMutation, PackagesReducer, PackagesState};
pub use pending::{PendingMutation, PendingReducer, PendingState};
pub use stats::{StatsMutation, StatsReducer, StatsState};

/// The whole client-side state tree
#[derive(Debug, Clone, Default)]
pub struct ConsoleState {
    /// Session, users and the logged-in account
    pub auth: AuthState,
    /// Package listings and the package in focus
    pub packages: PackagesState,
    /// Known licenses
    pub licenses: LicenseState,
    /// Server and download statistics
    pub stats: StatsState,
    /// Server information and feature flags
    pub info: InfoState,
    /// Flash messages on screen
    pub messages: MessagesState,
    /// Requests in flight
    pub pending: PendingState,
}
