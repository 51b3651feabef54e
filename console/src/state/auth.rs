//! Session flag, user listings and the logged-in account

use gopypi_admin_client::{Page, Paginator, User};
use gopypi_admin_core::{smallvec, Effect, Reducer, SmallVec};

/// Authentication and user slice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// A login succeeded in this session and no logout followed
    pub logged_in: bool,
    /// Latest page of users
    pub all: Vec<User>,
    /// Paging metadata for `all`
    pub paginator: Paginator,
    /// The logged-in account
    pub me: Option<User>,
    /// Latest single user fetched
    pub user: Option<User>,
}

/// Authentication and user mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMutation {
    /// Login succeeded
    LoggedIn,
    /// Session ended; personal data is dropped
    LoggedOut,
    /// A page of users
    ReceiveUsers(Page<User>),
    /// The logged-in account
    ReceiveMe(User),
    /// A single user
    ReceiveUser(User),
}

/// Reducer for [`AuthState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthReducer;

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = AuthMutation;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut AuthState,
        action: AuthMutation,
        _env: &(),
    ) -> SmallVec<[Effect<AuthMutation>; 4]> {
        match action {
            AuthMutation::LoggedIn => state.logged_in = true,
            AuthMutation::LoggedOut => {
                state.logged_in = false;
                state.me = None;
                state.user = None;
            },
            AuthMutation::ReceiveUsers(page) => {
                state.all = page.result;
                state.paginator = page.paginator.unwrap_or_default();
            },
            AuthMutation::ReceiveMe(me) => state.me = Some(me),
            AuthMutation::ReceiveUser(user) => state.user = Some(user),
        }
        smallvec![Effect::None]
    }
}
