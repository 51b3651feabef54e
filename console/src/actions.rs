//! Action layer
//!
//! Each action performs at most one API round trip (plus a refetch for the
//! maintainer and feature actions), commits the result as a [`Mutation`]
//! and hands the result back to the caller.
//!
//! Failure policy:
//!
//! - single-entity fetches (`get_package`, `get_user`) post a danger message
//!   `Cannot get <what>: <reason>` and return the error;
//! - listings are only logged unless `report_list_failures` is set, in which
//!   case they post `Cannot load <what>: <reason>`;
//! - everything else returns the error untouched;
//! - a reply absorbed by an interceptor never mutates state or posts a
//!   message, whatever the action.

use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use crate::interceptors::console_pipeline;
use crate::reducer::{console_store_with, ConsoleEnvironment, ConsoleStore, Mutation};
use crate::session::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
use crate::state::{
    AuthMutation, ConsoleState, FlashMessage, InfoMutation, LicenseMutation, Level,
    MessageMutation, PackageMutation, StatsMutation,
};
use gopypi_admin_client::{
    ApiClient, ApiError, HttpTransport, Info, License, ListParams, Package, Page, PasswordForm,
    ProfileForm, Transport, User, UserForm,
};
use gopypi_admin_core::environment::{Clock, IdGenerator, Navigator};
use serde_json::Value;
use std::sync::Arc;

/// Post a flash message and return its id
///
/// The message expires by itself after the environment's flash TTL.
pub async fn commit_message(store: &ConsoleStore, text: impl Into<String>, level: Level) -> String {
    let environment = store.environment();
    let message = FlashMessage {
        id: environment.ids.next_id(),
        text: text.into(),
        level,
        created_at: environment.clock.now(),
    };
    let id = message.id.clone();

    tracing::debug!(%id, %level, text = %message.text, "Flash message");
    if let Err(error) = store.send(Mutation::Messages(MessageMutation::Add(message))).await {
        tracing::warn!(%error, "Could not post flash message");
    }
    id
}

/// The admin console: store, API client and session in one handle
#[derive(Clone)]
pub struct Console {
    store: ConsoleStore,
    client: ApiClient,
    storage: Arc<dyn TokenStorage>,
    report_list_failures: bool,
}

impl Console {
    /// Console talking HTTP to `config.base_url`
    ///
    /// The token is kept in `config.token_path` when set, in memory otherwise.
    #[must_use]
    pub fn from_config(config: &ConsoleConfig, navigator: Arc<dyn Navigator>) -> Self {
        let storage: Arc<dyn TokenStorage> = match &config.token_path {
            Some(path) => Arc::new(FileTokenStorage::new(path)),
            None => Arc::new(MemoryTokenStorage::new()),
        };
        let environment = ConsoleEnvironment {
            flash_ttl: config.flash_ttl,
            ..ConsoleEnvironment::default()
        };

        Self::assemble(
            config,
            environment,
            Arc::new(HttpTransport::new(config.base_url.clone())),
            storage,
            navigator,
        )
    }

    /// Console from explicit parts
    ///
    /// `environment.flash_ttl` is used as is; `config` only contributes the
    /// failure reporting policy. A token already in `storage` starts the
    /// console logged in.
    #[must_use]
    pub fn assemble(
        config: &ConsoleConfig,
        environment: ConsoleEnvironment,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let mut state = ConsoleState::default();
        state.auth.logged_in = storage.load().is_some();

        let store = console_store_with(state, environment);
        let pipeline = console_pipeline(transport, &store, Arc::clone(&storage), navigator);

        Self {
            store,
            client: ApiClient::new(pipeline),
            storage,
            report_list_failures: config.report_list_failures,
        }
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &ConsoleStore {
        &self.store
    }

    /// The API client (every call goes through the console's interceptors)
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The session token slot
    #[must_use]
    pub fn storage(&self) -> &dyn TokenStorage {
        self.storage.as_ref()
    }

    /// Read the state through a selector
    pub async fn select<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&ConsoleState) -> T,
    {
        self.store.state(f).await
    }

    async fn commit(&self, mutation: Mutation) -> Result<(), ConsoleError> {
        self.store.send(mutation).await?;
        Ok(())
    }

    async fn entity_failure(&self, what: &str, error: ApiError) -> ConsoleError {
        if !error.is_absorbed() {
            self.message_error(format!("Cannot get {what}: {}", error.reason()))
                .await;
        }
        error.into()
    }

    async fn list_failure(&self, what: &str, error: ApiError) -> ConsoleError {
        if error.is_absorbed() {
            return error.into();
        }

        tracing::warn!(%error, what, "Listing failed");
        if self.report_list_failures {
            self.message_error(format!("Cannot load {what}: {}", error.reason()))
                .await;
        }
        error.into()
    }

    // Session

    /// Log in and keep the returned token
    ///
    /// # Errors
    ///
    /// Returns the API error if login failed or the token could not be stored.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ConsoleError> {
        let token = self.client.auth().login(username, password).await?;
        self.storage.save(&token)?;
        self.commit(Mutation::Auth(AuthMutation::LoggedIn)).await?;
        tracing::info!("Logged in");
        Ok(token)
    }

    /// Forget the session token
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Session`] if the token could not be cleared.
    pub async fn logout(&self) -> Result<(), ConsoleError> {
        self.storage.clear()?;
        self.commit(Mutation::Auth(AuthMutation::LoggedOut)).await
    }

    // Users

    /// Fetch the logged-in account
    ///
    /// # Errors
    ///
    /// Returns the API error; it is reported only if listing failures are.
    pub async fn get_me(&self) -> Result<User, ConsoleError> {
        match self.client.me().get().await {
            Ok(me) => {
                self.commit(Mutation::Auth(AuthMutation::ReceiveMe(me.clone())))
                    .await?;
                Ok(me)
            },
            Err(error) => Err(self.list_failure("your account", error).await),
        }
    }

    /// Update the logged-in account's profile
    ///
    /// # Errors
    ///
    /// Returns the API error unreported.
    pub async fn update_me(&self, form: &ProfileForm) -> Result<User, ConsoleError> {
        let me = self.client.me().update(form).await?;
        self.commit(Mutation::Auth(AuthMutation::ReceiveMe(me.clone())))
            .await?;
        Ok(me)
    }

    /// Change the logged-in account's password
    ///
    /// # Errors
    ///
    /// Returns the API error unreported.
    pub async fn change_password(&self, form: &PasswordForm) -> Result<(), ConsoleError> {
        Ok(self.client.me().change_password(form).await?)
    }

    /// Create a user
    ///
    /// # Errors
    ///
    /// Returns the API error unreported.
    pub async fn create_user(&self, form: &UserForm) -> Result<User, ConsoleError> {
        Ok(self.client.users().create(form).await?)
    }

    /// Update a user and keep the result as the user in focus
    ///
    /// # Errors
    ///
    /// Returns the API error unreported.
    pub async fn update_user(&self, id: u64, form: &UserForm) -> Result<User, ConsoleError> {
        let user = self.client.users().update(id, form).await?;
        self.commit(Mutation::Auth(AuthMutation::ReceiveUser(user.clone())))
            .await?;
        Ok(user)
    }

    /// Fetch a user into focus
    ///
    /// # Errors
    ///
    /// Returns the API error after posting `Cannot get user: <reason>`.
    pub async fn get_user(&self, id: u64) -> Result<User, ConsoleError> {
        match self.client.users().get(id).await {
            Ok(user) => {
                self.commit(Mutation::Auth(AuthMutation::ReceiveUser(user.clone())))
                    .await?;
                Ok(user)
            },
            Err(error) => Err(self.entity_failure("user", error).await),
        }
    }

    /// Fetch a page of users
    ///
    /// # Errors
    ///
    /// Returns the API error; it is reported only if listing failures are.
    pub async fn get_all_users(&self, params: &ListParams) -> Result<Page<User>, ConsoleError> {
        match self.client.users().list(params).await {
            Ok(page) => {
                self.commit(Mutation::Auth(AuthMutation::ReceiveUsers(page.clone())))
                    .await?;
                Ok(page)
            },
            Err(error) => Err(self.list_failure("users", error).await),
        }
    }

    /// Fetch a page of active users
    ///
    /// # Errors
    ///
    /// Same as [`Console::get_all_users`].
    pub async fn get_active_users(&self, params: &ListParams) -> Result<Page<User>, ConsoleError> {
        self.get_all_users(&params.clone().filter("is_active", true))
            .await
    }

    // Packages

    /// Fetch a page of packages
    ///
    /// # Errors
    ///
    /// Returns the API error; it is reported only if listing failures are.
    pub async fn get_all_packages(
        &self,
        params: &ListParams,
    ) -> Result<Page<Package>, ConsoleError> {
        match self.client.packages().list(params).await {
            Ok(page) => {
                self.commit(Mutation::Packages(PackageMutation::ReceiveList(page.clone())))
                    .await?;
                Ok(page)
            },
            Err(error) => Err(self.list_failure("packages", error).await),
        }
    }

    /// Fetch the packages the logged-in account maintains
    ///
    /// # Errors
    ///
    /// Returns the API error; it is reported only if listing failures are.
    pub async fn get_my_packages(&self) -> Result<Vec<Package>, ConsoleError> {
        match self.client.me().packages().await {
            Ok(packages) => {
                self.commit(Mutation::Packages(PackageMutation::ReceiveMine(
                    packages.clone(),
                )))
                .await?;
                Ok(packages)
            },
            Err(error) => Err(self.list_failure("your packages", error).await),
        }
    }

    /// Fetch a package into focus
    ///
    /// # Errors
    ///
    /// Returns the API error after posting `Cannot get package: <reason>`.
    pub async fn get_package(&self, id: u64) -> Result<Package, ConsoleError> {
        match self.client.packages().get(id).await {
            Ok(package) => {
                self.commit(Mutation::Packages(PackageMutation::ReceivePackage(
                    package.clone(),
                )))
                .await?;
                Ok(package)
            },
            Err(error) => Err(self.entity_failure("package", error).await),
        }
    }

    /// Make `user` a maintainer of `package`, then refetch the package
    ///
    /// # Errors
    ///
    /// Returns the API error unreported, or whatever the refetch returns.
    pub async fn add_maintainer(&self, package: u64, user: u64) -> Result<Package, ConsoleError> {
        self.client.packages().add_maintainer(package, user).await?;
        self.get_package(package).await
    }

    /// Remove `user` from the maintainers of `package`, then refetch it
    ///
    /// # Errors
    ///
    /// Returns the API error unreported, or whatever the refetch returns.
    pub async fn remove_maintainer(
        &self,
        package: u64,
        user: u64,
    ) -> Result<Package, ConsoleError> {
        self.client
            .packages()
            .remove_maintainer(package, user)
            .await?;
        self.get_package(package).await
    }

    // Licenses, info and features

    /// Fetch every license
    ///
    /// # Errors
    ///
    /// Returns the API error; it is reported only if listing failures are.
    pub async fn get_all_licenses(&self) -> Result<Vec<License>, ConsoleError> {
        match self.client.licenses().list().await {
            Ok(licenses) => {
                self.commit(Mutation::Licenses(LicenseMutation::Receive(licenses.clone())))
                    .await?;
                Ok(licenses)
            },
            Err(error) => Err(self.list_failure("licenses", error).await),
        }
    }

    /// Fetch server information
    ///
    /// # Errors
    ///
    /// Returns the API error; it is reported only if listing failures are.
    pub async fn get_all_info(&self) -> Result<Info, ConsoleError> {
        match self.client.info().get().await {
            Ok(info) => {
                self.commit(Mutation::Info(InfoMutation::Receive(info.clone())))
                    .await?;
                Ok(info)
            },
            Err(error) => Err(self.list_failure("server info", error).await),
        }
    }

    /// Switch a feature flag, then refetch server information
    ///
    /// # Errors
    ///
    /// Returns the API error unreported, or whatever the refetch returns.
    pub async fn update_feature(&self, id: &str, value: bool) -> Result<Info, ConsoleError> {
        self.client.features().update(id, value).await?;
        self.get_all_info().await
    }

    // Statistics

    /// Fetch server-wide statistics
    ///
    /// # Errors
    ///
    /// Returns the API error; it is reported only if listing failures are.
    pub async fn get_server_stats(&self) -> Result<Value, ConsoleError> {
        match self.client.stats().server().await {
            Ok(stats) => {
                self.commit(Mutation::Stats(StatsMutation::ReceiveServer(stats.clone())))
                    .await?;
                Ok(stats)
            },
            Err(error) => Err(self.list_failure("server statistics", error).await),
        }
    }

    /// Fetch download statistics for all packages
    ///
    /// # Errors
    ///
    /// Returns the API error; it is reported only if listing failures are.
    pub async fn get_all_download_stats(&self) -> Result<Value, ConsoleError> {
        match self.client.stats().downloads().await {
            Ok(stats) => {
                self.commit(Mutation::Stats(StatsMutation::ReceiveDownloads(stats.clone())))
                    .await?;
                Ok(stats)
            },
            Err(error) => Err(self.list_failure("download statistics", error).await),
        }
    }

    /// Fetch download statistics for one package
    ///
    /// # Errors
    ///
    /// Returns the API error; it is reported only if listing failures are.
    pub async fn get_package_download_stats(&self, id: u64) -> Result<Value, ConsoleError> {
        match self.client.stats().package_downloads(id).await {
            Ok(stats) => {
                self.commit(Mutation::Stats(StatsMutation::ReceivePackage(stats.clone())))
                    .await?;
                Ok(stats)
            },
            Err(error) => Err(self.list_failure("package statistics", error).await),
        }
    }

    /// Fetch download statistics for one package version
    ///
    /// # Errors
    ///
    /// Returns the API error; it is reported only if listing failures are.
    pub async fn get_version_download_stats(
        &self,
        id: u64,
        version_id: u64,
    ) -> Result<Value, ConsoleError> {
        match self.client.stats().version_downloads(id, version_id).await {
            Ok(stats) => {
                self.commit(Mutation::Stats(StatsMutation::ReceiveVersion(stats.clone())))
                    .await?;
                Ok(stats)
            },
            Err(error) => Err(self.list_failure("version statistics", error).await),
        }
    }

    // Flash messages

    /// Post a message; returns its id
    pub async fn message(&self, text: impl Into<String>, level: Level) -> String {
        commit_message(&self.store, text, level).await
    }

    /// Post a danger message
    pub async fn message_error(&self, text: impl Into<String>) -> String {
        self.message(text, Level::Danger).await
    }

    /// Post an info message
    pub async fn message_info(&self, text: impl Into<String>) -> String {
        self.message(text, Level::Info).await
    }

    /// Post a success message
    pub async fn message_success(&self, text: impl Into<String>) -> String {
        self.message(text, Level::Success).await
    }

    /// Post a warning message
    pub async fn message_warning(&self, text: impl Into<String>) -> String {
        self.message(text, Level::Warning).await
    }

    /// Hide a message before it expires; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Store`] if the store rejected the mutation.
    pub async fn hide_message(&self, id: &str) -> Result<(), ConsoleError> {
        self.commit(Mutation::Messages(MessageMutation::Hide(id.to_string())))
            .await
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("client", &self.client)
            .field("report_list_failures", &self.report_list_failures)
            .finish_non_exhaustive()
    }
}
