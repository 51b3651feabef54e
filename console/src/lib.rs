//! # gopypi admin console
//!
//! Client-side core of the gopypi package index admin console.
//!
//! - [`interceptors`]: auth token, pending counter and fault handling around
//!   every API call
//! - [`state`] and [`reducer`]: the state tree and the mutations that change it
//! - [`actions`]: the operations a view calls ([`Console`])
//! - [`selectors`]: read-only projections for views
//!
//! ## Example
//!
//! ```no_run
//! use gopypi_admin::{selectors, Console, ConsoleConfig, LogNavigator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConsoleConfig::from_env()?;
//!     let console = Console::from_config(&config, Arc::new(LogNavigator));
//!
//!     console.login("admin", "secret").await?;
//!     console.get_all_info().await?;
//!
//!     let stats_enabled = console
//!         .select(|s| selectors::has_feature(s, gopypi_admin_client::FEATURE_DOWNLOAD_STATS))
//!         .await;
//!     println!("download stats enabled: {stats_enabled}");
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod interceptors;
pub mod navigation;
pub mod reducer;
pub mod selectors;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use actions::Console;
pub use config::{ConfigError, ConsoleConfig};
pub use error::ConsoleError;
pub use interceptors::{console_pipeline, AuthInterceptor, FaultInterceptor, PendingInterceptor};
pub use navigation::{LogNavigator, WatchNavigator};
pub use reducer::{
    console_store, console_store_with, ConsoleEnvironment, ConsoleReducer, ConsoleStore, Mutation,
    UuidIds,
};
pub use session::{FileTokenStorage, MemoryTokenStorage, SessionError, TokenStorage, TOKEN_KEY};
pub use state::{ConsoleState, FlashMessage, Level};
