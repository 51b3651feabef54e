//! Navigation sinks
//!
//! The core only says where to go; these decide what "going" means for the
//! embedding application.

use gopypi_admin_core::environment::{Navigator, Route};
use tokio::sync::watch;

/// Logs navigation requests and does nothing else
///
/// For headless use, where there is no view to switch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(route = route.name(), "Navigation requested");
    }
}

/// Publishes the latest requested route to watchers
///
/// A view layer subscribes with [`WatchNavigator::subscribe`] and switches
/// views whenever the value changes.
#[derive(Debug, Clone)]
pub struct WatchNavigator {
    current: watch::Sender<Option<Route>>,
}

impl WatchNavigator {
    /// Navigator with no route requested yet
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    /// Receiver observing requested routes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Route>> {
        self.current.subscribe()
    }

    /// Most recently requested route
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        *self.current.borrow()
    }
}

impl Default for WatchNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for WatchNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(route = route.name(), "Navigation requested");
        // Repeated requests for the same route still notify
        self.current.send_replace(Some(route));
    }
}
