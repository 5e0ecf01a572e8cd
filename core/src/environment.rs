//! Execution-context capabilities.
//!
//! An `Environment` tells the client whether it runs in an interactive
//! context (a page with storage and an addressable location) and hands out
//! the storage backends and current location when it does. Non-interactive
//! contexts keep the session token in memory only.

use std::sync::{Arc, Mutex, PoisonError};

use url::Url;

use crate::storage::{CookieJar, KeyValueStore};

pub trait Environment: Send + Sync {
    fn is_interactive(&self) -> bool;

    fn local_storage(&self) -> Option<Arc<dyn KeyValueStore>>;

    fn cookies(&self) -> Option<Arc<dyn CookieJar>>;

    /// Query string of the current location, without the leading `?`.
    fn location_query(&self) -> Option<String>;
}

/// Server-side or batch context: no storage, no location.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Environment for Headless {
    fn is_interactive(&self) -> bool {
        false
    }

    fn local_storage(&self) -> Option<Arc<dyn KeyValueStore>> {
        None
    }

    fn cookies(&self) -> Option<Arc<dyn CookieJar>> {
        None
    }

    fn location_query(&self) -> Option<String> {
        None
    }
}

/// Interactive context assembled from explicit storage handles and a
/// current location.
#[derive(Default)]
pub struct Interactive {
    local_storage: Option<Arc<dyn KeyValueStore>>,
    cookies: Option<Arc<dyn CookieJar>>,
    location: Mutex<Option<Url>>,
}

impl Interactive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local_storage(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.local_storage = Some(store);
        self
    }

    pub fn with_cookies(mut self, jar: Arc<dyn CookieJar>) -> Self {
        self.cookies = Some(jar);
        self
    }

    pub fn with_location(self, location: Url) -> Self {
        self.set_location(location);
        self
    }

    /// Navigate, e.g. after the provider redirected back with a token.
    pub fn set_location(&self, location: Url) {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = Some(location);
    }
}

impl Environment for Interactive {
    fn is_interactive(&self) -> bool {
        true
    }

    fn local_storage(&self) -> Option<Arc<dyn KeyValueStore>> {
        self.local_storage.clone()
    }

    fn cookies(&self) -> Option<Arc<dyn CookieJar>> {
        self.cookies.clone()
    }

    fn location_query(&self) -> Option<String> {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|url| url.query().map(str::to_string))
    }
}
