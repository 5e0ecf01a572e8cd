//! Token persistence.
//!
//! # Design
//! Two external collaborators hold the durable copy of the session token: a
//! synchronous key-value store (`KeyValueStore`) and a cookie jar
//! (`CookieJar`). The client only ever talks to a `TokenStore`, which binds
//! one of them to the configured key (and cookie attributes). Exactly one
//! `TokenStore` is chosen at construction; the other backend is never
//! touched.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::config::{CookieOptions, StoreConfig};
use crate::environment::Environment;

/// Synchronous string key-value storage (browser `localStorage` semantics).
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// Synchronous cookie storage with per-write attributes.
pub trait CookieJar: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str, options: &CookieOptions);
    fn remove(&self, name: &str, options: &CookieOptions);
}

/// The single storage slot holding the session token.
pub trait TokenStore: Send + Sync {
    fn read(&self) -> Option<String>;
    fn write(&self, token: &str);
    fn clear(&self);
}

/// Pick the token store for `config`, or `None` when `env` is not
/// interactive or does not provide the selected backend.
pub fn select_token_store(config: &StoreConfig, env: &dyn Environment) -> Option<Box<dyn TokenStore>> {
    if !env.is_interactive() {
        return None;
    }
    if config.use_local_storage {
        env.local_storage().map(|store| {
            Box::new(LocalTokenStore::new(store, config.key.clone())) as Box<dyn TokenStore>
        })
    } else {
        env.cookies().map(|jar| {
            Box::new(CookieTokenStore::new(jar, config.key.clone(), config.cookie_options.clone()))
                as Box<dyn TokenStore>
        })
    }
}

pub struct LocalTokenStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl LocalTokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: String) -> Self {
        Self { store, key }
    }
}

impl TokenStore for LocalTokenStore {
    fn read(&self) -> Option<String> {
        self.store.get_item(&self.key)
    }

    fn write(&self, token: &str) {
        self.store.set_item(&self.key, token);
    }

    fn clear(&self) {
        self.store.remove_item(&self.key);
    }
}

pub struct CookieTokenStore {
    jar: Arc<dyn CookieJar>,
    name: String,
    options: CookieOptions,
}

impl CookieTokenStore {
    pub fn new(jar: Arc<dyn CookieJar>, name: String, options: CookieOptions) -> Self {
        Self { jar, name, options }
    }
}

impl TokenStore for CookieTokenStore {
    fn read(&self) -> Option<String> {
        self.jar.get(&self.name)
    }

    fn write(&self, token: &str) {
        self.jar.set(&self.name, token, &self.options);
    }

    fn clear(&self) {
        self.jar.remove(&self.name, &self.options);
    }
}

/// In-process key-value store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
    }
}

/// Key-value store persisted as a JSON object in a single file, so a token
/// survives process restarts.
///
/// I/O failures are logged and otherwise ignored: a read failure behaves
/// like an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable token store");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read token store");
                BTreeMap::new()
            }
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) {
        let result = serde_json::to_string_pretty(items)
            .map_err(io::Error::other)
            .and_then(|raw| {
                if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&self.path, raw)
            });
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to write token store");
        }
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load();
        items.insert(key.to_string(), value.to_string());
        self.save(&items);
    }

    fn remove_item(&self, key: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load();
        if items.remove(key).is_some() {
            self.save(&items);
        }
    }
}

/// A cookie as written by `MemoryCookieJar`, attributes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub value: String,
    pub options: CookieOptions,
}

/// In-process cookie jar that keeps the attributes of every write.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, StoredCookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cookie(&self, name: &str) -> Option<StoredCookie> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookie(name).map(|c| c.value)
    }

    fn set(&self, name: &str, value: &str, options: &CookieOptions) {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner).insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                options: options.clone(),
            },
        );
    }

    fn remove(&self, name: &str, _options: &CookieOptions) {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner).remove(name);
    }
}
