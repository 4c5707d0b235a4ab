//! Storage for the access and refresh tokens
//!
//! Tokens are opaque strings. Nothing here knows when they expire: expiry is only discovered when the
//! server rejects a request (see [`crate::client`]).

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::Error;


/// A pair of tokens handed out by the server
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

/// Tokens must never end up in logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}


/// Something that holds the current credentials
///
/// Methods take `&self`, so that a single store can be shared between concurrent requests.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    /// Replace both tokens
    fn set_tokens(&self, access_token: &str, refresh_token: &str);
    /// Forget both tokens
    fn clear(&self);

    /// Whether there is an access token. It may have expired though
    fn is_authenticated(&self) -> bool {
        self.access_token().map_or(false, |t| t.is_empty() == false)
    }
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn access_token(&self) -> Option<String> { (**self).access_token() }
    fn refresh_token(&self) -> Option<String> { (**self).refresh_token() }
    fn set_tokens(&self, access_token: &str, refresh_token: &str) { (**self).set_tokens(access_token, refresh_token) }
    fn clear(&self) { (**self).clear() }
}


fn lock(creds: &Mutex<Option<Credentials>>) -> MutexGuard<'_, Option<Credentials>> {
    match creds.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}


/// A store that only lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    creds: Mutex<Option<Credentials>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        let store = Self::new();
        store.set_tokens(access_token, refresh_token);
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        lock(&self.creds).as_ref().map(|c| c.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        lock(&self.creds).as_ref().map(|c| c.refresh_token.clone())
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        *lock(&self.creds) = Some(Credentials {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        });
    }

    fn clear(&self) {
        *lock(&self.creds) = None;
    }
}


/// A store that persists the tokens in a JSON file, so that they survive restarts
#[derive(Debug)]
pub struct FileTokenStore {
    backing_file: PathBuf,
    creds: Mutex<Option<Credentials>>,
}

impl FileTokenStore {
    /// Initialize a store from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        let creds = serde_json::from_reader(file)?;

        Ok(Self {
            backing_file: PathBuf::from(path),
            creds: Mutex::new(Some(creds)),
        })
    }

    /// Initialize an empty store. Nothing is written until tokens are set
    pub fn new(path: &Path) -> Self {
        Self {
            backing_file: PathBuf::from(path),
            creds: Mutex::new(None),
        }
    }

    /// Load the backing file if it is valid, or start with an empty store
    pub fn open(path: &Path) -> Self {
        if path.exists() == false {
            return Self::new(path);
        }
        match Self::from_file(path) {
            Ok(store) => store,
            Err(err) => {
                log::warn!("Invalid credentials file {:?}: {}. Starting logged out", path, err);
                Self::new(path)
            }
        }
    }

    pub fn backing_file(&self) -> &Path {
        &self.backing_file
    }

    /// Write the current tokens to the backing file, or remove it when there are none.
    ///
    /// [`TokenStore::set_tokens`] and [`TokenStore::clear`] already do this, but can only log their failures
    pub fn save(&self) -> Result<(), Error> {
        let guard = lock(&self.creds);
        match guard.as_ref() {
            Some(creds) => self.write_file(creds),
            None => self.delete_file(),
        }
    }

    /// The file is only readable by its owner
    fn write_file(&self, creds: &Credentials) -> Result<(), Error> {
        let path = &self.backing_file;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::File::create(path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        serde_json::to_writer(file, creds)?;
        Ok(())
    }

    fn delete_file(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.backing_file) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        lock(&self.creds).as_ref().map(|c| c.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        lock(&self.creds).as_ref().map(|c| c.refresh_token.clone())
    }

    fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        let creds = Credentials {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        };
        let mut guard = lock(&self.creds);
        if let Err(err) = self.write_file(&creds) {
            log::error!("Unable to save credentials to {:?}: {}. The session will not outlive this process", self.backing_file, err);
        }
        *guard = Some(creds);
    }

    fn clear(&self) {
        let mut guard = lock(&self.creds);
        if let Err(err) = self.delete_file() {
            log::error!("Unable to remove credentials file {:?}: {}", self.backing_file, err);
        }
        *guard = None;
    }
}
