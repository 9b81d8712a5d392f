/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// OAuth token and its secret.
///
/// Used both for the short lived request token of the handshake and for the long lived
/// access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    token: String,
    secret: String,
}

impl Credential {
    pub fn new(token: &str, secret: &str) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_secret(&self) -> &str {
        &self.secret
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty() || self.secret.is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"xxx")
            .field("secret", &"xxx")
            .finish()
    }
}

/// What gets persisted once the handshake completes: the access credential and the user
/// it was confirmed for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub credential: Credential,
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Durable storage for the single access grant
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<AccessGrant>, FlickrError>;

    /// Replaces any previously saved grant
    fn save(&self, grant: &AccessGrant) -> Result<(), FlickrError>;

    fn clear(&self) -> Result<(), FlickrError>;
}

/// Keeps the grant in memory only; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    grant: RwLock<Option<AccessGrant>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `grant`
    pub fn with_grant(grant: AccessGrant) -> Self {
        Self {
            grant: RwLock::new(Some(grant)),
        }
    }
}

fn poisoned<T>(_: T) -> FlickrError {
    FlickrError::CredentialStore("credential store lock poisoned".to_string())
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<AccessGrant>, FlickrError> {
        Ok(self.grant.read().map_err(poisoned)?.clone())
    }

    fn save(&self, grant: &AccessGrant) -> Result<(), FlickrError> {
        *self.grant.write().map_err(poisoned)? = Some(grant.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), FlickrError> {
        *self.grant.write().map_err(poisoned)? = None;
        Ok(())
    }
}

/// Stores the grant as JSON in a single file.
///
/// Saves write a sibling temp file and rename it over the target so a reader never sees a
/// half written grant.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<AccessGrant>, FlickrError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let grant: AccessGrant = serde_json::from_str(&data)?;
        if grant.credential.is_empty() {
            return Ok(None);
        }
        Ok(Some(grant))
    }

    fn save(&self, grant: &AccessGrant) -> Result<(), FlickrError> {
        let temp = self.temp_path();
        fs::write(&temp, serde_json::to_vec_pretty(grant)?)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), FlickrError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
