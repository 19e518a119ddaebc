//! Session context: who is using the client right now.
//!
//! The identity lives in a small JSON file next to the working directory and is
//! handed to every view explicitly. Nothing is reconciled with the backend; the
//! file holds whatever the last completed signup, login or role switch wrote.
//! Two client processes sharing the file race with last-write-wins.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use crate::error::SessionError;
use crate::models::Role;

/// Identifier sent to the backend when nobody has signed up or logged in
pub const GUEST_ID: &str = "guest";

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Principal {
    #[default]
    Guest,
    User(String),
}

impl Principal {
    /// Empty ids are treated as guest
    pub fn from_user_id(user_id: Option<String>) -> Self {
        match user_id {
            Some(id) if !id.trim().is_empty() => Principal::User(id),
            _ => Principal::Guest,
        }
    }

    /// Id used in request bodies and URL paths
    pub fn id(&self) -> &str {
        match self {
            Principal::Guest => GUEST_ID,
            Principal::User(id) => id,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Principal::Guest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub principal: Principal,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            principal: Principal::from_user_id(Some(user_id.into())),
            role,
        }
    }
}

/// On-disk shape; both keys optional, no versioning
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

/// File-backed identity storage
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is a guest customer
    pub fn load(&self) -> Result<Identity, SessionError> {
        if !self.path.exists() {
            debug!("No session file at {}, starting as guest", self.path.display());
            return Ok(Identity::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Identity::default());
        }

        let stored: StoredIdentity = serde_json::from_str(&content)?;
        Ok(Identity {
            principal: Principal::from_user_id(stored.user_id),
            role: stored.role.as_deref().map(Role::parse_lenient).unwrap_or_default(),
        })
    }

    pub fn save(&self, identity: &Identity) -> Result<(), SessionError> {
        let stored = StoredIdentity {
            user_id: match &identity.principal {
                Principal::Guest => None,
                Principal::User(id) => Some(id.clone()),
            },
            role: Some(identity.role.as_str().to_string()),
        };
        let content = serde_json::to_string_pretty(&stored)?;

        // Readers only ever see a complete file; each writer gets its own temp name
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .path
            .with_extension(format!("{}.{}.tmp", std::process::id(), seq));
        fs::write(&tmp, content)?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        debug!("Saved session to {}", self.path.display());
        Ok(())
    }
}

/// Session context passed to every view
#[derive(Debug, Clone)]
pub struct Session {
    store: Option<SessionStore>,
    identity: Identity,
}

impl Session {
    /// Load the identity from the store
    pub fn open(store: SessionStore) -> Result<Self, SessionError> {
        let identity = store.load()?;
        info!("Session opened as {} ({})", identity.principal.id(), identity.role);
        Ok(Self {
            store: Some(store),
            identity,
        })
    }

    /// Guest session that overwrites whatever the store held on the next write
    pub fn fresh(store: SessionStore) -> Self {
        Self {
            store: Some(store),
            identity: Identity::default(),
        }
    }

    /// Session that is never written to disk
    pub fn ephemeral(identity: Identity) -> Self {
        Self { store: None, identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// `user_id`, or `"guest"` when none is stored
    pub fn user_id(&self) -> &str {
        self.identity.principal.id()
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// Replace the whole identity; the previous one is not merged or invalidated
    pub fn set_identity(&mut self, identity: Identity) -> Result<(), SessionError> {
        self.identity = identity;
        self.persist()
    }

    pub fn set_role(&mut self, role: Role) -> Result<(), SessionError> {
        self.identity.role = role;
        self.persist()
    }

    fn persist(&self) -> Result<(), SessionError> {
        match &self.store {
            Some(store) => store.save(&self.identity),
            None => Ok(()),
        }
    }
}
