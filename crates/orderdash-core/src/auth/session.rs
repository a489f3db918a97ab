use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Role;

/// The signed-in user as last confirmed by the server.
///
/// Every field is absent until the first successful auth check. When
/// `is_authenticated` is true the rest of the record came from one
/// successful check; it is never partially overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSession {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub last_login: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub notes: Option<String>,
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
}

impl UserSession {
    /// True once the record carries a user identity.
    pub fn has_identity(&self) -> bool {
        self.user_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_some_and(|role| role.is_admin())
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn display_name(&self) -> String {
        let name = crate::utils::full_name(self.first_name.as_deref(), self.last_name.as_deref());
        match (name.is_empty(), &self.email) {
            (false, _) => name,
            (true, Some(email)) => email.clone(),
            (true, None) => "anonymous".to_string(),
        }
    }
}

/// Process-wide holder of the `UserSession`, persisted as JSON so it
/// survives restarts.
///
/// Anyone may read a snapshot; only the auth guard writes.
pub struct UserSessionStore {
    path: Option<PathBuf>,
    state: RwLock<UserSession>,
}

impl UserSessionStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(UserSession::default()),
        }
    }

    /// Load the persisted session from `path`, starting empty if the file
    /// does not exist yet.
    pub fn load(path: PathBuf) -> Result<Self> {
        let session = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read user session file")?;
            serde_json::from_str(&contents).context("Failed to parse user session file")?
        } else {
            UserSession::default()
        };

        Ok(Self {
            path: Some(path),
            state: RwLock::new(session),
        })
    }

    pub fn snapshot(&self) -> UserSession {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the whole record.
    pub(crate) fn replace(&self, session: UserSession) -> Result<()> {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = session;
        self.save()
    }

    /// Return to the signed-out default.
    pub(crate) fn reset(&self) -> Result<()> {
        self.replace(UserSession::default())
    }

    fn save(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, contents).context("Failed to write user session file")?;
        Ok(())
    }
}
