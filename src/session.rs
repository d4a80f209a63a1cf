use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const SESSION_DIR: &str = "voltrix_admin";
const SESSION_FILE: &str = "session.json";
pub const SESSION_FILE_ENV: &str = "VOLTRIX_SESSION_FILE";
pub const DEFAULT_DISPLAY_NAME: &str = "VOLTRIX";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Allow,
    RedirectToLogin,
}

/// Operator session shared by the fetch client and the dashboard.
///
/// `save` creates the session and `clear` destroys it. Reads always go through
/// the in-memory copy, which mirrors the file at `path` when one is set.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    inner: Mutex<StoredSession>,
}

impl SessionStore {
    pub fn open(path: Option<PathBuf>) -> Self {
        let stored = path.as_deref().and_then(load_file).unwrap_or_default();
        Self {
            path,
            inner: Mutex::new(stored),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(None)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn save(&self, token: &str, username: &str) -> Result<()> {
        let mut guard = self.lock();
        let next = StoredSession {
            token: Some(token.trim().to_string()),
            username: Some(username.trim().to_string()),
        };
        if let Some(path) = self.path.as_deref() {
            write_file(path, &next)?;
        }
        *guard = next;
        log::info!("session saved for {}", username.trim());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let mut guard = self.lock();
        *guard = StoredSession::default();
        if let Some(path) = self.path.as_deref()
            && path.exists()
        {
            fs::remove_file(path)
                .with_context(|| format!("remove session file {}", path.display()))?;
        }
        log::info!("session cleared");
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.lock()
            .token
            .clone()
            .filter(|token| !token.trim().is_empty())
    }

    pub fn username(&self) -> Option<String> {
        self.lock()
            .username
            .clone()
            .filter(|name| !name.trim().is_empty())
    }

    pub fn display_name(&self) -> String {
        self.username()
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())
    }

    /// Presence of a token is the only check.
    pub fn guard(&self) -> Guard {
        if self.token().is_some() {
            Guard::Allow
        } else {
            Guard::RedirectToLogin
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoredSession> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn default_session_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(SESSION_FILE_ENV)
        && !explicit.trim().is_empty()
    {
        return Some(PathBuf::from(explicit));
    }
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(SESSION_DIR).join(SESSION_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(SESSION_DIR)
            .join(SESSION_FILE),
    )
}

fn load_file(path: &Path) -> Option<StoredSession> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<StoredSession>(&raw) {
        Ok(stored) => Some(stored),
        Err(err) => {
            log::warn!("ignoring unreadable session file {}: {err}", path.display());
            None
        }
    }
}

fn write_file(path: &Path, stored: &StoredSession) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("create session dir {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(stored).context("serialize session")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write session")?;
    fs::rename(&tmp, path).context("swap session file")?;
    Ok(())
}
