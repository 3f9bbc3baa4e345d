//! Signed-in user, persisted to a local JSON file, and the route guard that
//! keeps protected screens behind it.

use crate::Result;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Derivative, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Debug)]
pub struct Session {
    pub user: User,
    #[derivative(Debug = "ignore")]
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Landing,
    SignIn,
    SignUp,
    Dashboard,
    Upload,
    Profile,
}

impl Route {
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Upload | Route::Profile)
    }
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: Option<Session>,
}

impl SessionStore {
    /// Open the store at `path`, restoring a previously saved session.
    ///
    /// A missing file means signed out; an unreadable one is logged and
    /// treated the same way.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match Self::read(&path) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        };
        if let Some(session) = &current {
            tracing::info!(user = %session.user.email, "Restored session");
        }
        Self { path, current }
    }

    fn read(path: &Path) -> Result<Option<Session>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn user(&self) -> Option<&User> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Keep the session in memory and write it to disk.
    pub fn sign_in(&mut self, session: Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&session)?)?;
        tracing::info!(user = %session.user.email, "Signed in");
        self.current = Some(session);
        Ok(())
    }

    /// Drop the session and its file; returns where the user goes next.
    pub fn logout(&mut self) -> Result<Route> {
        self.current = None;
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!("Signed out");
        Ok(Route::SignIn)
    }

    /// The route actually shown when `requested` is asked for.
    pub fn guard(&self, requested: Route) -> Route {
        if requested.is_protected() && !self.is_authenticated() {
            tracing::debug!(?requested, "Redirecting to sign in");
            Route::SignIn
        } else {
            requested
        }
    }
}
