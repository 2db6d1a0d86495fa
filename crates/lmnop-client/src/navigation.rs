//! Where the user currently is, and how to send them elsewhere.
//!
//! The gateway forces a trip to the login page when the backend rejects a
//! credential, and the access guard redirects on failed checks. Both go
//! through a [`Navigator`] so front-ends decide what "navigate" means.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::info;

/// Current location plus a way to change it.
pub trait Navigator: Send + Sync + fmt::Debug {
    /// Path of the page currently shown.
    fn current_path(&self) -> String;

    /// Moves to `path`.
    fn navigate(&self, path: &str);
}

#[derive(Debug)]
struct LocationState {
    current: String,
    redirects: Vec<String>,
}

/// In-memory [`Navigator`] that records every navigation.
#[derive(Debug)]
pub struct Location {
    state: Mutex<LocationState>,
}

impl Location {
    /// Starts at `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(LocationState {
                current: path.into(),
                redirects: Vec::new(),
            }),
        }
    }

    /// Every path navigated to, oldest first.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .redirects
            .clone()
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for Location {
    fn current_path(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    fn navigate(&self, path: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        info!(from = %state.current, to = %path, "Navigating");
        state.current = path.to_string();
        state.redirects.push(path.to_string());
    }
}
