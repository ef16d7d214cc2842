//! Sign-in redirection seam.

use std::fmt;
use std::sync::Mutex;

/// Where the console currently is and how to move it elsewhere.
///
/// The adapter only needs this to send the user to the sign-in entry point
/// after the API rejects the credential.
pub trait Navigator: Send + Sync + fmt::Debug + 'static {
    /// Current location path (without query string).
    fn current_path(&self) -> String;

    /// Navigate to `target` (path plus optional query string).
    fn redirect(&self, target: &str);
}

/// Navigator that records redirects in memory.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavState>,
}

#[derive(Debug)]
struct NavState {
    current: String,
    history: Vec<String>,
}

impl MemoryNavigator {
    /// Start at the given path.
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavState {
                current: start.into(),
                history: Vec::new(),
            }),
        }
    }

    /// Every redirect target, oldest first.
    pub fn redirects(&self) -> Vec<String> {
        self.with_state(|s| s.history.clone())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut NavState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.with_state(|s| s.current.clone())
    }

    fn redirect(&self, target: &str) {
        self.with_state(|s| {
            s.current = target.split('?').next().unwrap_or(target).to_string();
            s.history.push(target.to_string());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_updates_path_without_query() {
        let nav = MemoryNavigator::new("/admin/documents");
        nav.redirect("/login?reason=session_expired");
        assert_eq!(nav.current_path(), "/login");
        assert_eq!(nav.redirects(), vec!["/login?reason=session_expired"]);
    }
}
