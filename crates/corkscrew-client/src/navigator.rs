use std::sync::Mutex;

/// What the client does to the currently displayed route
pub trait Navigator: Send + Sync {
    /// Move to `path`, replacing the current history entry
    fn replace(&self, path: &str);

    /// Re-fetch the current server-rendered route
    fn refresh(&self);
}

/// Navigator for terminal use: there is no page to re-render, so it only logs
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn replace(&self, path: &str) {
        tracing::info!("Navigate to {}", path);
    }

    fn refresh(&self) {
        tracing::info!("Server-rendered view is stale, refreshing");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Replace(String),
    Refresh,
}

/// Keeps every navigation in order
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    log: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn refresh_count(&self) -> usize {
        self.history()
            .iter()
            .filter(|n| **n == Navigation::Refresh)
            .count()
    }

    fn push(&self, navigation: Navigation) {
        if let Ok(mut log) = self.log.lock() {
            log.push(navigation);
        }
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        self.push(Navigation::Replace(path.to_string()));
    }

    fn refresh(&self) {
        self.push(Navigation::Refresh);
    }
}
