use crate::models::Session;

/// Relationship between the session a page was rendered with and the session
/// the client currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Same access token (or both anonymous); nothing to do
    InSync,
    /// The rendered page reflects a different identity or token and must be
    /// re-fetched from the server
    Diverged,
}

impl SyncState {
    /// Compare the token the server rendered with against a freshly observed session
    pub fn evaluate(server_access_token: Option<&str>, session: Option<&Session>) -> Self {
        let client_token = session.map(|s| s.access_token.as_str());
        if client_token == server_access_token {
            SyncState::InSync
        } else {
            SyncState::Diverged
        }
    }

    pub fn needs_refresh(self) -> bool {
        self == SyncState::Diverged
    }
}
