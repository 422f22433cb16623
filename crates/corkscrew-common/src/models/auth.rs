use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user attached to a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Live authentication session as issued by the backend auth API.
///
/// Extra fields in the backend payload (`token_type`, `expires_in`, user
/// metadata) are ignored on deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) after which the access token is rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub user: SessionUser,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// True when the access token is past its expiry at `now` (unix seconds).
    /// Sessions without a known expiry never count as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(exp) if exp <= now)
    }
}

/// Session lifecycle events emitted by the auth client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
    #[serde(other)]
    Unknown,
}

impl AuthEvent {
    /// Events whose session should replace whatever the server currently holds
    pub fn carries_new_session(self) -> bool {
        matches!(
            self,
            AuthEvent::SignedIn | AuthEvent::TokenRefreshed | AuthEvent::UserUpdated
        )
    }
}

/// A single session-change notification: `{event, session}`.
///
/// This is also the body posted to `/auth/callback`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl AuthChange {
    pub fn new(event: AuthEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }
}

/// JWT claims carried by backend access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub role: Option<String>,
}
