use corkscrew_backend::{AccessScope, Backend, BackendResult, SignUpResult};
use corkscrew_common::models::{AuthChange, AuthEvent, Session};
use serde_json::Value;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Client-side handle on the backend: the current session plus a broadcast of
/// every session change.
///
/// The session slot is only written by the auth routines below; each write
/// publishes one [`AuthChange`] while the slot is still locked, so a reader
/// holding the slot sees either the session before a change or the change
/// itself, never both.
pub struct BackendClient {
    backend: Arc<dyn Backend>,
    session: RwLock<Option<Session>>,
    changes: broadcast::Sender<AuthChange>,
}

impl BackendClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            session: RwLock::new(None),
            changes: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Receive every session change published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }

    /// The current session together with a receiver for every change after it
    pub fn subscribe_from_current(&self) -> (Option<Session>, broadcast::Receiver<AuthChange>) {
        let slot = self.read_slot();
        (slot.clone(), self.changes.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    pub fn session(&self) -> Option<Session> {
        self.read_slot().clone()
    }

    pub fn scope(&self) -> AccessScope {
        AccessScope::for_session(self.read_slot().as_ref())
    }

    /// Current session, refreshed first when its access token has expired.
    /// A failed refresh signs the client out locally.
    pub async fn live_session(&self) -> Option<Session> {
        let session = self.session()?;
        if !session.is_expired_at(chrono::Utc::now().timestamp()) {
            return Some(session);
        }
        match self.refresh().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Failed to refresh expired session: {}", e);
                self.replace(AuthEvent::SignedOut, None);
                None
            }
        }
    }

    /// Adopt a session obtained elsewhere (e.g. tokens saved by an earlier run)
    pub fn restore(&self, session: Session) {
        self.replace(AuthEvent::InitialSession, Some(session));
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        let session = self.backend.sign_in_with_password(email, password).await?;
        self.replace(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    #[tracing::instrument(skip(self, password, metadata))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> BackendResult<SignUpResult> {
        let result = self.backend.sign_up(email, password, metadata).await?;
        if let Some(session) = &result.session {
            self.replace(AuthEvent::SignedIn, Some(session.clone()));
        }
        Ok(result)
    }

    /// Exchange the refresh token for a new session. `Ok(None)` when signed out.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> BackendResult<Option<Session>> {
        let Some(current) = self.session() else {
            return Ok(None);
        };
        let session = self.backend.refresh_session(&current.refresh_token).await?;
        self.replace(AuthEvent::TokenRefreshed, Some(session.clone()));
        Ok(Some(session))
    }

    /// Revoke the session on the backend and forget it locally. The local
    /// session is cleared even when the backend call fails.
    #[tracing::instrument(skip(self))]
    pub async fn sign_out(&self) -> BackendResult<()> {
        let Some(current) = self.session() else {
            return Ok(());
        };
        let result = self.backend.sign_out(&current.access_token).await;
        self.replace(AuthEvent::SignedOut, None);
        result
    }

    fn replace(&self, event: AuthEvent, session: Option<Session>) {
        let mut slot = self.write_slot();
        *slot = session.clone();
        self.publish(AuthChange::new(event, session));
    }

    // A poisoned slot still holds a complete value
    fn read_slot(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.session.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.session.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn publish(&self, change: AuthChange) {
        tracing::debug!("Auth state changed: {:?}", change.event);
        // No receivers is fine
        let _ = self.changes.send(change);
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient").finish_non_exhaustive()
    }
}
