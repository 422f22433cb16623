use corkscrew_common::models::{AuthChange, AuthEvent};
use corkscrew_common::SyncState;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::BackendClient;
use crate::forwarder::SessionForwarder;
use crate::navigator::Navigator;

/// Keeps the server-rendered view and the client session from diverging.
///
/// The bridge is mounted once with the access token the page was rendered
/// with. While observing, every session change is compared against that token
/// (a mismatch re-fetches the route) and forwarded to the server.
pub struct SessionBridge {
    client: Arc<BackendClient>,
    server_access_token: Option<String>,
    navigator: Arc<dyn Navigator>,
    forwarder: Arc<dyn SessionForwarder>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionBridge {
    pub fn new(
        client: Arc<BackendClient>,
        server_access_token: Option<String>,
        navigator: Arc<dyn Navigator>,
        forwarder: Arc<dyn SessionForwarder>,
    ) -> Self {
        Self {
            client,
            server_access_token,
            navigator,
            forwarder,
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    /// Start observing session changes. Must be called within a tokio runtime.
    ///
    /// Only the first call subscribes; later calls (and calls after
    /// [`teardown`](Self::teardown)) do nothing.
    pub fn observe(&self) {
        let mut task = match self.task.lock() {
            Ok(task) => task,
            Err(poisoned) => poisoned.into_inner(),
        };
        if task.is_some() || self.cancel.is_cancelled() {
            return;
        }

        // Snapshot and subscription are taken together: a change is either in
        // the initial session or on the receiver, never both
        let (current, receiver) = self.client.subscribe_from_current();
        let initial = AuthChange::new(AuthEvent::InitialSession, current);
        let observer = Observer {
            server_access_token: self.server_access_token.clone(),
            navigator: self.navigator.clone(),
            forwarder: self.forwarder.clone(),
        };
        let cancel = self.cancel.clone();
        *task = Some(tokio::spawn(observer.run(initial, receiver, cancel)));
        tracing::debug!("Session bridge observing");
    }

    pub fn is_observing(&self) -> bool {
        let started = self
            .task
            .lock()
            .map(|task| task.is_some())
            .unwrap_or(false);
        started && !self.cancel.is_cancelled()
    }

    /// Release the subscription
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    /// Tear down and wait for the observer task to finish
    pub async fn shutdown(&self) {
        self.teardown();
        let handle = match self.task.lock() {
            Ok(mut task) => task.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!("Session bridge task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for SessionBridge {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Observer {
    server_access_token: Option<String>,
    navigator: Arc<dyn Navigator>,
    forwarder: Arc<dyn SessionForwarder>,
}

impl Observer {
    async fn run(
        self,
        initial: AuthChange,
        mut receiver: broadcast::Receiver<AuthChange>,
        cancel: CancellationToken,
    ) {
        self.handle(&initial);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = receiver.recv() => match received {
                    Ok(change) => {
                        self.handle(&change);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Session bridge fell behind, skipped {} notifications", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        tracing::debug!("Session bridge stopped");
    }

    fn handle(&self, change: &AuthChange) -> SyncState {
        let state = SyncState::evaluate(self.server_access_token.as_deref(), change.session.as_ref());
        if state.needs_refresh() {
            tracing::debug!("Session diverged from rendered page on {:?}", change.event);
            self.navigator.refresh();
        }
        self.forwarder.forward(change);
        state
    }
}
