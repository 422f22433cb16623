use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::CookieJar;
use corkscrew_common::models::AuthEvent;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::session::ACCESS_COOKIE;
use crate::state::AppState;

/// Tokens of the session the client just saw. Other session fields are
/// ignored.
#[derive(Debug, Deserialize)]
pub struct CallbackSession {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackPayload {
    pub event: AuthEvent,
    #[serde(default)]
    pub session: Option<CallbackSession>,
}

/// POST /auth/callback - mirror a client-side auth change into the cookie
/// session. Always answers `{"success": true}`.
#[tracing::instrument(skip_all)]
pub async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<CallbackPayload>, JsonRejection>,
) -> (CookieJar, Json<Value>) {
    let success = Json(json!({ "success": true }));

    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(e) => {
            tracing::warn!("Ignoring malformed auth callback: {}", e);
            return (jar, success);
        }
    };

    let Some(backend) = state.backend.clone() else {
        tracing::debug!("Auth callback received before backend is configured");
        return (jar, success);
    };

    let jar = match (payload.event, payload.session) {
        (event, Some(tokens)) if event.carries_new_session() => {
            match state
                .session_store
                .adopt(
                    backend.as_ref(),
                    &tokens.access_token,
                    &tokens.refresh_token,
                    state.jwt_secret(),
                )
                .await
            {
                Ok(session) => {
                    tracing::info!(user_id = %session.user.id, ?event, "Session stored");
                    state.session_store.apply(jar, &session)
                }
                Err(e) => {
                    tracing::warn!("Failed to store session from callback: {:#}", e);
                    jar
                }
            }
        }
        (AuthEvent::SignedOut, _) => {
            if let Some(token) = jar.get(ACCESS_COOKIE).map(|c| c.value().to_string()) {
                if let Err(e) = backend.sign_out(&token).await {
                    tracing::debug!("Backend sign-out failed: {}", e);
                }
            }
            tracing::info!("Session cleared");
            state.session_store.clear(jar)
        }
        (event, _) => {
            tracing::debug!(?event, "Auth event needs no cookie change");
            jar
        }
    };

    (jar, success)
}
