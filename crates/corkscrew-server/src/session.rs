//! Server-side session store backed by two HttpOnly cookies.

use anyhow::Context;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use corkscrew_backend::Backend;
use corkscrew_common::models::{Claims, Session, SessionUser};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use uuid::Uuid;

use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "sb-access-token";
pub const REFRESH_COOKIE: &str = "sb-refresh-token";

/// Session restored for the current request, stored in request extensions
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

/// Read the claims of a backend access token. Signature is checked only when
/// `jwt_secret` is known; expiry is left to the caller.
pub fn decode_claims(token: &str, jwt_secret: Option<&str>) -> anyhow::Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    let key = match jwt_secret {
        Some(secret) => DecodingKey::from_secret(secret.as_bytes()),
        None => {
            validation.insecure_disable_signature_validation();
            DecodingKey::from_secret(&[])
        }
    };
    let data = jsonwebtoken::decode::<Claims>(token, &key, &validation)
        .context("Invalid access token")?;
    Ok(data.claims)
}

fn session_from_tokens(
    access_token: &str,
    refresh_token: &str,
    jwt_secret: Option<&str>,
) -> anyhow::Result<Session> {
    let claims = decode_claims(access_token, jwt_secret)?;
    let id = Uuid::parse_str(&claims.sub).context("Access token subject is not a user id")?;
    Ok(Session {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        expires_at: Some(claims.exp),
        user: SessionUser {
            id,
            email: claims.email,
        },
    })
}

/// Cookie persistence for sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStore {
    pub secure: bool,
}

impl SessionStore {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }

    /// Persist `session` into the jar
    pub fn apply(&self, jar: CookieJar, session: &Session) -> CookieJar {
        jar.add(self.cookie(ACCESS_COOKIE, session.access_token.clone()))
            .add(self.cookie(REFRESH_COOKIE, session.refresh_token.clone()))
    }

    /// Remove both session cookies
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
            .remove(Cookie::build(REFRESH_COOKIE).path("/"))
    }

    /// Bring an incoming session up to date: keep it if the access token is
    /// live, refresh it through the backend if expired.
    pub async fn ensure_fresh(
        &self,
        backend: &dyn Backend,
        session: Session,
        now: i64,
    ) -> anyhow::Result<(Session, bool)> {
        if !session.is_expired_at(now) {
            return Ok((session, false));
        }
        let refreshed = backend
            .refresh_session(&session.refresh_token)
            .await
            .context("Failed to refresh expired session")?;
        Ok((refreshed, true))
    }

    /// Adopt tokens handed over by a client, refreshing them first if the
    /// access token already expired
    pub async fn adopt(
        &self,
        backend: &dyn Backend,
        access_token: &str,
        refresh_token: &str,
        jwt_secret: Option<&str>,
    ) -> anyhow::Result<Session> {
        let session = session_from_tokens(access_token, refresh_token, jwt_secret)?;
        let now = chrono::Utc::now().timestamp();
        let (session, _) = self.ensure_fresh(backend, session, now).await?;
        Ok(session)
    }

    /// Session for a request's cookies. Any failure yields no session and a
    /// jar with the cookies cleared.
    pub async fn restore(
        &self,
        jar: CookieJar,
        backend: &dyn Backend,
        jwt_secret: Option<&str>,
    ) -> (Option<Session>, CookieJar) {
        let access = jar.get(ACCESS_COOKIE).map(|c| c.value().to_string());
        let refresh = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
        let now = chrono::Utc::now().timestamp();

        let restored = match (access, refresh) {
            (None, None) => return (None, jar),
            (Some(access), Some(refresh)) => {
                match session_from_tokens(&access, &refresh, jwt_secret) {
                    Ok(session) => self.ensure_fresh(backend, session, now).await,
                    Err(e) => Err(e),
                }
            }
            (None, Some(refresh)) => backend
                .refresh_session(&refresh)
                .await
                .map(|s| (s, true))
                .context("Failed to restore session from refresh token"),
            (Some(_), None) => Err(anyhow::anyhow!("Session cookie without refresh token")),
        };

        match restored {
            Ok((session, changed)) => {
                let jar = if changed {
                    tracing::debug!(user_id = %session.user.id, "Session refreshed");
                    self.apply(jar, &session)
                } else {
                    jar
                };
                (Some(session), jar)
            }
            Err(e) => {
                tracing::debug!("Dropping session cookies: {:#}", e);
                (None, self.clear(jar))
            }
        }
    }
}

/// Middleware restoring the cookie session for page routes
pub async fn restore_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(backend) = state.backend.clone() else {
        request.extensions_mut().insert(CurrentSession(None));
        return next.run(request).await;
    };

    let (session, jar) = state
        .session_store
        .restore(jar, backend.as_ref(), state.jwt_secret())
        .await;
    request.extensions_mut().insert(CurrentSession(session));
    let response = next.run(request).await;
    (jar, response).into_response()
}
