use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use corkscrew_backend::BackendError;
use thiserror::Error;

use crate::render;

/// Everything a page handler can fail with. `IntoResponse` is the single
/// error boundary for page routes.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("backend is not configured")]
    SetupRequired,

    #[error("sign in required")]
    SignInRequired,

    #[error("redirect to {0}")]
    Redirect(String),

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::SetupRequired => Redirect::to("/setup").into_response(),
            PageError::SignInRequired => Redirect::to("/auth/sign-in").into_response(),
            PageError::Redirect(path) => Redirect::to(&path).into_response(),
            PageError::NotFound => render::not_found(),
            PageError::Backend(e) => {
                tracing::error!("Page failed on backend error: {}", e);
                render::failure(StatusCode::INTERNAL_SERVER_ERROR)
            }
            PageError::Internal(e) => {
                tracing::error!("Page failed: {:#}", e);
                render::failure(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
