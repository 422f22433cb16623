use axum::response::Response;

use super::Page;
use crate::error::PageError;
use crate::render;

/// GET /auth/sign-in
pub async fn sign_in(page: Page) -> Result<Response, PageError> {
    page.require_anonymous()?;
    Ok(render::html("sign_in.html", &page.context()))
}

/// GET /auth/sign-up
pub async fn sign_up(page: Page) -> Result<Response, PageError> {
    page.require_anonymous()?;
    Ok(render::html("sign_up.html", &page.context()))
}
