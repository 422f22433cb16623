use axum::response::Response;
use corkscrew_backend::JobRepo;

use super::{job_cards, Page};
use crate::error::PageError;
use crate::render;

const FEATURED_JOBS: usize = 3;

/// GET / - landing page with the newest open jobs
#[tracing::instrument(skip(page))]
pub async fn home(page: Page) -> Result<Response, PageError> {
    let jobs = match JobRepo::list_featured(page.db(), &page.scope(), FEATURED_JOBS).await {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::warn!("Failed to load featured jobs: {}", e);
            Vec::new()
        }
    };

    let mut context = page.context();
    context.insert("jobs", &job_cards(&jobs));
    Ok(render::html("home.html", &context))
}
