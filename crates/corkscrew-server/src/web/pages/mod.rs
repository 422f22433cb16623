pub mod auth;
pub mod dashboard;
pub mod home;
pub mod jobs;
pub mod messages;
pub mod profile;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use corkscrew_backend::{AccessScope, Backend};
use corkscrew_common::models::{Job, Session};
use serde::Serialize;
use std::sync::Arc;
use tera::Context;

use crate::error::PageError;
use crate::render;
use crate::session::CurrentSession;
use crate::state::AppState;

pub fn build_page_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home::home))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/new", get(jobs::new_job))
        .route("/jobs/{id}", get(jobs::job_detail))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/profile", get(profile::profile))
        .route("/messages", get(messages::messages))
        .route("/auth/sign-in", get(auth::sign_in))
        .route("/auth/sign-up", get(auth::sign_up))
        .route("/setup", get(setup))
}

/// Request context for a page render: the configured backend and the
/// restored session. Rejects with a redirect to `/setup` when the backend is
/// not configured.
pub struct Page {
    pub backend: Arc<dyn Backend>,
    pub session: Option<Session>,
}

impl FromRequestParts<Arc<AppState>> for Page {
    type Rejection = PageError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let backend = state.backend.clone().ok_or(PageError::SetupRequired)?;
        let session = parts
            .extensions
            .get::<CurrentSession>()
            .and_then(|current| current.0.clone());
        Ok(Page { backend, session })
    }
}

impl Page {
    pub fn db(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn scope(&self) -> AccessScope {
        AccessScope::for_session(self.session.as_ref())
    }

    pub fn require_session(&self) -> Result<&Session, PageError> {
        self.session.as_ref().ok_or(PageError::SignInRequired)
    }

    /// Redirect signed-in viewers away from the auth pages
    pub fn require_anonymous(&self) -> Result<(), PageError> {
        match self.session {
            Some(_) => Err(PageError::Redirect("/dashboard".into())),
            None => Ok(()),
        }
    }

    pub fn context(&self) -> Context {
        base_context(self.session.as_ref())
    }
}

/// Layout variables every page needs. The access token lets the client's
/// session bridge compare against what the server rendered with.
pub fn base_context(session: Option<&Session>) -> Context {
    let mut context = Context::new();
    context.insert("signed_in", &session.is_some());
    context.insert(
        "viewer_email",
        &session.and_then(|s| s.user.email.as_deref()),
    );
    context.insert(
        "server_access_token",
        &session.map(|s| s.access_token.as_str()),
    );
    context
}

/// Job as shown on cards and the detail page
#[derive(Debug, Serialize)]
pub struct JobCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub hours: Option<String>,
    pub location: String,
    pub rate: String,
    pub status: &'static str,
}

impl From<&Job> for JobCard {
    fn from(job: &Job) -> Self {
        let hours = match (job.start_time, job.end_time) {
            (Some(start), Some(end)) => {
                Some(format!("{} to {}", start.format("%H:%M"), end.format("%H:%M")))
            }
            (Some(start), None) => Some(format!("From {}", start.format("%H:%M"))),
            _ => None,
        };
        Self {
            id: job.id.to_string(),
            title: job.title.clone(),
            description: job.description.clone(),
            date: format_date(job.event_date),
            hours,
            location: job.location.clone(),
            rate: job.rate_label(),
            status: job.status.as_str(),
        }
    }
}

pub fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn job_cards(jobs: &[Job]) -> Vec<JobCard> {
    jobs.iter().map(JobCard::from).collect()
}

/// GET /setup
pub async fn setup() -> Response {
    render::html("setup.html", &base_context(None))
}

/// Fallback for unknown paths
pub async fn not_found() -> Response {
    render::not_found()
}
