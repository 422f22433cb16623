use axum::extract::{Path, Query};
use axum::response::Response;
use corkscrew_backend::{ApplicationRepo, JobRepo, JobSearch, ProfileRepo};
use corkscrew_common::models::{Profile, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{job_cards, JobCard, Page};
use crate::error::PageError;
use crate::render;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct JobsQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub date: String,
}

impl JobsQuery {
    fn to_search(&self) -> JobSearch {
        let keep = |v: &str| Some(v.to_string()).filter(|v| !v.trim().is_empty());
        JobSearch {
            query: keep(&self.q),
            location: keep(&self.location),
            role: keep(&self.role),
            date: keep(&self.date),
        }
    }
}

/// The signed-in viewer's profile, if any. Lookup failures count as none.
async fn viewer_profile(page: &Page) -> Option<Profile> {
    let session = page.session.as_ref()?;
    match ProfileRepo::get(page.db(), &page.scope(), session.user.id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("Failed to load viewer profile: {}", e);
            None
        }
    }
}

/// GET /jobs - open jobs matching the filter form
#[tracing::instrument(skip(page))]
pub async fn list_jobs(page: Page, Query(filters): Query<JobsQuery>) -> Result<Response, PageError> {
    let search = filters.to_search();
    let scope = page.scope();

    let (jobs, profile) = tokio::join!(
        JobRepo::search(page.db(), &scope, &search),
        viewer_profile(&page),
    );
    let jobs = jobs.unwrap_or_else(|e| {
        tracing::warn!("Job search failed: {}", e);
        Vec::new()
    });

    let mut context = page.context();
    context.insert("jobs", &job_cards(&jobs));
    context.insert("filters", &filters);
    context.insert(
        "can_post",
        &profile.is_some_and(|p| p.role == Role::Hire),
    );
    Ok(render::html("jobs.html", &context))
}

/// GET /jobs/new - only hiring profiles may post
#[tracing::instrument(skip(page))]
pub async fn new_job(page: Page) -> Result<Response, PageError> {
    let session = page.require_session()?;
    let profile = ProfileRepo::get(page.db(), &page.scope(), session.user.id).await;
    match profile {
        Ok(Some(profile)) if profile.role == Role::Hire => {
            Ok(render::html("job_new.html", &page.context()))
        }
        _ => Err(PageError::Redirect("/dashboard".into())),
    }
}

#[derive(Debug, Serialize)]
struct HostView {
    name: String,
    bio: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApplicationView {
    worker_short: String,
    status: &'static str,
    cover_letter: Option<String>,
    applied_on: String,
}

/// GET /jobs/{id}
#[tracing::instrument(skip(page))]
pub async fn job_detail(page: Page, Path(id): Path<String>) -> Result<Response, PageError> {
    let id = Uuid::parse_str(&id).map_err(|_| PageError::NotFound)?;
    let scope = page.scope();

    let job = match JobRepo::get(page.db(), &scope, id).await {
        Ok(Some(job)) => job,
        Ok(None) => return Err(PageError::NotFound),
        Err(e) => {
            tracing::warn!("Failed to load job {}: {}", id, e);
            return Err(PageError::NotFound);
        }
    };

    let (client, viewer) = tokio::join!(
        ProfileRepo::get(page.db(), &scope, job.client_id),
        viewer_profile(&page),
    );
    let client = client.unwrap_or_else(|e| {
        tracing::warn!("Failed to load host profile: {}", e);
        None
    });

    let mut applications = Vec::new();
    let mut has_applied = false;
    if let Some(session) = &page.session {
        applications = ApplicationRepo::list_for_job(page.db(), &scope, id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to load applications: {}", e);
                Vec::new()
            });
        has_applied = applications
            .iter()
            .any(|application| application.worker_id == session.user.id);
    }

    let is_owner = viewer.as_ref().is_some_and(|p| p.id == job.client_id);

    let mut context = page.context();
    context.insert("job", &JobCard::from(&job));
    context.insert(
        "client",
        &client.map(|c| HostView {
            name: c.full_name.unwrap_or_else(|| "Client".to_string()),
            bio: c.bio,
            location: c.location,
        }),
    );
    context.insert("is_owner", &is_owner);
    context.insert(
        "applications",
        &applications
            .iter()
            .map(|a| ApplicationView {
                worker_short: a.worker_id.to_string().chars().take(8).collect(),
                status: a.status.as_str(),
                cover_letter: a.cover_letter.clone(),
                applied_on: a.created_at.format("%b %-d, %Y %H:%M").to_string(),
            })
            .collect::<Vec<_>>(),
    );
    context.insert("viewer_role", &viewer.map(|p| p.role.as_str()));
    context.insert("has_applied", &has_applied);
    Ok(render::html("job_detail.html", &context))
}
