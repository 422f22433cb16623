use axum::response::Response;
use corkscrew_backend::{AccessScope, ApplicationRepo, Backend, JobRepo, ProfileRepo};
use corkscrew_common::models::{ApplicationStatus, Job, JobApplication, JobStatus, Role};
use serde::Serialize;
use uuid::Uuid;

use super::{job_cards, Page};
use crate::error::PageError;
use crate::render;

const RECOMMENDED_JOBS: usize = 10;

#[derive(Debug, Serialize)]
struct Stat {
    label: &'static str,
    value: usize,
}

fn or_empty<T>(result: corkscrew_backend::BackendResult<Vec<T>>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!("Failed to load {}: {}", what, e);
        Vec::new()
    })
}

/// Jobs posted by the host and every application they received
async fn hire_data(db: &dyn Backend, scope: &AccessScope, user_id: Uuid) -> (Vec<Job>, Vec<JobApplication>) {
    let jobs = or_empty(JobRepo::list_for_client(db, scope, user_id).await, "posted jobs");
    let ids: Vec<Uuid> = jobs.iter().map(|job| job.id).collect();
    let applications = or_empty(
        ApplicationRepo::list_for_jobs(db, scope, &ids).await,
        "received applications",
    );
    (jobs, applications)
}

/// Upcoming open jobs and the worker's own applications
async fn work_data(db: &dyn Backend, scope: &AccessScope, user_id: Uuid) -> (Vec<Job>, Vec<JobApplication>) {
    let applications = or_empty(
        ApplicationRepo::list_for_worker(db, scope, user_id).await,
        "applications",
    );
    let jobs = or_empty(
        JobRepo::list_open_upcoming(db, scope, RECOMMENDED_JOBS).await,
        "recommended jobs",
    );
    (jobs, applications)
}

/// GET /dashboard
#[tracing::instrument(skip(page))]
pub async fn dashboard(page: Page) -> Result<Response, PageError> {
    let session = page.require_session()?;
    let user_id = session.user.id;
    let scope = page.scope();

    let profile = ProfileRepo::get(page.db(), &scope, user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Profile not found"))?;

    let is_hire = profile.role == Role::Hire;
    let (jobs, applications) = if is_hire {
        hire_data(page.db(), &scope, user_id).await
    } else {
        work_data(page.db(), &scope, user_id).await
    };

    let stats = if is_hire {
        vec![
            Stat {
                label: "Open roles",
                value: jobs.iter().filter(|j| j.status == JobStatus::Open).count(),
            },
            Stat {
                label: "Applications received",
                value: applications.len(),
            },
            Stat {
                label: "Events posted",
                value: jobs.len(),
            },
        ]
    } else {
        vec![
            Stat {
                label: "Total applications",
                value: applications.len(),
            },
            Stat {
                label: "Upcoming gigs",
                value: applications
                    .iter()
                    .filter(|a| a.status == ApplicationStatus::Accepted)
                    .count(),
            },
            Stat {
                label: "Open roles nearby",
                value: jobs.len(),
            },
        ]
    };

    let mut context = page.context();
    context.insert("name", profile.display_name());
    context.insert("is_hire", &is_hire);
    context.insert("stats", &stats);
    context.insert("jobs", &job_cards(&jobs));
    Ok(render::html("dashboard.html", &context))
}
