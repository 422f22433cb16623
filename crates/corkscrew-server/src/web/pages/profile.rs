use axum::response::Response;
use corkscrew_backend::ProfileRepo;
use corkscrew_common::models::Profile;
use serde::Serialize;

use super::Page;
use crate::error::PageError;
use crate::render;

/// Current values for the profile form, all as display strings
#[derive(Debug, Default, Serialize)]
struct ProfileFormValues {
    full_name: String,
    role: String,
    bio: String,
    skills: String,
    hourly_rate: String,
    location: String,
    experience_years: String,
    certifications: String,
}

impl From<&Profile> for ProfileFormValues {
    fn from(profile: &Profile) -> Self {
        let join = |items: &Option<Vec<String>>| items.as_ref().map(|v| v.join(", ")).unwrap_or_default();
        Self {
            full_name: profile.full_name.clone().unwrap_or_default(),
            role: profile.role.as_str().to_string(),
            bio: profile.bio.clone().unwrap_or_default(),
            skills: join(&profile.skills),
            hourly_rate: profile.hourly_rate.map(|r| r.to_string()).unwrap_or_default(),
            location: profile.location.clone().unwrap_or_default(),
            experience_years: profile
                .experience_years
                .map(|y| y.to_string())
                .unwrap_or_default(),
            certifications: join(&profile.certifications),
        }
    }
}

/// GET /profile
#[tracing::instrument(skip(page))]
pub async fn profile(page: Page) -> Result<Response, PageError> {
    let session = page.require_session()?;

    let profile = match ProfileRepo::get(page.db(), &page.scope(), session.user.id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("Failed to load profile: {}", e);
            None
        }
    };

    let values = profile
        .as_ref()
        .map(ProfileFormValues::from)
        .unwrap_or_else(|| ProfileFormValues {
            role: "work".to_string(),
            ..Default::default()
        });

    let mut context = page.context();
    context.insert("profile", &values);
    Ok(render::html("profile.html", &context))
}
