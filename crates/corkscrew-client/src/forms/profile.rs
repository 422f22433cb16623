use corkscrew_backend::ProfileRepo;
use corkscrew_common::models::ProfileUpsert;
use corkscrew_common::validation::ProfileInput;

use super::{FormContext, FormError};

pub const PROFILE_SAVED: &str = "Profile updated successfully.";

pub struct ProfileForm {
    ctx: FormContext,
}

impl ProfileForm {
    pub fn new(ctx: FormContext) -> Self {
        Self { ctx }
    }

    /// Upsert the viewer's profile; returns the success notice to show
    #[tracing::instrument(skip_all)]
    pub async fn submit(&self, input: &ProfileInput) -> Result<&'static str, FormError> {
        let valid = input.validate()?;
        let (session, scope) = self
            .ctx
            .require_session("You need to be signed in to update your profile.")
            .await?;

        ProfileRepo::upsert(
            self.ctx.client.backend(),
            &scope,
            &ProfileUpsert {
                id: session.user.id,
                full_name: valid.full_name,
                role: valid.role,
                bio: valid.bio,
                skills: valid.skills,
                hourly_rate: valid.hourly_rate,
                location: valid.location,
                experience_years: valid.experience_years,
                certifications: valid.certifications,
            },
        )
        .await?;

        self.ctx.navigator.refresh();
        Ok(PROFILE_SAVED)
    }
}
