use corkscrew_backend::ApplicationRepo;
use corkscrew_common::models::NewJobApplication;
use corkscrew_common::validation::validate_cover_letter;
use uuid::Uuid;

use super::{FormContext, FormError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyView {
    /// Cover letter form
    Form,
    /// "Application sent"; the form is gone for good
    Confirmation,
}

/// Worker application to a single job
pub struct ApplyForm {
    ctx: FormContext,
    job_id: Uuid,
    applied: bool,
}

impl ApplyForm {
    /// `has_applied` comes from the rendered page
    pub fn new(ctx: FormContext, job_id: Uuid, has_applied: bool) -> Self {
        Self {
            ctx,
            job_id,
            applied: has_applied,
        }
    }

    pub fn view(&self) -> ApplyView {
        if self.applied {
            ApplyView::Confirmation
        } else {
            ApplyView::Form
        }
    }

    #[tracing::instrument(skip(self, cover_letter), fields(job_id = %self.job_id))]
    pub async fn submit(&mut self, cover_letter: &str) -> Result<ApplyView, FormError> {
        if self.applied {
            return Ok(ApplyView::Confirmation);
        }
        let cover_letter = validate_cover_letter(cover_letter)?;
        let (session, scope) = self
            .ctx
            .require_session("You need to be signed in to apply. Please sign in and try again.")
            .await?;

        ApplicationRepo::create(
            self.ctx.client.backend(),
            &scope,
            &NewJobApplication {
                job_id: self.job_id,
                worker_id: session.user.id,
                cover_letter: Some(cover_letter),
            },
        )
        .await?;

        self.applied = true;
        self.ctx.navigator.refresh();
        Ok(self.view())
    }
}
