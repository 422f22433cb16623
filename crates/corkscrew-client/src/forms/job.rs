use corkscrew_backend::JobRepo;
use corkscrew_common::models::NewJob;
use corkscrew_common::validation::JobInput;
use uuid::Uuid;

use super::{FormContext, FormError};

/// "Post a job" form for hosts
pub struct CreateJobForm {
    ctx: FormContext,
}

impl CreateJobForm {
    pub fn new(ctx: FormContext) -> Self {
        Self { ctx }
    }

    /// Insert the job and move to its page
    #[tracing::instrument(skip_all)]
    pub async fn submit(&self, input: &JobInput) -> Result<Uuid, FormError> {
        let valid = input.validate()?;
        let (session, scope) = self
            .ctx
            .require_session("You need to be signed in to create a job.")
            .await?;

        let job = JobRepo::create(
            self.ctx.client.backend(),
            &scope,
            &NewJob {
                client_id: session.user.id,
                title: valid.title,
                description: valid.description,
                event_date: valid.event_date,
                start_time: valid.start_time,
                end_time: valid.end_time,
                location: valid.location,
                rate: valid.rate,
            },
        )
        .await?;

        tracing::info!("Created job {}", job.id);
        self.ctx.navigator.replace(&format!("/jobs/{}", job.id));
        self.ctx.navigator.refresh();
        Ok(job.id)
    }
}
