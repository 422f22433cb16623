use corkscrew_backend::MessageRepo;
use corkscrew_common::models::{Message, NewMessage};
use corkscrew_common::validation::{validate_message, FieldErrors};
use uuid::Uuid;

use super::{FormContext, FormError};

/// Reply box of one conversation
pub struct MessageComposer {
    ctx: FormContext,
    job_id: Uuid,
    recipient_id: Option<Uuid>,
}

impl MessageComposer {
    /// `recipient_id` is the conversation's counterpart, if one is known
    pub fn new(ctx: FormContext, job_id: Uuid, recipient_id: Option<Uuid>) -> Self {
        Self {
            ctx,
            job_id,
            recipient_id,
        }
    }

    pub fn can_send(&self) -> bool {
        self.recipient_id.is_some()
    }

    #[tracing::instrument(skip(self, content), fields(job_id = %self.job_id))]
    pub async fn submit(&self, content: &str) -> Result<Message, FormError> {
        let content = validate_message(content)?;
        let Some(recipient_id) = self.recipient_id else {
            let mut errors = FieldErrors::new();
            errors.push("recipient", "Select a participant to message.");
            return Err(FormError::Invalid(errors));
        };
        let (session, scope) = self
            .ctx
            .require_session("Sign in to send messages.")
            .await?;

        let message = MessageRepo::create(
            self.ctx.client.backend(),
            &scope,
            &NewMessage {
                job_id: self.job_id,
                sender_id: session.user.id,
                recipient_id,
                content,
            },
        )
        .await?;

        self.ctx.navigator.refresh();
        Ok(message)
    }
}
