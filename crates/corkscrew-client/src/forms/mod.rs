//! Client-side marketplace forms.
//!
//! Every form validates locally, checks for a live session, performs a single
//! mutation and reports failures as a [`FormError`] to show inline. Nothing is
//! retried.

pub mod apply;
pub mod auth;
pub mod job;
pub mod message;
pub mod profile;

use corkscrew_backend::{AccessScope, BackendError};
use corkscrew_common::models::Session;
use corkscrew_common::validation::FieldErrors;
use std::sync::Arc;
use thiserror::Error;

use crate::client::BackendClient;
use crate::navigator::Navigator;

pub use apply::{ApplyForm, ApplyView};
pub use job::CreateJobForm;
pub use message::MessageComposer;
pub use profile::ProfileForm;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0}")]
    Invalid(FieldErrors),

    #[error("{0}")]
    SignInRequired(&'static str),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<FieldErrors> for FormError {
    fn from(errors: FieldErrors) -> Self {
        FormError::Invalid(errors)
    }
}

impl FormError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FormError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// What every form needs: the shared client and a way to move the view
#[derive(Clone)]
pub struct FormContext {
    pub client: Arc<BackendClient>,
    pub navigator: Arc<dyn Navigator>,
}

impl FormContext {
    pub fn new(client: Arc<BackendClient>, navigator: Arc<dyn Navigator>) -> Self {
        Self { client, navigator }
    }

    /// The live session and its access scope, or `SignInRequired(message)`
    async fn require_session(
        &self,
        message: &'static str,
    ) -> Result<(Session, AccessScope), FormError> {
        let session = self
            .client
            .live_session()
            .await
            .ok_or(FormError::SignInRequired(message))?;
        let scope = AccessScope::for_session(Some(&session));
        Ok((session, scope))
    }
}
