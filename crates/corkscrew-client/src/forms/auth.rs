use corkscrew_backend::{AccessScope, ProfileRepo};
use corkscrew_common::models::Session;
use corkscrew_common::validation::{SignInInput, SignUpInput};
use serde_json::json;

use super::{FormContext, FormError};

/// Password sign-in, then on to the dashboard
#[tracing::instrument(skip_all)]
pub async fn sign_in(ctx: &FormContext, input: &SignInInput) -> Result<Session, FormError> {
    input.validate()?;
    let session = ctx.client.sign_in(&input.email, &input.password).await?;
    ctx.navigator.replace("/dashboard");
    ctx.navigator.refresh();
    Ok(session)
}

/// Create the account and its profile row.
///
/// Returns the session when the backend signed the user in right away; without
/// one (email confirmation pending) the profile write runs anonymously.
#[tracing::instrument(skip_all)]
pub async fn sign_up(ctx: &FormContext, input: &SignUpInput) -> Result<Option<Session>, FormError> {
    input.validate()?;
    let result = ctx
        .client
        .sign_up(
            &input.email,
            &input.password,
            json!({ "full_name": input.full_name, "role": input.role }),
        )
        .await?;

    let scope = AccessScope::for_session(result.session.as_ref());
    ProfileRepo::ensure_exists(
        ctx.client.backend(),
        &scope,
        result.user.id,
        &input.full_name,
        input.role,
    )
    .await?;

    ctx.navigator.replace("/dashboard");
    ctx.navigator.refresh();
    Ok(result.session)
}

#[tracing::instrument(skip_all)]
pub async fn sign_out(ctx: &FormContext) -> Result<(), FormError> {
    let result = ctx.client.sign_out().await;
    if let Err(e) = &result {
        tracing::warn!("Backend sign-out failed: {}", e);
    }
    ctx.navigator.replace("/");
    ctx.navigator.refresh();
    result.map_err(FormError::from)
}
