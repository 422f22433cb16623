use async_trait::async_trait;
use corkscrew_common::models::{Session, SessionUser};
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{BackendError, BackendResult};
use crate::query::{Query, Table};
use crate::store::{AccessScope, AuthApi, RecordStore, SignUpResult};

/// HTTP client for a hosted backend project: a PostgREST record API under
/// `/rest/v1` and a GoTrue auth API under `/auth/v1`
#[derive(Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    base_url: Arc<str>,
    anon_key: Arc<str>,
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestBackend {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, anon_key)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            anon_key: Arc::from(anon_key),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rest_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Attach the API key, and the caller's token as bearer (the API key when
    /// anonymous)
    fn authorize(&self, builder: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        let bearer = access_token.unwrap_or(self.anon_key.as_ref());
        builder
            .header("apikey", self.anon_key.as_ref())
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(&self, builder: RequestBuilder) -> BackendResult<Response> {
        let response = builder.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(parse_error(status, &body))
    }

    async fn session_from(&self, response: Response) -> BackendResult<Session> {
        let session: Session = response.json().await?;
        Ok(session)
    }
}

/// Build a [`BackendError`] from an error response body. PostgREST uses
/// `message`, GoTrue uses `msg` or `error_description`.
fn parse_error(status: u16, body: &str) -> BackendError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("Request failed with status {}", status)
            } else {
                body.trim().to_string()
            }
        });
    let code = parsed
        .as_ref()
        .and_then(|v| v.get("code").or_else(|| v.get("error_code")))
        .and_then(|c| match c {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
    BackendError::Rejected {
        status,
        code,
        message,
    }
}

#[async_trait]
impl RecordStore for RestBackend {
    #[tracing::instrument(skip(self, scope), fields(table = %query.table))]
    async fn query_records(&self, scope: &AccessScope, query: &Query) -> BackendResult<Vec<Value>> {
        let builder = self
            .client
            .get(self.rest_url(query.table))
            .query(&query.to_query_pairs());
        let response = self
            .send(self.authorize(builder, scope.access_token.as_deref()))
            .await?;
        let rows: Vec<Value> = response.json().await?;
        tracing::debug!("Fetched {} rows", rows.len());
        Ok(rows)
    }

    #[tracing::instrument(skip(self, scope, fields))]
    async fn insert_record(
        &self,
        scope: &AccessScope,
        table: Table,
        fields: Value,
    ) -> BackendResult<Value> {
        let builder = self
            .client
            .post(self.rest_url(table))
            .header("Prefer", "return=representation")
            .json(&fields);
        let response = self
            .send(self.authorize(builder, scope.access_token.as_deref()))
            .await?;
        let body: Value = response.json().await?;
        match body {
            Value::Array(mut rows) if !rows.is_empty() => Ok(rows.swap_remove(0)),
            Value::Object(_) => Ok(body),
            other => Err(BackendError::Decode(format!(
                "insert into {} returned no row: {}",
                table, other
            ))),
        }
    }

    #[tracing::instrument(skip(self, scope, fields))]
    async fn upsert_record(
        &self,
        scope: &AccessScope,
        table: Table,
        key: &str,
        fields: Value,
    ) -> BackendResult<()> {
        let builder = self
            .client
            .post(self.rest_url(table))
            .query(&[("on_conflict", key)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&fields);
        self.send(self.authorize(builder, scope.access_token.as_deref()))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AuthApi for RestBackend {
    #[tracing::instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let builder = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let response = self.send(self.authorize(builder, None)).await?;
        self.session_from(response).await
    }

    #[tracing::instrument(skip(self, password, metadata))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> BackendResult<SignUpResult> {
        let builder = self.client.post(self.auth_url("signup")).json(&json!({
            "email": email,
            "password": password,
            "data": metadata,
        }));
        let response = self.send(self.authorize(builder, None)).await?;
        let body: Value = response.json().await?;

        // With autoconfirm the body is a full session; otherwise just the user
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)?;
            Ok(SignUpResult {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user_value = body.get("user").cloned().unwrap_or(body);
            let user: SessionUser = serde_json::from_value(user_value)?;
            Ok(SignUpResult {
                user,
                session: None,
            })
        }
    }

    #[tracing::instrument(skip_all)]
    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session> {
        let builder = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));
        let response = self.send(self.authorize(builder, None)).await?;
        self.session_from(response).await
    }

    #[tracing::instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let builder = self.client.post(self.auth_url("logout"));
        self.send(self.authorize(builder, Some(access_token)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_postgrest_error() {
        let err = parse_error(
            409,
            r#"{"code":"23505","details":null,"hint":null,"message":"duplicate key value violates unique constraint"}"#,
        );
        assert_eq!(
            err,
            BackendError::Rejected {
                status: 409,
                code: Some("23505".into()),
                message: "duplicate key value violates unique constraint".into(),
            }
        );
    }

    #[test]
    fn test_parse_gotrue_errors() {
        let err = parse_error(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err.to_string(), "Invalid login credentials");

        let err = parse_error(422, r#"{"code":422,"msg":"User already registered"}"#);
        assert_eq!(err.to_string(), "User already registered");
        assert!(matches!(err, BackendError::Rejected { code: Some(ref c), .. } if c == "422"));
    }

    #[test]
    fn test_parse_non_json_error() {
        assert_eq!(parse_error(502, "Bad Gateway").to_string(), "Bad Gateway");
        assert_eq!(
            parse_error(500, "").to_string(),
            "Request failed with status 500"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = RestBackend::new("https://abc.example.co/", "anon");
        assert_eq!(backend.base_url(), "https://abc.example.co");
        assert_eq!(
            backend.rest_url(Table::JobApplications),
            "https://abc.example.co/rest/v1/job_applications"
        );
    }
}
