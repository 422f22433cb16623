use async_trait::async_trait;
use corkscrew_common::models::{Session, SessionUser};
use serde_json::Value;

use crate::error::BackendResult;
use crate::query::{Query, Table};

/// Whose credentials a call runs under.
///
/// Anonymous calls go out with the public API key only; the backend's row
/// policies decide what that key may see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessScope {
    pub access_token: Option<String>,
}

impl AccessScope {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_session(session: Option<&Session>) -> Self {
        Self {
            access_token: session.map(|s| s.access_token.clone()),
        }
    }

    pub fn bearer(access_token: &str) -> Self {
        Self {
            access_token: Some(access_token.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignUpResult {
    pub user: SessionUser,
    /// Absent when the backend requires email confirmation first
    pub session: Option<Session>,
}

/// Generic row access against the backend's collections
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows matching `query`, in the query's order
    async fn query_records(&self, scope: &AccessScope, query: &Query) -> BackendResult<Vec<Value>>;

    /// Insert one row and return it as stored (with generated columns)
    async fn insert_record(
        &self,
        scope: &AccessScope,
        table: Table,
        fields: Value,
    ) -> BackendResult<Value>;

    /// Insert, or merge into the row whose `key` column matches
    async fn upsert_record(
        &self,
        scope: &AccessScope,
        table: Table,
        key: &str,
        fields: Value,
    ) -> BackendResult<()>;
}

/// Password authentication against the backend's auth service
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> BackendResult<SignUpResult>;

    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session>;

    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;
}

/// Everything the application needs from the backend
pub trait Backend: RecordStore + AuthApi {}

impl<T: RecordStore + AuthApi> Backend for T {}
