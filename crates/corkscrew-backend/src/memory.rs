use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use corkscrew_common::models::{Claims, Session, SessionUser};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{BackendError, BackendResult};
use crate::query::{Filter, Query, Table};
use crate::store::{AccessScope, AuthApi, RecordStore, SignUpResult};

const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct Account {
    id: Uuid,
    email: String,
    password: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<Table, Vec<Value>>,
    accounts: HashMap<String, Account>,
    refresh_tokens: HashMap<String, Uuid>,
    last_created_at: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Creation timestamps are strictly increasing so ordering by
    /// `created_at` matches insertion order
    fn next_created_at(&mut self) -> String {
        let mut now = Utc::now();
        if let Some(last) = self.last_created_at {
            if now <= last {
                now = last + chrono::Duration::microseconds(1);
            }
        }
        self.last_created_at = Some(now);
        now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn apply_defaults(&mut self, table: Table, row: &mut Map<String, Value>) {
        if !row.contains_key("id") && table != Table::Profiles {
            row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        if !row.contains_key("created_at") {
            let created_at = self.next_created_at();
            row.insert("created_at".into(), Value::String(created_at));
        }
        let status = match table {
            Table::Jobs => Some("open"),
            Table::JobApplications => Some("applied"),
            _ => None,
        };
        if let Some(status) = status {
            row.entry("status")
                .or_insert_with(|| Value::String(status.into()));
        }
    }

    fn insert(&mut self, table: Table, fields: Value) -> BackendResult<Value> {
        let mut row = into_object(fields)?;
        self.apply_defaults(table, &mut row);
        let row = Value::Object(row);
        let rows = self.tables.entry(table).or_default();
        if let Some(id) = row.get("id") {
            if rows.iter().any(|existing| existing.get("id") == Some(id)) {
                return Err(BackendError::Rejected {
                    status: 409,
                    code: Some("23505".into()),
                    message: format!(
                        "duplicate key value violates unique constraint \"{}_pkey\"",
                        table
                    ),
                });
            }
        }
        rows.push(row.clone());
        Ok(row)
    }
}

/// In-process backend with the same record and auth contract as the hosted
/// one. Access tokens are real HS256 JWTs signed with `jwt_secret`.
///
/// Writes follow an ownership policy: the caller's token subject must match
/// the row's owner column.
pub struct MemoryBackend {
    jwt_secret: String,
    token_ttl_secs: AtomicI64,
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            token_ttl_secs: AtomicI64::new(DEFAULT_TOKEN_TTL_SECS),
            state: RwLock::new(MemoryState::default()),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Lifetime of access tokens issued from now on. Negative values issue
    /// tokens that are already expired.
    pub fn set_token_ttl(&self, secs: i64) {
        self.token_ttl_secs.store(secs, AtomicOrdering::SeqCst);
    }

    /// Insert rows bypassing the write policy, applying column defaults
    pub async fn seed(&self, table: Table, rows: Vec<Value>) -> BackendResult<Vec<Value>> {
        let mut state = self.state.write().await;
        rows.into_iter()
            .map(|row| state.insert(table, row))
            .collect()
    }

    /// Snapshot of every row in `table`, in insertion order
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        let state = self.state.read().await;
        state.tables.get(&table).cloned().unwrap_or_default()
    }

    fn issue_session(&self, state: &mut MemoryState, account: &Account) -> BackendResult<Session> {
        let now = Utc::now().timestamp();
        let exp = now + self.token_ttl_secs.load(AtomicOrdering::SeqCst);
        let claims = Claims {
            sub: account.id.to_string(),
            email: Some(account.email.clone()),
            exp,
            iat: now,
            role: Some("authenticated".into()),
        };
        let access_token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| BackendError::Decode(format!("failed to sign token: {}", e)))?;

        let refresh_token = Uuid::new_v4().simple().to_string();
        state
            .refresh_tokens
            .insert(refresh_token.clone(), account.id);

        Ok(Session {
            access_token,
            refresh_token,
            expires_at: Some(exp),
            user: SessionUser {
                id: account.id,
                email: Some(account.email.clone()),
            },
        })
    }

    fn decode(&self, token: &str) -> BackendResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                BackendError::rejected(401, "JWT expired")
            }
            _ => BackendError::rejected(401, "Invalid JWT"),
        })
    }

    fn caller(&self, scope: &AccessScope) -> BackendResult<Option<Uuid>> {
        let Some(token) = scope.access_token.as_deref() else {
            return Ok(None);
        };
        let claims = self.decode(token)?;
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| BackendError::rejected(401, "Invalid JWT"))?;
        Ok(Some(id))
    }

    fn authorize_write(&self, scope: &AccessScope, table: Table, row: &Value) -> BackendResult<()> {
        let caller = self.caller(scope)?;
        let owner = row
            .get(owner_column(table))
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok());
        match (caller, owner) {
            (Some(caller), Some(owner)) if caller == owner => Ok(()),
            (None, _) => Err(BackendError::Rejected {
                status: 401,
                code: Some("42501".into()),
                message: format!(
                    "new row violates row-level security policy for table \"{}\"",
                    table
                ),
            }),
            _ => Err(BackendError::Rejected {
                status: 403,
                code: Some("42501".into()),
                message: format!(
                    "new row violates row-level security policy for table \"{}\"",
                    table
                ),
            }),
        }
    }
}

fn owner_column(table: Table) -> &'static str {
    match table {
        Table::Profiles => "id",
        Table::Jobs => "client_id",
        Table::JobApplications => "worker_id",
        Table::Messages => "sender_id",
        Table::Reviews => "reviewer_id",
    }
}

fn into_object(fields: Value) -> BackendResult<Map<String, Value>> {
    match fields {
        Value::Object(map) => Ok(map),
        other => Err(BackendError::rejected(
            400,
            format!("expected a JSON object, got {}", other),
        )),
    }
}

/// Case-insensitive LIKE with `%` (any run) and `_` (any one character)
fn like_matches(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    // dp[j]: pattern[..i] matches value[..j]
    let mut dp = vec![false; value.len() + 1];
    dp[0] = true;
    for p in &pattern {
        let mut next = vec![false; value.len() + 1];
        match p {
            '%' => {
                let mut seen = false;
                for j in 0..=value.len() {
                    seen |= dp[j];
                    next[j] = seen;
                }
            }
            '_' => {
                for j in 1..=value.len() {
                    next[j] = dp[j - 1];
                }
            }
            c => {
                for j in 1..=value.len() {
                    next[j] = dp[j - 1] && value[j - 1] == *c;
                }
            }
        }
        dp = next;
    }
    dp[value.len()]
}

/// Compare a column value to a filter operand, by the column's JSON type
fn compare_to(column: &Value, operand: &str) -> Option<Ordering> {
    match column {
        Value::String(s) => Some(s.as_str().cmp(operand)),
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs: f64 = operand.parse().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::Bool(b) => {
            let rhs: bool = operand.parse().ok()?;
            Some(b.cmp(&rhs))
        }
        _ => None,
    }
}

static NULL: Value = Value::Null;

fn field<'a>(row: &'a Value, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&NULL)
}

fn matches(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(c, v) => compare_to(field(row, c), v) == Some(Ordering::Equal),
        Filter::ILike(c, p) => field(row, c).as_str().is_some_and(|s| like_matches(s, p)),
        Filter::Gte(c, v) => matches!(
            compare_to(field(row, c), v),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Filter::In(c, values) => values
            .iter()
            .any(|v| compare_to(field(row, c), v) == Some(Ordering::Equal)),
        Filter::Or(filters) => filters.iter().any(|f| matches(row, f)),
    }
}

/// Ascending order with nulls last
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn project(row: &Value, columns: Option<&str>) -> Value {
    let Some(columns) = columns.filter(|c| c.trim() != "*") else {
        return row.clone();
    };
    let mut projected = Map::new();
    for column in columns.split(',').map(str::trim) {
        if let Some(value) = row.get(column) {
            projected.insert(column.to_string(), value.clone());
        }
    }
    Value::Object(projected)
}

#[async_trait]
impl RecordStore for MemoryBackend {
    async fn query_records(&self, scope: &AccessScope, query: &Query) -> BackendResult<Vec<Value>> {
        let caller = self.caller(scope)?;
        let state = self.state.read().await;
        let rows = state.tables.get(&query.table).map(Vec::as_slice).unwrap_or(&[]);

        let mut selected: Vec<&Value> = rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .filter(|row| {
                // Messages are visible to their two participants only
                if query.table != Table::Messages {
                    return true;
                }
                let Some(caller) = caller.map(|c| c.to_string()) else {
                    return false;
                };
                ["sender_id", "recipient_id"]
                    .iter()
                    .any(|c| row.get(*c).and_then(Value::as_str) == Some(caller.as_str()))
            })
            .collect();

        selected.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|o| {
                    let ord = compare_values(field(a, &o.column), field(b, &o.column));
                    if o.ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        if let Some(limit) = query.limit {
            selected.truncate(limit);
        }

        Ok(selected
            .into_iter()
            .map(|row| project(row, query.columns.as_deref()))
            .collect())
    }

    async fn insert_record(
        &self,
        scope: &AccessScope,
        table: Table,
        fields: Value,
    ) -> BackendResult<Value> {
        self.authorize_write(scope, table, &fields)?;
        let mut state = self.state.write().await;
        let row = state.insert(table, fields)?;
        tracing::debug!(%table, "Inserted row");
        Ok(row)
    }

    async fn upsert_record(
        &self,
        scope: &AccessScope,
        table: Table,
        key: &str,
        fields: Value,
    ) -> BackendResult<()> {
        let fields = into_object(fields)?;
        let key_value = fields.get(key).cloned().ok_or_else(|| {
            BackendError::rejected(400, format!("upsert is missing conflict column \"{}\"", key))
        })?;

        let mut state = self.state.write().await;
        let existing = state
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|row| row.get(key) == Some(&key_value)));

        match existing {
            Some(row) => {
                let mut merged = row.clone();
                if let Value::Object(map) = &mut merged {
                    map.extend(fields);
                }
                self.authorize_write(scope, table, &merged)?;
                *row = merged;
            }
            None => {
                let row = Value::Object(fields);
                self.authorize_write(scope, table, &row)?;
                state.insert(table, row)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AuthApi for MemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|a| a.password == password)
            .cloned()
            .ok_or_else(|| BackendError::rejected(400, "Invalid login credentials"))?;
        self.issue_session(&mut state, &account)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _metadata: Value,
    ) -> BackendResult<SignUpResult> {
        if password.chars().count() < 6 {
            return Err(BackendError::rejected(
                422,
                "Password should be at least 6 characters",
            ));
        }
        let key = email.trim().to_lowercase();
        let mut state = self.state.write().await;
        if state.accounts.contains_key(&key) {
            return Err(BackendError::rejected(422, "User already registered"));
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: key.clone(),
            password: password.to_string(),
        };
        state.accounts.insert(key, account.clone());
        let session = self.issue_session(&mut state, &account)?;
        Ok(SignUpResult {
            user: session.user.clone(),
            session: Some(session),
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session> {
        let mut state = self.state.write().await;
        let user_id = state.refresh_tokens.remove(refresh_token).ok_or_else(|| {
            BackendError::rejected(400, "Invalid Refresh Token: Refresh Token Not Found")
        })?;
        let account = state
            .accounts
            .values()
            .find(|a| a.id == user_id)
            .cloned()
            .ok_or_else(|| BackendError::rejected(404, "User not found"))?;
        self.issue_session(&mut state, &account)
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let claims = self.decode(access_token)?;
        let mut state = self.state.write().await;
        state
            .refresh_tokens
            .retain(|_, user_id| user_id.to_string() != claims.sub);
        Ok(())
    }
}
