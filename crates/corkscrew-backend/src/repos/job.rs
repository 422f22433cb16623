use corkscrew_common::models::{Job, NewJob};
use corkscrew_common::JobSummary;
use uuid::Uuid;

use super::{decode_first, decode_rows};
use crate::error::BackendResult;
use crate::query::{Query, Table};
use crate::store::{AccessScope, RecordStore};

/// Filters for the public job board. Blank values are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSearch {
    /// Matched against the title
    pub query: Option<String>,
    pub location: Option<String>,
    /// Skill or role keyword, matched against the description
    pub role: Option<String>,
    /// Earliest event date, `YYYY-MM-DD`
    pub date: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl JobSearch {
    pub fn to_query(&self) -> Query {
        let mut query = Query::from(Table::Jobs)
            .eq("status", "open")
            .order_asc("event_date");
        if let Some(q) = non_blank(&self.query) {
            query = query.ilike_contains("title", q);
        }
        if let Some(location) = non_blank(&self.location) {
            query = query.ilike_contains("location", location);
        }
        if let Some(role) = non_blank(&self.role) {
            query = query.ilike_contains("description", role);
        }
        if let Some(date) = non_blank(&self.date) {
            query = query.gte("event_date", date);
        }
        query
    }
}

pub struct JobRepo;

impl JobRepo {
    pub async fn get<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        id: Uuid,
    ) -> BackendResult<Option<Job>> {
        let rows = db
            .query_records(scope, &Query::from(Table::Jobs).eq("id", id).limit(1))
            .await?;
        decode_first(rows)
    }

    /// Insert a job; the backend fills in id, status and created_at
    pub async fn create<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        job: &NewJob,
    ) -> BackendResult<Job> {
        let row = db
            .insert_record(scope, Table::Jobs, serde_json::to_value(job)?)
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn search<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        search: &JobSearch,
    ) -> BackendResult<Vec<Job>> {
        let rows = db.query_records(scope, &search.to_query()).await?;
        decode_rows(rows)
    }

    /// Most recently posted open jobs
    pub async fn list_featured<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        limit: usize,
    ) -> BackendResult<Vec<Job>> {
        let query = Query::from(Table::Jobs)
            .eq("status", "open")
            .order_desc("created_at")
            .limit(limit);
        decode_rows(db.query_records(scope, &query).await?)
    }

    pub async fn list_for_client<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        client_id: Uuid,
    ) -> BackendResult<Vec<Job>> {
        let query = Query::from(Table::Jobs)
            .eq("client_id", client_id)
            .order_desc("created_at");
        decode_rows(db.query_records(scope, &query).await?)
    }

    /// Open jobs, soonest event first
    pub async fn list_open_upcoming<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        limit: usize,
    ) -> BackendResult<Vec<Job>> {
        let query = Query::from(Table::Jobs)
            .eq("status", "open")
            .order_asc("event_date")
            .limit(limit);
        decode_rows(db.query_records(scope, &query).await?)
    }

    /// Summaries for the given job ids, in backend order
    pub async fn list_summaries<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        ids: &[Uuid],
    ) -> BackendResult<Vec<JobSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::from(Table::Jobs)
            .select("id, title, event_date, location, client_id")
            .in_list("id", ids);
        decode_rows(db.query_records(scope, &query).await?)
    }
}
