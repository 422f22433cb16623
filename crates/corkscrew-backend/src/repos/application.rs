use corkscrew_common::models::{JobApplication, NewJobApplication};
use uuid::Uuid;

use super::decode_rows;
use crate::error::BackendResult;
use crate::query::{Query, Table};
use crate::store::{AccessScope, RecordStore};

pub struct ApplicationRepo;

impl ApplicationRepo {
    pub async fn list_for_job<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        job_id: Uuid,
    ) -> BackendResult<Vec<JobApplication>> {
        let query = Query::from(Table::JobApplications).eq("job_id", job_id);
        decode_rows(db.query_records(scope, &query).await?)
    }

    /// Applications across several jobs. No ids means no applications.
    pub async fn list_for_jobs<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        job_ids: &[Uuid],
    ) -> BackendResult<Vec<JobApplication>> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::from(Table::JobApplications).in_list("job_id", job_ids);
        decode_rows(db.query_records(scope, &query).await?)
    }

    pub async fn list_for_worker<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        worker_id: Uuid,
    ) -> BackendResult<Vec<JobApplication>> {
        let query = Query::from(Table::JobApplications)
            .eq("worker_id", worker_id)
            .order_desc("created_at");
        decode_rows(db.query_records(scope, &query).await?)
    }

    pub async fn create<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        application: &NewJobApplication,
    ) -> BackendResult<JobApplication> {
        let row = db
            .insert_record(
                scope,
                Table::JobApplications,
                serde_json::to_value(application)?,
            )
            .await?;
        Ok(serde_json::from_value(row)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::store::AuthApi;
    use corkscrew_common::models::ApplicationStatus;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_list() {
        let backend = MemoryBackend::new("secret");
        let worker = backend
            .sign_up("worker@example.com", "secret1", json!({}))
            .await
            .unwrap()
            .session
            .unwrap();
        let scope = AccessScope::for_session(Some(&worker));
        let (job_a, job_b) = (Uuid::new_v4(), Uuid::new_v4());

        for job_id in [job_a, job_b] {
            let created = ApplicationRepo::create(
                &backend,
                &scope,
                &NewJobApplication {
                    job_id,
                    worker_id: worker.user.id,
                    cover_letter: Some("Ten years behind busy hotel bars.".into()),
                },
            )
            .await
            .unwrap();
            assert_eq!(created.status, ApplicationStatus::Applied);
        }

        let for_a = ApplicationRepo::list_for_job(&backend, &scope, job_a).await.unwrap();
        assert_eq!(for_a.len(), 1);

        let mine = ApplicationRepo::list_for_worker(&backend, &scope, worker.user.id)
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].job_id, job_b);

        let both = ApplicationRepo::list_for_jobs(&backend, &scope, &[job_a, job_b])
            .await
            .unwrap();
        assert_eq!(both.len(), 2);
        assert!(ApplicationRepo::list_for_jobs(&backend, &scope, &[])
            .await
            .unwrap()
            .is_empty());
    }
}
