use corkscrew_common::models::{Message, NewMessage};
use uuid::Uuid;

use super::decode_rows;
use crate::error::BackendResult;
use crate::query::{Filter, Query, Table};
use crate::store::{AccessScope, RecordStore};

pub struct MessageRepo;

impl MessageRepo {
    /// Every message the user sent or received, oldest first
    pub async fn list_for_participant<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        user_id: Uuid,
    ) -> BackendResult<Vec<Message>> {
        let user = user_id.to_string();
        let query = Query::from(Table::Messages)
            .or(vec![
                Filter::Eq("sender_id".into(), user.clone()),
                Filter::Eq("recipient_id".into(), user),
            ])
            .order_asc("created_at");
        decode_rows(db.query_records(scope, &query).await?)
    }

    pub async fn create<D: RecordStore + ?Sized>(
        db: &D,
        scope: &AccessScope,
        message: &NewMessage,
    ) -> BackendResult<Message> {
        let row = db
            .insert_record(scope, Table::Messages, serde_json::to_value(message)?)
            .await?;
        Ok(serde_json::from_value(row)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::store::AuthApi;
    use corkscrew_common::models::Session;
    use serde_json::json;

    async fn send(backend: &MemoryBackend, job_id: Uuid, from: &Session, to: Uuid, content: &str) {
        let message = NewMessage {
            job_id,
            sender_id: from.user.id,
            recipient_id: to,
            content: content.to_string(),
        };
        MessageRepo::create(backend, &AccessScope::for_session(Some(from)), &message)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_participant_log_in_creation_order() {
        let backend = MemoryBackend::new("secret");
        let mut sessions = Vec::new();
        for email in ["host@example.com", "worker@example.com", "other@example.com"] {
            sessions.push(
                backend
                    .sign_up(email, "secret1", json!({}))
                    .await
                    .unwrap()
                    .session
                    .unwrap(),
            );
        }
        let (host, worker, other) = (&sessions[0], &sessions[1], &sessions[2]);
        let job_id = Uuid::new_v4();

        send(&backend, job_id, worker, host.user.id, "Is parking available?").await;
        send(&backend, job_id, host, worker.user.id, "Yes, lot B.").await;
        send(&backend, job_id, other, worker.user.id, "Unrelated").await;
        send(&backend, job_id, host, other.user.id, "Hidden from worker").await;

        let scope = AccessScope::for_session(Some(worker));
        let log = MessageRepo::list_for_participant(&backend, &scope, worker.user.id)
            .await
            .unwrap();
        let contents: Vec<&str> = log.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["Is parking available?", "Yes, lot B.", "Unrelated"]
        );
    }
}
