//! Grouping of a viewer's flat message log into per-job conversations.
//!
//! Everything here is a pure function of its inputs; the messages page calls
//! it on every render.

use crate::models::Message;
use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The slice of a job needed to label a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub event_date: NaiveDate,
    pub location: String,
    pub client_id: Uuid,
}

/// All messages the viewer can see for one job, oldest first
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Conversation {
    pub job: JobSummary,
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Identities other than `viewer` that appear in this thread, in order of
    /// first appearance (sender checked before recipient).
    pub fn participants(&self, viewer: Uuid) -> IndexSet<Uuid> {
        let mut ids = IndexSet::new();
        for message in &self.messages {
            if message.sender_id != viewer {
                ids.insert(message.sender_id);
            }
            if message.recipient_id != viewer {
                ids.insert(message.recipient_id);
            }
        }
        ids
    }

    /// Who the viewer is talking to in this thread.
    ///
    /// A worker only ever talks to the job's client, so for non-owners this is
    /// always `client_id`. For the owner it is the first other identity seen,
    /// or `None` until someone else has written.
    pub fn counterpart(&self, viewer: Uuid) -> Option<Uuid> {
        if viewer == self.job.client_id {
            self.participants(viewer).first().copied()
        } else {
            Some(self.job.client_id)
        }
    }
}

/// Partition `messages` by job and pair each partition with its job summary.
///
/// Output order follows `jobs`; jobs without any message are dropped, as are
/// messages whose job is missing from `jobs`. Relative message order inside a
/// partition is preserved.
pub fn group_conversations(messages: Vec<Message>, jobs: Vec<JobSummary>) -> Vec<Conversation> {
    let mut grouped: HashMap<Uuid, Vec<Message>> = HashMap::new();
    for message in messages {
        grouped.entry(message.job_id).or_default().push(message);
    }

    jobs.into_iter()
        .filter_map(|job| {
            grouped
                .remove(&job.id)
                .map(|messages| Conversation { job, messages })
        })
        .collect()
}

/// Pick the active conversation: the requested job when present, otherwise the
/// first one. Returns `None` only when there are no conversations.
pub fn select_conversation(
    conversations: &[Conversation],
    requested: Option<Uuid>,
) -> Option<&Conversation> {
    requested
        .and_then(|job_id| conversations.iter().find(|c| c.job.id == job_id))
        .or_else(|| conversations.first())
}

/// Distinct job ids referenced by `messages`, in order of first appearance
pub fn referenced_job_ids(messages: &[Message]) -> Vec<Uuid> {
    let ids: IndexSet<Uuid> = messages.iter().map(|m| m.job_id).collect();
    ids.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn summary(id: Uuid, client_id: Uuid, title: &str) -> JobSummary {
        JobSummary {
            id,
            title: title.to_string(),
            event_date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            location: "Austin, TX".to_string(),
            client_id,
        }
    }

    fn message(job_id: Uuid, sender: Uuid, recipient: Uuid, minute: i64, body: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            job_id,
            sender_id: sender,
            recipient_id: recipient,
            content: body.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()
                + Duration::minutes(minute),
        }
    }

    #[test]
    fn test_one_conversation_per_job_preserving_order() {
        let client = Uuid::new_v4();
        let worker = Uuid::new_v4();
        let job_a = Uuid::new_v4();
        let job_b = Uuid::new_v4();

        let log = vec![
            message(job_a, worker, client, 0, "a1"),
            message(job_b, worker, client, 1, "b1"),
            message(job_a, client, worker, 2, "a2"),
            message(job_b, client, worker, 3, "b2"),
            message(job_a, worker, client, 4, "a3"),
        ];
        let jobs = vec![summary(job_a, client, "A"), summary(job_b, client, "B")];

        let conversations = group_conversations(log.clone(), jobs);
        assert_eq!(conversations.len(), 2);

        for conversation in &conversations {
            let expected: Vec<&Message> = log
                .iter()
                .filter(|m| m.job_id == conversation.job.id)
                .collect();
            let actual: Vec<&Message> = conversation.messages.iter().collect();
            assert_eq!(actual, expected);
        }
        let bodies: Vec<&str> = conversations[0]
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(bodies, vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn test_list_order_follows_job_order() {
        let client = Uuid::new_v4();
        let worker = Uuid::new_v4();
        let job_a = Uuid::new_v4();
        let job_b = Uuid::new_v4();

        let log = vec![
            message(job_a, worker, client, 0, "first seen"),
            message(job_b, worker, client, 1, "second seen"),
        ];
        let jobs = vec![summary(job_b, client, "B"), summary(job_a, client, "A")];

        let conversations = group_conversations(log, jobs);
        assert_eq!(conversations[0].job.id, job_b);
        assert_eq!(conversations[1].job.id, job_a);
    }

    #[test]
    fn test_jobs_without_messages_are_excluded() {
        let client = Uuid::new_v4();
        let worker = Uuid::new_v4();
        let job_a = Uuid::new_v4();
        let quiet_job = Uuid::new_v4();

        let log = vec![message(job_a, worker, client, 0, "hi")];
        let jobs = vec![
            summary(quiet_job, client, "Quiet"),
            summary(job_a, client, "A"),
        ];

        let conversations = group_conversations(log, jobs);
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].job.id, job_a);
    }

    #[test]
    fn test_empty_log_yields_no_conversations() {
        let conversations = group_conversations(vec![], vec![]);
        assert!(conversations.is_empty());
        assert!(select_conversation(&conversations, None).is_none());
        assert!(select_conversation(&conversations, Some(Uuid::new_v4())).is_none());
    }

    #[test]
    fn test_select_requested_or_first() {
        let client = Uuid::new_v4();
        let worker = Uuid::new_v4();
        let job_a = Uuid::new_v4();
        let job_b = Uuid::new_v4();
        let log = vec![
            message(job_a, worker, client, 0, "a"),
            message(job_b, worker, client, 1, "b"),
        ];
        let conversations = group_conversations(
            log,
            vec![summary(job_a, client, "A"), summary(job_b, client, "B")],
        );

        assert_eq!(
            select_conversation(&conversations, Some(job_b)).unwrap().job.id,
            job_b
        );
        assert_eq!(
            select_conversation(&conversations, None).unwrap().job.id,
            job_a
        );
        // Unknown id falls back to the first thread
        assert_eq!(
            select_conversation(&conversations, Some(Uuid::new_v4()))
                .unwrap()
                .job
                .id,
            job_a
        );
    }

    #[test]
    fn test_owner_counterpart_is_first_other_identity() {
        let client = Uuid::new_v4();
        let worker_x = Uuid::new_v4();
        let worker_y = Uuid::new_v4();
        let job = Uuid::new_v4();

        // X shows up as recipient first
        let log = vec![
            message(job, client, worker_x, 0, "reaching out"),
            message(job, worker_y, client, 1, "me too"),
            message(job, worker_x, client, 2, "thanks"),
        ];
        let conversations = group_conversations(log, vec![summary(job, client, "Gala")]);
        let conversation = &conversations[0];

        assert_eq!(conversation.counterpart(client), Some(worker_x));
        let participants: Vec<Uuid> = conversation.participants(client).into_iter().collect();
        assert_eq!(participants, vec![worker_x, worker_y]);
    }

    #[test]
    fn test_owner_counterpart_when_x_is_sender() {
        let client = Uuid::new_v4();
        let worker_x = Uuid::new_v4();
        let job = Uuid::new_v4();

        let log = vec![message(job, worker_x, client, 0, "interested")];
        let conversations = group_conversations(log, vec![summary(job, client, "Gala")]);
        assert_eq!(conversations[0].counterpart(client), Some(worker_x));
    }

    #[test]
    fn test_owner_without_other_party_has_no_counterpart() {
        let client = Uuid::new_v4();
        let job = Uuid::new_v4();

        // Client noting something to themselves
        let log = vec![message(job, client, client, 0, "note")];
        let conversations = group_conversations(log, vec![summary(job, client, "Gala")]);
        assert_eq!(conversations[0].counterpart(client), None);
    }

    #[test]
    fn test_worker_counterpart_is_always_client() {
        let client = Uuid::new_v4();
        let worker = Uuid::new_v4();
        let other_worker = Uuid::new_v4();
        let job = Uuid::new_v4();

        // Only the worker has written so far, and to someone else entirely
        let log = vec![message(job, worker, other_worker, 0, "hello?")];
        let conversations = group_conversations(log, vec![summary(job, client, "Gala")]);
        assert_eq!(conversations[0].counterpart(worker), Some(client));
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let client = Uuid::new_v4();
        let worker = Uuid::new_v4();
        let job = Uuid::new_v4();
        let log = vec![
            message(job, worker, client, 0, "a"),
            message(job, client, worker, 1, "b"),
        ];
        let jobs = vec![summary(job, client, "Gala")];

        let first = group_conversations(log.clone(), jobs.clone());
        let second = group_conversations(log, jobs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_referenced_job_ids_distinct_in_first_seen_order() {
        let client = Uuid::new_v4();
        let worker = Uuid::new_v4();
        let job_a = Uuid::new_v4();
        let job_b = Uuid::new_v4();
        let log = vec![
            message(job_b, worker, client, 0, "b"),
            message(job_a, worker, client, 1, "a"),
            message(job_b, client, worker, 2, "b2"),
        ];
        assert_eq!(referenced_job_ids(&log), vec![job_b, job_a]);
    }
}
