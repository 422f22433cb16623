use axum::extract::Query;
use axum::response::Response;
use corkscrew_backend::{JobRepo, MessageRepo};
use corkscrew_common::conversation::{group_conversations, referenced_job_ids, select_conversation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_date, Page};
use crate::error::PageError;
use crate::render;

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConversationLink {
    job_id: Uuid,
    title: String,
    date: String,
    location: String,
    active: bool,
}

#[derive(Debug, Serialize)]
struct MessageView {
    content: String,
    mine: bool,
    sent_at: String,
}

#[derive(Debug, Serialize)]
struct ActiveConversation {
    job_id: Uuid,
    title: String,
    date: String,
    location: String,
    messages: Vec<MessageView>,
}

/// GET /messages - the viewer's conversations, one per job
#[tracing::instrument(skip(page))]
pub async fn messages(page: Page, Query(query): Query<MessagesQuery>) -> Result<Response, PageError> {
    let viewer = page.require_session()?.user.id;
    let scope = page.scope();

    let log = MessageRepo::list_for_participant(page.db(), &scope, viewer)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to load messages: {}", e);
            Vec::new()
        });

    let jobs = if log.is_empty() {
        Vec::new()
    } else {
        JobRepo::list_summaries(page.db(), &scope, &referenced_job_ids(&log))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to load conversation jobs: {}", e);
                Vec::new()
            })
    };

    let conversations = group_conversations(log, jobs);
    let requested = query.job_id.as_deref().and_then(|id| Uuid::parse_str(id).ok());

    let mut context = page.context();
    match select_conversation(&conversations, requested) {
        None => {
            context.insert("active", &Option::<ActiveConversation>::None);
            context.insert("conversations", &Vec::<ConversationLink>::new());
            context.insert("counterpart_id", &Option::<Uuid>::None);
            context.insert("awaiting_applicant", &false);
        }
        Some(active) => {
            let counterpart = active.counterpart(viewer);
            let links: Vec<ConversationLink> = conversations
                .iter()
                .map(|c| ConversationLink {
                    job_id: c.job.id,
                    title: c.job.title.clone(),
                    date: format_date(c.job.event_date),
                    location: c.job.location.clone(),
                    active: c.job.id == active.job.id,
                })
                .collect();
            let view = ActiveConversation {
                job_id: active.job.id,
                title: active.job.title.clone(),
                date: format_date(active.job.event_date),
                location: active.job.location.clone(),
                messages: active
                    .messages
                    .iter()
                    .map(|m| MessageView {
                        content: m.content.clone(),
                        mine: m.sender_id == viewer,
                        sent_at: m.created_at.format("%b %-d, %Y %H:%M").to_string(),
                    })
                    .collect(),
            };
            context.insert("active", &Some(view));
            context.insert("conversations", &links);
            context.insert("counterpart_id", &counterpart);
            context.insert(
                "awaiting_applicant",
                &(counterpart.is_none() && viewer == active.job.client_id),
            );
        }
    }
    Ok(render::html("messages.html", &context))
}
