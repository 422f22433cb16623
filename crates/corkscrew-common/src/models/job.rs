use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a posted job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Booked,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Booked => "booked",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

/// Event-staffing opportunity posted by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub rate: Option<f64>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Rate as shown on listings: `$25/hr`, or "Negotiable" when unset or zero
    pub fn rate_label(&self) -> String {
        match self.rate {
            Some(rate) if rate > 0.0 => format!("${:.0}/hr", rate),
            _ => "Negotiable".to_string(),
        }
    }
}

/// Insert payload for a new job. Status is left to the column default (`open`).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewJob {
    pub client_id: Uuid,
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub rate: Option<f64>,
}
