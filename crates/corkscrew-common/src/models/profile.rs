use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which side of the marketplace a profile is on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Event organizer posting jobs
    Hire,
    /// Hospitality professional applying to jobs
    Work,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hire => "hire",
            Role::Work => "work",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hire" => Ok(Role::Hire),
            "work" => Ok(Role::Work),
            other => anyhow::bail!("Unknown role '{}', expected 'hire' or 'work'", other),
        }
    }
}

/// Marketplace profile, keyed by the auth user id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub role: Role,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub hourly_rate: Option<f64>,
    pub location: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub experience_years: Option<i32>,
    pub certifications: Option<Vec<String>>,
    #[serde(default)]
    pub availability: Option<serde_json::Value>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("there")
    }
}

/// Full profile write issued by the profile form.
///
/// Every optional field is sent, so clearing an input clears the column.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileUpsert {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub hourly_rate: Option<f64>,
    pub location: Option<String>,
    pub experience_years: Option<i32>,
    pub certifications: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_round_trip_str() {
        assert_eq!("hire".parse::<Role>().unwrap(), Role::Hire);
        assert_eq!("work".parse::<Role>().unwrap(), Role::Work);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Work.to_string(), "work");
    }

    #[test]
    fn test_profile_with_nulls() {
        let profile: Profile = serde_json::from_value(json!({
            "id": "0b8c8a52-2f7e-4f1b-9c57-2d6f4c7e8a11",
            "created_at": "2025-03-01T12:00:00Z",
            "role": "work",
            "full_name": null,
            "bio": null,
            "skills": ["Mixology"],
            "hourly_rate": 32.5,
            "location": "Austin, TX",
            "experience_years": null,
            "certifications": null
        }))
        .unwrap();
        assert_eq!(profile.role, Role::Work);
        assert_eq!(profile.skills, Some(vec!["Mixology".to_string()]));
        assert_eq!(profile.display_name(), "there");
        assert!(profile.availability.is_none());
    }

    #[test]
    fn test_upsert_serializes_cleared_fields_as_null() {
        let upsert = ProfileUpsert {
            id: Uuid::nil(),
            full_name: "Sam".into(),
            role: Role::Hire,
            bio: None,
            skills: None,
            hourly_rate: None,
            location: None,
            experience_years: None,
            certifications: None,
        };
        let value = serde_json::to_value(&upsert).unwrap();
        assert_eq!(value["role"], "hire");
        assert!(value["bio"].is_null());
        assert!(value.as_object().unwrap().contains_key("certifications"));
    }
}
