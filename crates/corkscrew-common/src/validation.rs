//! Input rules for the marketplace forms.
//!
//! Each `*Input` holds raw form strings; `validate()` either produces the typed
//! value to submit or every field error at once so a form can show them inline.

use crate::models::Role;
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub const COVER_LETTER_MIN: usize = 20;
pub const COVER_LETTER_MAX: usize = 1200;
pub const MESSAGE_MAX: usize = 1000;
pub const BIO_MAX: usize = 600;
pub const PASSWORD_MIN: usize = 6;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All rejected fields of one submission, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First message recorded for `field`
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn optional_text(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Split a comma separated list, trimming entries and dropping blanks.
/// An empty input means "not provided".
pub fn split_list(s: &str) -> Option<Vec<String>> {
    if s.trim().is_empty() {
        return None;
    }
    Some(
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn parse_non_negative(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    label: &str,
) -> Option<f64> {
    if raw.trim().is_empty() {
        return None;
    }
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        Ok(_) => {
            errors.push(field, format!("{} must be positive", label));
            None
        }
        Err(_) => {
            errors.push(field, format!("{} must be a number", label));
            None
        }
    }
}

fn parse_time(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<NaiveTime> {
    if raw.trim().is_empty() {
        return None;
    }
    let raw = raw.trim();
    match NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    {
        Ok(t) => Some(t),
        Err(_) => {
            errors.push(field, "Enter a valid time");
            None
        }
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !EMAIL_RE.is_match(email) {
        errors.push("email", "Enter a valid email");
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if char_len(password) < PASSWORD_MIN {
        errors.push("password", "Password must be at least 6 characters");
    }
}

/// Cover letter submitted with a job application
pub fn validate_cover_letter(cover_letter: &str) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();
    let len = char_len(cover_letter);
    if len < COVER_LETTER_MIN {
        errors.push(
            "cover_letter",
            "Share a few details about your experience (20+ characters)",
        );
    } else if len > COVER_LETTER_MAX {
        errors.push("cover_letter", "Keep it under 1,200 characters");
    }
    errors.finish(|| cover_letter.to_string())
}

/// Body of a message in a job thread
pub fn validate_message(content: &str) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::new();
    let len = char_len(content);
    if len == 0 {
        errors.push("content", "Type a message");
    } else if len > MESSAGE_MAX {
        errors.push("content", "Keep messages under 1,000 characters");
    }
    errors.finish(|| content.to_string())
}

/// Raw fields of the "post a job" form
#[derive(Debug, Clone, Default)]
pub struct JobInput {
    pub title: String,
    pub description: String,
    pub event_date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub rate: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidJob {
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub rate: Option<f64>,
}

impl JobInput {
    pub fn validate(&self) -> Result<ValidJob, FieldErrors> {
        let mut errors = FieldErrors::new();

        if char_len(&self.title) < 4 {
            errors.push("title", "Add an event title");
        }
        if char_len(&self.description) < 40 {
            errors.push("description", "Describe the role in at least 40 characters");
        }
        let event_date = if self.event_date.trim().is_empty() {
            errors.push("event_date", "Select the event date");
            None
        } else {
            match NaiveDate::parse_from_str(self.event_date.trim(), "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.push("event_date", "Select the event date");
                    None
                }
            }
        };
        let start_time = parse_time(&mut errors, "start_time", &self.start_time);
        let end_time = parse_time(&mut errors, "end_time", &self.end_time);
        if char_len(&self.location) < 2 {
            errors.push("location", "Provide the event location");
        }
        let rate = parse_non_negative(&mut errors, "rate", &self.rate, "Rate");

        match event_date {
            Some(event_date) if errors.is_empty() => Ok(ValidJob {
                title: self.title.clone(),
                description: self.description.clone(),
                event_date,
                start_time,
                end_time,
                location: self.location.clone(),
                rate,
            }),
            _ => Err(errors),
        }
    }
}

/// Raw fields of the profile form
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub full_name: String,
    pub role: String,
    pub bio: String,
    pub skills: String,
    pub hourly_rate: String,
    pub location: String,
    pub experience_years: String,
    pub certifications: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidProfile {
    pub full_name: String,
    pub role: Role,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub hourly_rate: Option<f64>,
    pub location: Option<String>,
    pub experience_years: Option<i32>,
    pub certifications: Option<Vec<String>>,
}

impl ProfileInput {
    pub fn validate(&self) -> Result<ValidProfile, FieldErrors> {
        let mut errors = FieldErrors::new();

        if char_len(&self.full_name) < 2 {
            errors.push("full_name", "Enter your name");
        }
        let role = match self.role.parse::<Role>() {
            Ok(r) => Some(r),
            Err(_) => {
                errors.push("role", "Choose hire or work");
                None
            }
        };
        if char_len(&self.bio) > BIO_MAX {
            errors.push("bio", "Keep it under 600 characters");
        }
        let hourly_rate = parse_non_negative(&mut errors, "hourly_rate", &self.hourly_rate, "Rate");
        let experience_years = parse_non_negative(
            &mut errors,
            "experience_years",
            &self.experience_years,
            "Experience",
        )
        .and_then(|years| {
            if years.fract() == 0.0 && years <= i32::MAX as f64 {
                Some(years as i32)
            } else {
                errors.push("experience_years", "Experience must be a whole number");
                None
            }
        });

        match role {
            Some(role) if errors.is_empty() => Ok(ValidProfile {
                full_name: self.full_name.clone(),
                role,
                bio: optional_text(&self.bio),
                skills: split_list(&self.skills),
                hourly_rate,
                location: optional_text(&self.location),
                experience_years,
                certifications: split_list(&self.certifications),
            }),
            _ => Err(errors),
        }
    }
}

/// Raw fields of the sign-in form
#[derive(Debug, Clone, Default)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

impl SignInInput {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        errors.finish(|| ())
    }
}

/// Raw fields of the sign-up form
#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    pub accept_terms: bool,
}

impl SignUpInput {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if char_len(&self.full_name) < 2 {
            errors.push("full_name", "Enter your full name");
        }
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        if char_len(&self.confirm_password) < PASSWORD_MIN {
            errors.push("confirm_password", "Confirm your password");
        } else if self.password != self.confirm_password {
            errors.push("confirm_password", "Passwords must match");
        }
        if !self.accept_terms {
            errors.push("terms", "You must accept the terms");
        }
        errors.finish(|| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_letter_bounds() {
        assert!(validate_cover_letter("too short").is_err());
        assert!(validate_cover_letter(&"x".repeat(20)).is_ok());
        assert!(validate_cover_letter(&"x".repeat(1200)).is_ok());
        let err = validate_cover_letter(&"x".repeat(1201)).unwrap_err();
        assert_eq!(err.get("cover_letter"), Some("Keep it under 1,200 characters"));
    }

    #[test]
    fn test_message_bounds() {
        assert_eq!(
            validate_message("").unwrap_err().get("content"),
            Some("Type a message")
        );
        assert_eq!(validate_message("On my way").unwrap(), "On my way");
        assert!(validate_message(&"m".repeat(1001)).is_err());
    }

    fn job_input() -> JobInput {
        JobInput {
            title: "Wedding bartender".into(),
            description: "Mix cocktails for 120 guests at an outdoor reception.".into(),
            event_date: "2025-06-14".into(),
            start_time: "17:00".into(),
            end_time: "".into(),
            location: "Austin, TX".into(),
            rate: "35".into(),
        }
    }

    #[test]
    fn test_job_input_valid() {
        let job = job_input().validate().unwrap();
        assert_eq!(job.event_date, NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        assert_eq!(job.start_time, NaiveTime::from_hms_opt(17, 0, 0));
        assert_eq!(job.end_time, None);
        assert_eq!(job.rate, Some(35.0));
    }

    #[test]
    fn test_job_input_collects_all_errors() {
        let input = JobInput {
            title: "Bar".into(),
            description: "short".into(),
            event_date: "".into(),
            location: "A".into(),
            rate: "-5".into(),
            ..job_input()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get("title"), Some("Add an event title"));
        assert_eq!(errors.get("event_date"), Some("Select the event date"));
        assert_eq!(errors.get("rate"), Some("Rate must be positive"));
    }

    #[test]
    fn test_job_input_blank_rate_is_none() {
        let input = JobInput {
            rate: "".into(),
            ..job_input()
        };
        assert_eq!(input.validate().unwrap().rate, None);
    }

    #[test]
    fn test_profile_input_splits_lists() {
        let input = ProfileInput {
            full_name: "Riley".into(),
            role: "work".into(),
            skills: " Mixology, fine dining ,, setup ".into(),
            certifications: "".into(),
            experience_years: "5".into(),
            ..Default::default()
        };
        let profile = input.validate().unwrap();
        assert_eq!(profile.role, Role::Work);
        assert_eq!(
            profile.skills,
            Some(vec![
                "Mixology".to_string(),
                "fine dining".to_string(),
                "setup".to_string()
            ])
        );
        assert_eq!(profile.certifications, None);
        assert_eq!(profile.experience_years, Some(5));
        assert_eq!(profile.bio, None);
    }

    #[test]
    fn test_profile_input_rejects_fractional_years() {
        let input = ProfileInput {
            full_name: "Riley".into(),
            role: "hire".into(),
            experience_years: "2.5".into(),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(
            errors.get("experience_years"),
            Some("Experience must be a whole number")
        );
    }

    #[test]
    fn test_sign_up_password_mismatch() {
        let input = SignUpInput {
            full_name: "Jordan".into(),
            email: "jordan@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
            role: Role::Hire,
            accept_terms: true,
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("Passwords must match"));
    }

    #[test]
    fn test_sign_in_email_format() {
        let bad = SignInInput {
            email: "not-an-email".into(),
            password: "secret1".into(),
        };
        assert_eq!(
            bad.validate().unwrap_err().get("email"),
            Some("Enter a valid email")
        );
        let good = SignInInput {
            email: "sam@example.com".into(),
            password: "secret1".into(),
        };
        assert!(good.validate().is_ok());
    }
}
