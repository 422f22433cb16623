use corkscrew_backend::{AccessScope, ApplicationRepo, MemoryBackend, MessageRepo, ProfileRepo, Table};
use corkscrew_client::bridge::SessionBridge;
use corkscrew_client::client::BackendClient;
use corkscrew_client::forms::auth::{sign_in, sign_out, sign_up};
use corkscrew_client::forms::{
    ApplyForm, ApplyView, CreateJobForm, FormContext, FormError, MessageComposer, ProfileForm,
};
use corkscrew_client::forwarder::SessionForwarder;
use corkscrew_client::navigator::{Navigation, RecordingNavigator};
use corkscrew_common::models::{AuthChange, AuthEvent, Role, Session};
use corkscrew_common::validation::{JobInput, ProfileInput, SignInInput, SignUpInput};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

struct Viewer {
    ctx: FormContext,
    navigator: Arc<RecordingNavigator>,
}

fn viewer(backend: &Arc<MemoryBackend>) -> Viewer {
    let navigator = Arc::new(RecordingNavigator::new());
    let client = Arc::new(BackendClient::new(backend.clone()));
    Viewer {
        ctx: FormContext::new(client, navigator.clone()),
        navigator,
    }
}

async fn register(backend: &Arc<MemoryBackend>, name: &str, email: &str, role: Role) -> Viewer {
    let v = viewer(backend);
    sign_up(
        &v.ctx,
        &SignUpInput {
            full_name: name.to_string(),
            email: email.to_string(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            role,
            accept_terms: true,
        },
    )
    .await
    .unwrap();
    v
}

async fn session_of(v: &Viewer) -> Session {
    v.ctx.client.session().unwrap()
}

fn job_input() -> JobInput {
    JobInput {
        title: "Rooftop cocktail hour".into(),
        description: "Two bartenders for a ninety guest rooftop reception with a signature menu".into(),
        event_date: "2030-05-04".into(),
        start_time: "17:00".into(),
        end_time: "21:30".into(),
        location: "Austin, TX".into(),
        rate: "42".into(),
    }
}

#[tokio::test]
async fn test_sign_up_creates_profile_and_navigates() {
    let backend = Arc::new(MemoryBackend::new("secret"));
    let host = register(&backend, "Harper Lane", "harper@example.com", Role::Hire).await;

    let session = session_of(&host).await;
    let profile = ProfileRepo::get(backend.as_ref(), &AccessScope::anonymous(), session.user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Harper Lane"));
    assert_eq!(profile.role, Role::Hire);
    assert_eq!(
        host.navigator.history(),
        vec![Navigation::Replace("/dashboard".into()), Navigation::Refresh]
    );
}

#[tokio::test]
async fn test_sign_up_validation_blocks_submission() {
    let backend = Arc::new(MemoryBackend::new("secret"));
    let v = viewer(&backend);
    let err = sign_up(
        &v.ctx,
        &SignUpInput {
            full_name: "Harper".into(),
            email: "harper@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
            role: Role::Hire,
            accept_terms: false,
        },
    )
    .await
    .unwrap_err();

    let errors = err.field_errors().unwrap();
    assert_eq!(errors.get("confirm_password"), Some("Passwords must match"));
    assert!(errors.get("terms").is_some());
    assert!(backend.rows(Table::Profiles).await.is_empty());
    assert!(v.navigator.history().is_empty());
}

#[tokio::test]
async fn test_sign_in_and_out() {
    let backend = Arc::new(MemoryBackend::new("secret"));
    register(&backend, "Wren Park", "wren@example.com", Role::Work).await;

    let v = viewer(&backend);
    let err = sign_in(
        &v.ctx,
        &SignInInput {
            email: "wren@example.com".into(),
            password: "not-the-password".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FormError::Backend(_)));
    assert_eq!(err.to_string(), "Invalid login credentials");
    assert!(v.navigator.history().is_empty());

    let session = sign_in(
        &v.ctx,
        &SignInInput {
            email: "wren@example.com".into(),
            password: "secret1".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(v.ctx.client.session(), Some(session));

    sign_out(&v.ctx).await.unwrap();
    assert!(v.ctx.client.session().is_none());
    assert_eq!(
        v.navigator.history()[2..],
        [Navigation::Replace("/".into()), Navigation::Refresh]
    );
}

#[tokio::test]
async fn test_create_job_then_apply() {
    let backend = Arc::new(MemoryBackend::new("secret"));
    let host = register(&backend, "Harper Lane", "harper@example.com", Role::Hire).await;
    let worker = register(&backend, "Wren Park", "wren@example.com", Role::Work).await;

    let job_id = CreateJobForm::new(host.ctx.clone())
        .submit(&job_input())
        .await
        .unwrap();
    assert!(host
        .navigator
        .history()
        .ends_with(&[Navigation::Replace(format!("/jobs/{}", job_id)), Navigation::Refresh]));

    let mut form = ApplyForm::new(worker.ctx.clone(), job_id, false);
    assert_eq!(form.view(), ApplyView::Form);

    let refreshes = worker.navigator.refresh_count();
    let view = form.submit("I have run bars for 8 yrs").await.unwrap();
    assert_eq!(view, ApplyView::Confirmation);
    assert_eq!(form.view(), ApplyView::Confirmation);
    assert_eq!(worker.navigator.refresh_count(), refreshes + 1);

    let applications =
        ApplicationRepo::list_for_job(backend.as_ref(), &AccessScope::anonymous(), job_id)
            .await
            .unwrap();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0].worker_id, session_of(&worker).await.user.id);
    assert_eq!(
        applications[0].cover_letter.as_deref(),
        Some("I have run bars for 8 yrs")
    );

    // A second submission never reaches the backend
    form.submit("I have run bars for 8 yrs").await.unwrap();
    assert_eq!(backend.rows(Table::JobApplications).await.len(), 1);
}

#[tokio::test]
async fn test_already_applied_shows_confirmation_only() {
    let backend = Arc::new(MemoryBackend::new("secret"));
    let worker = register(&backend, "Wren Park", "wren@example.com", Role::Work).await;

    let mut form = ApplyForm::new(worker.ctx.clone(), Uuid::new_v4(), true);
    assert_eq!(form.view(), ApplyView::Confirmation);
    assert_eq!(
        form.submit("Another attempt at applying here").await.unwrap(),
        ApplyView::Confirmation
    );
    assert!(backend.rows(Table::JobApplications).await.is_empty());
}

#[tokio::test]
async fn test_apply_failures_are_reported() {
    let backend = Arc::new(MemoryBackend::new("secret"));
    let anonymous = viewer(&backend);
    let mut form = ApplyForm::new(anonymous.ctx.clone(), Uuid::new_v4(), false);

    let err = form.submit("too short").await.unwrap_err();
    assert!(err.field_errors().unwrap().get("cover_letter").is_some());

    let err = form.submit("I have run bars for 8 yrs").await.unwrap_err();
    assert!(matches!(err, FormError::SignInRequired(_)));
    assert_eq!(form.view(), ApplyView::Form);
    assert!(anonymous.navigator.history().is_empty());
}

#[tokio::test]
async fn test_create_job_rejects_invalid_input() {
    let backend = Arc::new(MemoryBackend::new("secret"));
    let host = register(&backend, "Harper Lane", "harper@example.com", Role::Hire).await;

    let input = JobInput {
        description: "Too short".into(),
        rate: "-5".into(),
        ..job_input()
    };
    let err = CreateJobForm::new(host.ctx.clone())
        .submit(&input)
        .await
        .unwrap_err();
    let errors = err.field_errors().unwrap();
    assert!(errors.get("description").is_some());
    assert_eq!(errors.get("rate"), Some("Rate must be positive"));
    assert!(backend.rows(Table::Jobs).await.is_empty());
}

#[tokio::test]
async fn test_profile_form_upserts() {
    let backend = Arc::new(MemoryBackend::new("secret"));
    let worker = register(&backend, "Wren Park", "wren@example.com", Role::Work).await;

    let notice = ProfileForm::new(worker.ctx.clone())
        .submit(&ProfileInput {
            full_name: "Wren Park".into(),
            role: "work".into(),
            bio: "Craft cocktails and high volume service".into(),
            skills: "mixology,  wine service , ".into(),
            hourly_rate: "38.5".into(),
            location: "Austin".into(),
            experience_years: "7".into(),
            certifications: "TABC".into(),
        })
        .await
        .unwrap();
    assert_eq!(notice, "Profile updated successfully.");

    let id = session_of(&worker).await.user.id;
    let profile = ProfileRepo::get(backend.as_ref(), &AccessScope::anonymous(), id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        profile.skills,
        Some(vec!["mixology".to_string(), "wine service".to_string()])
    );
    assert_eq!(profile.hourly_rate, Some(38.5));
    assert_eq!(profile.experience_years, Some(7));
    assert_eq!(backend.rows(Table::Profiles).await.len(), 1);
}

#[tokio::test]
async fn test_message_composer() {
    let backend = Arc::new(MemoryBackend::new("secret"));
    let host = register(&backend, "Harper Lane", "harper@example.com", Role::Hire).await;
    let worker = register(&backend, "Wren Park", "wren@example.com", Role::Work).await;
    let job_id = CreateJobForm::new(host.ctx.clone())
        .submit(&job_input())
        .await
        .unwrap();
    let host_id = session_of(&host).await.user.id;

    let awaiting = MessageComposer::new(host.ctx.clone(), job_id, None);
    assert!(!awaiting.can_send());
    let err = awaiting.submit("Hello there").await.unwrap_err();
    assert_eq!(
        err.field_errors().unwrap().get("recipient"),
        Some("Select a participant to message.")
    );

    let composer = MessageComposer::new(worker.ctx.clone(), job_id, Some(host_id));
    assert!(composer.submit("").await.is_err());
    let sent = composer.submit("Is parking available?").await.unwrap();
    assert_eq!(sent.recipient_id, host_id);

    let host_scope = host.ctx.client.scope();
    let inbox = MessageRepo::list_for_participant(backend.as_ref(), &host_scope, host_id)
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].content, "Is parking available?");
}

struct ChannelForwarder(mpsc::UnboundedSender<AuthChange>);

impl SessionForwarder for ChannelForwarder {
    fn forward(&self, change: &AuthChange) {
        let _ = self.0.send(change.clone());
    }
}

#[tokio::test]
async fn test_bridge_follows_form_sign_out() {
    let backend = Arc::new(MemoryBackend::new("secret"));
    let worker = register(&backend, "Wren Park", "wren@example.com", Role::Work).await;
    let rendered_with = session_of(&worker).await.access_token;

    let page_navigator = Arc::new(RecordingNavigator::new());
    let (tx, mut forwarded) = mpsc::unbounded_channel();
    let bridge = SessionBridge::new(
        worker.ctx.client.clone(),
        Some(rendered_with),
        page_navigator.clone(),
        Arc::new(ChannelForwarder(tx)),
    );
    bridge.observe();

    let initial = forwarded.recv().await.unwrap();
    assert_eq!(initial.event, AuthEvent::InitialSession);
    assert_eq!(page_navigator.refresh_count(), 0);

    sign_out(&worker.ctx).await.unwrap();
    let change = forwarded.recv().await.unwrap();
    assert_eq!(change.event, AuthEvent::SignedOut);
    assert!(change.session.is_none());
    assert_eq!(page_navigator.refresh_count(), 1);

    bridge.shutdown().await;
}
