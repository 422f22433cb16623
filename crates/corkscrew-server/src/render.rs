use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use once_cell::sync::Lazy;
use tera::{Context, Tera};

const SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("jobs.html", include_str!("../templates/jobs.html")),
    ("job_new.html", include_str!("../templates/job_new.html")),
    ("job_detail.html", include_str!("../templates/job_detail.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    ("messages.html", include_str!("../templates/messages.html")),
    ("sign_in.html", include_str!("../templates/sign_in.html")),
    ("sign_up.html", include_str!("../templates/sign_up.html")),
    ("setup.html", include_str!("../templates/setup.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
    ("error.html", include_str!("../templates/error.html")),
];

static TEMPLATES: Lazy<Result<Tera, tera::Error>> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(SOURCES.iter().copied())?;
    Ok(tera)
});

/// Render an embedded template to a string
pub fn render(name: &str, context: &Context) -> anyhow::Result<String> {
    let tera = TEMPLATES
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load templates: {}", e))?;
    tera.render(name, context)
        .map_err(|e| anyhow::anyhow!("Failed to render {}: {:?}", name, e))
}

pub fn html(name: &str, context: &Context) -> Response {
    html_with_status(StatusCode::OK, name, context)
}

/// Rendered page, or a plain-text 500 if rendering itself fails
pub fn html_with_status(status: StatusCode, name: &str, context: &Context) -> Response {
    match render(name, context) {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!("{:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

pub fn not_found() -> Response {
    html_with_status(StatusCode::NOT_FOUND, "not_found.html", &Context::new())
}

/// Generic failure page. The cause is logged by the caller, never rendered.
pub fn failure(status: StatusCode) -> Response {
    html_with_status(status, "error.html", &Context::new())
}
