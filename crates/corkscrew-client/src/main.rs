use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use corkscrew_backend::{AccessScope, JobRepo, JobSearch};
use corkscrew_client::config::ClientConfig;
use corkscrew_client::forms::auth::{sign_in, sign_up};
use corkscrew_client::forms::{ApplyForm, FormContext, MessageComposer};
use corkscrew_client::forwarder::HttpForwarder;
use corkscrew_client::navigator::LogNavigator;
use corkscrew_client::{SessionBridge, SharedClient};
use corkscrew_common::models::{Role, Session};
use corkscrew_common::validation::{SignInInput, SignUpInput};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "corkscrew", version, about = "Corkscrew CLI - event staffing marketplace")]
struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Credentials {
    #[arg(long, env = "CORKSCREW_EMAIL")]
    email: String,

    #[arg(long, env = "CORKSCREW_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check credentials against the backend
    SignIn {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Create an account and its profile
    SignUp {
        #[command(flatten)]
        credentials: Credentials,
        /// Name shown on the profile
        #[arg(long)]
        full_name: String,
        /// "hire" to post jobs, "work" to apply
        #[arg(long, default_value = "work")]
        role: Role,
        /// Accept the terms of service
        #[arg(long)]
        accept_terms: bool,
    },
    /// Search open jobs
    Jobs {
        /// Keyword in the title
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Skill or role in the description
        #[arg(long)]
        role: Option<String>,
        /// Earliest event date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Apply to a job
    Apply {
        #[command(flatten)]
        credentials: Credentials,
        job_id: Uuid,
        #[arg(long)]
        cover_letter: String,
    },
    /// Send a message in a job thread
    Message {
        #[command(flatten)]
        credentials: Credentials,
        job_id: Uuid,
        #[arg(long)]
        to: Uuid,
        content: String,
    },
    /// Keep the server's session cookies in step with this client until Ctrl-C
    Watch {
        #[command(flatten)]
        credentials: Credentials,
        /// Access token the server currently renders with (defaults to the fresh sign-in)
        #[arg(long)]
        server_token: Option<String>,
        /// Seconds between session freshness checks
        #[arg(long, default_value = "30")]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let client = SharedClient::global().get_or_connect(&cli.config)?;
    let ctx = FormContext::new(client, Arc::new(LogNavigator));

    match cli.command {
        Commands::SignIn { credentials } => {
            let session = authenticate(&ctx, &credentials).await?;
            println!("Signed in as {} ({})", credentials.email, session.user.id);
        }
        Commands::SignUp {
            credentials,
            full_name,
            role,
            accept_terms,
        } => {
            cmd_sign_up(&ctx, credentials, full_name, role, accept_terms).await?;
        }
        Commands::Jobs {
            q,
            location,
            role,
            date,
        } => {
            let search = JobSearch {
                query: q,
                location,
                role,
                date,
            };
            cmd_jobs(&ctx, &search).await?;
        }
        Commands::Apply {
            credentials,
            job_id,
            cover_letter,
        } => {
            authenticate(&ctx, &credentials).await?;
            ApplyForm::new(ctx.clone(), job_id, false)
                .submit(&cover_letter)
                .await
                .context("Application failed")?;
            println!("Application sent");
        }
        Commands::Message {
            credentials,
            job_id,
            to,
            content,
        } => {
            authenticate(&ctx, &credentials).await?;
            let message = MessageComposer::new(ctx.clone(), job_id, Some(to))
                .submit(&content)
                .await
                .context("Failed to send message")?;
            println!("Message sent: {}", message.id);
        }
        Commands::Watch {
            credentials,
            server_token,
            interval,
        } => {
            cmd_watch(&ctx, &cli.config, &credentials, server_token, interval).await?;
        }
    }

    Ok(())
}

async fn authenticate(
    ctx: &FormContext,
    credentials: &Credentials,
) -> Result<Session> {
    let input = SignInInput {
        email: credentials.email.clone(),
        password: credentials.password.clone(),
    };
    sign_in(ctx, &input).await.context("Sign in failed")
}

async fn cmd_sign_up(
    ctx: &FormContext,
    credentials: Credentials,
    full_name: String,
    role: Role,
    accept_terms: bool,
) -> Result<()> {
    let input = SignUpInput {
        full_name,
        email: credentials.email,
        password: credentials.password.clone(),
        confirm_password: credentials.password,
        role,
        accept_terms,
    };
    match sign_up(ctx, &input).await.context("Sign up failed")? {
        Some(session) => println!("Account created: {} ({})", input.email, session.user.id),
        None => println!("Account created: confirm {} before signing in", input.email),
    }
    Ok(())
}

async fn cmd_jobs(ctx: &FormContext, search: &JobSearch) -> Result<()> {
    let jobs = JobRepo::search(ctx.client.backend(), &AccessScope::anonymous(), search)
        .await
        .context("Failed to search jobs")?;

    if jobs.is_empty() {
        println!("No jobs match your filters yet.");
        return Ok(());
    }

    println!("{:<36}  {:<10}  {:<24}  {:<12}  TITLE", "ID", "DATE", "LOCATION", "RATE");
    for job in jobs {
        println!(
            "{:<36}  {:<10}  {:<24}  {:<12}  {}",
            job.id.to_string(),
            job.event_date.to_string(),
            job.location,
            job.rate_label(),
            job.title
        );
    }
    Ok(())
}

async fn cmd_watch(
    ctx: &FormContext,
    config: &ClientConfig,
    credentials: &Credentials,
    server_token: Option<String>,
    interval: u64,
) -> Result<()> {
    let session = authenticate(ctx, credentials).await?;
    let server_token = server_token.unwrap_or(session.access_token);

    let forwarder = HttpForwarder::new(&config.server_url);
    tracing::info!("Forwarding session changes to {}", forwarder.callback_url());
    let bridge = SessionBridge::new(
        ctx.client.clone(),
        Some(server_token),
        ctx.navigator.clone(),
        Arc::new(forwarder),
    );
    bridge.observe();

    // Refresh expired tokens so the server sees TOKEN_REFRESHED
    let client = ctx.client.clone();
    let refresher = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
        loop {
            ticker.tick().await;
            if client.live_session().await.is_none() {
                tracing::warn!("Session lost, stopping refresh");
                break;
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Stopping session bridge");
    refresher.abort();
    bridge.shutdown().await;
    Ok(())
}
