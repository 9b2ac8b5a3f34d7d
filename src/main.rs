// Even Dating Admin - Main Entry Point
//
// Operator CLI for the Even Dating admin API:
// - Session management (login / logout / whoami)
// - Moderation, entitlement and system commands
// - Local inspection of the public form limiters

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn, Level};
use tracing_subscriber::EnvFilter;

use evendating_console::api::endpoints::DEFAULT_LOG_LIMIT;
use evendating_console::api::models::{
    AdminUser, AuditQuery, GrantRequest, LogLevel, ModerationQueue, PhotoStatus, ReportAction,
    ReportStatus, TokenBalances, TokenDelta,
};
use evendating_console::api::{AdminApiClient, HttpTransport, Session, SessionState, LOGIN_ROUTE};
use evendating_console::config::Config;
use evendating_console::forms::{FormGate, FormKind, FormSubmission, Rejection};
use evendating_console::rate_limit::{stored_limiter_keys, RateLimiter};
use evendating_console::storage::{FileStore, SharedStore};

type Client = AdminApiClient<HttpTransport>;

/// Even Dating admin console
#[derive(Parser, Debug)]
#[command(name = "evendating-admin")]
#[command(version)]
#[command(about = "Operator console for the Even Dating admin API", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the XDG config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the bearer token
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "EVENDATING_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear stored credentials
    Logout,
    /// Show and re-validate the stored session
    Whoami,
    /// User directory and account actions
    #[command(subcommand)]
    Users(UsersCommand),
    /// Photo moderation
    #[command(subcommand)]
    Photos(PhotosCommand),
    /// Content reports
    #[command(subcommand)]
    Reports(ReportsCommand),
    /// Feature flags
    #[command(subcommand)]
    Flags(FlagsCommand),
    /// Grant tokens and/or change a subscription
    Grant(GrantArgs),
    /// Start or poll a DSAR data export
    Export {
        uid: String,

        /// Poll an existing job instead of starting one
        #[arg(long)]
        job: Option<String>,
    },
    /// Page through the audit trail
    Audit {
        #[arg(long, default_value_t = 100)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        #[arg(long)]
        admin_id: Option<String>,

        #[arg(long)]
        action: Option<String>,

        #[arg(long)]
        since: Option<String>,
    },
    /// Backend health, optionally with recent logs
    Health {
        /// Include server logs at this level
        #[arg(long)]
        logs: Option<LogLevel>,
    },
    /// Console operator accounts
    #[command(subcommand)]
    Admins(AdminsCommand),
    /// Inspect or reset the local form limiters
    #[command(subcommand)]
    Limit(LimitCommand),
    /// Validate a public form submission through its limiter
    Submit(SubmitArgs),
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    /// Search by name, or by UID for long queries
    Search { query: String },
    /// Show one user with tokens, strikes and rating
    Show { uid: String },
    /// Total and active user counts
    Stats,
    Ban {
        uid: String,
        #[arg(long)]
        reason: Option<String>,
    },
    Unban { uid: String },
    Pause { uid: String },
    Unpause { uid: String },
    Delete { uid: String },
    /// Reviews received and sent
    Reviews { uid: String },
}

#[derive(Subcommand, Debug)]
enum PhotosCommand {
    List {
        #[arg(long)]
        status: Option<PhotoStatus>,
    },
    Approve {
        id: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        confidence: Option<f64>,
    },
    Reject {
        id: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        confidence: Option<f64>,
    },
    Requeue {
        id: String,
        #[arg(long)]
        queue: ModerationQueue,
    },
    Delete { ids: Vec<String> },
}

#[derive(Subcommand, Debug)]
enum ReportsCommand {
    List {
        #[arg(long)]
        status: Option<ReportStatus>,
    },
    Show { id: String },
    Resolve {
        id: String,
        #[arg(long)]
        action: ReportAction,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum FlagsCommand {
    List,
    Set {
        key: String,
        #[arg(long, action = ArgAction::Set)]
        enabled: bool,
        #[arg(long)]
        rollout: Option<f64>,
    },
    /// Payment switches
    Payments,
}

#[derive(ClapArgs, Debug)]
struct GrantArgs {
    uid: String,

    #[arg(long)]
    search: Option<u32>,

    #[arg(long)]
    message: Option<u32>,

    #[arg(long)]
    undo: Option<u32>,

    #[arg(long)]
    subscribed: Option<bool>,

    /// Subscription expiry (RFC 3339)
    #[arg(long)]
    expires: Option<DateTime<Utc>>,
}

#[derive(Subcommand, Debug)]
enum AdminsCommand {
    List,
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        uid: String,
    },
    Remove { uid: String },
}

#[derive(Subcommand, Debug)]
enum LimitCommand {
    /// Show limiter windows (every known and stored limiter when no form is given)
    Status { form: Option<FormKind> },
    /// Clear a limiter window
    Reset { form: FormKind },
}

#[derive(ClapArgs, Debug)]
struct SubmitArgs {
    form: FormKind,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    subject: String,

    #[arg(long)]
    body: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    init_tracing(&config, args.verbose)?;
    debug!("Using state file {:?}", config.state_path());

    let store: SharedStore = Arc::new(FileStore::new(config.state_path()));

    match args.command {
        Commands::Limit(cmd) => run_limit(cmd, &config, store),
        Commands::Submit(submit) => run_submit(submit, &config, store),
        command => {
            let session = Arc::new(Session::load(store)?);
            let transport = HttpTransport::with_timeout(config.api.timeout())?;
            let client = AdminApiClient::new(transport, &config.api.base_url, session.clone());

            let result = run_api(command, &client).await;
            if session.state() == SessionState::Expired {
                warn!("Session expired; sign in again ({})", LOGIN_ROUTE);
                eprintln!("Session expired. Run `evendating-admin login` to sign in again.");
            }
            result
        }
    }
}

fn init_tracing(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else {
        config.log_level()?
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.logging.format.to_lowercase().as_str() {
        "json" => builder.json().init(),
        "pretty" => builder.pretty().init(),
        _ => builder.compact().init(),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", text);
    Ok(())
}

async fn run_api(command: Commands, client: &Client) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            client.login(&email, &password).await?;
            println!("Signed in as {}", email);
        }
        Commands::Logout => {
            client.logout();
            println!("Signed out");
        }
        Commands::Whoami => {
            let state = client.restore_session().await?;
            print_json(&state)?;
        }
        Commands::Users(cmd) => run_users(cmd, client).await?,
        Commands::Photos(cmd) => run_photos(cmd, client).await?,
        Commands::Reports(cmd) => run_reports(cmd, client).await?,
        Commands::Flags(cmd) => run_flags(cmd, client).await?,
        Commands::Grant(grant) => {
            let request = GrantRequest {
                user_uid: grant.uid,
                tokens: TokenDelta {
                    search: grant.search,
                    message: grant.message,
                    undo: grant.undo,
                },
                is_subscribed: grant.subscribed,
                subscription_expires_at: grant.expires,
            };
            let outcome = client.grant(&request).await?;
            print_json(&outcome)?;
            if !outcome.is_complete() {
                anyhow::bail!("Grant for {} did not complete", request.user_uid);
            }
        }
        Commands::Export { uid, job } => match job {
            Some(job) => print_json(&client.get_export_status(&uid, &job).await?)?,
            None => print_json(&client.export_user_data(&uid).await?)?,
        },
        Commands::Audit {
            limit,
            offset,
            admin_id,
            action,
            since,
        } => {
            let query = AuditQuery {
                limit,
                offset,
                admin_id,
                action,
                since,
            };
            print_json(&client.get_audit_logs(&query).await?)?;
        }
        Commands::Health { logs } => {
            print_json(&client.get_system_health().await?)?;
            if let Some(level) = logs {
                print_json(&client.get_logs(Some(level), DEFAULT_LOG_LIMIT).await?)?;
            }
        }
        Commands::Admins(cmd) => match cmd {
            AdminsCommand::List => print_json(&client.get_admins().await?)?,
            AdminsCommand::Add { email, uid } => {
                print_json(&client.create_admin(&email, &uid).await?)?
            }
            AdminsCommand::Remove { uid } => client.delete_admin(&uid).await?,
        },
        Commands::Limit(_) | Commands::Submit(_) => {
            anyhow::bail!("local commands do not use the API client")
        }
    }

    Ok(())
}

async fn run_users(cmd: UsersCommand, client: &Client) -> Result<()> {
    match cmd {
        UsersCommand::Search { query } => print_json(&client.search_users(&query).await?)?,
        UsersCommand::Show { uid } => {
            #[derive(Serialize)]
            struct UserView {
                user: AdminUser,
                tokens: TokenBalances,
                strikes: u32,
                rating: Option<f64>,
            }

            let user = client.get_user(&uid).await?;
            let tokens = client.get_user_tokens(&uid).await?;
            let strikes = client.get_user_strikes(&uid).await?;
            let rating = client.get_user_rating(&uid).await?;
            print_json(&UserView {
                user,
                tokens,
                strikes,
                rating,
            })?;
        }
        UsersCommand::Stats => print_json(&client.get_user_stats().await?)?,
        UsersCommand::Ban { uid, reason } => {
            print_json(&client.ban_user(&uid, reason.as_deref()).await?)?
        }
        UsersCommand::Unban { uid } => print_json(&client.unban_user(&uid).await?)?,
        UsersCommand::Pause { uid } => print_json(&client.pause_user(&uid).await?)?,
        UsersCommand::Unpause { uid } => print_json(&client.unpause_user(&uid).await?)?,
        UsersCommand::Delete { uid } => client.delete_user(&uid).await?,
        UsersCommand::Reviews { uid } => {
            let received = client.get_received_reviews(&uid).await?;
            let sent = client.get_sent_reviews(&uid).await?;
            print_json(&serde_json::json!({ "received": received, "sent": sent }))?;
        }
    }
    Ok(())
}

async fn run_photos(cmd: PhotosCommand, client: &Client) -> Result<()> {
    match cmd {
        PhotosCommand::List { status } => print_json(&client.get_photos(status).await?)?,
        PhotosCommand::Approve {
            id,
            reason,
            confidence,
        } => print_json(
            &client
                .approve_photo(&id, reason.as_deref(), confidence)
                .await?,
        )?,
        PhotosCommand::Reject {
            id,
            reason,
            confidence,
        } => print_json(
            &client
                .reject_photo(&id, reason.as_deref(), confidence)
                .await?,
        )?,
        PhotosCommand::Requeue { id, queue } => {
            print_json(&client.requeue_photo(&id, queue).await?)?
        }
        PhotosCommand::Delete { ids } => client.bulk_delete_photos(&ids).await?,
    }
    Ok(())
}

async fn run_reports(cmd: ReportsCommand, client: &Client) -> Result<()> {
    match cmd {
        ReportsCommand::List { status } => print_json(&client.get_reports(status).await?)?,
        ReportsCommand::Show { id } => print_json(&client.get_report(&id).await?)?,
        ReportsCommand::Resolve { id, action, notes } => print_json(
            &client
                .resolve_report(&id, action, notes.as_deref())
                .await?,
        )?,
    }
    Ok(())
}

async fn run_flags(cmd: FlagsCommand, client: &Client) -> Result<()> {
    match cmd {
        FlagsCommand::List => print_json(&client.get_feature_flags().await?)?,
        FlagsCommand::Set {
            key,
            enabled,
            rollout,
        } => print_json(&client.update_feature_flag(&key, enabled, rollout).await?)?,
        FlagsCommand::Payments => print_json(&client.get_payment_flags().await?)?,
    }
    Ok(())
}

fn limiter_for(kind: FormKind, config: &Config, store: SharedStore) -> RateLimiter {
    let key = kind.limiter_key();
    RateLimiter::new(key, config.rate_limits.for_key(key), store)
}

fn run_limit(cmd: LimitCommand, config: &Config, store: SharedStore) -> Result<()> {
    match cmd {
        LimitCommand::Status { form } => {
            let keys: Vec<String> = match form {
                Some(kind) => vec![kind.limiter_key().to_string()],
                None => {
                    let mut keys: Vec<String> =
                        [FormKind::Contact, FormKind::Suggestion, FormKind::SupportTicket]
                            .iter()
                            .map(|kind| kind.limiter_key().to_string())
                            .collect();
                    for key in stored_limiter_keys(store.as_ref()) {
                        if !keys.contains(&key) {
                            keys.push(key);
                        }
                    }
                    keys
                }
            };
            let statuses: Vec<_> = keys
                .iter()
                .map(|key| {
                    RateLimiter::new(key.as_str(), config.rate_limits.for_key(key), store.clone())
                        .status()
                })
                .collect();
            print_json(&statuses)
        }
        LimitCommand::Reset { form } => {
            limiter_for(form, config, store).reset();
            println!("Reset {}", form.limiter_key());
            Ok(())
        }
    }
}

fn run_submit(args: SubmitArgs, config: &Config, store: SharedStore) -> Result<()> {
    let gate = FormGate::new(args.form, limiter_for(args.form, config, store));
    let submission = FormSubmission {
        kind: args.form,
        name: args.name,
        email: args.email,
        subject: args.subject,
        body: args.body,
    };

    match gate.admit(&submission) {
        Ok(sanitized) => print_json(&sanitized),
        Err(Rejection::Invalid(errors)) => {
            print_json(&errors)?;
            Err(Rejection::Invalid(errors).into())
        }
        Err(rejection) => Err(rejection.into()),
    }
}
