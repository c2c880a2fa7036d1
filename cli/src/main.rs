use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use portal::{
    ApiError, ApiRequest, ApiResponse, BootstrapOutcome, ConfigError, Credentials, Navigator, PortalConfig, ProfileStore, Session,
    StoreError,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("profile storage failed: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not logged in; run `portal-cli login` first")]
    NotLoggedIn,
}

#[derive(Parser, Debug)]
#[command(name = "portal-cli", about = "Campus portal API client")]
struct Cli {
    #[arg(long, env = "PORTAL_API_BASE_URL", default_value = "http://127.0.0.1:8080")]
    base_url: String,

    #[arg(long, env = "PORTAL_PROFILE_DIR", default_value = ".portal", help = "Directory holding cookies and local storage")]
    profile_dir: PathBuf,

    #[arg(long, env = "PORTAL_REQUEST_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Restore the stored session and print the member profile.
    Whoami,
    /// Run the startup session check and print its outcome.
    Session,
    Get {
        path: String,
    },
    Post {
        path: String,
        #[arg(long, default_value = "{}")]
        data: String,
    },
}

/// Stands in for the browser redirect to the login page.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn navigate(&self, path: &str) {
        eprintln!("session expired; log in again (portal {path})");
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let session = connect(&cli)?;

    match cli.command {
        Command::Login { email, password } => run_login(&session, Credentials { email, password }).await,
        Command::Logout => {
            session.logout().await;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => run_whoami(&session).await,
        Command::Session => run_session(&session).await,
        Command::Get { path } => print_response(&session.client().send(ApiRequest::get(path)).await?),
        Command::Post { path, data } => {
            let request = ApiRequest::post(path).with_body(parse_payload(&data)?);
            print_response(&session.client().send(request).await?)
        }
    }
}

fn connect(cli: &Cli) -> Result<Session, CliError> {
    let mut config = PortalConfig::from_lookup(|key| match key {
        "PORTAL_API_BASE_URL" => Some(cli.base_url.clone()),
        "PORTAL_REQUEST_TIMEOUT_MS" => None,
        _ => std::env::var(key).ok(),
    })?;
    if let Some(ms) = cli.timeout_ms.filter(|ms| *ms > 0) {
        config = config.with_timeout(Duration::from_millis(ms));
    }

    let profile = Arc::new(ProfileStore::open(cli.profile_dir.join("profile.json"))?);
    let session = Session::builder(config).profile(profile).navigator(Arc::new(CliNavigator)).build()?;
    Ok(session)
}

async fn run_login(session: &Session, credentials: Credentials) -> Result<(), CliError> {
    let user = session.login(&credentials).await?;
    println!("logged in as {}", user.nickname().unwrap_or(&credentials.email));
    Ok(())
}

async fn run_whoami(session: &Session) -> Result<(), CliError> {
    match session.init_auth().await {
        BootstrapOutcome::Restored(user) => print_json(&serde_json::to_value(&user)?),
        _ => Err(CliError::NotLoggedIn),
    }
}

async fn run_session(session: &Session) -> Result<(), CliError> {
    let outcome = session.init_auth().await;
    println!("{}", describe_outcome(&outcome));
    Ok(())
}

fn describe_outcome(outcome: &BootstrapOutcome) -> String {
    match outcome {
        BootstrapOutcome::Skipped => "no stored session".to_owned(),
        BootstrapOutcome::Restored(user) => format!("restored session for {}", user.nickname().unwrap_or("unknown member")),
        BootstrapOutcome::Empty => "server returned no user; session cleared".to_owned(),
        BootstrapOutcome::Rejected { status: Some(status), .. } => format!("session rejected (HTTP {status}); cleared"),
        BootstrapOutcome::Rejected { status: None, .. } => "session check unreachable; cleared".to_owned(),
    }
}

fn parse_payload(data: &str) -> Result<Value, CliError> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    Ok(serde_json::from_str::<Value>(trimmed)?)
}

/// Pretty-print JSON bodies; anything else is echoed as text.
fn print_response(response: &ApiResponse) -> Result<(), CliError> {
    if response.is_empty() {
        println!("HTTP {}", response.status.as_u16());
        return Ok(());
    }
    match response.json::<Value>() {
        Ok(json) => print_json(&json),
        Err(_) => {
            println!("{}", response.text());
            Ok(())
        }
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
