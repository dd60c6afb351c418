mod cli;
mod config;
mod http;
mod state;
mod wiring;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Mode};
use crate::config::ConfigError;
use crate::http::middleware::admin_auth::{self, AdminAuthError};
use crate::http::HttpError;
use crate::state::AppState;
use crate::wiring::WiringError;
use mksearch_infra::search::EngineError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid cli: {0}")]
    InvalidCli(String),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("admin token error: {0}")]
    AdminToken(#[from] AdminAuthError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    config::load_dotenv()?;
    let config = config::AppConfig::from_env()?;
    if cli.force_creation && !cli.mode.run_api() {
        return Err(AppError::InvalidCli(
            "force-creation requires api mode".to_string(),
        ));
    }
    let state = wiring::build_state(config)?;

    match cli.mode {
        Mode::IssueToken => issue_token(&state, cli.token_ttl_secs),
        Mode::Status => print_status(&state).await,
        Mode::Api => run_api(state, cli.force_creation).await,
    }
}

fn issue_token(state: &AppState, ttl_secs: i64) -> Result<(), AppError> {
    let secret = state
        .config
        .admin_token_secret
        .as_deref()
        .ok_or_else(|| AppError::InvalidCli("MKSEARCH_ADMIN_SECRET is not set".to_string()))?;
    if ttl_secs <= 0 {
        return Err(AppError::InvalidCli(
            "token-ttl-secs must be positive".to_string(),
        ));
    }
    let token = admin_auth::issue_token(secret, ttl_secs)?;
    println!("{token}");
    Ok(())
}

async fn print_status(state: &AppState) -> Result<(), AppError> {
    let status = state.engine().get_status().await;
    info!(code = status.code(), index = %state.index_model.title, "status probed");
    println!("{} {}", status.code(), status.message());
    Ok(())
}

async fn run_api(state: AppState, force_creation: bool) -> Result<(), AppError> {
    if force_creation {
        let mut engine = state.engine();
        engine.open_index(&state.index_model, true).await?;
    }
    if state.config.nosearch {
        warn!("searching is disabled by MKSEARCH_NOSEARCH");
    }

    let addr = state.config.http_addr;
    let api_task = tokio::spawn(async move {
        info!(%addr, "http server starting");
        http::serve(addr, state).await
    });

    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
        res = api_task => {
            res??;
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
    }
}
