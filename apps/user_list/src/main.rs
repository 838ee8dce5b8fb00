use std::{
    future::Future, io::Write, path::PathBuf, process::ExitCode, sync::Arc, time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{ApplyPolicy, FetchPhase, UserListController, UserListEvent};
use shared::domain::DecodeMode;
use tokio::{sync::broadcast, time::Instant};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, load_settings_from, parse_users_url, Settings};
use render::{notice_line, render_users, OutputFormat};

#[derive(Parser, Debug)]
#[command(about = "Fetch the user list and print it")]
struct Args {
    /// Users endpoint, overriding the settings file and environment.
    #[arg(long)]
    url: Option<String>,
    /// Settings file to read instead of ./user_list.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Reject records that do not match the user schema.
    #[arg(long)]
    strict: bool,
    /// Only apply the response to the most recently issued request.
    #[arg(long)]
    latest_only: bool,
    /// Print the payload as JSON instead of a table.
    #[arg(long)]
    json: bool,
    /// Re-fetch every SECS seconds and re-render on change until interrupted.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    refresh_secs: Option<u64>,
}

/// How a run ended; one-shot mode turns a failed load into exit status 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Loaded,
    Failed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Loaded => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
        }
    }
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.url {
            settings.users_url = url.clone();
        }
        if self.strict {
            settings.decode_mode = DecodeMode::Strict;
        }
        if self.latest_only {
            settings.apply_policy = ApplyPolicy::LatestIssuedOnly;
        }
    }

    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let mut settings = match &args.config {
        Some(path) => load_settings_from(path, |key| std::env::var(key).ok()),
        None => load_settings(),
    };
    args.apply(&mut settings);

    let filter =
        EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let url = parse_users_url(&settings.users_url)?;
    info!(%url, decode_mode = ?settings.decode_mode, "loading users");
    let controller = UserListController::for_url(url, settings.controller_options());

    let (mut out, mut err) = (std::io::stdout(), std::io::stderr());
    let outcome = match args.refresh_secs {
        Some(secs) => {
            let period = Duration::from_secs(secs);
            watch_users(controller, args.format(), period, ctrl_c(), &mut out, &mut err).await?
        }
        None => show_users_once(controller, args.format(), &mut out, &mut err).await?,
    };
    Ok(outcome.into())
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn show_users_once(
    controller: Arc<UserListController>,
    format: OutputFormat,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Outcome> {
    let mut events = controller.subscribe_events();
    controller
        .init()
        .await
        .context("users fetch task did not complete")?;

    if controller.phase() == FetchPhase::Populated {
        out.write_all(render_users(&controller.users(), format)?.as_bytes())?;
        out.flush()?;
        return Ok(Outcome::Loaded);
    }

    while let Ok(event) = events.try_recv() {
        if let UserListEvent::LoadFailed(notice) = event {
            writeln!(err, "{}", notice_line(&notice))?;
        }
    }
    Ok(Outcome::Failed)
}

/// Re-fetches every `period` and re-renders each replacement until `shutdown`
/// resolves.
async fn watch_users(
    controller: Arc<UserListController>,
    format: OutputFormat,
    period: Duration,
    shutdown: impl Future<Output = ()>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Outcome> {
    let mut events = controller.subscribe_events();
    let mut users = controller.stream().skip(1);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    tokio::pin!(shutdown);

    let _initial = controller.init();
    loop {
        // Pending renders and notices go out before shutdown is honoured.
        tokio::select! {
            biased;
            Some(state) = users.next() => {
                out.write_all(render_users(&state, format)?.as_bytes())?;
                out.flush()?;
            }
            event = events.recv() => match event {
                Ok(UserListEvent::LoadFailed(notice)) => writeln!(err, "{}", notice_line(&notice))?,
                Ok(UserListEvent::Loaded { count }) => debug!(?count, "user list refreshed"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "missed user list events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = ticker.tick() => {
                let _refresh = controller.fetch_users();
            }
            _ = &mut shutdown => {
                info!("shutdown requested; stopping refresh");
                break;
            }
        }
    }

    Ok(Outcome::Loaded)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
