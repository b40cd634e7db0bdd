// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Command-line interface for the repostat binary.
//!
//! A single invocation refreshes the repository status table of one markdown
//! document and writes a run summary next to it.

use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    process,
    sync::Mutex,
};

use chrono::Utc;
use clap::{ArgAction, Parser};
use repostat::{
    ClientSettings, DEFAULT_LOOKBACK_DAYS, DEFAULT_USERNAME, Error, GitHubClient, StatusUpdater,
    TableUpdate, load_tracking, progress_bar, read_document, resolve_token, write_error,
    write_outcome,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Command line options for a single update run.
#[derive(Debug, Parser,)]
#[command(
    name = "repostat",
    version,
    about = "Refresh the repository status table of a markdown document"
)]
struct Cli
{
    /// API token used for every request.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// Token consulted when `--token` is not set.
    #[arg(
        long = "fallback-token",
        env = "PERSONAL_ACCESS_TOKEN",
        hide = true,
        hide_env_values = true
    )]
    fallback_token: Option<String,>,

    /// Account owning the tracked repositories.
    #[arg(long = "username", env = "GITHUB_USERNAME", default_value = DEFAULT_USERNAME)]
    username: String,

    /// YAML document listing the tracked repositories.
    #[arg(long = "config", value_name = "PATH", default_value = "repositories.yaml")]
    config: PathBuf,

    /// Markdown document holding the status table.
    #[arg(long = "readme", value_name = "PATH", default_value = "README.md")]
    readme: PathBuf,

    /// Destination of the plain-text run summary.
    #[arg(long = "summary", value_name = "PATH", default_value = "update_summary.txt")]
    summary: PathBuf,

    /// Additional plain-text log destination.
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf,>,

    /// Days of commit history used for classification.
    #[arg(long = "lookback-days", value_name = "DAYS", default_value_t = DEFAULT_LOOKBACK_DAYS)]
    lookback_days: u32,

    /// API root override, e.g. a GitHub Enterprise URL.
    #[arg(long = "api-base", env = "GITHUB_API_URL", value_name = "URL")]
    api_base: Option<String,>,

    /// Show a progress bar while repositories are processed.
    #[arg(long = "progress", action = ArgAction::SetTrue)]
    progress: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main(flavor = "current_thread")]
async fn main()
{
    let cli = Cli::parse();

    if let Err(error,) = init_tracing(cli.log_file.as_deref(),) {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }

    if let Err(error,) = run(cli,).await {
        error!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Installs the stderr subscriber and, when requested, a file layer.
///
/// # Errors
///
/// Returns [`Error::Write`] when the log file cannot be opened.
fn init_tracing(log_file: Option<&Path,>,) -> Result<(), Error,>
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);

    let file_layer = match log_file {
        Some(path,) => {
            let file = OpenOptions::new()
                .create(true,)
                .append(true,)
                .open(path,)
                .map_err(|source| write_error(path, source,),)?;
            Some(fmt::layer().with_target(false,).with_ansi(false,).with_writer(Mutex::new(file,),),)
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(filter,)
        .with(fmt::layer().with_target(false,).with_writer(io::stderr,),)
        .with(file_layer,)
        .try_init();

    Ok((),)
}

/// Executes one update run.
///
/// Credentials, the tracking configuration and the document are all checked
/// before the first request is sent.
///
/// # Errors
///
/// Propagates configuration, read and write errors, and
/// [`Error::NoRows`] when no repository could be rendered.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let token = resolve_token(cli.token.as_deref(), cli.fallback_token.as_deref(),)?;

    let repositories = load_tracking(&cli.config,)?;
    info!("Loaded {} repositories from {}", repositories.len(), cli.config.display());

    let document = read_document(&cli.readme,)?;

    let client = GitHubClient::new(&ClientSettings {
        token,
        owner: cli.username.clone(),
        api_base: cli.api_base.clone(),
    },)?;

    let mut updater = StatusUpdater::new(client,).with_lookback_days(cli.lookback_days,);
    if cli.progress {
        updater = updater.with_progress(progress_bar(),);
    }

    let outcome = updater.update_document(&document, &repositories, Utc::now(),).await;
    if outcome.table == TableUpdate::TableMissing {
        warn!("{} has no status table; only the marker was updated", cli.readme.display());
    }

    write_outcome(&outcome, &cli.readme, &cli.summary,)?;
    info!("✅ Repository status updated successfully!");

    Ok((),)
}
