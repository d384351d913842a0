// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Command-line interface for the top-langs binary.
//!
//! The CLI renders the top languages of a GitHub account into an SVG file.
//! Diagnostics go to stderr; stdout only carries the optional JSON summary.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

use clap::{ArgAction, Parser};
use top_langs::{
    ApiConfig, ChartRequest, ChartStyle, DEFAULT_API_URL, DEFAULT_TOP, Error, GithubFetcher,
    OctocrabTransport, Ranking, collect_ranking, io_error, render_chart, spinner, write_chart,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line interface for rendering a top languages chart.
#[derive(Debug, Parser,)]
#[command(name = "top-langs", version, about = "Render a top languages SVG for a GitHub user")]
struct Cli
{
    /// GitHub account whose repositories are analyzed.
    #[arg(long = "username", value_name = "LOGIN")]
    username: String,

    /// Destination of the generated SVG; parent directories are created.
    #[arg(long = "output", value_name = "PATH")]
    output: PathBuf,

    /// Number of languages shown in the chart.
    #[arg(long = "top", value_name = "N", default_value_t = DEFAULT_TOP)]
    top: usize,

    /// Count forked repositories as well.
    #[arg(long = "include-forks", action = ArgAction::SetTrue)]
    include_forks: bool,

    /// Image width in pixels, overriding the style document.
    #[arg(long = "width", value_name = "PX")]
    width: Option<u32,>,

    /// YAML document overriding chart geometry and colors.
    #[arg(long = "style", value_name = "PATH")]
    style: Option<PathBuf,>,

    /// Print the ranking as JSON to stdout.
    #[arg(long = "summary", action = ArgAction::SetTrue)]
    summary: bool,

    /// Base URL of the GitHub REST API.
    #[arg(long = "api-url", value_name = "URL", env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Token sent as a bearer credential.
    #[arg(long = "token", value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// Log debug output.
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main(flavor = "current_thread")]
async fn main()
{
    let cli = Cli::parse();
    init_tracing(cli.verbose,);

    if let Err(error,) = run(cli,).await {
        eprintln!("Error: {}", error.to_display_string());
        process::exit(1,);
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over
/// `--verbose`.
fn init_tracing(verbose: bool,)
{
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level,),);

    tracing_subscriber::fmt()
        .with_env_filter(filter,)
        .with_target(false,)
        .with_writer(io::stderr,)
        .init();
}

/// Executes the pipeline using parsed arguments.
///
/// # Errors
///
/// Propagates validation, network and I/O errors.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let request = ChartRequest::new(&cli.username, cli.top, cli.include_forks,)?;
    let style = resolve_style(cli.style.as_deref(), cli.width,)?;
    let api = ApiConfig::new(&cli.api_url, cli.token.as_deref(),)?;
    let fetcher = GithubFetcher::new(OctocrabTransport::new(&api,)?,);

    let progress = spinner();
    let ranking = collect_ranking(&fetcher, &request, &progress,).await;
    progress.finish_and_clear();
    let ranking = ranking?;

    let svg = render_chart(&ranking, &style,);
    write_chart(&cli.output, &svg,)?;
    info!("SVG written to {}", cli.output.display());

    if cli.summary {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_summary(&mut handle, &ranking,)?;
    }

    Ok((),)
}

fn resolve_style(path: Option<&Path,>, width: Option<u32,>,) -> Result<ChartStyle, Error,>
{
    let style = match path {
        Some(path,) => ChartStyle::load(path,)?,
        None => ChartStyle::default(),
    };

    match width {
        Some(width,) => style.with_width(width,),
        None => Ok(style,),
    }
}

fn write_summary<W: Write,>(writer: &mut W, ranking: &Ranking,) -> Result<(), Error,>
{
    let stdout = Path::new("<stdout>",);
    serde_json::to_writer(&mut *writer, ranking,)
        .map_err(|source| io_error(stdout, source.into(),),)?;
    writeln!(writer).map_err(|source| io_error(stdout, source,),)
}
