// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! End-to-end chart generation.
//!
//! Lists the user's repositories, reads the language map of every
//! repository the fork policy admits, ranks the summed counts and writes the
//! rendered chart. A repository whose language lookup fails with an HTTP
//! status is skipped so one broken repository does not abort the run.

use std::{fs, path::Path};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::{
    client::{GithubFetcher, Transport},
    config::ChartRequest,
    error::{self, Error},
    languages::{Ranking, RepositoryLanguages, aggregate},
    retry::Clock,
};

/// Creates the spinner shown while the API is queried.
///
/// indicatif hides it automatically when stderr is not a terminal.
pub fn spinner() -> ProgressBar
{
    let progress = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
        .unwrap_or_else(|_| ProgressStyle::default_spinner(),);
    progress.set_style(style,);
    progress
}

/// Fetches and ranks the languages of `request.username()`.
///
/// # Errors
///
/// Listing failures of any kind are returned. Language lookups failing with
/// an HTTP status are logged and skipped; transport and decoding failures
/// are returned.
///
/// # Example
///
/// ```no_run
/// use top_langs::{
///     ApiConfig, ChartRequest, GithubFetcher, OctocrabTransport, collect_ranking, spinner,
/// };
///
/// # async fn example() -> Result<(), top_langs::Error> {
/// let transport = OctocrabTransport::new(&ApiConfig::default(),)?;
/// let fetcher = GithubFetcher::new(transport,);
/// let request = ChartRequest::new("octocat", 8, false,)?;
/// let ranking = collect_ranking(&fetcher, &request, &spinner(),).await?;
/// println!("{}", ranking.names());
/// # Ok(())
/// # }
/// ```
pub async fn collect_ranking<T, C,>(
    fetcher: &GithubFetcher<T, C,>,
    request: &ChartRequest,
    progress: &ProgressBar,
) -> Result<Ranking, Error,>
where
    T: Transport,
    C: Clock,
{
    let username = request.username();
    progress.set_message(format!("Fetching repositories for {username}..."),);
    info!("Fetching repositories for {}", username);

    let repositories = fetcher.list_repositories(username,).await?;
    info!("Found {} repositories", repositories.len());

    let mut collected = Vec::with_capacity(repositories.len(),);
    for repository in repositories {
        if !repository.is_considered(request.include_forks(),) {
            debug!("Skipping {} (fork or no language endpoint)", repository.name);
            continue;
        }

        progress.set_message(format!("Reading languages of {}...", repository.name),);
        match fetcher.repository_languages(&repository,).await {
            Ok(Some(languages,),) => collected.push(RepositoryLanguages {
                repository,
                languages,
            },),
            Ok(None,) => {}
            Err(error,) if error.is_http_failure() => {
                warn!("Skipping languages of {}: {}", repository.name, error);
            }
            Err(error,) => return Err(error,),
        }
        progress.tick();
    }

    let tally = aggregate(&collected, request.include_forks(),);
    let ranking = tally.top(request.top(),);
    if ranking.is_empty() {
        info!("No language data found");
    } else {
        info!("Top languages: {}", ranking.names());
    }

    Ok(ranking,)
}

/// Writes `contents` to `path`, creating missing parent directories.
///
/// # Errors
///
/// Returns [`Error::Io`] when a directory or the file cannot be created.
pub fn write_chart(path: &Path, contents: &str,) -> Result<(), Error,>
{
    if let Some(parent,) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent,).map_err(|source| error::io_error(parent, source,),)?;
    }

    fs::write(path, contents,).map_err(|source| error::io_error(path, source,),)
}

#[cfg(test)]
mod tests
{
    use std::fs::File;

    use tempfile::tempdir;

    use super::*;
    use crate::{
        client::{ApiResponse, repositories_page_url},
        config::ChartStyle,
        render::{NO_DATA_MESSAGE, render_chart},
        test_support::{ManualClock, ScriptedTransport, repository_json},
    };

    fn languages_url(name: &str,) -> String
    {
        format!("https://api.github.com/repos/octocat/{name}/languages")
    }

    fn fetcher(transport: ScriptedTransport,) -> GithubFetcher<ScriptedTransport, ManualClock,>
    {
        GithubFetcher::with_clock(transport, ManualClock::new(1_000,),)
    }

    fn listing(transport: ScriptedTransport, repositories: &[(&str, bool,)],) -> ScriptedTransport
    {
        let page: Vec<String,> =
            repositories.iter().map(|&(name, fork,)| repository_json(name, fork,),).collect();
        transport
            .respond(
                &repositories_page_url("octocat", 1,),
                ApiResponse::new(200, format!("[{}]", page.join(",")),),
            )
            .respond(&repositories_page_url("octocat", 2,), ApiResponse::new(200, "[]",),)
    }

    fn pairs(ranking: &Ranking,) -> Vec<(&str, u64,),>
    {
        ranking.iter().map(|share| (share.name.as_str(), share.bytes,),).collect()
    }

    #[tokio::test]
    async fn empty_account_produces_placeholder()
    {
        let transport = ScriptedTransport::new()
            .respond(&repositories_page_url("octocat", 1,), ApiResponse::new(200, "[]",),);
        let request = ChartRequest::new("octocat", 8, false,).expect("valid request",);

        let ranking = collect_ranking(&fetcher(transport,), &request, &ProgressBar::hidden(),)
            .await
            .expect("run succeeds",);

        assert!(ranking.is_empty());
        assert!(render_chart(&ranking, &ChartStyle::default()).contains(NO_DATA_MESSAGE));
    }

    #[tokio::test]
    async fn sums_languages_across_repositories()
    {
        let transport = listing(ScriptedTransport::new(), &[("app", false,), ("lib", false,),],)
            .respond(
                &languages_url("app",),
                ApiResponse::new(200, r#"{"Python": 1000, "JavaScript": 500}"#,),
            )
            .respond(&languages_url("lib",), ApiResponse::new(200, r#"{"JavaScript": 700}"#,),);
        let request = ChartRequest::new("octocat", 8, false,).expect("valid request",);

        let ranking = collect_ranking(&fetcher(transport,), &request, &ProgressBar::hidden(),)
            .await
            .expect("run succeeds",);

        assert_eq!(pairs(&ranking), [("JavaScript", 1200), ("Python", 1000)]);
    }

    #[tokio::test]
    async fn failing_language_endpoint_is_skipped()
    {
        let transport = listing(ScriptedTransport::new(), &[("broken", false,), ("ok", false,),],)
            .respond(&languages_url("broken",), ApiResponse::new(500, "{}",),)
            .respond(&languages_url("ok",), ApiResponse::new(200, r#"{"Rust": 10}"#,),);
        let request = ChartRequest::new("octocat", 8, false,).expect("valid request",);

        let ranking = collect_ranking(&fetcher(transport,), &request, &ProgressBar::hidden(),)
            .await
            .expect("run succeeds",);

        assert_eq!(pairs(&ranking), [("Rust", 10)]);
    }

    #[tokio::test]
    async fn exhausted_rate_limit_on_languages_is_skipped()
    {
        let transport = listing(ScriptedTransport::new(), &[("limited", false,),],).respond(
            &languages_url("limited",),
            ApiResponse::new(403, "{}",).with_rate_limit(Some(0,), Some(1_001,),),
        );
        let request = ChartRequest::new("octocat", 8, false,).expect("valid request",);
        let fetcher = fetcher(transport,);

        let ranking = collect_ranking(&fetcher, &request, &ProgressBar::hidden(),)
            .await
            .expect("run succeeds",);

        assert!(ranking.is_empty());
        let language_calls =
            fetcher.transport().calls().iter().filter(|url| url.ends_with("/languages",),).count();
        assert_eq!(language_calls, 3);
    }

    #[tokio::test]
    async fn forks_are_not_requested_unless_included()
    {
        let build = || {
            listing(ScriptedTransport::new(), &[("own", false,), ("forked", true,),],)
                .respond(&languages_url("own",), ApiResponse::new(200, r#"{"Go": 5}"#,),)
                .respond(&languages_url("forked",), ApiResponse::new(200, r#"{"C": 50}"#,),)
        };

        let excluded = fetcher(build(),);
        let request = ChartRequest::new("octocat", 8, false,).expect("valid request",);
        let ranking = collect_ranking(&excluded, &request, &ProgressBar::hidden(),)
            .await
            .expect("run succeeds",);
        assert_eq!(pairs(&ranking), [("Go", 5)]);
        assert!(!excluded.transport().calls().contains(&languages_url("forked")));

        let included = fetcher(build(),);
        let request = ChartRequest::new("octocat", 8, true,).expect("valid request",);
        let ranking = collect_ranking(&included, &request, &ProgressBar::hidden(),)
            .await
            .expect("run succeeds",);
        assert_eq!(pairs(&ranking), [("C", 50), ("Go", 5)]);
    }

    #[tokio::test]
    async fn top_limit_drops_smallest_languages()
    {
        let transport = listing(ScriptedTransport::new(), &[("app", false,),],).respond(
            &languages_url("app",),
            ApiResponse::new(200, r#"{"C": 100, "Go": 300, "Rust": 200}"#,),
        );
        let request = ChartRequest::new("octocat", 2, false,).expect("valid request",);

        let ranking = collect_ranking(&fetcher(transport,), &request, &ProgressBar::hidden(),)
            .await
            .expect("run succeeds",);

        assert_eq!(pairs(&ranking), [("Go", 300), ("Rust", 200)]);
    }

    #[tokio::test]
    async fn listing_failure_aborts_run()
    {
        let transport = ScriptedTransport::new()
            .respond(&repositories_page_url("octocat", 1,), ApiResponse::new(502, "",),);
        let request = ChartRequest::new("octocat", 8, false,).expect("valid request",);

        let error = collect_ranking(&fetcher(transport,), &request, &ProgressBar::hidden(),)
            .await
            .expect_err("listing failure is fatal",);
        assert!(matches!(error, Error::Http { status: 502, .. }));
    }

    #[tokio::test]
    async fn undecodable_languages_abort_run()
    {
        let transport = listing(ScriptedTransport::new(), &[("app", false,),],)
            .respond(&languages_url("app",), ApiResponse::new(200, "<html>",),);
        let request = ChartRequest::new("octocat", 8, false,).expect("valid request",);

        let error = collect_ranking(&fetcher(transport,), &request, &ProgressBar::hidden(),)
            .await
            .expect_err("decode failure is fatal",);
        assert!(matches!(error, Error::Decode { .. }));
    }

    #[test]
    fn write_chart_creates_parent_directories()
    {
        let directory = tempdir().expect("failed to create tempdir",);
        let path = directory.path().join("nested/charts/langs.svg",);

        write_chart(&path, "<svg/>",).expect("write succeeds",);

        assert_eq!(fs::read_to_string(&path).expect("readable"), "<svg/>");
    }

    #[test]
    fn write_chart_reports_blocked_parent()
    {
        let directory = tempdir().expect("failed to create tempdir",);
        let blocker = directory.path().join("blocked",);
        File::create(&blocker,).expect("failed to create placeholder file",);
        let path = blocker.join("langs.svg",);

        match write_chart(&path, "<svg/>",).expect_err("parent is a file",) {
            Error::Io {
                ..
            } => {}
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
