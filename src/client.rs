// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Repository and language fetching from the GitHub REST API.
//!
//! [`GithubFetcher`] pages through a user's repositories and reads the
//! language breakdown of each one. HTTP goes through the [`Transport`]
//! trait; [`OctocrabTransport`] is the production implementation and holds a
//! single client configured with the default headers for the whole run.

use std::future::Future;

use http::{HeaderMap, header::ACCEPT};
use octocrab::{Octocrab, service::middleware::retry::RetryConfig as ClientRetryConfig};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::ApiConfig,
    error::Error,
    languages::{LanguageBytes, Repository},
    retry::{Clock, RetryConfig, SystemClock, retry_rate_limited},
};

/// Media type requested from the API.
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Repositories requested per listing page.
pub const PAGE_SIZE: u32 = 100;

/// Header carrying the number of requests left in the current window.
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Header carrying the epoch second at which the window resets.
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Status code and body of an API response plus its rate-limit headers.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ApiResponse
{
    /// HTTP status code.
    pub status:               u16,
    /// Parsed `X-RateLimit-Remaining`, when present.
    pub rate_limit_remaining: Option<u64,>,
    /// Parsed `X-RateLimit-Reset`, when present.
    pub rate_limit_reset:     Option<u64,>,
    /// Raw response body.
    pub body:                 String,
}

impl ApiResponse
{
    /// Creates a response without rate-limit headers.
    pub fn new(status: u16, body: impl Into<String,>,) -> Self
    {
        Self {
            status, rate_limit_remaining: None, rate_limit_reset: None, body: body.into(),
        }
    }

    /// Attaches rate-limit header values.
    pub fn with_rate_limit(mut self, remaining: Option<u64,>, reset: Option<u64,>,) -> Self
    {
        self.rate_limit_remaining = remaining;
        self.rate_limit_reset = reset;
        self
    }

    /// Builds a response from a status, a header map and a body.
    pub fn from_parts(status: u16, headers: &HeaderMap, body: String,) -> Self
    {
        Self::new(status, body,).with_rate_limit(
            header_u64(headers, RATE_LIMIT_REMAINING,),
            header_u64(headers, RATE_LIMIT_RESET,),
        )
    }

    /// Returns `true` for 2xx responses.
    pub fn is_success(&self,) -> bool
    {
        (200..300).contains(&self.status,)
    }

    /// Returns `true` when the response signals an exhausted rate limit.
    ///
    /// Only a 403 whose remaining-requests header reads zero qualifies.
    pub fn is_rate_limited(&self,) -> bool
    {
        self.status == 403 && self.rate_limit_remaining == Some(0,)
    }
}

fn header_u64(headers: &HeaderMap, name: &str,) -> Option<u64,>
{
    headers.get(name,)?.to_str().ok()?.trim().parse().ok()
}

/// Minimal HTTP surface needed by the fetcher.
pub trait Transport
{
    /// Issues a GET request. `url` is either absolute or a path relative to
    /// the API base URL.
    ///
    /// Non-success statuses are returned as responses; only transport
    /// failures are errors.
    fn get(&self, url: &str,) -> impl Future<Output = Result<ApiResponse, Error,>,>;
}

/// [`Transport`] backed by an [`Octocrab`] client.
#[derive(Clone,)]
pub struct OctocrabTransport
{
    octocrab: Octocrab,
}

impl OctocrabTransport
{
    /// Builds the client once with the base URL, the `Accept` header and the
    /// optional bearer token.
    ///
    /// The client's own retry middleware is disabled; rate limits are
    /// handled by [`GithubFetcher`] and other failures are not retried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the base URL is rejected and
    /// [`Error::Network`] when the client cannot be initialized.
    pub fn new(config: &ApiConfig,) -> Result<Self, Error,>
    {
        let mut builder = Octocrab::builder()
            .base_uri(config.base_url(),)
            .map_err(|e| Error::validation(format!("invalid API URL {}: {e}", config.base_url()),),)?
            .add_header(ACCEPT, GITHUB_MEDIA_TYPE.to_owned(),)
            .add_retry_config(ClientRetryConfig::None,);

        if let Some(token,) = config.token() {
            builder = builder.personal_token(token.to_owned(),);
        }

        let octocrab = builder
            .build()
            .map_err(|e| Error::network(format!("failed to initialize GitHub client: {e}"),),)?;

        Ok(Self {
            octocrab,
        },)
    }
}

impl Transport for OctocrabTransport
{
    async fn get(&self, url: &str,) -> Result<ApiResponse, Error,>
    {
        let response = self
            .octocrab
            ._get(url,)
            .await
            .map_err(|e| Error::network(format!("GET {url} failed: {e}"),),)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = self
            .octocrab
            .body_to_string(response,)
            .await
            .map_err(|e| Error::network(format!("failed to read response from {url}: {e}"),),)?;

        Ok(ApiResponse::from_parts(status, &headers, body,),)
    }
}

/// Relative URL of one page of a user's owned repositories.
pub fn repositories_page_url(username: &str, page: u32,) -> String
{
    format!("/users/{username}/repos?per_page={PAGE_SIZE}&page={page}&type=owner&sort=pushed")
}

/// Fetches repository listings and language maps.
#[derive(Debug, Clone,)]
pub struct GithubFetcher<T, C = SystemClock,>
{
    transport: T,
    clock:     C,
    retry:     RetryConfig,
}

impl<T: Transport,> GithubFetcher<T,>
{
    /// Creates a fetcher using the system clock.
    pub fn new(transport: T,) -> Self
    {
        Self::with_clock(transport, SystemClock,)
    }
}

impl<T: Transport, C: Clock,> GithubFetcher<T, C,>
{
    /// Creates a fetcher with an explicit clock.
    pub fn with_clock(transport: T, clock: C,) -> Self
    {
        Self {
            transport, clock, retry: RetryConfig::default(),
        }
    }

    /// Replaces the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig,) -> Self
    {
        self.retry = retry;
        self
    }

    /// Transport used for every request.
    pub fn transport(&self,) -> &T
    {
        &self.transport
    }

    /// Lists every repository owned by `username`.
    ///
    /// Pages of [`PAGE_SIZE`] are requested starting at page 1 until a page
    /// comes back empty.
    ///
    /// # Errors
    ///
    /// Any failure aborts the listing: [`Error::Http`] for error statuses,
    /// [`Error::RateLimited`] when retries are exhausted, [`Error::Network`]
    /// and [`Error::Decode`] otherwise.
    pub async fn list_repositories(&self, username: &str,) -> Result<Vec<Repository,>, Error,>
    {
        let mut repositories = Vec::new();
        let mut page = 1u32;

        loop {
            let url = repositories_page_url(username, page,);
            let batch: Vec<Repository,> = self.get_json(&url,).await?;
            debug!("Page {} returned {} repositories", page, batch.len());

            if batch.is_empty() {
                break;
            }

            repositories.extend(batch,);
            page += 1;
        }

        Ok(repositories,)
    }

    /// Reads the language byte counts of `repository`.
    ///
    /// Returns `Ok(None)` when the record has no language endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`GithubFetcher::list_repositories`]. Callers decide which
    /// failures to tolerate.
    pub async fn repository_languages(
        &self,
        repository: &Repository,
    ) -> Result<Option<LanguageBytes,>, Error,>
    {
        let Some(url,) = repository.languages_url.as_deref() else {
            return Ok(None,);
        };

        self.get_json(url,).await.map(Some,)
    }

    async fn get_json<D: DeserializeOwned,>(&self, url: &str,) -> Result<D, Error,>
    {
        let response =
            retry_rate_limited(&self.retry, &self.clock, url, || self.transport.get(url,),).await?;

        if !response.is_success() {
            return Err(Error::Http {
                url: url.to_owned(), status: response.status,
            },);
        }

        Ok(serde_json::from_str(&response.body,)?,)
    }
}
