// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Top-languages chart generation for GitHub accounts.
//!
//! The library lists a user's repositories through the GitHub REST API,
//! sums the per-language byte counts of the repositories admitted by the fork
//! policy and renders the highest ranked languages as an SVG bar chart.
//! Listing requests survive rate limiting through a bounded retry driven by
//! an injectable clock; language lookups that fail with an HTTP status are
//! skipped rather than aborting the run.

pub mod client;
mod config;
mod error;
mod languages;
mod pipeline;
mod render;
pub mod retry;

#[cfg(test)]
mod test_support;

pub use client::{ApiResponse, GithubFetcher, OctocrabTransport, Transport};
pub use config::{ApiConfig, ChartRequest, ChartStyle, DEFAULT_API_URL, DEFAULT_TOP, validate_login};
pub use error::{Error, io_error};
pub use languages::{
    LanguageBytes, LanguageShare, LanguageTally, Ranking, Repository, RepositoryLanguages, aggregate,
};
pub use pipeline::{collect_ranking, spinner, write_chart};
pub use render::{percentages_in_tenths, render_chart, render_placeholder};
