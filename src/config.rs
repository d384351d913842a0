// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Configuration types for a single chart run.
//!
//! Three documents drive a run: the [`ChartRequest`] describing whose
//! languages are ranked, the [`ApiConfig`] carrying the upstream endpoint and
//! optional credential, and the [`ChartStyle`] controlling the SVG geometry.
//! Each type validates its invariants on construction so the fetcher and the
//! renderer can rely on them.

use std::{fs, path::Path};

use http::HeaderValue;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{self, Error};

/// Default number of languages shown in the chart.
pub const DEFAULT_TOP: usize = 8;

/// Default upstream API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Pattern accepted for account logins.
const LOGIN_PATTERN: &str = r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,37}[A-Za-z0-9])?$";

/// Parameters selecting which repositories are ranked and how many
/// languages are kept.
///
/// # Examples
///
/// ```
/// use top_langs::ChartRequest;
///
/// let request = ChartRequest::new("octocat", 5, false,).expect("valid request",);
/// assert_eq!(request.username(), "octocat");
/// assert_eq!(request.top(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ChartRequest
{
    username:      String,
    top:           usize,
    include_forks: bool,
}

impl ChartRequest
{
    /// Builds a validated request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the login is malformed or `top` is
    /// zero.
    pub fn new(username: &str, top: usize, include_forks: bool,) -> Result<Self, Error,>
    {
        let username = validate_login(username,)?;
        if top == 0 {
            return Err(Error::validation("--top must be at least 1",),);
        }

        Ok(Self {
            username: username.to_owned(), top, include_forks,
        },)
    }

    /// Account whose repositories are listed.
    pub fn username(&self,) -> &str
    {
        &self.username
    }

    /// Maximum number of ranked languages.
    pub fn top(&self,) -> usize
    {
        self.top
    }

    /// Whether forked repositories contribute to the tally.
    pub fn include_forks(&self,) -> bool
    {
        self.include_forks
    }
}

/// Checks that `username` is a plausible account login and returns it
/// trimmed.
///
/// # Errors
///
/// Returns [`Error::Validation`] for empty input or characters outside the
/// login alphabet.
pub fn validate_login(username: &str,) -> Result<&str, Error,>
{
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("username must be provided",),);
    }

    let pattern = Regex::new(LOGIN_PATTERN,)
        .map_err(|e| Error::validation(format!("invalid login pattern: {e}"),),)?;
    if !pattern.is_match(trimmed,) {
        return Err(Error::validation(format!("'{trimmed}' is not a valid account login"),),);
    }

    Ok(trimmed,)
}

/// Upstream endpoint and credential handed to the HTTP transport.
///
/// The token is read once by the binary and passed in explicitly; nothing
/// in the library consults the environment.
#[derive(Clone, PartialEq, Eq,)]
pub struct ApiConfig
{
    base_url: String,
    token:    Option<String,>,
}

impl ApiConfig
{
    /// Builds a configuration, dropping a trailing slash from the base URL
    /// and treating a blank token as absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the base URL is not an absolute
    /// `http` or `https` URL, or when the token cannot be sent as a header
    /// value.
    pub fn new(base_url: &str, token: Option<&str,>,) -> Result<Self, Error,>
    {
        let base_url = base_url.trim().trim_end_matches('/',);
        if !(base_url.starts_with("https://",) || base_url.starts_with("http://",)) {
            return Err(Error::validation(format!(
                "API URL must start with http:// or https://, got '{base_url}'"
            ),),);
        }

        let token = token.map(str::trim,).filter(|value| !value.is_empty(),).map(str::to_owned,);
        if let Some(token,) = &token
            && HeaderValue::from_str(&format!("Bearer {token}"),).is_err()
        {
            return Err(Error::validation(
                "token contains characters that are not allowed in an HTTP header",
            ),);
        }

        Ok(Self {
            base_url: base_url.to_owned(), token,
        },)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self,) -> &str
    {
        &self.base_url
    }

    /// Bearer token, when one was supplied.
    pub fn token(&self,) -> Option<&str,>
    {
        self.token.as_deref()
    }
}

impl Default for ApiConfig
{
    fn default() -> Self
    {
        Self {
            base_url: DEFAULT_API_URL.to_owned(), token: None,
        }
    }
}

impl std::fmt::Debug for ApiConfig
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("ApiConfig",)
            .field("base_url", &self.base_url,)
            .field("token", &self.token.as_ref().map(|_| "<redacted>",),)
            .finish()
    }
}

/// Geometry and colors of the rendered chart.
///
/// Every field has a default, so a YAML style document only needs the keys
/// it overrides:
///
/// ```
/// use top_langs::ChartStyle;
///
/// let style = ChartStyle::parse("width: 800\ntitle: Most used\n",).expect("valid style",);
/// assert_eq!(style.width, 800);
/// assert_eq!(style.bar_height, 18);
/// assert_eq!(style.title, "Most used");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize,)]
#[serde(default, deny_unknown_fields)]
pub struct ChartStyle
{
    /// Total image width in pixels.
    pub width:         u32,
    /// Height of a single bar.
    pub bar_height:    u32,
    /// Vertical gap between rows.
    pub gap:           u32,
    /// Outer padding on every side.
    pub padding:       u32,
    /// Width reserved for language labels left of the bars.
    pub label_width:   u32,
    /// Height reserved for the title above the first row.
    pub header_height: u32,
    /// Title text.
    pub title:         String,
    /// Background fill.
    pub background:    String,
    /// Fill used for every text element.
    pub text_color:    String,
    /// Font family used for every text element.
    pub font_family:   String,
    /// Bar colors, assigned by rank and cycled when exhausted.
    pub palette:       Vec<String,>,
}

impl Default for ChartStyle
{
    fn default() -> Self
    {
        Self {
            width:         600,
            bar_height:    18,
            gap:           8,
            padding:       10,
            label_width:   150,
            header_height: 30,
            title:         "Top Languages".to_owned(),
            background:    "#1a1b27".to_owned(),
            text_color:    "#c9d1d9".to_owned(),
            font_family:   "sans-serif".to_owned(),
            palette:       [
                "#3572A5", "#e34c26", "#f1e05a", "#178600", "#563d7c", "#89e051", "#b07219",
                "#555555",
            ]
            .into_iter()
            .map(str::to_owned,)
            .collect(),
        }
    }
}

impl ChartStyle
{
    /// Loads a style document from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read,
    /// [`Error::Style`] when it is not valid YAML and [`Error::Validation`]
    /// when the geometry is inconsistent.
    pub fn load(path: &Path,) -> Result<Self, Error,>
    {
        let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
        Self::parse(&contents,)
    }

    /// Parses a style document from a YAML string.
    ///
    /// An empty document yields the default style.
    ///
    /// # Errors
    ///
    /// See [`ChartStyle::load`].
    pub fn parse(contents: &str,) -> Result<Self, Error,>
    {
        let style = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<Self,>(contents,)?
        };
        style.validate()?;
        Ok(style,)
    }

    /// Returns a copy with `width` replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the new width leaves no room for
    /// bars.
    pub fn with_width(mut self, width: u32,) -> Result<Self, Error,>
    {
        self.width = width;
        self.validate()?;
        Ok(self,)
    }

    /// Horizontal space available to the longest bar.
    ///
    /// Zero when the label column and padding do not fit in `u32`.
    pub fn chart_width(&self,) -> u32
    {
        self.reserved_width().map_or(0, |reserved| self.width.saturating_sub(reserved,),)
    }

    /// Width taken by the label column plus the left and right padding.
    fn reserved_width(&self,) -> Option<u32,>
    {
        self.padding.checked_mul(2,)?.checked_add(self.label_width,)
    }

    /// Height taken by the top and bottom padding plus the title header.
    fn frame_height(&self,) -> Option<u32,>
    {
        self.padding.checked_mul(2,)?.checked_add(self.header_height,)
    }

    /// Checks geometric invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the palette is empty, the bar
    /// height is zero, a derived dimension overflows `u32` or the label
    /// column consumes the whole width.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.palette.is_empty() {
            return Err(Error::validation("chart palette must contain at least one color",),);
        }
        if self.bar_height == 0 {
            return Err(Error::validation("bar_height must be positive",),);
        }
        if self.reserved_width().is_none() {
            return Err(Error::validation(format!(
                "label_width {} plus padding {} overflows the image width",
                self.label_width, self.padding
            ),),);
        }
        if self.frame_height().is_none() {
            return Err(Error::validation(format!(
                "header_height {} plus padding {} overflows the image height",
                self.header_height, self.padding
            ),),);
        }
        if self.bar_height.checked_add(self.gap,).is_none() {
            return Err(Error::validation(format!(
                "bar_height {} plus gap {} overflows the row height",
                self.bar_height, self.gap
            ),),);
        }
        if self.chart_width() == 0 {
            return Err(Error::validation(format!(
                "width {} leaves no room for bars (label_width {}, padding {})",
                self.width, self.label_width, self.padding
            ),),);
        }
        Ok((),)
    }
}
