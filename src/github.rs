// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Read-only GitHub REST client used by the updater.
//!
//! Every call returns the parsed payload or "no data". Failures are
//! classified and logged here, so callers only ever handle one failure shape
//! regardless of whether the request timed out, hit a missing repository, or
//! ran out of quota.

use std::{future::Future, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde::{Deserialize, Serialize, de::DeserializeOwned, de::IgnoredAny};
use tracing::{debug, error, info, warn};

use crate::{
    error::Error,
    model::{CommitRecord, LanguageHistogram, RateLimitStatus, RepositorySnapshot, UserProfile},
};

/// Upper bound for connecting, reading and writing a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30,);
/// Items requested per page for paginated endpoints.
pub const PAGE_SIZE: usize = 100;
/// Safety cap on the number of pages read from one listing.
pub const MAX_PAGES: u32 = 10;
/// Remaining requests below which the quota probe logs a warning.
pub const LOW_RATE_LIMIT_THRESHOLD: u32 = 10;

/// Settings required to build a [`GitHubClient`].
#[derive(Debug, Clone,)]
pub struct ClientSettings
{
    /// Personal access token sent as the bearer credential.
    pub token:    String,
    /// Account owning the tracked repositories.
    pub owner:    String,
    /// Optional API root override, e.g. a GitHub Enterprise URL.
    pub api_base: Option<String,>,
}

/// Cause of a failed API read.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum FetchFailure
{
    /// No response within [`REQUEST_TIMEOUT`].
    Timeout,
    /// HTTP 404.
    NotFound,
    /// HTTP 403 or 429: quota exhausted or missing permission.
    Forbidden,
    /// Any other non-success HTTP status.
    Status(u16,),
    /// Connection, TLS or decoding failure.
    Transport(String,),
}

impl FetchFailure
{
    /// Classifies a non-success HTTP status code.
    pub fn from_status(code: u16,) -> Self
    {
        match code {
            404 => FetchFailure::NotFound,
            403 | 429 => FetchFailure::Forbidden,
            other => FetchFailure::Status(other,),
        }
    }

    /// Classifies an error returned by octocrab.
    pub fn classify(error: &octocrab::Error,) -> Self
    {
        match error {
            octocrab::Error::GitHub {
                source, ..
            } => Self::from_status(source.status_code.as_u16(),),
            other if is_timeout(other,) => FetchFailure::Timeout,
            other => FetchFailure::Transport(other.to_string(),),
        }
    }

    fn log(&self, endpoint: &str, route: &str,)
    {
        match self {
            FetchFailure::Timeout => {
                error!(endpoint, route, "request timed out after {}s", REQUEST_TIMEOUT.as_secs());
            }
            FetchFailure::NotFound => warn!(endpoint, route, "resource not found"),
            FetchFailure::Forbidden => error!(endpoint, route, "rate limit or permission error"),
            FetchFailure::Status(code,) => error!(endpoint, route, "HTTP error {code}"),
            FetchFailure::Transport(message,) => {
                error!(endpoint, route, "request error: {message}");
            }
        }
    }
}

fn is_timeout(error: &(dyn std::error::Error + 'static),) -> bool
{
    let mut current = Some(error,);
    while let Some(candidate,) = current {
        if let Some(io,) = candidate.downcast_ref::<std::io::Error,>()
            && io.kind() == std::io::ErrorKind::TimedOut
        {
            return true;
        }
        if candidate.to_string().to_ascii_lowercase().contains("timed out",) {
            return true;
        }
        current = candidate.source();
    }
    false
}

/// Data the updater needs from the hosting API.
///
/// Implementations never fail loudly: unavailable data is `None` or empty and
/// the cause has already been logged.
#[allow(async_fn_in_trait)]
pub trait RepositorySource
{
    /// Account owning the tracked repositories.
    fn owner(&self,) -> &str;

    /// Remaining core quota.
    async fn rate_limit(&self,) -> Option<RateLimitStatus,>;

    /// Repository metadata.
    async fn repository(&self, name: &str,) -> Option<RepositorySnapshot,>;

    /// Commits authored since `since`, capped at [`MAX_PAGES`] pages.
    async fn commits_since(&self, name: &str, since: DateTime<Utc,>,) -> Vec<CommitRecord,>;

    /// Language byte histogram.
    async fn languages(&self, name: &str,) -> LanguageHistogram;

    /// Profile of [`RepositorySource::owner`].
    async fn user_profile(&self,) -> Option<UserProfile,>;

    /// Number of open pull requests, capped at [`MAX_PAGES`] pages.
    async fn open_pull_requests(&self, name: &str,) -> Option<usize,>;
}

/// [`RepositorySource`] backed by the GitHub REST API.
#[derive(Clone,)]
pub struct GitHubClient
{
    octocrab: Octocrab,
    owner:    String,
}

#[derive(Serialize,)]
struct PageQuery<'a,>
{
    #[serde(skip_serializing_if = "Option::is_none")]
    since:    Option<&'a str,>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state:    Option<&'a str,>,
    per_page: usize,
    page:     u32,
}

#[derive(Deserialize,)]
struct RateLimitPayload
{
    resources: RateLimitResources,
}

#[derive(Deserialize,)]
struct RateLimitResources
{
    core: RateLimitStatus,
}

impl GitHubClient
{
    /// Builds an authenticated client with the fixed request timeout.
    ///
    /// Failed requests are never resent.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](Error::Configuration) when the API
    /// base URL is invalid or the HTTP client cannot be constructed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use repostat::{ClientSettings, GitHubClient};
    ///
    /// # async fn example() -> Result<(), repostat::Error> {
    /// let client = GitHubClient::new(&ClientSettings {
    ///     token:    std::env::var("GITHUB_TOKEN",).unwrap_or_default(),
    ///     owner:    "octocat".to_owned(),
    ///     api_base: None,
    /// },)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(settings: &ClientSettings,) -> Result<Self, Error,>
    {
        let mut builder = Octocrab::builder()
            .personal_token(settings.token.as_str(),)
            .set_connect_timeout(Some(REQUEST_TIMEOUT,),)
            .set_read_timeout(Some(REQUEST_TIMEOUT,),)
            .set_write_timeout(Some(REQUEST_TIMEOUT,),)
            .add_retry_config(RetryConfig::None,);

        if let Some(base,) = settings.api_base.as_deref() {
            builder = builder.base_uri(base,).map_err(|e| {
                Error::configuration(format!("invalid API base URL '{base}': {e}"),)
            },)?;
        }

        let octocrab = builder.build().map_err(|e| {
            Error::configuration(format!("failed to initialize GitHub client: {e}"),)
        },)?;

        info!("Initialized GitHub client for user: {}", settings.owner);

        Ok(Self {
            octocrab,
            owner: settings.owner.clone(),
        },)
    }

    async fn fetch<T, P,>(
        &self,
        endpoint: &str,
        route: &str,
        parameters: Option<&P,>,
    ) -> Option<T,>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        debug!(endpoint, route, "GET");
        match self.octocrab.get::<T, _, P,>(route, parameters,).await {
            Ok(payload,) => Some(payload,),
            Err(error,) => {
                FetchFailure::classify(&error,).log(endpoint, route,);
                None
            }
        }
    }

    async fn fetch_listing<T,>(
        &self,
        endpoint: &str,
        route: &str,
        since: Option<&str,>,
        state: Option<&str,>,
    ) -> Option<Vec<T,>,>
    where
        T: DeserializeOwned,
    {
        collect_pages(|page| async move {
            let query = PageQuery {
                since,
                state,
                per_page: PAGE_SIZE,
                page,
            };
            self.fetch::<Vec<T,>, _,>(endpoint, route, Some(&query,),).await
        },)
        .await
    }

    fn repo_route(&self, name: &str, suffix: &str,) -> String
    {
        repo_route(&self.owner, name, suffix,)
    }
}

fn repo_route(owner: &str, name: &str, suffix: &str,) -> String
{
    format!("/repos/{owner}/{name}{suffix}")
}

impl RepositorySource for GitHubClient
{
    fn owner(&self,) -> &str
    {
        &self.owner
    }

    async fn rate_limit(&self,) -> Option<RateLimitStatus,>
    {
        let payload = self.fetch::<RateLimitPayload, (),>("rate_limit", "/rate_limit", None,).await?;
        info!("Rate limit: {} requests remaining", payload.resources.core.remaining);
        Some(payload.resources.core,)
    }

    async fn repository(&self, name: &str,) -> Option<RepositorySnapshot,>
    {
        let route = self.repo_route(name, "",);
        let snapshot = self.fetch::<RepositorySnapshot, (),>("repository", &route, None,).await;
        match &snapshot {
            Some(_,) => info!("Successfully fetched info for {name}"),
            None => warn!("Failed to fetch info for {name}"),
        }
        snapshot
    }

    async fn commits_since(&self, name: &str, since: DateTime<Utc,>,) -> Vec<CommitRecord,>
    {
        let route = self.repo_route(name, "/commits",);
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true,);
        let commits = self
            .fetch_listing::<CommitRecord,>("commits", &route, Some(&since,), None,)
            .await
            .unwrap_or_default();
        info!("Fetched {} commits for {name}", commits.len());
        commits
    }

    async fn languages(&self, name: &str,) -> LanguageHistogram
    {
        let route = self.repo_route(name, "/languages",);
        self.fetch::<LanguageHistogram, (),>("languages", &route, None,).await.unwrap_or_default()
    }

    async fn user_profile(&self,) -> Option<UserProfile,>
    {
        let route = format!("/users/{}", self.owner);
        self.fetch::<UserProfile, (),>("user", &route, None,).await
    }

    async fn open_pull_requests(&self, name: &str,) -> Option<usize,>
    {
        let route = self.repo_route(name, "/pulls",);
        self.fetch_listing::<IgnoredAny,>("pulls", &route, None, Some("open",),)
            .await
            .map(|pulls| pulls.len(),)
    }
}

/// Reads pages `1..=MAX_PAGES` through `fetch_page`, appending each one.
///
/// Stops after the first unavailable page, the first page shorter than
/// [`PAGE_SIZE`], or [`MAX_PAGES`] pages. Returns `None` only when the first
/// page is unavailable; later failures keep what was already collected.
pub async fn collect_pages<T, F, Fut,>(mut fetch_page: F,) -> Option<Vec<T,>,>
where
    F: FnMut(u32,) -> Fut,
    Fut: Future<Output = Option<Vec<T,>,>,>,
{
    let mut collected = Vec::new();

    for page in 1..=MAX_PAGES {
        let Some(items,) = fetch_page(page,).await else {
            if page == 1 {
                return None;
            }
            debug!("stopping pagination after page {}", page - 1);
            break;
        };

        let count = items.len();
        collected.extend(items,);
        if count < PAGE_SIZE {
            break;
        }
    }

    Some(collected,)
}
