// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Tracking configuration and credential resolution.
//!
//! The YAML document lists the repositories whose rows appear in the status
//! table. Raw entries keep every field optional so users can omit defaults;
//! [`parse_tracking`] normalizes them into [`RepoTracking`] values that
//! satisfy the invariants the updater relies on.

use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::{self, Error},
    status::StatusLabel,
};

/// Account whose repositories are tracked when no override is supplied.
pub const DEFAULT_USERNAME: &str = "thinkdatalabs";
/// Primary environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
/// Fallback environment variable holding the API token.
pub const FALLBACK_TOKEN_ENV: &str = "PERSONAL_ACCESS_TOKEN";

/// Root configuration document.
///
/// # Examples
///
/// ```
/// use repostat::TrackingConfig;
///
/// let yaml = r#"
/// repositories:
///   - name: hello-world
///     display_name: Hello World
/// "#;
/// let config: TrackingConfig = serde_yaml::from_str(yaml,).expect("valid configuration",);
/// assert_eq!(config.repositories.len(), 1);
/// ```
#[derive(Debug, Deserialize, Serialize,)]
pub struct TrackingConfig
{
    /// Repositories rendered into the status table, in table order.
    #[serde(default, alias = "repos")]
    pub repositories: Vec<RepositoryEntry,>,
}

/// Raw configuration entry for a single repository.
#[derive(Debug, Deserialize, Serialize, Clone,)]
pub struct RepositoryEntry
{
    /// Repository name under the tracked account.
    #[serde(alias = "repository", alias = "repo")]
    pub name: String,

    /// Optional label rendered in the first column.
    #[serde(default, alias = "display-name", alias = "displayName")]
    pub display_name: Option<String,>,

    /// Whether the row carries an issues badge. Defaults to `true`.
    #[serde(default, alias = "track-issues", alias = "trackIssues")]
    pub track_issues: Option<bool,>,

    /// Whether open pull requests are reported in the summary. Defaults to
    /// `true`.
    #[serde(default, alias = "track-prs", alias = "trackPRs", alias = "trackPrs")]
    pub track_prs: Option<bool,>,

    /// Optional status that replaces the computed classification.
    #[serde(default, alias = "custom-status", alias = "customStatus", alias = "status")]
    pub custom_status: Option<String,>,
}

/// Normalized tracking options for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct RepoTracking
{
    /// Repository name used in API routes and badge URLs.
    pub name:          String,
    /// Label rendered in the first column.
    pub display_name:  String,
    /// Whether the row renders an issues badge.
    pub track_issues:  bool,
    /// Whether the summary reports open pull requests.
    pub track_prs:     bool,
    /// Override that always wins over the computed status.
    pub custom_status: Option<StatusLabel,>,
}

impl RepoTracking
{
    /// Tracking options with defaults for `name`.
    pub fn new(name: impl Into<String,>,) -> Self
    {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            track_issues: true,
            track_prs: true,
            custom_status: None,
        }
    }
}

/// Loads the tracking configuration from a YAML file.
///
/// # Errors
///
/// Returns [`Error::Io`](Error::Io) when the file cannot be read and the
/// errors of [`parse_tracking`] otherwise.
pub fn load_tracking(path: &Path,) -> Result<Vec<RepoTracking,>, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_tracking(&contents,)
}

/// Parses and normalizes a tracking document.
///
/// # Errors
///
/// Propagates [`Error::Parse`](Error::Parse) when the YAML cannot be decoded
/// and [`Error::Validation`](Error::Validation) when the list is empty, a name
/// is blank or contains whitespace, or a name appears twice.
pub fn parse_tracking(contents: &str,) -> Result<Vec<RepoTracking,>, Error,>
{
    let config: TrackingConfig = serde_yaml::from_str(contents,)?;
    if config.repositories.is_empty() {
        return Err(Error::validation("configuration must include at least one repository",),);
    }

    let mut seen = HashSet::with_capacity(config.repositories.len(),);
    let mut normalized = Vec::with_capacity(config.repositories.len(),);

    for entry in &config.repositories {
        let tracking = normalize_entry(entry,)?;
        if !seen.insert(tracking.name.clone(),) {
            return Err(Error::validation(format!("duplicate repository '{}'", tracking.name),),);
        }
        normalized.push(tracking,);
    }

    Ok(normalized,)
}

fn normalize_entry(entry: &RepositoryEntry,) -> Result<RepoTracking, Error,>
{
    let name = entry.name.trim();
    if name.is_empty() {
        return Err(Error::validation("repository name cannot be empty",),);
    }
    if name.chars().any(char::is_whitespace,) {
        return Err(Error::validation(format!("repository name '{name}' cannot contain whitespace"),),);
    }

    let display_name = entry
        .display_name
        .as_deref()
        .map(str::trim,)
        .filter(|value| !value.is_empty(),)
        .unwrap_or(name,)
        .to_owned();

    let custom_status = entry
        .custom_status
        .as_deref()
        .map(str::trim,)
        .filter(|value| !value.is_empty(),)
        .and_then(|value| match value.parse::<StatusLabel,>() {
            Ok(status,) => Some(status,),
            Err(error,) => {
                warn!("ignoring custom status for {name}: {error}");
                None
            }
        },);

    Ok(RepoTracking {
        name: name.to_owned(),
        display_name,
        track_issues: entry.track_issues.unwrap_or(true,),
        track_prs: entry.track_prs.unwrap_or(true,),
        custom_status,
    },)
}

/// Picks the API token from the primary value, then the fallback.
///
/// Blank values count as missing.
///
/// # Errors
///
/// Returns [`Error::Configuration`](Error::Configuration) naming both
/// environment variables when neither yields a token.
pub fn resolve_token(primary: Option<&str,>, fallback: Option<&str,>,) -> Result<String, Error,>
{
    primary
        .map(str::trim,)
        .filter(|token| !token.is_empty(),)
        .or_else(|| fallback.map(str::trim,).filter(|token| !token.is_empty(),),)
        .map(str::to_owned,)
        .ok_or_else(|| {
            Error::configuration(format!(
                "{TOKEN_ENV} or {FALLBACK_TOKEN_ENV} environment variable not set"
            ),)
        },)
}
