// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Point-in-time views of GitHub data consumed by the updater.
//!
//! The structures deserialize directly from the REST API payloads and keep
//! only the fields the status table needs. Timestamps stay as raw strings so
//! malformed values can be classified instead of rejected during decoding.

use serde::{Deserialize, Serialize};

/// Repository metadata returned by `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize,)]
pub struct RepositorySnapshot
{
    /// Repository name as reported by the API.
    pub name:        String,
    /// Whether the repository is archived.
    #[serde(default)]
    pub archived:    bool,
    /// Stargazer count.
    #[serde(default, rename = "stargazers_count")]
    pub stars:       u64,
    /// Fork count.
    #[serde(default, rename = "forks_count")]
    pub forks:       u64,
    /// Open issues, pull requests included.
    #[serde(default, rename = "open_issues_count")]
    pub open_issues: u64,
    /// Last metadata update as an ISO-8601 string.
    #[serde(default)]
    pub updated_at:  Option<String,>,
    /// Last push as an ISO-8601 string.
    #[serde(default)]
    pub pushed_at:   Option<String,>,
}

/// Single commit reduced to its author date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct CommitRecord
{
    /// Raw ISO-8601 author date.
    pub author_date: String,
}

#[derive(Deserialize,)]
struct CommitPayload
{
    commit: CommitDetails,
}

#[derive(Deserialize,)]
struct CommitDetails
{
    #[serde(default)]
    author:    Option<CommitSignature,>,
    #[serde(default)]
    committer: Option<CommitSignature,>,
}

#[derive(Deserialize,)]
struct CommitSignature
{
    #[serde(default)]
    date: Option<String,>,
}

impl<'de,> Deserialize<'de,> for CommitRecord
{
    fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error,>
    where
        D: serde::Deserializer<'de,>,
    {
        let payload = CommitPayload::deserialize(deserializer,)?;
        let CommitDetails {
            author,
            committer,
        } = payload.commit;

        let author_date = author
            .and_then(|signature| signature.date,)
            .or_else(|| committer.and_then(|signature| signature.date,),)
            .unwrap_or_default();

        Ok(Self {
            author_date,
        },)
    }
}

/// Language byte counts in the order the API reported them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize,)]
pub struct LanguageHistogram
{
    entries: Vec<(String, u64,),>,
}

/// Name reported when a repository has no detected language.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

impl LanguageHistogram
{
    /// Builds a histogram from ordered `(language, bytes)` pairs.
    pub fn new(entries: Vec<(String, u64,),>,) -> Self
    {
        Self {
            entries,
        }
    }

    /// Returns the ordered entries.
    pub fn entries(&self,) -> &[(String, u64,)]
    {
        &self.entries
    }

    /// Whether the repository reported no languages at all.
    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }

    /// Language with the most bytes; ties resolve to the first entry seen.
    ///
    /// Returns [`UNKNOWN_LANGUAGE`] for an empty histogram.
    pub fn primary_language(&self,) -> &str
    {
        let mut best: Option<&(String, u64,),> = None;
        for entry in &self.entries {
            if best.is_none_or(|current| entry.1 > current.1,) {
                best = Some(entry,);
            }
        }

        best.map_or(UNKNOWN_LANGUAGE, |(name, _,)| name.as_str(),)
    }
}

impl<'de,> Deserialize<'de,> for LanguageHistogram
{
    fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error,>
    where
        D: serde::Deserializer<'de,>,
    {
        // serde_json is built with `preserve_order`, so the map keeps API order.
        let map = serde_json::Map::<String, serde_json::Value,>::deserialize(deserializer,)?;
        let entries = map
            .into_iter()
            .map(|(name, bytes,)| (name, bytes.as_u64().unwrap_or_default(),),)
            .collect();

        Ok(Self {
            entries,
        },)
    }
}

/// Account profile returned by `GET /users/{username}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize,)]
pub struct UserProfile
{
    /// Account login.
    pub login:        String,
    /// Number of public repositories.
    #[serde(default)]
    pub public_repos: u64,
    /// Follower count.
    #[serde(default)]
    pub followers:    u64,
    /// Number of followed accounts.
    #[serde(default)]
    pub following:    u64,
}

/// Core REST quota as reported by `GET /rate_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize,)]
pub struct RateLimitStatus
{
    /// Requests allowed per window.
    pub limit:     u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Window reset as a unix timestamp.
    pub reset:     i64,
}
