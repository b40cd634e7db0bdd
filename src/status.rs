// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Repository activity classification.
//!
//! A repository is labelled from two inputs only: its archival flag and the
//! author dates of the commits fetched for the lookback window. Commits are
//! counted inside a 7-day and a 30-day window relative to an explicit `now`,
//! which keeps the classifier deterministic under test.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;

use crate::model::CommitRecord;

/// Commits within the short window that make a repository very active.
pub const VERY_ACTIVE_WEEKLY_COMMITS: usize = 5;
/// Commits within the long window that make a repository very active.
pub const VERY_ACTIVE_MONTHLY_COMMITS: usize = 20;
/// Commits within the long window that make a repository active.
pub const ACTIVE_MONTHLY_COMMITS: usize = 5;
/// Commits within the long window that keep a repository maintained.
pub const MAINTAINED_MONTHLY_COMMITS: usize = 1;

const SHORT_WINDOW_DAYS: i64 = 7;
const LONG_WINDOW_DAYS: i64 = 30;

/// Activity label rendered in the status column.
///
/// Variants are declared from most to least active, so the derived ordering
/// sorts `VeryActive` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,)]
pub enum StatusLabel
{
    VeryActive,
    Active,
    Maintained,
    Inactive,
    Archived,
}

impl StatusLabel
{
    /// Every label, most active first.
    pub const ALL: [StatusLabel; 5] = [
        StatusLabel::VeryActive,
        StatusLabel::Active,
        StatusLabel::Maintained,
        StatusLabel::Inactive,
        StatusLabel::Archived,
    ];

    /// Human readable text used for badge labels and the summary.
    pub const fn label(self,) -> &'static str
    {
        match self {
            StatusLabel::VeryActive => "Very Active",
            StatusLabel::Active => "Active",
            StatusLabel::Maintained => "Maintained",
            StatusLabel::Inactive => "Inactive",
            StatusLabel::Archived => "Archived",
        }
    }
}

impl fmt::Display for StatusLabel
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(self.label(),)
    }
}

/// Error returned when a status override does not name a known label.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct UnknownStatus(pub String,);

impl fmt::Display for UnknownStatus
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "unknown status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for StatusLabel
{
    type Err = UnknownStatus;

    /// Parses labels case-insensitively, ignoring spaces, underscores and
    /// hyphens, so `"Very Active"`, `"very_active"` and `"VeryActive"` match.
    fn from_str(value: &str,) -> Result<Self, Self::Err,>
    {
        let folded: String = value
            .chars()
            .filter(|character| !matches!(character, ' ' | '_' | '-'),)
            .map(|character| character.to_ascii_lowercase(),)
            .collect();

        StatusLabel::ALL
            .into_iter()
            .find(|label| label.label().replace(' ', "",).to_ascii_lowercase() == folded,)
            .ok_or_else(|| UnknownStatus(value.trim().to_owned(),),)
    }
}

/// Commit counts inside the two recency windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default,)]
pub struct ActivityCounts
{
    /// Commits newer than seven days.
    pub last_week:  usize,
    /// Commits newer than thirty days.
    pub last_month: usize,
}

impl ActivityCounts
{
    /// Counts commits strictly newer than `now - 7d` and `now - 30d`.
    pub fn from_commits(commits: &[CommitRecord], now: DateTime<Utc,>,) -> Self
    {
        let now = now.naive_utc();
        let week_start = now - Duration::days(SHORT_WINDOW_DAYS,);
        let month_start = now - Duration::days(LONG_WINDOW_DAYS,);

        commits.iter().map(|commit| parse_github_date(&commit.author_date,),).fold(
            Self::default(),
            |mut counts, instant| {
                if instant > week_start {
                    counts.last_week += 1;
                }
                if instant > month_start {
                    counts.last_month += 1;
                }
                counts
            },
        )
    }

    /// Maps the counts to a label, ignoring archival.
    pub fn label(self,) -> StatusLabel
    {
        if self.last_week >= VERY_ACTIVE_WEEKLY_COMMITS
            || self.last_month >= VERY_ACTIVE_MONTHLY_COMMITS
        {
            StatusLabel::VeryActive
        } else if self.last_month >= ACTIVE_MONTHLY_COMMITS {
            StatusLabel::Active
        } else if self.last_month >= MAINTAINED_MONTHLY_COMMITS {
            StatusLabel::Maintained
        } else {
            StatusLabel::Inactive
        }
    }
}

/// Classifies a repository from its archival flag and recent commits.
///
/// Archived repositories are labelled [`StatusLabel::Archived`] regardless of
/// activity. An empty commit list is [`StatusLabel::Inactive`].
pub fn classify(archived: bool, commits: &[CommitRecord], now: DateTime<Utc,>,) -> StatusLabel
{
    if archived {
        return StatusLabel::Archived;
    }
    if commits.is_empty() {
        return StatusLabel::Inactive;
    }

    ActivityCounts::from_commits(commits, now,).label()
}

/// Applies a configured override on top of the computed label.
pub fn resolve_status(computed: StatusLabel, custom: Option<StatusLabel,>,) -> StatusLabel
{
    custom.unwrap_or(computed,)
}

/// Parses a GitHub timestamp (`2024-05-01T12:00:00Z`) into a naive UTC
/// instant.
///
/// Values that cannot be parsed map to [`NaiveDateTime::MIN`], which places
/// them outside every recency window.
pub fn parse_github_date(value: &str,) -> NaiveDateTime
{
    try_parse_github_date(value,).unwrap_or(NaiveDateTime::MIN,)
}

pub(crate) fn try_parse_github_date(value: &str,) -> Option<NaiveDateTime,>
{
    let trimmed = value.trim();
    if let Ok(parsed,) = DateTime::parse_from_rfc3339(trimmed,) {
        return Some(parsed.naive_utc(),);
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S",).ok()
}
