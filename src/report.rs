// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Plain-text summary of an update run.
//!
//! The summary lists every configured repository with the outcome of its
//! fetch. It is built from data the run already collected, so producing it
//! costs no extra API calls.

use std::{
    fmt::{self, Write as _},
    fs,
    path::Path,
};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    badge::{format_number, format_relative_date},
    error::{self, Error},
    status::StatusLabel,
};

/// Outcome recorded for one configured repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RepositoryOutcome
{
    /// A row was rendered for the repository.
    Rendered
    {
        /// Final status after overrides.
        status:             StatusLabel,
        /// Primary language.
        language:           String,
        /// Stargazer count.
        stars:              u64,
        /// Fork count.
        forks:              u64,
        /// Open issue count reported with the repository metadata.
        open_issues:        u64,
        /// Open pull requests, when tracked and available.
        open_pull_requests: Option<usize,>,
        /// Raw `updated_at` timestamp.
        updated_at:         Option<String,>,
    },
    /// Metadata was unavailable and the repository was skipped.
    Failed,
}

/// Summary entry for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct SummaryEntry
{
    /// Repository name.
    pub name:    String,
    /// What happened to it.
    #[serde(flatten)]
    pub outcome: RepositoryOutcome,
}

/// Summary of one update run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct RunSummary
{
    /// When the run started.
    pub generated_at:         DateTime<Utc,>,
    /// Account whose repositories were processed.
    pub user:                 String,
    /// Remaining quota from the probe, if it succeeded.
    pub rate_limit_remaining: Option<u32,>,
    /// One entry per configured repository, in configuration order.
    pub entries:              Vec<SummaryEntry,>,
}

impl RunSummary
{
    /// Number of repositories that produced a row.
    pub fn rendered(&self,) -> usize
    {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, RepositoryOutcome::Rendered { .. }),)
            .count()
    }

    /// Number of repositories that were skipped.
    pub fn failed(&self,) -> usize
    {
        self.entries.len() - self.rendered()
    }
}

impl fmt::Display for RunSummary
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        writeln!(f, "=== Repository Update Summary ===")?;
        writeln!(f, "Timestamp: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "User: {}", self.user)?;
        writeln!(f, "Repositories Processed: {}", self.entries.len())?;
        writeln!(f, "Rows Rendered: {}", self.rendered())?;
        match self.rate_limit_remaining {
            Some(remaining,) => writeln!(f, "Rate Limit Remaining: {remaining}")?,
            None => writeln!(f, "Rate Limit Remaining: Unknown")?,
        }

        if !self.entries.is_empty() {
            writeln!(f)?;
        }
        for entry in &self.entries {
            writeln!(f, "{}", entry.line(self.generated_at))?;
        }

        Ok((),)
    }
}

impl SummaryEntry
{
    fn line(&self, now: DateTime<Utc,>,) -> String
    {
        match &self.outcome {
            RepositoryOutcome::Rendered {
                stars,
                forks,
                open_issues,
                open_pull_requests,
                updated_at,
                ..
            } => {
                let mut line = format!(
                    "✅ {} - Last updated: {} (stars: {}, forks: {}, open issues: {open_issues}",
                    self.name,
                    format_relative_date(updated_at.as_deref(), now),
                    format_number(*stars),
                    format_number(*forks),
                );
                if let Some(pulls,) = open_pull_requests {
                    let _ = write!(line, ", open pull requests: {pulls}");
                }
                line.push(')',);
                line
            }
            RepositoryOutcome::Failed => format!("❌ {} - Failed to fetch", self.name),
        }
    }
}

/// Writes the rendered summary to `path`.
///
/// # Errors
///
/// Returns [`Error::Write`](Error::Write) when the file cannot be written.
pub fn write_summary(path: &Path, summary: &RunSummary,) -> Result<(), Error,>
{
    fs::write(path, summary.to_string(),).map_err(|source| error::write_error(path, source,),)
}
