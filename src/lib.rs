// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Keeps a markdown repository status table in sync with GitHub.
//!
//! The library loads a YAML list of tracked repositories, reads metadata,
//! recent commits and language statistics through a [`RepositorySource`],
//! classifies each repository's activity and rewrites the status table and
//! last-updated marker of a markdown document. A plain-text summary records
//! the outcome for every repository.

mod badge;
mod config;
mod error;
mod github;
mod model;
mod report;
mod status;
mod table;
mod updater;

pub use badge::{
    Metric, format_number, format_relative_date, language_badge, metric_badge, status_badge,
    status_color,
};
pub use config::{
    DEFAULT_USERNAME, FALLBACK_TOKEN_ENV, RepoTracking, RepositoryEntry, TOKEN_ENV,
    TrackingConfig, load_tracking, parse_tracking, resolve_token,
};
pub use error::{Error, io_error, write_error};
pub use github::{
    ClientSettings, FetchFailure, GitHubClient, LOW_RATE_LIMIT_THRESHOLD, MAX_PAGES, PAGE_SIZE,
    REQUEST_TIMEOUT, RepositorySource, collect_pages,
};
pub use model::{
    CommitRecord, LanguageHistogram, RateLimitStatus, RepositorySnapshot, UNKNOWN_LANGUAGE,
    UserProfile,
};
pub use report::{RepositoryOutcome, RunSummary, SummaryEntry, write_summary};
pub use status::{
    ActivityCounts, StatusLabel, UnknownStatus, classify, parse_github_date, resolve_status,
};
pub use table::{
    MARKER_TIMESTAMP_FORMAT, TableHeader, TableRow, TableSync, stamp_last_updated, sync_table,
};
pub use updater::{
    DEFAULT_LOOKBACK_DAYS, StatusUpdater, TableUpdate, UpdateOutcome, progress_bar,
    read_document, write_outcome,
};
