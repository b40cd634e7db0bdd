// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Drives one update run across the configured repositories.
//!
//! Repositories are processed strictly one after another. A repository whose
//! metadata cannot be fetched is skipped and reported in the summary; the run
//! only fails as a whole when no row at all could be rendered.

use std::{fs, path::Path};

use chrono::{DateTime, Duration, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{Instrument, error, info, info_span, warn};

use crate::{
    config::RepoTracking,
    error::{self, Error},
    github::{LOW_RATE_LIMIT_THRESHOLD, RepositorySource},
    report::{RepositoryOutcome, RunSummary, SummaryEntry, write_summary},
    status::{classify, resolve_status},
    table::{TableHeader, TableRow, TableSync, stamp_last_updated, sync_table},
};

/// Commit history window used for classification when none is configured.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;

/// What happened to the status table during a run.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum TableUpdate
{
    /// The table was rewritten and the marker stamped.
    Replaced
    {
        /// Rows written.
        rows:     usize,
        /// Rows the previous table had.
        previous: usize,
    },
    /// The document has no status table; only the marker was stamped.
    TableMissing,
    /// No repository produced a row; the document is untouched.
    NoRows,
}

/// Result of [`StatusUpdater::update_document`].
#[derive(Debug, Clone,)]
pub struct UpdateOutcome
{
    /// Document to write back.
    pub content: String,
    /// Table handling.
    pub table:   TableUpdate,
    /// Per-repository outcomes.
    pub summary: RunSummary,
}

/// Sequential status table updater over a [`RepositorySource`].
pub struct StatusUpdater<S,>
{
    source:   S,
    lookback: Duration,
    progress: ProgressBar,
}

impl<S: RepositorySource,> StatusUpdater<S,>
{
    /// Updater with the default lookback window and no progress display.
    pub fn new(source: S,) -> Self
    {
        Self {
            source,
            lookback: Duration::days(i64::from(DEFAULT_LOOKBACK_DAYS,),),
            progress: ProgressBar::hidden(),
        }
    }

    /// Sets the commit history window in days.
    pub fn with_lookback_days(mut self, days: u32,) -> Self
    {
        self.lookback = Duration::days(i64::from(days,),);
        self
    }

    /// Reports per-repository progress on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar,) -> Self
    {
        self.progress = progress;
        self
    }

    /// Fetches every repository, rebuilds the status table in `document` and
    /// stamps the last-updated marker.
    ///
    /// When no repository yields a row the input document is returned
    /// unchanged with [`TableUpdate::NoRows`].
    pub async fn update_document(
        &self,
        document: &str,
        repositories: &[RepoTracking],
        now: DateTime<Utc,>,
    ) -> UpdateOutcome
    {
        info!("Starting repository status update for {}", self.source.owner());

        let rate_limit = self.source.rate_limit().await;
        match &rate_limit {
            Some(status,) if status.remaining < LOW_RATE_LIMIT_THRESHOLD => {
                warn!("Rate limit low: {} requests remaining", status.remaining);
            }
            Some(_,) => {}
            None => error!("Failed to check rate limit"),
        }

        self.progress.set_length(repositories.len() as u64,);

        let mut rows = Vec::with_capacity(repositories.len(),);
        let mut entries = Vec::with_capacity(repositories.len(),);

        for repository in repositories {
            self.progress.set_message(repository.name.clone(),);
            let span = info_span!("repository", name = %repository.name);
            let (row, entry,) = self.process(repository, now,).instrument(span,).await;
            rows.extend(row,);
            entries.push(entry,);
            self.progress.inc(1,);
        }
        self.progress.finish_and_clear();

        if let Some(profile,) = self.source.user_profile().await {
            info!(
                "User {}: {} public repos, {} followers, {} following",
                profile.login, profile.public_repos, profile.followers, profile.following
            );
        }

        let summary = RunSummary {
            generated_at: now,
            user: self.source.owner().to_owned(),
            rate_limit_remaining: rate_limit.map(|status| status.remaining,),
            entries,
        };

        if rows.is_empty() {
            error!("No repositories were successfully processed");
            return UpdateOutcome {
                content: document.to_owned(),
                table: TableUpdate::NoRows,
                summary,
            };
        }

        let header = TableHeader::for_repositories(repositories,);
        let (content, sync,) = sync_table(document, &header, &rows,);
        let table = match sync {
            TableSync::Replaced {
                rows,
                previous,
            } => TableUpdate::Replaced {
                rows,
                previous,
            },
            TableSync::NotFound => TableUpdate::TableMissing,
        };

        UpdateOutcome {
            content: stamp_last_updated(&content, now,),
            table,
            summary,
        }
    }

    async fn process(
        &self,
        repository: &RepoTracking,
        now: DateTime<Utc,>,
    ) -> (Option<TableRow,>, SummaryEntry,)
    {
        info!("Processing repository: {}", repository.name);

        let Some(snapshot,) = self.source.repository(&repository.name,).await else {
            warn!("Skipping {} - could not fetch repository info", repository.name);
            return (None, SummaryEntry {
                name:    repository.name.clone(),
                outcome: RepositoryOutcome::Failed,
            },);
        };

        let commits = self.source.commits_since(&repository.name, now - self.lookback,).await;
        let languages = self.source.languages(&repository.name,).await;

        let status = resolve_status(
            classify(snapshot.archived, &commits, now,),
            repository.custom_status,
        );
        let language = languages.primary_language().to_owned();

        let open_pull_requests = if repository.track_prs {
            self.source.open_pull_requests(&repository.name,).await
        } else {
            None
        };

        let row = TableRow {
            display_name: repository.display_name.clone(),
            owner: self.source.owner().to_owned(),
            repository: repository.name.clone(),
            status,
            language: language.clone(),
            track_issues: repository.track_issues,
        };

        let entry = SummaryEntry {
            name:    repository.name.clone(),
            outcome: RepositoryOutcome::Rendered {
                status,
                language,
                stars: snapshot.stars,
                forks: snapshot.forks,
                open_issues: snapshot.open_issues,
                open_pull_requests,
                updated_at: snapshot.updated_at,
            },
        };

        (Some(row,), entry,)
    }
}

/// Progress bar counting processed repositories.
pub fn progress_bar() -> ProgressBar
{
    let bar = ProgressBar::new(0,);
    if let Ok(style,) =
        ProgressStyle::default_bar().template("{spinner:.yellow} [{elapsed_precise}] {pos}/{len} {msg}",)
    {
        bar.set_style(style,);
    }
    bar
}

/// Reads the markdown document that holds the status table.
///
/// # Errors
///
/// Returns [`Error::Io`](Error::Io) when the file is missing or unreadable.
pub fn read_document(path: &Path,) -> Result<String, Error,>
{
    fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)
}

/// Persists a run: the document (unless no row was rendered) and the summary.
///
/// The summary is written in every case.
///
/// # Errors
///
/// Returns [`Error::Write`](Error::Write) when either file cannot be written
/// and [`Error::NoRows`](Error::NoRows) when the run rendered no row.
pub fn write_outcome(
    outcome: &UpdateOutcome,
    document_path: &Path,
    summary_path: &Path,
) -> Result<(), Error,>
{
    if outcome.table != TableUpdate::NoRows {
        fs::write(document_path, &outcome.content,)
            .map_err(|source| error::write_error(document_path, source,),)?;
        info!("Updated {}", document_path.display());
    }

    info!("{}", outcome.summary);
    write_summary(summary_path, &outcome.summary,)?;

    if outcome.table == TableUpdate::NoRows {
        return Err(Error::NoRows {
            attempted: outcome.summary.entries.len(),
        },);
    }

    Ok((),)
}

#[cfg(test)]
mod tests
{
    use std::{cell::RefCell, collections::HashMap};

    use chrono::TimeZone;
    use tempfile::tempdir;

    use super::*;
    use crate::{
        model::{CommitRecord, LanguageHistogram, RateLimitStatus, RepositorySnapshot, UserProfile},
        status::StatusLabel,
    };

    const DOCUMENT: &str = "# Portfolio\n\n| Repository | Status | Language | Stars | Forks | Issues | Last Commit |\n|---|---|---|---|---|---|---|\n| Old A | x | x | x | x | x | x |\n| Old B | x | x | x | x | x | x |\n\n## Contact\n\nMail me.\n\n<!-- LAST_UPDATED:2020-01-01 00:00:00 UTC -->\n";

    struct Repository
    {
        snapshot:  RepositorySnapshot,
        commits:   Vec<CommitRecord,>,
        languages: LanguageHistogram,
        pulls:     Option<usize,>,
    }

    #[derive(Default,)]
    struct FakeSource
    {
        repositories: HashMap<String, Repository,>,
        rate_limit:   Option<RateLimitStatus,>,
        since:        RefCell<Vec<DateTime<Utc,>,>,>,
        pull_calls:   RefCell<Vec<String,>,>,
    }

    impl FakeSource
    {
        fn with(mut self, name: &str, archived: bool, commit_days: &[i64], language: &str,) -> Self
        {
            let commits = commit_days
                .iter()
                .map(|days| CommitRecord {
                    author_date: (now() - Duration::days(*days,))
                        .format("%Y-%m-%dT%H:%M:%SZ",)
                        .to_string(),
                },)
                .collect();
            self.repositories.insert(name.to_owned(), Repository {
                snapshot:  RepositorySnapshot {
                    name: name.to_owned(),
                    archived,
                    stars: 1_200,
                    forks: 4,
                    open_issues: 2,
                    updated_at: Some("2026-10-18T12:00:00Z".to_owned(),),
                    pushed_at: None,
                },
                commits,
                languages: LanguageHistogram::new(vec![(language.to_owned(), 10_000,)],),
                pulls:     Some(3,),
            },);
            self
        }
    }

    impl RepositorySource for FakeSource
    {
        fn owner(&self,) -> &str
        {
            "octocat"
        }

        async fn rate_limit(&self,) -> Option<RateLimitStatus,>
        {
            self.rate_limit
        }

        async fn repository(&self, name: &str,) -> Option<RepositorySnapshot,>
        {
            self.repositories.get(name,).map(|repository| repository.snapshot.clone(),)
        }

        async fn commits_since(&self, name: &str, since: DateTime<Utc,>,) -> Vec<CommitRecord,>
        {
            self.since.borrow_mut().push(since,);
            self.repositories.get(name,).map(|repository| repository.commits.clone(),).unwrap_or_default()
        }

        async fn languages(&self, name: &str,) -> LanguageHistogram
        {
            self.repositories.get(name,).map(|repository| repository.languages.clone(),).unwrap_or_default()
        }

        async fn user_profile(&self,) -> Option<UserProfile,>
        {
            Some(UserProfile {
                login:        "octocat".to_owned(),
                public_repos: 8,
                followers:    100,
                following:    1,
            },)
        }

        async fn open_pull_requests(&self, name: &str,) -> Option<usize,>
        {
            self.pull_calls.borrow_mut().push(name.to_owned(),);
            self.repositories.get(name,).and_then(|repository| repository.pulls,)
        }
    }

    fn now() -> DateTime<Utc,>
    {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0,).unwrap()
    }

    fn table_rows(document: &str,) -> Vec<&str,>
    {
        document
            .lines()
            .filter(|line| line.starts_with("| ",),)
            .filter(|line| !line.starts_with("| Repository",) && !line.starts_with("| ---",),)
            .collect()
    }

    fn sources() -> FakeSource
    {
        FakeSource {
            rate_limit: Some(RateLimitStatus {
                limit:     5000,
                remaining: 4990,
                reset:     0,
            },),
            ..FakeSource::default()
        }
        .with("tools", false, &[10, 10, 11, 12, 13, 14], "Rust",)
        .with("legacy", true, &[1; 100], "Python",)
    }

    #[tokio::test]
    async fn rewrites_table_and_preserves_surroundings()
    {
        let updater = StatusUpdater::new(sources(),);
        let repositories = vec![RepoTracking::new("tools"), RepoTracking::new("legacy")];

        let outcome = updater.update_document(DOCUMENT, &repositories, now(),).await;

        assert_eq!(outcome.table, TableUpdate::Replaced {
            rows:     2,
            previous: 2,
        });
        let rows = table_rows(&outcome.content,);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("| tools | ![Active](https://img.shields.io/badge/Status-Active-green)"));
        assert!(rows[1].contains("Status-Archived-lightgray"));
        assert!(rows[1].contains("logo=python"));
        assert!(outcome.content.starts_with("# Portfolio\n\n"));
        assert!(outcome.content.contains("\n\n## Contact\n\nMail me.\n\n"));
        assert!(outcome.content.ends_with("<!-- LAST_UPDATED:2026-10-19 12:00:00 UTC -->\n"));
        assert!(!outcome.content.contains("Old A"));
    }

    #[tokio::test]
    async fn second_run_is_a_no_op()
    {
        let updater = StatusUpdater::new(sources(),);
        let repositories = vec![RepoTracking::new("tools"), RepoTracking::new("legacy")];

        let first = updater.update_document(DOCUMENT, &repositories, now(),).await;
        let second = updater.update_document(&first.content, &repositories, now(),).await;

        assert_eq!(first.content, second.content);
    }

    #[tokio::test]
    async fn skips_unavailable_repositories()
    {
        let updater = StatusUpdater::new(sources(),);
        let repositories = vec![RepoTracking::new("missing"), RepoTracking::new("tools")];

        let outcome = updater.update_document(DOCUMENT, &repositories, now(),).await;

        assert_eq!(table_rows(&outcome.content).len(), 1);
        assert_eq!(outcome.summary.entries[0].outcome, RepositoryOutcome::Failed);
        assert_eq!(outcome.summary.rendered(), 1);
        assert_eq!(outcome.summary.rate_limit_remaining, Some(4990));
    }

    #[tokio::test]
    async fn low_rate_limit_does_not_stop_the_run()
    {
        let mut source = sources();
        source.rate_limit = Some(RateLimitStatus {
            limit:     5000,
            remaining: 4,
            reset:     0,
        },);
        let updater = StatusUpdater::new(source,);
        let repositories = vec![RepoTracking::new("tools"), RepoTracking::new("legacy")];

        let outcome = updater.update_document(DOCUMENT, &repositories, now(),).await;

        assert_eq!(outcome.table, TableUpdate::Replaced {
            rows:     2,
            previous: 2,
        });
        assert_eq!(table_rows(&outcome.content).len(), 2);
        assert_eq!(outcome.summary.rate_limit_remaining, Some(4));
    }

    #[tokio::test]
    async fn failed_rate_limit_check_does_not_stop_the_run()
    {
        let mut source = sources();
        source.rate_limit = None;
        let updater = StatusUpdater::new(source,);
        let repositories = vec![RepoTracking::new("tools"), RepoTracking::new("legacy")];

        let outcome = updater.update_document(DOCUMENT, &repositories, now(),).await;

        assert_eq!(outcome.table, TableUpdate::Replaced {
            rows:     2,
            previous: 2,
        });
        assert_eq!(outcome.summary.rendered(), 2);
        assert_eq!(outcome.summary.rate_limit_remaining, None);
        assert!(outcome.summary.to_string().contains("Rate Limit Remaining: Unknown"));
    }

    #[tokio::test]
    async fn no_rows_leaves_document_untouched()
    {
        let updater = StatusUpdater::new(FakeSource::default(),);
        let repositories = vec![RepoTracking::new("a"), RepoTracking::new("b")];

        let outcome = updater.update_document(DOCUMENT, &repositories, now(),).await;

        assert_eq!(outcome.table, TableUpdate::NoRows);
        assert_eq!(outcome.content, DOCUMENT);
        assert_eq!(outcome.summary.failed(), 2);
        assert_eq!(outcome.summary.rate_limit_remaining, None);
    }

    #[tokio::test]
    async fn custom_status_overrides_classification()
    {
        let updater = StatusUpdater::new(sources(),);
        let mut legacy = RepoTracking::new("legacy",);
        legacy.custom_status = Some(StatusLabel::Maintained,);
        legacy.display_name = "Legacy App".to_owned();

        let outcome = updater.update_document(DOCUMENT, &[legacy], now(),).await;

        let rows = table_rows(&outcome.content,);
        assert!(rows[0].starts_with("| Legacy App | ![Maintained]"));
    }

    #[tokio::test]
    async fn commits_are_requested_for_the_lookback_window()
    {
        let updater = StatusUpdater::new(sources(),).with_lookback_days(30,);

        updater.update_document(DOCUMENT, &[RepoTracking::new("tools",)], now(),).await;

        assert_eq!(*updater.source.since.borrow(), vec![now() - Duration::days(30)]);
    }

    #[tokio::test]
    async fn pull_requests_are_only_counted_when_tracked()
    {
        let updater = StatusUpdater::new(sources(),);
        let mut legacy = RepoTracking::new("legacy",);
        legacy.track_prs = false;

        let outcome =
            updater.update_document(DOCUMENT, &[RepoTracking::new("tools"), legacy], now(),).await;

        assert_eq!(*updater.source.pull_calls.borrow(), vec!["tools".to_owned()]);
        let RepositoryOutcome::Rendered {
            open_pull_requests, ..
        } = &outcome.summary.entries[0].outcome
        else {
            panic!("expected rendered outcome");
        };
        assert_eq!(*open_pull_requests, Some(3));
    }

    #[tokio::test]
    async fn missing_table_still_stamps_marker()
    {
        let updater = StatusUpdater::new(sources(),);
        let document = "# Nothing to see\n";

        let outcome = updater.update_document(document, &[RepoTracking::new("tools",)], now(),).await;

        assert_eq!(outcome.table, TableUpdate::TableMissing);
        assert_eq!(
            outcome.content,
            "# Nothing to see\n\n\n<!-- LAST_UPDATED:2026-10-19 12:00:00 UTC -->\n"
        );
    }

    #[tokio::test]
    async fn write_outcome_persists_document_and_summary()
    {
        let directory = tempdir().expect("failed to create tempdir",);
        let readme = directory.path().join("README.md",);
        let summary = directory.path().join("update_summary.txt",);
        fs::write(&readme, DOCUMENT,).expect("seed document",);

        let updater = StatusUpdater::new(sources(),);
        let document = read_document(&readme,).expect("document readable",);
        let outcome = updater.update_document(&document, &[RepoTracking::new("tools",)], now(),).await;

        write_outcome(&outcome, &readme, &summary,).expect("persist should succeed",);

        assert_eq!(fs::read_to_string(&readme).expect("readme"), outcome.content);
        let text = fs::read_to_string(&summary,).expect("summary",);
        assert!(text.contains("✅ tools - Last updated: Yesterday"));
    }

    #[tokio::test]
    async fn write_outcome_reports_no_rows_after_writing_summary()
    {
        let directory = tempdir().expect("failed to create tempdir",);
        let readme = directory.path().join("README.md",);
        let summary = directory.path().join("update_summary.txt",);
        fs::write(&readme, DOCUMENT,).expect("seed document",);

        let updater = StatusUpdater::new(FakeSource::default(),);
        let outcome = updater.update_document(DOCUMENT, &[RepoTracking::new("gone",)], now(),).await;

        let error = write_outcome(&outcome, &readme, &summary,).expect_err("expected no rows",);

        assert!(matches!(error, Error::NoRows { attempted: 1 }));
        assert_eq!(fs::read_to_string(&readme).expect("readme"), DOCUMENT);
        assert!(fs::read_to_string(&summary).expect("summary").contains("❌ gone - Failed to fetch"));
    }

    #[test]
    fn read_document_reports_missing_file()
    {
        let directory = tempdir().expect("failed to create tempdir",);
        let error = read_document(&directory.path().join("README.md",),).expect_err("expected io error",);
        assert!(matches!(error, Error::Io { .. }));
    }
}
