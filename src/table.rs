// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Rewrites the repository status table and the last-updated marker inside a
//! markdown document.
//!
//! The table region is the first header line naming the `Repository`,
//! `Status`, `Language`, `Stars` and `Forks` columns, its separator line, and
//! every contiguous row that starts with `|`. The table may be indented or
//! sit inside a blockquote; the header's leading whitespace and `>` markers
//! are repeated on every rewritten line. The region is replaced as a whole on
//! each run, so rerunning with the same rows leaves the document unchanged.
//! Text after the last row is never touched.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{NoExpand, Regex};
use tracing::{info, warn};

use crate::{
    badge::{Metric, language_badge, metric_badge, status_badge},
    config::RepoTracking,
    status::StatusLabel,
};

static TABLE_PATTERN: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?P<prefix>[ \t]*(?:>[ \t]*)*)\| Repository \| Status \| Language \| Stars \| Forks \|[^\n]*\n[ \t>]*\|[^\n]*(?:\n|\z)(?:[ \t>]*\|[^\n]*(?:\n|\z))*",
    )
    .expect("valid table pattern",)
},);

static MARKER_PATTERN: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r"<!-- LAST_UPDATED:.*?-->",).expect("valid marker pattern",)
},);

/// Format of the timestamp written into the last-updated marker.
pub const MARKER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Cell rendered when the table has an issues column but the repository does
/// not track issues.
const UNTRACKED_CELL: &str = "-";

/// Column layout of the status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct TableHeader
{
    /// Whether the issues column is present.
    pub include_issues: bool,
}

impl TableHeader
{
    /// Header for the configured repositories: the issues column appears when
    /// at least one of them tracks issues.
    pub fn for_repositories(repositories: &[RepoTracking],) -> Self
    {
        Self {
            include_issues: repositories.iter().any(|repository| repository.track_issues,),
        }
    }

    /// Column names in order.
    pub fn columns(&self,) -> Vec<&'static str,>
    {
        let mut columns = vec!["Repository", "Status", "Language", "Stars", "Forks"];
        if self.include_issues {
            columns.push("Issues",);
        }
        columns.push("Last Commit",);
        columns
    }

    /// Header line followed by the separator line, without a trailing newline.
    pub fn render(&self,) -> String
    {
        let columns = self.columns();
        let separator = vec!["---"; columns.len()];
        format!("{}\n{}", markdown_row(&columns,), markdown_row(&separator,))
    }
}

/// One rendered repository of the status table.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct TableRow
{
    /// Label in the first column.
    pub display_name: String,
    /// Account owning the repository.
    pub owner:        String,
    /// Repository name used in dynamic badge URLs.
    pub repository:   String,
    /// Final status after overrides.
    pub status:       StatusLabel,
    /// Primary language name.
    pub language:     String,
    /// Whether the issues cell carries a badge.
    pub track_issues: bool,
}

impl TableRow
{
    /// Renders the row for `header`, without a trailing newline.
    pub fn render(&self, header: &TableHeader,) -> String
    {
        let mut cells = vec![
            self.display_name.clone(),
            status_badge(self.status,),
            language_badge(&self.language,),
            metric_badge(Metric::Stars, &self.owner, &self.repository,),
            metric_badge(Metric::Forks, &self.owner, &self.repository,),
        ];

        if header.include_issues {
            cells.push(if self.track_issues {
                metric_badge(Metric::Issues, &self.owner, &self.repository,)
            } else {
                UNTRACKED_CELL.to_owned()
            },);
        }

        cells.push(metric_badge(Metric::LastCommit, &self.owner, &self.repository,),);
        markdown_row(&cells,)
    }
}

fn markdown_row<S: AsRef<str,>,>(cells: &[S],) -> String
{
    let joined = cells.iter().map(|cell| cell.as_ref(),).collect::<Vec<&str,>,>().join(" | ",);
    format!("| {joined} |")
}

/// Result of [`sync_table`].
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum TableSync
{
    /// The table region was rewritten with the given number of rows.
    Replaced
    {
        /// Data rows written.
        rows:     usize,
        /// Data rows found in the previous table.
        previous: usize,
    },
    /// No table header was found; the document is unchanged.
    NotFound,
}

/// Replaces the first status table in `document`.
///
/// Returns the new document and what happened. When no table is found the
/// returned document is identical to the input.
///
/// # Example
///
/// ```
/// use repostat::{TableHeader, TableSync, sync_table};
///
/// let document = "# Repos\n\n| Repository | Status | Language | Stars | Forks |\n|---|---|---|---|---|\n| old | row |\n\nFooter\n";
/// let header = TableHeader { include_issues: false };
/// let (updated, sync) = sync_table(document, &header, &[]);
///
/// assert_eq!(sync, TableSync::Replaced { rows: 0, previous: 1 });
/// assert!(updated.ends_with("| --- | --- | --- | --- | --- | --- |\n\nFooter\n"));
/// ```
pub fn sync_table(document: &str, header: &TableHeader, rows: &[TableRow],) -> (String, TableSync,)
{
    let Some(captures,) = TABLE_PATTERN.captures(document,) else {
        warn!("Could not find repository table to update");
        return (document.to_owned(), TableSync::NotFound,);
    };
    let Some(found,) = captures.get(0,) else {
        return (document.to_owned(), TableSync::NotFound,);
    };
    let prefix = captures.name("prefix",).map_or("", |prefix| prefix.as_str(),);

    let previous = found.as_str().lines().count().saturating_sub(2,);

    let mut table = String::new();
    let lines = header.render().lines().map(str::to_owned,).collect::<Vec<_,>,>();
    for line in lines.into_iter().chain(rows.iter().map(|row| row.render(header,),),) {
        table.push_str(prefix,);
        table.push_str(&line,);
        table.push('\n',);
    }

    let mut updated = String::with_capacity(document.len() + table.len(),);
    updated.push_str(&document[..found.start()],);
    updated.push_str(&table,);
    updated.push_str(&document[found.end()..],);

    info!("Successfully updated table with {} repositories", rows.len());
    (
        updated,
        TableSync::Replaced {
            rows: rows.len(),
            previous,
        },
    )
}

/// Writes `now` into the `<!-- LAST_UPDATED:... -->` marker, appending the
/// marker at the end of the document when it is missing.
pub fn stamp_last_updated(document: &str, now: DateTime<Utc,>,) -> String
{
    let marker = format!("<!-- LAST_UPDATED:{} -->", now.format(MARKER_TIMESTAMP_FORMAT,));

    if MARKER_PATTERN.is_match(document,) {
        return MARKER_PATTERN.replace(document, NoExpand(&marker,),).into_owned();
    }

    warn!("LAST_UPDATED marker not found, appending it");
    format!("{document}\n\n{marker}\n")
}

#[cfg(test)]
mod tests
{
    use chrono::TimeZone;

    use super::*;

    const DOCUMENT: &str = "# Projects\n\nIntro text.\n\n| Repository | Status | Language | Stars | Forks | Issues | Last Commit |\n|---|---|---|---|---|---|---|\n| Stale One | a | b | c | d | e | f |\n| Stale Two | a | b | c | d | e | f |\n\n## After the table\n\nKeep | this | line.\n";

    fn row(name: &str, status: StatusLabel, track_issues: bool,) -> TableRow
    {
        TableRow {
            display_name: name.to_owned(),
            owner: "octocat".to_owned(),
            repository: name.to_lowercase().replace(' ', "-",),
            status,
            language: "Rust".to_owned(),
            track_issues,
        }
    }

    fn tail(document: &str,) -> &str
    {
        &document[document.find("\n## After the table",).expect("tail present",)..]
    }

    #[test]
    fn header_includes_issues_only_when_tracked()
    {
        let mut repositories = vec![RepoTracking::new("a"), RepoTracking::new("b")];
        assert!(TableHeader::for_repositories(&repositories).include_issues);

        for repository in &mut repositories {
            repository.track_issues = false;
        }
        let header = TableHeader::for_repositories(&repositories,);
        assert!(!header.include_issues);
        assert_eq!(
            header.render(),
            "| Repository | Status | Language | Stars | Forks | Last Commit |\n| --- | --- | --- | --- | --- | --- |"
        );
    }

    #[test]
    fn row_renders_badges_in_column_order()
    {
        let header = TableHeader {
            include_issues: true,
        };
        let rendered = row("Tools", StatusLabel::Active, true,).render(&header,);

        assert_eq!(
            rendered,
            "| Tools | ![Active](https://img.shields.io/badge/Status-Active-green) | ![Rust](https://img.shields.io/badge/Rust-000000?style=flat&logo=rust&logoColor=white) | ![Stars](https://img.shields.io/github/stars/octocat/tools?style=flat) | ![Forks](https://img.shields.io/github/forks/octocat/tools?style=flat) | ![Issues](https://img.shields.io/github/issues/octocat/tools?style=flat) | ![Last Commit](https://img.shields.io/github/last-commit/octocat/tools?style=flat) |"
        );
    }

    #[test]
    fn untracked_issues_keep_columns_aligned()
    {
        let header = TableHeader {
            include_issues: true,
        };
        let rendered = row("Tools", StatusLabel::Active, false,).render(&header,);
        assert_eq!(rendered.matches(" | ").count(), header.columns().len() - 1);
        assert!(rendered.contains(" | - | "));
    }

    #[test]
    fn replaces_table_and_preserves_surroundings()
    {
        let header = TableHeader {
            include_issues: true,
        };
        let rows = [row("Fresh", StatusLabel::VeryActive, true,)];
        let (updated, sync,) = sync_table(DOCUMENT, &header, &rows,);

        assert_eq!(sync, TableSync::Replaced {
            rows:     1,
            previous: 2,
        });
        assert!(updated.starts_with("# Projects\n\nIntro text.\n\n| Repository |"));
        assert!(!updated.contains("Stale"));
        assert!(updated.contains("| Fresh |"));
        assert_eq!(tail(&updated), tail(DOCUMENT));
    }

    #[test]
    fn replacement_is_idempotent()
    {
        let header = TableHeader {
            include_issues: true,
        };
        let rows = [row("Fresh", StatusLabel::Active, true,), row("Old", StatusLabel::Archived, false,)];

        let (once, _,) = sync_table(DOCUMENT, &header, &rows,);
        let (twice, sync,) = sync_table(&once, &header, &rows,);

        assert_eq!(once, twice);
        assert_eq!(sync, TableSync::Replaced {
            rows:     2,
            previous: 2,
        });
    }

    #[test]
    fn missing_table_leaves_document_untouched()
    {
        let document = "# Projects\n\n| Name | Status |\n|---|---|\n| x | y |\n";
        let header = TableHeader {
            include_issues: false,
        };
        let (updated, sync,) = sync_table(document, &header, &[row("Fresh", StatusLabel::Active, true,)],);

        assert_eq!(sync, TableSync::NotFound);
        assert_eq!(updated.as_bytes(), document.as_bytes());
    }

    #[test]
    fn only_first_table_is_replaced()
    {
        let document = format!("{DOCUMENT}\n{}", &DOCUMENT[DOCUMENT.find("| Repository",).unwrap()..]);
        let header = TableHeader {
            include_issues: true,
        };
        let (updated, _,) = sync_table(&document, &header, &[row("Fresh", StatusLabel::Active, true,)],);

        assert_eq!(updated.matches("| Stale One |").count(), 1);
        assert_eq!(updated.matches("| Fresh |").count(), 1);
    }

    #[test]
    fn table_at_end_of_document_without_newline()
    {
        let document = "| Repository | Status | Language | Stars | Forks |\n|---|---|---|---|---|\n| old | row |";
        let header = TableHeader {
            include_issues: false,
        };
        let rows = [row("Fresh", StatusLabel::Maintained, false,)];
        let (once, _,) = sync_table(document, &header, &rows,);
        let (twice, _,) = sync_table(&once, &header, &rows,);

        assert!(!once.contains("old"));
        assert!(once.ends_with("|\n"));
        assert_eq!(once, twice);
    }

    #[test]
    fn indented_table_keeps_its_indentation()
    {
        let document = "Intro\n\n  | Repository | Status | Language | Stars | Forks |\n  |---|---|---|---|---|\n  | old | row |\n\nAfter\n";
        let header = TableHeader {
            include_issues: false,
        };
        let rows = [row("Fresh", StatusLabel::Active, false,)];

        let (once, sync,) = sync_table(document, &header, &rows,);
        let (twice, _,) = sync_table(&once, &header, &rows,);

        assert_eq!(sync, TableSync::Replaced {
            rows:     1,
            previous: 1,
        });
        assert!(once.contains("\n  | Repository | Status |"));
        assert!(once.contains("\n  | --- |"));
        assert!(once.contains("\n  | Fresh |"));
        assert!(once.ends_with("|\n\nAfter\n"));
        assert_eq!(once, twice);
    }

    #[test]
    fn blockquoted_table_is_found()
    {
        let document = "> | Repository | Status | Language | Stars | Forks |\n> |---|---|---|---|---|\n> | old | row |\n>\n> Quote continues\n";
        let header = TableHeader {
            include_issues: false,
        };
        let rows = [row("Fresh", StatusLabel::Inactive, false,)];

        let (updated, sync,) = sync_table(document, &header, &rows,);

        assert!(matches!(sync, TableSync::Replaced { rows: 1, previous: 1 }));
        assert!(updated.starts_with("> | Repository |"));
        assert!(updated.contains("\n> | Fresh |"));
        assert!(!updated.contains("old"));
        assert!(updated.ends_with("|\n>\n> Quote continues\n"));
    }

    #[test]
    fn stamps_existing_marker()
    {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 9,).unwrap();
        let document = "Intro\n<!-- LAST_UPDATED:2020-01-01 00:00:00 UTC -->\nOutro\n";

        let stamped = stamp_last_updated(document, now,);
        assert_eq!(stamped, "Intro\n<!-- LAST_UPDATED:2026-10-19 08:05:09 UTC -->\nOutro\n");
        assert_eq!(stamp_last_updated(&stamped, now,), stamped);
    }

    #[test]
    fn stamps_empty_marker_payload()
    {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5,).unwrap();
        let stamped = stamp_last_updated("<!-- LAST_UPDATED:-->", now,);
        assert_eq!(stamped, "<!-- LAST_UPDATED:2026-01-02 03:04:05 UTC -->");
    }

    #[test]
    fn appends_missing_marker()
    {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 9,).unwrap();
        let stamped = stamp_last_updated("# Title\n", now,);
        assert_eq!(stamped, "# Title\n\n\n<!-- LAST_UPDATED:2026-10-19 08:05:09 UTC -->\n");
    }
}
