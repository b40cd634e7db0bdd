// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Markdown badge rendering and display formatting.
//!
//! Every function here is pure: values go in, markdown image references or
//! display strings come out. Known languages map to pre-built shields.io
//! badges; everything else falls back to a generated gray badge.

use chrono::{DateTime, Utc};

use crate::status::{StatusLabel, try_parse_github_date};

const SHIELDS_BASE: &str = "https://img.shields.io";

/// Pre-built badges for common ecosystems, keyed by the language name GitHub
/// reports.
const LANGUAGE_BADGES: &[(&str, &str,)] = &[
    (
        "Python",
        "![Python](https://img.shields.io/badge/Python-3776AB?style=flat&logo=python&logoColor=white)",
    ),
    (
        "JavaScript",
        "![JavaScript](https://img.shields.io/badge/JavaScript-F7DF1E?style=flat&logo=javascript&logoColor=black)",
    ),
    (
        "TypeScript",
        "![TypeScript](https://img.shields.io/badge/TypeScript-007ACC?style=flat&logo=typescript&logoColor=white)",
    ),
    (
        "React",
        "![React](https://img.shields.io/badge/React-20232A?style=flat&logo=react&logoColor=61DAFB)",
    ),
    (
        "Next.js",
        "![Next.js](https://img.shields.io/badge/Next.js-000000?style=flat&logo=next.js&logoColor=white)",
    ),
    (
        "Vue.js",
        "![Vue.js](https://img.shields.io/badge/Vue.js-35495E?style=flat&logo=vue.js&logoColor=4FC08D)",
    ),
    (
        "Angular",
        "![Angular](https://img.shields.io/badge/Angular-DD0031?style=flat&logo=angular&logoColor=white)",
    ),
    (
        "Node.js",
        "![Node.js](https://img.shields.io/badge/Node.js-43853D?style=flat&logo=node.js&logoColor=white)",
    ),
    (
        "Java",
        "![Java](https://img.shields.io/badge/Java-ED8B00?style=flat&logo=java&logoColor=white)",
    ),
    (
        "C++",
        "![C++](https://img.shields.io/badge/C++-00599C?style=flat&logo=c%2B%2B&logoColor=white)",
    ),
    (
        "C#",
        "![C#](https://img.shields.io/badge/C%23-239120?style=flat&logo=c-sharp&logoColor=white)",
    ),
    ("Go", "![Go](https://img.shields.io/badge/Go-00ADD8?style=flat&logo=go&logoColor=white)",),
    (
        "Rust",
        "![Rust](https://img.shields.io/badge/Rust-000000?style=flat&logo=rust&logoColor=white)",
    ),
    ("PHP", "![PHP](https://img.shields.io/badge/PHP-777BB4?style=flat&logo=php&logoColor=white)",),
    (
        "Ruby",
        "![Ruby](https://img.shields.io/badge/Ruby-CC342D?style=flat&logo=ruby&logoColor=white)",
    ),
    (
        "Swift",
        "![Swift](https://img.shields.io/badge/Swift-FA7343?style=flat&logo=swift&logoColor=white)",
    ),
    (
        "Kotlin",
        "![Kotlin](https://img.shields.io/badge/Kotlin-0095D5?style=flat&logo=kotlin&logoColor=white)",
    ),
    (
        "Dart",
        "![Dart](https://img.shields.io/badge/Dart-0175C2?style=flat&logo=dart&logoColor=white)",
    ),
    (
        "HTML",
        "![HTML](https://img.shields.io/badge/HTML-E34F26?style=flat&logo=html5&logoColor=white)",
    ),
    ("CSS", "![CSS](https://img.shields.io/badge/CSS-1572B6?style=flat&logo=css3&logoColor=white)",),
    (
        "Shell",
        "![Shell](https://img.shields.io/badge/Shell-4EAA25?style=flat&logo=gnu-bash&logoColor=white)",
    ),
    (
        "Dockerfile",
        "![Docker](https://img.shields.io/badge/Docker-2496ED?style=flat&logo=docker&logoColor=white)",
    ),
];

/// Dynamic repository metrics served by shields.io.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum Metric
{
    Stars,
    Forks,
    Issues,
    LastCommit,
}

impl Metric
{
    fn alt_text(self,) -> &'static str
    {
        match self {
            Metric::Stars => "Stars",
            Metric::Forks => "Forks",
            Metric::Issues => "Issues",
            Metric::LastCommit => "Last Commit",
        }
    }

    fn path(self,) -> &'static str
    {
        match self {
            Metric::Stars => "stars",
            Metric::Forks => "forks",
            Metric::Issues => "issues",
            Metric::LastCommit => "last-commit",
        }
    }
}

/// Renders the badge for a language name.
///
/// # Example
///
/// ```
/// use repostat::language_badge;
///
/// assert!(language_badge("Rust").contains("logo=rust"));
/// assert_eq!(
///     language_badge("Jupyter Notebook"),
///     "![Jupyter Notebook](https://img.shields.io/badge/Jupyter%20Notebook-gray?style=flat)"
/// );
/// ```
pub fn language_badge(language: &str,) -> String
{
    LANGUAGE_BADGES.iter().find(|(name, _,)| *name == language,).map_or_else(
        || {
            format!(
                "![{language}]({SHIELDS_BASE}/badge/{}-gray?style=flat)",
                encode_spaces(language)
            )
        },
        |(_, badge,)| (*badge).to_owned(),
    )
}

/// Color used for a status badge.
pub const fn status_color(status: StatusLabel,) -> &'static str
{
    match status {
        StatusLabel::VeryActive => "brightgreen",
        StatusLabel::Active => "green",
        StatusLabel::Maintained => "yellow",
        StatusLabel::Inactive => "red",
        StatusLabel::Archived => "lightgray",
    }
}

/// Renders the status badge, e.g.
/// `![Very Active](https://img.shields.io/badge/Status-Very%20Active-brightgreen)`.
pub fn status_badge(status: StatusLabel,) -> String
{
    format!(
        "![{label}]({SHIELDS_BASE}/badge/Status-{text}-{color})",
        label = status.label(),
        text = encode_spaces(status.label()),
        color = status_color(status)
    )
}

/// Renders a dynamic shields.io badge for `owner/repository`.
pub fn metric_badge(metric: Metric, owner: &str, repository: &str,) -> String
{
    format!(
        "![{}]({SHIELDS_BASE}/github/{}/{owner}/{repository}?style=flat)",
        metric.alt_text(),
        metric.path()
    )
}

/// Formats counts with `k`/`M` suffixes above one thousand.
///
/// # Example
///
/// ```
/// use repostat::format_number;
///
/// assert_eq!(format_number(999), "999");
/// assert_eq!(format_number(1_000), "1.0k");
/// assert_eq!(format_number(1_500_000), "1.5M");
/// ```
pub fn format_number(value: u64,) -> String
{
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}k", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Renders a timestamp relative to `now`.
///
/// Missing or empty input renders `"Never"`; input that cannot be parsed
/// renders `"Unknown"`. Beyond a year the absolute `YYYY-MM-DD` date is used.
pub fn format_relative_date(value: Option<&str,>, now: DateTime<Utc,>,) -> String
{
    let Some(raw,) = value.map(str::trim,).filter(|raw| !raw.is_empty(),) else {
        return "Never".to_owned();
    };
    let Some(instant,) = try_parse_github_date(raw,) else {
        return "Unknown".to_owned();
    };

    let days = (now.naive_utc() - instant).num_days().max(0,);
    match days {
        0 => "Today".to_owned(),
        1 => "Yesterday".to_owned(),
        2..=6 => format!("{days} days ago"),
        7..=29 => plural(days / 7, "week",),
        30..=364 => plural(days / 30, "month",),
        _ => instant.format("%Y-%m-%d",).to_string(),
    }
}

fn plural(count: i64, unit: &str,) -> String
{
    if count == 1 { format!("1 {unit} ago") } else { format!("{count} {unit}s ago") }
}

fn encode_spaces(value: &str,) -> String
{
    value.replace(' ', "%20",)
}
