//! Turns store snapshots into display rows.

use chrono::{DateTime, Local, Locale, TimeZone, Utc};
use std::fmt::{Display, Write};

use crate::task::{Task, TaskId};

pub const DEFAULT_DATE_FORMAT: &str = "%x %X";

/// Locale names are looked up in POSIX precedence order.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_TIME", "LANG"];

/// Parses a POSIX locale name such as `de_DE.UTF-8` or `sr_RS@latin`.
pub fn parse_locale(raw: &str) -> Option<Locale> {
    let name = raw.split(['.', '@']).next().unwrap_or_default().trim();
    match name {
        "" => None,
        "C" | "POSIX" => Some(Locale::POSIX),
        _ => Locale::try_from(name).ok(),
    }
}

/// The first non-empty of `LC_ALL`, `LC_TIME` and `LANG` decides the locale.
pub fn locale_from_env<F>(var: F) -> Option<Locale>
where
    F: Fn(&str) -> Option<String>,
{
    LOCALE_VARS
        .iter()
        .filter_map(|key| var(key))
        .find(|value| !value.trim().is_empty())
        .and_then(|value| parse_locale(&value))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub id: TaskId,
    pub task: String,
    pub status: String,
    pub created: String,
    pub completed: String,
}

#[derive(Debug, Clone)]
pub struct RowRenderer {
    date_format: String,
    locale: Option<Locale>,
}

impl Default for RowRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl RowRenderer {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
            locale: None,
        }
    }

    /// Without a locale the pattern is formatted with chrono's defaults.
    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    /// One row per task, in the order received, using the local time zone.
    pub fn render(&self, tasks: &[Task]) -> Vec<TaskRow> {
        self.render_in(tasks, &Local)
    }

    pub fn render_in<Tz>(&self, tasks: &[Task], tz: &Tz) -> Vec<TaskRow>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        tasks
            .iter()
            .map(|t| TaskRow {
                id: t.id.clone(),
                task: t.task.clone(),
                status: t.status.to_string(),
                created: self.format_in(t.created.as_ref(), tz),
                completed: self.format_in(t.completed.as_ref(), tz),
            })
            .collect()
    }

    /// Absent timestamps render as an empty string. A pattern chrono cannot
    /// format, or one that formats to nothing, falls back to RFC 3339.
    pub fn format_in<Tz>(&self, value: Option<&DateTime<Utc>>, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let Some(at) = value else {
            return String::new();
        };
        let local = at.with_timezone(tz);
        let mut out = String::new();
        let written = match self.locale {
            Some(locale) => write!(out, "{}", local.format_localized(&self.date_format, locale)),
            None => write!(out, "{}", local.format(&self.date_format)),
        };
        if written.is_err() || out.trim().is_empty() {
            return local.to_rfc3339();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn task(id: &str, text: &str, completed: Option<DateTime<Utc>>) -> Task {
        Task {
            id: TaskId::from(id),
            task: text.to_string(),
            status: if completed.is_some() {
                TaskStatus::Done
            } else {
                TaskStatus::Pending
            },
            created: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single(),
            completed,
        }
    }

    #[test]
    fn one_row_per_task_in_received_order() {
        let tasks = vec![
            task("c", "zebra", None),
            task("a", "apple", None),
            task("b", "mango", None),
        ];

        let rows = RowRenderer::default().render(&tasks);

        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
        assert_eq!(rows[0].task, "zebra");
    }

    #[test]
    fn empty_input_renders_no_rows() {
        assert!(RowRenderer::default().render(&[]).is_empty());
    }

    #[test]
    fn absent_completed_is_empty_and_present_is_formatted() {
        let finished = Utc.with_ymd_and_hms(2024, 1, 3, 18, 30, 0).unwrap();
        let tasks = vec![task("a", "open", None), task("b", "closed", Some(finished))];

        let rows = RowRenderer::default().render(&tasks);

        assert_eq!(rows[0].completed, "");
        assert!(!rows[1].completed.is_empty());
        assert!(!rows[0].created.is_empty());
        assert_eq!(rows[1].status, "DONE");
    }

    #[test]
    fn formats_with_configured_pattern() {
        let renderer = RowRenderer::new("%Y-%m-%d %H:%M");
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        assert_eq!(renderer.format_in(Some(&at), &Utc), "2024-01-02 03:04");
        assert_eq!(
            RowRenderer::default().format_in(Some(&at), &Utc),
            "01/02/24 03:04:05"
        );
        assert_eq!(renderer.format_in(None, &Utc), "");
    }

    #[test]
    fn absent_created_is_empty() {
        let mut undated = task("a", "undated", None);
        undated.created = None;

        let rows = RowRenderer::default().render(&[undated]);

        assert_eq!(rows[0].created, "");
    }

    #[test]
    fn empty_pattern_still_renders_present_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            RowRenderer::new("").format_in(Some(&at), &Utc),
            "2024-01-02T03:04:05+00:00"
        );
    }

    #[test]
    fn locale_pattern_follows_locale_conventions() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let german = RowRenderer::default().with_locale(parse_locale("de_DE.UTF-8"));

        let text = german.format_in(Some(&at), &Utc);

        assert!(text.contains("02.01.2024"), "got {text:?}");
        assert!(text.contains("03:04:05"), "got {text:?}");
    }

    #[test]
    fn parses_posix_locale_names() {
        assert!(matches!(parse_locale("de_DE.UTF-8"), Some(Locale::de_DE)));
        assert!(matches!(parse_locale("de_DE@euro"), Some(Locale::de_DE)));
        assert!(matches!(parse_locale("C"), Some(Locale::POSIX)));
        assert!(parse_locale("").is_none());
        assert!(parse_locale("xx_NOPE").is_none());
    }

    #[test]
    fn first_non_empty_locale_variable_wins() {
        let env = |key: &str| match key {
            "LC_ALL" => Some(String::new()),
            "LC_TIME" => Some("fr_FR.UTF-8".to_string()),
            "LANG" => Some("de_DE.UTF-8".to_string()),
            _ => None,
        };
        assert!(matches!(locale_from_env(env), Some(Locale::fr_FR)));
        assert!(locale_from_env(|_: &str| None).is_none());
    }

    #[test]
    fn unusable_pattern_falls_back_to_rfc3339() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            RowRenderer::new("%Q").format_in(Some(&at), &Utc),
            "2024-01-02T03:04:05+00:00"
        );
    }
}
