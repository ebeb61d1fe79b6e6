//! # Rendering Module
//!
//! Turns command results into terminal text. Layout math (gutters, widths,
//! truncation) is Unicode-aware. Every renderer takes `use_color` so tests can
//! check plain output; the handlers pass the terminal's answer.

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use folio::commands::{CmdMessage, MessageLevel, PageView, SearchView};
use folio::config::{FolioConfig, RootDir};
use folio::highlight::{Highlighter, MatchSegment};
use folio::provider::fs::DirEntry;
use serde_json::Value;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TIME_WIDTH: usize = 14;
const SIZE_WIDTH: usize = 9;
const FOCUS_MARKER: &str = "›";

fn paint(text: &str, use_color: bool, style: fn(&str) -> ColoredString) -> String {
    if use_color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// Terminal width, if stdout is a terminal.
pub(super) fn terminal_width() -> Option<usize> {
    console::Term::stdout()
        .size_checked()
        .map(|(_rows, cols)| cols as usize)
}

pub(super) fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

pub(super) fn render_page_header(view: &PageView, use_color: bool) -> String {
    let name = paint(&view.display_name, use_color, |s| s.bold());
    let position = if view.is_partial {
        format!(
            "page {}/{} · {} lines · {}",
            view.page,
            view.total_pages,
            view.total_lines,
            format_size(view.file_size)
        )
    } else {
        format!("{} lines · {}", view.total_lines, format_size(view.file_size))
    };
    format!("{}  {}\n", name, paint(&position, use_color, |s| s.dimmed()))
}

/// Renders the loaded page with a line-number gutter. Matches of the active
/// query are highlighted and the focus line is marked.
pub(super) fn render_page(
    view: &PageView,
    highlight: bool,
    width: Option<usize>,
    use_color: bool,
) -> String {
    let mut out = render_page_header(view, use_color);
    if view.lines.is_empty() {
        out.push_str(&paint("(empty)", use_color, |s| s.dimmed()));
        out.push('\n');
        return out;
    }

    let highlighter = match (&view.query, highlight) {
        (Some(q), true) => Highlighter::new(q).ok(),
        _ => None,
    };
    let last = view.lines.last().map(|(n, _)| *n).unwrap_or(1);
    let gutter = last.to_string().len();

    for (number, text) in &view.lines {
        let focused = view.focus_line == Some(*number);
        let marker = if focused { FOCUS_MARKER } else { " " };
        let num = format!("{:>gutter$}", number, gutter = gutter);
        let num = if focused {
            paint(&num, use_color, |s| s.yellow())
        } else {
            paint(&num, use_color, |s| s.dimmed())
        };

        let room = width.map(|w| w.saturating_sub(gutter + 3));
        let text = match room {
            Some(room) => truncate_to_width(text, room),
            None => text.clone(),
        };
        let body = match &highlighter {
            Some(h) => h
                .segments(&text)
                .into_iter()
                .map(|seg| match seg {
                    MatchSegment::Plain(s) => s,
                    MatchSegment::Match(s) => paint(&s, use_color, |s| s.black().on_yellow()),
                })
                .collect::<String>(),
            None => text,
        };
        out.push_str(&format!("{}{} {}\n", marker, num, body));
    }
    out
}

pub(super) fn render_search_status(search: &SearchView, use_color: bool) -> String {
    let (position, total) = search.info();
    if total == 0 {
        return String::new();
    }
    let line = search
        .selected
        .and_then(|i| search.hits.get(i))
        .map(|h| format!(" at line {}", h.line_number))
        .unwrap_or_default();
    let status = format!("match {}/{}{} for '{}'", position, total, line, search.query);
    format!("{}\n", paint(&status, use_color, |s| s.cyan()))
}

pub(super) fn render_entries(entries: &[DirEntry], use_color: bool) -> String {
    if entries.is_empty() {
        return "Empty directory.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let size = if entry.is_dir {
            format!("{:>w$}", "-", w = SIZE_WIDTH)
        } else {
            format!("{:>w$}", format_size(entry.size), w = SIZE_WIDTH)
        };
        let time = entry
            .modified
            .map(format_time_ago)
            .unwrap_or_else(|| " ".repeat(TIME_WIDTH));
        let name = if entry.is_dir {
            paint(&format!("{}/", entry.name), use_color, |s| s.blue().bold())
        } else {
            entry.name.clone()
        };
        out.push_str(&format!(
            "{} {}  {}\n",
            paint(&size, use_color, |s| s.dimmed()),
            paint(&time, use_color, |s| s.dimmed()),
            name
        ));
    }
    out
}

pub(super) fn render_roots(roots: &[RootDir], use_color: bool) -> String {
    let name_width = roots.iter().map(|r| r.name.width()).max().unwrap_or(0);
    roots
        .iter()
        .enumerate()
        .map(|(i, root)| {
            let pad = " ".repeat(name_width - root.name.width());
            format!(
                "{} {}{}  {}\n",
                paint(&format!("{}.", i), use_color, |s| s.yellow()),
                root.name,
                pad,
                paint(&root.path, use_color, |s| s.dimmed())
            )
        })
        .collect()
}

/// One value per line as `path = json`; a lone value prints as pretty JSON.
pub(super) fn render_values(values: &[(String, Value)], use_color: bool) -> String {
    if let [(_, value)] = values {
        if value.is_object() || value.is_array() {
            return format!("{}\n", serde_json::to_string_pretty(value).unwrap_or_default());
        }
    }
    values
        .iter()
        .map(|(path, value)| {
            format!(
                "{} = {}\n",
                paint(path, use_color, |s| s.cyan()),
                serde_json::to_string(value).unwrap_or_default()
            )
        })
        .collect()
}

pub(super) fn render_config(config: &FolioConfig) -> String {
    let mut out = String::new();
    for key in ["page_size", "large_file_threshold", "highlight", "roots"] {
        if let Some(value) = config.get(key) {
            out.push_str(&format!("{} = {}\n", key, value));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(lines: &[(usize, &str)]) -> PageView {
        PageView {
            path: "big.log".into(),
            display_name: "big.log".into(),
            page: 2,
            total_pages: 3,
            total_lines: 2500,
            file_size: 20_000,
            lines: lines.iter().map(|(n, s)| (*n, s.to_string())).collect(),
            is_partial: true,
            focus_line: None,
            query: None,
        }
    }

    #[test]
    fn test_page_header_and_gutter() {
        let out = render_page(&view(&[(999, "a"), (1000, "b")]), true, None, false);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "big.log  page 2/3 · 2500 lines · 19.5 KB");
        assert_eq!(lines[1], "  999 a");
        assert_eq!(lines[2], " 1000 b");
    }

    #[test]
    fn test_focus_marker() {
        let mut v = view(&[(1, "x"), (2, "y")]);
        v.focus_line = Some(2);
        let out = render_page(&v, true, None, false);
        assert!(out.lines().nth(2).unwrap().starts_with(FOCUS_MARKER));
    }

    #[test]
    fn test_truncates_to_width() {
        let out = render_page(&view(&[(1, "abcdefghij")]), true, Some(8), false);
        assert_eq!(out.lines().nth(1).unwrap(), " 1 abc…");
    }

    #[test]
    fn test_whole_file_header() {
        let mut v = view(&[]);
        v.is_partial = false;
        let out = render_page(&v, true, None, false);
        assert_eq!(out, "big.log  2500 lines · 19.5 KB\n(empty)\n");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10.0 MB");
    }

    #[test]
    fn test_search_status() {
        let search = SearchView {
            query: "foo".into(),
            hits: vec![folio::provider::SearchHit::new(1200, 1000, "foo").unwrap()],
            selected: Some(0),
        };
        assert_eq!(
            render_search_status(&search, false),
            "match 1/1 at line 1200 for 'foo'\n"
        );
    }

    #[test]
    fn test_values() {
        let out = render_values(
            &[("a".into(), json!(1)), ("b[0]".into(), json!("x"))],
            false,
        );
        assert_eq!(out, "a = 1\nb[0] = \"x\"\n");
        let out = render_values(&[("<root>".into(), json!({"k": true}))], false);
        assert_eq!(out, "{\n  \"k\": true\n}\n");
    }

    #[test]
    fn test_roots_alignment() {
        let roots = vec![
            RootDir {
                name: "default".into(),
                path: ".".into(),
            },
            RootDir {
                name: "logs".into(),
                path: "/var/log".into(),
            },
        ];
        assert_eq!(
            render_roots(&roots, false),
            "0. default  .\n1. logs     /var/log\n"
        );
    }
}
