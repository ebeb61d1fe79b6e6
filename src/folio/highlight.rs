//! Marks the occurrences of a search query inside a line.
//!
//! The query is literal text. It is escaped before it becomes a pattern, so
//! `a.b` matches only `a.b` and `(` is an ordinary character.

use crate::error::{FolioError, Result};
use regex::{Regex, RegexBuilder};

/// A piece of a highlighted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSegment {
    Plain(String),
    Match(String),
}

/// Case-insensitive literal matcher for one query.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new(query: &str) -> Result<Self> {
        if query.is_empty() {
            return Ok(Self { pattern: None });
        }
        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .map_err(|e| FolioError::InvalidInput(format!("unusable query: {}", e)))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(line))
    }

    pub fn segments(&self, line: &str) -> Vec<MatchSegment> {
        let Some(pattern) = &self.pattern else {
            return vec![MatchSegment::Plain(line.to_string())];
        };

        let mut segments = Vec::new();
        let mut last = 0;
        for m in pattern.find_iter(line) {
            if m.start() > last {
                segments.push(MatchSegment::Plain(line[last..m.start()].to_string()));
            }
            segments.push(MatchSegment::Match(m.as_str().to_string()));
            last = m.end();
        }
        if last < line.len() || segments.is_empty() {
            segments.push(MatchSegment::Plain(line[last..].to_string()));
        }
        segments
    }
}

/// One-shot convenience over [`Highlighter`].
pub fn highlight(line: &str, query: &str) -> Result<Vec<MatchSegment>> {
    Ok(Highlighter::new(query)?.segments(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use MatchSegment::{Match, Plain};

    #[test]
    fn test_highlights_all_occurrences_case_insensitively() {
        let segs = highlight("Foo bar foo", "foo").unwrap();
        assert_eq!(
            segs,
            vec![
                Match("Foo".into()),
                Plain(" bar ".into()),
                Match("foo".into())
            ]
        );
    }

    #[test]
    fn test_query_is_literal() {
        let segs = highlight("axb a.b", "a.b").unwrap();
        assert_eq!(segs, vec![Plain("axb ".into()), Match("a.b".into())]);

        let segs = highlight("call f(x) now", "f(x)").unwrap();
        assert_eq!(
            segs,
            vec![
                Plain("call ".into()),
                Match("f(x)".into()),
                Plain(" now".into())
            ]
        );
        assert!(highlight("[unclosed", "[").is_ok());
    }

    #[test]
    fn test_no_match_and_empty_query() {
        assert_eq!(
            highlight("nothing here", "zzz").unwrap(),
            vec![Plain("nothing here".into())]
        );
        assert_eq!(highlight("abc", "").unwrap(), vec![Plain("abc".into())]);
        assert_eq!(highlight("", "x").unwrap(), vec![Plain(String::new())]);
    }

    #[test]
    fn test_is_match() {
        let h = Highlighter::new("*").unwrap();
        assert!(h.is_match("a*b"));
        assert!(!h.is_match("ab"));
        assert!(!Highlighter::new("").unwrap().is_match("ab"));
    }
}
