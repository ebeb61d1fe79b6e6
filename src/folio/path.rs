//! # Path Addresses
//!
//! A [`PathAddress`] locates one node inside a JSON document. The textual form
//! combines object keys and array indexes:
//!
//! ```text
//! server.listeners[2].port
//! .server.listeners[2].port   (leading dot is optional)
//! [0].name                    (root is an array)
//! ""                          (the root itself)
//! ```
//!
//! Segments are typed: `[2]` is always an array index and `.2` is always an
//! object key named `"2"`. Keys that are empty or contain `.`, `[` or `]` are
//! written quoted inside brackets, as a JSON string:
//!
//! ```text
//! ["a.b"].c                   (key "a.b", then key "c")
//! items[0][""]                (an empty key)
//! ```
//!
//! Rendering a parsed address reproduces the same segment sequence, so
//! addresses can be shown to a user, typed back in, and land on the same node.

use crate::error::{FolioError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    pub fn key(key: impl Into<String>) -> Self {
        Segment::Key(key.into())
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    /// Whether the segment can be written without quoting. Keys must be
    /// non-empty and free of the address syntax characters.
    pub fn is_bare(&self) -> bool {
        match self {
            Segment::Key(k) => !k.is_empty() && !k.contains(['.', '[', ']']),
            Segment::Index(_) => true,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) if self.is_bare() => write!(f, ".{}", k),
            Segment::Key(k) => write!(f, "[{}]", quote(k)),
            Segment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathAddress {
    segments: Vec<Segment>,
}

impl PathAddress {
    /// The empty address, pointing at the document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn parse(text: &str) -> Result<Self> {
        parse(text).map(Self::from_segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn render(&self) -> String {
        render(&self.segments)
    }

    /// Appends `extra` below this address.
    pub fn concat(&self, extra: &PathAddress) -> PathAddress {
        let mut segments = self.segments.clone();
        segments.extend(extra.segments.iter().cloned());
        PathAddress { segments }
    }

    pub fn child_key(&self, key: impl Into<String>) -> PathAddress {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.into()));
        PathAddress { segments }
    }

    pub fn child_index(&self, index: usize) -> PathAddress {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        PathAddress { segments }
    }

    /// Splits off the final segment. `None` for the root.
    pub fn parent(&self) -> Option<(PathAddress, &Segment)> {
        let (last, parent) = self.segments.split_last()?;
        Some((
            PathAddress {
                segments: parent.to_vec(),
            },
            last,
        ))
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for PathAddress {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        PathAddress::parse(s)
    }
}

fn malformed(text: &str, reason: &str) -> FolioError {
    FolioError::MalformedPath(format!("'{}': {}", text, reason))
}

fn quote(key: &str) -> String {
    serde_json::Value::String(key.to_string()).to_string()
}

/// Position of the quote closing the JSON string that opens at `open`.
fn closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Parses the textual form into segments.
pub fn parse(text: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    // A bare first key (no leading dot) is allowed.
    let mut expect_key = !chars.is_empty() && chars[0] != '.' && chars[0] != '[';

    while i < chars.len() || expect_key {
        if expect_key {
            let start = i;
            while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                if chars[i] == ']' {
                    return Err(malformed(text, "unbalanced ']'"));
                }
                i += 1;
            }
            if i == start {
                return Err(malformed(text, "empty key"));
            }
            segments.push(Segment::Key(chars[start..i].iter().collect()));
            expect_key = false;
            continue;
        }

        match chars[i] {
            '.' => {
                i += 1;
                expect_key = true;
            }
            '[' if chars.get(i + 1) == Some(&'"') => {
                let open = i + 1;
                let end = closing_quote(&chars, open)
                    .ok_or_else(|| malformed(text, "unterminated quoted key"))?;
                if chars.get(end + 1) != Some(&']') {
                    return Err(malformed(text, "expected ']' after quoted key"));
                }
                let literal: String = chars[open..=end].iter().collect();
                let key: String = serde_json::from_str(&literal)
                    .map_err(|_| malformed(text, "invalid quoted key"))?;
                segments.push(Segment::Key(key));
                i = end + 2;
            }
            '[' => {
                let start = i + 1;
                let close = chars[start..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| start + p)
                    .ok_or_else(|| malformed(text, "unbalanced '['"))?;
                let digits: String = chars[start..close].iter().collect();
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(malformed(text, "array index must be a non-negative integer"));
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| malformed(text, "array index is too large"))?;
                segments.push(Segment::Index(index));
                i = close + 1;
            }
            ']' => return Err(malformed(text, "unbalanced ']'")),
            _ => return Err(malformed(text, "expected '.' or '[' between segments")),
        }
    }

    Ok(segments)
}

/// Renders segments back to text. A bare first key is written without a
/// leading dot.
pub fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Key(k) if i == 0 && segment.is_bare() => out.push_str(k),
            other => out.push_str(&other.to_string()),
        }
    }
    out
}

/// Composes two addresses.
pub fn concat(base: &PathAddress, extra: &PathAddress) -> PathAddress {
    base.concat(extra)
}
