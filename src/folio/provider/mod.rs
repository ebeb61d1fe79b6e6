//! # Providers
//!
//! The view engine never reads files itself. It talks to three capabilities:
//!
//! - [`ContentProvider`]: serves one fixed-size page of lines for a file.
//! - [`SearchProvider`]: returns every match of a query in a file, each tagged
//!   with its absolute line and the page that holds it.
//! - [`PersistenceProvider`]: replaces a file's full text, atomically.
//!
//! ## Implementations
//!
//! - [`fs::FsProvider`]: production provider rooted at a directory. Paths are
//!   resolved relative to the root and may not escape it.
//! - [`memory::InMemoryProvider`]: in-memory files for tests, with switches to
//!   simulate transient fetch failures.
//!
//! ## Contract
//!
//! Pages are stable: two `fetch_page` calls with identical arguments against
//! an unmodified file return identical lines. A query with no matches is an
//! empty vector, not an error. Missing files are `NotFound`, binary content is
//! `NotText`, and I/O trouble while reading is `FetchFailed`.

use crate::error::Result;
use crate::paging;
use serde::Serialize;

pub mod fs;
pub mod memory;

/// One page of a file plus the file facts the session needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContent {
    pub lines: Vec<String>,
    pub total_line_count: usize,
    pub file_size: u64,
    pub display_name: String,
}

/// File facts without any line content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStat {
    pub total_line_count: usize,
    pub file_size: u64,
    pub display_name: String,
}

/// One search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Absolute, 1-based line number.
    pub line_number: usize,
    /// Page that contains the line, for the page size the search ran with.
    pub page: usize,
    pub matched_text: String,
}

impl SearchHit {
    pub fn new(line_number: usize, page_size: usize, matched_text: impl Into<String>) -> Result<Self> {
        Ok(Self {
            line_number,
            page: paging::page_of(line_number, page_size)?,
            matched_text: matched_text.into(),
        })
    }
}

pub trait ContentProvider {
    /// Fetch page `page` (1-based) of `path` using `page_size` lines per page.
    fn fetch_page(&self, path: &str, page: usize, page_size: usize) -> Result<PageContent>;

    /// Line count, size and name of `path`.
    fn stat(&self, path: &str) -> Result<FileStat> {
        let page = self.fetch_page(path, 1, 1)?;
        Ok(FileStat {
            total_line_count: page.total_line_count,
            file_size: page.file_size,
            display_name: page.display_name,
        })
    }
}

pub trait SearchProvider {
    /// All lines of `path` containing `query`, ascending by line number.
    fn search(&self, path: &str, query: &str, page_size: usize) -> Result<Vec<SearchHit>>;
}

pub trait PersistenceProvider {
    /// Replace the whole content of `path`. Either all of `text` lands or
    /// nothing changes.
    fn save(&mut self, path: &str, text: &str) -> Result<()>;
}

/// Case-insensitive literal containment, shared by the providers.
pub(crate) fn line_matches(line: &str, query_lower: &str) -> bool {
    line.to_lowercase().contains(query_lower)
}

/// Splits text into lines the way every provider numbers them: `\n` and
/// `\r\n` terminators are stripped and a trailing newline adds no line.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
