//! # View Sessions
//!
//! A [`ViewSession`] is the live state of one open file: which page is loaded,
//! how many pages there are, and the active search. Every operation receives
//! the providers it needs as arguments; the session holds no I/O handles.
//!
//! ## States
//!
//! ```text
//!            open ok              page ok
//! Closed ───────────► Ready ◄──────────────┐
//!   ▲   ◄──── open failed                  │
//!   │                   │ page request     │
//!   │ close             ▼                  │
//!   └────────────── Loading ───────────────┘
//!                       │ page failed: back to Ready, nothing changed
//! ```
//!
//! A session is never left in `Loading`. A failed fetch restores the last good
//! state: same page, same lines, same hits.
//!
//! ## Scroll ordering
//!
//! [`ViewSession::go_to_line`] returns a [`ScrollAction`]. `ScrollOnly` means
//! the line is already on the loaded page. `ScrollAfterLoad` means the page was
//! replaced and the caller must render the new lines before scrolling.
//!
//! ## Asynchronous fetches
//!
//! Callers that fetch pages off the UI thread use
//! [`begin_page_request`](ViewSession::begin_page_request) and
//! [`complete_page_request`](ViewSession::complete_page_request). Each request
//! gets a ticket; starting a new request supersedes the old one, and a
//! superseded ticket's response is rejected with `StaleResponse`.

use crate::error::{FolioError, Result};
use crate::highlight::Highlighter;
use crate::navigator::{SearchNavigator, Selection};
use crate::paging;
use crate::provider::{ContentProvider, PageContent, SearchProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Loading,
    Ready,
}

/// What the caller does after a line jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAction {
    /// The line is on the loaded page.
    ScrollOnly { line: usize, offset: usize },
    /// `page` was just loaded; scroll once its lines are rendered.
    ScrollAfterLoad {
        line: usize,
        page: usize,
        offset: usize,
    },
}

impl ScrollAction {
    pub fn line(&self) -> usize {
        match self {
            ScrollAction::ScrollOnly { line, .. } | ScrollAction::ScrollAfterLoad { line, .. } => {
                *line
            }
        }
    }

    /// Zero-based index into the loaded page's lines.
    pub fn offset(&self) -> usize {
        match self {
            ScrollAction::ScrollOnly { offset, .. }
            | ScrollAction::ScrollAfterLoad { offset, .. } => *offset,
        }
    }

    pub fn loaded_page(&self) -> bool {
        matches!(self, ScrollAction::ScrollAfterLoad { .. })
    }
}

/// Handle for one outstanding page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    pub page: usize,
    generation: u64,
}

/// A hit selection together with the scroll it caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitMove {
    pub selection: Selection,
    pub scroll: ScrollAction,
}

#[derive(Debug, Clone)]
pub struct ViewSession {
    state: SessionState,
    file_path: String,
    display_name: String,
    page_size: usize,
    current_page: usize,
    total_pages: usize,
    total_lines: usize,
    file_size: u64,
    lines: Vec<String>,
    navigator: SearchNavigator,
    query: Option<String>,
    generation: u64,
    pending: Option<PageTicket>,
}

impl Default for ViewSession {
    fn default() -> Self {
        Self {
            state: SessionState::Closed,
            file_path: String::new(),
            display_name: String::new(),
            page_size: paging::DEFAULT_PAGE_SIZE,
            current_page: 0,
            total_pages: 0,
            total_lines: 0,
            file_size: 0,
            lines: Vec::new(),
            navigator: SearchNavigator::new(),
            query: None,
            generation: 0,
            pending: None,
        }
    }
}

impl ViewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session with `path` already open.
    pub fn opened<C: ContentProvider>(content: &C, path: &str, page_size: usize) -> Result<Self> {
        let mut session = Self::new();
        session.open(content, path, page_size)?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Lines of the loaded page.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines of the loaded page paired with their absolute line numbers.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        let first = (self.current_page.max(1) - 1) * self.page_size + 1;
        self.lines
            .iter()
            .enumerate()
            .map(move |(i, l)| (first + i, l.as_str()))
    }

    pub fn navigator(&self) -> &SearchNavigator {
        &self.navigator
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Matcher for the active query; matches nothing when there is none.
    pub fn highlighter(&self) -> Result<Highlighter> {
        Highlighter::new(self.query.as_deref().unwrap_or(""))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Err(FolioError::InvalidInput("no file is open".to_string()));
        }
        Ok(())
    }

    fn check_page(&self, page: usize) -> Result<()> {
        if page < 1 || page > self.total_pages {
            return Err(FolioError::OutOfRange(format!(
                "page {} is outside 1..={}",
                page, self.total_pages
            )));
        }
        Ok(())
    }

    /// Opens `path` on page 1. Any previous file and search are dropped on
    /// success; on failure the session is left as it was.
    pub fn open<C: ContentProvider>(&mut self, content: &C, path: &str, page_size: usize) -> Result<()> {
        paging::total_pages(0, page_size)?;

        let prior = self.state;
        self.state = SessionState::Loading;
        self.generation += 1;
        self.pending = None;
        tracing::debug!(path, page_size, "opening file");

        match content.fetch_page(path, 1, page_size) {
            Ok(page) => {
                self.file_path = path.to_string();
                self.page_size = page_size;
                self.navigator.clear();
                self.query = None;
                self.apply_page(1, page)?;
                Ok(())
            }
            Err(e) => {
                self.state = prior;
                tracing::debug!(path, error = %e, "open failed");
                Err(e)
            }
        }
    }

    fn apply_page(&mut self, page: usize, content: PageContent) -> Result<()> {
        self.total_pages = paging::total_pages(content.total_line_count, self.page_size)?;
        self.total_lines = content.total_line_count;
        self.file_size = content.file_size;
        self.display_name = content.display_name;
        self.lines = content.lines;
        self.current_page = page;
        self.pending = None;
        self.state = SessionState::Ready;
        tracing::debug!(
            path = %self.file_path,
            page,
            total_pages = self.total_pages,
            "page ready"
        );
        Ok(())
    }

    /// Validates `page` and marks the session `Loading`. A request already
    /// in flight is superseded.
    pub fn begin_page_request(&mut self, page: usize) -> Result<PageTicket> {
        self.ensure_open()?;
        self.check_page(page)?;
        self.generation += 1;
        let ticket = PageTicket {
            page,
            generation: self.generation,
        };
        self.pending = Some(ticket);
        self.state = SessionState::Loading;
        Ok(ticket)
    }

    /// Applies a fetched page if `ticket` is still the current request.
    pub fn complete_page_request(&mut self, ticket: PageTicket, content: PageContent) -> Result<()> {
        if self.pending != Some(ticket) {
            tracing::debug!(page = ticket.page, "dropping stale page response");
            return Err(FolioError::StaleResponse {
                page: ticket.page,
                generation: ticket.generation,
            });
        }
        self.apply_page(ticket.page, content)
    }

    /// Abandons `ticket` after a failed fetch and returns to the last good
    /// page. Superseded tickets are ignored.
    pub fn fail_page_request(&mut self, ticket: PageTicket) {
        if self.pending == Some(ticket) {
            self.pending = None;
            self.state = SessionState::Ready;
        }
    }

    pub fn go_to_page<C: ContentProvider>(&mut self, content: &C, page: usize) -> Result<()> {
        let ticket = self.begin_page_request(page)?;
        match content.fetch_page(&self.file_path, page, self.page_size) {
            Ok(fetched) => self.complete_page_request(ticket, fetched),
            Err(e) => {
                self.fail_page_request(ticket);
                tracing::warn!(path = %self.file_path, page, error = %e, "page fetch failed");
                Err(e)
            }
        }
    }

    pub fn next_page<C: ContentProvider>(&mut self, content: &C) -> Result<()> {
        self.go_to_page(content, self.current_page + 1)
    }

    pub fn previous_page<C: ContentProvider>(&mut self, content: &C) -> Result<()> {
        self.go_to_page(content, self.current_page.saturating_sub(1))
    }

    /// Makes `line` visible, loading its page first when needed.
    pub fn go_to_line<C: ContentProvider>(&mut self, content: &C, line: usize) -> Result<ScrollAction> {
        self.ensure_open()?;
        let page = paging::page_of(line, self.page_size)?;
        let offset = paging::line_within_page(line, self.page_size)?;
        if line > self.total_lines {
            return Err(FolioError::OutOfRange(format!(
                "line {} is past the end of the file ({} lines)",
                line, self.total_lines
            )));
        }

        if page == self.current_page {
            return Ok(ScrollAction::ScrollOnly { line, offset });
        }
        self.go_to_page(content, page)?;
        Ok(ScrollAction::ScrollAfterLoad { line, page, offset })
    }

    /// Runs `query` and jumps to the first hit. `None` when nothing matched.
    /// If the first hit's page cannot be loaded, the previous search stays
    /// active.
    pub fn search<C, S>(&mut self, content: &C, searcher: &S, query: &str) -> Result<Option<HitMove>>
    where
        C: ContentProvider,
        S: SearchProvider,
    {
        self.ensure_open()?;
        let hits = searcher.search(&self.file_path, query, self.page_size)?;
        tracing::debug!(path = %self.file_path, query, hits = hits.len(), "search loaded");
        let mut navigator = SearchNavigator::new();
        navigator.load(hits);
        let previous_navigator = std::mem::replace(&mut self.navigator, navigator);
        let previous_query = self.query.replace(query.to_string());

        if self.navigator.is_empty() {
            return Ok(None);
        }
        match self.select_hit(content, 0) {
            Ok(moved) => Ok(Some(moved)),
            Err(e) => {
                self.navigator = previous_navigator;
                self.query = previous_query;
                Err(e)
            }
        }
    }

    pub fn select_hit<C: ContentProvider>(&mut self, content: &C, index: usize) -> Result<HitMove> {
        let before = self.navigator.cursor();
        let selection = self.navigator.select(index, self.current_page)?;
        self.follow(content, selection, before)
    }

    /// Moves to the next hit; `None` at the last one.
    pub fn next_hit<C: ContentProvider>(&mut self, content: &C) -> Result<Option<HitMove>> {
        let before = self.navigator.cursor();
        match self.navigator.next(self.current_page) {
            Some(selection) => self.follow(content, selection, before).map(Some),
            None => Ok(None),
        }
    }

    /// Moves to the previous hit; `None` at the first one.
    pub fn previous_hit<C: ContentProvider>(&mut self, content: &C) -> Result<Option<HitMove>> {
        let before = self.navigator.cursor();
        match self.navigator.previous(self.current_page) {
            Some(selection) => self.follow(content, selection, before).map(Some),
            None => Ok(None),
        }
    }

    fn follow<C: ContentProvider>(
        &mut self,
        content: &C,
        selection: Selection,
        before: Option<usize>,
    ) -> Result<HitMove> {
        match self.go_to_line(content, selection.hit.line_number) {
            Ok(scroll) => Ok(HitMove { selection, scroll }),
            Err(e) => {
                self.navigator.restore_cursor(before);
                Err(e)
            }
        }
    }

    /// Drops the hit list after the file was modified.
    pub fn invalidate_hits(&mut self) {
        self.navigator.clear();
        self.query = None;
    }

    pub fn close(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
    }
}
