//! Opening files for viewing and moving around in them.
//!
//! Small files are shown whole: below `large_file_threshold` bytes the session
//! is opened with one page holding every line. Larger files use the configured
//! page size and the view is marked partial. The choice is made once, at open.

use crate::commands::{CmdMessage, CmdResult, PageView, SearchView};
use crate::config::FolioConfig;
use crate::error::{FolioError, Result};
use crate::provider::{ContentProvider, SearchProvider};
use crate::session::{HitMove, ViewSession};

/// Where to land when a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewTarget {
    #[default]
    Start,
    Page(usize),
    Line(usize),
}

/// One step of an interactive browse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseAction {
    Show,
    NextPage,
    PreviousPage,
    Page(usize),
    Line(usize),
    Search(String),
    NextHit,
    PreviousHit,
}

/// An open session plus the paging decision made for it.
#[derive(Debug, Clone)]
pub struct OpenFile {
    pub session: ViewSession,
    pub is_partial: bool,
    pub focus_line: Option<usize>,
}

/// Opens `path`, choosing whole-file or paged display from its size.
pub fn open<C: ContentProvider>(content: &C, path: &str, config: &FolioConfig) -> Result<OpenFile> {
    let stat = content.stat(path)?;
    let is_partial = stat.file_size >= config.large_file_threshold;
    let page_size = if is_partial {
        config.page_size
    } else {
        stat.total_line_count.max(1)
    };
    tracing::debug!(path, size = stat.file_size, is_partial, page_size, "opening for view");

    let session = ViewSession::opened(content, path, page_size)?;
    Ok(OpenFile {
        session,
        is_partial,
        focus_line: None,
    })
}

impl OpenFile {
    pub fn page_view(&self) -> PageView {
        let s = &self.session;
        PageView {
            path: s.file_path().to_string(),
            display_name: s.display_name().to_string(),
            page: s.current_page(),
            total_pages: s.total_pages(),
            total_lines: s.total_lines(),
            file_size: s.file_size(),
            lines: s
                .numbered_lines()
                .map(|(n, l)| (n, l.to_string()))
                .collect(),
            is_partial: self.is_partial,
            focus_line: self.focus_line,
            query: s.query().map(str::to_string),
        }
    }

    pub fn search_view(&self) -> Option<SearchView> {
        let query = self.session.query()?;
        let navigator = self.session.navigator();
        Some(SearchView {
            query: query.to_string(),
            hits: navigator.hits().to_vec(),
            selected: navigator.cursor(),
        })
    }

    /// The current state as a command result.
    pub fn result(&self) -> CmdResult {
        let result = CmdResult::default().with_view(self.page_view());
        match self.search_view() {
            Some(search) => result.with_search(search),
            None => result,
        }
    }

    fn focus(&mut self, moved: Option<HitMove>) {
        if let Some(moved) = moved {
            self.focus_line = Some(moved.scroll.line());
        }
    }
}

pub fn run<C: ContentProvider>(
    content: &C,
    path: &str,
    config: &FolioConfig,
    target: ViewTarget,
) -> Result<CmdResult> {
    let mut file = open(content, path, config)?;
    match target {
        ViewTarget::Start => {}
        ViewTarget::Page(page) => file.session.go_to_page(content, page)?,
        ViewTarget::Line(line) => {
            let scroll = file.session.go_to_line(content, line)?;
            file.focus_line = Some(scroll.line());
        }
    }
    Ok(file.result())
}

/// Applies one browse action to an open file.
///
/// A failed page load leaves the file where it was and is reported as a
/// warning. Other errors propagate.
pub fn step<C, S>(content: &C, searcher: &S, file: &mut OpenFile, action: BrowseAction) -> Result<CmdResult>
where
    C: ContentProvider,
    S: SearchProvider,
{
    match apply(content, searcher, file, &action) {
        Ok(mut messages) => {
            let mut result = file.result();
            result.messages.append(&mut messages);
            Ok(result)
        }
        Err(e) if e.is_transient() => {
            let mut result = file.result();
            result.add_message(CmdMessage::warning(format!(
                "{}; still on page {}",
                e,
                file.session.current_page()
            )));
            Ok(result)
        }
        Err(e) => Err(e),
    }
}

fn apply<C, S>(content: &C, searcher: &S, file: &mut OpenFile, action: &BrowseAction) -> Result<Vec<CmdMessage>>
where
    C: ContentProvider,
    S: SearchProvider,
{
    let mut messages = Vec::new();
    match action {
        BrowseAction::Show => {}
        BrowseAction::NextPage => {
            file.session.next_page(content)?;
            file.focus_line = None;
        }
        BrowseAction::PreviousPage => {
            file.session.previous_page(content)?;
            file.focus_line = None;
        }
        BrowseAction::Page(page) => {
            file.session.go_to_page(content, *page)?;
            file.focus_line = None;
        }
        BrowseAction::Line(line) => {
            let scroll = file.session.go_to_line(content, *line)?;
            file.focus_line = Some(scroll.line());
        }
        BrowseAction::Search(query) => {
            if query.is_empty() {
                return Err(FolioError::InvalidInput("empty search query".to_string()));
            }
            let moved = file.session.search(content, searcher, query)?;
            if moved.is_none() {
                messages.push(CmdMessage::info(format!("No matches for '{}'", query)));
            }
            file.focus(moved);
        }
        BrowseAction::NextHit | BrowseAction::PreviousHit => {
            if file.session.navigator().is_empty() {
                messages.push(CmdMessage::info("No active search"));
                return Ok(messages);
            }
            let moved = if *action == BrowseAction::NextHit {
                file.session.next_hit(content)?
            } else {
                file.session.previous_hit(content)?
            };
            if moved.is_none() {
                let edge = if *action == BrowseAction::NextHit { "last" } else { "first" };
                messages.push(CmdMessage::info(format!("Already at the {} match", edge)));
            }
            file.focus(moved);
        }
    }
    Ok(messages)
}
