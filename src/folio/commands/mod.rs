use crate::config::{FolioConfig, RootDir};
use crate::provider::fs::DirEntry;
use crate::provider::SearchHit;
use serde::Serialize;
use serde_json::Value;

pub mod config;
pub mod edit;
pub mod files;
pub mod list;
pub mod search;
pub mod view;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// The loaded page of an open file, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub path: String,
    pub display_name: String,
    pub page: usize,
    pub total_pages: usize,
    pub total_lines: usize,
    pub file_size: u64,
    /// Absolute line number paired with its text.
    pub lines: Vec<(usize, String)>,
    /// False when the whole file fits on this page.
    pub is_partial: bool,
    /// Line the view should be scrolled to, if any.
    pub focus_line: Option<usize>,
    /// Active search query, for highlighting.
    pub query: Option<String>,
}

/// Hits of the active search and the selected one.
#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub query: String,
    pub hits: Vec<SearchHit>,
    /// Zero-based index of the selected hit.
    pub selected: Option<usize>,
}

impl SearchView {
    /// `(position, total)`, 1-based; `(0, 0)` without hits.
    pub fn info(&self) -> (usize, usize) {
        match self.selected {
            Some(i) => (i + 1, self.hits.len()),
            None => (0, self.hits.len()),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub view: Option<PageView>,
    pub search: Option<SearchView>,
    pub entries: Vec<DirEntry>,
    pub roots: Vec<RootDir>,
    /// Document values with their rendered addresses.
    pub values: Vec<(String, Value)>,
    /// Paths created, changed or removed by the command.
    pub affected_paths: Vec<String>,
    pub config: Option<FolioConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_view(mut self, view: PageView) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_search(mut self, search: SearchView) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_entries(mut self, entries: Vec<DirEntry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_roots(mut self, roots: Vec<RootDir>) -> Self {
        self.roots = roots;
        self
    }

    pub fn with_values(mut self, values: Vec<(String, Value)>) -> Self {
        self.values = values;
        self
    }

    pub fn with_affected_paths(mut self, paths: Vec<String>) -> Self {
        self.affected_paths = paths;
        self
    }

    pub fn with_config(mut self, config: FolioConfig) -> Self {
        self.config = Some(config);
        self
    }
}
