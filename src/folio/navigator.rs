//! # Search Navigator
//!
//! Holds the hits of the active search and a cursor into them. The navigator
//! knows nothing about fetching; it only answers one question for every move:
//! is the selected hit on the page that is already loaded?
//!
//! - `same_page == true`: the caller scrolls to the line, nothing is fetched.
//! - `same_page == false`: the caller must load `hit.page` first.
//!
//! Movement is clamped at both ends. `next` on the last hit and `previous` on
//! the first one do nothing.

use crate::error::{FolioError, Result};
use crate::provider::SearchHit;

/// Result of moving the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub hit: SearchHit,
    pub same_page: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SearchNavigator {
    hits: Vec<SearchHit>,
    cursor: Option<usize>,
}

impl SearchNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the hit list. A non-empty list starts with its first hit
    /// selected.
    pub fn load(&mut self, hits: Vec<SearchHit>) {
        self.hits = hits;
        self.cursor = if self.hits.is_empty() { None } else { Some(0) };
    }

    pub fn clear(&mut self) {
        self.hits.clear();
        self.cursor = None;
    }

    pub fn hits(&self) -> &[SearchHit] {
        &self.hits
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&SearchHit> {
        self.cursor.and_then(|i| self.hits.get(i))
    }

    /// Puts the cursor back after a move whose page load failed.
    pub(crate) fn restore_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor.filter(|&i| i < self.hits.len());
    }

    pub fn select(&mut self, index: usize, current_page: usize) -> Result<Selection> {
        let hit = self.hits.get(index).cloned().ok_or_else(|| {
            FolioError::OutOfRange(format!(
                "hit {} does not exist ({} hits)",
                index + 1,
                self.hits.len()
            ))
        })?;
        self.cursor = Some(index);
        Ok(Selection {
            index,
            same_page: hit.page == current_page,
            hit,
        })
    }

    /// Moves to the following hit; `None` when already on the last one.
    pub fn next(&mut self, current_page: usize) -> Option<Selection> {
        let target = match self.cursor {
            Some(i) if i + 1 < self.hits.len() => i + 1,
            None if !self.hits.is_empty() => 0,
            _ => return None,
        };
        self.select(target, current_page).ok()
    }

    /// Moves to the preceding hit; `None` when already on the first one.
    pub fn previous(&mut self, current_page: usize) -> Option<Selection> {
        let target = match self.cursor {
            Some(i) if i > 0 => i - 1,
            _ => return None,
        };
        self.select(target, current_page).ok()
    }

    /// `(position, total)` for display, 1-based; `(0, 0)` when empty.
    pub fn info(&self) -> (usize, usize) {
        match self.cursor {
            Some(i) if !self.hits.is_empty() => (i + 1, self.hits.len()),
            _ => (0, self.hits.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(line: usize, page: usize) -> SearchHit {
        SearchHit {
            line_number: line,
            page,
            matched_text: format!("foo at {}", line),
        }
    }

    fn loaded() -> SearchNavigator {
        let mut nav = SearchNavigator::new();
        nav.load(vec![hit(5, 1), hit(1200, 2), hit(1300, 2)]);
        nav
    }

    #[test]
    fn test_empty_load() {
        let mut nav = SearchNavigator::new();
        nav.load(vec![]);
        assert_eq!(nav.cursor(), None);
        assert_eq!(nav.info(), (0, 0));
        assert!(nav.next(1).is_none());
        assert!(nav.previous(1).is_none());
        assert_eq!(nav.cursor(), None);
        assert_eq!(nav.info(), (0, 0));
    }

    #[test]
    fn test_load_selects_first() {
        let nav = loaded();
        assert_eq!(nav.cursor(), Some(0));
        assert_eq!(nav.current().unwrap().line_number, 5);
        assert_eq!(nav.info(), (1, 3));
    }

    #[test]
    fn test_select_reports_same_page() {
        let mut nav = loaded();
        let sel = nav.select(0, 1).unwrap();
        assert!(sel.same_page);
        let sel = nav.next(1).unwrap();
        assert_eq!(sel.hit.line_number, 1200);
        assert!(!sel.same_page);
        let sel = nav.next(2).unwrap();
        assert!(sel.same_page);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut nav = loaded();
        assert!(matches!(nav.select(3, 1), Err(FolioError::OutOfRange(_))));
        assert_eq!(nav.cursor(), Some(0));
    }

    #[test]
    fn test_boundaries_clamp() {
        let mut nav = loaded();
        assert!(nav.previous(1).is_none());
        assert_eq!(nav.cursor(), Some(0));

        nav.select(2, 2).unwrap();
        assert!(nav.next(2).is_none());
        assert_eq!(nav.cursor(), Some(2));
        assert_eq!(nav.info(), (3, 3));

        let sel = nav.previous(2).unwrap();
        assert_eq!(sel.index, 1);
    }

    #[test]
    fn test_reload_resets_cursor() {
        let mut nav = loaded();
        nav.select(2, 2).unwrap();
        nav.load(vec![hit(9, 1)]);
        assert_eq!(nav.cursor(), Some(0));
        nav.clear();
        assert_eq!(nav.info(), (0, 0));
    }
}
