use super::{
    line_matches, split_lines, ContentProvider, FileStat, PageContent, PersistenceProvider,
    SearchHit, SearchProvider,
};
use crate::error::{FolioError, Result};
use crate::paging;
use std::cell::Cell;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct MemFile {
    lines: Vec<String>,
    size: u64,
    binary: bool,
}

/// In-memory provider for tests and development.
/// Does NOT persist data.
///
/// Uses `Cell` for the failure switches and counters since folio is
/// single-threaded and the read traits take `&self`.
#[derive(Default)]
pub struct InMemoryProvider {
    files: HashMap<String, MemFile>,
    failing_fetches: Cell<usize>,
    fetch_count: Cell<usize>,
    simulate_save_error: bool,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_text(&mut self, path: &str, text: &str) {
        self.files.insert(
            path.to_string(),
            MemFile {
                lines: split_lines(text),
                size: text.len() as u64,
                binary: false,
            },
        );
    }

    pub fn insert_binary(&mut self, path: &str, size: u64) {
        self.files.insert(
            path.to_string(),
            MemFile {
                lines: Vec::new(),
                size,
                binary: true,
            },
        );
    }

    /// The next `count` page fetches fail with `FetchFailed`.
    pub fn fail_next_fetches(&self, count: usize) {
        self.failing_fetches.set(count);
    }

    pub fn set_simulate_save_error(&mut self, simulate: bool) {
        self.simulate_save_error = simulate;
    }

    /// Number of successful page fetches so far.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.get()
    }

    pub fn text(&self, path: &str) -> Option<String> {
        self.files.get(path).map(|f| f.lines.join("\n"))
    }

    fn file(&self, path: &str) -> Result<&MemFile> {
        let file = self
            .files
            .get(path)
            .ok_or_else(|| FolioError::NotFound(path.to_string()))?;
        if file.binary {
            return Err(FolioError::NotText(path.to_string()));
        }
        Ok(file)
    }
}

fn display_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

impl ContentProvider for InMemoryProvider {
    fn fetch_page(&self, path: &str, page: usize, page_size: usize) -> Result<PageContent> {
        let file = self.file(path)?;

        let failing = self.failing_fetches.get();
        if failing > 0 {
            self.failing_fetches.set(failing - 1);
            return Err(FolioError::FetchFailed(format!(
                "simulated fetch failure for {}",
                path
            )));
        }

        let start = paging::first_line_of(page, page_size)? - 1;
        let lines = file
            .lines
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        self.fetch_count.set(self.fetch_count.get() + 1);
        Ok(PageContent {
            lines,
            total_line_count: file.lines.len(),
            file_size: file.size,
            display_name: display_name(path),
        })
    }

    fn stat(&self, path: &str) -> Result<FileStat> {
        let file = self.file(path)?;
        Ok(FileStat {
            total_line_count: file.lines.len(),
            file_size: file.size,
            display_name: display_name(path),
        })
    }
}

impl SearchProvider for InMemoryProvider {
    fn search(&self, path: &str, query: &str, page_size: usize) -> Result<Vec<SearchHit>> {
        let file = self.file(path)?;
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let query_lower = query.to_lowercase();
        file.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line_matches(line, &query_lower))
            .map(|(i, line)| SearchHit::new(i + 1, page_size, line.clone()))
            .collect()
    }
}

impl PersistenceProvider for InMemoryProvider {
    fn save(&mut self, path: &str, text: &str) -> Result<()> {
        if self.simulate_save_error {
            return Err(FolioError::SaveFailed("Simulated write error".to_string()));
        }
        self.insert_text(path, text);
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub struct ProviderFixture {
        pub provider: InMemoryProvider,
    }

    impl Default for ProviderFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ProviderFixture {
        pub fn new() -> Self {
            Self {
                provider: InMemoryProvider::new(),
            }
        }

        /// A file whose line `n` reads `line n`.
        pub fn with_numbered_file(mut self, path: &str, line_count: usize) -> Self {
            let text: Vec<String> = (1..=line_count).map(|n| format!("line {}", n)).collect();
            self.provider.insert_text(path, &text.join("\n"));
            self
        }

        /// A numbered file where the given lines are replaced by `marker`.
        pub fn with_marked_file(
            mut self,
            path: &str,
            line_count: usize,
            marked: &[usize],
            marker: &str,
        ) -> Self {
            let text: Vec<String> = (1..=line_count)
                .map(|n| {
                    if marked.contains(&n) {
                        format!("line {} {}", n, marker)
                    } else {
                        format!("line {}", n)
                    }
                })
                .collect();
            self.provider.insert_text(path, &text.join("\n"));
            self
        }

        pub fn with_text(mut self, path: &str, text: &str) -> Self {
            self.provider.insert_text(path, text);
            self
        }
    }
}
