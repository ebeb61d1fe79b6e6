use super::{
    line_matches, ContentProvider, FileStat, PageContent, PersistenceProvider, SearchHit,
    SearchProvider,
};
use crate::error::{FolioError, Result};
use crate::paging;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Component, Path, PathBuf};

/// Read buffer for line scanning.
const SCAN_BUFFER: usize = 64 * 1024;

/// Bytes inspected when deciding whether a file is text.
const SNIFF_LEN: usize = 8 * 1024;

/// One entry of a directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct DirEntry {
    pub name: String,
    /// Path relative to the provider root, `/`-separated.
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub extension: Option<String>,
}

/// Streams a file line by line without holding more than one line.
pub struct LineScanner<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: Read> LineScanner<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::with_capacity(SCAN_BUFFER, inner),
            buf: Vec::new(),
        }
    }

    /// Next line with its terminator stripped; `Ok(None)` at end of input.
    /// Invalid UTF-8 is reported as `InvalidData`.
    pub fn next_line(&mut self) -> io::Result<Option<&str>> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        std::str::from_utf8(&self.buf)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Provider over a directory tree. All paths are relative to `root` and may
/// not leave it.
pub struct FsProvider {
    root: PathBuf,
}

impl FsProvider {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = fs::canonicalize(root)
            .map_err(|_| FolioError::NotFound(root.display().to_string()))?;
        if !root.is_dir() {
            return Err(FolioError::NotFound(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `requested` below the root, refusing `..` and symlinks that
    /// point outside it. The deepest part of the path that exists is
    /// canonicalized, so a link in a not-yet-existing path is followed too.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf> {
        let mut clean = PathBuf::new();
        for component in Path::new(requested).components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    return Err(FolioError::InvalidInput(format!(
                        "path may not contain '..': {}",
                        requested
                    )))
                }
            }
        }

        let full = self.root.join(&clean);
        let mut existing = full.as_path();
        let mut missing = Vec::new();
        while fs::symlink_metadata(existing).is_err() {
            match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name.to_os_string());
                    existing = parent;
                }
                _ => break,
            }
        }
        let mut normalized = fs::canonicalize(existing).map_err(|_| {
            FolioError::InvalidInput(format!("cannot resolve path: {}", requested))
        })?;
        normalized.extend(missing.iter().rev());

        if !normalized.starts_with(&self.root) {
            return Err(FolioError::InvalidInput(format!(
                "path escapes the root: {}",
                requested
            )));
        }
        Ok(normalized)
    }

    fn relative(&self, full: &Path) -> String {
        full.strip_prefix(&self.root)
            .unwrap_or(full)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Resolves a path that must be an existing text file.
    fn text_file(&self, requested: &str) -> Result<PathBuf> {
        let path = self.resolve(requested)?;
        if !path.exists() {
            return Err(FolioError::NotFound(requested.to_string()));
        }
        if path.is_dir() {
            return Err(FolioError::NotText(format!("{} is a directory", requested)));
        }
        if !looks_like_text(&path).map_err(|e| fetch_failed(requested, e))? {
            return Err(FolioError::NotText(requested.to_string()));
        }
        Ok(path)
    }

    /// Lists a directory: directories first, then files, each sorted by name.
    pub fn list_dir(&self, requested: &str) -> Result<Vec<DirEntry>> {
        let dir = self.resolve(requested)?;
        if !dir.exists() {
            return Err(FolioError::NotFound(requested.to_string()));
        }
        if !dir.is_dir() {
            return Err(FolioError::InvalidInput(format!(
                "{} is not a directory",
                requested
            )));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let full = entry.path();
            let metadata = entry.metadata().ok();
            let is_dir = metadata.as_ref().map(|m| m.is_dir()).unwrap_or(false);
            let extension = if is_dir {
                None
            } else {
                full.extension()
                    .and_then(|e| e.to_str())
                    .map(|s| s.to_string())
            };

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: self.relative(&full),
                is_dir,
                size: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
                modified: metadata
                    .as_ref()
                    .and_then(|m| m.modified().ok())
                    .map(DateTime::<Utc>::from),
                extension,
            });
        }

        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        Ok(entries)
    }

    pub fn create_file(&self, dir: &str, name: &str) -> Result<String> {
        let target = self.new_child(dir, name)?;
        fs::write(&target, "")?;
        tracing::debug!(path = %target.display(), "created file");
        Ok(self.relative(&target))
    }

    pub fn create_dir(&self, dir: &str, name: &str) -> Result<String> {
        let target = self.new_child(dir, name)?;
        fs::create_dir_all(&target)?;
        tracing::debug!(path = %target.display(), "created directory");
        Ok(self.relative(&target))
    }

    pub fn delete_file(&self, requested: &str) -> Result<()> {
        let path = self.resolve(requested)?;
        if !path.exists() {
            return Err(FolioError::NotFound(requested.to_string()));
        }
        if path.is_dir() {
            return Err(FolioError::InvalidInput(format!(
                "{} is a directory",
                requested
            )));
        }
        fs::remove_file(&path)?;
        tracing::debug!(path = %path.display(), "deleted file");
        Ok(())
    }

    fn new_child(&self, dir: &str, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(FolioError::InvalidInput(format!("invalid name: '{}'", name)));
        }
        let parent = self.resolve(dir)?;
        if !parent.is_dir() {
            return Err(FolioError::NotFound(dir.to_string()));
        }
        let target = parent.join(name);
        if fs::symlink_metadata(&target).is_ok() {
            return Err(FolioError::InvalidInput(format!(
                "{} already exists",
                self.relative(&target)
            )));
        }
        Ok(target)
    }
}

fn fetch_failed(path: &str, err: io::Error) -> FolioError {
    if err.kind() == io::ErrorKind::InvalidData {
        return FolioError::NotText(path.to_string());
    }
    tracing::warn!(path, error = %err, "read failed");
    FolioError::FetchFailed(format!("{}: {}", path, err))
}

fn looks_like_text(path: &Path) -> io::Result<bool> {
    let mut sample = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut sample)?;
    if sample.contains(&0) {
        return Ok(false);
    }
    // A multi-byte character may be cut at the end of the sample.
    Ok(match std::str::from_utf8(&sample) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Counts lines in a single pass.
pub fn count_lines(path: &Path) -> io::Result<usize> {
    let mut scanner = LineScanner::new(File::open(path)?);
    let mut count = 0;
    while scanner.next_line()?.is_some() {
        count += 1;
    }
    Ok(count)
}

impl ContentProvider for FsProvider {
    fn fetch_page(&self, requested: &str, page: usize, page_size: usize) -> Result<PageContent> {
        let path = self.text_file(requested)?;
        let first = paging::first_line_of(page, page_size)?;
        let last = paging::last_line_of(page, page_size)?;

        let read = || -> io::Result<(Vec<String>, usize, u64)> {
            let file = File::open(&path)?;
            let size = file.metadata()?.len();
            let mut scanner = LineScanner::new(file);
            let mut lines = Vec::new();
            let mut line_number = 0;
            while let Some(line) = scanner.next_line()? {
                line_number += 1;
                if line_number >= first && line_number <= last {
                    lines.push(line.to_string());
                }
            }
            Ok((lines, line_number, size))
        };
        let (lines, total_line_count, file_size) =
            read().map_err(|e| fetch_failed(requested, e))?;

        tracing::debug!(
            path = requested,
            page,
            page_size,
            lines = lines.len(),
            "fetched page"
        );
        Ok(PageContent {
            lines,
            total_line_count,
            file_size,
            display_name: display_name(&path),
        })
    }

    fn stat(&self, requested: &str) -> Result<FileStat> {
        let path = self.text_file(requested)?;
        let file_size = fs::metadata(&path)
            .map_err(|e| fetch_failed(requested, e))?
            .len();
        let total_line_count = count_lines(&path).map_err(|e| fetch_failed(requested, e))?;
        Ok(FileStat {
            total_line_count,
            file_size,
            display_name: display_name(&path),
        })
    }
}

impl SearchProvider for FsProvider {
    fn search(&self, requested: &str, query: &str, page_size: usize) -> Result<Vec<SearchHit>> {
        let path = self.text_file(requested)?;
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let query_lower = query.to_lowercase();

        let file = File::open(&path).map_err(|e| fetch_failed(requested, e))?;
        let mut scanner = LineScanner::new(file);
        let mut hits = Vec::new();
        let mut line_number = 0;
        while let Some(line) = scanner
            .next_line()
            .map_err(|e| fetch_failed(requested, e))?
        {
            line_number += 1;
            if line_matches(line, &query_lower) {
                hits.push(SearchHit::new(line_number, page_size, line)?);
            }
        }

        tracing::debug!(path = requested, query, hits = hits.len(), "searched file");
        Ok(hits)
    }
}

impl PersistenceProvider for FsProvider {
    /// Writes to a sibling temp file and renames it over the target.
    fn save(&mut self, requested: &str, text: &str) -> Result<()> {
        let path = self.resolve(requested)?;
        if path.is_dir() {
            return Err(FolioError::InvalidInput(format!(
                "{} is a directory",
                requested
            )));
        }
        let parent = path
            .parent()
            .filter(|p| p.is_dir())
            .ok_or_else(|| FolioError::NotFound(requested.to_string()))?;
        let tmp = parent.join(format!(".{}.folio-tmp", display_name(&path)));

        let write = || -> io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(FolioError::SaveFailed(format!("{}: {}", requested, e)));
        }

        tracing::debug!(path = requested, bytes = text.len(), "saved file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsProvider) {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsProvider::new(dir.path()).unwrap();
        (dir, provider)
    }

    fn numbered(count: usize) -> String {
        (1..=count)
            .map(|n| format!("line {}\n", n))
            .collect::<String>()
    }

    #[test]
    fn test_fetch_page_and_counts() {
        let (dir, provider) = setup();
        fs::write(dir.path().join("big.log"), numbered(2500)).unwrap();

        let page = provider.fetch_page("big.log", 3, 1000).unwrap();
        assert_eq!(page.total_line_count, 2500);
        assert_eq!(page.lines.len(), 500);
        assert_eq!(page.lines[0], "line 2001");
        assert_eq!(page.display_name, "big.log");

        let stat = provider.stat("big.log").unwrap();
        assert_eq!(stat.total_line_count, 2500);
    }

    #[test]
    fn test_crlf_and_missing_trailing_newline() {
        let (dir, provider) = setup();
        fs::write(dir.path().join("w.txt"), "a\r\nb\r\nc").unwrap();
        let page = provider.fetch_page("w.txt", 1, 10).unwrap();
        assert_eq!(page.lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_file() {
        let (dir, provider) = setup();
        fs::write(dir.path().join("empty.txt"), "").unwrap();
        let page = provider.fetch_page("empty.txt", 1, 1000).unwrap();
        assert!(page.lines.is_empty());
        assert_eq!(page.total_line_count, 0);
        assert!(provider.search("empty.txt", "x", 1000).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_escape() {
        let (_dir, provider) = setup();
        assert!(matches!(
            provider.resolve("../etc/passwd"),
            Err(FolioError::InvalidInput(_))
        ));
        assert!(matches!(
            provider.resolve("a/../../x"),
            Err(FolioError::InvalidInput(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_cannot_lead_out_of_root() {
        use std::os::unix::fs::symlink;

        let (dir, mut provider) = setup();
        let outside = tempfile::tempdir().unwrap();
        symlink(outside.path(), dir.path().join("link")).unwrap();
        symlink(
            outside.path().join("missing.json"),
            dir.path().join("dangling.json"),
        )
        .unwrap();

        assert!(matches!(
            provider.save("link/new.json", "{}"),
            Err(FolioError::InvalidInput(_))
        ));
        assert!(matches!(
            provider.save("link/sub/deeper.json", "{}"),
            Err(FolioError::InvalidInput(_))
        ));
        assert!(matches!(
            provider.save("dangling.json", "{}"),
            Err(FolioError::InvalidInput(_))
        ));
        assert!(provider.create_file("link", "x.txt").is_err());
        assert!(provider.create_dir("link", "d").is_err());
        assert!(provider.create_file(".", "dangling.json").is_err());

        assert!(!outside.path().join("new.json").exists());
        assert!(!outside.path().join("missing.json").exists());
        assert!(!outside.path().join("x.txt").exists());
        assert!(!outside.path().join("d").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_inside_root_are_followed() {
        use std::os::unix::fs::symlink;

        let (dir, mut provider) = setup();
        fs::create_dir(dir.path().join("real")).unwrap();
        symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();

        provider.save("alias/new.json", "{}").unwrap();
        assert!(dir.path().join("real/new.json").is_file());
    }

    #[test]
    fn test_huge_page_is_invalid_input() {
        let (dir, provider) = setup();
        fs::write(dir.path().join("a.txt"), "x\n").unwrap();
        assert!(matches!(
            provider.fetch_page("a.txt", 2, usize::MAX),
            Err(FolioError::InvalidInput(_))
        ));
        assert!(matches!(
            provider.fetch_page("a.txt", usize::MAX, 2),
            Err(FolioError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_absolute_paths_are_rooted() {
        let (dir, provider) = setup();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        let page = provider.fetch_page("/a.txt", 1, 10).unwrap();
        assert_eq!(page.lines, vec!["x"]);
    }

    #[test]
    fn test_not_found_and_not_text() {
        let (dir, provider) = setup();
        fs::write(dir.path().join("bin.dat"), [0u8, 159, 146, 150]).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert!(matches!(
            provider.fetch_page("missing.txt", 1, 10),
            Err(FolioError::NotFound(_))
        ));
        assert!(matches!(
            provider.fetch_page("bin.dat", 1, 10),
            Err(FolioError::NotText(_))
        ));
        assert!(matches!(
            provider.fetch_page("sub", 1, 10),
            Err(FolioError::NotText(_))
        ));
    }

    #[test]
    fn test_search_is_case_insensitive_and_paged() {
        let (dir, provider) = setup();
        let mut text = numbered(1500);
        text = text.replace("line 5\n", "line 5 FOO\n");
        text = text.replace("line 1200\n", "line 1200 foo\n");
        fs::write(dir.path().join("s.txt"), text).unwrap();

        let hits = provider.search("s.txt", "Foo", 1000).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!((hits[0].line_number, hits[0].page), (5, 1));
        assert_eq!((hits[1].line_number, hits[1].page), (1200, 2));
        assert_eq!(hits[1].matched_text, "line 1200 foo");
    }

    #[test]
    fn test_save_is_atomic_replace() {
        let (dir, mut provider) = setup();
        fs::write(dir.path().join("c.json"), "{}").unwrap();
        provider.save("c.json", "{\"a\": 1}").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("c.json")).unwrap(),
            "{\"a\": 1}"
        );
        assert!(!dir.path().join(".c.json.folio-tmp").exists());
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let (_dir, mut provider) = setup();
        assert!(matches!(
            provider.save("nope/c.json", "{}"),
            Err(FolioError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_dir_orders_dirs_first() {
        let (dir, provider) = setup();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.md"), "a").unwrap();
        fs::create_dir(dir.path().join("zdir")).unwrap();

        let entries = provider.list_dir("").unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["zdir", "a.md", "b.txt"]);
        assert!(entries[0].is_dir);
        assert_eq!(entries[1].extension.as_deref(), Some("md"));
        assert_eq!(entries[2].path, "b.txt");
    }

    #[test]
    fn test_create_and_delete() {
        let (dir, provider) = setup();
        assert_eq!(provider.create_dir("", "notes").unwrap(), "notes");
        assert_eq!(provider.create_file("notes", "a.txt").unwrap(), "notes/a.txt");
        assert!(dir.path().join("notes/a.txt").exists());
        assert!(provider.create_file("notes", "a.txt").is_err());
        assert!(provider.create_file("notes", "../x").is_err());

        provider.delete_file("notes/a.txt").unwrap();
        assert!(!dir.path().join("notes/a.txt").exists());
        assert!(matches!(
            provider.delete_file("notes/a.txt"),
            Err(FolioError::NotFound(_))
        ));
    }
}
