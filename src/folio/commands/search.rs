use crate::commands::view::{self, OpenFile};
use crate::commands::{CmdMessage, CmdResult};
use crate::config::FolioConfig;
use crate::error::Result;
use crate::provider::{ContentProvider, SearchProvider};

/// Searches `path` for `query` and shows the page of hit `hit` (zero-based,
/// default the first).
pub fn run<C, S>(
    content: &C,
    searcher: &S,
    path: &str,
    query: &str,
    hit: Option<usize>,
    config: &FolioConfig,
) -> Result<CmdResult>
where
    C: ContentProvider,
    S: SearchProvider,
{
    let mut file: OpenFile = view::open(content, path, config)?;
    let first = file.session.search(content, searcher, query)?;

    let moved = match (first, hit) {
        (None, _) => None,
        (Some(first), None | Some(0)) => Some(first),
        (Some(_), Some(index)) => Some(file.session.select_hit(content, index)?),
    };

    file.focus_line = moved.as_ref().map(|m| m.scroll.line());
    let mut result = file.result();
    if moved.is_none() {
        result.add_message(CmdMessage::info(format!("No matches for '{}'", query)));
    }
    Ok(result)
}
