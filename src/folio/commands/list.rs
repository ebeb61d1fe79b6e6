use crate::commands::CmdResult;
use crate::config::FolioConfig;
use crate::error::Result;
use crate::provider::fs::FsProvider;

/// The configured roots, in selection order.
pub fn roots(config: &FolioConfig) -> Result<CmdResult> {
    Ok(CmdResult::default().with_roots(config.root_dirs.clone()))
}

/// Entries of `dir` (relative to the root): directories first, then files.
pub fn run(provider: &FsProvider, dir: &str) -> Result<CmdResult> {
    let entries = provider.list_dir(dir)?;
    tracing::debug!(dir, count = entries.len(), "listed directory");
    Ok(CmdResult::default().with_entries(entries))
}
