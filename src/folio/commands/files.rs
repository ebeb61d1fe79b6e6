use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::provider::fs::FsProvider;

/// Creates an empty file `name` inside `dir`.
pub fn touch(provider: &FsProvider, dir: &str, name: &str) -> Result<CmdResult> {
    let created = provider.create_file(dir, name)?;
    let mut result = CmdResult::default().with_affected_paths(vec![created.clone()]);
    result.add_message(CmdMessage::success(format!("Created file {}", created)));
    Ok(result)
}

pub fn mkdir(provider: &FsProvider, dir: &str, name: &str) -> Result<CmdResult> {
    let created = provider.create_dir(dir, name)?;
    let mut result = CmdResult::default().with_affected_paths(vec![created.clone()]);
    result.add_message(CmdMessage::success(format!("Created directory {}", created)));
    Ok(result)
}

/// Deletes one file. Directories are refused.
pub fn remove(provider: &FsProvider, path: &str) -> Result<CmdResult> {
    provider.delete_file(path)?;
    let mut result = CmdResult::default().with_affected_paths(vec![path.to_string()]);
    result.add_message(CmdMessage::success(format!("Deleted {}", path)));
    Ok(result)
}
