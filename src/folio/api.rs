//! # API Facade
//!
//! The API layer is a thin facade over the command layer and the single entry
//! point for every folio operation, whatever the UI.
//!
//! It dispatches to `commands/*.rs`, normalizes inputs (1-based hit numbers
//! from users become indexes) and returns `Result<CmdResult>`. It does no
//! printing and holds no business logic.
//!
//! ## Generic Over Providers
//!
//! `FolioApi<P>` works with any provider that can serve pages, search and
//! save:
//! - Production: `FolioApi<FsProvider>`, which also lists and manages files
//! - Testing: `FolioApi<InMemoryProvider>`

use crate::commands::config::ConfigAction;
use crate::commands::{self, CmdResult};
use crate::commands::view::{BrowseAction, OpenFile, ViewTarget};
use crate::config::FolioConfig;
use crate::error::{FolioError, Result};
use crate::provider::fs::FsProvider;
use crate::provider::{ContentProvider, PersistenceProvider, SearchProvider};
use std::path::Path;

pub struct FolioApi<P> {
    provider: P,
    config: FolioConfig,
}

impl<P> FolioApi<P>
where
    P: ContentProvider + SearchProvider + PersistenceProvider,
{
    pub fn new(provider: P, config: FolioConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    pub fn view(&self, path: &str, target: ViewTarget) -> Result<CmdResult> {
        commands::view::run(&self.provider, path, &self.config, target)
    }

    /// `hit` is 1-based, as users count.
    pub fn search(&self, path: &str, query: &str, hit: Option<usize>) -> Result<CmdResult> {
        let index = hit.map(to_index).transpose()?;
        commands::search::run(&self.provider, &self.provider, path, query, index, &self.config)
    }

    /// Opens a file for interactive browsing.
    pub fn open(&self, path: &str) -> Result<OpenFile> {
        commands::view::open(&self.provider, path, &self.config)
    }

    pub fn browse(&self, file: &mut OpenFile, action: BrowseAction) -> Result<CmdResult> {
        commands::view::step(&self.provider, &self.provider, file, action)
    }

    pub fn get_value(&self, path: &str, address: &str) -> Result<CmdResult> {
        commands::edit::get(&self.provider, path, address)
    }

    pub fn leaves(&self, path: &str) -> Result<CmdResult> {
        commands::edit::leaves(&self.provider, path)
    }

    pub fn set_values(&mut self, path: &str, changes: &[(String, String)]) -> Result<CmdResult> {
        if changes.is_empty() {
            return Err(FolioError::Api("nothing to set".to_string()));
        }
        commands::edit::set(&mut self.provider, path, changes)
    }

    pub fn delete_value(&mut self, path: &str, address: &str) -> Result<CmdResult> {
        commands::edit::delete(&mut self.provider, path, address)
    }

    pub fn add_field(&mut self, path: &str, parent: &str, key: &str, value: &str) -> Result<CmdResult> {
        commands::edit::add_field(&mut self.provider, path, parent, key, value)
    }

    pub fn add_item(&mut self, path: &str, parent: &str, value: &str) -> Result<CmdResult> {
        commands::edit::add_item(&mut self.provider, path, parent, value)
    }
}

impl FolioApi<FsProvider> {
    /// The configured roots. Needs no root to be reachable.
    pub fn roots(config: &FolioConfig) -> Result<CmdResult> {
        commands::list::roots(config)
    }

    /// Shows or changes config in `config_dir`. Needs no root to be reachable,
    /// so a broken root can be repaired.
    pub fn configure(config_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(config_dir, action)
    }

    pub fn list(&self, dir: &str) -> Result<CmdResult> {
        commands::list::run(&self.provider, dir)
    }

    pub fn touch(&self, dir: &str, name: &str) -> Result<CmdResult> {
        commands::files::touch(&self.provider, dir, name)
    }

    pub fn mkdir(&self, dir: &str, name: &str) -> Result<CmdResult> {
        commands::files::mkdir(&self.provider, dir, name)
    }

    pub fn remove(&self, path: &str) -> Result<CmdResult> {
        commands::files::remove(&self.provider, path)
    }
}

fn to_index(hit: usize) -> Result<usize> {
    hit.checked_sub(1)
        .ok_or_else(|| FolioError::Api("hit numbers start at 1".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::fixtures::ProviderFixture;
    use crate::provider::memory::InMemoryProvider;

    fn make_api() -> FolioApi<InMemoryProvider> {
        let provider = ProviderFixture::new()
            .with_marked_file("big.log", 30, &[4, 25], "needle")
            .with_text("doc.json", r#"{"a": {"b": 1}}"#)
            .provider;
        let config = FolioConfig {
            page_size: 10,
            large_file_threshold: 0,
            ..FolioConfig::default()
        };
        FolioApi::new(provider, config)
    }

    #[test]
    fn test_search_hit_numbers_are_one_based() {
        let api = make_api();
        let r = api.search("big.log", "needle", Some(2)).unwrap();
        assert_eq!(r.search.unwrap().selected, Some(1));
        assert_eq!(r.view.unwrap().page, 3);
        assert!(matches!(
            api.search("big.log", "needle", Some(0)),
            Err(FolioError::Api(_))
        ));
    }

    #[test]
    fn test_view_dispatches() {
        let api = make_api();
        let r = api.view("big.log", ViewTarget::Page(2)).unwrap();
        assert_eq!(r.view.unwrap().lines[0].0, 11);
    }

    #[test]
    fn test_browse_keeps_session() {
        let api = make_api();
        let mut file = api.open("big.log").unwrap();
        api.browse(&mut file, BrowseAction::NextPage).unwrap();
        let r = api.browse(&mut file, BrowseAction::Show).unwrap();
        assert_eq!(r.view.unwrap().page, 2);
    }

    #[test]
    fn test_edits_round_through_provider() {
        let mut api = make_api();
        api.set_values("doc.json", &[("a.c".into(), "true".into())])
            .unwrap();
        let r = api.get_value("doc.json", "a.c").unwrap();
        assert_eq!(r.values[0].1, serde_json::json!(true));
        assert!(api.set_values("doc.json", &[]).is_err());
    }

    #[test]
    fn test_config_and_roots_without_a_root() {
        let dir = tempfile::tempdir().unwrap();
        FolioApi::configure(
            dir.path(),
            ConfigAction::Set("root.logs".into(), "/var/log".into()),
        )
        .unwrap();

        let config = FolioConfig::load(dir.path()).unwrap();
        let r = FolioApi::roots(&config).unwrap();
        let names: Vec<_> = r.roots.iter().map(|root| root.name.as_str()).collect();
        assert_eq!(names, vec!["default", "logs"]);
    }
}
