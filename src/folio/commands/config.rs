use crate::commands::{CmdMessage, CmdResult};
use crate::config::FolioConfig;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => {
            let config = FolioConfig::load(dir)?;
            Ok(CmdResult::default().with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = FolioConfig::load(dir)?;
            let mut result = CmdResult::default();
            match config.get(&key) {
                Some(val) => result.add_message(CmdMessage::info(val)),
                None => {
                    result.add_message(CmdMessage::error(format!("Unknown config key: {}", key)))
                }
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            let mut config = FolioConfig::load(dir)?;
            if let Err(e) = config.set(&key, &value) {
                let mut res = CmdResult::default();
                res.add_message(CmdMessage::error(e.to_string()));
                return Ok(res);
            }
            config.save(dir)?;
            let display_val = config.get(&key).unwrap_or_else(|| value.clone());
            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key, display_val
            )));
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;

    #[test]
    fn set_then_show() {
        let dir = tempfile::tempdir().unwrap();
        let r = run(dir.path(), ConfigAction::Set("page_size".into(), "50".into())).unwrap();
        assert_eq!(r.messages[0].level, MessageLevel::Success);

        let r = run(dir.path(), ConfigAction::ShowKey("page_size".into())).unwrap();
        assert_eq!(r.messages[0].content, "50");

        let r = run(dir.path(), ConfigAction::ShowAll).unwrap();
        assert_eq!(r.config.unwrap().page_size, 50);
    }

    #[test]
    fn bad_values_are_reported_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let r = run(dir.path(), ConfigAction::Set("page_size".into(), "0".into())).unwrap();
        assert_eq!(r.messages[0].level, MessageLevel::Error);
        assert!(!dir.path().join("config.json").exists());

        let r = run(dir.path(), ConfigAction::ShowKey("nope".into())).unwrap();
        assert_eq!(r.messages[0].level, MessageLevel::Error);
    }
}
