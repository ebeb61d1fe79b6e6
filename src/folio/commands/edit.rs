//! Path-addressed edits of JSON files.
//!
//! Every mutation loads the whole document, edits it through a
//! [`StructuralEditor`], and saves the re-serialized text through the
//! persistence provider. A failing edit saves nothing.

use crate::commands::{CmdMessage, CmdResult};
use crate::document::{coerce_value, StructuralEditor};
use crate::error::Result;
use crate::path::PathAddress;
use crate::provider::{ContentProvider, PersistenceProvider};

fn shown(path: &PathAddress) -> String {
    if path.is_root() {
        "<root>".to_string()
    } else {
        path.render()
    }
}

/// Reads the full text of `path` as one page.
fn read_text<C: ContentProvider>(content: &C, path: &str) -> Result<String> {
    let stat = content.stat(path)?;
    let page = content.fetch_page(path, 1, stat.total_line_count.max(1))?;
    Ok(page.lines.join("\n"))
}

fn load<C: ContentProvider>(content: &C, path: &str) -> Result<StructuralEditor> {
    StructuralEditor::parse(&read_text(content, path)?)
}

fn store<P: PersistenceProvider>(store: &mut P, path: &str, editor: &StructuralEditor) -> Result<()> {
    let mut text = editor.serialize()?;
    text.push('\n');
    store.save(path, &text)
}

pub fn get<C: ContentProvider>(content: &C, path: &str, address: &str) -> Result<CmdResult> {
    let address = PathAddress::parse(address)?;
    let editor = load(content, path)?;
    let value = editor.get(&address)?.clone();
    Ok(CmdResult::default().with_values(vec![(shown(&address), value)]))
}

pub fn leaves<C: ContentProvider>(content: &C, path: &str) -> Result<CmdResult> {
    let editor = load(content, path)?;
    let values = editor
        .leaves()
        .into_iter()
        .map(|(address, value)| (shown(&address), value.clone()))
        .collect();
    Ok(CmdResult::default().with_values(values))
}

/// Sets every `(address, raw value)` pair. All of them apply or none does.
pub fn set<P>(provider: &mut P, path: &str, changes: &[(String, String)]) -> Result<CmdResult>
where
    P: ContentProvider + PersistenceProvider,
{
    let parsed = changes
        .iter()
        .map(|(address, raw)| Ok((PathAddress::parse(address)?, coerce_value(raw))))
        .collect::<Result<Vec<_>>>()?;

    let mut editor = load(&*provider, path)?;
    editor.apply_changes(&parsed)?;
    store(provider, path, &editor)?;
    tracing::debug!(path, changes = parsed.len(), "document updated");

    let values = parsed
        .into_iter()
        .map(|(address, value)| (shown(&address), value))
        .collect();
    let mut result = CmdResult::default()
        .with_values(values)
        .with_affected_paths(vec![path.to_string()]);
    result.add_message(CmdMessage::success(format!("Updated {}", path)));
    Ok(result)
}

pub fn delete<P>(provider: &mut P, path: &str, address: &str) -> Result<CmdResult>
where
    P: ContentProvider + PersistenceProvider,
{
    let address = PathAddress::parse(address)?;
    let mut editor = load(&*provider, path)?;
    let removed = editor.delete(&address)?;
    store(provider, path, &editor)?;

    let mut result = CmdResult::default()
        .with_values(vec![(shown(&address), removed)])
        .with_affected_paths(vec![path.to_string()]);
    result.add_message(CmdMessage::success(format!("Deleted {}", shown(&address))));
    Ok(result)
}

pub fn add_field<P>(provider: &mut P, path: &str, parent: &str, key: &str, raw: &str) -> Result<CmdResult>
where
    P: ContentProvider + PersistenceProvider,
{
    let parent = PathAddress::parse(parent)?;
    let mut editor = load(&*provider, path)?;
    editor.add_field(&parent, key, raw)?;
    store(provider, path, &editor)?;

    let address = parent.child_key(key);
    let value = editor.get(&address)?.clone();
    let mut result = CmdResult::default()
        .with_values(vec![(shown(&address), value)])
        .with_affected_paths(vec![path.to_string()]);
    result.add_message(CmdMessage::success(format!("Added {}", shown(&address))));
    Ok(result)
}

pub fn add_item<P>(provider: &mut P, path: &str, parent: &str, raw: &str) -> Result<CmdResult>
where
    P: ContentProvider + PersistenceProvider,
{
    let parent = PathAddress::parse(parent)?;
    let mut editor = load(&*provider, path)?;
    let index = editor.add_item(&parent, raw)?;
    store(provider, path, &editor)?;

    let address = parent.child_index(index);
    let value = editor.get(&address)?.clone();
    let mut result = CmdResult::default()
        .with_values(vec![(shown(&address), value)])
        .with_affected_paths(vec![path.to_string()]);
    result.add_message(CmdMessage::success(format!("Added {}", shown(&address))));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FolioError;
    use crate::provider::memory::fixtures::ProviderFixture;
    use crate::provider::memory::InMemoryProvider;
    use serde_json::json;

    const DOC: &str = r#"{
  "name": "svc",
  "server": {
    "port": 80,
    "hosts": ["a", "b"]
  },
  "debug": false
}"#;

    fn provider() -> InMemoryProvider {
        ProviderFixture::new().with_text("cfg.json", DOC).provider
    }

    fn reparsed(p: &InMemoryProvider) -> serde_json::Value {
        serde_json::from_str(&p.text("cfg.json").unwrap()).unwrap()
    }

    #[test]
    fn test_get_value() {
        let p = provider();
        let r = get(&p, "cfg.json", "server.hosts[1]").unwrap();
        assert_eq!(r.values, vec![("server.hosts[1]".to_string(), json!("b"))]);

        let r = get(&p, "cfg.json", "").unwrap();
        assert_eq!(r.values[0].0, "<root>");
    }

    #[test]
    fn test_get_missing_and_malformed() {
        let p = provider();
        assert!(matches!(
            get(&p, "cfg.json", "server.missing"),
            Err(FolioError::PathNotFound(_))
        ));
        assert!(matches!(
            get(&p, "cfg.json", "server[x]"),
            Err(FolioError::MalformedPath(_))
        ));
    }

    #[test]
    fn test_set_keeps_siblings_and_order() {
        let mut p = provider();
        set(&mut p, "cfg.json", &[("server.port".into(), "8080".into())]).unwrap();

        let text = p.text("cfg.json").unwrap();
        let keys: Vec<_> = ["\"name\"", "\"server\"", "\"debug\""]
            .iter()
            .map(|k| text.find(k).unwrap())
            .collect();
        assert!(keys[0] < keys[1] && keys[1] < keys[2]);

        let doc = reparsed(&p);
        assert_eq!(doc["server"]["port"], json!(8080));
        assert_eq!(doc["server"]["hosts"], json!(["a", "b"]));
        assert_eq!(doc["debug"], json!(false));
    }

    #[test]
    fn test_set_is_all_or_nothing() {
        let mut p = provider();
        let err = set(
            &mut p,
            "cfg.json",
            &[
                ("server.port".into(), "1".into()),
                ("name.inner".into(), "x".into()),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, FolioError::PathNotFound(_)));
        assert_eq!(reparsed(&p)["server"]["port"], json!(80));
    }

    #[test]
    fn test_delete_and_add() {
        let mut p = provider();
        delete(&mut p, "cfg.json", "server.hosts[0]").unwrap();
        assert_eq!(reparsed(&p)["server"]["hosts"], json!(["b"]));

        let r = add_item(&mut p, "cfg.json", "server.hosts", "c").unwrap();
        assert_eq!(r.values[0].0, "server.hosts[1]");

        add_field(&mut p, "cfg.json", "server", "tls", "{\"on\": true}").unwrap();
        assert_eq!(reparsed(&p)["server"]["tls"]["on"], json!(true));

        assert!(matches!(
            add_field(&mut p, "cfg.json", "", "name", "x"),
            Err(FolioError::DuplicateKey(_))
        ));
    }

    #[test]
    fn test_failed_save_leaves_file() {
        let mut p = provider();
        p.set_simulate_save_error(true);
        assert!(matches!(
            set(&mut p, "cfg.json", &[("debug".into(), "true".into())]),
            Err(FolioError::SaveFailed(_))
        ));
        assert_eq!(reparsed(&p)["debug"], json!(false));
    }

    #[test]
    fn test_leaves_in_document_order() {
        let p = provider();
        let r = leaves(&p, "cfg.json").unwrap();
        let names: Vec<_> = r.values.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["name", "server.port", "server.hosts[0]", "server.hosts[1]", "debug"]
        );
    }

    #[test]
    fn test_not_json() {
        let p = ProviderFixture::new().with_text("notes.txt", "hello").provider;
        assert!(matches!(
            get(&p, "notes.txt", ""),
            Err(FolioError::Serialization(_))
        ));
    }
}
