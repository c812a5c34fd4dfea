use std::fs;
use std::path::Path;

use crate::io::recovery::atomic_write;
use crate::io::workspace_io::{CONFIG_FILE, WorkspaceError};
use crate::model::config::SheetConfig;

/// Value type of a settable config key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyType {
    Str,
    Count,
    Bool,
}

impl KeyType {
    fn describe(self) -> &'static str {
        match self {
            KeyType::Str => "a non-empty string",
            KeyType::Count => "a non-negative integer",
            KeyType::Bool => "true or false",
        }
    }
}

/// Every key `sheet config get/set` understands, as `section.key`
pub const CONFIG_KEYS: &[&str] = &[
    "sheet.name",
    "undo.limit",
    "import.default_topic",
    "import.default_subtopic",
    "display.show_ids",
    "display.show_links",
];

fn key_type(key: &str) -> Option<KeyType> {
    match key {
        "sheet.name" | "import.default_topic" | "import.default_subtopic" => Some(KeyType::Str),
        "undo.limit" => Some(KeyType::Count),
        "display.show_ids" | "display.show_links" => Some(KeyType::Bool),
        _ => None,
    }
}

/// Read the sheet config, returning both the parsed config and the raw
/// toml_edit Document for round-trip-safe editing.
pub fn read_config(sheet_dir: &Path) -> Result<(SheetConfig, toml_edit::DocumentMut), WorkspaceError> {
    let config_path = sheet_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: SheetConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(sheet_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    let config_path = sheet_dir.join(CONFIG_FILE);
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| {
        WorkspaceError::WriteError {
            path: config_path,
            source: e,
        }
    })
}

/// Effective value of a key, defaults included
pub fn get_value(config: &SheetConfig, key: &str) -> Result<String, WorkspaceError> {
    let value = match key {
        "sheet.name" => config.sheet.name.clone(),
        "undo.limit" => config.undo.limit.to_string(),
        "import.default_topic" => config.import.default_topic.clone(),
        "import.default_subtopic" => config.import.default_subtopic.clone(),
        "display.show_ids" => config.display.show_ids.to_string(),
        "display.show_links" => config.display.show_links.to_string(),
        _ => return Err(WorkspaceError::UnknownConfigKey(key.to_string())),
    };
    Ok(value)
}

/// Set `section.key` in the document, creating the section if needed.
/// The raw value is validated against the key's type first.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, raw: &str) -> Result<(), WorkspaceError> {
    let ty = key_type(key).ok_or_else(|| WorkspaceError::UnknownConfigKey(key.to_string()))?;
    let invalid = || WorkspaceError::InvalidConfigValue {
        key: key.to_string(),
        value: raw.to_string(),
        expected: ty.describe(),
    };
    let value = match ty {
        KeyType::Str => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(invalid());
            }
            toml_edit::value(trimmed)
        }
        KeyType::Count => {
            let n: u32 = raw.trim().parse().map_err(|_| invalid())?;
            toml_edit::value(i64::from(n))
        }
        KeyType::Bool => {
            let b: bool = raw.trim().parse().map_err(|_| invalid())?;
            toml_edit::value(b)
        }
    };

    let (section, field) = key.split_once('.').ok_or_else(invalid)?;
    if !doc.contains_key(section) {
        doc[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[section][field] = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# my practice sheet
[sheet]
name = "DSA"

[undo]
limit = 20 # snapshots
"#
    }

    #[test]
    fn test_round_trip_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), sample_config()).unwrap();

        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.sheet.name, "DSA");
        write_config(tmp.path(), &doc).unwrap();

        let written = fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(written, sample_config());
    }

    #[test]
    fn test_get_value_includes_defaults() {
        let config: SheetConfig = toml::from_str(sample_config()).unwrap();
        assert_eq!(get_value(&config, "sheet.name").unwrap(), "DSA");
        assert_eq!(get_value(&config, "import.default_topic").unwrap(), "General");
        assert_eq!(get_value(&config, "display.show_ids").unwrap(), "true");
        assert!(matches!(
            get_value(&config, "sheet.colour"),
            Err(WorkspaceError::UnknownConfigKey(_))
        ));
    }

    #[test]
    fn test_set_value_preserves_comments() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_value(&mut doc, "undo.limit", "5").unwrap();
        let result = doc.to_string();
        assert!(result.starts_with("# my practice sheet"));
        let config: SheetConfig = toml::from_str(&result).unwrap();
        assert_eq!(config.undo.limit, 5);
    }

    #[test]
    fn test_set_value_creates_missing_section() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_value(&mut doc, "display.show_links", "true").unwrap();
        set_value(&mut doc, "import.default_topic", "  Misc ").unwrap();
        let config: SheetConfig = toml::from_str(&doc.to_string()).unwrap();
        assert!(config.display.show_links);
        assert_eq!(config.import.default_topic, "Misc");
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        assert!(matches!(
            set_value(&mut doc, "undo.limit", "-1"),
            Err(WorkspaceError::InvalidConfigValue { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "display.show_ids", "yes"),
            Err(WorkspaceError::InvalidConfigValue { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "sheet.name", "   "),
            Err(WorkspaceError::InvalidConfigValue { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "nope", "1"),
            Err(WorkspaceError::UnknownConfigKey(_))
        ));
        assert_eq!(doc.to_string(), sample_config());
    }
}
