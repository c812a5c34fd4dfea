use serde::{Deserialize, Serialize};

/// Configuration from sheet.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default)]
    pub sheet: SheetInfo,
    #[serde(default)]
    pub undo: UndoConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetInfo {
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for SheetInfo {
    fn default() -> Self {
        SheetInfo {
            name: default_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoConfig {
    /// Maximum number of snapshots kept for undo
    #[serde(default = "default_undo_limit")]
    pub limit: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        UndoConfig {
            limit: default_undo_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Topic name for questions that arrive without one
    #[serde(default = "default_topic")]
    pub default_topic: String,
    /// Sub-topic name for questions that arrive without one
    #[serde(default = "default_subtopic")]
    pub default_subtopic: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            default_topic: default_topic(),
            default_subtopic: default_subtopic(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_ids: bool,
    #[serde(default)]
    pub show_links: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            show_ids: true,
            show_links: false,
        }
    }
}

/// Default: see src/cli/handlers/init.rs template
fn default_name() -> String {
    "Practice Sheet".to_string()
}

pub const DEFAULT_UNDO_LIMIT: usize = 20;

fn default_undo_limit() -> usize {
    DEFAULT_UNDO_LIMIT
}

fn default_topic() -> String {
    "General".to_string()
}

fn default_subtopic() -> String {
    "Core Problems".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: SheetConfig = toml::from_str("").unwrap();
        assert_eq!(config.sheet.name, "Practice Sheet");
        assert_eq!(config.undo.limit, 20);
        assert_eq!(config.import.default_topic, "General");
        assert_eq!(config.import.default_subtopic, "Core Problems");
        assert!(config.display.show_ids);
        assert!(!config.display.show_links);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: SheetConfig = toml::from_str(
            "[sheet]\nname = \"A2Z\"\n\n[undo]\nlimit = 5\n\n[display]\nshow_links = true\n",
        )
        .unwrap();
        assert_eq!(config.sheet.name, "A2Z");
        assert_eq!(config.undo.limit, 5);
        assert!(config.display.show_ids);
        assert!(config.display.show_links);
    }
}
