use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::io::recovery::{RecoveryEntry, atomic_write, log_recovery};
use crate::model::config::SheetConfig;
use crate::model::topic::Sheet;
use crate::model::workspace::Workspace;
use crate::ops::undo::UndoStack;

pub const SHEET_DIR: &str = "sheet";
pub const CONFIG_FILE: &str = "sheet.toml";
pub const TOPICS_FILE: &str = "topics.json";
pub const HISTORY_FILE: &str = ".history.json";

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a sheet workspace: no sheet/sheet.toml found (run `sheet init`)")]
    NotAWorkspace,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse sheet.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit sheet.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("could not parse {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unknown config key: {0}")]
    UnknownConfigKey(String),
    #[error("invalid value '{value}' for {key} (expected {expected})")]
    InvalidConfigValue {
        key: String,
        value: String,
        expected: &'static str,
    },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the workspace by walking up from the given directory,
/// looking for `sheet/sheet.toml`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let sheet_dir = current.join(SHEET_DIR);
        if sheet_dir.is_dir() && sheet_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load config, tree and history from the given root directory.
///
/// A missing `topics.json` or `.history.json` loads as empty. The history is
/// trimmed to `[undo] limit`.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let sheet_dir = root.join(SHEET_DIR);
    let config_path = sheet_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Err(WorkspaceError::NotAWorkspace);
    }

    let config_text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: SheetConfig = toml::from_str(&config_text)?;

    let sheet: Sheet = read_json(&sheet_dir.join(TOPICS_FILE))?.unwrap_or_default();
    let mut history = read_history(&sheet_dir)?;
    history.set_limit(config.undo.limit);

    tracing::debug!(
        root = %root.display(),
        topics = sheet.topics.len(),
        history = history.len(),
        "loaded workspace"
    );

    Ok(Workspace {
        root: root.to_path_buf(),
        sheet_dir,
        config,
        sheet,
        history,
    })
}

/// Read the stored undo history as-is, without applying the configured limit.
pub fn read_history(sheet_dir: &Path) -> Result<UndoStack, WorkspaceError> {
    Ok(read_json(&sheet_dir.join(HISTORY_FILE))?.unwrap_or_default())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, WorkspaceError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| WorkspaceError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| WorkspaceError::JsonError {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Save the topic tree
pub fn save_sheet(sheet_dir: &Path, sheet: &Sheet) -> Result<(), WorkspaceError> {
    write_json(sheet_dir, TOPICS_FILE, sheet)
}

/// Save the undo history
pub fn save_history(sheet_dir: &Path, history: &UndoStack) -> Result<(), WorkspaceError> {
    write_json(sheet_dir, HISTORY_FILE, history)
}

/// Save both the tree and the history
pub fn save_workspace(ws: &Workspace) -> Result<(), WorkspaceError> {
    save_sheet(&ws.sheet_dir, &ws.sheet)?;
    save_history(&ws.sheet_dir, &ws.history)?;
    tracing::debug!(
        topics = ws.sheet.topics.len(),
        history = ws.history.len(),
        "saved workspace"
    );
    Ok(())
}

fn write_json<T: Serialize>(sheet_dir: &Path, file: &str, value: &T) -> Result<(), WorkspaceError> {
    let path = sheet_dir.join(file);
    let mut content = serde_json::to_string_pretty(value).map_err(|e| WorkspaceError::JsonError {
        path: path.clone(),
        source: e,
    })?;
    content.push('\n');
    if let Err(e) = atomic_write(&path, content.as_bytes()) {
        log_recovery(sheet_dir, RecoveryEntry::new(file, &e, content));
        return Err(WorkspaceError::WriteError { path, source: e });
    }
    Ok(())
}
