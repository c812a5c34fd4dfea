use std::path::PathBuf;

use super::config::SheetConfig;
use super::topic::Sheet;
use crate::ops::undo::UndoStack;

/// A fully loaded sheet workspace
#[derive(Debug)]
pub struct Workspace {
    /// Directory containing `sheet/`
    pub root: PathBuf,
    /// Path to the `sheet/` directory
    pub sheet_dir: PathBuf,
    /// Parsed sheet.toml
    pub config: SheetConfig,
    /// The topic tree
    pub sheet: Sheet,
    /// Undo snapshots, oldest first
    pub history: UndoStack,
}
