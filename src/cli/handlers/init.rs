use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::recovery::atomic_write;
use crate::io::workspace_io::{self, CONFIG_FILE, SHEET_DIR, TOPICS_FILE};
use crate::model::topic::Sheet;

const SHEET_TOML_TEMPLATE: &str = r##"[sheet]
name = "{name}"

[undo]
# Number of moves that `sheet undo` can revert
limit = 20

[import]
# Group names for questions that arrive without a topic or sub-topic
default_topic = "General"
default_subtopic = "Core Problems"

[display]
show_ids = true
show_links = false
"##;

/// Infer a sheet name from a directory name: hyphens and underscores become
/// spaces, each word title-cased.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_sheet_toml(name: &str) -> String {
    // Names go into a basic TOML string
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    SHEET_TOML_TEMPLATE.replace("{name}", &escaped)
}

/// Create `sheet/` under `base`. With `--force`, an existing workspace gets a
/// fresh sheet.toml while its topics and history are kept.
pub fn cmd_init(args: InitArgs, base: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let sheet_dir = base.join(SHEET_DIR);

    if sheet_dir.join(CONFIG_FILE).exists() && !args.force {
        return Err("sheet workspace already exists in ./sheet/ (use --force to rewrite sheet.toml)".into());
    }

    // Check for parent workspace and warn
    if let Some(parent) = base.parent()
        && let Ok(parent_root) = workspace_io::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent workspace found at {}/",
            parent_root.join(SHEET_DIR).display()
        );
        eprintln!("Creating new workspace in ./sheet/");
    }

    let name = match args.name {
        Some(n) if !n.trim().is_empty() => n.trim().to_string(),
        _ => base
            .file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Practice Sheet".to_string()),
    };

    fs::create_dir_all(&sheet_dir)?;
    atomic_write(&sheet_dir.join(CONFIG_FILE), render_sheet_toml(&name).as_bytes())?;
    if !sheet_dir.join(TOPICS_FILE).exists() {
        workspace_io::save_sheet(&sheet_dir, &Sheet::default())?;
    }

    tracing::info!(dir = %sheet_dir.display(), "initialized workspace");
    println!("Initialized sheet: {}", name);
    Ok(())
}
