use clap::{Args, Parser, Subcommand};

use crate::model::question::Difficulty;

#[derive(Parser)]
#[command(name = "sheet", about = concat!("sheet v", env!("CARGO_PKG_VERSION"), " - a practice-sheet tracker"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new sheet workspace in the current directory
    Init(InitArgs),
    /// List the sheet (default when no command is given)
    List(ListArgs),
    /// Show a topic, sub-topic or question
    Show(ShowArgs),
    /// Filter the sheet by name or title
    Search(SearchArgs),
    /// Show difficulty counters and completion
    Stats,
    /// Validate sheet integrity
    Check,
    /// Topic management
    Topic(TopicCmd),
    /// Sub-topic management
    Sub(SubCmd),
    /// Add a question to a sub-topic
    Add(AddArgs),
    /// Edit a question
    Edit(EditArgs),
    /// Delete a question
    Rm(RmArgs),
    /// Set or clear a question's note
    Note(NoteArgs),
    /// Flip a question between solved and unsolved
    Toggle(ToggleArgs),
    /// Move an item onto a target (reorder or re-parent)
    Mv(MvArgs),
    /// Revert the most recent move
    Undo,
    /// Seed the sheet from sheet JSON
    Import(ImportArgs),
    /// Read or change sheet.toml settings
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Sheet name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Reinitialize even if sheet/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct ListArgs {
    /// Topic to list (default: all topics)
    pub topic: Option<String>,
    /// Only solved questions
    #[arg(long, conflicts_with = "unsolved")]
    pub solved: bool,
    /// Only unsolved questions
    #[arg(long)]
    pub unsolved: bool,
    /// Filter by difficulty (easy, medium, hard)
    #[arg(long)]
    pub difficulty: Option<Difficulty>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Topic, sub-topic or question ID
    pub id: String,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for (case-insensitive)
    pub query: String,
    /// Treat the query as a regular expression
    #[arg(long)]
    pub regex: bool,
}

// ---------------------------------------------------------------------------
// Topic / sub-topic management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TopicCmd {
    #[command(subcommand)]
    pub action: TopicAction,
}

#[derive(Subcommand)]
pub enum TopicAction {
    /// Create a topic at the end of the sheet
    Add(NameArg),
    /// Rename a topic
    Rename(RenameArgs),
    /// Delete a topic and everything in it
    Rm(RemoveArgs),
}

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Create a sub-topic at the end of a topic
    Add(SubAddArgs),
    /// Rename a sub-topic
    Rename(RenameArgs),
    /// Delete a sub-topic and its questions
    Rm(RemoveArgs),
}

#[derive(Args)]
pub struct NameArg {
    /// Display name
    pub name: String,
}

#[derive(Args)]
pub struct SubAddArgs {
    /// Parent topic ID
    pub topic_id: String,
    /// Display name
    pub name: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Item ID
    pub id: String,
    /// New display name
    pub name: String,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Item ID
    pub id: String,
    /// Skip confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Question commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Sub-topic ID to add to
    pub sub_id: String,
    /// Question title
    pub title: String,
    /// Difficulty (default: medium)
    #[arg(long, short)]
    pub difficulty: Option<Difficulty>,
    /// Problem link
    #[arg(long)]
    pub url: Option<String>,
    /// Walkthrough video link
    #[arg(long)]
    pub video: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Question ID
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New difficulty
    #[arg(long, short)]
    pub difficulty: Option<Difficulty>,
    /// New problem link ("" clears)
    #[arg(long)]
    pub url: Option<String>,
    /// New video link ("" clears)
    #[arg(long)]
    pub video: Option<String>,
}

#[derive(Args)]
pub struct RmArgs {
    /// Question ID
    pub id: String,
}

#[derive(Args)]
pub struct NoteArgs {
    /// Question ID
    pub id: String,
    /// Note text (omit to clear)
    pub text: Option<String>,
}

#[derive(Args)]
pub struct ToggleArgs {
    /// Question ID
    pub id: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// ID of the item to move
    pub id: String,
    /// ID of the item to drop it onto
    pub target: String,
}

// ---------------------------------------------------------------------------
// Import / config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ImportArgs {
    /// Sheet JSON file, or - for stdin
    pub file: String,
    /// Replace a non-empty sheet
    #[arg(long)]
    pub replace: bool,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a setting (section.key)
    Get(ConfigGetArgs),
    /// Change a setting (section.key value)
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigGetArgs {
    /// Key such as undo.limit
    pub key: String,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Key such as undo.limit
    pub key: String,
    /// New value
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_difficulty_and_globals() {
        let cli = Cli::try_parse_from(["sheet", "--json", "add", "st-1", "Two Sum", "-d", "hard"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.sub_id, "st-1");
                assert_eq!(args.difficulty, Some(Difficulty::Hard));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn rejects_unknown_difficulty() {
        assert!(Cli::try_parse_from(["sheet", "add", "st-1", "x", "--difficulty", "brutal"]).is_err());
    }

    #[test]
    fn solved_and_unsolved_conflict() {
        assert!(Cli::try_parse_from(["sheet", "list", "--solved", "--unsolved"]).is_err());
    }
}
