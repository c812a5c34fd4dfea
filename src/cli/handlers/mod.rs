mod init;
pub use init::cmd_init;

use std::io::Read;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Global override for workspace directory (set by -C flag)
static PROJECT_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::SheetLock;
use crate::io::workspace_io::{self, SHEET_DIR, WorkspaceError};
use crate::model::topic::Topic;
use crate::model::workspace::Workspace;
use crate::ops::move_ops::{self, MoveOutcome};
use crate::ops::sheet_ops::{self, Location, NewQuestion, QuestionEdit, SheetError};
use crate::ops::{check, import, search, stats, undo};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    // Store -C override for start_dir()
    if let Some(ref dir) = cli.project_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        PROJECT_DIR_OVERRIDE
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(abs);
    }

    match cli.command {
        // No subcommand: list the whole sheet
        None => cmd_list(ListArgs::default(), json),
        Some(cmd) => match cmd {
            Commands::Init(args) => cmd_init(args, &start_dir()?),

            // Read commands
            Commands::List(args) => cmd_list(args, json),
            Commands::Show(args) => cmd_show(args, json),
            Commands::Search(args) => cmd_search(args, json),
            Commands::Stats => cmd_stats(json),
            Commands::Check => cmd_check(json),

            // Structure
            Commands::Topic(args) => cmd_topic(args),
            Commands::Sub(args) => cmd_sub(args),

            // Questions
            Commands::Add(args) => cmd_add(args),
            Commands::Edit(args) => cmd_edit(args),
            Commands::Rm(args) => cmd_rm(args),
            Commands::Note(args) => cmd_note(args),
            Commands::Toggle(args) => cmd_toggle(args),

            // Moves and history
            Commands::Mv(args) => cmd_mv(args),
            Commands::Undo => cmd_undo(),

            // Maintenance
            Commands::Import(args) => cmd_import(args),
            Commands::Config(args) => cmd_config(args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn start_dir() -> Result<PathBuf, WorkspaceError> {
    match PROJECT_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(WorkspaceError::IoError),
    }
}

fn load_workspace_cwd() -> Result<Workspace, WorkspaceError> {
    let root = workspace_io::discover_workspace(&start_dir()?)?;
    workspace_io::load_workspace(&root)
}

/// Discover, lock, then load, so the lock covers the whole read-modify-write.
fn load_workspace_locked() -> Result<(Workspace, SheetLock), Box<dyn std::error::Error>> {
    let root = workspace_io::discover_workspace(&start_dir()?)?;
    let lock = SheetLock::acquire(&root.join(SHEET_DIR))?;
    let ws = workspace_io::load_workspace(&root)?;
    Ok((ws, lock))
}

fn save_sheet(ws: &Workspace) -> Result<(), WorkspaceError> {
    workspace_io::save_sheet(&ws.sheet_dir, &ws.sheet)
}

/// Ask on stderr, read a y/n answer from stdin. Anything but `y` declines.
fn confirm(prompt: &str) -> Result<bool, std::io::Error> {
    eprint!("{} [y/n] ", prompt);
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let full = &ws.sheet.topics;

    let scoped: Vec<Topic> = match args.topic {
        Some(ref id) => vec![
            sheet_ops::find_topic(full, id)
                .ok_or_else(|| SheetError::TopicNotFound(id.clone()))?
                .clone(),
        ],
        None => full.clone(),
    };

    let filtering = args.solved || args.unsolved || args.difficulty.is_some();
    let shown = if filtering {
        search::filter_questions(&scoped, |q| {
            (!args.solved || q.solved)
                && (!args.unsolved || !q.solved)
                && args.difficulty.is_none_or(|d| q.difficulty == d)
        })
    } else {
        scoped
    };

    if json {
        let out = SheetJson {
            name: ws.config.sheet.name.clone(),
            progress: sheet_progress(full),
            topics: topics_to_json(&shown, full),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", format_sheet_header(&ws.config.sheet.name, full));
    println!();
    if full.is_empty() {
        println!("no topics yet: add one with `sheet topic add <NAME>` or `sheet import <FILE>`");
    } else if shown.is_empty() {
        println!("no matching questions");
    } else {
        print_lines(&format_topic_listing(&shown, full, &ws.config.display));
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let full = &ws.sheet.topics;
    let display = &ws.config.display;

    let location = sheet_ops::locate(full, &args.id)
        .ok_or_else(|| format!("no topic, sub-topic or question with id {}", args.id))?;

    match location {
        Location::Topic { topic } => {
            let t = &full[topic];
            if json {
                let out = ShowJson {
                    kind: location.kind(),
                    topic: None,
                    sub_topic: None,
                    item: ItemJson::Topic(topic_to_json(t, full)),
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_lines(&format_topic_tree(t, full, display));
            }
        }
        Location::SubTopic { topic, sub } => {
            let t = &full[topic];
            let s = &t.sub_topics[sub];
            if json {
                let out = ShowJson {
                    kind: location.kind(),
                    topic: Some(t.id.clone()),
                    sub_topic: None,
                    item: ItemJson::SubTopic(sub_topic_to_json(s, full)),
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_lines(&format_sub_topic_tree(s, full, display, 0));
                println!("in: {} ({})", t.name, t.id);
            }
        }
        Location::Question {
            topic,
            sub,
            question,
        } => {
            let t = &full[topic];
            let s = &t.sub_topics[sub];
            let q = &s.questions[question];
            if json {
                let out = ShowJson {
                    kind: location.kind(),
                    topic: Some(t.id.clone()),
                    sub_topic: Some(s.id.clone()),
                    item: ItemJson::Question(question_to_json(q)),
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_lines(&format_question_detail(t, s, q));
            }
        }
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let full = &ws.sheet.topics;

    let matcher = if args.regex {
        search::Matcher::regex(&args.query)
            .map_err(|e| format!("invalid regex: {}", e))?
    } else {
        search::Matcher::substring(&args.query)
    };
    let filtered = search::filter_topics(full, &matcher);
    let matches = search::match_count(&filtered);

    if json {
        let out = SearchJson {
            query: args.query,
            matches,
            topics: topics_to_json(&filtered, full),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if filtered.is_empty() {
        println!("no matches for \"{}\"", args.query);
        return Ok(());
    }
    print_lines(&format_topic_listing(&filtered, full, &ws.config.display));
    println!();
    println!(
        "{} matching question{}",
        matches,
        if matches == 1 { "" } else { "s" }
    );
    Ok(())
}

fn cmd_stats(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    let full = &ws.sheet.topics;
    let sheet_stats = stats::sheet_stats(full);

    if json {
        let out = stats_to_json(&ws.config.sheet.name, sheet_stats, full);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_lines(&format_stats(&ws.config.sheet.name, &sheet_stats, full));
    }
    Ok(())
}

fn cmd_check(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd()?;
    // Stored length, before the load-time trim
    let stored_history = workspace_io::read_history(&ws.sheet_dir)?.len();
    let result = check::check_sheet(&ws.sheet.topics, stored_history, ws.config.undo.limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_lines(&format_check(&result));
    }

    if !result.valid {
        return Err(format!("check found {} error(s)", result.errors.len()).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Structure handlers
// ---------------------------------------------------------------------------

fn cmd_topic(args: TopicCmd) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        TopicAction::Add(a) => {
            let (mut ws, _lock) = load_workspace_locked()?;
            let id = sheet_ops::add_topic(&mut ws.sheet.topics, &a.name)?;
            save_sheet(&ws)?;
            println!("{}", id);
        }
        TopicAction::Rename(a) => {
            let (mut ws, _lock) = load_workspace_locked()?;
            sheet_ops::edit_topic(&mut ws.sheet.topics, &a.id, &a.name)?;
            save_sheet(&ws)?;
            println!("{} renamed", a.id);
        }
        TopicAction::Rm(a) => {
            // Prompt without holding the lock, then reload under it
            if !a.yes {
                let ws = load_workspace_cwd()?;
                let topic = sheet_ops::find_topic(&ws.sheet.topics, &a.id)
                    .ok_or_else(|| SheetError::TopicNotFound(a.id.clone()))?;
                if !topic.sub_topics.is_empty() {
                    let prompt = format!(
                        "delete topic \"{}\" with {} sub-topics and {} questions?",
                        topic.name,
                        topic.sub_topics.len(),
                        topic.question_count()
                    );
                    if !confirm(&prompt)? {
                        println!("cancelled");
                        return Ok(());
                    }
                }
            }
            let (mut ws, _lock) = load_workspace_locked()?;
            let removed = sheet_ops::delete_topic(&mut ws.sheet.topics, &a.id)?;
            save_sheet(&ws)?;
            println!("deleted topic \"{}\"", removed.name);
        }
    }
    Ok(())
}

fn cmd_sub(args: SubCmd) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        SubAction::Add(a) => {
            let (mut ws, _lock) = load_workspace_locked()?;
            let id = sheet_ops::add_sub_topic(&mut ws.sheet.topics, &a.topic_id, &a.name)?;
            save_sheet(&ws)?;
            println!("{}", id);
        }
        SubAction::Rename(a) => {
            let (mut ws, _lock) = load_workspace_locked()?;
            sheet_ops::edit_sub_topic(&mut ws.sheet.topics, &a.id, &a.name)?;
            save_sheet(&ws)?;
            println!("{} renamed", a.id);
        }
        SubAction::Rm(a) => {
            if !a.yes {
                let ws = load_workspace_cwd()?;
                let (_, sub) = sheet_ops::find_sub_topic(&ws.sheet.topics, &a.id)
                    .ok_or_else(|| SheetError::SubTopicNotFound(a.id.clone()))?;
                if !sub.questions.is_empty() {
                    let prompt = format!(
                        "delete sub-topic \"{}\" with {} questions?",
                        sub.name,
                        sub.questions.len()
                    );
                    if !confirm(&prompt)? {
                        println!("cancelled");
                        return Ok(());
                    }
                }
            }
            let (mut ws, _lock) = load_workspace_locked()?;
            let removed = sheet_ops::delete_sub_topic(&mut ws.sheet.topics, &a.id)?;
            save_sheet(&ws)?;
            println!("deleted sub-topic \"{}\"", removed.name);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Question handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut ws, _lock) = load_workspace_locked()?;

    let id = sheet_ops::add_question(
        &mut ws.sheet.topics,
        &args.sub_id,
        NewQuestion {
            title: args.title,
            difficulty: args.difficulty,
            url: args.url,
            video: args.video,
        },
    )?;

    save_sheet(&ws)?;
    println!("{}", id);
    Ok(())
}

fn cmd_edit(args: EditArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.title.is_none() && args.difficulty.is_none() && args.url.is_none() && args.video.is_none() {
        return Err("nothing to change: pass --title, --difficulty, --url or --video".into());
    }
    let (mut ws, _lock) = load_workspace_locked()?;

    sheet_ops::edit_question(
        &mut ws.sheet.topics,
        &args.id,
        QuestionEdit {
            title: args.title,
            difficulty: args.difficulty,
            url: args.url,
            video: args.video,
        },
    )?;

    save_sheet(&ws)?;
    println!("{} updated", args.id);
    Ok(())
}

fn cmd_rm(args: RmArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut ws, _lock) = load_workspace_locked()?;
    let removed = sheet_ops::delete_question(&mut ws.sheet.topics, &args.id)?;
    save_sheet(&ws)?;
    println!("deleted question \"{}\"", removed.title);
    Ok(())
}

fn cmd_note(args: NoteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut ws, _lock) = load_workspace_locked()?;
    let text = args.text.unwrap_or_default();
    sheet_ops::update_note(&mut ws.sheet.topics, &args.id, &text)?;
    save_sheet(&ws)?;
    if text.trim().is_empty() {
        println!("{} note cleared", args.id);
    } else {
        println!("{} note updated", args.id);
    }
    Ok(())
}

fn cmd_toggle(args: ToggleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut ws, _lock) = load_workspace_locked()?;
    let solved = sheet_ops::toggle_solved(&mut ws.sheet.topics, &args.id)?;
    save_sheet(&ws)?;
    println!("{} {}", args.id, if solved { "solved" } else { "unsolved" });
    Ok(())
}

// ---------------------------------------------------------------------------
// Moves and history
// ---------------------------------------------------------------------------

fn cmd_mv(args: MvArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut ws, _lock) = load_workspace_locked()?;

    let active = move_ops::resolve(&ws.sheet.topics, &args.id)?;
    let over = move_ops::resolve(&ws.sheet.topics, &args.target)?;

    match move_ops::move_with_history(&mut ws.sheet.topics, &mut ws.history, &active, &over)? {
        MoveOutcome::Moved => {
            workspace_io::save_workspace(&ws)?;
            println!("moved {} {} onto {}", active.kind, active.id, over.id);
        }
        MoveOutcome::Unchanged => println!("nothing to move"),
    }
    Ok(())
}

fn cmd_undo() -> Result<(), Box<dyn std::error::Error>> {
    let (mut ws, _lock) = load_workspace_locked()?;

    if undo::undo(&mut ws.sheet.topics, &mut ws.history) {
        workspace_io::save_workspace(&ws)?;
        println!("undone ({} more in history)", ws.history.len());
    } else {
        println!("nothing to undo");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_import(args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut ws, _lock) = load_workspace_locked()?;

    if !ws.sheet.is_empty() && !args.replace {
        return Err("sheet already has topics; pass --replace to overwrite it".into());
    }

    let text = if args.file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.file)
            .map_err(|e| format!("could not read {}: {}", args.file, e))?
    };

    let result = import::import_sheet(&text, &ws.config.import)?;
    ws.sheet.topics = result.topics;
    ws.history.clear();
    workspace_io::save_workspace(&ws)?;

    println!(
        "imported {} questions in {} topics",
        result.question_count,
        ws.sheet.topics.len()
    );
    Ok(())
}

fn cmd_config(args: ConfigCmd) -> Result<(), Box<dyn std::error::Error>> {
    let root = workspace_io::discover_workspace(&start_dir()?)?;
    let sheet_dir = root.join(SHEET_DIR);

    match args.action {
        ConfigAction::Get(a) => {
            let (config, _) = config_io::read_config(&sheet_dir)?;
            println!("{}", config_io::get_value(&config, &a.key)?);
        }
        ConfigAction::Set(a) => {
            let _lock = SheetLock::acquire(&sheet_dir)?;
            let (_, mut doc) = config_io::read_config(&sheet_dir)?;
            config_io::set_value(&mut doc, &a.key, &a.value)?;
            config_io::write_config(&sheet_dir, &doc)?;

            let (config, _) = config_io::read_config(&sheet_dir)?;
            if a.key == "undo.limit" {
                // Trim stored history right away
                let mut history = workspace_io::read_history(&sheet_dir)?;
                if history.len() > config.undo.limit {
                    history.set_limit(config.undo.limit);
                    workspace_io::save_history(&sheet_dir, &history)?;
                }
            }
            println!("{} = {}", a.key, config_io::get_value(&config, &a.key)?);
        }
    }
    Ok(())
}
