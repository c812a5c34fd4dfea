use serde::Serialize;

use crate::model::config::DisplayConfig;
use crate::model::question::{Difficulty, Question};
use crate::model::topic::{SubTopic, Topic};
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::sheet_ops::{ItemKind, find_sub_topic, find_topic};
use crate::ops::stats::{Progress, SheetStats};
use crate::util::unicode::{display_width, fit_to_width};

/// Widest topic label in the stats table before truncation
const TOPIC_COLUMN_MAX: usize = 40;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct QuestionJson {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Serialize)]
pub struct SubTopicJson {
    pub id: String,
    pub name: String,
    pub progress: Progress,
    pub questions: Vec<QuestionJson>,
}

#[derive(Serialize)]
pub struct TopicJson {
    pub id: String,
    pub name: String,
    pub progress: Progress,
    pub sub_topics: Vec<SubTopicJson>,
}

#[derive(Serialize)]
pub struct SheetJson {
    pub name: String,
    pub progress: Progress,
    pub topics: Vec<TopicJson>,
}

#[derive(Serialize)]
pub struct SearchJson {
    pub query: String,
    pub matches: usize,
    pub topics: Vec<TopicJson>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ItemJson {
    Topic(TopicJson),
    SubTopic(SubTopicJson),
    Question(QuestionJson),
}

#[derive(Serialize)]
pub struct ShowJson {
    pub kind: ItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_topic: Option<String>,
    pub item: ItemJson,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub name: String,
    #[serde(flatten)]
    pub stats: SheetStats,
    pub topics: Vec<TopicProgressJson>,
}

#[derive(Serialize)]
pub struct TopicProgressJson {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub progress: Progress,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

// Progress always comes from `full`, so a filtered view still reports the
// real completion of each container it shows.

fn topic_progress(topic: &Topic, full: &[Topic]) -> Progress {
    Progress::of_topic(find_topic(full, &topic.id).unwrap_or(topic))
}

fn sub_topic_progress(sub: &SubTopic, full: &[Topic]) -> Progress {
    match find_sub_topic(full, &sub.id) {
        Some((_, s)) => Progress::of_sub_topic(s),
        None => Progress::of_sub_topic(sub),
    }
}

pub fn question_to_json(q: &Question) -> QuestionJson {
    QuestionJson {
        id: q.id.clone(),
        title: q.title.clone(),
        difficulty: q.difficulty,
        solved: q.solved,
        url: q.url.clone(),
        video: q.video.clone(),
        note: q.has_note().then(|| q.note.clone()),
    }
}

pub fn sub_topic_to_json(sub: &SubTopic, full: &[Topic]) -> SubTopicJson {
    SubTopicJson {
        id: sub.id.clone(),
        name: sub.name.clone(),
        progress: sub_topic_progress(sub, full),
        questions: sub.questions.iter().map(question_to_json).collect(),
    }
}

pub fn topic_to_json(topic: &Topic, full: &[Topic]) -> TopicJson {
    TopicJson {
        id: topic.id.clone(),
        name: topic.name.clone(),
        progress: topic_progress(topic, full),
        sub_topics: topic
            .sub_topics
            .iter()
            .map(|s| sub_topic_to_json(s, full))
            .collect(),
    }
}

pub fn topics_to_json(shown: &[Topic], full: &[Topic]) -> Vec<TopicJson> {
    shown.iter().map(|t| topic_to_json(t, full)).collect()
}

pub fn sheet_progress(full: &[Topic]) -> Progress {
    Progress::new(
        full.iter().map(Topic::solved_count).sum(),
        full.iter().map(Topic::question_count).sum(),
    )
}

pub fn stats_to_json(name: &str, stats: SheetStats, full: &[Topic]) -> StatsJson {
    StatsJson {
        name: name.to_string(),
        stats,
        topics: full
            .iter()
            .map(|t| TopicProgressJson {
                id: t.id.clone(),
                name: t.name.clone(),
                progress: Progress::of_topic(t),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn check_char(solved: bool) -> char {
    if solved { 'x' } else { ' ' }
}

fn label(name: &str, id: &str, display: &DisplayConfig) -> String {
    if display.show_ids {
        format!("{} ({})", name, id)
    } else {
        name.to_string()
    }
}

fn format_progress(p: &Progress) -> String {
    format!("{}/{} {}%", p.solved, p.total, p.percent)
}

/// Format a single question as a one-line summary
pub fn format_question_line(q: &Question, display: &DisplayConfig) -> String {
    let mut line = format!("[{}] {} ", check_char(q.solved), q.difficulty.letter());
    if display.show_ids {
        line.push_str(&q.id);
        line.push(' ');
    }
    line.push_str(&q.title);
    if q.has_note() {
        line.push_str(" [note]");
    }
    if display.show_links
        && let Some(url) = &q.url
    {
        line.push_str(&format!(" <{}>", url));
    }
    line
}

/// Format a sub-topic header and its questions
pub fn format_sub_topic_tree(
    sub: &SubTopic,
    full: &[Topic],
    display: &DisplayConfig,
    indent: usize,
) -> Vec<String> {
    let prefix = "  ".repeat(indent);
    let mut lines = vec![format!(
        "{}{}  {}",
        prefix,
        label(&sub.name, &sub.id, display),
        format_progress(&sub_topic_progress(sub, full))
    )];
    for q in &sub.questions {
        lines.push(format!("{}  {}", prefix, format_question_line(q, display)));
    }
    lines
}

/// Format a topic header followed by its sub-topics
pub fn format_topic_tree(topic: &Topic, full: &[Topic], display: &DisplayConfig) -> Vec<String> {
    let mut lines = vec![format!(
        "{}  {}",
        label(&topic.name, &topic.id, display),
        format_progress(&topic_progress(topic, full))
    )];
    for sub in &topic.sub_topics {
        lines.extend(format_sub_topic_tree(sub, full, display, 1));
    }
    lines
}

/// Format the sheet header line
pub fn format_sheet_header(name: &str, full: &[Topic]) -> String {
    let p = sheet_progress(full);
    format!("== {} ==  {}/{} solved ({}%)", name, p.solved, p.total, p.percent)
}

/// Format a listing of `shown` topics, blank line between topics
pub fn format_topic_listing(shown: &[Topic], full: &[Topic], display: &DisplayConfig) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, topic) in shown.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(format_topic_tree(topic, full, display));
    }
    lines
}

/// Format detailed question view
pub fn format_question_detail(topic: &Topic, sub: &SubTopic, q: &Question) -> Vec<String> {
    let mut lines = vec![format!("[{}] {} {}", check_char(q.solved), q.id, q.title)];
    lines.push(format!("difficulty: {}", q.difficulty));
    lines.push(format!(
        "in: {} ({}) / {} ({})",
        topic.name, topic.id, sub.name, sub.id
    ));
    if let Some(url) = &q.url {
        lines.push(format!("url: {}", url));
    }
    if let Some(video) = &q.video {
        lines.push(format!("video: {}", video));
    }
    if q.has_note() {
        lines.push("note:".to_string());
        for line in q.note.lines() {
            lines.push(format!("  {}", line));
        }
    }
    lines
}

/// Format the difficulty breakdown and completion summary
pub fn format_stats(name: &str, stats: &SheetStats, full: &[Topic]) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: {}/{} solved ({}%)",
        name, stats.solved, stats.total, stats.percent
    )];
    lines.push(format!("[{}]", format_difficulty_bar(stats, 30)));
    for d in &stats.difficulties {
        lines.push(format!(
            "  {:<6}  {}/{}  {} left  {:.0}% of sheet",
            d.difficulty.as_str(),
            d.solved,
            d.total,
            d.remaining,
            d.segment_width
        ));
    }
    if !full.is_empty() {
        lines.push(String::new());
        let labels: Vec<String> = full
            .iter()
            .map(|t| format!("{} ({})", t.name, t.id))
            .collect();
        let column = labels
            .iter()
            .map(|l| display_width(l))
            .max()
            .unwrap_or(0)
            .min(TOPIC_COLUMN_MAX);
        for (topic, label) in full.iter().zip(&labels) {
            lines.push(format!(
                "  {}  {}",
                fit_to_width(label, column),
                format_progress(&Progress::of_topic(topic))
            ));
        }
    }
    lines
}

/// Render the segmented progress bar: one segment per difficulty sized by its
/// share of the sheet, filled by its solved share. Segments are separated by `|`.
pub fn format_difficulty_bar(stats: &SheetStats, width: usize) -> String {
    if stats.total == 0 {
        return "\u{2591}".repeat(width);
    }
    let mut segments = Vec::new();
    for d in &stats.difficulties {
        let cells = (d.segment_width / 100.0 * width as f64).round() as usize;
        if cells == 0 {
            continue;
        }
        let filled = ((d.fill_progress / 100.0 * cells as f64).round() as usize).min(cells);
        segments.push(format!(
            "{}{}",
            "\u{2588}".repeat(filled),
            "\u{2591}".repeat(cells - filled)
        ));
    }
    segments.join("|")
}

/// Format check results. Returns no lines besides the verdict for a clean sheet.
pub fn format_check(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    if !result.errors.is_empty() {
        lines.push("Errors:".to_string());
        for err in &result.errors {
            lines.push(match err {
                CheckError::DuplicateId { id, kinds } => format!(
                    "  {} is used by {} items: {}",
                    id,
                    kinds.len(),
                    kinds
                        .iter()
                        .map(|k| k.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                CheckError::BlankName { id, kind } => format!("  {} {} has a blank name", kind, id),
                CheckError::BlankId { kind, name } => format!("  {} \"{}\" has no id", kind, name),
                CheckError::HistoryOverLimit { len, limit } => format!(
                    "  undo history has {} snapshots (limit {})",
                    len, limit
                ),
            });
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            lines.push(String::new());
        }
        lines.push("Warnings:".to_string());
        for warn in &result.warnings {
            lines.push(match warn {
                CheckWarning::EmptySubTopic { id } => format!("  sub-topic {} has no questions", id),
                CheckWarning::MissingUrl { id } => format!("  question {} has no url", id),
            });
        }
    }
    if result.valid {
        lines.push("\u{2713} sheet is valid".to_string());
    } else {
        lines.push("\u{2717} sheet has errors".to_string());
    }
    lines
}
