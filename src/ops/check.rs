use indexmap::IndexMap;
use serde::Serialize;

use crate::model::topic::Topic;
use crate::ops::sheet_ops::ItemKind;

/// Structured result from `sheet check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (something that should be fixed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// The same id is used by more than one item
    #[serde(rename = "duplicate_id")]
    DuplicateId { id: String, kinds: Vec<ItemKind> },
    /// A topic or sub-topic name, or a question title, is blank
    #[serde(rename = "blank_name")]
    BlankName { id: String, kind: ItemKind },
    /// An item has an empty id
    #[serde(rename = "blank_id")]
    BlankId { kind: ItemKind, name: String },
    /// Stored undo history is longer than `[undo] limit`
    #[serde(rename = "history_over_limit")]
    HistoryOverLimit { len: usize, limit: usize },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Sub-topic without questions
    #[serde(rename = "empty_sub_topic")]
    EmptySubTopic { id: String },
    /// Question with no problem link
    #[serde(rename = "missing_url")]
    MissingUrl { id: String },
}

/// Validate the tree and the stored history length.
///
/// Read-only. `history_len` is the number of snapshots on disk before any
/// truncation.
pub fn check_sheet(topics: &[Topic], history_len: usize, limit: usize) -> CheckResult {
    let mut result = CheckResult::default();

    // id -> kinds, in first-seen order
    let mut seen: IndexMap<&str, Vec<ItemKind>> = IndexMap::new();
    for topic in topics {
        check_names(&topic.id, ItemKind::Topic, &topic.name, &mut result);
        note_id(&mut seen, &topic.id, ItemKind::Topic);
        for sub in &topic.sub_topics {
            check_names(&sub.id, ItemKind::SubTopic, &sub.name, &mut result);
            note_id(&mut seen, &sub.id, ItemKind::SubTopic);
            if sub.questions.is_empty() {
                result
                    .warnings
                    .push(CheckWarning::EmptySubTopic { id: sub.id.clone() });
            }
            for q in &sub.questions {
                check_names(&q.id, ItemKind::Question, &q.title, &mut result);
                note_id(&mut seen, &q.id, ItemKind::Question);
                if q.url.is_none() {
                    result
                        .warnings
                        .push(CheckWarning::MissingUrl { id: q.id.clone() });
                }
            }
        }
    }

    for (id, kinds) in seen {
        if id.trim().is_empty() || kinds.len() < 2 {
            continue;
        }
        result.errors.push(CheckError::DuplicateId {
            id: id.to_string(),
            kinds,
        });
    }

    if history_len > limit {
        result.errors.push(CheckError::HistoryOverLimit {
            len: history_len,
            limit,
        });
    }

    result.valid = result.errors.is_empty();
    result
}

fn check_names(id: &str, kind: ItemKind, name: &str, result: &mut CheckResult) {
    if id.trim().is_empty() {
        result.errors.push(CheckError::BlankId {
            kind,
            name: name.to_string(),
        });
    }
    if name.trim().is_empty() {
        result.errors.push(CheckError::BlankName {
            id: id.to_string(),
            kind,
        });
    }
}

fn note_id<'a>(seen: &mut IndexMap<&'a str, Vec<ItemKind>>, id: &'a str, kind: ItemKind) {
    seen.entry(id).or_default().push(kind);
}
