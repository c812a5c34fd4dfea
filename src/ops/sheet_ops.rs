use chrono::Utc;
use serde::Serialize;

use crate::model::question::{Difficulty, Question};
use crate::model::topic::{SubTopic, Topic};

/// Error type for sheet CRUD operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SheetError {
    #[error("topic not found: {0}")]
    TopicNotFound(String),
    #[error("sub-topic not found: {0}")]
    SubTopicNotFound(String),
    #[error("question not found: {0}")]
    QuestionNotFound(String),
    #[error("name cannot be empty")]
    EmptyName,
}

/// The three levels of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Topic,
    #[serde(rename = "subtopic")]
    SubTopic,
    Question,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Topic => write!(f, "topic"),
            ItemKind::SubTopic => write!(f, "sub-topic"),
            ItemKind::Question => write!(f, "question"),
        }
    }
}

/// Where an id lives in the tree, as indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Topic {
        topic: usize,
    },
    SubTopic {
        topic: usize,
        sub: usize,
    },
    Question {
        topic: usize,
        sub: usize,
        question: usize,
    },
}

impl Location {
    pub fn kind(&self) -> ItemKind {
        match self {
            Location::Topic { .. } => ItemKind::Topic,
            Location::SubTopic { .. } => ItemKind::SubTopic,
            Location::Question { .. } => ItemKind::Question,
        }
    }
}

/// Fields for a new question. Missing difficulty defaults to Medium.
#[derive(Debug, Clone, Default)]
pub struct NewQuestion {
    pub title: String,
    pub difficulty: Option<Difficulty>,
    pub url: Option<String>,
    pub video: Option<String>,
}

/// A partial question edit. `None` leaves the field unchanged; an empty
/// `url`/`video` string clears the link.
#[derive(Debug, Clone, Default)]
pub struct QuestionEdit {
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub url: Option<String>,
    pub video: Option<String>,
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Resolve an id anywhere in the tree. Topics are searched first, then
/// sub-topics, then questions.
pub fn locate(topics: &[Topic], id: &str) -> Option<Location> {
    if let Some(topic) = topics.iter().position(|t| t.id == id) {
        return Some(Location::Topic { topic });
    }
    for (ti, topic) in topics.iter().enumerate() {
        if let Some(sub) = topic.sub_topics.iter().position(|s| s.id == id) {
            return Some(Location::SubTopic { topic: ti, sub });
        }
    }
    for (ti, topic) in topics.iter().enumerate() {
        for (si, sub) in topic.sub_topics.iter().enumerate() {
            if let Some(question) = sub.questions.iter().position(|q| q.id == id) {
                return Some(Location::Question {
                    topic: ti,
                    sub: si,
                    question,
                });
            }
        }
    }
    None
}

pub fn find_topic<'a>(topics: &'a [Topic], id: &str) -> Option<&'a Topic> {
    topics.iter().find(|t| t.id == id)
}

/// Find a sub-topic along with its parent topic
pub fn find_sub_topic<'a>(topics: &'a [Topic], id: &str) -> Option<(&'a Topic, &'a SubTopic)> {
    match locate(topics, id)? {
        Location::SubTopic { topic, sub } => {
            let t = &topics[topic];
            Some((t, &t.sub_topics[sub]))
        }
        _ => None,
    }
}

/// Find a question along with its parent topic and sub-topic
pub fn find_question<'a>(
    topics: &'a [Topic],
    id: &str,
) -> Option<(&'a Topic, &'a SubTopic, &'a Question)> {
    match locate(topics, id)? {
        Location::Question {
            topic,
            sub,
            question,
        } => {
            let t = &topics[topic];
            let s = &t.sub_topics[sub];
            Some((t, s, &s.questions[question]))
        }
        _ => None,
    }
}

fn topic_mut<'a>(topics: &'a mut [Topic], id: &str) -> Result<&'a mut Topic, SheetError> {
    topics
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| SheetError::TopicNotFound(id.to_string()))
}

fn sub_topic_mut<'a>(topics: &'a mut [Topic], id: &str) -> Result<&'a mut SubTopic, SheetError> {
    topics
        .iter_mut()
        .flat_map(|t| t.sub_topics.iter_mut())
        .find(|s| s.id == id)
        .ok_or_else(|| SheetError::SubTopicNotFound(id.to_string()))
}

fn question_mut<'a>(topics: &'a mut [Topic], id: &str) -> Result<&'a mut Question, SheetError> {
    topics
        .iter_mut()
        .flat_map(|t| t.sub_topics.iter_mut())
        .flat_map(|s| s.questions.iter_mut())
        .find(|q| q.id == id)
        .ok_or_else(|| SheetError::QuestionNotFound(id.to_string()))
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

pub fn add_topic(topics: &mut Vec<Topic>, name: &str) -> Result<String, SheetError> {
    let name = clean_name(name)?;
    let id = new_id(topics, "t");
    topics.push(Topic::new(id.clone(), name));
    Ok(id)
}

pub fn edit_topic(topics: &mut [Topic], id: &str, name: &str) -> Result<(), SheetError> {
    let name = clean_name(name)?;
    topic_mut(topics, id)?.name = name;
    Ok(())
}

/// Remove a topic with everything under it. Returns the removed topic.
pub fn delete_topic(topics: &mut Vec<Topic>, id: &str) -> Result<Topic, SheetError> {
    let idx = topics
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| SheetError::TopicNotFound(id.to_string()))?;
    Ok(topics.remove(idx))
}

// ---------------------------------------------------------------------------
// Sub-topics
// ---------------------------------------------------------------------------

pub fn add_sub_topic(
    topics: &mut [Topic],
    topic_id: &str,
    name: &str,
) -> Result<String, SheetError> {
    let name = clean_name(name)?;
    let id = new_id(topics, "st");
    topic_mut(topics, topic_id)?
        .sub_topics
        .push(SubTopic::new(id.clone(), name));
    Ok(id)
}

pub fn edit_sub_topic(topics: &mut [Topic], sub_id: &str, name: &str) -> Result<(), SheetError> {
    let name = clean_name(name)?;
    sub_topic_mut(topics, sub_id)?.name = name;
    Ok(())
}

/// Remove a sub-topic with its questions. Returns the removed sub-topic.
pub fn delete_sub_topic(topics: &mut [Topic], sub_id: &str) -> Result<SubTopic, SheetError> {
    for topic in topics.iter_mut() {
        if let Some(idx) = topic.sub_topics.iter().position(|s| s.id == sub_id) {
            return Ok(topic.sub_topics.remove(idx));
        }
    }
    Err(SheetError::SubTopicNotFound(sub_id.to_string()))
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

pub fn add_question(
    topics: &mut [Topic],
    sub_id: &str,
    new: NewQuestion,
) -> Result<String, SheetError> {
    let title = clean_name(&new.title)?;
    let id = new_id(topics, "q");
    let mut question = Question::new(id.clone(), title, new.difficulty.unwrap_or_default());
    question.url = non_empty(new.url);
    question.video = non_empty(new.video);
    sub_topic_mut(topics, sub_id)?.questions.push(question);
    Ok(id)
}

pub fn edit_question(topics: &mut [Topic], q_id: &str, edit: QuestionEdit) -> Result<(), SheetError> {
    let title = edit.title.as_deref().map(clean_name).transpose()?;
    let question = question_mut(topics, q_id)?;
    if let Some(title) = title {
        question.title = title;
    }
    if let Some(difficulty) = edit.difficulty {
        question.difficulty = difficulty;
    }
    if let Some(url) = edit.url {
        question.url = non_empty(Some(url));
    }
    if let Some(video) = edit.video {
        question.video = non_empty(Some(video));
    }
    Ok(())
}

pub fn delete_question(topics: &mut [Topic], q_id: &str) -> Result<Question, SheetError> {
    for sub in topics.iter_mut().flat_map(|t| t.sub_topics.iter_mut()) {
        if let Some(idx) = sub.questions.iter().position(|q| q.id == q_id) {
            return Ok(sub.questions.remove(idx));
        }
    }
    Err(SheetError::QuestionNotFound(q_id.to_string()))
}

/// Replace a question's note. An empty note clears it.
pub fn update_note(topics: &mut [Topic], q_id: &str, note: &str) -> Result<(), SheetError> {
    question_mut(topics, q_id)?.note = note.trim_end().to_string();
    Ok(())
}

/// Flip the solved flag. Returns the new value.
pub fn toggle_solved(topics: &mut [Topic], q_id: &str) -> Result<bool, SheetError> {
    let question = question_mut(topics, q_id)?;
    question.solved = !question.solved;
    Ok(question.solved)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn clean_name(name: &str) -> Result<String, SheetError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SheetError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Timestamp-based id (`<prefix>-<millis>`), bumped until it is unused anywhere in the tree.
fn new_id(topics: &[Topic], prefix: &str) -> String {
    let mut stamp = Utc::now().timestamp_millis();
    loop {
        let id = format!("{}-{}", prefix, stamp);
        if locate(topics, &id).is_none() {
            return id;
        }
        stamp += 1;
    }
}
