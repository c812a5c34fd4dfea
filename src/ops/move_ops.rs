use serde::Serialize;

use crate::model::topic::Topic;
use crate::ops::sheet_ops::{ItemKind, Location, locate};
use crate::ops::undo::UndoStack;

/// One end of a move: the dragged item or the drop target.
///
/// `parent` is the containing topic id for a sub-topic and the containing
/// sub-topic id for a question. Topics have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRef {
    pub id: String,
    pub kind: ItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Error type for move operations. A failed move leaves the tree untouched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("cannot drop a {dragged} onto a {target}")]
    InvalidTarget { dragged: ItemKind, target: ItemKind },
    #[error("{0} has no parent reference")]
    MissingParent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Item dropped onto itself
    Unchanged,
}

/// Build an `ItemRef` for an id by looking up its kind and parent in the tree.
pub fn resolve(topics: &[Topic], id: &str) -> Result<ItemRef, MoveError> {
    let location = locate(topics, id).ok_or_else(|| MoveError::NotFound(id.to_string()))?;
    let parent = match location {
        Location::Topic { .. } => None,
        Location::SubTopic { topic, .. } => Some(topics[topic].id.clone()),
        Location::Question { topic, sub, .. } => Some(topics[topic].sub_topics[sub].id.clone()),
    };
    Ok(ItemRef {
        id: id.to_string(),
        kind: location.kind(),
        parent,
    })
}

/// Relocate `active` relative to `over`.
///
/// - Topics only drop onto topics and take the target's index (moving down
///   lands after the target, moving up lands before it).
/// - Sub-topics drop onto a topic (append) or onto a sub-topic (insert before
///   it, in that sub-topic's topic).
/// - Questions drop onto a sub-topic (append) or onto a question (insert
///   before it, in that question's sub-topic).
///
/// Every lookup happens before the tree is touched.
pub fn move_item(
    topics: &mut Vec<Topic>,
    active: &ItemRef,
    over: &ItemRef,
) -> Result<MoveOutcome, MoveError> {
    if active.id == over.id {
        return Ok(MoveOutcome::Unchanged);
    }
    match active.kind {
        ItemKind::Topic => move_topic(topics, active, over),
        ItemKind::SubTopic => move_sub_topic(topics, active, over),
        ItemKind::Question => move_question(topics, active, over),
    }?;
    tracing::debug!(
        id = %active.id,
        kind = %active.kind,
        target = %over.id,
        "moved item"
    );
    Ok(MoveOutcome::Moved)
}

/// Apply a move and, if anything changed, push the pre-move tree onto `history`.
pub fn move_with_history(
    topics: &mut Vec<Topic>,
    history: &mut UndoStack,
    active: &ItemRef,
    over: &ItemRef,
) -> Result<MoveOutcome, MoveError> {
    let snapshot = topics.clone();
    let outcome = move_item(topics, active, over)?;
    if outcome == MoveOutcome::Moved {
        history.push(snapshot);
    }
    Ok(outcome)
}

fn move_topic(topics: &mut Vec<Topic>, active: &ItemRef, over: &ItemRef) -> Result<(), MoveError> {
    if over.kind != ItemKind::Topic {
        return Err(MoveError::InvalidTarget {
            dragged: active.kind,
            target: over.kind,
        });
    }
    let old_index = topic_index(topics, &active.id)?;
    let new_index = topic_index(topics, &over.id)?;
    let topic = topics.remove(old_index);
    topics.insert(new_index, topic);
    Ok(())
}

fn move_sub_topic(topics: &mut [Topic], active: &ItemRef, over: &ItemRef) -> Result<(), MoveError> {
    let dest_topic_id = match over.kind {
        ItemKind::Topic => over.id.as_str(),
        ItemKind::SubTopic => parent_of(over)?,
        ItemKind::Question => {
            return Err(MoveError::InvalidTarget {
                dragged: active.kind,
                target: over.kind,
            });
        }
    };
    let source = topic_index(topics, parent_of(active)?)?;
    let dest = topic_index(topics, dest_topic_id)?;
    let active_index = topics[source]
        .sub_topics
        .iter()
        .position(|s| s.id == active.id)
        .ok_or_else(|| MoveError::NotFound(active.id.clone()))?;

    let moved = topics[source].sub_topics.remove(active_index);
    let dest_subs = &mut topics[dest].sub_topics;
    match dest_subs.iter().position(|s| s.id == over.id) {
        Some(over_index) => dest_subs.insert(over_index, moved),
        None => dest_subs.push(moved),
    }
    Ok(())
}

fn move_question(topics: &mut [Topic], active: &ItemRef, over: &ItemRef) -> Result<(), MoveError> {
    let dest_sub_id = match over.kind {
        ItemKind::SubTopic => over.id.as_str(),
        ItemKind::Question => parent_of(over)?,
        ItemKind::Topic => {
            return Err(MoveError::InvalidTarget {
                dragged: active.kind,
                target: over.kind,
            });
        }
    };
    let (src_t, src_s) = sub_topic_index(topics, parent_of(active)?)?;
    let (dst_t, dst_s) = sub_topic_index(topics, dest_sub_id)?;
    let active_index = topics[src_t].sub_topics[src_s]
        .questions
        .iter()
        .position(|q| q.id == active.id)
        .ok_or_else(|| MoveError::NotFound(active.id.clone()))?;

    let moved = topics[src_t].sub_topics[src_s]
        .questions
        .remove(active_index);
    let dest_questions = &mut topics[dst_t].sub_topics[dst_s].questions;
    match dest_questions.iter().position(|q| q.id == over.id) {
        Some(over_index) => dest_questions.insert(over_index, moved),
        None => dest_questions.push(moved),
    }
    Ok(())
}

fn parent_of(item: &ItemRef) -> Result<&str, MoveError> {
    item.parent
        .as_deref()
        .ok_or_else(|| MoveError::MissingParent(item.id.clone()))
}

fn topic_index(topics: &[Topic], id: &str) -> Result<usize, MoveError> {
    topics
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| MoveError::NotFound(id.to_string()))
}

fn sub_topic_index(topics: &[Topic], id: &str) -> Result<(usize, usize), MoveError> {
    for (ti, topic) in topics.iter().enumerate() {
        if let Some(si) = topic.sub_topics.iter().position(|s| s.id == id) {
            return Ok((ti, si));
        }
    }
    Err(MoveError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::undo;
    use pretty_assertions::assert_eq;

    fn sample_topics() -> Vec<Topic> {
        serde_json::from_str(
            r#"[
              {"id":"t-a","name":"A","sub_topics":[
                {"id":"st-a1","name":"A1","questions":[
                  {"id":"q-1","title":"one"},
                  {"id":"q-2","title":"two"},
                  {"id":"q-3","title":"three"}
                ]},
                {"id":"st-a2","name":"A2","questions":[
                  {"id":"q-4","title":"four"}
                ]}
              ]},
              {"id":"t-b","name":"B","sub_topics":[
                {"id":"st-b1","name":"B1","questions":[]}
              ]},
              {"id":"t-c","name":"C","sub_topics":[]}
            ]"#,
        )
        .unwrap()
    }

    fn topic_ids(topics: &[Topic]) -> Vec<&str> {
        topics.iter().map(|t| t.id.as_str()).collect()
    }

    fn sub_ids<'a>(topics: &'a [Topic], topic_id: &str) -> Vec<&'a str> {
        topics
            .iter()
            .find(|t| t.id == topic_id)
            .unwrap()
            .sub_topics
            .iter()
            .map(|s| s.id.as_str())
            .collect()
    }

    fn question_ids<'a>(topics: &'a [Topic], sub_id: &str) -> Vec<&'a str> {
        topics
            .iter()
            .flat_map(|t| t.sub_topics.iter())
            .find(|s| s.id == sub_id)
            .unwrap()
            .questions
            .iter()
            .map(|q| q.id.as_str())
            .collect()
    }

    fn do_move(topics: &mut Vec<Topic>, active: &str, over: &str) -> Result<MoveOutcome, MoveError> {
        let a = resolve(topics, active)?;
        let o = resolve(topics, over)?;
        move_item(topics, &a, &o)
    }

    // --- resolve ---

    #[test]
    fn test_resolve_sets_kind_and_parent() {
        let topics = sample_topics();
        assert_eq!(
            resolve(&topics, "t-b").unwrap(),
            ItemRef {
                id: "t-b".into(),
                kind: ItemKind::Topic,
                parent: None
            }
        );
        assert_eq!(resolve(&topics, "st-a2").unwrap().parent.as_deref(), Some("t-a"));
        let q = resolve(&topics, "q-4").unwrap();
        assert_eq!(q.kind, ItemKind::Question);
        assert_eq!(q.parent.as_deref(), Some("st-a2"));
        assert_eq!(resolve(&topics, "zz"), Err(MoveError::NotFound("zz".into())));
    }

    // --- topics ---

    #[test]
    fn test_topic_moves_down_after_target() {
        let mut topics = sample_topics();
        do_move(&mut topics, "t-a", "t-c").unwrap();
        assert_eq!(topic_ids(&topics), vec!["t-b", "t-c", "t-a"]);
    }

    #[test]
    fn test_topic_moves_up_before_target() {
        let mut topics = sample_topics();
        do_move(&mut topics, "t-c", "t-a").unwrap();
        assert_eq!(topic_ids(&topics), vec!["t-c", "t-a", "t-b"]);
    }

    #[test]
    fn test_topic_onto_sub_topic_is_rejected() {
        let mut topics = sample_topics();
        let before = topics.clone();
        let err = do_move(&mut topics, "t-a", "st-b1").unwrap_err();
        assert_eq!(
            err,
            MoveError::InvalidTarget {
                dragged: ItemKind::Topic,
                target: ItemKind::SubTopic
            }
        );
        assert_eq!(topics, before);
    }

    // --- sub-topics ---

    #[test]
    fn test_sub_topic_reorder_within_topic_inserts_before_target() {
        let mut topics = sample_topics();
        do_move(&mut topics, "st-a2", "st-a1").unwrap();
        assert_eq!(sub_ids(&topics, "t-a"), vec!["st-a2", "st-a1"]);
    }

    #[test]
    fn test_sub_topic_onto_topic_appends() {
        let mut topics = sample_topics();
        do_move(&mut topics, "st-a1", "t-b").unwrap();
        assert_eq!(sub_ids(&topics, "t-a"), vec!["st-a2"]);
        assert_eq!(sub_ids(&topics, "t-b"), vec!["st-b1", "st-a1"]);
        // Questions travel with their sub-topic
        assert_eq!(question_ids(&topics, "st-a1"), vec!["q-1", "q-2", "q-3"]);
    }

    #[test]
    fn test_sub_topic_onto_empty_topic() {
        let mut topics = sample_topics();
        do_move(&mut topics, "st-b1", "t-c").unwrap();
        assert!(sub_ids(&topics, "t-b").is_empty());
        assert_eq!(sub_ids(&topics, "t-c"), vec!["st-b1"]);
    }

    #[test]
    fn test_sub_topic_across_topics_before_target() {
        let mut topics = sample_topics();
        do_move(&mut topics, "st-b1", "st-a2").unwrap();
        assert_eq!(sub_ids(&topics, "t-a"), vec!["st-a1", "st-b1", "st-a2"]);
    }

    #[test]
    fn test_sub_topic_onto_question_is_rejected() {
        let mut topics = sample_topics();
        let before = topics.clone();
        assert!(do_move(&mut topics, "st-b1", "q-1").is_err());
        assert_eq!(topics, before);
    }

    // --- questions ---

    #[test]
    fn test_question_reorder_within_sub_topic() {
        let mut topics = sample_topics();
        do_move(&mut topics, "q-3", "q-1").unwrap();
        assert_eq!(question_ids(&topics, "st-a1"), vec!["q-3", "q-1", "q-2"]);
    }

    #[test]
    fn test_question_moved_down_lands_before_target() {
        let mut topics = sample_topics();
        do_move(&mut topics, "q-1", "q-3").unwrap();
        assert_eq!(question_ids(&topics, "st-a1"), vec!["q-2", "q-1", "q-3"]);
    }

    #[test]
    fn test_question_across_sub_topics() {
        let mut topics = sample_topics();
        do_move(&mut topics, "q-2", "q-4").unwrap();
        assert_eq!(question_ids(&topics, "st-a1"), vec!["q-1", "q-3"]);
        assert_eq!(question_ids(&topics, "st-a2"), vec!["q-2", "q-4"]);
    }

    #[test]
    fn test_question_onto_sub_topic_appends() {
        let mut topics = sample_topics();
        do_move(&mut topics, "q-1", "st-b1").unwrap();
        assert_eq!(question_ids(&topics, "st-b1"), vec!["q-1"]);
        do_move(&mut topics, "q-4", "st-b1").unwrap();
        assert_eq!(question_ids(&topics, "st-b1"), vec!["q-1", "q-4"]);
    }

    #[test]
    fn test_question_onto_topic_is_rejected() {
        let mut topics = sample_topics();
        let err = do_move(&mut topics, "q-1", "t-b").unwrap_err();
        assert_eq!(
            err,
            MoveError::InvalidTarget {
                dragged: ItemKind::Question,
                target: ItemKind::Topic
            }
        );
    }

    #[test]
    fn test_stale_parent_is_not_found() {
        let mut topics = sample_topics();
        let before = topics.clone();
        let active = ItemRef {
            id: "q-1".into(),
            kind: ItemKind::Question,
            parent: Some("st-a2".into()),
        };
        let over = resolve(&topics, "st-b1").unwrap();
        assert_eq!(
            move_item(&mut topics, &active, &over),
            Err(MoveError::NotFound("q-1".into()))
        );
        assert_eq!(topics, before);
    }

    #[test]
    fn test_missing_parent_reference() {
        let mut topics = sample_topics();
        let active = ItemRef {
            id: "q-1".into(),
            kind: ItemKind::Question,
            parent: None,
        };
        let over = resolve(&topics, "q-4").unwrap();
        assert_eq!(
            move_item(&mut topics, &active, &over),
            Err(MoveError::MissingParent("q-1".into()))
        );
    }

    // --- history ---

    #[test]
    fn test_move_with_history_pushes_snapshot() {
        let mut topics = sample_topics();
        let original = topics.clone();
        let mut history = UndoStack::new(20);
        let a = resolve(&topics, "t-c").unwrap();
        let o = resolve(&topics, "t-a").unwrap();
        let outcome = move_with_history(&mut topics, &mut history, &a, &o).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(history.len(), 1);

        assert!(undo::undo(&mut topics, &mut history));
        assert_eq!(topics, original);
    }

    #[test]
    fn test_failed_or_noop_move_leaves_history_alone() {
        let mut topics = sample_topics();
        let mut history = UndoStack::new(20);

        let a = resolve(&topics, "q-1").unwrap();
        let o = resolve(&topics, "t-b").unwrap();
        assert!(move_with_history(&mut topics, &mut history, &a, &o).is_err());

        let same = resolve(&topics, "q-1").unwrap();
        let outcome = move_with_history(&mut topics, &mut history, &same, &same).unwrap();
        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert!(history.is_empty());
    }

    #[test]
    fn test_undo_rolls_back_later_edits_too() {
        let mut topics = sample_topics();
        let mut history = UndoStack::new(20);
        let a = resolve(&topics, "q-3").unwrap();
        let o = resolve(&topics, "q-1").unwrap();
        move_with_history(&mut topics, &mut history, &a, &o).unwrap();
        crate::ops::sheet_ops::toggle_solved(&mut topics, "q-2").unwrap();

        undo::undo(&mut topics, &mut history);
        assert_eq!(question_ids(&topics, "st-a1"), vec!["q-1", "q-2", "q-3"]);
        assert!(!topics[0].sub_topics[0].questions[1].solved);
    }
}
