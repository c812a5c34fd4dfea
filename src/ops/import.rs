use indexmap::IndexMap;
use serde::Deserialize;

use crate::model::config::ImportConfig;
use crate::model::question::{Difficulty, Question};
use crate::model::topic::{SubTopic, Topic};

/// Error type for import operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid sheet JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no questions found in import data")]
    NoQuestions,
}

/// Result of an import operation
#[derive(Debug)]
pub struct ImportResult {
    pub topics: Vec<Topic>,
    /// Total number of questions imported
    pub question_count: usize,
}

// ---------------------------------------------------------------------------
// Wire format of the public sheet API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SheetResponse {
    data: SheetData,
}

#[derive(Debug, Deserialize)]
struct SheetData {
    #[serde(default)]
    questions: Vec<ApiQuestion>,
}

#[derive(Debug, Deserialize)]
struct ApiQuestion {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    topic: Option<String>,
    #[serde(rename = "subTopic")]
    sub_topic: Option<String>,
    #[serde(rename = "questionId")]
    question_id: Option<ApiProblem>,
    resource: Option<String>,
    #[serde(rename = "isSolved", default)]
    is_solved: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ApiProblem {
    difficulty: Option<String>,
    #[serde(rename = "problemUrl")]
    problem_url: Option<String>,
}

/// Build a topic tree from a sheet API response.
///
/// Questions are grouped by topic and then sub-topic, both in order of first
/// appearance. Missing group names fall back to the `[import]` defaults.
pub fn import_sheet(json: &str, config: &ImportConfig) -> Result<ImportResult, ImportError> {
    let response: SheetResponse = serde_json::from_str(json)?;
    let questions = response.data.questions;
    if questions.is_empty() {
        return Err(ImportError::NoQuestions);
    }
    let question_count = questions.len();

    let mut grouped: IndexMap<String, IndexMap<String, Vec<ApiQuestion>>> = IndexMap::new();
    for q in questions {
        let topic = group_name(q.topic.as_deref(), &config.default_topic);
        let sub = group_name(q.sub_topic.as_deref(), &config.default_subtopic);
        grouped
            .entry(topic)
            .or_default()
            .entry(sub)
            .or_default()
            .push(q);
    }

    let topics: Vec<Topic> = grouped
        .into_iter()
        .enumerate()
        .map(|(t_idx, (topic_name, subs))| Topic {
            id: format!("t-{}", t_idx),
            name: topic_name,
            sub_topics: subs
                .into_iter()
                .enumerate()
                .map(|(s_idx, (sub_name, qs))| SubTopic {
                    id: format!("st-{}-{}", t_idx, s_idx),
                    name: sub_name,
                    questions: qs
                        .into_iter()
                        .enumerate()
                        .map(|(q_idx, q)| convert_question(q, t_idx, s_idx, q_idx))
                        .collect(),
                })
                .collect(),
        })
        .collect();

    tracing::info!(
        topics = topics.len(),
        questions = question_count,
        "imported sheet"
    );
    Ok(ImportResult {
        topics,
        question_count,
    })
}

fn group_name(name: Option<&str>, fallback: &str) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => fallback.to_string(),
    }
}

fn convert_question(q: ApiQuestion, t_idx: usize, s_idx: usize, q_idx: usize) -> Question {
    let id = match q.id {
        Some(id) if !id.trim().is_empty() => id,
        _ => format!("q-{}-{}-{}", t_idx, s_idx, q_idx),
    };
    let (difficulty, url) = match q.question_id {
        Some(problem) => (
            problem
                .difficulty
                .as_deref()
                .and_then(Difficulty::parse)
                .unwrap_or_default(),
            problem.problem_url.filter(|u| !u.is_empty() && u != "#"),
        ),
        None => (Difficulty::default(), None),
    };
    Question {
        id,
        title: q.title.unwrap_or_default(),
        difficulty,
        url,
        video: q.resource.filter(|v| !v.is_empty()),
        note: String::new(),
        solved: q.is_solved.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn import(json: &str) -> ImportResult {
        import_sheet(json, &ImportConfig::default()).unwrap()
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let json = r#"{"data":{"questions":[
            {"_id":"a","title":"Two Sum","topic":"Arrays","subTopic":"Easy"},
            {"_id":"b","title":"BFS","topic":"Graphs","subTopic":"Traversal"},
            {"_id":"c","title":"3Sum","topic":"Arrays","subTopic":"Medium"},
            {"_id":"d","title":"Max Subarray","topic":"Arrays","subTopic":"Easy"}
        ]}}"#;
        let result = import(json);
        assert_eq!(result.question_count, 4);

        let layout: Vec<(String, Vec<(String, Vec<String>)>)> = result
            .topics
            .iter()
            .map(|t| {
                (
                    format!("{} {}", t.id, t.name),
                    t.sub_topics
                        .iter()
                        .map(|s| {
                            (
                                format!("{} {}", s.id, s.name),
                                s.questions.iter().map(|q| q.id.clone()).collect(),
                            )
                        })
                        .collect(),
                )
            })
            .collect();
        assert_eq!(
            layout,
            vec![
                (
                    "t-0 Arrays".to_string(),
                    vec![
                        ("st-0-0 Easy".to_string(), vec!["a".to_string(), "d".to_string()]),
                        ("st-0-1 Medium".to_string(), vec!["c".to_string()]),
                    ]
                ),
                (
                    "t-1 Graphs".to_string(),
                    vec![("st-1-0 Traversal".to_string(), vec!["b".to_string()])]
                ),
            ]
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let json = r##"{"data":{"questions":[
            {"title":"Loose","topic":"","questionId":{"problemUrl":"#"}}
        ]}}"##;
        let result = import(json);
        let topic = &result.topics[0];
        assert_eq!(topic.name, "General");
        assert_eq!(topic.sub_topics[0].name, "Core Problems");

        let q = &topic.sub_topics[0].questions[0];
        assert_eq!(q.id, "q-0-0-0");
        assert_eq!(q.difficulty, Difficulty::Medium);
        assert_eq!(q.url, None);
        assert_eq!(q.video, None);
        assert!(!q.solved);
        assert!(q.note.is_empty());
    }

    #[test]
    fn test_null_fields_are_tolerated() {
        let json = r#"{"data":{"questions":[
            {"_id":null,"title":null,"topic":null,"subTopic":null,
             "questionId":null,"resource":null,"isSolved":null},
            {"_id":"b","title":"Kept","topic":"Arrays","isSolved":null}
        ]}}"#;
        let result = import(json);
        assert_eq!(result.question_count, 2);

        let loose = &result.topics[0].sub_topics[0].questions[0];
        assert_eq!(result.topics[0].name, "General");
        assert_eq!(loose.id, "q-0-0-0");
        assert_eq!(loose.title, "");
        assert!(!loose.solved);

        let kept = &result.topics[1].sub_topics[0].questions[0];
        assert_eq!(kept.title, "Kept");
        assert!(!kept.solved);
    }

    #[test]
    fn test_question_fields_are_carried_over() {
        let json = r#"{"data":{"questions":[
            {"_id":"x1","title":"Reverse Pairs","topic":"Sorting","subTopic":"Merge",
             "questionId":{"difficulty":"Hard","problemUrl":"https://example.com/p"},
             "resource":"https://example.com/v","isSolved":true}
        ]}}"#;
        let q = &import(json).topics[0].sub_topics[0].questions[0];
        assert_eq!(q.id, "x1");
        assert_eq!(q.title, "Reverse Pairs");
        assert_eq!(q.difficulty, Difficulty::Hard);
        assert_eq!(q.url.as_deref(), Some("https://example.com/p"));
        assert_eq!(q.video.as_deref(), Some("https://example.com/v"));
        assert!(q.solved);
    }

    #[test]
    fn test_custom_defaults() {
        let config = ImportConfig {
            default_topic: "Misc".into(),
            default_subtopic: "Other".into(),
        };
        let json = r#"{"data":{"questions":[{"_id":"a","title":"x"}]}}"#;
        let result = import_sheet(json, &config).unwrap();
        assert_eq!(result.topics[0].name, "Misc");
        assert_eq!(result.topics[0].sub_topics[0].name, "Other");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = import_sheet("{not json", &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::Json(_)));
        let err = import_sheet(r#"{"questions":[]}"#, &ImportConfig::default()).unwrap_err();
        assert!(matches!(err, ImportError::Json(_)));
    }

    #[test]
    fn test_empty_question_list_is_an_error() {
        let err = import_sheet(r#"{"data":{"questions":[]}}"#, &ImportConfig::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::NoQuestions));
    }
}
