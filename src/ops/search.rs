use regex::{Regex, RegexBuilder};

use crate::model::question::Question;
use crate::model::topic::{SubTopic, Topic};

/// How a search query is matched against names and titles
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Case-insensitive substring; holds the lowercased query
    Substring(String),
    /// Case-insensitive regular expression
    Regex(Regex),
}

impl Matcher {
    pub fn substring(query: &str) -> Self {
        Matcher::Substring(query.to_lowercase())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Matcher::Regex(re))
    }

    /// A blank substring query matches everything and filters nothing
    pub fn is_blank(&self) -> bool {
        match self {
            Matcher::Substring(q) => q.trim().is_empty(),
            Matcher::Regex(_) => false,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Substring(q) => text.to_lowercase().contains(q.as_str()),
            Matcher::Regex(re) => re.is_match(text),
        }
    }
}

/// Return the part of the tree that matches `matcher`.
///
/// Questions are kept when their title matches. A sub-topic is kept when its
/// name matches or any of its questions do, and its question list is always
/// the filtered one. A topic is kept when its name matches or any sub-topic
/// survived. Order is preserved throughout.
pub fn filter_topics(topics: &[Topic], matcher: &Matcher) -> Vec<Topic> {
    if matcher.is_blank() {
        return topics.to_vec();
    }

    topics
        .iter()
        .filter_map(|topic| {
            let sub_topics: Vec<SubTopic> = topic
                .sub_topics
                .iter()
                .filter_map(|sub| filter_sub_topic(sub, matcher))
                .collect();
            if matcher.is_match(&topic.name) || !sub_topics.is_empty() {
                Some(Topic {
                    id: topic.id.clone(),
                    name: topic.name.clone(),
                    sub_topics,
                })
            } else {
                None
            }
        })
        .collect()
}

fn filter_sub_topic(sub: &SubTopic, matcher: &Matcher) -> Option<SubTopic> {
    let questions: Vec<_> = sub
        .questions
        .iter()
        .filter(|q| matcher.is_match(&q.title))
        .cloned()
        .collect();
    if matcher.is_match(&sub.name) || !questions.is_empty() {
        Some(SubTopic {
            id: sub.id.clone(),
            name: sub.name.clone(),
            questions,
        })
    } else {
        None
    }
}

/// Keep only questions passing `keep`. Sub-topics and topics left without any
/// question are dropped.
pub fn filter_questions(topics: &[Topic], keep: impl Fn(&Question) -> bool) -> Vec<Topic> {
    topics
        .iter()
        .filter_map(|topic| {
            let sub_topics: Vec<SubTopic> = topic
                .sub_topics
                .iter()
                .filter_map(|sub| {
                    let questions: Vec<Question> =
                        sub.questions.iter().filter(|q| keep(q)).cloned().collect();
                    (!questions.is_empty()).then(|| SubTopic {
                        id: sub.id.clone(),
                        name: sub.name.clone(),
                        questions,
                    })
                })
                .collect();
            (!sub_topics.is_empty()).then(|| Topic {
                id: topic.id.clone(),
                name: topic.name.clone(),
                sub_topics,
            })
        })
        .collect()
}

/// Count of questions left after filtering
pub fn match_count(filtered: &[Topic]) -> usize {
    filtered.iter().map(Topic::question_count).sum()
}
