use serde::{Deserialize, Serialize};

use super::question::Question;

/// A group of questions inside a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTopic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl SubTopic {
    pub fn new(id: String, name: String) -> Self {
        SubTopic {
            id,
            name,
            questions: Vec::new(),
        }
    }

    pub fn solved_count(&self) -> usize {
        self.questions.iter().filter(|q| q.solved).count()
    }
}

/// A top-level section of the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "subTopics")]
    pub sub_topics: Vec<SubTopic>,
}

impl Topic {
    pub fn new(id: String, name: String) -> Self {
        Topic {
            id,
            name,
            sub_topics: Vec::new(),
        }
    }

    pub fn question_count(&self) -> usize {
        self.sub_topics.iter().map(|s| s.questions.len()).sum()
    }

    pub fn solved_count(&self) -> usize {
        self.sub_topics.iter().map(SubTopic::solved_count).sum()
    }

    /// All questions of this topic in display order
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sub_topics.iter().flat_map(|s| s.questions.iter())
    }
}

/// The whole tree as stored in `topics.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub topics: Vec<Topic>,
}

impl Sheet {
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Every question in the sheet, in display order
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.topics.iter().flat_map(|t| t.questions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::Difficulty;

    #[test]
    fn counts_roll_up_through_the_tree() {
        let mut sub = SubTopic::new("st-1".into(), "Arrays".into());
        let mut q = Question::new("q-1".into(), "Two Sum".into(), Difficulty::Easy);
        q.solved = true;
        sub.questions.push(q);
        sub.questions
            .push(Question::new("q-2".into(), "3Sum".into(), Difficulty::Medium));
        let mut topic = Topic::new("t-1".into(), "Basics".into());
        topic.sub_topics.push(sub);

        assert_eq!(topic.question_count(), 2);
        assert_eq!(topic.solved_count(), 1);

        let sheet = Sheet {
            topics: vec![topic],
        };
        assert_eq!(sheet.questions().count(), 2);
    }

    #[test]
    fn topic_reads_camel_case_sub_topics() {
        let topic: Topic = serde_json::from_str(
            r#"{"id":"t-0","name":"Basics","subTopics":[{"id":"st-0-0","name":"Maths","questions":[]}]}"#,
        )
        .unwrap();
        assert_eq!(topic.sub_topics.len(), 1);
        assert_eq!(topic.sub_topics[0].name, "Maths");
    }
}
