use serde::Serialize;

use crate::model::question::{Difficulty, Question};
use crate::model::topic::{SubTopic, Topic};

/// Counters for one difficulty level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyStats {
    pub difficulty: Difficulty,
    pub total: usize,
    pub solved: usize,
    pub remaining: usize,
    /// Share of all questions at this difficulty, 0..=100
    pub segment_width: f64,
    /// Share of this difficulty that is solved, 0..=100
    pub fill_progress: f64,
}

/// Solved/total for a single topic or sub-topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub solved: usize,
    pub total: usize,
    pub percent: u32,
}

impl Progress {
    pub fn new(solved: usize, total: usize) -> Self {
        Progress {
            solved,
            total,
            percent: rounded_percent(solved, total),
        }
    }

    pub fn of_topic(topic: &Topic) -> Self {
        Progress::new(topic.solved_count(), topic.question_count())
    }

    pub fn of_sub_topic(sub: &SubTopic) -> Self {
        Progress::new(sub.solved_count(), sub.questions.len())
    }
}

/// Whole-sheet summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetStats {
    pub total: usize,
    pub solved: usize,
    /// Rounded completion percentage
    pub percent: u32,
    /// Always Easy, Medium, Hard in that order
    pub difficulties: Vec<DifficultyStats>,
}

impl SheetStats {
    pub fn difficulty(&self, difficulty: Difficulty) -> Option<&DifficultyStats> {
        self.difficulties.iter().find(|d| d.difficulty == difficulty)
    }
}

/// Compute the summary over every question in the tree.
pub fn sheet_stats(topics: &[Topic]) -> SheetStats {
    let questions: Vec<&Question> = topics.iter().flat_map(Topic::questions).collect();
    let total = questions.len();
    let solved = questions.iter().filter(|q| q.solved).count();

    let difficulties = Difficulty::ALL
        .iter()
        .map(|&difficulty| {
            let subset: Vec<&&Question> = questions
                .iter()
                .filter(|q| q.difficulty == difficulty)
                .collect();
            let level_total = subset.len();
            let level_solved = subset.iter().filter(|q| q.solved).count();
            DifficultyStats {
                difficulty,
                total: level_total,
                solved: level_solved,
                remaining: level_total - level_solved,
                segment_width: ratio(level_total, total),
                fill_progress: ratio(level_solved, level_total),
            }
        })
        .collect();

    SheetStats {
        total,
        solved,
        percent: rounded_percent(solved, total),
        difficulties,
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Percentage rounded half-up; 0 for an empty collection.
pub fn rounded_percent(part: usize, whole: usize) -> u32 {
    ratio(part, whole).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_topics() -> Vec<Topic> {
        serde_json::from_str(
            r#"[
              {"id":"t-0","name":"Arrays","sub_topics":[
                {"id":"st-0-0","name":"Basics","questions":[
                  {"id":"q-1","title":"a","difficulty":"Easy","solved":true},
                  {"id":"q-2","title":"b","difficulty":"Easy"},
                  {"id":"q-3","title":"c","difficulty":"Medium","solved":true}
                ]}
              ]},
              {"id":"t-1","name":"Graphs","sub_topics":[
                {"id":"st-1-0","name":"BFS","questions":[
                  {"id":"q-4","title":"d","difficulty":"Hard"},
                  {"id":"q-5","title":"e","difficulty":"Easy","solved":true},
                  {"id":"q-6","title":"f","difficulty":"Medium"}
                ]},
                {"id":"st-1-1","name":"DFS","questions":[]}
              ]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_global_counts() {
        let stats = sheet_stats(&sample_topics());
        assert_eq!(stats.total, 6);
        assert_eq!(stats.solved, 3);
        assert_eq!(stats.percent, 50);
    }

    #[test]
    fn test_difficulty_breakdown() {
        let stats = sheet_stats(&sample_topics());
        let order: Vec<Difficulty> = stats.difficulties.iter().map(|d| d.difficulty).collect();
        assert_eq!(order, Difficulty::ALL.to_vec());

        let easy = stats.difficulty(Difficulty::Easy).unwrap();
        assert_eq!((easy.total, easy.solved, easy.remaining), (3, 2, 1));
        assert_eq!(easy.segment_width, 50.0);
        assert!((easy.fill_progress - 66.666).abs() < 0.01);

        let hard = stats.difficulty(Difficulty::Hard).unwrap();
        assert_eq!((hard.total, hard.solved, hard.remaining), (1, 0, 1));
        assert_eq!(hard.fill_progress, 0.0);
    }

    #[test]
    fn test_empty_sheet_is_zero_percent() {
        let stats = sheet_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.percent, 0);
        for d in &stats.difficulties {
            assert_eq!(d.segment_width, 0.0);
            assert_eq!(d.fill_progress, 0.0);
        }
    }

    #[test]
    fn test_topic_and_sub_topic_progress() {
        let topics = sample_topics();
        assert_eq!(
            Progress::of_topic(&topics[0]),
            Progress {
                solved: 2,
                total: 3,
                percent: 67
            }
        );
        assert_eq!(Progress::of_sub_topic(&topics[1].sub_topics[1]).percent, 0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(1, 8), 13);
        assert_eq!(rounded_percent(0, 0), 0);
        assert_eq!(rounded_percent(5, 5), 100);
    }
}
