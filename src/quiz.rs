use std::collections::HashSet;

use crate::errors::AppResult;
use crate::models::{Level, QuizAnswerSet, QuizOutcome, QuizQuestion};
use crate::seed::{self, SAMPLE_QUESTIONS};
use crate::storage::{keys, Storage};

// Import logging macros
use crate::log_service_success;

/// Level inferred from the share of counted questions answered correctly,
/// taken to two decimal places (2 of 3 is 0.67). With nothing counted the
/// learner is placed at `Secondary`.
pub fn infer_level(correct: usize, total: usize) -> Level {
    if total == 0 {
        return Level::Secondary;
    }
    let hundredths = (200 * correct.min(total) + total) / (2 * total);
    if hundredths < 34 {
        Level::Primary
    } else if hundredths < 67 {
        Level::Secondary
    } else {
        Level::University
    }
}

/// Questions that count for the selected subjects, paired with their index
/// in the full question list. Subjects without a mapped topic are ignored;
/// when no topic is active every question counts.
pub fn active_questions<S: AsRef<str>>(
    questions: &'static [QuizQuestion],
    subjects: &[S],
) -> Vec<(usize, &'static QuizQuestion)> {
    let active_topics: HashSet<&str> = subjects
        .iter()
        .filter_map(|s| seed::topic_for_subject(s.as_ref()))
        .collect();

    questions
        .iter()
        .enumerate()
        .filter(|(_, q)| active_topics.is_empty() || active_topics.contains(q.topic))
        .collect()
}

pub fn score<S: AsRef<str>>(
    questions: &'static [QuizQuestion],
    answers: &QuizAnswerSet,
    subjects: &[S],
) -> QuizOutcome {
    let used = active_questions(questions, subjects);
    let mut weakness: Vec<String> = Vec::new();
    let mut correct = 0;

    for (index, question) in &used {
        if answers.get(*index) == Some(question.correct_index) {
            correct += 1;
        } else if !weakness.iter().any(|t| t == question.topic) {
            weakness.push(question.topic.to_string());
        }
    }

    QuizOutcome {
        weakness,
        level: infer_level(correct, used.len()),
        correct,
        questions_used: used.len(),
    }
}

/// Onboarding quiz over the built-in question list
#[derive(Clone)]
pub struct QuizService {
    storage: Storage,
    questions: &'static [QuizQuestion],
}

impl QuizService {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            questions: SAMPLE_QUESTIONS,
        }
    }

    pub fn questions(&self) -> &'static [QuizQuestion] {
        self.questions
    }

    pub fn blank_answers(&self) -> QuizAnswerSet {
        QuizAnswerSet::blank(self.questions.len())
    }

    /// Score the answers and persist the weakness list, display name and
    /// selected subjects. The previous weakness list is overwritten.
    pub async fn submit(
        &self,
        name: &str,
        subjects: &[String],
        answers: Vec<Option<usize>>,
    ) -> AppResult<QuizOutcome> {
        let answers = QuizAnswerSet::aligned(answers, self.questions.len());
        let outcome = score(self.questions, &answers, subjects);

        self.storage.set(keys::WEAKNESS, &outcome.weakness).await?;
        self.storage.set(keys::NAME, &name).await?;
        self.storage.set(keys::QUIZ_SUBJECTS, &subjects).await?;

        log_service_success!(
            "quiz",
            "submit",
            format!(
                "{}/{} correct, level {:?}, weakness {:?}",
                outcome.correct, outcome.questions_used, outcome.level, outcome.weakness
            )
        );
        Ok(outcome)
    }

    pub async fn weakness(&self) -> Vec<String> {
        self.storage.get_or(keys::WEAKNESS, Vec::new()).await
    }

    pub async fn subjects(&self) -> Vec<String> {
        self.storage
            .get_or(
                keys::QUIZ_SUBJECTS,
                vec!["Mathematics".to_string(), "English".to_string()],
            )
            .await
    }
}
