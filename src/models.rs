use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Quiz
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestion {
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub correct_index: usize,
    pub topic: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Primary,
    Secondary,
    University,
}

/// Selected option per question, index-aligned with the question list.
/// `None` means the question was left unanswered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizAnswerSet(Vec<Option<usize>>);

impl QuizAnswerSet {
    /// All questions unanswered
    pub fn blank(question_count: usize) -> Self {
        Self(vec![None; question_count])
    }

    /// Pads or truncates `answers` so the set always covers exactly
    /// `question_count` questions.
    pub fn aligned(mut answers: Vec<Option<usize>>, question_count: usize) -> Self {
        answers.resize(question_count, None);
        Self(answers)
    }

    pub fn select(&mut self, question_index: usize, option_index: usize) {
        if let Some(slot) = self.0.get_mut(question_index) {
            *slot = Some(option_index);
        }
    }

    pub fn get(&self, question_index: usize) -> Option<usize> {
        self.0.get(question_index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizOutcome {
    pub weakness: Vec<String>,
    pub level: Level,
    pub correct: usize,
    pub questions_used: usize,
}

// ============================================================================
// Tasks
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Planned,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub status: TaskStatus,
}

fn default_subject() -> String {
    "General".to_string()
}

impl Task {
    /// Bring `status` back in line with `done` for records written by older clients
    pub fn normalized(mut self) -> Self {
        if self.done {
            self.status = TaskStatus::Done;
        } else if self.status == TaskStatus::Done {
            self.status = TaskStatus::Planned;
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub done: usize,
    pub total: usize,
    pub percent: u8,
    pub preview: Vec<Task>,
}

// ============================================================================
// Feed & community
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPost {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub content: String,
    pub ts: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// Older records used the numeric creation time as the post id
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

impl FeedPost {
    /// Sort key in epoch milliseconds. Falls back to parsing `ts` as RFC 3339
    /// or a bare date at UTC midnight when `createdAt` is absent.
    pub fn sort_key(&self) -> Option<i64> {
        if let Some(created_at) = self.created_at {
            return Some(created_at);
        }
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.ts) {
            return Some(parsed.timestamp_millis());
        }
        NaiveDate::parse_from_str(&self.ts, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp_millis())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: u32,
    pub name: String,
    pub subjects: Vec<String>,
    pub mutuals: u32,
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "me")]
    Learner,
    #[serde(rename = "them")]
    Counterpart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub from: Sender,
    pub text: String,
    pub ts: i64,
}

/// The other party of a one-to-one thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Counterpart {
    Tutor(u32),
    Buddy(u32),
}

impl Counterpart {
    pub fn parse(kind: &str, id: u32) -> Option<Self> {
        match kind.to_lowercase().as_str() {
            "tutor" | "tutors" => Some(Counterpart::Tutor(id)),
            "buddy" | "buddies" => Some(Counterpart::Buddy(id)),
            _ => None,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Counterpart::Tutor(id) | Counterpart::Buddy(id) => *id,
        }
    }
}

impl fmt::Display for Counterpart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counterpart::Tutor(id) => write!(f, "tutor:{}", id),
            Counterpart::Buddy(id) => write!(f, "buddy:{}", id),
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Tutor {
    pub id: u32,
    pub name: &'static str,
    pub subject: &'static str,
    pub rating: f32,
    pub price: u32,
    pub bio: &'static str,
    pub availability: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct Buddy {
    pub id: u32,
    pub name: &'static str,
    pub subject: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TutorVideo {
    pub id: &'static str,
    pub title: &'static str,
    pub duration: &'static str,
    pub src: &'static str,
    pub thumbnail: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub tutor_id: u32,
    pub tutor_name: String,
    pub slot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Video,
    Revision,
}

#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub id: u32,
    pub kind: ActivityKind,
    pub date: &'static str,
    pub subject: &'static str,
    pub tutor: Option<&'static str>,
    pub title: &'static str,
    pub notes: Option<&'static str>,
    pub duration_min: Option<u32>,
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Tutor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_set_alignment() {
        let answers = QuizAnswerSet::aligned(vec![Some(0)], 3);
        assert_eq!(answers.len(), 3);
        assert_eq!(answers.get(0), Some(0));
        assert_eq!(answers.get(2), None);

        let truncated = QuizAnswerSet::aligned(vec![Some(0), Some(1), Some(2), Some(1)], 3);
        assert_eq!(truncated.len(), 3);
    }

    #[test]
    fn test_task_status_serialization() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn test_task_without_status_is_normalized() {
        let task: Task =
            serde_json::from_str(r#"{"id":"1","title":"Read","subject":"Algebra","done":true}"#)
                .unwrap();
        assert_eq!(task.normalized().status, TaskStatus::Done);
    }

    #[test]
    fn test_feed_sort_key_fallbacks() {
        let mut post = FeedPost {
            id: "1".to_string(),
            name: "Tom".to_string(),
            content: "hi".to_string(),
            ts: "2025-08-24".to_string(),
            created_at: None,
        };
        let date_key = post.sort_key().unwrap();

        post.ts = "2025-08-24T10:00:00.000Z".to_string();
        let iso_key = post.sort_key().unwrap();
        assert_eq!(iso_key - date_key, 10 * 60 * 60 * 1000);

        post.created_at = Some(5);
        assert_eq!(post.sort_key(), Some(5));

        post.created_at = None;
        post.ts = "yesterday".to_string();
        assert_eq!(post.sort_key(), None);
    }

    #[test]
    fn test_feed_post_numeric_id() {
        let post: FeedPost = serde_json::from_str(
            r#"{"id":1756198800000,"name":"You","content":"legacy post","ts":"2025-08-26T09:00:00.000Z","createdAt":1756198800000}"#,
        )
        .unwrap();
        assert_eq!(post.id, "1756198800000");
        assert_eq!(post.created_at, Some(1756198800000));

        let post: FeedPost =
            serde_json::from_str(r#"{"id":"101","name":"Tom","content":"hi","ts":"2025-08-24"}"#)
                .unwrap();
        assert_eq!(post.id, "101");
    }

    #[test]
    fn test_chat_sender_wire_names() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"id":"a","from":"them","text":"hey","ts":1}"#).unwrap();
        assert_eq!(msg.from, Sender::Counterpart);
    }

    #[test]
    fn test_counterpart_parse() {
        assert_eq!(Counterpart::parse("tutor", 1), Some(Counterpart::Tutor(1)));
        assert_eq!(Counterpart::parse("Buddies", 11), Some(Counterpart::Buddy(11)));
        assert_eq!(Counterpart::parse("teacher", 1), None);
    }
}
