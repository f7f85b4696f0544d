//! Durable records: quizzes, sessions, participants.
//!
//! These types are the shape of the data, not the rules that govern it.
//! The game engine decides when a session may change; the store only keeps
//! whatever the engine hands it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quizhall_protocol::{HostId, Pin, PlayerId, QuestionView, QuizId, QuizSummary, SessionId};

use crate::StoreError;

/// Longest quiz title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;
/// Longest quiz description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Longest question text, in characters.
pub const MAX_QUESTION_CHARS: usize = 500;
/// Most questions a quiz may carry.
pub const MAX_QUESTIONS: usize = 50;
/// Allowed per-question time limits, in seconds.
pub const TIME_LIMIT_SECS: std::ops::RangeInclusive<u32> = 5..=300;

// ---------------------------------------------------------------------------
// Quiz
// ---------------------------------------------------------------------------

/// An immutable question set owned by one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,
    pub host_id: HostId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

/// A single-answer multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    pub options: [String; 4],
    /// Index into `options` of the correct answer.
    pub correct_index: u8,
    /// Length of the answer window.
    #[serde(rename = "timerSec", alias = "timeLimitSeconds")]
    pub time_limit_secs: u32,
}

impl Quiz {
    pub fn question(&self, index: u32) -> Option<&Question> {
        self.questions.get(index as usize)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            question_count: self.questions.len(),
        }
    }

    /// Checks lengths and ranges. Text fields are compared after trimming.
    ///
    /// # Errors
    /// [`StoreError::InvalidQuiz`] describing the first violation.
    pub fn validate(&self) -> Result<(), StoreError> {
        let invalid = |reason: String| StoreError::InvalidQuiz {
            id: self.id.clone(),
            reason,
        };

        let title = self.title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
            return Err(invalid(format!("title must be 1 to {MAX_TITLE_CHARS} characters")));
        }
        if self.description.trim().chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(invalid(format!(
                "description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        if self.questions.is_empty() || self.questions.len() > MAX_QUESTIONS {
            return Err(invalid(format!("must have 1 to {MAX_QUESTIONS} questions")));
        }

        for (i, q) in self.questions.iter().enumerate() {
            let text = q.text.trim();
            if text.is_empty() || text.chars().count() > MAX_QUESTION_CHARS {
                return Err(invalid(format!("question {i}: text must be 1 to {MAX_QUESTION_CHARS} characters")));
            }
            if q.options.iter().any(|o| o.trim().is_empty()) {
                return Err(invalid(format!("question {i}: options must not be empty")));
            }
            if usize::from(q.correct_index) >= q.options.len() {
                return Err(invalid(format!("question {i}: correctIndex must be between 0 and 3")));
            }
            if !TIME_LIMIT_SECS.contains(&q.time_limit_secs) {
                return Err(invalid(format!(
                    "question {i}: time limit must be between {} and {} seconds",
                    TIME_LIMIT_SECS.start(),
                    TIME_LIMIT_SECS.end()
                )));
            }
        }
        Ok(())
    }
}

impl Question {
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.time_limit_secs))
    }

    /// What participants see. The correct index stays on the server.
    pub fn view(&self) -> QuestionView {
        QuestionView {
            text: self.text.clone(),
            options: self.options.clone(),
            timer_sec: self.time_limit_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One play-through of a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub quiz_id: QuizId,
    pub host_id: HostId,
    pub pin: Pin,
    /// In join order.
    pub participants: Vec<Participant>,
    /// `None` until the first question is started.
    pub current_question: Option<u32>,
    /// A question is open, or was opened and not yet superseded.
    pub is_active: bool,
    /// The current question's answer window has closed.
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A fresh session that has not started any question.
    pub fn new(id: SessionId, quiz_id: QuizId, host_id: HostId, pin: Pin) -> Self {
        Self {
            id,
            quiz_id,
            host_id,
            pin,
            participants: Vec::new(),
            current_question: None,
            is_active: false,
            is_locked: false,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn participant(&self, id: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: PlayerId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// Case-sensitive, on the stored (trimmed) name.
    pub fn has_name(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p.name == name)
    }

    /// `-1` until a question is started, as shown on the wire.
    pub fn current_question_wire(&self) -> i64 {
        self.current_question.map_or(-1, i64::from)
    }
}

/// A player in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
    pub score: u64,
    pub answers: Vec<AnswerRecord>,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            answers: Vec::new(),
            joined_at: Utc::now(),
        }
    }

    pub fn answer_for(&self, question_index: u32) -> Option<&AnswerRecord> {
        self.answers.iter().find(|a| a.question_index == question_index)
    }
}

/// One scored answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_index: u32,
    pub answer_index: u8,
    pub elapsed_ms: u64,
    pub was_correct: bool,
    pub points: u64,
}
