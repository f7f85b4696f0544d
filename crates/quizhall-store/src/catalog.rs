//! The quiz catalog boundary and its in-memory implementation.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use quizhall_protocol::QuizId;

use crate::{Quiz, StoreError};

/// Read-only source of quizzes.
pub trait QuizCatalog: Send + Sync + 'static {
    /// Looks a quiz up by id.
    ///
    /// # Errors
    /// [`StoreError::QuizNotFound`] if there is no such quiz.
    fn get(&self, id: &QuizId) -> impl Future<Output = Result<Arc<Quiz>, StoreError>> + Send;
}

/// A catalog held entirely in memory, usually seeded from a JSON file.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    quizzes: HashMap<QuizId, Arc<Quiz>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a quiz after validating it. A quiz with the same id is replaced.
    ///
    /// # Errors
    /// [`StoreError::InvalidQuiz`] if the quiz fails validation.
    pub fn insert(&mut self, quiz: Quiz) -> Result<(), StoreError> {
        quiz.validate()?;
        tracing::debug!(quiz_id = %quiz.id, questions = quiz.questions.len(), "quiz loaded");
        self.quizzes.insert(quiz.id.clone(), Arc::new(quiz));
        Ok(())
    }

    /// Builds a catalog from a JSON array of quizzes.
    ///
    /// # Errors
    /// [`StoreError::Parse`] on malformed JSON, [`StoreError::InvalidQuiz`]
    /// on the first quiz that fails validation.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let quizzes: Vec<Quiz> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for quiz in quizzes {
            catalog.insert(quiz)?;
        }
        Ok(catalog)
    }

    /// Reads and parses a JSON seed file.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the file cannot be read, otherwise as
    /// [`from_json`](Self::from_json).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), quizzes = catalog.len(), "quiz catalog seeded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

impl QuizCatalog for MemoryCatalog {
    async fn get(&self, id: &QuizId) -> Result<Arc<Quiz>, StoreError> {
        self.quizzes
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::QuizNotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use quizhall_protocol::HostId;

    use super::*;

    const SEED: &str = r#"[
        {
            "id": "capitals",
            "hostId": "host-1",
            "title": "Capitals",
            "description": "European capitals",
            "questions": [
                { "text": "France?", "options": ["Berlin", "Paris", "Rome", "Madrid"], "correctIndex": 1, "timerSec": 10 },
                { "text": "Italy?", "options": ["Rome", "Milan", "Turin", "Naples"], "correctIndex": 0, "timerSec": 15 }
            ]
        }
    ]"#;

    #[tokio::test]
    async fn test_from_json_loads_quizzes() {
        let catalog = MemoryCatalog::from_json(SEED).unwrap();
        assert_eq!(catalog.len(), 1);

        let quiz = catalog.get(&QuizId::from("capitals")).await.unwrap();
        assert_eq!(quiz.host_id, HostId::from("host-1"));
        assert_eq!(quiz.question_count(), 2);
        assert_eq!(quiz.question(1).unwrap().time_limit_secs, 15);
    }

    #[tokio::test]
    async fn test_get_unknown_quiz_returns_not_found() {
        let catalog = MemoryCatalog::new();
        let err = catalog.get(&QuizId::from("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::QuizNotFound(_)));
    }

    #[test]
    fn test_from_json_rejects_invalid_quiz() {
        let json = SEED.replace("\"timerSec\": 10", "\"timerSec\": 1");
        let err = MemoryCatalog::from_json(&json).unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuiz { .. }));
    }

    #[test]
    fn test_from_json_rejects_malformed_json() {
        let err = MemoryCatalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }
}
