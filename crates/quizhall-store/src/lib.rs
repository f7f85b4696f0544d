//! Storage boundaries for Quizhall.
//!
//! The game engine depends on two external collaborators, both expressed as
//! traits so they can be swapped for a database without touching the engine:
//!
//! - [`QuizCatalog`]: read-only lookup of question sets.
//! - [`SessionStore`]: durable session records (create, find by PIN or id,
//!   save).
//!
//! [`MemoryCatalog`] and [`MemorySessionStore`] are the in-process versions
//! used by the server binary and the tests.

mod catalog;
mod error;
mod model;
mod sessions;

pub use catalog::{MemoryCatalog, QuizCatalog};
pub use error::StoreError;
pub use model::{
    AnswerRecord, MAX_DESCRIPTION_CHARS, MAX_QUESTION_CHARS, MAX_QUESTIONS, MAX_TITLE_CHARS,
    Participant, Question, Quiz, Session, TIME_LIMIT_SECS,
};
pub use sessions::{MemorySessionStore, SessionStore};
