//! The session state machine.
//!
//! Phases are derived from the session record rather than stored next to it,
//! so the record and the phase can never disagree:
//!
//! ```text
//! Pending → QuestionOpen ⇄ QuestionLocked → … → Ended
//!    └──────────────────────────────────────────↗
//! ```
//!
//! - **Pending**: created, no question started. Accepts joins.
//! - **QuestionOpen**: answers accepted until the countdown or the host locks.
//! - **QuestionLocked**: window closed, leaderboard available. Accepts joins.
//! - **Ended**: terminal. Live state is torn down; the record stays.

use std::fmt;

use quizhall_store::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Pending,
    QuestionOpen { index: u32 },
    QuestionLocked { index: u32 },
    Ended,
}

impl SessionPhase {
    pub fn of(session: &Session) -> Self {
        if session.is_ended() {
            return Self::Ended;
        }
        match session.current_question {
            None => Self::Pending,
            Some(index) if session.is_locked => Self::QuestionLocked { index },
            Some(index) => Self::QuestionOpen { index },
        }
    }

    /// Players may join only while no question is open.
    pub fn accepts_joins(&self) -> bool {
        matches!(self, Self::Pending | Self::QuestionLocked { .. })
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// The question the session is on, if one was started.
    pub fn question(&self) -> Option<u32> {
        match self {
            Self::QuestionOpen { index } | Self::QuestionLocked { index } => Some(*index),
            Self::Pending | Self::Ended => None,
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::QuestionOpen { index } => write!(f, "QUESTION_OPEN({index})"),
            Self::QuestionLocked { index } => write!(f, "QUESTION_LOCKED({index})"),
            Self::Ended => write!(f, "ENDED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use quizhall_protocol::{HostId, Pin, QuizId, SessionId};

    use super::*;

    fn session() -> Session {
        Session::new(
            SessionId::generate(),
            QuizId::from("q"),
            HostId::from("h"),
            Pin::new_unchecked("123456"),
        )
    }

    #[test]
    fn test_of_new_session_is_pending() {
        assert_eq!(SessionPhase::of(&session()), SessionPhase::Pending);
    }

    #[test]
    fn test_of_open_and_locked_question() {
        let mut s = session();
        s.current_question = Some(1);
        s.is_active = true;
        assert_eq!(SessionPhase::of(&s), SessionPhase::QuestionOpen { index: 1 });
        s.is_locked = true;
        assert_eq!(SessionPhase::of(&s), SessionPhase::QuestionLocked { index: 1 });
    }

    #[test]
    fn test_of_ended_wins_over_question_state() {
        let mut s = session();
        s.current_question = Some(0);
        s.ended_at = Some(Utc::now());
        assert_eq!(SessionPhase::of(&s), SessionPhase::Ended);
    }

    #[test]
    fn test_accepts_joins_only_between_questions() {
        assert!(SessionPhase::Pending.accepts_joins());
        assert!(SessionPhase::QuestionLocked { index: 0 }.accepts_joins());
        assert!(!SessionPhase::QuestionOpen { index: 0 }.accepts_joins());
        assert!(!SessionPhase::Ended.accepts_joins());
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionPhase::QuestionOpen { index: 2 }.to_string(), "QUESTION_OPEN(2)");
        assert_eq!(SessionPhase::Ended.to_string(), "ENDED");
    }
}
