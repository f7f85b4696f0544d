//! Events that travel on the wire.
//!
//! Every frame is a JSON object with an `event` name and a `data` payload:
//!
//! ```text
//! { "event": "player:submit_answer",
//!   "data":  { "questionIndex": 0, "answerIndex": 2, "timeTakenMs": 1800 } }
//! ```
//!
//! `#[serde(tag = "event", content = "data")]` produces that "adjacently
//! tagged" shape, and `rename_all_fields = "camelCase"` turns
//! `question_index` into `questionIndex` inside every variant. Every
//! inbound frame must carry a `data` object, even an empty one.

use serde::{Deserialize, Serialize};

use quizhall_transport::ConnectionId;

use crate::{HostId, Pin, PlayerId, QuizId, SessionId};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Participant → server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Bind this connection to a host identity.
    #[serde(rename = "host:authenticate")]
    Authenticate { token: String },

    /// Open a new session for one of the host's quizzes.
    #[serde(rename = "host:create_session")]
    CreateSession { quiz_id: QuizId },

    /// Re-attach a host connection to a session it already owns.
    #[serde(rename = "host:join_session")]
    JoinSession { session_id: SessionId },

    /// Open the answer window for a question.
    #[serde(rename = "host:start_question")]
    StartQuestion { question_index: u32 },

    /// Lock the current question (if still open) and publish the leaderboard.
    #[serde(rename = "host:next_question")]
    NextQuestion {},

    /// Finish the session and publish the final leaderboard.
    #[serde(rename = "host:end_game")]
    EndGame {},

    /// Join a session by PIN under a display name.
    #[serde(rename = "player:join")]
    PlayerJoin { pin: Pin, name: String },

    /// Answer the currently open question.
    #[serde(rename = "player:submit_answer")]
    SubmitAnswer {
        question_index: u32,
        answer_index: u8,
        time_taken_ms: u64,
    },

    /// Keep-alive; answered with [`ServerEvent::Pong`].
    #[serde(rename = "system:ping")]
    Ping { client_time: u64 },
}

impl ClientEvent {
    /// The wire name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "host:authenticate",
            Self::CreateSession { .. } => "host:create_session",
            Self::JoinSession { .. } => "host:join_session",
            Self::StartQuestion { .. } => "host:start_question",
            Self::NextQuestion {} => "host:next_question",
            Self::EndGame {} => "host:end_game",
            Self::PlayerJoin { .. } => "player:join",
            Self::SubmitAnswer { .. } => "player:submit_answer",
            Self::Ping { .. } => "system:ping",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Server → participant (unicast) or server → room (broadcast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    #[serde(rename = "server:authenticated")]
    Authenticated { host_id: HostId },

    #[serde(rename = "server:session_created")]
    SessionCreated {
        session_id: SessionId,
        pin: Pin,
        quiz: QuizSummary,
    },

    #[serde(rename = "server:session_joined")]
    SessionJoined(SessionSummary),

    #[serde(rename = "server:player_joined")]
    PlayerJoined {
        player_id: PlayerId,
        name: String,
        player_count: usize,
    },

    #[serde(rename = "server:player_left")]
    PlayerLeft {
        player_id: PlayerId,
        name: String,
        player_count: usize,
    },

    /// The question text and options. Never carries the correct index.
    #[serde(rename = "server:question")]
    Question {
        question_index: u32,
        question: QuestionView,
    },

    /// Countdown length in seconds.
    #[serde(rename = "server:timer")]
    Timer { question_index: u32, duration: u32 },

    #[serde(rename = "server:lock")]
    Lock { question_index: u32 },

    #[serde(rename = "server:leaderboard")]
    Leaderboard {
        question_index: u32,
        leaderboard: Vec<LeaderboardEntry>,
    },

    #[serde(rename = "server:game_over")]
    GameOver { final_leaderboard: Vec<LeaderboardEntry> },

    /// Private to the submitting player.
    #[serde(rename = "server:answer_received")]
    AnswerReceived {
        question_index: u32,
        is_correct: bool,
        points: u64,
        total_score: u64,
    },

    /// The last host connection dropped; the session is paused until a host
    /// re-attaches.
    #[serde(rename = "server:host_left")]
    HostLeft { session_id: SessionId },

    #[serde(rename = "server:pong")]
    Pong { client_time: u64, server_time: u64 },

    /// Private to the connection whose request failed.
    #[serde(rename = "server:error")]
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// What a host sees about a quiz when a session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: QuizId,
    pub title: String,
    pub description: String,
    pub question_count: usize,
}

/// A question as shown to participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub text: String,
    pub options: [String; 4],
    pub timer_sec: u32,
}

/// One roster line in a session summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub score: u64,
}

/// One leaderboard line. `rank` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub score: u64,
}

/// Sent to a connection when it joins (or re-joins) a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub pin: Pin,
    pub quiz_id: QuizId,
    pub quiz_title: String,
    pub question_count: usize,
    pub players: Vec<RosterEntry>,
    pub player_count: usize,
    /// `-1` until the first question is started.
    pub current_question_index: i64,
    pub is_active: bool,
    pub is_locked: bool,
    /// The receiving player's own id; absent for hosts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who a session actor delivers an outbound event to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connection in the session's room.
    Room,
    /// One connection.
    Connection(ConnectionId),
    /// Every connection in the room except one.
    RoomExcept(ConnectionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_submit_answer_parses_camel_case() {
        let json = r#"{
            "event": "player:submit_answer",
            "data": { "questionIndex": 1, "answerIndex": 3, "timeTakenMs": 2500 }
        }"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::SubmitAnswer {
                question_index: 1,
                answer_index: 3,
                time_taken_ms: 2500,
            }
        );
    }

    #[test]
    fn test_client_event_empty_payload_variant_parses() {
        let json = r#"{ "event": "host:next_question", "data": {} }"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, ClientEvent::NextQuestion {});
        assert_eq!(event.name(), "host:next_question");
    }

    #[test]
    fn test_client_event_negative_index_is_rejected() {
        let json = r#"{ "event": "host:start_question", "data": { "questionIndex": -1 } }"#;
        assert!(serde_json::from_str::<ClientEvent>(json).is_err());
    }

    #[test]
    fn test_client_event_unknown_name_is_rejected() {
        let json = r#"{ "event": "host:fly_to_moon", "data": {} }"#;
        assert!(serde_json::from_str::<ClientEvent>(json).is_err());
    }

    #[test]
    fn test_server_event_question_withholds_correct_index() {
        let event = ServerEvent::Question {
            question_index: 0,
            question: QuestionView {
                text: "2 + 2?".into(),
                options: ["3".into(), "4".into(), "5".into(), "22".into()],
                timer_sec: 10,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "server:question");
        assert_eq!(json["data"]["questionIndex"], 0);
        assert_eq!(json["data"]["question"]["timerSec"], 10);
        assert_eq!(json["data"]["question"]["options"][1], "4");
        assert!(json["data"]["question"].get("correctIndex").is_none());
    }

    #[test]
    fn test_server_event_error_json_format() {
        let event = ServerEvent::Error {
            code: 409,
            message: "name already taken".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "server:error");
        assert_eq!(json["data"]["code"], 409);
        assert_eq!(json["data"]["message"], "name already taken");
    }

    #[test]
    fn test_server_event_game_over_uses_camel_case() {
        let event = ServerEvent::GameOver {
            final_leaderboard: vec![LeaderboardEntry {
                rank: 1,
                name: "Ana".into(),
                score: 1300,
            }],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["finalLeaderboard"][0]["rank"], 1);
        assert_eq!(json["data"]["finalLeaderboard"][0]["score"], 1300);
    }

    #[test]
    fn test_session_summary_omits_player_id_for_hosts() {
        let summary = SessionSummary {
            session_id: SessionId::generate(),
            pin: Pin::new_unchecked("123456"),
            quiz_id: QuizId::from("q1"),
            quiz_title: "Capitals".into(),
            question_count: 2,
            players: vec![],
            player_count: 0,
            current_question_index: -1,
            is_active: false,
            is_locked: false,
            player_id: None,
        };
        let json = serde_json::to_value(ServerEvent::SessionJoined(summary)).unwrap();
        assert_eq!(json["event"], "server:session_joined");
        assert_eq!(json["data"]["currentQuestionIndex"], -1);
        assert!(json["data"].get("playerId").is_none());
    }
}
