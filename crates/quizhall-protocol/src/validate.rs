//! Range checks for inbound payloads.
//!
//! Decoding already guarantees types (no negative indices, no missing
//! fields). These checks cover what the type system cannot: string lengths,
//! PIN shape, and the answer index range. They run before an event reaches
//! the engine so a rejected payload never touches session state.

use crate::{ClientEvent, ProtocolError};

/// Longest display name a player may choose, in characters.
pub const MAX_NAME_CHARS: usize = 50;

/// Number of options every question carries.
pub const OPTION_COUNT: u8 = 4;

impl ClientEvent {
    /// Checks every field of the event against its allowed range.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Authenticate { token } => {
                if token.trim().is_empty() {
                    return Err(ProtocolError::invalid("token", "authentication required"));
                }
            }
            Self::CreateSession { quiz_id } => {
                if quiz_id.0.trim().is_empty() {
                    return Err(ProtocolError::invalid("quizId", "must not be empty"));
                }
            }
            Self::PlayerJoin { pin, name } => {
                if !pin.is_well_formed() {
                    return Err(ProtocolError::invalid("pin", "must be 6 digits"));
                }
                validate_display_name(name)?;
            }
            Self::SubmitAnswer { answer_index, .. } => {
                if *answer_index >= OPTION_COUNT {
                    return Err(ProtocolError::invalid("answerIndex", "must be between 0 and 3"));
                }
            }
            Self::JoinSession { .. }
            | Self::StartQuestion { .. }
            | Self::NextQuestion {}
            | Self::EndGame {}
            | Self::Ping { .. } => {}
        }
        Ok(())
    }
}

/// Checks a display name after trimming surrounding whitespace.
///
/// # Errors
/// Returns [`ProtocolError::Invalid`] if the trimmed name is empty or longer
/// than [`MAX_NAME_CHARS`].
pub fn validate_display_name(name: &str) -> Result<(), ProtocolError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::invalid("name", "name is required"));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(ProtocolError::invalid("name", "name too long"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pin, QuizId};

    fn join(pin: &str, name: &str) -> ClientEvent {
        ClientEvent::PlayerJoin {
            pin: Pin::new_unchecked(pin),
            name: name.into(),
        }
    }

    #[test]
    fn test_validate_player_join_accepts_valid_payload() {
        assert!(join("123456", "Ana").validate().is_ok());
    }

    #[test]
    fn test_validate_player_join_rejects_short_pin() {
        let err = join("12345", "Ana").validate().unwrap_err();
        assert!(err.to_string().contains("pin"));
    }

    #[test]
    fn test_validate_player_join_rejects_blank_name() {
        assert!(join("123456", "   ").validate().is_err());
    }

    #[test]
    fn test_validate_player_join_name_limit_counts_chars_not_bytes() {
        let fifty_umlauts = "ü".repeat(50);
        assert!(join("123456", &fifty_umlauts).validate().is_ok());
        let fifty_one = "a".repeat(51);
        assert!(join("123456", &fifty_one).validate().is_err());
    }

    #[test]
    fn test_validate_submit_answer_rejects_index_four() {
        let event = ClientEvent::SubmitAnswer {
            question_index: 0,
            answer_index: 4,
            time_taken_ms: 0,
        };
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_validate_authenticate_rejects_empty_token() {
        let event = ClientEvent::Authenticate { token: String::new() };
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_validate_create_session_rejects_empty_quiz_id() {
        let event = ClientEvent::CreateSession { quiz_id: QuizId::from("") };
        assert!(event.validate().is_err());
    }
}
