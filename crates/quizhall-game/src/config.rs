//! Engine configuration.

use std::time::Duration;

use quizhall_protocol::MAX_NAME_CHARS;
use quizhall_timer::DEFAULT_LATE_WARN;

/// Settings shared by every session actor.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// PIN draws before session creation gives up.
    pub pin_attempts: u32,

    /// Longest display name, in characters, after trimming.
    pub max_name_chars: usize,

    /// Capacity of each session's command queue. Senders wait when full.
    pub command_buffer: usize,

    /// A countdown noticed later than this after its deadline is logged.
    pub late_timer_warn: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pin_attempts: 20,
            max_name_chars: MAX_NAME_CHARS,
            command_buffer: 64,
            late_timer_warn: DEFAULT_LATE_WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.pin_attempts, 20);
        assert_eq!(config.max_name_chars, 50);
        assert_eq!(config.command_buffer, 64);
        assert_eq!(config.late_timer_warn, Duration::from_millis(250));
    }
}
