//! Answer scoring.
//!
//! The state machine only asks a [`ScoringPolicy`] how many points an answer
//! is worth; the numbers live here, behind a versioned policy.

/// Turns a judged answer into points.
pub trait ScoringPolicy: Send + Sync + 'static {
    /// Identifies the rule set, for logs.
    fn version(&self) -> &'static str;

    /// Points for one answer. Must be deterministic.
    fn points(&self, correct: bool, elapsed_ms: u64) -> u64;
}

/// Fixed base for a correct answer plus a bonus that shrinks with time.
///
/// `bonus = max(0, floor(500 - elapsed_ms / 10))`, so a correct answer is
/// worth 1500 at 0 ms, 1300 at 2 s, and 1000 from 5 s on. Wrong answers
/// score 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScoring;

impl StandardScoring {
    pub const BASE: u64 = 1000;
    pub const MAX_BONUS: u64 = 500;
    /// Milliseconds per bonus point lost.
    pub const MS_PER_POINT: u64 = 10;

    /// floor(MAX_BONUS - ms / MS_PER_POINT), clamped at zero.
    pub fn speed_bonus(elapsed_ms: u64) -> u64 {
        Self::MAX_BONUS.saturating_sub(elapsed_ms.div_ceil(Self::MS_PER_POINT))
    }
}

impl ScoringPolicy for StandardScoring {
    fn version(&self) -> &'static str {
        "standard-v1"
    }

    fn points(&self, correct: bool, elapsed_ms: u64) -> u64 {
        if correct {
            Self::BASE + Self::speed_bonus(elapsed_ms)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_correct_instant_answer_is_1500() {
        assert_eq!(StandardScoring.points(true, 0), 1500);
    }

    #[test]
    fn test_points_correct_after_two_seconds_is_1300() {
        assert_eq!(StandardScoring.points(true, 2000), 1300);
    }

    #[test]
    fn test_points_bonus_floors_at_zero() {
        assert_eq!(StandardScoring.points(true, 5000), 1000);
        assert_eq!(StandardScoring.points(true, 60_000), 1000);
        assert_eq!(StandardScoring.points(true, u64::MAX), 1000);
    }

    #[test]
    fn test_points_fractional_bonus_rounds_down() {
        // 500 - 0.5 = 499.5 → 499
        assert_eq!(StandardScoring.points(true, 5), 1499);
        // 500 - 199.9 = 300.1 → 300
        assert_eq!(StandardScoring.points(true, 1999), 1300);
    }

    #[test]
    fn test_points_wrong_answer_is_zero() {
        assert_eq!(StandardScoring.points(false, 0), 0);
        assert_eq!(StandardScoring.points(false, 9000), 0);
    }
}
