use serde::{Deserialize, Serialize};

/// XP policy constants. The shape is flat bonus + per-correct + unused-time bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    #[serde(default = "default_base_xp")]
    pub base_xp: u32,
    #[serde(default = "default_xp_per_correct")]
    pub xp_per_correct: u32,
    /// Seconds of unused time worth one bonus XP (rounded up).
    #[serde(default = "default_speed_divisor")]
    pub speed_divisor: u32,
    /// Timed lessons finished faster than this count as fast.
    #[serde(default = "default_fast_threshold_secs")]
    pub fast_threshold_secs: u32,
}

fn default_base_xp() -> u32 {
    5
}
fn default_xp_per_correct() -> u32 {
    2
}
fn default_speed_divisor() -> u32 {
    5
}
fn default_fast_threshold_secs() -> u32 {
    60
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base_xp: default_base_xp(),
            xp_per_correct: default_xp_per_correct(),
            speed_divisor: default_speed_divisor(),
            fast_threshold_secs: default_fast_threshold_secs(),
        }
    }
}

/// Countdown reading at the end of a timed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerReading {
    pub budget_secs: u32,
    pub remaining_secs: u32,
}

impl TimerReading {
    pub fn elapsed_secs(&self) -> u32 {
        self.budget_secs.saturating_sub(self.remaining_secs)
    }
}

/// Final outcome of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub xp: u32,
    pub correct: u32,
    pub mistakes: u32,
    /// Time taken in timer mode, 0 otherwise.
    pub time_seconds: u32,
    pub timed: bool,
    pub is_perfect: bool,
}

impl ScoringPolicy {
    pub fn compute(&self, correct: u32, mistakes: u32, timer: Option<TimerReading>) -> SessionResult {
        let speed_bonus = match timer {
            Some(reading) if self.speed_divisor > 0 => {
                reading.remaining_secs.div_ceil(self.speed_divisor)
            }
            _ => 0,
        };
        SessionResult {
            xp: self.base_xp + self.xp_per_correct * correct + speed_bonus,
            correct,
            mistakes,
            time_seconds: timer.map(|t| t.elapsed_secs()).unwrap_or(0),
            timed: timer.is_some(),
            is_perfect: mistakes == 0,
        }
    }

    /// Speed-run classification: timed and finished in under the threshold.
    pub fn is_fast(&self, result: &SessionResult) -> bool {
        result.timed && result.time_seconds > 0 && result.time_seconds < self.fast_threshold_secs
    }
}

/// Score with the default policy.
pub fn compute_result(correct: u32, mistakes: u32, timer: Option<TimerReading>) -> SessionResult {
    ScoringPolicy::default().compute(correct, mistakes, timer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_timed_score() {
        let r = compute_result(
            3,
            0,
            Some(TimerReading {
                budget_secs: 120,
                remaining_secs: 45,
            }),
        );
        assert_eq!(r.xp, 5 + 6 + 9);
        assert!(r.is_perfect);
        assert!(r.timed);
        assert_eq!(r.time_seconds, 75);
    }

    #[test]
    fn test_untimed_score() {
        let r = compute_result(5, 0, None);
        assert_eq!(r.xp, 15);
        assert_eq!(r.time_seconds, 0);
        assert!(!r.timed);
    }

    #[test]
    fn test_speed_bonus_rounds_up() {
        let reading = |remaining| TimerReading {
            budget_secs: 60,
            remaining_secs: remaining,
        };
        assert_eq!(compute_result(0, 1, Some(reading(1))).xp, 6);
        assert_eq!(compute_result(0, 1, Some(reading(5))).xp, 6);
        assert_eq!(compute_result(0, 1, Some(reading(6))).xp, 7);
        assert_eq!(compute_result(0, 1, Some(reading(0))).xp, 5);
    }

    #[test]
    fn test_mistakes_clear_perfect() {
        let r = compute_result(3, 2, None);
        assert!(!r.is_perfect);
        assert_eq!(r.mistakes, 2);
        assert_eq!(r.xp, 11);
    }

    #[test]
    fn test_fast_classification() {
        let policy = ScoringPolicy::default();
        let timed = |remaining| {
            policy.compute(
                5,
                0,
                Some(TimerReading {
                    budget_secs: 120,
                    remaining_secs: remaining,
                }),
            )
        };
        assert!(policy.is_fast(&timed(100)));
        assert!(!policy.is_fast(&timed(60)));
        assert!(!policy.is_fast(&timed(120)));
        assert!(!policy.is_fast(&policy.compute(5, 0, None)));
    }

    #[test]
    fn test_custom_policy_keeps_shape() {
        let policy = ScoringPolicy {
            base_xp: 10,
            xp_per_correct: 3,
            speed_divisor: 10,
            fast_threshold_secs: 30,
        };
        let r = policy.compute(
            2,
            0,
            Some(TimerReading {
                budget_secs: 60,
                remaining_secs: 25,
            }),
        );
        assert_eq!(r.xp, 10 + 6 + 3);
    }
}
