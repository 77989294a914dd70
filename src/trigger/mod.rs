//! Summary trigger policy.
//!
//! A pure decision over a room's counters and the configured thresholds.
//! Callers evaluate it while holding the room lock so the counters are
//! consistent with each other.
//!
//! The interval trigger measures from the last clear only. A room that has
//! never been cleared cannot fire on time alone; some other trigger has to
//! fire first to establish the baseline.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::{Duration, Instant};

/// Default minimum number of buffered messages before any trigger may fire.
pub const DEFAULT_MIN_MESSAGES: usize = 5;

/// Default volume threshold.
pub const DEFAULT_MESSAGE_COUNT: usize = 50;

/// Default time interval (30 minutes).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Default summary keyword.
pub const DEFAULT_KEYWORD: &str = "@bot summary";

/// Thresholds that decide when a room is eligible for summarization.
///
/// Zero disables the volume and interval triggers; an empty keyword
/// disables keyword detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerThresholds {
    /// Hard floor: below this count nothing fires.
    pub min_messages_for_summary: usize,

    /// Volume trigger (0 = disabled).
    pub message_count_threshold: usize,

    /// Time trigger measured from the last clear (zero = disabled).
    pub interval: Duration,

    /// Keyword that requests a summary on demand (empty = disabled).
    pub keyword: String,
}

impl Default for TriggerThresholds {
    fn default() -> Self {
        Self {
            min_messages_for_summary: DEFAULT_MIN_MESSAGES,
            message_count_threshold: DEFAULT_MESSAGE_COUNT,
            interval: DEFAULT_INTERVAL,
            keyword: DEFAULT_KEYWORD.to_string(),
        }
    }
}

/// Counters read from a room under its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomCounters {
    /// Live message count.
    pub count: usize,
    /// When the room was last cleared, if ever.
    pub last_cleared: Option<Instant>,
}

/// Why a room became eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The caller saw the keyword in the latest message.
    Keyword,
    /// The buffer reached the volume threshold.
    MessageCount {
        /// Live count.
        count: usize,
        /// Configured threshold.
        threshold: usize,
    },
    /// The interval elapsed since the last clear.
    Interval {
        /// Time since the last clear.
        elapsed: Duration,
    },
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword => f.write_str("keyword"),
            Self::MessageCount { count, threshold } => {
                write!(f, "message count ({count}/{threshold})")
            }
            Self::Interval { elapsed } => {
                write!(f, "time interval ({:.1} min)", elapsed.as_secs_f64() / 60.0)
            }
        }
    }
}

/// Outcome of a trigger evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Fewer messages than the floor.
    BelowFloor {
        /// Live count.
        count: usize,
        /// Configured floor.
        floor: usize,
    },
    /// A trigger fired.
    Fire(TriggerReason),
    /// Enough messages, but no trigger applies yet.
    Idle,
}

impl Decision {
    /// Returns `true` if the room should be summarized.
    #[must_use]
    pub const fn should_summarize(&self) -> bool {
        matches!(self, Self::Fire(_))
    }

    /// The reason the trigger fired, if it did.
    #[must_use]
    pub const fn reason(&self) -> Option<TriggerReason> {
        match self {
            Self::Fire(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl TriggerThresholds {
    /// Returns `true` when the interval trigger is configured.
    #[must_use]
    pub const fn interval_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Returns `true` when `text` contains the configured keyword.
    ///
    /// # Examples
    ///
    /// ```
    /// use roomscribe::trigger::TriggerThresholds;
    ///
    /// let thresholds = TriggerThresholds::default();
    /// assert!(thresholds.keyword_hit("hey @bot summary please"));
    /// assert!(!thresholds.keyword_hit("nothing to see"));
    /// ```
    #[must_use]
    pub fn keyword_hit(&self, text: &str) -> bool {
        !self.keyword.is_empty() && text.contains(&self.keyword)
    }

    /// Evaluates the policy against a room's counters at `now`.
    ///
    /// Order matters: the floor overrides everything, then keyword,
    /// volume, and interval in that order.
    #[must_use]
    pub fn evaluate(&self, counters: RoomCounters, keyword_hit: bool, now: Instant) -> Decision {
        let count = counters.count;
        if count < self.min_messages_for_summary {
            return Decision::BelowFloor {
                count,
                floor: self.min_messages_for_summary,
            };
        }

        if keyword_hit {
            return Decision::Fire(TriggerReason::Keyword);
        }

        if self.message_count_threshold > 0 && count >= self.message_count_threshold {
            return Decision::Fire(TriggerReason::MessageCount {
                count,
                threshold: self.message_count_threshold,
            });
        }

        if self.interval_enabled()
            && let Some(cleared) = counters.last_cleared
        {
            let elapsed = now.saturating_duration_since(cleared);
            if elapsed >= self.interval {
                return Decision::Fire(TriggerReason::Interval { elapsed });
            }
        }

        Decision::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn thresholds(min: usize, count: usize, interval_secs: u64) -> TriggerThresholds {
        TriggerThresholds {
            min_messages_for_summary: min,
            message_count_threshold: count,
            interval: Duration::from_secs(interval_secs),
            keyword: "@bot summary".to_string(),
        }
    }

    const fn counters(count: usize, last_cleared: Option<Instant>) -> RoomCounters {
        RoomCounters {
            count,
            last_cleared,
        }
    }

    #[test_case(1, true ; "keyword below floor")]
    #[test_case(4, true ; "keyword just below floor")]
    #[test_case(4, false ; "no keyword below floor")]
    fn test_floor_overrides_everything(count: usize, keyword: bool) {
        let now = Instant::now();
        let policy = thresholds(5, 1, 1);
        let long_ago = now.checked_sub(Duration::from_secs(3600));
        let decision = policy.evaluate(counters(count, long_ago), keyword, now);
        assert_eq!(decision, Decision::BelowFloor { count, floor: 5 });
        assert!(!decision.should_summarize());
    }

    #[test]
    fn test_keyword_fires_below_count_threshold() {
        let now = Instant::now();
        let policy = thresholds(2, 50, 0);
        let decision = policy.evaluate(counters(3, None), true, now);
        assert_eq!(decision, Decision::Fire(TriggerReason::Keyword));
    }

    #[test_case(0, 100, false ; "volume disabled")]
    #[test_case(10, 9, false ; "below threshold")]
    #[test_case(10, 10, true ; "at threshold")]
    #[test_case(10, 11, true ; "above threshold")]
    fn test_volume_trigger(threshold: usize, count: usize, expected: bool) {
        let now = Instant::now();
        let policy = thresholds(1, threshold, 0);
        let decision = policy.evaluate(counters(count, None), false, now);
        assert_eq!(decision.should_summarize(), expected);
    }

    #[test]
    fn test_interval_requires_prior_clear() {
        let now = Instant::now();
        let policy = thresholds(1, 0, 60);
        let decision = policy.evaluate(counters(10, None), false, now);
        assert_eq!(decision, Decision::Idle);
    }

    #[test]
    fn test_interval_after_clear() {
        let cleared = Instant::now();
        let policy = thresholds(1, 0, 60);

        let early = policy.evaluate(
            counters(3, Some(cleared)),
            false,
            cleared + Duration::from_secs(59),
        );
        assert_eq!(early, Decision::Idle);

        let due = policy.evaluate(
            counters(3, Some(cleared)),
            false,
            cleared + Duration::from_secs(60),
        );
        assert_eq!(
            due.reason(),
            Some(TriggerReason::Interval {
                elapsed: Duration::from_secs(60)
            })
        );
    }

    #[test]
    fn test_interval_disabled_ignores_clear() {
        let cleared = Instant::now();
        let policy = thresholds(1, 0, 0);
        let decision = policy.evaluate(
            counters(3, Some(cleared)),
            false,
            cleared + Duration::from_secs(86_400),
        );
        assert_eq!(decision, Decision::Idle);
    }

    #[test]
    fn test_keyword_hit() {
        let mut policy = TriggerThresholds::default();
        assert!(policy.keyword_hit("@bot summary"));
        assert!(!policy.keyword_hit("@bot summar"));

        policy.keyword = String::new();
        assert!(!policy.keyword_hit("@bot summary"));
        assert!(!policy.keyword_hit(""));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(TriggerReason::Keyword.to_string(), "keyword");
        assert_eq!(
            TriggerReason::MessageCount {
                count: 50,
                threshold: 50
            }
            .to_string(),
            "message count (50/50)"
        );
        assert_eq!(
            TriggerReason::Interval {
                elapsed: Duration::from_secs(90)
            }
            .to_string(),
            "time interval (1.5 min)"
        );
    }

    #[test]
    fn test_defaults() {
        let policy = TriggerThresholds::default();
        assert_eq!(policy.min_messages_for_summary, 5);
        assert_eq!(policy.message_count_threshold, 50);
        assert_eq!(policy.interval, Duration::from_secs(1800));
        assert!(policy.interval_enabled());
    }
}
