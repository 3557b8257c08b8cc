//! Season window and countdown.

use std::fmt;

use serde::Serialize;

use engine_config::SeasonConfig;

const MS_PER_MINUTE: u64 = 60 * 1000;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Time remaining, as shown next to the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeLeft {
    /// Until the next midnight UTC
    DailyReset { hours: u64, minutes: u64 },
    FixedDeadline { days: u64, hours: u64 },
    Ended,
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeLeft::DailyReset { hours, minutes } => write!(f, "{:02}h {:02}m", hours, minutes),
            TimeLeft::FixedDeadline { days, hours } => write!(f, "{}d {}h", days, hours),
            TimeLeft::Ended => f.write_str("Ended"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatus {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u64>,
    pub ended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_left: Option<TimeLeft>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub id: String,
    pub name: String,
    pub end_time_ms: Option<u64>,
    pub daily_reset: bool,
}

impl Season {
    pub fn from_config(config: &SeasonConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            end_time_ms: config.end_time_ms,
            daily_reset: config.daily_reset,
        }
    }

    /// Only a fixed end time closes a season; the daily reset is cosmetic.
    pub fn has_ended(&self, now_ms: u64) -> bool {
        self.end_time_ms.is_some_and(|end| now_ms >= end)
    }

    pub fn time_left(&self, now_ms: u64) -> Option<TimeLeft> {
        if self.has_ended(now_ms) {
            return Some(TimeLeft::Ended);
        }
        if self.daily_reset {
            let remaining = MS_PER_DAY - now_ms % MS_PER_DAY;
            return Some(TimeLeft::DailyReset {
                hours: remaining / MS_PER_HOUR,
                minutes: (remaining % MS_PER_HOUR) / MS_PER_MINUTE,
            });
        }
        self.end_time_ms.map(|end| {
            let remaining = end - now_ms;
            TimeLeft::FixedDeadline {
                days: remaining / MS_PER_DAY,
                hours: (remaining % MS_PER_DAY) / MS_PER_HOUR,
            }
        })
    }

    pub fn status(&self, now_ms: u64) -> SeasonStatus {
        SeasonStatus {
            id: self.id.clone(),
            name: self.name.clone(),
            end_time: self.end_time_ms,
            ended: self.has_ended(now_ms),
            time_left: self.time_left(now_ms),
        }
    }
}
