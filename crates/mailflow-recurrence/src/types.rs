use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::RecurrenceError;

/// How often a dispatch fires. Closed set — anything else is a configuration
/// error at the parsing boundary, not a runtime branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Frequency {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(RecurrenceError::InvalidFrequency(other.to_string())),
        }
    }
}

/// A recurrence rule: frequency plus the wall-clock time of day (HH:MM:SS,
/// interpreted in the system zone, UTC). Immutable once created; may be
/// shared by any number of dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub time_of_day: NaiveTime,
}

impl Recurrence {
    pub fn new(frequency: Frequency, time_of_day: NaiveTime) -> Self {
        Self {
            frequency,
            time_of_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_frequencies() {
        assert_eq!("daily".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
    }

    #[test]
    fn unknown_frequency_is_rejected() {
        let err = "invalid".parse::<Frequency>().unwrap_err();
        assert_eq!(err, RecurrenceError::InvalidFrequency("invalid".into()));
    }

    #[test]
    fn unknown_frequency_never_defaults_to_daily() {
        // Case and whitespace variants must also fail — no normalisation.
        assert!("Daily".parse::<Frequency>().is_err());
        assert!(" daily".parse::<Frequency>().is_err());
        assert!("".parse::<Frequency>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for f in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            assert_eq!(f.to_string().parse::<Frequency>().unwrap(), f);
        }
    }
}
