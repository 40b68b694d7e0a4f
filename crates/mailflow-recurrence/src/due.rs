use chrono::{DateTime, Duration, Utc};

/// How far past its due instant a dispatch is still considered due.
///
/// The source of record history disagreed between an open-ended `>=` check
/// and a bounded grace window, so the policy is an explicit configuration
/// value rather than a hidden literal. `Unbounded` is the canonical default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueTolerance {
    /// `now >= next_due_at`, however long ago that was.
    Unbounded,
    /// Due only within the window: `next_due_at <= now <= next_due_at + d`.
    Within(Duration),
}

/// Decides due-ness of a precomputed next-due instant. Pure, no side effects.
#[derive(Debug, Clone, Copy)]
pub struct DuePolicy {
    pub tolerance: DueTolerance,
}

impl Default for DuePolicy {
    fn default() -> Self {
        Self {
            tolerance: DueTolerance::Unbounded,
        }
    }
}

impl DuePolicy {
    pub fn new(tolerance: DueTolerance) -> Self {
        Self { tolerance }
    }

    /// Build from the optional `scheduler.due_tolerance_secs` config value.
    pub fn from_tolerance_secs(secs: Option<u64>) -> Self {
        match secs {
            Some(s) => Self::new(DueTolerance::Within(Duration::seconds(s as i64))),
            None => Self::new(DueTolerance::Unbounded),
        }
    }

    /// `false` when `next_due_at` is absent (inactive dispatch or no rule),
    /// otherwise whether `now` has crossed the instant within the tolerance.
    pub fn is_due(&self, next_due_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(due_at) = next_due_at else {
            return false;
        };
        if now < due_at {
            return false;
        }
        match self.tolerance {
            DueTolerance::Unbounded => true,
            DueTolerance::Within(window) => now - due_at <= window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, h, m, 0).unwrap()
    }

    #[test]
    fn absent_instant_is_never_due() {
        let policy = DuePolicy::default();
        assert!(!policy.is_due(None, at(12, 0)));
    }

    #[test]
    fn unbounded_is_due_at_or_after_the_instant() {
        let policy = DuePolicy::default();
        assert!(!policy.is_due(Some(at(12, 0)), at(11, 59)));
        assert!(policy.is_due(Some(at(12, 0)), at(12, 0)));
        assert!(policy.is_due(Some(at(12, 0)), at(18, 0)));
    }

    #[test]
    fn window_rejects_stale_due_instants() {
        let policy = DuePolicy::from_tolerance_secs(Some(300));
        assert!(policy.is_due(Some(at(12, 0)), at(12, 0)));
        assert!(policy.is_due(Some(at(12, 0)), at(12, 5)));
        assert!(!policy.is_due(Some(at(12, 0)), at(12, 6)));
    }

    #[test]
    fn config_absent_means_unbounded() {
        let policy = DuePolicy::from_tolerance_secs(None);
        assert_eq!(policy.tolerance, DueTolerance::Unbounded);
        assert!(policy.is_due(Some(at(12, 0)), at(23, 59)));
    }
}
