use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::error::{RecurrenceError, Result};
use crate::types::{Frequency, Recurrence};

/// Compute the next UTC instant `rule` should fire.
///
/// The candidate slot is built from the date of `last_occurrence` (when
/// present) or of `now`, combined with the rule's time of day. A candidate
/// still in the future is returned unmodified — a same-day slot that has not
/// passed yet fires today. Otherwise the candidate is advanced by one cycle:
/// one day, seven days, or one calendar month with the day-of-month clamped
/// to the target month's length (Jan 31 → Feb 28/29, Feb 29 → Mar 29).
///
/// Deterministic in its three inputs; `now` is injected so callers (and
/// tests) control the clock.
pub fn next_due(
    rule: &Recurrence,
    now: DateTime<Utc>,
    last_occurrence: Option<DateTime<Utc>>,
) -> Result<DateTime<Utc>> {
    let basis = last_occurrence.unwrap_or(now).date_naive();
    let candidate = combine(basis, rule)?;

    if candidate > now {
        return Ok(candidate);
    }

    let advanced = match rule.frequency {
        Frequency::Daily => candidate + Duration::days(1),
        Frequency::Weekly => candidate + Duration::days(7),
        Frequency::Monthly => combine(add_month_clamped(basis)?, rule)?,
    };
    Ok(advanced)
}

/// Combine a date with the rule's time of day into a UTC instant.
fn combine(date: NaiveDate, rule: &Recurrence) -> Result<DateTime<Utc>> {
    Utc.from_local_datetime(&date.and_time(rule.time_of_day))
        .single()
        .ok_or_else(|| RecurrenceError::OutOfRange(format!("{date} {}", rule.time_of_day)))
}

/// The same day number in the next calendar month, clamped to that month's
/// last day. Uniform rule: Jan 31 → Feb 28 (or 29), Feb 29 → Mar 29.
fn add_month_clamped(date: NaiveDate) -> Result<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| RecurrenceError::OutOfRange(format!("{year}-{month:02}-{day:02}")))
}

fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| RecurrenceError::OutOfRange(format!("{year}-{month:02}-01")))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| RecurrenceError::OutOfRange(format!("month after {year}-{month:02}")))?;
    Ok((next_first - first).num_days() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn rule(frequency: Frequency, h: u32, m: u32) -> Recurrence {
        Recurrence::new(frequency, NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn daily_future_slot_fires_today() {
        let now = utc(2024, 3, 9, 10, 0, 0);
        let next = next_due(&rule(Frequency::Daily, 11, 0), now, None).unwrap();
        assert_eq!(next, utc(2024, 3, 9, 11, 0, 0));
    }

    #[test]
    fn daily_past_slot_fires_tomorrow() {
        let now = utc(2024, 3, 9, 12, 0, 0);
        let next = next_due(&rule(Frequency::Daily, 11, 0), now, None).unwrap();
        assert_eq!(next, utc(2024, 3, 10, 11, 0, 0));
    }

    #[test]
    fn daily_slot_equal_to_now_advances() {
        // "<=" boundary: a candidate exactly at `now` has already passed.
        let now = utc(2024, 3, 9, 11, 0, 0);
        let next = next_due(&rule(Frequency::Daily, 11, 0), now, None).unwrap();
        assert_eq!(next, utc(2024, 3, 10, 11, 0, 0));
    }

    #[test]
    fn weekly_offset_is_zero_or_seven_days() {
        let t = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let r = Recurrence::new(Frequency::Weekly, t);
        for hour in [8, 10] {
            let now = utc(2024, 3, 9, hour, 0, 0);
            let next = next_due(&r, now, None).unwrap();
            let today_slot = utc(2024, 3, 9, 9, 30, 0);
            let delta = next - today_slot;
            assert!(
                delta == Duration::zero() || delta == Duration::days(7),
                "unexpected weekly offset: {delta}"
            );
        }
    }

    #[test]
    fn weekly_advances_from_last_occurrence() {
        let last = utc(2024, 3, 2, 9, 30, 0);
        let now = utc(2024, 3, 4, 15, 0, 0);
        let next = next_due(&rule(Frequency::Weekly, 9, 30), now, Some(last)).unwrap();
        assert_eq!(next, utc(2024, 3, 9, 9, 30, 0));
    }

    #[test]
    fn monthly_end_of_month_clamps_to_feb_28() {
        let now = utc(2023, 1, 31, 12, 0, 0);
        let next = next_due(&rule(Frequency::Monthly, 12, 0), now, None).unwrap();
        assert_eq!(next, utc(2023, 2, 28, 12, 0, 0));
    }

    #[test]
    fn monthly_leap_day_keeps_day_29() {
        let now = utc(2024, 2, 29, 12, 0, 0);
        let next = next_due(&rule(Frequency::Monthly, 12, 0), now, None).unwrap();
        assert_eq!(next, utc(2024, 3, 29, 12, 0, 0));
    }

    #[test]
    fn monthly_jan_31_into_leap_february() {
        let now = utc(2024, 1, 31, 12, 0, 0);
        let next = next_due(&rule(Frequency::Monthly, 12, 0), now, None).unwrap();
        assert_eq!(next, utc(2024, 2, 29, 12, 0, 0));
    }

    #[test]
    fn monthly_future_slot_fires_today() {
        let now = utc(2023, 1, 31, 11, 0, 0);
        let next = next_due(&rule(Frequency::Monthly, 12, 0), now, None).unwrap();
        assert_eq!(next, utc(2023, 1, 31, 12, 0, 0));
    }

    #[test]
    fn monthly_december_wraps_to_january() {
        let now = utc(2023, 12, 31, 13, 0, 0);
        let next = next_due(&rule(Frequency::Monthly, 12, 0), now, None).unwrap();
        assert_eq!(next, utc(2024, 1, 31, 12, 0, 0));
    }

    #[test]
    fn last_occurrence_date_is_the_basis() {
        // Rule changed nothing: basis comes from last occurrence, so a send
        // earlier today pushes the next slot a full cycle out.
        let last = utc(2024, 3, 9, 11, 0, 0);
        let now = utc(2024, 3, 9, 11, 0, 5);
        let next = next_due(&rule(Frequency::Daily, 11, 0), now, Some(last)).unwrap();
        assert_eq!(next, utc(2024, 3, 10, 11, 0, 0));
    }

    #[test]
    fn deterministic_given_same_inputs() {
        let now = utc(2024, 3, 9, 10, 0, 0);
        let r = rule(Frequency::Monthly, 12, 0);
        assert_eq!(
            next_due(&r, now, None).unwrap(),
            next_due(&r, now, None).unwrap()
        );
    }

    #[test]
    fn seconds_component_is_copied_verbatim() {
        let t = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        let r = Recurrence::new(Frequency::Daily, t);
        let now = utc(2024, 3, 9, 23, 59, 59);
        let next = next_due(&r, now, None).unwrap();
        assert_eq!(next, utc(2024, 3, 10, 23, 59, 59));
    }
}
