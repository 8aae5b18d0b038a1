use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};

use crate::error::PriscopeError;

/// A relative look-back window parsed from a compact token like `2d`, `3w`,
/// or `1m`.
///
/// Days and weeks subtract an exact duration; months subtract calendar
/// months, landing on the same day-of-month clamped to valid dates.
///
/// # Examples
///
/// ```
/// use priscope_core::TimeWindow;
///
/// let window: TimeWindow = "3w".parse().unwrap();
/// assert_eq!(window, TimeWindow::Weeks(3));
/// assert!("3x".parse::<TimeWindow>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// Look back this many days.
    Days(u32),
    /// Look back this many weeks.
    Weeks(u32),
    /// Look back this many calendar months.
    Months(u32),
}

impl TimeWindow {
    /// Compute the cutoff instant `now − window`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use priscope_core::TimeWindow;
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
    /// let cutoff = TimeWindow::Months(1).cutoff_from(now);
    /// // Calendar-aware: Mar 31 minus one month clamps to Feb 29 (leap year).
    /// assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
    /// ```
    pub fn cutoff_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeWindow::Days(n) => now
                .checked_sub_signed(Duration::days(i64::from(*n)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            TimeWindow::Weeks(n) => now
                .checked_sub_signed(Duration::weeks(i64::from(*n)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            TimeWindow::Months(n) => now
                .checked_sub_months(Months::new(*n))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

impl FromStr for TimeWindow {
    type Err = PriscopeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid =
            || PriscopeError::TimeWindow(format!("'{token}', use a format like '2d', '3w', or '1m'"));

        let Some(unit) = token.chars().next_back() else {
            return Err(invalid());
        };
        let value = &token[..token.len() - unit.len_utf8()];
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: u32 = value.parse().map_err(|_| invalid())?;

        match unit {
            'd' => Ok(TimeWindow::Days(value)),
            'w' => Ok(TimeWindow::Weeks(value)),
            'm' => Ok(TimeWindow::Months(value)),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn parse_valid_tokens() {
        assert_eq!("2d".parse::<TimeWindow>().unwrap(), TimeWindow::Days(2));
        assert_eq!("3w".parse::<TimeWindow>().unwrap(), TimeWindow::Weeks(3));
        assert_eq!("1m".parse::<TimeWindow>().unwrap(), TimeWindow::Months(1));
        assert_eq!("10d".parse::<TimeWindow>().unwrap(), TimeWindow::Days(10));
        assert_eq!("0d".parse::<TimeWindow>().unwrap(), TimeWindow::Days(0));
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        for token in ["", "d", "2", "2x", "x2d", "2.5d", "2dd", "-2d", " 2d", "2□"] {
            assert!(token.parse::<TimeWindow>().is_err(), "accepted {token:?}");
        }
    }

    #[test]
    fn parse_rejects_out_of_range_value() {
        assert!("99999999999999d".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn days_and_weeks_subtract_exact_durations() {
        let now = at(2024, 3, 15, 12);
        assert_eq!(TimeWindow::Days(2).cutoff_from(now), at(2024, 3, 13, 12));
        assert_eq!(TimeWindow::Weeks(3).cutoff_from(now), at(2024, 2, 23, 12));
    }

    #[test]
    fn months_subtract_calendar_months() {
        let now = at(2024, 3, 15, 12);
        assert_eq!(TimeWindow::Months(1).cutoff_from(now), at(2024, 2, 15, 12));
        assert_eq!(TimeWindow::Months(12).cutoff_from(now), at(2023, 3, 15, 12));
    }

    #[test]
    fn month_subtraction_clamps_to_valid_dates() {
        // Mar 31 has no Feb 31 counterpart; clamp to the last valid day.
        assert_eq!(
            TimeWindow::Months(1).cutoff_from(at(2024, 3, 31, 12)),
            at(2024, 2, 29, 12)
        );
        assert_eq!(
            TimeWindow::Months(1).cutoff_from(at(2023, 3, 31, 12)),
            at(2023, 2, 28, 12)
        );
        assert_eq!(
            TimeWindow::Months(1).cutoff_from(at(2024, 5, 31, 12)),
            at(2024, 4, 30, 12)
        );
    }

    #[test]
    fn zero_window_is_identity() {
        let now = at(2024, 3, 15, 12);
        assert_eq!(TimeWindow::Days(0).cutoff_from(now), now);
        assert_eq!(TimeWindow::Months(0).cutoff_from(now), now);
    }
}
