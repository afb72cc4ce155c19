//! Calendar decomposition

use chrono::{Datelike, NaiveDateTime, Weekday};

/// Calendar features for one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: u32,
    pub is_weekend: bool,
    /// ISO 8601 week number
    pub week_of_year: u32,
    pub month: u32,
    pub quarter: u32,
}

impl CalendarFeatures {
    pub fn from_timestamp(ts: &NaiveDateTime) -> Self {
        let weekday = ts.weekday();
        let month = ts.month();
        Self {
            day_of_week: weekday.num_days_from_monday(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            week_of_year: ts.iso_week().week(),
            month,
            quarter: (month - 1) / 3 + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_monday() {
        let cal = CalendarFeatures::from_timestamp(&ts(2024, 1, 8));
        assert_eq!(cal.day_of_week, 0);
        assert!(!cal.is_weekend);
        assert_eq!(cal.week_of_year, 2);
        assert_eq!(cal.month, 1);
        assert_eq!(cal.quarter, 1);
    }

    #[test]
    fn test_weekend() {
        let sat = CalendarFeatures::from_timestamp(&ts(2024, 1, 13));
        let sun = CalendarFeatures::from_timestamp(&ts(2024, 1, 14));
        assert_eq!((sat.day_of_week, sun.day_of_week), (5, 6));
        assert!(sat.is_weekend && sun.is_weekend);
    }

    #[test]
    fn test_iso_week_at_year_boundary() {
        // 2021-01-03 is a Sunday still in ISO week 53 of 2020
        assert_eq!(CalendarFeatures::from_timestamp(&ts(2021, 1, 3)).week_of_year, 53);
        // 2024-12-30 is a Monday already in ISO week 1 of 2025
        assert_eq!(CalendarFeatures::from_timestamp(&ts(2024, 12, 30)).week_of_year, 1);
    }

    #[test]
    fn test_quarters() {
        let quarters: Vec<u32> = (1..=12)
            .map(|m| CalendarFeatures::from_timestamp(&ts(2024, m, 1)).quarter)
            .collect();
        assert_eq!(quarters, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }
}
