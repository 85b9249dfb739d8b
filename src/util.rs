// src/util.rs — Shared date helpers

use chrono::{Datelike, NaiveDate};

/// Format a date as the canonical 8-digit wire token (YYYYMMDD).
pub fn date_to_token(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse an 8-digit wire token back into a date.
pub fn token_to_date(token: &str) -> Option<NaiveDate> {
    if token.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(token, "%Y%m%d").ok()
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// First day of the month after the one containing `date`.
/// December rolls over into January of the next year.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).unwrap_or(date)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1).unwrap_or(date)
    }
}

/// First day of the month before the one containing `date`.
/// January rolls back into December of the previous year.
pub fn prev_month(date: NaiveDate) -> NaiveDate {
    if date.month() == 1 {
        NaiveDate::from_ymd_opt(date.year() - 1, 12, 1).unwrap_or(date)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() - 1, 1).unwrap_or(date)
    }
}

/// Human-readable month header, e.g. "March 2026".
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let start = month_start(date);
    next_month(start).signed_duration_since(start).num_days() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_token_round_trip() {
        let date = d(2022, 3, 4);
        assert_eq!(date_to_token(date), "20220304");
        assert_eq!(token_to_date("20220304"), Some(date));
    }

    #[test]
    fn test_token_rejects_garbage() {
        assert_eq!(token_to_date("2022030"), None);
        assert_eq!(token_to_date("2022-3-4"), None);
        assert_eq!(token_to_date("abcdefgh"), None);
    }

    #[test]
    fn test_month_start() {
        assert_eq!(month_start(d(2026, 8, 26)), d(2026, 8, 1));
    }

    #[test]
    fn test_next_month_year_rollover() {
        assert_eq!(next_month(d(2025, 12, 15)), d(2026, 1, 1));
        assert_eq!(next_month(d(2026, 1, 1)), d(2026, 2, 1));
    }

    #[test]
    fn test_prev_month_year_rollback() {
        assert_eq!(prev_month(d(2026, 1, 15)), d(2025, 12, 1));
        assert_eq!(prev_month(d(2026, 3, 1)), d(2026, 2, 1));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(d(2026, 2, 10)), 28);
        assert_eq!(days_in_month(d(2024, 2, 10)), 29);
        assert_eq!(days_in_month(d(2026, 12, 31)), 31);
    }
}
