// src/bot/datepicker.rs — Inline month-grid calendar for free date entry
//
// Used when the user wants an entry on a day other than today/yesterday.
// Header: [<] [Month Year] [>]. Body: weekday row, then 7-wide day rows
// padded with inert filler cells so every row keeps its width.

use chrono::{Datelike, NaiveDate};

use crate::bot::callback::Callback;
use crate::telegram::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::util::{days_in_month, month_label, month_start, next_month, prev_month};

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

fn filler() -> InlineKeyboardButton {
    InlineKeyboardButton::new(" ", Callback::PickIgnore.encode())
}

/// Render the month containing `month` as an inline keyboard.
pub fn month_grid(month: NaiveDate) -> InlineKeyboardMarkup {
    let start = month_start(month);
    let mut rows = vec![
        vec![
            InlineKeyboardButton::new("<", Callback::PickMonth(prev_month(start)).encode()),
            InlineKeyboardButton::new(month_label(start), Callback::PickIgnore.encode()),
            InlineKeyboardButton::new(">", Callback::PickMonth(next_month(start)).encode()),
        ],
        WEEKDAYS
            .iter()
            .map(|w| InlineKeyboardButton::new(*w, Callback::PickIgnore.encode()))
            .collect(),
    ];

    // Monday-based offset of the 1st within its week
    let lead = start.weekday().num_days_from_monday() as usize;
    let days = days_in_month(start);

    let mut row: Vec<InlineKeyboardButton> = (0..lead).map(|_| filler()).collect();
    for day in 1..=days {
        let date = NaiveDate::from_ymd_opt(start.year(), start.month(), day)
            .unwrap_or(start);
        row.push(InlineKeyboardButton::new(
            day.to_string(),
            Callback::PickDay(date).encode(),
        ));
        if row.len() == 7 {
            rows.push(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        while row.len() < 7 {
            row.push(filler());
        }
        rows.push(row);
    }

    InlineKeyboardMarkup {
        inline_keyboard: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_grid_shape() {
        // August 2026 starts on a Saturday and has 31 days:
        // 5 leading fillers, so 36 cells -> 6 day rows
        let grid = month_grid(d(2026, 8, 1));
        assert_eq!(grid.inline_keyboard.len(), 2 + 6);
        for row in &grid.inline_keyboard[1..] {
            assert_eq!(row.len(), 7);
        }
        assert_eq!(grid.inline_keyboard[0][1].text, "August 2026");
    }

    #[test]
    fn test_day_cells_carry_the_full_date() {
        let grid = month_grid(d(2026, 8, 1));
        let first_day = grid.inline_keyboard[2]
            .iter()
            .find(|b| b.text == "1")
            .unwrap();
        assert_eq!(first_day.callback_data, "d:day:20260801");
    }

    #[test]
    fn test_nav_targets_adjacent_months() {
        let grid = month_grid(d(2026, 1, 15));
        assert_eq!(grid.inline_keyboard[0][0].callback_data, "d:month:20251201");
        assert_eq!(grid.inline_keyboard[0][2].callback_data, "d:month:20260201");
    }

    #[test]
    fn test_fillers_are_inert() {
        let grid = month_grid(d(2026, 8, 1));
        assert_eq!(grid.inline_keyboard[2][0].callback_data, "d:ignore");
    }
}
