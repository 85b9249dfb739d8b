// src/bot/calendar.rs — Month-paged picker over a chart's dated entries
//
// A chart can accumulate years of daily entries; rendering all of them as
// buttons at once is both a usability and a payload problem. Pages are
// therefore time-boxed to one calendar month, with cursor-style navigation
// keyed by the boundary dates already present in the data.

use chrono::{Datelike, NaiveDate};

use crate::bot::callback::{Callback, EntryAction, PageDir};
use crate::pixela::PixelEntry;
use crate::telegram::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::util::{month_label, month_start, next_month};

pub const ROW_WIDTH: usize = 4;

/// One month-bounded slice of a chart's entries, ready for layout.
#[derive(Debug)]
pub struct Page {
    /// Navigation controls plus the month label, in display order.
    pub nav: Vec<InlineKeyboardButton>,
    /// Date buttons in chronological order within the month.
    pub dates: Vec<InlineKeyboardButton>,
}

impl Page {
    /// Lay the page out as a button grid: the nav/label row first, then
    /// date buttons left-to-right in rows of ROW_WIDTH.
    pub fn into_markup(self) -> InlineKeyboardMarkup {
        let mut inline_keyboard = vec![self.nav];
        for chunk in self.dates.chunks(ROW_WIDTH) {
            inline_keyboard.push(chunk.to_vec());
        }
        InlineKeyboardMarkup { inline_keyboard }
    }
}

fn date_button(entry: &PixelEntry, unit: &str, action: EntryAction) -> InlineKeyboardButton {
    InlineKeyboardButton::new(
        format!("{} - {} {unit}", entry.date.day(), entry.quantity),
        Callback::Entry {
            date: entry.date,
            action,
        }
        .encode(),
    )
}

fn nav_button(label: &str, date: NaiveDate, action: EntryAction, dir: PageDir) -> InlineKeyboardButton {
    InlineKeyboardButton::new(label, Callback::Page { date, action, dir }.encode())
}

fn label_button(month: NaiveDate) -> InlineKeyboardButton {
    InlineKeyboardButton::new(month_label(month), Callback::PageLabel.encode())
}

/// Initial page: the month of the most recent entry. Returns None when
/// there is nothing to show. Never carries a "next" control — nothing is
/// newer than the most recent entry.
pub fn first_page(entries: &[PixelEntry], unit: &str, action: EntryAction) -> Option<Page> {
    if entries.is_empty() {
        return None;
    }
    let mut sorted: Vec<&PixelEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let newest = sorted[0].date;
    let start = month_start(newest);

    let mut nav = Vec::new();
    if sorted.iter().any(|e| e.date < start) {
        nav.push(nav_button("<", start, action, PageDir::Prev));
    }
    nav.push(label_button(start));

    let mut dates: Vec<InlineKeyboardButton> = sorted
        .iter()
        .filter(|e| e.date >= start)
        .map(|e| date_button(e, unit, action))
        .collect();
    dates.reverse();

    Some(Page { nav, dates })
}

/// Page for the nearest month strictly before `before`.
///
/// Precondition: at least one entry is dated before `before`; navigation
/// controls are only emitted when qualifying entries exist, so a correct
/// caller cannot violate this.
pub fn previous_page(
    entries: &[PixelEntry],
    before: NaiveDate,
    unit: &str,
    action: EntryAction,
) -> Page {
    let mut older: Vec<&PixelEntry> = entries.iter().filter(|e| e.date < before).collect();
    older.sort_by(|a, b| b.date.cmp(&a.date));

    let newest = older[0].date;
    let start = month_start(newest);

    let mut nav = Vec::new();
    if older.iter().any(|e| e.date < start) {
        nav.push(nav_button("<", start, action, PageDir::Prev));
    }
    nav.push(label_button(start));
    // way back forward, to the month right after this window
    nav.push(nav_button(">", next_month(start), action, PageDir::Next));

    let mut dates: Vec<InlineKeyboardButton> = older
        .iter()
        .filter(|e| e.date >= start)
        .map(|e| date_button(e, unit, action))
        .collect();
    dates.reverse();

    Page { nav, dates }
}

/// Page for the month of the oldest entry dated on or after `from`.
///
/// Precondition: at least one entry is dated on or after `from`.
pub fn next_page(
    entries: &[PixelEntry],
    from: NaiveDate,
    unit: &str,
    action: EntryAction,
) -> Page {
    let mut newer: Vec<&PixelEntry> = entries.iter().filter(|e| e.date >= from).collect();
    newer.sort_by(|a, b| a.date.cmp(&b.date));

    let oldest = newer[0].date;
    let start = month_start(oldest);
    let end = next_month(start);

    let mut nav = vec![
        nav_button("<", start, action, PageDir::Prev),
        label_button(start),
    ];
    if newer.iter().any(|e| e.date >= end) {
        nav.push(nav_button(">", end, action, PageDir::Next));
    }

    let dates: Vec<InlineKeyboardButton> = newer
        .iter()
        .filter(|e| e.date < end)
        .map(|e| date_button(e, unit, action))
        .collect();

    Page { nav, dates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixela::Quantity;

    fn entry(y: i32, m: u32, d: u32, q: i64) -> PixelEntry {
        PixelEntry {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            quantity: Quantity::Int(q),
        }
    }

    #[test]
    fn test_first_page_empty() {
        assert!(first_page(&[], "km", EntryAction::Edit).is_none());
    }

    #[test]
    fn test_first_page_single_month() {
        let entries = vec![entry(2026, 8, 3, 1), entry(2026, 8, 14, 2)];
        let page = first_page(&entries, "km", EntryAction::Edit).unwrap();
        // no data before August: label only
        assert_eq!(page.nav.len(), 1);
        assert_eq!(page.nav[0].text, "August 2026");
        // chronological order within the page
        assert_eq!(page.dates[0].text, "3 - 1 km");
        assert_eq!(page.dates[1].text, "14 - 2 km");
    }

    #[test]
    fn test_first_page_prev_control_iff_older_data() {
        let entries = vec![entry(2026, 7, 30, 1), entry(2026, 8, 14, 2)];
        let page = first_page(&entries, "km", EntryAction::Delete).unwrap();
        assert_eq!(page.nav.len(), 2);
        assert_eq!(page.nav[0].text, "<");
        // cursor keyed by the window's first day
        assert_eq!(page.nav[0].callback_data, "c:d:p:20260801");
        assert_eq!(page.dates.len(), 1);
    }

    #[test]
    fn test_date_rows_of_four() {
        let entries: Vec<PixelEntry> = (1..=9).map(|d| entry(2026, 8, d, 1)).collect();
        let page = first_page(&entries, "km", EntryAction::Edit).unwrap();
        let markup = page.into_markup();
        // nav row + 4+4+1 date buttons
        assert_eq!(markup.inline_keyboard.len(), 4);
        assert_eq!(markup.inline_keyboard[1].len(), 4);
        assert_eq!(markup.inline_keyboard[3].len(), 1);
    }
}
