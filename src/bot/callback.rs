// src/bot/callback.rs — Callback-data codec
//
// Telegram limits callback data to 64 bytes, so payloads are compact
// colon-separated tokens with a one-letter namespace:
//   g:<action>:<chart-id or ->       chart actions
//   p:<e|d>:<yyyymmdd>               a dated entry, tagged edit/delete
//   c:<e|d>:<p|n>:<yyyymmdd>         entry-page navigation cursor
//   c:ignore                         the non-interactive month label
//   d:day:<yyyymmdd>                 date-picker day selection
//   d:month:<yyyymmdd>               date-picker month navigation
//   d:ignore                         date-picker filler cell

use chrono::NaiveDate;

use crate::util::{date_to_token, token_to_date};

/// Action on (or under) a specific chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartAction {
    /// Select the chart and show its action menu.
    List,
    View,
    Edit,
    EditName,
    EditUnit,
    EditType,
    EditColor,
    Delete,
    DeleteConfirm,
    Back,
    /// Open the entry submenu.
    Entries,
    AddEntry,
    AddToday,
    AddYesterday,
    AddOther,
    EditEntries,
    DeleteEntries,
}

impl ChartAction {
    fn as_str(&self) -> &'static str {
        match self {
            ChartAction::List => "list",
            ChartAction::View => "view",
            ChartAction::Edit => "edit",
            ChartAction::EditName => "ename",
            ChartAction::EditUnit => "eunit",
            ChartAction::EditType => "etype",
            ChartAction::EditColor => "ecolor",
            ChartAction::Delete => "del",
            ChartAction::DeleteConfirm => "delc",
            ChartAction::Back => "back",
            ChartAction::Entries => "pix",
            ChartAction::AddEntry => "add",
            ChartAction::AddToday => "today",
            ChartAction::AddYesterday => "yest",
            ChartAction::AddOther => "other",
            ChartAction::EditEntries => "epix",
            ChartAction::DeleteEntries => "dpix",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "list" => Some(ChartAction::List),
            "view" => Some(ChartAction::View),
            "edit" => Some(ChartAction::Edit),
            "ename" => Some(ChartAction::EditName),
            "eunit" => Some(ChartAction::EditUnit),
            "etype" => Some(ChartAction::EditType),
            "ecolor" => Some(ChartAction::EditColor),
            "del" => Some(ChartAction::Delete),
            "delc" => Some(ChartAction::DeleteConfirm),
            "back" => Some(ChartAction::Back),
            "pix" => Some(ChartAction::Entries),
            "add" => Some(ChartAction::AddEntry),
            "today" => Some(ChartAction::AddToday),
            "yest" => Some(ChartAction::AddYesterday),
            "other" => Some(ChartAction::AddOther),
            "epix" => Some(ChartAction::EditEntries),
            "dpix" => Some(ChartAction::DeleteEntries),
            _ => None,
        }
    }
}

/// The picker action an entry button commits to, threaded through the
/// paginator unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    Edit,
    Delete,
}

impl EntryAction {
    fn as_str(&self) -> &'static str {
        match self {
            EntryAction::Edit => "e",
            EntryAction::Delete => "d",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "e" => Some(EntryAction::Edit),
            "d" => Some(EntryAction::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDir {
    Prev,
    Next,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
    /// Chart action; `chart` is None while a chart is still being created.
    Chart {
        chart: Option<String>,
        action: ChartAction,
    },
    /// A concrete dated entry inside the picker.
    Entry { date: NaiveDate, action: EntryAction },
    /// Month navigation inside the picker; `date` is the cursor boundary.
    Page {
        date: NaiveDate,
        action: EntryAction,
        dir: PageDir,
    },
    /// The month label; pressing it is a deliberate no-op.
    PageLabel,
    /// Date-picker day selection.
    PickDay(NaiveDate),
    /// Date-picker month navigation; `date` is the month to render.
    PickMonth(NaiveDate),
    /// Date-picker filler cell; no-op.
    PickIgnore,
}

impl Callback {
    pub fn chart(chart: impl Into<String>, action: ChartAction) -> Self {
        Callback::Chart {
            chart: Some(chart.into()),
            action,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Callback::Chart { chart, action } => {
                format!("g:{}:{}", action.as_str(), chart.as_deref().unwrap_or("-"))
            }
            Callback::Entry { date, action } => {
                format!("p:{}:{}", action.as_str(), date_to_token(*date))
            }
            Callback::Page { date, action, dir } => {
                let d = match dir {
                    PageDir::Prev => "p",
                    PageDir::Next => "n",
                };
                format!("c:{}:{d}:{}", action.as_str(), date_to_token(*date))
            }
            Callback::PageLabel => "c:ignore".into(),
            Callback::PickDay(date) => format!("d:day:{}", date_to_token(*date)),
            Callback::PickMonth(date) => format!("d:month:{}", date_to_token(*date)),
            Callback::PickIgnore => "d:ignore".into(),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.split(':');
        match parts.next()? {
            "g" => {
                let action = ChartAction::parse(parts.next()?)?;
                let chart = match parts.next()? {
                    "-" => None,
                    id => Some(id.to_string()),
                };
                Some(Callback::Chart { chart, action })
            }
            "p" => {
                let action = EntryAction::parse(parts.next()?)?;
                let date = token_to_date(parts.next()?)?;
                Some(Callback::Entry { date, action })
            }
            "c" => match parts.next()? {
                "ignore" => Some(Callback::PageLabel),
                action => {
                    let action = EntryAction::parse(action)?;
                    let dir = match parts.next()? {
                        "p" => PageDir::Prev,
                        "n" => PageDir::Next,
                        _ => return None,
                    };
                    let date = token_to_date(parts.next()?)?;
                    Some(Callback::Page { date, action, dir })
                }
            },
            "d" => match parts.next()? {
                "ignore" => Some(Callback::PickIgnore),
                "day" => Some(Callback::PickDay(token_to_date(parts.next()?)?)),
                "month" => Some(Callback::PickMonth(token_to_date(parts.next()?)?)),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_chart_round_trip() {
        let cb = Callback::chart("running-km", ChartAction::EditType);
        assert_eq!(cb.encode(), "g:etype:running-km");
        assert_eq!(Callback::parse("g:etype:running-km"), Some(cb));
    }

    #[test]
    fn test_chart_without_id() {
        let cb = Callback::Chart {
            chart: None,
            action: ChartAction::EditColor,
        };
        assert_eq!(cb.encode(), "g:ecolor:-");
        assert_eq!(Callback::parse("g:ecolor:-"), Some(cb));
    }

    #[test]
    fn test_entry_and_page_round_trip() {
        let cb = Callback::Entry {
            date: d(2026, 3, 4),
            action: EntryAction::Delete,
        };
        assert_eq!(cb.encode(), "p:d:20260304");
        assert_eq!(Callback::parse(&cb.encode()), Some(cb));

        let cb = Callback::Page {
            date: d(2026, 3, 1),
            action: EntryAction::Edit,
            dir: PageDir::Prev,
        };
        assert_eq!(cb.encode(), "c:e:p:20260301");
        assert_eq!(Callback::parse(&cb.encode()), Some(cb));
    }

    #[test]
    fn test_picker_round_trip() {
        let cb = Callback::PickDay(d(2025, 12, 31));
        assert_eq!(Callback::parse(&cb.encode()), Some(cb));
        let cb = Callback::PickMonth(d(2026, 1, 1));
        assert_eq!(Callback::parse(&cb.encode()), Some(cb));
        assert_eq!(Callback::parse("d:ignore"), Some(Callback::PickIgnore));
        assert_eq!(Callback::parse("c:ignore"), Some(Callback::PageLabel));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Callback::parse(""), None);
        assert_eq!(Callback::parse("x:y:z"), None);
        assert_eq!(Callback::parse("g:fly:run"), None);
        assert_eq!(Callback::parse("p:e:not-a-date"), None);
    }

    #[test]
    fn test_stays_under_telegram_limit() {
        // chart ids are slugs of user-chosen names; the service caps them
        // well under this, but the envelope itself must stay small
        let cb = Callback::chart("a".repeat(48), ChartAction::DeleteConfirm);
        assert!(cb.encode().len() <= 64);
    }
}
