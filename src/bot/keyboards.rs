// src/bot/keyboards.rs — Button grid builders

use crate::bot::callback::{Callback, ChartAction};
use crate::pixela::{Color, GraphDef, ValueKind};
use crate::telegram::types::{InlineKeyboardButton, InlineKeyboardMarkup, ReplyKeyboardMarkup};

fn btn(text: impl Into<String>, cb: Callback) -> InlineKeyboardButton {
    InlineKeyboardButton::new(text, cb.encode())
}

/// One button per chart, opening its action menu.
pub fn charts_list(charts: &[GraphDef]) -> InlineKeyboardMarkup {
    let inline_keyboard = charts
        .iter()
        .map(|g| {
            vec![btn(
                format!("{} (in {})", g.name, g.unit),
                Callback::chart(&g.id, ChartAction::List),
            )]
        })
        .collect();
    InlineKeyboardMarkup { inline_keyboard }
}

/// Actions for a selected chart.
pub fn chart_actions(chart: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![btn("View", Callback::chart(chart, ChartAction::View))],
            vec![btn("Entries", Callback::chart(chart, ChartAction::Entries))],
            vec![btn("Edit", Callback::chart(chart, ChartAction::Edit))],
            vec![btn("Delete", Callback::chart(chart, ChartAction::Delete))],
            vec![btn("Back", Callback::chart(chart, ChartAction::Back))],
        ],
    }
}

/// Entry operations submenu.
pub fn entry_actions(chart: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![btn("Add", Callback::chart(chart, ChartAction::AddEntry))],
            vec![btn(
                "Edit",
                Callback::chart(chart, ChartAction::EditEntries),
            )],
            vec![btn(
                "Delete",
                Callback::chart(chart, ChartAction::DeleteEntries),
            )],
            vec![btn("Back", Callback::chart(chart, ChartAction::List))],
        ],
    }
}

/// Date choices when adding an entry.
pub fn add_entry_dates(chart: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![btn("Today", Callback::chart(chart, ChartAction::AddToday))],
            vec![btn(
                "Yesterday",
                Callback::chart(chart, ChartAction::AddYesterday),
            )],
            vec![btn(
                "Another day",
                Callback::chart(chart, ChartAction::AddOther),
            )],
        ],
    }
}

/// Field choices when editing a chart. With no chart id (the creation
/// confirm step) there is no Back button and the callbacks carry no id.
pub fn edit_fields(chart: Option<&str>) -> InlineKeyboardMarkup {
    let cb = |action| Callback::Chart {
        chart: chart.map(str::to_string),
        action,
    };
    let mut inline_keyboard = vec![
        vec![btn("Name", cb(ChartAction::EditName))],
        vec![btn("Unit", cb(ChartAction::EditUnit))],
        vec![btn("Value type", cb(ChartAction::EditType))],
        vec![btn("Color", cb(ChartAction::EditColor))],
    ];
    if let Some(id) = chart {
        inline_keyboard.push(vec![btn("Back", Callback::chart(id, ChartAction::List))]);
    }
    InlineKeyboardMarkup { inline_keyboard }
}

/// Yes/no confirmation for chart deletion. "No" returns to the menu.
pub fn confirm_chart_delete(chart: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![
            btn("Yes", Callback::chart(chart, ChartAction::DeleteConfirm)),
            btn("No", Callback::chart(chart, ChartAction::List)),
        ]],
    }
}

/// Reply keyboard offering the two value kinds.
pub fn value_kind_keyboard() -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup::from_labels(
        &[ValueKind::Int.label(), ValueKind::Float.label()],
        2,
    )
}

/// Reply keyboard offering the closed color palette.
pub fn color_keyboard() -> ReplyKeyboardMarkup {
    let labels: Vec<&str> = Color::ALL.iter().map(|c| c.label()).collect();
    ReplyKeyboardMarkup::from_labels(&labels, 3)
}
