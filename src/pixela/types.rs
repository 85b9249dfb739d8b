// src/pixela/types.rs — Chart service domain types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric kind of a chart's values. Fixed once the chart has entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    Float,
}

impl ValueKind {
    /// Wire name used by the chart service.
    pub fn as_wire(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
        }
    }

    pub fn parse_wire(s: &str) -> Option<Self> {
        match s {
            "int" => Some(ValueKind::Int),
            "float" => Some(ValueKind::Float),
            _ => None,
        }
    }

    /// Label shown on keyboard buttons and in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            ValueKind::Int => "integer",
            ValueKind::Float => "fractional",
        }
    }

    /// Case-insensitive match against the button label.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "integer" => Some(ValueKind::Int),
            "fractional" => Some(ValueKind::Float),
            _ => None,
        }
    }
}

/// The closed color palette supported by the chart service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Shibafu,
    Momiji,
    Sora,
    Ichou,
    Ajisai,
    Kuro,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Shibafu,
        Color::Momiji,
        Color::Sora,
        Color::Ichou,
        Color::Ajisai,
        Color::Kuro,
    ];

    /// Wire name used by the chart service.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Color::Shibafu => "shibafu",
            Color::Momiji => "momiji",
            Color::Sora => "sora",
            Color::Ichou => "ichou",
            Color::Ajisai => "ajisai",
            Color::Kuro => "kuro",
        }
    }

    pub fn parse_wire(s: &str) -> Option<Self> {
        Color::ALL.iter().copied().find(|c| c.as_wire() == s)
    }

    /// Label shown on keyboard buttons.
    pub fn label(&self) -> &'static str {
        match self {
            Color::Shibafu => "green",
            Color::Momiji => "red",
            Color::Sora => "blue",
            Color::Ichou => "yellow",
            Color::Ajisai => "purple",
            Color::Kuro => "black",
        }
    }

    /// Case-insensitive match against the button label.
    pub fn from_label(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Color::ALL.iter().copied().find(|c| c.label() == lower)
    }
}

/// A dated numeric quantity. Integer parse is attempted before fractional,
/// so "10" is always `Int(10)` and "2.5" is `Float(2.5)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Int(i64),
    Float(f64),
}

impl Quantity {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return Some(Quantity::Int(n));
        }
        s.parse::<f64>().ok().map(Quantity::Float)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Quantity::Int(_) => ValueKind::Int,
            Quantity::Float(_) => ValueKind::Float,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Int(n) => write!(f, "{n}"),
            Quantity::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Full definition of a chart as held by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDef {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub value_kind: ValueKind,
    pub color: Color,
}

/// A single dated entry of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelEntry {
    pub date: NaiveDate,
    pub quantity: Quantity,
}

/// Derive a chart id from its display name: lowercase, with every
/// non-alphanumeric character replaced by a dash (runs are not collapsed,
/// matching the service's expectations for stable ids).
pub fn slug_id(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
