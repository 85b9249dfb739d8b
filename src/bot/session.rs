// src/bot/session.rs — Per-user conversation state

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::pixela::{Color, GraphDef, PixelEntry, Quantity, ValueKind};

/// The conversation step an identity is currently in. Every inbound event
/// is interpreted relative to this value; transitions are total, with
/// "stay and report not-understood" as the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingConsent,
    AwaitingProfileName,
    ChartName,
    ChartUnit,
    ChartType,
    ChartColor,
    ChartConfirm,
    DeletionConfirm,
    /// Entry date chosen; awaiting the quantity for a new entry.
    EntryQuantity,
    /// Awaiting a replacement quantity for an existing entry.
    EntryEditQuantity,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::AwaitingConsent => "awaiting_consent",
            Phase::AwaitingProfileName => "awaiting_profile_name",
            Phase::ChartName => "chart_name",
            Phase::ChartUnit => "chart_unit",
            Phase::ChartType => "chart_type",
            Phase::ChartColor => "chart_color",
            Phase::ChartConfirm => "chart_confirm",
            Phase::DeletionConfirm => "deletion_confirm",
            Phase::EntryQuantity => "entry_quantity",
            Phase::EntryEditQuantity => "entry_edit_quantity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Phase::Idle),
            "awaiting_consent" => Some(Phase::AwaitingConsent),
            "awaiting_profile_name" => Some(Phase::AwaitingProfileName),
            "chart_name" => Some(Phase::ChartName),
            "chart_unit" => Some(Phase::ChartUnit),
            "chart_type" => Some(Phase::ChartType),
            "chart_color" => Some(Phase::ChartColor),
            "chart_confirm" => Some(Phase::ChartConfirm),
            "deletion_confirm" => Some(Phase::DeletionConfirm),
            "entry_quantity" => Some(Phase::EntryQuantity),
            "entry_edit_quantity" => Some(Phase::EntryEditQuantity),
            _ => None,
        }
    }
}

/// A chart under construction, or an existing chart with one field being
/// re-collected (`editing_existing` on the session tells which).
/// `ChartDraft::default()` is the all-None reset state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub value_kind: Option<ValueKind>,
    pub color: Option<Color>,
}

impl ChartDraft {
    pub fn from_def(def: &GraphDef) -> Self {
        Self {
            id: Some(def.id.clone()),
            name: Some(def.name.clone()),
            unit: Some(def.unit.clone()),
            value_kind: Some(def.value_kind),
            color: Some(def.color),
        }
    }

    /// Build a full definition once every field is filled. `None` while
    /// any field is still missing.
    pub fn to_def(&self) -> Option<GraphDef> {
        Some(GraphDef {
            id: self.id.clone()?,
            name: self.name.clone()?,
            unit: self.unit.clone()?,
            value_kind: self.value_kind?,
            color: self.color?,
        })
    }
}

/// A dated entry under construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub date: Option<NaiveDate>,
    pub quantity: Option<Quantity>,
}

/// Everything we remember about one chat participant between turns.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSession {
    pub id: i64,
    pub display_name: String,
    pub remote_token: Option<String>,
    pub remote_username: Option<String>,
    pub phase: Phase,
    pub chart_draft: ChartDraft,
    pub entry_draft: EntryDraft,
    /// Entry list fetched when entering the entry-picker flow; consumed by
    /// the paginator, cleared whenever an entry or chart mutation commits.
    pub cached_entries: Vec<PixelEntry>,
    pub editing_existing: bool,
}

impl UserSession {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            remote_token: None,
            remote_username: None,
            phase: Phase::Idle,
            chart_draft: ChartDraft::default(),
            entry_draft: EntryDraft::default(),
            cached_entries: Vec::new(),
            editing_existing: false,
        }
    }

    /// Whether a remote profile is linked.
    pub fn has_profile(&self) -> bool {
        self.remote_token.is_some() && self.remote_username.is_some()
    }

    /// Credentials for the chart service, when linked.
    pub fn creds(&self) -> Option<(&str, &str)> {
        match (&self.remote_token, &self.remote_username) {
            (Some(t), Some(u)) => Some((t.as_str(), u.as_str())),
            _ => None,
        }
    }

    pub fn reset_chart(&mut self) {
        self.chart_draft = ChartDraft::default();
        self.editing_existing = false;
    }

    pub fn reset_entry(&mut self) {
        self.entry_draft = EntryDraft::default();
    }

    /// Reset to the not-onboarded state: credentials and drafts cleared,
    /// phase back to default. Used on profile deletion; sessions are never
    /// hard-deleted.
    pub fn reset_profile(&mut self) {
        self.remote_token = None;
        self.remote_username = None;
        self.phase = Phase::Idle;
        self.chart_draft = ChartDraft::default();
        self.entry_draft = EntryDraft::default();
        self.cached_entries.clear();
        self.editing_existing = false;
    }
}
