// src/bot/engine.rs — The conversation state machine
//
// One `handle` call per inbound event. The engine owns no transport: it
// reads the session, talks to the chart service, persists the session
// through the directory, and returns the replies to deliver. Remote
// failures hold the phase steady and skip the persistence write for that
// step, so the user can simply retry.

use std::sync::OnceLock;

use chrono::{Days, Local, NaiveDate};
use regex::Regex;
use tracing::{error, info, warn};

use crate::bot::callback::{Callback, ChartAction, EntryAction, PageDir};
use crate::bot::calendar;
use crate::bot::datepicker;
use crate::bot::keyboards;
use crate::bot::session::{ChartDraft, Phase, UserSession};
use crate::bot::types::{BotCmd, EventKind, InboundEvent, Reply};
use crate::infra::errors::HabitgramError;
use crate::pixela::{ChartService, Color, Quantity, ValueKind};
use crate::store::directory::UserDirectory;

fn profile_name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[a-z][a-z0-9-]{1,32}$").expect("static pattern"))
}

fn menu() -> Reply {
    Reply::send(
        "Pick a command:\n\
         /start - Find or create your profile.\n\
         /select - Show your charts.\n\
         /create - Create a new chart.\n\
         /delete - Delete your profile.",
    )
}

fn not_understood() -> Reply {
    Reply::send("I don't understand that.")
}

fn oops(err: &HabitgramError) -> Reply {
    Reply::send(format!("Something went wrong: {err}."))
}

pub struct DialogEngine<S: ChartService> {
    service: S,
    directory: UserDirectory,
}

impl<S: ChartService> DialogEngine<S> {
    pub fn new(service: S, directory: UserDirectory) -> Self {
        Self { service, directory }
    }

    /// Process one inbound event and return the replies to deliver.
    pub async fn handle(&mut self, event: InboundEvent) -> anyhow::Result<Vec<Reply>> {
        let Some(mut session) = self.directory.get(event.user_id)? else {
            return self.first_contact(&event);
        };
        match &event.kind {
            EventKind::Command(cmd) => self.on_command(*cmd, &mut session).await,
            EventKind::Text(text) => self.on_text(text, &mut session).await,
            EventKind::Callback(cb) => self.on_callback(cb.clone(), &mut session).await,
        }
    }

    /// First-ever event from this identity: remember it, greet it, and ask
    /// for consent to create a remote profile. The greeting stays pinned.
    fn first_contact(&mut self, event: &InboundEvent) -> anyhow::Result<Vec<Reply>> {
        info!(user = event.user_id, "First contact, creating session");
        let mut session = UserSession::new(event.user_id, &event.display_name);
        session.phase = Phase::AwaitingConsent;
        self.directory.create(session)?;
        Ok(vec![
            Reply::send_pinned(format!(
                "Hello, {}! This bot tracks your habits as pixel charts.",
                event.display_name
            )),
            Reply::send("No chart profile is linked yet. Create one? (yes/no)"),
        ])
    }

    // -- Commands --

    async fn on_command(
        &mut self,
        cmd: BotCmd,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        match cmd {
            BotCmd::Start => {
                if session.has_profile() {
                    let greeting = Reply::send(format!(
                        "Hello, {}! Your profile {} is linked.",
                        session.display_name,
                        session.remote_username.as_deref().unwrap_or_default()
                    ));
                    let mut replies = vec![greeting];
                    replies.extend(self.list_charts_replies(session).await?);
                    Ok(replies)
                } else {
                    session.phase = Phase::AwaitingConsent;
                    self.directory.save(session)?;
                    Ok(vec![Reply::send(format!(
                        "Hello, {}! No chart profile is linked yet. Create one? (yes/no)",
                        session.display_name
                    ))])
                }
            }
            BotCmd::Select => {
                if !session.has_profile() {
                    return Ok(vec![Reply::send("Create a profile first.")]);
                }
                self.list_charts_replies(session).await
            }
            BotCmd::Create => {
                if !session.has_profile() {
                    return Ok(vec![Reply::send("Create a profile first.")]);
                }
                session.reset_chart();
                session.phase = Phase::ChartName;
                self.directory.save(session)?;
                Ok(vec![
                    Reply::send("Creating a chart!"),
                    Reply::send("Pick a name for the chart:"),
                ])
            }
            BotCmd::Delete => {
                if !session.has_profile() {
                    return Ok(vec![Reply::send("There is no profile to delete.")]);
                }
                session.phase = Phase::DeletionConfirm;
                self.directory.save(session)?;
                Ok(vec![Reply::send("Are you sure? (yes/no)")])
            }
        }
    }

    // -- Free text, interpreted per phase --

    async fn on_text(
        &mut self,
        text: &str,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        match session.phase {
            Phase::AwaitingConsent => self.on_consent(text, session),
            Phase::AwaitingProfileName => self.on_profile_name(text, session).await,
            Phase::ChartName => {
                session.chart_draft.name = Some(text.trim().to_string());
                self.advance_wizard(session).await
            }
            Phase::ChartUnit => {
                session.chart_draft.unit = Some(text.trim().to_string());
                self.advance_wizard(session).await
            }
            Phase::ChartType => match ValueKind::from_label(text) {
                Some(kind) => {
                    session.chart_draft.value_kind = Some(kind);
                    self.advance_wizard(session).await
                }
                None => Ok(vec![not_understood()]),
            },
            Phase::ChartColor => match Color::from_label(text) {
                Some(color) => {
                    session.chart_draft.color = Some(color);
                    self.advance_wizard(session).await
                }
                None => Ok(vec![not_understood()]),
            },
            Phase::ChartConfirm => self.on_chart_confirm(text, session).await,
            Phase::DeletionConfirm => self.on_profile_delete(text, session).await,
            Phase::EntryQuantity | Phase::EntryEditQuantity => {
                self.on_entry_quantity(text, session).await
            }
            Phase::Idle => Ok(vec![not_understood(), menu()]),
        }
    }

    fn on_consent(&mut self, text: &str, session: &mut UserSession) -> anyhow::Result<Vec<Reply>> {
        match text.trim().to_lowercase().as_str() {
            "yes" => {
                session.phase = Phase::AwaitingProfileName;
                self.directory.save(session)?;
                Ok(vec![
                    Reply::send("Great!"),
                    Reply::send(
                        "Pick a name for your profile: lowercase latin letters, \
                         digits and dashes.",
                    ),
                ])
            }
            "no" => {
                session.phase = Phase::Idle;
                self.directory.save(session)?;
                Ok(vec![Reply::send("As you wish."), menu()])
            }
            _ => Ok(vec![not_understood()]),
        }
    }

    async fn on_profile_name(
        &mut self,
        text: &str,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        let name = text.trim().to_lowercase();
        if !profile_name_pattern().is_match(&name) {
            return Ok(vec![Reply::send("Please enter a valid name.")]);
        }
        match self.service.create_user(&name).await {
            Ok((token, username)) => {
                info!(user = session.id, %username, "Remote profile created");
                session.remote_token = Some(token);
                session.remote_username = Some(username.clone());
                session.phase = Phase::Idle;
                self.directory.save(session)?;
                Ok(vec![
                    Reply::send(format!(
                        "Profile created! Your profile name is {username}."
                    )),
                    menu(),
                ])
            }
            Err(err) => {
                error!(user = session.id, %err, "Profile creation failed");
                Ok(vec![oops(&err), Reply::send("Try another name.")])
            }
        }
    }

    async fn on_profile_delete(
        &mut self,
        text: &str,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        match text.trim().to_lowercase().as_str() {
            "yes" => {
                let (token, username) = creds_of(session)?;
                match self.service.delete_user(&token, &username).await {
                    Ok(()) => {
                        info!(user = session.id, "Remote profile deleted");
                        session.reset_profile();
                        self.directory.save(session)?;
                        Ok(vec![Reply::send("Profile deleted."), menu()])
                    }
                    Err(err) => {
                        error!(user = session.id, %err, "Profile deletion failed");
                        Ok(vec![oops(&err)])
                    }
                }
            }
            "no" => {
                session.phase = Phase::Idle;
                self.directory.save(session)?;
                self.list_charts_replies(session).await
            }
            _ => Ok(vec![not_understood()]),
        }
    }

    // -- Chart wizard --

    /// Move to the first still-empty draft field, or to the commit step
    /// when everything is filled. Serves both creation (walks all four
    /// fields) and single-field edits (exactly one field was cleared, so
    /// it commits right after that field fills).
    async fn advance_wizard(&mut self, session: &mut UserSession) -> anyhow::Result<Vec<Reply>> {
        if session.chart_draft.name.is_none() {
            session.phase = Phase::ChartName;
            self.directory.save(session)?;
            return Ok(vec![Reply::send("Pick a name for the chart:")]);
        }
        if session.chart_draft.unit.is_none() {
            session.phase = Phase::ChartUnit;
            self.directory.save(session)?;
            return Ok(vec![Reply::send("Pick the chart's unit of measurement:")]);
        }
        if session.chart_draft.value_kind.is_none() {
            session.phase = Phase::ChartType;
            self.directory.save(session)?;
            return Ok(vec![Reply::send_keyboard(
                "Pick the value type:",
                keyboards::value_kind_keyboard(),
            )]);
        }
        if session.chart_draft.color.is_none() {
            session.phase = Phase::ChartColor;
            self.directory.save(session)?;
            return Ok(vec![Reply::send_keyboard(
                "Pick the chart's color:",
                keyboards::color_keyboard(),
            )]);
        }
        if session.editing_existing {
            return self.commit_chart_update(session).await;
        }
        let draft = &session.chart_draft;
        let summary = format!(
            "Creating chart {} measured in {}, colored {}. Correct? (yes/no)",
            draft.name.as_deref().unwrap_or_default(),
            draft.unit.as_deref().unwrap_or_default(),
            draft.color.map(|c| c.label()).unwrap_or_default(),
        );
        session.phase = Phase::ChartConfirm;
        self.directory.save(session)?;
        Ok(vec![Reply::send(summary)])
    }

    async fn on_chart_confirm(
        &mut self,
        text: &str,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        match text.trim().to_lowercase().as_str() {
            "yes" => {
                let (token, username) = creds_of(session)?;
                let draft = &session.chart_draft;
                let (name, unit, kind, color) = (
                    require(draft.name.clone(), "name")?,
                    require(draft.unit.clone(), "unit")?,
                    require(draft.value_kind, "value kind")?,
                    require(draft.color, "color")?,
                );
                match self
                    .service
                    .create_chart(&token, &username, &name, &unit, kind, color)
                    .await
                {
                    Ok(id) => {
                        info!(user = session.id, chart = %id, "Chart created");
                        session.phase = Phase::Idle;
                        session.reset_chart();
                        session.cached_entries.clear();
                        self.directory.save(session)?;
                        Ok(vec![
                            Reply::send(format!("Created chart with id {id}!")),
                            menu(),
                        ])
                    }
                    Err(err) => {
                        error!(user = session.id, %err, "Chart creation failed");
                        Ok(vec![oops(&err)])
                    }
                }
            }
            "no" => Ok(vec![Reply::send_inline(
                "Pick what to change:",
                keyboards::edit_fields(None),
            )]),
            _ => Ok(vec![not_understood()]),
        }
    }

    /// Push a single-field edit of an existing chart to the service.
    async fn commit_chart_update(&mut self, session: &mut UserSession) -> anyhow::Result<Vec<Reply>> {
        let (token, username) = creds_of(session)?;
        let def = require(session.chart_draft.to_def(), "complete chart draft")?;
        match self.service.update_chart(&token, &username, &def).await {
            Ok(()) => {
                info!(user = session.id, chart = %def.id, "Chart updated");
                session.phase = Phase::Idle;
                session.reset_chart();
                session.cached_entries.clear();
                self.directory.save(session)?;
                Ok(vec![Reply::send("Chart updated!"), menu()])
            }
            Err(err) => {
                error!(user = session.id, %err, "Chart update failed");
                Ok(vec![oops(&err)])
            }
        }
    }

    // -- Inline-button callbacks --

    async fn on_callback(
        &mut self,
        callback: Callback,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        match callback {
            Callback::Chart { chart, action } => self.on_chart_action(chart, action, session).await,
            Callback::Entry { date, action } => match action {
                EntryAction::Edit => {
                    session.entry_draft.date = Some(date);
                    session.phase = Phase::EntryEditQuantity;
                    self.directory.save(session)?;
                    Ok(vec![Reply::send("Pick the new value for the entry:")])
                }
                EntryAction::Delete => self.delete_entry(date, session).await,
            },
            Callback::Page { date, action, dir } => Ok(self.turn_page(date, action, dir, session)),
            Callback::PickDay(date) => self.entry_date_chosen(date, session),
            Callback::PickMonth(month) => {
                Ok(vec![Reply::edit_markup(datepicker::month_grid(month))])
            }
            Callback::PageLabel | Callback::PickIgnore => Ok(Vec::new()),
        }
    }

    async fn on_chart_action(
        &mut self,
        chart: Option<String>,
        action: ChartAction,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        match action {
            ChartAction::List => {
                let Some(id) = chart else {
                    warn!(user = session.id, "Chart selection without an id");
                    return Ok(Vec::new());
                };
                let (token, username) = creds_of(session)?;
                match self.service.get_chart(&token, &username, &id).await {
                    Ok(def) => {
                        session.chart_draft = ChartDraft::from_def(&def);
                        session.editing_existing = false;
                        self.directory.save(session)?;
                        Ok(vec![Reply::edit_markup(keyboards::chart_actions(&id))])
                    }
                    Err(err) => {
                        error!(user = session.id, chart = %id, %err, "Chart lookup failed");
                        Ok(vec![oops(&err)])
                    }
                }
            }
            ChartAction::View => {
                let id = require(chart, "chart id")?;
                let (_, username) = creds_of(session)?;
                match self.service.chart_url(&username, &id).await {
                    Ok(url) => Ok(vec![Reply::edit_text(format!("Chart link:\n{url}"))]),
                    Err(err) => Ok(vec![oops(&err)]),
                }
            }
            ChartAction::Entries => {
                let id = require(chart, "chart id")?;
                Ok(vec![Reply::edit_with(
                    "Pick an entry action:",
                    keyboards::entry_actions(&id),
                )])
            }
            ChartAction::Edit => {
                let id = require(chart, "chart id")?;
                Ok(vec![Reply::edit_with(
                    "Edit:",
                    keyboards::edit_fields(Some(&id)),
                )])
            }
            ChartAction::EditName => {
                session.chart_draft.name = None;
                session.editing_existing = chart.is_some();
                session.phase = Phase::ChartName;
                self.directory.save(session)?;
                Ok(vec![Reply::edit_text("Pick a new name:")])
            }
            ChartAction::EditUnit => {
                session.chart_draft.unit = None;
                session.editing_existing = chart.is_some();
                session.phase = Phase::ChartUnit;
                self.directory.save(session)?;
                Ok(vec![Reply::edit_text("Pick a new unit of measurement:")])
            }
            ChartAction::EditType => self.begin_type_edit(chart, session).await,
            ChartAction::EditColor => {
                session.chart_draft.color = None;
                session.editing_existing = chart.is_some();
                session.phase = Phase::ChartColor;
                self.directory.save(session)?;
                Ok(vec![Reply::send_keyboard(
                    "Pick the chart's color:",
                    keyboards::color_keyboard(),
                )])
            }
            ChartAction::Delete => {
                let id = require(chart, "chart id")?;
                Ok(vec![Reply::edit_with(
                    "Are you sure?",
                    keyboards::confirm_chart_delete(&id),
                )])
            }
            ChartAction::DeleteConfirm => self.delete_chart(require(chart, "chart id")?, session).await,
            ChartAction::Back => self.list_charts_replies(session).await,
            ChartAction::AddEntry => {
                let id = require(chart, "chart id")?;
                Ok(vec![Reply::edit_with(
                    "Pick a date for the new entry:",
                    keyboards::add_entry_dates(&id),
                )])
            }
            ChartAction::AddToday => {
                let id = require(chart, "chart id")?;
                if let Some(reply) = self.refresh_stale_draft(&id, session).await? {
                    return Ok(vec![reply]);
                }
                self.entry_date_chosen(Local::now().date_naive(), session)
            }
            ChartAction::AddYesterday => {
                let id = require(chart, "chart id")?;
                if let Some(reply) = self.refresh_stale_draft(&id, session).await? {
                    return Ok(vec![reply]);
                }
                let yesterday = Local::now()
                    .date_naive()
                    .checked_sub_days(Days::new(1))
                    .unwrap_or_else(|| Local::now().date_naive());
                self.entry_date_chosen(yesterday, session)
            }
            ChartAction::AddOther => {
                let id = require(chart, "chart id")?;
                if let Some(reply) = self.refresh_stale_draft(&id, session).await? {
                    return Ok(vec![reply]);
                }
                Ok(vec![Reply::edit_with(
                    "Pick a date for the new entry:",
                    datepicker::month_grid(Local::now().date_naive()),
                )])
            }
            ChartAction::EditEntries => {
                let id = require(chart, "chart id")?;
                if let Some(reply) = self.refresh_stale_draft(&id, session).await? {
                    return Ok(vec![reply]);
                }
                self.open_entry_picker(id, EntryAction::Edit, session).await
            }
            ChartAction::DeleteEntries => {
                let id = require(chart, "chart id")?;
                if let Some(reply) = self.refresh_stale_draft(&id, session).await? {
                    return Ok(vec![reply]);
                }
                self.open_entry_picker(id, EntryAction::Delete, session).await
            }
        }
    }

    /// The value type is frozen once the chart has data, so the edit is
    /// only allowed after a live check shows zero entries.
    async fn begin_type_edit(
        &mut self,
        chart: Option<String>,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        if let Some(id) = &chart {
            let (token, username) = creds_of(session)?;
            match self.service.list_entries(&token, &username, id).await {
                Ok(entries) if !entries.is_empty() => {
                    return Ok(vec![Reply::send(
                        "You can't change the value type of a chart that already has entries.",
                    )]);
                }
                Ok(_) => {}
                Err(err) => {
                    error!(user = session.id, chart = %id, %err, "Entry check failed");
                    return Ok(vec![oops(&err)]);
                }
            }
        }
        session.chart_draft.value_kind = None;
        session.editing_existing = chart.is_some();
        session.phase = Phase::ChartType;
        self.directory.save(session)?;
        Ok(vec![Reply::send_keyboard(
            "Pick the value type:",
            keyboards::value_kind_keyboard(),
        )])
    }

    async fn delete_chart(
        &mut self,
        chart: String,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        let (token, username) = creds_of(session)?;
        match self.service.delete_chart(&token, &username, &chart).await {
            Ok(()) => {
                info!(user = session.id, chart = %chart, "Chart deleted");
                session.phase = Phase::Idle;
                session.reset_chart();
                session.cached_entries.clear();
                self.directory.save(session)?;
                Ok(vec![Reply::send("Chart deleted!"), menu()])
            }
            Err(err) => {
                error!(user = session.id, chart = %chart, %err, "Chart deletion failed");
                Ok(vec![oops(&err)])
            }
        }
    }

    // -- Entries --

    /// Inline keyboards outlive the draft that produced them: an entry
    /// button can be pressed long after the draft was reset or re-seeded
    /// from another chart. When the pressed button names a chart the
    /// draft does not hold, reload the definition so the entry step
    /// targets the right chart. Returns the failure reply when the
    /// reload itself fails.
    async fn refresh_stale_draft(
        &mut self,
        id: &str,
        session: &mut UserSession,
    ) -> anyhow::Result<Option<Reply>> {
        if session.chart_draft.id.as_deref() == Some(id) {
            return Ok(None);
        }
        let (token, username) = creds_of(session)?;
        match self.service.get_chart(&token, &username, id).await {
            Ok(def) => {
                session.chart_draft = ChartDraft::from_def(&def);
                session.editing_existing = false;
                self.directory.save(session)?;
                Ok(None)
            }
            Err(err) => {
                error!(user = session.id, chart = %id, %err, "Chart lookup failed");
                Ok(Some(oops(&err)))
            }
        }
    }

    /// Fetch the chart's entries and open the month-paged picker over
    /// them, tagged with the action the picked entry will receive.
    async fn open_entry_picker(
        &mut self,
        chart: String,
        action: EntryAction,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        let (token, username) = creds_of(session)?;
        let entries = match self.service.list_entries(&token, &username, &chart).await {
            Ok(entries) => entries,
            Err(err) => {
                error!(user = session.id, chart = %chart, %err, "Entry listing failed");
                return Ok(vec![oops(&err)]);
            }
        };
        let unit = session.chart_draft.unit.clone().unwrap_or_default();
        let prompt = match action {
            EntryAction::Edit => "Pick an entry to edit:",
            EntryAction::Delete => "Pick an entry to delete:",
        };
        let reply = match calendar::first_page(&entries, &unit, action) {
            Some(page) => Reply::edit_with(prompt, page.into_markup()),
            None => Reply::edit_text("No entries to show."),
        };
        session.cached_entries = entries;
        self.directory.save(session)?;
        Ok(vec![reply])
    }

    /// Month navigation within the picker, served from the cached list.
    /// A cursor with no qualifying entries is stale; nothing to do then.
    fn turn_page(
        &mut self,
        date: NaiveDate,
        action: EntryAction,
        dir: PageDir,
        session: &mut UserSession,
    ) -> Vec<Reply> {
        let entries = &session.cached_entries;
        let unit = session.chart_draft.unit.clone().unwrap_or_default();
        let page = match dir {
            PageDir::Prev => {
                if !entries.iter().any(|e| e.date < date) {
                    return Vec::new();
                }
                calendar::previous_page(entries, date, &unit, action)
            }
            PageDir::Next => {
                if !entries.iter().any(|e| e.date >= date) {
                    return Vec::new();
                }
                calendar::next_page(entries, date, &unit, action)
            }
        };
        vec![Reply::edit_markup(page.into_markup())]
    }

    /// A concrete date was resolved (today/yesterday shortcut or the
    /// date-picker); remember it and ask for the quantity.
    fn entry_date_chosen(
        &mut self,
        date: NaiveDate,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        session.entry_draft.date = Some(date);
        session.phase = Phase::EntryQuantity;
        self.directory.save(session)?;
        let unit = session.chart_draft.unit.clone().unwrap_or_default();
        Ok(vec![
            Reply::edit_text(format!("You picked {}.", date.format("%d/%m/%Y"))),
            Reply::send(format!("Pick the amount of {unit}:")),
        ])
    }

    async fn on_entry_quantity(
        &mut self,
        text: &str,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        let Some(quantity) = Quantity::parse(text) else {
            return Ok(vec![not_understood()]);
        };
        let kind = require(session.chart_draft.value_kind, "chart value kind")?;
        if quantity.kind() != kind {
            return Ok(vec![Reply::send(format!(
                "Pick a value of the right type: {}.",
                kind.label()
            ))]);
        }
        let (token, username) = creds_of(session)?;
        let chart = require(session.chart_draft.id.clone(), "chart id")?;
        let date = require(session.entry_draft.date, "entry date")?;
        let result = match session.phase {
            Phase::EntryEditQuantity => {
                self.service
                    .update_entry(&token, &username, &chart, date, quantity)
                    .await
            }
            _ => {
                self.service
                    .create_entry(&token, &username, &chart, date, quantity)
                    .await
            }
        };
        let done = match session.phase {
            Phase::EntryEditQuantity => "Entry updated!",
            _ => "Entry added!",
        };
        match result {
            Ok(()) => {
                info!(user = session.id, chart = %chart, %date, "Entry committed");
                session.phase = Phase::Idle;
                session.reset_entry();
                session.reset_chart();
                session.cached_entries.clear();
                self.directory.save(session)?;
                Ok(vec![Reply::send(done), menu()])
            }
            Err(err) => {
                error!(user = session.id, chart = %chart, %err, "Entry commit failed");
                Ok(vec![oops(&err)])
            }
        }
    }

    async fn delete_entry(
        &mut self,
        date: NaiveDate,
        session: &mut UserSession,
    ) -> anyhow::Result<Vec<Reply>> {
        let (token, username) = creds_of(session)?;
        let chart = require(session.chart_draft.id.clone(), "chart id")?;
        match self
            .service
            .delete_entry(&token, &username, &chart, date)
            .await
        {
            Ok(()) => {
                info!(user = session.id, chart = %chart, %date, "Entry deleted");
                session.phase = Phase::Idle;
                session.reset_entry();
                session.reset_chart();
                session.cached_entries.clear();
                self.directory.save(session)?;
                Ok(vec![Reply::send("Entry deleted!"), menu()])
            }
            Err(err) => {
                error!(user = session.id, chart = %chart, %err, "Entry deletion failed");
                Ok(vec![oops(&err)])
            }
        }
    }

    // -- Shared --

    async fn list_charts_replies(&mut self, session: &mut UserSession) -> anyhow::Result<Vec<Reply>> {
        let (token, username) = creds_of(session)?;
        match self.service.list_charts(&token, &username).await {
            Ok(charts) if charts.is_empty() => Ok(vec![Reply::send("No charts found.")]),
            Ok(charts) => Ok(vec![Reply::send_inline(
                "Your charts:",
                keyboards::charts_list(&charts),
            )]),
            Err(err) => {
                error!(user = session.id, %err, "Chart listing failed");
                Ok(vec![oops(&err)])
            }
        }
    }
}

fn creds_of(session: &UserSession) -> anyhow::Result<(String, String)> {
    session
        .creds()
        .map(|(t, u)| (t.to_string(), u.to_string()))
        .ok_or_else(|| anyhow::anyhow!("no remote profile linked for user {}", session.id))
}

/// A step was reached with a required field missing: an internal bug,
/// surfaced as a hard error rather than a conversational one.
fn require<T>(value: Option<T>, what: &str) -> anyhow::Result<T> {
    value.ok_or_else(|| anyhow::anyhow!("missing {what} at this step"))
}
