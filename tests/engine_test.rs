// tests/engine_test.rs — Conversation flows against a mock chart service

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use rusqlite::Connection;

use habitgram::bot::callback::{Callback, ChartAction};
use habitgram::bot::{BotCmd, DialogEngine, EventKind, InboundEvent, Reply};
use habitgram::infra::errors::Result;
use habitgram::pixela::{ChartService, Color, GraphDef, PixelEntry, Quantity, ValueKind};
use habitgram::store::schema;
use habitgram::store::{Store, UserDirectory};
use habitgram::util::date_to_token;

// ---------- Mock chart service ----------

#[derive(Clone)]
struct MockService {
    calls: Arc<Mutex<Vec<String>>>,
    entries: Arc<Mutex<Vec<PixelEntry>>>,
}

impl MockService {
    fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn set_entries(&self, entries: Vec<PixelEntry>) {
        *self.entries.lock().unwrap() = entries;
    }
}

#[async_trait]
impl ChartService for MockService {
    async fn create_user(&self, name: &str) -> Result<(String, String)> {
        self.record(format!("create_user:{name}"));
        Ok(("token-1".into(), format!("hg-{name}")))
    }

    async fn delete_user(&self, _token: &str, username: &str) -> Result<()> {
        self.record(format!("delete_user:{username}"));
        Ok(())
    }

    async fn create_chart(
        &self,
        _token: &str,
        _username: &str,
        name: &str,
        unit: &str,
        kind: ValueKind,
        color: Color,
    ) -> Result<String> {
        self.record(format!(
            "create_chart:{name}:{unit}:{}:{}",
            kind.as_wire(),
            color.as_wire()
        ));
        Ok("new-chart".into())
    }

    async fn get_chart(&self, _token: &str, _username: &str, chart: &str) -> Result<GraphDef> {
        self.record(format!("get_chart:{chart}"));
        Ok(GraphDef {
            id: chart.to_string(),
            name: "Run".into(),
            unit: "km".into(),
            value_kind: ValueKind::Int,
            color: Color::Sora,
        })
    }

    async fn list_charts(&self, _token: &str, username: &str) -> Result<Vec<GraphDef>> {
        self.record(format!("list_charts:{username}"));
        Ok(Vec::new())
    }

    async fn update_chart(&self, _token: &str, _username: &str, def: &GraphDef) -> Result<()> {
        self.record(format!("update_chart:{}:{}:{}", def.id, def.name, def.unit));
        Ok(())
    }

    async fn delete_chart(&self, _token: &str, _username: &str, chart: &str) -> Result<()> {
        self.record(format!("delete_chart:{chart}"));
        Ok(())
    }

    async fn chart_url(&self, username: &str, chart: &str) -> Result<String> {
        self.record(format!("chart_url:{chart}"));
        Ok(format!("https://charts.test/{username}/{chart}"))
    }

    async fn list_entries(
        &self,
        _token: &str,
        _username: &str,
        chart: &str,
    ) -> Result<Vec<PixelEntry>> {
        self.record(format!("list_entries:{chart}"));
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn create_entry(
        &self,
        _token: &str,
        _username: &str,
        chart: &str,
        date: NaiveDate,
        quantity: Quantity,
    ) -> Result<()> {
        self.record(format!(
            "create_entry:{chart}:{}:{quantity}",
            date_to_token(date)
        ));
        Ok(())
    }

    async fn update_entry(
        &self,
        _token: &str,
        _username: &str,
        chart: &str,
        date: NaiveDate,
        quantity: Quantity,
    ) -> Result<()> {
        self.record(format!(
            "update_entry:{chart}:{}:{quantity}",
            date_to_token(date)
        ));
        Ok(())
    }

    async fn delete_entry(
        &self,
        _token: &str,
        _username: &str,
        chart: &str,
        date: NaiveDate,
    ) -> Result<()> {
        self.record(format!("delete_entry:{chart}:{}", date_to_token(date)));
        Ok(())
    }
}

// ---------- Helpers ----------

fn directory() -> UserDirectory {
    let conn = Connection::open_in_memory().expect("in-memory db");
    schema::run_migrations(&conn).expect("migrations");
    UserDirectory::new(Store::new(conn))
}

fn engine(service: &MockService) -> DialogEngine<MockService> {
    DialogEngine::new(service.clone(), directory())
}

const USER: i64 = 7;

fn cmd(cmd: BotCmd) -> InboundEvent {
    InboundEvent {
        chat_id: USER,
        user_id: USER,
        display_name: "Max".into(),
        message_id: None,
        kind: EventKind::Command(cmd),
    }
}

fn text(text: &str) -> InboundEvent {
    InboundEvent {
        chat_id: USER,
        user_id: USER,
        display_name: "Max".into(),
        message_id: None,
        kind: EventKind::Text(text.into()),
    }
}

fn press(callback: Callback) -> InboundEvent {
    InboundEvent {
        chat_id: USER,
        user_id: USER,
        display_name: "Max".into(),
        message_id: Some(1),
        kind: EventKind::Callback(callback),
    }
}

fn texts(replies: &[Reply]) -> String {
    replies.iter().map(Reply::text).collect::<Vec<_>>().join("\n")
}

/// Walk a fresh identity through /start → "yes" → profile name.
async fn onboard(engine: &mut DialogEngine<MockService>) {
    engine.handle(cmd(BotCmd::Start)).await.unwrap();
    engine.handle(text("yes")).await.unwrap();
    engine.handle(text("max")).await.unwrap();
}

/// Select an existing chart so its definition seeds the draft.
async fn select_chart(engine: &mut DialogEngine<MockService>, id: &str) {
    engine
        .handle(press(Callback::chart(id, ChartAction::List)))
        .await
        .unwrap();
}

// ---------- Onboarding ----------

#[tokio::test]
async fn test_onboarding_flow() {
    let service = MockService::new();
    let mut engine = engine(&service);

    let replies = engine.handle(cmd(BotCmd::Start)).await.unwrap();
    assert!(replies[0].text().contains("Hello, Max"));
    assert!(matches!(replies[0], Reply::Send { pin: true, .. }));
    assert!(texts(&replies).contains("Create one?"));

    let replies = engine.handle(text("yes")).await.unwrap();
    assert!(texts(&replies).contains("name for your profile"));

    let replies = engine.handle(text("Max")).await.unwrap();
    assert!(texts(&replies).contains("Profile created"));
    // normalized to lowercase before the remote call
    assert!(service.calls().contains(&"create_user:max".to_string()));

    // profile is linked now: /select reaches the service
    engine.handle(cmd(BotCmd::Select)).await.unwrap();
    assert!(service.calls().contains(&"list_charts:hg-max".to_string()));
}

#[tokio::test]
async fn test_onboarding_declined() {
    let service = MockService::new();
    let mut engine = engine(&service);

    engine.handle(cmd(BotCmd::Start)).await.unwrap();
    let replies = engine.handle(text("no")).await.unwrap();
    assert!(texts(&replies).contains("As you wish"));
    assert!(service.calls().is_empty());

    // still not onboarded
    let replies = engine.handle(cmd(BotCmd::Select)).await.unwrap();
    assert!(texts(&replies).contains("Create a profile first"));
}

#[tokio::test]
async fn test_bad_profile_name_rejected_locally() {
    let service = MockService::new();
    let mut engine = engine(&service);

    engine.handle(cmd(BotCmd::Start)).await.unwrap();
    engine.handle(text("yes")).await.unwrap();
    let replies = engine.handle(text("9lives")).await.unwrap();
    assert!(texts(&replies).contains("valid name"));
    assert!(service.calls().is_empty());

    // the step can be retried
    engine.handle(text("max")).await.unwrap();
    assert!(service.calls().contains(&"create_user:max".to_string()));
}

#[tokio::test]
async fn test_consent_gibberish_holds_phase() {
    let service = MockService::new();
    let mut engine = engine(&service);

    engine.handle(cmd(BotCmd::Start)).await.unwrap();
    let replies = engine.handle(text("maybe")).await.unwrap();
    assert!(texts(&replies).contains("understand"));

    // "yes" still works afterwards
    let replies = engine.handle(text("YES")).await.unwrap();
    assert!(texts(&replies).contains("name for your profile"));
}

#[tokio::test]
async fn test_unknown_command_gets_a_reply() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;

    // "/help" is not a known command; it classifies as plain text and
    // the idle phase answers instead of staying silent
    let event = InboundEvent {
        chat_id: USER,
        user_id: USER,
        display_name: "Max".into(),
        message_id: None,
        kind: EventKind::of_text("/help"),
    };
    let replies = engine.handle(event).await.unwrap();
    assert!(texts(&replies).contains("understand"));
}

// ---------- Chart wizard ----------

#[tokio::test]
async fn test_chart_creation_wizard() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;

    engine.handle(cmd(BotCmd::Create)).await.unwrap();
    engine.handle(text("Morning run")).await.unwrap();
    engine.handle(text("km")).await.unwrap();
    engine.handle(text("integer")).await.unwrap();
    let replies = engine.handle(text("blue")).await.unwrap();
    assert!(texts(&replies).contains("Correct?"));

    let replies = engine.handle(text("yes")).await.unwrap();
    assert!(texts(&replies).contains("Created chart with id new-chart"));
    assert!(service
        .calls()
        .contains(&"create_chart:Morning run:km:int:sora".to_string()));
}

#[tokio::test]
async fn test_color_outside_palette_holds_phase() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;

    engine.handle(cmd(BotCmd::Create)).await.unwrap();
    engine.handle(text("Morning run")).await.unwrap();
    engine.handle(text("km")).await.unwrap();
    engine.handle(text("integer")).await.unwrap();

    let replies = engine.handle(text("magenta")).await.unwrap();
    assert!(texts(&replies).contains("understand"));

    // the color step is still active
    let replies = engine.handle(text("blue")).await.unwrap();
    assert!(texts(&replies).contains("Correct?"));
}

#[tokio::test]
async fn test_single_field_edit_is_one_step() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;
    select_chart(&mut engine, "run").await;

    // only the unit is cleared, so the wizard has exactly one step left
    engine
        .handle(press(Callback::chart("run", ChartAction::EditUnit)))
        .await
        .unwrap();
    let replies = engine.handle(text("miles")).await.unwrap();
    assert!(texts(&replies).contains("Chart updated"));
    assert!(service
        .calls()
        .contains(&"update_chart:run:Run:miles".to_string()));
}

#[tokio::test]
async fn test_type_edit_blocked_when_entries_exist() {
    let service = MockService::new();
    service.set_entries(vec![PixelEntry {
        date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        quantity: Quantity::Int(5),
    }]);
    let mut engine = engine(&service);
    onboard(&mut engine).await;
    select_chart(&mut engine, "run").await;

    let replies = engine
        .handle(press(Callback::chart("run", ChartAction::EditType)))
        .await
        .unwrap();
    assert!(texts(&replies).contains("can't change the value type"));
    assert!(!service
        .calls()
        .iter()
        .any(|c| c.starts_with("update_chart")));
}

#[tokio::test]
async fn test_type_edit_allowed_when_no_entries() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;
    select_chart(&mut engine, "run").await;

    let replies = engine
        .handle(press(Callback::chart("run", ChartAction::EditType)))
        .await
        .unwrap();
    assert!(texts(&replies).contains("value type"));

    let replies = engine.handle(text("fractional")).await.unwrap();
    assert!(texts(&replies).contains("Chart updated"));
}

// ---------- Entries ----------

#[tokio::test]
async fn test_add_entry_today() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;
    select_chart(&mut engine, "run").await;

    let replies = engine
        .handle(press(Callback::chart("run", ChartAction::AddToday)))
        .await
        .unwrap();
    assert!(texts(&replies).contains("amount of km"));

    let replies = engine.handle(text("10")).await.unwrap();
    assert!(texts(&replies).contains("Entry added"));
    let token = date_to_token(Local::now().date_naive());
    assert!(service
        .calls()
        .contains(&format!("create_entry:run:{token}:10")));
}

#[tokio::test]
async fn test_stale_add_button_reloads_chart() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;
    select_chart(&mut engine, "run").await;

    // first entry commit resets the draft
    engine
        .handle(press(Callback::chart("run", ChartAction::AddToday)))
        .await
        .unwrap();
    engine.handle(text("10")).await.unwrap();

    // the old keyboard is still on screen; a second press must reload
    // the chart definition instead of dying on the empty draft
    let replies = engine
        .handle(press(Callback::chart("run", ChartAction::AddToday)))
        .await
        .unwrap();
    assert!(texts(&replies).contains("amount of km"));
    let replies = engine.handle(text("4")).await.unwrap();
    assert!(texts(&replies).contains("Entry added"));

    let token = date_to_token(Local::now().date_naive());
    assert!(service
        .calls()
        .contains(&format!("create_entry:run:{token}:4")));
    let lookups = service
        .calls()
        .iter()
        .filter(|c| c.as_str() == "get_chart:run")
        .count();
    assert_eq!(lookups, 2);
}

#[tokio::test]
async fn test_garbage_quantity_holds_phase() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;
    select_chart(&mut engine, "run").await;
    engine
        .handle(press(Callback::chart("run", ChartAction::AddToday)))
        .await
        .unwrap();

    let replies = engine.handle(text("abc")).await.unwrap();
    assert!(texts(&replies).contains("understand"));
    assert!(!service.calls().iter().any(|c| c.starts_with("create_entry")));

    // still in the quantity step
    let replies = engine.handle(text("10")).await.unwrap();
    assert!(texts(&replies).contains("Entry added"));
}

#[tokio::test]
async fn test_quantity_kind_mismatch_rejected() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;
    select_chart(&mut engine, "run").await; // integer chart
    engine
        .handle(press(Callback::chart("run", ChartAction::AddToday)))
        .await
        .unwrap();

    let replies = engine.handle(text("2.5")).await.unwrap();
    assert!(texts(&replies).contains("right type"));
    assert!(!service.calls().iter().any(|c| c.starts_with("create_entry")));

    engine.handle(text("3")).await.unwrap();
    let token = date_to_token(Local::now().date_naive());
    assert!(service
        .calls()
        .contains(&format!("create_entry:run:{token}:3")));
}

#[tokio::test]
async fn test_edit_entry_quantity() {
    let service = MockService::new();
    let date = NaiveDate::from_ymd_opt(2026, 8, 14).unwrap();
    service.set_entries(vec![PixelEntry {
        date,
        quantity: Quantity::Int(5),
    }]);
    let mut engine = engine(&service);
    onboard(&mut engine).await;
    select_chart(&mut engine, "run").await;

    let replies = engine
        .handle(press(Callback::chart("run", ChartAction::EditEntries)))
        .await
        .unwrap();
    assert!(texts(&replies).contains("Pick an entry to edit"));

    engine
        .handle(press(Callback::Entry {
            date,
            action: habitgram::bot::callback::EntryAction::Edit,
        }))
        .await
        .unwrap();
    let replies = engine.handle(text("8")).await.unwrap();
    assert!(texts(&replies).contains("Entry updated"));
    assert!(service
        .calls()
        .contains(&"update_entry:run:20260814:8".to_string()));
}

#[tokio::test]
async fn test_empty_picker_says_so() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;
    select_chart(&mut engine, "run").await;

    let replies = engine
        .handle(press(Callback::chart("run", ChartAction::DeleteEntries)))
        .await
        .unwrap();
    assert!(texts(&replies).contains("No entries to show"));
}

// ---------- Profile deletion ----------

#[tokio::test]
async fn test_profile_deletion_resets_session() {
    let service = MockService::new();
    let mut engine = engine(&service);
    onboard(&mut engine).await;

    engine.handle(cmd(BotCmd::Delete)).await.unwrap();
    let replies = engine.handle(text("yes")).await.unwrap();
    assert!(texts(&replies).contains("Profile deleted"));
    assert!(service.calls().contains(&"delete_user:hg-max".to_string()));

    // back to the not-onboarded state
    let replies = engine.handle(cmd(BotCmd::Select)).await.unwrap();
    assert!(texts(&replies).contains("Create a profile first"));
}
