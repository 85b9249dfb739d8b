// tests/store_test.rs — Durable session storage and the user directory

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rusqlite::Connection;

use habitgram::bot::{Phase, UserSession};
use habitgram::pixela::{Color, PixelEntry, Quantity, ValueKind};
use habitgram::store::{schema, Store, UserDirectory};

fn open_store(path: &std::path::Path) -> Store {
    let conn = Connection::open(path).expect("open db");
    schema::run_migrations(&conn).expect("migrations");
    Store::new(conn)
}

fn sample_session() -> UserSession {
    let mut session = UserSession::new(7, "Max");
    session.remote_token = Some("token-1".into());
    session.remote_username = Some("hg-max".into());
    session.phase = Phase::EntryQuantity;
    session.chart_draft.id = Some("run".into());
    session.chart_draft.name = Some("Run".into());
    session.chart_draft.unit = Some("km".into());
    session.chart_draft.value_kind = Some(ValueKind::Int);
    session.chart_draft.color = Some(Color::Sora);
    session.entry_draft.date = NaiveDate::from_ymd_opt(2026, 8, 14);
    session.entry_draft.quantity = Some(Quantity::Int(5));
    session.cached_entries = vec![PixelEntry {
        date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        quantity: Quantity::Float(2.5),
    }];
    session.editing_existing = true;
    session
}

#[test]
fn test_session_round_trip() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let session = sample_session();

    open_store(file.path()).insert_user(&session).unwrap();

    let loaded = open_store(file.path()).fetch_all_users().unwrap();
    assert_eq!(loaded, vec![session]);
}

#[test]
fn test_update_overwrites_mutable_columns() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut session = sample_session();

    let store = open_store(file.path());
    store.insert_user(&session).unwrap();

    session.phase = Phase::Idle;
    session.reset_chart();
    session.reset_entry();
    session.cached_entries.clear();
    store.update_user(&session).unwrap();

    let loaded = open_store(file.path()).fetch_all_users().unwrap();
    assert_eq!(loaded, vec![session]);
}

#[test]
fn test_unknown_phase_falls_back_to_default() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let store = open_store(file.path());
    store.insert_user(&UserSession::new(7, "Max")).unwrap();
    store
        .conn()
        .execute(
            "UPDATE users SET phase = 'dancing', chart_draft = 'not-json' WHERE id = 7",
            [],
        )
        .unwrap();

    let loaded = store.fetch_all_users().unwrap();
    assert_eq!(loaded[0].phase, Phase::Idle);
    assert_eq!(loaded[0].chart_draft, Default::default());
}

#[test]
fn test_directory_save_is_idempotent() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut directory = UserDirectory::new(open_store(file.path()));

    let session = sample_session();
    directory.create(session.clone()).unwrap();
    directory.save(&session).unwrap();
    directory.save(&session).unwrap();

    // one row, identical to the session, after repeated saves
    let rows = open_store(file.path()).fetch_all_users().unwrap();
    assert_eq!(rows, vec![session.clone()]);
    assert_eq!(directory.get(7).unwrap(), Some(session));
}

#[test]
fn test_directory_bulk_loads_existing_rows() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let session = sample_session();
    open_store(file.path()).insert_user(&session).unwrap();

    // a fresh directory sees rows written before it existed
    let mut directory = UserDirectory::new(open_store(file.path()));
    assert_eq!(directory.get(7).unwrap(), Some(session));
    assert_eq!(directory.get(8).unwrap(), None);
}

#[test]
fn test_migrations_are_reentrant() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let conn = Connection::open(file.path()).unwrap();
    schema::run_migrations(&conn).unwrap();
    schema::run_migrations(&conn).unwrap();
    assert_eq!(schema::pending_migrations(&conn).unwrap(), 0);
}
