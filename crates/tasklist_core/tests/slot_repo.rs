use rusqlite::Connection;
use tasklist_core::db::migrations::latest_version;
use tasklist_core::db::open_db;
use tasklist_core::{RepoError, SlotStore, SqliteSlotStore};

#[test]
fn slot_survives_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasklist.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteSlotStore::try_new(&conn).unwrap();
        store.write_slot("todos", "[\"persisted\"]").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteSlotStore::try_new(&conn).unwrap();
    assert_eq!(
        store.read_slot("todos").unwrap().as_deref(),
        Some("[\"persisted\"]")
    );
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteSlotStore::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_slots_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteSlotStore::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("kv_slots"))
    ));
}

#[test]
fn repository_rejects_slots_table_missing_a_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE kv_slots (
            slot_key TEXT PRIMARY KEY NOT NULL,
            slot_value TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteSlotStore::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "kv_slots",
            column: "updated_at"
        })
    ));
}
