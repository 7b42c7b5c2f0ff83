use anyhow::Context;
use chrono::Datelike;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::model::{Credentials, Database, EVERY_MONTH};

/// Current layout of the `sim_db` blob. v1 predates schedule month/year.
pub const SCHEMA_VERSION: u32 = 2;

const DB_KEY: &str = "sim_db";
const AUTH_KEY: &str = "sim_auth";

/// Open (or create) the workspace store. The SQLite file is used purely as a
/// two-entry key-value store; each entry holds one JSON blob that is
/// rewritten wholesale on every mutation.
pub fn open_store(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("simagama.sqlite3");
    let conn = Connection::open(db_path)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(conn)
}

fn kv_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    conn.query_row("SELECT value FROM kv WHERE key = ?", [key], |r| r.get(0))
        .optional()
        .with_context(|| format!("failed to read kv entry {}", key))
}

fn kv_put(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO kv(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )
    .with_context(|| format!("failed to write kv entry {}", key))?;
    Ok(())
}

/// Load the domain blob, running the schema migration if the stored version
/// is behind. A migrated blob is written back immediately so the migration
/// runs once per workspace, not once per start.
pub fn load_database(conn: &Connection) -> anyhow::Result<Database> {
    let mut db = match kv_get(conn, DB_KEY)? {
        Some(text) => {
            serde_json::from_str(&text).context("stored domain blob is not valid JSON")?
        }
        None => Database::default(),
    };
    if migrate_database(&mut db) {
        tracing::info!(version = SCHEMA_VERSION, "migrated domain blob");
        save_database(conn, &db)?;
    }
    Ok(db)
}

pub fn save_database(conn: &Connection, db: &Database) -> anyhow::Result<()> {
    let text = serde_json::to_string(db).context("failed to serialize domain blob")?;
    kv_put(conn, DB_KEY, &text)
}

pub fn load_auth(conn: &Connection) -> anyhow::Result<Credentials> {
    match kv_get(conn, AUTH_KEY)? {
        Some(text) => {
            serde_json::from_str(&text).context("stored credential blob is not valid JSON")
        }
        None => Ok(Credentials::default()),
    }
}

pub fn save_auth(conn: &Connection, auth: &Credentials) -> anyhow::Result<()> {
    let text = serde_json::to_string(auth).context("failed to serialize credential blob")?;
    kv_put(conn, AUTH_KEY, &text)
}

/// Wipe both entries. The next load starts from documented defaults.
pub fn clear_all(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("DELETE FROM kv", [])
        .context("failed to clear store")?;
    Ok(())
}

/// Bring a loaded blob up to `SCHEMA_VERSION`. Returns true when anything
/// changed. v1 -> v2 fills schedule `month`/`year` that the old layout did
/// not carry; present values are never overwritten.
pub fn migrate_database(db: &mut Database) -> bool {
    if db.version >= SCHEMA_VERSION {
        return false;
    }
    apply_schedule_defaults(&mut db.schedules);
    db.version = SCHEMA_VERSION;
    true
}

/// Fill blank schedule `month`/`year` fields. Shared between the versioned
/// load migration and backup restore, where uploaded files are unversioned.
pub fn apply_schedule_defaults(schedules: &mut [crate::model::Schedule]) -> usize {
    let year = current_year();
    let mut patched = 0;
    for s in schedules.iter_mut() {
        let mut touched = false;
        if s.month.trim().is_empty() {
            s.month = EVERY_MONTH.to_string();
            touched = true;
        }
        if s.year.trim().is_empty() {
            s.year = year.clone();
            touched = true;
        }
        if touched {
            patched += 1;
        }
    }
    patched
}

pub fn current_year() -> String {
    chrono::Local::now().year().to_string()
}
