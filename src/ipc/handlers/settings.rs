use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;

use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{
    flush_db, get_opt_str, get_required_str, get_trimmed, guarded, require_confirm,
    require_workspace,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Credentials, Database, Program, Schedule, Student, Transaction};
use crate::store;

fn update_auth(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let user = get_trimmed(params, "user")?;
    let pass = get_trimmed(params, "pass")?;
    require_confirm(params, "credentials")?;
    let ws = require_workspace(state)?;

    ws.auth = Credentials { user, pass };
    store::save_auth(&ws.conn, &ws.auth)
        .map_err(|e| HandlerErr::new("store_write_failed", format!("{e:#}")))?;

    // The old session dies with the old credentials.
    state.logged_in = false;
    tracing::info!("credentials updated, session cleared");
    Ok(json!({ "loggedIn": false }))
}

fn backup_export(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let out_path = get_opt_str(params, "outPath").map(PathBuf::from);
    let ws = require_workspace(state)?;

    let file_name = format!(
        "backup_sim_agama_{}.json",
        chrono::Local::now().format("%Y-%m-%d")
    );
    let path = out_path.unwrap_or_else(|| ws.path.join(&file_name));

    let payload = json!({
        "students": ws.db.students,
        "programs": ws.db.programs,
        "transactions": ws.db.transactions,
        "schedules": ws.db.schedules,
        "auth": ws.auth,
    });
    let text = serde_json::to_string_pretty(&payload)
        .map_err(|e| HandlerErr::new("backup_failed", e.to_string()))?;
    std::fs::write(&path, text)
        .map_err(|e| HandlerErr::new("backup_failed", e.to_string()))?;

    tracing::info!(path = %path.to_string_lossy(), "backup written");
    Ok(json!({ "path": path.to_string_lossy(), "fileName": file_name }))
}

/// Uploaded backup shape. `students` and `transactions` are the acceptance
/// gate; the rest keep their prior values when absent.
#[derive(Debug, Deserialize)]
struct BackupFile {
    students: Vec<Student>,
    transactions: Vec<Transaction>,
    #[serde(default)]
    programs: Option<Vec<Program>>,
    #[serde(default)]
    schedules: Option<Vec<Schedule>>,
    #[serde(default)]
    auth: Option<Credentials>,
}

fn backup_restore(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let path = PathBuf::from(get_required_str(params, "path")?);
    let ws = require_workspace(state)?;

    let text = std::fs::read_to_string(&path)
        .map_err(|e| HandlerErr::new("file_read_failed", e.to_string()))?;
    // Schema-validated parse: anything missing the required collections (or
    // carrying wrongly-typed records) is rejected before any state changes.
    let file: BackupFile = serde_json::from_str(&text)
        .map_err(|e| HandlerErr::new("invalid_backup", e.to_string()))?;

    ws.db.students = file.students;
    ws.db.transactions = file.transactions;
    if let Some(programs) = file.programs {
        ws.db.programs = programs;
    }
    if let Some(mut schedules) = file.schedules {
        // Backup files are unversioned; restored schedules get the same
        // month/year defaulting as a v1 load.
        store::apply_schedule_defaults(&mut schedules);
        ws.db.schedules = schedules;
    }
    flush_db(ws)?;

    if let Some(auth) = file.auth {
        ws.auth = auth;
        store::save_auth(&ws.conn, &ws.auth)
            .map_err(|e| HandlerErr::new("store_write_failed", format!("{e:#}")))?;
    }

    tracing::info!(path = %path.to_string_lossy(), "backup restored");
    Ok(json!({
        "students": ws.db.students.len(),
        "transactions": ws.db.transactions.len(),
        "schedules": ws.db.schedules.len(),
        "programs": ws.db.programs.len()
    }))
}

fn clear_all(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_confirm(params, "all data")?;
    let ws = require_workspace(state)?;

    store::clear_all(&ws.conn)
        .map_err(|e| HandlerErr::new("store_write_failed", format!("{e:#}")))?;
    ws.db = Database::default();
    ws.auth = Credentials::default();
    state.logged_in = false;

    tracing::warn!("store wiped, defaults restored");
    Ok(json!({ "loggedIn": false }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.update" => Some(guarded(state, req, update_auth)),
        "backup.export" => Some(guarded(state, req, backup_export)),
        "backup.restore" => Some(guarded(state, req, backup_restore)),
        "data.clearAll" => Some(guarded(state, req, clear_all)),
        _ => None,
    }
}
