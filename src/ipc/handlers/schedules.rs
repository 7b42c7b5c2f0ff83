use serde_json::json;
use std::path::PathBuf;

use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{
    flush_db, get_opt_str, get_required_str, get_trimmed, guarded, require_confirm,
    require_workspace,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{
    mint_id, Schedule, SCHEDULE_ACTIVITIES, SCHEDULE_DAYS, SCHEDULE_MONTHS, SCHEDULE_WEEKS,
};
use crate::sheet;

fn list(state: &mut AppState, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ws = require_workspace(state)?;
    Ok(json!({ "schedules": ws.db.schedules }))
}

/// The fixed pick lists the schedule form offers. Free-text activities are
/// allowed; the UI shows them as "Lainnya" plus a text field.
fn options(
    _state: &mut AppState,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({
        "activities": SCHEDULE_ACTIVITIES,
        "days": SCHEDULE_DAYS,
        "weeks": SCHEDULE_WEEKS,
        "months": SCHEDULE_MONTHS
    }))
}

fn schedule_fields(params: &serde_json::Value) -> Result<Schedule, HandlerErr> {
    Ok(Schedule {
        id: String::new(),
        activity: get_trimmed(params, "activity")?,
        day: get_trimmed(params, "day")?,
        week: get_trimmed(params, "week")?,
        month: get_trimmed(params, "month")?,
        year: get_trimmed(params, "year")?,
        class: get_trimmed(params, "class")?,
        notes: get_opt_str(params, "notes").unwrap_or_default(),
    })
}

fn create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let mut schedule = schedule_fields(params)?;
    let ws = require_workspace(state)?;

    schedule.id = mint_id();
    ws.db.schedules.push(schedule.clone());
    flush_db(ws)?;

    Ok(json!({ "schedule": schedule }))
}

fn update(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let schedule_id = get_required_str(params, "scheduleId")?;
    let mut replacement = schedule_fields(params)?;
    let ws = require_workspace(state)?;

    let Some(existing) = ws.db.schedules.iter_mut().find(|s| s.id == schedule_id) else {
        return Err(HandlerErr::new("not_found", "schedule not found"));
    };
    replacement.id = existing.id.clone();
    *existing = replacement.clone();
    flush_db(ws)?;

    Ok(json!({ "schedule": replacement }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let schedule_id = get_required_str(params, "scheduleId")?;
    let ws = require_workspace(state)?;

    let Some(schedule) = ws.db.schedules.iter().find(|s| s.id == schedule_id) else {
        return Err(HandlerErr::new("not_found", "schedule not found"));
    };
    require_confirm(params, &schedule.activity)?;

    ws.db.schedules.retain(|s| s.id != schedule_id);
    flush_db(ws)?;

    Ok(json!({ "ok": true }))
}

fn export_sheet(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let out_path = get_opt_str(params, "outPath").map(PathBuf::from);
    let ws = require_workspace(state)?;

    if ws.db.schedules.is_empty() {
        return Err(HandlerErr::new("no_data", "no schedules to export"));
    }

    let path = out_path.unwrap_or_else(|| ws.path.join("Jadwal_Kegiatan_Mingguan.xlsx"));
    sheet::write_schedule_sheet(&path, &ws.db.schedules)
        .map_err(|e| HandlerErr::new("sheet_write_failed", format!("{e:#}")))?;

    tracing::info!(rows = ws.db.schedules.len(), path = %path.to_string_lossy(), "exported schedules");
    Ok(json!({
        "path": path.to_string_lossy(),
        "rows": ws.db.schedules.len()
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schedules.list" => Some(guarded(state, req, list)),
        "schedules.options" => Some(guarded(state, req, options)),
        "schedules.create" => Some(guarded(state, req, create)),
        "schedules.update" => Some(guarded(state, req, update)),
        "schedules.delete" => Some(guarded(state, req, delete)),
        "schedules.exportSheet" => Some(guarded(state, req, export_sheet)),
        _ => None,
    }
}
