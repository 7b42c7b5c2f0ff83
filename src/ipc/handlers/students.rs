use serde_json::json;
use std::path::PathBuf;

use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{
    flush_db, get_required_str, get_trimmed, guarded, require_confirm, require_workspace,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{mint_id, Student};
use crate::sheet;

fn list(state: &mut AppState, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ws = require_workspace(state)?;
    Ok(json!({ "students": ws.db.students }))
}

fn create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let name = get_trimmed(params, "name")?;
    let class = get_trimmed(params, "class")?;
    let ws = require_workspace(state)?;

    let student = Student {
        id: mint_id(),
        name,
        class,
    };
    ws.db.students.push(student.clone());
    flush_db(ws)?;

    Ok(json!({ "student": student }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let ws = require_workspace(state)?;

    let Some(student) = ws.db.students.iter().find(|s| s.id == student_id) else {
        return Err(HandlerErr::new("not_found", "student not found"));
    };
    require_confirm(params, &student.name)?;

    // Historical transactions keep their denormalized name/class.
    ws.db.students.retain(|s| s.id != student_id);
    flush_db(ws)?;

    Ok(json!({ "ok": true }))
}

fn import_sheet(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let path = PathBuf::from(get_required_str(params, "path")?);
    let ws = require_workspace(state)?;

    let rows = sheet::read_student_rows(&path)
        .map_err(|e| HandlerErr::new("sheet_read_failed", format!("{e:#}")))?;
    if rows.is_empty() {
        return Err(HandlerErr::new(
            "no_valid_rows",
            "no valid student rows found in the workbook",
        ));
    }

    let imported = rows.len();
    for row in rows {
        ws.db.students.push(Student {
            id: mint_id(),
            name: row.name,
            class: row.class,
        });
    }
    flush_db(ws)?;

    tracing::info!(imported, "imported students from sheet");
    Ok(json!({ "imported": imported }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(guarded(state, req, list)),
        "students.create" => Some(guarded(state, req, create)),
        "students.delete" => Some(guarded(state, req, delete)),
        "students.importSheet" => Some(guarded(state, req, import_sheet)),
        _ => None,
    }
}
