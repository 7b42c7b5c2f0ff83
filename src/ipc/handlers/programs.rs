use serde_json::json;

use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{
    flush_db, get_required_str, get_trimmed, guarded, require_confirm, require_workspace,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{mint_id, Program};

fn list(state: &mut AppState, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ws = require_workspace(state)?;
    Ok(json!({ "programs": ws.db.programs }))
}

fn create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let name = get_trimmed(params, "name")?;
    let time = get_trimmed(params, "time")?;
    let ws = require_workspace(state)?;

    let program = Program {
        id: mint_id(),
        name,
        time,
    };
    ws.db.programs.push(program.clone());
    flush_db(ws)?;

    Ok(json!({ "program": program }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let program_id = get_required_str(params, "programId")?;
    let ws = require_workspace(state)?;

    let Some(program) = ws.db.programs.iter().find(|p| p.id == program_id) else {
        return Err(HandlerErr::new("not_found", "program not found"));
    };
    require_confirm(params, &program.name)?;

    ws.db.programs.retain(|p| p.id != program_id);
    flush_db(ws)?;

    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "programs.list" => Some(guarded(state, req, list)),
        "programs.create" => Some(guarded(state, req, create)),
        "programs.delete" => Some(guarded(state, req, delete)),
        _ => None,
    }
}
