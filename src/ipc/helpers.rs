use serde_json::json;

use super::error::{ok, HandlerErr};
use super::types::{AppState, Request, Workspace};

/// Dispatch wrapper for domain methods: every one of them requires a live
/// session, takes params, and answers with the ok/error envelope.
pub fn guarded(
    state: &mut AppState,
    req: &Request,
    f: impl FnOnce(&mut AppState, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
) -> serde_json::Value {
    if let Err(e) = require_session(state) {
        return e.response(&req.id);
    }
    match f(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn require_session(state: &AppState) -> Result<(), HandlerErr> {
    if state.logged_in {
        Ok(())
    } else {
        Err(HandlerErr::new("not_authenticated", "login required"))
    }
}

pub fn require_workspace(state: &mut AppState) -> Result<&mut Workspace, HandlerErr> {
    state
        .workspace
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

/// Rewrite the whole domain blob after a mutation.
pub fn flush_db(ws: &Workspace) -> Result<(), HandlerErr> {
    crate::store::save_database(&ws.conn, &ws.db)
        .map_err(|e| HandlerErr::new("store_write_failed", format!("{e:#}")))
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

/// Required form field: present and non-empty after trimming.
pub fn get_trimmed(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let value = get_required_str(params, key)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HandlerErr::new(
            "bad_params",
            format!("{} must not be empty", key),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn get_opt_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Destructive-action guard: the caller must send `confirm: true`, otherwise
/// the handler answers with the target it would affect and changes nothing.
pub fn require_confirm(params: &serde_json::Value, target: &str) -> Result<(), HandlerErr> {
    if params.get("confirm").and_then(|v| v.as_bool()) == Some(true) {
        Ok(())
    } else {
        Err(HandlerErr::with_details(
            "confirm_required",
            "destructive action needs confirm:true",
            json!({ "target": target }),
        ))
    }
}
