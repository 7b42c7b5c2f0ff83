use serde_json::json;
use std::path::PathBuf;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::get_required_str;
use crate::ipc::types::{AppState, Request, Workspace};
use crate::store;

fn workspace_select(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let path = PathBuf::from(get_required_str(params, "path")?);

    let conn = store::open_store(&path)
        .map_err(|e| HandlerErr::new("store_open_failed", format!("{e:#}")))?;
    // A corrupt blob is surfaced here rather than silently reset.
    let db = store::load_database(&conn)
        .map_err(|e| HandlerErr::new("store_corrupt", format!("{e:#}")))?;
    let auth = store::load_auth(&conn)
        .map_err(|e| HandlerErr::new("store_corrupt", format!("{e:#}")))?;

    tracing::info!(path = %path.to_string_lossy(), "workspace selected");
    state.workspace = Some(Workspace {
        path: path.clone(),
        conn,
        db,
        auth,
    });
    // Switching workspaces drops any session on the old one.
    state.logged_in = false;

    Ok(json!({ "workspacePath": path.to_string_lossy() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => {
            let result = json!({
                "version": env!("CARGO_PKG_VERSION"),
                "workspacePath": state
                    .workspace
                    .as_ref()
                    .map(|w| w.path.to_string_lossy().to_string())
            });
            Some(ok(&req.id, result))
        }
        "workspace.select" => Some(match workspace_select(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        _ => None,
    }
}
