use serde_json::json;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{get_required_str, require_workspace};
use crate::ipc::types::{AppState, Request};

fn login(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let user = get_required_str(params, "user")?;
    let pass = get_required_str(params, "pass")?;
    let ws = require_workspace(state)?;

    // Plain-text equality against the stored pair.
    if user != ws.auth.user || pass != ws.auth.pass {
        return Err(HandlerErr::new(
            "auth_failed",
            "invalid username or password",
        ));
    }

    state.logged_in = true;
    Ok(json!({ "loggedIn": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.login" => Some(match login(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        "session.logout" => {
            state.logged_in = false;
            Some(ok(&req.id, json!({ "loggedIn": false })))
        }
        "session.status" => Some(ok(&req.id, json!({ "loggedIn": state.logged_in }))),
        _ => None,
    }
}
