use serde_json::json;

use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{
    flush_db, get_opt_str, get_required_str, get_trimmed, guarded, require_confirm,
    require_workspace,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{is_valid_reason, mint_id, Transaction, REASONS};

fn create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date = get_trimmed(params, "date")?;
    let time = get_trimmed(params, "time")?;
    let student_id = get_required_str(params, "studentId")?;
    let program = get_trimmed(params, "program")?;
    let reason = get_required_str(params, "reason")?;
    if !is_valid_reason(&reason) {
        return Err(HandlerErr::with_details(
            "bad_params",
            "reason is not one of the accepted values",
            json!({ "accepted": REASONS }),
        ));
    }
    let ws = require_workspace(state)?;

    let Some(student) = ws.db.students.iter().find(|s| s.id == student_id) else {
        return Err(HandlerErr::new("not_found", "student not found"));
    };

    let trx = Transaction {
        id: mint_id(),
        date,
        time,
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        class: student.class.clone(),
        program,
        reason,
    };
    // Most recent first.
    ws.db.transactions.insert(0, trx.clone());
    flush_db(ws)?;

    Ok(json!({ "transaction": trx }))
}

/// The data behind the dependent class/student dropdown: distinct class
/// labels, and the students of one class sorted by name.
fn class_options(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class = get_opt_str(params, "class");
    let ws = require_workspace(state)?;

    let mut classes: Vec<&str> = ws.db.students.iter().map(|s| s.class.as_str()).collect();
    classes.sort_unstable();
    classes.dedup();

    let students: Vec<serde_json::Value> = match class {
        Some(ref c) => {
            let mut in_class: Vec<_> =
                ws.db.students.iter().filter(|s| &s.class == c).collect();
            in_class.sort_by(|a, b| a.name.cmp(&b.name));
            in_class
                .into_iter()
                .map(|s| json!({ "id": s.id, "name": s.name }))
                .collect()
        }
        None => Vec::new(),
    };

    Ok(json!({ "classes": classes, "students": students }))
}

fn update(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let transaction_id = get_required_str(params, "transactionId")?;
    let date = get_opt_str(params, "date");
    let time = get_opt_str(params, "time");
    let reason = get_opt_str(params, "reason");
    if let Some(ref r) = reason {
        if !is_valid_reason(r) {
            return Err(HandlerErr::with_details(
                "bad_params",
                "reason is not one of the accepted values",
                json!({ "accepted": REASONS }),
            ));
        }
    }
    let ws = require_workspace(state)?;

    let Some(trx) = ws
        .db
        .transactions
        .iter_mut()
        .find(|t| t.id == transaction_id)
    else {
        return Err(HandlerErr::new("not_found", "transaction not found"));
    };

    // Student identity and program are frozen after creation; only the
    // date/time/reason fields are editable from the report view.
    if let Some(v) = date {
        trx.date = v;
    }
    if let Some(v) = time {
        trx.time = v;
    }
    if let Some(v) = reason {
        trx.reason = v;
    }
    let updated = trx.clone();
    flush_db(ws)?;

    Ok(json!({ "transaction": updated }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let transaction_id = get_required_str(params, "transactionId")?;
    let ws = require_workspace(state)?;

    let Some(trx) = ws.db.transactions.iter().find(|t| t.id == transaction_id) else {
        return Err(HandlerErr::new("not_found", "transaction not found"));
    };
    require_confirm(params, &format!("{} {}", trx.date, trx.student_name))?;

    ws.db.transactions.retain(|t| t.id != transaction_id);
    flush_db(ws)?;

    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "transactions.create" => Some(guarded(state, req, create)),
        "transactions.classOptions" => Some(guarded(state, req, class_options)),
        "transactions.update" => Some(guarded(state, req, update)),
        "transactions.delete" => Some(guarded(state, req, delete)),
        _ => None,
    }
}
