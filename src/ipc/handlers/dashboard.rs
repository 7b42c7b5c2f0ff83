use serde_json::json;
use std::collections::HashMap;

use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{get_opt_str, guarded, require_workspace};
use crate::ipc::types::{AppState, Request};
use crate::model::{Student, Transaction, EARLY_DEPARTURE_REASON, PARENT_CALL_THRESHOLD};

pub struct ParentCallEntry<'a> {
    pub student: &'a Student,
    pub count: usize,
}

/// Students whose all-time transaction count exceeds the call threshold, in
/// student-collection order. Counts are tallied per student id, so deleted
/// students still accumulate but drop off the list.
pub fn parent_call_list<'a>(
    students: &'a [Student],
    transactions: &[Transaction],
) -> Vec<ParentCallEntry<'a>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for t in transactions {
        *counts.entry(t.student_id.as_str()).or_insert(0) += 1;
    }
    students
        .iter()
        .filter_map(|s| {
            let count = counts.get(s.id.as_str()).copied().unwrap_or(0);
            (count > PARENT_CALL_THRESHOLD).then_some(ParentCallEntry { student: s, count })
        })
        .collect()
}

fn summary(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date = get_opt_str(params, "date")
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
    let ws = require_workspace(state)?;

    let total_students = ws.db.students.len();
    // Exact string match on the stored date field, not a calendar check.
    let absences_today = ws.db.transactions.iter().filter(|t| t.date == date).count();
    let early_departures = ws
        .db
        .transactions
        .iter()
        .filter(|t| t.reason == EARLY_DEPARTURE_REASON)
        .count();

    let call_list: Vec<serde_json::Value> = parent_call_list(&ws.db.students, &ws.db.transactions)
        .into_iter()
        .map(|e| {
            json!({
                "id": e.student.id,
                "name": e.student.name,
                "class": e.student.class,
                "count": e.count
            })
        })
        .collect();

    Ok(json!({
        "date": date,
        "totalStudents": total_students,
        "absencesToday": absences_today,
        "earlyDepartures": early_departures,
        "parentCallList": call_list
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(guarded(state, req, summary)),
        _ => None,
    }
}
