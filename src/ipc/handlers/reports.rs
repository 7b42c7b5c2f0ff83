use serde_json::json;
use std::path::PathBuf;

use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{get_opt_str, guarded, require_workspace};
use crate::ipc::types::{AppState, Request};
use crate::model::Transaction;
use crate::sheet;

/// Class filter is an exact match ("all" or absent disables it); month filter
/// is a prefix match against the `YYYY-MM-DD` date field.
fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    class: Option<&str>,
    month: Option<&str>,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| match class {
            None | Some("all") => true,
            Some(c) => t.class == c,
        })
        .filter(|t| match month {
            None | Some("") => true,
            Some(m) => t.date.starts_with(m),
        })
        .collect()
}

fn query(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class = get_opt_str(params, "class");
    let month = get_opt_str(params, "month");
    let ws = require_workspace(state)?;

    let rows = filter_transactions(&ws.db.transactions, class.as_deref(), month.as_deref());
    Ok(json!({ "transactions": rows }))
}

fn export_sheet(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class = get_opt_str(params, "class");
    let month = get_opt_str(params, "month");
    let out_path = get_opt_str(params, "outPath").map(PathBuf::from);
    let ws = require_workspace(state)?;

    let rows = filter_transactions(&ws.db.transactions, class.as_deref(), month.as_deref());
    let file_name = format!(
        "Laporan_Absensi_{}.xlsx",
        month.as_deref().filter(|m| !m.is_empty()).unwrap_or("Total")
    );
    let path = out_path.unwrap_or_else(|| ws.path.join(&file_name));

    sheet::write_report_sheet(&path, &rows)
        .map_err(|e| HandlerErr::new("sheet_write_failed", format!("{e:#}")))?;

    tracing::info!(rows = rows.len(), path = %path.to_string_lossy(), "exported report");
    Ok(json!({
        "path": path.to_string_lossy(),
        "fileName": file_name,
        "rows": rows.len()
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.query" => Some(guarded(state, req, query)),
        "reports.exportSheet" => Some(guarded(state, req, export_sheet)),
        _ => None,
    }
}
