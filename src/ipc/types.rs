use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::model::{Credentials, Database};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// An opened workspace: the kv store plus the in-memory copy of both blobs.
/// Mutations edit the in-memory copy and flush the whole blob back.
pub struct Workspace {
    pub path: PathBuf,
    pub conn: Connection,
    pub db: Database,
    pub auth: Credentials,
}

pub struct AppState {
    pub workspace: Option<Workspace>,
    /// Transient session flag; never persisted, so a fresh process always
    /// starts logged out.
    pub logged_in: bool,
}
