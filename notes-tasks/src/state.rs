use axum::extract::FromRef;

use crate::{auth::SessionKeys, db::DB, summarize::SharedSummarizer};

#[derive(FromRef, Clone)]
pub struct AppState {
    pub conn: DB,
    pub summarizer: SharedSummarizer,
    pub session_keys: SessionKeys,
}
