use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::UserId;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct Task {
    pub id: Uuid,
    pub user_id: UserId,
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// New tasks always start with `done = false`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTask {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub done: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FindTasksResponse {
    pub results: Vec<Task>,
}
