use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::UserId;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct Note {
    pub id: Uuid,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateNote {
    #[serde(default)]
    pub title: String,
    /// May be empty
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FindNotesResponse {
    pub results: Vec<Note>,
}
