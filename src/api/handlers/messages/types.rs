use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// Recipient username, as it appears in the public link.
    pub username: String,
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageOut {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GetMessagesResponse {
    pub success: bool,
    /// Newest first. Empty when the inbox has no messages.
    pub messages: Vec<MessageOut>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptStatusResponse {
    pub success: bool,
    pub message: String,
    pub is_accepting_messages: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptUpdateRequest {
    pub accept_message: bool,
}
