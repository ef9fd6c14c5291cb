use lapse_core::{Message, Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// `"user"` or `"assistant"`.
    pub role: String,
    pub content: String,
    pub timestamp: u64,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        let role = match m.role {
            Role::User => "user",
            Role::Partner => "assistant",
        };
        Self {
            role: role.to_owned(),
            content: m.content,
            timestamp: m.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteSessionResponse {
    pub deleted: bool,
}
