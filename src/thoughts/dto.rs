use serde::{Deserialize, Serialize};

/// Request body for posting a thought. `hearts` and `createdAt` are accepted for
/// compatibility with older clients but ignored; the store sets both.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThoughtRequest {
    #[serde(default)]
    pub message: String,
    pub hearts: Option<serde_json::Value>,
    pub created_at: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateThoughtRequest {
    #[serde(default, rename = "newMessage", alias = "editThought")]
    pub new_message: String,
}

/// Standard envelope for thought responses.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub response: T,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, response: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            response,
        }
    }
}
