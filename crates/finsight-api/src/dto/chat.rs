//! Chat DTOs

use finsight_types::{ChatContext, ChatReply};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 128, message = "user_id must be 1-128 characters"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 4000, message = "message must be 1-4000 characters"))]
    pub message: String,
    /// Free-form context, e.g. `transactions`, `current_balance`, `goals`
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub context: Option<Map<String, Value>>,
}

impl ChatRequest {
    pub fn chat_context(&self) -> ChatContext {
        self.context.clone().map(ChatContext::from).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    /// Labels of the context sections the answer drew on
    pub sources: Vec<String>,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            response: reply.response,
            sources: reply.sources,
        }
    }
}
