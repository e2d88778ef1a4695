use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Agent,
    /// Synthesized locally, e.g. "Error connecting to agent." Never comes
    /// back from the server history.
    System,
}

/// One transcript line. Server history rows carry extra fields
/// (timestamp, user_email); only sender and text matter to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: ChatSender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: ChatSender::User,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            sender: ChatSender::Agent,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            sender: ChatSender::System,
            text: text.into(),
        }
    }
}
