//! Assistant chat transcript.
//!
//! Append-only within a session: the user message is added optimistically
//! before the request goes out and is never rolled back. A failed turn
//! appends a synthetic system message after it instead of marking the
//! original as failed.

use crate::api::{ApiClient, ApiError};
use crate::domain::chat::ChatMessage;

#[derive(Debug, Default)]
pub struct ChatPanel {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    /// History fetched once, when the assistant tab is first entered.
    pub loaded: bool,
}

impl ChatPanel {
    /// Replace the transcript wholesale with the server's history,
    /// verbatim in arrival order. A load failure keeps the (empty)
    /// transcript; the next tab entry retries.
    pub fn load_history(&mut self, client: &ApiClient) {
        match client.chat_history() {
            Ok(history) => {
                self.messages = history;
                self.loaded = true;
            }
            Err(e) => log::warn!("failed to load chat history: {e}"),
        }
    }

    /// Send the pending input. Returns the error only for 401 so the
    /// caller can force logout; every other failure is folded into the
    /// transcript as a system line.
    pub fn send_message(&mut self, client: &ApiClient) -> Result<(), ApiError> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return Ok(());
        }
        self.input.clear();

        let prior = self.messages.clone();
        self.messages.push(ChatMessage::user(&text));

        match client.chat_turn(&text, &prior) {
            Ok(reply) => {
                self.messages.push(ChatMessage::agent(reply.response));
                Ok(())
            }
            Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
            Err(e) => {
                log::warn!("chat turn failed: {e}");
                self.messages
                    .push(ChatMessage::system("Error connecting to agent."));
                Ok(())
            }
        }
    }

    /// Clear server-side history and the local transcript. The local
    /// clear is not gated on the delete succeeding. Callers must have
    /// confirmed with the user first.
    pub fn clear_history(&mut self, client: &ApiClient) {
        if let Err(e) = client.clear_chat_history() {
            log::warn!("failed to clear chat history: {e}");
        }
        self.messages.clear();
    }
}
