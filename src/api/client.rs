//! Typed fetchers for the triage backend.
//!
//! The client carries the base URL and bearer token explicitly; there is
//! no ambient credential lookup. Calls are blocking and issue exactly one
//! request each; retry is always a user action, never automatic.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::domain::chat::ChatMessage;
use crate::domain::email::Email;
use crate::domain::meeting::{Meeting, MeetingId};
use crate::domain::user::UserProfile;

const REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteStyle {
    Formal,
    Casual,
    Shorten,
    FixGrammar,
}

impl RewriteStyle {
    pub fn label(self) -> &'static str {
        match self {
            RewriteStyle::Formal => "Formal",
            RewriteStyle::Casual => "Casual",
            RewriteStyle::Shorten => "Shorten",
            RewriteStyle::FixGrammar => "Fix Grammar",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SyncOutcome {
    #[serde(default)]
    pub message: Option<String>,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RewriteReply {
    result: String,
}

#[derive(Debug, Serialize)]
struct ChatTurnBody<'a> {
    message: &'a str,
    conversation_history: &'a [ChatMessage],
}

#[derive(Debug, Serialize)]
struct RewriteBody<'a> {
    text: &'a str,
    style: RewriteStyle,
}

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 401 ⇒ Unauthorized; other non-success ⇒ Api with the backend's
    /// `detail` message when it sent one.
    fn check(
        resp: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let detail = resp
                .json::<serde_json::Value>()
                .ok()
                .and_then(|v| v.get("detail")?.as_str().map(str::to_string))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(ApiError::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(resp)
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response, ApiError> {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()?;
        Self::check(resp)
    }

    fn post_empty(&self, path: &str) -> Result<reqwest::blocking::Response, ApiError> {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .send()?;
        Self::check(resp)
    }

    fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()?;
        Self::check(resp)
    }

    fn delete(&self, path: &str) -> Result<reqwest::blocking::Response, ApiError> {
        let resp = self
            .http
            .delete(self.url(path))
            .bearer_auth(&self.token)
            .send()?;
        Self::check(resp)
    }

    // ----- auth -----

    pub fn me(&self) -> Result<UserProfile, ApiError> {
        Ok(self.get("/auth/me")?.json()?)
    }

    /// Login entry point opened in the browser (no Authorization header;
    /// the identity provider hands the token back via the redirect).
    pub fn login_url(base_url: &str, redirect_uri: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(redirect_uri.as_bytes()).collect();
        format!(
            "{}/auth/login?redirect_uri={}",
            base_url.trim_end_matches('/'),
            encoded
        )
    }

    // ----- emails -----

    pub fn list_emails(&self) -> Result<Vec<Email>, ApiError> {
        Ok(self.get("/api/emails")?.json()?)
    }

    pub fn sync_mailbox(&self) -> Result<SyncOutcome, ApiError> {
        Ok(self.post_empty("/api/sync")?.json()?)
    }

    pub fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), ApiError> {
        self.post_json("/api/send-email", &SendEmailBody { to, subject, body })?;
        Ok(())
    }

    pub fn rewrite(&self, text: &str, style: RewriteStyle) -> Result<String, ApiError> {
        let reply: RewriteReply = self
            .post_json("/api/agent/rewrite", &RewriteBody { text, style })?
            .json()?;
        Ok(reply.result)
    }

    /// Destructive: wipes the backend's email table. Callers must have
    /// confirmed with the user first.
    pub fn reset_emails(&self) -> Result<(), ApiError> {
        self.post_empty("/api/admin/reset-emails")?;
        Ok(())
    }

    // ----- meetings -----

    pub fn list_meetings(&self) -> Result<Vec<Meeting>, ApiError> {
        Ok(self.get("/api/meetings")?.json()?)
    }

    pub fn delete_meeting(&self, id: MeetingId) -> Result<(), ApiError> {
        self.delete(&format!("/api/meetings/{id}"))?;
        Ok(())
    }

    // ----- assistant chat -----

    pub fn chat_history(&self) -> Result<Vec<ChatMessage>, ApiError> {
        Ok(self.get("/api/chat/history")?.json()?)
    }

    pub fn clear_chat_history(&self) -> Result<(), ApiError> {
        self.delete("/api/chat/history")?;
        Ok(())
    }

    pub fn chat_turn(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<ChatReply, ApiError> {
        Ok(self
            .post_json(
                "/api/meeting-agent/chat",
                &ChatTurnBody {
                    message,
                    conversation_history: history,
                },
            )?
            .json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::ChatSender;

    fn client(server: &mockito::Server) -> ApiClient {
        ApiClient::new(&server.url(), "test-token").unwrap()
    }

    #[test]
    fn me_parses_profile_and_sends_bearer() {
        let mut server = mockito::Server::new();
        let m = server
            .mock("GET", "/auth/me")
            .match_header("authorization", "Bearer test-token")
            .with_body(r#"{"id":1,"email":"me@example.com","name":"Me","picture":null}"#)
            .create();

        let user = client(&server).me().unwrap();
        m.assert();
        assert_eq!(user.email, "me@example.com");
    }

    #[test]
    fn unauthorized_is_classified() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/auth/me")
            .with_status(401)
            .with_body(r#"{"detail":"Not authenticated"}"#)
            .create();

        let err = client(&server).me().unwrap_err();
        assert!(err.is_auth());
    }

    #[test]
    fn detail_message_is_surfaced_verbatim() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/send-email")
            .with_status(500)
            .with_body(r#"{"detail":"SMTP quota exceeded"}"#)
            .create();

        let err = client(&server)
            .send_email("a@b.c", "hi", "body")
            .unwrap_err();
        assert_eq!(err.to_string(), "SMTP quota exceeded");
    }

    #[test]
    fn sync_parses_count() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/sync")
            .with_body(r#"{"message":"Synced 4 new emails","count":4}"#)
            .create();

        let outcome = client(&server).sync_mailbox().unwrap();
        assert_eq!(outcome.count, 4);
    }

    #[test]
    fn chat_turn_posts_history_and_parses_response() {
        let mut server = mockito::Server::new();
        let m = server
            .mock("POST", "/api/meeting-agent/chat")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"message":"hi","conversation_history":[{"sender":"user","text":"earlier"}]}"#
                    .to_string(),
            ))
            .with_body(r#"{"response":"hello","action":"NONE"}"#)
            .create();

        let history = vec![ChatMessage::user("earlier")];
        let reply = client(&server).chat_turn("hi", &history).unwrap();
        m.assert();
        assert_eq!(reply.response, "hello");
        assert_eq!(history[0].sender, ChatSender::User);
    }

    #[test]
    fn rewrite_serializes_style_snake_case() {
        let mut server = mockito::Server::new();
        let m = server
            .mock("POST", "/api/agent/rewrite")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"text":"pls fix","style":"fix_grammar"}"#.to_string(),
            ))
            .with_body(r#"{"result":"Please fix."}"#)
            .create();

        let out = client(&server)
            .rewrite("pls fix", RewriteStyle::FixGrammar)
            .unwrap();
        m.assert();
        assert_eq!(out, "Please fix.");
    }

    #[test]
    fn login_url_encodes_redirect() {
        let url = ApiClient::login_url(
            "http://localhost:8000/",
            "http://127.0.0.1:8765/callback",
        );
        assert_eq!(
            url,
            "http://localhost:8000/auth/login?redirect_uri=http%3A%2F%2F127.0.0.1%3A8765%2Fcallback"
        );
    }
}
