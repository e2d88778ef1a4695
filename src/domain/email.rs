use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type EmailId = i64;

/// Urgency tier assigned by the backend classifier, P1 most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
    P4,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::P1, Priority::P2, Priority::P3, Priority::P4];

    pub fn label(self) -> &'static str {
        match self {
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
            Priority::P4 => "P4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

/// One classified email as served by `/api/emails`.
///
/// Immutable on the client side: the list is only ever replaced wholesale
/// by a re-fetch, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub sender: String,
    pub subject: String,
    pub snippet: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(with = "crate::domain::timefmt")]
    pub received_time: DateTime<Utc>,
    pub priority: Priority,
    pub intent: String,
    pub requires_action: bool,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub suggested_reply: Option<String>,
}

impl Email {
    /// One-line AI insight for the list view: summary if the classifier
    /// produced one, snippet otherwise.
    pub fn insight(&self) -> &str {
        self.summary.as_deref().unwrap_or(&self.snippet)
    }

    /// Full body for the reading pane, flattened to plain text when the
    /// backend stored HTML.
    pub fn display_body(&self) -> String {
        let raw = self.body.as_deref().unwrap_or(&self.snippet);
        if looks_like_html(raw) {
            if let Ok(text) = html2text::from_read(raw.as_bytes(), 80) {
                return text;
            }
        }
        raw.to_string()
    }
}

fn looks_like_html(s: &str) -> bool {
    s.contains('<') && (s.contains("</") || s.contains("/>") || s.contains("<br"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": 7,
            "gmail_id": "18f0abc",
            "sender": "Alice Smith",
            "subject": "Invoice overdue",
            "snippet": "Your invoice #42 is overdue...",
            "received_time": "2026-08-05T14:00:00",
            "priority": "P1",
            "intent": "Finance",
            "requires_action": true,
            "sentiment": "Negative",
            "urgency_score": 9,
            "suggested_reply": "Hi Alice, payment is on its way."
        }"#
    }

    #[test]
    fn deserializes_backend_row_ignoring_unknown_fields() {
        let email: Email = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(email.priority, Priority::P1);
        assert_eq!(email.sentiment, Some(Sentiment::Negative));
        assert!(email.requires_action);
        assert_eq!(
            email.suggested_reply.as_deref(),
            Some("Hi Alice, payment is on its way.")
        );
        assert!(email.body.is_none());
        assert!(email.summary.is_none());
    }

    #[test]
    fn insight_prefers_summary() {
        let mut email: Email = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(email.insight(), "Your invoice #42 is overdue...");
        email.summary = Some("Pay invoice #42.".to_string());
        assert_eq!(email.insight(), "Pay invoice #42.");
    }

    #[test]
    fn display_body_flattens_html() {
        let mut email: Email = serde_json::from_str(sample_json()).unwrap();
        email.body = Some("<p>Hello <b>world</b></p>".to_string());
        let text = email.display_body();
        assert!(text.contains("Hello"));
        assert!(!text.contains("<p>"));
    }
}
