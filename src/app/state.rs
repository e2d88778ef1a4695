//! View-state controller.
//!
//! One state container for the whole TUI: active screen and tab, the email
//! and meeting lists, filter chip, compose form, chat panel, and the
//! transient status line. Every user action or fetch completion folds into
//! this state through a method here; nothing mutates it behind the
//! renderer's back. Failures never destroy prior state: the previous list
//! stays as-is and the status line carries the message.

use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use crate::api::client::SyncOutcome;
use crate::api::{ApiClient, ApiError, RewriteStyle};
use crate::app::chat::ChatPanel;
use crate::app::compose::{ComposeForm, ComposeSeed};
use crate::app::filter;
use crate::domain::email::{Email, EmailId};
use crate::domain::meeting::{Meeting, MeetingId, split_upcoming_past};
use crate::domain::user::UserProfile;
use crate::session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Help,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Inbox,
    Assistant,
    Calendar,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Inbox, Tab::Assistant, Tab::Calendar];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Inbox => "Inbox",
            Tab::Assistant => "Assistant",
            Tab::Calendar => "Calendar",
        }
    }
}

/// Destructive actions armed by one keypress and executed by the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    ClearChat,
    DeleteMeeting(MeetingId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

pub struct AppState {
    pub screen: Screen,
    pub tab: Tab,
    pub user: Option<UserProfile>,

    pub emails: Vec<Email>,
    pub inbox_list: ListState,
    pub filter_idx: usize,
    pub expanded_email_id: Option<EmailId>,

    pub meetings: Vec<Meeting>,
    pub calendar_list: ListState,

    pub chat: ChatPanel,
    pub compose: Option<ComposeForm>,

    pub syncing: bool,
    pub pending: Option<PendingAction>,
    pub status: Option<StatusLine>,
}

impl AppState {
    pub fn unauthenticated() -> Self {
        Self {
            screen: Screen::Landing,
            tab: Tab::Overview,
            user: None,
            emails: Vec::new(),
            inbox_list: ListState::default(),
            filter_idx: 0,
            expanded_email_id: None,
            meetings: Vec::new(),
            calendar_list: ListState::default(),
            chat: ChatPanel::default(),
            compose: None,
            syncing: false,
            pending: None,
            status: None,
        }
    }

    pub fn signed_in(user: UserProfile) -> Self {
        let mut state = Self::unauthenticated();
        state.screen = Screen::Dashboard;
        state.user = Some(user);
        state
    }

    // ----- status -----

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: true,
        });
    }

    // ----- session folds -----

    /// 401 anywhere lands here: clear the stored credential like logout
    /// and drop back to the landing screen with a visible message.
    pub fn force_logout(&mut self) {
        self.reset_to_landing("Session expired. Please log in again.");
    }

    pub fn logout(&mut self) {
        self.reset_to_landing("Logged out.");
    }

    fn reset_to_landing(&mut self, message: &str) {
        session::clear_stored_token_quietly();
        let mut fresh = Self::unauthenticated();
        fresh.set_status(message);
        *self = fresh;
    }

    // ----- inbox -----

    pub fn filter_name(&self) -> &'static str {
        filter::CATEGORIES[self.filter_idx]
    }

    pub fn cycle_filter(&mut self) {
        self.filter_idx = (self.filter_idx + 1) % filter::CATEGORIES.len();
        self.expanded_email_id = None;
        self.clamp_inbox_selection();
    }

    pub fn visible_emails(&self) -> Vec<&Email> {
        filter::filter_emails(self.filter_name(), &self.emails)
    }

    pub fn selected_email(&self) -> Option<&Email> {
        let idx = self.inbox_list.selected()?;
        self.visible_emails().get(idx).copied()
    }

    pub fn move_inbox_selection(&mut self, delta: i32) {
        let len = self.visible_emails().len();
        move_selection(&mut self.inbox_list, len, delta);
    }

    /// Enter toggles the reading pane for the selected email.
    pub fn toggle_expand(&mut self) {
        let selected = self.selected_email().map(|e| e.id);
        self.expanded_email_id = match (self.expanded_email_id, selected) {
            (Some(open), Some(sel)) if open == sel => None,
            (_, sel) => sel,
        };
    }

    fn clamp_inbox_selection(&mut self) {
        let len = self.visible_emails().len();
        clamp_selection(&mut self.inbox_list, len);
    }

    /// Replace the email list wholesale; never patches one email in place.
    pub fn refresh_emails(&mut self, client: &ApiClient) {
        match client.list_emails() {
            Ok(list) => {
                self.emails = list;
                self.clamp_inbox_selection();
            }
            Err(ApiError::Unauthorized) => self.force_logout(),
            Err(e) => self.set_error(format!("Could not load emails: {e}")),
        }
    }

    /// `POST /api/sync`, disabled while one is already in flight. Only a
    /// positive count replaces the list; every failure leaves `emails`
    /// exactly as it was.
    pub fn run_sync(&mut self, client: &ApiClient) {
        if self.syncing {
            return;
        }
        self.syncing = true;
        let outcome = client.sync_mailbox();
        self.fold_sync_outcome(outcome, client);
        self.syncing = false;
    }

    fn fold_sync_outcome(&mut self, outcome: Result<SyncOutcome, ApiError>, client: &ApiClient) {
        match outcome {
            Ok(o) if o.count > 0 => match client.list_emails() {
                Ok(list) => {
                    self.emails = list;
                    self.clamp_inbox_selection();
                    self.set_status(format!("{} new emails analyzed.", o.count));
                }
                Err(ApiError::Unauthorized) => self.force_logout(),
                Err(e) => self.set_error(format!("Synced, but reloading failed: {e}")),
            },
            Ok(_) => self.set_status("No new emails found."),
            Err(ApiError::Unauthorized) => self.force_logout(),
            Err(e) => self.set_error(format!("Sync failed: {e}")),
        }
    }

    // ----- compose -----

    pub fn open_compose(&mut self, seed: ComposeSeed) {
        self.compose = Some(ComposeForm::open(seed));
    }

    /// Reply to the selected email; `suggested` pulls in the classifier's
    /// drafted reply when there is one.
    pub fn open_reply(&mut self, suggested: bool) {
        let Some(email) = self.selected_email() else {
            return;
        };
        let body = if suggested {
            email.suggested_reply.clone()
        } else {
            None
        };
        let seed = ComposeSeed {
            to: Some(email.sender.clone()),
            subject: Some(format!("Re: {}", email.subject)),
            body,
        };
        self.open_compose(seed);
    }

    /// On success the form closes and the draft is gone; on failure the
    /// form stays open with the user's input intact so nothing is lost.
    pub fn send_compose(&mut self, client: &ApiClient) {
        let Some(form) = self.compose.as_ref() else {
            return;
        };
        match client.send_email(&form.to, &form.subject, &form.body) {
            Ok(()) => {
                self.compose = None;
                self.set_status("Email sent.");
            }
            Err(ApiError::Unauthorized) => self.force_logout(),
            Err(e) => self.set_error(format!("Failed to send: {e}")),
        }
    }

    /// A successful rewrite replaces the body; a failure leaves it alone.
    pub fn rewrite_compose(&mut self, client: &ApiClient, style: RewriteStyle) {
        let Some(form) = self.compose.as_ref() else {
            return;
        };
        if form.body.trim().is_empty() {
            return;
        }
        match client.rewrite(&form.body, style) {
            Ok(result) => {
                if let Some(form) = self.compose.as_mut() {
                    form.body = result;
                }
                self.set_status(format!("Draft rewritten ({}).", style.label()));
            }
            Err(ApiError::Unauthorized) => self.force_logout(),
            Err(e) => self.set_error(format!("Rewrite failed: {e}")),
        }
    }

    // ----- calendar -----

    /// Meetings in display order: upcoming first, then past.
    pub fn ordered_meetings(&self, now: DateTime<Utc>) -> Vec<&Meeting> {
        let (mut upcoming, past) = split_upcoming_past(&self.meetings, now);
        upcoming.extend(past);
        upcoming
    }

    pub fn selected_meeting(&self, now: DateTime<Utc>) -> Option<&Meeting> {
        let idx = self.calendar_list.selected()?;
        self.ordered_meetings(now).get(idx).copied()
    }

    pub fn move_calendar_selection(&mut self, delta: i32) {
        let len = self.meetings.len();
        move_selection(&mut self.calendar_list, len, delta);
    }

    pub fn refresh_meetings(&mut self, client: &ApiClient) {
        match client.list_meetings() {
            Ok(list) => {
                self.meetings = list;
                clamp_selection(&mut self.calendar_list, self.meetings.len());
            }
            Err(ApiError::Unauthorized) => self.force_logout(),
            Err(e) => self.set_error(format!("Could not load meetings: {e}")),
        }
    }

    // ----- destructive confirmations -----

    pub fn arm(&mut self, action: PendingAction, prompt: &str) {
        self.pending = Some(action);
        self.set_status(format!("{prompt} Press y to confirm."));
    }

    pub fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            self.set_status("Cancelled.");
        }
    }

    pub fn confirm_pending(&mut self, client: &ApiClient) {
        let Some(action) = self.pending.take() else {
            return;
        };
        match action {
            PendingAction::ClearChat => {
                self.chat.clear_history(client);
                self.set_status("Chat history cleared.");
            }
            PendingAction::DeleteMeeting(id) => match client.delete_meeting(id) {
                Ok(()) => {
                    self.refresh_meetings(client);
                    if self.screen == Screen::Dashboard {
                        self.set_status("Meeting cancelled.");
                    }
                }
                Err(ApiError::Unauthorized) => self.force_logout(),
                Err(e) => self.set_error(format!("Failed to delete meeting: {e}")),
            },
        }
    }

    // ----- tabs -----

    /// Switching tabs also performs the tab's mount-time load: chat
    /// history on first Assistant entry, meetings when the calendar is
    /// still empty.
    pub fn enter_tab(&mut self, tab: Tab, client: &ApiClient) {
        self.tab = tab;
        self.pending = None;
        match tab {
            Tab::Assistant if !self.chat.loaded => self.chat.load_history(client),
            Tab::Calendar if self.meetings.is_empty() => self.refresh_meetings(client),
            _ => {}
        }
    }
}

fn move_selection(list: &mut ListState, len: usize, delta: i32) {
    if len == 0 {
        list.select(None);
        return;
    }
    let cur = list.selected().unwrap_or(0) as i32;
    let next = (cur + delta).clamp(0, len as i32 - 1) as usize;
    list.select(Some(next));
}

fn clamp_selection(list: &mut ListState, len: usize) {
    match list.selected() {
        _ if len == 0 => list.select(None),
        None => list.select(Some(0)),
        Some(idx) if idx >= len => list.select(Some(len - 1)),
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::domain::email::Priority;

    fn client(server: &mockito::Server) -> ApiClient {
        ApiClient::new(&server.url(), "tok").unwrap()
    }

    fn email(id: EmailId, priority: Priority, requires_action: bool, intent: &str) -> Email {
        Email {
            id,
            sender: "alice@example.com".to_string(),
            subject: format!("subject {id}"),
            snippet: "snippet".to_string(),
            body: None,
            received_time: Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap(),
            priority,
            intent: intent.to_string(),
            requires_action,
            sentiment: None,
            summary: None,
            suggested_reply: Some("Sounds good.".to_string()),
        }
    }

    fn dashboard_with_emails() -> AppState {
        let mut state = AppState::signed_in(UserProfile {
            id: 1,
            email: "me@example.com".to_string(),
            name: "Me".to_string(),
            picture: None,
        });
        state.emails = vec![
            email(1, Priority::P1, false, "Urgent"),
            email(2, Priority::P3, true, "Work"),
        ];
        state.inbox_list.select(Some(0));
        state
    }

    #[test]
    fn failed_sync_leaves_emails_untouched() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/sync")
            .with_status(500)
            .with_body(r#"{"detail":"gmail unreachable"}"#)
            .create();

        let mut state = dashboard_with_emails();
        let before = state.emails.clone();
        state.run_sync(&client(&server));

        assert_eq!(state.emails, before);
        let status = state.status.unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("gmail unreachable"));
    }

    #[test]
    fn sync_with_zero_count_leaves_list_untouched() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/sync")
            .with_body(r#"{"message":"ok","count":0}"#)
            .create();
        let emails_mock = server.mock("GET", "/api/emails").expect(0).create();

        let mut state = dashboard_with_emails();
        let before = state.emails.clone();
        state.run_sync(&client(&server));

        emails_mock.assert();
        assert_eq!(state.emails, before);
        assert_eq!(state.status.unwrap().text, "No new emails found.");
    }

    #[test]
    fn sync_with_new_emails_replaces_list() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/sync")
            .with_body(r#"{"message":"ok","count":1}"#)
            .create();
        server
            .mock("GET", "/api/emails")
            .with_body(
                r#"[{"id":9,"sender":"bob","subject":"s","snippet":"x",
                     "received_time":"2026-08-05T10:00:00","priority":"P2",
                     "intent":"Work","requires_action":false}]"#,
            )
            .create();

        let mut state = dashboard_with_emails();
        state.run_sync(&client(&server));

        assert_eq!(state.emails.len(), 1);
        assert_eq!(state.emails[0].id, 9);
        assert_eq!(state.status.unwrap().text, "1 new emails analyzed.");
    }

    #[test]
    fn sync_401_forces_logout_to_landing() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/api/sync").with_status(401).create();

        let mut state = dashboard_with_emails();
        state.run_sync(&client(&server));

        assert_eq!(state.screen, Screen::Landing);
        assert!(state.user.is_none());
        assert!(state.emails.is_empty());
        assert!(state.status.unwrap().text.contains("Session expired"));
    }

    #[test]
    fn sync_is_noop_while_in_flight() {
        let mut server = mockito::Server::new();
        let m = server.mock("POST", "/api/sync").expect(0).create();

        let mut state = dashboard_with_emails();
        state.syncing = true;
        state.run_sync(&client(&server));
        m.assert();
    }

    #[test]
    fn failed_send_keeps_draft_intact() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/send-email")
            .with_status(500)
            .with_body(r#"{"detail":"smtp down"}"#)
            .create();

        let mut state = dashboard_with_emails();
        state.open_compose(ComposeSeed {
            to: Some("bob@example.com".to_string()),
            subject: Some("hello".to_string()),
            body: Some("typed with care".to_string()),
        });
        state.send_compose(&client(&server));

        let form = state.compose.expect("form must stay open");
        assert_eq!(form.body, "typed with care");
        assert!(state.status.unwrap().text.contains("smtp down"));
    }

    #[test]
    fn successful_send_discards_draft() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/send-email")
            .with_body(r#"{"message":"Email sent successfully"}"#)
            .create();

        let mut state = dashboard_with_emails();
        state.open_compose(ComposeSeed::default());
        state.send_compose(&client(&server));
        assert!(state.compose.is_none());
    }

    #[test]
    fn failed_rewrite_leaves_body_untouched() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/agent/rewrite")
            .with_status(500)
            .with_body(r#"{"detail":"model overloaded"}"#)
            .create();

        let mut state = dashboard_with_emails();
        state.open_compose(ComposeSeed {
            body: Some("orig".to_string()),
            ..ComposeSeed::default()
        });
        state.rewrite_compose(&client(&server), RewriteStyle::Formal);
        assert_eq!(state.compose.unwrap().body, "orig");
    }

    #[test]
    fn successful_rewrite_replaces_body() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/agent/rewrite")
            .with_body(r#"{"result":"Dear Sir or Madam,"}"#)
            .create();

        let mut state = dashboard_with_emails();
        state.open_compose(ComposeSeed {
            body: Some("hey".to_string()),
            ..ComposeSeed::default()
        });
        state.rewrite_compose(&client(&server), RewriteStyle::Formal);
        assert_eq!(state.compose.unwrap().body, "Dear Sir or Madam,");
    }

    #[test]
    fn open_reply_prefills_from_selected_email() {
        let mut state = dashboard_with_emails();
        state.open_reply(true);
        let form = state.compose.unwrap();
        assert_eq!(form.to, "alice@example.com");
        assert_eq!(form.subject, "Re: subject 1");
        assert_eq!(form.body, "Sounds good.");
    }

    #[test]
    fn selection_follows_active_filter() {
        let mut state = dashboard_with_emails();
        // "Urgent" leaves only email 1 visible
        state.filter_idx = filter::CATEGORIES
            .iter()
            .position(|c| *c == "Urgent")
            .unwrap();
        state.clamp_inbox_selection();
        assert_eq!(state.selected_email().unwrap().id, 1);
        state.move_inbox_selection(5);
        assert_eq!(state.selected_email().unwrap().id, 1);
    }

    #[test]
    fn delete_meeting_needs_confirmation() {
        let mut server = mockito::Server::new();
        let delete = server
            .mock("DELETE", "/api/meetings/4")
            .with_body(r#"{"message":"Meeting deleted"}"#)
            .create();
        server.mock("GET", "/api/meetings").with_body("[]").create();

        let mut state = dashboard_with_emails();
        state.arm(PendingAction::DeleteMeeting(4), "Cancel this meeting?");

        // any non-confirming path drops the pending action
        let mut cancelled = dashboard_with_emails();
        cancelled.arm(PendingAction::DeleteMeeting(4), "Cancel this meeting?");
        cancelled.cancel_pending();
        assert!(cancelled.pending.is_none());

        state.confirm_pending(&client(&server));
        delete.assert();
        assert!(state.pending.is_none());
    }
}
