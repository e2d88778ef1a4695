use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{ApiClient, RewriteStyle};
use crate::app::compose::ComposeSeed;
use crate::app::state::{AppState, PendingAction, Screen, Tab};
use crate::terminal::TuiCtx;

/// Route one keypress. Returns true when the app should quit.
pub fn handle_key(key: KeyEvent, state: &mut AppState, ctx: &mut TuiCtx) -> Result<bool> {
    match state.screen {
        Screen::Landing => handle_landing_keys(key, state, ctx),
        Screen::Help => {
            // any key leaves the help screen
            state.screen = if state.user.is_some() {
                Screen::Dashboard
            } else {
                Screen::Landing
            };
            Ok(false)
        }
        Screen::Dashboard => handle_dashboard_keys(key, state, ctx),
    }
}

fn handle_landing_keys(key: KeyEvent, state: &mut AppState, ctx: &mut TuiCtx) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
        KeyCode::Char('?') => state.screen = Screen::Help,
        KeyCode::Char('l') => ctx.login(state),
        _ => {}
    }
    Ok(false)
}

fn handle_dashboard_keys(key: KeyEvent, state: &mut AppState, ctx: &mut TuiCtx) -> Result<bool> {
    let Some(client) = ctx.client.clone() else {
        // no client means the session dropped out from under us
        state.force_logout();
        return Ok(false);
    };

    // the compose overlay captures everything while open
    if state.compose.is_some() {
        handle_compose_keys(key, state, &client);
        return Ok(false);
    }

    // an armed destructive action consumes the next key
    if state.pending.is_some() {
        if key.code == KeyCode::Char('y') {
            state.confirm_pending(&client);
        } else {
            state.cancel_pending();
        }
        return Ok(false);
    }

    if state.tab == Tab::Assistant {
        handle_assistant_keys(key, state, &client);
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('?') => state.screen = Screen::Help,
        KeyCode::Char('1') => state.enter_tab(Tab::Overview, &client),
        KeyCode::Char('2') => state.enter_tab(Tab::Inbox, &client),
        KeyCode::Char('3') => state.enter_tab(Tab::Assistant, &client),
        KeyCode::Char('4') => state.enter_tab(Tab::Calendar, &client),
        KeyCode::Char('s') => state.run_sync(&client),
        KeyCode::Char('c') => state.open_compose(ComposeSeed::default()),
        KeyCode::Char('L') => ctx.drop_session(state, false),
        _ => match state.tab {
            Tab::Inbox => handle_inbox_keys(key, state, &client),
            Tab::Calendar => handle_calendar_keys(key, state),
            _ => {}
        },
    }
    Ok(false)
}

fn handle_inbox_keys(key: KeyEvent, state: &mut AppState, client: &ApiClient) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => state.move_inbox_selection(1),
        KeyCode::Up | KeyCode::Char('k') => state.move_inbox_selection(-1),
        KeyCode::Enter => state.toggle_expand(),
        KeyCode::Char('f') => state.cycle_filter(),
        KeyCode::Char('r') => state.open_reply(false),
        KeyCode::Char('a') => state.open_reply(true),
        KeyCode::Char('R') => state.refresh_emails(client),
        _ => {}
    }
}

fn handle_calendar_keys(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => state.move_calendar_selection(1),
        KeyCode::Up | KeyCode::Char('k') => state.move_calendar_selection(-1),
        KeyCode::Char('d') => {
            if let Some(meeting) = state.selected_meeting(chrono::Utc::now()) {
                let id = meeting.id;
                let prompt = format!("Cancel \"{}\"?", meeting.title);
                state.arm(PendingAction::DeleteMeeting(id), &prompt);
            }
        }
        _ => {}
    }
}

fn handle_assistant_keys(key: KeyEvent, state: &mut AppState, client: &ApiClient) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('d') {
            state.arm(PendingAction::ClearChat, "Delete chat history permanently?");
        }
        return;
    }
    match key.code {
        KeyCode::Esc => state.tab = Tab::Overview,
        KeyCode::Enter => {
            if state.chat.send_message(client).is_err() {
                state.force_logout();
            }
        }
        KeyCode::Backspace => {
            state.chat.input.pop();
        }
        KeyCode::Char(c) => state.chat.input.push(c),
        _ => {}
    }
}

fn handle_compose_keys(key: KeyEvent, state: &mut AppState, client: &ApiClient) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => state.send_compose(client),
            KeyCode::Char('f') => state.rewrite_compose(client, RewriteStyle::Formal),
            KeyCode::Char('l') => state.rewrite_compose(client, RewriteStyle::Casual),
            KeyCode::Char('k') => state.rewrite_compose(client, RewriteStyle::Shorten),
            KeyCode::Char('g') => state.rewrite_compose(client, RewriteStyle::FixGrammar),
            _ => {}
        }
        return;
    }
    if key.code == KeyCode::Esc {
        // explicit discard
        state.compose = None;
        state.set_status("Draft discarded.");
        return;
    }
    let Some(form) = state.compose.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Tab => form.next_field(),
        KeyCode::Enter => form.newline_or_advance(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.input(c),
        _ => {}
    }
}
