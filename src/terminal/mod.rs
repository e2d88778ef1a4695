pub mod events;
pub mod ui;

use std::time::Duration;

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyEventKind};

use crate::api::ApiClient;
use crate::app::state::{AppState, Screen};
use crate::config::Config;
use crate::notify::MeetingWatcher;
use crate::session::Session;

/// Everything the event handlers need besides the view state: the config,
/// the live API client and the reminder watcher. Kept out of `AppState` so
/// the state stays a plain foldable value.
pub struct TuiCtx<'a> {
    pub cfg: &'a Config,
    pub client: Option<ApiClient>,
    pub watcher: Option<MeetingWatcher>,
}

impl<'a> TuiCtx<'a> {
    fn new(cfg: &'a Config) -> Self {
        Self {
            cfg,
            client: None,
            watcher: None,
        }
    }

    /// Fold a freshly validated session in: dashboard state, initial
    /// email/meeting fetch, and the reminder watcher (idle → running).
    pub fn attach_session(&mut self, state: &mut AppState, session: Session) -> Result<()> {
        let client = session.client(self.cfg)?;
        let email = session.user.email.clone();

        *state = AppState::signed_in(session.user);
        state.refresh_emails(&client);
        state.refresh_meetings(&client);
        state.set_status(format!("Signed in as {email}."));

        self.watcher = Some(MeetingWatcher::start(
            client.clone(),
            Duration::from_secs(self.cfg.poll_interval_secs()),
        ));
        self.client = Some(client);
        Ok(())
    }

    /// Browser login from the landing screen. Blocks this action only;
    /// failures surface on the status line and leave the screen as-is.
    pub fn login(&mut self, state: &mut AppState) {
        state.set_status("Waiting for the browser login to complete...");
        match Session::login(self.cfg) {
            Ok(session) => {
                if let Err(e) = self.attach_session(state, session) {
                    state.set_error(format!("Login failed: {e}"));
                }
            }
            Err(e) => state.set_error(format!("Login failed: {e}")),
        }
    }

    /// Tear the session down (running → idle for the watcher).
    pub fn drop_session(&mut self, state: &mut AppState, expired: bool) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
        self.client = None;
        if expired {
            state.force_logout();
        } else {
            state.logout();
        }
    }
}

pub fn run_tui(cfg: &Config) -> Result<()> {
    color_eyre::install().map_err(|e| anyhow!("{e}"))?;

    let mut ctx = TuiCtx::new(cfg);
    let mut state = AppState::unauthenticated();

    if let Some(session) = Session::restore(cfg)? {
        ctx.attach_session(&mut state, session)?;
    }

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut state, &mut ctx);
    ratatui::restore();

    if let Some(mut watcher) = ctx.watcher.take() {
        watcher.stop();
    }
    result
}

fn run(
    terminal: &mut ratatui::DefaultTerminal,
    state: &mut AppState,
    ctx: &mut TuiCtx,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, state))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let quit = events::handle_key(key, state, ctx)?;
            reconcile(state, ctx);
            if quit {
                return Ok(());
            }
        }
    }
}

/// A 401 fold may drop the session deep inside a state method; mirror that
/// here so the client is released and the watcher stops ticking.
fn reconcile(state: &mut AppState, ctx: &mut TuiCtx) {
    if state.screen == Screen::Landing && (ctx.client.is_some() || ctx.watcher.is_some()) {
        if let Some(mut watcher) = ctx.watcher.take() {
            watcher.stop();
        }
        ctx.client = None;
    }
}
