use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use inbox_triage::config::load_config;
use inbox_triage::notify::MeetingWatcher;
use inbox_triage::session::{Session, token_store};
use inbox_triage::terminal::run_tui;

#[derive(Parser)]
#[command(name = "inbox_triage")]
#[command(about = "Terminal client for the AI email-triage backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Log in via the browser and store the session token
    Login {
        /// Skip the browser flow and store this token directly
        #[arg(long)]
        token: Option<String>,
    },

    /// Clear the stored session token
    Logout,

    /// Run the dashboard TUI (default)
    Tui,

    /// Run the meeting-reminder watcher in the foreground
    Watch {
        /// Poll interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Trigger a mailbox sync and report how many new emails were analyzed
    Sync,

    /// Wipe the backend's analyzed emails (destructive)
    ResetEmails {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;

    match cli.cmd.unwrap_or(Command::Tui) {
        Command::Login { token } => {
            let session = match token {
                Some(token) => {
                    token_store::save_token(&token)?;
                    match Session::validate(&cfg.api_base_url, token) {
                        Ok(session) => session,
                        Err(e) => {
                            inbox_triage::session::clear_stored_token_quietly();
                            return Err(anyhow!("Token rejected: {e}"));
                        }
                    }
                }
                None => Session::login(&cfg)?,
            };
            println!(
                "Logged in as {} <{}>.",
                session.user.name, session.user.email
            );
            Ok(())
        }

        Command::Logout => {
            Session::logout();
            println!("Logged out.");
            Ok(())
        }

        Command::Tui => run_tui(&cfg),

        Command::Watch { interval } => {
            let session = require_session(&cfg)?;
            let client = session.client(&cfg)?;
            let interval = interval.unwrap_or_else(|| cfg.poll_interval_secs());

            let interrupted = Arc::new(AtomicBool::new(false));
            let flag = interrupted.clone();
            ctrlc::set_handler(move || {
                flag.store(true, Ordering::SeqCst);
            })?;

            println!(
                "Watching meetings for {} every {interval}s. Ctrl-C to stop.",
                session.user.email
            );
            let mut watcher = MeetingWatcher::start(client, Duration::from_secs(interval));
            while watcher.is_running() && !interrupted.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(250));
            }
            watcher.stop();
            Ok(())
        }

        Command::Sync => {
            let session = require_session(&cfg)?;
            let client = session.client(&cfg)?;
            let outcome = client.sync_mailbox()?;
            match outcome.count {
                0 => println!("No new emails found."),
                n => println!("{n} new emails analyzed."),
            }
            Ok(())
        }

        Command::ResetEmails { yes } => {
            if !yes {
                return Err(anyhow!(
                    "This wipes every analyzed email on the backend. Re-run with --yes to confirm."
                ));
            }
            let session = require_session(&cfg)?;
            let client = session.client(&cfg)?;
            client.reset_emails()?;
            println!("Backend email data reset.");
            Ok(())
        }
    }
}

fn require_session(cfg: &inbox_triage::config::Config) -> Result<Session> {
    Session::restore(cfg)?
        .ok_or_else(|| anyhow!("Not logged in. Run `inbox_triage login` first."))
}
