//! Browser login flow.
//!
//! Opens the backend's `/auth/login` entry point in the system browser with
//! a loopback redirect_uri, then catches the redirect on a local listener
//! and extracts the `?token=` query parameter the identity handoff appends.

use anyhow::{Result, anyhow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tiny_http::{Response, Server};
use url::Url;

use crate::api::ApiClient;
use crate::config::Config;

const LOGIN_TIMEOUT_SECS: u64 = 180;

/// Run the browser handoff and return the captured bearer token.
pub fn browser_login(cfg: &Config) -> Result<String> {
    let port = cfg.login_redirect_port();
    let bind_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);

    // 1) Start listening FIRST so a fast redirect cannot race us
    let server = Server::http(bind_addr)
        .map_err(|e| anyhow!("Failed to bind login callback server on {bind_addr}: {e:?}"))?;

    let redirect_uri = format!("http://127.0.0.1:{port}/callback");
    let login_url = ApiClient::login_url(&cfg.api_base_url, &redirect_uri);

    println!("Open this URL in your browser:\n{login_url}");
    // best-effort: don't fail if browser can't be opened
    if let Err(e) = open::that(&login_url) {
        eprintln!("Warning: could not open browser automatically: {e}");
    }

    // 2) Wait for the redirect carrying ?token=
    let mut token_opt: Option<String> = None;
    let wait_until = Instant::now() + Duration::from_secs(LOGIN_TIMEOUT_SECS);

    while Instant::now() < wait_until {
        let Ok(maybe_request) = server.recv_timeout(Duration::from_millis(500)) else {
            continue;
        };
        let Some(request) = maybe_request else {
            continue;
        };

        // request.url() is a path+query like "/callback?token=..."
        let full = format!("http://127.0.0.1:{port}{}", request.url());
        match Url::parse(&full) {
            Ok(parsed) => {
                for (k, v) in parsed.query_pairs() {
                    if k == "token" && !v.is_empty() {
                        token_opt = Some(v.into_owned());
                    }
                }

                if token_opt.is_some() {
                    let _ = request.respond(Response::from_string(
                        "Login received. You can close this tab and return to the terminal.",
                    ));
                    break;
                } else {
                    let _ = request.respond(Response::from_string(
                        "No token found in redirect. You can close this tab.",
                    ));
                }
            }
            Err(_) => {
                let _ = request.respond(Response::from_string("Bad redirect"));
            }
        }
    }

    token_opt.ok_or_else(|| anyhow!("No token received within timeout"))
}
