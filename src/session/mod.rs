pub mod login;
pub mod token_store;

use anyhow::Result;

use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::domain::user::UserProfile;

/// An authenticated session: the bearer token plus the profile that last
/// validated against it. Threaded explicitly into fetchers, never looked
/// up ambiently.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl Session {
    /// Validate a token against `/auth/me`. 200 yields a live session;
    /// anything else is the caller's cue to treat it as dead.
    pub fn validate(base_url: &str, token: String) -> Result<Session, ApiError> {
        let client = ApiClient::new(base_url, &token)?;
        let user = client.me()?;
        Ok(Session { token, user })
    }

    /// Restore from the keyring. Any validation failure (non-OK response
    /// or transport error) clears the stored token and leaves the caller
    /// unauthenticated. No retry.
    pub fn restore(cfg: &Config) -> Result<Option<Session>> {
        let Some(token) = token_store::load_token()? else {
            return Ok(None);
        };
        match Self::validate(&cfg.api_base_url, token) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                log::warn!("stored session rejected: {e}");
                clear_stored_token_quietly();
                Ok(None)
            }
        }
    }

    /// Run the browser handoff, persist the captured token, validate it.
    pub fn login(cfg: &Config) -> Result<Session> {
        let token = login::browser_login(cfg)?;
        token_store::save_token(&token)?;
        match Self::validate(&cfg.api_base_url, token) {
            Ok(session) => Ok(session),
            Err(e) => {
                clear_stored_token_quietly();
                Err(e.into())
            }
        }
    }

    pub fn client(&self, cfg: &Config) -> Result<ApiClient, ApiError> {
        ApiClient::new(&cfg.api_base_url, &self.token)
    }

    /// Purely local: the credential is stateless, so there is no server
    /// call to make. Always succeeds.
    pub fn logout() {
        clear_stored_token_quietly();
    }
}

/// Best-effort token removal. Logout must always succeed, so keyring
/// failures are logged rather than propagated.
pub fn clear_stored_token_quietly() {
    if let Err(e) = token_store::clear_token() {
        log::warn!("could not clear stored token: {e}");
    }
}
