use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};

const SERVICE: &str = "inbox_triage";
const ACCOUNT: &str = "session-token";

/// Save the bearer token into the OS keyring under the fixed key
pub fn save_token(token: &str) -> Result<()> {
    let entry = Entry::new(SERVICE, ACCOUNT);
    entry?
        .set_password(token)
        .map_err(|e| anyhow!(e.to_string()))?;
    Ok(())
}

/// Load the bearer token from the keyring, None if never stored
pub fn load_token() -> Result<Option<String>> {
    let entry = Entry::new(SERVICE, ACCOUNT);
    match entry?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}

/// Remove the stored token; absent entry is not an error
pub fn clear_token() -> Result<()> {
    let entry = Entry::new(SERVICE, ACCOUNT);
    match entry?.delete_credential() {
        Ok(()) | Err(KeyringError::NoEntry) => Ok(()),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}
