use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub poll_interval_secs: Option<u64>,
    pub login_redirect_port: Option<u16>,
}

impl Config {
    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs
            .unwrap_or(crate::notify::POLL_INTERVAL_SECS)
    }

    pub fn login_redirect_port(&self) -> u16 {
        self.login_redirect_port.unwrap_or(8765)
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("inbox_triage"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        // create a template config for users to edit
        let sample = Config {
            api_base_url: "http://localhost:8000".to_string(),
            poll_interval_secs: Some(crate::notify::POLL_INTERVAL_SECS),
            login_redirect_port: Some(8765),
        };
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(path, tom)?;
        return Err(anyhow::anyhow!(
            "Created template config at {} — edit it and run again",
            path.display()
        ));
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&s)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_template_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("edit it and run again"));
        assert!(path.exists());

        // the written template must itself parse
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.api_base_url, "http://localhost:8000");
        assert_eq!(cfg.poll_interval_secs(), 60);
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_base_url = \"https://triage.example.com\"\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.api_base_url, "https://triage.example.com");
        assert_eq!(cfg.poll_interval_secs(), 60);
        assert_eq!(cfg.login_redirect_port(), 8765);
    }
}
