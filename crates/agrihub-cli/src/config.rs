// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agrihub_app::{ChatEndpoint, TabKind};
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "agrihub";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT: &str = "10s";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
    pub chat_endpoint: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
            chat_endpoint: Some(ChatEndpoint::default().path().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    /// Defaults to the chat endpoint's own delay when unset.
    pub typing_delay: Option<String>,
    pub start_tab: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("AGRIHUB_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set AGRIHUB_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [server] and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `agrihub --print-example-config` for the current schema",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let base_url = self.base_url();
        if base_url.is_empty() {
            bail!(
                "server.base_url in {} must not be empty -- use a URL like {DEFAULT_BASE_URL}",
                path.display()
            );
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            bail!(
                "server.base_url in {} must start with http:// or https://, got {base_url:?}",
                path.display()
            );
        }

        let timeout = self.timeout()?;
        if timeout <= Duration::ZERO {
            bail!(
                "server.timeout in {} must be positive, got {}",
                path.display(),
                self.server.timeout.as_deref().unwrap_or_default()
            );
        }

        self.chat_endpoint()
            .with_context(|| format!("invalid [server] config in {}", path.display()))?;
        self.typing_delay()
            .with_context(|| format!("invalid [ui] config in {}", path.display()))?;
        self.start_tab()
            .with_context(|| format!("invalid [ui] config in {}", path.display()))?;
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.server
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim()
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.server.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn chat_endpoint(&self) -> Result<ChatEndpoint> {
        match self.server.chat_endpoint.as_deref() {
            None => Ok(ChatEndpoint::default()),
            Some(raw) => ChatEndpoint::parse(raw).ok_or_else(|| {
                anyhow!("server.chat_endpoint must be \"ask\" or \"chatbot/ask\", got {raw:?}")
            }),
        }
    }

    pub fn typing_delay(&self) -> Result<Duration> {
        match self.ui.typing_delay.as_deref() {
            Some(raw) => parse_duration(raw),
            None => Ok(self.chat_endpoint()?.default_typing_delay()),
        }
    }

    pub fn start_tab(&self) -> Result<TabKind> {
        match self.ui.start_tab.as_deref() {
            None => Ok(TabKind::Comparison),
            Some(raw) => TabKind::parse(raw).ok_or_else(|| {
                anyhow!("ui.start_tab must be one of comparison, chat, soil; got {raw:?}")
            }),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# agrihub config\n# Place this file at: {}\n\nversion = 1\n\n[server]\nbase_url = \"{}\"\n# <N>ms, <N>s or <N>m\ntimeout = \"{}\"\n# \"ask\" or \"chatbot/ask\"\nchat_endpoint = \"{}\"\n\n[ui]\n# Minimum time the typing indicator stays up\ntyping_delay = \"1s\"\n# comparison | chat | soil\nstart_tab = \"comparison\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            ChatEndpoint::default().path(),
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
