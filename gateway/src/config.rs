//! Gateway configuration from environment variables

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 18700;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub port: u16,
    pub authority_id: String,
    pub authority_password: String,
    /// `None` disables simulated movement
    pub drift_interval: Option<Duration>,
    pub notification_log: usize,
    pub ui_dir: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            authority_id: "admin".to_string(),
            authority_password: "safety123".to_string(),
            drift_interval: Some(Duration::from_secs(5)),
            notification_log: 100,
            ui_dir: None,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("SAFETY_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(port) = lookup("SAFETY_GATEWAY_PORT").or_else(|| lookup("PORT")) {
            config.port = port
                .parse()
                .with_context(|| format!("invalid gateway port: {port}"))?;
        }
        if let Some(id) = lookup("SAFETY_AUTHORITY_ID") {
            config.authority_id = id;
        }
        if let Some(password) = lookup("SAFETY_AUTHORITY_PASSWORD") {
            config.authority_password = password;
        }
        if let Some(secs) = lookup("SAFETY_DRIFT_INTERVAL_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("invalid drift interval: {secs}"))?;
            config.drift_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(size) = lookup("SAFETY_NOTIFICATION_LOG") {
            config.notification_log = size
                .parse()
                .with_context(|| format!("invalid notification log size: {size}"))?;
        }
        config.ui_dir = lookup("SAFETY_UI_DIR").map(PathBuf::from);

        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
