//! Configuration Management
//!
//! Handles persistent configuration storage for auth0-tfgen.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Last used tenant domain
    #[serde(default)]
    pub domain: Option<String>,
    /// Management API access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Tenant settings resolved for one invocation
#[derive(Debug, Clone)]
pub struct TenantSettings {
    pub domain: String,
    pub access_token: String,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("auth0-tfgen").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, defaulting on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Resolve tenant settings (CLI/env > config file)
    pub fn resolve(&self, domain: Option<&str>, token: Option<&str>) -> Result<TenantSettings> {
        let domain = domain
            .map(str::to_string)
            .or_else(|| self.domain.clone())
            .filter(|d| !d.trim().is_empty())
            .context("No tenant domain configured. Set AUTH0_DOMAIN or use --domain")?;

        if !validate_domain(&domain) {
            return Err(anyhow::anyhow!("Invalid tenant domain: {}", domain));
        }

        let access_token = token
            .map(str::to_string)
            .or_else(|| self.access_token.clone())
            .filter(|t| !t.trim().is_empty())
            .context("No Management API token configured. Set AUTH0_ACCESS_TOKEN or use --token")?;

        Ok(TenantSettings {
            domain: domain.trim().to_string(),
            access_token: access_token.trim().to_string(),
        })
    }

    /// Set domain and save
    pub fn set_domain(&mut self, domain: &str) -> Result<()> {
        if self.domain.as_deref() == Some(domain) {
            return Ok(());
        }
        self.domain = Some(domain.to_string());
        self.save()
    }
}

/// Validate a tenant domain
/// Bare hostnames (optionally with a port) use letters, digits, dots and hyphens,
/// and may not start or end with a dot or hyphen. Explicit http(s) URLs pass through.
fn validate_domain(domain: &str) -> bool {
    let domain = domain.trim();
    if domain.starts_with("http://") || domain.starts_with("https://") {
        return true;
    }

    let host = match domain.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => host,
        Some(_) => return false,
        None => domain,
    };

    if host.is_empty() || host.len() > 253 {
        return false;
    }

    if host.starts_with(['.', '-']) || host.ends_with(['.', '-']) {
        return false;
    }

    host.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}
