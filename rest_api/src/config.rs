// rest_api/src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Server-wide configuration, loaded from a YAML file under a `hostel:`
/// wrapper key. Every field has a default so a missing file still yields a
/// working development setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostelConfig {
    pub host: String,
    pub port: u16,
    pub data_directory: String,
    pub hostel_name: String,
    pub jwt_secret: String,
    pub text_api_url: String,
    pub text_api_key: String,
    pub text_model: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Default for HostelConfig {
    fn default() -> Self {
        HostelConfig {
            host: "127.0.0.1".to_string(),
            port: 8082,
            data_directory: "hostel_data".to_string(),
            hostel_name: "Good Shepherd Ladies Hostel".to_string(),
            jwt_secret: "dev-only-secret-change-me-32-bytes!!".to_string(),
            text_api_url: "https://generativelanguage.googleapis.com".to_string(),
            text_api_key: String::new(),
            text_model: "gemini-2.5-flash".to_string(),
            admin_email: "admin@hostel.local".to_string(),
            admin_password: "change-me".to_string(),
        }
    }
}

// Wrapper matching the `hostel:` key in the YAML file.
#[derive(Debug, Deserialize)]
struct HostelConfigWrapper {
    hostel: HostelConfig,
}

/// Loads the configuration. A missing path (or `None`) falls back to the
/// defaults; a present but malformed file is an error.
pub fn load_hostel_config(config_file_path: Option<PathBuf>) -> Result<HostelConfig> {
    let path = match config_file_path {
        Some(path) => path,
        None => return Ok(HostelConfig::default()),
    };
    if !path.exists() {
        return Ok(HostelConfig::default());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let wrapper: HostelConfigWrapper = serde_yaml2::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))?;
    Ok(wrapper.hostel)
}
