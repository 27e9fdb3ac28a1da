//! Server configuration.
//!
//! Every section defaults, so a config file only names what it changes:
//!
//! ```json
//! {
//!   "session": { "encryption_key": "...", "refresh_encryption_key": "..." },
//!   "social": { "wechat": { "app_id": "wx123", "app_secret": "..." } },
//!   "data_dir": "/srv/playvault/data"
//! }
//! ```

use std::path::{Path, PathBuf};

use playvault_identity::ProviderConfig;
use playvault_session::SessionConfig;
use serde::Deserialize;

use crate::PlayvaultError;

/// Credentials of the platforms players sign in with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub wechat: ProviderConfig,
    pub tiktok: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub session: SessionConfig,
    pub social: SocialConfig,
    /// Directory holding template files such as `TplRedemption.json`.
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            social: SocialConfig::default(),
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl ServerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PlayvaultError> {
        serde_json::from_str(json).map_err(|e| PlayvaultError::Config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PlayvaultError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| PlayvaultError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn with_wechat(mut self, wechat: ProviderConfig) -> Self {
        self.social.wechat = wechat;
        self
    }

    pub fn with_tiktok(mut self, tiktok: ProviderConfig) -> Self {
        self.social.tiktok = tiktok;
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}
