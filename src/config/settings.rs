// src/config/settings.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::consts::CONFIG_FILE;
use crate::core::error::Result;

/// On-disk CLI configuration, stored as TOML in the user's home directory.
///
/// Ordinary keys live in the `values` table. Credentials live in the
/// `secret` table, which `get` and `items` never expose; only the
/// dedicated secret accessors reach it. Constructed once at startup and
/// passed down explicitly.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default)]
    values: BTreeMap<String, String>,
    #[serde(default)]
    secret: BTreeMap<String, String>,
}

impl Settings {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE)
    }

    /// Load from `path`, or start empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut cfg = if path.is_file() {
            let text = fs::read_to_string(&path)?;
            toml::from_str::<Self>(&text)?
        } else {
            Self::default()
        };
        cfg.path = path;
        Ok(cfg)
    }

    /// Write back to the file loaded from. Credentials end up on disk, so
    /// the file is restricted to the owner where the OS supports it.
    pub fn save(&self) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        fs::write(&self.path, text)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(s!(key), s!(value));
    }

    /// All ordinary entries; secrets stay out.
    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get_secret(&self, key: &str) -> Option<&str> {
        self.secret.get(key).map(String::as_str)
    }

    pub fn set_secret(&mut self, key: &str, value: &str) {
        self.secret.insert(s!(key), s!(value));
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
