use crate::codec::ChecklistPolicy;
use crate::error::{Result, SyncError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Resolved remote credentials and target list. Every pass resolves these
/// before issuing any remote call; absence aborts the whole pass.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_token: String,
    pub list_id: String,
    pub red_label_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Credentials may live here or in CARDSYNC_* env vars; env wins so the
    /// committed config can stay free of secrets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_label_id: Option<String>,

    /// Board API base URL; overridable for self-hosted boards and tests.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub checklist_policy: ChecklistPolicy,

    /// Legacy name-based fallback: adopt an existing same-title card instead
    /// of creating a duplicate. Can reattach to an unrelated card, so off by
    /// default.
    #[serde(default)]
    pub adopt_by_title: bool,

    /// Delete the remote card when its comment disappears from source.
    #[serde(default)]
    pub delete_removed: bool,

    /// Inbound-sync timer period in watch mode.
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,

    /// File extensions the watcher reacts to.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_version() -> u32 {
    1
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_sync_interval() -> u64 {
    300
}

fn default_extensions() -> Vec<String> {
    vec!["ts".to_string()]
}

impl Config {
    pub fn new() -> Self {
        Self {
            version: 1,
            api_key: None,
            api_token: None,
            list_id: None,
            red_label_id: None,
            base_url: default_base_url(),
            checklist_policy: ChecklistPolicy::Strict,
            adopt_by_title: false,
            delete_removed: false,
            sync_interval_secs: default_sync_interval(),
            extensions: default_extensions(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(SyncError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Credential resolution
    // -----------------------------------------------------------------------

    pub fn credentials(&self) -> Result<Credentials> {
        let api_key = env_or("CARDSYNC_API_KEY", &self.api_key);
        let api_token = env_or("CARDSYNC_API_TOKEN", &self.api_token);
        let list_id = env_or("CARDSYNC_LIST_ID", &self.list_id);
        match (api_key, api_token, list_id) {
            (Some(api_key), Some(api_token), Some(list_id)) => Ok(Credentials {
                api_key,
                api_token,
                list_id,
                red_label_id: env_or("CARDSYNC_RED_LABEL_ID", &self.red_label_id),
            }),
            _ => Err(SyncError::MissingCredentials),
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.api_key.is_some() || self.api_token.is_some() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "api_key/api_token are stored in config.yaml; prefer \
                          CARDSYNC_API_KEY / CARDSYNC_API_TOKEN env vars"
                    .to_string(),
            });
        }

        if self.sync_interval_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "sync_interval_secs must be greater than zero".to_string(),
            });
        }

        if self.extensions.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "extensions is empty: the watcher will never trigger a save pass"
                    .to_string(),
            });
        }

        for ext in &self.extensions {
            if ext.starts_with('.') {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("extension '{ext}' should not include the leading dot"),
                });
            }
        }

        warnings
    }
}

fn env_or(var: &str, fallback: &Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.clone().filter(|v| !v.is_empty()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.base_url, DEFAULT_BASE_URL);
        assert_eq!(parsed.checklist_policy, ChecklistPolicy::Strict);
        assert!(!parsed.adopt_by_title);
        assert!(!parsed.delete_removed);
    }

    #[test]
    fn secrets_not_serialized_when_absent() {
        let cfg = Config::new();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert!(!yaml.contains("api_key"));
        assert!(!yaml.contains("api_token"));
    }

    #[test]
    fn minimal_yaml_backward_compat() {
        // A config written before the policy fields existed must still load.
        let yaml = "version: 1\nlist_id: l1\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.list_id.as_deref(), Some("l1"));
        assert_eq!(cfg.sync_interval_secs, 300);
        assert_eq!(cfg.extensions, vec!["ts".to_string()]);
    }

    #[test]
    fn load_without_init_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(SyncError::NotInitialized)
        ));
    }

    #[test]
    fn credentials_from_config_file() {
        let cfg = Config {
            api_key: Some("k".to_string()),
            api_token: Some("t".to_string()),
            list_id: Some("l".to_string()),
            red_label_id: Some("r".to_string()),
            ..Config::new()
        };
        let creds = cfg.credentials().unwrap();
        assert_eq!(creds.api_key, "k");
        assert_eq!(creds.list_id, "l");
        assert_eq!(creds.red_label_id.as_deref(), Some("r"));
    }

    #[test]
    fn missing_credentials_abort() {
        let cfg = Config {
            api_key: Some("k".to_string()),
            ..Config::new()
        };
        assert!(matches!(
            cfg.credentials(),
            Err(SyncError::MissingCredentials)
        ));
    }

    #[test]
    fn validate_clean_config() {
        let cfg = Config::new();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_flags_committed_secrets() {
        let cfg = Config {
            api_key: Some("k".to_string()),
            ..Config::new()
        };
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.message.contains("env vars")));
    }

    #[test]
    fn validate_flags_zero_interval_as_error() {
        let cfg = Config {
            sync_interval_secs: 0,
            ..Config::new()
        };
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("sync_interval_secs")));
    }

    #[test]
    fn validate_flags_dotted_extension() {
        let cfg = Config {
            extensions: vec![".ts".to_string()],
            ..Config::new()
        };
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.message.contains("leading dot")));
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new();
        cfg.list_id = Some("list-9".to_string());
        cfg.adopt_by_title = true;
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.list_id.as_deref(), Some("list-9"));
        assert!(loaded.adopt_by_title);
    }
}
