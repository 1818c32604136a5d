use anyhow::{bail, Context, Result};
use resultkv_core::{ConnectionInfo, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retry policy override (optional section in config.toml).
///
/// `preset` picks a named policy; the explicit fields then adjust it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// "bounded" (default) or "fast".
    #[serde(default)]
    pub preset: Option<String>,
    /// Maximum attempts including the first; 0 = retry until not throttled.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub base_delay_ms: Option<u64>,
    #[serde(default)]
    pub max_delay_ms: Option<u64>,
}

impl RetryConfig {
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        let mut policy = match self.preset.as_deref() {
            None => RetryPolicy::default(),
            Some(name) => match RetryPolicy::preset(name) {
                Some(p) => p,
                None => bail!("unknown retry preset {name:?} (expected \"bounded\" or \"fast\")"),
            },
        };
        if let Some(n) = self.max_attempts {
            policy.max_attempts = (n > 0).then_some(n);
        }
        if let Some(ms) = self.base_delay_ms {
            policy.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            policy.max_delay = Duration::from_millis(ms);
        }
        Ok(policy)
    }
}

/// CLI configuration loaded from `~/.config/resultkv/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default connection descriptor, used when `--url` is not given.
    #[serde(default)]
    pub url: Option<String>,
    /// Optional retry override applied on top of the descriptor.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional consistency wait budget for `get`, in milliseconds.
    #[serde(default)]
    pub read_wait_ms: Option<u64>,
}

impl CliConfig {
    /// Resolve the connection to use: `--url` wins over the file's `url`, and
    /// the file's overrides are applied to whichever descriptor was chosen.
    pub fn connection(&self, url_arg: Option<&str>) -> Result<ConnectionInfo> {
        let descriptor = match url_arg.or(self.url.as_deref()) {
            Some(d) => d,
            None => bail!("no connection descriptor: pass --url or set `url` in {}", display_path()),
        };
        let mut info = ConnectionInfo::parse(descriptor)?;
        if let Some(retry) = &self.retry {
            info.retry = retry.to_policy()?;
        }
        if let Some(ms) = self.read_wait_ms {
            info.consistency.budget = Duration::from_millis(ms);
        }
        Ok(info)
    }
}

fn display_path() -> String {
    config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "config.toml".to_string())
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("resultkv")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path`, creating a default file if none exists.
pub fn load_or_init_at(path: &Path) -> Result<CliConfig> {
    if !path.exists() {
        let default_cfg = CliConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: CliConfig =
        toml::from_str(&data).with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CliConfig> {
    load_or_init_at(&config_path()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_empty() {
        let cfg = CliConfig::default();
        assert!(cfg.url.is_none());
        assert!(cfg.retry.is_none());
        assert!(cfg.read_wait_ms.is_none());
    }

    #[test]
    fn load_creates_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert_eq!(cfg, CliConfig::default());
        assert!(path.exists());
        assert_eq!(load_or_init_at(&path).unwrap(), CliConfig::default());
    }

    #[test]
    fn config_toml_custom_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
                url = "dynamodb://a:b@us-east-1/results"
                read_wait_ms = 2000

                [retry]
                preset = "fast"
                max_attempts = 8
            "#,
        )
        .unwrap();
        let cfg = load_or_init_at(&path).unwrap();
        let info = cfg.connection(None).unwrap();
        assert_eq!(info.table, "results");
        assert_eq!(info.consistency.budget, Duration::from_millis(2000));
        assert_eq!(info.retry.max_attempts, Some(8));
        assert_eq!(info.retry.base_delay, Duration::from_millis(100));
    }

    #[test]
    fn url_argument_wins_over_file() {
        let cfg = CliConfig {
            url: Some("dynamodb://a:b@us-east-1/from-file".to_string()),
            ..CliConfig::default()
        };
        let info = cfg.connection(Some("dynamodb://a:b@eu-west-1/from-arg")).unwrap();
        assert_eq!(info.table, "from-arg");
        assert_eq!(info.region, "eu-west-1");
    }

    #[test]
    fn missing_url_is_an_error() {
        let err = CliConfig::default().connection(None).unwrap_err();
        assert!(err.to_string().contains("--url"));
    }

    #[test]
    fn zero_max_attempts_means_unbounded() {
        let retry = RetryConfig {
            max_attempts: Some(0),
            ..RetryConfig::default()
        };
        assert_eq!(retry.to_policy().unwrap().max_attempts, None);
    }

    #[test]
    fn unknown_preset_rejected() {
        let retry = RetryConfig {
            preset: Some("forever".to_string()),
            ..RetryConfig::default()
        };
        assert!(retry.to_policy().is_err());
    }
}
