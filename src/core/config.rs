use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RankingConfig {
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,
    #[serde(default = "default_per_category_limit")]
    pub per_category_limit: usize,
}

fn default_cache_ttl_hours() -> u64 {
    6
}

fn default_per_category_limit() -> usize {
    5
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            cache_ttl_hours: default_cache_ttl_hours(),
            per_category_limit: default_per_category_limit(),
        }
    }
}

impl RankingConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours.saturating_mul(60 * 60))
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// JSON array of fund records. Relative paths resolve against the
    /// working directory.
    pub snapshot_path: Option<String>,
    #[serde(default)]
    pub ranking: RankingConfig,
}

impl AppConfig {
    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "fundwatch", "fundwatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Snapshot to read, preferring an explicit override.
    pub fn snapshot_path(&self, override_path: Option<&str>) -> Result<PathBuf> {
        override_path
            .or(self.snapshot_path.as_deref())
            .map(PathBuf::from)
            .context("No fund snapshot configured; set snapshot_path or pass --snapshot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
snapshot_path: "/var/lib/fundwatch/funds.json"
ranking:
  cache_ttl_hours: 12
  per_category_limit: 3
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.snapshot_path.as_deref(),
            Some("/var/lib/fundwatch/funds.json")
        );
        assert_eq!(config.ranking.cache_ttl_hours, 12);
        assert_eq!(config.ranking.per_category_limit, 3);
        assert_eq!(config.ranking.cache_ttl(), Duration::from_secs(12 * 3600));
    }

    #[test]
    fn test_ranking_defaults() {
        let config: AppConfig =
            serde_yaml::from_str("snapshot_path: funds.json\n").expect("Failed to deserialize");
        assert_eq!(config.ranking, RankingConfig::default());
        assert_eq!(config.ranking.cache_ttl(), Duration::from_secs(6 * 3600));

        let partial: AppConfig = serde_yaml::from_str("ranking:\n  per_category_limit: 8\n")
            .expect("Failed to deserialize");
        assert!(partial.snapshot_path.is_none());
        assert_eq!(partial.ranking.cache_ttl_hours, 6);
        assert_eq!(partial.ranking.per_category_limit, 8);
    }

    #[test]
    fn test_snapshot_override() {
        let config: AppConfig = serde_yaml::from_str("snapshot_path: funds.json\n").unwrap();
        assert_eq!(
            config.snapshot_path(Some("other.json")).unwrap(),
            PathBuf::from("other.json")
        );
        assert_eq!(config.snapshot_path(None).unwrap(), PathBuf::from("funds.json"));

        let empty: AppConfig = serde_yaml::from_str("ranking: {}\n").unwrap();
        assert!(empty.snapshot_path(None).is_err());
    }

    #[test]
    fn test_load_from_path() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(file.path(), "snapshot_path: funds.json\n")?;
        let config = AppConfig::load_from_path(file.path())?;
        assert_eq!(config.snapshot_path.as_deref(), Some("funds.json"));

        assert!(AppConfig::load_from_path("/nonexistent/config.yaml").is_err());
        Ok(())
    }
}
