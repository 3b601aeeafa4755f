use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct VigilConfig {
    pub database: Option<DatabaseConfig>,
    pub nvd: Option<NvdConfig>,
    pub kev: Option<KevConfig>,
    pub model: Option<ModelConfig>,
    pub pacing: Option<PacingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NvdConfig {
    pub base_url: Option<String>,
    /// Overridden by the NVD_API_KEY environment variable when set.
    pub api_key: Option<String>,
    pub results_per_page: Option<u32>,
    pub days_back: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct KevConfig {
    pub catalog_url: Option<String>,
    pub cache_ttl_hours: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ModelConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PacingConfig {
    /// Pause between the NVD and KEV sub-flows during ingestion.
    pub feed_pause_secs: Option<u64>,
    /// Pause between model calls in an analysis batch.
    pub model_pause_secs: Option<u64>,
}

impl VigilConfig {
    /// API key resolution: environment wins over the config file.
    pub fn nvd_api_key(&self) -> Option<String> {
        std::env::var("NVD_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.nvd.as_ref().and_then(|n| n.api_key.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = VigilConfig::default();
        assert!(config.database.is_none());
        assert!(config.nvd.is_none());
        assert!(config.kev.is_none());
        assert!(config.model.is_none());
        assert!(config.pacing.is_none());
    }

    #[test]
    fn test_config_file_api_key_used_when_env_absent() {
        let config = VigilConfig {
            nvd: Some(NvdConfig {
                api_key: Some("file-key".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        // NVD_API_KEY is not set in the test environment
        if std::env::var("NVD_API_KEY").is_err() {
            assert_eq!(config.nvd_api_key().as_deref(), Some("file-key"));
        }
    }

    #[test]
    fn test_yaml_sections_deserialize() {
        let yaml = r#"
database:
  path: /var/lib/biovigil/vigil.db
nvd:
  results_per_page: 500
  days_back: 3
model:
  model: llama3.1:8b
pacing:
  feed_pause_secs: 5
"#;
        let config: VigilConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.database.unwrap().path.as_deref(),
            Some("/var/lib/biovigil/vigil.db")
        );
        assert_eq!(config.nvd.as_ref().unwrap().results_per_page, Some(500));
        assert_eq!(config.nvd.unwrap().days_back, Some(3));
        assert_eq!(config.model.unwrap().model.as_deref(), Some("llama3.1:8b"));
        assert_eq!(config.pacing.unwrap().feed_pause_secs, Some(5));
    }
}
