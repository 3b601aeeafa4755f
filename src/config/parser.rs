use std::path::Path;

use tracing::{debug, warn};

use super::types::VigilConfig;
use crate::errors::VigilError;

const MAX_CONFIG_BYTES: u64 = 1_048_576;

/// Parse a config file. Missing file and oversized file are hard errors;
/// use `load_or_default` for the common startup path.
pub async fn parse_config(path: &Path) -> Result<VigilConfig, VigilError> {
    if !path.exists() {
        return Err(VigilError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(VigilError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: VigilConfig = serde_yaml::from_str(&content)?;

    validate_config(&config)?;
    Ok(config)
}

/// Startup resolution: an explicit path must parse; with no path, a file at
/// the default location is used if present, otherwise built-in defaults.
pub async fn load_or_default(path: Option<&Path>) -> Result<VigilConfig, VigilError> {
    match path {
        Some(p) => parse_config(p).await,
        None => {
            let default = Path::new("biovigil.yaml");
            if default.exists() {
                debug!(path = %default.display(), "Loading config from default location");
                parse_config(default).await
            } else {
                Ok(VigilConfig::default())
            }
        }
    }
}

/// Semantic checks beyond what deserialization enforces.
fn validate_config(config: &VigilConfig) -> Result<(), VigilError> {
    if let Some(nvd) = &config.nvd {
        if let Some(per_page) = nvd.results_per_page {
            if per_page == 0 || per_page > 2_000 {
                return Err(VigilError::Config(format!(
                    "nvd.results_per_page must be between 1 and 2000, got {}",
                    per_page
                )));
            }
        }
        if nvd.days_back == Some(0) {
            return Err(VigilError::Config("nvd.days_back must be at least 1".into()));
        }
    }

    if let Some(kev) = &config.kev {
        if let Some(ttl) = kev.cache_ttl_hours {
            if ttl < 1 {
                return Err(VigilError::Config(format!(
                    "kev.cache_ttl_hours must be at least 1, got {}",
                    ttl
                )));
            }
        }
    }

    if let Some(model) = &config.model {
        if model.model.as_deref() == Some("") {
            return Err(VigilError::Config("model.model must not be empty".into()));
        }
    }

    if config.nvd.as_ref().and_then(|n| n.api_key.as_ref()).is_some() {
        warn!("API key present in config file; prefer the NVD_API_KEY environment variable");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_parse_missing_file_is_config_error() {
        let result = parse_config(Path::new("/nonexistent/biovigil.yaml")).await;
        assert!(matches!(result, Err(VigilError::Config(_))));
    }

    #[tokio::test]
    async fn test_parse_valid_config() {
        let file = write_temp_config("nvd:\n  days_back: 14\n");
        let config = parse_config(file.path()).await.unwrap();
        assert_eq!(config.nvd.unwrap().days_back, Some(14));
    }

    #[tokio::test]
    async fn test_parse_rejects_malformed_yaml() {
        let file = write_temp_config("nvd: [unclosed\n");
        assert!(parse_config(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_validate_rejects_zero_results_per_page() {
        let file = write_temp_config("nvd:\n  results_per_page: 0\n");
        assert!(matches!(
            parse_config(file.path()).await,
            Err(VigilError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_validate_rejects_oversized_page() {
        let file = write_temp_config("nvd:\n  results_per_page: 5000\n");
        assert!(parse_config(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_validate_rejects_nonpositive_cache_ttl() {
        let file = write_temp_config("kev:\n  cache_ttl_hours: 0\n");
        assert!(parse_config(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_validate_rejects_empty_model_name() {
        let file = write_temp_config("model:\n  model: \"\"\n");
        assert!(parse_config(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_load_or_default_without_path_or_file() {
        // Runs from the crate root where no biovigil.yaml exists
        let config = load_or_default(None).await.unwrap();
        assert!(config.nvd.is_none());
    }

    #[tokio::test]
    async fn test_load_or_default_explicit_missing_path_fails() {
        let result = load_or_default(Some(Path::new("/nonexistent/biovigil.yaml"))).await;
        assert!(result.is_err());
    }
}
