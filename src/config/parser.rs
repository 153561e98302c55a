use crate::config::types::{Config, ImageNaming};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully parsed configuration
/// * `Err(ConfigError)` - Failed to read or parse the configuration
///
/// Validation runs after environment overrides, see [`load_effective_config`].
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is recorded in the run summary to tell exports made with different
/// settings apart.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Applies environment overrides on top of a configuration
///
/// Recognized variables: `CLIENT_ID`, `CLIENT_SECRET`, `EXCHANGE_URL`,
/// `ORGANIZATION_ID`, `ASSET_ID`, `ASSET_VERSION`, `GROUP_ID`, `OUTPUT_DIR`,
/// `INCLUDE_DOCS`, `INCLUDE_METADATA`, `INCLUDE_FILES`, `IMAGE_NAMING`. Empty values are
/// ignored. Boolean flags are true only for `true` (any case).
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
    let flag = |key: &str| get(key).map(|v| v.eq_ignore_ascii_case("true"));

    if let Some(v) = get("CLIENT_ID") {
        config.exchange.client_id = Some(v);
    }
    if let Some(v) = get("CLIENT_SECRET") {
        config.exchange.client_secret = Some(v);
    }
    if let Some(v) = get("EXCHANGE_URL") {
        config.exchange.base_url = v;
    }
    if let Some(v) = get("ORGANIZATION_ID") {
        config.exchange.organization_id = v;
    }
    if let Some(v) = get("ASSET_ID") {
        config.exchange.asset_id = Some(v);
    }
    if let Some(v) = get("ASSET_VERSION") {
        config.exchange.asset_version = Some(v);
    }
    if let Some(v) = get("GROUP_ID") {
        config.exchange.group_id = Some(v);
    }
    if let Some(v) = get("OUTPUT_DIR") {
        config.export.output_dir = v;
    }
    if let Some(v) = flag("INCLUDE_DOCS") {
        config.export.include_docs = v;
    }
    if let Some(v) = flag("INCLUDE_METADATA") {
        config.export.include_metadata = v;
    }
    if let Some(v) = flag("INCLUDE_FILES") {
        config.export.include_files = v;
    }
    match get("IMAGE_NAMING").as_deref() {
        Some("sequential") => config.export.image_naming = ImageNaming::Sequential,
        Some("resource-path") => config.export.image_naming = ImageNaming::ResourcePath,
        Some(other) => tracing::warn!("Ignoring unknown IMAGE_NAMING value '{}'", other),
        None => {}
    }
}

/// Builds the effective configuration for a run
///
/// 1. Loads `.env` from the working directory if present
/// 2. Reads the TOML file, or starts from defaults when no path is given
/// 3. Applies environment overrides
/// 4. Validates the result
///
/// # Returns
///
/// * `Ok((Config, Option<String>))` - Configuration and the file hash, if a file was read
/// * `Err(ConfigError)` - Failed to load or validate
pub fn load_effective_config(path: Option<&Path>) -> Result<(Config, Option<String>), ConfigError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Could not load .env file: {}", e);
        }
    }

    let (mut config, hash) = match path {
        Some(path) => (load_config(path)?, Some(compute_config_hash(path)?)),
        None => (Config::default(), None),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;

    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[exchange]
base-url = "https://catalog.example.com"
organization-id = "org-1"
client-id = "id"
client-secret = "secret"
group-id = "g1"

[export]
output-dir = "./out"
include-files = true
image-naming = "sequential"
request-delay-ms = 250
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.exchange.base_url, "https://catalog.example.com");
        assert_eq!(config.exchange.organization_id, "org-1");
        assert_eq!(config.exchange.search_limit, 100);
        assert_eq!(config.exchange.group_id.as_deref(), Some("g1"));
        assert_eq!(config.export.output_dir, "./out");
        assert!(config.export.include_files);
        assert!(config.export.include_docs);
        assert_eq!(config.export.image_naming, ImageNaming::Sequential);
        assert_eq!(config.export.request_delay_ms, 250);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.exchange.base_url, "https://anypoint.mulesoft.com");
        assert_eq!(config.export.output_dir, "api-specs");
        assert_eq!(config.export.image_naming, ImageNaming::ResourcePath);
        assert_eq!(config.export.request_delay_ms, 100);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("CLIENT_ID", "env-id"),
                ("CLIENT_SECRET", "env-secret"),
                ("ORGANIZATION_ID", "org-env"),
                ("EXCHANGE_URL", "https://other.example.com"),
                ("ASSET_ID", "orders"),
                ("OUTPUT_DIR", "exports"),
                ("INCLUDE_DOCS", "False"),
                ("INCLUDE_METADATA", "yes"),
                ("INCLUDE_FILES", "TRUE"),
                ("IMAGE_NAMING", "sequential"),
            ]),
        );

        assert_eq!(config.exchange.client_id.as_deref(), Some("env-id"));
        assert_eq!(config.exchange.client_secret.as_deref(), Some("env-secret"));
        assert_eq!(config.exchange.organization_id, "org-env");
        assert_eq!(config.exchange.base_url, "https://other.example.com");
        assert_eq!(config.exchange.asset_id.as_deref(), Some("orders"));
        assert_eq!(config.export.output_dir, "exports");
        assert!(!config.export.include_docs);
        // Anything but "true" is false
        assert!(!config.export.include_metadata);
        assert!(config.export.include_files);
        assert_eq!(config.export.image_naming, ImageNaming::Sequential);
    }

    #[test]
    fn test_env_selects_single_asset() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("ORGANIZATION_ID", "org-env"),
                ("ASSET_ID", "orders"),
                ("ASSET_VERSION", "1.2.0"),
                ("GROUP_ID", "g-env"),
            ]),
        );

        assert_eq!(config.exchange.group_id.as_deref(), Some("g-env"));
        assert_eq!(config.exchange.asset_version.as_deref(), Some("1.2.0"));
        assert_eq!(
            config.exchange.single_asset().map(|a| a.to_string()),
            Some("g-env/orders:1.2.0".to_string())
        );
    }

    #[test]
    fn test_asset_id_alone_is_a_search_filter() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[("ASSET_ID", "orders"), ("ASSET_VERSION", "")]));

        assert_eq!(config.exchange.asset_id.as_deref(), Some("orders"));
        assert!(config.exchange.single_asset().is_none());
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[("OUTPUT_DIR", ""), ("INCLUDE_DOCS", "")]));

        assert_eq!(config.export.output_dir, "api-specs");
        assert!(config.export.include_docs);
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
