use crate::error::ConfigError;
use crate::filter::{AssetFilter, AssetFilterConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable naming the page to mirror
pub const ENV_ORIGIN_URL: &str = "WEBSITE";
/// Environment variable holding the storage account identity
pub const ENV_ACCOUNT: &str = "EMAIL";
/// Environment variable holding the storage space identity
pub const ENV_SPACE: &str = "SPACE";
pub const ENV_WORKSPACE_DIR: &str = "MIRROR_DIR";
pub const ENV_MAX_CONCURRENCY: &str = "MIRROR_CONCURRENCY";
pub const ENV_STORAGE_ENDPOINT: &str = "STORAGE_ENDPOINT";
pub const ENV_GATEWAY_DOMAIN: &str = "GATEWAY_DOMAIN";

/// Configuration for the storage network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Account identity used to log in (an email address)
    #[serde(default)]
    pub account: String,

    /// Identity of the space uploads go to
    #[serde(default)]
    pub space: String,

    /// Base URL of the upload service
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,

    /// Domain of the public gateway, e.g. `ipfs.w3s.link`
    #[serde(default = "default_gateway_domain")]
    pub gateway_domain: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            space: String::new(),
            endpoint: default_storage_endpoint(),
            gateway_domain: default_gateway_domain(),
        }
    }
}

/// Configuration for one mirror-and-publish run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Page to mirror
    #[serde(default)]
    pub origin_url: String,

    /// Local directory the page and its assets are written to
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Maximum number of asset downloads in flight
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-request timeout in seconds (0 disables it)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Regex patterns for asset URLs to leave untouched
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Directories uploaded by the publish stage (defaults to the workspace)
    #[serde(default)]
    pub upload_roots: Vec<PathBuf>,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Default value for workspace_dir
fn default_workspace_dir() -> PathBuf {
    PathBuf::from("temp")
}

/// Default value for max_concurrency
fn default_max_concurrency() -> usize {
    8
}

/// Default value for request_timeout_secs
fn default_request_timeout_secs() -> u64 {
    60
}

fn default_storage_endpoint() -> String {
    "https://up.web3.storage".to_string()
}

fn default_gateway_domain() -> String {
    "ipfs.w3s.link".to_string()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            origin_url: String::new(),
            workspace_dir: default_workspace_dir(),
            max_concurrency: default_max_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
            exclude_patterns: Vec::new(),
            upload_roots: Vec::new(),
            storage: StorageConfig::default(),
        }
    }
}

impl RunConfig {
    /// Create a new configuration with default values
    pub fn new(origin_url: &str) -> Self {
        Self {
            origin_url: origin_url.to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build a configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Overlay values found through `lookup` onto this configuration
    ///
    /// Unset and empty variables leave the current value in place.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_ORIGIN_URL) {
            self.origin_url = url;
        }
        if let Some(account) = get(ENV_ACCOUNT) {
            self.storage.account = account;
        }
        if let Some(space) = get(ENV_SPACE) {
            self.storage.space = space;
        }
        if let Some(dir) = get(ENV_WORKSPACE_DIR) {
            self.workspace_dir = PathBuf::from(dir);
        }
        if let Some(value) = get(ENV_MAX_CONCURRENCY) {
            self.max_concurrency = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: ENV_MAX_CONCURRENCY,
                    value,
                })?;
        }
        if let Some(endpoint) = get(ENV_STORAGE_ENDPOINT) {
            self.storage.endpoint = endpoint;
        }
        if let Some(domain) = get(ENV_GATEWAY_DOMAIN) {
            self.storage.gateway_domain = domain;
        }

        Ok(self)
    }

    /// Check everything the mirror stage needs
    pub fn validate_mirror(&self) -> Result<Url, ConfigError> {
        let origin = self.origin()?;

        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_concurrency",
                value: self.max_concurrency.to_string(),
            });
        }

        self.asset_filter()?;
        Ok(origin)
    }

    /// Check the full configuration, including storage credentials
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_mirror()?;

        if self.storage.account.trim().is_empty() {
            return Err(ConfigError::MissingValue(ENV_ACCOUNT));
        }
        if self.storage.space.trim().is_empty() {
            return Err(ConfigError::MissingValue(ENV_SPACE));
        }
        if Url::parse(&self.storage.endpoint).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "storage.endpoint",
                value: self.storage.endpoint.clone(),
            });
        }

        Ok(())
    }

    /// Parse the origin URL, requiring an absolute http(s) address
    pub fn origin(&self) -> Result<Url, ConfigError> {
        let raw = self.origin_url.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingValue(ENV_ORIGIN_URL));
        }

        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme {}", other),
            }),
        }
    }

    /// Compile the configured exclude patterns
    pub fn asset_filter(&self) -> Result<AssetFilter, ConfigError> {
        let filter_config = AssetFilterConfig {
            exclude_patterns: self.exclude_patterns.clone(),
        };

        AssetFilter::new(&filter_config).map_err(|source| {
            // Recompile one by one to report which pattern failed
            let pattern = self
                .exclude_patterns
                .iter()
                .find(|p| regex::Regex::new(p).is_err())
                .cloned()
                .unwrap_or_default();
            ConfigError::InvalidPattern { pattern, source }
        })
    }

    /// Directories the publish stage uploads
    pub fn upload_roots(&self) -> Vec<PathBuf> {
        if self.upload_roots.is_empty() {
            vec![self.workspace_dir.clone()]
        } else {
            self.upload_roots.clone()
        }
    }

    /// Per-request timeout, if enabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn complete_config() -> RunConfig {
        let mut config = RunConfig::new("https://example.com");
        config.storage.account = "me@example.com".to_string();
        config.storage.space = "did:key:z6Mkabc".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.workspace_dir, PathBuf::from("temp"));
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.storage.gateway_domain, "ipfs.w3s.link");
        assert_eq!(config.upload_roots(), vec![PathBuf::from("temp")]);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let config = RunConfig::from_json(
            r#"{
                "origin_url": "https://example.com",
                "max_concurrency": 2,
                "storage": { "account": "me@example.com", "space": "did:key:z6Mkabc" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.origin_url, "https://example.com");
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.storage.endpoint, "https://up.web3.storage");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"origin_url": "https://example.com"}"#).unwrap();

        let config = RunConfig::from_file(&path).unwrap();
        assert_eq!(config.origin_url, "https://example.com");

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            RunConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            RunConfig::from_file(dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_env_overlay() {
        let config = RunConfig::default()
            .with_env(lookup(&[
                (ENV_ORIGIN_URL, "https://example.org"),
                (ENV_ACCOUNT, "me@example.org"),
                (ENV_SPACE, "did:key:z6Mkdef"),
                (ENV_MAX_CONCURRENCY, "3"),
                (ENV_WORKSPACE_DIR, ""),
            ]))
            .unwrap();

        assert_eq!(config.origin_url, "https://example.org");
        assert_eq!(config.storage.account, "me@example.org");
        assert_eq!(config.storage.space, "did:key:z6Mkdef");
        assert_eq!(config.max_concurrency, 3);
        // Empty values are ignored
        assert_eq!(config.workspace_dir, PathBuf::from("temp"));
    }

    #[test]
    fn test_env_invalid_concurrency() {
        let result = RunConfig::default().with_env(lookup(&[(ENV_MAX_CONCURRENCY, "many")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: ENV_MAX_CONCURRENCY,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_origin() {
        let config = RunConfig::default();
        assert!(matches!(
            config.validate_mirror(),
            Err(ConfigError::MissingValue(ENV_ORIGIN_URL))
        ));
    }

    #[test]
    fn test_invalid_origin() {
        let config = RunConfig::new("example.com/page");
        assert!(matches!(
            config.validate_mirror(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let config = RunConfig::new("ftp://example.com");
        assert!(matches!(
            config.validate_mirror(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = complete_config();
        config.max_concurrency = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = complete_config();
        assert!(config.validate().is_ok());

        config.storage.space.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingValue(ENV_SPACE))
        ));

        config.storage.account.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingValue(ENV_ACCOUNT))
        ));
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let mut config = complete_config();
        config.exclude_patterns = vec![r"\.map$".to_string(), "[bad".to_string()];
        match config.validate() {
            Err(ConfigError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "[bad"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
