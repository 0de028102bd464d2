use std::path::PathBuf;

/// Errors raised while assembling a [`crate::config::RunConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    MissingValue(&'static str),

    #[error("invalid origin URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("invalid exclude pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that abort the mirror stage
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("empty response body from {url}")]
    EmptyResponse { url: String },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort the publish stage
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to enumerate {path}: {source}")]
    Enumerate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path} for upload: {source}")]
    Materialize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no files found under the upload roots")]
    EmptyFileSet,

    #[error("login as {account} rejected: {reason}")]
    Auth { account: String, reason: String },

    #[error("space {space} could not be selected: {reason}")]
    Space { space: String, reason: String },

    #[error("directory upload failed: {0}")]
    Upload(String),

    #[error("storage service returned an invalid content identifier {0:?}")]
    InvalidContentId(String),
}
