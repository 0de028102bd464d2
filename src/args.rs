use clap::Parser;
use pin_page::{ConfigError, RunConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pin-page")]
#[command(about = "Mirror a web page with its assets and publish it to content-addressed storage")]
#[command(version)]
pub struct Args {
    /// JSON configuration file (environment and flags override its values)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Page to mirror [env: WEBSITE]
    #[arg(short, long)]
    pub url: Option<String>,

    /// Working directory for the mirrored page [env: MIRROR_DIR]
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Maximum number of concurrent asset downloads [env: MIRROR_CONCURRENCY]
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Storage account identity [env: EMAIL]
    #[arg(long)]
    pub account: Option<String>,

    /// Storage space identity [env: SPACE]
    #[arg(long)]
    pub space: Option<String>,

    /// Base URL of the upload service [env: STORAGE_ENDPOINT]
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Gateway domain used for the retrieval link [env: GATEWAY_DOMAIN]
    #[arg(long)]
    pub gateway: Option<String>,

    /// Only mirror the page; skip the upload
    #[arg(long, default_value_t = false)]
    pub mirror_only: bool,
}

impl Args {
    /// Resolve the run configuration: file, then environment, then flags
    pub fn to_config(&self) -> Result<RunConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?.with_env(|key| std::env::var(key).ok())?,
            None => RunConfig::from_env()?,
        };

        if let Some(url) = &self.url {
            config.origin_url = url.clone();
        }
        if let Some(workspace) = &self.workspace {
            config.workspace_dir = workspace.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
        if let Some(account) = &self.account {
            config.storage.account = account.clone();
        }
        if let Some(space) = &self.space {
            config.storage.space = space.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.storage.endpoint = endpoint.clone();
        }
        if let Some(gateway) = &self.gateway {
            config.storage.gateway_domain = gateway.clone();
        }

        Ok(config)
    }
}
