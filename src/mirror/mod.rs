//! Mirror stage: fetch one page, download its assets and point the markup at the local copies.

pub mod fetch;
pub mod workspace;

use crate::config::RunConfig;
use crate::error::{ConfigError, MirrorError};
use crate::filter::AssetFilter;
use crate::parsers::{AssetParser, rewrite_assets};
use crate::results::{MirrorReport, ResolvedAsset};
use futures::stream::{self, TryStreamExt};
use std::collections::HashSet;

pub use fetch::HttpFetcher;
pub use workspace::Workspace;

/// Mirrors a single page into a local workspace
pub struct Mirror {
    origin: String,
    workspace: Workspace,
    filter: AssetFilter,
    fetcher: HttpFetcher,
    max_concurrency: usize,
}

impl Mirror {
    /// Build a mirror from a validated configuration
    pub fn from_config(config: &RunConfig) -> Result<Self, ConfigError> {
        config.validate_mirror()?;

        Ok(Self {
            origin: config.origin_url.trim().to_string(),
            workspace: Workspace::new(&config.workspace_dir),
            filter: config.asset_filter()?,
            fetcher: HttpFetcher::new(config.request_timeout()),
            max_concurrency: config.max_concurrency.max(1),
        })
    }

    /// Use a custom HTTP fetcher
    pub fn with_fetcher(mut self, fetcher: HttpFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Run every mirror step in order
    ///
    /// The markup is rewritten only after every asset download has
    /// succeeded; on failure the persisted markup still holds the page as fetched.
    pub async fn run(&self) -> Result<MirrorReport, MirrorError> {
        ::log::info!(
            "Mirroring {} into {}",
            self.origin,
            self.workspace.root().display()
        );

        self.workspace
            .prepare()
            .await
            .inspect_err(|e| ::log::error!("Error creating directories: {}", e))?;

        let markup = self.fetch_markup().await?;

        let index_path = self
            .workspace
            .write_markup(&markup)
            .await
            .inspect_err(|e| ::log::error!("Error saving HTML to file: {}", e))?
            .to_path_buf();
        ::log::info!("HTML downloaded and saved to {}", index_path.display());

        let persisted = self
            .workspace
            .read_markup()
            .await
            .inspect_err(|e| ::log::error!("Error reading saved HTML: {}", e))?;

        let parser = AssetParser::new(&self.origin, &self.filter);
        let (assets, discovered) = parser.resolve_all(&persisted);
        ::log::info!(
            "Found {} assets ({} elements skipped)",
            assets.len(),
            discovered.skipped.len()
        );

        let collisions = count_collisions(&assets);

        self.fetch_assets(&assets)
            .await
            .inspect_err(|e| ::log::error!("Error downloading assets: {}", e))?;

        let rewritten = rewrite_assets(&persisted, &assets);
        self.workspace
            .write_markup(&rewritten)
            .await
            .inspect_err(|e| ::log::error!("Error saving updated HTML: {}", e))?;
        ::log::info!("HTML updated successfully");

        Ok(MirrorReport {
            index_path,
            workspace_dir: self.workspace.root().to_path_buf(),
            assets,
            skipped: discovered.skipped,
            collisions,
        })
    }

    /// GET the origin page
    async fn fetch_markup(&self) -> Result<String, MirrorError> {
        self.fetcher
            .get_text(&self.origin)
            .await
            .inspect_err(|e| ::log::error!("Error downloading the HTML: {}", e))
    }

    /// Download every asset with at most `max_concurrency` requests in flight
    ///
    /// The first failure ends the stage; downloads still in flight are dropped.
    async fn fetch_assets(&self, assets: &[ResolvedAsset]) -> Result<(), MirrorError> {
        stream::iter(assets.iter().map(Ok::<_, MirrorError>))
            .try_for_each_concurrent(self.max_concurrency, |asset| self.fetch_asset(asset))
            .await
    }

    async fn fetch_asset(&self, asset: &ResolvedAsset) -> Result<(), MirrorError> {
        let contents = self
            .fetcher
            .get_bytes(&asset.absolute_url)
            .await
            .inspect_err(|e| {
                ::log::error!(
                    "Error downloading resource from {}: {}",
                    asset.absolute_url,
                    e
                )
            })?;

        let path = self
            .workspace
            .write_asset(&asset.filename, &contents)
            .await
            .inspect_err(|e| ::log::error!("Error saving resource {}: {}", asset.filename, e))?;
        ::log::info!("Resource downloaded successfully: {}", path.display());
        Ok(())
    }
}

/// Counts assets whose filename was already claimed by an earlier asset
///
/// Colliding downloads overwrite each other and run concurrently, so the
/// file left on disk is whichever finished last and is not deterministic.
fn count_collisions(assets: &[ResolvedAsset]) -> usize {
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut sources: HashSet<(&str, &str)> = HashSet::new();
    let mut collisions = 0;

    for asset in assets {
        let source = (asset.filename.as_str(), asset.absolute_url.as_str());
        let fresh_source = sources.insert(source);
        if !claimed.insert(asset.filename.as_str()) && fresh_source {
            ::log::warn!(
                "Asset {} shares the filename {} with another asset; \
                 the surviving file depends on download order",
                asset.absolute_url,
                asset.filename
            );
            collisions += 1;
        }
    }

    collisions
}
