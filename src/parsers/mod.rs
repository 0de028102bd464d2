pub mod html;


use crate::filter::AssetFilter;
use crate::results::{DiscoveredAssets, ResolvedAsset};
use crate::utils::{asset_filename, local_asset_path, resolve_asset_url};

pub use html::{discover_assets, rewrite_assets};

/// Scans markup and resolves every reference against the origin
pub struct AssetParser<'a> {
    origin: &'a str,
    filter: &'a AssetFilter,
}

impl<'a> AssetParser<'a> {
    /// Creates a parser for pages served from `origin`
    pub fn new(origin: &'a str, filter: &'a AssetFilter) -> Self {
        Self { origin, filter }
    }

    /// Discover asset references in the markup
    pub fn discover(&self, markup: &str) -> DiscoveredAssets {
        html::discover_assets(markup, self.filter)
    }

    /// Discover and resolve in one pass
    pub fn resolve_all(&self, markup: &str) -> (Vec<ResolvedAsset>, DiscoveredAssets) {
        let discovered = self.discover(markup);
        let resolved = discovered
            .references
            .iter()
            .map(|reference| {
                let absolute_url = resolve_asset_url(self.origin, &reference.original_url);
                let filename = asset_filename(&reference.original_url);
                ResolvedAsset {
                    reference: reference.clone(),
                    local_path: local_asset_path(&filename),
                    absolute_url,
                    filename,
                }
            })
            .collect();

        (resolved, discovered)
    }
}
