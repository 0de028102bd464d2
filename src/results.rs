use crate::error::{MirrorError, PublishError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kinds of elements that reference a page asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// `<img src>`
    Image,
    /// `<link rel="stylesheet" href>`
    Stylesheet,
    /// `<script src>`
    Script,
}

impl AssetKind {
    /// Maps a tag name to an asset kind
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "img" => Some(AssetKind::Image),
            "link" => Some(AssetKind::Stylesheet),
            "script" => Some(AssetKind::Script),
            _ => None,
        }
    }

    /// Name of the element this kind is read from
    pub fn tag(&self) -> &'static str {
        match self {
            AssetKind::Image => "img",
            AssetKind::Stylesheet => "link",
            AssetKind::Script => "script",
        }
    }

    /// Attribute that carries the asset URL
    pub fn attribute(&self) -> &'static str {
        match self {
            AssetKind::Image | AssetKind::Script => "src",
            AssetKind::Stylesheet => "href",
        }
    }
}

/// An asset URL read from a page element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    /// Position of the element among the page's candidate elements
    pub element_index: usize,

    pub kind: AssetKind,

    /// Attribute value exactly as written in the markup
    pub original_url: String,
}

/// Why a candidate element does not take part in mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The URL attribute is absent or empty
    MissingAttribute,
    /// Inline or otherwise non-fetchable URL (`data:`, `javascript:`, ...)
    NotFetchable,
    /// Matched a configured exclude pattern
    Excluded,
}

/// A candidate element left untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedElement {
    pub element_index: usize,
    pub kind: AssetKind,
    pub reason: SkipReason,
}

/// Outcome of scanning a page for assets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredAssets {
    pub references: Vec<AssetReference>,
    pub skipped: Vec<SkippedElement>,
}

/// A reference with its fetch URL and local destination decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAsset {
    pub reference: AssetReference,

    /// Absolute URL the asset is fetched from
    pub absolute_url: String,

    /// Basename the asset is stored under in the assets directory
    pub filename: String,

    /// Site-root path written back into the markup, e.g. `/assets/logo.png`
    pub local_path: String,
}

/// Summary of a completed mirror
#[derive(Debug, Clone)]
pub struct MirrorReport {
    /// Rewritten markup file
    pub index_path: PathBuf,

    /// Root of the working directory
    pub workspace_dir: PathBuf,

    pub assets: Vec<ResolvedAsset>,
    pub skipped: Vec<SkippedElement>,

    /// Number of assets that share a filename with an earlier asset
    pub collisions: usize,
}

/// A file ready to be sent to the storage service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Absolute path on local disk
    pub path: PathBuf,

    /// `/`-separated path inside the uploaded directory
    pub name: String,

    pub contents: Vec<u8>,
}

/// Address the storage network assigns to an uploaded directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Validates an identifier returned by the storage service
    pub fn parse(raw: &str) -> Result<Self, PublishError> {
        let raw = raw.trim();
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PublishError::InvalidContentId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Summary of a completed upload
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub content_id: ContentId,

    /// Public retrieval link
    pub gateway_url: String,

    pub file_count: usize,
}

/// Terminal state of a pipeline run
#[derive(Debug)]
pub enum RunOutcome {
    /// Mirrored and uploaded
    Succeeded {
        mirror: MirrorReport,
        publish: PublishReport,
    },
    /// Mirrored with publishing disabled
    Mirrored(MirrorReport),
    /// Mirror stage failed; nothing was uploaded
    MirrorFailed(MirrorError),
    /// Upload failed; the working directory is left in place
    PublishFailed {
        mirror: MirrorReport,
        error: PublishError,
    },
}

impl RunOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Succeeded { .. } | RunOutcome::Mirrored(_) => 0,
            RunOutcome::MirrorFailed(_) => 2,
            RunOutcome::PublishFailed { .. } => 3,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }
}
