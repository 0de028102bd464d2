use crate::error::MirrorError;
use crate::utils::{ASSETS_DIR, INDEX_FILE};
use std::path::{Path, PathBuf};

/// Local directory tree holding one mirrored page
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    assets_dir: PathBuf,
    index_path: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            assets_dir: root.join(ASSETS_DIR),
            index_path: root.join(INDEX_FILE),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Where an asset with this filename is stored
    pub fn asset_path(&self, filename: &str) -> PathBuf {
        self.assets_dir.join(filename)
    }

    /// Create the workspace and its assets directory if they don't exist
    pub async fn prepare(&self) -> Result<(), MirrorError> {
        for dir in [&self.root, &self.assets_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| MirrorError::CreateDirectory {
                    path: dir.clone(),
                    source,
                })?;
            ::log::info!("Directory created or already exists: {}", dir.display());
        }
        Ok(())
    }

    /// Overwrite the markup file
    pub async fn write_markup(&self, markup: &str) -> Result<&Path, MirrorError> {
        write_file(&self.index_path, markup.as_bytes()).await?;
        Ok(&self.index_path)
    }

    pub async fn read_markup(&self) -> Result<String, MirrorError> {
        tokio::fs::read_to_string(&self.index_path)
            .await
            .map_err(|source| MirrorError::ReadFile {
                path: self.index_path.clone(),
                source,
            })
    }

    /// Store an asset body under the assets directory
    pub async fn write_asset(
        &self,
        filename: &str,
        contents: &[u8],
    ) -> Result<PathBuf, MirrorError> {
        let path = self.asset_path(filename);
        write_file(&path, contents).await?;
        Ok(path)
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), MirrorError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| MirrorError::WriteFile {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("site"));

        workspace.prepare().await.unwrap();
        workspace.prepare().await.unwrap();

        assert!(workspace.root().is_dir());
        assert!(workspace.assets_dir().is_dir());
        assert_eq!(
            workspace.assets_dir(),
            dir.path().join("site").join("assets")
        );
    }

    #[tokio::test]
    async fn test_prepare_fails_when_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("occupied");
        std::fs::write(&root, b"not a directory").unwrap();

        let result = Workspace::new(&root).prepare().await;
        assert!(matches!(result, Err(MirrorError::CreateDirectory { .. })));
    }

    #[tokio::test]
    async fn test_markup_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        workspace.prepare().await.unwrap();

        let path = workspace.write_markup("<html></html>").await.unwrap();
        assert_eq!(path, workspace.index_path());
        assert_eq!(path, dir.path().join("index.html"));
        assert_eq!(workspace.read_markup().await.unwrap(), "<html></html>");
    }

    #[tokio::test]
    async fn test_write_asset_without_prepare_fails() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("never-created"));

        let result = workspace.write_asset("logo.png", b"png").await;
        assert!(matches!(result, Err(MirrorError::WriteFile { .. })));
    }
}
