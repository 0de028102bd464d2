use crate::error::PublishError;
use crate::results::UploadFile;
use std::path::{Path, PathBuf};

/// Collects the absolute path of every regular file under the given roots
///
/// Each root is walked depth-first; entries within a directory are visited
/// in name order so the result is stable across runs. Symlinks to regular
/// files are collected under their link path; symlinked directories are not
/// descended into.
pub async fn enumerate_files(roots: &[PathBuf]) -> Result<Vec<PathBuf>, PublishError> {
    let mut files = Vec::new();

    for root in roots {
        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|source| PublishError::Enumerate {
                path: root.clone(),
                source,
            })?;
        collect_files(&root, &mut files).await?;
    }

    ::log::info!("Found {} files", files.len());
    Ok(files)
}

async fn collect_files(root: &Path, files: &mut Vec<PathBuf>) -> Result<(), PublishError> {
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let enumerate_err = |source: std::io::Error| PublishError::Enumerate {
            path: dir.clone(),
            source,
        };

        let mut entries = Vec::new();
        let mut reader = tokio::fs::read_dir(&dir).await.map_err(enumerate_err)?;
        while let Some(entry) = reader.next_entry().await.map_err(enumerate_err)? {
            let file_type = entry.file_type().await.map_err(enumerate_err)?;
            entries.push((entry.path(), file_type));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut subdirs = Vec::new();
        for (path, file_type) in entries {
            if file_type.is_dir() {
                subdirs.push(path);
            } else if file_type.is_file() {
                files.push(path);
            } else if file_type.is_symlink() && is_regular_file(&path).await {
                files.push(path);
            } else {
                ::log::warn!("Skipping non-regular file: {}", path.display());
            }
        }

        // Reversed so the first subdirectory is popped first
        pending.extend(subdirs.into_iter().rev());
    }

    Ok(())
}

/// Whether the path resolves to a regular file once links are followed
async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

/// Reads each file and names it relative to the files' common parent directory
pub async fn materialize(paths: &[PathBuf]) -> Result<Vec<UploadFile>, PublishError> {
    let Some(base) = common_parent(paths) else {
        return Ok(Vec::new());
    };

    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| PublishError::Materialize {
                path: path.clone(),
                source,
            })?;

        uploads.push(UploadFile {
            path: path.clone(),
            name: relative_name(path, &base),
            contents,
        });
    }

    Ok(uploads)
}

/// Deepest directory containing every path
fn common_parent(paths: &[PathBuf]) -> Option<PathBuf> {
    let mut base = paths.first()?.parent()?.to_path_buf();
    for path in &paths[1..] {
        while !path.starts_with(&base) {
            if !base.pop() {
                break;
            }
        }
    }
    Some(base)
}

fn relative_name(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
