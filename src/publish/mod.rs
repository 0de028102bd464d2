//! Publish stage: upload a local directory tree to the storage network.

pub mod enumerate;
pub mod storage;

use crate::config::RunConfig;
use crate::error::PublishError;
use crate::results::PublishReport;
use crate::utils::gateway_url;

pub use enumerate::{enumerate_files, materialize};
pub use storage::{HttpStorageClient, StorageClient};

/// Authenticate, collect the upload roots and upload them as one directory
pub async fn publish(
    config: &RunConfig,
    client: &mut dyn StorageClient,
) -> Result<PublishReport, PublishError> {
    client
        .login(&config.storage.account)
        .await
        .inspect_err(|e| ::log::error!("Error logging in: {}", e))?;
    client
        .set_current_space(&config.storage.space)
        .await
        .inspect_err(|e| ::log::error!("Error selecting space: {}", e))?;

    let paths = enumerate_files(&config.upload_roots())
        .await
        .inspect_err(|e| ::log::error!("Error listing files: {}", e))?;
    if paths.is_empty() {
        return Err(PublishError::EmptyFileSet);
    }

    let files = materialize(&paths)
        .await
        .inspect_err(|e| ::log::error!("Error reading files: {}", e))?;

    ::log::info!("Uploading {} files", files.len());
    let content_id = client
        .upload_directory(&files)
        .await
        .inspect_err(|e| ::log::error!("Error uploading files: {}", e))?;

    let gateway_url = gateway_url(content_id.as_str(), &config.storage.gateway_domain);
    ::log::info!("Uploaded directory with CID: {}", gateway_url);

    Ok(PublishReport {
        content_id,
        gateway_url,
        file_count: files.len(),
    })
}
