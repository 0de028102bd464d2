pub mod config;
pub mod error;
pub mod filter;
pub mod mirror;
pub mod parsers;
pub mod publish;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::RunConfig;
pub use error::{ConfigError, MirrorError, PublishError};
pub use results::{MirrorReport, PublishReport, RunOutcome};

use mirror::{HttpFetcher, Mirror};
use publish::{HttpStorageClient, StorageClient};

/// Builder that runs the mirror stage and then the publish stage
pub struct Pipeline {
    config: RunConfig,
    mirror_only: bool,
    fetcher: Option<HttpFetcher>,
    storage: Option<Box<dyn StorageClient>>,
}

impl Pipeline {
    /// Create a new pipeline for the given configuration
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            mirror_only: false,
            fetcher: None,
            storage: None,
        }
    }

    /// Set the maximum number of concurrent asset downloads
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Stop after the mirror stage
    pub fn mirror_only(mut self, mirror_only: bool) -> Self {
        self.mirror_only = mirror_only;
        self
    }

    /// Use a custom HTTP fetcher for the mirror stage
    pub fn with_fetcher(mut self, fetcher: HttpFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use a custom storage client for the publish stage
    pub fn with_storage_client(mut self, client: Box<dyn StorageClient>) -> Self {
        self.storage = Some(client);
        self
    }

    /// Configuration the pipeline will run with
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run both stages in order
    ///
    /// Configuration problems are returned as `Err` before any I/O happens.
    /// Stage failures are logged and reported through the returned `RunOutcome`.
    pub async fn run(self) -> Result<RunOutcome, ConfigError> {
        if self.mirror_only {
            self.config.validate_mirror()?;
        } else {
            self.config.validate()?;
        }

        let mut mirror = Mirror::from_config(&self.config)?;
        if let Some(fetcher) = self.fetcher {
            mirror = mirror.with_fetcher(fetcher);
        }

        let mirror_report = match mirror.run().await {
            Ok(report) => report,
            Err(e) => {
                ::log::error!("Mirror stage failed: {}", e);
                return Ok(RunOutcome::MirrorFailed(e));
            }
        };
        ::log::info!(
            "HTML and resources processing completed successfully ({} assets)",
            mirror_report.assets.len()
        );

        if self.mirror_only {
            return Ok(RunOutcome::Mirrored(mirror_report));
        }

        let mut storage: Box<dyn StorageClient> = match self.storage {
            Some(client) => client,
            None => Box::new(HttpStorageClient::new(
                &self.config.storage,
                self.config.request_timeout(),
            )),
        };

        match publish::publish(&self.config, storage.as_mut()).await {
            Ok(publish_report) => Ok(RunOutcome::Succeeded {
                mirror: mirror_report,
                publish: publish_report,
            }),
            Err(e) => {
                ::log::error!(
                    "Publish stage failed, {} left in place: {}",
                    mirror_report.workspace_dir.display(),
                    e
                );
                Ok(RunOutcome::PublishFailed {
                    mirror: mirror_report,
                    error: e,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::storage::testing::RecordingStorageClient;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve_page(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><img src="/logo.png"><script src="/app.js"></script></body></html>"#,
            ))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 16]))
            .mount(server)
            .await;
    }

    async fn serve_script(server: &MockServer, status: u16) {
        Mock::given(method("GET"))
            .and(path("/app.js"))
            .respond_with(ResponseTemplate::new(status).set_body_string("void 0"))
            .mount(server)
            .await;
    }

    fn config_for(server: &MockServer, root: &std::path::Path) -> RunConfig {
        let mut config = RunConfig::new(&server.uri());
        config.workspace_dir = root.to_path_buf();
        config.storage.account = "me@example.com".to_string();
        config.storage.space = "did:key:z6Mkspace".to_string();
        config
    }

    #[tokio::test]
    async fn test_pipeline_succeeds() {
        let server = MockServer::start().await;
        serve_page(&server).await;
        serve_script(&server, 200).await;
        let dir = tempfile::tempdir().unwrap();
        let client = RecordingStorageClient::default();

        let outcome = Pipeline::new(config_for(&server, dir.path()))
            .with_storage_client(Box::new(client.clone()))
            .run()
            .await
            .unwrap();

        match &outcome {
            RunOutcome::Succeeded { mirror, publish } => {
                assert_eq!(mirror.assets.len(), 2);
                assert_eq!(publish.file_count, 3);
                assert_eq!(publish.gateway_url, "https://bafytestroot.ipfs.w3s.link/");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(
            *client.uploaded.lock().unwrap(),
            vec!["assets/app.js", "assets/logo.png", "index.html"]
        );
    }

    #[tokio::test]
    async fn test_mirror_failure_skips_publish() {
        let server = MockServer::start().await;
        serve_page(&server).await;
        serve_script(&server, 500).await;
        let dir = tempfile::tempdir().unwrap();
        let client = RecordingStorageClient::default();

        let outcome = Pipeline::new(config_for(&server, dir.path()))
            .with_storage_client(Box::new(client.clone()))
            .run()
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::MirrorFailed(MirrorError::Status { status: 500, .. })
        ));
        assert_eq!(outcome.exit_code(), 2);
        assert!(client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_keeps_workspace() {
        let server = MockServer::start().await;
        serve_page(&server).await;
        serve_script(&server, 200).await;
        let dir = tempfile::tempdir().unwrap();
        let client = RecordingStorageClient {
            fail_upload: true,
            ..RecordingStorageClient::default()
        };

        let outcome = Pipeline::new(config_for(&server, dir.path()))
            .with_storage_client(Box::new(client))
            .run()
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::PublishFailed {
                error: PublishError::Upload(_),
                ..
            }
        ));
        assert_eq!(outcome.exit_code(), 3);
        assert!(dir.path().join("index.html").is_file());
        assert!(dir.path().join("assets/logo.png").is_file());
    }

    #[tokio::test]
    async fn test_mirror_only_needs_no_credentials() {
        let server = MockServer::start().await;
        serve_page(&server).await;
        serve_script(&server, 200).await;
        let dir = tempfile::tempdir().unwrap();

        let mut config = RunConfig::new(&server.uri());
        config.workspace_dir = dir.path().to_path_buf();

        let pipeline = Pipeline::new(config)
            .mirror_only(true)
            .with_max_concurrency(1)
            .with_fetcher(HttpFetcher::from_client(reqwest::Client::new()));
        assert_eq!(pipeline.config().max_concurrency, 1);

        let outcome = pipeline.run().await.unwrap();
        assert!(matches!(outcome, RunOutcome::Mirrored(_)));
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_missing_config_fails_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RunConfig::default();
        config.workspace_dir = dir.path().join("never");

        let result = Pipeline::new(config).run().await;
        assert!(matches!(result, Err(ConfigError::MissingValue(_))));
        assert!(!dir.path().join("never").exists());
    }
}
