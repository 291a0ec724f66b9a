//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use skysync_core::{ConstituentSyncTask, LoggingRecordSink, SyncTask, TokenStore};
use skysync_domain::{Config, Result};
use skysync_infra::{
    ConstituentsClient, FileTokenStore, HttpClient, KeyFileProtector, SkyAuthClient,
    SyncScheduler, SyncSchedulerConfig,
};
use tracing::info;

use crate::utils::logging::redact_token;

/// Application context - holds all services and dependencies
pub struct AppContext {
    /// Encrypted state file shared by the clients and the sync task
    pub store: Arc<FileTokenStore>,
    /// Where fetched records end up
    pub sink: Arc<LoggingRecordSink>,
    /// Drives the sync cycles
    pub scheduler: SyncScheduler,
}

impl AppContext {
    /// Wire the store, the SKY API clients and the scheduler from `config`.
    ///
    /// # Errors
    /// Fails when the key file cannot be read or created, when the HTTP
    /// client cannot be built, or when a configured base URI is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        let key_path = config.storage.resolved_key_path();
        let protector = Arc::new(KeyFileProtector::open_or_create(&key_path)?);
        info!(
            state = %config.storage.state_path.display(),
            key = %key_path.display(),
            fingerprint = %protector.fingerprint(),
            "Opening token store"
        );
        let store = Arc::new(FileTokenStore::open(&config.storage.state_path, protector));

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.sync.request_timeout_seconds))
            .build()?;
        let auth = Arc::new(SkyAuthClient::new(http.clone(), &config.sky, store.clone())?);
        let source = Arc::new(ConstituentsClient::new(http, &config.sky, store.clone(), auth)?);

        let sink = Arc::new(LoggingRecordSink::new());
        let constituents: Arc<dyn SyncTask> =
            Arc::new(ConstituentSyncTask::new(store.clone(), source, sink.clone()));
        let scheduler =
            SyncScheduler::new(vec![constituents], SyncSchedulerConfig::from(&config.sync));

        Ok(Self { store, sink, scheduler })
    }

    /// Forget stored tokens and start over from `refresh_token`.
    ///
    /// # Errors
    /// Returns the store's error if the new token cannot be persisted.
    pub fn seed_refresh_token(&self, refresh_token: &str) -> Result<()> {
        info!(token = %redact_token(refresh_token), "Setting initial refresh token");
        self.store.clear_tokens();
        self.store.set_refresh_token(Some(refresh_token))
    }
}
