//! Wiring of configuration, storage, platform clients and the session
//! controller for one CLI invocation.

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use inkleaf_config::{init_logging, Config, Paths};
use inkleaf_storage::{create_scopes, StorageScopes};
use platform_client::memory::{MemoryAuthService, MemoryDataStore};
use platform_client::supabase::{SupabaseAuthClient, SupabaseEndpoint, SupabaseRestClient};
use platform_client::{AuthService, DataStore};
use session_controller::{SessionConfig, SessionController, SessionSnapshot};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Options {
    pub base_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub offline: bool,
    pub format: OutputFormat,
}

pub struct App {
    pub format: OutputFormat,
    pub offline: bool,
    pub config: Config,
    pub data: Arc<dyn DataStore>,
    pub session: SessionController,
}

impl App {
    /// Load config, start logging and start the session controller.
    pub fn connect(options: Options) -> Result<Self> {
        let paths = match options.base_dir {
            Some(dir) => Paths::with_base_dir(dir),
            None => Paths::new()?,
        };
        paths.ensure_dirs()?;

        let config = Config::load(&paths).context("failed to load configuration")?;
        let level = options
            .log_level
            .unwrap_or_else(|| config.log_level.clone());
        init_logging(&paths, &level);

        let (auth, data, storage) = if options.offline {
            debug!("using in-process services");
            let auth: Arc<dyn AuthService> = Arc::new(MemoryAuthService::new());
            let data: Arc<dyn DataStore> = Arc::new(MemoryDataStore::new());
            (auth, data, StorageScopes::in_memory())
        } else {
            let storage = create_scopes(&paths.persistent_store_file())
                .context("failed to open local storage")?;
            let endpoint =
                SupabaseEndpoint::new(config.supabase_url()?, config.platform.anon_key.clone());
            let auth: Arc<dyn AuthService> = Arc::new(SupabaseAuthClient::new(
                endpoint.clone(),
                storage.persistent.clone(),
            )?);
            let data: Arc<dyn DataStore> =
                Arc::new(SupabaseRestClient::new(endpoint).with_auth(auth.clone()));
            (auth, data, storage)
        };

        let session = SessionController::start(
            auth,
            data.clone(),
            storage,
            SessionConfig::from_config(&config),
        );
        info!(offline = options.offline, "cli session started");

        Ok(Self {
            format: options.format,
            offline: options.offline,
            config,
            data,
            session,
        })
    }

    /// Snapshot once restore has finished.
    pub async fn settled(&self) -> Result<SessionSnapshot> {
        Ok(self.session.wait_until_settled().await?)
    }
}
