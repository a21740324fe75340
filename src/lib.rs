//! Browser companion that keeps a per-day log of the pages a user views,
//! annotated with whether they were playing media, and can move on to the
//! next tab when a video finishes.
//!
//! Two halves talk over message channels only:
//! - [`sensing`] runs inside each page: it scans the DOM for media elements
//!   and reports playing/ended flips.
//! - [`session`] runs once in the background: it re-probes the active tab,
//!   de-duplicates log lines, persists them and drives tab auto-advance.
//!
//! The host browser plugs in through [`host::TabHost`], [`host::PageProbe`],
//! [`sensing::MediaSource`] and [`sensing::PageOutbox`].

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod host;
pub mod logbook;
pub mod models;
pub mod sensing;
pub mod session;
pub mod settings;
pub mod store;
pub mod utils;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::info;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use config::UrlLogConfig;
use db::Database;
use export::FileExporter;
use host::{PageProbe, TabHost};
use models::{ControlRequest, ControlResponse};
use session::{event_loop, Collaborators, HostEvent, SessionCoordinator};
use settings::SettingsStore;

pub use utils::logging::init_logging;

const EVENT_QUEUE_DEPTH: usize = 256;

/// A running background coordinator and the channel feeding it.
pub struct UrlLog {
    coordinator: SessionCoordinator,
    events: mpsc::Sender<HostEvent>,
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl UrlLog {
    /// Open the SQLite store under `config.data_dir`, export into
    /// `config.export_dir`, and start the coordinator.
    pub async fn launch_with_database(
        config: UrlLogConfig,
        host: Arc<dyn TabHost>,
        probe: Arc<dyn PageProbe>,
    ) -> Result<Self> {
        init_logging(config.log_level);
        info!("urllog starting up...");

        let db_path = config.database_path();
        let database = tokio::task::spawn_blocking(move || Database::new(db_path))
            .await
            .context("database open worker join failed")??;

        let collaborators = Collaborators {
            host,
            probe,
            store: Arc::new(database),
            exporter: Arc::new(FileExporter::new(config.export_dir.clone())),
        };

        Self::launch(config, collaborators).await
    }

    pub async fn launch(config: UrlLogConfig, collaborators: Collaborators) -> Result<Self> {
        let settings = SettingsStore::new(collaborators.store.clone());
        settings
            .install_defaults()
            .await
            .context("failed to install default settings")?;
        let initial = settings.load().await?;

        if initial.enabled {
            info!("Resuming URL logging session from a previous run");
        }

        let coordinator = SessionCoordinator::new(collaborators, config, initial);
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(event_loop(
            coordinator.clone(),
            events_rx,
            cancel_token.clone(),
        ));

        Ok(Self {
            coordinator,
            events: events_tx,
            cancel_token,
            handle: Some(handle),
        })
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }

    /// Sender for host tab, page and control events.
    pub fn events(&self) -> mpsc::Sender<HostEvent> {
        self.events.clone()
    }

    /// Submit a control request through the event channel and wait for
    /// its answer.
    pub async fn control(&self, request: ControlRequest) -> Result<ControlResponse> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.events
            .send(HostEvent::Control {
                request,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| anyhow!("coordinator event loop is not running"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("coordinator dropped the control request"))
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("coordinator event loop failed to join")?;
        }
        Ok(())
    }
}

impl Drop for UrlLog {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
