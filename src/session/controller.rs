use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use log::{error, info, warn};
use tokio::sync::Mutex;

use crate::config::UrlLogConfig;
use crate::export::LogExporter;
use crate::host::{PageProbe, TabHost};
use crate::logbook::{date_key, format_log_line, LogBook};
use crate::models::{MediaStateChanged, MediaSummary, TabChange, TabId, TabInfo};
use crate::settings::{SettingsStore, UserSettings};
use crate::store::KeyValueStore;

use super::advancer::advance;
use super::probe::{check_media_with_retry, RetryPolicy};
use super::SessionState;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// External pieces the coordinator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub host: Arc<dyn TabHost>,
    pub probe: Arc<dyn PageProbe>,
    pub store: Arc<dyn KeyValueStore>,
    pub exporter: Arc<dyn LogExporter>,
}

/// Process-wide authority over the logging session. Cheap to clone; all
/// clones share one `SessionState`.
#[derive(Clone)]
pub struct SessionCoordinator {
    state: Arc<Mutex<SessionState>>,
    host: Arc<dyn TabHost>,
    probe: Arc<dyn PageProbe>,
    pub(crate) log_book: LogBook,
    pub(crate) settings: SettingsStore,
    pub(crate) exporter: Arc<dyn LogExporter>,
    config: Arc<UrlLogConfig>,
    retry: RetryPolicy,
}

impl SessionCoordinator {
    pub fn new(collaborators: Collaborators, config: UrlLogConfig, initial: UserSettings) -> Self {
        let mut state = SessionState::new(initial.auto_switch);
        state.enabled = initial.enabled;

        Self {
            state: Arc::new(Mutex::new(state)),
            host: collaborators.host,
            probe: collaborators.probe,
            log_book: LogBook::new(collaborators.store.clone()),
            settings: SettingsStore::new(collaborators.store),
            exporter: collaborators.exporter,
            retry: RetryPolicy::from_timings(&config.timings),
            config: Arc::new(config),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn is_enabled(&self) -> bool {
        self.state.lock().await.enabled
    }

    pub async fn auto_switch_enabled(&self) -> bool {
        self.state.lock().await.auto_switch_enabled
    }

    pub(crate) async fn set_auto_switch(&self, enabled: bool) {
        self.state.lock().await.auto_switch_enabled = enabled;
    }

    pub fn log_book(&self) -> &LogBook {
        &self.log_book
    }

    pub async fn start_session(&self) {
        self.state.lock().await.begin();
        if let Err(err) = self.settings.set_enabled(true).await {
            warn!("Failed to persist session start: {err:?}");
        }
        info!("URL logging session started");

        let coordinator = self.clone();
        let settle_delay = self.config.timings.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(settle_delay).await;
            if let Err(err) = coordinator.log_active_tab().await {
                error!("Initial log check failed: {err:?}");
            }
        });
    }

    pub async fn stop_session(&self) {
        self.state.lock().await.end();
        if let Err(err) = self.settings.set_enabled(false).await {
            warn!("Failed to persist session stop: {err:?}");
        }
        info!("URL logging session stopped");
    }

    async fn log_active_tab(&self) -> Result<()> {
        if !self.is_enabled().await {
            return Ok(());
        }

        let active = self
            .host
            .active_tab()
            .await
            .context("failed to query the active tab")?;

        if let Some(TabInfo {
            id, url: Some(url), ..
        }) = active
        {
            self.log_current_url(&url, id, false).await?;
        }
        Ok(())
    }

    pub async fn on_tab_activated(&self, tab_id: TabId) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if !state.enabled {
                return Ok(());
            }
            state.clear_ended(tab_id);
        }

        let tab = self
            .host
            .get_tab(tab_id)
            .await
            .with_context(|| format!("failed to look up activated tab {tab_id}"))?;

        if let Some(url) = tab.and_then(|tab| tab.url) {
            self.log_current_url(&url, tab_id, false).await?;
        }
        Ok(())
    }

    pub async fn on_tab_updated(&self, tab_id: TabId, change: &TabChange, tab: &TabInfo) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if !state.enabled {
                return Ok(());
            }
            if change.navigated() {
                state.clear_ended(tab_id);
            }
        }

        if change.completed() && tab.active && tab.url.is_some() {
            let coordinator = self.clone();
            let settle_delay = self.config.timings.settle_delay;
            tokio::spawn(async move {
                tokio::time::sleep(settle_delay).await;
                if let Err(err) = coordinator.log_settled_tab(tab_id).await {
                    error!("Log check after navigation failed for tab {tab_id}: {err:?}");
                }
            });
        }
        Ok(())
    }

    /// Delayed half of a navigation: only log when the tab is still the
    /// active one once the page has settled.
    async fn log_settled_tab(&self, tab_id: TabId) -> Result<()> {
        if !self.is_enabled().await {
            return Ok(());
        }

        let tab = self
            .host
            .get_tab(tab_id)
            .await
            .with_context(|| format!("failed to look up tab {tab_id}"))?;

        match tab {
            Some(TabInfo {
                active: true,
                url: Some(url),
                ..
            }) => {
                self.log_current_url(&url, tab_id, false).await?;
            }
            _ => log_debug!("tab {tab_id} no longer active after settling; skipping"),
        }
        Ok(())
    }

    pub async fn on_tab_removed(&self, tab_id: TabId) {
        self.state.lock().await.clear_ended(tab_id);
    }

    pub async fn on_media_state_changed(&self, sender: &TabInfo, message: &MediaStateChanged) {
        if !sender.active || !self.is_enabled().await {
            return;
        }
        let Some(url) = sender.url.as_deref() else {
            return;
        };

        if message.is_playing {
            log_info!("Media playing on {url}");
            self.state.lock().await.clear_ended(sender.id);
            self.force_log(url, sender.id).await;
        } else if message.has_ended {
            log_info!("Media ended on {url}");
            self.force_log(url, sender.id).await;

            if message.details.has_ended_video() {
                let schedule = {
                    let mut state = self.state.lock().await;
                    state.auto_switch_enabled && state.mark_ended(sender.id)
                };
                if schedule {
                    self.schedule_advance(sender.id);
                }
            }
        }
    }

    async fn force_log(&self, url: &str, tab_id: TabId) {
        if let Err(err) = self.log_current_url(url, tab_id, true).await {
            error!("Failed to log {url}: {err:?}");
        }
    }

    fn schedule_advance(&self, tab_id: TabId) {
        let coordinator = self.clone();
        let advance_delay = self.config.timings.advance_delay;
        tokio::spawn(async move {
            tokio::time::sleep(advance_delay).await;

            let still_active = match coordinator.host.get_tab(tab_id).await {
                Ok(Some(tab)) => tab.active,
                Ok(None) => false,
                Err(err) => {
                    warn!("Could not re-check tab {tab_id} before switching: {err:?}");
                    false
                }
            };
            if !still_active {
                log_debug!("tab {tab_id} left the foreground; not advancing");
                return;
            }

            let auto_switch = coordinator.auto_switch_enabled().await;
            if let Err(err) = advance(coordinator.host.as_ref(), tab_id, auto_switch).await {
                error!("Failed to switch tab: {err:?}");
            }
        });
    }

    /// Probe the tab, decide whether its state is worth a line and append
    /// it to today's log. Returns whether a line was written. Nothing is
    /// written once the session has been stopped or restarted mid-probe.
    pub async fn log_current_url(&self, url: &str, tab_id: TabId, force: bool) -> Result<bool> {
        if url.is_empty() || self.config.is_privileged_url(url) {
            log_debug!("not logging privileged url {url}");
            return Ok(false);
        }

        let generation = {
            let state = self.state.lock().await;
            if !state.enabled {
                return Ok(false);
            }
            state.generation()
        };

        let media = check_media_with_retry(self.probe.as_ref(), tab_id, &self.retry).await;
        let current = MediaSummary::from(&media);

        // Held through the append so a STOP cannot land between the decision
        // and the record.
        let mut state = self.state.lock().await;
        if !state.is_current(generation) {
            log_debug!("session changed while probing tab {tab_id}; dropping result");
            return Ok(false);
        }
        if !state.should_log(url, &current, force) {
            return Ok(false);
        }

        let now = Local::now();
        let line = format_log_line(now, url, &media);
        self.log_book
            .append(&date_key(now), line.clone())
            .await
            .with_context(|| format!("failed to append log line for {url}"))?;

        state.record_logged(url, current);
        log_info!("Logged: {line}");
        Ok(true)
    }
}
