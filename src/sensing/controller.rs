use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Timings;

use super::notifier::{notifier_loop, MediaSource, NotifierExit, PageEvent, PageOutbox};

/// Owns the notifier task of one page context. Dropping the controller
/// releases the task together with its timers.
pub struct NotifierController {
    handle: Option<JoinHandle<NotifierExit>>,
    cancel_token: Option<CancellationToken>,
}

impl NotifierController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn start(
        &mut self,
        source: Arc<dyn MediaSource>,
        outbox: Arc<dyn PageOutbox>,
        events: mpsc::Receiver<PageEvent>,
        timings: Timings,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("page notifier already active");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(notifier_loop(
            source,
            outbox,
            events,
            timings,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Stop the notifier and report why its loop ended.
    pub async fn stop(&mut self) -> Result<Option<NotifierExit>> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        match self.handle.take() {
            Some(handle) => {
                let exit = handle.await.context("page notifier task failed to join")?;
                info!("Page notifier stopped: {exit:?}");
                Ok(Some(exit))
            }
            None => Ok(None),
        }
    }
}

impl Default for NotifierController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NotifierController {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}
