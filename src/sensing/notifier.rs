//! In-page watcher that rescans for media and tells the coordinator when
//! the playing/ended pair flips.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::Timings;
use crate::error::ChannelError;
use crate::models::{MediaSnapshot, MediaStateChanged, PageMessage};

use super::dom::{Document, Element};
use super::scanner::scan;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Live view of the page the notifier runs in.
pub trait MediaSource: Send + Sync {
    fn document(&self) -> Result<Document>;
}

/// Page to background channel.
#[async_trait]
pub trait PageOutbox: Send + Sync {
    async fn send(&self, message: PageMessage) -> Result<(), ChannelError>;

    /// `false` once the host channel is known to be gone.
    fn is_connected(&self) -> bool {
        true
    }
}

#[async_trait]
impl PageOutbox for mpsc::Sender<PageMessage> {
    async fn send(&self, message: PageMessage) -> Result<(), ChannelError> {
        mpsc::Sender::send(self, message)
            .await
            .map_err(ChannelError::from)
    }

    fn is_connected(&self) -> bool {
        !self.is_closed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEventKind {
    Play,
    Pause,
    Ended,
}

/// Signals delivered by the page runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// A `play`/`pause`/`ended` event seen in the capturing phase.
    Media(MediaEventKind),
    /// Nodes inserted by a DOM mutation.
    NodesAdded(Vec<Element>),
    VisibilityChanged { hidden: bool },
    /// The document finished loading.
    Ready,
    Unload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierExit {
    Cancelled,
    Unloaded,
    EventsClosed,
    /// The host channel is gone; the page must reload to notify again.
    ContextInvalidated,
}

/// Last playing/ended pair reported to the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageNotificationState {
    pub last_playing: bool,
    pub last_ended: bool,
}

impl PageNotificationState {
    /// Returns the notification to send when the pair changed, updating the
    /// remembered pair before anything is sent.
    pub fn observe(&mut self, snapshot: MediaSnapshot) -> Option<MediaStateChanged> {
        let is_playing = snapshot.has_playing();
        let has_ended = snapshot.has_ended();

        if is_playing == self.last_playing && has_ended == self.last_ended {
            return None;
        }

        self.last_playing = is_playing;
        self.last_ended = has_ended;
        Some(MediaStateChanged::from_snapshot(snapshot))
    }
}

/// Answer a `CHECK_MEDIA` probe. A page that cannot be read reports nothing.
pub fn respond_to_probe(source: &dyn MediaSource) -> MediaSnapshot {
    match source.document() {
        Ok(document) => scan(&document),
        Err(err) => {
            log_warn!("media probe could not read the page: {err:?}");
            MediaSnapshot::empty()
        }
    }
}

pub async fn notifier_loop(
    source: Arc<dyn MediaSource>,
    outbox: Arc<dyn PageOutbox>,
    mut events: mpsc::Receiver<PageEvent>,
    timings: Timings,
    cancel_token: CancellationToken,
) -> NotifierExit {
    let mut ticker = tokio::time::interval_at(
        Instant::now() + timings.rescan_interval,
        timings.rescan_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut state = PageNotificationState::default();
    let mut debounce_at: Option<Instant> = None;
    let mut initial_at: Option<Instant> = None;
    let mut hidden = false;

    loop {
        let rescan = tokio::select! {
            _ = cancel_token.cancelled() => {
                log_debug!("page notifier cancelled");
                return NotifierExit::Cancelled;
            }
            event = events.recv() => match event {
                None => return NotifierExit::EventsClosed,
                Some(PageEvent::Unload) => return NotifierExit::Unloaded,
                Some(PageEvent::Media(kind)) => {
                    log_debug!("media event {kind:?}");
                    true
                }
                Some(PageEvent::NodesAdded(nodes)) => {
                    if !hidden && nodes.iter().any(Element::is_or_contains_media) {
                        // Trailing debounce: every qualifying mutation pushes
                        // the deadline out again.
                        debounce_at = Some(Instant::now() + timings.mutation_debounce);
                    }
                    false
                }
                Some(PageEvent::VisibilityChanged { hidden: now_hidden }) => {
                    hidden = now_hidden;
                    if hidden {
                        debounce_at = None;
                        false
                    } else {
                        true
                    }
                }
                Some(PageEvent::Ready) => {
                    initial_at = Some(Instant::now() + timings.initial_check_delay);
                    false
                }
            },
            _ = ticker.tick() => true,
            _ = wait_for(debounce_at), if debounce_at.is_some() => {
                debounce_at = None;
                true
            }
            _ = wait_for(initial_at), if initial_at.is_some() => {
                initial_at = None;
                true
            }
        };

        if rescan {
            if let Err(exit) = rescan_and_notify(&*source, &*outbox, &mut state).await {
                return exit;
            }
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn rescan_and_notify(
    source: &dyn MediaSource,
    outbox: &dyn PageOutbox,
    state: &mut PageNotificationState,
) -> Result<(), NotifierExit> {
    if !outbox.is_connected() {
        log_info!("host channel gone; page notifier stopping");
        return Err(NotifierExit::ContextInvalidated);
    }

    let document = match source.document() {
        Ok(document) => document,
        Err(err) => {
            log_warn!("page rescan failed: {err:?}");
            return Ok(());
        }
    };

    let Some(change) = state.observe(scan(&document)) else {
        return Ok(());
    };

    log_debug!(
        "media state changed: playing={} ended={}",
        change.is_playing,
        change.has_ended
    );

    match outbox.send(PageMessage::MediaStateChanged(change)).await {
        Ok(()) => Ok(()),
        Err(ChannelError::ContextInvalidated) => {
            log_info!("context invalidated; page notifier stopping");
            Err(NotifierExit::ContextInvalidated)
        }
        Err(err) => {
            log_warn!("failed to deliver media state change: {err}");
            Ok(())
        }
    }
}
