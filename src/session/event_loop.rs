use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::models::{ControlRequest, ControlResponse, PageMessage, TabChange, TabId, TabInfo};

use super::SessionCoordinator;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

/// Everything the host runtime reports to the background coordinator.
#[derive(Debug)]
pub enum HostEvent {
    TabActivated {
        tab_id: TabId,
    },
    TabUpdated {
        tab_id: TabId,
        change: TabChange,
        tab: TabInfo,
    },
    TabRemoved {
        tab_id: TabId,
    },
    /// A page context message; `sender` is the host's view of its tab.
    Page {
        sender: TabInfo,
        message: PageMessage,
    },
    Control {
        request: ControlRequest,
        reply: Option<oneshot::Sender<ControlResponse>>,
    },
}

/// Dispatch host events until cancelled or every sender is gone.
///
/// Events are handled one at a time in arrival order. Settle and advance
/// delays run on their own tasks, so only the media probe itself holds up
/// the queue.
pub async fn event_loop(
    coordinator: SessionCoordinator,
    mut events: mpsc::Receiver<HostEvent>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                log_info!("coordinator event loop shutting down");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    log_info!("all host event senders dropped");
                    break;
                };
                dispatch(&coordinator, event).await;
            }
        }
    }
}

pub async fn dispatch(coordinator: &SessionCoordinator, event: HostEvent) {
    match event {
        HostEvent::TabActivated { tab_id } => {
            if let Err(err) = coordinator.on_tab_activated(tab_id).await {
                log_error!("tab activation handler failed: {err:?}");
            }
        }
        HostEvent::TabUpdated { tab_id, change, tab } => {
            if let Err(err) = coordinator.on_tab_updated(tab_id, &change, &tab).await {
                log_error!("tab update handler failed: {err:?}");
            }
        }
        HostEvent::TabRemoved { tab_id } => coordinator.on_tab_removed(tab_id).await,
        HostEvent::Page {
            sender,
            message: PageMessage::MediaStateChanged(change),
        } => coordinator.on_media_state_changed(&sender, &change).await,
        HostEvent::Control { request, reply } => {
            let response = coordinator.handle_control(request).await;
            if let Some(reply) = reply {
                if reply.send(response).is_err() {
                    log_debug!("control requester went away before the reply");
                }
            }
        }
    }
}
