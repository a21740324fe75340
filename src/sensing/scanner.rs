use chrono::{DateTime, Utc};

use crate::models::{MediaItem, MediaKind, MediaSnapshot};

use super::dom::{Document, Element, FrameContent, MediaElementState};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Playing,
    Ended,
    Idle,
}

/// Ended or playing only count once decoded data is available; a paused,
/// stalled or still-loading element is idle.
pub fn classify(state: &MediaElementState) -> Playback {
    if !state.ready_state.has_decoded_data() {
        return Playback::Idle;
    }

    if state.ended {
        Playback::Ended
    } else if !state.paused {
        Playback::Playing
    } else {
        Playback::Idle
    }
}

pub fn scan(document: &Document) -> MediaSnapshot {
    scan_at(document, Utc::now())
}

/// Collect playing and ended media from a document, its shadow trees and
/// its same-origin frames, in document order.
pub fn scan_at(document: &Document, timestamp: DateTime<Utc>) -> MediaSnapshot {
    let mut snapshot = MediaSnapshot {
        timestamp: Some(timestamp),
        ..MediaSnapshot::empty()
    };

    // Nesting depth is page-controlled, so no recursion.
    let mut stack: Vec<&Element> = document.children.iter().rev().collect();

    while let Some(element) = stack.pop() {
        if let (Some(kind), Some(state)) = (element.media_kind(), element.media.as_ref()) {
            match classify(state) {
                Playback::Playing => snapshot.playing_items.push(media_item(kind, state)),
                Playback::Ended => snapshot.ended_items.push(media_item(kind, state)),
                Playback::Idle => {}
            }
        }

        stack.extend(element.children.iter().rev());

        if let Some(shadow_root) = &element.shadow_root {
            stack.extend(shadow_root.children.iter().rev());
        }

        match &element.frame {
            Some(FrameContent::SameOrigin { document }) => {
                stack.extend(document.children.iter().rev());
            }
            Some(FrameContent::CrossOrigin { origin }) => {
                log_debug!("skipping cross-origin frame {origin}");
            }
            None => {}
        }
    }

    snapshot
}

fn media_item(kind: MediaKind, state: &MediaElementState) -> MediaItem {
    let (width, height) = match kind {
        MediaKind::Video => (state.video_width, state.video_height),
        MediaKind::Audio => (None, None),
    };

    MediaItem {
        kind,
        src: state.source(),
        duration: state.duration.filter(|value| value.is_finite()),
        current_time: state.current_time,
        volume: state.volume,
        muted: state.muted,
        width,
        height,
    }
}
