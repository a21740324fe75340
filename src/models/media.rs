//! Media playback data models.
//!
//! `MediaSnapshot` is the result of one page scan and doubles as the wire
//! payload answered to `CHECK_MEDIA` probes and carried by
//! `MEDIA_STATE_CHANGED` notifications. `MediaSummary` is the condensed
//! per-URL record the coordinator keeps between log writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn from_tag(tag_name: &str) -> Option<Self> {
        if tag_name.eq_ignore_ascii_case("video") {
            Some(MediaKind::Video)
        } else if tag_name.eq_ignore_ascii_case("audio") {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }
}

/// HTML media ready-state ladder.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

impl ReadyState {
    /// Decoded data beyond the current frame is available.
    pub fn has_decoded_data(self) -> bool {
        self > ReadyState::HaveCurrentData
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub kind: MediaKind,
    pub src: String,
    /// `None` while unknown or for unbounded streams.
    pub duration: Option<f64>,
    pub current_time: f64,
    pub volume: f64,
    pub muted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "MediaReport", into = "MediaReport")]
pub struct MediaSnapshot {
    pub playing_items: Vec<MediaItem>,
    pub ended_items: Vec<MediaItem>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl MediaSnapshot {
    /// Snapshot used whenever a page cannot be inspected.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_playing(&self) -> bool {
        !self.playing_items.is_empty()
    }

    pub fn has_ended(&self) -> bool {
        !self.ended_items.is_empty()
    }

    pub fn playing_count(&self, kind: MediaKind) -> usize {
        count_kind(&self.playing_items, kind)
    }

    pub fn ended_count(&self, kind: MediaKind) -> usize {
        count_kind(&self.ended_items, kind)
    }

    pub fn has_ended_video(&self) -> bool {
        self.ended_count(MediaKind::Video) > 0
    }
}

fn count_kind(items: &[MediaItem], kind: MediaKind) -> usize {
    items.iter().filter(|item| item.kind == kind).count()
}

/// Wire shape of a snapshot. Every field defaults so a partial or empty
/// payload still decodes to "nothing playing, nothing ended".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MediaReport {
    has_playing_media: bool,
    has_ended_media: bool,
    playing_items: Vec<MediaItem>,
    ended_items: Vec<MediaItem>,
    playing_count: usize,
    ended_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
}

impl From<MediaReport> for MediaSnapshot {
    fn from(report: MediaReport) -> Self {
        // The item lists are authoritative; the booleans and counts are
        // derived views for consumers that do not look at the lists.
        Self {
            playing_items: report.playing_items,
            ended_items: report.ended_items,
            timestamp: report.timestamp,
        }
    }
}

impl From<MediaSnapshot> for MediaReport {
    fn from(snapshot: MediaSnapshot) -> Self {
        Self {
            has_playing_media: snapshot.has_playing(),
            has_ended_media: snapshot.has_ended(),
            playing_count: snapshot.playing_items.len(),
            ended_count: snapshot.ended_items.len(),
            playing_items: snapshot.playing_items,
            ended_items: snapshot.ended_items,
            timestamp: snapshot.timestamp,
        }
    }
}

/// Last recorded media state for a URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSummary {
    pub has_playing_media: bool,
    pub has_ended_media: bool,
    pub video_count: usize,
    pub audio_count: usize,
    pub playing_video_count: usize,
    pub playing_audio_count: usize,
    pub ended_video_count: usize,
    pub ended_audio_count: usize,
}

impl MediaSummary {
    /// Only the play/ended booleans decide whether a URL changed state.
    pub fn same_state(&self, other: &MediaSummary) -> bool {
        self.has_playing_media == other.has_playing_media
            && self.has_ended_media == other.has_ended_media
    }
}

impl From<&MediaSnapshot> for MediaSummary {
    fn from(snapshot: &MediaSnapshot) -> Self {
        let playing_video_count = snapshot.playing_count(MediaKind::Video);
        let playing_audio_count = snapshot.playing_count(MediaKind::Audio);
        let ended_video_count = snapshot.ended_count(MediaKind::Video);
        let ended_audio_count = snapshot.ended_count(MediaKind::Audio);

        Self {
            has_playing_media: snapshot.has_playing(),
            has_ended_media: snapshot.has_ended(),
            video_count: playing_video_count + ended_video_count,
            audio_count: playing_audio_count + ended_audio_count,
            playing_video_count,
            playing_audio_count,
            ended_video_count,
            ended_audio_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(kind: MediaKind) -> MediaItem {
        MediaItem {
            kind,
            src: "https://cdn.example.com/clip".into(),
            duration: Some(12.0),
            current_time: 3.5,
            volume: 1.0,
            muted: false,
            width: None,
            height: None,
        }
    }

    #[test]
    fn empty_payload_decodes_to_idle_snapshot() {
        let snapshot: MediaSnapshot = serde_json::from_value(json!({})).unwrap();
        assert_eq!(snapshot, MediaSnapshot::empty());
        assert!(!snapshot.has_playing());
        assert!(!snapshot.has_ended());
    }

    #[test]
    fn payload_always_carries_lists_and_counts() {
        let value = serde_json::to_value(MediaSnapshot::empty()).unwrap();
        assert_eq!(value["hasPlayingMedia"], json!(false));
        assert_eq!(value["hasEndedMedia"], json!(false));
        assert_eq!(value["playingItems"], json!([]));
        assert_eq!(value["endedItems"], json!([]));
        assert_eq!(value["playingCount"], json!(0));
        assert_eq!(value["endedCount"], json!(0));
    }

    #[test]
    fn summary_counts_by_kind() {
        let snapshot = MediaSnapshot {
            playing_items: vec![item(MediaKind::Video), item(MediaKind::Audio), item(MediaKind::Audio)],
            ended_items: vec![item(MediaKind::Video)],
            timestamp: None,
        };
        let summary = MediaSummary::from(&snapshot);

        assert!(summary.has_playing_media);
        assert!(summary.has_ended_media);
        assert_eq!(summary.video_count, 2);
        assert_eq!(summary.audio_count, 2);
        assert_eq!(summary.playing_video_count, 1);
        assert_eq!(summary.playing_audio_count, 2);
        assert_eq!(summary.ended_video_count, 1);
        assert_eq!(summary.ended_audio_count, 0);
    }

    #[test]
    fn same_state_ignores_counts() {
        let a = MediaSummary {
            has_playing_media: true,
            playing_video_count: 1,
            video_count: 1,
            ..Default::default()
        };
        let b = MediaSummary {
            has_playing_media: true,
            playing_video_count: 3,
            video_count: 3,
            ..Default::default()
        };
        assert!(a.same_state(&b));
        assert!(!a.same_state(&MediaSummary::default()));
    }

    #[test]
    fn ready_state_threshold() {
        assert!(!ReadyState::HaveCurrentData.has_decoded_data());
        assert!(ReadyState::HaveFutureData.has_decoded_data());
        assert!(ReadyState::HaveEnoughData.has_decoded_data());
        assert_eq!(ReadyState::default(), ReadyState::HaveNothing);
        assert!(!ReadyState::default().has_decoded_data());
    }
}
