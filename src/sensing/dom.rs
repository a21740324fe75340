//! Owned snapshot of a page's DOM, as handed over by the host page context.
//!
//! Only what media detection needs is modelled: element tags, media element
//! state, attached shadow roots and nested browsing contexts. Frames whose
//! document cannot be read (cross-origin) are kept as opaque markers.

use serde::{Deserialize, Serialize};

use crate::models::{MediaKind, ReadyState};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Document {
    pub fn new(children: Vec<Element>) -> Self {
        Self {
            url: None,
            children,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Lowercase tag name.
    pub tag_name: String,
    #[serde(default)]
    pub media: Option<MediaElementState>,
    #[serde(default)]
    pub shadow_root: Option<ShadowRoot>,
    #[serde(default)]
    pub frame: Option<FrameContent>,
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            media: None,
            shadow_root: None,
            frame: None,
            children: Vec::new(),
        }
    }

    pub fn video(state: MediaElementState) -> Self {
        Self {
            media: Some(state),
            ..Self::new("video")
        }
    }

    pub fn audio(state: MediaElementState) -> Self {
        Self {
            media: Some(state),
            ..Self::new("audio")
        }
    }

    pub fn iframe(content: FrameContent) -> Self {
        Self {
            frame: Some(content),
            ..Self::new("iframe")
        }
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn with_shadow_root(mut self, children: Vec<Element>) -> Self {
        self.shadow_root = Some(ShadowRoot { children });
        self
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        MediaKind::from_tag(&self.tag_name)
    }

    /// Whether this element is a media element or has one among its light
    /// DOM descendants. Shadow trees and frames are not entered.
    pub fn is_or_contains_media(&self) -> bool {
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            if element.media_kind().is_some() {
                return true;
            }
            stack.extend(element.children.iter());
        }
        false
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShadowRoot {
    #[serde(default)]
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "access")]
pub enum FrameContent {
    SameOrigin { document: Document },
    /// Reading the frame's document raised an access error.
    CrossOrigin { origin: String },
}

/// Playback attributes read off an `HTMLMediaElement`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaElementState {
    #[serde(default)]
    pub current_src: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    pub paused: bool,
    pub ended: bool,
    pub ready_state: ReadyState,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub current_time: f64,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub video_width: Option<u32>,
    #[serde(default)]
    pub video_height: Option<u32>,
}

fn default_volume() -> f64 {
    1.0
}

impl Default for MediaElementState {
    fn default() -> Self {
        Self {
            current_src: None,
            src: None,
            paused: true,
            ended: false,
            ready_state: ReadyState::default(),
            duration: None,
            current_time: 0.0,
            volume: default_volume(),
            muted: false,
            video_width: None,
            video_height: None,
        }
    }
}

impl MediaElementState {
    pub fn playing(src: &str) -> Self {
        Self {
            current_src: Some(src.to_string()),
            paused: false,
            ready_state: ReadyState::HaveEnoughData,
            duration: Some(60.0),
            current_time: 12.0,
            ..Self::default()
        }
    }

    pub fn ended(src: &str) -> Self {
        Self {
            current_src: Some(src.to_string()),
            paused: true,
            ended: true,
            ready_state: ReadyState::HaveEnoughData,
            duration: Some(60.0),
            current_time: 60.0,
            ..Self::default()
        }
    }

    pub fn paused(src: &str) -> Self {
        Self {
            current_src: Some(src.to_string()),
            ready_state: ReadyState::HaveEnoughData,
            duration: Some(60.0),
            current_time: 30.0,
            ..Self::default()
        }
    }

    /// `currentSrc`, falling back to `src`, then `"unknown"`.
    pub fn source(&self) -> String {
        self.current_src
            .as_deref()
            .filter(|src| !src.is_empty())
            .or_else(|| self.src.as_deref().filter(|src| !src.is_empty()))
            .unwrap_or("unknown")
            .to_string()
    }
}
