use serde::{Deserialize, Serialize};

pub type TabId = i64;
pub type WindowId = i64;

/// Host view of a browser tab at the time it was queried.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub window_id: WindowId,
    /// Position within its window's tab strip.
    pub index: usize,
    pub url: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TabStatus {
    Loading,
    Complete,
}

/// Fields that changed in a tab update notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabChange {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<TabStatus>,
}

impl TabChange {
    pub fn navigated(&self) -> bool {
        self.url.is_some()
    }

    pub fn completed(&self) -> bool {
        self.status == Some(TabStatus::Complete)
    }
}
