//! Seams to the host browser runtime.

use anyhow::Result;
use async_trait::async_trait;

use crate::error::ChannelError;
use crate::models::{MediaSnapshot, TabId, TabInfo};

/// Tab and window primitives.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// The active tab of the current window, if any.
    async fn active_tab(&self) -> Result<Option<TabInfo>>;

    /// `None` once the tab has closed.
    async fn get_tab(&self, tab_id: TabId) -> Result<Option<TabInfo>>;

    /// Tabs of the current window in display order.
    async fn window_tabs(&self) -> Result<Vec<TabInfo>>;

    async fn activate(&self, tab_id: TabId) -> Result<()>;
}

/// Background side of the `CHECK_MEDIA` exchange.
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// `Ok(None)` when the page answered without a payload.
    async fn check_media(&self, tab_id: TabId) -> Result<Option<MediaSnapshot>, ChannelError>;
}
