use anyhow::{Context, Result};
use log::info;

use crate::host::TabHost;
use crate::models::{TabId, TabInfo};

/// Tab following `from_tab` in display order, wrapping from last to first.
pub fn next_tab(tabs: &[TabInfo], from_tab: TabId) -> Option<&TabInfo> {
    let index = tabs.iter().position(|tab| tab.id == from_tab)?;
    tabs.get((index + 1) % tabs.len())
}

/// Activate the tab after `from_tab` in the current window. No-op when
/// auto-switch is off or `from_tab` is no longer in the window. Returns the
/// tab that was activated.
pub async fn advance(host: &dyn TabHost, from_tab: TabId, auto_switch_enabled: bool) -> Result<Option<TabId>> {
    if !auto_switch_enabled {
        return Ok(None);
    }

    let tabs = host
        .window_tabs()
        .await
        .context("failed to enumerate window tabs")?;

    let Some(next) = next_tab(&tabs, from_tab) else {
        return Ok(None);
    };
    let next_id = next.id;

    host.activate(next_id)
        .await
        .with_context(|| format!("failed to activate tab {next_id}"))?;

    info!("Auto-switched from tab {from_tab} to tab {next_id}");
    Ok(Some(next_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: TabId, index: usize) -> TabInfo {
        TabInfo {
            id,
            window_id: 1,
            index,
            url: Some(format!("https://example.com/{id}")),
            active: false,
        }
    }

    #[test]
    fn next_wraps_to_first() {
        let tabs = vec![tab(10, 0), tab(20, 1), tab(30, 2)];
        assert_eq!(next_tab(&tabs, 10).map(|t| t.id), Some(20));
        assert_eq!(next_tab(&tabs, 30).map(|t| t.id), Some(10));
    }

    #[test]
    fn unknown_or_single_tab() {
        let tabs = vec![tab(10, 0)];
        assert!(next_tab(&tabs, 99).is_none());
        assert_eq!(next_tab(&tabs, 10).map(|t| t.id), Some(10));
        assert!(next_tab(&[], 10).is_none());
    }
}
