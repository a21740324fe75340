use std::{collections::BTreeMap, sync::Arc};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::store::{
    get_typed, set_typed, KeyValueStore, KEY_AUTO_SWITCH, KEY_ENABLED, KEY_LOGS_BY_DATE,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub enabled: bool,
    pub auto_switch: bool,
}

/// Typed access to the persisted toggles.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Write first-run defaults for any key that is missing. Existing values
    /// are left alone.
    pub async fn install_defaults(&self) -> Result<()> {
        let store = self.store.as_ref();

        if store.get(KEY_ENABLED).await?.is_none() {
            set_typed(store, KEY_ENABLED, &false).await?;
        }
        if store.get(KEY_AUTO_SWITCH).await?.is_none() {
            set_typed(store, KEY_AUTO_SWITCH, &false).await?;
        }
        if store.get(KEY_LOGS_BY_DATE).await?.is_none() {
            info!("Initializing empty log history");
            set_typed(store, KEY_LOGS_BY_DATE, &BTreeMap::<String, Vec<String>>::new()).await?;
        }
        Ok(())
    }

    pub async fn load(&self) -> Result<UserSettings> {
        let store = self.store.as_ref();
        let enabled = get_typed::<bool>(store, KEY_ENABLED)
            .await
            .context("failed to load session toggle")?
            .unwrap_or(false);
        let auto_switch = get_typed::<bool>(store, KEY_AUTO_SWITCH)
            .await
            .context("failed to load auto-switch toggle")?
            .unwrap_or(false);

        Ok(UserSettings {
            enabled,
            auto_switch,
        })
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        set_typed(self.store.as_ref(), KEY_ENABLED, &enabled).await
    }

    pub async fn set_auto_switch(&self, enabled: bool) -> Result<()> {
        set_typed(self.store.as_ref(), KEY_AUTO_SWITCH, &enabled).await
    }
}
