//! Per-day, append-only log of visited URLs.

use std::{collections::BTreeMap, sync::Arc};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::models::{MediaKind, MediaSnapshot};
use crate::store::{get_typed, set_typed, KeyValueStore, KEY_LOGS_BY_DATE};

pub type LogsByDate = BTreeMap<String, Vec<String>>;

/// Calendar date in the local zone, `YYYY-MM-DD`.
pub fn date_key(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d").to_string()
}

pub fn today_key() -> String {
    date_key(Local::now())
}

/// `<time> <url>` plus a media suffix. Playing media wins over ended media.
pub fn format_log_line(at: DateTime<Local>, url: &str, media: &MediaSnapshot) -> String {
    let mut line = format!("{} {}", at.format("%-I:%M:%S %p"), url);

    if media.has_playing() {
        line.push_str(&format!(
            " [PLAYING: {}V {}A]",
            media.playing_count(MediaKind::Video),
            media.playing_count(MediaKind::Audio)
        ));
    } else if media.has_ended() {
        line.push_str(&format!(
            " [PLAYED: {}V {}A]",
            media.ended_count(MediaKind::Video),
            media.ended_count(MediaKind::Audio)
        ));
    }

    line
}

#[derive(Clone)]
pub struct LogBook {
    store: Arc<dyn KeyValueStore>,
}

impl LogBook {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn all(&self) -> Result<LogsByDate> {
        Ok(get_typed::<LogsByDate>(self.store.as_ref(), KEY_LOGS_BY_DATE)
            .await
            .context("failed to read log history")?
            .unwrap_or_default())
    }

    pub async fn lines_for(&self, date_key: &str) -> Result<Vec<String>> {
        let mut logs = self.all().await?;
        Ok(logs.remove(date_key).unwrap_or_default())
    }

    /// Append one line to a day's bucket and persist the whole history.
    /// Returns the bucket's new length.
    pub async fn append(&self, date_key: &str, line: String) -> Result<usize> {
        let mut logs = self.all().await?;
        let bucket = logs.entry(date_key.to_string()).or_default();
        bucket.push(line);
        let count = bucket.len();

        set_typed(self.store.as_ref(), KEY_LOGS_BY_DATE, &logs)
            .await
            .context("failed to persist log history")?;
        Ok(count)
    }
}
