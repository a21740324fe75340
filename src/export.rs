use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;

pub fn export_file_name(date_key: &str) -> String {
    format!("urls-{date_key}.txt")
}

pub fn render_export(lines: &[String]) -> String {
    lines.join("\n")
}

/// Turns a day's log lines into a downloadable artifact.
#[async_trait]
pub trait LogExporter: Send + Sync {
    async fn export(&self, date_key: &str, lines: &[String]) -> Result<()>;
}

/// Writes exports into a directory, replacing any same-named file.
pub struct FileExporter {
    dir: PathBuf,
}

impl FileExporter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, date_key: &str) -> PathBuf {
        self.dir.join(export_file_name(date_key))
    }
}

#[async_trait]
impl LogExporter for FileExporter {
    async fn export(&self, date_key: &str, lines: &[String]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create export directory {}", self.dir.display()))?;

        let path = self.path_for(date_key);
        tokio::fs::write(&path, render_export(lines))
            .await
            .with_context(|| format!("failed to write export to {}", path.display()))?;

        info!("Exported {} log lines to {}", lines.len(), path.display());
        Ok(())
    }
}
