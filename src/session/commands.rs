use anyhow::Result;
use log::error;

use crate::logbook::today_key;
use crate::models::{ControlRequest, ControlResponse};

use super::SessionCoordinator;

pub const NO_ENTRIES_TODAY: &str = "No URLs have been logged today";

impl SessionCoordinator {
    /// Answer a popup request. Always produces a response; failures are
    /// reported as `{success: false, error}`.
    pub async fn handle_control(&self, request: ControlRequest) -> ControlResponse {
        let result = match request {
            ControlRequest::Start => {
                self.start_session().await;
                Ok(ControlResponse::ack())
            }
            ControlRequest::Stop => {
                self.stop_session().await;
                Ok(ControlResponse::ack())
            }
            ControlRequest::DownloadToday => self.download_today().await,
            ControlRequest::ToggleAutoSwitch { enabled } => self
                .toggle_auto_switch(enabled)
                .await
                .map(|_| ControlResponse::ack()),
            ControlRequest::GetAutoSwitch => {
                Ok(ControlResponse::auto_switch(self.auto_switch_enabled().await))
            }
        };

        result.unwrap_or_else(|err| {
            error!("Control request failed: {err:?}");
            ControlResponse::failed(err.to_string())
        })
    }

    pub async fn download_today(&self) -> Result<ControlResponse> {
        let date = today_key();
        let lines = self.log_book.lines_for(&date).await?;

        if lines.is_empty() {
            return Ok(ControlResponse::failed(NO_ENTRIES_TODAY));
        }

        self.exporter.export(&date, &lines).await?;
        Ok(ControlResponse::downloaded(lines.len()))
    }

    /// Takes effect immediately, even if persisting the choice fails.
    pub async fn toggle_auto_switch(&self, enabled: bool) -> Result<()> {
        self.set_auto_switch(enabled).await;
        self.settings.set_auto_switch(enabled).await
    }
}
