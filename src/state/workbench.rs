use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::error::ConsoleError;
use super::parameters::{ParameterSession, ParameterState};
use super::render::{PreviewController, PreviewState, Renderer};
use super::values::{ParameterValue, ParameterValues};
use crate::api::{RenderFormat, RenderedReport, ReportServerApi};

/// The selected report with its parameter form, live preview and exports
///
/// Parameter edits trigger a PDF preview once every required value is filled
/// and the values differ from those of the last preview issued.
pub struct ReportWorkbench {
    parameters: ParameterSession,
    renderer: Renderer,
    preview: PreviewController,
    selected: RwLock<Option<String>>,
    last_preview: Mutex<Option<(String, ParameterValues)>>,
    format: RwLock<RenderFormat>,
}

impl ReportWorkbench {
    pub fn new(api: Arc<dyn ReportServerApi>) -> Self {
        let renderer = Renderer::new(api.clone());
        Self {
            parameters: ParameterSession::new(api),
            preview: PreviewController::new(renderer.clone()),
            renderer,
            selected: RwLock::new(None),
            last_preview: Mutex::new(None),
            format: RwLock::new(RenderFormat::default()),
        }
    }

    pub fn with_format(self, format: RenderFormat) -> Self {
        Self {
            format: RwLock::new(format),
            ..self
        }
    }

    /// Select a report: release the old preview, then load the new schema
    pub async fn select_report(&self, report_path: &str) -> ParameterState {
        info!("Selected report: {}", report_path);
        self.preview.release().await;
        *self.last_preview.lock().await = None;
        *self.selected.write().await = Some(report_path.to_string());

        let state = self.parameters.select_report(report_path).await;
        self.maybe_preview().await;
        state
    }

    pub async fn deselect(&self) {
        self.preview.release().await;
        *self.last_preview.lock().await = None;
        *self.selected.write().await = None;
        self.parameters.deselect().await;
    }

    pub async fn selected_report(&self) -> Option<String> {
        self.selected.read().await.clone()
    }

    pub async fn set_parameter(&self, name: &str, raw: &str) -> Result<Option<PreviewState>, ConsoleError> {
        self.parameters.update_value(name, raw).await?;
        Ok(self.maybe_preview().await)
    }

    /// Apply several raw `(name, value)` pairs, previewing once at the end
    pub async fn apply_parameters(&self, pairs: &[(String, String)]) -> Result<Option<PreviewState>, ConsoleError> {
        for (name, raw) in pairs {
            self.parameters.update_value(name, raw).await?;
        }
        Ok(self.maybe_preview().await)
    }

    pub async fn set_parameter_value(
        &self,
        name: &str,
        value: ParameterValue,
    ) -> Result<Option<PreviewState>, ConsoleError> {
        self.parameters.set_value(name, value).await?;
        Ok(self.maybe_preview().await)
    }

    pub async fn clear_parameter(&self, name: &str) -> Result<Option<PreviewState>, ConsoleError> {
        self.parameters.clear_value(name).await?;
        Ok(self.maybe_preview().await)
    }

    pub async fn reset_parameters(&self) -> Result<Option<PreviewState>, ConsoleError> {
        self.parameters.reset().await?;
        Ok(self.maybe_preview().await)
    }

    /// Issue a preview if the form is complete and changed since the last one
    pub async fn maybe_preview(&self) -> Option<PreviewState> {
        let (report_path, values) = self.submittable().await.ok()?;

        {
            let mut last = self.last_preview.lock().await;
            let key = (report_path.clone(), values.clone());
            if last.as_ref() == Some(&key) {
                debug!("Parameters unchanged since last preview of '{}'", report_path);
                return None;
            }
            *last = Some(key);
        }

        Some(self.preview.request(&report_path, &values).await)
    }

    /// Preview the current values even if they were already previewed
    pub async fn refresh_preview(&self) -> Result<PreviewState, ConsoleError> {
        let (report_path, values) = self.submittable().await?;
        *self.last_preview.lock().await = Some((report_path.clone(), values.clone()));
        Ok(self.preview.request(&report_path, &values).await)
    }

    /// Preview for the current values, rendering only if none was issued for them yet
    pub async fn ensure_preview(&self) -> Result<PreviewState, ConsoleError> {
        let key = self.submittable().await?;
        if self.last_preview.lock().await.as_ref() == Some(&key) {
            return Ok(self.preview.snapshot().await);
        }
        self.refresh_preview().await
    }

    pub async fn render(&self, format: RenderFormat) -> Result<RenderedReport, ConsoleError> {
        let (report_path, values) = self.submittable().await?;
        self.renderer.render(&report_path, &values, format).await
    }

    /// Export the selected report into `dir`
    pub async fn download(
        &self,
        format: Option<RenderFormat>,
        file_name: Option<&str>,
        dir: &Path,
    ) -> Result<PathBuf, ConsoleError> {
        let format = match format {
            Some(format) => format,
            None => self.format().await,
        };
        let (report_path, values) = self.submittable().await?;
        self.renderer
            .download(&report_path, &values, format, dir, file_name)
            .await
    }

    pub async fn set_format(&self, format: RenderFormat) {
        *self.format.write().await = format;
    }

    pub async fn format(&self) -> RenderFormat {
        *self.format.read().await
    }

    pub async fn parameters(&self) -> ParameterState {
        self.parameters.snapshot().await
    }

    pub async fn preview(&self) -> PreviewState {
        self.preview.snapshot().await
    }

    pub async fn can_submit(&self) -> bool {
        self.parameters.can_submit().await
    }

    /// Report path and values, provided the form for the selected report is complete
    async fn submittable(&self) -> Result<(String, ParameterValues), ConsoleError> {
        let selected = self.selected.read().await.clone().ok_or(ConsoleError::NoSelection)?;
        let state = self.parameters.snapshot().await;

        match &state {
            ParameterState::Ready {
                report_path, values, ..
            } if *report_path == selected => {
                let missing = state.missing_required();
                if missing.is_empty() {
                    Ok((selected, values.clone()))
                } else {
                    Err(ConsoleError::Validation { missing })
                }
            }
            ParameterState::Failed { error, .. } => Err(error.clone()),
            _ => Err(ConsoleError::NotReady("Report parameters".to_string())),
        }
    }
}
