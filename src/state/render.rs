use chrono::NaiveDate;
use log::{debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::RwLock;

use super::error::ConsoleError;
use super::generation::RequestGeneration;
use super::paths;
use super::values::ParameterValues;
use crate::api::{RenderFormat, RenderRequest, RenderedReport, ReportServerApi};

/// Download name for a rendered report: `<name>_<YYYY-MM-DD>.<ext>`
pub fn download_file_name(report_path: &str, format: RenderFormat, date: NaiveDate) -> String {
    let base = paths::item_name(report_path).unwrap_or_else(|| "report".to_string());
    format!("{}_{}.{}", base, date.format("%Y-%m-%d"), format.file_extension())
}

/// Renders reports in any export format
#[derive(Clone)]
pub struct Renderer {
    api: Arc<dyn ReportServerApi>,
}

impl Renderer {
    pub fn new(api: Arc<dyn ReportServerApi>) -> Self {
        Self { api }
    }

    pub async fn render(
        &self,
        report_path: &str,
        values: &ParameterValues,
        format: RenderFormat,
    ) -> Result<RenderedReport, ConsoleError> {
        info!("Rendering '{}' as {}", report_path, format);
        let request = RenderRequest {
            report_path: report_path.to_string(),
            parameters: values.to_wire(),
        };

        let rendered = self
            .api
            .render_report(&request, format)
            .await
            .map_err(ConsoleError::Render)?;
        debug!("Rendered '{}': {} bytes", report_path, rendered.len());
        Ok(rendered)
    }

    /// Render and write the output into `dir`.
    ///
    /// Without an explicit `file_name` the dated default name is used.
    pub async fn download(
        &self,
        report_path: &str,
        values: &ParameterValues,
        format: RenderFormat,
        dir: &Path,
        file_name: Option<&str>,
    ) -> Result<PathBuf, ConsoleError> {
        let rendered = self.render(report_path, values, format).await?;

        let name = match file_name {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => download_file_name(report_path, format, chrono::Local::now().date_naive()),
        };
        let target = dir.join(name);

        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&target, &rendered.bytes).await?;
        info!("Saved {} ({} bytes)", target.display(), rendered.len());
        Ok(target)
    }
}

/// A rendered PDF preview backed by a temporary file
///
/// The file is deleted when the document is dropped.
#[derive(Debug)]
pub struct PreviewDocument {
    report_path: String,
    values: ParameterValues,
    size: usize,
    file: NamedTempFile,
}

impl PreviewDocument {
    fn create(report_path: &str, values: ParameterValues, bytes: &[u8]) -> Result<Self, ConsoleError> {
        let mut file = tempfile::Builder::new()
            .prefix("ssrs-preview-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        Ok(Self {
            report_path: report_path.to_string(),
            values,
            size: bytes.len(),
            file,
        })
    }

    pub fn report_path(&self) -> &str {
        &self.report_path
    }

    pub fn values(&self) -> &ParameterValues {
        &self.values
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Copy the preview into `dir` under its dated PDF download name.
    ///
    /// The temporary file itself still goes away with the document.
    pub async fn save_copy(&self, dir: &Path) -> Result<PathBuf, ConsoleError> {
        let name = download_file_name(&self.report_path, RenderFormat::Pdf, chrono::Local::now().date_naive());
        let target = dir.join(name);
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::copy(self.path(), &target).await?;
        info!("Kept preview of {} at {}", self.report_path, target.display());
        Ok(target)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreviewState {
    pub document: Option<Arc<PreviewDocument>>,
    pub is_loading: bool,
    pub error: Option<ConsoleError>,
}

/// Keeps at most one live PDF preview
///
/// Only the most recent request may install its document. A failed render
/// records the error but leaves the previous document in place.
pub struct PreviewController {
    renderer: Renderer,
    generation: RequestGeneration,
    state: RwLock<PreviewState>,
}

impl PreviewController {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            generation: RequestGeneration::new(),
            state: RwLock::new(PreviewState::default()),
        }
    }

    pub async fn request(&self, report_path: &str, values: &ParameterValues) -> PreviewState {
        let ticket = {
            let mut state = self.state.write().await;
            state.is_loading = true;
            self.generation.issue()
        };
        debug!("Preview requested for '{}' (ticket {})", report_path, ticket.value());

        let result = self.renderer.render(report_path, values, RenderFormat::Pdf).await;

        let mut state = self.state.write().await;
        if !self.generation.is_current(ticket) {
            debug!("Discarding superseded preview for '{}'", report_path);
            return state.clone();
        }

        match result.and_then(|rendered| PreviewDocument::create(report_path, values.clone(), &rendered.bytes)) {
            Ok(document) => {
                info!("Preview ready at {}", document.path().display());
                state.document = Some(Arc::new(document));
                state.error = None;
            }
            Err(e) => {
                warn!("Preview failed for '{}': {}", report_path, e);
                state.error = Some(e);
            }
        }
        state.is_loading = false;
        state.clone()
    }

    /// Drop the current document and supersede any preview still rendering
    pub async fn release(&self) {
        self.generation.invalidate();
        let mut state = self.state.write().await;
        if let Some(document) = state.document.take() {
            debug!("Releasing preview for '{}'", document.report_path());
        }
        *state = PreviewState::default();
    }

    pub async fn snapshot(&self) -> PreviewState {
        self.state.read().await.clone()
    }
}
