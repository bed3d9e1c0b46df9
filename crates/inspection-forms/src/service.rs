//! PDF export of stored forms

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use inspection_report::{FormId, ReportError, ReportRenderer};
use log::{error, info};

use crate::store::FormStore;
use crate::ExportError;

/// File name offered when a report is downloaded
pub fn attachment_file_name(id: FormId) -> String {
    format!("formulario-{id}.pdf")
}

/// Renders stored forms as PDF reports
#[derive(Debug, Default)]
pub struct FormService<S> {
    store: S,
    renderer: ReportRenderer,
}

impl<S: FormStore> FormService<S> {
    /// Create a service using the default report labels
    pub fn new(store: S) -> Self {
        Self::with_renderer(store, ReportRenderer::default())
    }

    /// Create a service with a custom renderer
    pub fn with_renderer(store: S, renderer: ReportRenderer) -> Self {
        Self { store, renderer }
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Render a stored form as PDF bytes
    ///
    /// The form is fetched once before any drawing starts; a missing form
    /// fails with `NotFound` and produces no output.
    pub fn generate_form_pdf(&self, id: FormId) -> Result<Vec<u8>, ReportError> {
        info!("Generating PDF for form {}", id);

        let record = self.store.get_form_for_render(id)?;
        let bytes = self.renderer.render_pdf(&record)?;
        if bytes.is_empty() {
            error!("PDF for form {} is empty", id);
            return Err(ReportError::RenderFailure(
                "generated PDF buffer is empty".to_string(),
            ));
        }

        info!("Generated PDF for form {} ({} bytes)", id, bytes.len());
        Ok(bytes)
    }

    /// Render a stored form and write it to `dir`
    ///
    /// The file is named `form_{id}_{unix_millis}.pdf`. Returns its path.
    pub fn save_pdf_locally(&self, id: FormId, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let bytes = self.generate_form_pdf(id)?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let path = dir.as_ref().join(format!("form_{id}_{millis}.pdf"));

        std::fs::write(&path, bytes).map_err(|e| {
            error!("Failed to save PDF for form {} to {}: {}", id, path.display(), e);
            e
        })?;

        info!("Saved PDF for form {} to {}", id, path.display());
        Ok(path)
    }
}
