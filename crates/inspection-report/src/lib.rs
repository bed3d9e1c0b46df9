//! Inspection Report - PDF rendering of inspection forms
//!
//! This crate provides:
//! - The form data model (header, checklist and documentation rows)
//! - Fixed column descriptors for the two report tables
//! - Report configuration (titles, labels, date formats)
//! - The `DrawingSurface` seam and its `pdf_core` implementation
//! - `ReportRenderer`: page header, table header, rows and pagination
//!
//! # Example
//!
//! ```ignore
//! use inspection_report::{FormRecord, ReportRenderer};
//!
//! let record: FormRecord = serde_json::from_str(json)?;
//! let pdf_bytes = ReportRenderer::default().render_pdf(&record)?;
//! ```

pub mod columns;
pub mod config;
mod model;
mod renderer;
pub mod surface;

pub use columns::{Column, ColumnKind, Field, MediaSlot, ReportRow, TableKind};
pub use config::{ConfigError, ReportConfig};
pub use model::{time_of_day, ChecklistRow, DocumentationRow, FormHeader, FormId, FormRecord};
pub use renderer::{RenderCursor, ReportRenderer, PAGE_SIZE};
pub use surface::{DrawingSurface, Rect, TextStyle};

use thiserror::Error;

/// Errors that cross the report boundary
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Form not found: {id}")]
    NotFound { id: FormId },

    #[error("Failed to render report: {0}")]
    RenderFailure(String),
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
