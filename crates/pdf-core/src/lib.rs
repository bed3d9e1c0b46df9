//! PDF Core - Page-building PDF writer
//!
//! This crate provides functionality for:
//! - Creating PDF documents page by page with a fixed page size
//! - Stroking rectangles (table cells)
//! - Inserting single-line text with the base-14 Helvetica font
//! - Inserting images (JPEG, PNG) fitted into a bounding box
//!
//! All coordinates are in points with the origin at the top-left corner of
//! the page.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, PageSize, PdfDocument};
//!
//! let mut doc = PdfDocument::new(PageSize::A4_LANDSCAPE);
//! let page = doc.add_page();
//! doc.stroke_rect(page, 30.0, 140.0, 120.0, 30.0)?;
//! doc.insert_text("Hello, World!", page, 35.0, 150.0, 10.0, Align::Left, None)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod image;
mod text;

pub use document::{Color, PageSize, PdfDocument};
pub use font::{encode_win_ansi, text_width, FONT_ASCENT};
pub use image::fit_in_box;
pub use text::{generate_text_operators, ClipBox, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
