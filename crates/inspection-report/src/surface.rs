//! Drawing surface abstraction
//!
//! The renderer only talks to a `DrawingSurface`. The surface is owned by
//! the caller and passed explicitly through every drawing function; it is
//! consumed by `finish` to produce the output bytes.
//!
//! Coordinates are in points with a top-left origin. Drawing always happens
//! on the most recently started page.

use pdf_core::{Align, PdfDocument, PdfError};

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// How a line of text is laid out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    /// Box width; text is aligned inside it and clipped to it
    pub width: Option<f64>,
    pub align: Align,
}

impl TextStyle {
    /// Left-aligned text clipped to `width`
    pub fn clipped(font_size: f64, width: f64) -> Self {
        Self {
            font_size,
            width: Some(width),
            align: Align::Left,
        }
    }
}

/// An imperative 2D page surface
pub trait DrawingSurface {
    type Error: std::error::Error;

    /// Start a new page; later calls draw on it
    fn new_page(&mut self) -> Result<(), Self::Error>;

    /// Stroke the outline of a rectangle
    fn stroke_rect(&mut self, rect: Rect) -> Result<(), Self::Error>;

    /// Draw a single line of text whose top is at `y`
    fn text(&mut self, text: &str, x: f64, y: f64, style: TextStyle) -> Result<(), Self::Error>;

    /// Draw an encoded image fitted and centred inside `bounds`
    fn image(&mut self, data: &[u8], bounds: Rect) -> Result<(), Self::Error>;

    /// Number of pages started so far
    fn page_count(&self) -> usize;

    /// Finalise the document
    fn finish(self) -> Result<Vec<u8>, Self::Error>;
}

impl DrawingSurface for PdfDocument {
    type Error = PdfError;

    fn new_page(&mut self) -> Result<(), PdfError> {
        self.add_page();
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect) -> Result<(), PdfError> {
        let page = PdfDocument::page_count(self);
        PdfDocument::stroke_rect(self, page, rect.x, rect.y, rect.width, rect.height)
    }

    fn text(&mut self, text: &str, x: f64, y: f64, style: TextStyle) -> Result<(), PdfError> {
        let page = PdfDocument::page_count(self);
        self.insert_text(text, page, x, y, style.font_size, style.align, style.width)
    }

    fn image(&mut self, data: &[u8], bounds: Rect) -> Result<(), PdfError> {
        let page = PdfDocument::page_count(self);
        self.insert_image_fit(data, page, bounds.x, bounds.y, bounds.width, bounds.height)
    }

    fn page_count(&self) -> usize {
        PdfDocument::page_count(self)
    }

    fn finish(self) -> Result<Vec<u8>, PdfError> {
        self.to_bytes()
    }
}
