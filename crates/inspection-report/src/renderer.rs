//! Report layout and pagination
//!
//! A report has two sections, checklist then documentation. Each section
//! starts on a fresh landscape page and spans as many pages as its rows
//! need. Every page carries the page header block and the table header.

use std::fmt::Write as _;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use log::{debug, error, warn};
use pdf_core::{Align, PageSize, PdfDocument};
use thiserror::Error;

use crate::columns::{Column, ColumnKind, MediaSlot, ReportRow, TableKind};
use crate::config::ReportConfig;
use crate::model::{ChecklistRow, DocumentationRow, FormHeader, FormRecord};
use crate::surface::{DrawingSurface, Rect, TextStyle};
use crate::{ReportError, Result};

/// Page size of every report page
pub const PAGE_SIZE: PageSize = PageSize::A4_LANDSCAPE;

const MARGIN: f64 = 30.0;

const TITLE_Y: f64 = 40.0;
const TITLE_FONT_SIZE: f64 = 16.0;

const INFO_FONT_SIZE: f64 = 10.0;
const INFO_FIRST_LINE_Y: f64 = 80.0;
const INFO_SECOND_LINE_Y: f64 = 100.0;

const TABLE_HEADER_Y: f64 = 140.0;
const TABLE_HEADER_HEIGHT: f64 = 30.0;
const TABLE_HEADER_FONT_SIZE: f64 = 10.0;
const TABLE_HEADER_TEXT_OFFSET: f64 = 10.0;

const ROW_HEIGHT: f64 = 60.0;
const ROW_FONT_SIZE: f64 = 8.0;

const CELL_INSET: f64 = 5.0;
const PHOTO_SIZE: f64 = 50.0;

/// Lowest y a row may reach
const ROW_LIMIT_Y: f64 = PAGE_SIZE.height - MARGIN;

/// Photos arrive from browsers and mobile clients with or without padding,
/// sometimes wrapped in a data URL.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Row-local photo failures; the row is drawn without its thumbnail
#[derive(Debug, Error)]
enum MediaError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image rejected by surface: {0}")]
    Surface(String),
}

/// Table layout state while rows are drawn
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCursor {
    pub columns: &'static [Column],
    pub x: f64,
    pub y: f64,
}

impl RenderCursor {
    /// Column widths in drawing order
    pub fn column_widths(&self) -> Vec<f64> {
        self.columns.iter().map(Column::width_pt).collect()
    }
}

/// Header values formatted once per render
struct HeaderText<'a> {
    header: &'a FormHeader,
    date: String,
    time: String,
}

/// Renders inspection forms as paginated table reports
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    config: ReportConfig,
}

impl ReportRenderer {
    /// Create a renderer with the given labels and formats
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Get the renderer configuration
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Render a stored form into a new PDF document
    pub fn render_pdf(&self, record: &FormRecord) -> Result<Vec<u8>> {
        self.render(
            PdfDocument::new(PAGE_SIZE),
            &record.header,
            &record.checklist_items,
            &record.documentation_items,
        )
    }

    /// Render both sections onto `surface` and finalise it
    ///
    /// Rows are drawn in the order given. A photo that cannot be decoded or
    /// embedded is skipped; any other surface error aborts the render and no
    /// bytes are returned.
    pub fn render<S: DrawingSurface>(
        &self,
        mut surface: S,
        header: &FormHeader,
        checklist: &[ChecklistRow],
        documentation: &[DocumentationRow],
    ) -> Result<Vec<u8>> {
        let text = self.header_text(header)?;

        self.draw_section(&mut surface, &text, TableKind::Checklist, checklist)
            .map_err(|e| render_failure(header, e))?;
        self.draw_section(&mut surface, &text, TableKind::Documentation, documentation)
            .map_err(|e| render_failure(header, e))?;

        let pages = surface.page_count();
        let bytes = surface.finish().map_err(|e| render_failure(header, e))?;
        debug!("Form {} rendered on {} pages", header.id, pages);
        Ok(bytes)
    }

    fn header_text<'a>(&self, header: &'a FormHeader) -> Result<HeaderText<'a>> {
        let mut date = String::new();
        write!(date, "{}", header.date.format(&self.config.date_format)).map_err(|_| {
            ReportError::RenderFailure(format!(
                "invalid date format {:?}",
                self.config.date_format
            ))
        })?;

        let mut time = String::new();
        write!(time, "{}", header.time.format(&self.config.time_format)).map_err(|_| {
            ReportError::RenderFailure(format!(
                "invalid time format {:?}",
                self.config.time_format
            ))
        })?;

        Ok(HeaderText { header, date, time })
    }

    /// Draw one section: a fresh page, then the rows with page breaks
    fn draw_section<S: DrawingSurface, R: ReportRow>(
        &self,
        surface: &mut S,
        text: &HeaderText<'_>,
        kind: TableKind,
        rows: &[R],
    ) -> std::result::Result<(), S::Error> {
        let mut cursor = self.start_page(surface, text, kind)?;

        for (index, row) in rows.iter().enumerate() {
            if cursor.y + ROW_HEIGHT > ROW_LIMIT_Y {
                cursor = self.start_page(surface, text, kind)?;
            }
            cursor.y = draw_row(surface, &cursor, kind, index, row)?;
        }

        debug!("Rendered {} section with {} rows", kind.name(), rows.len());
        Ok(())
    }

    fn start_page<S: DrawingSurface>(
        &self,
        surface: &mut S,
        text: &HeaderText<'_>,
        kind: TableKind,
    ) -> std::result::Result<RenderCursor, S::Error> {
        surface.new_page()?;
        debug!(
            "Started page {} ({} section)",
            surface.page_count(),
            kind.name()
        );
        self.draw_page_header(surface, text, kind)?;
        draw_table_header(surface, TABLE_HEADER_Y, kind)
    }

    /// Title and the two label/value lines
    fn draw_page_header<S: DrawingSurface>(
        &self,
        surface: &mut S,
        text: &HeaderText<'_>,
        kind: TableKind,
    ) -> std::result::Result<(), S::Error> {
        let config = &self.config;
        let header = text.header;

        surface.text(
            config.title(kind),
            0.0,
            TITLE_Y,
            TextStyle {
                font_size: TITLE_FONT_SIZE,
                width: Some(PAGE_SIZE.width),
                align: Align::Center,
            },
        )?;

        let label = TextStyle {
            font_size: INFO_FONT_SIZE,
            width: None,
            align: Align::Left,
        };
        let value = |width| TextStyle::clipped(INFO_FONT_SIZE, width);

        let y = INFO_FIRST_LINE_Y;
        surface.text(&config.company_label, 30.0, y, label)?;
        surface.text(&header.company, 100.0, y, value(300.0))?;
        surface.text(&config.date_label, 420.0, y, label)?;
        surface.text(&text.date, 460.0, y, label)?;
        surface.text(&config.time_label, 680.0, y, label)?;
        surface.text(&text.time, 720.0, y, label)?;

        let y = INFO_SECOND_LINE_Y;
        surface.text(&config.area_label, 30.0, y, label)?;
        surface.text(&header.area, 100.0, y, value(300.0))?;
        surface.text(&config.executed_by_label, 420.0, y, label)?;
        surface.text(&header.executed_by, 520.0, y, value(290.0))?;

        Ok(())
    }
}

/// Draw the header cells of a table whose top is at `y`
///
/// Returns the cursor for the first row, just below the header.
fn draw_table_header<S: DrawingSurface>(
    surface: &mut S,
    y: f64,
    kind: TableKind,
) -> std::result::Result<RenderCursor, S::Error> {
    let columns = kind.columns();
    let mut x = MARGIN;

    for column in columns {
        let width = column.width_pt();
        surface.stroke_rect(Rect::new(x, y, width, TABLE_HEADER_HEIGHT))?;
        surface.text(
            column.label,
            x + CELL_INSET,
            y + TABLE_HEADER_TEXT_OFFSET,
            TextStyle::clipped(TABLE_HEADER_FONT_SIZE, width - 2.0 * CELL_INSET),
        )?;
        x += width;
    }

    Ok(RenderCursor {
        columns,
        x: MARGIN,
        y: y + TABLE_HEADER_HEIGHT,
    })
}

/// Draw one row at the cursor and return the y of the next row
fn draw_row<S: DrawingSurface, R: ReportRow>(
    surface: &mut S,
    cursor: &RenderCursor,
    kind: TableKind,
    index: usize,
    row: &R,
) -> std::result::Result<f64, S::Error> {
    let y = cursor.y;
    let mut x = cursor.x;
    let mut photo_x = None;

    for column in cursor.columns {
        let width = column.width_pt();
        surface.stroke_rect(Rect::new(x, y, width, ROW_HEIGHT))?;

        match column.kind {
            ColumnKind::Text(field) => surface.text(
                row.field(field),
                x + CELL_INSET,
                y + CELL_INSET,
                TextStyle::clipped(ROW_FONT_SIZE, width - 2.0 * CELL_INSET),
            )?,
            ColumnKind::Media(MediaSlot::Photo) => photo_x = Some(x),
            ColumnKind::Media(_) => {}
        }
        x += width;
    }

    if let (Some(payload), Some(photo_x)) = (row.photo(), photo_x) {
        let bounds = Rect::new(photo_x, y + CELL_INSET, PHOTO_SIZE, PHOTO_SIZE);
        if let Err(e) = draw_photo(surface, payload, bounds) {
            warn!(
                "Skipping photo of {} row {}: {}",
                kind.name(),
                index,
                e
            );
        }
    }

    Ok(y + ROW_HEIGHT)
}

fn draw_photo<S: DrawingSurface>(
    surface: &mut S,
    payload: &str,
    bounds: Rect,
) -> std::result::Result<(), MediaError> {
    let data = decode_photo(payload)?;
    surface
        .image(&data, bounds)
        .map_err(|e| MediaError::Surface(e.to_string()))
}

/// Decode a base64 photo, tolerating whitespace, missing padding and a
/// `data:image/...;base64,` prefix
fn decode_photo(payload: &str) -> std::result::Result<Vec<u8>, MediaError> {
    let payload = match payload.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(LENIENT_BASE64.decode(compact)?)
}

fn render_failure<E: std::fmt::Display>(header: &FormHeader, e: E) -> ReportError {
    error!("Rendering form {} failed: {}", header.id, e);
    ReportError::RenderFailure(e.to_string())
}
