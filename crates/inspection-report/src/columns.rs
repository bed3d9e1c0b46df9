//! Column descriptors for the two report tables
//!
//! Each table is a fixed, ordered list of columns. A column either shows a
//! text field of the row or is a media placeholder (photo, audio, pdf) whose
//! cell is drawn empty; the photo cell is where the thumbnail goes.

use crate::model::{ChecklistRow, DocumentationRow};

/// Text fields a row can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    StandardRef,
    Description,
    Condition,
    Fe,
    Nper,
    Comment,
}

/// Media placeholder columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    Photo,
    Audio,
    Pdf,
}

/// What a column's cells contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text(Field),
    Media(MediaSlot),
}

/// A table column: header label, width in points and content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub label: &'static str,
    pub width: u16,
    pub kind: ColumnKind,
}

impl Column {
    const fn text(label: &'static str, width: u16, field: Field) -> Self {
        Self {
            label,
            width,
            kind: ColumnKind::Text(field),
        }
    }

    const fn media(label: &'static str, width: u16, slot: MediaSlot) -> Self {
        Self {
            label,
            width,
            kind: ColumnKind::Media(slot),
        }
    }

    /// Width in points
    pub fn width_pt(&self) -> f64 {
        self.width as f64
    }
}

/// Checklist table: 780pt wide
pub const CHECKLIST_COLUMNS: [Column; 8] = [
    Column::text("ITENS DAS NORMAS", 120, Field::StandardRef),
    Column::text("DESCRIÇÃO DO ITEM", 200, Field::Description),
    Column::text("CONDIÇÃO", 80, Field::Condition),
    Column::media("FOTO", 80, MediaSlot::Photo),
    Column::text("FE", 60, Field::Fe),
    Column::media("AUDIO", 60, MediaSlot::Audio),
    Column::text("NPER", 60, Field::Nper),
    Column::text("COMENTÁRIO", 120, Field::Comment),
];

/// Documentation table: 780pt wide
pub const DOCUMENTATION_COLUMNS: [Column; 7] = [
    Column::text("ITENS DAS NORMAS", 120, Field::StandardRef),
    Column::text("DESCRIÇÃO DO ITEM", 200, Field::Description),
    Column::text("CONDIÇÃO", 80, Field::Condition),
    Column::media("FOTO", 80, MediaSlot::Photo),
    Column::media("AUDIO", 60, MediaSlot::Audio),
    Column::media("PDF", 60, MediaSlot::Pdf),
    Column::text("COMENTÁRIO", 180, Field::Comment),
];

/// The two report tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Checklist,
    Documentation,
}

impl TableKind {
    /// Columns of this table, in drawing order
    pub fn columns(self) -> &'static [Column] {
        match self {
            TableKind::Checklist => &CHECKLIST_COLUMNS,
            TableKind::Documentation => &DOCUMENTATION_COLUMNS,
        }
    }

    /// Column widths in points, in drawing order
    pub fn column_widths(self) -> Vec<f64> {
        self.columns().iter().map(Column::width_pt).collect()
    }

    /// Short name used in log messages
    pub fn name(self) -> &'static str {
        match self {
            TableKind::Checklist => "checklist",
            TableKind::Documentation => "documentation",
        }
    }
}

/// A row that can be drawn in a report table
pub trait ReportRow {
    /// Text of a field; absent optional fields are empty
    fn field(&self, field: Field) -> &str;

    /// Base64-encoded photo, if the row carries one
    fn photo(&self) -> Option<&str>;
}

impl ReportRow for ChecklistRow {
    fn field(&self, field: Field) -> &str {
        match field {
            Field::StandardRef => &self.standard_ref,
            Field::Description => &self.description,
            Field::Condition => &self.condition,
            Field::Fe => &self.fe,
            Field::Nper => &self.nper,
            Field::Comment => self.comment.as_deref().unwrap_or_default(),
        }
    }

    fn photo(&self) -> Option<&str> {
        self.photo.as_deref().filter(|p| !p.is_empty())
    }
}

impl ReportRow for DocumentationRow {
    fn field(&self, field: Field) -> &str {
        match field {
            Field::StandardRef => &self.standard_ref,
            Field::Description => &self.description,
            Field::Condition => &self.condition,
            Field::Comment => self.comment.as_deref().unwrap_or_default(),
            // Not part of the documentation table
            Field::Fe | Field::Nper => "",
        }
    }

    fn photo(&self) -> Option<&str> {
        self.photo.as_deref().filter(|p| !p.is_empty())
    }
}
