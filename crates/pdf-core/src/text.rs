//! Text object operators

use std::fmt::Write;

use crate::document::Color;
use crate::Align;

/// Rectangle in PDF coordinates (bottom-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// How a single line of text is painted
#[derive(Debug, Clone, PartialEq)]
pub struct TextRenderContext {
    /// Font resource name on the page (e.g., "F1")
    pub font_name: String,
    pub font_size: f64,
    pub color: Color,
    /// Text running past this box is cut off, never wrapped
    pub clip: Option<ClipBox>,
}

/// Horizontal offset of a line of `text_width` inside `container_width`
pub fn calculate_x_offset(text_width: f64, container_width: f64, align: Align) -> f64 {
    match align {
        Align::Left => 0.0,
        Align::Center => (container_width - text_width) / 2.0,
        Align::Right => container_width - text_width,
    }
}

/// Build a `BT ... ET` text object drawing `text_hex` at baseline `(x, y)`
///
/// With a clip box the object is wrapped in `q <box> re W n ... Q`.
pub fn generate_text_operators(text_hex: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = String::new();
    let Color { r, g, b } = ctx.color;

    // Writing into a String cannot fail
    if let Some(clip) = ctx.clip {
        let _ = write!(
            ops,
            "q\n{} {} {} {} re W n\n",
            clip.x, clip.y, clip.width, clip.height
        );
    }
    let _ = write!(
        ops,
        "BT\n{r} {g} {b} rg\n/{} {} Tf\n{x} {y} Td\n{text_hex} Tj\nET\n",
        ctx.font_name, ctx.font_size
    );
    if ctx.clip.is_some() {
        ops.push_str("Q\n");
    }

    ops.into_bytes()
}
