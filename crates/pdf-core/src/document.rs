//! PDF Document builder

use crate::font::{encode_text_hex, font_dictionary, text_width, FONT_ASCENT, FONT_RESOURCE};
use crate::image::{fit_in_box, image_operators, RasterImage};
use crate::text::{calculate_x_offset, generate_text_operators, ClipBox, TextRenderContext};
use crate::{Align, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

/// Operators every page content stream starts with: 1pt black strokes
const PAGE_PROLOGUE: &[u8] = b"1 w\n0 0 0 RG\n";

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// A4 landscape (842 x 595)
    pub const A4_LANDSCAPE: PageSize = PageSize {
        width: 842.0,
        height: 595.0,
    };
}

/// Per-page state collected while drawing
#[derive(Debug, Default)]
struct PageState {
    /// Content stream operators
    content: Vec<u8>,
    /// Image resources used by the page (resource name -> object ID)
    images: BTreeMap<String, ObjectId>,
}

/// An embedded image XObject and its pixel dimensions
#[derive(Debug, Clone, Copy)]
struct EmbeddedImage {
    id: ObjectId,
    width: u32,
    height: u32,
}

/// PDF document builder providing page-level drawing operations
///
/// Pages are numbered from 1. Coordinates are points measured from the
/// top-left corner of the page; conversion to PDF's bottom-left origin
/// happens here.
pub struct PdfDocument {
    /// The underlying lopdf document (object arena)
    inner: Document,
    /// Size shared by every page
    page_size: PageSize,
    /// Pages in order
    pages: Vec<PageState>,
    /// Fill color for text
    text_color: Color,
    /// Embedded images (data hash -> XObject)
    embedded_images: HashMap<u64, EmbeddedImage>,
    /// Next image resource number
    next_image_resource: u32,
}

impl PdfDocument {
    /// Create an empty document; call [`PdfDocument::add_page`] before drawing
    pub fn new(page_size: PageSize) -> Self {
        Self {
            inner: Document::with_version("1.7"),
            page_size,
            pages: Vec::new(),
            text_color: Color::default(),
            embedded_images: HashMap::new(),
            next_image_resource: 1,
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Size of every page in the document
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Append a blank page
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_page(&mut self) -> usize {
        self.pages.push(PageState {
            content: PAGE_PROLOGUE.to_vec(),
            images: BTreeMap::new(),
        });
        self.pages.len()
    }

    /// Stroke the outline of a rectangle
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    /// * `x` - Left edge in points
    /// * `y` - Top edge in points (from top)
    /// * `width` - Width in points
    /// * `height` - Height in points
    pub fn stroke_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let pdf_y = self.page_size.height - y - height;
        let ops = format!("{x} {pdf_y} {width} {height} re S\n");
        self.page_mut(page)?.content.extend_from_slice(ops.as_bytes());
        Ok(())
    }

    /// Insert a single line of text
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate of the top of the line in points (from top)
    /// * `font_size` - Font size in points
    /// * `align` - Text alignment
    /// * `width` - Box width; when set, `align` is relative to `[x, x + width]`
    ///   and text is clipped to that range. When unset, `x` is the anchor
    ///   for the alignment.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        font_size: f64,
        align: Align,
        width: Option<f64>,
    ) -> Result<()> {
        // Bad page numbers fail even for empty text
        self.page_mut(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let total_width = text_width(text, font_size);
        let start_x = match width {
            Some(box_width) => x + calculate_x_offset(total_width, box_width, align),
            None => match align {
                Align::Left => x,
                Align::Center => x - total_width / 2.0,
                Align::Right => x - total_width,
            },
        };

        let page_height = self.page_size.height;
        let baseline = page_height - (y + font_size * FONT_ASCENT);

        let ctx = TextRenderContext {
            font_name: FONT_RESOURCE.to_string(),
            font_size,
            color: self.text_color,
            clip: width.map(|w| ClipBox {
                x,
                y: 0.0,
                width: w.max(0.0),
                height: page_height,
            }),
        };

        let operators = generate_text_operators(&encode_text_hex(text), start_x, baseline, &ctx);
        self.page_mut(page)?.content.extend_from_slice(&operators);

        Ok(())
    }

    /// Insert an image fitted into a bounding box
    ///
    /// The image keeps its aspect ratio and is centred inside the box.
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - Left edge of the box in points
    /// * `y` - Top edge of the box in points (from top)
    /// * `width` - Box width in points
    /// * `height` - Box height in points
    pub fn insert_image_fit(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.page_mut(page)?;

        let (resource_name, orig_width, orig_height) = self.get_or_create_image_ref(data, page)?;

        let (actual_width, actual_height) = fit_in_box(orig_width, orig_height, width, height);

        let draw_x = x + (width - actual_width) / 2.0;
        let draw_y = y + (height - actual_height) / 2.0;
        let pdf_y = self.page_size.height - draw_y - actual_height;

        let operators =
            image_operators(&resource_name, draw_x, pdf_y, actual_width, actual_height);
        self.page_mut(page)?.content.extend_from_slice(&operators);

        Ok(())
    }

    /// Get or create an image reference for a specific page
    ///
    /// Returns the resource name (e.g., "Im1", "Im2") and original dimensions.
    /// Images are deduplicated by hash of their data.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<(String, u32, u32)> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let embedded = match self.embedded_images.get(&data_hash) {
            Some(embedded) => *embedded,
            None => {
                let image = RasterImage::decode(data)?;
                let (width, height) = (image.width, image.height);
                let embedded = EmbeddedImage {
                    id: self.inner.add_object(image.into_stream()),
                    width,
                    height,
                };
                self.embedded_images.insert(data_hash, embedded);
                embedded
            }
        };

        let next_resource = self.next_image_resource;
        let page_state = self.page_mut(page)?;

        if let Some((name, _)) = page_state
            .images
            .iter()
            .find(|(_, id)| **id == embedded.id)
        {
            return Ok((name.clone(), embedded.width, embedded.height));
        }

        let resource_name = format!("Im{next_resource}");
        page_state.images.insert(resource_name.clone(), embedded.id);
        self.next_image_resource += 1;

        Ok((resource_name, embedded.width, embedded.height))
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut PageState> {
        let page_count = self.pages.len();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(&mut self.pages[page - 1])
    }

    /// Finalise the document and serialise it to bytes
    ///
    /// Writes the font, one content stream and resource dictionary per page,
    /// the page tree and the catalog. Output depends only on what was drawn.
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(PdfError::SaveError("Document has no pages".to_string()));
        }

        let font_id = self.inner.add_object(font_dictionary());
        let pages_id = self.inner.new_object_id();
        let media_box = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(self.page_size.width as _),
            Object::Real(self.page_size.height as _),
        ]);

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in std::mem::take(&mut self.pages) {
            let contents_id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), page.content));

            let mut font_dict = Dictionary::new();
            font_dict.set(FONT_RESOURCE, Object::Reference(font_id));

            let mut resources = Dictionary::new();
            resources.set("Font", Object::Dictionary(font_dict));
            if !page.images.is_empty() {
                let mut xobjects = Dictionary::new();
                for (name, id) in &page.images {
                    xobjects.set(name.as_bytes(), Object::Reference(*id));
                }
                resources.set("XObject", Object::Dictionary(xobjects));
            }

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", Object::Name(b"Page".to_vec()));
            page_dict.set("Parent", Object::Reference(pages_id));
            page_dict.set("MediaBox", media_box.clone());
            page_dict.set("Resources", Object::Dictionary(resources));
            page_dict.set("Contents", Object::Reference(contents_id));

            kids.push(Object::Reference(self.inner.add_object(page_dict)));
        }

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", kids.len() as i64);
        pages_dict.set("Kids", Object::Array(kids));
        self.inner
            .objects
            .insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = self.inner.add_object(catalog);
        self.inner.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }
}
