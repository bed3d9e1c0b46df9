//! Integration tests for pdf-core
//!
//! These tests build documents end to end and re-open the bytes with lopdf.

use lopdf::content::Content;
use pdf_core::{Align, PageSize, PdfDocument, PdfError};
use pretty_assertions::assert_eq;

/// Create a small PNG image for testing
fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    use image::{ImageBuffer, Luma};

    let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::new(width, height);
    let mut buffer = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut buffer),
        image::ImageFormat::Png,
    )
    .expect("Failed to create PNG");
    buffer
}

/// Create a small JPEG image for testing
fn create_test_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([10, 200, 30]));
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Jpeg,
        )
        .expect("Failed to create JPEG");
    buffer
}

/// Operator names of a page's content stream
fn page_operators(doc: &lopdf::Document, page: u32) -> Vec<String> {
    let page_id = doc.get_pages()[&page];
    let content = doc.get_page_content(page_id).expect("page content");
    Content::decode(&content)
        .expect("decodable content")
        .operations
        .into_iter()
        .map(|op| op.operator)
        .collect()
}

#[test]
fn test_empty_pages_roundtrip() {
    let mut doc = PdfDocument::new(PageSize::A4_LANDSCAPE);
    doc.add_page();
    doc.add_page();

    let bytes = doc.to_bytes().expect("Failed to save PDF");
    let reopened = lopdf::Document::load_mem(&bytes).expect("Failed to re-open PDF");

    assert_eq!(reopened.get_pages().len(), 2);
}

#[test]
fn test_pages_are_landscape() {
    let mut doc = PdfDocument::new(PageSize::A4_LANDSCAPE);
    doc.add_page();
    let bytes = doc.to_bytes().unwrap();

    let reopened = lopdf::Document::load_mem(&bytes).unwrap();
    let page_id = reopened.get_pages()[&1];
    let page = reopened.get_object(page_id).unwrap().as_dict().unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();

    let width = media_box[2].as_float().unwrap();
    let height = media_box[3].as_float().unwrap();
    assert_eq!((width, height), (842.0, 595.0));
}

#[test]
fn test_rect_and_text_operators() {
    let mut doc = PdfDocument::new(PageSize::A4_LANDSCAPE);
    let page = doc.add_page();
    doc.stroke_rect(page, 30.0, 140.0, 120.0, 30.0).unwrap();
    doc.insert_text(
        "ITENS DAS NORMAS",
        page,
        35.0,
        150.0,
        10.0,
        Align::Left,
        Some(110.0),
    )
    .unwrap();

    let bytes = doc.to_bytes().unwrap();
    let reopened = lopdf::Document::load_mem(&bytes).unwrap();
    let ops = page_operators(&reopened, 1);

    assert_eq!(ops.iter().filter(|op| *op == "re").count(), 2); // cell + clip
    assert_eq!(ops.iter().filter(|op| *op == "S").count(), 1);
    assert_eq!(ops.iter().filter(|op| *op == "Tj").count(), 1);
    assert_eq!(ops.iter().filter(|op| *op == "W").count(), 1);
}

#[test]
fn test_text_uses_helvetica() {
    let mut doc = PdfDocument::new(PageSize::A4_LANDSCAPE);
    let page = doc.add_page();
    doc.insert_text("ÁREA:", page, 30.0, 100.0, 10.0, Align::Left, None)
        .unwrap();

    let bytes = doc.to_bytes().unwrap();
    let reopened = lopdf::Document::load_mem(&bytes).unwrap();
    let page_id = reopened.get_pages()[&1];
    let fonts = reopened.get_page_fonts(page_id);
    let font = fonts.get(b"F1".as_slice()).expect("F1 registered");

    assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");
}

#[test]
fn test_insert_png_image() {
    let mut doc = PdfDocument::new(PageSize::A4_LANDSCAPE);
    let page = doc.add_page();
    doc.insert_image_fit(&create_test_png(40, 20), page, 430.0, 175.0, 50.0, 50.0)
        .expect("Failed to insert PNG");

    let bytes = doc.to_bytes().unwrap();
    let reopened = lopdf::Document::load_mem(&bytes).unwrap();
    let ops = page_operators(&reopened, 1);

    assert_eq!(ops.iter().filter(|op| *op == "Do").count(), 1);
}

#[test]
fn test_insert_jpeg_image() {
    let mut doc = PdfDocument::new(PageSize::A4_LANDSCAPE);
    let page = doc.add_page();
    doc.insert_image_fit(&create_test_jpeg(), page, 430.0, 175.0, 50.0, 50.0)
        .expect("Failed to insert JPEG");
    assert!(doc.to_bytes().is_ok());
}

#[test]
fn test_same_image_embedded_once() {
    let png = create_test_png(10, 10);
    let mut doc = PdfDocument::new(PageSize::A4_LANDSCAPE);
    let first = doc.add_page();
    let second = doc.add_page();
    doc.insert_image_fit(&png, first, 0.0, 0.0, 50.0, 50.0).unwrap();
    doc.insert_image_fit(&png, first, 60.0, 0.0, 50.0, 50.0).unwrap();
    doc.insert_image_fit(&png, second, 0.0, 0.0, 50.0, 50.0).unwrap();

    let bytes = doc.to_bytes().unwrap();
    let reopened = lopdf::Document::load_mem(&bytes).unwrap();
    let image_count = reopened
        .objects
        .values()
        .filter(|obj| {
            obj.as_stream()
                .ok()
                .and_then(|s| s.dict.get(b"Subtype").ok())
                .and_then(|s| s.as_name().ok())
                == Some(b"Image".as_slice())
        })
        .count();

    assert_eq!(image_count, 1);
}

#[test]
fn test_invalid_image_is_rejected() {
    let mut doc = PdfDocument::new(PageSize::A4_LANDSCAPE);
    let page = doc.add_page();
    let result = doc.insert_image_fit(b"definitely not an image", page, 0.0, 0.0, 50.0, 50.0);
    assert!(matches!(result, Err(PdfError::ImageError(_))));

    // The failed insert leaves the page usable
    doc.insert_text("ok", page, 0.0, 0.0, 8.0, Align::Left, None)
        .unwrap();
    assert!(doc.to_bytes().is_ok());
}

#[test]
fn test_output_is_deterministic() {
    let build = || {
        let mut doc = PdfDocument::new(PageSize::A4_LANDSCAPE);
        let page = doc.add_page();
        doc.stroke_rect(page, 30.0, 170.0, 80.0, 60.0).unwrap();
        doc.insert_text("Acme", page, 100.0, 80.0, 10.0, Align::Left, Some(300.0))
            .unwrap();
        doc.insert_image_fit(&create_test_png(5, 5), page, 430.0, 175.0, 50.0, 50.0)
            .unwrap();
        doc.to_bytes().unwrap()
    };

    assert_eq!(build(), build());
}
