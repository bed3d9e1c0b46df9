//! End-to-end report rendering into PDF bytes

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{NaiveDate, NaiveTime};
use inspection_report::{
    ChecklistRow, DocumentationRow, FormHeader, FormRecord, ReportConfig, ReportRenderer,
};
use lopdf::content::Content;
use pretty_assertions::assert_eq;

fn header() -> FormHeader {
    FormHeader {
        id: 7,
        company: "Acme".to_string(),
        area: "Floor1".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        executed_by: "J. Silva".to_string(),
    }
}

fn record(checklist: usize, documentation: usize) -> FormRecord {
    FormRecord {
        header: header(),
        checklist_items: (0..checklist)
            .map(|n| ChecklistRow {
                standard_ref: format!("NR10 10.{n}"),
                description: "Quadro de distribuição identificado".to_string(),
                condition: "C".to_string(),
                fe: "S".to_string(),
                nper: "2".to_string(),
                comment: Some("Sem observações".to_string()),
                ..Default::default()
            })
            .collect(),
        documentation_items: (0..documentation)
            .map(|n| DocumentationRow {
                standard_ref: format!("NR10 10.2.{n}"),
                description: "Prontuário das instalações".to_string(),
                condition: "NC".to_string(),
                ..Default::default()
            })
            .collect(),
    }
}

fn png_base64(width: u32, height: u32) -> String {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )
        .expect("Failed to create PNG");
    STANDARD.encode(buffer)
}

fn image_draws(doc: &lopdf::Document) -> usize {
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            Content::decode(&content)
                .unwrap()
                .operations
                .iter()
                .filter(|op| op.operator == "Do")
                .count()
        })
        .sum()
}

#[test]
fn test_page_counts() {
    let renderer = ReportRenderer::default();
    let cases = [((0, 0), 2), ((6, 0), 2), ((7, 0), 3), ((7, 13), 5), ((12, 1), 3)];

    for ((checklist, documentation), expected) in cases {
        let bytes = renderer
            .render_pdf(&record(checklist, documentation))
            .unwrap();
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(
            doc.get_pages().len(),
            expected,
            "{checklist} checklist rows, {documentation} documentation rows"
        );
    }
}

#[test]
fn test_photos_embedded_per_row() {
    let mut form = record(3, 2);
    form.checklist_items[0].photo = Some(png_base64(40, 20));
    form.checklist_items[1].photo = Some("corrupt!!".to_string());
    form.checklist_items[2].photo = Some(STANDARD.encode(b"not an image at all"));
    form.documentation_items[1].photo = Some(png_base64(10, 30));

    let bytes = ReportRenderer::default().render_pdf(&form).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();

    assert_eq!(doc.get_pages().len(), 2);
    assert_eq!(image_draws(&doc), 2);
}

#[test]
fn test_output_is_deterministic() {
    let mut form = record(9, 4);
    form.documentation_items[3].photo = Some(png_base64(8, 8));
    let renderer = ReportRenderer::default();

    assert_eq!(
        renderer.render_pdf(&form).unwrap(),
        renderer.render_pdf(&form).unwrap()
    );
}

#[test]
fn test_custom_labels() {
    let config = ReportConfig::from_json(
        r#"{"checklistTitle": "ELECTRICAL INSTALLATION CHECKLIST", "dateFormat": "%Y-%m-%d"}"#,
    )
    .unwrap();

    let bytes = ReportRenderer::new(config)
        .render_pdf(&record(1, 1))
        .unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}
