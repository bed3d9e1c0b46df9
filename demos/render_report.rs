//! Inspection Report Generator
//!
//! Renders an inspection form as a PDF report. Reads the form record from
//! the JSON file given as first argument, or uses a built-in sample form.
//!
//! Run with: cargo run -p inspection-report --example render_report [form.json]

use inspection_report::{FormRecord, ReportRenderer};

const SAMPLE_FORM: &str = r#"{
    "form": {
        "id": 1,
        "empresa": "Acme Indústria Ltda",
        "area": "Subestação principal",
        "data": "2024-01-10",
        "hora": "09:00:00",
        "executadoPor": "J. Silva"
    },
    "checklistItems": [
        {
            "standard": "NR10 10.2.4",
            "description": "Prontuário de instalações elétricas disponível",
            "condition": "C",
            "fe": "S",
            "nper": "1",
            "comment": "Atualizado em 2023"
        },
        {
            "standard": "NR10 10.3.9",
            "description": "Quadros de distribuição sinalizados",
            "condition": "NC",
            "fe": "N",
            "nper": "3"
        }
    ],
    "documentationItems": [
        {
            "standard": "NR10 10.2.3",
            "description": "Esquemas unifilares atualizados",
            "condition": "C",
            "comment": "Revisão 4"
        }
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load the form record
    let json = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_FORM.to_string(),
    };
    let record: FormRecord = serde_json::from_str(&json)?;

    // Render with the default Portuguese labels
    let pdf_bytes = ReportRenderer::default().render_pdf(&record)?;

    // Save output
    std::fs::create_dir_all("output")?;
    let output_path = format!("output/formulario-{}.pdf", record.header.id);
    std::fs::write(&output_path, &pdf_bytes)?;

    println!("Generated: {output_path} ({} bytes)", pdf_bytes.len());

    Ok(())
}
