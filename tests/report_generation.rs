use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use devops_report::charts::ChartRenderer;
use devops_report::{generate, GenerateOptions, ReportCompiler, ReportError};
use tempfile::TempDir;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/assessment.json");

fn compiler() -> ReportCompiler {
    ReportCompiler::new(ChartRenderer::without_text())
}

fn options(json: impl Into<PathBuf>, logo: impl Into<PathBuf>, output_dir: &Path) -> GenerateOptions {
    GenerateOptions {
        json: json.into(),
        logo: logo.into(),
        output_dir: output_dir.to_path_buf(),
        write_pdf: false,
    }
}

fn docx_entries(path: &Path) -> (String, Vec<String>) {
    let file = fs::File::open(path).expect("open docx");
    let mut archive = zip::ZipArchive::new(file).expect("docx is a zip archive");
    let names = archive.file_names().map(str::to_owned).collect();

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .expect("document part")
        .read_to_string(&mut xml)
        .expect("utf-8 document part");
    (xml, names)
}

fn media_count(names: &[String]) -> usize {
    names.iter().filter(|name| name.contains("media/")).count()
}

#[test]
fn fixture_generates_named_docx_with_all_sections() {
    let dir = TempDir::new().expect("temp dir");
    let files = generate(
        &compiler(),
        &options(FIXTURE, dir.path().join("no-logo.png"), dir.path()),
    )
    .expect("generate report");

    assert_eq!(
        files.docx,
        dir.path()
            .join("Reporte_EstudioDevOps_Banco_del_Norte_2025-11.docx")
    );
    assert!(files.pdf.is_none());

    let (xml, names) = docx_entries(&files.docx);
    for expected in [
        "REPORTE DE MADUREZ DEVOPS",
        "Cliente: Banco del Norte",
        "Información General",
        "Despliegues manuales en producción",
        "Evaluación por Pilar WAF",
        "Sin escaneo de dependencias",
        "Centralizar secretos",
        "4 meses",
        "Implementación de Key Vault",
        "68%",
        "Lead Time: 2 días, Deployment Frequency: Semanal, Change Failure Rate: 10%",
        "Pipeline CD, Key Vault",
        "Tabla de Servicios Azure Recomendados",
        "Azure AI Vision / Document Intelligence",
        "gestionada",
    ] {
        assert!(xml.contains(expected), "document.xml lacks {expected:?}");
    }

    // banner, radar, bar and pie charts
    assert!(media_count(&names) >= 4, "media parts: {names:?}");
}

#[test]
fn logo_is_embedded_when_present() {
    let dir = TempDir::new().expect("temp dir");
    let logo = dir.path().join("logo.png");
    image::RgbImage::from_pixel(64, 32, image::Rgb([0x51, 0xFF, 0x78]))
        .save(&logo)
        .expect("write logo");

    let without = generate(
        &compiler(),
        &options(FIXTURE, dir.path().join("missing.png"), &dir.path().join("a")),
    )
    .expect("generate without logo");
    let with = generate(&compiler(), &options(FIXTURE, &logo, &dir.path().join("b")))
        .expect("generate with logo");

    let (_, without_names) = docx_entries(&without.docx);
    let (_, with_names) = docx_entries(&with.docx);
    assert_eq!(media_count(&with_names), media_count(&without_names) + 1);
}

#[test]
fn empty_object_renders_placeholders() {
    let dir = TempDir::new().expect("temp dir");
    let json = dir.path().join("vacio.json");
    fs::write(&json, "{}").expect("write json");

    let files = generate(&compiler(), &options(&json, "missing.png", dir.path()))
        .expect("generate from empty object");
    let file_name = files
        .docx
        .file_name()
        .and_then(|name| name.to_str())
        .expect("file name");
    assert!(file_name.starts_with("Reporte_EstudioDevOps_Cliente_"));
    assert!(file_name.ends_with(".docx"));

    let (xml, _) = docx_entries(&files.docx);
    assert!(xml.contains("N/A"));
    assert!(xml.contains("Equipo Readymind"));
}

#[test]
fn missing_json_is_input_not_found() {
    let dir = TempDir::new().expect("temp dir");
    let err = generate(
        &compiler(),
        &options(dir.path().join("nope.json"), "missing.png", dir.path()),
    )
    .unwrap_err();
    assert!(matches!(err, ReportError::InputNotFound(path) if path.ends_with("nope.json")));
    assert_eq!(fs::read_dir(dir.path()).expect("list").count(), 0);
}

#[test]
fn invalid_json_is_a_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    let json = dir.path().join("roto.json");
    fs::write(&json, "{\"cliente\": ").expect("write json");

    let err = generate(&compiler(), &options(&json, "missing.png", dir.path())).unwrap_err();
    assert!(matches!(err, ReportError::Json(_)));
}
