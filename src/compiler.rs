//! Maps an [`AssessmentReport`] onto the fixed section layout of the maturity report.
//!
//! The layout is: cover, general information, executive summary, global result, WAF pillar
//! table with radar chart, recommendations, work plan with effort charts, detailed tasks,
//! evolution projection, roadmap, recommended Azure services and the closing conclusion.
//! [`generate`] wraps compilation with file handling and rendering.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::{info, warn};

use crate::assessment::{AssessmentReport, PLACEHOLDER};
use crate::charts::ChartRenderer;
use crate::docx::render_docx;
use crate::elements::{decode_image_from_path, encode_png};
use crate::error::ReportError;
use crate::model::{Block, Cover, ReportDocument, Section, TableBlock};
use crate::palette::AZURE;
use crate::richtext::Span;
use crate::scoring::PillarSeries;

pub const REPORT_TITLE: &str = "REPORTE DE MADUREZ DEVOPS";
pub const REPORT_SUBTITLE: &str =
    "Readymind México – Evaluación basada en Azure Well-Architected Framework y CMMI";
pub const FILE_PREFIX: &str = "Reporte_EstudioDevOps";

/// Closing paragraph, split around the maturity level that is set in italics.
pub const CONCLUSION_LEAD: &str = "El estado actual muestra una madurez ";
pub const CONCLUSION_LEVEL: &str = "gestionada";
pub const CONCLUSION_TAIL: &str = " con \
oportunidades claras en seguridad, automatización, observabilidad y gobernanza. La hoja de ruta \
propuesta, basada en Azure Well-Architected Framework y buenas prácticas CMMI, proyecta alcanzar \
un 65–70% de madurez en el corto plazo, mejorando resiliencia, velocidad de entrega y postura de \
seguridad, con beneficios tangibles en continuidad operativa y control de costos.";

pub const SERVICES_HEADERS: [&str; 4] = [
    "Área evaluada relacionada",
    "Servicio",
    "Descripción detallada",
    "Modelo de costos",
];

/// Recommended Azure services, independent of the assessment data.
pub const AZURE_SERVICES: [[&str; 4]; 14] = [
    ["Seguridad", "Microsoft Defender for Cloud", "Protección unificada de cargas en Azure, alertas, hardening y recomendaciones de seguridad.", "Por recurso"],
    ["Gestión de secretos", "Azure Key Vault", "Almacenamiento seguro de secretos, claves y certificados con RBAC e integración con CI/CD.", "Por recurso"],
    ["Observabilidad", "Azure Monitor", "Métricas, logs, alertas y tableros; integración con Application Insights.", "Por consumo"],
    ["Observabilidad", "Azure Application Insights", "Telemetría, trazas distribuidas, performance y diagnóstico para apps.", "Por consumo"],
    ["Automatización", "Azure Automation", "Runbooks, Desired State Configuration y tareas programadas para operación.", "Por ejecución"],
    ["DevOps", "Azure DevOps", "Repos, Pipelines, Boards, Test Plans para CI/CD y gestión ágil.", "Por usuario"],
    ["Código Seguro", "GitHub Advanced Security", "Code scanning, secret scanning y dependabot alerts para seguridad.", "Por repositorio"],
    ["Productividad IA", "GitHub Copilot", "Asistente de IA para desarrollo, generación de código y documentación.", "Por usuario"],
    ["Plataforma App + IA", "Azure App Service", "Hospedaje administrado para aplicaciones web y APIs con integración a servicios de IA.", "Por recurso"],
    ["Plataforma Contenedores + IA", "Azure Kubernetes Service (AKS)", "Orquestación de contenedores; integración con modelos y servicios de IA.", "Por nodo/por consumo"],
    ["APIs", "Azure API Management", "Gestión, publicación, seguridad y observabilidad de APIs.", "Por unidad"],
    ["IA Generativa", "Azure OpenAI Service", "Modelos GPT y Embeddings para copilots, chatbots y generación de contenido.", "Por token"],
    ["Búsqueda IA", "Azure AI Search", "Búsqueda semántica, indexación y RAG para aplicaciones con IA.", "Por consumo"],
    ["Visión/Documentos", "Azure AI Vision / Document Intelligence", "OCR, extracción de datos, clasificación y análisis de documentos.", "Por consumo"],
];

/// Rendered widths, in millimetres.
const BANNER_WIDTH_MM: f64 = 165.1;
const LOGO_WIDTH_MM: f64 = 40.64;
const WIDE_CHART_WIDTH_MM: f64 = 157.48;
const PIE_WIDTH_MM: f64 = 127.0;

/// A compiled report ready for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledReport {
    /// `Reporte_EstudioDevOps_<client>_<YYYY-MM>.docx`
    pub file_name: String,
    /// Assessment month, `YYYY-MM`.
    pub month: String,
    pub document: ReportDocument,
}

/// Returns `raw` when it parses as `YYYY-MM`, otherwise the month of `today`.
pub fn assessment_month(raw: Option<&str>, today: NaiveDate) -> String {
    match raw {
        Some(raw) if NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").is_ok() => {
            raw.to_owned()
        }
        _ => today.format("%Y-%m").to_string(),
    }
}

/// Output file name; spaces in the client name become underscores.
pub fn output_file_name(client: &str, month: &str) -> String {
    format!("{}_{}_{}.docx", FILE_PREFIX, client.replace(' ', "_"), month)
}

fn key_value(key: &str, value: impl Into<String>) -> Block {
    let value = value.into();
    let value = if value.is_empty() {
        PLACEHOLDER.to_owned()
    } else {
        value
    };
    Block::paragraph(vec![
        Span::new(format!("{key}: ")).bold().colored(AZURE),
        Span::new(value),
    ])
}

fn section(identifier: &str, title: &str) -> Section {
    Section::new(title).with_identifier(Some(identifier.to_owned()))
}

/// Reads and re-encodes the logo as PNG; problems are logged and the logo is skipped.
fn load_logo(path: &Path) -> Option<Vec<u8>> {
    if !path.is_file() {
        warn!(
            "Logo not found at {}; continuing without logo",
            path.display()
        );
        return None;
    }
    match decode_image_from_path(path).and_then(|image| encode_png(&image)) {
        Ok(png) => Some(png),
        Err(err) => {
            warn!("Skipping logo {}: {}", path.display(), err);
            None
        }
    }
}

/// Builds report documents from assessment payloads.
pub struct ReportCompiler {
    charts: ChartRenderer,
    today: NaiveDate,
}

impl Default for ReportCompiler {
    fn default() -> Self {
        Self::new(ChartRenderer::with_default_font())
    }
}

impl ReportCompiler {
    pub fn new(charts: ChartRenderer) -> Self {
        Self {
            charts,
            today: Local::now().date_naive(),
        }
    }

    /// Overrides the date used when the assessment month is missing or malformed.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn compile(
        &self,
        report: &AssessmentReport,
        logo: Option<&Path>,
    ) -> Result<CompiledReport, ReportError> {
        let client = report.client();
        let month = assessment_month(report.assessment_date(), self.today);
        let file_name = output_file_name(&client, &month);

        let mut document = ReportDocument::new(format!("{REPORT_TITLE} - {client}"))
            .with_cover(self.cover(&client, logo)?)
            .add_section(
                section("informacion-general", "Información General").with_blocks([
                    key_value("Cliente", client.as_str()),
                    key_value("Evaluador", report.evaluator()),
                    key_value("Fecha Assessment", month.as_str()),
                ]),
            )
            .add_section(executive_summary(report))
            .add_section(global_result(report));

        for section in self.pillar_sections(report)? {
            document = document.add_section(section);
        }
        for section in self.plan_sections(report)? {
            document = document.add_section(section);
        }
        document = document
            .add_section(roadmap(report))
            .add_section(services())
            .add_section(conclusion());

        info!(
            "Compiled report for '{}' ({}): {} sections",
            client,
            month,
            document.sections().len()
        );
        Ok(CompiledReport {
            file_name,
            month,
            document,
        })
    }

    fn cover(&self, client: &str, logo: Option<&Path>) -> Result<Cover, ReportError> {
        let mut cover = Cover::new(REPORT_TITLE)
            .with_subtitle(Some(REPORT_SUBTITLE.to_owned()))
            .with_identifier(Some(format!("Cliente: {client}")))
            .with_block(Block::image(self.charts.banner()?.png, BANNER_WIDTH_MM));
        if let Some(png) = logo.and_then(load_logo) {
            cover = cover.with_block(Block::image(png, LOGO_WIDTH_MM));
        }
        Ok(cover)
    }

    fn pillar_sections(&self, report: &AssessmentReport) -> Result<Vec<Section>, ReportError> {
        let pillars = report.pillars();
        let table = TableBlock::new(["Pilar", "Puntaje", "Observaciones"])
            .with_column_weights(vec![2, 1, 5])
            .with_rows(pillars.iter().map(|pillar| {
                [
                    pillar.name.clone(),
                    pillar.score_text.clone(),
                    pillar.observations.clone(),
                ]
            }));
        let radar = self.charts.radar(&PillarSeries::from_pillars(&pillars))?;

        let recommendations = TableBlock::new([
            "ID",
            "Descripción",
            "Servicio Azure",
            "Prioridad",
            "Impacto Esperado",
        ])
        .with_column_weights(vec![1, 4, 2, 1, 3])
        .with_rows(report.recommendations().into_iter().map(|rec| {
            [
                rec.id,
                rec.description,
                rec.azure_service,
                rec.priority,
                rec.expected_impact,
            ]
        }));

        Ok(vec![
            section("evaluacion-waf", "Evaluación por Pilar WAF")
                .with_block(Block::Table(table))
                .with_block(Block::image(radar.png, WIDE_CHART_WIDTH_MM)),
            section("recomendaciones", "Recomendaciones")
                .with_block(Block::Table(recommendations)),
        ])
    }

    fn plan_sections(&self, report: &AssessmentReport) -> Result<Vec<Section>, ReportError> {
        let plan = report.work_plan();
        let hours = self.charts.role_hours(&plan.roles)?;
        let share = self.charts.role_share(&plan.roles)?;

        let tasks = TableBlock::new(["ID", "Descripción", "Horas", "Dependencia", "Rol", "Fase"])
            .with_column_weights(vec![1, 4, 1, 1, 2, 2])
            .with_rows(plan.tasks.into_iter().map(|task| {
                [
                    task.id,
                    task.description,
                    task.estimated_hours,
                    task.dependency,
                    task.role,
                    task.phase,
                ]
            }));

        let projections = TableBlock::new([
            "Mes",
            "Madurez Esperada",
            "Capacidades Implementadas",
            "KPIs Esperados",
        ])
        .with_column_weights(vec![1, 1, 3, 3])
        .with_rows(report.projections().into_iter().map(|projection| {
            [
                projection.month,
                format!("{}%", projection.expected_maturity),
                projection.capabilities.join(", "),
                projection.kpis.summary(),
            ]
        }));

        Ok(vec![
            section("plan-trabajo", "Plan de Trabajo").with_blocks([
                key_value("Horas máximas", plan.max_hours),
                key_value("Periodo", format!("{} meses", plan.period_months)),
                key_value(
                    "Horas semanales por recurso",
                    plan.weekly_hours_per_resource,
                ),
                Block::image(hours.png, WIDE_CHART_WIDTH_MM),
                Block::image(share.png, PIE_WIDTH_MM),
            ]),
            section("tareas-detalladas", "Tareas Detalladas").with_block(Block::Table(tasks)),
            section("proyeccion-evolucion", "Proyección de Evolución")
                .with_block(Block::Table(projections)),
        ])
    }
}

fn executive_summary(report: &AssessmentReport) -> Section {
    let summary = report.executive_summary();
    section("resumen-ejecutivo", "Resumen Ejecutivo")
        .with_block(Block::heading(2, "Diagnóstico general"))
        .with_block(Block::text(summary.diagnosis))
        .with_block(Block::heading(2, "Hallazgos principales"))
        .with_blocks(summary.key_findings.into_iter().map(Block::bullet))
        .with_block(Block::heading(2, "Impacto en el negocio"))
        .with_block(Block::text(summary.business_impact))
}

fn global_result(report: &AssessmentReport) -> Section {
    let result = report.global_result();
    section("resultado-global", "Resultado Global").with_blocks([
        key_value("Puntuación total", result.total_score),
        key_value("Nivel predominante", result.predominant_level),
        key_value("Áreas críticas", result.critical_areas.join(", ")),
        key_value("Áreas fuertes", result.strong_areas.join(", ")),
    ])
}

fn roadmap(report: &AssessmentReport) -> Section {
    let table = TableBlock::new(["Mes", "Entregables", "Objetivos"])
        .with_column_weights(vec![1, 3, 3])
        .with_rows(report.roadmap().into_iter().map(|entry| {
            [
                entry.month,
                entry.deliverables.join(", "),
                entry.objectives.join(", "),
            ]
        }));
    section("roadmap", "Roadmap").with_block(Block::Table(table))
}

fn services() -> Section {
    let table = TableBlock::new(SERVICES_HEADERS)
        .with_column_weights(vec![2, 2, 5, 2])
        .with_rows(AZURE_SERVICES);
    section("servicios-azure", "Tabla de Servicios Azure Recomendados")
        .with_block(Block::Table(table))
}

fn conclusion() -> Section {
    let spans = vec![
        Span::new(CONCLUSION_LEAD),
        Span::new(CONCLUSION_LEVEL).italic(),
        Span::new(CONCLUSION_TAIL),
    ];
    section("conclusion", "Conclusión General del Estudio").with_block(Block::paragraph(spans))
}

/// Inputs of a generation run.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    pub json: PathBuf,
    pub logo: PathBuf,
    pub output_dir: PathBuf,
    /// Also write the PDF rendering next to the DOCX.
    pub write_pdf: bool,
}

/// Files written by [`generate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub docx: PathBuf,
    pub pdf: Option<PathBuf>,
}

/// Reads the assessment JSON, compiles it and writes the DOCX (and optionally the PDF).
///
/// A missing JSON file is an error; a missing logo is logged and skipped.
pub fn generate(
    compiler: &ReportCompiler,
    options: &GenerateOptions,
) -> Result<GeneratedFiles, ReportError> {
    if !options.json.is_file() {
        return Err(ReportError::InputNotFound(options.json.clone()));
    }
    let json = fs::read_to_string(&options.json).map_err(|err| ReportError::io(&options.json, err))?;
    let report = AssessmentReport::from_json_str(&json)?;

    let compiled = compiler.compile(&report, Some(&options.logo))?;

    fs::create_dir_all(&options.output_dir)
        .map_err(|err| ReportError::io(&options.output_dir, err))?;
    let docx_path = options.output_dir.join(&compiled.file_name);
    let rendered = render_docx(&compiled.document)?;
    fs::write(&docx_path, &rendered.bytes).map_err(|err| ReportError::io(&docx_path, err))?;
    info!("Wrote {} ({} bytes)", docx_path.display(), rendered.bytes.len());

    let pdf = if options.write_pdf {
        let pdf_path = docx_path.with_extension("pdf");
        #[cfg(feature = "bookmarks")]
        let rendered = crate::pdf::render_pdf_with_bookmarks(&compiled.document)?;
        #[cfg(not(feature = "bookmarks"))]
        let rendered = crate::pdf::render_pdf(&compiled.document)?;
        fs::write(&pdf_path, &rendered.bytes).map_err(|err| ReportError::io(&pdf_path, err))?;
        info!("Wrote {} ({} bytes)", pdf_path.display(), rendered.bytes.len());
        Some(pdf_path)
    } else {
        None
    };

    Ok(GeneratedFiles {
        docx: docx_path,
        pdf,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::richtext::plain_text;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    fn compile(value: serde_json::Value) -> CompiledReport {
        ReportCompiler::new(ChartRenderer::without_text())
            .with_today(today())
            .compile(&AssessmentReport::from_value(value), None)
            .expect("compile")
    }

    fn paragraph_text(block: &Block) -> Option<String> {
        match block {
            Block::Paragraph(paragraph) | Block::Bullet(paragraph) => {
                Some(plain_text(paragraph.spans()))
            }
            _ => None,
        }
    }

    fn table<'a>(document: &'a ReportDocument, identifier: &str) -> &'a TableBlock {
        document
            .section(identifier)
            .and_then(|section| {
                section.blocks().iter().find_map(|block| match block {
                    Block::Table(table) => Some(table),
                    _ => None,
                })
            })
            .expect("section with a table")
    }

    #[test]
    fn month_keeps_valid_values() {
        assert_eq!(assessment_month(Some("2025-11"), today()), "2025-11");
    }

    #[test]
    fn month_falls_back_to_today() {
        for raw in [None, Some(""), Some("2025-13"), Some("noviembre"), Some("2025-11-08")] {
            assert_eq!(assessment_month(raw, today()), "2026-03", "raw = {raw:?}");
        }
    }

    #[test]
    fn file_name_replaces_spaces() {
        assert_eq!(
            output_file_name("Banco del Norte", "2025-11"),
            "Reporte_EstudioDevOps_Banco_del_Norte_2025-11.docx"
        );
    }

    #[test]
    fn empty_payload_uses_placeholders() {
        let compiled = compile(json!({}));
        assert_eq!(
            compiled.file_name,
            "Reporte_EstudioDevOps_Cliente_2026-03.docx"
        );

        let summary = compiled.document.section("resumen-ejecutivo").expect("summary");
        let texts: Vec<String> = summary.blocks().iter().filter_map(paragraph_text).collect();
        assert_eq!(texts, vec!["N/A", "N/A"]);

        let global = compiled.document.section("resultado-global").expect("global");
        let lines: Vec<String> = global.blocks().iter().filter_map(paragraph_text).collect();
        assert_eq!(
            lines,
            vec![
                "Puntuación total: N/A",
                "Nivel predominante: N/A",
                "Áreas críticas: N/A",
                "Áreas fuertes: N/A",
            ]
        );

        let plan = compiled.document.section("plan-trabajo").expect("plan");
        let lines: Vec<String> = plan.blocks().iter().filter_map(paragraph_text).collect();
        assert_eq!(lines[1], "Periodo: N/A meses");
        assert!(table(&compiled.document, "evaluacion-waf").rows().is_empty());
    }

    #[test]
    fn sections_follow_the_report_layout() {
        let compiled = compile(json!({"cliente": "ACME"}));
        let titles: Vec<&str> = compiled
            .document
            .sections()
            .iter()
            .map(Section::title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Información General",
                "Resumen Ejecutivo",
                "Resultado Global",
                "Evaluación por Pilar WAF",
                "Recomendaciones",
                "Plan de Trabajo",
                "Tareas Detalladas",
                "Proyección de Evolución",
                "Roadmap",
                "Tabla de Servicios Azure Recomendados",
                "Conclusión General del Estudio",
            ]
        );

        let cover = compiled.document.cover().expect("cover");
        assert_eq!(cover.title(), REPORT_TITLE);
        assert_eq!(cover.identifier(), Some("Cliente: ACME"));
        // banner only: no logo was given
        assert_eq!(cover.blocks().len(), 1);
    }

    #[test]
    fn services_table_is_fixed() {
        let compiled = compile(json!({}));
        let services = table(&compiled.document, "servicios-azure");
        assert_eq!(services.headers(), SERVICES_HEADERS);
        assert_eq!(services.rows().len(), 14);
        assert_eq!(services.rows()[13][1], "Azure AI Vision / Document Intelligence");
    }

    #[test]
    fn rows_are_built_from_records() {
        let compiled = compile(json!({
            "capacidadWAF": [
                {"pilar": "Seguridad", "puntaje": 2, "observaciones": "Sin escaneo"},
                {"pilar": "Confiabilidad"}
            ],
            "proyeccionEvolucion": [
                {
                    "mes": 3,
                    "madurezEsperada": 55,
                    "capacidadesImplementadas": ["CI", "IaC"],
                    "kpisEsperados": {"leadTime": "5d"}
                }
            ],
            "roadmap": [{"mes": "Mes 1", "entregables": ["Pipeline"], "objetivos": []}]
        }));

        let pillars = table(&compiled.document, "evaluacion-waf");
        assert_eq!(pillars.rows()[0], vec!["Seguridad", "2", "Sin escaneo"]);
        assert_eq!(pillars.rows()[1], vec!["Confiabilidad", "", ""]);

        let projections = table(&compiled.document, "proyeccion-evolucion");
        assert_eq!(
            projections.rows()[0],
            vec![
                "3",
                "55%",
                "CI, IaC",
                "Lead Time: 5d, Deployment Frequency: -, Change Failure Rate: -",
            ]
        );

        let roadmap = table(&compiled.document, "roadmap");
        assert_eq!(roadmap.rows()[0], vec!["Mes 1", "Pipeline", ""]);
    }

    #[test]
    fn conclusion_italicises_the_maturity_level() {
        let compiled = compile(json!({}));
        let conclusion = compiled.document.section("conclusion").expect("conclusion");
        let Some(Block::Paragraph(paragraph)) = conclusion.blocks().first() else {
            panic!("conclusion paragraph missing");
        };
        let italic: Vec<&str> = paragraph
            .spans()
            .iter()
            .filter(|span| span.is_italic())
            .map(|span| span.text())
            .collect();
        assert_eq!(italic, vec!["gestionada"]);
        let text = plain_text(paragraph.spans());
        assert!(text.starts_with("El estado actual muestra una madurez gestionada con oportunidades"));
        assert!(text.contains("65–70% de madurez"));
    }

    #[test]
    fn extreme_role_hours_still_compile() {
        let compiled = compile(json!({
            "planTrabajo": {
                "resumenRoles": [
                    {"rol": "Arquitecto", "horas": 1.7e308, "porcentaje": 50},
                    {"rol": "QA", "horas": 40, "porcentaje": 50}
                ]
            }
        }));
        let plan = compiled.document.section("plan-trabajo").expect("plan");
        let charts = plan
            .blocks()
            .iter()
            .filter(|block| matches!(block, Block::Image(_)))
            .count();
        assert_eq!(charts, 2);
    }

    #[test]
    fn missing_logo_is_skipped() {
        let compiled = ReportCompiler::new(ChartRenderer::without_text())
            .with_today(today())
            .compile(
                &AssessmentReport::default(),
                Some(Path::new("/__devops_report_missing__/logo.png")),
            )
            .expect("compile");
        assert_eq!(compiled.document.cover().expect("cover").blocks().len(), 1);
    }

    #[test]
    fn missing_json_is_reported() {
        let options = GenerateOptions {
            json: PathBuf::from("/__devops_report_missing__/reporte.json"),
            logo: PathBuf::from("logo.png"),
            output_dir: PathBuf::from("."),
            write_pdf: false,
        };
        let err = generate(&ReportCompiler::new(ChartRenderer::without_text()), &options)
            .unwrap_err();
        assert!(matches!(err, ReportError::InputNotFound(_)));
    }
}
