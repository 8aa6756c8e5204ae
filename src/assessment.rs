//! Lenient, read-only view over an assessment report payload.
//!
//! The payload is an arbitrary JSON mapping in which every key is optional.  Instead of a strict
//! serde schema (one wrong type would reject the whole file) the accessors here walk a
//! [`serde_json::Value`] and substitute placeholders for anything missing or of the wrong shape.
//! Wire keys are the ones produced by the upstream assessment tooling and are kept verbatim.

use serde_json::{Map, Value};

/// Placeholder for absent free-text fields.
pub const PLACEHOLDER: &str = "N/A";
/// Placeholder for absent KPI values inside projection rows.
pub const KPI_PLACEHOLDER: &str = "-";

pub const DEFAULT_CLIENT: &str = "Cliente";
pub const DEFAULT_EVALUATOR: &str = "Equipo Readymind";

/// Renders a scalar (or a list of scalars) the way it should appear in the document.
///
/// `null` and objects have no textual form and yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Null | Value::Object(_) => None,
    }
}

/// Interprets a JSON number or numeric string as `f64`.
pub fn scalar_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// Borrowed view of one JSON object; a missing or non-object value behaves like `{}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fields<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
    pub fn new(value: Option<&'a Value>) -> Self {
        Self {
            map: value.and_then(Value::as_object),
        }
    }

    /// Returns the raw value for `key`, treating `null` as absent.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map
            .and_then(|map| map.get(key))
            .filter(|value| !value.is_null())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_text)
    }

    /// Text for `key`, or `default` when the key is absent or has no textual form.
    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_owned())
    }

    /// Text for `key`, or an empty string; used for table cells.
    pub fn cell(&self, key: &str) -> String {
        self.text_or(key, "")
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(scalar_number)
    }

    /// Items of a list of scalars rendered as text; anything else yields an empty list.
    pub fn strings(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        }
    }

    pub fn object(&self, key: &str) -> Fields<'a> {
        Fields::new(self.get(key))
    }

    /// Object items of the list under `key`.  Non-object items are skipped.
    pub fn records(&self, key: &str) -> Vec<Fields<'a>> {
        match self.get(key) {
            Some(Value::Array(items)) => {
                let records: Vec<_> = items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(|item| Fields::new(Some(item)))
                    .collect();
                if records.len() != items.len() {
                    log::debug!(
                        "skipped {} non-object entries under `{}`",
                        items.len() - records.len(),
                        key
                    );
                }
                records
            }
            _ => Vec::new(),
        }
    }
}

/// `resumenEjecutivo`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutiveSummary {
    pub diagnosis: String,
    pub key_findings: Vec<String>,
    pub business_impact: String,
}

impl From<Fields<'_>> for ExecutiveSummary {
    fn from(fields: Fields<'_>) -> Self {
        Self {
            diagnosis: fields.text_or("diagnostico", PLACEHOLDER),
            key_findings: fields.strings("hallazgosPrincipales"),
            business_impact: fields.text_or("impactoNegocio", PLACEHOLDER),
        }
    }
}

/// `resultadoGlobal`.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalResult {
    pub total_score: String,
    pub predominant_level: String,
    pub critical_areas: Vec<String>,
    pub strong_areas: Vec<String>,
}

impl From<Fields<'_>> for GlobalResult {
    fn from(fields: Fields<'_>) -> Self {
        Self {
            total_score: fields.text_or("puntuacionTotal", PLACEHOLDER),
            predominant_level: fields.text_or("nivelPredominante", PLACEHOLDER),
            critical_areas: fields.strings("areasCriticas"),
            strong_areas: fields.strings("areasFuertes"),
        }
    }
}

/// One scored pillar from `capacidadWAF`.
#[derive(Clone, Debug, PartialEq)]
pub struct PillarScore {
    pub name: String,
    /// The score exactly as written in the payload, for the table.
    pub score_text: String,
    /// The score as a number, when it is one.
    pub score: Option<f64>,
    pub observations: String,
}

impl From<Fields<'_>> for PillarScore {
    fn from(fields: Fields<'_>) -> Self {
        Self {
            name: fields.cell("pilar"),
            score_text: fields.cell("puntaje"),
            score: fields.number("puntaje"),
            observations: fields.cell("observaciones"),
        }
    }
}

/// One entry of `recomendaciones`.
#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub id: String,
    pub description: String,
    pub azure_service: String,
    pub priority: String,
    pub expected_impact: String,
}

impl From<Fields<'_>> for Recommendation {
    fn from(fields: Fields<'_>) -> Self {
        Self {
            id: fields.cell("id"),
            description: fields.cell("descripcion"),
            azure_service: fields.cell("servicioAzure"),
            priority: fields.cell("prioridad"),
            expected_impact: fields.cell("impactoEsperado"),
        }
    }
}

/// One entry of `planTrabajo.resumenRoles`.
#[derive(Clone, Debug, PartialEq)]
pub struct RoleSummary {
    pub role: String,
    pub hours: Option<f64>,
    pub hours_text: String,
    pub share_percent: Option<f64>,
}

impl From<Fields<'_>> for RoleSummary {
    fn from(fields: Fields<'_>) -> Self {
        Self {
            role: fields.cell("rol"),
            hours: fields.number("horas"),
            hours_text: fields.text_or("horas", "0"),
            share_percent: fields.number("porcentaje"),
        }
    }
}

/// One entry of `planTrabajo.tareasDetalladas`.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub estimated_hours: String,
    pub dependency: String,
    pub role: String,
    pub phase: String,
}

impl From<Fields<'_>> for Task {
    fn from(fields: Fields<'_>) -> Self {
        Self {
            id: fields.cell("id_tarea"),
            description: fields.cell("descripcion"),
            estimated_hours: fields.cell("horas_estimadas"),
            dependency: fields.cell("dependencia"),
            role: fields.cell("rol"),
            phase: fields.cell("fase"),
        }
    }
}

/// `planTrabajo`.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkPlan {
    pub max_hours: String,
    pub period_months: String,
    pub weekly_hours_per_resource: String,
    pub roles: Vec<RoleSummary>,
    pub tasks: Vec<Task>,
}

impl From<Fields<'_>> for WorkPlan {
    fn from(fields: Fields<'_>) -> Self {
        Self {
            max_hours: fields.text_or("horasMaximas", PLACEHOLDER),
            period_months: fields.text_or("periodoMaximoMeses", PLACEHOLDER),
            weekly_hours_per_resource: fields.text_or("horasSemanalesPorRecurso", PLACEHOLDER),
            roles: fields
                .records("resumenRoles")
                .into_iter()
                .map(RoleSummary::from)
                .collect(),
            tasks: fields
                .records("tareasDetalladas")
                .into_iter()
                .map(Task::from)
                .collect(),
        }
    }
}

/// `kpisEsperados` of a projection entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Kpis {
    pub lead_time: String,
    pub deployment_frequency: String,
    pub change_failure_rate: String,
}

impl Kpis {
    /// One-line summary used in the projection table.
    pub fn summary(&self) -> String {
        format!(
            "Lead Time: {}, Deployment Frequency: {}, Change Failure Rate: {}",
            self.lead_time, self.deployment_frequency, self.change_failure_rate
        )
    }
}

impl From<Fields<'_>> for Kpis {
    fn from(fields: Fields<'_>) -> Self {
        Self {
            lead_time: fields.text_or("leadTime", KPI_PLACEHOLDER),
            deployment_frequency: fields.text_or("deploymentFrequency", KPI_PLACEHOLDER),
            change_failure_rate: fields.text_or("changeFailureRate", KPI_PLACEHOLDER),
        }
    }
}

/// One entry of `proyeccionEvolucion`.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyProjection {
    pub month: String,
    pub expected_maturity: String,
    pub capabilities: Vec<String>,
    pub kpis: Kpis,
}

impl From<Fields<'_>> for MonthlyProjection {
    fn from(fields: Fields<'_>) -> Self {
        Self {
            month: fields.cell("mes"),
            expected_maturity: fields.cell("madurezEsperada"),
            capabilities: fields.strings("capacidadesImplementadas"),
            kpis: Kpis::from(fields.object("kpisEsperados")),
        }
    }
}

/// One entry of `roadmap`.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadmapEntry {
    pub month: String,
    pub deliverables: Vec<String>,
    pub objectives: Vec<String>,
}

impl From<Fields<'_>> for RoadmapEntry {
    fn from(fields: Fields<'_>) -> Self {
        Self {
            month: fields.cell("mes"),
            deliverables: fields.strings("entregables"),
            objectives: fields.strings("objetivos"),
        }
    }
}

/// The assessment report payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssessmentReport {
    root: Value,
}

impl AssessmentReport {
    /// Wraps an already parsed payload.  A non-object root behaves like `{}`.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Parses a payload from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::from_value)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn fields(&self) -> Fields<'_> {
        Fields::new(Some(&self.root))
    }

    /// `cliente`, defaulting to [`DEFAULT_CLIENT`].
    pub fn client(&self) -> String {
        self.fields().text_or("cliente", DEFAULT_CLIENT)
    }

    /// `evaluador`, defaulting to [`DEFAULT_EVALUATOR`].
    pub fn evaluator(&self) -> String {
        self.fields().text_or("evaluador", DEFAULT_EVALUATOR)
    }

    /// Raw `fechaAssessment` when it is a string.
    pub fn assessment_date(&self) -> Option<&str> {
        self.fields().get("fechaAssessment").and_then(Value::as_str)
    }

    pub fn executive_summary(&self) -> ExecutiveSummary {
        self.fields().object("resumenEjecutivo").into()
    }

    pub fn global_result(&self) -> GlobalResult {
        self.fields().object("resultadoGlobal").into()
    }

    pub fn pillars(&self) -> Vec<PillarScore> {
        self.fields()
            .records("capacidadWAF")
            .into_iter()
            .map(PillarScore::from)
            .collect()
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.fields()
            .records("recomendaciones")
            .into_iter()
            .map(Recommendation::from)
            .collect()
    }

    pub fn work_plan(&self) -> WorkPlan {
        self.fields().object("planTrabajo").into()
    }

    pub fn projections(&self) -> Vec<MonthlyProjection> {
        self.fields()
            .records("proyeccionEvolucion")
            .into_iter()
            .map(MonthlyProjection::from)
            .collect()
    }

    pub fn roadmap(&self) -> Vec<RoadmapEntry> {
        self.fields()
            .records("roadmap")
            .into_iter()
            .map(RoadmapEntry::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_payload_yields_placeholders() {
        let report = AssessmentReport::from_value(json!({}));

        assert_eq!(report.client(), DEFAULT_CLIENT);
        assert_eq!(report.evaluator(), DEFAULT_EVALUATOR);
        assert_eq!(report.assessment_date(), None);

        let summary = report.executive_summary();
        assert_eq!(summary.diagnosis, PLACEHOLDER);
        assert_eq!(summary.business_impact, PLACEHOLDER);
        assert!(summary.key_findings.is_empty());

        let plan = report.work_plan();
        assert_eq!(plan.max_hours, PLACEHOLDER);
        assert_eq!(plan.period_months, PLACEHOLDER);
        assert!(plan.roles.is_empty());
        assert!(report.pillars().is_empty());
    }

    #[test]
    fn non_object_root_behaves_like_empty_payload() {
        let report = AssessmentReport::from_value(json!([1, 2, 3]));
        assert_eq!(report.client(), DEFAULT_CLIENT);
        assert!(report.recommendations().is_empty());
    }

    #[test]
    fn wrong_shapes_are_treated_as_absent() {
        let report = AssessmentReport::from_value(json!({
            "resumenEjecutivo": "not an object",
            "capacidadWAF": {"pilar": "x"},
            "planTrabajo": {"resumenRoles": "nope", "horasMaximas": null},
        }));

        assert_eq!(report.executive_summary().diagnosis, PLACEHOLDER);
        assert!(report.pillars().is_empty());
        let plan = report.work_plan();
        assert!(plan.roles.is_empty());
        assert_eq!(plan.max_hours, PLACEHOLDER);
    }

    #[test]
    fn scalars_render_as_text() {
        assert_eq!(scalar_text(&json!("a")), Some("a".into()));
        assert_eq!(scalar_text(&json!(3)), Some("3".into()));
        assert_eq!(scalar_text(&json!(3.5)), Some("3.5".into()));
        assert_eq!(scalar_text(&json!(true)), Some("true".into()));
        assert_eq!(scalar_text(&json!(["a", 1])), Some("a, 1".into()));
        assert_eq!(scalar_text(&json!(null)), None);
        assert_eq!(scalar_text(&json!({"a": 1})), None);
    }

    #[test]
    fn numeric_strings_parse_as_numbers() {
        assert_eq!(scalar_number(&json!("3.5")), Some(3.5));
        assert_eq!(scalar_number(&json!(" 4 ")), Some(4.0));
        assert_eq!(scalar_number(&json!("alto")), None);
        assert_eq!(scalar_number(&json!(false)), None);
    }

    #[test]
    fn pillar_records_keep_raw_and_numeric_score() {
        let report = AssessmentReport::from_value(json!({
            "capacidadWAF": [
                {"pilar": "Seguridad", "puntaje": 2.5, "observaciones": "Sin escaneo"},
                {"pilar": "Costos", "puntaje": "n/d"},
                "garbage",
            ]
        }));

        let pillars = report.pillars();
        assert_eq!(pillars.len(), 2);
        assert_eq!(pillars[0].score, Some(2.5));
        assert_eq!(pillars[0].score_text, "2.5");
        assert_eq!(pillars[1].score, None);
        assert_eq!(pillars[1].score_text, "n/d");
        assert_eq!(pillars[1].observations, "");
    }

    #[test]
    fn kpi_summary_uses_dash_for_missing_values() {
        let report = AssessmentReport::from_value(json!({
            "proyeccionEvolucion": [
                {"mes": 1, "madurezEsperada": 45, "kpisEsperados": {"leadTime": "5 días"}}
            ]
        }));

        let projection = &report.projections()[0];
        assert_eq!(projection.month, "1");
        assert_eq!(
            projection.kpis.summary(),
            "Lead Time: 5 días, Deployment Frequency: -, Change Failure Rate: -"
        );
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(AssessmentReport::from_json_str("{ not json").is_err());
    }
}
