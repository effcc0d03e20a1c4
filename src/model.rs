//! Schema types for the assessment result resources.
//!
//! Every resource is produced out of band by the analytics pipeline and
//! arrives as static JSON with Spanish wire names; the structs here map
//! them onto explicit English fields so downstream code never pokes at
//! untyped values. Unknown ids resolving to nothing is a normal state,
//! so lookups return `Option` rather than failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Objectives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectivesData {
    #[serde(rename = "analisis_objetivos", default)]
    pub objective_analysis: FrequencyAnalysis,
    #[serde(rename = "analisis_areas", default)]
    pub area_analysis: FrequencyAnalysis,
    #[serde(rename = "objetivos_individuales", default)]
    pub individual_objectives: BTreeMap<String, Vec<String>>,
    #[serde(rename = "areas_interes_individuales", default)]
    pub individual_interest_areas: BTreeMap<String, Vec<String>>,
    #[serde(rename = "experiencia_previa_individual", default)]
    pub individual_prior_experience: BTreeMap<String, Vec<String>>,
}

/// `mas_comunes` is an ordered list of `[label, count]` pairs; order is
/// significant (it is the tiebreak for the top-N cut).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrequencyAnalysis {
    #[serde(rename = "mas_comunes", default)]
    pub most_common: Vec<(String, f64)>,
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// Group-wide skill averages, keyed by skill name.
pub type GroupSkillAverages = BTreeMap<String, GroupSkillEntry>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupSkillEntry {
    #[serde(rename = "porcentaje_promedio", default)]
    pub average_percent: f64,
}

/// Per-participant detailed skills: participant id -> skill name -> detail.
pub type DetailedSkills = BTreeMap<String, BTreeMap<String, SkillDetail>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillDetail {
    #[serde(rename = "porcentaje", default)]
    pub percent: f64,
    #[serde(rename = "nivel", default)]
    pub level: String,
    #[serde(rename = "fortalezas", default)]
    pub strengths: Vec<String>,
    #[serde(rename = "debilidades", default)]
    pub weaknesses: Vec<String>,
    #[serde(rename = "recomendacion_desarrollo", default)]
    pub development_recommendation: Option<String>,
    #[serde(rename = "patrones_observados", default)]
    pub observed_patterns: Vec<String>,
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusteringData {
    /// participant id -> cluster id
    #[serde(default)]
    pub clusters: BTreeMap<String, i64>,
    /// cluster id (stringly keyed in the wire format) -> profile
    #[serde(rename = "cluster_profiles", default)]
    pub cluster_profiles: BTreeMap<String, ClusterProfile>,
    #[serde(rename = "cluster_recommendations", default)]
    pub cluster_recommendations: BTreeMap<String, Vec<String>>,
    #[serde(rename = "visualization_data", default)]
    pub visualization_data: Vec<ClusterPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterProfile {
    #[serde(rename = "nombre_perfil", default)]
    pub profile_name: String,
    #[serde(rename = "participantes", default)]
    pub members: Vec<String>,
    #[serde(rename = "habilidades_distintivas", default)]
    pub distinctive_skills: Vec<SkillDelta>,
    #[serde(rename = "habilidades_debiles", default)]
    pub weak_skills: Vec<SkillDelta>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillDelta {
    #[serde(rename = "habilidad", default)]
    pub skill: String,
    /// Delta versus the group average for that skill, in percent points.
    #[serde(rename = "diferencia", default)]
    pub delta: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterPoint {
    pub x: f64,
    pub y: f64,
    pub cluster: i64,
    #[serde(rename = "participante", default)]
    pub participant: String,
}

// ---------------------------------------------------------------------------
// Course plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursePlan {
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "objetivos_aprendizaje", default)]
    pub learning_objectives: Vec<String>,
    #[serde(rename = "publico_objetivo", default)]
    pub target_audience: Vec<String>,
    /// Free-form duration string, never machine-parsed.
    #[serde(rename = "duracion_total", default)]
    pub total_duration: String,
    #[serde(rename = "modulos", default)]
    pub modules: Vec<CourseModule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseModule {
    #[serde(rename = "numero", default)]
    pub number: u32,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "duracion", default)]
    pub duration: String,
    #[serde(rename = "objetivos", default)]
    pub objectives: Vec<String>,
    #[serde(rename = "evaluacion", default)]
    pub evaluation: Option<String>,
    #[serde(rename = "sesiones", default)]
    pub sessions: Vec<CourseSession>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseSession {
    #[serde(rename = "numero", default)]
    pub number: u32,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "duracion", default)]
    pub duration: String,
    #[serde(rename = "temas", default)]
    pub topics: Vec<String>,
    #[serde(rename = "actividades_recomendadas", default)]
    pub recommended_activities: Vec<String>,
    #[serde(rename = "recursos", default)]
    pub resources: Vec<String>,
}

impl CoursePlan {
    pub fn module(&self, number: u32) -> Option<&CourseModule> {
        self.modules.iter().find(|m| m.number == number)
    }

    pub fn total_sessions(&self) -> usize {
        self.modules.iter().map(|m| m.sessions.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Pedagogical recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PedagogicalRecommendations {
    #[serde(rename = "secuencia_recomendada", default)]
    pub recommended_sequence: Vec<LearningPhase>,
    #[serde(rename = "recomendaciones_habilidades", default)]
    pub skill_recommendations: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "recomendaciones_areas", default)]
    pub area_recommendations: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "patrones_dificultad", default)]
    pub difficulty_patterns: BTreeMap<String, DifficultyPattern>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningPhase {
    #[serde(rename = "fase", default)]
    pub phase: String,
    #[serde(rename = "duracion_estimada", default)]
    pub estimated_duration: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "temas", default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DifficultyPattern {
    #[serde(rename = "mas_dificil", default)]
    pub hardest: String,
    #[serde(rename = "esperado", default)]
    pub expected: String,
    #[serde(rename = "mas_facil", default)]
    pub easiest: String,
}

// ---------------------------------------------------------------------------
// Summary stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    #[serde(default)]
    pub data: SummaryData,
    #[serde(default)]
    pub clustering: SummaryClustering,
    #[serde(rename = "factor_analysis", default)]
    pub factor_analysis: SummaryFactor,
    #[serde(default)]
    pub recommendations: SummaryRecommendations,
    #[serde(rename = "course_plan", default)]
    pub course_plan: SummaryCourse,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryData {
    #[serde(default)]
    pub rows: u64,
    #[serde(default)]
    pub columns: u64,
    #[serde(default)]
    pub participants: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryClustering {
    #[serde(default)]
    pub clusters: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryFactor {
    #[serde(default)]
    pub components: u64,
    #[serde(rename = "variance_explained", default)]
    pub variance_explained: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryRecommendations {
    #[serde(rename = "learning_phases", default)]
    pub learning_phases: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryCourse {
    #[serde(default)]
    pub modules: u64,
    #[serde(rename = "total_sessions", default)]
    pub total_sessions: u64,
}

// ---------------------------------------------------------------------------
// Factor analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactorAnalysisData {
    /// Display name -> skills loading on that factor. Enumeration order of
    /// this map is the factor order; `explained_variance` is indexed the
    /// same way.
    #[serde(rename = "factors_skills", default)]
    pub factors_skills: BTreeMap<String, Vec<FactorSkill>>,
    #[serde(rename = "factor_descriptions", default)]
    pub factor_descriptions: BTreeMap<String, String>,
    #[serde(rename = "explained_variance", default)]
    pub explained_variance: Vec<f64>,
    #[serde(rename = "total_explained_variance", default)]
    pub total_explained_variance: f64,
    #[serde(rename = "skill_factors", default)]
    pub skill_factors: BTreeMap<String, SkillFactorLoading>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactorSkill {
    #[serde(default)]
    pub skill: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillFactorLoading {
    #[serde(rename = "factor_principal", default)]
    pub principal_factor: String,
    #[serde(rename = "carga", default)]
    pub loading: f64,
}

// ---------------------------------------------------------------------------
// IRT analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrtAnalysis {
    #[serde(rename = "categorized_items", default)]
    pub categorized_items: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub parameters: BTreeMap<String, IrtParameters>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrtParameters {
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default)]
    pub discrimination: f64,
}

// ---------------------------------------------------------------------------
// Consolidated participant profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantProfiles {
    #[serde(rename = "perfiles", default)]
    pub profiles: BTreeMap<String, ParticipantProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantProfile {
    #[serde(rename = "puntuaciones_diagnostico", default)]
    pub diagnostic_scores: BTreeMap<String, f64>,
    #[serde(rename = "datos_demograficos", default)]
    pub demographics: BTreeMap<String, String>,
    #[serde(rename = "analisis_secciones", default)]
    pub section_analysis: BTreeMap<String, SectionAnalysis>,
    #[serde(rename = "fortalezas", default)]
    pub strengths: Vec<String>,
    #[serde(rename = "debilidades", default)]
    pub weaknesses: Vec<String>,
    #[serde(rename = "ruta_aprendizaje", default)]
    pub learning_path: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionAnalysis {
    #[serde(rename = "puntuacion", default)]
    pub score: f64,
    #[serde(rename = "percentil", default)]
    pub percentile: f64,
    #[serde(rename = "nivel", default)]
    pub level: String,
    #[serde(rename = "comparacion_grupo", default)]
    pub group_comparison: f64,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatasetStatus {
    Loading,
    Ready,
    Failed(String),
}

impl Default for DatasetStatus {
    fn default() -> Self {
        DatasetStatus::Loading
    }
}

/// Everything a render needs, loaded in one batch and replaced wholesale.
/// `profiles` is the one optional resource: its absence only degrades the
/// individual view to not-found.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub objectives: ObjectivesData,
    pub group_skills: GroupSkillAverages,
    pub detailed_skills: DetailedSkills,
    pub clustering: ClusteringData,
    pub course_plan: CoursePlan,
    pub recommendations: PedagogicalRecommendations,
    pub summary: SummaryStats,
    pub factor_analysis: FactorAnalysisData,
    pub irt: IrtAnalysis,
    pub profiles: Option<ParticipantProfiles>,
    pub status: DatasetStatus,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Dataset {
    pub fn is_ready(&self) -> bool {
        self.status == DatasetStatus::Ready
    }

    pub fn participant_ids(&self) -> Vec<&String> {
        self.detailed_skills.keys().collect()
    }

    pub fn profile(&self, id: &str) -> Option<&ParticipantProfile> {
        self.profiles.as_ref()?.profiles.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_defaults_to_loading() {
        let ds = Dataset::default();
        assert_eq!(ds.status, DatasetStatus::Loading);
        assert!(!ds.is_ready());
        assert!(ds.last_updated.is_none());
    }

    #[test]
    fn clustering_parses_wire_names() {
        let raw = r#"{
            "clusters": {"1": 0, "2": 1},
            "cluster_profiles": {
                "0": {"nombre_perfil": "Analíticos", "participantes": ["1"],
                      "habilidades_distintivas": [{"habilidad": "lógica", "diferencia": 12.5}]}
            },
            "cluster_recommendations": {"0": ["practicar más"]},
            "visualization_data": [{"x": 0.1, "y": -0.4, "cluster": 0, "participante": "1"}]
        }"#;
        let parsed: ClusteringData = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.clusters.get("1"), Some(&0));
        let profile = parsed.cluster_profiles.get("0").unwrap();
        assert_eq!(profile.profile_name, "Analíticos");
        assert_eq!(profile.distinctive_skills[0].delta, 12.5);
        assert!(profile.weak_skills.is_empty());
        assert_eq!(parsed.visualization_data[0].participant, "1");
    }

    #[test]
    fn course_plan_lookup_and_session_total() {
        let plan = CoursePlan {
            modules: vec![
                CourseModule {
                    number: 1,
                    sessions: vec![CourseSession::default(), CourseSession::default()],
                    ..Default::default()
                },
                CourseModule {
                    number: 2,
                    sessions: vec![CourseSession::default()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert!(plan.module(2).is_some());
        assert!(plan.module(9).is_none());
        assert_eq!(plan.total_sessions(), 3);
    }

    #[test]
    fn participant_ids_follow_key_order() {
        let mut ds = Dataset::default();
        ds.detailed_skills.insert("7".to_string(), BTreeMap::new());
        ds.detailed_skills.insert("12".to_string(), BTreeMap::new());
        let ids: Vec<&str> = ds.participant_ids().iter().map(|s| s.as_str()).collect();
        assert_eq!(ids, ["12", "7"]);
    }

    #[test]
    fn missing_profile_resource_is_not_an_error() {
        let ds = Dataset::default();
        assert!(ds.profile("42").is_none());
    }

    #[test]
    fn frequency_pairs_keep_wire_order() {
        let raw = r#"{"mas_comunes": [["b", 3], ["a", 3], ["c", 1]]}"#;
        let parsed: FrequencyAnalysis = serde_json::from_str(raw).unwrap();
        let labels: Vec<&str> = parsed.most_common.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["b", "a", "c"]);
    }
}
