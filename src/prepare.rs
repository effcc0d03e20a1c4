//! Pure data-shaping transforms between raw resources and chart-ready rows.
//!
//! Every function here is total: missing fields become documented defaults
//! (0, empty vec, "N/A") and nothing panics. Rendering decides whether an
//! empty result is a user-visible error. The only `None` escape hatch is
//! `prepare_visualization_data`, which bails when the two foundational
//! datasets (group skills, clustering) are absent.

use serde::Serialize;

use crate::model::{
    ClusteringData, CoursePlan, Dataset, DetailedSkills, FactorAnalysisData,
    GroupSkillAverages, IrtAnalysis, PedagogicalRecommendations, SummaryStats,
};

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNCATEGORIZED: &str = "uncategorized";
pub const TOP_N_DEFAULT: usize = 7;

// ---------------------------------------------------------------------------
// Shared numeric/text helpers
// ---------------------------------------------------------------------------

/// Round to one decimal place. Idempotent by construction.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Chart-facing number formatting: one decimal at most, integers without a
/// trailing `.0`.
pub fn format_value(x: f64) -> String {
    let r = round1(x);
    if r.fract() == 0.0 {
        format!("{}", r as i64)
    } else {
        format!("{:.1}", r)
    }
}

/// Truncate long labels with an ellipsis.
pub fn format_name(name: &str, max_len: usize) -> String {
    if name.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    if name.chars().count() > max_len {
        let cut: String = name.chars().take(max_len).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    }
}

/// Difficulty banding on the IRT difficulty parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyBand {
    VeryEasy,
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl DifficultyBand {
    pub fn from_difficulty(d: f64) -> Self {
        if d <= -2.0 {
            DifficultyBand::VeryEasy
        } else if d <= 0.0 {
            DifficultyBand::Easy
        } else if d <= 1.0 {
            DifficultyBand::Medium
        } else if d <= 2.0 {
            DifficultyBand::Hard
        } else {
            DifficultyBand::VeryHard
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyBand::VeryEasy => "Very easy",
            DifficultyBand::Easy => "Easy",
            DifficultyBand::Medium => "Medium",
            DifficultyBand::Hard => "Hard",
            DifficultyBand::VeryHard => "Very hard",
        }
    }
}

/// Skill-level banding used for bar coloring.
pub fn level_color(level: &str) -> &'static str {
    match level {
        "bajo" | "low" => "#ef4444",
        "medio" | "medium" => "#f59e0b",
        "alto" | "high" => "#10b981",
        "muy alto" | "very high" => "#3b82f6",
        _ => "#6b7280",
    }
}

// ---------------------------------------------------------------------------
// Prepared row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RadarPoint {
    pub subject: String,
    pub value: f64,
    /// Group average, present only for the two-series participant radar.
    pub group: Option<f64>,
    pub full_mark: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SequencePhase {
    /// 1-based position in the recommended sequence.
    pub order: usize,
    pub phase: String,
    pub duration: String,
    pub description: String,
    pub topic_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactorComponent {
    /// Explicit 0-based variance index, resolved once here so nothing
    /// downstream re-parses display labels.
    pub index: usize,
    pub factor: String,
    pub description: String,
    pub skills: String,
    pub variance_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IrtItem {
    pub question: String,
    pub difficulty: f64,
    pub discrimination: f64,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleRow {
    pub number: u32,
    pub name: String,
    pub description: String,
    pub duration: String,
    pub session_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SummaryOverview {
    pub rows: u64,
    pub columns: u64,
    pub participants: u64,
    pub clusters: u64,
    pub components: u64,
    pub variance: f64,
    pub learning_phases: u64,
    pub modules: u64,
    pub total_sessions: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub cluster: i64,
    pub participant: String,
}

/// Everything the render routines consume, prepared in one pass per render.
#[derive(Debug, Clone, Serialize)]
pub struct VisualizationData {
    pub group_radar: Vec<RadarPoint>,
    pub cluster_distribution: Vec<NamedValue>,
    pub common_objectives: Vec<NamedValue>,
    pub common_areas: Vec<NamedValue>,
    pub difficulty_by_category: Vec<NamedValue>,
    pub sequence: Vec<SequencePhase>,
    pub factor_components: Vec<FactorComponent>,
    pub irt_ranking: Vec<IrtItem>,
    pub summary: SummaryOverview,
    pub modules: Vec<ModuleRow>,
    pub scatter: Vec<ScatterPoint>,
    pub total_explained_variance_percent: f64,
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// One entry per cluster in ascending cluster-id order; count is the member
/// list length.
pub fn cluster_distribution(clustering: &ClusteringData) -> Vec<NamedValue> {
    let mut keyed: Vec<(i64, NamedValue)> = clustering
        .cluster_profiles
        .iter()
        .map(|(id, profile)| {
            let numeric = id.parse::<i64>().unwrap_or(i64::MAX);
            let name = if profile.profile_name.is_empty() {
                format!("Cluster {}", id)
            } else {
                profile.profile_name.clone()
            };
            (
                numeric,
                NamedValue {
                    name,
                    value: profile.members.len() as f64,
                },
            )
        })
        .collect();
    keyed.sort_by_key(|(id, _)| *id);
    keyed.into_iter().map(|(_, v)| v).collect()
}

/// Descending by value, ties keep first-seen order, truncated to `n`.
/// Entries with an empty label or a non-positive count are dropped.
pub fn top_n(pairs: &[(String, f64)], n: usize) -> Vec<NamedValue> {
    let mut rows: Vec<NamedValue> = pairs
        .iter()
        .filter(|(label, count)| !label.is_empty() && *count > 0.0)
        .map(|(label, count)| NamedValue {
            name: label.clone(),
            value: round1(*count),
        })
        .collect();
    // Stable sort: equal values retain input order.
    rows.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    rows.truncate(n);
    rows
}

/// Items per IRT category.
pub fn difficulty_by_category(irt: &IrtAnalysis) -> Vec<NamedValue> {
    irt.categorized_items
        .iter()
        .map(|(category, items)| NamedValue {
            name: category.clone(),
            value: items.len() as f64,
        })
        .collect()
}

/// Recommended learning phases with a 1-based order from array position.
pub fn learning_sequence(recommendations: &PedagogicalRecommendations) -> Vec<SequencePhase> {
    recommendations
        .recommended_sequence
        .iter()
        .enumerate()
        .map(|(i, phase)| SequencePhase {
            order: i + 1,
            phase: if phase.phase.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                phase.phase.clone()
            },
            duration: if phase.estimated_duration.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                phase.estimated_duration.clone()
            },
            description: phase.description.clone(),
            topic_count: phase.topics.len(),
        })
        .collect()
}

/// Parse the trailing integer out of a factor display name ("Factor 2" -> 1).
/// Used once here to resolve the variance index; the prepared row carries
/// the index explicitly from then on.
fn factor_index_from_name(name: &str, fallback: usize) -> usize {
    name.rsplit(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|tail| tail.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
        .unwrap_or(fallback)
}

pub fn factor_components(fa: &FactorAnalysisData) -> Vec<FactorComponent> {
    fa.factors_skills
        .iter()
        .enumerate()
        .map(|(position, (factor, skills))| {
            let index = factor_index_from_name(factor, position);
            let variance = fa.explained_variance.get(index).copied().unwrap_or(0.0);
            let description = fa
                .factor_descriptions
                .get(factor)
                .cloned()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let skills = skills
                .iter()
                .map(|s| s.skill.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            FactorComponent {
                index,
                factor: factor.clone(),
                description,
                skills,
                variance_percent: round1(variance * 100.0),
            }
        })
        .collect()
}

/// Questions sorted descending by difficulty, with the category resolved by
/// reverse lookup into the category map.
pub fn irt_ranking(irt: &IrtAnalysis) -> Vec<IrtItem> {
    let mut items: Vec<IrtItem> = irt
        .parameters
        .iter()
        .map(|(question, params)| {
            let category = irt
                .categorized_items
                .iter()
                .find(|(_, members)| members.iter().any(|q| q == question))
                .map(|(category, _)| category.clone())
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            IrtItem {
                question: format_name(question, 40),
                difficulty: params.difficulty,
                discrimination: params.discrimination,
                category,
            }
        })
        .collect();
    items.sort_by(|a, b| {
        b.difficulty
            .partial_cmp(&a.difficulty)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    items
}

/// Single-series radar over the group averages, axis fixed 0-100.
pub fn group_radar(group_skills: &GroupSkillAverages) -> Vec<RadarPoint> {
    group_skills
        .iter()
        .map(|(skill, entry)| RadarPoint {
            subject: skill.clone(),
            value: round1(entry.average_percent),
            group: None,
            full_mark: 100.0,
        })
        .collect()
}

/// Two-series radar comparing one participant against the group average.
/// `None` when the participant id is not in the detailed-skills set.
pub fn participant_radar(
    detailed: &DetailedSkills,
    group: &GroupSkillAverages,
    participant_id: &str,
) -> Option<Vec<RadarPoint>> {
    let skills = detailed.get(participant_id)?;
    Some(
        skills
            .iter()
            .map(|(skill, detail)| RadarPoint {
                subject: skill.clone(),
                value: round1(detail.percent),
                group: group.get(skill).map(|g| round1(g.average_percent)),
                full_mark: 100.0,
            })
            .collect(),
    )
}

pub fn summary_cards(summary: &SummaryStats) -> SummaryOverview {
    SummaryOverview {
        rows: summary.data.rows,
        columns: summary.data.columns,
        participants: summary.data.participants,
        clusters: summary.clustering.clusters,
        components: summary.factor_analysis.components,
        variance: round1(summary.factor_analysis.variance_explained),
        learning_phases: summary.recommendations.learning_phases,
        modules: summary.course_plan.modules,
        total_sessions: summary.course_plan.total_sessions,
    }
}

pub fn module_rows(plan: &CoursePlan) -> Vec<ModuleRow> {
    plan.modules
        .iter()
        .map(|m| ModuleRow {
            number: m.number,
            name: if m.title.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                m.title.clone()
            },
            description: m.description.clone(),
            duration: if m.duration.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                m.duration.clone()
            },
            session_count: m.sessions.len(),
        })
        .collect()
}

pub fn cluster_scatter(clustering: &ClusteringData) -> Vec<ScatterPoint> {
    clustering
        .visualization_data
        .iter()
        .map(|p| ScatterPoint {
            x: p.x,
            y: p.y,
            cluster: p.cluster,
            participant: p.participant.clone(),
        })
        .collect()
}

/// Full preparation pass. `None` only when the two foundational datasets
/// are absent, which callers render as an error view.
pub fn prepare_visualization_data(dataset: &Dataset) -> Option<VisualizationData> {
    let clustering_absent = dataset.clustering.cluster_profiles.is_empty()
        && dataset.clustering.clusters.is_empty();
    if dataset.group_skills.is_empty() || clustering_absent {
        return None;
    }

    Some(VisualizationData {
        group_radar: group_radar(&dataset.group_skills),
        cluster_distribution: cluster_distribution(&dataset.clustering),
        common_objectives: top_n(
            &dataset.objectives.objective_analysis.most_common,
            TOP_N_DEFAULT,
        ),
        common_areas: top_n(&dataset.objectives.area_analysis.most_common, TOP_N_DEFAULT),
        difficulty_by_category: difficulty_by_category(&dataset.irt),
        sequence: learning_sequence(&dataset.recommendations),
        factor_components: factor_components(&dataset.factor_analysis),
        irt_ranking: irt_ranking(&dataset.irt),
        summary: summary_cards(&dataset.summary),
        modules: module_rows(&dataset.course_plan),
        scatter: cluster_scatter(&dataset.clustering),
        total_explained_variance_percent: round1(
            dataset.factor_analysis.total_explained_variance * 100.0,
        ),
    })
}

// ---------------------------------------------------------------------------
// Per-participant preparation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantView {
    pub id: String,
    pub radar: Vec<RadarPoint>,
    pub objectives: Vec<String>,
    pub interest_areas: Vec<String>,
    pub prior_experience: Vec<String>,
    pub cluster_id: Option<i64>,
    pub cluster_name: Option<String>,
    pub cluster_recommendations: Vec<String>,
}

/// `None` means the id is outside the loaded set, a valid state the caller
/// renders as not-found.
pub fn prepare_participant_view(dataset: &Dataset, participant_id: &str) -> Option<ParticipantView> {
    let radar = participant_radar(&dataset.detailed_skills, &dataset.group_skills, participant_id)?;
    let cluster_id = dataset.clustering.clusters.get(participant_id).copied();
    let cluster_key = cluster_id.map(|id| id.to_string());
    let cluster_name = cluster_key
        .as_deref()
        .and_then(|key| dataset.clustering.cluster_profiles.get(key))
        .map(|p| p.profile_name.clone());
    let cluster_recommendations = cluster_key
        .as_deref()
        .and_then(|key| dataset.clustering.cluster_recommendations.get(key))
        .cloned()
        .unwrap_or_default();

    Some(ParticipantView {
        id: participant_id.to_string(),
        radar,
        objectives: dataset
            .objectives
            .individual_objectives
            .get(participant_id)
            .cloned()
            .unwrap_or_default(),
        interest_areas: dataset
            .objectives
            .individual_interest_areas
            .get(participant_id)
            .cloned()
            .unwrap_or_default(),
        prior_experience: dataset
            .objectives
            .individual_prior_experience
            .get(participant_id)
            .cloned()
            .unwrap_or_default(),
        cluster_id,
        cluster_name,
        cluster_recommendations,
    })
}

// ---------------------------------------------------------------------------
// Dashboard-wide aggregates, search and export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    pub participants: usize,
    pub skills: usize,
    pub modules: usize,
    pub sessions: usize,
    pub clusters: usize,
    pub complete: bool,
}

pub fn dashboard_stats(dataset: &Dataset) -> DashboardStats {
    DashboardStats {
        participants: dataset.detailed_skills.len(),
        skills: dataset.group_skills.len(),
        modules: dataset.course_plan.modules.len(),
        sessions: dataset.course_plan.total_sessions(),
        clusters: dataset.clustering.cluster_profiles.len(),
        complete: dataset.is_ready(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchHitKind {
    Participant,
    Skill,
    Module,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub kind: SearchHitKind,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub count: usize,
}

/// Case-insensitive substring search over participant ids, skill names and
/// module titles/descriptions.
pub fn search(dataset: &Dataset, query: &str) -> SearchResults {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return SearchResults::default();
    }

    let mut hits = Vec::new();
    for id in dataset.detailed_skills.keys() {
        if id.to_lowercase().contains(&query) {
            hits.push(SearchHit {
                id: id.clone(),
                kind: SearchHitKind::Participant,
                label: format!("Participant {}", id),
            });
        }
    }
    for skill in dataset.group_skills.keys() {
        if skill.to_lowercase().contains(&query) {
            hits.push(SearchHit {
                id: skill.clone(),
                kind: SearchHitKind::Skill,
                label: skill.clone(),
            });
        }
    }
    for module in &dataset.course_plan.modules {
        if module.title.to_lowercase().contains(&query)
            || module.description.to_lowercase().contains(&query)
        {
            hits.push(SearchHit {
                id: module.number.to_string(),
                kind: SearchHitKind::Module,
                label: format!("Module {}: {}", module.number, module.title),
            });
        }
    }

    let count = hits.len();
    SearchResults { hits, count }
}

/// JSON export of a named section. Unknown sections fall back to the
/// reduced default set.
pub fn export_section(dataset: &Dataset, section: &str) -> serde_json::Value {
    match section {
        "participants" => serde_json::to_value(&dataset.detailed_skills),
        "skills" => serde_json::to_value(&dataset.group_skills),
        "clustering" => serde_json::to_value(&dataset.clustering),
        "modules" => serde_json::to_value(&dataset.course_plan.modules),
        _ => serde_json::to_value(serde_json::json!({
            "objectives": dataset.objectives,
            "group_skills": dataset.group_skills,
            "course": dataset.course_plan,
            "summary": dataset.summary,
        })),
    }
    .unwrap_or(serde_json::Value::Null)
}
