//! End-to-end dashboard flow tests.
//!
//! Drives the whole pipeline through the public crate surface: scripted
//! fetcher -> batch load -> controller refresh -> render dispatch -> HTML.
//!
//! Test categories:
//!   1. Happy path            -- every view renders from one refresh
//!   2. Batch atomicity       -- one failing resource fails the whole load
//!   3. Retry exhaustion      -- previous good dataset is never touched
//!   4. Optional profiles     -- individual view degrades, nothing fails
//!   5. Snapshot persistence  -- sqlite mirror survives a reopen

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;

use cohortboard::app::App;
use cohortboard::cache::SnapshotStore;
use cohortboard::fetch::retry::RetryConfig;
use cohortboard::fetch::{load_all, FetchError, Resource, ResourceFetcher};
use cohortboard::model::DatasetStatus;
use cohortboard::view::{Subview, View, ViewState};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Wire-shaped payload for a resource, small but structurally complete:
/// two participants, two clusters, one course module with two sessions.
fn fixture(resource: Resource) -> Value {
    match resource {
        Resource::Objectives => json!({
            "analisis_objetivos": {
                "mas_comunes": [["aprender a programar", 5], ["pensamiento critico", 3]]
            },
            "analisis_areas": {
                "mas_comunes": [["tecnologia", 6], ["ciencias", 2]]
            },
            "objetivos_individuales": {"1": ["aprender a programar"], "2": ["pensamiento critico"]},
            "areas_interes_individuales": {"1": ["tecnologia"], "2": ["ciencias"]},
            "experiencia_previa_individual": {"1": [], "2": ["scratch"]}
        }),
        Resource::GroupSkills => json!({
            "logica": {"porcentaje_promedio": 61.3},
            "comunicacion": {"porcentaje_promedio": 74.0}
        }),
        Resource::Clustering => json!({
            "clusters": {"1": 0, "2": 1},
            "cluster_profiles": {
                "0": {
                    "nombre_perfil": "Analiticos",
                    "participantes": ["1"],
                    "habilidades_distintivas": [{"habilidad": "logica", "diferencia": 11.2}]
                },
                "1": {
                    "nombre_perfil": "Comunicadores",
                    "participantes": ["2"],
                    "habilidades_debiles": [{"habilidad": "logica", "diferencia": -8.1}]
                }
            },
            "cluster_recommendations": {"0": ["retos de logica"], "1": ["trabajo en parejas"]},
            "visualization_data": [
                {"x": 0.4, "y": -0.2, "cluster": 0, "participante": "1"},
                {"x": -0.6, "y": 0.3, "cluster": 1, "participante": "2"}
            ]
        }),
        Resource::DetailedSkills => json!({
            "1": {"logica": {"porcentaje": 72.5, "nivel": "alto"}},
            "2": {"comunicacion": {"porcentaje": 81.0, "nivel": "muy alto"}}
        }),
        Resource::CoursePlan => json!({
            "titulo": "Introduccion a la programacion",
            "duracion_total": "12 semanas",
            "modulos": [{
                "numero": 1,
                "titulo": "Fundamentos",
                "descripcion": "Variables y control de flujo",
                "duracion": "3 semanas",
                "sesiones": [
                    {"numero": 1, "titulo": "Variables", "temas": ["tipos", "asignacion"]},
                    {"numero": 2, "titulo": "Condicionales", "temas": ["if", "else"]}
                ]
            }]
        }),
        Resource::Recommendations => json!({
            "secuencia_recomendada": [{
                "fase": "Fundamentos",
                "duracion_estimada": "3 semanas",
                "descripcion": "Base comun para todo el grupo",
                "temas": ["variables", "condicionales"]
            }],
            "patrones_dificultad": {
                "algebra": {"mas_dificil": "q2", "esperado": "q1", "mas_facil": "q3"}
            }
        }),
        Resource::Summary => json!({
            "data": {"rows": 2, "columns": 40, "participants": 2},
            "clustering": {"clusters": 2},
            "factor_analysis": {"components": 2, "variance_explained": 0.63}
        }),
        Resource::FactorAnalysis => json!({
            "factors_skills": {
                "Factor 1": [{"skill": "logica"}],
                "Factor 2": [{"skill": "comunicacion"}]
            },
            "factor_descriptions": {"Factor 1": "Razonamiento", "Factor 2": "Expresion"},
            "explained_variance": [0.41, 0.22],
            "total_explained_variance": 0.63,
            "skill_factors": {
                "logica": {"factor_principal": "Factor 1", "carga": 0.82}
            }
        }),
        Resource::Irt => json!({
            "categorized_items": {"algebra": ["q1", "q2"]},
            "parameters": {
                "q1": {"difficulty": -0.4, "discrimination": 1.3},
                "q2": {"difficulty": 2.1, "discrimination": 0.9}
            }
        }),
        Resource::Profiles => json!({
            "perfiles": {
                "1": {
                    "analisis_secciones": {
                        "logica": {"puntuacion": 8.5, "percentil": 90.0,
                                   "nivel": "alto", "comparacion_grupo": 2.3}
                    },
                    "fortalezas": ["abstraccion"],
                    "debilidades": ["prisa"],
                    "ruta_aprendizaje": ["retos avanzados"]
                }
            }
        }),
    }
}

struct FixtureFetcher {
    profiles_available: bool,
}

#[async_trait]
impl ResourceFetcher for FixtureFetcher {
    async fn fetch(&self, resource: Resource) -> Result<Value, FetchError> {
        if resource == Resource::Profiles && !self.profiles_available {
            return Err(FetchError::Http { resource: resource.name(), status: 404 });
        }
        Ok(fixture(resource))
    }
}

/// Always fails, counting attempts across the batch.
struct DownFetcher {
    calls: AtomicU32,
}

#[async_trait]
impl ResourceFetcher for DownFetcher {
    async fn fetch(&self, resource: Resource) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FetchError::Network {
            resource: resource.name(),
            message: "connection refused".to_string(),
        })
    }
}

fn no_retry() -> RetryConfig {
    RetryConfig { max_retries: 0, base_delay_ms: 1 }
}

// ---------------------------------------------------------------------------
// 1. Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn one_refresh_serves_every_view() {
    let mut app = App::without_cache(no_retry());
    app.refresh(&FixtureFetcher { profiles_available: true }).await;
    assert!(app.dataset().is_ready());

    for view in View::ALL {
        for subview in Subview::ALL {
            let state = ViewState { view, subview, participant: None, module: None };
            let doc = app.page(&state.to_query());
            assert!(doc.contains("dashboard-content"), "query: {}", state.to_query());
            assert!(!doc.contains("error-container"), "query: {}", state.to_query());
        }
    }
}

#[tokio::test]
async fn general_view_shows_cluster_profiles_and_kpis() {
    let mut app = App::without_cache(no_retry());
    app.refresh(&FixtureFetcher { profiles_available: true }).await;

    let doc = app.page("view=general");
    assert!(doc.contains("Analiticos"));
    assert!(doc.contains("Comunicadores"));
    assert!(doc.contains("Full analysis of 2 participants and 1 modules"));
    assert!(doc.contains("12 semanas"));
    // total explained variance surfaces as a percentage
    assert!(doc.contains("63%"));
}

#[tokio::test]
async fn individual_deep_link_renders_consolidated_profile() {
    let mut app = App::without_cache(no_retry());
    app.refresh(&FixtureFetcher { profiles_available: true }).await;

    let doc = app.page("view=individual&participant=1");
    assert!(doc.contains("Participant 1"));
    assert!(doc.contains("abstraccion"));
    assert!(doc.contains("retos de logica"));
}

#[tokio::test]
async fn unknown_participant_gets_not_found_with_alternatives() {
    let mut app = App::without_cache(no_retry());
    app.refresh(&FixtureFetcher { profiles_available: true }).await;

    let doc = app.page("view=individual&participant=99");
    assert!(doc.contains("Participant 99 not found"));
    // recovery links point at the loaded participants
    assert!(doc.contains("participant=1"));
    assert!(doc.contains("participant=2"));
}

#[tokio::test]
async fn course_module_selection_shows_sessions() {
    let mut app = App::without_cache(no_retry());
    app.refresh(&FixtureFetcher { profiles_available: true }).await;

    let doc = app.page("view=course&module=1");
    assert!(doc.contains("Fundamentos"));
    assert!(doc.contains("Variables"));
    assert!(doc.contains("Condicionales"));
}

// ---------------------------------------------------------------------------
// 2. Batch atomicity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn one_failing_required_resource_fails_the_batch() {
    struct OneBadResource;

    #[async_trait]
    impl ResourceFetcher for OneBadResource {
        async fn fetch(&self, resource: Resource) -> Result<Value, FetchError> {
            if resource == Resource::Irt {
                return Err(FetchError::Http { resource: resource.name(), status: 500 });
            }
            Ok(fixture(resource))
        }
    }

    let err = load_all(&OneBadResource).await.unwrap_err();
    assert_eq!(err.resource(), "irt");
}

// ---------------------------------------------------------------------------
// 3. Retry exhaustion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exhausted_retries_keep_the_previous_dataset_intact() {
    let mut app = App::without_cache(RetryConfig { max_retries: 2, base_delay_ms: 1 });
    app.refresh(&FixtureFetcher { profiles_available: true }).await;
    let before = app.dataset().last_updated;

    let down = DownFetcher { calls: AtomicU32::new(0) };
    app.refresh(&down).await;

    // three attempts, nine required resources each; profiles never reached
    assert_eq!(down.calls.load(Ordering::SeqCst), 27);
    assert!(app.dataset().is_ready());
    assert_eq!(app.dataset().last_updated, before);

    // and the dashboard still serves the old data, not an error page
    let doc = app.page("view=general");
    assert!(doc.contains("Analiticos"));
    assert!(!doc.contains("error-container"));
}

#[tokio::test]
async fn first_load_failure_renders_error_with_retry_link() {
    let mut app = App::without_cache(no_retry());
    let down = DownFetcher { calls: AtomicU32::new(0) };
    app.refresh(&down).await;

    assert!(matches!(app.dataset().status, DatasetStatus::Failed(_)));
    let doc = app.page("view=general");
    assert!(doc.contains("error-container"));
    assert!(doc.contains("Retry"));
}

// ---------------------------------------------------------------------------
// 4. Optional profiles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_profiles_resource_only_degrades_the_individual_view() {
    let mut app = App::without_cache(no_retry());
    app.refresh(&FixtureFetcher { profiles_available: false }).await;

    assert!(app.dataset().is_ready());
    assert!(app.dataset().profiles.is_none());

    let doc = app.page("view=individual&participant=1");
    assert!(doc.contains("Participant 1"));
    assert!(doc.contains("Consolidated profile data is not available"));

    // everything else is untouched
    let doc = app.page("view=analytics&subview=clustering");
    assert!(!doc.contains("error-container"));
}

// ---------------------------------------------------------------------------
// 5. Snapshot persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn snapshot_survives_store_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mirror.sqlite");
    let path = path.to_str().unwrap();

    let dataset = load_all(&FixtureFetcher { profiles_available: true })
        .await
        .unwrap();
    {
        let mut store = SnapshotStore::open(path).unwrap();
        store.save(&dataset).unwrap();
    }

    let store = SnapshotStore::open(path).unwrap();
    let restored = store.load().unwrap();
    assert_eq!(restored.detailed_skills.len(), 2);
    assert_eq!(
        restored.clustering.cluster_profiles["0"].profile_name,
        "Analiticos"
    );
    assert_eq!(restored.status, DatasetStatus::Ready);
}
