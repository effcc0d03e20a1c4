//! Route-level tests for the HTTP surface, exercised against a controller
//! loaded with real wire-shaped data.

use async_trait::async_trait;
use serde_json::{json, Value};

use cohortboard::app::App;
use cohortboard::fetch::retry::RetryConfig;
use cohortboard::fetch::{FetchError, Resource, ResourceFetcher};
use cohortboard::server::route;

struct SmallFetcher;

#[async_trait]
impl ResourceFetcher for SmallFetcher {
    async fn fetch(&self, resource: Resource) -> Result<Value, FetchError> {
        Ok(match resource {
            Resource::GroupSkills => json!({"logica": {"porcentaje_promedio": 55.0}}),
            Resource::Clustering => json!({
                "clusters": {"1": 0},
                "cluster_profiles": {"0": {"nombre_perfil": "Base", "participantes": ["1"]}}
            }),
            Resource::DetailedSkills => json!({
                "1": {"logica": {"porcentaje": 55.0, "nivel": "medio"}}
            }),
            Resource::CoursePlan => json!({
                "modulos": [{"numero": 1, "titulo": "Logica basica",
                             "sesiones": [{"numero": 1, "titulo": "Intro"}]}]
            }),
            Resource::Profiles => json!({"perfiles": {}}),
            _ => json!({}),
        })
    }
}

async fn loaded_app() -> App {
    let mut app = App::without_cache(RetryConfig { max_retries: 0, base_delay_ms: 1 });
    app.refresh(&SmallFetcher).await;
    assert!(app.dataset().is_ready());
    app
}

#[tokio::test]
async fn index_serves_the_dashboard_document() {
    let mut app = loaded_app().await;
    let response = route(&mut app, "/", "view=analytics&subview=factor");
    assert_eq!(response.status, "200 OK");
    assert_eq!(response.content_type, "text/html; charset=utf-8");
    assert!(response.body.contains("<!doctype html>"));
    assert!(response.body.contains("chart-specs"));
}

#[tokio::test]
async fn stats_route_reports_loaded_counts() {
    let mut app = loaded_app().await;
    let response = route(&mut app, "/api/stats", "");
    let stats: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(stats["participants"], 1);
    assert_eq!(stats["skills"], 1);
    assert_eq!(stats["modules"], 1);
    assert_eq!(stats["sessions"], 1);
    assert_eq!(stats["complete"], true);
}

#[tokio::test]
async fn search_route_matches_across_kinds() {
    let mut app = loaded_app().await;
    let response = route(&mut app, "/api/search", "q=logica");
    let results: Value = serde_json::from_str(&response.body).unwrap();
    // the skill and the module title both contain "logica"
    assert_eq!(results["count"], 2);

    let response = route(&mut app, "/api/search", "q=");
    let results: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(results["count"], 0);
}

#[tokio::test]
async fn export_route_scopes_to_the_named_section() {
    let mut app = loaded_app().await;
    let response = route(&mut app, "/api/export", "section=skills");
    let exported: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(exported["logica"]["porcentaje_promedio"], 55.0);
    assert!(exported.get("modulos").is_none());
}

#[tokio::test]
async fn unknown_paths_get_404_but_bad_queries_do_not() {
    let mut app = loaded_app().await;
    assert_eq!(route(&mut app, "/api/nope", "").status, "404 NOT FOUND");
    // junk query values fall back to defaults instead of failing
    let response = route(&mut app, "/", "view=bogus&module=xyz");
    assert_eq!(response.status, "200 OK");
    assert!(response.body.contains("dashboard-content"));
}
