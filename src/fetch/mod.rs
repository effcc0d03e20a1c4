//! Data access layer: fetches the fixed set of assessment JSON resources
//! and assembles them into a [`Dataset`].
//!
//! The batch is atomic for the nine required resources: if any of them
//! fails, the whole load fails and the caller keeps its previous dataset.
//! The consolidated participant profiles are optional by policy; their
//! failure is logged as a warning and the individual view degrades to a
//! not-found state.

pub mod retry;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::model::{Dataset, DatasetStatus, ParticipantProfiles};

/// The named resources the dashboard consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Objectives,
    GroupSkills,
    Clustering,
    DetailedSkills,
    CoursePlan,
    Recommendations,
    Summary,
    FactorAnalysis,
    Irt,
    Profiles,
}

impl Resource {
    /// All required resources, in batch order. `Profiles` is deliberately
    /// not in this list.
    pub const REQUIRED: [Resource; 9] = [
        Resource::Objectives,
        Resource::GroupSkills,
        Resource::Clustering,
        Resource::DetailedSkills,
        Resource::CoursePlan,
        Resource::Recommendations,
        Resource::Summary,
        Resource::FactorAnalysis,
        Resource::Irt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Objectives => "objectives",
            Resource::GroupSkills => "group_skills",
            Resource::Clustering => "clustering",
            Resource::DetailedSkills => "detailed_skills",
            Resource::CoursePlan => "course_plan",
            Resource::Recommendations => "recommendations",
            Resource::Summary => "summary",
            Resource::FactorAnalysis => "factor_analysis",
            Resource::Irt => "irt",
            Resource::Profiles => "profiles",
        }
    }

    /// Path under the data base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Objectives => "objetivos_participantes.json",
            Resource::GroupSkills => "habilidades_grupo.json",
            Resource::Clustering => "analisis_clustering.json",
            Resource::DetailedSkills => "habilidades_blandas_detalladas.json",
            Resource::CoursePlan => "plan_curso.json",
            Resource::Recommendations => "recomendaciones_pedagogicas.json",
            Resource::Summary => "resumen_analisis.json",
            Resource::FactorAnalysis => "analisis_factorial.json",
            Resource::Irt => "analisis_irt.json",
            Resource::Profiles => "perfiles_consolidados.json",
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{resource}: HTTP {status}")]
    Http { resource: &'static str, status: u16 },
    #[error("{resource}: network error: {message}")]
    Network {
        resource: &'static str,
        message: String,
    },
    #[error("{resource}: malformed payload: {message}")]
    Parse {
        resource: &'static str,
        message: String,
    },
}

impl FetchError {
    pub fn resource(&self) -> &'static str {
        match self {
            FetchError::Http { resource, .. } => resource,
            FetchError::Network { resource, .. } => resource,
            FetchError::Parse { resource, .. } => resource,
        }
    }
}

/// Seam for the batch loader: the real fetcher goes over HTTP, tests
/// script one.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, resource: Resource) -> Result<Value, FetchError>;
}

/// HTTP fetcher over reqwest.
pub struct HttpFetcher {
    client: Client,
    base: String,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base: config.data_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, resource: Resource) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base, resource.path());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                resource: resource.name(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                resource: resource.name(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| FetchError::Parse {
            resource: resource.name(),
            message: e.to_string(),
        })
    }
}

fn decode<T: DeserializeOwned>(resource: Resource, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::Parse {
        resource: resource.name(),
        message: e.to_string(),
    })
}

/// Fetch every required resource concurrently and assemble a fresh, fully
/// populated dataset. Fails as a whole if any required resource fails; the
/// caller's previous dataset is never touched.
pub async fn load_all(fetcher: &dyn ResourceFetcher) -> Result<Dataset, FetchError> {
    let fetches = Resource::REQUIRED.iter().map(|r| fetcher.fetch(*r));
    let mut results: Vec<Result<Value, FetchError>> = join_all(fetches).await;

    // Surface the first failure; the batch is all-or-nothing.
    for result in &results {
        if let Err(e) = result {
            log(
                Level::Error,
                Domain::Load,
                "batch_resource_failed",
                obj(&[("resource", v_str(e.resource()))]),
            );
        }
    }
    let mut values = Vec::with_capacity(results.len());
    for result in results.drain(..) {
        values.push(result?);
    }
    let mut values = values.into_iter();

    // Same order as Resource::REQUIRED.
    let dataset = Dataset {
        objectives: decode(Resource::Objectives, values.next().unwrap_or(Value::Null))?,
        group_skills: decode(Resource::GroupSkills, values.next().unwrap_or(Value::Null))?,
        clustering: decode(Resource::Clustering, values.next().unwrap_or(Value::Null))?,
        detailed_skills: decode(Resource::DetailedSkills, values.next().unwrap_or(Value::Null))?,
        course_plan: decode(Resource::CoursePlan, values.next().unwrap_or(Value::Null))?,
        recommendations: decode(Resource::Recommendations, values.next().unwrap_or(Value::Null))?,
        summary: decode(Resource::Summary, values.next().unwrap_or(Value::Null))?,
        factor_analysis: decode(Resource::FactorAnalysis, values.next().unwrap_or(Value::Null))?,
        irt: decode(Resource::Irt, values.next().unwrap_or(Value::Null))?,
        profiles: fetch_optional_profiles(fetcher).await,
        status: DatasetStatus::Ready,
        last_updated: Some(Utc::now()),
    };

    log(
        Level::Info,
        Domain::Load,
        "batch_loaded",
        obj(&[
            ("participants", serde_json::json!(dataset.detailed_skills.len())),
            ("skills", serde_json::json!(dataset.group_skills.len())),
            ("profiles", serde_json::json!(dataset.profiles.is_some())),
        ]),
    );

    Ok(dataset)
}

/// Profiles are optional: a failure here is a warning, not a batch failure.
async fn fetch_optional_profiles(fetcher: &dyn ResourceFetcher) -> Option<ParticipantProfiles> {
    match fetcher.fetch(Resource::Profiles).await {
        Ok(value) => match decode::<ParticipantProfiles>(Resource::Profiles, value) {
            Ok(profiles) => Some(profiles),
            Err(e) => {
                log(
                    Level::Warn,
                    Domain::Load,
                    "profiles_malformed",
                    obj(&[("error", v_str(&e.to_string()))]),
                );
                None
            }
        },
        Err(e) => {
            log(
                Level::Warn,
                Domain::Load,
                "profiles_unavailable",
                obj(&[("error", v_str(&e.to_string()))]),
            );
            None
        }
    }
}
