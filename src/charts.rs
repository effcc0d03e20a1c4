//! Chart configuration builders.
//!
//! The adapter does not draw anything: each builder turns a prepared data
//! array into a chart-library configuration value bound to a container id.
//! The page embeds the collected configs as JSON and a small bootstrap
//! creates the actual canvases once the containers are mounted. Repeated
//! specs for the same container replace the prior one, which is what keeps
//! re-renders free of ghost chart instances.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::prepare::{format_value, round1, NamedValue, RadarPoint, ScatterPoint};

/// Shared palette; color assignment is by data index, so re-renders of the
/// same data stay visually stable.
pub const PALETTE: [&str; 20] = [
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884d8", "#82ca9d", "#ffc658", "#d53e4f",
    "#f46d43", "#fdae61", "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#b07aa1",
    "#9c755f", "#bab0ab", "#23171b", "#3c5488",
];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no data for chart '{0}'")]
    Empty(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    Radar,
    Scatter,
    Progress,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub container: String,
    pub kind: ChartKind,
    pub title: Option<String>,
    pub config: Value,
}

/// Ordered set of chart specs keyed by container id. Inserting a spec for
/// an already-present container replaces it in place
/// (destroy-then-recreate semantics).
#[derive(Debug, Default)]
pub struct ChartSet {
    specs: Vec<ChartSpec>,
}

impl ChartSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec: ChartSpec) {
        if let Some(existing) = self.specs.iter_mut().find(|s| s.container == spec.container) {
            *existing = spec;
        } else {
            self.specs.push(spec);
        }
    }

    pub fn specs(&self) -> &[ChartSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// JSON payload for the page bootstrap.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.specs).unwrap_or(Value::Null)
    }
}

fn colors_for(n: usize) -> Vec<&'static str> {
    (0..n).map(palette_color).collect()
}

/// Vertical or horizontal bar chart over name/value rows.
pub fn bar_chart(
    container: &str,
    data: &[NamedValue],
    title: Option<&str>,
    horizontal: bool,
) -> Result<ChartSpec, ChartError> {
    if data.is_empty() {
        return Err(ChartError::Empty(container.to_string()));
    }
    let labels: Vec<&str> = data.iter().map(|d| d.name.as_str()).collect();
    let values: Vec<f64> = data.iter().map(|d| round1(d.value)).collect();
    Ok(ChartSpec {
        container: container.to_string(),
        kind: ChartKind::Bar,
        title: title.map(String::from),
        config: json!({
            "labels": labels,
            "datasets": [{
                "data": values,
                "backgroundColor": colors_for(data.len()),
            }],
            "indexAxis": if horizontal { "y" } else { "x" },
        }),
    })
}

pub fn pie_chart(
    container: &str,
    data: &[NamedValue],
    title: Option<&str>,
) -> Result<ChartSpec, ChartError> {
    if data.is_empty() {
        return Err(ChartError::Empty(container.to_string()));
    }
    let labels: Vec<&str> = data.iter().map(|d| d.name.as_str()).collect();
    let values: Vec<f64> = data.iter().map(|d| round1(d.value)).collect();
    Ok(ChartSpec {
        container: container.to_string(),
        kind: ChartKind::Pie,
        title: title.map(String::from),
        config: json!({
            "labels": labels,
            "datasets": [{
                "data": values,
                "backgroundColor": colors_for(data.len()),
            }],
        }),
    })
}

pub fn line_chart(
    container: &str,
    labels: &[String],
    data: &[f64],
    title: Option<&str>,
) -> Result<ChartSpec, ChartError> {
    if data.is_empty() || labels.len() != data.len() {
        return Err(ChartError::Empty(container.to_string()));
    }
    Ok(ChartSpec {
        container: container.to_string(),
        kind: ChartKind::Line,
        title: title.map(String::from),
        config: json!({
            "labels": labels,
            "datasets": [{
                "data": data.iter().map(|v| round1(*v)).collect::<Vec<f64>>(),
                "borderColor": palette_color(0),
                "fill": false,
            }],
        }),
    })
}

/// Radar over percentage-valued skills. One series, or two when the points
/// carry a group average. The axis is pinned 0-100 regardless of the data
/// range so different skill sets stay comparable, and tooltips format to
/// one decimal with a `%` suffix.
pub fn radar_chart(
    container: &str,
    data: &[RadarPoint],
    title: Option<&str>,
) -> Result<ChartSpec, ChartError> {
    if data.is_empty() {
        return Err(ChartError::Empty(container.to_string()));
    }
    let labels: Vec<&str> = data.iter().map(|d| d.subject.as_str()).collect();
    let values: Vec<f64> = data.iter().map(|d| round1(d.value)).collect();

    let mut datasets = vec![json!({
        "label": "Level",
        "data": values,
        "backgroundColor": "rgba(54, 162, 235, 0.2)",
        "borderColor": "rgb(54, 162, 235)",
    })];
    let has_group = data.iter().any(|d| d.group.is_some());
    if has_group {
        let group: Vec<Value> = data
            .iter()
            .map(|d| d.group.map(|g| json!(round1(g))).unwrap_or(Value::Null))
            .collect();
        datasets.push(json!({
            "label": "Group average",
            "data": group,
            "backgroundColor": "rgba(255, 99, 132, 0.2)",
            "borderColor": "rgb(255, 99, 132)",
        }));
    }

    Ok(ChartSpec {
        container: container.to_string(),
        kind: ChartKind::Radar,
        title: title.map(String::from),
        config: json!({
            "labels": labels,
            "datasets": datasets,
            "scale": { "min": 0, "max": 100, "stepSize": 20 },
            "tooltipFormat": "percent1",
        }),
    })
}

/// Cluster scatter; point color is fixed by cluster id into the palette.
pub fn scatter_chart(
    container: &str,
    data: &[ScatterPoint],
    title: Option<&str>,
) -> Result<ChartSpec, ChartError> {
    if data.is_empty() {
        return Err(ChartError::Empty(container.to_string()));
    }
    let points: Vec<Value> = data
        .iter()
        .map(|p| {
            json!({
                "x": p.x,
                "y": p.y,
                "cluster": p.cluster,
                "label": p.participant,
                "color": palette_color(p.cluster.max(0) as usize),
            })
        })
        .collect();
    Ok(ChartSpec {
        container: container.to_string(),
        kind: ChartKind::Scatter,
        title: title.map(String::from),
        config: json!({ "points": points }),
    })
}

/// Horizontal progress bar, value formatted to one decimal.
pub fn progress_bar(container: &str, value: f64, max: f64) -> ChartSpec {
    let clamped = value.clamp(0.0, max);
    ChartSpec {
        container: container.to_string(),
        kind: ChartKind::Progress,
        title: None,
        config: json!({
            "value": round1(clamped),
            "max": max,
            "label": format!("{}%", format_value(clamped)),
        }),
    }
}
