//! Render dispatch: maps (view, subview, selection) onto one of the
//! rendering routines and assembles the full page.
//!
//! Routines build markup synchronously and hand chart construction off to
//! [`ChartSpec`] values collected in a [`ChartSet`]; the page embeds them
//! as JSON for a bootstrap that runs after the containers are mounted. A
//! failed chart build becomes an inline error block scoped to its
//! container and never aborts the rest of the view.

pub mod html;

mod analytics;
mod course;
mod general;
mod individual;

use crate::charts::{ChartError, ChartSet, ChartSpec};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::model::{Dataset, DatasetStatus};
use crate::prepare::{self, VisualizationData};
use crate::view::{Subview, View, ViewState};

pub struct RenderedPage {
    pub title: String,
    pub body: String,
    pub charts: ChartSet,
}

impl RenderedPage {
    fn fragment(title: &str, body: String) -> Self {
        Self {
            title: title.to_string(),
            body,
            charts: ChartSet::new(),
        }
    }
}

/// Emit a chart container and record its spec, or an inline error block if
/// the chart config could not be built.
pub(crate) fn mount_chart(
    out: &mut String,
    charts: &mut ChartSet,
    result: Result<ChartSpec, ChartError>,
) {
    match result {
        Ok(spec) => {
            out.push_str(&html::chart_container(&spec.container));
            charts.insert(spec);
        }
        Err(e) => {
            log(
                Level::Warn,
                Domain::Render,
                "chart_failed",
                obj(&[("error", v_str(&e.to_string()))]),
            );
            out.push_str(&html::inline_error(&format!("Could not build chart: {}", e)));
        }
    }
}

/// Full-view error fragment with a retry action back to the same route.
pub(crate) fn error_fragment(message: &str, state: &ViewState) -> String {
    format!(
        "<div class=\"error-container\"><h2>Error</h2><p>{}</p>{}</div>",
        html::escape(message),
        html::link(&format!("?{}", state.to_query()), "Retry")
    )
}

fn loading_fragment() -> String {
    "<div class=\"loading-container\"><div class=\"loading-spinner\"></div>\
     <p>Loading dashboard data...</p></div>"
        .to_string()
}

/// Dispatch. Loading and failed datasets short-circuit; everything else
/// goes through the preparation pass first.
pub fn render(state: &ViewState, dataset: &Dataset) -> RenderedPage {
    match &dataset.status {
        DatasetStatus::Loading => {
            return RenderedPage::fragment("Loading", loading_fragment());
        }
        DatasetStatus::Failed(message) => {
            return RenderedPage::fragment("Error", error_fragment(message, state));
        }
        DatasetStatus::Ready => {}
    }

    let viz = match prepare::prepare_visualization_data(dataset) {
        Some(viz) => viz,
        None => {
            return RenderedPage::fragment(
                "Error",
                error_fragment("Could not prepare visualization data", state),
            );
        }
    };

    let page = dispatch(state, dataset, &viz);
    log(
        Level::Debug,
        Domain::Render,
        "view_rendered",
        obj(&[
            ("view", v_str(state.view.as_str())),
            ("subview", v_str(state.subview.as_str())),
            ("charts", serde_json::json!(page.charts.specs().len())),
        ]),
    );
    page
}

fn dispatch(state: &ViewState, dataset: &Dataset, viz: &VisualizationData) -> RenderedPage {
    match state.view {
        View::General => general::render(dataset, viz),
        View::Individual => individual::render(dataset, state.participant.as_deref()),
        View::Course => course::render(dataset, state.module),
        View::Analytics => match state.subview {
            Subview::Clustering => analytics::render_clustering(dataset, viz),
            Subview::Factor => analytics::render_factor(dataset, viz),
            Subview::Irt => analytics::render_irt(viz),
            Subview::Pedagogical => analytics::render_pedagogical(dataset, viz),
        },
    }
}

fn nav_tabs(state: &ViewState) -> String {
    let mut out = String::from("<nav class=\"tabs\">");
    for view in View::ALL {
        let mut target = state.clone();
        target.view = view;
        let class = if view == state.view { "tab-button active" } else { "tab-button" };
        out.push_str(&format!(
            "<a class=\"{}\" href=\"?{}\">{}</a>",
            class,
            html::escape(&target.to_query()),
            html::escape(view.as_str())
        ));
    }
    out.push_str("</nav>");
    out
}

fn subtabs(state: &ViewState) -> String {
    if state.view != View::Analytics {
        return String::new();
    }
    let mut out = String::from("<nav class=\"subtabs\">");
    for subview in Subview::ALL {
        let mut target = state.clone();
        target.subview = subview;
        let class = if subview == state.subview {
            "subtab-button active"
        } else {
            "subtab-button"
        };
        out.push_str(&format!(
            "<a class=\"{}\" href=\"?{}\">{}</a>",
            class,
            html::escape(&target.to_query()),
            html::escape(subview.as_str())
        ));
    }
    out.push_str("</nav>");
    out
}

fn header(dataset: &Dataset) -> String {
    let stats = prepare::dashboard_stats(dataset);
    format!(
        "<header><h1>Assessment Dashboard</h1><p id=\"header-stats\">Full analysis of {} participants and {} modules</p></header>",
        stats.participants, stats.modules
    )
}

/// Assemble the complete HTML document for a view state. Chart specs are
/// embedded after the markup so construction is deferred until containers
/// exist; a spec whose container went missing is downgraded to an inline
/// error at the end of the page.
pub fn render_document(state: &ViewState, dataset: &Dataset) -> String {
    let page = render(state, dataset);

    let mut body = String::new();
    body.push_str(&header(dataset));
    body.push_str(&nav_tabs(state));
    body.push_str(&subtabs(state));
    body.push_str("<main id=\"dashboard-content\">");
    body.push_str(&page.body);
    body.push_str("</main>");

    let mut orphaned = Vec::new();
    for spec in page.charts.specs() {
        if !body.contains(&format!("id=\"{}\"", spec.container)) {
            orphaned.push(spec.container.clone());
        }
    }
    for container in orphaned {
        log(
            Level::Warn,
            Domain::Render,
            "container_missing",
            obj(&[("container", v_str(&container))]),
        );
        body.push_str(&html::inline_error(&format!(
            "Chart target '{}' is missing from the page",
            container
        )));
    }

    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title>\
         <link rel=\"stylesheet\" href=\"/static/dashboard.css\"></head><body>{}\
         <script id=\"chart-specs\" type=\"application/json\">{}</script>\
         <script src=\"/static/charts.js\" defer></script></body></html>",
        html::escape(&page.title),
        body,
        page.charts.to_json()
    )
}
