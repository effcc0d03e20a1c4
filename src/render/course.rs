//! Course plan view: plan header, module table and the selected module's
//! sessions. Duration strings are free-form and passed through untouched.

use super::{html, RenderedPage};
use crate::charts::ChartSet;
use crate::model::{CourseModule, Dataset};
use crate::prepare;
use crate::view::{View, ViewState};

pub fn render(dataset: &Dataset, module: Option<u32>) -> RenderedPage {
    let plan = &dataset.course_plan;
    let mut out = String::new();

    let mut header = format!("<p>{}</p>", html::escape(&plan.description));
    header.push_str("<h3>Learning objectives</h3>");
    header.push_str(&html::list(&plan.learning_objectives));
    header.push_str("<h3>Target audience</h3>");
    header.push_str(&html::list(&plan.target_audience));
    header.push_str(&format!(
        "<p>Total duration: <strong>{}</strong></p>",
        html::escape(if plan.total_duration.is_empty() {
            prepare::NOT_AVAILABLE
        } else {
            &plan.total_duration
        })
    ));
    let title = if plan.title.is_empty() { "Course plan" } else { &plan.title };
    out.push_str(&html::card_full_width(title, &header));

    out.push_str(&html::card_full_width("Modules", &module_table(dataset, module)));

    if let Some(number) = module {
        match plan.module(number) {
            Some(selected) => out.push_str(&module_detail(selected)),
            None => {
                return RenderedPage {
                    title: "Module not found".to_string(),
                    body: not_found(dataset, number),
                    charts: ChartSet::new(),
                };
            }
        }
    }

    RenderedPage {
        title: "Course plan".to_string(),
        body: out,
        charts: ChartSet::new(),
    }
}

fn module_link(number: u32, label: &str) -> String {
    let state = ViewState {
        view: View::Course,
        module: Some(number),
        ..Default::default()
    };
    html::link(&format!("?{}", state.to_query()), label)
}

fn module_table(dataset: &Dataset, selected: Option<u32>) -> String {
    let rows = prepare::module_rows(&dataset.course_plan);
    if rows.is_empty() {
        return html::inline_error("No modules in the course plan");
    }
    let mut out = String::from(
        "<table><thead><tr><th>#</th><th>Module</th><th>Duration</th><th>Sessions</th></tr></thead><tbody>",
    );
    for row in rows {
        let class = if selected == Some(row.number) { " class=\"selected\"" } else { "" };
        out.push_str(&format!(
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            class,
            row.number,
            module_link(row.number, &row.name),
            html::escape(&row.duration),
            row.session_count
        ));
    }
    out.push_str("</tbody></table>");
    out
}

fn module_detail(module: &CourseModule) -> String {
    let mut body = format!("<p>{}</p>", html::escape(&module.description));
    if !module.objectives.is_empty() {
        body.push_str("<h3>Objectives</h3>");
        body.push_str(&html::list(&module.objectives));
    }
    if let Some(evaluation) = &module.evaluation {
        body.push_str(&format!("<h3>Evaluation</h3><p>{}</p>", html::escape(evaluation)));
    }

    body.push_str("<h3>Sessions</h3>");
    if module.sessions.is_empty() {
        body.push_str("<p class=\"empty\">No sessions defined.</p>");
    }
    for session in &module.sessions {
        body.push_str(&format!(
            "<div class=\"session\"><h4>Session {}: {}</h4><p>{}</p><em>{}</em>",
            session.number,
            html::escape(&session.title),
            html::escape(&session.description),
            html::escape(&session.duration)
        ));
        if !session.topics.is_empty() {
            body.push_str("<h5>Topics</h5>");
            body.push_str(&html::list(&session.topics));
        }
        if !session.recommended_activities.is_empty() {
            body.push_str("<h5>Recommended activities</h5>");
            body.push_str(&html::list(&session.recommended_activities));
        }
        if !session.resources.is_empty() {
            body.push_str("<h5>Resources</h5>");
            body.push_str(&html::list(&session.resources));
        }
        body.push_str("</div>");
    }

    html::card_full_width(
        &format!("Module {}: {}", module.number, module.title),
        &body,
    )
}

fn not_found(dataset: &Dataset, number: u32) -> String {
    let mut out = format!(
        "<div class=\"not-found\"><h2>Module {} not found</h2><p>Available modules:</p><ul>",
        number
    );
    for module in &dataset.course_plan.modules {
        out.push_str("<li>");
        out.push_str(&module_link(
            module.number,
            &format!("Module {}: {}", module.number, module.title),
        ));
        out.push_str("</li>");
    }
    out.push_str("</ul></div>");
    out
}
