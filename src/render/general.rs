//! General overview: KPIs, cluster distribution, group skills, common
//! objectives and interest areas, learning sequence, difficulty spread and
//! the factor-analysis summary.

use super::{html, mount_chart, RenderedPage};
use crate::charts::{self, ChartSet};
use crate::model::Dataset;
use crate::prepare::{self, format_value, level_color, VisualizationData};

pub fn render(dataset: &Dataset, viz: &VisualizationData) -> RenderedPage {
    let mut out = String::new();
    let mut chart_set = ChartSet::new();

    out.push_str(&kpi_row(dataset, viz));

    out.push_str("<div class=\"grid\">");

    // Cluster distribution with a per-profile legend.
    let mut profiles_body = String::new();
    mount_chart(
        &mut profiles_body,
        &mut chart_set,
        charts::pie_chart("profiles-chart", &viz.cluster_distribution, None),
    );
    profiles_body.push_str(&cluster_legend(dataset));
    out.push_str(&html::card("Participant profiles", &profiles_body));

    // Group skill radar plus per-skill bars.
    let mut skills_body = String::new();
    mount_chart(
        &mut skills_body,
        &mut chart_set,
        charts::radar_chart("skills-chart", &viz.group_radar, None),
    );
    skills_body.push_str(&skill_bars(viz));
    out.push_str(&html::card("Group skills", &skills_body));

    let mut objectives_body = String::new();
    mount_chart(
        &mut objectives_body,
        &mut chart_set,
        charts::bar_chart("objectives-chart", &viz.common_objectives, Some("Objectives"), true),
    );
    out.push_str(&html::card("Most common objectives", &objectives_body));

    let mut areas_body = String::new();
    mount_chart(
        &mut areas_body,
        &mut chart_set,
        charts::bar_chart("areas-chart", &viz.common_areas, Some("Interest areas"), true),
    );
    out.push_str(&html::card("Most common interest areas", &areas_body));

    out.push_str(&html::card_full_width(
        "Recommended learning sequence",
        &sequence_markup(viz),
    ));

    let mut difficulty_body = String::new();
    mount_chart(
        &mut difficulty_body,
        &mut chart_set,
        charts::pie_chart("difficulty-chart", &viz.difficulty_by_category, None),
    );
    difficulty_body.push_str(
        "<p class=\"note\">Question counts per IRT difficulty category; the spread helps \
         balance the assessment.</p>",
    );
    out.push_str(&html::card("Question difficulty distribution", &difficulty_body));

    out.push_str(&html::card(
        "Principal components (factor analysis)",
        &factor_summary(viz, &mut chart_set),
    ));

    out.push_str("</div>");

    RenderedPage {
        title: "Overview".to_string(),
        body: out,
        charts: chart_set,
    }
}

fn kpi_row(dataset: &Dataset, viz: &VisualizationData) -> String {
    let stats = prepare::dashboard_stats(dataset);
    let mut out = String::from("<div class=\"kpi-container\">");
    out.push_str(&html::kpi("Participants", &stats.participants.to_string()));
    out.push_str(&html::kpi("Clusters", &stats.clusters.to_string()));
    out.push_str(&html::kpi("Modules", &stats.modules.to_string()));
    out.push_str(&html::kpi("Sessions", &stats.sessions.to_string()));
    let duration = if dataset.course_plan.total_duration.is_empty() {
        prepare::NOT_AVAILABLE.to_string()
    } else {
        dataset.course_plan.total_duration.clone()
    };
    out.push_str(&html::kpi("Total duration", &duration));
    out.push_str(&html::kpi(
        "Explained variance",
        &format!("{}%", format_value(viz.total_explained_variance_percent)),
    ));
    out.push_str("</div>");
    out
}

fn cluster_legend(dataset: &Dataset) -> String {
    let mut out = String::from("<div id=\"profiles-legend\">");
    for profile in dataset.clustering.cluster_profiles.values() {
        let distinctive: Vec<String> = profile
            .distinctive_skills
            .iter()
            .map(|s| format!("{} (+{})", s.skill, format_value(s.delta)))
            .collect();
        out.push_str(&format!(
            "<div class=\"legend-entry\"><strong>{}</strong>: {} members{}</div>",
            html::escape(if profile.profile_name.is_empty() {
                "Unnamed"
            } else {
                &profile.profile_name
            }),
            profile.members.len(),
            if distinctive.is_empty() {
                String::new()
            } else {
                format!(": {}", html::escape(&distinctive.join(", ")))
            }
        ));
    }
    out.push_str("</div>");
    out
}

fn skill_bars(viz: &VisualizationData) -> String {
    let mut out = String::from("<div id=\"skills-bars\">");
    for point in &viz.group_radar {
        out.push_str(&format!(
            "<div class=\"skill-bar\"><span>{}</span>\
             <div class=\"bar\" style=\"width:{}%;background:{}\"></div><span>{}%</span></div>",
            html::escape(&point.subject),
            point.value.clamp(0.0, 100.0),
            level_color_for(point.value),
            format_value(point.value)
        ));
    }
    out.push_str("</div>");
    out
}

fn level_color_for(percent: f64) -> &'static str {
    if percent < 40.0 {
        level_color("low")
    } else if percent < 60.0 {
        level_color("medium")
    } else if percent < 80.0 {
        level_color("high")
    } else {
        level_color("very high")
    }
}

fn sequence_markup(viz: &VisualizationData) -> String {
    if viz.sequence.is_empty() {
        return html::inline_error("No recommended sequence available");
    }
    let mut out = String::from("<ol class=\"sequence\">");
    for phase in &viz.sequence {
        out.push_str(&format!(
            "<li><strong>{}. {}</strong> <em>({})</em><p>{}</p><span class=\"topic-count\">{} topics</span></li>",
            phase.order,
            html::escape(&phase.phase),
            html::escape(&phase.duration),
            html::escape(&phase.description),
            phase.topic_count
        ));
    }
    out.push_str("</ol>");
    out
}

fn factor_summary(viz: &VisualizationData, chart_set: &mut ChartSet) -> String {
    let mut out = String::from("<div class=\"variance\"><p>Total explained variance</p>");
    let spec = charts::progress_bar("variance-bar", viz.total_explained_variance_percent, 100.0);
    out.push_str(&html::chart_container(&spec.container));
    chart_set.insert(spec);
    out.push_str("</div>");

    let rows: Vec<Vec<String>> = viz
        .factor_components
        .iter()
        .map(|c| {
            vec![
                c.factor.clone(),
                c.description.clone(),
                format!("{}%", format_value(c.variance_percent)),
            ]
        })
        .collect();
    out.push_str(&html::table(&["Factor", "Description", "Variance"], &rows));
    out
}
