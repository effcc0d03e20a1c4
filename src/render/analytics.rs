//! Analytics sub-views: clustering, factor analysis, IRT and the
//! pedagogical recommendations.

use super::{html, mount_chart, RenderedPage};
use crate::charts::{self, ChartSet};
use crate::model::Dataset;
use crate::prepare::{format_value, DifficultyBand, VisualizationData};

pub fn render_clustering(dataset: &Dataset, viz: &VisualizationData) -> RenderedPage {
    let mut out = String::new();
    let mut chart_set = ChartSet::new();

    out.push_str("<div class=\"grid\">");

    let mut scatter_body = String::new();
    mount_chart(
        &mut scatter_body,
        &mut chart_set,
        charts::scatter_chart("cluster-scatter", &viz.scatter, Some("Participant clusters")),
    );
    out.push_str(&html::card("Cluster map", &scatter_body));

    let mut distribution_body = String::new();
    mount_chart(
        &mut distribution_body,
        &mut chart_set,
        charts::pie_chart("cluster-distribution", &viz.cluster_distribution, None),
    );
    out.push_str(&html::card("Distribution", &distribution_body));

    out.push_str(&html::card_full_width("Profile comparison", &profile_comparison(dataset)));
    out.push_str("</div>");

    RenderedPage {
        title: "Clustering".to_string(),
        body: out,
        charts: chart_set,
    }
}

fn profile_comparison(dataset: &Dataset) -> String {
    let profiles = &dataset.clustering.cluster_profiles;
    if profiles.is_empty() {
        return html::inline_error("No cluster profiles available");
    }
    let rows: Vec<Vec<String>> = profiles
        .values()
        .map(|p| {
            let strong: Vec<String> = p
                .distinctive_skills
                .iter()
                .map(|s| format!("{} (+{})", s.skill, format_value(s.delta)))
                .collect();
            let weak: Vec<String> = p
                .weak_skills
                .iter()
                .map(|s| format!("{} ({})", s.skill, format_value(s.delta)))
                .collect();
            vec![
                p.profile_name.clone(),
                p.members.len().to_string(),
                strong.join(", "),
                weak.join(", "),
            ]
        })
        .collect();
    html::table(&["Profile", "Members", "Distinctive skills", "Weak skills"], &rows)
}

pub fn render_factor(dataset: &Dataset, viz: &VisualizationData) -> RenderedPage {
    let mut out = String::new();
    let mut chart_set = ChartSet::new();

    out.push_str("<div class=\"grid\">");

    let mut variance_body = String::from("<p>Total explained variance</p>");
    let spec = charts::progress_bar("factor-variance", viz.total_explained_variance_percent, 100.0);
    variance_body.push_str(&html::chart_container(&spec.container));
    chart_set.insert(spec);

    let variance_series: Vec<f64> = viz
        .factor_components
        .iter()
        .map(|c| c.variance_percent)
        .collect();
    let labels: Vec<String> = viz.factor_components.iter().map(|c| c.factor.clone()).collect();
    mount_chart(
        &mut variance_body,
        &mut chart_set,
        charts::line_chart("variance-by-factor", &labels, &variance_series, Some("Variance by factor")),
    );
    out.push_str(&html::card("Explained variance", &variance_body));

    let component_rows: Vec<Vec<String>> = viz
        .factor_components
        .iter()
        .map(|c| {
            vec![
                c.factor.clone(),
                c.description.clone(),
                c.skills.clone(),
                format!("{}%", format_value(c.variance_percent)),
            ]
        })
        .collect();
    out.push_str(&html::card_full_width(
        "Components",
        &html::table(&["Factor", "Description", "Skills", "Variance"], &component_rows),
    ));

    let loading_rows: Vec<Vec<String>> = dataset
        .factor_analysis
        .skill_factors
        .iter()
        .map(|(skill, loading)| {
            vec![
                skill.clone(),
                loading.principal_factor.clone(),
                format_value(loading.loading),
            ]
        })
        .collect();
    out.push_str(&html::card_full_width(
        "Skill loadings",
        &html::table(&["Skill", "Principal factor", "Loading"], &loading_rows),
    ));

    out.push_str("</div>");

    RenderedPage {
        title: "Factor analysis".to_string(),
        body: out,
        charts: chart_set,
    }
}

pub fn render_irt(viz: &VisualizationData) -> RenderedPage {
    let mut out = String::new();
    let mut chart_set = ChartSet::new();

    out.push_str("<div class=\"grid\">");

    let mut category_body = String::new();
    mount_chart(
        &mut category_body,
        &mut chart_set,
        charts::pie_chart("irt-categories", &viz.difficulty_by_category, None),
    );
    out.push_str(&html::card("Items per category", &category_body));

    out.push_str(&html::card_full_width("Question ranking", &ranking_table(viz)));
    out.push_str("</div>");

    RenderedPage {
        title: "IRT analysis".to_string(),
        body: out,
        charts: chart_set,
    }
}

fn difficulty_badge(difficulty: f64) -> String {
    let band = DifficultyBand::from_difficulty(difficulty);
    let class = match band {
        DifficultyBand::VeryEasy => "green",
        DifficultyBand::Easy => "blue",
        DifficultyBand::Medium => "yellow",
        DifficultyBand::Hard | DifficultyBand::VeryHard => "red",
    };
    html::badge(class, band.label())
}

fn ranking_table(viz: &VisualizationData) -> String {
    if viz.irt_ranking.is_empty() {
        return html::inline_error("No IRT parameters available");
    }
    let mut out = String::from(
        "<table><thead><tr><th>Question</th><th>Difficulty</th><th>Band</th>\
         <th>Discrimination</th><th>Category</th></tr></thead><tbody>",
    );
    for item in &viz.irt_ranking {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            html::escape(&item.question),
            format_value(item.difficulty),
            difficulty_badge(item.difficulty),
            format_value(item.discrimination),
            html::escape(&item.category)
        ));
    }
    out.push_str("</tbody></table>");
    out
}

pub fn render_pedagogical(dataset: &Dataset, viz: &VisualizationData) -> RenderedPage {
    let mut out = String::new();

    out.push_str("<div class=\"grid\">");

    let mut sequence_body = String::new();
    if viz.sequence.is_empty() {
        sequence_body.push_str(&html::inline_error("No recommended sequence available"));
    } else {
        sequence_body.push_str("<ol class=\"sequence\">");
        for phase in &viz.sequence {
            sequence_body.push_str(&format!(
                "<li><strong>{}</strong> ({}), {} topics<p>{}</p></li>",
                html::escape(&phase.phase),
                html::escape(&phase.duration),
                phase.topic_count,
                html::escape(&phase.description)
            ));
        }
        sequence_body.push_str("</ol>");
    }
    out.push_str(&html::card_full_width("Recommended sequence", &sequence_body));

    let pattern_rows: Vec<Vec<String>> = dataset
        .recommendations
        .difficulty_patterns
        .iter()
        .map(|(category, pattern)| {
            vec![
                category.clone(),
                pattern.hardest.clone(),
                pattern.expected.clone(),
                pattern.easiest.clone(),
            ]
        })
        .collect();
    out.push_str(&html::card_full_width(
        "Difficulty patterns",
        &html::table(&["Category", "Hardest", "Expected", "Easiest"], &pattern_rows),
    ));

    let skills: Vec<String> = dataset
        .recommendations
        .skill_recommendations
        .keys()
        .cloned()
        .collect();
    out.push_str(&html::card("Skill recommendations", &html::list(&skills)));

    let areas: Vec<String> = dataset
        .recommendations
        .area_recommendations
        .keys()
        .cloned()
        .collect();
    out.push_str(&html::card("Area recommendations", &html::list(&areas)));

    out.push_str("</div>");

    RenderedPage {
        title: "Pedagogical recommendations".to_string(),
        body: out,
        charts: ChartSet::new(),
    }
}
