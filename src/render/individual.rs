//! Individual view, driven by the consolidated participant profile plus
//! the detailed-skills radar. An id outside the loaded set renders the
//! not-found fragment with one-click recovery links; that state is
//! distinguishable from "data still loading", which never reaches here.

use super::{html, mount_chart, RenderedPage};
use crate::charts::{self, ChartSet};
use crate::model::Dataset;
use crate::prepare::{self, format_value, level_color};
use crate::view::{View, ViewState};

pub fn render(dataset: &Dataset, participant: Option<&str>) -> RenderedPage {
    let Some(id) = participant else {
        return RenderedPage {
            title: "Select participant".to_string(),
            body: selector(dataset, "Select a participant to see their profile"),
            charts: ChartSet::new(),
        };
    };

    let Some(view) = prepare::prepare_participant_view(dataset, id) else {
        return RenderedPage {
            title: "Participant not found".to_string(),
            body: not_found(dataset, id),
            charts: ChartSet::new(),
        };
    };

    let mut out = String::new();
    let mut chart_set = ChartSet::new();

    out.push_str("<div class=\"grid\">");

    let mut radar_body = String::new();
    mount_chart(
        &mut radar_body,
        &mut chart_set,
        charts::radar_chart("participant-radar", &view.radar, Some("Skills vs group")),
    );
    out.push_str(&html::card(&format!("Participant {}", id), &radar_body));

    let mut info = String::new();
    info.push_str("<h3>Objectives</h3>");
    info.push_str(&html::list(&view.objectives));
    info.push_str("<h3>Interest areas</h3>");
    info.push_str(&html::list(&view.interest_areas));
    info.push_str("<h3>Prior experience</h3>");
    info.push_str(&html::list(&view.prior_experience));
    out.push_str(&html::card("Background", &info));

    out.push_str(&html::card("Skill detail", &skill_table(dataset, id)));

    if let Some(cluster_id) = view.cluster_id {
        let mut cluster_body = format!(
            "<p>Cluster {}: <strong>{}</strong></p>",
            cluster_id,
            html::escape(view.cluster_name.as_deref().unwrap_or("Unnamed"))
        );
        cluster_body.push_str("<h3>Recommendations</h3>");
        cluster_body.push_str(&html::list(&view.cluster_recommendations));
        out.push_str(&html::card("Cluster", &cluster_body));
    }

    out.push_str(&profile_section(dataset, id));
    out.push_str("</div>");

    RenderedPage {
        title: format!("Participant {}", id),
        body: out,
        charts: chart_set,
    }
}

/// Consolidated profile block; absent profile data degrades to a note, per
/// the optional-resource policy.
fn profile_section(dataset: &Dataset, id: &str) -> String {
    let Some(profile) = dataset.profile(id) else {
        return html::card(
            "Consolidated profile",
            "<p class=\"empty\">Consolidated profile data is not available.</p>",
        );
    };

    let mut body = String::new();
    let rows: Vec<Vec<String>> = profile
        .section_analysis
        .iter()
        .map(|(section, analysis)| {
            vec![
                section.clone(),
                format_value(analysis.score),
                format_value(analysis.percentile),
                analysis.level.clone(),
                format!("{:+}", prepare::round1(analysis.group_comparison)),
            ]
        })
        .collect();
    body.push_str(&html::table(
        &["Section", "Score", "Percentile", "Level", "vs group"],
        &rows,
    ));
    body.push_str("<h3>Strengths</h3>");
    body.push_str(&html::list(&profile.strengths));
    body.push_str("<h3>Weaknesses</h3>");
    body.push_str(&html::list(&profile.weaknesses));
    body.push_str("<h3>Learning path</h3>");
    body.push_str(&html::list(&profile.learning_path));
    html::card("Consolidated profile", &body)
}

fn skill_table(dataset: &Dataset, id: &str) -> String {
    let Some(skills) = dataset.detailed_skills.get(id) else {
        return html::inline_error("No skill detail available");
    };
    let mut out = String::from("<table><thead><tr><th>Skill</th><th>Percent</th><th>Level</th></tr></thead><tbody>");
    for (skill, detail) in skills {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}%</td><td><span class=\"badge\" style=\"background:{}\">{}</span></td></tr>",
            html::escape(skill),
            format_value(detail.percent),
            level_color(&detail.level),
            html::escape(if detail.level.is_empty() { prepare::NOT_AVAILABLE } else { &detail.level })
        ));
    }
    out.push_str("</tbody></table>");
    out
}

fn participant_link(id: &str) -> String {
    let state = ViewState {
        view: View::Individual,
        participant: Some(id.to_string()),
        ..Default::default()
    };
    html::link(&format!("?{}", state.to_query()), &format!("Participant {}", id))
}

fn selector(dataset: &Dataset, prompt: &str) -> String {
    let mut out = format!("<div class=\"selector\"><p>{}</p><ul>", html::escape(prompt));
    for id in dataset.participant_ids() {
        out.push_str("<li>");
        out.push_str(&participant_link(id));
        out.push_str("</li>");
    }
    out.push_str("</ul></div>");
    out
}

fn not_found(dataset: &Dataset, id: &str) -> String {
    let mut out = format!(
        "<div class=\"not-found\"><h2>Participant {} not found</h2>",
        html::escape(id)
    );
    out.push_str(&selector(dataset, "Available participants:"));
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    fn dataset() -> Dataset {
        let mut ds = Dataset::default();
        ds.status = DatasetStatus::Ready;
        ds.group_skills
            .insert("logic".to_string(), GroupSkillEntry { average_percent: 64.0 });
        let mut skills = std::collections::BTreeMap::new();
        skills.insert(
            "logic".to_string(),
            SkillDetail { percent: 71.5, level: "alto".to_string(), ..Default::default() },
        );
        ds.detailed_skills.insert("42".to_string(), skills);
        ds.clustering.clusters.insert("42".to_string(), 0);
        ds.clustering.cluster_profiles.insert(
            "0".to_string(),
            ClusterProfile { profile_name: "Steady".to_string(), ..Default::default() },
        );
        ds.clustering
            .cluster_recommendations
            .insert("0".to_string(), vec!["pair work".to_string()]);
        ds
    }

    #[test]
    fn renders_profile_with_two_series_radar() {
        let page = render(&dataset(), Some("42"));
        assert!(page.body.contains("participant-radar"));
        let spec = page.charts.specs().iter().find(|s| s.container == "participant-radar").unwrap();
        assert_eq!(spec.config["datasets"].as_array().unwrap().len(), 2);
        assert!(page.body.contains("Steady"));
        assert!(page.body.contains("pair work"));
    }

    #[test]
    fn unknown_id_renders_not_found_with_alternatives() {
        let page = render(&dataset(), Some("99"));
        assert!(page.body.contains("not-found"));
        assert!(page.body.contains("Participant 42"));
        assert!(page.charts.is_empty());
    }

    #[test]
    fn no_selection_prompts_with_selector() {
        let page = render(&dataset(), None);
        assert!(page.body.contains("selector"));
        assert!(!page.body.contains("not-found"));
    }

    #[test]
    fn missing_profile_resource_degrades_to_note() {
        let page = render(&dataset(), Some("42"));
        assert!(page.body.contains("Consolidated profile data is not available"));
    }

    #[test]
    fn consolidated_profile_renders_sections() {
        let mut ds = dataset();
        let mut profiles = ParticipantProfiles::default();
        let mut profile = ParticipantProfile::default();
        profile.section_analysis.insert(
            "reading".to_string(),
            SectionAnalysis { score: 8.25, percentile: 77.0, level: "alto".to_string(), group_comparison: 1.26 },
        );
        profile.strengths.push("synthesis".to_string());
        profiles.profiles.insert("42".to_string(), profile);
        ds.profiles = Some(profiles);

        let page = render(&ds, Some("42"));
        assert!(page.body.contains("reading"));
        assert!(page.body.contains("synthesis"));
        assert!(page.body.contains("+1.3"));
    }
}
