//! Navigation state: four top-level views, analytics sub-views, selected
//! entities, history, and the URL query-string round-trip that makes deep
//! links behave exactly like UI navigation.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::logging::{log, obj, v_str, Domain, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    General,
    Individual,
    Course,
    Analytics,
}

impl View {
    pub const ALL: [View; 4] = [View::General, View::Individual, View::Course, View::Analytics];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::General => "general",
            View::Individual => "individual",
            View::Course => "course",
            View::Analytics => "analytics",
        }
    }

    /// Unknown names fall back to the initial view.
    pub fn parse(s: &str) -> View {
        match s {
            "individual" => View::Individual,
            "course" => View::Course,
            "analytics" => View::Analytics,
            _ => View::General,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subview {
    Clustering,
    Factor,
    Irt,
    Pedagogical,
}

impl Subview {
    pub const ALL: [Subview; 4] = [
        Subview::Clustering,
        Subview::Factor,
        Subview::Irt,
        Subview::Pedagogical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subview::Clustering => "clustering",
            Subview::Factor => "factor",
            Subview::Irt => "irt",
            Subview::Pedagogical => "pedagogical",
        }
    }

    pub fn parse(s: &str) -> Subview {
        match s {
            "factor" => Subview::Factor,
            "irt" => Subview::Irt,
            "pedagogical" => Subview::Pedagogical,
            _ => Subview::Clustering,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub view: View,
    pub subview: Subview,
    pub participant: Option<String>,
    pub module: Option<u32>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            view: View::General,
            subview: Subview::Clustering,
            participant: None,
            module: None,
        }
    }
}

impl ViewState {
    /// Encode into a URL query string. Inverse of [`ViewState::from_query`]
    /// for every reachable state.
    pub fn to_query(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        ser.append_pair("view", self.view.as_str());
        ser.append_pair("subview", self.subview.as_str());
        if let Some(participant) = &self.participant {
            ser.append_pair("participant", participant);
        }
        if let Some(module) = self.module {
            ser.append_pair("module", &module.to_string());
        }
        ser.finish()
    }

    /// Decode from a query string (with or without a leading `?`). Unknown
    /// views or subviews fall back to defaults; a non-numeric module id is
    /// treated as no selection.
    pub fn from_query(query: &str) -> ViewState {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = ViewState::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "view" => state.view = View::parse(&value),
                "subview" => state.subview = Subview::parse(&value),
                "participant" => {
                    if !value.is_empty() {
                        state.participant = Some(value.into_owned());
                    }
                }
                "module" => state.module = value.parse().ok(),
                _ => {}
            }
        }
        state
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed; exactly one re-render is due.
    Rendered,
    /// Request matched the current state.
    NoOp,
    /// A transition was already in flight; the request is dropped, not queued.
    Ignored,
}

/// Owns the current view state plus the back/forward stacks mirroring
/// browser history. Every mutation goes through here.
#[derive(Debug, Default)]
pub struct Navigator {
    state: ViewState,
    back_stack: Vec<ViewState>,
    forward_stack: Vec<ViewState>,
    in_flight: bool,
    renders: u64,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Number of re-renders transitions have requested so far.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Mark the start/end of a visual transition. Requests arriving while
    /// one is in flight are ignored.
    pub fn set_in_flight(&mut self, v: bool) {
        self.in_flight = v;
    }

    pub fn change_view(&mut self, view: View) -> Transition {
        self.apply(|state| state.view = view, self.state.view == view)
    }

    pub fn change_subview(&mut self, subview: Subview) -> Transition {
        self.apply(
            |state| state.subview = subview,
            self.state.subview == subview,
        )
    }

    pub fn select_participant(&mut self, participant: Option<String>) -> Transition {
        let unchanged = self.state.participant == participant;
        self.apply(|state| state.participant = participant.clone(), unchanged)
    }

    pub fn select_module(&mut self, module: Option<u32>) -> Transition {
        let unchanged = self.state.module == module;
        self.apply(|state| state.module = module, unchanged)
    }

    /// Jump straight to a full target state (deep link). Applies the whole
    /// diff as one transition with one re-render, so a deep link is
    /// indistinguishable from reaching the same state through clicks.
    pub fn navigate_to(&mut self, target: ViewState) -> Transition {
        let unchanged = self.state == target;
        self.apply(|state| *state = target.clone(), unchanged)
    }

    /// Restore the previous history entry verbatim, without pushing a new one.
    pub fn back(&mut self) -> Transition {
        if self.in_flight {
            return Transition::Ignored;
        }
        match self.back_stack.pop() {
            Some(previous) => {
                self.forward_stack.push(self.state.clone());
                self.state = previous;
                self.renders += 1;
                self.log_transition("back");
                Transition::Rendered
            }
            None => Transition::NoOp,
        }
    }

    pub fn forward(&mut self) -> Transition {
        if self.in_flight {
            return Transition::Ignored;
        }
        match self.forward_stack.pop() {
            Some(next) => {
                self.back_stack.push(self.state.clone());
                self.state = next;
                self.renders += 1;
                self.log_transition("forward");
                Transition::Rendered
            }
            None => Transition::NoOp,
        }
    }

    fn apply<F: FnOnce(&mut ViewState)>(&mut self, mutate: F, unchanged: bool) -> Transition {
        if self.in_flight {
            log(
                Level::Debug,
                Domain::View,
                "transition_ignored",
                obj(&[("reason", v_str("in_flight"))]),
            );
            return Transition::Ignored;
        }
        if unchanged {
            return Transition::NoOp;
        }
        self.back_stack.push(self.state.clone());
        self.forward_stack.clear();
        mutate(&mut self.state);
        self.renders += 1;
        self.log_transition("navigate");
        Transition::Rendered
    }

    fn log_transition(&self, event: &str) {
        log(
            Level::Debug,
            Domain::View,
            event,
            obj(&[("query", v_str(&self.state.to_query()))]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reachable_states() -> Vec<ViewState> {
        let mut states = Vec::new();
        for view in View::ALL {
            for subview in Subview::ALL {
                for participant in [None, Some("42".to_string()), Some("p 7".to_string())] {
                    for module in [None, Some(3)] {
                        states.push(ViewState {
                            view,
                            subview,
                            participant: participant.clone(),
                            module,
                        });
                    }
                }
            }
        }
        states
    }

    #[test]
    fn query_round_trip_is_exact_for_all_reachable_states() {
        for state in reachable_states() {
            let query = state.to_query();
            assert_eq!(ViewState::from_query(&query), state, "query: {}", query);
        }
    }

    #[test]
    fn from_query_tolerates_junk() {
        let state = ViewState::from_query("?view=bogus&subview=nope&module=xyz&extra=1");
        assert_eq!(state, ViewState::default());
    }

    #[test]
    fn deep_link_equals_click_path() {
        let query = "view=individual&participant=42";

        let mut via_deep_link = Navigator::new();
        via_deep_link.navigate_to(ViewState::from_query(query));

        let mut via_clicks = Navigator::new();
        via_clicks.change_view(View::Individual);
        via_clicks.select_participant(Some("42".to_string()));

        assert_eq!(via_deep_link.state(), via_clicks.state());
    }

    #[test]
    fn change_view_is_noop_when_unchanged() {
        let mut nav = Navigator::new();
        assert_eq!(nav.change_view(View::General), Transition::NoOp);
        assert_eq!(nav.render_count(), 0);
        assert_eq!(nav.change_view(View::Course), Transition::Rendered);
        assert_eq!(nav.render_count(), 1);
    }

    #[test]
    fn in_flight_requests_are_ignored_not_queued() {
        let mut nav = Navigator::new();
        nav.set_in_flight(true);
        assert_eq!(nav.change_view(View::Analytics), Transition::Ignored);
        assert_eq!(nav.change_subview(Subview::Irt), Transition::Ignored);
        assert_eq!(nav.back(), Transition::Ignored);
        assert_eq!(nav.render_count(), 0);
        assert_eq!(nav.state().view, View::General);

        nav.set_in_flight(false);
        assert_eq!(nav.change_view(View::Analytics), Transition::Rendered);
        assert_eq!(nav.render_count(), 1);
    }

    #[test]
    fn back_restores_previous_state_verbatim() {
        let mut nav = Navigator::new();
        nav.change_view(View::Individual);
        nav.select_participant(Some("9".to_string()));
        nav.change_view(View::Course);

        assert_eq!(nav.back(), Transition::Rendered);
        assert_eq!(nav.state().view, View::Individual);
        assert_eq!(nav.state().participant.as_deref(), Some("9"));

        assert_eq!(nav.forward(), Transition::Rendered);
        assert_eq!(nav.state().view, View::Course);
    }

    #[test]
    fn back_on_empty_history_is_noop() {
        let mut nav = Navigator::new();
        assert_eq!(nav.back(), Transition::NoOp);
        assert_eq!(nav.forward(), Transition::NoOp);
    }

    #[test]
    fn new_navigation_clears_forward_stack() {
        let mut nav = Navigator::new();
        nav.change_view(View::Course);
        nav.back();
        nav.change_view(View::Analytics);
        assert_eq!(nav.forward(), Transition::NoOp);
    }

    #[test]
    fn each_transition_renders_exactly_once() {
        let mut nav = Navigator::new();
        nav.change_view(View::Analytics);
        nav.change_subview(Subview::Factor);
        nav.select_module(Some(2));
        assert_eq!(nav.render_count(), 3);
        // repeated selection of the same module does not re-render
        nav.select_module(Some(2));
        assert_eq!(nav.render_count(), 3);
    }
}
