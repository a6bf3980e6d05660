//! Intent Selector
//!
//! Maps free-text operator questions to an ordered subset of the function
//! registry. Matching is deterministic keyword/phrase containment over each
//! entry's trigger list: the same query text always selects the same
//! functions, independent of store contents. Breadth beats precision:
//! every matched category is included up to the selection cap, resolved in
//! registry declaration order.

use chrono::Duration;
use regex::Regex;

use crate::registry::{self, FALLBACK_FUNCTION};

/// Default event window when the query names no time span.
const DEFAULT_WINDOW_HOURS: i64 = 24;
/// Largest window derivable from "last N hours" phrasing.
const MAX_WINDOW_HOURS: i64 = 24 * 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Registry names to run, in declaration order, deduplicated, capped.
    pub functions: Vec<&'static str>,
    /// Time window for event-scoped functions.
    pub event_window: Duration,
}

pub struct IntentSelector {
    selection_cap: usize,
    hours_re: Regex,
    days_re: Regex,
}

impl IntentSelector {
    pub fn new(selection_cap: usize) -> Self {
        Self {
            selection_cap: selection_cap.max(1),
            hours_re: Regex::new(r"(?:last|past)\s+(\d{1,4})\s+hours?")
                .expect("Invalid hours window regex"),
            days_re: Regex::new(r"(?:last|past)\s+(\d{1,3})\s+days?")
                .expect("Invalid days window regex"),
        }
    }

    pub fn select(&self, query: &str) -> Selection {
        let query_lower = query.to_lowercase();

        let mut functions: Vec<&'static str> = Vec::new();
        for spec in registry::catalog() {
            if functions.len() >= self.selection_cap {
                break;
            }
            let matched = spec.triggers.iter().any(|t| query_lower.contains(t));
            if matched && !functions.contains(&spec.name) {
                functions.push(spec.name);
            }
        }

        // A query is never answered with zero grounding data.
        if functions.is_empty() {
            functions.push(FALLBACK_FUNCTION);
        }

        Selection {
            functions,
            event_window: self.derive_window(&query_lower),
        }
    }

    fn derive_window(&self, query_lower: &str) -> Duration {
        if let Some(caps) = self.hours_re.captures(query_lower) {
            if let Ok(hours) = caps[1].parse::<i64>() {
                return Duration::hours(hours.clamp(1, MAX_WINDOW_HOURS));
            }
        }
        if let Some(caps) = self.days_re.captures(query_lower) {
            if let Ok(days) = caps[1].parse::<i64>() {
                return Duration::hours((days * 24).clamp(1, MAX_WINDOW_HOURS));
            }
        }
        if query_lower.contains("yesterday") {
            return Duration::hours(48);
        }
        if query_lower.contains("this week") || query_lower.contains("week") {
            return Duration::hours(24 * 7);
        }
        Duration::hours(DEFAULT_WINDOW_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> IntentSelector {
        IntentSelector::new(5)
    }

    #[test]
    fn same_query_always_selects_same_functions() {
        let s = selector();
        let first = s.select("How many cameras are offline?");
        for _ in 0..10 {
            assert_eq!(s.select("How many cameras are offline?"), first);
        }
    }

    #[test]
    fn camera_outage_query_selects_camera_functions() {
        let selection = selector().select("How many cameras are offline?");
        assert!(selection.functions.contains(&"list_offline_cameras"));
        assert!(selection.functions.contains(&"count_cameras_by_status"));
    }

    #[test]
    fn mixed_query_selects_both_categories() {
        let selection = selector().select("Are the dogs covering for the broken camera?");
        assert!(selection.functions.contains(&"list_active_dogs"));
        assert!(selection.functions.contains(&"count_cameras_by_status"));
        assert!(selection.functions.len() <= 5);
    }

    #[test]
    fn selection_respects_cap_and_declaration_order() {
        let s = selector();
        let selection =
            s.select("dog guard camera offline zone status incident report from today");
        assert_eq!(selection.functions.len(), 5);
        // Declaration order, first five matched entries.
        assert_eq!(
            selection.functions,
            vec![
                "list_active_dogs",
                "list_guards_on_duty",
                "list_offline_cameras",
                "count_cameras_by_status",
                "recent_events",
            ]
        );
    }

    #[test]
    fn unmatched_query_falls_back_to_snapshot() {
        let selection = selector().select("Is the facility safe right now?");
        assert_eq!(selection.functions, vec![FALLBACK_FUNCTION]);
    }

    #[test]
    fn all_selected_names_are_registered() {
        let queries = [
            "Which dogs were not on patrol yesterday?",
            "Summarize incidents in East Zone last week",
            "What is the safest area right now?",
            "camera guard dog alert zone shift",
        ];
        for query in queries {
            let selection = selector().select(query);
            assert!(!selection.functions.is_empty());
            assert!(selection.functions.len() <= 5);
            for name in &selection.functions {
                assert!(registry::is_registered(name), "unknown function {name}");
            }
        }
    }

    #[test]
    fn temporal_phrases_derive_event_window() {
        let s = selector();
        assert_eq!(
            s.select("what happened in the last 6 hours").event_window,
            Duration::hours(6)
        );
        assert_eq!(
            s.select("incidents in the past 2 days").event_window,
            Duration::hours(48)
        );
        assert_eq!(
            s.select("Which dogs were not on patrol yesterday?").event_window,
            Duration::hours(48)
        );
        assert_eq!(
            s.select("summarize incidents this week").event_window,
            Duration::hours(24 * 7)
        );
        assert_eq!(
            s.select("any alerts?").event_window,
            Duration::hours(24)
        );
    }
}
