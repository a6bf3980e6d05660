//! Context Assembler
//!
//! Runs the selected registry functions against the entity store and folds
//! their summaries into one labeled grounding context. Reads are
//! independent, so they run concurrently; assembly order is selection
//! order. The context is bounded by a character budget; when it would
//! overflow, later functions are truncated or dropped first so the
//! earliest-selected data survives. A failing read degrades to an explicit
//! marker block instead of aborting the assembly.

use tracing::warn;

use crate::intent::Selection;
use crate::registry;
use crate::store::EntityStore;

const UNAVAILABLE_MARKER: &str = "data unavailable";
const TRUNCATION_MARKER: &str = "… [truncated]";

#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub text: String,
    /// Names of functions whose data actually made it into the context.
    pub functions_used: Vec<String>,
}

pub async fn assemble(
    store: &dyn EntityStore,
    selection: &Selection,
    max_chars: usize,
) -> AssembledContext {
    let specs: Vec<_> = selection
        .functions
        .iter()
        .filter_map(|name| registry::find(name))
        .collect();

    let results = futures::future::join_all(
        specs
            .iter()
            .map(|spec| spec.execute(store, selection.event_window)),
    )
    .await;

    let mut text = String::new();
    let mut functions_used = Vec::new();

    for (spec, result) in specs.iter().zip(results) {
        let (body, data_ok) = match result {
            Ok(summary) => (summary, true),
            Err(e) => {
                warn!(function = spec.name, error = %e, "Registry read failed; degrading block");
                (UNAVAILABLE_MARKER.to_string(), false)
            }
        };

        let block = format!("### {} ###\n{}", spec.name, body);
        let separator = if text.is_empty() { "" } else { "\n\n" };

        let used = text.chars().count() + separator.chars().count();
        let available = max_chars.saturating_sub(used);
        let block_chars = block.chars().count();
        let marker_chars = TRUNCATION_MARKER.chars().count();

        if block_chars <= available {
            text.push_str(separator);
            text.push_str(&block);
        } else if available > spec.name.len() + 8 + marker_chars {
            // Enough room for the header and a marked cut of the body.
            let keep = available - marker_chars;
            text.push_str(separator);
            text.push_str(&block.chars().take(keep).collect::<String>());
            text.push_str(TRUNCATION_MARKER);
        } else {
            // No meaningful room left; this and all later blocks are dropped.
            break;
        }

        if data_ok {
            functions_used.push(spec.name.to_string());
        }
    }

    AssembledContext {
        text,
        functions_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Bodyguard, CctvCamera, GuardDog, SecurityEvent};
    use crate::intent::IntentSelector;
    use crate::store::memory::InMemoryEntityStore;
    use crate::store::{EntityStore, StoreError};
    use async_trait::async_trait;

    /// Store double whose camera collection is unreadable.
    struct BrokenCameraStore {
        inner: InMemoryEntityStore,
    }

    #[async_trait]
    impl EntityStore for BrokenCameraStore {
        async fn list_dogs(&self) -> Result<Vec<GuardDog>, StoreError> {
            self.inner.list_dogs().await
        }

        async fn list_guards(&self) -> Result<Vec<Bodyguard>, StoreError> {
            self.inner.list_guards().await
        }

        async fn list_cameras(&self) -> Result<Vec<CctvCamera>, StoreError> {
            Err(StoreError::Payload {
                collection: "cctv_cameras".to_string(),
                reason: "simulated outage".to_string(),
            })
        }

        async fn list_events(&self) -> Result<Vec<SecurityEvent>, StoreError> {
            self.inner.list_events().await
        }
    }

    #[tokio::test]
    async fn blocks_are_labeled_in_selection_order() {
        let store = InMemoryEntityStore::demo_deployment();
        let selection = IntentSelector::new(5).select("dog and camera status");
        let assembled = assemble(&store, &selection, 6000).await;

        let dog_pos = assembled.text.find("### list_active_dogs ###").unwrap();
        let cam_pos = assembled.text.find("### count_cameras_by_status ###").unwrap();
        assert!(dog_pos < cam_pos);
        assert_eq!(
            assembled.functions_used,
            selection
                .functions
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn failing_read_degrades_to_marker_and_continues() {
        let store = BrokenCameraStore {
            inner: InMemoryEntityStore::demo_deployment(),
        };
        let selection = IntentSelector::new(5).select("dogs and offline cameras");
        let assembled = assemble(&store, &selection, 6000).await;

        assert!(assembled.text.contains(UNAVAILABLE_MARKER));
        // Dog data still present.
        assert!(assembled.text.contains("### list_active_dogs ###"));
        assert!(assembled.text.contains("Rex"));
        // The failed function did not contribute data.
        assert!(!assembled
            .functions_used
            .contains(&"list_offline_cameras".to_string()));
        assert!(assembled
            .functions_used
            .contains(&"list_active_dogs".to_string()));
    }

    #[tokio::test]
    async fn budget_truncates_later_blocks_first() {
        let store = InMemoryEntityStore::demo_deployment();
        let selection = IntentSelector::new(5).select("dog guard camera zone status");
        let full = assemble(&store, &selection, 100_000).await;
        let first_block_len = full
            .text
            .find("\n\n### ")
            .expect("expected more than one block");

        let budget = first_block_len + 60;
        let bounded = assemble(&store, &selection, budget).await;

        assert!(bounded.text.chars().count() <= budget + TRUNCATION_MARKER.chars().count());
        // Earliest-selected block survives intact.
        assert!(bounded.text.contains("### list_active_dogs ###"));
        assert!(bounded.text.contains("Rex"));
        assert!(bounded.functions_used.len() < full.functions_used.len());
    }

    #[tokio::test]
    async fn empty_store_still_assembles_grounding_text() {
        let store = InMemoryEntityStore::empty();
        let selection = IntentSelector::new(5).select("full status report");
        let assembled = assemble(&store, &selection, 6000).await;

        assert!(assembled.text.contains("### system_snapshot ###"));
        assert!(assembled
            .functions_used
            .contains(&"system_snapshot".to_string()));
    }
}
