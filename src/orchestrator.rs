//! Query pipeline: received → functions selected → context assembled →
//! completion requested → completed/degraded → logged → returned.
//!
//! Apart from input validation, `process` never raises: a completion
//! failure degrades to the configured apology text, a failed audit write is
//! reported to diagnostics only, and the caller always gets a well-formed
//! outcome.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::QueryPipelineConfig;
use crate::context;
use crate::intent::IntentSelector;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::query_log::{NewQueryLogEntry, QueryLog};
use crate::store::EntityStore;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The only failure surfaced to callers; everything else degrades.
    #[error("query must not be empty")]
    InvalidQuery,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub response: String,
    pub execution_time_ms: u64,
    pub functions_used: Vec<String>,
}

pub struct QueryOrchestrator {
    store: Arc<dyn EntityStore>,
    completion: Arc<dyn CompletionClient>,
    query_log: Arc<QueryLog>,
    selector: IntentSelector,
    config: QueryPipelineConfig,
}

impl QueryOrchestrator {
    pub fn new(
        store: Arc<dyn EntityStore>,
        completion: Arc<dyn CompletionClient>,
        query_log: Arc<QueryLog>,
        config: QueryPipelineConfig,
    ) -> Self {
        Self {
            store,
            completion,
            query_log,
            selector: IntentSelector::new(config.selection_cap),
            config,
        }
    }

    pub async fn process(
        &self,
        query: &str,
        requester_id: Option<&str>,
    ) -> Result<QueryOutcome, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::InvalidQuery);
        }

        let started = Instant::now();
        let query_id = Uuid::new_v4();

        let selection = self.selector.select(query);
        info!(
            query_id = %query_id,
            query = %query,
            functions = ?selection.functions,
            window_hours = selection.event_window.num_hours(),
            "Functions selected"
        );

        let assembled =
            context::assemble(self.store.as_ref(), &selection, self.config.max_context_chars)
                .await;

        let request = CompletionRequest {
            system_instructions: self.config.role_instructions.clone(),
            context: assembled.text,
            query: query.to_string(),
        };

        // The client enforces its own timeout; this outer bound keeps a
        // misbehaving implementation from hanging the request.
        let completion_result = tokio::time::timeout(
            self.config.completion_timeout,
            self.completion.complete(request),
        )
        .await;

        let (response, degraded) = match completion_result {
            Ok(Ok(answer)) => (answer, false),
            Ok(Err(e)) => {
                warn!(query_id = %query_id, error = %e, "Completion service failed; returning degraded answer");
                (self.config.apology_text.clone(), true)
            }
            Err(_) => {
                warn!(
                    query_id = %query_id,
                    timeout_secs = self.config.completion_timeout.as_secs(),
                    "Completion call timed out; returning degraded answer"
                );
                (self.config.apology_text.clone(), true)
            }
        };

        let execution_time_ms = started.elapsed().as_millis() as u64;

        let entry = NewQueryLogEntry {
            query: query.to_string(),
            response: response.clone(),
            requester_id: requester_id.map(|s| s.to_string()),
            timestamp: Utc::now(),
            execution_time_ms,
            functions_used: assembled.functions_used.clone(),
        };
        if let Err(e) = self.query_log.append(&entry) {
            // The answer is already computed; returning it outranks audit
            // durability.
            error!(query_id = %query_id, error = %e, "Failed to persist query audit record");
        }

        info!(
            query_id = %query_id,
            execution_time_ms = execution_time_ms,
            degraded = degraded,
            functions_used = ?assembled.functions_used,
            "Query processed"
        );

        Ok(QueryOutcome {
            response,
            execution_time_ms,
            functions_used: assembled.functions_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_APOLOGY_TEXT;
    use crate::entities::{AiFeatures, CameraLocation, CameraStatus, CctvCamera};
    use crate::llm::{CompletionError, MockCompletionClient};
    use crate::registry;
    use crate::store::memory::InMemoryEntityStore;
    use async_trait::async_trait;

    struct FailingCompletionClient;

    #[async_trait]
    impl CompletionClient for FailingCompletionClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            Err(CompletionError::MalformedResponse)
        }
    }

    fn camera(camera_id: &str, name: &str, status: CameraStatus) -> CctvCamera {
        CctvCamera {
            id: format!("cam-{}", camera_id.to_lowercase()),
            camera_id: camera_id.to_string(),
            name: name.to_string(),
            location: CameraLocation {
                lat: 40.0,
                lng: -74.0,
                zone: "Perimeter".to_string(),
                description: "test rig".to_string(),
            },
            status,
            is_recording: status == CameraStatus::Online,
            last_ping: Utc::now(),
            ai_features: AiFeatures {
                motion_detection: true,
                face_recognition: false,
                intrusion_detection: true,
            },
            resolution: "1080p".to_string(),
            night_vision: true,
        }
    }

    fn orchestrator_with(
        store: InMemoryEntityStore,
        completion: Arc<dyn CompletionClient>,
    ) -> QueryOrchestrator {
        QueryOrchestrator::new(
            Arc::new(store),
            completion,
            Arc::new(QueryLog::open_in_memory().unwrap()),
            QueryPipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn successful_query_logs_exactly_one_matching_entry() {
        let orchestrator = orchestrator_with(
            InMemoryEntityStore::demo_deployment(),
            Arc::new(MockCompletionClient),
        );

        let outcome = orchestrator
            .process("Which dogs are on patrol?", Some("operator-1"))
            .await
            .unwrap();

        assert!(!outcome.response.is_empty());
        assert!(!outcome.functions_used.is_empty());
        assert!(outcome.functions_used.len() <= 5);
        for name in &outcome.functions_used {
            assert!(registry::is_registered(name));
        }

        let entries = orchestrator.query_log.recent(None, 10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "Which dogs are on patrol?");
        assert_eq!(entries[0].response, outcome.response);
        assert_eq!(entries[0].requester_id.as_deref(), Some("operator-1"));
        assert_eq!(entries[0].functions_used, outcome.functions_used);
    }

    #[tokio::test]
    async fn offline_camera_scenario_answer_references_count() {
        let cameras = vec![
            camera("CAM101", "Gate Camera", CameraStatus::Online),
            camera("CAM102", "Lobby Camera", CameraStatus::Online),
            camera("CAM103", "Yard Camera", CameraStatus::Offline),
            camera("CAM104", "Dock Camera", CameraStatus::Offline),
        ];
        let store = InMemoryEntityStore::with_data(vec![], vec![], cameras, vec![]);
        let orchestrator = orchestrator_with(store, Arc::new(MockCompletionClient));

        let outcome = orchestrator
            .process("How many cameras are offline?", None)
            .await
            .unwrap();

        assert!(outcome
            .functions_used
            .contains(&"list_offline_cameras".to_string()));
        assert!(
            outcome.response.contains("2 offline camera"),
            "answer did not reference the offline count: {}",
            outcome.response
        );
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_any_logging() {
        let orchestrator = orchestrator_with(
            InMemoryEntityStore::demo_deployment(),
            Arc::new(MockCompletionClient),
        );

        assert!(matches!(
            orchestrator.process("", None).await,
            Err(QueryError::InvalidQuery)
        ));
        assert!(matches!(
            orchestrator.process("   \t ", None).await,
            Err(QueryError::InvalidQuery)
        ));
        assert_eq!(orchestrator.query_log.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn completion_failure_degrades_to_apology_and_still_logs() {
        let orchestrator = orchestrator_with(
            InMemoryEntityStore::demo_deployment(),
            Arc::new(FailingCompletionClient),
        );

        let outcome = orchestrator
            .process("Any open incidents?", Some("operator-2"))
            .await
            .unwrap();

        assert_eq!(outcome.response, DEFAULT_APOLOGY_TEXT);
        assert!(!outcome.functions_used.is_empty());

        let entries = orchestrator.query_log.recent(Some("operator-2"), 10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].response, DEFAULT_APOLOGY_TEXT);
    }

    #[tokio::test]
    async fn empty_store_still_completes_and_logs() {
        let orchestrator = orchestrator_with(
            InMemoryEntityStore::empty(),
            Arc::new(MockCompletionClient),
        );

        let outcome = orchestrator
            .process("Give me a full status report", None)
            .await
            .unwrap();

        assert!(!outcome.response.is_empty());
        assert_eq!(orchestrator.query_log.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn each_call_appends_one_entry() {
        let orchestrator = orchestrator_with(
            InMemoryEntityStore::demo_deployment(),
            Arc::new(MockCompletionClient),
        );

        for i in 0..3 {
            orchestrator
                .process(&format!("status check {i}"), None)
                .await
                .unwrap();
        }
        assert_eq!(orchestrator.query_log.count().unwrap(), 3);
    }
}
