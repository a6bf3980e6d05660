//! Function Registry
//!
//! Fixed catalog of named read operations the query pipeline can run
//! against the entity store. Each entry declares its stable name, the
//! description shown to operators, and the trigger phrases the intent
//! selector matches against. Declaration order is the tie-break order for
//! selection.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::entities::{CameraStatus, DogStatus, GuardStatus, SecurityEvent};
use crate::store::{EntityStore, StoreError};

/// Upper bound on individual event lines in one context block.
const MAX_EVENT_LINES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    ListActiveDogs,
    CountDogsByStatus,
    ListGuardsOnDuty,
    CountGuardsByStatus,
    ListOfflineCameras,
    CountCamerasByStatus,
    RecentEvents,
    UnresolvedEvents,
    ZoneOverview,
    SystemSnapshot,
}

pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub triggers: &'static [&'static str],
    kind: FunctionKind,
}

/// Name of the fallback function used when no trigger matches.
pub const FALLBACK_FUNCTION: &str = "system_snapshot";

const CATALOG: &[FunctionSpec] = &[
    FunctionSpec {
        name: "list_active_dogs",
        description: "Patrol dogs currently active or on duty, with zone and handler",
        triggers: &["dog", "k9", "canine", "patrol unit", "on patrol"],
        kind: FunctionKind::ListActiveDogs,
    },
    FunctionSpec {
        name: "count_dogs_by_status",
        description: "Patrol dog counts per status",
        triggers: &["how many dogs", "number of dogs", "dog count", "dogs do we have"],
        kind: FunctionKind::CountDogsByStatus,
    },
    FunctionSpec {
        name: "list_guards_on_duty",
        description: "Guards currently on duty, with assigned zone and activity",
        triggers: &["guard", "bodyguard", "personnel", "officer", "staff", "on duty", "shift"],
        kind: FunctionKind::ListGuardsOnDuty,
    },
    FunctionSpec {
        name: "count_guards_by_status",
        description: "Guard counts per status",
        triggers: &["how many guards", "number of guards", "guard count"],
        kind: FunctionKind::CountGuardsByStatus,
    },
    FunctionSpec {
        name: "list_offline_cameras",
        description: "Cameras that are offline or in error state",
        triggers: &["offline", "down", "not working", "dead camera", "broken", "camera failure"],
        kind: FunctionKind::ListOfflineCameras,
    },
    FunctionSpec {
        name: "count_cameras_by_status",
        description: "Camera counts per status and recording state",
        triggers: &["camera", "cctv", "surveillance", "feed", "footage"],
        kind: FunctionKind::CountCamerasByStatus,
    },
    FunctionSpec {
        name: "recent_events",
        description: "Security events inside the requested time window",
        triggers: &[
            "today", "yesterday", "recent", "last", "past", "this week", "hour", "happened",
            "latest",
        ],
        kind: FunctionKind::RecentEvents,
    },
    FunctionSpec {
        name: "unresolved_events",
        description: "Open security events ranked by severity",
        triggers: &[
            "incident", "alert", "event", "unresolved", "open", "intrusion", "breach",
            "emergency", "threat", "suspicious",
        ],
        kind: FunctionKind::UnresolvedEvents,
    },
    FunctionSpec {
        name: "zone_overview",
        description: "Per-zone coverage: dogs, guards and cameras in each zone",
        triggers: &["zone", "area", "sector", "perimeter", "coverage", "where"],
        kind: FunctionKind::ZoneOverview,
    },
    FunctionSpec {
        name: "system_snapshot",
        description: "Full cross-entity summary of the deployment",
        triggers: &["status", "overview", "summary", "snapshot", "report", "situation", "everything"],
        kind: FunctionKind::SystemSnapshot,
    },
];

pub fn catalog() -> &'static [FunctionSpec] {
    CATALOG
}

pub fn find(name: &str) -> Option<&'static FunctionSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

pub fn is_registered(name: &str) -> bool {
    find(name).is_some()
}

impl FunctionSpec {
    /// Run the read this entry is backed by and render a compact text
    /// summary. An empty collection yields an empty/zero summary, never an
    /// error.
    pub async fn execute(
        &self,
        store: &dyn EntityStore,
        event_window: Duration,
    ) -> Result<String, StoreError> {
        match self.kind {
            FunctionKind::ListActiveDogs => list_active_dogs(store).await,
            FunctionKind::CountDogsByStatus => count_dogs_by_status(store).await,
            FunctionKind::ListGuardsOnDuty => list_guards_on_duty(store).await,
            FunctionKind::CountGuardsByStatus => count_guards_by_status(store).await,
            FunctionKind::ListOfflineCameras => list_offline_cameras(store).await,
            FunctionKind::CountCamerasByStatus => count_cameras_by_status(store).await,
            FunctionKind::RecentEvents => recent_events(store, event_window).await,
            FunctionKind::UnresolvedEvents => unresolved_events(store).await,
            FunctionKind::ZoneOverview => zone_overview(store).await,
            FunctionKind::SystemSnapshot => system_snapshot(store).await,
        }
    }
}

fn fmt_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M UTC").to_string()
}

async fn list_active_dogs(store: &dyn EntityStore) -> Result<String, StoreError> {
    let dogs = store.list_dogs().await?;
    let active: Vec<_> = dogs
        .iter()
        .filter(|d| d.status == DogStatus::Active || d.is_on_duty)
        .collect();

    if active.is_empty() {
        return Ok("No patrol dogs are currently active or on duty.".to_string());
    }

    let mut out = format!("{} active patrol dogs:\n", active.len());
    for dog in active {
        out.push_str(&format!(
            "- {} ({}, {}y) — zone {}, status {}, handler {}, last patrol {}\n",
            dog.name,
            dog.breed,
            dog.age,
            dog.location.zone,
            dog.status.label(),
            dog.handler.name,
            fmt_time(dog.last_patrol),
        ));
    }
    Ok(out.trim_end().to_string())
}

async fn count_dogs_by_status(store: &dyn EntityStore) -> Result<String, StoreError> {
    let dogs = store.list_dogs().await?;
    let mut counts: HashMap<DogStatus, usize> = HashMap::new();
    for dog in &dogs {
        *counts.entry(dog.status).or_insert(0) += 1;
    }
    let on_duty = dogs.iter().filter(|d| d.is_on_duty).count();

    let per_status = DogStatus::all()
        .iter()
        .map(|s| format!("{}={}", s.label(), counts.get(s).copied().unwrap_or(0)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "Patrol dogs by status: {} (total {}). {} on duty.",
        per_status,
        dogs.len(),
        on_duty
    ))
}

async fn list_guards_on_duty(store: &dyn EntityStore) -> Result<String, StoreError> {
    let guards = store.list_guards().await?;
    let on_duty: Vec<_> = guards
        .iter()
        .filter(|g| g.status == GuardStatus::OnDuty)
        .collect();

    if on_duty.is_empty() {
        return Ok("No guards are currently on duty.".to_string());
    }

    let mut out = format!("{} guards on duty:\n", on_duty.len());
    for guard in on_duty {
        out.push_str(&format!(
            "- {} ({}) — zone {}, activity: {}, shift ends {}\n",
            guard.name,
            guard.employee_id,
            guard.assigned_zone,
            guard.current_activity,
            fmt_time(guard.shift_end),
        ));
    }
    Ok(out.trim_end().to_string())
}

async fn count_guards_by_status(store: &dyn EntityStore) -> Result<String, StoreError> {
    let guards = store.list_guards().await?;
    let mut counts: HashMap<GuardStatus, usize> = HashMap::new();
    for guard in &guards {
        *counts.entry(guard.status).or_insert(0) += 1;
    }

    let per_status = GuardStatus::all()
        .iter()
        .map(|s| format!("{}={}", s.label(), counts.get(s).copied().unwrap_or(0)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "Guards by status: {} (total {}).",
        per_status,
        guards.len()
    ))
}

async fn list_offline_cameras(store: &dyn EntityStore) -> Result<String, StoreError> {
    let cameras = store.list_cameras().await?;
    let offline: Vec<_> = cameras
        .iter()
        .filter(|c| matches!(c.status, CameraStatus::Offline | CameraStatus::Error))
        .collect();

    if offline.is_empty() {
        return Ok("0 offline cameras. All camera feeds are up.".to_string());
    }

    let plural = if offline.len() == 1 { "" } else { "s" };
    let mut out = format!("{} offline camera{}:\n", offline.len(), plural);
    for camera in offline {
        out.push_str(&format!(
            "- {} {} — zone {}, status {}, last ping {}\n",
            camera.camera_id,
            camera.name,
            camera.location.zone,
            camera.status.label(),
            fmt_time(camera.last_ping),
        ));
    }
    Ok(out.trim_end().to_string())
}

async fn count_cameras_by_status(store: &dyn EntityStore) -> Result<String, StoreError> {
    let cameras = store.list_cameras().await?;
    let mut counts: HashMap<CameraStatus, usize> = HashMap::new();
    for camera in &cameras {
        *counts.entry(camera.status).or_insert(0) += 1;
    }
    let recording = cameras.iter().filter(|c| c.is_recording).count();

    let per_status = CameraStatus::all()
        .iter()
        .map(|s| format!("{}={}", s.label(), counts.get(s).copied().unwrap_or(0)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "Cameras by status: {} (total {}). {} recording.",
        per_status,
        cameras.len(),
        recording
    ))
}

/// Best-effort index from source ids to display names. A failed collection
/// read leaves that kind unresolved rather than failing the event summary.
async fn source_index(store: &dyn EntityStore) -> HashMap<String, String> {
    let mut index = HashMap::new();
    if let Ok(dogs) = store.list_dogs().await {
        for dog in dogs {
            index.insert(dog.id.clone(), format!("dog {}", dog.name));
            index.insert(dog.name.clone(), format!("dog {}", dog.name));
        }
    }
    if let Ok(guards) = store.list_guards().await {
        for guard in guards {
            index.insert(guard.id.clone(), format!("guard {}", guard.name));
            index.insert(guard.employee_id.clone(), format!("guard {}", guard.name));
        }
    }
    if let Ok(cameras) = store.list_cameras().await {
        for camera in cameras {
            index.insert(camera.id.clone(), format!("camera {}", camera.name));
            index.insert(camera.camera_id.clone(), format!("camera {}", camera.name));
        }
    }
    index
}

fn event_line(event: &SecurityEvent, index: &HashMap<String, String>) -> String {
    let source = index.get(&event.source_id).cloned().unwrap_or_else(|| {
        format!(
            "unknown source ({} {})",
            event.source_type.label(),
            event.source_id
        )
    });
    let resolution = if event.is_resolved {
        match &event.resolved_by {
            Some(by) => format!("resolved by {}", by),
            None => "resolved".to_string(),
        }
    } else {
        "UNRESOLVED".to_string()
    };
    format!(
        "- [{}] {} at {} — {} (source: {}, {}, {})",
        event.severity.label(),
        event.event_type.label(),
        event.location.zone,
        event.description,
        source,
        resolution,
        fmt_time(event.created_at),
    )
}

async fn recent_events(store: &dyn EntityStore, window: Duration) -> Result<String, StoreError> {
    let cutoff = Utc::now() - window;
    let events = store.list_events_since(cutoff).await?;

    if events.is_empty() {
        return Ok(format!(
            "No security events recorded in the last {} hours.",
            window.num_hours()
        ));
    }

    let index = source_index(store).await;
    let mut out = format!(
        "{} security events in the last {} hours:\n",
        events.len(),
        window.num_hours()
    );
    for event in events.iter().take(MAX_EVENT_LINES) {
        out.push_str(&event_line(event, &index));
        out.push('\n');
    }
    if events.len() > MAX_EVENT_LINES {
        out.push_str(&format!("… and {} more.\n", events.len() - MAX_EVENT_LINES));
    }
    Ok(out.trim_end().to_string())
}

async fn unresolved_events(store: &dyn EntityStore) -> Result<String, StoreError> {
    let mut events: Vec<SecurityEvent> = store
        .list_events()
        .await?
        .into_iter()
        .filter(|e| !e.is_resolved)
        .collect();

    if events.is_empty() {
        return Ok("No unresolved security events. All incidents are closed.".to_string());
    }

    events.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    let index = source_index(store).await;
    let mut out = format!("{} unresolved security events:\n", events.len());
    for event in events.iter().take(MAX_EVENT_LINES) {
        out.push_str(&event_line(event, &index));
        out.push('\n');
    }
    if events.len() > MAX_EVENT_LINES {
        out.push_str(&format!("… and {} more.\n", events.len() - MAX_EVENT_LINES));
    }
    Ok(out.trim_end().to_string())
}

async fn zone_overview(store: &dyn EntityStore) -> Result<String, StoreError> {
    let dogs = store.list_dogs().await?;
    let guards = store.list_guards().await?;
    let cameras = store.list_cameras().await?;

    // BTreeMap keeps zone output order stable across runs.
    let mut zones: BTreeMap<String, (Vec<String>, Vec<String>, Vec<String>)> = BTreeMap::new();

    for dog in &dogs {
        zones
            .entry(dog.location.zone.clone())
            .or_default()
            .0
            .push(dog.name.clone());
    }
    for guard in &guards {
        zones
            .entry(guard.assigned_zone.clone())
            .or_default()
            .1
            .push(guard.name.clone());
    }
    for camera in &cameras {
        zones
            .entry(camera.location.zone.clone())
            .or_default()
            .2
            .push(format!("{} ({})", camera.name, camera.status.label()));
    }

    if zones.is_empty() {
        return Ok("No zones have any assigned dogs, guards or cameras.".to_string());
    }

    let mut out = String::from("Zone coverage:\n");
    for (zone, (zone_dogs, zone_guards, zone_cameras)) in &zones {
        out.push_str(&format!(
            "- {}: {} dogs [{}], {} guards [{}], {} cameras [{}]\n",
            zone,
            zone_dogs.len(),
            zone_dogs.join(", "),
            zone_guards.len(),
            zone_guards.join(", "),
            zone_cameras.len(),
            zone_cameras.join(", "),
        ));
    }
    Ok(out.trim_end().to_string())
}

async fn system_snapshot(store: &dyn EntityStore) -> Result<String, StoreError> {
    let dogs = store.list_dogs().await?;
    let guards = store.list_guards().await?;
    let cameras = store.list_cameras().await?;
    let events = store.list_events().await?;

    let dogs_active = dogs.iter().filter(|d| d.status == DogStatus::Active).count();
    let dogs_on_duty = dogs.iter().filter(|d| d.is_on_duty).count();
    let guards_on_duty = guards
        .iter()
        .filter(|g| g.status == GuardStatus::OnDuty)
        .count();
    let cameras_online = cameras
        .iter()
        .filter(|c| c.status == CameraStatus::Online)
        .count();
    let cameras_offline = cameras
        .iter()
        .filter(|c| matches!(c.status, CameraStatus::Offline | CameraStatus::Error))
        .count();
    let unresolved: Vec<&SecurityEvent> = events.iter().filter(|e| !e.is_resolved).collect();
    let highest_open = unresolved
        .iter()
        .map(|e| e.severity)
        .max()
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| "none".to_string());

    Ok(format!(
        "System snapshot:\n\
         Patrol dogs: {} total, {} active, {} on duty.\n\
         Guards: {} total, {} on duty.\n\
         Cameras: {} total, {} online, {} offline.\n\
         Events: {} recorded, {} unresolved (highest open severity: {}).",
        dogs.len(),
        dogs_active,
        dogs_on_duty,
        guards.len(),
        guards_on_duty,
        cameras.len(),
        cameras_online,
        cameras_offline,
        events.len(),
        unresolved.len(),
        highest_open,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryEntityStore;

    #[test]
    fn catalog_names_are_unique_and_fallback_registered() {
        let mut seen = std::collections::HashSet::new();
        for spec in catalog() {
            assert!(seen.insert(spec.name), "duplicate registry name {}", spec.name);
            assert!(!spec.triggers.is_empty(), "{} has no triggers", spec.name);
        }
        assert!(is_registered(FALLBACK_FUNCTION));
    }

    #[tokio::test]
    async fn every_function_completes_on_empty_store() {
        let store = InMemoryEntityStore::empty();
        for spec in catalog() {
            let summary = spec
                .execute(&store, Duration::hours(24))
                .await
                .unwrap_or_else(|e| panic!("{} failed on empty store: {e}", spec.name));
            assert!(!summary.is_empty(), "{} produced empty summary", spec.name);
        }
    }

    #[tokio::test]
    async fn offline_camera_listing_states_count() {
        let store = InMemoryEntityStore::demo_deployment();
        let summary = find("list_offline_cameras")
            .unwrap()
            .execute(&store, Duration::hours(24))
            .await
            .unwrap();
        // Demo deployment has exactly one offline camera (CAM003).
        assert!(summary.starts_with("1 offline camera"), "got: {summary}");
        assert!(summary.contains("CAM003"));
    }

    #[tokio::test]
    async fn snapshot_covers_all_entity_kinds() {
        let store = InMemoryEntityStore::demo_deployment();
        let summary = find("system_snapshot")
            .unwrap()
            .execute(&store, Duration::hours(24))
            .await
            .unwrap();
        assert!(summary.contains("Patrol dogs: 3 total"));
        assert!(summary.contains("Guards: 3 total"));
        assert!(summary.contains("Cameras: 4 total"));
        assert!(summary.contains("1 unresolved"));
    }

    #[tokio::test]
    async fn dangling_event_source_is_reported_not_fatal() {
        use crate::entities::*;
        use chrono::Utc;

        let event = SecurityEvent {
            id: "evt-x".to_string(),
            event_type: EventType::SystemAlert,
            severity: Severity::Medium,
            description: "Sensor fault".to_string(),
            location: ZonedLocation {
                lat: 0.0,
                lng: 0.0,
                zone: "Interior".to_string(),
            },
            source_id: "GHOST-9".to_string(),
            source_type: SourceType::System,
            is_resolved: false,
            resolved_by: None,
            resolved_at: None,
            metadata: None,
            created_at: Utc::now(),
        };
        let store = InMemoryEntityStore::with_data(vec![], vec![], vec![], vec![event]);

        let summary = find("unresolved_events")
            .unwrap()
            .execute(&store, Duration::hours(24))
            .await
            .unwrap();
        assert!(
            summary.contains("unknown source (system GHOST-9)"),
            "got: {summary}"
        );
    }
}
