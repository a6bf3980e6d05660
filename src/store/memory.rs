use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::entities::{
    AiFeatures, Bodyguard, CameraLocation, CameraStatus, CctvCamera, DogStatus, EventType,
    GeoPoint, GuardDog, GuardStatus, Handler, HealthMetrics, SecurityEvent, Severity, SourceType,
    ZonedLocation,
};
use crate::store::{EntityStore, StoreError};

/// In-memory snapshot of the entity collections.
///
/// Used when `ENTITY_STORE_PROVIDER=memory` (demo runs without a live
/// document store) and as the store double in tests. Read-only, like the
/// real store.
#[derive(Default)]
pub struct InMemoryEntityStore {
    dogs: Vec<GuardDog>,
    guards: Vec<Bodyguard>,
    cameras: Vec<CctvCamera>,
    events: Vec<SecurityEvent>,
}

impl InMemoryEntityStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_data(
        dogs: Vec<GuardDog>,
        guards: Vec<Bodyguard>,
        cameras: Vec<CctvCamera>,
        events: Vec<SecurityEvent>,
    ) -> Self {
        Self {
            dogs,
            guards,
            cameras,
            events,
        }
    }

    /// The demo deployment: three patrol dogs, three guards, four cameras
    /// and a small event backlog, with timestamps relative to now.
    pub fn demo_deployment() -> Self {
        let now = Utc::now();

        let dogs = vec![
            GuardDog {
                id: "dog-rex".to_string(),
                name: "Rex".to_string(),
                breed: "German Shepherd".to_string(),
                age: 4,
                status: DogStatus::Active,
                location: ZonedLocation {
                    lat: 40.7128,
                    lng: -74.0060,
                    zone: "North Gate".to_string(),
                },
                handler: Handler {
                    name: "John Smith".to_string(),
                    contact: "+1-555-0101".to_string(),
                },
                health_metrics: HealthMetrics {
                    heart_rate: 85,
                    temperature: 101.5,
                    last_checkup: now - Duration::days(7),
                },
                last_patrol: now - Duration::hours(2),
                is_on_duty: true,
            },
            GuardDog {
                id: "dog-luna".to_string(),
                name: "Luna".to_string(),
                breed: "Belgian Malinois".to_string(),
                age: 3,
                status: DogStatus::Active,
                location: ZonedLocation {
                    lat: 40.7589,
                    lng: -73.9851,
                    zone: "East Wing".to_string(),
                },
                handler: Handler {
                    name: "Sarah Johnson".to_string(),
                    contact: "+1-555-0102".to_string(),
                },
                health_metrics: HealthMetrics {
                    heart_rate: 90,
                    temperature: 101.8,
                    last_checkup: now - Duration::days(3),
                },
                last_patrol: now - Duration::hours(1),
                is_on_duty: true,
            },
            GuardDog {
                id: "dog-max".to_string(),
                name: "Max".to_string(),
                breed: "Rottweiler".to_string(),
                age: 5,
                status: DogStatus::Resting,
                location: ZonedLocation {
                    lat: 40.7505,
                    lng: -73.9934,
                    zone: "South Entrance".to_string(),
                },
                handler: Handler {
                    name: "Mike Wilson".to_string(),
                    contact: "+1-555-0103".to_string(),
                },
                health_metrics: HealthMetrics {
                    heart_rate: 75,
                    temperature: 101.2,
                    last_checkup: now - Duration::days(1),
                },
                last_patrol: now - Duration::hours(4),
                is_on_duty: false,
            },
        ];

        let guards = vec![
            Bodyguard {
                id: "guard-bg001".to_string(),
                name: "Alex Rodriguez".to_string(),
                employee_id: "BG001".to_string(),
                assigned_zone: "Main Building".to_string(),
                status: GuardStatus::OnDuty,
                current_activity: "Perimeter patrol".to_string(),
                shift_start: now - Duration::hours(4),
                shift_end: now + Duration::hours(4),
                location: GeoPoint {
                    lat: 40.7614,
                    lng: -73.9776,
                },
                contact: "+1-555-0201".to_string(),
                certifications: vec![
                    "Armed Security".to_string(),
                    "First Aid".to_string(),
                    "Crisis Management".to_string(),
                ],
            },
            Bodyguard {
                id: "guard-bg002".to_string(),
                name: "Maria Garcia".to_string(),
                employee_id: "BG002".to_string(),
                assigned_zone: "Parking Lot".to_string(),
                status: GuardStatus::OnDuty,
                current_activity: "Vehicle inspection".to_string(),
                shift_start: now - Duration::hours(3),
                shift_end: now + Duration::hours(5),
                location: GeoPoint {
                    lat: 40.7580,
                    lng: -73.9855,
                },
                contact: "+1-555-0202".to_string(),
                certifications: vec![
                    "Security Guard License".to_string(),
                    "Defensive Tactics".to_string(),
                ],
            },
            Bodyguard {
                id: "guard-bg003".to_string(),
                name: "David Chen".to_string(),
                employee_id: "BG003".to_string(),
                assigned_zone: "Reception Area".to_string(),
                status: GuardStatus::Break,
                current_activity: "Break time".to_string(),
                shift_start: now - Duration::hours(2),
                shift_end: now + Duration::hours(6),
                location: GeoPoint {
                    lat: 40.7505,
                    lng: -73.9934,
                },
                contact: "+1-555-0203".to_string(),
                certifications: vec![
                    "Customer Service".to_string(),
                    "Access Control".to_string(),
                ],
            },
        ];

        let cameras = vec![
            CctvCamera {
                id: "cam-001".to_string(),
                camera_id: "CAM001".to_string(),
                name: "Main Entrance Camera".to_string(),
                location: CameraLocation {
                    lat: 40.7128,
                    lng: -74.0060,
                    zone: "Main Entrance".to_string(),
                    description: "Front door monitoring".to_string(),
                },
                status: CameraStatus::Online,
                is_recording: true,
                last_ping: now,
                ai_features: AiFeatures {
                    motion_detection: true,
                    face_recognition: true,
                    intrusion_detection: true,
                },
                resolution: "4K".to_string(),
                night_vision: true,
            },
            CctvCamera {
                id: "cam-002".to_string(),
                camera_id: "CAM002".to_string(),
                name: "Parking Lot Camera 1".to_string(),
                location: CameraLocation {
                    lat: 40.7589,
                    lng: -73.9851,
                    zone: "Parking Lot".to_string(),
                    description: "North parking area".to_string(),
                },
                status: CameraStatus::Online,
                is_recording: true,
                last_ping: now - Duration::seconds(30),
                ai_features: AiFeatures {
                    motion_detection: true,
                    face_recognition: false,
                    intrusion_detection: true,
                },
                resolution: "1080p".to_string(),
                night_vision: true,
            },
            CctvCamera {
                id: "cam-003".to_string(),
                camera_id: "CAM003".to_string(),
                name: "Hallway Camera A".to_string(),
                location: CameraLocation {
                    lat: 40.7505,
                    lng: -73.9934,
                    zone: "Interior".to_string(),
                    description: "Main hallway".to_string(),
                },
                status: CameraStatus::Offline,
                is_recording: false,
                last_ping: now - Duration::minutes(10),
                ai_features: AiFeatures {
                    motion_detection: true,
                    face_recognition: true,
                    intrusion_detection: false,
                },
                resolution: "1080p".to_string(),
                night_vision: false,
            },
            CctvCamera {
                id: "cam-004".to_string(),
                camera_id: "CAM004".to_string(),
                name: "Emergency Exit Camera".to_string(),
                location: CameraLocation {
                    lat: 40.7614,
                    lng: -73.9776,
                    zone: "Emergency Exit".to_string(),
                    description: "Rear emergency exit".to_string(),
                },
                status: CameraStatus::Maintenance,
                is_recording: false,
                last_ping: now - Duration::hours(2),
                ai_features: AiFeatures {
                    motion_detection: true,
                    face_recognition: false,
                    intrusion_detection: true,
                },
                resolution: "720p".to_string(),
                night_vision: true,
            },
        ];

        let events = vec![
            SecurityEvent {
                id: "evt-001".to_string(),
                event_type: EventType::MotionDetected,
                severity: Severity::Low,
                description: "Motion detected in parking lot".to_string(),
                location: ZonedLocation {
                    lat: 40.7589,
                    lng: -73.9851,
                    zone: "Parking Lot".to_string(),
                },
                source_id: "CAM002".to_string(),
                source_type: SourceType::Camera,
                is_resolved: true,
                resolved_by: Some("Maria Garcia".to_string()),
                resolved_at: Some(now - Duration::minutes(30)),
                metadata: None,
                created_at: now - Duration::minutes(45),
            },
            SecurityEvent {
                id: "evt-002".to_string(),
                event_type: EventType::IntrusionAlert,
                severity: Severity::High,
                description: "Unauthorized access attempt at emergency exit".to_string(),
                location: ZonedLocation {
                    lat: 40.7614,
                    lng: -73.9776,
                    zone: "Emergency Exit".to_string(),
                },
                source_id: "CAM004".to_string(),
                source_type: SourceType::Camera,
                is_resolved: false,
                resolved_by: None,
                resolved_at: None,
                metadata: None,
                created_at: now - Duration::minutes(12),
            },
            SecurityEvent {
                id: "evt-003".to_string(),
                event_type: EventType::PatrolCompleted,
                severity: Severity::Low,
                description: "Rex completed north gate patrol".to_string(),
                location: ZonedLocation {
                    lat: 40.7128,
                    lng: -74.0060,
                    zone: "North Gate".to_string(),
                },
                source_id: "dog-rex".to_string(),
                source_type: SourceType::Dog,
                is_resolved: true,
                resolved_by: Some("System".to_string()),
                resolved_at: Some(now - Duration::hours(2)),
                metadata: None,
                created_at: now - Duration::hours(2),
            },
        ];

        Self::with_data(dogs, guards, cameras, events)
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn list_dogs(&self) -> Result<Vec<GuardDog>, StoreError> {
        Ok(self.dogs.clone())
    }

    async fn list_guards(&self) -> Result<Vec<Bodyguard>, StoreError> {
        Ok(self.guards.clone())
    }

    async fn list_cameras(&self) -> Result<Vec<CctvCamera>, StoreError> {
        Ok(self.cameras.clone())
    }

    async fn list_events(&self) -> Result<Vec<SecurityEvent>, StoreError> {
        Ok(self.events.clone())
    }
}
