use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a patrol dog. Set by explicit operator action, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DogStatus {
    Active,
    Resting,
    Offline,
    Medical,
}

impl DogStatus {
    pub fn all() -> [Self; 4] {
        [Self::Active, Self::Resting, Self::Offline, Self::Medical]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resting => "resting",
            Self::Offline => "offline",
            Self::Medical => "medical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardStatus {
    OnDuty,
    OffDuty,
    Break,
    Emergency,
}

impl GuardStatus {
    pub fn all() -> [Self; 4] {
        [Self::OnDuty, Self::OffDuty, Self::Break, Self::Emergency]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OnDuty => "on_duty",
            Self::OffDuty => "off_duty",
            Self::Break => "break",
            Self::Emergency => "emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraStatus {
    Online,
    Offline,
    Maintenance,
    Error,
}

impl CameraStatus {
    pub fn all() -> [Self; 4] {
        [Self::Online, Self::Offline, Self::Maintenance, Self::Error]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Maintenance => "maintenance",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    MotionDetected,
    IntrusionAlert,
    FaceRecognized,
    PatrolCompleted,
    Emergency,
    SystemAlert,
}

impl EventType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MotionDetected => "motion_detected",
            Self::IntrusionAlert => "intrusion_alert",
            Self::FaceRecognized => "face_recognized",
            Self::PatrolCompleted => "patrol_completed",
            Self::Emergency => "emergency",
            Self::SystemAlert => "system_alert",
        }
    }
}

/// Event severity. Ordering is used to rank open events, Critical highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Camera,
    Dog,
    Guard,
    System,
}

impl SourceType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Dog => "dog",
            Self::Guard => "guard",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZonedLocation {
    pub lat: f64,
    pub lng: f64,
    pub zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraLocation {
    pub lat: f64,
    pub lng: f64,
    pub zone: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handler {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub heart_rate: u32,
    pub temperature: f64,
    pub last_checkup: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardDog {
    pub id: String,
    pub name: String,
    pub breed: String,
    pub age: u32,
    pub status: DogStatus,
    pub location: ZonedLocation,
    pub handler: Handler,
    pub health_metrics: HealthMetrics,
    pub last_patrol: DateTime<Utc>,
    pub is_on_duty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bodyguard {
    pub id: String,
    pub name: String,
    pub employee_id: String,
    pub assigned_zone: String,
    pub status: GuardStatus,
    pub current_activity: String,
    pub shift_start: DateTime<Utc>,
    pub shift_end: DateTime<Utc>,
    pub location: GeoPoint,
    pub contact: String,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiFeatures {
    pub motion_detection: bool,
    pub face_recognition: bool,
    pub intrusion_detection: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CctvCamera {
    pub id: String,
    pub camera_id: String,
    pub name: String,
    pub location: CameraLocation,
    pub status: CameraStatus,
    pub is_recording: bool,
    pub last_ping: DateTime<Utc>,
    pub ai_features: AiFeatures,
    pub resolution: String,
    pub night_vision: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

/// A single entry in the security event log. `source_id` is a loose string
/// reference into the dog/guard/camera collections; it may dangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub id: String,
    pub event_type: EventType,
    pub severity: Severity,
    pub description: String,
    pub location: ZonedLocation,
    pub source_id: String,
    pub source_type: SourceType,
    pub is_resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
    pub created_at: DateTime<Utc>,
}

/// Audit record of one processed query. Append-only; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub id: i64,
    pub query: String,
    pub response: String,
    pub requester_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub functions_used: Vec<String>,
}
