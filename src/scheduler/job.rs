use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Worker trade, a closed set. `GeneralMaintenance` workers double as a
/// universal fallback pool for any category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Specialization {
    #[serde(rename = "Engine Specialist")]
    EngineSpecialist,
    #[serde(rename = "Brake Expert")]
    BrakeExpert,
    #[serde(rename = "AC Technician")]
    AcTechnician,
    #[serde(rename = "General Maintenance")]
    GeneralMaintenance,
}

impl std::fmt::Display for Specialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Specialization::EngineSpecialist => write!(f, "Engine Specialist"),
            Specialization::BrakeExpert => write!(f, "Brake Expert"),
            Specialization::AcTechnician => write!(f, "AC Technician"),
            Specialization::GeneralMaintenance => write!(f, "General Maintenance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceCategory {
    General,
    Major,
    Brake,
    #[serde(rename = "AC")]
    Ac,
}

impl ServiceCategory {
    /// Fixed category -> trade table used by the dispatch ladder.
    pub fn required_specialization(self) -> Specialization {
        match self {
            ServiceCategory::General => Specialization::GeneralMaintenance,
            ServiceCategory::Major => Specialization::EngineSpecialist,
            ServiceCategory::Brake => Specialization::BrakeExpert,
            ServiceCategory::Ac => Specialization::AcTechnician,
        }
    }
}

impl std::str::FromStr for ServiceCategory {
    type Err = std::convert::Infallible;

    /// Unknown categories fall back to General rather than erroring, matching
    /// how unknown service types are dispatched to the general pool.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Major" | "major" => ServiceCategory::Major,
            "Brake" | "brake" => ServiceCategory::Brake,
            "AC" | "Ac" | "ac" => ServiceCategory::Ac,
            _ => ServiceCategory::General,
        })
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceCategory::General => write!(f, "General"),
            ServiceCategory::Major => write!(f, "Major"),
            ServiceCategory::Brake => write!(f, "Brake"),
            ServiceCategory::Ac => write!(f, "AC"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
    Completed,
}

/// A job committed to a worker's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub service_id: String,
    pub car_model: String,
    pub service_category: ServiceCategory,
    /// Estimate before the worker's efficiency adjustment
    pub original_duration: f64,
    /// Hours this worker will actually spend (= original / efficiency)
    pub duration: f64,
    pub start_time: DateTime<Utc>,
    pub completion_time: DateTime<Utc>,
    pub assigned_at: DateTime<Utc>,
    pub status: JobStatus,
}

/// A job waiting for capacity. Holds the unadjusted estimate since the
/// eventual worker (and so the efficiency factor) is not known yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub service_id: String,
    pub car_model: String,
    pub service_category: ServiceCategory,
    pub job_duration: f64,
    pub added_to_queue: DateTime<Utc>,
    /// Snapshot taken at enqueue time; may go stale as the shop drains
    pub estimated_wait_hours: f64,
}

/// Incoming work, validated at the dispatcher boundary.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub duration_hours: f64,
    pub category: ServiceCategory,
    pub car_model: String,
}

/// Details of a job placed on a worker's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedJob {
    pub service_id: String,
    pub worker_id: String,
    pub worker_name: String,
    pub specialization: Specialization,
    pub efficiency: f64,
    pub rating: f64,
    pub completion_time: DateTime<Utc>,
    pub adjusted_duration: f64,
    pub workload_percentage: f64,
    pub current_jobs_count: usize,
    /// True when this is the worker's only job, i.e. work starts now
    pub immediate_start: bool,
}

/// Details of a job parked in the wait queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedJob {
    pub service_id: String,
    pub queue_position: usize,
    pub estimated_wait_hours: f64,
    pub job_duration: f64,
}

/// Outcome of a submission: either committed to a worker or queued.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssignmentResult {
    Assigned(AssignedJob),
    Queued(QueuedJob),
}

impl AssignmentResult {
    pub fn service_id(&self) -> &str {
        match self {
            AssignmentResult::Assigned(a) => &a.service_id,
            AssignmentResult::Queued(q) => &q.service_id,
        }
    }

    pub fn worker_id(&self) -> Option<&str> {
        match self {
            AssignmentResult::Assigned(a) => Some(&a.worker_id),
            AssignmentResult::Queued(_) => None,
        }
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, AssignmentResult::Queued(_))
    }
}
