pub mod assigner;
pub mod estimate;
pub mod job;
pub mod registry;
pub mod timeline;

pub use job::{
    AssignedJob, AssignmentResult, Job, JobRequest, JobStatus, QueueItem, QueuedJob,
    ServiceCategory, Specialization,
};
pub use registry::{Worker, WorkerRegistry};
