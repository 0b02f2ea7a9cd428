mod workflow;

pub use workflow::{CompletedJob, JobHandle, JobPhase, JobWorkflow};
