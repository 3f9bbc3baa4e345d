pub mod format;
mod model;
mod store;

pub use model::{
    clamp_progress, JobId, Project, ProjectStatus, StepId, StepMap, StepState, StepStatus,
};
pub use store::{ActionRefusal, ProjectCounts, ProjectStore, StatusFilter};
