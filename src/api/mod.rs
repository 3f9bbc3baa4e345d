mod client;
pub mod types;

pub use client::DubbingClient;
pub use types::{AuthResponse, JobStatusResponse, JobSummary, LoginRequest, SignupRequest};
