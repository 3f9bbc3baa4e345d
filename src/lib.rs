pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod poller;
pub mod project;
pub mod session;
pub mod upload;

pub use error::{Error, Result};
