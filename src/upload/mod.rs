mod types;
mod uploader;
pub mod validation;

pub use types::{UploadEntry, UploadStatus};
pub use uploader::{UploadQueue, Uploader};
