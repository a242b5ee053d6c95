pub mod client;
pub mod models;

pub use client::{DownloadInvoker, YtDlpInvoker};
pub use models::DownloadOptions;
