pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    BatchResult, DownloadPhase, DownloadProgress, DownloadRequest, ProgressBoard, ProgressEvent,
    ProgressStatus,
};
