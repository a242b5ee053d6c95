use std::path::PathBuf;

use crate::application::{resolve_default_path, PlatformInfo};
use crate::domain::{AppError, BatchResult, DownloadProgress, ProgressBoard};

/// Everything the screen shows apart from the URL editor buffer.
/// Each user action or batch event maps to one method here.
#[derive(Debug, Clone)]
pub struct SessionState {
    platform: PlatformInfo,
    pub audio_only: bool,
    pub destination_dir: PathBuf,
    /// Set once the user picked a folder; stops audio/video toggles from moving it.
    custom_destination: bool,
    pub status_message: String,
    pub is_downloading: bool,
    pub board: ProgressBoard,
    pub show_open_folder: bool,
}

impl SessionState {
    pub fn new(platform: PlatformInfo) -> Self {
        let audio_only = true;
        let destination_dir = PathBuf::from(resolve_default_path(&platform, audio_only));

        Self {
            platform,
            audio_only,
            destination_dir,
            custom_destination: false,
            status_message: String::new(),
            is_downloading: false,
            board: ProgressBoard::default(),
            show_open_folder: false,
        }
    }

    pub fn path_label(&self) -> String {
        format!("Path: {}", self.destination_dir.display())
    }

    pub fn set_audio_only(&mut self, audio_only: bool) {
        self.audio_only = audio_only;
        if !self.custom_destination {
            self.destination_dir = PathBuf::from(resolve_default_path(&self.platform, audio_only));
        }
    }

    /// `None` means the dialog was cancelled.
    pub fn apply_picked_directory(&mut self, picked: Option<PathBuf>) {
        if let Some(path) = picked {
            tracing::info!(path = %path.display(), "download folder changed");
            self.destination_dir = path;
            self.custom_destination = true;
        }
    }

    /// Clears the previous batch; rows reappear as the new batch reports them.
    pub fn begin_batch(&mut self) {
        self.status_message.clear();
        self.board.clear();
        self.is_downloading = true;
    }

    pub fn apply_progress(&mut self, progress: DownloadProgress) {
        self.board.apply(progress);
        if self.board.has_completed() {
            self.show_open_folder = true;
        }
    }

    pub fn finish_batch(&mut self, outcome: Result<BatchResult, AppError>) {
        self.is_downloading = false;
        match outcome {
            Ok(result) => {
                if result.any_completed() {
                    self.show_open_folder = true;
                }
                self.status_message = result.summary();
                for item in result.items {
                    self.board.apply(item);
                }
            }
            Err(AppError::InvalidInput) => {
                self.status_message = AppError::InvalidInput.to_string();
            }
            Err(e) => {
                tracing::error!(error = %e, "batch ended abnormally");
                self.status_message = e.to_string();
            }
        }
    }
}
