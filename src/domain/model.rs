use std::path::PathBuf;

/// One URL queued for download. Never mutated after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub audio_only: bool,
    pub destination_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Pending,
    Downloading,
    PostProcessing,
    Completed,
    Failed,
}

impl DownloadPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, DownloadPhase::Completed | DownloadPhase::Failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub url: String,
    pub phase: DownloadPhase,
    /// Only meaningful while `phase` is `Downloading`.
    pub fraction_complete: f32,
    pub message: String,
}

impl DownloadProgress {
    pub fn pending(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            message: format!("Waiting: {}", url),
            url,
            phase: DownloadPhase::Pending,
            fraction_complete: 0.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}

/// Status reported by the media-extraction library for one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressStatus {
    Downloading,
    Finished,
    Error,
    Other(String),
}

impl From<&str> for ProgressStatus {
    fn from(status: &str) -> Self {
        match status {
            "downloading" => ProgressStatus::Downloading,
            "finished" => ProgressStatus::Finished,
            "error" => ProgressStatus::Error,
            other => ProgressStatus::Other(other.to_string()),
        }
    }
}

/// Raw progress callback payload, before the relay normalizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub total_bytes_estimate: Option<u64>,
}

impl ProgressEvent {
    /// Exact total when known, otherwise the library's estimate. Zero counts as unknown.
    pub fn known_total(&self) -> Option<u64> {
        self.total_bytes
            .filter(|total| *total > 0)
            .or(self.total_bytes_estimate.filter(|total| *total > 0))
    }
}

#[cfg(test)]
impl ProgressEvent {
    pub fn downloading(downloaded_bytes: u64, total_bytes: Option<u64>) -> Self {
        Self {
            status: ProgressStatus::Downloading,
            downloaded_bytes: Some(downloaded_bytes),
            total_bytes,
            total_bytes_estimate: None,
        }
    }

    pub fn finished() -> Self {
        Self {
            status: ProgressStatus::Finished,
            downloaded_bytes: None,
            total_bytes: None,
            total_bytes_estimate: None,
        }
    }
}

/// Terminal states of every URL in one batch, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub items: Vec<DownloadProgress>,
}

impl BatchResult {
    pub fn completed(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.phase == DownloadPhase::Completed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.phase == DownloadPhase::Failed)
            .count()
    }

    pub fn any_completed(&self) -> bool {
        self.completed() > 0
    }

    pub fn summary(&self) -> String {
        "All downloads completed!".to_string()
    }
}

/// Per-URL progress records the view renders, keyed by URL and kept in input order.
#[derive(Debug, Clone, Default)]
pub struct ProgressBoard {
    entries: Vec<DownloadProgress>,
}

impl ProgressBoard {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces the record for `progress.url`, or appends it for a new URL.
    /// Records that already reached a terminal phase are kept as they are.
    pub fn apply(&mut self, progress: DownloadProgress) {
        match self.entries.iter_mut().find(|entry| entry.url == progress.url) {
            Some(entry) if entry.is_terminal() => {}
            Some(entry) => *entry = progress,
            None => self.entries.push(progress),
        }
    }

    pub fn entries(&self) -> &[DownloadProgress] {
        &self.entries
    }

    pub fn has_completed(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.phase == DownloadPhase::Completed)
    }
}
