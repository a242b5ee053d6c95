use crate::domain::{AppError, DownloadPhase, DownloadProgress, ProgressEvent, ProgressStatus};

/// Folds one raw extractor event into the progress record of its URL.
///
/// Terminal records are returned as they are. Once a URL has started, the
/// fraction only moves forward: merged audio+video downloads report a
/// `finished` between the two byte streams, and the second stream starts
/// from the fraction the first one reached. Events without a usable total
/// leave the fraction and the message alone.
pub fn on_library_event(current: &DownloadProgress, event: &ProgressEvent) -> DownloadProgress {
    if current.is_terminal() {
        return current.clone();
    }

    match event.status {
        ProgressStatus::Downloading => {
            let mut next = DownloadProgress {
                phase: DownloadPhase::Downloading,
                ..current.clone()
            };

            if let Some(total) = event.known_total() {
                let downloaded = event.downloaded_bytes.unwrap_or(0);
                let fraction = (downloaded as f64 / total as f64).clamp(0.0, 1.0) as f32;
                let previous = if current.phase == DownloadPhase::Pending {
                    0.0
                } else {
                    current.fraction_complete
                };
                next.fraction_complete = fraction.max(previous);
                next.message = format!(
                    "Downloading {:.1}%: {}",
                    next.fraction_complete * 100.0,
                    current.url
                );
            }

            next
        }
        ProgressStatus::Finished => DownloadProgress {
            phase: DownloadPhase::PostProcessing,
            fraction_complete: 1.0,
            message: "Extracting file...".to_string(),
            ..current.clone()
        },
        ProgressStatus::Error | ProgressStatus::Other(_) => current.clone(),
    }
}

pub fn started(current: &DownloadProgress) -> DownloadProgress {
    if current.phase != DownloadPhase::Pending {
        return current.clone();
    }
    DownloadProgress {
        phase: DownloadPhase::Downloading,
        fraction_complete: 0.0,
        message: format!("Downloading: {}", current.url),
        ..current.clone()
    }
}

pub fn completed(current: &DownloadProgress) -> DownloadProgress {
    if current.is_terminal() {
        return current.clone();
    }
    DownloadProgress {
        phase: DownloadPhase::Completed,
        fraction_complete: 1.0,
        message: "Extraction completed!".to_string(),
        ..current.clone()
    }
}

pub fn failed(current: &DownloadProgress, error: &AppError) -> DownloadProgress {
    if current.is_terminal() {
        return current.clone();
    }
    DownloadProgress {
        phase: DownloadPhase::Failed,
        message: error.to_string(),
        ..current.clone()
    }
}
