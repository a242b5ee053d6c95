use std::path::PathBuf;

use serde::Serialize;

use crate::config::{AudioSettings, AudioStrategy};
use crate::domain::{DownloadRequest, ProgressEvent, ProgressStatus};

const AUDIO_FORMAT: &str = "bestaudio/best";
const COMPATIBLE_AUDIO_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio/best";
const VIDEO_FORMAT: &str = "bestvideo+bestaudio/best";
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

pub(crate) const PROGRESS_PREFIX: &str = "[magic-progress]";
pub(crate) const FILE_PREFIX: &str = "[magic-file]";

/// Post-download step handed to the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "key")]
pub enum PostProcessor {
    #[serde(rename = "FFmpegExtractAudio")]
    ExtractAudio {
        #[serde(rename = "preferredcodec")]
        preferred_codec: String,
    },
}

/// Configuration for one extractor run. Progress reporting is not part of it:
/// events come back over the channel given to the invoker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOptions {
    pub url: String,
    pub format: String,
    pub outtmpl: String,
    pub postprocessors: Vec<PostProcessor>,
    pub keepvideo: bool,
    pub ignoreerrors: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub no_warnings: bool,
}

impl DownloadOptions {
    pub fn for_request(request: &DownloadRequest, audio: &AudioSettings) -> Self {
        let (format, postprocessors) = match (request.audio_only, audio.strategy) {
            (false, _) => (VIDEO_FORMAT, Vec::new()),
            (true, AudioStrategy::Transcode) => (
                AUDIO_FORMAT,
                vec![PostProcessor::ExtractAudio {
                    preferred_codec: audio.codec.clone(),
                }],
            ),
            (true, AudioStrategy::PreferCompatible) => (COMPATIBLE_AUDIO_FORMAT, Vec::new()),
        };

        Self {
            url: request.url.clone(),
            format: format.to_string(),
            outtmpl: request
                .destination_dir
                .join(OUTPUT_TEMPLATE)
                .to_string_lossy()
                .into_owned(),
            postprocessors,
            keepvideo: false,
            ignoreerrors: true,
            quiet: true,
            verbose: false,
            no_warnings: true,
        }
    }
}

/// What a finished extractor run left on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub files: Vec<PathBuf>,
}

/// Parses a line printed through the progress template
/// (`status;downloaded;total;estimate`, `NA` for missing values).
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let payload = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let mut fields = payload.split(';');

    let status = ProgressStatus::from(fields.next()?.trim());
    let downloaded_bytes = parse_bytes(fields.next());
    let total_bytes = parse_bytes(fields.next());
    let total_bytes_estimate = parse_bytes(fields.next());

    Some(ProgressEvent {
        status,
        downloaded_bytes,
        total_bytes,
        total_bytes_estimate,
    })
}

fn parse_bytes(field: Option<&str>) -> Option<u64> {
    let field = field?.trim();
    field.parse::<u64>().ok().or_else(|| {
        // estimates come through as floats
        field
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| value as u64)
    })
}
