use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

use super::models::{
    parse_progress_line, DownloadOptions, DownloadOutcome, PostProcessor, FILE_PREFIX,
    PROGRESS_PREFIX,
};
use crate::config::AppConfig;
use crate::domain::ProgressEvent;

#[derive(Error, Debug)]
pub enum InvokerError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Failed(String),

    #[error("I/O error while reading extractor output: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvokerError>;

/// Next output line, decoded lossily. Titles and paths are not always UTF-8.
async fn next_line<R>(segments: &mut tokio::io::Split<BufReader<R>>) -> std::io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    Ok(segments.next_segment().await?.map(|bytes| {
        let line = String::from_utf8_lossy(&bytes);
        line.trim_end_matches('\r').to_string()
    }))
}

/// Runs one download. Progress events go to `events` as they happen; the
/// returned future resolves once the download has ended.
#[async_trait]
pub trait DownloadInvoker: Send + Sync {
    async fn download(
        &self,
        options: &DownloadOptions,
        events: UnboundedSender<ProgressEvent>,
    ) -> Result<DownloadOutcome>;
}

/// Drives the `yt-dlp` command line program.
#[derive(Debug, Clone)]
pub struct YtDlpInvoker {
    program: PathBuf,
    ffmpeg_location: Option<PathBuf>,
}

impl YtDlpInvoker {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            program: config.ytdlp_program.clone(),
            ffmpeg_location: config.ffmpeg_location.clone(),
        }
    }

    fn command_args(&self, options: &DownloadOptions) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            options.format.clone(),
            "--output".to_string(),
            options.outtmpl.clone(),
        ];

        for postprocessor in &options.postprocessors {
            match postprocessor {
                PostProcessor::ExtractAudio { preferred_codec } => {
                    args.push("--extract-audio".to_string());
                    args.push("--audio-format".to_string());
                    args.push(preferred_codec.clone());
                }
            }
        }

        if options.keepvideo {
            args.push("--keep-video".to_string());
        }
        if options.ignoreerrors {
            args.push("--ignore-errors".to_string());
        }
        if options.quiet {
            args.push("--quiet".to_string());
        }
        if options.verbose {
            args.push("--verbose".to_string());
        }
        if options.no_warnings {
            args.push("--no-warnings".to_string());
        }
        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.to_string_lossy().into_owned());
        }

        args.extend(
            ["--color", "no_color", "--newline", "--progress", "--progress-template"]
                .map(String::from),
        );
        args.push(format!(
            "download:{}%(progress.status)s;%(progress.downloaded_bytes)s;%(progress.total_bytes)s;%(progress.total_bytes_estimate)s",
            PROGRESS_PREFIX
        ));
        args.push("--print".to_string());
        args.push(format!("after_move:{}%(filepath)s", FILE_PREFIX));

        args.push("--".to_string());
        args.push(options.url.clone());
        args
    }
}

#[async_trait]
impl DownloadInvoker for YtDlpInvoker {
    async fn download(
        &self,
        options: &DownloadOptions,
        events: UnboundedSender<ProgressEvent>,
    ) -> Result<DownloadOutcome> {
        tracing::debug!(
            options = %serde_json::to_string(options).unwrap_or_default(),
            "starting extractor"
        );

        let mut child = Command::new(&self.program)
            .args(self.command_args(options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| InvokerError::Launch {
                program: self.program.display().to_string(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| InvokerError::Failed("extractor stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| InvokerError::Failed("extractor stderr unavailable".to_string()))?;

        let read_stdout = async {
            let mut files = Vec::new();
            let mut lines = BufReader::new(stdout).split(b'\n');
            while let Some(line) = next_line(&mut lines).await? {
                if let Some(event) = parse_progress_line(&line) {
                    // the receiver only goes away if the batch was dropped
                    let _ = events.send(event);
                } else if let Some(path) = line.trim().strip_prefix(FILE_PREFIX) {
                    files.push(PathBuf::from(path));
                } else {
                    tracing::trace!(line = %line, "extractor stdout");
                }
            }
            Ok::<_, std::io::Error>(files)
        };

        let read_stderr = async {
            let mut last_error = None;
            let mut last_line = None;
            let mut lines = BufReader::new(stderr).split(b'\n');
            while let Some(line) = next_line(&mut lines).await? {
                tracing::debug!(line = %line, "extractor stderr");
                if let Some(error) = line.strip_prefix("ERROR:") {
                    last_error = Some(error.trim().to_string());
                } else if !line.trim().is_empty() {
                    last_line = Some(line.trim().to_string());
                }
            }
            Ok::<_, std::io::Error>(last_error.or(last_line))
        };

        let (files, diagnostic) = tokio::try_join!(read_stdout, read_stderr)?;
        let status = child.wait().await?;

        if status.success() {
            Ok(DownloadOutcome { files })
        } else {
            Err(InvokerError::Failed(diagnostic.unwrap_or_else(|| {
                format!("{} exited with {}", self.program.display(), status)
            })))
        }
    }
}
