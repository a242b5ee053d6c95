use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::{
    channel::mpsc::{self, UnboundedSender},
    future::join_all,
    stream::{self, BoxStream},
    StreamExt,
};

use crate::{
    application::progress_relay,
    config::{AppConfig, AudioSettings, ExecutionPolicy},
    domain::{AppError, BatchResult, DownloadProgress, DownloadRequest, ProgressEvent},
    utils::parse_urls,
    ytdlp::{DownloadInvoker, DownloadOptions},
};

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Progress(DownloadProgress),
    /// Always the last event of a batch.
    Finished(Result<BatchResult, AppError>),
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    invoker: Arc<dyn DownloadInvoker>,
    policy: ExecutionPolicy,
    audio: AudioSettings,
}

impl DownloadCoordinator {
    pub fn new(invoker: Arc<dyn DownloadInvoker>, config: &AppConfig) -> Self {
        Self {
            invoker,
            policy: config.execution,
            audio: config.audio.clone(),
        }
    }

    /// Turns the pasted text into one request per unique URL.
    fn prepare(
        &self,
        raw_input: &str,
        audio_only: bool,
        destination_dir: &Path,
    ) -> Result<Vec<DownloadRequest>, AppError> {
        let urls = parse_urls(raw_input);
        if urls.is_empty() {
            return Err(AppError::InvalidInput);
        }

        Ok(urls
            .into_iter()
            .map(|url| DownloadRequest {
                url,
                audio_only,
                destination_dir: destination_dir.to_path_buf(),
            })
            .collect())
    }

    pub async fn run_batch(
        &self,
        raw_input: &str,
        audio_only: bool,
        destination_dir: &Path,
        observer: &UnboundedSender<BatchEvent>,
    ) -> Result<BatchResult, AppError> {
        let requests = self.prepare(raw_input, audio_only, destination_dir)?;
        Ok(self.execute(requests, observer).await)
    }

    /// Downloads every request under the configured policy. A failing URL is
    /// recorded and never stops the others.
    pub async fn execute(
        &self,
        requests: Vec<DownloadRequest>,
        observer: &UnboundedSender<BatchEvent>,
    ) -> BatchResult {
        tracing::info!(count = requests.len(), policy = ?self.policy, "starting batch");

        for request in &requests {
            emit(observer, &DownloadProgress::pending(&request.url));
        }

        let items = match self.policy {
            ExecutionPolicy::Sequential => {
                let mut items = Vec::with_capacity(requests.len());
                for request in requests {
                    items.push(self.download_one(request, observer).await);
                }
                items
            }
            ExecutionPolicy::Concurrent => {
                join_all(
                    requests
                        .into_iter()
                        .map(|request| self.download_one(request, observer)),
                )
                .await
            }
        };

        let result = BatchResult { items };
        tracing::info!(
            completed = result.completed(),
            failed = result.failed(),
            "batch finished"
        );
        result
    }

    /// Runs [`Self::run_batch`] on the tokio runtime and streams its progress.
    /// The stream ends right after the `Finished` event.
    pub fn download_stream(
        &self,
        raw_input: String,
        audio_only: bool,
        destination_dir: PathBuf,
    ) -> BoxStream<'static, BatchEvent> {
        let (tx, rx) = mpsc::unbounded();
        let coordinator = self.clone();

        // spawned on first poll, so the caller needs no runtime of its own
        let start = async move {
            tokio::spawn(async move {
                let progress_tx = tx.clone();
                let outcome = tokio::spawn(async move {
                    coordinator
                        .run_batch(&raw_input, audio_only, &destination_dir, &progress_tx)
                        .await
                })
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "batch task aborted");
                    AppError::BatchFailure(e.to_string())
                })
                .and_then(|outcome| outcome);

                let _ = tx.unbounded_send(BatchEvent::Finished(outcome));
            });
            rx
        };

        stream::once(start).flatten().boxed()
    }

    async fn download_one(
        &self,
        request: DownloadRequest,
        observer: &UnboundedSender<BatchEvent>,
    ) -> DownloadProgress {
        let options = DownloadOptions::for_request(&request, &self.audio);
        let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();

        let mut progress = progress_relay::started(&DownloadProgress::pending(&request.url));
        emit(observer, &progress);

        let mut download = self.invoker.download(&options, events_tx);
        let outcome = loop {
            tokio::select! {
                biased;
                Some(event) = events_rx.recv() => {
                    progress = relay(&progress, &event, observer);
                }
                outcome = &mut download => break outcome,
            }
        };

        // events sent right before the download returned
        while let Ok(event) = events_rx.try_recv() {
            progress = relay(&progress, &event, observer);
        }

        progress = match outcome {
            Ok(outcome) => {
                tracing::info!(url = %request.url, files = ?outcome.files, "download completed");
                progress_relay::completed(&progress)
            }
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "download failed");
                let failure = AppError::DownloadFailure {
                    url: request.url.clone(),
                    reason: e.to_string(),
                };
                progress_relay::failed(&progress, &failure)
            }
        };

        emit(observer, &progress);
        progress
    }
}

fn relay(
    current: &DownloadProgress,
    event: &ProgressEvent,
    observer: &UnboundedSender<BatchEvent>,
) -> DownloadProgress {
    let next = progress_relay::on_library_event(current, event);
    if next != *current {
        emit(observer, &next);
    }
    next
}

fn emit(observer: &UnboundedSender<BatchEvent>, progress: &DownloadProgress) {
    // nobody listening is fine, the batch still runs to the end
    let _ = observer.unbounded_send(BatchEvent::Progress(progress.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DownloadPhase;
    use crate::ytdlp::client::{self, InvokerError};
    use crate::ytdlp::models::DownloadOutcome;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Script {
        events: Vec<ProgressEvent>,
        failure: Option<String>,
    }

    #[derive(Default)]
    struct ScriptedInvoker {
        scripts: HashMap<String, Script>,
        calls: Mutex<Vec<DownloadOptions>>,
    }

    impl ScriptedInvoker {
        fn with(mut self, url: &str, script: Script) -> Self {
            self.scripts.insert(url.to_string(), script);
            self
        }

        fn called_urls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|options| options.url.clone())
                .collect()
        }
    }

    #[async_trait]
    impl DownloadInvoker for ScriptedInvoker {
        async fn download(
            &self,
            options: &DownloadOptions,
            events: tokio::sync::mpsc::UnboundedSender<ProgressEvent>,
        ) -> client::Result<DownloadOutcome> {
            self.calls.lock().unwrap().push(options.clone());
            let script = self.scripts.get(&options.url).cloned().unwrap_or_default();

            for event in script.events {
                let _ = events.send(event);
                tokio::task::yield_now().await;
            }

            match script.failure {
                Some(reason) => Err(InvokerError::Failed(reason)),
                None => Ok(DownloadOutcome::default()),
            }
        }
    }

    fn healthy() -> Script {
        Script {
            events: vec![
                ProgressEvent::downloading(0, Some(100)),
                ProgressEvent::downloading(60, Some(100)),
                ProgressEvent::downloading(80, Some(0)),
                ProgressEvent::downloading(100, Some(100)),
                ProgressEvent::finished(),
            ],
            failure: None,
        }
    }

    /// Video then audio stream, as yt-dlp reports a merged format.
    fn merged() -> Script {
        Script {
            events: vec![
                ProgressEvent::downloading(50, Some(100)),
                ProgressEvent::downloading(100, Some(100)),
                ProgressEvent::finished(),
                ProgressEvent::downloading(5, Some(100)),
                ProgressEvent::downloading(100, Some(100)),
                ProgressEvent::finished(),
            ],
            failure: None,
        }
    }

    fn broken(reason: &str) -> Script {
        Script {
            events: vec![ProgressEvent::downloading(10, Some(100))],
            failure: Some(reason.to_string()),
        }
    }

    fn coordinator(invoker: Arc<ScriptedInvoker>, policy: ExecutionPolicy) -> DownloadCoordinator {
        let config = AppConfig {
            execution: policy,
            ..Default::default()
        };
        DownloadCoordinator::new(invoker, &config)
    }

    fn drain(mut rx: mpsc::UnboundedReceiver<BatchEvent>) -> Vec<DownloadProgress> {
        let mut progress = Vec::new();
        while let Ok(Some(event)) = rx.try_next() {
            if let BatchEvent::Progress(p) = event {
                progress.push(p);
            }
        }
        progress
    }

    #[tokio::test]
    async fn test_two_urls_complete() {
        let invoker = Arc::new(
            ScriptedInvoker::default()
                .with("https://x/1", healthy())
                .with("https://x/2", healthy()),
        );
        let coordinator = coordinator(invoker.clone(), ExecutionPolicy::Concurrent);
        let (tx, _rx) = mpsc::unbounded();

        let result = coordinator
            .run_batch("https://x/1\nhttps://x/2", true, Path::new("/music"), &tx)
            .await
            .unwrap();

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.completed(), 2);
        assert!(result.any_completed());
        assert_eq!(result.summary(), "All downloads completed!");

        let calls = invoker.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|options| options.format == "bestaudio/best"));
        assert!(calls
            .iter()
            .all(|options| options.outtmpl.starts_with("/music")));
    }

    #[tokio::test]
    async fn test_whitespace_input_is_rejected() {
        let invoker = Arc::new(ScriptedInvoker::default());
        let coordinator = coordinator(invoker.clone(), ExecutionPolicy::Concurrent);
        let (tx, rx) = mpsc::unbounded();

        let result = coordinator
            .run_batch("   ", false, Path::new("/videos"), &tx)
            .await;

        assert_eq!(result, Err(AppError::InvalidInput));
        assert_eq!(
            AppError::InvalidInput.to_string(),
            "Please enter at least one valid URL"
        );
        assert!(invoker.called_urls().is_empty());
        drop(tx);
        assert!(drain(rx).is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_urls_produce_one_record() {
        let invoker = Arc::new(ScriptedInvoker::default());
        let coordinator = coordinator(invoker.clone(), ExecutionPolicy::Concurrent);
        let (tx, _rx) = mpsc::unbounded();

        let result = coordinator
            .run_batch("https://x/1\nhttps://x/1\n", false, Path::new("/v"), &tx)
            .await
            .unwrap();

        assert_eq!(result.items.len(), 1);
        assert_eq!(invoker.called_urls(), vec!["https://x/1"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_other_urls() {
        for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::Concurrent] {
            let invoker = Arc::new(
                ScriptedInvoker::default()
                    .with("https://x/a", broken("Unsupported URL"))
                    .with("https://x/b", healthy()),
            );
            let coordinator = coordinator(invoker, policy);
            let (tx, _rx) = mpsc::unbounded();

            let result = coordinator
                .run_batch("https://x/a https://x/b", true, Path::new("/m"), &tx)
                .await
                .unwrap();

            assert_eq!(result.items[0].phase, DownloadPhase::Failed);
            assert_eq!(
                result.items[0].message,
                "Error with https://x/a: Unsupported URL"
            );
            assert_eq!(result.items[1].phase, DownloadPhase::Completed);
        }
    }

    #[tokio::test]
    async fn test_sequential_keeps_input_order() {
        let invoker = Arc::new(ScriptedInvoker::default());
        let coordinator = coordinator(invoker.clone(), ExecutionPolicy::Sequential);
        let (tx, _rx) = mpsc::unbounded();

        coordinator
            .run_batch("https://x/3\nhttps://x/1\nhttps://x/2", false, Path::new("/v"), &tx)
            .await
            .unwrap();

        assert_eq!(
            invoker.called_urls(),
            vec!["https://x/3", "https://x/1", "https://x/2"]
        );
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_per_url() {
        let invoker = Arc::new(
            ScriptedInvoker::default()
                .with("https://x/1", healthy())
                .with("https://x/2", merged()),
        );
        let coordinator = coordinator(invoker, ExecutionPolicy::Concurrent);
        let (tx, rx) = mpsc::unbounded();

        coordinator
            .run_batch("https://x/1\nhttps://x/2", false, Path::new("/v"), &tx)
            .await
            .unwrap();
        drop(tx);

        let mut last: HashMap<String, f32> = HashMap::new();
        for progress in drain(rx)
            .into_iter()
            .filter(|p| p.phase == DownloadPhase::Downloading)
        {
            let previous = last.entry(progress.url.clone()).or_insert(0.0);
            assert!(progress.fraction_complete >= *previous);
            *previous = progress.fraction_complete;
        }
        assert_eq!(last.len(), 2);
        assert!(last.values().all(|fraction| *fraction == 1.0));
    }

    #[tokio::test]
    async fn test_stream_ends_with_finished() {
        let invoker = Arc::new(
            ScriptedInvoker::default()
                .with("https://x/1", healthy())
                .with("https://x/2", broken("HTTP Error 403: Forbidden")),
        );
        let coordinator = coordinator(invoker, ExecutionPolicy::Concurrent);

        let events: Vec<BatchEvent> = coordinator
            .download_stream("https://x/1\nhttps://x/2".to_string(), true, PathBuf::from("/m"))
            .collect()
            .await;

        let (last, progress) = events.split_last().unwrap();
        let result = match last {
            BatchEvent::Finished(Ok(result)) => result,
            other => panic!("unexpected final event: {:?}", other),
        };
        assert_eq!(result.completed(), 1);
        assert_eq!(result.failed(), 1);
        assert!(progress
            .iter()
            .all(|event| matches!(event, BatchEvent::Progress(_))));
    }

    #[tokio::test]
    async fn test_stream_reports_invalid_input() {
        let invoker = Arc::new(ScriptedInvoker::default());
        let coordinator = coordinator(invoker.clone(), ExecutionPolicy::Concurrent);

        let events: Vec<BatchEvent> = coordinator
            .download_stream(" \n ".to_string(), false, PathBuf::from("/v"))
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            BatchEvent::Finished(Err(AppError::InvalidInput))
        ));
        assert!(invoker.called_urls().is_empty());
    }
}
