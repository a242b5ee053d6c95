use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;
use iced::{Task, Theme};

use crate::application::{open_folder, BatchEvent, DownloadCoordinator, PlatformInfo};
use crate::config::AppConfig;
use crate::ui::{DownloadMessage, DownloadView};
use crate::ytdlp::YtDlpInvoker;

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new(AppConfig::from_env())
    }
}

impl DownloadApp {
    pub fn new(config: AppConfig) -> Self {
        tracing::info!(?config, "starting");
        let invoker = Arc::new(YtDlpInvoker::new(&config));
        let coordinator = DownloadCoordinator::new(invoker, &config);
        let view = DownloadView::new(PlatformInfo::detect());

        Self { view, coordinator }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Folder chosen in the picker, `None` when cancelled
    DirectoryPicked(Option<PathBuf>),
    Batch(BatchEvent),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::DownloadPressed => {
                    if app.view.state.is_downloading {
                        return Task::none();
                    }

                    let state = &mut app.view.state;
                    state.begin_batch();

                    // iced polls the stream on its tokio executor
                    return Task::stream(
                        app.coordinator
                            .download_stream(
                                app.view.urls.text(),
                                state.audio_only,
                                state.destination_dir.clone(),
                            )
                            .map(Message::Batch),
                    );
                }
                DownloadMessage::PickDirectoryPressed => {
                    let current = app.view.state.destination_dir.clone();

                    return Task::perform(
                        async move {
                            rfd::AsyncFileDialog::new()
                                .set_directory(&current)
                                .pick_folder()
                                .await
                                .map(|handle| handle.path().to_path_buf())
                        },
                        Message::DirectoryPicked,
                    );
                }
                DownloadMessage::OpenFolderPressed => {
                    if let Err(e) = open_folder(&app.view.state.destination_dir) {
                        tracing::warn!(error = %e, "could not open download folder");
                    }
                }
                DownloadMessage::UrlsEdited(_) | DownloadMessage::AudioOnlyToggled(_) => {}
            }
        }
        Message::DirectoryPicked(path) => {
            app.view.state.apply_picked_directory(path);
        }
        Message::Batch(BatchEvent::Progress(progress)) => {
            app.view.state.apply_progress(progress);
        }
        Message::Batch(BatchEvent::Finished(outcome)) => {
            app.view.state.finish_batch(outcome);
        }
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

pub fn theme(_app: &DownloadApp) -> Theme {
    Theme::Dark
}
