pub mod state;

use iced::{
    widget::{button, column, container, progress_bar, row, text, text_editor, toggler, Column, Space},
    Alignment, Element, Length,
};

use crate::application::PlatformInfo;
use crate::domain::DownloadProgress;
pub use state::SessionState;

const CONTENT_WIDTH: f32 = 400.0;

/// Main view state
pub struct DownloadView {
    pub urls: text_editor::Content,
    pub state: SessionState,
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlsEdited(text_editor::Action),
    AudioOnlyToggled(bool),
    PickDirectoryPressed,
    DownloadPressed,
    OpenFolderPressed,
}

impl DownloadView {
    pub fn new(platform: PlatformInfo) -> Self {
        Self {
            urls: text_editor::Content::new(),
            state: SessionState::new(platform),
        }
    }

    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlsEdited(action) => {
                self.urls.perform(action);
            }
            DownloadMessage::AudioOnlyToggled(audio_only) => {
                self.state.set_audio_only(audio_only);
            }
            DownloadMessage::PickDirectoryPressed
            | DownloadMessage::DownloadPressed
            | DownloadMessage::OpenFolderPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let urls_input = container(
            text_editor(&self.urls)
                .placeholder("YouTube URL (one per line)")
                .on_action(DownloadMessage::UrlsEdited)
                .height(Length::Fixed(110.0)),
        )
        .width(Length::Fixed(CONTENT_WIDTH));

        let directory_row = row![
            button(text("Select folder").size(14))
                .on_press(DownloadMessage::PickDirectoryPressed)
                .padding([6, 12]),
            text(self.state.path_label()).size(12),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let progress_rows = Column::with_children(
            self.state
                .board
                .entries()
                .iter()
                .map(progress_row),
        )
        .spacing(10)
        .align_x(Alignment::Center);

        let download_button = button(text("Download"))
            .on_press_maybe((!self.state.is_downloading).then_some(DownloadMessage::DownloadPressed))
            .padding([10, 20]);

        let mut actions = column![download_button, text(&self.state.status_message).size(14)]
            .spacing(10)
            .align_x(Alignment::Center);

        if self.state.show_open_folder {
            actions = actions.push(
                button(text("Open Downloads Folder"))
                    .on_press(DownloadMessage::OpenFolderPressed)
                    .padding([10, 20]),
            );
        }

        let content = column![
            text("MAGIC").size(30),
            urls_input,
            toggler(self.state.audio_only)
                .label("Audio only")
                .on_toggle(DownloadMessage::AudioOnlyToggled),
            directory_row,
            progress_rows,
            Space::new().height(Length::Fixed(10.0)),
            actions,
        ]
        .padding(20)
        .spacing(20)
        .align_x(Alignment::Center);

        container(content).center_x(Length::Fill).into()
    }
}

fn progress_row(progress: &DownloadProgress) -> Element<'_, DownloadMessage> {
    column![
        text(&progress.message).size(13),
        container(progress_bar(0.0..=1.0, progress.fraction_complete))
            .width(Length::Fixed(CONTENT_WIDTH)),
    ]
    .spacing(5)
    .align_x(Alignment::Center)
    .into()
}
