mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;
mod ytdlp;

use iced::window;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "magic_downloader=info".into());

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> iced::Result {
    init_tracing();

    iced::application(app::DownloadApp::default, app::update, app::view)
        .title("MAGIC")
        .theme(app::theme)
        .window(window::Settings {
            size: iced::Size::new(480.0, 720.0),
            ..Default::default()
        })
        .run()
}
