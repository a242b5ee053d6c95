use std::path::PathBuf;

const ANDROID_MUSIC_DIR: &str = "/storage/emulated/0/Music";
const ANDROID_MOVIES_DIR: &str = "/storage/emulated/0/Movies";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
    Android,
    Ios,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => HostOs::Windows,
            "macos" => HostOs::MacOs,
            "linux" => HostOs::Linux,
            "android" => HostOs::Android,
            "ios" => HostOs::Ios,
            _ => HostOs::Other,
        }
    }
}

/// What the path resolver knows about the machine it runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub os: HostOs,
    /// `ANDROID_STORAGE` is set, even if the build target says otherwise.
    pub android_storage: bool,
    pub home_dir: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
}

impl PlatformInfo {
    pub fn detect() -> Self {
        Self {
            os: HostOs::current(),
            android_storage: std::env::var_os("ANDROID_STORAGE").is_some(),
            home_dir: dirs::home_dir(),
            download_dir: dirs::download_dir(),
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.android_storage || self.os == HostOs::Android
    }
}

/// Default download destination. Mobile storage splits music from movies;
/// desktops use the user's download directory.
pub fn resolve_default_path(platform: &PlatformInfo, audio_only: bool) -> String {
    if platform.is_mobile() {
        let dir = if audio_only {
            ANDROID_MUSIC_DIR
        } else {
            ANDROID_MOVIES_DIR
        };
        return dir.to_string();
    }

    let path = match (&platform.download_dir, &platform.home_dir) {
        (Some(downloads), _) => downloads.clone(),
        (None, Some(home)) if platform.os != HostOs::Other => home.join("Downloads"),
        (None, Some(home)) => home.clone(),
        (None, None) => {
            tracing::warn!("could not determine a home directory, using the working directory");
            PathBuf::from(".")
        }
    };

    path.to_string_lossy().into_owned()
}
