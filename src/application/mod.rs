pub mod download_coordinator;
pub mod folder_opener;
pub mod path_resolver;
pub mod progress_relay;

pub use download_coordinator::{BatchEvent, DownloadCoordinator};
pub use folder_opener::open_folder;
pub use path_resolver::{resolve_default_path, PlatformInfo};
