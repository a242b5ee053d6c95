use std::path::PathBuf;

/// How the URLs of one batch are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    /// One download at a time, in input order.
    Sequential,
    /// Every download runs at once; the batch ends when the last one does.
    #[default]
    Concurrent,
}

/// What "audio only" asks of the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioStrategy {
    /// Always transcode the best audio stream with ffmpeg.
    #[default]
    Transcode,
    /// Pick an already playable audio stream (m4a) when the site offers one, no ffmpeg pass.
    PreferCompatible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSettings {
    pub strategy: AudioStrategy,
    pub codec: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            strategy: AudioStrategy::default(),
            codec: "mp3".to_string(),
        }
    }
}

/// Application configuration. Nothing is persisted; each launch starts from
/// the defaults plus any `MAGIC_*` environment overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ytdlp_program: PathBuf,
    pub ffmpeg_location: Option<PathBuf>,
    pub execution: ExecutionPolicy,
    pub audio: AudioSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ytdlp_program: PathBuf::from("yt-dlp"),
            ffmpeg_location: None,
            execution: ExecutionPolicy::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(program) = lookup("MAGIC_YTDLP").filter(|v| !v.trim().is_empty()) {
            config.ytdlp_program = PathBuf::from(program);
        }

        if let Some(ffmpeg) = lookup("MAGIC_FFMPEG").filter(|v| !v.trim().is_empty()) {
            config.ffmpeg_location = Some(PathBuf::from(ffmpeg));
        }

        if let Some(execution) = lookup("MAGIC_EXECUTION") {
            match execution.trim().to_ascii_lowercase().as_str() {
                "sequential" => config.execution = ExecutionPolicy::Sequential,
                "concurrent" => config.execution = ExecutionPolicy::Concurrent,
                other => tracing::warn!(value = other, "unknown MAGIC_EXECUTION, using default"),
            }
        }

        if let Some(strategy) = lookup("MAGIC_AUDIO_STRATEGY") {
            match strategy.trim().to_ascii_lowercase().as_str() {
                "transcode" => config.audio.strategy = AudioStrategy::Transcode,
                "compatible" => config.audio.strategy = AudioStrategy::PreferCompatible,
                other => tracing::warn!(value = other, "unknown MAGIC_AUDIO_STRATEGY, using default"),
            }
        }

        if let Some(codec) = lookup("MAGIC_AUDIO_CODEC").filter(|v| !v.trim().is_empty()) {
            config.audio.codec = codec.trim().to_string();
        }

        config
    }
}
