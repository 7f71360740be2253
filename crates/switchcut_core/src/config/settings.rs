//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Media tool and encoding settings.
    #[serde(default)]
    pub encoding: EncodingSettings,

    /// Pipeline execution settings.
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Path configuration for temp and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder under which each run creates its private workspace.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for per-run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_temp_root() -> String {
    ".switchcut/tmp".to_string()
}

fn default_logs_folder() -> String {
    ".switchcut/logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Media tool and codec configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// ffmpeg executable (name on PATH or absolute path).
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Frame rate used when the request does not specify one.
    #[serde(default = "default_fps")]
    pub default_fps: f64,

    /// Video codec for trimmed clips.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Pixel format for trimmed clips.
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Audio codec of the final output.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Video codec at the mux step ("copy" keeps the concatenated stream).
    #[serde(default = "default_mux_video_codec")]
    pub mux_video_codec: String,

    /// Container extension for clips and output.
    #[serde(default = "default_container_extension")]
    pub container_extension: String,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_fps() -> f64 {
    24.0
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_pixel_format() -> String {
    "yuv420p".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_mux_video_codec() -> String {
    "copy".to_string()
}

fn default_container_extension() -> String {
    "mp4".to_string()
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            default_fps: default_fps(),
            video_codec: default_video_codec(),
            pixel_format: default_pixel_format(),
            audio_codec: default_audio_codec(),
            mux_video_codec: default_mux_video_codec(),
            container_extension: default_container_extension(),
        }
    }
}

impl EncodingSettings {
    /// MIME type of the delivered container.
    pub fn content_type(&self) -> &'static str {
        match self.container_extension.as_str() {
            "mp4" | "m4v" => "video/mp4",
            "mov" => "video/quicktime",
            "mkv" => "video/x-matroska",
            "webm" => "video/webm",
            _ => "application/octet-stream",
        }
    }
}

/// Pipeline execution configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Segments trimmed concurrently (1 = sequential).
    #[serde(default = "default_max_parallel_trims")]
    pub max_parallel_trims: usize,

    /// Deadline for a whole run in seconds (unset = no deadline).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,

    /// How often running tools are checked for cancellation.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_max_parallel_trims() -> usize {
    1
}

fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_parallel_trims: default_max_parallel_trims(),
            deadline_secs: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines to show on error.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Write a log file per run into the logs folder.
    #[serde(default)]
    pub write_run_logs: bool,

    /// Log every media tool command line.
    #[serde(default = "default_true")]
    pub show_commands: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            write_run_logs: false,
            show_commands: true,
        }
    }
}

/// Config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Encoding,
    Pipeline,
    Logging,
}

impl ConfigSection {
    /// TOML table name of this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Encoding => "encoding",
            ConfigSection::Pipeline => "pipeline",
            ConfigSection::Logging => "logging",
        }
    }

    /// All sections in file order.
    pub fn all() -> [ConfigSection; 4] {
        [
            ConfigSection::Paths,
            ConfigSection::Encoding,
            ConfigSection::Pipeline,
            ConfigSection::Logging,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.encoding.default_fps, 24.0);
        assert_eq!(settings.pipeline.max_parallel_trims, 1);
        assert!(settings.pipeline.deadline_secs.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let settings: Settings =
            toml::from_str("[encoding]\naudio_codec = \"libopus\"\n").unwrap();
        assert_eq!(settings.encoding.audio_codec, "libopus");
        assert_eq!(settings.encoding.video_codec, "libx264");
    }

    #[test]
    fn content_type_follows_container() {
        let mut encoding = EncodingSettings::default();
        assert_eq!(encoding.content_type(), "video/mp4");
        encoding.container_extension = "mkv".to_string();
        assert_eq!(encoding.content_type(), "video/x-matroska");
    }

    #[test]
    fn section_table_names_are_unique() {
        let names: Vec<&str> = ConfigSection::all().iter().map(|s| s.table_name()).collect();
        assert_eq!(names, vec!["paths", "encoding", "pipeline", "logging"]);
    }
}
