//! Caller-supplied render inputs: metadata, take files and audio.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::take::TakeId;
use super::timeline::SwitchPoint;
use crate::orchestrator::{StitchError, StitchResult};

/// Upload field name carrying the audio track.
pub const AUDIO_FIELD: &str = "audio";

/// Render metadata document as sent by the transport shell.
///
/// ```json
/// { "switchPoints": [{"time": 0, "takeIndex": 1}], "fps": 24, "duration": 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderMetadata {
    /// Unordered switch events.
    pub switch_points: Vec<SwitchPoint>,
    /// Output frame rate; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Total output length in seconds.
    pub duration: f64,
}

impl RenderMetadata {
    pub fn new(switch_points: Vec<SwitchPoint>, duration: f64) -> Self {
        Self {
            switch_points,
            fps: None,
            duration,
        }
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Parse the JSON metadata document.
    pub fn from_json(json: &str) -> StitchResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StitchError::validation(format!("invalid metadata: {}", e)))
    }

    /// Frame rate to render at, falling back to `default_fps`.
    pub fn fps_or(&self, default_fps: f64) -> f64 {
        self.fps.unwrap_or(default_fps)
    }
}

/// Mapping from take to its media file.
///
/// Entries are never overwritten: inserting a take twice is rejected so a
/// duplicate upload cannot silently replace the first file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeFileMap {
    files: BTreeMap<TakeId, PathBuf>,
}

impl TakeFileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (take, path) pairs, rejecting duplicate takes.
    pub fn from_pairs<I, P>(pairs: I) -> StitchResult<Self>
    where
        I: IntoIterator<Item = (TakeId, P)>,
        P: Into<PathBuf>,
    {
        let mut map = Self::new();
        for (take, path) in pairs {
            map.insert(take, path)?;
        }
        Ok(map)
    }

    /// Register the media file for a take.
    pub fn insert(&mut self, take: TakeId, path: impl Into<PathBuf>) -> StitchResult<()> {
        if self.files.contains_key(&take) {
            return Err(StitchError::validation(format!(
                "duplicate media for take {} ({})",
                take,
                take.field_name()
            )));
        }
        self.files.insert(take, path.into());
        Ok(())
    }

    pub fn get(&self, take: &TakeId) -> Option<&Path> {
        self.files.get(take).map(PathBuf::as_path)
    }

    pub fn contains(&self, take: &TakeId) -> bool {
        self.files.contains_key(take)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TakeId, &Path)> {
        self.files.iter().map(|(k, v)| (k, v.as_path()))
    }
}

/// Media resolved from named upload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub takes: TakeFileMap,
    pub audio: PathBuf,
}

impl UploadedMedia {
    /// Resolve `(field_name, path)` pairs from a multipart-style upload.
    ///
    /// `video_N` fields become take `N`, the `audio` field is the audio
    /// track, anything else is ignored. A repeated field is rejected and a
    /// missing audio field is a validation error.
    pub fn from_fields<I, S, P>(fields: I) -> StitchResult<Self>
    where
        I: IntoIterator<Item = (S, P)>,
        S: AsRef<str>,
        P: Into<PathBuf>,
    {
        let mut takes = TakeFileMap::new();
        let mut audio: Option<PathBuf> = None;

        for (field, path) in fields {
            let field = field.as_ref();
            if let Some(take) = TakeId::from_field_name(field) {
                takes.insert(take, path)?;
            } else if field == AUDIO_FIELD {
                if audio.is_some() {
                    return Err(StitchError::validation("duplicate audio upload"));
                }
                audio = Some(path.into());
            } else {
                tracing::debug!("Ignoring unrecognized upload field '{}'", field);
            }
        }

        let audio = audio.ok_or_else(|| StitchError::validation("audio file missing"))?;
        Ok(Self { takes, audio })
    }
}

/// Everything the pipeline needs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub metadata: RenderMetadata,
    pub takes: TakeFileMap,
    pub audio: PathBuf,
}

impl RenderRequest {
    pub fn new(metadata: RenderMetadata, takes: TakeFileMap, audio: impl Into<PathBuf>) -> Self {
        Self {
            metadata,
            takes,
            audio: audio.into(),
        }
    }

    /// Build from metadata plus uploaded media.
    pub fn from_upload(metadata: RenderMetadata, media: UploadedMedia) -> Self {
        Self::new(metadata, media.takes, media.audio)
    }
}
