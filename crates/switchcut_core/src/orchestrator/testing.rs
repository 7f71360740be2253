//! Test fixtures: a scripted media runner and context builders.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use super::interrupt::Interrupt;
use super::types::Context;
use super::workspace::WorkspaceLayout;
use crate::config::Settings;
use crate::logging::{LogConfig, RunLogger};
use crate::media::{ConcatJob, MediaToolRunner, MuxJob, ToolError, ToolOutput, ToolResult, TrimJob};
use crate::models::{RenderMetadata, RenderRequest, SwitchPoint, TakeFileMap, TakeId};

type TrimHook = Box<dyn Fn(usize) + Send + Sync>;

/// Media runner that writes small deterministic files instead of
/// calling ffmpeg.
///
/// Clips contain a description of their trim job, concat appends clips in
/// list order and mux appends the audio bytes to the video.
#[derive(Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<String>>,
    failing_trims: HashSet<usize>,
    fail_concat: bool,
    fail_mux: bool,
    trim_hook: Option<TrimHook>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_trim(mut self, segment_index: usize) -> Self {
        self.failing_trims.insert(segment_index);
        self
    }

    pub fn failing_concat(mut self) -> Self {
        self.fail_concat = true;
        self
    }

    pub fn failing_mux(mut self) -> Self {
        self.fail_mux = true;
        self
    }

    /// Run `hook` at the start of every trim, before the interrupt check.
    pub fn with_trim_hook(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.trim_hook = Some(Box::new(hook));
        self
    }

    /// Calls made so far, e.g. `trim:0`, `concat`, `mux`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn trim_calls(&self) -> Vec<usize> {
        self.calls()
            .iter()
            .filter_map(|c| c.strip_prefix("trim:"))
            .filter_map(|i| i.parse().ok())
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl MediaToolRunner for ScriptedRunner {
    fn name(&self) -> &str {
        "scripted"
    }

    fn trim(&self, job: &TrimJob, interrupt: &Interrupt) -> ToolResult<ToolOutput> {
        self.record(format!("trim:{}", job.segment_index));
        if let Some(ref hook) = self.trim_hook {
            hook(job.segment_index);
        }
        if let Some(reason) = interrupt.reason() {
            return Err(ToolError::interrupted("scripted", reason));
        }
        if self.failing_trims.contains(&job.segment_index) {
            return Err(ToolError::exit("scripted", Some(1), "Invalid data found when processing input"));
        }

        let body = format!(
            "clip {} {} {:.3}+{:.3}@{}\n",
            job.segment_index,
            job.source.display(),
            job.start,
            job.length,
            job.fps
        );
        fs::write(&job.output, body).map_err(|e| ToolError::io("writing clip", e))?;
        Ok(ToolOutput::new(format!("trim {}", job.segment_index)))
    }

    fn concat(&self, job: &ConcatJob, interrupt: &Interrupt) -> ToolResult<ToolOutput> {
        self.record("concat".to_string());
        if let Some(reason) = interrupt.reason() {
            return Err(ToolError::interrupted("scripted", reason));
        }
        if self.fail_concat {
            return Err(ToolError::exit("scripted", Some(1), "concat failed"));
        }

        let mut joined = Vec::new();
        for clip in &job.clips {
            joined.extend(fs::read(clip).map_err(|e| ToolError::io("reading clip", e))?);
        }
        fs::write(&job.output, joined).map_err(|e| ToolError::io("writing concat", e))?;
        Ok(ToolOutput::new("concat"))
    }

    fn mux(&self, job: &MuxJob, interrupt: &Interrupt) -> ToolResult<ToolOutput> {
        self.record("mux".to_string());
        if let Some(reason) = interrupt.reason() {
            return Err(ToolError::interrupted("scripted", reason));
        }
        if self.fail_mux {
            return Err(ToolError::exit("scripted", Some(1), "mux failed"));
        }

        let mut out = fs::read(&job.video).map_err(|e| ToolError::io("reading video", e))?;
        out.extend(fs::read(&job.audio).map_err(|e| ToolError::io("reading audio", e))?);
        fs::write(&job.output, out).map_err(|e| ToolError::io("writing output", e))?;
        Ok(ToolOutput::new("mux"))
    }
}

/// Request with takes 1 and 2 switching at 5s of a 10s output. The take
/// and audio files are created in `dir`.
pub fn two_take_request(dir: &Path) -> RenderRequest {
    let metadata = RenderMetadata::new(
        vec![SwitchPoint::new(5.0, 2), SwitchPoint::new(0.0, 1)],
        10.0,
    );
    request_with_takes(dir, metadata, &[1, 2])
}

/// Request for `metadata` with media files created for `take_ids`.
pub fn request_with_takes(dir: &Path, metadata: RenderMetadata, take_ids: &[u64]) -> RenderRequest {
    let mut takes = TakeFileMap::new();
    for &id in take_ids {
        let path = dir.join(format!("take{}.mp4", id));
        fs::write(&path, format!("take {}", id)).unwrap();
        takes.insert(TakeId::from_index(id), path).unwrap();
    }
    let audio = dir.join("audio.wav");
    fs::write(&audio, "AUDIO").unwrap();
    RenderRequest::new(metadata, takes, audio)
}

/// Context whose workspace is `<dir>/ws` (created).
pub fn test_context<R: MediaToolRunner + 'static>(
    dir: &Path,
    request: RenderRequest,
    runner: Arc<R>,
) -> Context {
    let root = dir.join("ws");
    fs::create_dir_all(&root).unwrap();
    Context::new(
        request,
        Settings::default(),
        "test-run",
        WorkspaceLayout::new(root, "mp4"),
        Arc::new(RunLogger::new("test-run", LogConfig::default(), None)),
        runner,
        Interrupt::none(),
    )
}
