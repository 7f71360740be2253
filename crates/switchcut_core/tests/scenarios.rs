//! End-to-end render scenarios through the public API.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use switchcut_core::config::Settings;
use switchcut_core::media::{
    ConcatJob, MediaToolRunner, MuxJob, ToolError, ToolOutput, ToolResult, TrimJob,
};
use switchcut_core::orchestrator::Interrupt;
use switchcut_core::{
    ErrorKind, RenderMetadata, RenderRequest, RunOptions, StitchError, Stitcher, TakeFileMap,
    TakeId, UploadedMedia,
};
use tempfile::TempDir;

/// Copies inputs around like a very fast, very lossy ffmpeg.
#[derive(Default)]
struct FakeEngine {
    fail_trim_at: Option<usize>,
    trims: Mutex<Vec<usize>>,
}

impl MediaToolRunner for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn trim(&self, job: &TrimJob, interrupt: &Interrupt) -> ToolResult<ToolOutput> {
        self.trims.lock().unwrap().push(job.segment_index);
        if let Some(reason) = interrupt.reason() {
            return Err(ToolError::interrupted("fake", reason));
        }
        if self.fail_trim_at == Some(job.segment_index) {
            return Err(ToolError::exit("fake", Some(1), "Conversion failed!"));
        }
        let source = fs::read_to_string(&job.source).map_err(|e| ToolError::io("read", e))?;
        fs::write(
            &job.output,
            format!("[{}:{:.1}-{:.1}]", source, job.start, job.start + job.length),
        )
        .map_err(|e| ToolError::io("write", e))?;
        Ok(ToolOutput::new("fake trim"))
    }

    fn concat(&self, job: &ConcatJob, _interrupt: &Interrupt) -> ToolResult<ToolOutput> {
        let mut out = String::new();
        for clip in &job.clips {
            out.push_str(&fs::read_to_string(clip).map_err(|e| ToolError::io("read", e))?);
        }
        fs::write(&job.output, out).map_err(|e| ToolError::io("write", e))?;
        Ok(ToolOutput::new("fake concat"))
    }

    fn mux(&self, job: &MuxJob, _interrupt: &Interrupt) -> ToolResult<ToolOutput> {
        let video = fs::read_to_string(&job.video).map_err(|e| ToolError::io("read", e))?;
        let audio = fs::read_to_string(&job.audio).map_err(|e| ToolError::io("read", e))?;
        fs::write(&job.output, format!("{}+{}", video, audio))
            .map_err(|e| ToolError::io("write", e))?;
        Ok(ToolOutput::new("fake mux"))
    }
}

struct Env {
    dir: TempDir,
    settings: Settings,
}

impl Env {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.temp_root = dir.path().join("tmp").to_string_lossy().to_string();
        Self { dir, settings }
    }

    fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn temp_root(&self) -> &Path {
        Path::new(&self.settings.paths.temp_root)
    }

    fn leftover_temp_files(&self) -> usize {
        fs::read_dir(self.temp_root()).map(|d| d.count()).unwrap_or(0)
    }
}

fn metadata(json: &str) -> RenderMetadata {
    RenderMetadata::from_json(json).unwrap()
}

#[test]
fn scenario_a_two_takes_plan() {
    let env = Env::new();
    let takes = TakeFileMap::from_pairs([
        (TakeId::from_index(1), env.file("t1.mp4", "T1")),
        (TakeId::from_index(2), env.file("t2.mp4", "T2")),
    ])
    .unwrap();
    let stitcher = Stitcher::new(env.settings.clone(), Arc::new(FakeEngine::default()));

    let plan = stitcher
        .plan(
            &metadata(r#"{"switchPoints":[{"time":0,"takeIndex":1},{"time":5,"takeIndex":2}],"duration":10}"#),
            &takes,
        )
        .unwrap();

    let summary: Vec<(String, f64, f64)> = plan
        .iter()
        .map(|s| (s.take.to_string(), s.start_offset, s.length))
        .collect();
    assert_eq!(
        summary,
        vec![("1".to_string(), 0.0, 5.0), ("2".to_string(), 5.0, 5.0)]
    );
}

#[test]
fn scenario_a_renders_in_take_order() {
    let env = Env::new();
    let takes = TakeFileMap::from_pairs([
        (TakeId::from_index(1), env.file("t1.mp4", "T1")),
        (TakeId::from_index(2), env.file("t2.mp4", "T2")),
    ])
    .unwrap();
    let request = RenderRequest::new(
        metadata(r#"{"switchPoints":[{"time":5,"takeIndex":2},{"time":0,"takeIndex":1}],"fps":30,"duration":10}"#),
        takes,
        env.file("a.wav", "A"),
    );
    let stitcher = Stitcher::new(env.settings.clone(), Arc::new(FakeEngine::default()));

    let mut out = Vec::new();
    stitcher.render(request, &mut out, RunOptions::new()).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "[T1:0.0-5.0][T2:5.0-10.0]+A");
    assert_eq!(env.leftover_temp_files(), 0);
}

#[test]
fn scenario_b_duplicate_time_is_rejected() {
    let env = Env::new();
    let takes = TakeFileMap::from_pairs([
        (TakeId::from_index(1), env.file("t1.mp4", "T1")),
        (TakeId::from_index(2), env.file("t2.mp4", "T2")),
    ])
    .unwrap();
    let stitcher = Stitcher::new(env.settings.clone(), Arc::new(FakeEngine::default()));

    let err = stitcher
        .plan(
            &metadata(r#"{"switchPoints":[{"time":0,"takeIndex":1},{"time":0,"takeIndex":2}],"duration":10}"#),
            &takes,
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn scenario_c_missing_upload_names_the_take() {
    let env = Env::new();
    let media = UploadedMedia::from_fields([
        ("video_1", env.file("up1", "T1")),
        ("audio", env.file("up3", "A")),
    ])
    .unwrap();
    let request = RenderRequest::from_upload(
        metadata(r#"{"switchPoints":[{"time":0,"takeIndex":1},{"time":4,"takeIndex":2}],"duration":8}"#),
        media,
    );
    let engine = Arc::new(FakeEngine::default());
    let stitcher = Stitcher::new(env.settings.clone(), engine.clone());

    let err = stitcher
        .render(request, &mut Vec::new(), RunOptions::new())
        .unwrap_err();

    match &err {
        StitchError::Resolution { take } => assert_eq!(take, &TakeId::from_index(2)),
        other => panic!("expected resolution error, got {other}"),
    }
    assert!(err.to_string().contains("video_2"));
    assert!(engine.trims.lock().unwrap().is_empty());
}

#[test]
fn scenario_d_trim_failure_leaves_nothing_behind() {
    let env = Env::new();
    let takes = TakeFileMap::from_pairs([
        (TakeId::from_index(1), env.file("t1.mp4", "T1")),
        (TakeId::from_index(2), env.file("t2.mp4", "T2")),
        (TakeId::from_index(3), env.file("t3.mp4", "T3")),
    ])
    .unwrap();
    let request = RenderRequest::new(
        metadata(
            r#"{"switchPoints":[{"time":0,"takeIndex":1},{"time":3,"takeIndex":2},{"time":6,"takeIndex":3}],"duration":9}"#,
        ),
        takes,
        env.file("a.wav", "A"),
    );
    let engine = Arc::new(FakeEngine {
        fail_trim_at: Some(1),
        ..Default::default()
    });
    let stitcher = Stitcher::new(env.settings.clone(), engine.clone());

    let mut out = Vec::new();
    let err = stitcher.render(request, &mut out, RunOptions::new()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Tool);
    assert_eq!(err.segment_index(), Some(1));
    assert!(out.is_empty());
    assert_eq!(*engine.trims.lock().unwrap(), vec![0, 1]);
    assert_eq!(env.leftover_temp_files(), 0);
}

#[test]
fn switch_at_duration_is_rejected() {
    let env = Env::new();
    let takes =
        TakeFileMap::from_pairs([(TakeId::from_index(1), env.file("t1.mp4", "T1"))]).unwrap();
    let stitcher = Stitcher::new(env.settings.clone(), Arc::new(FakeEngine::default()));

    let err = stitcher
        .plan(
            &metadata(r#"{"switchPoints":[{"time":10,"takeIndex":1}],"duration":10}"#),
            &takes,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn empty_switch_points_are_rejected() {
    let env = Env::new();
    let takes =
        TakeFileMap::from_pairs([(TakeId::from_index(1), env.file("t1.mp4", "T1"))]).unwrap();
    let engine = Arc::new(FakeEngine::default());
    let stitcher = Stitcher::new(env.settings.clone(), engine.clone());

    let request = RenderRequest::new(
        metadata(r#"{"switchPoints":[],"duration":10}"#),
        takes,
        env.file("a.wav", "A"),
    );
    let mut out = Vec::new();
    let err = stitcher.render(request, &mut out, RunOptions::new()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(out.is_empty());
    assert!(engine.trims.lock().unwrap().is_empty());
    assert_eq!(env.leftover_temp_files(), 0);
}

#[test]
fn concurrent_runs_do_not_collide() {
    let env = Env::new();
    let takes = TakeFileMap::from_pairs([
        (TakeId::from_index(1), env.file("t1.mp4", "T1")),
        (TakeId::from_index(2), env.file("t2.mp4", "T2")),
    ])
    .unwrap();
    let audio = env.file("a.wav", "A");
    let stitcher = Arc::new(Stitcher::new(
        env.settings.clone(),
        Arc::new(FakeEngine::default()),
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let stitcher = Arc::clone(&stitcher);
            let request = RenderRequest::new(
                RenderMetadata::from_json(&format!(
                    r#"{{"switchPoints":[{{"time":0,"takeIndex":1}},{{"time":{},"takeIndex":2}}],"duration":10}}"#,
                    i + 1
                ))
                .unwrap(),
                takes.clone(),
                audio.clone(),
            );
            std::thread::spawn(move || {
                let mut out = Vec::new();
                stitcher.render(request, &mut out, RunOptions::new()).unwrap();
                (i, String::from_utf8(out).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (i, out) = handle.join().unwrap();
        assert_eq!(out, format!("[T1:0.0-{0}.0][T2:{0}.0-10.0]+A", i + 1));
    }
    assert_eq!(env.leftover_temp_files(), 0);
}
