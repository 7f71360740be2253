//! `switchcut` CLI - stitch recorded takes against one audio track

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};

use switchcut_core::config::ConfigManager;
use switchcut_core::logging::{init_tracing, init_tracing_with_file, LogLevel};
use switchcut_core::{
    RenderMetadata, RenderRequest, RunOptions, Stitcher, TakeFileMap, TakeId, UploadedMedia,
};

#[derive(Parser)]
#[command(name = "switchcut")]
#[command(about = "Stitch multiple video takes into one video using switch points")]
#[command(version)]
struct Cli {
    /// Settings file (created with defaults if missing)
    #[arg(long, global = true, default_value = ".switchcut/settings.toml")]
    config: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the stitched video
    Render {
        #[command(flatten)]
        input: InputArgs,

        /// Upload-style field mapping, e.g. video_1=cam1.mp4 or audio=mix.wav
        #[arg(long = "upload", value_name = "FIELD=PATH", conflicts_with_all = ["takes", "audio"])]
        uploads: Vec<String>,

        /// Audio track
        #[arg(long, value_name = "PATH", required_unless_present = "uploads")]
        audio: Option<PathBuf>,

        /// Output file
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,

        /// Fail the run after this many seconds
        #[arg(long, value_name = "SECS")]
        deadline: Option<u64>,

        /// Segments trimmed concurrently
        #[arg(long, value_name = "N")]
        parallel: Option<usize>,
    },

    /// Print the segment plan as JSON without rendering
    Plan {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Metadata JSON file, or inline JSON starting with '{'
    #[arg(short, long, value_name = "JSON")]
    metadata: String,

    /// Take media, e.g. 1=cam1.mp4 (repeatable)
    #[arg(short, long = "take", value_name = "ID=PATH")]
    takes: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let _guard = if config.settings().logging.write_run_logs {
        config.ensure_dirs_exist()?;
        Some(init_tracing_with_file(level, &config.logs_folder()))
    } else {
        init_tracing(level);
        None
    };

    match cli.command {
        Commands::Render {
            input,
            uploads,
            audio,
            output,
            deadline,
            parallel,
        } => {
            let mut settings = config.into_settings();
            if let Some(parallel) = parallel {
                settings.pipeline.max_parallel_trims = parallel.max(1);
            }
            let metadata = load_metadata(&input.metadata)?;
            let request = if uploads.is_empty() {
                let audio = audio.context("--audio is required")?;
                RenderRequest::new(metadata, parse_takes(&input.takes)?, audio)
            } else {
                RenderRequest::from_upload(metadata, parse_uploads(&uploads)?)
            };
            cmd_render(Stitcher::with_ffmpeg(settings), request, &output, deadline)?;
        }
        Commands::Plan { input } => {
            let stitcher = Stitcher::with_ffmpeg(config.into_settings());
            let metadata = load_metadata(&input.metadata)?;
            let plan = stitcher.plan(&metadata, &parse_takes(&input.takes)?)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}

fn cmd_render(
    stitcher: Stitcher,
    request: RenderRequest,
    output: &Path,
    deadline: Option<u64>,
) -> Result<()> {
    let mut options = RunOptions::new();
    if let Some(secs) = deadline {
        options = options.with_deadline(Duration::from_secs(secs));
    }

    let report = stitcher.render_to_path(request, output, options)?;
    tracing::info!(
        run_id = %report.run_id,
        "Wrote {} bytes ({}) to {}",
        report.bytes_written,
        report.content_type,
        output.display()
    );
    Ok(())
}

fn load_metadata(arg: &str) -> Result<RenderMetadata> {
    let json = if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        fs::read_to_string(arg).with_context(|| format!("reading metadata file {}", arg))?
    };
    Ok(RenderMetadata::from_json(&json)?)
}

/// Split `KEY=VALUE`, rejecting an empty key or value.
fn split_pair(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => Ok((key, value)),
        _ => bail!("expected KEY=PATH, got '{}'", arg),
    }
}

fn parse_takes(args: &[String]) -> Result<TakeFileMap> {
    let mut pairs = Vec::with_capacity(args.len());
    for arg in args {
        let (id, path) = split_pair(arg)?;
        pairs.push((TakeId::new(id), PathBuf::from(path)));
    }
    Ok(TakeFileMap::from_pairs(pairs)?)
}

fn parse_uploads(args: &[String]) -> Result<UploadedMedia> {
    let mut fields = Vec::with_capacity(args.len());
    for arg in args {
        let (field, path) = split_pair(arg)?;
        fields.push((field.to_string(), PathBuf::from(path)));
    }
    Ok(UploadedMedia::from_fields(fields)?)
}
