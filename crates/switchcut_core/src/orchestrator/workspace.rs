//! Per-run temporary workspace.
//!
//! Every temporary artifact of a run (trimmed clips, the concat list, the
//! concatenated video, the muxed output) lives in one directory named
//! after the run id. The directory is removed on every exit path: the
//! stitcher purges it explicitly and `Drop` removes whatever is left.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory name prefix for run workspaces.
const WORKSPACE_PREFIX: &str = "switchcut-";

/// Path layout of a run workspace.
///
/// Cheap to clone and handed to every step through the `Context`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: PathBuf,
    extension: String,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Trimmed clip for segment `index`.
    pub fn clip_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("seg_{:04}.{}", index, self.extension))
    }

    /// Concat demuxer list file.
    pub fn concat_list_path(&self) -> PathBuf {
        self.root.join("concat.txt")
    }

    /// Silent concatenated video.
    pub fn concat_output_path(&self) -> PathBuf {
        self.root.join(format!("concat.{}", self.extension))
    }

    /// Final muxed output before delivery.
    pub fn output_path(&self) -> PathBuf {
        self.root.join(format!("output.{}", self.extension))
    }
}

/// Owns a run's workspace directory and removes it when done.
#[derive(Debug)]
pub struct RunWorkspace {
    layout: WorkspaceLayout,
    purged: bool,
}

impl RunWorkspace {
    /// Create the workspace for `run_id` under `temp_root`.
    ///
    /// The run directory itself must not exist yet, so two runs can never
    /// share one.
    pub fn create(temp_root: &Path, run_id: &str, extension: &str) -> io::Result<Self> {
        fs::create_dir_all(temp_root)?;
        let root = temp_root.join(format!("{}{}", WORKSPACE_PREFIX, run_id));
        fs::create_dir(&root)?;

        tracing::debug!("Created run workspace {}", root.display());

        Ok(Self {
            layout: WorkspaceLayout::new(root, extension),
            purged: false,
        })
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn path(&self) -> &Path {
        self.layout.root()
    }

    /// Remove the workspace and everything in it.
    pub fn purge(mut self) -> io::Result<()> {
        self.purged = true;
        remove_tree(self.layout.root())
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if self.purged {
            return;
        }
        if let Err(e) = remove_tree(self.layout.root()) {
            tracing::warn!(
                "Failed to remove run workspace {}: {}",
                self.layout.root().display(),
                e
            );
        }
    }
}

fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
