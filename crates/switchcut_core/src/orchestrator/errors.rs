//! Error types for the render pipeline.
//!
//! Errors carry enough context to classify a failed run:
//! Stage → Component → Segment → Tool detail

use std::io;

use thiserror::Error;

use super::types::RunStage;
use crate::media::ToolError;
use crate::models::TakeId;

/// Broad classification of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or contradictory caller input.
    Validation,
    /// A referenced take has no media.
    Resolution,
    /// The external media tool failed.
    Tool,
    /// The run was cancelled or ran past its deadline.
    Interrupted,
    /// Local environment failure (temp area, output sink).
    Environment,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Resolution => write!(f, "resolution"),
            ErrorKind::Tool => write!(f, "tool"),
            ErrorKind::Interrupted => write!(f, "interrupted"),
            ErrorKind::Environment => write!(f, "environment"),
        }
    }
}

/// The single error a failed run reports.
#[derive(Error, Debug)]
pub enum StitchError {
    /// Switch points, duration or frame rate are unusable.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// A switch point references a take with no media.
    #[error("No media for take {take} (expected upload field '{}')", .take.field_name())]
    Resolution { take: TakeId },

    /// Trimming one segment failed.
    #[error("Trim failed for segment {segment_index}: {source}")]
    Trim {
        segment_index: usize,
        #[source]
        source: ToolError,
    },

    /// Concatenating the trimmed clips failed.
    #[error("Concatenation failed: {source}")]
    Concat {
        #[source]
        source: ToolError,
    },

    /// Merging video and audio failed.
    #[error("Mux failed: {source}")]
    Mux {
        #[source]
        source: ToolError,
    },

    /// The caller cancelled the run.
    #[error("Run cancelled during {stage}")]
    Cancelled { stage: RunStage },

    /// The run's deadline expired.
    #[error("Deadline exceeded during {stage}")]
    DeadlineExceeded { stage: RunStage },

    /// The per-run workspace could not be prepared.
    #[error("Workspace error while {operation}: {source}")]
    Workspace {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Handing the finished output to the caller failed.
    #[error("Failed to deliver output: {source}")]
    Delivery {
        #[source]
        source: io::Error,
    },
}

impl StitchError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a resolution error for a take.
    pub fn resolution(take: TakeId) -> Self {
        Self::Resolution { take }
    }

    /// Create a workspace error with context.
    pub fn workspace(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Workspace {
            operation: operation.into(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Resolution { .. } => ErrorKind::Resolution,
            Self::Trim { .. } | Self::Concat { .. } | Self::Mux { .. } => ErrorKind::Tool,
            Self::Cancelled { .. } | Self::DeadlineExceeded { .. } => ErrorKind::Interrupted,
            Self::Workspace { .. } | Self::Delivery { .. } => ErrorKind::Environment,
        }
    }

    /// Name of the component that failed.
    pub fn component(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "SwitchPointNormalizer",
            Self::Resolution { .. } => "SegmentPlanner",
            Self::Trim { .. } => "TrimExecutor",
            Self::Concat { .. } => "Concatenator",
            Self::Mux { .. } => "Muxer",
            Self::Cancelled { .. } | Self::DeadlineExceeded { .. } | Self::Workspace { .. } => {
                "Orchestrator"
            }
            Self::Delivery { .. } => "Delivery",
        }
    }

    /// Segment that failed, for trim errors.
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            Self::Trim { segment_index, .. } => Some(*segment_index),
            _ => None,
        }
    }

    /// Whether the caller's input caused the failure.
    pub fn is_caller_fault(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Resolution)
    }
}

/// Result type for pipeline operations.
pub type StitchResult<T> = Result<T, StitchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_error_displays_context() {
        let err = StitchError::Trim {
            segment_index: 1,
            source: ToolError::exit("ffmpeg", Some(1), "Invalid data found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("segment 1"));
        assert!(msg.contains("ffmpeg"));
        assert_eq!(err.kind(), ErrorKind::Tool);
        assert_eq!(err.component(), "TrimExecutor");
        assert_eq!(err.segment_index(), Some(1));
    }

    #[test]
    fn resolution_error_names_take() {
        let err = StitchError::resolution(TakeId::from_index(2));
        let msg = err.to_string();
        assert!(msg.contains("take 2"));
        assert!(msg.contains("video_2"));
        assert!(err.is_caller_fault());
    }

    #[test]
    fn interruptions_are_not_caller_faults() {
        let err = StitchError::Cancelled {
            stage: RunStage::Planned,
        };
        assert_eq!(err.kind(), ErrorKind::Interrupted);
        assert!(!err.is_caller_fault());
    }
}
