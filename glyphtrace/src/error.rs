//! Errors raised while building a font from source documents.

use std::{
    fmt, io,
    path::{Path, PathBuf},
    process::ExitStatus,
    time::Duration,
};

use outline_fonts::{AssemblyError, CompileError, PathError};
use thiserror::Error;

use crate::config::ConfigError;

/// A failure of one of the collaborators that rasterize, trace or encode.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("'{program}' did not finish within {after:?}")]
    Timeout { program: String, after: Duration },

    #[error("expected output '{}' was not produced", .0.display())]
    MissingOutput(PathBuf),

    #[error("failed to decode image '{}': {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Encode(#[from] CompileError),
}

impl CollaboratorError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        CollaboratorError::Io {
            path: path.to_owned(),
            source,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// The step of the per-glyph pipeline where something went wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Rasterize,
    Trace,
    Parse,
    Append,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Rasterize => "rasterize",
            Stage::Trace => "trace",
            Stage::Parse => "parse",
            Stage::Append => "append",
        })
    }
}

/// What went wrong with a glyph.
#[derive(Debug, Error)]
pub enum FaultKind {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// A failure processing one glyph, tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} failed: {kind}")]
pub struct GlyphFault {
    pub stage: Stage,
    #[source]
    pub kind: FaultKind,
}

impl GlyphFault {
    pub fn new(stage: Stage, kind: impl Into<FaultKind>) -> Self {
        GlyphFault {
            stage,
            kind: kind.into(),
        }
    }

    /// `true` if the run may continue without this glyph.
    ///
    /// Assembly faults concern the font as a whole and always end the run.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind, FaultKind::Assembly(_))
    }
}

/// A failure that ends a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read source directory '{}': {source}", path.display())]
    SourceDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot prepare scratch directory '{}': {source}", path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("glyph '{name}' from '{}': {fault}", file.display())]
    Glyph {
        name: String,
        file: PathBuf,
        #[source]
        fault: GlyphFault,
    },

    #[error("{error} (from '{}' and '{}')", existing_file.display(), duplicate_file.display())]
    Duplicate {
        #[source]
        error: AssemblyError,
        existing_file: PathBuf,
        duplicate_file: PathBuf,
    },

    #[error("failed to encode the font: {0}")]
    Encode(#[source] CollaboratorError),

    #[error("failed to write '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// The process exit code reporting this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Config(_)
            | PipelineError::SourceDir { .. }
            | PipelineError::Scratch { .. } => 1,
            PipelineError::Glyph { .. } => 3,
            PipelineError::Duplicate { .. } => 4,
            PipelineError::Encode(_) | PipelineError::Output { .. } => 5,
        }
    }
}
