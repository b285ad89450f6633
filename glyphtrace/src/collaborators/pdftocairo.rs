//! Rasterizing PDF pages with poppler's `pdftocairo`

use std::{
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use super::{process, scratch_file, Rasterize};
use crate::{
    config::{Config, DEFAULT_RASTER_SIZE, DEFAULT_TIMEOUT},
    error::CollaboratorError,
};

/// Renders the first page of a PDF to PNG.
#[derive(Clone, Debug)]
pub struct PdfToCairo {
    program: PathBuf,
    size: u32,
    timeout: Duration,
}

impl PdfToCairo {
    pub fn new(size: u32, timeout: Duration) -> Self {
        PdfToCairo {
            program: PathBuf::from("pdftocairo"),
            size,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.raster_size, config.stage_timeout)
    }

    /// Run a different executable, e.g. one outside `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, document: &Path, output_prefix: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-png")
            .arg("-singlefile")
            .arg("-scale-to")
            .arg(self.size.to_string())
            .arg(document)
            .arg(output_prefix);
        command
    }
}

impl Default for PdfToCairo {
    fn default() -> Self {
        Self::new(DEFAULT_RASTER_SIZE, DEFAULT_TIMEOUT)
    }
}

impl Rasterize for PdfToCairo {
    fn rasterize(&self, document: &Path, scratch: &Path) -> Result<PathBuf, CollaboratorError> {
        // pdftocairo appends the extension to the prefix itself
        let image = scratch_file(scratch, document, "png")?;
        let prefix = image.with_extension("");
        process::run(self.command(document, &prefix), self.timeout)?;
        if !image.is_file() {
            return Err(CollaboratorError::MissingOutput(image));
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line() {
        let rasterizer = PdfToCairo::new(800, Duration::from_secs(1));
        let command = rasterizer.command(Path::new("in/A.pdf"), Path::new("tmp/A"));
        assert_eq!(command.get_program(), "pdftocairo");
        let args = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(
            args,
            ["-png", "-singlefile", "-scale-to", "800", "in/A.pdf", "tmp/A"]
        );
    }

    #[test]
    fn missing_program_is_reported() {
        let scratch = tempfile::tempdir().unwrap();
        let rasterizer = PdfToCairo::default().with_program("glyphtrace-missing-pdftocairo");
        let err = rasterizer
            .rasterize(Path::new("A.pdf"), scratch.path())
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Spawn { .. }));
    }
}
