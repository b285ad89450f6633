//! The external steps of the pipeline: rasterizing, tracing and encoding.
//!
//! Each step is a trait so the pipeline can be driven by anything that can
//! perform it. The default implementations run `pdftocairo` and `potrace`,
//! and compile TrueType with [`outline_fonts::compile`].

mod pdftocairo;
mod potrace;
mod process;

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use outline_fonts::{compile_font, FontDocument};
use regex::Regex;

use crate::error::CollaboratorError;

pub use pdftocairo::PdfToCairo;
pub use potrace::{encode_pbm, Potrace};

/// Turns a source document into a raster image.
pub trait Rasterize {
    /// Rasterize `document`, writing any files into `scratch`, and return the
    /// path of the image.
    fn rasterize(&self, document: &Path, scratch: &Path) -> Result<PathBuf, CollaboratorError>;
}

/// Turns a raster image into an SVG document.
pub trait Trace {
    /// Trace `image`, writing any files into `scratch`, and return the SVG text.
    fn trace(&self, image: &Path, scratch: &Path) -> Result<String, CollaboratorError>;
}

/// Turns a finished font into the bytes of a font file.
pub trait Encode {
    fn encode(&self, font: &FontDocument) -> Result<Vec<u8>, CollaboratorError>;
}

/// Encodes fonts as TrueType.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrueTypeEncoder;

impl Encode for TrueTypeEncoder {
    fn encode(&self, font: &FontDocument) -> Result<Vec<u8>, CollaboratorError> {
        Ok(compile_font(font)?)
    }
}

static PATH_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<path\b[^>]*?\sd\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("path data pattern is valid")
});

/// Collect the path data of every `<path>` element in `svg`, in document
/// order.
///
/// Returns `None` if there is no non-empty path data.
pub fn extract_path_data(svg: &str) -> Option<String> {
    let data = PATH_DATA
        .captures_iter(svg)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim())
        .filter(|d| !d.is_empty())
        .collect::<Vec<_>>();
    (!data.is_empty()).then(|| data.join(" "))
}

/// The file name `stem.extension` inside `dir`.
fn scratch_file(dir: &Path, source: &Path, extension: &str) -> Result<PathBuf, CollaboratorError> {
    let stem = source.file_stem().ok_or_else(|| {
        CollaboratorError::io(
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    Ok(dir.join(name))
}
