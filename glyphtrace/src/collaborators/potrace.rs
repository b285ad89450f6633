//! Tracing bitmaps into SVG outlines with `potrace`

use std::{
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use image::GrayAlphaImage;

use super::{process, scratch_file, Trace};
use crate::{
    config::{Config, DEFAULT_TIMEOUT},
    error::CollaboratorError,
};

/// Pixels darker than this, after compositing over white, are ink.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Traces a raster image with potrace.
///
/// potrace only reads bitmaps, so the image is first thresholded into a PBM
/// file next to it in the scratch directory.
#[derive(Clone, Debug)]
pub struct Potrace {
    program: PathBuf,
    threshold: u8,
    timeout: Duration,
}

impl Potrace {
    pub fn new(timeout: Duration) -> Self {
        Potrace {
            program: PathBuf::from("potrace"),
            threshold: DEFAULT_THRESHOLD,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.stage_timeout)
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    fn command(&self, bitmap: &Path, svg: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["-b", "svg", "-u", "1", "-o"])
            .arg(svg)
            .arg(bitmap);
        command
    }
}

impl Default for Potrace {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Trace for Potrace {
    fn trace(&self, image: &Path, scratch: &Path) -> Result<String, CollaboratorError> {
        let pixels = image::open(image)
            .map_err(|source| CollaboratorError::Image {
                path: image.to_owned(),
                source,
            })?
            .to_luma_alpha8();

        let bitmap = scratch_file(scratch, image, "pbm")?;
        std::fs::write(&bitmap, encode_pbm(&pixels, self.threshold))
            .map_err(|e| CollaboratorError::io(&bitmap, e))?;

        let svg = scratch_file(scratch, image, "svg")?;
        process::run(self.command(&bitmap, &svg), self.timeout)?;
        if !svg.is_file() {
            return Err(CollaboratorError::MissingOutput(svg));
        }
        std::fs::read_to_string(&svg).map_err(|e| CollaboratorError::io(&svg, e))
    }
}

/// Encode `image` as a binary (P4) PBM bitmap.
///
/// A pixel is set when its luma, composited over a white background, is below
/// `threshold`. Rows are packed most significant bit first and padded to a
/// whole byte.
pub fn encode_pbm(image: &GrayAlphaImage, threshold: u8) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let row_len = width.div_ceil(8) as usize;
    let mut out = format!("P4\n{width} {height}\n").into_bytes();
    out.reserve(row_len * height as usize);

    for row in image.rows() {
        let mut packed = vec![0u8; row_len];
        for (x, pixel) in row.enumerate() {
            let [luma, alpha] = pixel.0;
            let (luma, alpha) = (luma as u32, alpha as u32);
            let over_white = (luma * alpha + 255 * (255 - alpha)) / 255;
            if over_white < threshold as u32 {
                packed[x / 8] |= 0x80 >> (x % 8);
            }
        }
        out.extend_from_slice(&packed);
    }
    out
}
