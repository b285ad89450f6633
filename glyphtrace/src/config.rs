//! Run configuration
//!
//! A [`Config`] starts from built-in defaults. An optional TOML [`ConfigFile`]
//! is applied on top, and command line flags on top of that.

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use outline_fonts::{FontMetrics, ParseOptions, UnsupportedCommands};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_FONT_NAME: &str = "CustomFont";
pub const DEFAULT_EXTENSION: &str = "pdf";
/// The longest side of each raster, in pixels.
///
/// Traced coordinates are in raster pixels, so this is also the largest glyph
/// extent in font units. It matches the default units per em; with the
/// default advance width of 512, ink wider than 512 units overlaps the next
/// glyph. Lower it, or raise `advance_width`, for tighter spacing.
pub const DEFAULT_RASTER_SIZE: u32 = 1000;
/// Rasters larger than this trace to coordinates a `glyf` table cannot hold.
pub const MAX_RASTER_SIZE: u32 = i16::MAX as u32;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// What to do when a single glyph cannot be processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the run and report the glyph.
    #[default]
    Abort,
    /// Leave the glyph out of the font and carry on.
    Skip,
}

/// Everything a run needs to know.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Directory holding one source document per glyph.
    pub source_dir: PathBuf,
    /// Stem of the font and preview file names, and the preview title.
    pub font_name: String,
    pub metrics: FontMetrics,
    /// Extension of the source documents, without the dot.
    pub extension: String,
    pub raster_size: u32,
    /// How long each external process may run.
    pub stage_timeout: Duration,
    pub failure_policy: FailurePolicy,
    pub parse_options: ParseOptions,
    /// Keep intermediate files here instead of a temporary directory.
    pub keep_rasters: Option<PathBuf>,
    /// Write the font and preview here instead of the source directory.
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// The default configuration for a source directory.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Config {
            source_dir: source_dir.into(),
            font_name: DEFAULT_FONT_NAME.to_string(),
            metrics: FontMetrics::default(),
            extension: DEFAULT_EXTENSION.to_string(),
            raster_size: DEFAULT_RASTER_SIZE,
            stage_timeout: DEFAULT_TIMEOUT,
            failure_policy: FailurePolicy::default(),
            parse_options: ParseOptions::default(),
            keep_rasters: None,
            output_dir: None,
        }
    }

    /// Where the font and preview are written.
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.source_dir)
    }

    pub fn font_file_name(&self) -> String {
        format!("{}.ttf", self.font_name)
    }

    pub fn preview_file_name(&self) -> String {
        format!("{}-glyphs.html", self.font_name)
    }

    /// Check the values that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| Err(ConfigError::Invalid(reason.to_string()));
        if self.font_name.is_empty() {
            return invalid("the font name is empty");
        }
        if self.font_name.contains(['/', '\\']) {
            return invalid("the font name must not contain path separators");
        }
        if self.metrics.units_per_em < 16 || self.metrics.units_per_em > 16384 {
            return invalid("units per em must be between 16 and 16384");
        }
        if self.raster_size == 0 || self.raster_size > MAX_RASTER_SIZE {
            return invalid("the raster size must be between 1 and 32767");
        }
        if self.stage_timeout.is_zero() || self.stage_timeout > MAX_TIMEOUT {
            return invalid("the stage timeout must be between 1 second and 24 hours");
        }
        Ok(())
    }
}

/// A configuration file. Every field is optional.
///
/// ```toml
/// font_name = "Handwriting"
/// font_family = "Handwriting"
/// advance_width = 600
/// on_glyph_error = "skip"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub font_name: Option<String>,
    pub font_family: Option<String>,
    pub style_name: Option<String>,
    pub units_per_em: Option<u16>,
    pub ascender: Option<i16>,
    pub descender: Option<i16>,
    pub advance_width: Option<u16>,
    pub extension: Option<String>,
    pub raster_size: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub on_glyph_error: Option<FailurePolicy>,
    pub unsupported_commands: Option<UnsupportedCommands>,
    pub keep_rasters: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Overwrite the fields of `config` that this file sets.
    pub fn apply_to(self, config: &mut Config) {
        let ConfigFile {
            font_name,
            font_family,
            style_name,
            units_per_em,
            ascender,
            descender,
            advance_width,
            extension,
            raster_size,
            timeout_secs,
            on_glyph_error,
            unsupported_commands,
            keep_rasters,
            output_dir,
        } = self;
        let metrics = &mut config.metrics;

        set(&mut config.font_name, font_name);
        set(&mut metrics.family_name, font_family);
        set(&mut metrics.style_name, style_name);
        set(&mut metrics.units_per_em, units_per_em);
        set(&mut metrics.ascender, ascender);
        set(&mut metrics.descender, descender);
        set(&mut metrics.default_advance_width, advance_width);
        set(&mut config.extension, extension);
        set(&mut config.raster_size, raster_size);
        set(
            &mut config.stage_timeout,
            timeout_secs.map(Duration::from_secs),
        );
        set(&mut config.failure_policy, on_glyph_error);
        set(&mut config.parse_options.unsupported, unsupported_commands);
        if keep_rasters.is_some() {
            config.keep_rasters = keep_rasters;
        }
        if output_dir.is_some() {
            config.output_dir = output_dir;
        }
    }
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// A problem with the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
