//! Build a font from a directory of drawings, one drawing per character.
//!
//! Each source document is rasterized, the raster traced into SVG path data,
//! and the path data turned into a glyph with [`outline_fonts`]. The glyphs
//! are assembled into a TrueType font, written next to an HTML preview.
//!
//! Rasterizing, tracing and encoding sit behind the traits in
//! [`collaborators`], so the [`pipeline`] can be driven by the default
//! `pdftocairo` and `potrace` processes or by anything else.

#![forbid(unsafe_code)]

pub mod collaborators;
pub mod config;
mod error;
pub mod pipeline;
pub mod source;

pub use config::{Config, ConfigError, ConfigFile, FailurePolicy};
pub use error::{CollaboratorError, FaultKind, GlyphFault, PipelineError, Stage};
pub use pipeline::{GlyphOutcome, GlyphReport, Pipeline, RunReport};
pub use source::SourceFile;
