//! Glyph outlines from path data, and TrueType fonts from glyph outlines.
//!
//! The pieces fit together as a small pipeline:
//!
//! - [`path`] reads the compact path language found in the `d` attribute of
//!   SVG `<path>` elements and resolves it into absolute [`DrawingOp`]s.
//! - [`glyph`] replays drawing operations against a [`Pen`]
//!   to produce a [`GlyphOutline`].
//! - [`font`] collects outlines into a [`FontDocument`], keeping the
//!   fallback glyph first and codepoints unique.
//! - [`compile`] turns a document into TrueType font bytes, and [`preview`]
//!   renders an HTML page showing every glyph.
//!
//! [`DrawingOp`]: path::DrawingOp

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod compile;
mod error;
pub mod font;
pub mod glyph;
pub mod path;
mod pen;
pub mod preview;

pub use compile::compile_font;
pub use error::{AssemblyError, CompileError, MalformedReason, PathError};
pub use font::{codepoint_for_name, FontAssembler, FontDocument, FontMetrics, NOTDEF};
pub use glyph::{GlyphBuilder, GlyphIdentity, GlyphOutline, OutlinePen};
pub use path::{DrawingOp, ParseOptions, RawCommand, UnsupportedCommands};
pub use pen::Pen;

/// Public re-export of the kurbo crate, whose points and paths appear in this API.
pub use kurbo;
