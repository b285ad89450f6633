//! Errors raised while reading path data and building fonts.

use thiserror::Error;
use write_fonts::{tables::cmap::CmapConflict, BuilderError};

/// An error encountered while parsing path data.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PathError {
    #[error("malformed '{letter}' command at offset {offset}: {reason}")]
    Malformed {
        letter: char,
        offset: usize,
        reason: MalformedReason,
    },

    #[error("unsupported path command '{letter}' at offset {offset}")]
    UnsupportedCommand { letter: char, offset: usize },
}

/// The reason a command's operands were rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MalformedReason {
    #[error("'{0}' is not a number")]
    BadNumber(String),

    #[error("expected a positive multiple of {arity} operands, found {found}")]
    OperandCount { arity: usize, found: usize },

    #[error("expected no operands, found {0}")]
    UnexpectedOperands(usize),
}

/// An error encountered while adding a glyph to a font.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("glyphs '{existing}' and '{duplicate}' both map to U+{codepoint:04X}")]
    DuplicateGlyph {
        codepoint: u32,
        existing: String,
        duplicate: String,
    },

    #[error("the glyph name '{0}' is reserved for the fallback glyph")]
    ReservedName(String),
}

/// An error encountered while compiling a font into TrueType tables.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("glyph '{glyph}' cannot be represented as a TrueType outline: {reason}")]
    Outline { glyph: String, reason: String },

    #[error(transparent)]
    Cmap(#[from] CmapConflict),

    #[error(transparent)]
    Table(#[from] BuilderError),

    #[error("a TrueType font holds at most 65535 glyphs, found {0}")]
    TooManyGlyphs(usize),
}
