//! Path data: the command alphabet, parsed commands and drawing operations.
//!
//! Path data is the compact language used by the `d` attribute of SVG
//! `<path>` elements, restricted here to the subset emitted by bitmap
//! tracers: move, line, cubic and quadratic curves, and close, each in an
//! absolute and a relative form.

mod interpret;
mod parse;

use kurbo::{PathEl, Point};

use crate::pen::Pen;

pub use interpret::{interpret, interpret_str, Interpretation};
pub use parse::{parse, parse_with, ParseOptions, UnsupportedCommands};

/// The drawing command named by a path letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    MoveTo,
    LineTo,
    CurveTo,
    QuadTo,
    ClosePath,
}

/// Whether a command's operands are absolute coordinates or offsets from the
/// current point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Coordinates {
    Absolute,
    Relative,
}

impl CommandKind {
    /// Look up a command letter.
    ///
    /// Upper case letters are absolute, lower case relative. Returns `None`
    /// for letters outside the supported alphabet.
    pub fn from_letter(letter: char) -> Option<(CommandKind, Coordinates)> {
        let kind = match letter.to_ascii_uppercase() {
            'M' => CommandKind::MoveTo,
            'L' => CommandKind::LineTo,
            'C' => CommandKind::CurveTo,
            'Q' => CommandKind::QuadTo,
            'Z' => CommandKind::ClosePath,
            _ => return None,
        };
        let coordinates = if letter.is_ascii_uppercase() {
            Coordinates::Absolute
        } else {
            Coordinates::Relative
        };
        Some((kind, coordinates))
    }

    /// The number of operands consumed by one application of this command.
    pub const fn arity(self) -> usize {
        match self {
            CommandKind::MoveTo | CommandKind::LineTo => 2,
            CommandKind::QuadTo => 4,
            CommandKind::CurveTo => 6,
            CommandKind::ClosePath => 0,
        }
    }

    /// The letter spelling this command in the given coordinate mode.
    pub const fn letter(self, coordinates: Coordinates) -> char {
        let upper = match self {
            CommandKind::MoveTo => 'M',
            CommandKind::LineTo => 'L',
            CommandKind::CurveTo => 'C',
            CommandKind::QuadTo => 'Q',
            CommandKind::ClosePath => 'Z',
        };
        match coordinates {
            Coordinates::Absolute => upper,
            Coordinates::Relative => upper.to_ascii_lowercase(),
        }
    }
}

/// One command as it appeared in the path data.
///
/// A command may carry several operand groups: `L 1 2 3 4` draws two lines.
/// The interpreter expands each group into its own [`DrawingOp`].
#[derive(Clone, Debug, PartialEq)]
pub struct RawCommand {
    kind: CommandKind,
    coordinates: Coordinates,
    operands: Vec<f64>,
}

impl RawCommand {
    /// Create a command from its parts.
    ///
    /// Operands past the last complete group are ignored when the command is
    /// interpreted; the parser never produces such commands.
    pub fn new(kind: CommandKind, coordinates: Coordinates, operands: Vec<f64>) -> Self {
        RawCommand {
            kind,
            coordinates,
            operands,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn operands(&self) -> &[f64] {
        &self.operands
    }

    /// The path letter for this command, e.g. `'c'` for a relative curve.
    pub fn letter(&self) -> char {
        self.kind.letter(self.coordinates)
    }

    /// Iterate over the operand groups, one per implied repetition.
    ///
    /// A close command yields a single empty group.
    pub fn groups(&self) -> impl Iterator<Item = &[f64]> + '_ {
        let arity = self.kind.arity();
        let count = if arity == 0 {
            1
        } else {
            self.operands.len() / arity
        };
        (0..count).map(move |i| &self.operands[i * arity..(i + 1) * arity])
    }
}

/// A drawing operation in absolute glyph-space coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawingOp {
    MoveTo(Point),
    LineTo(Point),
    CubicCurveTo(Point, Point, Point),
    QuadCurveTo(Point, Point),
    ClosePath,
}

impl DrawingOp {
    /// The on-curve point this operation ends at, if it has one.
    pub fn end_point(&self) -> Option<Point> {
        match self {
            DrawingOp::MoveTo(p)
            | DrawingOp::LineTo(p)
            | DrawingOp::CubicCurveTo(_, _, p)
            | DrawingOp::QuadCurveTo(_, p) => Some(*p),
            DrawingOp::ClosePath => None,
        }
    }

    /// Replay this operation against a pen.
    pub fn apply_to(&self, pen: &mut impl Pen) {
        match *self {
            DrawingOp::MoveTo(p) => pen.move_to(p.x, p.y),
            DrawingOp::LineTo(p) => pen.line_to(p.x, p.y),
            DrawingOp::CubicCurveTo(c0, c1, p) => pen.curve_to(c0.x, c0.y, c1.x, c1.y, p.x, p.y),
            DrawingOp::QuadCurveTo(c0, p) => pen.quad_to(c0.x, c0.y, p.x, p.y),
            DrawingOp::ClosePath => pen.close(),
        }
    }
}

impl From<PathEl> for DrawingOp {
    fn from(el: PathEl) -> Self {
        match el {
            PathEl::MoveTo(p) => DrawingOp::MoveTo(p),
            PathEl::LineTo(p) => DrawingOp::LineTo(p),
            PathEl::QuadTo(c0, p) => DrawingOp::QuadCurveTo(c0, p),
            PathEl::CurveTo(c0, c1, p) => DrawingOp::CubicCurveTo(c0, c1, p),
            PathEl::ClosePath => DrawingOp::ClosePath,
        }
    }
}

impl From<DrawingOp> for PathEl {
    fn from(op: DrawingOp) -> Self {
        match op {
            DrawingOp::MoveTo(p) => PathEl::MoveTo(p),
            DrawingOp::LineTo(p) => PathEl::LineTo(p),
            DrawingOp::QuadCurveTo(c0, p) => PathEl::QuadTo(c0, p),
            DrawingOp::CubicCurveTo(c0, c1, p) => PathEl::CurveTo(c0, c1, p),
            DrawingOp::ClosePath => PathEl::ClosePath,
        }
    }
}
