//! Glyph outlines built from drawing operations.

use kurbo::{BezPath, PathEl, Point};

use crate::{path::DrawingOp, pen::Pen};

/// Everything about a glyph except its outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphIdentity {
    pub name: String,
    pub codepoint: Option<u32>,
    pub advance_width: u16,
    pub left_side_bearing: i16,
}

impl GlyphIdentity {
    /// An identity with no codepoint and a zero side bearing.
    pub fn new(name: impl Into<String>, advance_width: u16) -> Self {
        GlyphIdentity {
            name: name.into(),
            codepoint: None,
            advance_width,
            left_side_bearing: 0,
        }
    }
}

/// A single glyph: its identity and its outline.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphOutline {
    identity: GlyphIdentity,
    path: BezPath,
}

impl GlyphOutline {
    /// A glyph with no contours.
    pub(crate) fn empty(identity: GlyphIdentity) -> Self {
        GlyphOutline {
            identity,
            path: BezPath::new(),
        }
    }

    pub fn identity(&self) -> &GlyphIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn codepoint(&self) -> Option<u32> {
        self.identity.codepoint
    }

    pub fn advance_width(&self) -> u16 {
        self.identity.advance_width
    }

    pub fn left_side_bearing(&self) -> i16 {
        self.identity.left_side_bearing
    }

    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// The outline as drawing operations.
    pub fn ops(&self) -> impl Iterator<Item = DrawingOp> + '_ {
        self.path.elements().iter().copied().map(DrawingOp::from)
    }

    /// `true` if the glyph has no contours.
    pub fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }

    /// Replay the outline against a pen.
    pub fn draw(&self, pen: &mut impl Pen) {
        self.ops().for_each(|op| op.apply_to(pen));
    }

    pub(crate) fn set_codepoint(&mut self, codepoint: Option<u32>) {
        self.identity.codepoint = codepoint;
    }
}

/// Builds one [`GlyphOutline`] from a stream of drawing operations.
#[derive(Clone, Debug)]
pub struct GlyphBuilder {
    identity: GlyphIdentity,
}

impl GlyphBuilder {
    pub fn new(identity: GlyphIdentity) -> Self {
        GlyphBuilder { identity }
    }

    /// Replay `ops` in order and take the resulting outline.
    ///
    /// No transformation is applied. An empty stream produces an empty
    /// outline.
    pub fn build(self, ops: &[DrawingOp]) -> GlyphOutline {
        if ops.is_empty() {
            log::warn!(
                "glyph '{}' has no drawing operations, its outline will be empty",
                self.identity.name
            );
        }
        let mut pen = OutlinePen::new();
        ops.iter().for_each(|op| op.apply_to(&mut pen));
        GlyphOutline {
            identity: self.identity,
            path: pen.into_inner(),
        }
    }
}

/// A [`Pen`] that records into a [`BezPath`].
///
/// Segments drawn while no subpath is open begin a new subpath at the last
/// on-curve point (the origin if nothing has been drawn yet). A close with no
/// open subpath is ignored.
#[derive(Clone, Debug, Default)]
pub struct OutlinePen {
    path: BezPath,
    last: Point,
    open: bool,
}

impl OutlinePen {
    pub fn new() -> OutlinePen {
        Self::default()
    }

    pub fn into_inner(self) -> BezPath {
        self.path
    }

    fn ensure_subpath(&mut self) {
        if !self.open {
            self.path.push(PathEl::MoveTo(self.last));
            self.open = true;
        }
    }
}

impl Pen for OutlinePen {
    fn move_to(&mut self, x: f64, y: f64) {
        self.last = Point::new(x, y);
        self.path.move_to(self.last);
        self.open = true;
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ensure_subpath();
        self.last = Point::new(x, y);
        self.path.line_to(self.last);
    }

    fn quad_to(&mut self, cx0: f64, cy0: f64, x: f64, y: f64) {
        self.ensure_subpath();
        self.last = Point::new(x, y);
        self.path.quad_to(Point::new(cx0, cy0), self.last);
    }

    fn curve_to(&mut self, cx0: f64, cy0: f64, cx1: f64, cy1: f64, x: f64, y: f64) {
        self.ensure_subpath();
        self.last = Point::new(x, y);
        self.path.curve_to(
            Point::new(cx0, cy0),
            Point::new(cx1, cy1),
            self.last,
        );
    }

    fn close(&mut self) {
        if self.open {
            self.path.close_path();
            self.open = false;
        } else {
            log::debug!("ignoring close with no open subpath");
        }
    }
}
