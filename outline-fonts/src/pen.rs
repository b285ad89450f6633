//! The five-operation drawing capability outlines are replayed against.

/// Interface for accepting a sequence of path commands.
///
/// Coordinates are in glyph space and are passed through at full precision.
pub trait Pen {
    /// Begin a new subpath at (x, y).
    fn move_to(&mut self, x: f64, y: f64);

    /// A line segment from the current point to (x, y).
    fn line_to(&mut self, x: f64, y: f64);

    /// A quadratic bezier segment from the current point with a control
    /// point at (cx0, cy0), ending at (x, y).
    fn quad_to(&mut self, cx0: f64, cy0: f64, x: f64, y: f64);

    /// A cubic bezier segment from the current point with control points at
    /// (cx0, cy0) and (cx1, cy1), ending at (x, y).
    fn curve_to(&mut self, cx0: f64, cy0: f64, cx1: f64, cy1: f64, x: f64, y: f64);

    /// Close the current subpath.
    fn close(&mut self);
}
