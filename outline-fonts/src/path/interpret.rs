//! Resolving raw commands into absolute drawing operations

use kurbo::{Point, Vec2};

use super::{parse_with, CommandKind, Coordinates, DrawingOp, ParseOptions, RawCommand};
use crate::error::PathError;

/// The result of interpreting a command sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Interpretation {
    /// One operation per operand group, in source order.
    pub ops: Vec<DrawingOp>,
    /// The current point after the last operation.
    pub cursor: Point,
}

impl Interpretation {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Resolve commands into absolute drawing operations.
///
/// Relative coordinates are offsets from the current point at the start of
/// their operand group; all control points of a relative curve share that
/// origin. The current point moves to the end point of each operation and is
/// left in place by a close.
pub fn interpret(commands: &[RawCommand]) -> Interpretation {
    let (ops, cursor) = commands
        .iter()
        .fold((Vec::new(), Point::ORIGIN), |(ops, cursor), command| {
            step(ops, cursor, command)
        });
    Interpretation { ops, cursor }
}

/// Parse and interpret path data in one go.
pub fn interpret_str(path: &str, options: ParseOptions) -> Result<Interpretation, PathError> {
    parse_with(path, options).map(|commands| interpret(&commands))
}

fn step(mut ops: Vec<DrawingOp>, cursor: Point, command: &RawCommand) -> (Vec<DrawingOp>, Point) {
    let cursor = command.groups().fold(cursor, |cursor, group| {
        let origin = match command.coordinates() {
            Coordinates::Absolute => Vec2::ZERO,
            Coordinates::Relative => cursor.to_vec2(),
        };
        let op = resolve(command.kind(), group, origin);
        ops.push(op);
        op.end_point().unwrap_or(cursor)
    });
    (ops, cursor)
}

fn resolve(kind: CommandKind, group: &[f64], origin: Vec2) -> DrawingOp {
    let at = |i: usize| Point::new(group[i], group[i + 1]) + origin;
    match kind {
        CommandKind::MoveTo => DrawingOp::MoveTo(at(0)),
        CommandKind::LineTo => DrawingOp::LineTo(at(0)),
        CommandKind::CurveTo => DrawingOp::CubicCurveTo(at(0), at(2), at(4)),
        CommandKind::QuadTo => DrawingOp::QuadCurveTo(at(0), at(2)),
        CommandKind::ClosePath => DrawingOp::ClosePath,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::path::parse;

    fn run(path: &str) -> Interpretation {
        interpret(&parse(path).unwrap())
    }

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn absolute_operands_are_literal() {
        let result = run("M10 20 L30 40 Q1 2 3 4 C5 6 7 8 9 10");
        assert_eq!(
            result.ops,
            vec![
                DrawingOp::MoveTo(pt(10.0, 20.0)),
                DrawingOp::LineTo(pt(30.0, 40.0)),
                DrawingOp::QuadCurveTo(pt(1.0, 2.0), pt(3.0, 4.0)),
                DrawingOp::CubicCurveTo(pt(5.0, 6.0), pt(7.0, 8.0), pt(9.0, 10.0)),
            ]
        );
        assert_eq!(result.cursor, pt(9.0, 10.0));
    }

    #[test]
    fn closed_triangle() {
        let result = run("M0,0 L10,0 L10,10 Z");
        assert_eq!(
            result.ops,
            vec![
                DrawingOp::MoveTo(pt(0.0, 0.0)),
                DrawingOp::LineTo(pt(10.0, 0.0)),
                DrawingOp::LineTo(pt(10.0, 10.0)),
                DrawingOp::ClosePath,
            ]
        );
        assert_eq!(result.cursor, pt(10.0, 10.0));
    }

    #[test]
    fn repeated_move_groups_stay_moves() {
        let result = run("M0,0 10,10 20,20");
        assert_eq!(
            result.ops,
            vec![
                DrawingOp::MoveTo(pt(0.0, 0.0)),
                DrawingOp::MoveTo(pt(10.0, 10.0)),
                DrawingOp::MoveTo(pt(20.0, 20.0)),
            ]
        );
        assert_eq!(result.cursor, pt(20.0, 20.0));
    }

    #[test]
    fn relative_lines_accumulate() {
        let result = run("m10 10 l5 0 0 5 -5 0");
        assert_eq!(
            result.ops,
            vec![
                DrawingOp::MoveTo(pt(10.0, 10.0)),
                DrawingOp::LineTo(pt(15.0, 10.0)),
                DrawingOp::LineTo(pt(15.0, 15.0)),
                DrawingOp::LineTo(pt(10.0, 15.0)),
            ]
        );
        assert_eq!(result.cursor, pt(10.0, 15.0));
    }

    #[test]
    fn relative_curve_controls_share_group_origin() {
        let result = run("M100 100 c10 0 20 10 20 20 q0 10 -10 10");
        assert_eq!(
            result.ops[1],
            DrawingOp::CubicCurveTo(pt(110.0, 100.0), pt(120.0, 110.0), pt(120.0, 120.0))
        );
        assert_eq!(
            result.ops[2],
            DrawingOp::QuadCurveTo(pt(120.0, 130.0), pt(110.0, 130.0))
        );
        assert_eq!(result.cursor, pt(110.0, 130.0));
    }

    #[test]
    fn repeated_relative_curves() {
        let result = run("M0 0 c1 1 2 2 3 3 1 1 2 2 3 3");
        assert_eq!(
            result.ops[2],
            DrawingOp::CubicCurveTo(pt(4.0, 4.0), pt(5.0, 5.0), pt(6.0, 6.0))
        );
    }

    #[test]
    fn close_does_not_move_cursor() {
        let result = run("M10 10 l10 0 z l0 5");
        assert_eq!(
            result.ops,
            vec![
                DrawingOp::MoveTo(pt(10.0, 10.0)),
                DrawingOp::LineTo(pt(20.0, 10.0)),
                DrawingOp::ClosePath,
                DrawingOp::LineTo(pt(20.0, 15.0)),
            ]
        );
    }

    #[test]
    fn relative_move_at_start_is_from_origin() {
        let result = run("m5 5 Z");
        assert_eq!(result.ops[0], DrawingOp::MoveTo(pt(5.0, 5.0)));
        assert_eq!(result.cursor, pt(5.0, 5.0));
    }

    #[test]
    fn mixed_forms_give_the_same_geometry() {
        let absolute = run("M10 10 L20 10 L20 20 Z");
        let relative = run("m10 10 l10 0 0 10 z");
        assert_eq!(absolute.ops, relative.ops);
    }

    #[test]
    fn empty_input() {
        let result = run("");
        assert!(result.is_empty());
        assert_eq!(result.cursor, Point::ORIGIN);
    }

    #[test]
    fn errors_propagate() {
        assert!(interpret_str("M0 0 L1", ParseOptions::default()).is_err());
    }
}
