//! Generic bezier path stream used to exchange geometry with renderers and importers.

use crate::geometry_utilities::types::*;
use lyon::path::PathEvent;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathOp {
    MoveTo(ArtPoint),
    LineTo(ArtPoint),
    QuadTo(ArtPoint, ArtPoint),
    CubicTo(ArtPoint, ArtPoint, ArtPoint),
    Close,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum WindingRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl From<WindingRule> for lyon::tessellation::FillRule {
    fn from(rule: WindingRule) -> Self {
        match rule {
            WindingRule::NonZero => lyon::tessellation::FillRule::NonZero,
            WindingRule::EvenOdd => lyon::tessellation::FillRule::EvenOdd,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Shape {
    pub ops: Vec<PathOp>,
    pub winding: WindingRule,
}

impl Shape {
    pub fn new(winding: WindingRule) -> Shape {
        Shape { ops: Vec::new(), winding }
    }

    pub fn from_ops(ops: Vec<PathOp>, winding: WindingRule) -> Shape {
        Shape { ops, winding }
    }

    pub fn push(&mut self, op: PathOp) {
        self.ops.push(op);
    }

    pub fn extend(&mut self, other: &Shape) {
        self.ops.extend_from_slice(&other.ops);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathOp> {
        self.ops.iter()
    }

    pub fn fill_rule(&self) -> lyon::tessellation::FillRule {
        self.winding.into()
    }

    /// Number of contours, counted by their `MoveTo`.
    pub fn contour_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, PathOp::MoveTo(_))).count()
    }

    /// Converts to a lyon path for tessellation. Coordinates are narrowed to `f32`.
    pub fn to_lyon(&self) -> lyon::path::Path {
        fn p(pt: ArtPoint) -> lyon::math::Point {
            lyon::math::point(pt.x as f32, pt.y as f32)
        }

        let mut builder = lyon::path::Path::builder();
        let mut open = false;
        for op in &self.ops {
            match *op {
                PathOp::MoveTo(to) => {
                    if open {
                        builder.end(false);
                    }
                    builder.begin(p(to));
                    open = true;
                }
                // Drawing commands without a preceding move have no start point.
                _ if !open => {}
                PathOp::LineTo(to) => {
                    builder.line_to(p(to));
                }
                PathOp::QuadTo(ctrl, to) => {
                    builder.quadratic_bezier_to(p(ctrl), p(to));
                }
                PathOp::CubicTo(ctrl1, ctrl2, to) => {
                    builder.cubic_bezier_to(p(ctrl1), p(ctrl2), p(to));
                }
                PathOp::Close => {
                    builder.end(true);
                    open = false;
                }
            }
        }
        if open {
            builder.end(false);
        }
        builder.build()
    }

    pub fn from_lyon(path: &lyon::path::Path, winding: WindingRule) -> Shape {
        fn p(pt: lyon::math::Point) -> ArtPoint {
            point(pt.x as f64, pt.y as f64)
        }

        let mut shape = Shape::new(winding);
        for event in path.iter() {
            match event {
                PathEvent::Begin { at } => shape.push(PathOp::MoveTo(p(at))),
                PathEvent::Line { to, .. } => shape.push(PathOp::LineTo(p(to))),
                PathEvent::Quadratic { ctrl, to, .. } => shape.push(PathOp::QuadTo(p(ctrl), p(to))),
                PathEvent::Cubic { ctrl1, ctrl2, to, .. } => shape.push(PathOp::CubicTo(p(ctrl1), p(ctrl2), p(to))),
                PathEvent::End { close, .. } => {
                    if close {
                        shape.push(PathOp::Close)
                    }
                }
            }
        }
        shape
    }
}

impl<'a> IntoIterator for &'a Shape {
    type Item = &'a PathOp;
    type IntoIter = std::slice::Iter<'a, PathOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_contours() -> Shape {
        Shape::from_ops(
            vec![
                PathOp::MoveTo(point(0.0, 0.0)),
                PathOp::LineTo(point(10.0, 0.0)),
                PathOp::CubicTo(point(12.0, 0.0), point(12.0, 10.0), point(10.0, 10.0)),
                PathOp::Close,
                PathOp::MoveTo(point(2.0, 2.0)),
                PathOp::QuadTo(point(4.0, 4.0), point(6.0, 2.0)),
            ],
            WindingRule::EvenOdd,
        )
    }

    #[test]
    fn lyon_path_keeps_the_structure() {
        let shape = two_contours();
        let path = shape.to_lyon();
        let events: Vec<_> = path.iter().collect();
        assert!(matches!(events[0], PathEvent::Begin { .. }));
        assert!(matches!(events[3], PathEvent::End { close: true, .. }));
        assert!(matches!(events[events.len() - 1], PathEvent::End { close: false, .. }));

        let back = Shape::from_lyon(&path, shape.winding);
        assert_eq!(back, shape);
        assert_eq!(back.contour_count(), 2);
    }

    #[test]
    fn winding_maps_to_lyon_fill_rule() {
        assert_eq!(two_contours().fill_rule(), lyon::tessellation::FillRule::EvenOdd);
        assert_eq!(Shape::default().fill_rule(), lyon::tessellation::FillRule::NonZero);
    }

    #[test]
    fn ops_before_a_move_are_skipped() {
        let shape = Shape::from_ops(
            vec![PathOp::LineTo(point(1.0, 1.0)), PathOp::Close, PathOp::MoveTo(point(0.0, 0.0))],
            WindingRule::NonZero,
        );
        let back = Shape::from_lyon(&shape.to_lyon(), WindingRule::NonZero);
        assert_eq!(back.ops, vec![PathOp::MoveTo(point(0.0, 0.0))]);
    }
}
