use crate::error::{PathError, Result};
use crate::geometry_utilities::types::*;
use crate::geometry_utilities::{arc_length, derivative, hit_test_bezier, parameter_at_length, to_bezier};
use crate::segment::Segment;

/// Number of curves between `segment_count` anchors.
pub fn curve_count(segment_count: usize, closed: bool) -> usize {
    if segment_count < 2 {
        0
    } else if closed {
        segment_count
    } else {
        segment_count - 1
    }
}

/// The cubic bezier between two neighbouring segments of a path.
///
/// A curve borrows the segments it was made from, so it can not outlive a change to them.
#[derive(Copy, Clone, Debug)]
pub struct Curve<'a> {
    segments: &'a [Segment],
    index: usize,
}

impl<'a> Curve<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn segment1(&self) -> &'a Segment {
        &self.segments[self.index]
    }

    pub fn segment2(&self) -> &'a Segment {
        &self.segments[(self.index + 1) % self.segments.len()]
    }

    pub fn point1(&self) -> ArtPoint {
        self.segment1().point
    }

    pub fn handle1(&self) -> ArtVector {
        self.segment1().handle_out
    }

    pub fn handle2(&self) -> ArtVector {
        self.segment2().handle_in
    }

    pub fn point2(&self) -> ArtPoint {
        self.segment2().point
    }

    pub fn control_points(&self) -> [ArtPoint; 4] {
        [
            self.point1(),
            self.segment1().control_after(),
            self.segment2().control_before(),
            self.point2(),
        ]
    }

    pub fn to_bezier(&self) -> Bezier {
        let [p0, p1, p2, p3] = self.control_points();
        to_bezier(p0, p1, p2, p3)
    }

    /// True when both handles are zero and the curve is a straight line.
    pub fn is_linear(&self) -> bool {
        self.handle1() == ArtVector::zero() && self.handle2() == ArtVector::zero()
    }

    pub fn point_at(&self, t: f64) -> ArtPoint {
        ArtPoint::from_untyped(self.to_bezier().sample(t))
    }

    /// Derivative at `t`. Zero length at the ends of a curve without handles.
    pub fn tangent_at(&self, t: f64) -> ArtVector {
        ArtVector::from_untyped(derivative(&self.to_bezier(), t))
    }

    pub fn split_at(&self, t: f64) -> (Bezier, Bezier) {
        self.to_bezier().split(t)
    }

    pub fn bounds(&self) -> ArtBox {
        ArtBox::from_untyped(&self.to_bezier().bounding_box())
    }

    pub fn length(&self, flatness: f64) -> f64 {
        if self.is_linear() {
            return (self.point2() - self.point1()).length();
        }
        arc_length(&self.to_bezier(), flatness)
    }

    /// Length of the curve from its start to `t`.
    pub fn length_up_to(&self, t: f64, flatness: f64) -> f64 {
        if t <= 0.0 {
            0.0
        } else if t >= 1.0 {
            self.length(flatness)
        } else {
            arc_length(&self.to_bezier().before_split(t), flatness)
        }
    }

    /// Parameter at which the curve has reached `length`. `None` when `length` is negative or
    /// longer than the curve.
    pub fn parameter_with_length(&self, length: f64, flatness: f64) -> Option<f64> {
        parameter_at_length(&self.to_bezier(), length, flatness)
    }

    pub fn point_with_length(&self, length: f64, flatness: f64) -> Option<ArtPoint> {
        self.parameter_with_length(length, flatness).map(|t| self.point_at(t))
    }

    /// Parameter of the point on the curve closest to `point`, if it is within `epsilon`.
    pub fn hit_test(&self, point: ArtPoint, epsilon: f64) -> Option<f64> {
        hit_test_bezier(&self.to_bezier(), point.to_untyped(), epsilon).map(|(t, _)| t)
    }
}

/// The curves of a segment sequence.
#[derive(Copy, Clone, Debug)]
pub struct CurveList<'a> {
    segments: &'a [Segment],
    closed: bool,
}

impl<'a> CurveList<'a> {
    pub fn new(segments: &'a [Segment], closed: bool) -> CurveList<'a> {
        CurveList { segments, closed }
    }

    pub fn len(&self) -> usize {
        curve_count(self.segments.len(), self.closed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Result<Curve<'a>> {
        if index < self.len() {
            Ok(Curve {
                segments: self.segments,
                index,
            })
        } else {
            Err(PathError::OutOfRange { index, len: self.len() })
        }
    }

    pub fn first(&self) -> Option<Curve<'a>> {
        self.get(0).ok()
    }

    pub fn last(&self) -> Option<Curve<'a>> {
        self.len().checked_sub(1).and_then(|i| self.get(i).ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = Curve<'a>> + 'a {
        let segments = self.segments;
        (0..self.len()).map(move |index| Curve { segments, index })
    }
}
