use crate::geometry_utilities::types::*;

/// An anchor point with its two bezier handles.
/// The handles are stored relative to the anchor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub point: ArtPoint,
    pub handle_in: ArtVector,
    pub handle_out: ArtVector,
}

impl Segment {
    pub fn new(point: ArtPoint, handle_in: ArtVector, handle_out: ArtVector) -> Segment {
        Segment {
            point,
            handle_in,
            handle_out,
        }
    }

    pub fn corner(point: ArtPoint) -> Segment {
        Segment::new(point, ArtVector::zero(), ArtVector::zero())
    }

    /// Absolute position of the incoming handle.
    pub fn control_before(&self) -> ArtPoint {
        self.point + self.handle_in
    }

    /// Absolute position of the outgoing handle.
    pub fn control_after(&self) -> ArtPoint {
        self.point + self.handle_out
    }

    pub fn set_control_before(&mut self, value: ArtPoint) {
        self.handle_in = value - self.point;
    }

    pub fn set_control_after(&mut self, value: ArtPoint) {
        self.handle_out = value - self.point;
    }

    pub fn has_handles(&self) -> bool {
        self.handle_in != ArtVector::zero() || self.handle_out != ArtVector::zero()
    }

    /// The same anchor traversed in the opposite direction.
    pub fn reversed(&self) -> Segment {
        Segment::new(self.point, self.handle_out, self.handle_in)
    }

    pub fn transformed(&self, transform: &ArtTransform) -> Segment {
        Segment::new(
            transform.transform_point(self.point),
            transform.transform_vector(self.handle_in),
            transform.transform_vector(self.handle_out),
        )
    }
}

/// Reverses a contour in place: order flips and every segment swaps its handles,
/// which keeps the drawn shape but flips its winding.
pub fn reverse_segments(segments: &mut [Segment]) {
    segments.reverse();
    for segment in segments.iter_mut() {
        *segment = segment.reversed();
    }
}
