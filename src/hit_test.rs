use crate::geometry_utilities::types::*;

/// Parameters closer than this to a curve end count as a hit on the anchor.
pub const ANCHOR_TOLERANCE: f64 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitKind {
    /// The hit is on the anchor at the start or end of the curve.
    Anchor,
    Curve,
}

/// Where a query met a path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitTest {
    pub kind: HitKind,
    /// Index of the curve in its path.
    pub curve: usize,
    pub parameter: f64,
    pub point: ArtPoint,
}

impl HitTest {
    pub fn new(curve: usize, parameter: f64, point: ArtPoint) -> HitTest {
        let kind = if parameter <= ANCHOR_TOLERANCE || parameter >= 1.0 - ANCHOR_TOLERANCE {
            HitKind::Anchor
        } else {
            HitKind::Curve
        };
        HitTest {
            kind,
            curve,
            parameter,
            point,
        }
    }

    /// Index of the segment the hit is on, if it is on an anchor.
    pub fn segment(&self, segment_count: usize) -> Option<usize> {
        match self.kind {
            HitKind::Anchor if segment_count > 0 => {
                let index = if self.parameter < 0.5 { self.curve } else { self.curve + 1 };
                Some(index % segment_count)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_by_parameter() {
        assert_eq!(HitTest::new(0, 0.5, point(0.0, 0.0)).kind, HitKind::Curve);
        assert_eq!(HitTest::new(0, 0.0, point(0.0, 0.0)).kind, HitKind::Anchor);
        assert_eq!(HitTest::new(0, 1.0 - 1e-8, point(0.0, 0.0)).kind, HitKind::Anchor);
        assert_eq!(HitTest::new(0, 1e-3, point(0.0, 0.0)).kind, HitKind::Curve);
    }

    #[test]
    fn anchor_hits_name_their_segment() {
        assert_eq!(HitTest::new(2, 1.0, point(0.0, 0.0)).segment(4), Some(3));
        // The closing curve of a closed path ends on the first segment.
        assert_eq!(HitTest::new(3, 1.0, point(0.0, 0.0)).segment(4), Some(0));
        assert_eq!(HitTest::new(3, 0.5, point(0.0, 0.0)).segment(4), None);
    }
}
