use crate::curve::curve_count;
use crate::error::{PathError, Result};
use crate::geometry_utilities::to_bezier;
use crate::geometry_utilities::types::*;
use crate::path_collection::ItemId;
use crate::segment::{reverse_segments, Segment};
use std::f64::consts::TAU;

/// The segments of one path.
///
/// The list remembers which item owns it. When that item is removed from its document the
/// owner is cleared and every further access fails with [`PathError::Detached`].
/// `version` increases once per structural change and keys every derived view.
#[derive(Debug, Clone)]
pub struct SegmentList {
    segments: Vec<Segment>,
    owner: Option<ItemId>,
    version: u32,
}

impl SegmentList {
    pub(crate) fn new(owner: ItemId, segments: Vec<Segment>) -> SegmentList {
        SegmentList {
            segments,
            owner: Some(owner),
            version: 0,
        }
    }

    pub fn owner(&self) -> Result<ItemId> {
        self.owner.ok_or(PathError::Detached)
    }

    pub fn is_attached(&self) -> bool {
        self.owner.is_some()
    }

    pub(crate) fn detach(&mut self) {
        self.owner = None;
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub(crate) fn dirty(&mut self) {
        self.version = self.version.wrapping_add(1);
        log::trace!("segment list {:?} now at version {}", self.owner, self.version);
    }

    fn check(&self) -> Result<()> {
        self.owner().map(|_| ())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.as_slice()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.as_slice()?.is_empty())
    }

    /// Unchecked view for callers that already resolved the owning item.
    pub(crate) fn raw(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_slice(&self) -> Result<&[Segment]> {
        self.check()?;
        Ok(&self.segments)
    }

    pub fn iter(&self) -> Result<std::slice::Iter<'_, Segment>> {
        Ok(self.as_slice()?.iter())
    }

    pub fn get(&self, index: usize) -> Result<&Segment> {
        self.check()?;
        self.segments.get(index).ok_or(PathError::OutOfRange {
            index,
            len: self.segments.len(),
        })
    }

    pub fn first(&self) -> Result<Option<&Segment>> {
        Ok(self.as_slice()?.first())
    }

    pub fn last(&self) -> Result<Option<&Segment>> {
        Ok(self.as_slice()?.last())
    }

    fn current_point(&self, operation: &'static str) -> Result<ArtPoint> {
        self.check()?;
        self.segments
            .last()
            .map(|s| s.point)
            .ok_or(PathError::InvalidState(operation))
    }

    /// Detached copies of `start..end`, suitable to seed a new path.
    pub fn sub_list(&self, start: usize, end: usize) -> Result<Vec<Segment>> {
        self.check()?;
        self.check_range(start, end)?;
        Ok(self.segments[start..end].to_vec())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        let len = self.segments.len();
        if end > len {
            Err(PathError::OutOfRange { index: end, len })
        } else if start > end {
            Err(PathError::OutOfRange { index: start, len: end })
        } else {
            Ok(())
        }
    }

    pub fn push(&mut self, segment: Segment) -> Result<()> {
        self.check()?;
        self.segments.push(segment);
        self.dirty();
        Ok(())
    }

    pub fn insert(&mut self, index: usize, segment: Segment) -> Result<()> {
        self.check()?;
        if index > self.segments.len() {
            return Err(PathError::OutOfRange {
                index,
                len: self.segments.len(),
            });
        }
        self.segments.insert(index, segment);
        self.dirty();
        Ok(())
    }

    /// Removes `start..end` and returns the removed segments.
    pub fn remove_range(&mut self, start: usize, end: usize) -> Result<Vec<Segment>> {
        self.check()?;
        self.check_range(start, end)?;
        let removed = self.segments.drain(start..end).collect();
        self.dirty();
        Ok(removed)
    }

    pub fn set_all(&mut self, segments: Vec<Segment>) -> Result<()> {
        self.check()?;
        self.segments.clear();
        self.segments.extend(segments);
        self.dirty();
        Ok(())
    }

    pub fn move_to(&mut self, pt: ArtPoint) -> Result<()> {
        self.check()?;
        if !self.segments.is_empty() {
            return Err(PathError::InvalidState("move_to is only allowed on an empty path"));
        }
        self.push(Segment::corner(pt))
    }

    pub fn line_to(&mut self, pt: ArtPoint) -> Result<()> {
        self.current_point("use move_to before line_to")?;
        self.push(Segment::corner(pt))
    }

    pub fn curve_to(&mut self, ctrl1: ArtPoint, ctrl2: ArtPoint, to: ArtPoint) -> Result<()> {
        self.current_point("use move_to before curve_to")?;
        if let Some(last) = self.segments.last_mut() {
            last.set_control_after(ctrl1);
        }
        self.push(Segment::new(to, ctrl2 - to, ArtVector::zero()))
    }

    /// Degree-elevates the quadratic `current → ctrl → to` into a cubic.
    pub fn quad_to(&mut self, ctrl: ArtPoint, to: ArtPoint) -> Result<()> {
        let from = self.current_point("use move_to before quad_to")?;
        let ctrl1 = from + (ctrl - from) * (2.0 / 3.0);
        let ctrl2 = to + (ctrl - to) * (2.0 / 3.0);
        self.curve_to(ctrl1, ctrl2, to)
    }

    /// Circular arc around `center` from the current point to `end`. The radius is taken from
    /// the current point, `end` is used as the final anchor as given. `ccw` selects increasing
    /// angles. An `end` at the start angle draws a full circle.
    pub fn arc_to(&mut self, center: ArtPoint, end: ArtPoint, ccw: bool) -> Result<()> {
        let from = self.current_point("use move_to before arc_to")?;
        let radius = (from - center).length();
        if radius <= 1e-12 {
            log::warn!("arc_to with zero radius around {:?}, drawing a line instead", center);
            return self.line_to(end);
        }

        let start_angle = (from - center).angle_from_x_axis().radians;
        let end_angle = (end - center).angle_from_x_axis().radians;
        let mut sweep = end_angle - start_angle;
        if ccw {
            while sweep <= 0.0 {
                sweep += TAU;
            }
        } else {
            while sweep >= 0.0 {
                sweep -= TAU;
            }
        }

        let arc = lyon::geom::Arc {
            center: center.to_untyped(),
            radii: euclid::default::Vector2D::new(radius, radius),
            start_angle: euclid::Angle::radians(start_angle),
            sweep_angle: euclid::Angle::radians(sweep),
            x_rotation: euclid::Angle::zero(),
        };
        let mut pieces = Vec::with_capacity(4);
        arc.for_each_cubic_bezier(&mut |&bezier| pieces.push(bezier));

        let count = pieces.len();
        for (i, bezier) in pieces.into_iter().enumerate() {
            if let Some(last) = self.segments.last_mut() {
                last.set_control_after(ArtPoint::from_untyped(bezier.ctrl1));
            }
            let to = if i + 1 == count { end } else { ArtPoint::from_untyped(bezier.to) };
            let handle_in = ArtVector::from_untyped(bezier.ctrl2 - bezier.to);
            self.segments.push(Segment::new(to, handle_in, ArtVector::zero()));
        }
        self.dirty();
        Ok(())
    }

    /// Splits curve `index` at `t` with de Casteljau's algorithm, inserting the new boundary
    /// segment after `index`. The neighbours' handles are rewritten so the drawn shape does not
    /// change. Returns the index of the inserted segment, or `None` when `t` is not strictly
    /// inside the curve.
    pub fn divide(&mut self, index: usize, t: f64, closed: bool) -> Result<Option<usize>> {
        self.check()?;
        let len = self.segments.len();
        let curves = curve_count(len, closed);
        if index >= curves {
            return Err(PathError::OutOfRange { index, len: curves });
        }
        if t <= 0.0 || t >= 1.0 {
            return Ok(None);
        }

        let next = if index + 1 < len { index + 1 } else { 0 };
        let a = self.segments[index];
        let b = self.segments[next];
        let (left, right) = to_bezier(a.point, a.control_after(), b.control_before(), b.point).split(t);

        self.segments[index].handle_out = ArtVector::from_untyped(left.ctrl1 - left.from);
        self.segments[next].handle_in = ArtVector::from_untyped(right.ctrl2 - right.to);
        let boundary = Segment::new(
            ArtPoint::from_untyped(left.to),
            ArtVector::from_untyped(left.ctrl2 - left.to),
            ArtVector::from_untyped(right.ctrl1 - right.from),
        );
        self.segments.insert(index + 1, boundary);
        self.dirty();
        Ok(Some(index + 1))
    }

    pub fn reverse(&mut self) -> Result<()> {
        self.check()?;
        reverse_segments(&mut self.segments);
        self.dirty();
        Ok(())
    }

    pub fn transform(&mut self, transform: &ArtTransform) -> Result<()> {
        self.check()?;
        for segment in self.segments.iter_mut() {
            *segment = segment.transformed(transform);
        }
        self.dirty();
        Ok(())
    }

    /// Overwrites the list with the store's copy, sized to the count the store reported.
    /// The list itself, and its allocation, stay the same.
    pub(crate) fn resync(&mut self, count: usize, fetched: Vec<Segment>) {
        if fetched.len() != count {
            log::warn!(
                "store reported {} segments but returned {} for {:?}",
                count,
                fetched.len(),
                self.owner
            );
        }
        self.segments.clear();
        self.segments.extend(fetched.into_iter().take(count));
        self.dirty();
        log::debug!("resynced {:?} to {} segments", self.owner, self.segments.len());
    }
}
