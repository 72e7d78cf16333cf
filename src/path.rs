use crate::curve::{curve_count, CurveList};
use crate::error::{PathError, Result};
use crate::geometry_utilities::types::*;
use crate::geometry_utilities::{bezier_area, to_bezier};
use crate::hit_test::{HitKind, HitTest};
use crate::path_collection::{ItemId, PathCollection};
use crate::path_item::{PathItem, Style};
use crate::segment::Segment;
use crate::segment_list::SegmentList;
use crate::shape::{PathOp, Shape};
use crate::store::ArtHandle;
use std::cell::Cell;

/// A single contour.
///
/// The segment data here is the local edit buffer; the store behind `handle` holds the
/// authoritative copy. Use [`crate::document::PathMut`] to edit a path so that edits are
/// tracked and flushed.
#[derive(Debug)]
pub struct Path {
    segments: SegmentList,
    closed: bool,
    style: Style,
    handle: ArtHandle,
    /// `(version, curve count)` of the last count computed.
    curve_count: Cell<Option<(u32, usize)>>,
}

impl Path {
    pub(crate) fn new(id: ItemId, handle: ArtHandle, segments: Vec<Segment>, closed: bool, style: Style) -> Path {
        Path {
            segments: SegmentList::new(id, segments),
            closed,
            style,
            handle,
            curve_count: Cell::new(None),
        }
    }

    pub fn id(&self) -> Result<ItemId> {
        self.segments.owner()
    }

    pub fn segments(&self) -> &SegmentList {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut SegmentList {
        &mut self.segments
    }

    pub fn version(&self) -> u32 {
        self.segments.version()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Changing the flag changes the number of curves, so it counts as a structural edit.
    pub(crate) fn set_closed(&mut self, closed: bool) -> Result<()> {
        self.segments.owner()?;
        if self.closed != closed {
            self.closed = closed;
            self.segments.dirty();
        }
        Ok(())
    }

    pub(crate) fn detach(&mut self) {
        self.segments.detach();
    }

    pub fn curve_count(&self) -> Result<usize> {
        let len = self.segments.len()?;
        let version = self.segments.version();
        match self.curve_count.get() {
            Some((cached, count)) if cached == version => Ok(count),
            _ => {
                let count = curve_count(len, self.closed);
                log::trace!("curve count of {:?} is {} at version {}", self.handle, count, version);
                self.curve_count.set(Some((version, count)));
                Ok(count)
            }
        }
    }

    pub fn curves(&self) -> Result<CurveList<'_>> {
        let segments = self.segments.as_slice()?;
        debug_assert_eq!(curve_count(segments.len(), self.closed), self.curve_count()?);
        Ok(CurveList::new(segments, self.closed))
    }

    pub fn length(&self, flatness: f64) -> Result<f64> {
        Ok(self.curves()?.iter().map(|curve| curve.length(flatness)).sum())
    }

    /// Signed enclosed area. Open paths are measured as if closed by a straight line.
    /// Counter-clockwise contours are positive.
    pub fn area(&self) -> Result<f64> {
        let curves = self.curves()?;
        let mut area: f64 = curves.iter().map(|curve| bezier_area(&curve.to_bezier())).sum();
        let segments = self.segments.raw();
        if !self.closed && segments.len() > 1 {
            let (last, first) = (segments[segments.len() - 1].point, segments[0].point);
            area += bezier_area(&to_bezier(last, last, first, first));
        }
        Ok(area)
    }

    pub fn bounds(&self) -> Result<Option<ArtBox>> {
        let curves = self.curves()?;
        let from_curves = curves.iter().map(|curve| curve.bounds()).reduce(|a, b| a.union(&b));
        Ok(from_curves.or_else(|| self.segments.raw().first().map(|s| ArtBox::new(s.point, s.point))))
    }

    /// The point of the path closest to `point`, if any is within `epsilon`.
    pub fn hit_test(&self, point: ArtPoint, epsilon: f64) -> Result<Option<HitTest>> {
        let mut best: Option<(f64, HitTest)> = None;
        for curve in self.curves()?.iter() {
            if let Some(t) = curve.hit_test(point, epsilon) {
                let hit = curve.point_at(t);
                let distance = (hit - point).length();
                if best.map_or(true, |(d, _)| distance < d) {
                    best = Some((distance, HitTest::new(curve.index(), t, hit)));
                }
            }
        }
        Ok(best.map(|(_, hit)| hit))
    }

    /// The position `length` along the path.
    pub fn position_with_length(&self, length: f64, flatness: f64) -> Result<Option<HitTest>> {
        let curves = self.curves()?;
        if length < 0.0 {
            return Ok(None);
        }

        let mut start = 0.0;
        for curve in curves.iter() {
            let curve_length = curve.length(flatness);
            if start + curve_length >= length {
                let t = curve
                    .parameter_with_length((length - start).min(curve_length), flatness)
                    .unwrap_or(1.0);
                return Ok(Some(HitTest::new(curve.index(), t, curve.point_at(t))));
            }
            start += curve_length;
        }

        // Rounding in the summed lengths can miss the very end.
        match curves.last() {
            Some(last) if length - start <= 1e-9 * start.max(1.0) => Ok(Some(HitTest {
                kind: HitKind::Anchor,
                curve: last.index(),
                parameter: 1.0,
                point: last.point2(),
            })),
            _ => Ok(None),
        }
    }

    pub(crate) fn transform(&mut self, transform: &ArtTransform) -> Result<()> {
        self.segments.transform(transform)
    }

    /// Cuts the path at `parameter` on curve `index`. The receiver keeps the head and the
    /// segments of the tail are returned. `None` when the position is not inside the path.
    pub(crate) fn split_off(&mut self, index: usize, parameter: f64) -> Result<Option<Vec<Segment>>> {
        let (index, parameter) = if parameter >= 1.0 {
            match index.checked_add(1) {
                Some(next) => (next, 0.0),
                None => return Ok(None),
            }
        } else {
            (index, parameter.max(0.0))
        };

        let len = self.segments.len()?;
        if len < 2 || index > len - 2 {
            return Ok(None);
        }

        if parameter == 0.0 {
            if index == 0 {
                return Ok(None);
            }
            let tail = self.segments.sub_list(index, len)?;
            self.segments.remove_range(index + 1, len)?;
            Ok(Some(tail))
        } else {
            self.segments.divide(index, parameter, self.closed)?;
            let len = self.segments.len()?;
            let tail = self.segments.sub_list(index + 1, len)?;
            self.segments.remove_range(index + 2, len)?;
            Ok(Some(tail))
        }
    }

    /// Draws `ops` onto this contour and returns how many were consumed.
    ///
    /// With `connect` set, a move on a non-empty path joins the contours: it is dropped when it
    /// starts where the path ends and becomes a line otherwise. `Close` closes the path and ends
    /// the contour, as does any other move once the path has a contour.
    pub(crate) fn append(&mut self, ops: &[PathOp], connect: bool) -> Result<usize> {
        let initial_len = self.segments.len()?;
        for (i, op) in ops.iter().enumerate() {
            match *op {
                PathOp::MoveTo(to) => {
                    if !connect || initial_len == 0 {
                        if self.segments.is_empty()? {
                            self.segments.move_to(to)?;
                        } else if i == 0 {
                            return Err(PathError::InvalidState("path already has a contour"));
                        } else {
                            log::debug!("stopped appending to {:?} at a second contour", self.handle);
                            return Ok(i);
                        }
                    } else if self.segments.last()?.map(|s| s.point) != Some(to) {
                        self.segments.line_to(to)?;
                    }
                }
                PathOp::LineTo(to) => self.segments.line_to(to)?,
                PathOp::QuadTo(ctrl, to) => self.segments.quad_to(ctrl, to)?,
                PathOp::CubicTo(ctrl1, ctrl2, to) => self.segments.curve_to(ctrl1, ctrl2, to)?,
                PathOp::Close => {
                    self.set_closed(true)?;
                    return Ok(i + 1);
                }
            }
        }
        Ok(ops.len())
    }
}

impl PathItem for Path {
    fn style(&self) -> &Style {
        &self.style
    }

    fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    fn handle(&self) -> ArtHandle {
        self.handle
    }

    fn build_shape(&self, _items: &PathCollection, shape: &mut Shape) -> Result<()> {
        let segments = self.segments.as_slice()?;
        let first = match segments.first() {
            Some(first) => first,
            None => return Ok(()),
        };

        shape.push(PathOp::MoveTo(first.point));
        for pair in segments.windows(2) {
            shape.push(PathOp::CubicTo(pair[0].control_after(), pair[1].control_before(), pair[1].point));
        }
        if self.closed {
            let last = &segments[segments.len() - 1];
            shape.push(PathOp::CubicTo(last.control_after(), first.control_before(), first.point));
            shape.push(PathOp::Close);
        }
        Ok(())
    }
}
