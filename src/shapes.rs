//! Segment layouts of the standard shapes. All are closed and run counter-clockwise.

use crate::error::{PathError, Result};
use crate::geometry_utilities::types::*;
use crate::segment::Segment;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Handle length of a quarter circle of radius 1.
pub const KAPPA: f64 = 0.552_284_749_830_793_4;

pub fn rectangle(rect: &ArtRect) -> Vec<Segment> {
    vec![
        Segment::corner(point(rect.min_x(), rect.min_y())),
        Segment::corner(point(rect.max_x(), rect.min_y())),
        Segment::corner(point(rect.max_x(), rect.max_y())),
        Segment::corner(point(rect.min_x(), rect.max_y())),
    ]
}

/// Rectangle with elliptical corners of radii `radius.x` and `radius.y`. The radii are
/// clamped to half the rectangle's size.
pub fn rounded_rectangle(rect: &ArtRect, radius: ArtVector) -> Vec<Segment> {
    let rx = radius.x.abs().min(rect.width() * 0.5);
    let ry = radius.y.abs().min(rect.height() * 0.5);
    if rx <= 0.0 || ry <= 0.0 {
        return rectangle(rect);
    }

    let (hx, hy) = (rx * KAPPA, ry * KAPPA);
    let (x0, y0, x1, y1) = (rect.min_x(), rect.min_y(), rect.max_x(), rect.max_y());
    vec![
        Segment::new(point(x0 + rx, y0), vector(-hx, 0.0), vector(0.0, 0.0)),
        Segment::new(point(x1 - rx, y0), vector(0.0, 0.0), vector(hx, 0.0)),
        Segment::new(point(x1, y0 + ry), vector(0.0, -hy), vector(0.0, 0.0)),
        Segment::new(point(x1, y1 - ry), vector(0.0, 0.0), vector(0.0, hy)),
        Segment::new(point(x1 - rx, y1), vector(hx, 0.0), vector(0.0, 0.0)),
        Segment::new(point(x0 + rx, y1), vector(0.0, 0.0), vector(-hx, 0.0)),
        Segment::new(point(x0, y1 - ry), vector(0.0, hy), vector(0.0, 0.0)),
        Segment::new(point(x0, y0 + ry), vector(0.0, 0.0), vector(0.0, -hy)),
    ]
}

/// Ellipse inscribed in `rect`, starting at its right-most point.
pub fn oval(rect: &ArtRect) -> Vec<Segment> {
    let center = rect.center();
    let arc = lyon::geom::Arc {
        center: center.to_untyped(),
        radii: euclid::default::Vector2D::new(rect.width() * 0.5, rect.height() * 0.5),
        start_angle: euclid::Angle::zero(),
        sweep_angle: euclid::Angle::radians(TAU),
        x_rotation: euclid::Angle::zero(),
    };

    let mut segments: Vec<Segment> = Vec::with_capacity(4);
    arc.for_each_cubic_bezier(&mut |&bezier| {
        if let Some(last) = segments.last_mut() {
            last.handle_out = ArtVector::from_untyped(bezier.ctrl1 - bezier.from);
        } else {
            segments.push(Segment::new(
                ArtPoint::from_untyped(bezier.from),
                ArtVector::zero(),
                ArtVector::from_untyped(bezier.ctrl1 - bezier.from),
            ));
        }
        segments.push(Segment::new(
            ArtPoint::from_untyped(bezier.to),
            ArtVector::from_untyped(bezier.ctrl2 - bezier.to),
            ArtVector::zero(),
        ));
    });

    // The last piece ends where the first started.
    if let Some(end) = segments.pop() {
        segments[0].handle_in = end.handle_in;
    }
    segments
}

fn vertices(center: ArtPoint, count: usize, radius: impl Fn(usize) -> f64) -> Vec<Segment> {
    (0..count)
        .map(|i| {
            let angle = FRAC_PI_2 + TAU * i as f64 / count as f64;
            let r = radius(i);
            Segment::corner(center + vector(angle.cos() * r, angle.sin() * r))
        })
        .collect()
}

/// Polygon with `sides` corners on a circle, the first one straight above `center`.
pub fn regular_polygon(center: ArtPoint, sides: usize, radius: f64) -> Result<Vec<Segment>> {
    if sides < 3 {
        return Err(PathError::InvalidState("a polygon needs at least 3 sides"));
    }
    Ok(vertices(center, sides, |_| radius))
}

/// Star with `points` tips on `radius1`, alternating with inner corners on `radius2`.
pub fn star(center: ArtPoint, points: usize, radius1: f64, radius2: f64) -> Result<Vec<Segment>> {
    if points < 2 {
        return Err(PathError::InvalidState("a star needs at least 2 points"));
    }
    Ok(vertices(center, points * 2, |i| if i % 2 == 0 { radius1 } else { radius2 }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> ArtRect {
        ArtRect::new(point(x, y), euclid::Size2D::new(w, h))
    }

    #[test]
    fn oval_handles_use_the_circle_constant() {
        let segments = oval(&rect(-10.0, -10.0, 20.0, 20.0));
        assert_eq!(segments.len(), 4);
        assert_relative_eq!(segments[0].point.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(segments[0].point.y, 0.0, epsilon = 1e-9);
        for segment in &segments {
            assert_relative_eq!(segment.handle_in.length(), 10.0 * KAPPA, epsilon = 1e-3);
            assert_relative_eq!(segment.handle_out.length(), 10.0 * KAPPA, epsilon = 1e-3);
        }
    }

    #[test]
    fn rounded_rectangle_clamps_the_radius() {
        let segments = rounded_rectangle(&rect(0.0, 0.0, 10.0, 4.0), vector(3.0, 3.0));
        assert_eq!(segments.len(), 8);
        assert_eq!(segments[2].point, point(10.0, 2.0));
        assert_eq!(segments[3].point, point(10.0, 2.0));

        assert_eq!(rounded_rectangle(&rect(0.0, 0.0, 10.0, 4.0), vector(0.0, 0.0)).len(), 4);
    }

    #[test]
    fn polygon_starts_at_the_top() {
        let segments = regular_polygon(point(0.0, 0.0), 6, 10.0).unwrap();
        assert_eq!(segments.len(), 6);
        assert_relative_eq!(segments[0].point.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(segments[0].point.y, 10.0, epsilon = 1e-9);
        assert!(regular_polygon(point(0.0, 0.0), 2, 10.0).is_err());
    }

    #[test]
    fn star_alternates_radii() {
        let segments = star(point(5.0, 5.0), 5, 10.0, 4.0).unwrap();
        assert_eq!(segments.len(), 10);
        for (i, segment) in segments.iter().enumerate() {
            let expected = if i % 2 == 0 { 10.0 } else { 4.0 };
            assert_relative_eq!((segment.point - point(5.0, 5.0)).length(), expected, epsilon = 1e-9);
        }
    }
}
