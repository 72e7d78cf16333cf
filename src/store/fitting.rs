//! Least-squares fitting of cubic curves through the anchors of a polyline
//! (Schneider, "An Algorithm for Automatically Fitting Digitized Curves").

use crate::config::FitOptions;
use crate::geometry_utilities::types::*;
use crate::geometry_utilities::{derivative, second_derivative};
use crate::segment::Segment;
use lyon::geom::CubicBezierSegment;

type Point = euclid::default::Point2D<f64>;
type Vector = euclid::default::Vector2D<f64>;

const EPSILON: f64 = 1e-12;
const MAX_ITERATIONS: usize = 4;

fn unit(v: Vector) -> Vector {
    let length = v.length();
    if length > EPSILON {
        v / length
    } else {
        v
    }
}

/// Replaces the anchors of `segments` with a smaller number of smooth curves passing within
/// `tolerance / scale` of every anchor. Anchors where the path turns by more than `threshold`
/// radians stay corners.
pub fn fit_segments(segments: &[Segment], closed: bool, options: &FitOptions) -> Vec<Segment> {
    let mut points: Vec<Point> = Vec::with_capacity(segments.len() + 1);
    for segment in segments {
        let p = segment.point.to_untyped();
        if points.last().map_or(true, |&last| (last - p).square_length() > EPSILON) {
            points.push(p);
        }
    }
    if closed && points.len() > 2 {
        if (points[0] - points[points.len() - 1]).square_length() <= EPSILON {
            points.pop();
        }
        points.push(points[0]);
    }

    if points.len() < 3 {
        let mut result: Vec<Segment> = points.iter().map(|&p| Segment::corner(ArtPoint::from_untyped(p))).collect();
        if closed && result.len() > 1 && result[0].point == result[result.len() - 1].point {
            result.pop();
        }
        return result;
    }

    let scale = if options.scale > EPSILON { options.scale } else { 1.0 };
    let tolerance = options.tolerance / scale;
    let error = tolerance * tolerance;
    let radius = options.corner_radius.max(1) as usize;

    let last = points.len() - 1;
    let mut corners = vec![0];
    for i in 1..last {
        let before = points[i] - points[i.saturating_sub(radius)];
        let after = points[(i + radius).min(last)] - points[i];
        if before.cross(after).atan2(before.dot(after)).abs() > options.threshold {
            corners.push(i);
        }
    }
    corners.push(last);

    let mut result = vec![Segment::corner(ArtPoint::from_untyped(points[0]))];
    for run in corners.windows(2) {
        let (first, end) = (run[0], run[1]);
        if end - first == 1 {
            result.push(Segment::corner(ArtPoint::from_untyped(points[end])));
            continue;
        }

        let tan1 = unit(points[first + 1] - points[first]);
        let tan2 = unit(points[end - 1] - points[end]);
        let mut curves = Vec::new();
        fit_cubic(&points, first, end, tan1, tan2, error, &mut curves);
        for curve in curves {
            if let Some(previous) = result.last_mut() {
                previous.handle_out = ArtVector::from_untyped(curve.ctrl1 - curve.from);
            }
            result.push(Segment::new(
                ArtPoint::from_untyped(curve.to),
                ArtVector::from_untyped(curve.ctrl2 - curve.to),
                ArtVector::zero(),
            ));
        }
    }

    if closed {
        if let Some(end) = result.pop() {
            result[0].handle_in = end.handle_in;
        }
    }
    result
}

fn fit_cubic(
    points: &[Point],
    first: usize,
    last: usize,
    tan1: Vector,
    tan2: Vector,
    error: f64,
    out: &mut Vec<CubicBezierSegment<f64>>,
) {
    if last - first == 1 {
        let dist = (points[last] - points[first]).length() / 3.0;
        out.push(CubicBezierSegment {
            from: points[first],
            ctrl1: points[first] + tan1 * dist,
            ctrl2: points[last] + tan2 * dist,
            to: points[last],
        });
        return;
    }

    let mut parameters = chord_length_parameterize(points, first, last);
    let mut max_error = (error * 4.0).max(error);
    let mut split = (first + last) / 2;
    let mut in_order = true;

    for _ in 0..=MAX_ITERATIONS {
        let curve = generate_bezier(points, first, last, &parameters, tan1, tan2);
        let (max, index) = find_max_error(points, first, last, &curve, &parameters);
        if max < error && in_order {
            out.push(curve);
            return;
        }
        split = index;
        if max >= max_error {
            break;
        }
        in_order = reparameterize(points, first, &mut parameters, &curve);
        max_error = max;
    }

    let tan_center = unit(points[split - 1] - points[split + 1]);
    fit_cubic(points, first, split, tan1, tan_center, error, out);
    fit_cubic(points, split, last, -tan_center, tan2, error, out);
}

fn chord_length_parameterize(points: &[Point], first: usize, last: usize) -> Vec<f64> {
    let mut u = Vec::with_capacity(last - first + 1);
    u.push(0.0);
    for i in first + 1..=last {
        let previous = u[u.len() - 1];
        u.push(previous + (points[i] - points[i - 1]).length());
    }
    let total = u[u.len() - 1];
    if total > EPSILON {
        for value in u.iter_mut() {
            *value /= total;
        }
    }
    u
}

fn generate_bezier(
    points: &[Point],
    first: usize,
    last: usize,
    parameters: &[f64],
    tan1: Vector,
    tan2: Vector,
) -> CubicBezierSegment<f64> {
    let pt1 = points[first];
    let pt2 = points[last];
    let mut c = [[0.0f64; 2]; 2];
    let mut x = [0.0f64; 2];

    for (i, &u) in parameters.iter().enumerate() {
        let t = 1.0 - u;
        let b = 3.0 * u * t;
        let b0 = t * t * t;
        let b1 = b * t;
        let b2 = b * u;
        let b3 = u * u * u;
        let a1 = tan1 * b1;
        let a2 = tan2 * b2;
        let tmp = points[first + i].to_vector() - pt1.to_vector() * (b0 + b1) - pt2.to_vector() * (b2 + b3);
        c[0][0] += a1.dot(a1);
        c[0][1] += a1.dot(a2);
        c[1][1] += a2.dot(a2);
        x[0] += a1.dot(tmp);
        x[1] += a2.dot(tmp);
    }
    c[1][0] = c[0][1];

    let det_c0_c1 = c[0][0] * c[1][1] - c[1][0] * c[0][1];
    let (mut alpha1, mut alpha2) = if det_c0_c1.abs() > EPSILON {
        let det_c0_x = c[0][0] * x[1] - c[1][0] * x[0];
        let det_x_c1 = x[0] * c[1][1] - x[1] * c[0][1];
        (det_x_c1 / det_c0_c1, det_c0_x / det_c0_c1)
    } else {
        let c0 = c[0][0] + c[0][1];
        let c1 = c[1][0] + c[1][1];
        let alpha = if c0.abs() > EPSILON {
            x[0] / c0
        } else if c1.abs() > EPSILON {
            x[1] / c1
        } else {
            0.0
        };
        (alpha, alpha)
    };

    let segment_length = (pt2 - pt1).length();
    let eps = EPSILON * segment_length;
    if alpha1 < eps || alpha2 < eps {
        alpha1 = segment_length / 3.0;
        alpha2 = alpha1;
    } else {
        // Handles that overshoot each other produce loops, fall back to the heuristic.
        let line = pt2 - pt1;
        if (tan1 * alpha1).dot(line) - (tan2 * alpha2).dot(line) > segment_length * segment_length {
            alpha1 = segment_length / 3.0;
            alpha2 = alpha1;
        }
    }

    CubicBezierSegment {
        from: pt1,
        ctrl1: pt1 + tan1 * alpha1,
        ctrl2: pt2 + tan2 * alpha2,
        to: pt2,
    }
}

/// Squared distance of the worst fitting interior point, and its index.
fn find_max_error(
    points: &[Point],
    first: usize,
    last: usize,
    curve: &CubicBezierSegment<f64>,
    parameters: &[f64],
) -> (f64, usize) {
    let mut index = (first + last) / 2;
    let mut max = 0.0;
    for i in first + 1..last {
        let dist = (curve.sample(parameters[i - first]) - points[i]).square_length();
        if dist >= max {
            max = dist;
            index = i;
        }
    }
    (max, index)
}

/// Moves every parameter to a better root with one Newton step. Returns false when the
/// parameters are no longer increasing.
fn reparameterize(points: &[Point], first: usize, parameters: &mut [f64], curve: &CubicBezierSegment<f64>) -> bool {
    for (i, u) in parameters.iter_mut().enumerate() {
        let diff = curve.sample(*u) - points[first + i];
        let d1 = derivative(curve, *u);
        let d2 = second_derivative(curve, *u);
        let denominator = d1.dot(d1) + diff.dot(d2);
        if denominator.abs() > EPSILON {
            *u = (*u - diff.dot(d1) / denominator).max(0.0).min(1.0);
        }
    }
    parameters.windows(2).all(|w| w[1] > w[0])
}
