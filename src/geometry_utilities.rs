use arrayvec::ArrayVec;
use lyon::geom::CubicBezierSegment;
use types::*;

pub mod types {
    pub struct ArtSpace;
    pub type ArtPoint = euclid::Point2D<f64, ArtSpace>;
    pub type ArtVector = euclid::Vector2D<f64, ArtSpace>;
    pub type ArtLength = euclid::Length<f64, ArtSpace>;
    pub type ArtRect = euclid::Rect<f64, ArtSpace>;
    pub type ArtBox = euclid::Box2D<f64, ArtSpace>;
    pub type ArtTransform = euclid::Transform2D<f64, ArtSpace, ArtSpace>;

    /// Cubic bezier in untyped coordinates, the form lyon's geometry routines work on.
    pub type Bezier = lyon::geom::CubicBezierSegment<f64>;
    pub type UntypedPoint = euclid::default::Point2D<f64>;

    pub fn point(x: f64, y: f64) -> ArtPoint {
        ArtPoint::new(x, y)
    }

    pub fn vector(x: f64, y: f64) -> ArtVector {
        ArtVector::new(x, y)
    }
}

/// Deepest recursion used by the adaptive flattening and hit testing.
pub const MAX_SUBDIVISION_DEPTH: u32 = 16;
const HIT_STACK_SIZE: usize = MAX_SUBDIVISION_DEPTH as usize + 2;
const NEWTON_ITERATIONS: usize = 6;

pub fn evaluate_cubic_bezier<U>(
    p0: euclid::Point2D<f64, U>,
    p1: euclid::Point2D<f64, U>,
    p2: euclid::Point2D<f64, U>,
    p3: euclid::Point2D<f64, U>,
    t: f64,
) -> euclid::Point2D<f64, U> {
    let p0 = p0.to_untyped().to_vector();
    let p1 = p1.to_untyped().to_vector();
    let p2 = p2.to_untyped().to_vector();
    let p3 = p3.to_untyped().to_vector();
    let t1 = 1.0 - t;
    let t2 = t1 * t1;
    let t3 = t1 * t1 * t1;
    (p0 * t3 + p1 * (3.0 * t2 * t) + p2 * (3.0 * t1 * t * t) + p3 * (t * t * t))
        .to_point()
        .cast_unit()
}

pub fn closest_point_on_segment<U>(
    start: euclid::Point2D<f64, U>,
    end: euclid::Point2D<f64, U>,
    point: euclid::Point2D<f64, U>,
) -> euclid::Point2D<f64, U> {
    start + (end - start) * segment_parameter(start, end, point)
}

/// Parameter in [0, 1] of the point on `start..end` closest to `point`.
pub fn segment_parameter<U>(
    start: euclid::Point2D<f64, U>,
    end: euclid::Point2D<f64, U>,
    point: euclid::Point2D<f64, U>,
) -> f64 {
    let dir = end - start;
    let sqr_length = dir.square_length();

    if sqr_length <= 1e-24 {
        0.0
    } else {
        ((point - start).dot(dir) / sqr_length).max(0.0).min(1.0)
    }
}

pub fn square_distance_segment_point<U>(
    a: euclid::Point2D<f64, U>,
    b: euclid::Point2D<f64, U>,
    p: euclid::Point2D<f64, U>,
) -> f64 {
    (closest_point_on_segment(a, b, p) - p).square_length()
}

pub fn to_bezier(p0: ArtPoint, p1: ArtPoint, p2: ArtPoint, p3: ArtPoint) -> Bezier {
    CubicBezierSegment {
        from: p0.to_untyped(),
        ctrl1: p1.to_untyped(),
        ctrl2: p2.to_untyped(),
        to: p3.to_untyped(),
    }
}

/// Bounding box of the control polygon. Always contains the curve.
pub fn control_box(bez: &Bezier) -> euclid::default::Box2D<f64> {
    euclid::default::Box2D::from_points([bez.from, bez.ctrl1, bez.ctrl2, bez.to].iter())
}

fn square_distance_to_box(b: &euclid::default::Box2D<f64>, p: UntypedPoint) -> f64 {
    let dx = (b.min.x - p.x).max(0.0).max(p.x - b.max.x);
    let dy = (b.min.y - p.y).max(0.0).max(p.y - b.max.y);
    dx * dx + dy * dy
}

/// How far the control points stray from the positions that would make the curve a
/// uniformly parameterized straight line. Below the flatness tolerance the chord is
/// a good stand-in for the curve both in shape and in parameter.
pub fn parametric_deviation(bez: &Bezier) -> f64 {
    let third = bez.from.lerp(bez.to, 1.0 / 3.0);
    let two_thirds = bez.from.lerp(bez.to, 2.0 / 3.0);
    (bez.ctrl1 - third).length().max((bez.ctrl2 - two_thirds).length())
}

/// Distance of the control points from the chord.
pub fn chord_deviation(bez: &Bezier) -> f64 {
    square_distance_segment_point(bez.from, bez.to, bez.ctrl1)
        .max(square_distance_segment_point(bez.from, bez.to, bez.ctrl2))
        .sqrt()
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlatPiece {
    pub t0: f64,
    pub t1: f64,
    pub length: f64,
}

/// Recursively halves `bez` until every piece is flat within `flatness`, appending the pieces
/// in parameter order.
pub fn flatten_pieces(bez: &Bezier, flatness: f64, out: &mut Vec<FlatPiece>) {
    fn recurse(bez: &Bezier, t0: f64, t1: f64, depth: u32, flatness: f64, out: &mut Vec<FlatPiece>) {
        if depth >= MAX_SUBDIVISION_DEPTH || parametric_deviation(bez) <= flatness {
            out.push(FlatPiece {
                t0,
                t1,
                length: (bez.to - bez.from).length(),
            });
        } else {
            let (left, right) = bez.split(0.5);
            let mid = (t0 + t1) * 0.5;
            recurse(&left, t0, mid, depth + 1, flatness, out);
            recurse(&right, mid, t1, depth + 1, flatness, out);
        }
    }

    recurse(bez, 0.0, 1.0, 0, flatness.max(1e-9), out);
}

pub fn arc_length(bez: &Bezier, flatness: f64) -> f64 {
    let mut pieces = Vec::new();
    flatten_pieces(bez, flatness, &mut pieces);
    pieces.iter().map(|p| p.length).sum()
}

/// Inverse of the arc length. `None` when `length` is negative or longer than the curve.
pub fn parameter_at_length(bez: &Bezier, length: f64, flatness: f64) -> Option<f64> {
    if length < 0.0 {
        return None;
    }

    let mut pieces = Vec::new();
    flatten_pieces(bez, flatness, &mut pieces);
    let total: f64 = pieces.iter().map(|p| p.length).sum();
    // Straight curves report their exact chord, which can exceed the summed pieces by rounding.
    if length > total * (1.0 + 1e-9) + 1e-12 {
        return None;
    }
    if length >= total {
        return Some(1.0);
    }

    let mut start = 0.0;
    for piece in &pieces {
        if start + piece.length >= length {
            let u = if piece.length > 0.0 { (length - start) / piece.length } else { 0.0 };
            return Some(piece.t0 + (piece.t1 - piece.t0) * u.max(0.0).min(1.0));
        }
        start += piece.length;
    }
    Some(1.0)
}

pub fn derivative(bez: &Bezier, t: f64) -> euclid::default::Vector2D<f64> {
    let mt = 1.0 - t;
    (bez.ctrl1 - bez.from) * (3.0 * mt * mt)
        + (bez.ctrl2 - bez.ctrl1) * (6.0 * mt * t)
        + (bez.to - bez.ctrl2) * (3.0 * t * t)
}

pub fn second_derivative(bez: &Bezier, t: f64) -> euclid::default::Vector2D<f64> {
    let a = bez.ctrl2.to_vector() - bez.ctrl1.to_vector() * 2.0 + bez.from.to_vector();
    let b = bez.to.to_vector() - bez.ctrl2.to_vector() * 2.0 + bez.ctrl1.to_vector();
    a * (6.0 * (1.0 - t)) + b * (6.0 * t)
}

/// Newton iterations on `(B(t) - p) · B'(t) = 0`, only accepting steps that bring the curve closer.
fn refine_closest(bez: &Bezier, p: UntypedPoint, mut t: f64, mut sqr_dist: f64) -> (f64, f64) {
    for _ in 0..NEWTON_ITERATIONS {
        let diff = bez.sample(t) - p;
        let d1 = derivative(bez, t);
        let d2 = second_derivative(bez, t);
        let denominator = d1.dot(d1) + diff.dot(d2);
        if denominator.abs() < 1e-12 {
            break;
        }
        let next = (t - diff.dot(d1) / denominator).max(0.0).min(1.0);
        let next_dist = (bez.sample(next) - p).square_length();
        if next_dist >= sqr_dist {
            break;
        }
        t = next;
        sqr_dist = next_dist;
    }
    (t, sqr_dist)
}

/// Finds the parameter of the point on `bez` closest to `p`, provided that point lies within
/// `epsilon`. Returns `(t, distance)`.
pub fn hit_test_bezier(bez: &Bezier, p: UntypedPoint, epsilon: f64) -> Option<(f64, f64)> {
    let sqr_epsilon = epsilon * epsilon;
    if square_distance_to_box(&control_box(bez), p) > sqr_epsilon {
        return None;
    }

    let flatness = (epsilon * 0.1).max(1e-9);
    let mut best: Option<(f64, f64)> = None;
    let mut stack: ArrayVec<(Bezier, f64, f64, u32), HIT_STACK_SIZE> = ArrayVec::new();
    stack.push((*bez, 0.0, 1.0, 0));

    while let Some((curve, t0, t1, depth)) = stack.pop() {
        let bound = best.map_or(sqr_epsilon, |(_, d)| d.min(sqr_epsilon));
        if square_distance_to_box(&control_box(&curve), p) > bound {
            continue;
        }

        if depth >= MAX_SUBDIVISION_DEPTH || parametric_deviation(&curve) <= flatness {
            let u = segment_parameter(curve.from, curve.to, p);
            let t = t0 + (t1 - t0) * u;
            let d = (curve.from.lerp(curve.to, u) - p).square_length();
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((t, d));
            }
        } else {
            let (left, right) = curve.split(0.5);
            let mid = (t0 + t1) * 0.5;
            // Right half first so the left half is examined first.
            stack.push((right, mid, t1, depth + 1));
            stack.push((left, t0, mid, depth + 1));
        }
    }

    let (t, _) = best?;
    let (t, sqr_dist) = refine_closest(bez, p, t, (bez.sample(t) - p).square_length());
    if sqr_dist <= sqr_epsilon {
        Some((t, sqr_dist.sqrt()))
    } else {
        None
    }
}

/// Signed area between the curve and the origin, summed over a closed contour this is the
/// enclosed area (positive for the same orientation the shoelace formula calls positive).
pub fn bezier_area(bez: &Bezier) -> f64 {
    let (x0, y0) = (bez.from.x, bez.from.y);
    let (x1, y1) = (bez.ctrl1.x, bez.ctrl1.y);
    let (x2, y2) = (bez.ctrl2.x, bez.ctrl2.y);
    let (x3, y3) = (bez.to.x, bez.to.y);
    3.0 * ((y3 - y0) * (x1 + x2) - (x3 - x0) * (y1 + y2) + y1 * (x0 - x2) - x1 * (y0 - y2)
        + y3 * (x2 + x0 / 3.0)
        - x3 * (y2 + y0 / 3.0))
        / 20.0
}

/// Number of uniform steps after which a polyline through the curve stays within `flatness`
/// (Wang's bound).
pub fn flattening_step_count(bez: &Bezier, flatness: f64) -> usize {
    let dd1 = (bez.from.to_vector() - bez.ctrl1.to_vector() * 2.0 + bez.ctrl2.to_vector()).length();
    let dd2 = (bez.ctrl1.to_vector() - bez.ctrl2.to_vector() * 2.0 + bez.to.to_vector()).length();
    let m = dd1.max(dd2);
    ((0.75 * m / flatness.max(1e-9)).sqrt().ceil() as usize).max(1)
}
