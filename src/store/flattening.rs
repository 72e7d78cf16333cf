use crate::config::FlattenOptions;
use crate::curve::curve_count;
use crate::geometry_utilities::types::*;
use crate::geometry_utilities::{arc_length, flattening_step_count, parameter_at_length, square_distance_segment_point, to_bezier};
use crate::segment::Segment;

fn is_linear(a: &Segment, b: &Segment) -> bool {
    a.handle_out == ArtVector::zero() && b.handle_in == ArtVector::zero()
}

/// Replaces every curve with a polyline of points evenly spaced along its length. Straight
/// curves are kept as single lines.
pub fn flatten_segments(segments: &[Segment], closed: bool, options: &FlattenOptions) -> Vec<Segment> {
    let n = segments.len();
    if n == 0 {
        return Vec::new();
    }

    let max_distance = options.max_point_distance.max(1e-9);
    // Spacing needs the lengths far more precisely than the output flatness.
    let precision = (options.flatness * 0.01).max(1e-6);
    let mut result = vec![Segment::corner(segments[0].point)];
    for index in 0..curve_count(n, closed) {
        let a = &segments[index];
        let b = &segments[(index + 1) % n];
        let wraps = index + 1 == n;

        if !is_linear(a, b) {
            let bez = to_bezier(a.point, a.control_after(), b.control_before(), b.point);
            let length = arc_length(&bez, precision);
            let steps = ((length / max_distance).ceil() as usize).max(flattening_step_count(&bez, options.flatness));
            for step in 1..steps {
                let t = parameter_at_length(&bez, length * step as f64 / steps as f64, precision).unwrap_or(1.0);
                result.push(Segment::corner(ArtPoint::from_untyped(bez.sample(t))));
            }
        }
        if !wraps {
            result.push(Segment::corner(b.point));
        }
    }
    result
}

/// Drops anchors of straight runs that deviate less than `flatness` from the line through
/// their neighbours (Douglas-Peucker). Anchors that touch a curve are always kept.
pub fn reduce_segments(segments: &[Segment], flatness: f64) -> Vec<Segment> {
    let n = segments.len();
    if n < 3 {
        return segments.to_vec();
    }

    let mut keep: Vec<bool> = (0..n)
        .map(|i| {
            let segment = &segments[i];
            let before_curved = i > 0 && segments[i - 1].handle_out != ArtVector::zero();
            let after_curved = i + 1 < n && segments[i + 1].handle_in != ArtVector::zero();
            segment.has_handles() || before_curved || after_curved
        })
        .collect();
    keep[0] = true;
    keep[n - 1] = true;

    let anchors: Vec<usize> = (0..n).filter(|&i| keep[i]).collect();
    for run in anchors.windows(2) {
        simplify_run(segments, run[0], run[1], flatness, &mut keep);
    }

    segments
        .iter()
        .zip(keep)
        .filter(|(_, keep)| *keep)
        .map(|(segment, _)| *segment)
        .collect()
}

fn simplify_run(segments: &[Segment], first: usize, last: usize, flatness: f64, keep: &mut [bool]) {
    if last - first < 2 {
        return;
    }

    let a = segments[first].point;
    let b = segments[last].point;
    let sqr_flatness = flatness * flatness;
    let (index, sqr_dist) = (first + 1..last)
        .map(|i| (i, square_distance_segment_point(a, b, segments[i].point)))
        .fold((first + 1, -1.0), |best, candidate| if candidate.1 > best.1 { candidate } else { best });

    if sqr_dist > sqr_flatness {
        keep[index] = true;
        simplify_run(segments, first, index, flatness, keep);
        simplify_run(segments, index, last, flatness, keep);
    }
}
