// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Curve flattening for glyph outlines

use nalgebra::Point2;

/// Point halfway between `a` and `b`
pub fn midpoint(a: &Point2<f64>, b: &Point2<f64>) -> Point2<f64> {
    nalgebra::center(a, b)
}

/// Evaluate the Bézier curve with the given control points at `steps + 1`
/// evenly spaced parameters, endpoints included (de Casteljau)
pub fn bezier_curve(controls: &[Point2<f64>], steps: usize) -> Vec<Point2<f64>> {
    if controls.is_empty() {
        return Vec::new();
    }
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let mut layer = controls.to_vec();
            while layer.len() > 1 {
                layer = layer
                    .windows(2)
                    .map(|pair| pair[0] + (pair[1] - pair[0]) * t)
                    .collect();
            }
            layer[0]
        })
        .collect()
}

/// Split one closed contour of on-curve / off-curve points into segments
///
/// Each segment runs from an on-curve point to the next, carrying the
/// off-curve control points between them. Two consecutive off-curve points
/// imply an on-curve point at their midpoint. The last segment closes back to
/// the contour's first point.
pub fn split_contour(points: &[(Point2<f64>, bool)]) -> Vec<Vec<Point2<f64>>> {
    let mut segments: Vec<Vec<Point2<f64>>> = Vec::new();
    let mut last_control: Option<Point2<f64>> = None;
    for &(point, on_curve) in points {
        if on_curve {
            if let Some(segment) = segments.last_mut() {
                segment.push(point);
            }
            segments.push(vec![point]);
            last_control = None;
        } else {
            if let Some(control) = last_control {
                let implied = midpoint(&control, &point);
                if let Some(segment) = segments.last_mut() {
                    segment.push(implied);
                }
                segments.push(vec![implied]);
            }
            match segments.last_mut() {
                Some(segment) => segment.push(point),
                None => segments.push(vec![point]),
            }
            last_control = Some(point);
        }
    }
    if let Some(first) = segments.first().and_then(|s| s.first()).copied() {
        if let Some(segment) = segments.last_mut() {
            segment.push(first);
        }
    }
    segments
}

/// Flatten contours of segments into a shared point list plus one index path per contour
///
/// Straight segments contribute their start point; curved segments contribute
/// `steps` samples. End points are skipped since they start the next segment.
pub fn flatten_contours(
    contours: &[Vec<Vec<Point2<f64>>>],
    steps: usize,
) -> (Vec<Point2<f64>>, Vec<Vec<usize>>) {
    let mut points = Vec::new();
    let mut paths = Vec::with_capacity(contours.len());
    for contour in contours {
        let mut path = Vec::new();
        for segment in contour {
            let samples = if segment.len() <= 2 {
                segment.iter().take(1).copied().collect()
            } else {
                let mut curve = bezier_curve(segment, steps);
                curve.pop();
                curve
            };
            path.extend(points.len()..points.len() + samples.len());
            points.extend(samples);
        }
        paths.push(path);
    }
    (points, paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_bezier() {
        let controls = [Point2::new(0.0, 0.0), Point2::new(1.0, 2.0), Point2::new(2.0, 0.0)];
        let curve = bezier_curve(&controls, 2);
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[0], Point2::new(0.0, 0.0));
        assert_eq!(curve[1], Point2::new(1.0, 1.0));
        assert_eq!(curve[2], Point2::new(2.0, 0.0));
    }

    #[test]
    fn test_implied_on_curve_points() {
        let contour = [
            (Point2::new(0.0, 0.0), true),
            (Point2::new(1.0, 1.0), false),
            (Point2::new(3.0, 1.0), false),
            (Point2::new(4.0, 0.0), true),
        ];
        let segments = split_contour(&contour);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 1.0)]);
        assert_eq!(segments[1][0], Point2::new(2.0, 1.0));
        // closing segment returns to the start
        assert_eq!(segments[2], vec![Point2::new(4.0, 0.0), Point2::new(0.0, 0.0)]);
    }

    #[test]
    fn test_flatten_square_contour() {
        let square = vec![
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
            vec![Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)],
            vec![Point2::new(1.0, 1.0), Point2::new(0.0, 1.0)],
            vec![Point2::new(0.0, 1.0), Point2::new(0.0, 0.0)],
        ];
        let (points, paths) = flatten_contours(&[square.clone(), square], 10);
        assert_eq!(points.len(), 8);
        assert_eq!(paths, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
    }
}
