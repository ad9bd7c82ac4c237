use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Distances at or below this are treated as coincident points.
pub const DEGENERATE_EPSILON: f64 = 1e-6;

/// Rotation taking the direction `from` onto the direction `to`.
///
/// Returns the identity when the directions already agree and a half turn about an
/// axis perpendicular to `from` when they are opposite.
pub fn rotation_to_align(from: &Vector3<f64>, to: &Vector3<f64>) -> Rotation3<f64> {
    let from_n = from.normalize();
    let to_n = to.normalize();
    let axis = from_n.cross(&to_n);
    if axis.norm() < DEGENERATE_EPSILON {
        if from_n.dot(&to_n) > 0.0 {
            return Rotation3::identity();
        }
        let half_turn_axis = Unit::new_normalize(perpendicular_to(&from_n));
        return Rotation3::from_axis_angle(&half_turn_axis, std::f64::consts::PI);
    }
    let angle = from_n.dot(&to_n).clamp(-1.0, 1.0).acos();
    Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle)
}

/// A unit vector perpendicular to `direction`.
///
/// Uses `direction × X`, switching to `direction × Y` when the direction is
/// (nearly) parallel to the X axis.
pub fn perpendicular_to(direction: &Vector3<f64>) -> Vector3<f64> {
    let mut perp = direction.cross(&Vector3::x());
    if perp.norm() < 1e-3 {
        perp = direction.cross(&Vector3::y());
    }
    perp.normalize()
}

pub fn centroid(points: impl IntoIterator<Item = Point3<f64>>) -> Option<Point3<f64>> {
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p.coords;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(Point3::from(sum / count as f64))
    }
}

/// Linear interpolation `(1 - t)·a + t·b`; exact at `t = 0` and `t = 1`.
pub fn lerp(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    Point3::from(a.coords * (1.0 - t) + b.coords * t)
}

/// `n` evenly spaced parameters covering `[0, 1]` inclusively. One sample yields `[0.0]`.
pub fn linspace_unit(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let last = (n - 1) as f64;
            (0..n)
                .map(|k| if k == n - 1 { 1.0 } else { k as f64 / last })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: &Vector3<f64>, b: &Vector3<f64>) {
        assert!((a - b).norm() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn rotation_to_align_is_identity_for_same_direction() {
        let r = rotation_to_align(&Vector3::z(), &Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(r, Rotation3::identity());
    }

    #[test]
    fn rotation_to_align_maps_from_onto_to() {
        let to = Vector3::new(1.0, 2.0, -0.5).normalize();
        let r = rotation_to_align(&Vector3::z(), &to);
        assert_vec_close(&(r * Vector3::z()), &to);
    }

    #[test]
    fn rotation_to_align_handles_opposite_directions() {
        let r = rotation_to_align(&Vector3::z(), &-Vector3::z());
        assert_vec_close(&(r * Vector3::z()), &-Vector3::z());
    }

    #[test]
    fn perpendicular_to_is_unit_and_orthogonal() {
        for dir in [
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
            Vector3::new(1.0, 1.0, 1.0).normalize(),
        ] {
            let p = perpendicular_to(&dir);
            assert!((p.norm() - 1.0).abs() < 1e-12);
            assert!(p.dot(&dir).abs() < 1e-12);
        }
    }

    #[test]
    fn centroid_averages_points_and_handles_empty() {
        let c = centroid([Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -2.0)]).unwrap();
        assert_eq!(c, Point3::new(1.0, 2.0, -1.0));
        assert!(centroid(Vec::new()).is_none());
    }

    #[test]
    fn lerp_is_exact_at_endpoints() {
        let a = Point3::new(0.1, 0.2, 0.3);
        let b = Point3::new(-1.7, 4.4, 9.1);
        assert_eq!(lerp(&a, &b, 0.0), a);
        assert_eq!(lerp(&a, &b, 1.0), b);
        let mid = lerp(&a, &b, 0.5);
        assert!((mid - Point3::new(-0.8, 2.3, 4.7)).norm() < 1e-12);
    }

    #[test]
    fn linspace_unit_covers_interval() {
        assert!(linspace_unit(0).is_empty());
        assert_eq!(linspace_unit(1), vec![0.0]);
        assert_eq!(linspace_unit(2), vec![0.0, 1.0]);
        assert_eq!(linspace_unit(5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let t = linspace_unit(30);
        assert_eq!(t.len(), 30);
        assert_eq!(t[29], 1.0);
    }
}
