//! Trigonometry and algebra helpers for frame geometry.
//!
//! Angles are radians measured from +X toward +Y, which points down on the
//! canvas, so a positive angle turns clockwise on screen.

use glam::{DVec2, dvec2};
use std::f64::consts::{FRAC_PI_2, PI};

#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (PI / 180.0)
}

#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / PI)
}

/// Walk `distance` from `origin` in direction `angle`.
///
/// # Arguments
/// * `origin` - Starting point
/// * `distance` - Distance to travel, may be negative
/// * `angle` - Direction in radians
pub fn point_at(origin: DVec2, distance: f64, angle: f64) -> DVec2 {
    origin + distance * dvec2(angle.cos(), angle.sin())
}

/// Direction of the ray from `a` to `b`, in `(-PI, PI]`.
///
/// Returns `None` when the points coincide and no direction exists.
pub fn angle_between(a: DVec2, b: DVec2) -> Option<f64> {
    let d = b - a;
    if d.x == 0.0 {
        return if d.y > 0.0 {
            Some(FRAC_PI_2)
        } else if d.y < 0.0 {
            Some(-FRAC_PI_2)
        } else {
            None
        };
    }
    if d.y == 0.0 {
        return Some(if d.x > 0.0 { 0.0 } else { PI });
    }
    Some(d.y.atan2(d.x))
}

/// Euclidean distance, exact on axis-aligned pairs.
pub fn absolute_distance(a: DVec2, b: DVec2) -> f64 {
    if a.x == b.x {
        (a.y - b.y).abs()
    } else if a.y == b.y {
        (a.x - b.x).abs()
    } else {
        a.distance(b)
    }
}

/// Remaining leg of a right triangle.
///
/// `None` when `leg` is longer than `hypotenuse`.
pub fn right_triangle_leg(hypotenuse: f64, leg: f64) -> Option<f64> {
    let squared = hypotenuse * hypotenuse - leg * leg;
    if squared < 0.0 || squared.is_nan() {
        None
    } else {
        Some(squared.sqrt())
    }
}

/// Real roots of `a·x² + b·x + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roots {
    None,
    One(f64),
    Two(f64, f64),
}

impl Roots {
    /// The larger root, if any.
    pub fn max(self) -> Option<f64> {
        match self {
            Roots::None => None,
            Roots::One(x) => Some(x),
            Roots::Two(x1, x2) => Some(x1.max(x2)),
        }
    }
}

/// Solve a quadratic with the discriminant formula.
///
/// A zero `a` has no quadratic solution and yields [`Roots::None`].
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Roots {
    let discriminant = b * b - 4.0 * a * c;
    if a == 0.0 || discriminant < 0.0 || discriminant.is_nan() {
        return Roots::None;
    }
    let root = discriminant.sqrt();
    let x1 = (-b - root) / (2.0 * a);
    if discriminant == 0.0 {
        return Roots::One(x1);
    }
    Roots::Two(x1, (-b + root) / (2.0 * a))
}

/// Law of cosines: the angle opposite side `c`.
///
/// `None` when the sides cannot close a triangle.
pub fn triangle_angle_from_sides(a: f64, b: f64, c: f64) -> Option<f64> {
    if a <= 0.0 || b <= 0.0 {
        return None;
    }
    let cos = (a * a + b * b - c * c) / (2.0 * a * b);
    if !(-1.0..=1.0).contains(&cos) {
        return None;
    }
    Some(cos.acos())
}

/// Rotate `p` around `pivot` by `-angle`, preserving its distance to the
/// pivot.
pub fn rotate_about(p: DVec2, pivot: DVec2, angle: f64) -> DVec2 {
    let Some(original) = angle_between(pivot, p) else {
        return p;
    };
    point_at(pivot, absolute_distance(pivot, p), original - angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn point_at_follows_canvas_convention() {
        let origin = dvec2(10.0, 10.0);
        assert!(close(point_at(origin, 5.0, 0.0), dvec2(15.0, 10.0)));
        assert!(close(point_at(origin, 5.0, FRAC_PI_2), dvec2(10.0, 15.0)));
        assert!(close(point_at(origin, 5.0, PI), dvec2(5.0, 10.0)));
    }

    #[test]
    fn angle_between_handles_every_direction() {
        let o = dvec2(0.0, 0.0);
        assert_eq!(angle_between(o, dvec2(3.0, 0.0)), Some(0.0));
        assert_eq!(angle_between(o, dvec2(-3.0, 0.0)), Some(PI));
        assert_eq!(angle_between(o, dvec2(0.0, 3.0)), Some(FRAC_PI_2));
        assert_eq!(angle_between(o, dvec2(0.0, -3.0)), Some(-FRAC_PI_2));
        assert_eq!(angle_between(o, o), None);

        let down_left = angle_between(o, dvec2(-1.0, 1.0)).unwrap();
        assert!((down_left - 3.0 * PI / 4.0).abs() < EPS);
    }

    #[test]
    fn angle_between_round_trips_through_point_at() {
        let a = dvec2(613.0, -42.0);
        let angle = deg_to_rad(70.5);
        let b = point_at(a, 77.0, angle);
        assert!((angle_between(a, b).unwrap() - angle).abs() < EPS);
    }

    #[test]
    fn distance_uses_axis_shortcuts() {
        assert_eq!(absolute_distance(dvec2(1.0, 5.0), dvec2(1.0, -2.0)), 7.0);
        assert_eq!(absolute_distance(dvec2(-4.0, 2.0), dvec2(3.0, 2.0)), 7.0);
        assert_eq!(absolute_distance(dvec2(0.0, 0.0), dvec2(3.0, 4.0)), 5.0);
    }

    #[test]
    fn right_triangle_leg_rejects_impossible_triangles() {
        assert_eq!(right_triangle_leg(5.0, 3.0), Some(4.0));
        assert_eq!(right_triangle_leg(5.0, 5.0), Some(0.0));
        assert_eq!(right_triangle_leg(3.0, 5.0), None);
    }

    #[test]
    fn quadratic_roots() {
        assert_eq!(solve_quadratic(1.0, -3.0, 2.0), Roots::Two(1.0, 2.0));
        assert_eq!(solve_quadratic(1.0, 2.0, 1.0), Roots::One(-1.0));
        assert_eq!(solve_quadratic(1.0, 0.0, 1.0), Roots::None);
        assert_eq!(solve_quadratic(0.0, 1.0, 1.0), Roots::None);
        assert_eq!(solve_quadratic(1.0, -3.0, 2.0).max(), Some(2.0));
        assert_eq!(Roots::None.max(), None);
    }

    #[test]
    fn law_of_cosines() {
        let right = triangle_angle_from_sides(3.0, 4.0, 5.0).unwrap();
        assert!((right - FRAC_PI_2).abs() < EPS);
        assert_eq!(triangle_angle_from_sides(1.0, 1.0, 5.0), None);
    }

    #[test]
    fn rotation_preserves_distance_to_pivot() {
        let pivot = dvec2(0.0, 100.0);
        let p = dvec2(1000.0, 110.0);
        let tilt = (10.0f64 / 1000.0).atan();
        let rotated = rotate_about(p, pivot, tilt);
        assert!((rotated.y - pivot.y).abs() < 1e-6);
        assert!((pivot.distance(rotated) - pivot.distance(p)).abs() < 1e-9);
        assert_eq!(rotate_about(pivot, pivot, tilt), pivot);
    }
}
