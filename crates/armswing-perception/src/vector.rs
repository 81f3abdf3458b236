//! Vector algebra primitives.
//!
//! Free functions over [`Point3`] so the estimator reads as a direct
//! sequence of geometric steps.  All of them are total: none can fail, and
//! [`normalize`] maps the zero vector to itself rather than dividing by zero.
//!
//! # Example
//!
//! ```rust
//! use armswing_perception::vector::{cross, dot, norm, normalize};
//! use armswing_types::Point3;
//!
//! let x = Point3::new(1.0, 0.0, 0.0);
//! let y = Point3::new(0.0, 1.0, 0.0);
//!
//! assert_eq!(cross(x, y), Point3::new(0.0, 0.0, 1.0));
//! assert_eq!(dot(x, y), 0.0);
//! assert_eq!(norm(Point3::new(3.0, 4.0, 0.0)), 5.0);
//! assert_eq!(normalize(Point3::zero()), Point3::zero());
//! ```

use armswing_types::Point3;

/// `a - b`, component-wise.
pub fn subtract(a: Point3, b: Point3) -> Point3 {
    a - b
}

/// `a + b`, component-wise.
pub fn add(a: Point3, b: Point3) -> Point3 {
    a + b
}

/// `v * s`, component-wise.
pub fn scale(v: Point3, s: f64) -> Point3 {
    v * s
}

/// Point halfway between `a` and `b`.
pub fn midpoint(a: Point3, b: Point3) -> Point3 {
    add(a, b) / 2.0
}

/// Scalar (dot) product.
pub fn dot(a: Point3, b: Point3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Right-handed cross product `a × b`.
///
/// Anti-commutative, and zero whenever `a` and `b` are parallel (including
/// when either is the zero vector).
pub fn cross(a: Point3, b: Point3) -> Point3 {
    Point3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

/// Euclidean length.
pub fn norm(v: Point3) -> f64 {
    dot(v, v).sqrt()
}

/// Unit vector in the direction of `v`, or `None` when `v` has zero length.
pub fn try_normalize(v: Point3) -> Option<Point3> {
    let n = norm(v);
    if n == 0.0 { None } else { Some(v / n) }
}

/// Unit vector in the direction of `v`.
///
/// The zero vector normalizes to the zero vector.  Callers must treat that
/// result as "no defined direction".
pub fn normalize(v: Point3) -> Point3 {
    try_normalize(v).unwrap_or_else(Point3::zero)
}
