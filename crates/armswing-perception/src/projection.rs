//! Projection of a vector onto a plane through the origin.
//!
//! The plane is given by its normal.  The projection subtracts the component
//! of the vector parallel to the unit normal:
//!
//! ```text
//! v_proj = v − (v · n̂) n̂
//! ```
//!
//! A zero normal normalizes to zero, so the parallel component vanishes and
//! the vector is returned unchanged.
//!
//! # Example
//!
//! ```rust
//! use armswing_perception::projection::project_onto_plane;
//! use armswing_types::Point3;
//!
//! let v = Point3::new(1.0, 2.0, 3.0);
//! let p = project_onto_plane(v, Point3::new(0.0, 0.0, 5.0));
//! assert_eq!(p, Point3::new(1.0, 2.0, 0.0));
//! ```

use armswing_types::Point3;

use crate::vector::{dot, normalize, scale, subtract};

/// Component of `v` lying in the plane orthogonal to `normal`.
pub fn project_onto_plane(v: Point3, normal: Point3) -> Point3 {
    let unit = normalize(normal);
    let parallel = scale(unit, dot(v, unit));
    subtract(v, parallel)
}
