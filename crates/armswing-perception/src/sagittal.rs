//! Sagittal-plane arm-swing estimator.
//!
//! Given one frame of five landmarks, the estimator:
//!
//! 1. builds the torso axis from the hip midpoint to the shoulder midpoint;
//! 2. derives the plane normal `cross(shoulder_line, torso_axis)`, where the
//!    shoulder line runs from the left to the right shoulder;
//! 3. takes the arm vector from the right shoulder to the right elbow;
//! 4. projects both arm and axis onto the plane orthogonal to that normal;
//! 5. reports the unsigned angle between the two projections, and separately
//!    classifies the arm against the in-plane "front" vector
//!    `cross(axis_proj, normal)`.
//!
//! Degenerate poses never produce an `Err`: a zero normal is reported as
//! [`SwingDirection::Error`], projections shorter than the configured
//! tolerance as [`SwingDirection::Neutral`].
//!
//! # Example
//!
//! ```rust
//! use armswing_perception::estimate_arm_swing;
//! use armswing_types::{KeypointSet, Point3, SwingDirection};
//!
//! let frame = KeypointSet {
//!     right_shoulder: Point3::new(0.0, 1.0, 0.0),
//!     left_shoulder: Point3::new(1.0, 1.0, 0.0),
//!     right_hip: Point3::new(0.0, 0.0, 0.0),
//!     left_hip: Point3::new(1.0, 0.0, 0.0),
//!     right_elbow: Point3::new(-0.5, 1.0, 0.0),
//! };
//!
//! let result = estimate_arm_swing(&frame);
//! assert_eq!(result.angle_degrees, 90.0);
//! assert_eq!(result.direction, SwingDirection::Forward);
//! ```

use armswing_types::{AngleResult, KeypointSet, Point3, PoseError, SwingDirection};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::projection::project_onto_plane;
use crate::vector::{cross, dot, midpoint, norm, subtract};

/// Default minimum length of the projected arm and axis vectors, in input
/// coordinate units.
pub const DEFAULT_MIN_PROJECTED_NORM: f64 = 0.01;

/// Default half-width of the neutral band around `front_back_dot == 0`.
pub const DEFAULT_DEAD_ZONE: f64 = 0.1;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Tolerances used by [`SagittalEstimator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Projected arm or axis vectors shorter than this are considered to have
    /// no stable direction; the frame is reported as neutral with angle 0.
    #[serde(default = "default_min_projected_norm")]
    pub min_projected_norm: f64,
    /// Front/back dot products inside `[-dead_zone, dead_zone]` classify as
    /// neutral.
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f64,
}

fn default_min_projected_norm() -> f64 {
    DEFAULT_MIN_PROJECTED_NORM
}
fn default_dead_zone() -> f64 {
    DEFAULT_DEAD_ZONE
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_projected_norm: DEFAULT_MIN_PROJECTED_NORM,
            dead_zone: DEFAULT_DEAD_ZONE,
        }
    }
}

impl EstimatorConfig {
    /// Reject NaN or infinite tolerances, a negative dead zone and a
    /// minimum projected norm that is not strictly positive.
    pub fn validate(&self) -> Result<(), PoseError> {
        let norm = self.min_projected_norm;
        check_tolerance("min_projected_norm", norm, norm > 0.0)?;
        check_tolerance("dead_zone", self.dead_zone, self.dead_zone >= 0.0)
    }
}

fn check_tolerance(name: &str, value: f64, in_range: bool) -> Result<(), PoseError> {
    if value.is_finite() && in_range {
        Ok(())
    } else {
        Err(PoseError::InvalidTolerance {
            name: name.to_string(),
            value,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Intermediate geometry
// ────────────────────────────────────────────────────────────────────────────

/// Every intermediate vector derived from one frame.
///
/// Only produced when the plane normal is non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingGeometry {
    pub shoulder_mid: Point3,
    pub hip_mid: Point3,
    /// Hip midpoint → shoulder midpoint.
    pub torso_axis: Point3,
    /// Left shoulder → right shoulder.
    pub shoulder_line: Point3,
    pub sagittal_normal: Point3,
    /// Right shoulder → right elbow.
    pub arm: Point3,
    pub arm_projected: Point3,
    pub axis_projected: Point3,
    /// `cross(axis_projected, sagittal_normal)`.
    pub front: Point3,
    /// `dot(arm_projected, front)`; its sign drives the classification.
    pub front_back_dot: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// SagittalEstimator
// ────────────────────────────────────────────────────────────────────────────

/// Stateless arm-swing estimator.
///
/// Holds only its [`EstimatorConfig`]; every call reads its input and
/// allocates nothing beyond stack intermediates, so one instance can serve
/// any number of threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SagittalEstimator {
    config: EstimatorConfig,
}

impl SagittalEstimator {
    /// Create an estimator with the given tolerances.
    ///
    /// The tolerances are used as given; see [`SagittalEstimator::try_new`]
    /// for a validating constructor.
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Create an estimator after checking the tolerances.
    pub fn try_new(config: EstimatorConfig) -> Result<Self, PoseError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Derive the intermediate vectors for `keypoints`.
    ///
    /// Returns `None` when the shoulder line and torso axis are parallel (or
    /// either is zero), so no plane normal exists.
    pub fn geometry(&self, keypoints: &KeypointSet) -> Option<SwingGeometry> {
        let shoulder_mid = midpoint(keypoints.right_shoulder, keypoints.left_shoulder);
        let hip_mid = midpoint(keypoints.right_hip, keypoints.left_hip);
        let torso_axis = subtract(shoulder_mid, hip_mid);

        let shoulder_line = subtract(keypoints.right_shoulder, keypoints.left_shoulder);
        let sagittal_normal = cross(shoulder_line, torso_axis);
        if norm(sagittal_normal) == 0.0 {
            return None;
        }

        let arm = subtract(keypoints.right_elbow, keypoints.right_shoulder);
        let arm_projected = project_onto_plane(arm, sagittal_normal);
        let axis_projected = project_onto_plane(torso_axis, sagittal_normal);

        let front = cross(axis_projected, sagittal_normal);
        let front_back_dot = dot(arm_projected, front);

        Some(SwingGeometry {
            shoulder_mid,
            hip_mid,
            torso_axis,
            shoulder_line,
            sagittal_normal,
            arm,
            arm_projected,
            axis_projected,
            front,
            front_back_dot,
        })
    }

    /// Estimate the swing angle and direction for one frame.
    ///
    /// Assumes finite input; use [`SagittalEstimator::try_estimate`] when the
    /// pose source does not already guarantee it.
    pub fn estimate(&self, keypoints: &KeypointSet) -> AngleResult {
        let Some(geometry) = self.geometry(keypoints) else {
            debug!("shoulder line parallel to torso axis; no sagittal normal");
            return AngleResult::error();
        };

        // A zero-length projection has no direction whatever the tolerance.
        let min = self.config.min_projected_norm.max(f64::MIN_POSITIVE);
        let arm_norm = norm(geometry.arm_projected);
        let axis_norm = norm(geometry.axis_projected);
        if arm_norm < min || axis_norm < min {
            debug!(
                arm_norm,
                axis_norm,
                min,
                "projected vector below tolerance; reporting neutral"
            );
            return AngleResult::neutral();
        }

        let cos_theta =
            dot(geometry.arm_projected, geometry.axis_projected) / (arm_norm * axis_norm);
        let angle_degrees = round_to_tenth(clamped_angle_degrees(cos_theta));
        let direction = self.classify(geometry.front_back_dot);

        trace!(
            angle_degrees,
            front_back_dot = geometry.front_back_dot,
            direction = %direction,
            "arm swing estimated"
        );
        AngleResult::new(angle_degrees, direction)
    }

    /// Validate `keypoints`, then estimate.
    ///
    /// Non-finite coordinates are rejected with
    /// [`PoseError::NonFiniteCoordinate`] before any geometry is computed.
    pub fn try_estimate(&self, keypoints: &KeypointSet) -> Result<AngleResult, PoseError> {
        keypoints.validate()?;
        Ok(self.estimate(keypoints))
    }

    /// Map a front/back dot product to a direction.
    ///
    /// The band `[-dead_zone, dead_zone]` is neutral, boundaries included.
    pub fn classify(&self, front_back_dot: f64) -> SwingDirection {
        if front_back_dot > self.config.dead_zone {
            SwingDirection::Forward
        } else if front_back_dot < -self.config.dead_zone {
            SwingDirection::Backward
        } else {
            SwingDirection::Neutral
        }
    }
}

/// Estimate with the default tolerances.
pub fn estimate_arm_swing(keypoints: &KeypointSet) -> AngleResult {
    SagittalEstimator::default().estimate(keypoints)
}

/// `acos` in degrees, with the cosine clamped to `[-1, 1]` first.
fn clamped_angle_degrees(cos_theta: f64) -> f64 {
    cos_theta.clamp(-1.0, 1.0).acos().to_degrees()
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit-width torso standing along +Y, right shoulder at the origin of X.
    /// The derived normal is (0, 0, -1) and the front vector is (-1, 0, 0).
    fn upright(elbow: Point3) -> KeypointSet {
        KeypointSet {
            right_shoulder: Point3::new(0.0, 1.0, 0.0),
            left_shoulder: Point3::new(1.0, 1.0, 0.0),
            right_hip: Point3::new(0.0, 0.0, 0.0),
            left_hip: Point3::new(1.0, 0.0, 0.0),
            right_elbow: elbow,
        }
    }

    /// The runner pose used by the demo frames.
    fn runner(elbow: Point3) -> KeypointSet {
        KeypointSet {
            right_shoulder: Point3::new(-0.1, 0.9, 0.0),
            left_shoulder: Point3::new(0.1, 0.9, 0.0),
            right_hip: Point3::new(-0.1, 0.0, 0.0),
            left_hip: Point3::new(0.1, 0.0, 0.0),
            right_elbow: elbow,
        }
    }

    // ── Geometry ────────────────────────────────────────────────────────────

    #[test]
    fn geometry_of_upright_torso() {
        let g = SagittalEstimator::default()
            .geometry(&upright(Point3::new(-0.3, 0.5, 0.2)))
            .unwrap();
        assert_eq!(g.torso_axis, Point3::new(0.0, 1.0, 0.0));
        assert_eq!(g.shoulder_line, Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(g.sagittal_normal, Point3::new(0.0, 0.0, -1.0));
        assert_eq!(g.axis_projected, Point3::new(0.0, 1.0, 0.0));
        assert_eq!(g.front, Point3::new(-1.0, 0.0, 0.0));
        assert!(dot(g.arm_projected, g.sagittal_normal).abs() < 1e-12);
        assert!(dot(g.front, g.axis_projected).abs() < 1e-12);
    }

    #[test]
    fn geometry_is_none_for_degenerate_normal() {
        let set = KeypointSet {
            right_shoulder: Point3::new(0.0, 2.0, 0.0),
            left_shoulder: Point3::new(0.0, 1.0, 0.0),
            right_hip: Point3::new(0.0, 0.0, 0.0),
            left_hip: Point3::new(0.0, -1.0, 0.0),
            right_elbow: Point3::new(1.0, 1.0, 1.0),
        };
        assert!(SagittalEstimator::default().geometry(&set).is_none());
    }

    // ── Angle and direction ─────────────────────────────────────────────────

    #[test]
    fn perpendicular_arm_is_ninety_degrees_forward() {
        let result = estimate_arm_swing(&upright(Point3::new(-0.5, 1.0, 0.0)));
        assert_eq!(result, AngleResult::new(90.0, SwingDirection::Forward));
    }

    #[test]
    fn mirrored_elbow_flips_direction_and_keeps_angle() {
        let forward = estimate_arm_swing(&upright(Point3::new(-0.3, 0.5, 0.0)));
        let backward = estimate_arm_swing(&upright(Point3::new(0.3, 0.5, 0.0)));

        assert_eq!(forward.direction, SwingDirection::Forward);
        assert_eq!(backward.direction, SwingDirection::Backward);
        assert_eq!(forward.angle_degrees, backward.angle_degrees);
        assert!((forward.angle_degrees - 149.0).abs() < 1e-9);
    }

    #[test]
    fn depth_mirror_of_runner_pose_projects_to_same_result() {
        // The normal of this pose points along Z, so the elbow's depth offset
        // is removed by the projection and both frames coincide.
        let front = estimate_arm_swing(&runner(Point3::new(-0.1, 0.5, 0.3)));
        let back = estimate_arm_swing(&runner(Point3::new(-0.1, 0.5, -0.3)));
        assert_eq!(front, back);
        assert_eq!(front, AngleResult::new(180.0, SwingDirection::Neutral));
    }

    #[test]
    fn hanging_arm_of_runner_pose_is_neutral() {
        let result = estimate_arm_swing(&runner(Point3::new(-0.1, 0.3, 0.0)));
        assert_eq!(result, AngleResult::new(180.0, SwingDirection::Neutral));
    }

    #[test]
    fn raised_arm_is_zero_degrees() {
        let result = estimate_arm_swing(&upright(Point3::new(0.0, 1.5, 0.0)));
        assert_eq!(result, AngleResult::new(0.0, SwingDirection::Neutral));
    }

    #[test]
    fn angle_is_rounded_to_one_decimal() {
        let result = estimate_arm_swing(&upright(Point3::new(-0.1, 0.5, 0.2)));
        assert!((result.angle_degrees - 168.7).abs() < 1e-9);
    }

    #[test]
    fn angles_stay_within_range() {
        for x in [-0.9, -0.4, -0.05, 0.0, 0.05, 0.4, 0.9] {
            for y in [-0.5, 0.2, 0.8, 1.0, 1.4, 2.5] {
                let result = estimate_arm_swing(&upright(Point3::new(x, y, 0.3)));
                assert!(
                    (0.0..=180.0).contains(&result.angle_degrees),
                    "x={x} y={y} angle={}",
                    result.angle_degrees
                );
            }
        }
    }

    // ── Edge cases ──────────────────────────────────────────────────────────

    #[test]
    fn collinear_shoulders_and_axis_is_error() {
        let set = KeypointSet {
            right_shoulder: Point3::new(0.0, 2.0, 0.0),
            left_shoulder: Point3::new(0.0, 1.0, 0.0),
            right_hip: Point3::new(0.0, 0.0, 0.0),
            left_hip: Point3::new(0.0, -1.0, 0.0),
            right_elbow: Point3::new(1.0, 1.0, 1.0),
        };
        assert_eq!(estimate_arm_swing(&set), AngleResult::error());
    }

    #[test]
    fn coincident_shoulders_is_error() {
        let mut set = upright(Point3::new(-0.3, 0.5, 0.0));
        set.left_shoulder = set.right_shoulder;
        assert_eq!(estimate_arm_swing(&set), AngleResult::error());
    }

    #[test]
    fn zero_torso_axis_is_error() {
        let set = KeypointSet {
            right_shoulder: Point3::new(0.0, 0.0, 0.0),
            left_shoulder: Point3::new(1.0, 0.0, 0.0),
            right_hip: Point3::new(0.0, 0.0, 0.0),
            left_hip: Point3::new(1.0, 0.0, 0.0),
            right_elbow: Point3::new(0.0, -0.5, 0.0),
        };
        assert_eq!(estimate_arm_swing(&set), AngleResult::error());
    }

    #[test]
    fn arm_along_normal_collapses_to_neutral() {
        let result = estimate_arm_swing(&upright(Point3::new(0.0, 1.0, 0.5)));
        assert_eq!(result, AngleResult::neutral());
    }

    #[test]
    fn dead_zone_boundaries_are_neutral() {
        let estimator = SagittalEstimator::default();

        let g = estimator.geometry(&upright(Point3::new(-0.1, 0.5, 0.2))).unwrap();
        assert_eq!(g.front_back_dot, 0.1);
        let result = estimator.estimate(&upright(Point3::new(-0.1, 0.5, 0.2)));
        assert_eq!(result.direction, SwingDirection::Neutral);

        let g = estimator.geometry(&upright(Point3::new(0.1, 0.5, 0.2))).unwrap();
        assert_eq!(g.front_back_dot, -0.1);
        let result = estimator.estimate(&upright(Point3::new(0.1, 0.5, 0.2)));
        assert_eq!(result.direction, SwingDirection::Neutral);
    }

    #[test]
    fn classify_uses_open_interval() {
        let estimator = SagittalEstimator::default();
        assert_eq!(estimator.classify(0.0), SwingDirection::Neutral);
        assert_eq!(estimator.classify(0.1), SwingDirection::Neutral);
        assert_eq!(estimator.classify(-0.1), SwingDirection::Neutral);
        assert_eq!(estimator.classify(0.100001), SwingDirection::Forward);
        assert_eq!(estimator.classify(-0.100001), SwingDirection::Backward);
    }

    #[test]
    fn cosine_overshoot_is_clamped() {
        assert_eq!(clamped_angle_degrees(1.0 + f64::EPSILON), 0.0);
        assert_eq!(clamped_angle_degrees(-1.0 - f64::EPSILON), 180.0);
        assert_eq!(clamped_angle_degrees(0.0), 90.0);
    }

    #[test]
    fn collinear_arm_and_axis_never_yield_nan() {
        // A slightly tilted torso where the unclamped cosine rounds to ±(1 + ε).
        let base = KeypointSet {
            right_shoulder: Point3::new(0.0, 1.3, 0.0),
            left_shoulder: Point3::new(1.0, 1.3, 0.0),
            right_hip: Point3::new(-0.1, 0.0, 0.0),
            left_hip: Point3::new(0.9, 0.0, 0.0),
            right_elbow: Point3::zero(),
        };
        let axis = midpoint(base.right_shoulder, base.left_shoulder)
            - midpoint(base.right_hip, base.left_hip);

        let along = KeypointSet {
            right_elbow: base.right_shoulder + axis * 2.3,
            ..base
        };
        let against = KeypointSet {
            right_elbow: base.right_shoulder + axis * -2.3,
            ..base
        };

        let up = estimate_arm_swing(&along);
        let down = estimate_arm_swing(&against);
        assert_eq!(up.angle_degrees, 0.0);
        assert_eq!(down.angle_degrees, 180.0);
        assert_eq!(up.direction, SwingDirection::Neutral);
        assert_eq!(down.direction, SwingDirection::Neutral);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let set = runner(Point3::new(-0.23, 0.41, 0.17));
        let a = estimate_arm_swing(&set);
        let b = estimate_arm_swing(&set);
        assert_eq!(a.angle_degrees.to_bits(), b.angle_degrees.to_bits());
        assert_eq!(a.direction, b.direction);
    }

    // ── Configuration ───────────────────────────────────────────────────────

    #[test]
    fn default_config_matches_constants() {
        let cfg = EstimatorConfig::default();
        assert_eq!(cfg.min_projected_norm, 0.01);
        assert_eq!(cfg.dead_zone, 0.1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn wider_dead_zone_neutralises_small_swings() {
        let estimator = SagittalEstimator::new(EstimatorConfig {
            dead_zone: 0.5,
            ..EstimatorConfig::default()
        });
        let result = estimator.estimate(&upright(Point3::new(-0.3, 0.5, 0.0)));
        assert_eq!(result.direction, SwingDirection::Neutral);
        assert!((result.angle_degrees - 149.0).abs() < 1e-9);
    }

    #[test]
    fn larger_min_norm_collapses_short_arms() {
        let estimator = SagittalEstimator::new(EstimatorConfig {
            min_projected_norm: 1.0,
            ..EstimatorConfig::default()
        });
        let result = estimator.estimate(&upright(Point3::new(-0.3, 0.5, 0.0)));
        assert_eq!(result, AngleResult::neutral());
    }

    #[test]
    fn try_new_rejects_bad_tolerances() {
        for cfg in [
            EstimatorConfig { min_projected_norm: -0.01, ..EstimatorConfig::default() },
            EstimatorConfig { min_projected_norm: 0.0, ..EstimatorConfig::default() },
            EstimatorConfig { dead_zone: f64::NAN, ..EstimatorConfig::default() },
            EstimatorConfig { dead_zone: f64::INFINITY, ..EstimatorConfig::default() },
        ] {
            assert!(matches!(
                SagittalEstimator::try_new(cfg),
                Err(PoseError::InvalidTolerance { .. })
            ));
        }
        assert!(SagittalEstimator::try_new(EstimatorConfig::default()).is_ok());
        assert!(
            SagittalEstimator::try_new(EstimatorConfig { dead_zone: 0.0, ..EstimatorConfig::default() })
                .is_ok()
        );
    }

    #[test]
    fn zero_min_norm_still_rejects_zero_length_arm() {
        let estimator = SagittalEstimator::new(EstimatorConfig {
            min_projected_norm: 0.0,
            ..EstimatorConfig::default()
        });
        let result = estimator.estimate(&upright(Point3::new(0.0, 1.0, 0.0)));
        assert_eq!(result, AngleResult::neutral());
        assert!((0.0..=180.0).contains(&result.angle_degrees));
    }

    // ── Validation ──────────────────────────────────────────────────────────

    #[test]
    fn try_estimate_rejects_non_finite_input() {
        let set = upright(Point3::new(f64::NAN, 0.5, 0.0));
        let err = SagittalEstimator::default().try_estimate(&set).unwrap_err();
        assert!(matches!(err, PoseError::NonFiniteCoordinate { .. }));
    }

    #[test]
    fn try_estimate_matches_estimate_for_valid_input() {
        let estimator = SagittalEstimator::default();
        let set = upright(Point3::new(-0.3, 0.5, 0.0));
        assert_eq!(estimator.try_estimate(&set).unwrap(), estimator.estimate(&set));
    }

    #[test]
    fn estimator_can_be_shared_across_threads() {
        let estimator = SagittalEstimator::default();
        let frames: Vec<_> = [-0.3, 0.3, -0.5]
            .into_iter()
            .map(|x| upright(Point3::new(x, 0.5, 0.0)))
            .collect();

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = frames
                .iter()
                .map(|f| s.spawn(move || estimator.estimate(f)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (frame, result) in frames.iter().zip(results) {
            assert_eq!(result, estimator.estimate(frame));
        }
    }
}
