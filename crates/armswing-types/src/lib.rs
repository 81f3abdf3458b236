//! `armswing-types` – shared data model for the arm-swing estimator.
//!
//! Holds the value types that cross crate boundaries: the [`Point3`]
//! coordinate, the five-landmark [`KeypointSet`] produced by a pose source,
//! the [`AngleResult`] produced by the estimator, and the [`PoseError`] used
//! by every fallible operation in the workspace.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Point3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D coordinate or vector.
///
/// Used both for anatomical landmarks and for the intermediate vectors the
/// estimator derives from them.  Any length unit works as long as all five
/// landmarks of a [`KeypointSet`] share it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Create a new point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin / zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// `true` when every component is neither NaN nor infinite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// `true` when every component is exactly zero.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

impl Add for Point3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Point3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Div<f64> for Point3 {
    type Output = Self;

    fn div(self, s: f64) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Landmarks
// ────────────────────────────────────────────────────────────────────────────

/// The anatomical labels a [`KeypointSet`] is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Landmark {
    RightShoulder,
    LeftShoulder,
    RightHip,
    LeftHip,
    RightElbow,
}

impl Landmark {
    /// All landmarks, in the order they are validated and iterated.
    pub const ALL: [Landmark; 5] = [
        Landmark::RightShoulder,
        Landmark::LeftShoulder,
        Landmark::RightHip,
        Landmark::LeftHip,
        Landmark::RightElbow,
    ];

    /// The camelCase label used in serialized keypoint sets.
    pub fn label(self) -> &'static str {
        match self {
            Landmark::RightShoulder => "rightShoulder",
            Landmark::LeftShoulder => "leftShoulder",
            Landmark::RightHip => "rightHip",
            Landmark::LeftHip => "leftHip",
            Landmark::RightElbow => "rightElbow",
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KeypointSet
// ────────────────────────────────────────────────────────────────────────────

/// The five landmarks of one subject at one instant (one video frame).
///
/// All five fields are required when deserializing; a pose source that only
/// detected some of them must reject the frame before it reaches the
/// estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeypointSet {
    pub right_shoulder: Point3,
    pub left_shoulder: Point3,
    pub right_hip: Point3,
    pub left_hip: Point3,
    pub right_elbow: Point3,
}

impl KeypointSet {
    /// Look up a single landmark by label.
    pub fn get(&self, landmark: Landmark) -> Point3 {
        match landmark {
            Landmark::RightShoulder => self.right_shoulder,
            Landmark::LeftShoulder => self.left_shoulder,
            Landmark::RightHip => self.right_hip,
            Landmark::LeftHip => self.left_hip,
            Landmark::RightElbow => self.right_elbow,
        }
    }

    /// Iterate over `(label, point)` pairs in [`Landmark::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Landmark, Point3)> + '_ {
        Landmark::ALL.into_iter().map(move |l| (l, self.get(l)))
    }

    /// Check that every coordinate is finite.
    ///
    /// Returns [`PoseError::NonFiniteCoordinate`] for the first landmark (in
    /// [`Landmark::ALL`] order) holding a NaN or infinite component.
    pub fn validate(&self) -> Result<(), PoseError> {
        match self.iter().find(|(_, p)| !p.is_finite()) {
            Some((landmark, value)) => Err(PoseError::NonFiniteCoordinate { landmark, value }),
            None => Ok(()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Estimator output
// ────────────────────────────────────────────────────────────────────────────

/// Classification of the arm's position relative to the torso axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SwingDirection {
    /// Arm swung to the positive side of the front reference vector.
    Forward,
    /// Arm swung to the negative side of the front reference vector.
    Backward,
    /// Inside the dead zone, or the projected vectors were too short.
    Neutral,
    /// The pose was degenerate and no sagittal plane could be derived.
    Error,
}

impl SwingDirection {
    /// Stable lowercase identifier.
    pub fn label(self) -> &'static str {
        match self {
            SwingDirection::Forward => "forward",
            SwingDirection::Backward => "backward",
            SwingDirection::Neutral => "neutral",
            SwingDirection::Error => "error",
        }
    }
}

impl fmt::Display for SwingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one estimator call.
///
/// `angle_degrees` is the unsigned angle between the projected arm and the
/// projected torso axis, in `[0, 180]`, rounded to one decimal place.  The
/// direction is classified separately and never folded into the angle's sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AngleResult {
    pub angle_degrees: f64,
    pub direction: SwingDirection,
}

impl AngleResult {
    pub fn new(angle_degrees: f64, direction: SwingDirection) -> Self {
        Self {
            angle_degrees,
            direction,
        }
    }

    /// The result reported for a degenerate sagittal normal.
    pub fn error() -> Self {
        Self::new(0.0, SwingDirection::Error)
    }

    /// The result reported when the projected vectors are too short.
    pub fn neutral() -> Self {
        Self::new(0.0, SwingDirection::Neutral)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Errors raised before any geometry is computed.
///
/// A degenerate pose is **not** an error: it is reported as
/// [`SwingDirection::Error`] inside an [`AngleResult`].
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PoseError {
    #[error("Non-finite coordinate for {landmark}: {value:?}")]
    NonFiniteCoordinate { landmark: Landmark, value: Point3 },

    #[error("Invalid tolerance {name} = {value}: must be finite and non-negative")]
    InvalidTolerance { name: String, value: f64 },
}
