//! Built-in mock poses and the demo cycle that steps through them.
//!
//! The three poses share one runner torso (Y up, Z towards the camera) and
//! differ only in where the right elbow sits.  [`DemoCycle`] owns the only
//! piece of state in the application: which pose is currently shown.  It
//! advances `Neutral → Forward → Backward → Neutral`.

use std::fmt;
use std::str::FromStr;

use armswing_types::{KeypointSet, Point3};
use serde::{Deserialize, Serialize};

/// One of the built-in demonstration poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockPose {
    /// Arm hanging down beside the torso.
    #[default]
    Neutral,
    /// Elbow pushed 0.3 towards the camera.
    Forward,
    /// Elbow pulled 0.3 away from the camera.
    Backward,
}

impl MockPose {
    pub const ALL: [MockPose; 3] = [MockPose::Neutral, MockPose::Forward, MockPose::Backward];

    /// The keypoint frame for this pose.
    pub fn keypoints(self) -> KeypointSet {
        let right_elbow = match self {
            MockPose::Neutral => Point3::new(-0.1, 0.3, 0.0),
            MockPose::Forward => Point3::new(-0.1, 0.5, 0.3),
            MockPose::Backward => Point3::new(-0.1, 0.5, -0.3),
        };
        KeypointSet {
            right_shoulder: Point3::new(-0.1, 0.9, 0.0),
            left_shoulder: Point3::new(0.1, 0.9, 0.0),
            right_hip: Point3::new(-0.1, 0.0, 0.0),
            left_hip: Point3::new(0.1, 0.0, 0.0),
            right_elbow,
        }
    }

    /// The pose that follows this one in the demo cycle.
    pub fn next(self) -> Self {
        match self {
            MockPose::Neutral => MockPose::Forward,
            MockPose::Forward => MockPose::Backward,
            MockPose::Backward => MockPose::Neutral,
        }
    }
}

impl fmt::Display for MockPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MockPose::Neutral => write!(f, "neutral"),
            MockPose::Forward => write!(f, "forward"),
            MockPose::Backward => write!(f, "backward"),
        }
    }
}

impl FromStr for MockPose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MockPose::ALL
            .into_iter()
            .find(|pose| pose.to_string() == wanted)
            .ok_or_else(|| format!("unknown pose '{wanted}' (expected neutral / forward / backward)"))
    }
}

/// Caller-owned state machine over [`MockPose`].
#[derive(Debug, Clone)]
pub struct DemoCycle {
    current: MockPose,
}

impl DemoCycle {
    pub fn new(start: MockPose) -> Self {
        Self { current: start }
    }

    pub fn current(&self) -> MockPose {
        self.current
    }

    /// Jump straight to `pose`.
    pub fn set(&mut self, pose: MockPose) {
        self.current = pose;
    }

    /// Move to the next pose and return it.
    pub fn advance(&mut self) -> MockPose {
        self.current = self.current.next();
        self.current
    }
}
