//! `armswing-perception` – geometric core of the arm-swing estimator.
//!
//! Turns a single frame of five 3-D landmarks into the angle of the right arm
//! relative to the torso axis, measured inside the plane derived from the
//! shoulder line and the torso axis, plus a forward / backward / neutral
//! classification.
//!
//! # Modules
//!
//! - [`vector`] – vector algebra primitives on
//!   [`Point3`][armswing_types::Point3] (dot, cross, norm, normalize, …).
//! - [`projection`] – [`project_onto_plane`][projection::project_onto_plane]:
//!   removes the component of a vector parallel to a plane normal.
//! - [`sagittal`] – [`SagittalEstimator`][sagittal::SagittalEstimator]:
//!   derives the torso axis and plane normal, projects arm and axis, and
//!   classifies the swing.
//!
//! Everything in this crate is pure and stateless; an estimator may be shared
//! freely between threads.

pub mod projection;
pub mod sagittal;
pub mod vector;

pub use projection::project_onto_plane;
pub use sagittal::{EstimatorConfig, SagittalEstimator, SwingGeometry, estimate_arm_swing};
