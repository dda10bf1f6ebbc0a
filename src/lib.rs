//! # Tag-ranging position and speed estimation
//!
//! An Extended Kalman Filter estimating the world-frame position and the
//! body-frame forward speed of a platform from range readings to tags of known
//! position, with a gyroscope-driven dead-reckoning of the orientation.
//!
//! ```
//! use tag_ranging_ekf::{AngularRates, FilterConfig, SimulatedClock, StateEstimator, TagMeasurement};
//!
//! let mut estimator = StateEstimator::new(SimulatedClock::new(0.0), FilterConfig::<f64>::default());
//!
//! estimator.clock_mut().advance(0.02);
//! estimator.predict(&AngularRates::new(0.0, 0.0, 0.1));
//!
//! let tags = [TagMeasurement::new(1.1, 1.0, 2.0, 1.4)];
//! let report = estimator.update(&tags).expect("tag geometry is valid");
//! assert_eq!(report.accepted_tags, 1);
//!
//! let state = estimator.estimated_state();
//! assert!(state.speed.abs() <= 1.0);
//! ```

// Enable no_std mode.
#![cfg_attr(not(feature = "std"), no_std)]
// Ensure allow(unsafe_code) / forbid(unsafe_code) markers.
#![cfg_attr(feature = "unsafe", allow(unsafe_code))]
#![cfg_attr(not(feature = "unsafe"), forbid(unsafe_code))]
// Only enables the `doc_cfg` feature when the `docsrs` configuration attribute is defined.
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("Either the `std` or the `libm` feature must be enabled for floating-point math.");

pub mod bounds;
pub mod clock;
pub mod config;
mod error;
pub mod estimator;
mod macros;
pub mod measurement;
mod num_traits;
pub mod orientation;
pub mod types;
pub mod velocity;

pub use crate::bounds::{BoundsGuard, ResetAxes};
pub use crate::clock::Clock;
#[cfg(feature = "std")]
pub use crate::clock::SystemClock;
pub use crate::clock::SimulatedClock;
pub use crate::config::{AxisBounds, FilterConfig, WorkspaceBounds};
pub use crate::error::{DegenerateCause, FilterError};
pub use crate::estimator::{CovarianceMatrix, StateEstimator, UpdateReport, MAX_TAGS};
pub use crate::num_traits::*;
pub use crate::orientation::OrientationTracker;
pub use crate::types::*;
pub use crate::velocity::{SpeedFusion, VelocityEstimator};
