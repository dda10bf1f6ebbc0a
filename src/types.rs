//! Plain value types exchanged with the estimator.

mod angular_rates;
mod euler_angles;
mod state_estimate;
mod state_noise;
mod tag_measurement;
mod vector3;

pub use crate::types::angular_rates::AngularRates;
pub use crate::types::euler_angles::EulerAngles;
pub use crate::types::state_estimate::StateEstimate;
pub use crate::types::state_noise::StateNoise;
pub use crate::types::tag_measurement::{TagMeasurement, TAG_ROW_FIELDS};
pub use crate::types::vector3::Vector3;
