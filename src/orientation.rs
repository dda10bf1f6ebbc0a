//! Dead-reckoning of the body orientation from angular rates.
//!
//! The tracker integrates the gyroscope rates with a plain Euler step and
//! provides the rotation used to carry the forward displacement of the body
//! into the world frame during prediction. There is no feedback from the
//! range measurements into the angles.

use crate::num_traits::SinCos;
use crate::types::{AngularRates, EulerAngles, Vector3};
use crate::FilterScalar;

/// Integrates body angular rates into yaw, pitch and roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationTracker<T> {
    yaw: T,
    pitch: T,
    roll: T,
}

impl<T> OrientationTracker<T>
where
    T: FilterScalar,
{
    /// Creates a tracker with all angles at zero.
    pub fn new() -> Self {
        Self {
            yaw: T::zero(),
            pitch: T::zero(),
            roll: T::zero(),
        }
    }

    /// Advances the angles by one time step.
    ///
    /// Yaw and pitch are integrated against the z and y rates, roll along the x rate:
    /// `yaw −= ω_z·Δt`, `pitch −= ω_y·Δt`, `roll += ω_x·Δt`.
    pub fn integrate(&mut self, rates: &AngularRates<T>, delta_t: T) {
        let increment = *rates * delta_t;
        self.yaw = self.yaw - increment.omega_z;
        self.pitch = self.pitch - increment.omega_y;
        self.roll = self.roll + increment.omega_x;
    }

    /// Overrides all three angles.
    pub fn set_angles(&mut self, angles: EulerAngles<T>) {
        self.yaw = angles.yaw_psi;
        self.pitch = angles.pitch_theta;
        self.roll = angles.roll_phi;
    }

    /// Gets the current angles.
    pub fn angles(&self) -> EulerAngles<T> {
        EulerAngles::from_yaw_pitch_roll(self.yaw, self.pitch, self.roll)
    }

    /// The yaw angle ψ (psi), in radians.
    #[inline]
    pub fn yaw(&self) -> T {
        self.yaw
    }

    /// The pitch angle θ (theta), in radians.
    #[inline]
    pub fn pitch(&self) -> T {
        self.pitch
    }

    /// The roll angle φ (phi), in radians.
    #[inline]
    pub fn roll(&self) -> T {
        self.roll
    }

    /// Builds the unit quaternion `(w, x, y, z)` of the yaw-pitch-roll (ZYX) rotation.
    pub fn quaternion(&self) -> (T, T, T, T) {
        let two = T::one() + T::one();
        let (sy, cy) = SinCos::sin_cos(self.yaw / two);
        let (sp, cp) = SinCos::sin_cos(self.pitch / two);
        let (sr, cr) = SinCos::sin_cos(self.roll / two);

        let w = cy * cp * cr + sy * sp * sr;
        let x = cy * cp * sr - sy * sp * cr;
        let y = sy * cp * sr + cy * sp * cr;
        let z = sy * cp * cr - cy * sp * sr;
        (w, x, y, z)
    }

    /// Rotates a body-frame vector into the world frame.
    pub fn rotate_body_to_world(&self, vector: Vector3<T>) -> Vector3<T> {
        let (w, x, y, z) = self.quaternion();
        let one = T::one();
        let two = one + one;

        // Rotation matrix of the unit quaternion, row by row.
        let r00 = one - two * (y * y + z * z);
        let r01 = two * (x * y - w * z);
        let r02 = two * (x * z + w * y);

        let r10 = two * (x * y + w * z);
        let r11 = one - two * (x * x + z * z);
        let r12 = two * (y * z - w * x);

        let r20 = two * (x * z - w * y);
        let r21 = two * (y * z + w * x);
        let r22 = one - two * (x * x + y * y);

        Vector3::new(
            r00 * vector.x + r01 * vector.y + r02 * vector.z,
            r10 * vector.x + r11 * vector.y + r12 * vector.z,
            r20 * vector.x + r21 * vector.y + r22 * vector.z,
        )
    }

    /// Determines whether the pitch is within `tolerance` radians of ±π/2.
    pub fn close_to_gimbal_lock(&self, tolerance: T) -> bool {
        self.pitch.close_to_zenith_or_nadir(tolerance)
    }
}

impl<T> Default for OrientationTracker<T>
where
    T: FilterScalar,
{
    fn default() -> Self {
        Self::new()
    }
}
