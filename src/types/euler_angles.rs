use crate::impl_standard_traits;
use uniform_array_derive::UniformArray;

/// Orientation angles of the body with respect to the world frame.
#[derive(UniformArray)]
#[cfg_attr(test, ensure_uniform_type::ensure_uniform_type)]
#[repr(C)]
pub struct EulerAngles<T> {
    /// The roll angle, in radians.
    pub roll_phi: T,
    /// The pitch angle, in radians.
    pub pitch_theta: T,
    /// The yaw angle, in radians.
    pub yaw_psi: T,
}

impl<T> EulerAngles<T> {
    /// Initializes a new [`EulerAngles`] instance.
    #[inline(always)]
    pub const fn new(roll_phi: T, pitch_theta: T, yaw_psi: T) -> Self {
        Self {
            roll_phi,
            pitch_theta,
            yaw_psi,
        }
    }

    /// Initializes a new [`EulerAngles`] instance from angles given in yaw, pitch, roll order.
    #[inline(always)]
    pub const fn from_yaw_pitch_roll(yaw_psi: T, pitch_theta: T, roll_phi: T) -> Self {
        Self::new(roll_phi, pitch_theta, yaw_psi)
    }
}

impl_standard_traits!(EulerAngles, T, roll_phi, pitch_theta, yaw_psi);
