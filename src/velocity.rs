//! Forward speed pseudo-measurement and its scalar Kalman fusion.

use crate::config::FilterConfig;
use crate::num_traits::{Abs, FromCount};
use crate::types::Vector3;
use crate::FilterScalar;

/// The outcome of fusing the speed pseudo-measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedFusion<T> {
    /// The speed derived from consecutive position estimates, after capping.
    pub measurement: T,
    /// The difference between the pseudo-measurement and the prior speed.
    pub innovation: T,
    /// The scalar Kalman gain `k_v`.
    pub gain: T,
    /// The fused and limited speed.
    pub speed: T,
}

/// Derives the forward speed from the motion between two updates.
///
/// Owns the position of the previous update, the number of cycles without
/// any tag in sight and the time of the previous update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityEstimator<T> {
    previous_position: Vector3<T>,
    dropout_count: u32,
    last_update: T,
}

impl<T> VelocityEstimator<T>
where
    T: FilterScalar,
{
    /// Creates the estimator from the initial position and the current time.
    pub fn new(initial_position: Vector3<T>, now: T) -> Self {
        Self {
            previous_position: initial_position,
            dropout_count: 0,
            last_update: now,
        }
    }

    /// Counts a cycle in which no tag was seen.
    pub fn register_dropout(&mut self) {
        self.dropout_count = self.dropout_count.saturating_add(1);
    }

    /// The number of dropouts not yet worked off by updates.
    #[inline]
    pub fn dropout_count(&self) -> u32 {
        self.dropout_count
    }

    /// The position recorded at the previous update.
    #[inline]
    pub fn previous_position(&self) -> Vector3<T> {
        self.previous_position
    }

    /// The time of the previous update, in seconds.
    #[inline]
    pub fn last_update(&self) -> T {
        self.last_update
    }

    pub(crate) fn previous_position_mut(&mut self) -> &mut Vector3<T> {
        &mut self.previous_position
    }

    /// Computes the speed pseudo-measurement
    /// `z_v = ‖p − p_prev‖ / Δt / (dropouts + 1)`, capped from above.
    ///
    /// A time step of exactly zero is replaced by the configured fallback.
    pub fn pseudo_measurement(&self, position: &Vector3<T>, now: T, config: &FilterConfig<T>) -> T {
        let mut delta_t = now - self.last_update;
        if delta_t == T::zero() {
            delta_t = config.default_update_dt;
        }

        let divisor = <T as FromCount>::from_count(self.dropout_count) + T::one();
        let measurement = position.distance_to(&self.previous_position) / delta_t / divisor;
        if measurement > config.speed_measurement_cap {
            config.speed_measurement_cap
        } else {
            measurement
        }
    }

    /// Fuses the pseudo-measurement into the speed state.
    ///
    /// ## Arguments
    /// * `position` - The corrected position of the current update.
    /// * `speed` - The prior speed estimate.
    /// * `speed_variance` - The prior variance of the speed state, `P₃₃`.
    /// * `now` - The current time, in seconds.
    /// * `config` - The filter configuration.
    ///
    /// This does not modify the estimator; see [`commit`](Self::commit).
    pub fn fuse(
        &self,
        position: &Vector3<T>,
        speed: T,
        speed_variance: T,
        now: T,
        config: &FilterConfig<T>,
    ) -> SpeedFusion<T> {
        let measurement = self.pseudo_measurement(position, now, config);
        let innovation = measurement - speed;
        let gain = speed_variance / (speed_variance + config.speed_variance());

        let mut fused = speed + gain * innovation;
        if Abs::abs(fused) > config.speed_limit {
            fused = if fused < T::zero() {
                -config.speed_limit
            } else {
                config.speed_limit
            };
        }

        SpeedFusion {
            measurement,
            innovation,
            gain,
            speed: fused,
        }
    }

    /// Records the position and time of a completed update and works off one dropout.
    pub fn commit(&mut self, position: Vector3<T>, now: T) {
        self.previous_position = position;
        self.last_update = now;
        self.dropout_count = self.dropout_count.saturating_sub(1);
    }
}
