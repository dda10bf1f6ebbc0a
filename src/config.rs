//! Tuning parameters of the estimator.

use crate::types::{StateEstimate, StateNoise};

/// The admissible interval of one position axis and the value it is reset to
/// when the estimate leaves it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds<T> {
    /// The lower bound; the bound itself is admissible.
    pub min: T,
    /// The upper bound; the bound itself is admissible.
    pub max: T,
    /// The value the axis is reset to on divergence.
    pub reset: T,
}

impl<T> AxisBounds<T> {
    /// Initializes a new [`AxisBounds`] instance.
    pub const fn new(min: T, max: T, reset: T) -> Self {
        Self { min, max, reset }
    }

    /// Determines whether the value lies inside the bounds.
    ///
    /// NaN is never inside.
    #[inline]
    pub fn contains(&self, value: T) -> bool
    where
        T: PartialOrd,
    {
        value >= self.min && value <= self.max
    }
}

/// The workspace box the position estimate must stay in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkspaceBounds<T> {
    pub x: AxisBounds<T>,
    pub y: AxisBounds<T>,
    pub z: AxisBounds<T>,
}

impl<T> WorkspaceBounds<T> {
    /// Initializes a new [`WorkspaceBounds`] instance.
    pub const fn new(x: AxisBounds<T>, y: AxisBounds<T>, z: AxisBounds<T>) -> Self {
        Self { x, y, z }
    }

    /// Returns the per-axis bounds in `[x, y, z]` order.
    pub fn axes(&self) -> [AxisBounds<T>; 3]
    where
        T: Copy,
    {
        [self.x, self.y, self.z]
    }
}

/// Configuration of the [`StateEstimator`](crate::estimator::StateEstimator).
///
/// The [`Default`] implementations for `f32` and `f64` carry the tuning the
/// filter was designed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig<T> {
    /// The state the filter starts from; default `[1.0, 1.0, 0.5, 0.0]`.
    pub initial_state: StateEstimate<T>,
    /// The initial standard deviations of the states (`P₀ = diag(σ²)`).
    pub initial_sigma: StateNoise<T>,
    /// The process noise standard deviations (`Q = diag(σ²)`).
    pub process_sigma: StateNoise<T>,
    /// The base standard deviation of a range reading.
    pub range_sigma: T,
    /// The standard deviation of the speed pseudo-measurement.
    pub speed_sigma: T,
    /// The factor the speed decays by in every prediction.
    pub speed_decay: T,
    /// Tags reporting a larger range are ignored.
    pub max_tag_range: T,
    /// The upper limit of the speed pseudo-measurement.
    pub speed_measurement_cap: T,
    /// The largest speed magnitude the estimate may hold after an update.
    pub speed_limit: T,
    /// The factor the speed is inflated by on a cycle without tags.
    pub dropout_speed_gain: T,
    /// The prediction time step used when no time has passed.
    pub default_predict_dt: T,
    /// The update time step used when no time has passed.
    pub default_update_dt: T,
    /// The pitch distance to ±π/2, in radians, at which a gimbal lock warning is logged.
    pub gimbal_lock_tolerance: T,
    /// The workspace box enforced after each update.
    pub bounds: WorkspaceBounds<T>,
}

impl<T> FilterConfig<T> {
    /// Replaces the initial state.
    pub fn with_initial_state(mut self, state: StateEstimate<T>) -> Self {
        self.initial_state = state;
        self
    }

    /// Replaces the maximum accepted tag range.
    pub fn with_max_tag_range(mut self, range: T) -> Self {
        self.max_tag_range = range;
        self
    }

    /// Replaces the workspace bounds.
    pub fn with_bounds(mut self, bounds: WorkspaceBounds<T>) -> Self {
        self.bounds = bounds;
        self
    }

    /// The base range measurement variance `r`.
    pub fn range_variance(&self) -> T
    where
        T: Copy + core::ops::Mul<T, Output = T>,
    {
        self.range_sigma * self.range_sigma
    }

    /// The speed pseudo-measurement variance.
    pub fn speed_variance(&self) -> T
    where
        T: Copy + core::ops::Mul<T, Output = T>,
    {
        self.speed_sigma * self.speed_sigma
    }
}

macro_rules! impl_default_config {
    ($t:ty) => {
        impl Default for WorkspaceBounds<$t> {
            fn default() -> Self {
                Self::new(
                    AxisBounds::new(-1.0, 5.0, 1.5),
                    AxisBounds::new(-1.0, 3.0, 1.0),
                    AxisBounds::new(-0.2, 1.5, 0.5),
                )
            }
        }

        impl Default for FilterConfig<$t> {
            fn default() -> Self {
                Self {
                    initial_state: StateEstimate::new(1.0, 1.0, 0.5, 0.0),
                    initial_sigma: StateNoise::new(0.2, 0.2, 0.1, 0.1),
                    process_sigma: StateNoise::new(0.05, 0.05, 0.03, 0.05),
                    range_sigma: 0.5,
                    speed_sigma: 0.5,
                    speed_decay: 0.98,
                    max_tag_range: 3.0,
                    speed_measurement_cap: 0.7,
                    speed_limit: 1.0,
                    dropout_speed_gain: 1.15,
                    default_predict_dt: 0.02,
                    default_update_dt: 0.1,
                    gimbal_lock_tolerance: 0.01,
                    bounds: WorkspaceBounds::default(),
                }
            }
        }
    };
}

impl_default_config!(f32);
impl_default_config!(f64);
