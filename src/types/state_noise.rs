use crate::impl_standard_traits;
use core::ops::Mul;
use uniform_array_derive::UniformArray;

/// Standard deviations for each of the four filter states.
#[derive(UniformArray)]
#[cfg_attr(test, ensure_uniform_type::ensure_uniform_type)]
#[repr(C)]
pub struct StateNoise<T> {
    /// The sigma of the world-frame x position.
    pub x: T,
    /// The sigma of the world-frame y position.
    pub y: T,
    /// The sigma of the world-frame z position.
    pub z: T,
    /// The sigma of the body-frame forward speed.
    pub speed: T,
}

impl<T> StateNoise<T> {
    /// Initializes a new [`StateNoise`] instance.
    #[inline(always)]
    pub const fn new(x: T, y: T, z: T, speed: T) -> Self {
        Self { x, y, z, speed }
    }

    /// Returns the variances (sigma-squared) in state order.
    pub fn variances(&self) -> [T; 4]
    where
        T: Mul<T, Output = T> + Copy,
    {
        [
            self.x * self.x,
            self.y * self.y,
            self.z * self.z,
            self.speed * self.speed,
        ]
    }

    /// Builds a diagonal covariance matrix from the variances.
    pub fn diagonal_covariance(&self) -> [[T; 4]; 4]
    where
        T: Mul<T, Output = T> + Copy + Default,
    {
        let variances = self.variances();
        let mut matrix = [[T::default(); 4]; 4];
        for (index, variance) in variances.into_iter().enumerate() {
            matrix[index][index] = variance;
        }
        matrix
    }
}

impl_standard_traits!(StateNoise, T, x, y, z, speed);
