use crate::impl_standard_traits;
use crate::types::Vector3;
use uniform_array_derive::UniformArray;

/// The filter state: world-frame position and body-frame forward speed.
#[derive(UniformArray)]
#[cfg_attr(test, ensure_uniform_type::ensure_uniform_type)]
#[repr(C)]
pub struct StateEstimate<T> {
    /// The world-frame x position.
    pub x: T,
    /// The world-frame y position.
    pub y: T,
    /// The world-frame z position.
    pub z: T,
    /// The body-frame forward speed.
    pub speed: T,
}

impl<T> StateEstimate<T> {
    /// Initializes a new [`StateEstimate`] instance.
    #[inline(always)]
    pub const fn new(x: T, y: T, z: T, speed: T) -> Self {
        Self { x, y, z, speed }
    }

    /// Composes a state from a position and a speed.
    #[inline]
    pub fn from_position(position: Vector3<T>, speed: T) -> Self {
        Self::new(position.x, position.y, position.z, speed)
    }

    /// Returns the position part of the state.
    #[inline]
    pub fn position(&self) -> Vector3<T>
    where
        T: Copy,
    {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Returns the state as an array in `[x, y, z, speed]` order.
    #[inline(always)]
    pub fn into_array(self) -> [T; 4] {
        [self.x, self.y, self.z, self.speed]
    }
}

impl<T> From<[T; 4]> for StateEstimate<T> {
    #[inline]
    fn from(value: [T; 4]) -> Self {
        let [x, y, z, speed] = value;
        Self { x, y, z, speed }
    }
}

impl_standard_traits!(StateEstimate, T, x, y, z, speed);
