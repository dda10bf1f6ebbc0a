//! Divergence recovery for the position estimate.

use crate::config::WorkspaceBounds;
use crate::types::Vector3;
use crate::FilterScalar;

/// The position axes a [`BoundsGuard`] had to reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetAxes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl ResetAxes {
    /// Determines whether any axis was reset.
    #[inline]
    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }
}

/// Resets position axes that left the workspace or became non-finite.
///
/// A reset axis is set to its configured reset value, the previous position
/// used by the speed pseudo-measurement is set to the same value, and the
/// axis' covariance row is restored from the initial covariance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsGuard<T> {
    bounds: WorkspaceBounds<T>,
}

impl<T> BoundsGuard<T>
where
    T: FilterScalar,
{
    /// Creates a guard enforcing the given workspace.
    pub fn new(bounds: WorkspaceBounds<T>) -> Self {
        Self { bounds }
    }

    /// The enforced workspace.
    pub fn bounds(&self) -> &WorkspaceBounds<T> {
        &self.bounds
    }

    /// Checks every axis of `position` and resets those outside the workspace.
    pub fn enforce(
        &self,
        position: &mut Vector3<T>,
        previous: &mut Vector3<T>,
        covariance: &mut [[T; 4]; 4],
        initial_covariance: &[[T; 4]; 4],
    ) -> ResetAxes {
        let axes = self.bounds.axes();
        let mut reset = [false; 3];

        let current = [&mut position.x, &mut position.y, &mut position.z];
        let prior = [&mut previous.x, &mut previous.y, &mut previous.z];

        for (index, ((value, prev), bounds)) in current
            .into_iter()
            .zip(prior)
            .zip(axes.iter())
            .enumerate()
        {
            // NaN fails the containment check as well.
            if bounds.contains(*value) {
                continue;
            }

            *value = bounds.reset;
            *prev = bounds.reset;
            covariance[index] = initial_covariance[index];
            reset[index] = true;
        }

        let [x, y, z] = reset;
        ResetAxes { x, y, z }
    }
}
