//! The range measurement model and its Jacobian.
//!
//! A tag reports its distance to the platform, so the measurement function is
//! `h(p) = ‖p − t‖` for an estimated position `p` and tag position `t`.

use crate::error::DegenerateCause;
use crate::types::{TagMeasurement, Vector3};
use crate::FilterScalar;

/// Predicts the range to a tag from the estimated position.
#[inline]
pub fn predict_range<T>(position: &Vector3<T>, tag_position: &Vector3<T>) -> T
where
    T: FilterScalar,
{
    position.distance_to(tag_position)
}

/// Computes the Jacobian row `∂h/∂p = (p − t) / ‖p − t‖`, i.e. the unit vector
/// pointing from the tag toward the estimated position.
///
/// When the position coincides with the tag the direction is undefined and the
/// zero row is returned, so that the tag carries no positional information.
pub fn range_jacobian<T>(position: &Vector3<T>, tag_position: &Vector3<T>) -> Vector3<T>
where
    T: FilterScalar,
{
    let offset = *position - *tag_position;
    let range = offset.norm();
    if range == T::zero() {
        return Vector3::new(T::zero(), T::zero(), T::zero());
    }

    Vector3::new(offset.x / range, offset.y / range, offset.z / range)
}

/// Predicts the ranges to all tags of a batch.
pub fn predicted_ranges<'a, T>(
    position: &'a Vector3<T>,
    tags: &'a [TagMeasurement<T>],
) -> impl Iterator<Item = T> + 'a
where
    T: FilterScalar,
{
    tags.iter()
        .map(move |tag| predict_range(position, &tag.position()))
}

/// Computes the Jacobian rows for all tags of a batch.
pub fn range_jacobians<'a, T>(
    position: &'a Vector3<T>,
    tags: &'a [TagMeasurement<T>],
) -> impl Iterator<Item = Vector3<T>> + 'a
where
    T: FilterScalar,
{
    tags.iter()
        .map(move |tag| range_jacobian(position, &tag.position()))
}

/// The factor the base range variance is scaled with for a tag, `‖t‖ / t_z`.
///
/// Tags mounted high relative to their distance from the origin are trusted more.
pub fn slant_noise_scale<T>(tag_position: &Vector3<T>) -> Result<T, DegenerateCause>
where
    T: FilterScalar,
{
    if tag_position.z == T::zero() {
        return Err(DegenerateCause::ZeroTagHeight);
    }

    Ok(tag_position.norm() / tag_position.z)
}
