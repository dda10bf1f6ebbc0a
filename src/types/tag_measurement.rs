use crate::error::FilterError;
use crate::impl_standard_traits;
use crate::types::Vector3;
use uniform_array_derive::UniformArray;

/// The number of leading fields of a raw tag row: range, then the tag position.
pub const TAG_ROW_FIELDS: usize = 4;

/// A range reading to a tag of known position.
#[derive(UniformArray)]
#[cfg_attr(test, ensure_uniform_type::ensure_uniform_type)]
#[repr(C)]
pub struct TagMeasurement<T> {
    /// The measured distance to the tag.
    pub range: T,
    /// The world-frame x position of the tag.
    pub x: T,
    /// The world-frame y position of the tag.
    pub y: T,
    /// The world-frame z position (height) of the tag.
    pub z: T,
}

impl<T> TagMeasurement<T> {
    /// Initializes a new [`TagMeasurement`] instance.
    #[inline(always)]
    pub const fn new(range: T, x: T, y: T, z: T) -> Self {
        Self { range, x, y, z }
    }

    /// Parses a raw `[range, x, y, z, ...]` row as delivered by a tag detector.
    ///
    /// Fields beyond the fourth (e.g. tag IDs or detection quality) are ignored.
    pub fn from_row(row: &[T]) -> Result<Self, FilterError>
    where
        T: Copy,
    {
        match row {
            [range, x, y, z, ..] => Ok(Self::new(*range, *x, *y, *z)),
            _ => Err(FilterError::InvalidInputShape {
                expected: TAG_ROW_FIELDS,
                found: row.len(),
            }),
        }
    }

    /// Gets the world-frame position of the tag.
    #[inline]
    pub fn position(&self) -> Vector3<T>
    where
        T: Copy,
    {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl_standard_traits!(TagMeasurement, T, range, x, y, z);
