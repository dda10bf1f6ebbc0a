use core::fmt::Debug;
use minikalman::matrix::MatrixDataType;

/// The scalar capabilities required by the estimator.
///
/// Implemented for `f32` and `f64`.
pub trait FilterScalar:
    MatrixDataType
    + Default
    + PartialOrd
    + Debug
    + Abs
    + SinCos
    + IsFinite
    + RoundDecimals
    + FromCount
    + DetectGimbalLock<Self>
{
}

impl<T> FilterScalar for T where
    T: MatrixDataType
        + Default
        + PartialOrd
        + Debug
        + Abs
        + SinCos
        + IsFinite
        + RoundDecimals
        + FromCount
        + DetectGimbalLock<T>
{
}

pub trait GimbalLockZenithNadir<T> {
    /// The value for the zenith, i.e. π/2;
    const ZENITH: T;

    /// The value for the nadir, i.e. -π/2;
    const NADIR: T;
}

pub trait DetectGimbalLock<T>: GimbalLockZenithNadir<T> {
    /// Determines whether a Gimbal Lock situation is about to occur
    /// because the angle (provided in radians) is close to π/2 or -π/2.
    ///
    /// ## Arguments
    /// * `tolerance` - The tolerance in radians, e.g. 0.01 rad.
    fn close_to_zenith_or_nadir(&self, tolerance: T) -> bool;
}

pub trait Abs {
    /// Returns the absolute value.
    fn abs(self) -> Self;
}

pub trait SinCos: Sized {
    /// Simultaneously computes the sine and cosine of the angle (in radians).
    fn sin_cos(self) -> (Self, Self);
}

pub trait IsFinite {
    /// Returns `true` if the value is neither infinite nor NaN.
    fn is_finite(self) -> bool;
}

pub trait RoundDecimals {
    /// Rounds to the given number of decimal places, half away from zero.
    fn round_decimals(self, decimals: i32) -> Self;
}

pub trait FromCount {
    /// Converts an event count into the scalar type.
    fn from_count(count: u32) -> Self;
}

macro_rules! impl_float_traits {
    ($t:ty, $frac_pi_2:expr) => {
        impl GimbalLockZenithNadir<$t> for $t {
            const ZENITH: $t = $frac_pi_2;
            const NADIR: $t = -$frac_pi_2;
        }

        impl DetectGimbalLock<$t> for $t {
            #[inline]
            fn close_to_zenith_or_nadir(&self, tolerance: $t) -> bool {
                let a = Abs::abs(*self - <$t>::ZENITH);
                let b = Abs::abs(*self - <$t>::NADIR);
                a <= tolerance || b <= tolerance
            }
        }

        impl Abs for $t {
            #[inline(always)]
            fn abs(self) -> $t {
                ::num_traits::Float::abs(self)
            }
        }

        impl SinCos for $t {
            #[inline(always)]
            fn sin_cos(self) -> ($t, $t) {
                ::num_traits::Float::sin_cos(self)
            }
        }

        impl IsFinite for $t {
            #[inline(always)]
            fn is_finite(self) -> bool {
                ::num_traits::Float::is_finite(self)
            }
        }

        impl RoundDecimals for $t {
            #[inline]
            fn round_decimals(self, decimals: i32) -> $t {
                let scale = ::num_traits::Float::powi(10.0 as $t, decimals);
                ::num_traits::Float::round(self * scale) / scale
            }
        }

        impl FromCount for $t {
            #[inline(always)]
            fn from_count(count: u32) -> $t {
                count as $t
            }
        }
    };
}

impl_float_traits!(f32, core::f32::consts::FRAC_PI_2);
impl_float_traits!(f64, core::f64::consts::FRAC_PI_2);
