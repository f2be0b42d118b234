//! Scalar traits for the element types of matrices and vectors, and for the `alpha` multiplier.

use core::{
    fmt::Debug,
    ops::{Add, Div, Mul, Neg, Sub},
};
use num_complex::Complex;

/// Complex floating point number type, where the real and imaginary parts each occupy 32 bits.
#[allow(non_camel_case_types)]
pub type c32 = Complex<f32>;
/// Complex floating point number type, where the real and imaginary parts each occupy 64 bits.
#[allow(non_camel_case_types)]
pub type c64 = Complex<f64>;

/// Trait that describes a complex number field.
///
/// Real numbers can also be seen as complex numbers, where the imaginary part is always zero.
///
/// Implementors are plain old data, so they can be staged through [`dyn_stack::PodStack`]
/// workspaces.
pub trait ComplexField:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + PartialEq
    + bytemuck::Pod
    + Send
    + Sync
    + Debug
    + 'static
{
    /// Magnitude type.
    type Real: RealField;

    /// Returns a complex number whose real part is equal to `real`, and a zero imaginary part.
    fn from_real(real: Self::Real) -> Self;

    /// Returns the value representing `0.0`.
    fn zero() -> Self;
    /// Returns the value representing `1.0`.
    fn one() -> Self;

    /// Returns the input, scaled by `factor`.
    #[inline(always)]
    fn scale_real(self, factor: Self::Real) -> Self {
        self * Self::from_real(factor)
    }
    /// Returns the absolute value of the number.
    fn abs(self) -> Self::Real;
}

/// Trait that describes a real number field.
pub trait RealField: ComplexField<Real = Self> + PartialOrd {
    /// Machine epsilon.
    fn epsilon() -> Self;
    /// Converts a small integer, such as a problem dimension, to a real number.
    fn from_usize(value: usize) -> Self;
}

/// Scalar type accepted as the `alpha` multiplier of a solve over elements of type `E`.
///
/// It is implemented for `E` itself, and for the real type of a complex `E`. It is not implemented
/// for SIMD lane types, so passing one is rejected at compile time.
pub trait SameMagnitude<E: ComplexField>: Copy + Send + Sync + Debug + 'static {
    /// Returns `true` if `self` is zero.
    fn is_zero(self) -> bool;
    /// Returns `true` if `self` is one.
    fn is_one(self) -> bool;
    /// Returns `self × value`.
    fn scale(self, value: E) -> E;
}

impl<E: ComplexField> SameMagnitude<E> for E {
    #[inline(always)]
    fn is_zero(self) -> bool {
        self == E::zero()
    }

    #[inline(always)]
    fn is_one(self) -> bool {
        self == E::one()
    }

    #[inline(always)]
    fn scale(self, value: E) -> E {
        self * value
    }
}

macro_rules! impl_real_alpha_for_complex {
    ($real: ty) => {
        impl SameMagnitude<Complex<$real>> for $real {
            #[inline(always)]
            fn is_zero(self) -> bool {
                self == 0.0
            }

            #[inline(always)]
            fn is_one(self) -> bool {
                self == 1.0
            }

            #[inline(always)]
            fn scale(self, value: Complex<$real>) -> Complex<$real> {
                value.scale_real(self)
            }
        }
    };
}

impl_real_alpha_for_complex!(f32);
impl_real_alpha_for_complex!(f64);

macro_rules! impl_real_field {
    ($real: ty) => {
        impl RealField for $real {
            #[inline(always)]
            fn epsilon() -> Self {
                <$real>::EPSILON
            }

            #[inline(always)]
            fn from_usize(value: usize) -> Self {
                value as $real
            }
        }

        impl ComplexField for $real {
            type Real = $real;

            #[inline(always)]
            fn from_real(real: Self::Real) -> Self {
                real
            }

            #[inline(always)]
            fn zero() -> Self {
                0.0
            }

            #[inline(always)]
            fn one() -> Self {
                1.0
            }

            #[inline(always)]
            fn abs(self) -> Self::Real {
                <$real>::abs(self)
            }
        }
    };
}

impl_real_field!(f32);
impl_real_field!(f64);

macro_rules! impl_complex_field {
    ($real: ty) => {
        impl ComplexField for Complex<$real> {
            type Real = $real;

            #[inline(always)]
            fn from_real(real: Self::Real) -> Self {
                Complex { re: real, im: 0.0 }
            }

            #[inline(always)]
            fn zero() -> Self {
                Complex { re: 0.0, im: 0.0 }
            }

            #[inline(always)]
            fn one() -> Self {
                Complex { re: 1.0, im: 0.0 }
            }

            #[inline(always)]
            fn abs(self) -> Self::Real {
                self.norm()
            }
        }
    };
}

impl_complex_field!(f32);
impl_complex_field!(f64);

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    fn alpha_props<E: ComplexField, S: SameMagnitude<E>>(alpha: S) -> (bool, bool) {
        (alpha.is_zero(), alpha.is_one())
    }

    #[test]
    fn real_alpha_scales_complex() {
        let z = c64::new(1.5, -2.0);
        let scaled = SameMagnitude::<c64>::scale(2.0f64, z);
        assert!(scaled == c64::new(3.0, -4.0));
        assert!(alpha_props::<c64, f64>(0.0) == (true, false));
        assert!(alpha_props::<c64, f64>(1.0) == (false, true));
        assert!(alpha_props::<c32, c32>(c32::new(1.0, 0.0)) == (false, true));
    }

    #[test]
    fn complex_magnitude() {
        let z = c64::new(3.0, 4.0);
        assert!(ComplexField::abs(z) == 5.0);
        assert!(z.scale_real(0.5) == c64::new(1.5, 2.0));
        assert!(<c32 as ComplexField>::from_real(2.0) == c32::new(2.0, 0.0));
    }
}
