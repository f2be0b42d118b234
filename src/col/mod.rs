//! Column vector views with a general row stride, an owned column vector, and the shared view a
//! team writes through.

use crate::{assert, ComplexField};
use core::{marker::PhantomData, ptr::NonNull};
use reborrow::*;

pub(crate) struct VecImpl<E> {
    pub(crate) ptr: NonNull<E>,
    pub(crate) len: usize,
    pub(crate) stride: isize,
}

impl<E> Copy for VecImpl<E> {}
impl<E> Clone for VecImpl<E> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

unsafe impl<E: Sync> Sync for VecImpl<E> {}
unsafe impl<E: Send> Send for VecImpl<E> {}

impl<E> VecImpl<E> {
    #[inline(always)]
    fn ptr_at(self, row: usize) -> *mut E {
        self.ptr
            .as_ptr()
            .wrapping_offset(row as isize * self.stride)
    }
}

mod colref;
pub use colref::ColRef;

mod colmut;
pub use colmut::ColMut;

mod colown;
pub use colown::Col;

mod team;
pub use team::TeamColMut;

/// Creates a `ColRef` from a pointer to the column vector data, its number of rows, and its
/// row stride.
///
/// # Safety
/// The behavior is undefined if any of the following conditions are violated:
/// * The entire memory region addressed by the vector must be contained within a single
/// allocation, accessible in its entirety by `ptr`.
/// * `ptr` must be non-null and properly aligned, even for a zero-sized vector.
/// * The values accessible by the vector must be initialized at some point before they are read.
/// * The memory addressed by the view must not be mutated for the duration of lifetime `'a`.
#[inline(always)]
pub unsafe fn from_raw_parts<'a, E>(ptr: *const E, nrows: usize, row_stride: isize) -> ColRef<'a, E> {
    ColRef {
        inner: VecImpl {
            ptr: NonNull::new_unchecked(ptr as *mut E),
            len: nrows,
            stride: row_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a `ColMut` from a pointer to the column vector data, its number of rows, and its
/// row stride.
///
/// # Safety
/// Same as [`from_raw_parts`], and additionally the memory addressed by the view must not be
/// accessed through any other pointer for the duration of lifetime `'a`, and `row_stride` must be
/// non-zero when `nrows > 1`.
#[inline(always)]
pub unsafe fn from_raw_parts_mut<'a, E>(ptr: *mut E, nrows: usize, row_stride: isize) -> ColMut<'a, E> {
    ColMut {
        inner: VecImpl {
            ptr: NonNull::new_unchecked(ptr),
            len: nrows,
            stride: row_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a `ColRef` from a contiguous slice.
#[inline(always)]
pub fn from_slice<E: ComplexField>(slice: &[E]) -> ColRef<'_, E> {
    unsafe { from_raw_parts(slice.as_ptr(), slice.len(), 1) }
}

/// Creates a `ColMut` from a contiguous slice.
#[inline(always)]
pub fn from_slice_mut<E: ComplexField>(slice: &mut [E]) -> ColMut<'_, E> {
    unsafe { from_raw_parts_mut(slice.as_mut_ptr(), slice.len(), 1) }
}

#[track_caller]
#[inline]
fn from_strided_slice_assert(nrows: usize, row_stride: isize, len: usize) {
    if nrows > 0 {
        assert!(row_stride > 0);
        let last = isize::try_from(nrows - 1)
            .ok()
            .and_then(|last_row| last_row.checked_mul(row_stride));
        assert!(last.is_some());
        if let Some(last) = last {
            assert!((last as usize) < len);
        }
    }
}

/// Creates a `ColMut` over every `row_stride`-th element of `slice`, starting at `slice[0]`.
///
/// # Panics
/// The function panics if `row_stride` is not positive, or if any element of the view falls
/// outside of `slice`.
///
/// # Example
/// ```
/// use team_trsv::col;
///
/// let mut data = [1.0, -1.0, 2.0, -1.0, 3.0_f64];
/// let mut v = col::from_slice_with_stride_mut(&mut data, 3, 2);
/// v.write(1, 5.0);
///
/// assert_eq!(data, [1.0, -1.0, 5.0, -1.0, 3.0]);
/// ```
#[track_caller]
#[inline]
pub fn from_slice_with_stride_mut<E: ComplexField>(
    slice: &mut [E],
    nrows: usize,
    row_stride: isize,
) -> ColMut<'_, E> {
    from_strided_slice_assert(nrows, row_stride, slice.len());
    unsafe { from_raw_parts_mut(slice.as_mut_ptr(), nrows, row_stride) }
}

/// Creates a `ColRef` over every `row_stride`-th element of `slice`, starting at `slice[0]`.
///
/// # Panics
/// The function panics if `row_stride` is not positive, or if any element of the view falls
/// outside of `slice`.
#[track_caller]
#[inline]
pub fn from_slice_with_stride<E: ComplexField>(
    slice: &[E],
    nrows: usize,
    row_stride: isize,
) -> ColRef<'_, E> {
    from_strided_slice_assert(nrows, row_stride, slice.len());
    unsafe { from_raw_parts(slice.as_ptr(), nrows, row_stride) }
}

impl<'short, E> Reborrow<'short> for ColRef<'_, E> {
    type Target = ColRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, E> ReborrowMut<'short> for ColRef<'_, E> {
    type Target = ColRef<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<'a, E> IntoConst for ColRef<'a, E> {
    type Target = ColRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'short, E> Reborrow<'short> for ColMut<'_, E> {
    type Target = ColRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        ColRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'short, E> ReborrowMut<'short> for ColMut<'_, E> {
    type Target = ColMut<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        ColMut {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> IntoConst for ColMut<'a, E> {
    type Target = ColRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        ColRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn strided_column_views() {
        let mut data: Vec<f64> = (0..9).map(|x| x as f64).collect();
        {
            let v = from_slice_with_stride(&data, 3, 4);
            assert!(all(v.read(0) == 0.0, v.read(1) == 4.0, v.read(2) == 8.0));
            let r = v.reverse_rows();
            assert!(all(r.read(0) == 8.0, r.read(2) == 0.0));
        }

        let mut v = from_slice_with_stride_mut(&mut data, 3, 3);
        v.rb_mut().subrows_mut(1, 2).fill(-1.0);
        assert!(v.read(0) == 0.0);
        assert!(data == [0.0, 1.0, 2.0, -1.0, 4.0, 5.0, -1.0, 7.0, 8.0]);
    }

    #[test]
    #[should_panic]
    fn strided_column_out_of_bounds() {
        let data = [0.0f64; 4];
        from_slice_with_stride(&data, 3, 2);
    }

    #[test]
    #[should_panic]
    fn strided_column_overflowing_stride() {
        // 4 × (2^62 + 1) wraps around to 4
        let data = [0.0f64; 5];
        from_slice_with_stride(&data, 5, (1 << 62) + 1);
    }

    #[test]
    fn copy_into_strided_column() {
        let src = Col::from_fn(3, |i| i as f64 + 1.0);
        let mut data = [0.0f64; 6];
        from_slice_with_stride_mut(&mut data, 3, 2)
            .reverse_rows_mut()
            .copy_from(src.as_ref());
        assert!(data == [3.0, 0.0, 2.0, 0.0, 1.0, 0.0]);

        let mut dst = Col::zeros(3);
        dst.as_mut().copy_from(from_slice_with_stride(&data, 3, 2));
        dst[0] += 1.0;
        assert!(dst == Col::from_fn(3, |i| [4.0, 2.0, 1.0][i]));
    }

    #[test]
    #[should_panic]
    fn copy_from_mismatched_length() {
        let src = Col::<f64>::zeros(2);
        let mut dst = Col::<f64>::zeros(3);
        dst.as_mut().copy_from(src.as_ref());
    }

    #[test]
    fn column_of_row_major_matrix() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0_f64];
        let m = crate::mat::from_row_major_slice(&data, 2, 3);
        let c = m.col(1);
        assert!(all(c.nrows() == 2, c.row_stride() == 3, c.read(1) == 5.0));
    }
}
