//! Matrix views with general row and column strides, and an owned column-major matrix.

use crate::{assert, ComplexField};
use core::{marker::PhantomData, ptr::NonNull};
use reborrow::*;

mod matmut;
mod matown;
mod matref;

pub use matmut::MatMut;
pub use matown::Mat;
pub use matref::MatRef;

struct MatImpl<E> {
    ptr: NonNull<E>,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
}

impl<E> Copy for MatImpl<E> {}
impl<E> Clone for MatImpl<E> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

unsafe impl<E: Sync> Sync for MatImpl<E> {}
unsafe impl<E: Send> Send for MatImpl<E> {}

impl<E> MatImpl<E> {
    #[inline(always)]
    fn offset(&self, i: usize, j: usize) -> isize {
        i as isize * self.row_stride + j as isize * self.col_stride
    }
}

/// Returns the smallest and largest element offsets reached by a view whose last element is at
/// `(last_row, last_col)`, or `None` if either one overflows `isize`.
#[inline]
fn offset_span(
    last_row: usize,
    last_col: usize,
    row_stride: isize,
    col_stride: isize,
) -> Option<(isize, isize)> {
    let row = isize::try_from(last_row).ok()?.checked_mul(row_stride)?;
    let col = isize::try_from(last_col).ok()?.checked_mul(col_stride)?;
    let lo = row.min(0).checked_add(col.min(0))?;
    let hi = row.max(0).checked_add(col.max(0))?;
    Some((lo, hi))
}

#[track_caller]
#[inline]
fn from_slice_assert(nrows: usize, ncols: usize, len: usize) {
    // we don't have to worry about size == usize::MAX == slice.len(), because the length of a
    // slice can never exceed isize::MAX in bytes
    let size = usize::checked_mul(nrows, ncols).unwrap_or(usize::MAX);
    assert!(size == len);
}

#[track_caller]
#[inline]
fn from_strided_slice_assert(
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
    len: usize,
) {
    if nrows == 0 || ncols == 0 {
        return;
    }
    let span = offset_span(nrows - 1, ncols - 1, row_stride, col_stride);
    assert!(span.is_some());
    if let Some((lo, hi)) = span {
        assert!(all(lo >= 0, (hi as usize) < len));
    }
}

/// Creates a `MatRef` from pointers to the matrix data, dimensions, and strides.
///
/// The row (resp. column) stride is the offset from the memory address of a given matrix
/// element at indices `(row: i, col: j)`, to the memory address of the matrix element at
/// indices `(row: i + 1, col: 0)` (resp. `(row: 0, col: i + 1)`). This offset is specified in
/// number of elements, not in bytes.
///
/// # Safety
/// The behavior is undefined if any of the following conditions are violated:
/// * For each matrix unit, the entire memory region addressed by the matrix must be contained
/// within a single allocation, accessible in its entirety by the corresponding pointer in `ptr`.
/// * For each matrix unit, the corresponding pointer must be properly aligned,
/// even for a zero-sized matrix.
/// * If `E` is not a zero-sized type, each element read through the view must be initialized.
/// Elements that are never read, such as the ignored triangle of a triangular matrix, may be
/// uninitialized.
/// * The memory addressed by the view must not be mutated for the duration of lifetime `'a`.
#[inline(always)]
pub unsafe fn from_raw_parts<'a, E>(
    ptr: *const E,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
) -> MatRef<'a, E> {
    MatRef {
        inner: MatImpl {
            ptr: NonNull::new_unchecked(ptr as *mut E),
            nrows,
            ncols,
            row_stride,
            col_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a `MatMut` from pointers to the matrix data, dimensions, and strides.
///
/// # Safety
/// Same as [`from_raw_parts`], and additionally the memory addressed by the view must not be
/// accessed through any other pointer for the duration of lifetime `'a`, and no two elements of
/// the view may alias.
#[inline(always)]
pub unsafe fn from_raw_parts_mut<'a, E>(
    ptr: *mut E,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
) -> MatMut<'a, E> {
    MatMut {
        inner: MatImpl {
            ptr: NonNull::new_unchecked(ptr),
            nrows,
            ncols,
            row_stride,
            col_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a `MatRef` from slice views over the matrix data, and the matrix dimensions.
/// The data is interpreted in a column-major format, so that the first chunk of `nrows`
/// values from the slices goes in the first column of the matrix, the second chunk of `nrows`
/// values goes in the second column, and so on.
///
/// # Panics
/// The function panics if any of the following conditions are violated:
/// * `nrows * ncols == slice.len()`
///
/// # Example
/// ```
/// use team_trsv::mat;
///
/// let slice = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0_f64];
/// let view = mat::from_column_major_slice::<f64>(&slice, 3, 2);
///
/// assert_eq!(view.read(2, 0), 3.0);
/// assert_eq!(view.read(0, 1), 4.0);
/// ```
#[track_caller]
#[inline(always)]
pub fn from_column_major_slice<E: ComplexField>(
    slice: &[E],
    nrows: usize,
    ncols: usize,
) -> MatRef<'_, E> {
    from_slice_assert(nrows, ncols, slice.len());
    unsafe { from_raw_parts(slice.as_ptr(), nrows, ncols, 1, nrows as isize) }
}

/// Creates a `MatRef` from slice views over the matrix data, and the matrix dimensions.
/// The data is interpreted in a row-major format, so that the first chunk of `ncols`
/// values from the slices goes in the first row of the matrix, the second chunk of `ncols`
/// values goes in the second row, and so on.
///
/// # Panics
/// The function panics if any of the following conditions are violated:
/// * `nrows * ncols == slice.len()`
#[track_caller]
#[inline(always)]
pub fn from_row_major_slice<E: ComplexField>(
    slice: &[E],
    nrows: usize,
    ncols: usize,
) -> MatRef<'_, E> {
    from_column_major_slice(slice, ncols, nrows).transpose()
}

/// Creates a `MatRef` over `slice` with arbitrary non-negative strides, starting at `slice[0]`.
///
/// This covers row-major and column-major storage with padding, as well as a single matrix
/// inside a larger batched buffer.
///
/// # Panics
/// The function panics if any element of the view falls outside of `slice`.
///
/// # Example
/// ```
/// use team_trsv::mat;
///
/// // two 2×2 row-major matrices stored back to back
/// let batch = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0_f64];
/// let second = mat::from_slice_with_strides::<f64>(&batch[4..], 2, 2, 2, 1);
///
/// assert_eq!(second.read(1, 0), 7.0);
/// ```
#[track_caller]
#[inline]
pub fn from_slice_with_strides<E: ComplexField>(
    slice: &[E],
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
) -> MatRef<'_, E> {
    from_strided_slice_assert(nrows, ncols, row_stride, col_stride, slice.len());
    unsafe { from_raw_parts(slice.as_ptr(), nrows, ncols, row_stride, col_stride) }
}

/// Creates a `MatMut` from slice views over the matrix data, and the matrix dimensions.
/// The data is interpreted in a column-major format.
///
/// # Panics
/// The function panics if any of the following conditions are violated:
/// * `nrows * ncols == slice.len()`
#[track_caller]
#[inline(always)]
pub fn from_column_major_slice_mut<E: ComplexField>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
) -> MatMut<'_, E> {
    from_slice_assert(nrows, ncols, slice.len());
    unsafe { from_raw_parts_mut(slice.as_mut_ptr(), nrows, ncols, 1, nrows as isize) }
}

impl<'short, E> Reborrow<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, E> ReborrowMut<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<'a, E> IntoConst for MatRef<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'short, E> Reborrow<'short> for MatMut<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'short, E> ReborrowMut<'short> for MatMut<'_, E> {
    type Target = MatMut<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        MatMut {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> IntoConst for MatMut<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}
