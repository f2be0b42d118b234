use super::*;
use crate::{assert, debug_assert};

/// Mutable view over a matrix, similar to a mutable reference to a 2D strided [prim@slice].
///
/// # Move semantics
/// Since `MatMut` mutably borrows data, it cannot be [`Copy`]. Use
/// [`rb_mut`](reborrow::ReborrowMut::rb_mut) to reborrow it for a shorter lifetime, and
/// [`rb`](reborrow::Reborrow::rb) to get a [`MatRef`] out of it.
pub struct MatMut<'a, E> {
    pub(super) inner: MatImpl<E>,
    pub(super) __marker: PhantomData<&'a mut E>,
}

impl<'a, E: ComplexField> MatMut<'a, E> {
    /// Returns the number of rows of the matrix.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.inner.ncols
    }

    /// Returns the offset between the first elements of two successive rows in the matrix.
    #[inline(always)]
    pub fn row_stride(&self) -> isize {
        self.inner.row_stride
    }

    /// Returns the offset between the first elements of two successive columns in the matrix.
    #[inline(always)]
    pub fn col_stride(&self) -> isize {
        self.inner.col_stride
    }

    #[inline(always)]
    unsafe fn ptr_inbounds_at_mut(&self, row: usize, col: usize) -> *mut E {
        debug_assert!(all(row < self.nrows(), col < self.ncols()));
        self.inner.ptr.as_ptr().offset(self.inner.offset(row, col))
    }

    /// Reads the value of the element at the given indices, with no bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn read_unchecked(&self, row: usize, col: usize) -> E {
        self.ptr_inbounds_at_mut(row, col).read()
    }

    /// Reads the value of the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        self.rb().read(row, col)
    }

    /// Writes the value to the element at the given indices, with no bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn write_unchecked(&mut self, row: usize, col: usize, value: E) {
        self.ptr_inbounds_at_mut(row, col).write(value)
    }

    /// Writes the value to the element at the given indices, with bound checks.
    ///
    /// # Panics
    /// The function panics if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, col: usize, value: E) {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { self.write_unchecked(row, col, value) };
    }
}

impl<E: ComplexField> core::fmt::Debug for MatMut<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.rb(), f)
    }
}
