use super::*;
use crate::{assert, debug_assert};

/// Immutable view over a column vector, similar to an immutable reference to a strided
/// [prim@slice].
pub struct ColRef<'a, E> {
    pub(super) inner: VecImpl<E>,
    pub(super) __marker: PhantomData<&'a E>,
}

impl<E> Clone for ColRef<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ColRef<'_, E> {}

impl<'a, E: ComplexField> ColRef<'a, E> {
    /// Returns the number of rows of the column.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.len
    }

    /// Returns the number of columns of the column. This is always equal to `1`.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        1
    }

    /// Returns the row stride of the column, specified in number of elements, not in bytes.
    #[inline(always)]
    pub fn row_stride(&self) -> isize {
        self.inner.stride
    }

    /// Returns a pointer to the first element of the column.
    #[inline(always)]
    pub fn as_ptr(self) -> *const E {
        self.inner.ptr.as_ptr()
    }

    /// Reads the value of the element at the given index, with no bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if `row >= self.nrows()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn read_unchecked(&self, row: usize) -> E {
        debug_assert!(row < self.nrows());
        self.inner.ptr_at(row).read()
    }

    /// Reads the value of the element at the given index, with bound checks.
    ///
    /// # Panics
    /// The function panics if `row >= self.nrows()`.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize) -> E {
        assert!(row < self.nrows());
        unsafe { self.read_unchecked(row) }
    }

    /// Returns a view over the rows `row_start..row_start + nrows`.
    ///
    /// # Panics
    /// The function panics if `row_start > self.nrows()` or `nrows > self.nrows() - row_start`.
    #[inline(always)]
    #[track_caller]
    pub fn subrows(self, row_start: usize, nrows: usize) -> Self {
        assert!(all(row_start <= self.nrows(), nrows <= self.nrows() - row_start));
        unsafe { from_raw_parts(self.inner.ptr_at(row_start), nrows, self.row_stride()) }
    }

    /// Returns a view over `self`, with the rows in reversed order.
    #[inline(always)]
    #[must_use]
    pub fn reverse_rows(self) -> Self {
        let nrows = self.nrows();
        if nrows == 0 {
            return self;
        }
        let stride = self.row_stride().wrapping_neg();
        unsafe { from_raw_parts(self.inner.ptr_at(nrows - 1), nrows, stride) }
    }
}

impl<E: ComplexField> core::fmt::Debug for ColRef<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let this = *self;
        f.debug_list()
            .entries((0..this.nrows()).map(|i| unsafe { this.read_unchecked(i) }))
            .finish()
    }
}
