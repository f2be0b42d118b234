use super::*;
use crate::{assert, col::ColRef, debug_assert};

/// Immutable view over a matrix, similar to an immutable reference to a 2D strided [prim@slice].
///
/// # Note
///
/// Unlike a slice, the data pointed to by `MatRef<'_, E>` is allowed to be partially
/// uninitialized, as long as the uninitialized elements are never read. Triangular solves rely on
/// this for the ignored half of the matrix.
pub struct MatRef<'a, E> {
    pub(super) inner: MatImpl<E>,
    pub(super) __marker: PhantomData<&'a E>,
}

impl<E> Clone for MatRef<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for MatRef<'_, E> {}

impl<'a, E: ComplexField> MatRef<'a, E> {
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

    /// Returns a pointer to the first (top left) element of the matrix.
    #[inline(always)]
    pub fn as_ptr(self) -> *const E {
        self.inner.ptr.as_ptr()
    }

    /// Returns a pointer to the element at the given indices. The indices may be out of bounds,
    /// in which case the pointer must not be dereferenced.
    #[inline(always)]
    pub fn ptr_at(self, row: usize, col: usize) -> *const E {
        self.as_ptr().wrapping_offset(self.inner.offset(row, col))
    }

    #[inline(always)]
    unsafe fn ptr_inbounds_at(self, row: usize, col: usize) -> *const E {
        debug_assert!(all(row < self.nrows(), col < self.ncols()));
        self.as_ptr().offset(self.inner.offset(row, col))
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
        self.ptr_inbounds_at(row, col).read()
    }

    /// Reads the value of the element at the given indices, with bound checks.
    ///
    /// # Panics
    /// The function panics if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * `col < self.ncols()`.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { self.read_unchecked(row, col) }
    }

    /// Returns a view over the submatrix starting at indices `(row_start, col_start)`, and with
    /// dimensions `(nrows, ncols)`.
    ///
    /// # Panics
    /// The function panics if any of the following conditions are violated:
    /// * `row_start <= self.nrows()`.
    /// * `col_start <= self.ncols()`.
    /// * `nrows <= self.nrows() - row_start`.
    /// * `ncols <= self.ncols() - col_start`.
    #[track_caller]
    #[inline(always)]
    pub fn submatrix(self, row_start: usize, col_start: usize, nrows: usize, ncols: usize) -> Self {
        assert!(all(row_start <= self.nrows(), col_start <= self.ncols()));
        assert!(all(
            nrows <= self.nrows() - row_start,
            ncols <= self.ncols() - col_start,
        ));
        unsafe {
            from_raw_parts(
                self.ptr_at(row_start, col_start),
                nrows,
                ncols,
                self.row_stride(),
                self.col_stride(),
            )
        }
    }

    /// Returns a view over the column at the given index.
    #[track_caller]
    #[inline(always)]
    pub fn col(self, col: usize) -> ColRef<'a, E> {
        assert!(col < self.ncols());
        unsafe { crate::col::from_raw_parts(self.ptr_at(0, col), self.nrows(), self.row_stride()) }
    }

    /// Returns a view over the transpose of `self`.
    #[inline(always)]
    #[must_use]
    pub fn transpose(self) -> Self {
        unsafe {
            from_raw_parts(
                self.as_ptr(),
                self.ncols(),
                self.nrows(),
                self.col_stride(),
                self.row_stride(),
            )
        }
    }

    /// Returns a view over the `self`, with the rows and the columns in reversed order.
    ///
    /// The strides of the result are negative when those of `self` are positive.
    #[inline(always)]
    #[must_use]
    pub fn reverse_rows_and_cols(self) -> Self {
        let nrows = self.nrows();
        let ncols = self.ncols();
        if nrows == 0 || ncols == 0 {
            return self;
        }
        let row_stride = self.row_stride().wrapping_neg();
        let col_stride = self.col_stride().wrapping_neg();
        let ptr = self.ptr_at(nrows - 1, ncols - 1);
        unsafe { from_raw_parts(ptr, nrows, ncols, row_stride, col_stride) }
    }
}

impl<E: ComplexField> core::fmt::Debug for MatRef<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct DebugRow<'a, T: ComplexField>(MatRef<'a, T>);

        impl<T: ComplexField> core::fmt::Debug for DebugRow<'_, T> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut j = 0;
                f.debug_list()
                    .entries(core::iter::from_fn(|| {
                        let ret = if j < self.0.ncols() {
                            Some(self.0.read(0, j))
                        } else {
                            None
                        };
                        j += 1;
                        ret
                    }))
                    .finish()
            }
        }

        writeln!(f, "[")?;
        for i in 0..self.nrows() {
            let row = self.submatrix(i, 0, 1, self.ncols());
            core::fmt::Debug::fmt(&DebugRow(row), f)?;
            f.write_str(",\n")?;
        }
        write!(f, "]")
    }
}
