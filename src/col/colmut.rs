use super::*;
use crate::{assert, debug_assert, TeamColMut};

/// Mutable view over a column vector, similar to a mutable reference to a strided [prim@slice].
///
/// # Move semantics
/// See [`MatMut`](crate::MatMut) for information about reborrowing when using this type.
pub struct ColMut<'a, E> {
    pub(super) inner: VecImpl<E>,
    pub(super) __marker: PhantomData<&'a mut E>,
}

impl<'a, E: ComplexField> ColMut<'a, E> {
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

    /// Returns a mutable pointer to the first element of the column.
    #[inline(always)]
    pub fn as_ptr_mut(self) -> *mut E {
        self.inner.ptr.as_ptr()
    }

    /// Reads the value of the element at the given index, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize) -> E {
        self.rb().read(row)
    }

    /// Writes the value to the element at the given index, with no bound checks.
    ///
    /// # Safety
    /// The behavior is undefined if `row >= self.nrows()`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn write_unchecked(&mut self, row: usize, value: E) {
        debug_assert!(row < self.nrows());
        self.inner.ptr_at(row).write(value)
    }

    /// Writes the value to the element at the given index, with bound checks.
    ///
    /// # Panics
    /// The function panics if `row >= self.nrows()`.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, value: E) {
        assert!(row < self.nrows());
        unsafe { self.write_unchecked(row, value) };
    }

    /// Fills the elements of `self` with `constant`.
    #[inline]
    pub fn fill(&mut self, constant: E) {
        for i in 0..self.nrows() {
            unsafe { self.write_unchecked(i, constant) };
        }
    }

    /// Copies the values from `other` into `self`.
    ///
    /// # Panics
    /// The function panics if `self` and `other` do not have the same number of rows.
    #[track_caller]
    pub fn copy_from(&mut self, other: ColRef<'_, E>) {
        assert!(self.nrows() == other.nrows());
        for i in 0..self.nrows() {
            unsafe { self.write_unchecked(i, other.read_unchecked(i)) };
        }
    }

    /// Returns a view over the rows `row_start..row_start + nrows`.
    ///
    /// # Panics
    /// The function panics if `row_start > self.nrows()` or `nrows > self.nrows() - row_start`.
    #[inline(always)]
    #[track_caller]
    pub fn subrows_mut(self, row_start: usize, nrows: usize) -> Self {
        assert!(all(row_start <= self.nrows(), nrows <= self.nrows() - row_start));
        unsafe { from_raw_parts_mut(self.inner.ptr_at(row_start), nrows, self.row_stride()) }
    }

    /// Returns a view over `self`, with the rows in reversed order.
    #[inline(always)]
    #[must_use]
    pub fn reverse_rows_mut(self) -> Self {
        let nrows = self.nrows();
        if nrows == 0 {
            return self;
        }
        let stride = self.row_stride().wrapping_neg();
        unsafe { from_raw_parts_mut(self.inner.ptr_at(nrows - 1), nrows, stride) }
    }

    /// Converts the exclusive view into one that can be handed to every member of a team.
    ///
    /// The returned view keeps the exclusive borrow alive for `'a`, so nothing outside of the
    /// team can touch the elements while the team is running.
    #[inline(always)]
    pub fn into_team(self) -> TeamColMut<'a, E> {
        TeamColMut {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<E: ComplexField> core::fmt::Debug for ColMut<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.rb(), f)
    }
}
