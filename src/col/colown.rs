use super::*;

/// Heap allocated resizable column vector.
#[derive(Clone, PartialEq)]
pub struct Col<E> {
    data: Vec<E>,
}

impl<E: ComplexField> Default for Col<E> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ComplexField> Col<E> {
    /// Returns an empty column of dimension `0`.
    #[inline]
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Returns a new column vector with `nrows` rows, filled with the provided function.
    #[inline]
    pub fn from_fn(nrows: usize, f: impl FnMut(usize) -> E) -> Self {
        Self {
            data: (0..nrows).map(f).collect(),
        }
    }

    /// Returns a new column vector with `nrows` rows, filled with zeros.
    #[inline]
    pub fn zeros(nrows: usize) -> Self {
        Self::from_fn(nrows, |_| E::zero())
    }

    /// Returns the number of rows of the column.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of columns of the column. This is always equal to `1`.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        1
    }

    /// Returns a view over the vector.
    #[inline]
    pub fn as_ref(&self) -> ColRef<'_, E> {
        from_slice(&self.data)
    }

    /// Returns a mutable view over the vector.
    #[inline]
    pub fn as_mut(&mut self) -> ColMut<'_, E> {
        from_slice_mut(&mut self.data)
    }

    /// Reads the value of the element at the given index, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize) -> E {
        self.as_ref().read(row)
    }

    /// Writes the value to the element at the given index, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, value: E) {
        self.as_mut().write(row, value)
    }

    /// Returns the elements of the vector as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[E] {
        &self.data
    }
}

impl<E: ComplexField> core::ops::Index<usize> for Col<E> {
    type Output = E;

    #[inline]
    #[track_caller]
    fn index(&self, row: usize) -> &E {
        &self.data[row]
    }
}

impl<E: ComplexField> core::ops::IndexMut<usize> for Col<E> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, row: usize) -> &mut E {
        &mut self.data[row]
    }
}

impl<E: ComplexField> core::fmt::Debug for Col<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.as_ref(), f)
    }
}
