use super::*;
use crate::{assert, debug_assert};

/// View over a column vector that is shared between the members of a team.
///
/// Every member holds a copy of the view, and elements are read and written through it without
/// exclusive access. Keeping two members from touching the same element without a barrier in
/// between is the caller's responsibility, which is why element access is `unsafe`.
///
/// Obtained from [`ColMut::into_team`].
pub struct TeamColMut<'a, E> {
    pub(super) inner: VecImpl<E>,
    pub(super) __marker: PhantomData<&'a mut E>,
}

impl<E> Clone for TeamColMut<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for TeamColMut<'_, E> {}

impl<'a, E: ComplexField> TeamColMut<'a, E> {
    /// Returns the number of rows of the column.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.len
    }

    /// Returns the row stride of the column, specified in number of elements, not in bytes.
    #[inline(always)]
    pub fn row_stride(&self) -> isize {
        self.inner.stride
    }

    /// Reads the element at the given index.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * No other member writes the same element concurrently.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn read(self, row: usize) -> E {
        debug_assert!(row < self.nrows());
        self.inner.ptr_at(row).read()
    }

    /// Writes the element at the given index.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row < self.nrows()`.
    /// * No other member reads or writes the same element concurrently.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn write(self, row: usize, value: E) {
        debug_assert!(row < self.nrows());
        self.inner.ptr_at(row).write(value)
    }

    /// Returns a view over the rows `row_start..row_start + nrows`.
    ///
    /// # Panics
    /// The function panics if `row_start > self.nrows()` or `nrows > self.nrows() - row_start`.
    #[inline(always)]
    #[track_caller]
    pub fn subrows(self, row_start: usize, nrows: usize) -> Self {
        assert!(all(row_start <= self.nrows(), nrows <= self.nrows() - row_start));
        Self {
            inner: VecImpl {
                ptr: unsafe { NonNull::new_unchecked(self.inner.ptr_at(row_start)) },
                len: nrows,
                stride: self.inner.stride,
            },
            __marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, Col};

    #[test]
    fn members_write_disjoint_halves() {
        let mut b = Col::from_fn(8, |i| i as f64);
        let shared = b.as_mut().into_team();
        std::thread::scope(|s| {
            for half in 0..2 {
                s.spawn(move || {
                    let part = shared.subrows(4 * half, 4);
                    for i in 0..part.nrows() {
                        unsafe { part.write(i, -part.read(i)) };
                    }
                });
            }
        });
        assert!(b.as_slice() == &[-0.0, -1.0, -2.0, -3.0, -4.0, -5.0, -6.0, -7.0][..]);
    }
}
