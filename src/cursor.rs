//! Forward cursors over a [`Vector`].
//!
//! A cursor is a plain position: a slot index plus the identity of the buffer
//! allocation it was taken from. It does not borrow the vector, so it can be
//! held across mutations and handed back to [`Vector::insert`] or
//! [`Vector::erase`]. Reading or writing through a cursor goes through the
//! vector, which rejects cursors whose buffer it no longer owns.
//!
//! [`ConstCursor`] is the read-only kind and the only one that defines position
//! equality and distance. [`Cursor`] is the mutable kind; it converts into a
//! [`ConstCursor`] and compares through it.
//!
//! ```
//! use grow_vec::{vector, VectorError};
//!
//! let mut v = vector![1, 2, 3];
//! let mut it = v.begin();
//! *it.get_mut(&mut v)? *= 10;
//! it.increment();
//! assert_eq!(it.get(&v), Ok(&2));
//! assert_eq!(it.as_const() - v.cbegin(), 1);
//!
//! v.shrink_to_fit();
//! assert_eq!(it.get(&v), Err(VectorError::InvalidatedIterator));
//! # Ok::<(), VectorError>(())
//! ```

use core::fmt;
use core::marker::PhantomData;
use core::ops::Sub;

use crate::{Vector, VectorError};

/// Read-only forward cursor.
pub struct ConstCursor<T> {
    buffer: usize,
    index: usize,
    marker: PhantomData<fn() -> T>,
}

/// Mutable forward cursor.
pub struct Cursor<T> {
    buffer: usize,
    index: usize,
    marker: PhantomData<fn() -> T>,
}

impl<T> ConstCursor<T> {
    pub(crate) const fn new(buffer: usize, index: usize) -> Self {
        Self {
            buffer,
            index,
            marker: PhantomData,
        }
    }

    pub(crate) const fn buffer(&self) -> usize {
        self.buffer
    }

    /// Returns a reference to the element under the cursor.
    ///
    /// # Errors
    ///
    /// [`VectorError::InvalidatedIterator`] if `vector` no longer owns the buffer
    /// this cursor was taken from, [`VectorError::IteratorOutOfRange`] if the
    /// cursor does not point at a live element (e.g. it is at `cend()`).
    pub fn get<'v>(&self, vector: &'v Vector<T>) -> Result<&'v T, VectorError> {
        vector.check_cursor(self.buffer, self.index)?;
        Ok(&vector.as_slice()[self.index])
    }

    /// Advances to the next slot and returns the advanced cursor (`++it`).
    pub fn increment(&mut self) -> &mut Self {
        self.index = self.index.saturating_add(1);
        self
    }

    /// Advances to the next slot and returns the position before the advance
    /// (`it++`).
    pub fn post_increment(&mut self) -> Self {
        let previous = *self;
        self.increment();
        previous
    }
}

impl<T> Cursor<T> {
    pub(crate) const fn new(buffer: usize, index: usize) -> Self {
        Self {
            buffer,
            index,
            marker: PhantomData,
        }
    }

    /// Views this cursor as a read-only cursor at the same position.
    pub const fn as_const(&self) -> ConstCursor<T> {
        ConstCursor::new(self.buffer, self.index)
    }

    /// Returns a shared reference to the element under the cursor.
    ///
    /// Fails the same way as [`ConstCursor::get`].
    pub fn get<'v>(&self, vector: &'v Vector<T>) -> Result<&'v T, VectorError> {
        self.as_const().get(vector)
    }

    /// Returns a mutable reference to the element under the cursor.
    ///
    /// Fails the same way as [`ConstCursor::get`].
    pub fn get_mut<'v>(&self, vector: &'v mut Vector<T>) -> Result<&'v mut T, VectorError> {
        vector.check_cursor(self.buffer, self.index)?;
        Ok(&mut vector.as_mut_slice()[self.index])
    }

    /// Advances to the next slot and returns the advanced cursor (`++it`).
    pub fn increment(&mut self) -> &mut Self {
        self.index = self.index.saturating_add(1);
        self
    }

    /// Advances to the next slot and returns the position before the advance
    /// (`it++`).
    pub fn post_increment(&mut self) -> Self {
        let previous = *self;
        self.increment();
        previous
    }
}

impl<T> Clone for ConstCursor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ConstCursor<T> {}

impl<T> Clone for Cursor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<T> {}

impl<T> From<Cursor<T>> for ConstCursor<T> {
    fn from(cursor: Cursor<T>) -> Self {
        cursor.as_const()
    }
}

// Position identity: same buffer, same slot. The element is never compared.
impl<T> PartialEq for ConstCursor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer && self.index == other.index
    }
}

impl<T> Eq for ConstCursor<T> {}

impl<T> PartialEq<Cursor<T>> for ConstCursor<T> {
    fn eq(&self, other: &Cursor<T>) -> bool {
        *self == other.as_const()
    }
}

impl<T> PartialEq<ConstCursor<T>> for Cursor<T> {
    fn eq(&self, other: &ConstCursor<T>) -> bool {
        *other == self.as_const()
    }
}

impl<T> PartialEq for Cursor<T> {
    fn eq(&self, other: &Self) -> bool {
        other.as_const() == self.as_const()
    }
}

impl<T> Eq for Cursor<T> {}

/// Signed slot distance between two cursors.
///
/// Only meaningful for cursors over the same buffer; [`Vector::insert`] and
/// [`Vector::erase`] check buffer identity before relying on it.
impl<T> Sub for ConstCursor<T> {
    type Output = isize;

    fn sub(self, rhs: Self) -> Self::Output {
        (self.index as isize).wrapping_sub(rhs.index as isize)
    }
}

impl<T> fmt::Debug for ConstCursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstCursor")
            .field("buffer", &self.buffer)
            .field("index", &self.index)
            .finish()
    }
}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("buffer", &self.buffer)
            .field("index", &self.index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{vector, ConstCursor, Cursor, Vector, VectorError};

    #[test]
    fn test_begin_end_positions() {
        let sut = vector![1, 2, 3];
        assert_eq!(sut.cend() - sut.cbegin(), 3, "end must sit `len` slots past begin");
        assert_eq!(sut.begin(), sut.cbegin(), "mutable and read-only begin must agree");
        assert_eq!(sut.end(), sut.cend(), "mutable and read-only end must agree");

        let empty = Vector::<i32>::new();
        assert_eq!(empty.begin(), empty.end(), "begin == end on an empty vector");
        assert_eq!(empty.cend() - empty.cbegin(), 0);
    }

    #[test]
    fn test_prefix_and_postfix_increment() {
        let sut = vector![10, 20, 30];

        let mut it = sut.cbegin();
        assert_eq!(it.increment().get(&sut), Ok(&20), "prefix yields the advanced cursor");

        let previous = it.post_increment();
        assert_eq!(previous.get(&sut), Ok(&20), "postfix yields the old position");
        assert_eq!(it.get(&sut), Ok(&30));

        it.increment();
        assert_eq!(it, sut.cend(), "three increments reach the end");

        let mut it = sut.begin();
        let previous = it.post_increment();
        assert_eq!(previous, sut.cbegin());
        assert_eq!(it.as_const() - sut.cbegin(), 1);
    }

    #[test]
    fn test_walk_collects_all_elements() {
        let sut = vector!['a', 'b', 'c', 'd'];
        let mut seen = Vec::new();

        let mut it = sut.cbegin();
        while it != sut.cend() {
            seen.push(*it.get(&sut).unwrap());
            it.increment();
        }

        assert_eq!(seen, ['a', 'b', 'c', 'd']);
    }

    #[test]
    fn test_write_through_mutable_cursor() {
        let mut sut = vector![1, 2, 3];

        let mut it = sut.begin();
        while it != sut.end() {
            *it.get_mut(&mut sut).unwrap() *= 10;
            it.increment();
        }

        assert_eq!(sut, [10, 20, 30], "writes through the cursor must persist");
    }

    #[test]
    fn test_member_access_through_cursor() {
        let sut = vector![(1, "one"), (2, "two")];
        let mut it = sut.cbegin();
        it.increment();
        assert_eq!(it.get(&sut).map(|pair| pair.1), Ok("two"));
    }

    #[test]
    fn test_cross_kind_equality() {
        let sut = vector![1, 2, 3];

        let mutable: Cursor<i32> = sut.begin();
        let read_only: ConstCursor<i32> = sut.cbegin();
        assert!(mutable == read_only);
        assert!(read_only == mutable);
        assert!(mutable == sut.begin());
        assert!(!(mutable != read_only));

        let mut advanced = mutable;
        advanced.increment();
        assert!(advanced != read_only);
        assert!(read_only != advanced);
        assert!(advanced != mutable);
        assert_eq!(ConstCursor::from(advanced), advanced.as_const());
    }

    #[test]
    fn test_equality_ignores_element_values() {
        let sut = vector![7, 7];
        let first = sut.cbegin();
        let mut second = sut.cbegin();
        second.increment();

        assert_eq!(first.get(&sut), second.get(&sut), "both slots hold the same value");
        assert_ne!(first, second, "cursors compare positions, not values");
    }

    #[test]
    fn test_cursors_of_distinct_vectors_differ() {
        let a = vector![1];
        let b = a.clone();
        assert_ne!(a.cbegin(), b.cbegin());
    }

    #[test]
    fn test_subtraction_is_signed() {
        let sut = vector![1, 2, 3, 4];
        let mut it = sut.cbegin();
        it.increment().increment();

        assert_eq!(it - sut.cbegin(), 2);
        assert_eq!(sut.cbegin() - it, -2);
        assert_eq!(it - it, 0);
    }

    #[test]
    fn test_dereference_at_end_fails() {
        let mut sut = vector![1, 2];
        assert_eq!(
            sut.cend().get(&sut),
            Err(VectorError::IteratorOutOfRange { offset: 2, len: 2 })
        );

        let end = sut.end();
        assert_eq!(
            end.get_mut(&mut sut),
            Err(VectorError::IteratorOutOfRange { offset: 2, len: 2 })
        );
    }

    #[test]
    fn test_dereference_past_popped_element_fails() {
        let mut sut = vector![1, 2, 3];
        let mut last = sut.cbegin();
        last.increment().increment();

        sut.pop_back().unwrap();
        assert_eq!(
            last.get(&sut),
            Err(VectorError::IteratorOutOfRange { offset: 2, len: 2 }),
            "slot beyond the new length must not be readable"
        );
    }

    #[test]
    fn test_reallocation_invalidates_cursors() {
        let mut sut = vector![1, 2, 3];
        let before = sut.cbegin();
        let mutable = sut.begin();

        sut.reserve(64);
        assert_eq!(before.get(&sut), Err(VectorError::InvalidatedIterator));
        assert_eq!(mutable.get_mut(&mut sut), Err(VectorError::InvalidatedIterator));
        assert_ne!(before, sut.cbegin(), "a fresh buffer yields fresh positions");
        assert_eq!(sut.cbegin().get(&sut), Ok(&1));
    }

    #[test]
    fn test_growth_on_push_invalidates_cursors() {
        let mut sut: Vector<i32> = (0..5).collect();
        assert_eq!(sut.size(), sut.capacity());

        let before = sut.cbegin();
        sut.push_back(5);
        assert_eq!(before.get(&sut), Err(VectorError::InvalidatedIterator));
    }

    #[test]
    fn test_push_without_growth_keeps_cursors() {
        let mut sut = vector![1, 2];
        let first = sut.cbegin();
        sut.push_back(3);
        assert_eq!(first.get(&sut), Ok(&1), "no reallocation, no invalidation");
    }

    #[test]
    fn test_shift_moves_element_under_cursor() {
        let mut sut = vector![1, 2, 3];
        let mut second = sut.cbegin();
        second.increment();

        sut.erase(sut.cbegin()).unwrap();
        assert_eq!(second.get(&sut), Ok(&3), "slot 1 now holds the shifted element");
    }

    #[test]
    fn test_foreign_cursor_is_rejected() {
        let a = vector![1, 2, 3];
        let mut b = vector![4, 5, 6];

        assert_eq!(a.cbegin().get(&b), Err(VectorError::InvalidatedIterator));
        assert_eq!(a.begin().get_mut(&mut b), Err(VectorError::InvalidatedIterator));
    }

    #[test]
    fn test_debug_output() {
        let sut = Vector::<u8>::new();
        let rendered = format!("{:?}", sut.cend());
        assert!(rendered.starts_with("ConstCursor {"), "{rendered}");
        assert!(rendered.ends_with("index: 0 }"), "{rendered}");

        let rendered = format!("{:?}", sut.begin());
        assert!(rendered.starts_with("Cursor {"), "{rendered}");
    }
}
