#![cfg_attr(not(test), no_std)]

//! A **heap-allocated**, **growable**, **contiguous** vector with forward cursors, `no_std` compatible.
//!
//! `Vector<T>` stores its elements in a single owned buffer whose capacity
//! never drops below [`MIN_CAPACITY`] and doubles whenever an append finds the
//! buffer full. Positions are expressed with [`Cursor`] and [`ConstCursor`],
//! small copyable tokens that do not borrow the vector and are checked against
//! it on every use.
//!
//! This type is meant for cases where:
//! - You want `Vec`-like storage with a predictable growth law.
//! - You want fallible, non-panicking bounds checks (`at`, `pop_back`, `insert`, `erase`).
//! - You want positions that survive mutation and are rejected, not misread, once stale.
//!
//! ```rust
//! use grow_vec::{vector, Vector, VectorError};
//!
//! let mut v = Vector::new();
//! assert!(v.empty());
//! assert_eq!(v.capacity(), 5);
//!
//! for i in 1..=6 {
//!     v.push_back(i);
//! }
//! assert_eq!(v.size(), 6);
//! assert_eq!(v.capacity(), 10);
//!
//! let mut pos = v.cbegin();
//! pos.increment();
//! v.insert(pos, 9)?;
//! assert_eq!(v.to_string(), "[1, 9, 2, 3, 4, 5, 6]");
//!
//! v.erase(v.cbegin())?;
//! assert_eq!(v.at(0), Ok(&9));
//! assert_eq!(v.at(42), Err(VectorError::OutOfRange { index: 42, len: 6 }));
//!
//! let w = vector![1, 2, 3];
//! assert_eq!(w, [1, 2, 3]);
//! # Ok::<(), VectorError>(())
//! ```
//!
//! ## `serde`
//!
//! With the `serde` feature enabled, `Vector<T>` serializes as a plain sequence
//! of its live elements.

extern crate alloc;

mod cursor;
mod error;
#[cfg(feature = "serde")]
mod serde;

pub use cursor::{ConstCursor, Cursor};
pub use error::VectorError;

use alloc::boxed::Box;
use core::fmt;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::mem::MaybeUninit;
use core::ops::{Deref, DerefMut, Index, IndexMut, Range};
use core::slice::{Iter, IterMut};
use core::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, trace};

/// The smallest capacity a [`Vector`] ever allocates.
pub const MIN_CAPACITY: usize = 5;

static NEXT_BUFFER_ID: AtomicUsize = AtomicUsize::new(0);

/// Allocates `capacity` uninitialized slots and tags them with a fresh identity.
fn allocate<T>(capacity: usize) -> (Box<[MaybeUninit<T>]>, usize) {
    let id = NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed);
    (Box::<[T]>::new_uninit_slice(capacity), id)
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

/// Creates a [`Vector`] holding the given elements, in order.
///
/// ```
/// use grow_vec::vector;
///
/// let v = vector![1, 2, 3];
/// assert_eq!(v.size(), 3);
/// assert_eq!(v.capacity(), 5);
/// ```
#[macro_export]
macro_rules! vector {
    () => {
        $crate::Vector::new()
    };
    ($($element:expr),+ $(,)?) => {
        $crate::Vector::from([$($element),+])
    };
}

/// A heap-allocated, growable, contiguous vector.
///
/// `Vector` is similar to [`Vec`](alloc::vec::Vec), except:
/// - The **capacity** is never below [`MIN_CAPACITY`], and grows by exactly doubling.
/// - Copies (`clone`) are sized to the source's length, not its capacity.
/// - Positions are generation-checked [`Cursor`]s instead of borrows.
pub struct Vector<T> {
    len: usize,
    buf: Box<[MaybeUninit<T>]>,
    id: usize,
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Vector<T> {
    /// Creates a new, empty `Vector` with capacity [`MIN_CAPACITY`].
    ///
    /// ```
    /// use grow_vec::Vector;
    ///
    /// let v = Vector::<i32>::new();
    /// assert_eq!(v.capacity(), 5);
    /// assert_eq!(v.size(), 0);
    /// assert!(v.empty());
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Creates a new, empty `Vector` with room for at least `capacity` elements.
    ///
    /// ```
    /// use grow_vec::Vector;
    ///
    /// assert_eq!(Vector::<u8>::with_capacity(2).capacity(), 5);
    /// assert_eq!(Vector::<u8>::with_capacity(12).capacity(), 12);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let (buf, id) = allocate(capacity.max(MIN_CAPACITY));
        Self { len: 0, buf, id }
    }

    /// Creates a `Vector` from an ordered list of items, with capacity
    /// `max(count, MIN_CAPACITY)`.
    ///
    /// ```
    /// use grow_vec::Vector;
    ///
    /// let v = Vector::from_items(vec!['a', 'b', 'c', 'd', 'e', 'f']);
    /// assert_eq!(v.as_slice(), &['a', 'b', 'c', 'd', 'e', 'f']);
    /// assert_eq!(v.capacity(), 6);
    /// ```
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator<Item = T>,
    {
        let items = items.into_iter();
        let mut vector = Self::with_capacity(items.len());
        for item in items {
            vector.push_back(item);
        }

        vector
    }

    /// Returns the number of live elements.
    pub const fn size(&self) -> usize {
        self.len
    }

    /// Returns the number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if the vector contains no elements.
    pub const fn empty(&self) -> bool {
        self.len == 0
    }

    /// Drops all elements and resets the length to zero.
    /// The buffer, its capacity and every cursor's buffer identity are kept.
    ///
    /// ```
    /// use grow_vec::vector;
    ///
    /// let mut v = vector![1, 2, 3, 4, 5, 6, 7];
    /// v.clear();
    /// assert!(v.empty());
    /// assert_eq!(v.capacity(), 7);
    /// ```
    pub fn clear(&mut self) {
        let live = self.len;

        // Shorten first so a panicking destructor cannot cause a double drop
        self.len = 0;

        unsafe {
            let elements = core::ptr::slice_from_raw_parts_mut(self.buf.as_mut_ptr().cast::<T>(), live);
            core::ptr::drop_in_place(elements);
        }
    }

    /// Grows the buffer to exactly `capacity` slots if it is currently smaller.
    /// Never shrinks.
    ///
    /// ```
    /// use grow_vec::Vector;
    ///
    /// let mut v = Vector::<i32>::new();
    /// v.reserve(20);
    /// assert_eq!(v.capacity(), 20);
    /// v.reserve(8);
    /// assert_eq!(v.capacity(), 20);
    /// ```
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.capacity() {
            self.reallocate(capacity);
        }
    }

    /// Reallocates the buffer to `max(size, MIN_CAPACITY)` slots.
    ///
    /// The reallocation always happens, even when the capacity already matches,
    /// so every previously obtained cursor is invalidated.
    ///
    /// ```
    /// use grow_vec::Vector;
    ///
    /// let mut v = Vector::with_capacity(32);
    /// v.push_back(1);
    /// v.shrink_to_fit();
    /// assert_eq!(v.capacity(), 5);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.reallocate(self.len.max(MIN_CAPACITY));
    }

    /// Appends an element, doubling the capacity first if the buffer is full.
    ///
    /// # Panics
    ///
    /// Panics if the doubled capacity overflows `usize`.
    ///
    /// ```
    /// use grow_vec::vector;
    ///
    /// let mut v = vector![1, 2, 3, 4, 5];
    /// v.push_back(6);
    /// assert_eq!(v.capacity(), 10);
    /// assert_eq!(v, [1, 2, 3, 4, 5, 6]);
    /// ```
    pub fn push_back(&mut self, element: T) {
        if self.len == self.capacity() {
            self.grow();
        }

        // Write the new element right after the last live one
        self.buf[self.len].write(element);
        self.len += 1;
    }

    /// Removes the last element and returns it.
    ///
    /// # Errors
    ///
    /// [`VectorError::InvalidOperation`] if the vector is empty.
    ///
    /// ```
    /// use grow_vec::{vector, VectorError};
    ///
    /// let mut v = vector![1, 2];
    /// assert_eq!(v.pop_back(), Ok(2));
    /// assert_eq!(v.pop_back(), Ok(1));
    /// assert_eq!(v.pop_back(), Err(VectorError::InvalidOperation));
    /// ```
    pub fn pop_back(&mut self) -> Result<T, VectorError> {
        if self.len == 0 {
            debug!("rejected pop_back() on an empty vector");
            return Err(VectorError::InvalidOperation);
        }

        self.len -= 1;
        Ok(unsafe { self.buf[self.len].assume_init_read() })
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// [`VectorError::OutOfRange`] if `index >= size()`.
    pub fn at(&self, index: usize) -> Result<&T, VectorError> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(VectorError::OutOfRange { index, len })
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// [`VectorError::OutOfRange`] if `index >= size()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, VectorError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(VectorError::OutOfRange { index, len })
    }

    /// Returns a mutable cursor at the first slot.
    pub fn begin(&self) -> Cursor<T> {
        Cursor::new(self.id, 0)
    }

    /// Returns a mutable cursor one past the last live element.
    pub fn end(&self) -> Cursor<T> {
        Cursor::new(self.id, self.len)
    }

    /// Returns a read-only cursor at the first slot.
    pub fn cbegin(&self) -> ConstCursor<T> {
        ConstCursor::new(self.id, 0)
    }

    /// Returns a read-only cursor one past the last live element.
    pub fn cend(&self) -> ConstCursor<T> {
        ConstCursor::new(self.id, self.len)
    }

    /// Inserts `element` before the slot `pos` points at, shifting the
    /// following elements one slot to the right, and returns a cursor to the
    /// inserted element.
    ///
    /// `pos` may be `cend()`, which appends. If the buffer is full it is
    /// doubled first, which invalidates every earlier cursor.
    ///
    /// # Errors
    ///
    /// [`VectorError::InvalidatedIterator`] if `pos` does not belong to this
    /// vector's current buffer, [`VectorError::IteratorOutOfRange`] if its
    /// offset is past `size()`.
    ///
    /// ```
    /// use grow_vec::vector;
    ///
    /// let mut v = vector![1, 2, 3];
    /// let mut pos = v.cbegin();
    /// pos.increment();
    /// let inserted = v.insert(pos, 9)?;
    /// assert_eq!(inserted.get(&v), Ok(&9));
    /// assert_eq!(v, [1, 9, 2, 3]);
    /// # Ok::<(), grow_vec::VectorError>(())
    /// ```
    pub fn insert<P>(&mut self, pos: P, element: T) -> Result<Cursor<T>, VectorError>
    where
        P: Into<ConstCursor<T>>,
    {
        let offset = self.offset_of(pos.into())?;
        let index = match usize::try_from(offset) {
            Ok(index) if index <= self.len => index,
            _ => {
                debug!("rejected insert at offset {} (len {})", offset, self.len);
                return Err(VectorError::IteratorOutOfRange {
                    offset,
                    len: self.len,
                });
            }
        };

        if self.len >= self.capacity() {
            self.grow();
        }

        let ptr = self.buf.as_mut_ptr();

        unsafe {
            // Shift elements starting from the index to the right
            core::ptr::copy(ptr.add(index), ptr.add(index + 1), self.len - index);

            // Write the new element at the specified index
            ptr.add(index).write(MaybeUninit::new(element));
        }

        self.len += 1;
        Ok(Cursor::new(self.id, index))
    }

    /// Removes the element `pos` points at, shifting the following elements
    /// one slot to the left, and returns a cursor to the same slot (now the
    /// next element, or `end()`).
    ///
    /// # Errors
    ///
    /// [`VectorError::InvalidatedIterator`] if `pos` does not belong to this
    /// vector's current buffer, [`VectorError::IteratorOutOfRange`] if it does
    /// not point at a live element. Unlike [`insert`](Self::insert), `cend()`
    /// is rejected.
    ///
    /// ```
    /// use grow_vec::{vector, VectorError};
    ///
    /// let mut v = vector![1, 2, 3];
    /// let next = v.erase(v.cbegin())?;
    /// assert_eq!(next.get(&v), Ok(&2));
    /// assert_eq!(v, [2, 3]);
    ///
    /// assert_eq!(
    ///     v.erase(v.cend()),
    ///     Err(VectorError::IteratorOutOfRange { offset: 2, len: 2 })
    /// );
    /// # Ok::<(), VectorError>(())
    /// ```
    pub fn erase<P>(&mut self, pos: P) -> Result<Cursor<T>, VectorError>
    where
        P: Into<ConstCursor<T>>,
    {
        let offset = self.offset_of(pos.into())?;
        let index = match usize::try_from(offset) {
            Ok(index) if index < self.len => index,
            _ => {
                debug!("rejected erase at offset {} (len {})", offset, self.len);
                return Err(VectorError::IteratorOutOfRange {
                    offset,
                    len: self.len,
                });
            }
        };

        let ptr = self.buf.as_mut_ptr();

        // Read the element to be removed
        let element = unsafe { ptr.add(index).read().assume_init() };

        unsafe {
            // Shift elements to fill the gap
            core::ptr::copy(ptr.add(index + 1), ptr.add(index), self.len - index - 1);
        }

        self.len -= 1;
        drop(element);

        Ok(Cursor::new(self.id, index))
    }

    /// Returns a shared slice over the live elements.
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Returns a mutable slice over the live elements.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Returns an iterator over immutable references to the elements.
    pub fn iter(&self) -> Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Returns an iterator over mutable references to the elements.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    pub(crate) fn check_cursor(&self, buffer: usize, index: usize) -> Result<(), VectorError> {
        if buffer != self.id {
            return Err(VectorError::InvalidatedIterator);
        }

        if index >= self.len {
            return Err(VectorError::IteratorOutOfRange {
                offset: isize::try_from(index).unwrap_or(isize::MAX),
                len: self.len,
            });
        }

        Ok(())
    }

    /// Signed distance from `cbegin()` to `pos`, once `pos` is known to name
    /// this vector's buffer.
    fn offset_of(&self, pos: ConstCursor<T>) -> Result<isize, VectorError> {
        if pos.buffer() != self.id {
            debug!("rejected cursor from buffer {} (current buffer {})", pos.buffer(), self.id);
            return Err(VectorError::InvalidatedIterator);
        }

        Ok(pos - self.cbegin())
    }

    fn grow(&mut self) {
        let Some(capacity) = self.capacity().checked_mul(2) else {
            capacity_overflow()
        };

        self.reserve(capacity);
    }

    /// Moves the live elements into a fresh buffer of exactly `capacity` slots.
    fn reallocate(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.len);
        trace!(
            "reallocating buffer {}: {} -> {} slots ({} live)",
            self.id,
            self.capacity(),
            capacity,
            self.len
        );

        let (mut buf, id) = allocate::<T>(capacity);

        unsafe {
            // The old slots are released without running destructors
            core::ptr::copy_nonoverlapping(self.buf.as_ptr(), buf.as_mut_ptr(), self.len);
        }

        self.buf = buf;
        self.id = id;
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T> {
    fn from(value: [T; N]) -> Self {
        Self::from_items(value)
    }
}

impl<T> From<&[T]> for Vector<T>
where
    T: Clone,
{
    fn from(value: &[T]) -> Self {
        Self::from_items(value.iter().cloned())
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vector = Self::new();
        vector.extend(iter);
        vector
    }
}

impl<T> Extend<T> for Vector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.push_back(element);
        }
    }
}

impl<T> Clone for Vector<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.len);
        for element in self.iter() {
            copy.push_back(element.clone());
        }

        copy
    }

    /// Copy assignment: adopts `source`'s capacity, not just its length.
    ///
    /// Only the first `source.size()` slots of the new buffer are initialized;
    /// the remaining ones are left as allocated.
    fn clone_from(&mut self, source: &Self) {
        trace!(
            "assigning buffer {} over buffer {}: {} slots ({} live)",
            source.id,
            self.id,
            source.capacity(),
            source.len
        );

        let (mut buf, id) = allocate::<T>(source.capacity());
        buf.iter_mut()
            .zip(source.iter())
            .for_each(|(dest, element)| {
                dest.write(element.clone());
            });

        self.clear();
        self.buf = buf;
        self.len = source.len;
        self.id = id;
    }
}

impl<T> Deref for Vector<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        unsafe { core::slice::from_raw_parts(self.buf.as_ptr().cast::<T>(), self.len) }
    }
}

impl<T> DerefMut for Vector<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { core::slice::from_raw_parts_mut(self.buf.as_mut_ptr().cast::<T>(), self.len) }
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.at(index) {
            Ok(element) => element,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match self.at_mut(index) {
            Ok(element) => element,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<T> IntoIterator for Vector<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        let live = 0..self.len;

        // Hand the elements over; the emptied vector then drops nothing
        self.len = 0;
        let buf = core::mem::replace(&mut self.buf, Box::<[T]>::new_uninit_slice(0));

        IntoIter { buf, live }
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Vector<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> PartialEq for Vector<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T> PartialEq<[T]> for Vector<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T> PartialEq<&[T]> for Vector<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &&[T]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, const N: usize> PartialEq<[T; N]> for Vector<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T, const N: usize> PartialEq<&[T; N]> for Vector<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &&[T; N]) -> bool {
        self.as_slice() == *other
    }
}

impl<T> Eq for Vector<T> where T: Eq {}

impl<T> PartialOrd for Vector<T>
where
    T: PartialOrd,
{
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T> Ord for Vector<T>
where
    T: Ord,
{
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T> Hash for Vector<T>
where
    T: Hash,
{
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T> fmt::Debug for Vector<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Renders `[e0, e1, ..., en-1]`, or `[]` when empty.
impl<T> fmt::Display for Vector<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;

        let begin = self.cbegin();
        let end = self.cend();
        let mut it = begin;
        while it != end {
            if it != begin {
                f.write_str(", ")?;
            }

            let element = it.get(self).map_err(|_| fmt::Error)?;
            write!(f, "{element}")?;
            it.increment();
        }

        f.write_str("]")
    }
}

impl<T> Drop for Vector<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

// ---

/// An owning iterator over the elements of a [`Vector`].
pub struct IntoIter<T> {
    buf: Box<[MaybeUninit<T>]>,
    live: Range<usize>,
}

impl<T> IntoIter<T> {
    /// Returns the elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        let remaining = &self.buf[self.live.clone()];
        unsafe { core::slice::from_raw_parts(remaining.as_ptr().cast::<T>(), remaining.len()) }
    }
}

impl<T> fmt::Debug for IntoIter<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.live.next()?;
        Some(unsafe { self.buf[index].assume_init_read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.live.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.live.next_back()?;
        Some(unsafe { self.buf[index].assume_init_read() })
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.live.len()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        for index in self.live.clone() {
            unsafe { self.buf[index].assume_init_drop() };
        }
    }
}
