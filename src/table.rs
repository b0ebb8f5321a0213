//! An insertion-ordered table of key/value entries.
//!
//! [`OrderedTable`] stores its entries contiguously, in the order they were
//! inserted, inside a buffer it allocates and sizes itself. Lookup by key is
//! a linear scan. The table does not enforce key uniqueness: inserting a key
//! that is already present appends a second entry, and key-based operations
//! then only ever see the first one. Callers that need unique keys check with
//! [`OrderedTable::find`] before inserting.

use core::borrow::Borrow;
use core::iter::{Extend, FromIterator, FusedIterator};
use core::ops::{Index, IndexMut};
use core::{ptr, slice};
use std::alloc::Layout;

mod raw;

pub mod de;

use raw::RawBuffer;

use crate::log::{log_debug, LogLevel};

/// Errors reported by [`OrderedTable`] operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A positional access or erase named a slot past the live entries.
    #[error("index {index} is out of range for a table of {len} entries")]
    OutOfRange { index: usize, len: usize },

    /// `front` or `back` was called on a table with no entries.
    #[error("the table is empty")]
    EmptyContainer,

    /// The requested capacity does not fit in the address space.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator refused the request.
    #[error("failed to allocate {bytes} bytes")]
    AllocFailed { bytes: usize },
}

pub type Result<T> = core::result::Result<T, Error>;

#[cold]
#[track_caller]
fn reserve_failed<T>(err: Error, cap: usize) -> ! {
    match err {
        Error::AllocFailed { .. } => match Layout::array::<T>(cap) {
            Ok(layout) => std::alloc::handle_alloc_error(layout),
            Err(_) => panic!("{}", Error::CapacityOverflow),
        },
        err => panic!("{}", err),
    }
}

/// Insertion-ordered key/value storage with linear lookup.
///
/// Only the first [`len`](Self::len) of the [`capacity`](Self::capacity)
/// slots hold entries. The buffer is allocated on first use, doubles when an
/// insert finds it full, and is never shrunk implicitly.
pub struct OrderedTable<K, V> {
    buf: RawBuffer<(K, V)>,
    len: usize,
}

impl<K, V> OrderedTable<K, V> {
    pub const fn new() -> Self {
        Self {
            buf: RawBuffer::new(),
            len: 0,
        }
    }

    /// Creates a table with room for `cap` entries.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows, and aborts if the allocator fails.
    pub fn with_capacity(cap: usize) -> Self {
        match RawBuffer::with_capacity(cap) {
            Ok(buf) => Self { buf, len: 0 },
            Err(e) => reserve_failed::<(K, V)>(e, cap),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether a buffer is currently allocated (or, for zero-sized entries,
    /// a capacity has been requested).
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.buf.is_allocated()
    }

    /// Grows the buffer to hold at least `new_cap` entries.
    ///
    /// Unlike [`Vec::reserve`], `new_cap` is the total capacity, not an
    /// additional amount. Does nothing if the table can already hold
    /// `new_cap` entries. Entries keep their order.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows, and aborts if the allocator fails.
    #[track_caller]
    pub fn reserve(&mut self, new_cap: usize) {
        if let Err(e) = self.try_reserve(new_cap) {
            reserve_failed::<(K, V)>(e, new_cap)
        }
    }

    /// Fallible form of [`reserve`](Self::reserve). On error the table is
    /// left exactly as it was.
    pub fn try_reserve(&mut self, new_cap: usize) -> Result<()> {
        let cap = self.buf.capacity();
        if new_cap <= cap {
            return Ok(());
        }

        log_debug!(
            LogLevel::Trace,
            "OrderedTable: growing from {} to {} slots ({} live)",
            cap,
            new_cap,
            self.len
        );

        // SAFETY: exactly the first `len` slots are initialised and
        // `len <= cap < new_cap`.
        unsafe { self.buf.realloc(new_cap, self.len) }
    }

    #[track_caller]
    fn grow_if_full(&mut self) {
        let cap = self.buf.capacity();
        if self.len == cap {
            let new_cap = if cap == 0 {
                1
            } else {
                match cap.checked_mul(2) {
                    Some(n) => n,
                    None => reserve_failed::<(K, V)>(Error::CapacityOverflow, cap),
                }
            };
            self.reserve(new_cap);
        }
    }

    /// Appends an entry and returns its index.
    ///
    /// No check is made for an existing entry with an equal key.
    #[track_caller]
    pub fn insert(&mut self, key: K, value: V) -> usize {
        let index = self.len;
        self.emplace(move || (key, value));
        index
    }

    /// Appends the entry produced by `ctor`, writing it straight into its slot.
    ///
    /// Space is secured before `ctor` runs, so a panicking constructor leaves
    /// the entries untouched (the capacity may have grown).
    #[track_caller]
    pub fn emplace<F: FnOnce() -> (K, V)>(&mut self, ctor: F) -> &mut (K, V) {
        self.grow_if_full();
        let entry = ctor();
        // SAFETY: `len < capacity` after growing, and slot `len` is not initialised.
        unsafe {
            let slot = self.buf.as_mut_ptr().add(self.len);
            slot.write(entry);
            self.len += 1;
            &mut *slot
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[(K, V)] {
        // SAFETY: the first `len` slots are initialised; the pointer is
        // aligned and non-null even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// Mutable view of the entries.
    ///
    /// Keys may be rewritten through this view; nothing stops two entries
    /// from ending up with equal keys.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [(K, V)] {
        // SAFETY: see `as_slice`; `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    pub fn at(&self, index: usize) -> Result<&(K, V)> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut (K, V)> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&(K, V)> {
        self.as_slice().get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut (K, V)> {
        self.as_mut_slice().get_mut(index)
    }

    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &(K, V) {
        debug_assert!(index < self.len);
        unsafe { &*self.buf.as_ptr().add(index) }
    }

    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut (K, V) {
        debug_assert!(index < self.len);
        unsafe { &mut *self.buf.as_mut_ptr().add(index) }
    }

    pub fn front(&self) -> Result<&(K, V)> {
        self.as_slice().first().ok_or(Error::EmptyContainer)
    }

    pub fn front_mut(&mut self) -> Result<&mut (K, V)> {
        self.as_mut_slice().first_mut().ok_or(Error::EmptyContainer)
    }

    pub fn back(&self) -> Result<&(K, V)> {
        self.as_slice().last().ok_or(Error::EmptyContainer)
    }

    pub fn back_mut(&mut self) -> Result<&mut (K, V)> {
        self.as_mut_slice().last_mut().ok_or(Error::EmptyContainer)
    }

    /// Removes the entry at `index`, shifting every later entry one slot
    /// towards the front. Returns the removed entry.
    ///
    /// Fails with [`Error::OutOfRange`] without touching the table if
    /// `index >= len`. The capacity is unchanged.
    pub fn erase(&mut self, index: usize) -> Result<(K, V)> {
        let len = self.len;
        if index >= len {
            return Err(Error::OutOfRange { index, len });
        }

        // SAFETY: `index < len`, so the hole and the `len - index - 1` slots
        // after it are initialised. Reading the hole moves the entry out; the
        // tail is then moved down over it, leaving slot `len - 1` logically
        // uninitialised, which the new length reflects.
        unsafe {
            let hole = self.buf.as_mut_ptr().add(index);
            let removed = ptr::read(hole);
            ptr::copy(hole.add(1), hole, len - index - 1);
            self.len = len - 1;
            Ok(removed)
        }
    }

    /// Drops every entry. The buffer is kept for reuse.
    pub fn clear(&mut self) {
        let len = self.len;
        // Zero the length first so a panicking `Drop` cannot cause a double drop.
        self.len = 0;
        // SAFETY: the first `len` slots were initialised and are no longer
        // reachable through `self`.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.as_mut_ptr(), len));
        }
    }

    /// Moves the entries and buffer out, leaving `self` empty and unallocated.
    pub fn take(&mut self) -> Self {
        Self {
            buf: self.buf.take(),
            len: core::mem::replace(&mut self.len, 0),
        }
    }

    pub fn iter(&self) -> Iter<K, V> {
        Iter {
            table: self,
            front: 0,
            back: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<K, V> {
        IterMut {
            inner: self.as_mut_slice().iter_mut(),
            pos: 0,
        }
    }

    /// Iterates over the entries as stored pairs.
    pub fn entries(&self) -> slice::Iter<'_, (K, V)> {
        self.as_slice().iter()
    }
}

impl<K: PartialEq, V> OrderedTable<K, V> {
    /// Index of the first entry whose key equals `key`, or [`len`](Self::len)
    /// if there is none.
    ///
    /// The result must be compared against `len()` before it is used as an
    /// index.
    pub fn find<Q: PartialEq + ?Sized>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
    {
        self.as_slice()
            .iter()
            .position(|(k, _)| k.borrow() == key)
            .unwrap_or(self.len)
    }

    pub fn contains_key<Q: PartialEq + ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.find(key) != self.len
    }

    /// Value of the first entry with key `key`.
    pub fn lookup<Q: PartialEq + ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
    {
        let index = self.find(key);
        self.get(index).map(|(_, v)| v)
    }

    pub fn lookup_mut<Q: PartialEq + ?Sized>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
    {
        let index = self.find(key);
        self.get_mut(index).map(|(_, v)| v)
    }

    /// Removes the first entry with key `key` and returns it.
    pub fn remove<Q: PartialEq + ?Sized>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
    {
        let index = self.find(key);
        self.erase(index).ok()
    }

    /// Erases the first entry with key `key`. Returns whether one was found.
    ///
    /// A missing key is not an error.
    pub fn erase_key<Q: PartialEq + ?Sized>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.remove(key).is_some()
    }
}

impl<K, V> Drop for OrderedTable<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> Default for OrderedTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for OrderedTable<K, V> {
    /// Deep copy with the same capacity. If an entry's clone panics, the
    /// entries copied so far are dropped and the new buffer is freed.
    fn clone(&self) -> Self {
        let mut table = Self::with_capacity(self.capacity());
        for (k, v) in self.entries() {
            table.insert(k.clone(), v.clone());
        }
        table
    }

    /// Reuses the existing buffer when the capacities already match.
    fn clone_from(&mut self, source: &Self) {
        if self.capacity() != source.capacity() {
            *self = source.clone();
            return;
        }

        self.clear();
        for (k, v) in source.entries() {
            self.insert(k.clone(), v.clone());
        }
    }
}

impl<K: core::fmt::Debug, V: core::fmt::Debug> core::fmt::Debug for OrderedTable<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedTable<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<K: Eq, V: Eq> Eq for OrderedTable<K, V> {}

impl<K, V> Index<usize> for OrderedTable<K, V> {
    type Output = (K, V);

    #[track_caller]
    fn index(&self, index: usize) -> &(K, V) {
        &self.as_slice()[index]
    }
}

impl<K, V> IndexMut<usize> for OrderedTable<K, V> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut (K, V) {
        &mut self.as_mut_slice()[index]
    }
}

impl<K, V> IntoIterator for OrderedTable<K, V> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(mut self) -> Self::IntoIter {
        let back = core::mem::replace(&mut self.len, 0);
        IntoIter {
            buf: self.buf.take(),
            front: 0,
            back,
        }
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedTable<K, V> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut OrderedTable<K, V> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedTable<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::new();

        table.extend(iter);

        table
    }
}

impl<'a, 'b, K: Clone, V: Clone> FromIterator<(&'a K, &'b V)> for OrderedTable<K, V> {
    fn from_iter<T: IntoIterator<Item = (&'a K, &'b V)>>(iter: T) -> Self {
        let mut table = Self::new();

        table.extend(iter);

        table
    }
}

impl<K, V> Extend<(K, V)> for OrderedTable<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        let needed = self.len.saturating_add(iter.size_hint().0);
        let cap = self.capacity();
        if needed > cap {
            self.reserve(needed.max(cap.saturating_mul(2)));
        }

        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, 'b, K: Clone, V: Clone> Extend<(&'a K, &'b V)> for OrderedTable<K, V> {
    fn extend<T: IntoIterator<Item = (&'a K, &'b V)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(k, v)| (k.clone(), v.clone())))
    }
}

/// Owning iterator returned by [`OrderedTable::into_iter`].
///
/// Entries not yet yielded are dropped with the iterator.
pub struct IntoIter<K, V> {
    buf: RawBuffer<(K, V)>,
    front: usize,
    back: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: slots `front..back` are initialised and owned by the
        // iterator; advancing `front` hands this one to the caller.
        let entry = unsafe { ptr::read(self.buf.as_ptr().add(self.front)) };
        self.front += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: as in `next`, from the other end.
        Some(unsafe { ptr::read(self.buf.as_ptr().add(self.back)) })
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> Drop for IntoIter<K, V> {
    fn drop(&mut self) {
        let (front, back) = (self.front, self.back);
        self.front = back;
        // SAFETY: slots `front..back` are the entries not yet handed out.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.buf.as_mut_ptr().add(front),
                back - front,
            ));
        }
    }
}

/// Borrowing iterator over `(&K, &V)`.
///
/// A cursor over the table's entries: cloning it copies the position, and
/// two iterators compare equal when they are at the same position of the
/// same table.
pub struct Iter<'a, K, V> {
    table: &'a OrderedTable<K, V>,
    front: usize,
    back: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    /// Index of the entry the next call to `next` yields.
    pub fn position(&self) -> usize {
        self.front
    }
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, K, V> PartialEq for Iter<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.table, other.table)
            && self.front == other.front
            && self.back == other.back
    }
}

impl<'a, K, V> Eq for Iter<'a, K, V> {}

impl<'a, K: core::fmt::Debug, V: core::fmt::Debug> core::fmt::Debug for Iter<'a, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.clone())
            .finish()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let (k, v) = &self.table.as_slice()[self.front];
        self.front += 1;
        Some((k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        let (k, v) = &self.table.as_slice()[self.back];
        Some((k, v))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// Borrowing iterator over `(&K, &mut V)`.
pub struct IterMut<'a, K, V> {
    inner: slice::IterMut<'a, (K, V)>,
    pos: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    /// Index of the entry the next call to `next` yields.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let (k, v) = self.inner.next()?;
        self.pos += 1;
        Some((&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (&*k, v))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}
impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}

impl<K: serde::ser::Serialize, V: serde::ser::Serialize> serde::ser::Serialize
    for OrderedTable<K, V>
{
    fn serialize<__S>(&self, serializer: __S) -> core::result::Result<__S::Ok, __S::Error>
    where
        __S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut ser = serializer.serialize_map(Some(self.len()))?;

        for (key, value) in self {
            ser.serialize_entry(key, value)?;
        }

        ser.end()
    }
}

impl<'de, K: serde::de::Deserialize<'de>, V: serde::de::Deserialize<'de>>
    serde::de::Deserialize<'de> for OrderedTable<K, V>
{
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::DeserializeSeed;
        de::Entries::new().deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> OrderedTable<String, i32> {
        let mut table = OrderedTable::new();
        table.insert("a".to_string(), 1);
        table.insert("b".to_string(), 2);
        table.insert("c".to_string(), 3);
        table
    }

    #[test]
    fn empty_table_has_no_buffer() {
        let table = OrderedTable::<String, i32>::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), 0);
        assert!(!table.is_allocated());
        assert_eq!(table.iter().next(), None);
    }

    #[test]
    fn find_and_erase_by_index() {
        let mut table = abc();
        assert_eq!(table.len(), 3);
        assert_eq!(table.find("b"), 1);

        let removed = table.erase(1).unwrap();
        assert_eq!(removed, ("b".to_string(), 2));
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.as_slice(),
            &[("a".to_string(), 1), ("c".to_string(), 3)]
        );
        assert_eq!(table.find("b"), 2);
        assert_eq!(table.find("b"), table.len());
    }

    #[test]
    fn erase_missing_key_is_not_an_error() {
        let mut table = abc();
        assert!(!table.erase_key("missing"));
        assert_eq!(table.len(), 3);
        assert!(table.erase_key("a"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.front().unwrap().0, "b");
    }

    #[test]
    fn positional_errors() {
        let mut table = OrderedTable::new();
        table.insert(1u8, 'x');
        table.insert(2u8, 'y');

        assert_eq!(table.at(5), Err(Error::OutOfRange { index: 5, len: 2 }));
        assert_eq!(table.erase(2), Err(Error::OutOfRange { index: 2, len: 2 }));
        assert_eq!(table.len(), 2);
        assert_eq!(table.at(1), Ok(&(2, 'y')));

        let empty = OrderedTable::<u8, char>::new();
        assert_eq!(empty.front(), Err(Error::EmptyContainer));
        assert_eq!(empty.back(), Err(Error::EmptyContainer));
    }

    #[test]
    fn growth_doubles_from_one() {
        let mut table = OrderedTable::new();
        let mut caps = Vec::new();
        for i in 0..5u32 {
            table.insert(i, i * 10);
            caps.push(table.capacity());
            for (j, (k, v)) in table.iter().enumerate() {
                assert_eq!(*k as usize, j);
                assert_eq!(*v, *k * 10);
            }
        }
        assert_eq!(caps, [1, 2, 4, 4, 8]);
    }

    #[test]
    fn reserve_is_absolute() {
        let mut table = abc();
        let cap = table.capacity();
        table.reserve(0);
        table.reserve(cap);
        assert_eq!(table.capacity(), cap);

        table.reserve(20);
        assert_eq!(table.capacity(), 20);
        assert_eq!(table, abc());
    }

    #[test]
    fn try_reserve_overflow_leaves_table_alone() {
        let mut table = abc();
        let cap = table.capacity();
        assert_eq!(table.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
        assert_eq!(table.capacity(), cap);
        assert_eq!(table, abc());
    }

    #[test]
    fn duplicate_keys_first_match_wins() {
        let mut table = OrderedTable::new();
        table.insert("k", 1);
        table.insert("k", 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.find("k"), 0);
        assert_eq!(table.lookup("k"), Some(&1));

        assert!(table.erase_key("k"));
        assert_eq!(table.lookup("k"), Some(&2));
    }

    #[test]
    fn emplace_writes_in_place() {
        let mut table = OrderedTable::new();
        let entry = table.emplace(|| ("x".to_string(), vec![1, 2]));
        entry.1.push(3);
        assert_eq!(table.lookup("x"), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn panicking_emplace_leaves_entries_alone() {
        let mut table = abc();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            table.emplace(|| panic!("constructor failed"));
        }));
        assert!(result.is_err());
        assert_eq!(table.len(), 3);
        let keys: Vec<&str> = table.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(table.lookup("c"), Some(&3));

        table.insert("d".to_string(), 4);
        assert_eq!(table.back().unwrap().1, 4);
    }

    #[test]
    fn extend_grows_geometrically() {
        let mut table = OrderedTable::new();
        let mut caps = Vec::new();
        for i in 0..6 {
            table.extend(core::iter::once((i, i)));
            caps.push(table.capacity());
        }
        assert_eq!(caps, [1, 2, 4, 4, 8, 8]);

        table.extend((6..20).map(|i| (i, i)));
        assert_eq!(table.len(), 20);
        assert_eq!(table.capacity(), 20);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut table = abc();
        let cap = table.capacity();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), cap);
        table.insert("z".to_string(), 26);
        assert_eq!(table.front().unwrap().0, "z");
    }

    #[test]
    fn take_leaves_reusable_empty_table() {
        let mut table = abc();
        let moved = table.take();
        assert_eq!(moved.len(), 3);
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), 0);
        assert!(!table.is_allocated());

        table.insert("again".to_string(), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn clone_from_reuses_matching_capacity() {
        let source = abc();
        let mut target = OrderedTable::with_capacity(source.capacity());
        target.insert("old".to_string(), 0);
        target.clone_from(&source);
        assert_eq!(target, source);
        assert_eq!(target.capacity(), source.capacity());

        let mut small = OrderedTable::new();
        small.clone_from(&source);
        assert_eq!(small, source);
        assert_eq!(small.capacity(), source.capacity());
    }

    #[test]
    fn iterators_are_fresh_cursors() {
        let table = abc();
        let mut it = table.iter();
        assert_eq!(it, table.iter());
        let before = it.clone();
        assert_eq!(it.next(), Some((&"a".to_string(), &1)));
        assert_ne!(it, before);
        assert_eq!(it.position(), 1);
        assert_eq!(before.position(), 0);

        let keys: String = table.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, "abc");
        let rev: Vec<i32> = table.iter().rev().map(|(_, v)| *v).collect();
        assert_eq!(rev, [3, 2, 1]);
    }

    #[test]
    fn iterators_of_distinct_empty_tables_differ() {
        let first = OrderedTable::<String, i32>::new();
        let second = OrderedTable::<String, i32>::new();
        assert_eq!(first.iter(), first.iter());
        assert_ne!(first.iter(), second.iter());
    }

    #[test]
    fn iter_mut_updates_values() {
        let mut table = abc();
        for (_, v) in &mut table {
            *v *= 10;
        }
        let values: Vec<i32> = table.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, [10, 20, 30]);
    }

    #[test]
    fn index_panics_out_of_range() {
        let table = abc();
        assert_eq!(table[2].1, 3);
        let result = std::panic::catch_unwind(|| table[3].1);
        assert!(result.is_err());
    }

    #[test]
    fn zero_sized_entries() {
        let mut table = OrderedTable::<(), ()>::new();
        for _ in 0..5 {
            table.insert((), ());
        }
        assert_eq!(table.len(), 5);
        assert_eq!(table.capacity(), 8);
        assert!(table.erase(4).is_ok());
        assert_eq!(table.into_iter().count(), 4);
    }

    #[test]
    fn debug_formats_as_map() {
        let table = abc();
        assert_eq!(format!("{:?}", table), r#"{"a": 1, "b": 2, "c": 3}"#);
    }
}
