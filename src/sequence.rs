//! A growable indexed array with explicit capacity management.
//!
//! Storage is a boxed slice of slots. It doubles when a push finds it full and
//! halves when a removal leaves it a quarter occupied, so alternating
//! push/remove at either boundary never thrashes.

use std::fmt;

use crate::error::StructureError;

/// Number of slots allocated by [`Sequence::new`] and [`Sequence::clear`]
pub const INITIAL_CAPACITY: usize = 10;

/// Insertion-ordered storage
pub struct Sequence<T> {
    /// Backing storage; slots `[0, len)` are occupied, the rest are `None`
    slots: Box<[Option<T>]>,
    /// Number of occupied slots
    len: usize,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sequence<T> {
    /// Creates an empty sequence with [`INITIAL_CAPACITY`] slots
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Self::allocate(INITIAL_CAPACITY), len: 0 }
    }

    /// Allocate `capacity` empty slots
    fn allocate(capacity: usize) -> Box<[Option<T>]> {
        std::iter::repeat_with(|| None).take(capacity).collect()
    }

    /// Move every element into fresh storage of `capacity` slots
    fn reallocate(&mut self, capacity: usize) {
        let mut slots = Self::allocate(capacity);
        for (dst, src) in slots.iter_mut().zip(self.slots.iter_mut().take(self.len)) {
            *dst = src.take();
        }
        self.slots = slots;
    }

    /// The error returned for an index outside `[0, len)`
    fn out_of_range(&self, index: usize) -> StructureError {
        StructureError::OutOfRange { index, len: self.len }
    }

    /// Appends a value, doubling the capacity first when full.
    ///
    /// Amortized O(1).
    #[allow(clippy::arithmetic_side_effects)]
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            self.reallocate(self.capacity() * 2);
        }
        if let Some(slot) = self.slots.get_mut(self.len) {
            *slot = Some(value);
            self.len += 1;
        }
    }

    /// Returns the element at `index`
    ///
    /// # Errors
    ///
    /// Returns `StructureError::OutOfRange` if `index >= len`
    pub fn get(&self, index: usize) -> Result<&T, StructureError> {
        if index >= self.len {
            return Err(self.out_of_range(index));
        }
        self.slots.get(index).and_then(Option::as_ref).ok_or_else(|| self.out_of_range(index))
    }

    /// Removes and returns the element at `index`, shifting everything after it
    /// one slot to the left.
    ///
    /// When the removal leaves the storage exactly a quarter full (and not
    /// empty) the capacity is halved.
    ///
    /// # Errors
    ///
    /// Returns `StructureError::OutOfRange` if `index >= len`
    #[allow(clippy::arithmetic_side_effects)]
    pub fn remove(&mut self, index: usize) -> Result<T, StructureError> {
        if index >= self.len {
            return Err(self.out_of_range(index));
        }
        let last = self.len - 1;
        if let Some(live) = self.slots.get_mut(index..self.len) {
            live.rotate_left(1);
        }
        let removed = self
            .slots
            .get_mut(last)
            .and_then(Option::take)
            .ok_or_else(|| self.out_of_range(index))?;
        self.len = last;

        if self.len > 0 && self.len == self.capacity() / 4 {
            self.reallocate(self.capacity() / 2);
        }
        Ok(removed)
    }

    /// Number of stored elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drops every element and returns to the initial capacity
    pub fn clear(&mut self) {
        self.slots = Self::allocate(INITIAL_CAPACITY);
        self.len = 0;
    }

    /// Iterates over the elements in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().take(self.len).filter_map(Option::as_ref)
    }

    /// Position of the first element equal to `value`, by linear scan
    #[must_use]
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|element| element == value)
    }

    /// Position of the first element matching `predicate`
    #[must_use]
    pub fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().position(predicate)
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut sequence = Self::new();
        for value in iter {
            sequence.push(value);
        }
        sequence
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("elements", &self.iter().collect::<Vec<_>>())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut sequence = Sequence::new();
        assert!(sequence.is_empty());

        sequence.push("a");
        sequence.push("b");
        sequence.push("c");

        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.get(0), Ok(&"a"));
        assert_eq!(sequence.get(2), Ok(&"c"));
        assert_eq!(sequence.get(3), Err(StructureError::OutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn test_capacity_doubles_when_full() {
        let mut sequence = Sequence::new();
        for i in 0..INITIAL_CAPACITY {
            sequence.push(i);
        }
        assert_eq!(sequence.capacity(), INITIAL_CAPACITY);

        sequence.push(10);
        assert_eq!(sequence.capacity(), 20);
        assert_eq!(sequence.iter().copied().collect::<Vec<_>>(), (0..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_remove_shifts_left() {
        let mut sequence: Sequence<i32> = (1..=5).collect();

        assert_eq!(sequence.remove(1), Ok(2));
        assert_eq!(sequence.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 5]);
        assert_eq!(sequence.remove(3), Ok(5));
        assert_eq!(sequence.remove(3), Err(StructureError::OutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn test_capacity_halves_at_quarter_occupancy() {
        let mut sequence: Sequence<usize> = (0..21).collect();
        assert_eq!(sequence.capacity(), 40);

        while sequence.len() > 11 {
            drop(sequence.remove(0));
        }
        assert_eq!(sequence.capacity(), 40);

        drop(sequence.remove(0));
        assert_eq!(sequence.len(), 10);
        assert_eq!(sequence.capacity(), 20);
        assert_eq!(sequence.iter().copied().collect::<Vec<_>>(), (11..21).collect::<Vec<_>>());
    }

    #[test]
    fn test_no_thrash_at_boundary() {
        let mut sequence: Sequence<usize> = (0..11).collect();
        assert_eq!(sequence.capacity(), 20);

        // 11 -> 10 -> 11 -> 10 stays well above the shrink threshold
        for _ in 0..4 {
            drop(sequence.remove(10));
            assert_eq!(sequence.capacity(), 20);
            sequence.push(99);
            assert_eq!(sequence.capacity(), 20);
        }
    }

    #[test]
    fn test_removing_last_element_keeps_storage() {
        let mut sequence = Sequence::new();
        sequence.push(1);
        assert_eq!(sequence.remove(0), Ok(1));
        assert!(sequence.is_empty());
        assert_eq!(sequence.capacity(), INITIAL_CAPACITY);
    }

    #[test]
    fn test_index_of_and_clear() {
        let mut sequence: Sequence<&str> = ["x", "y", "x"].into_iter().collect();
        assert_eq!(sequence.index_of(&"x"), Some(0));
        assert_eq!(sequence.index_of(&"y"), Some(1));
        assert_eq!(sequence.index_of(&"z"), None);

        for i in 0..30 {
            sequence.push(if i % 2 == 0 { "a" } else { "b" });
        }
        sequence.clear();
        assert!(sequence.is_empty());
        assert_eq!(sequence.capacity(), INITIAL_CAPACITY);
        assert_eq!(sequence.get(0), Err(StructureError::OutOfRange { index: 0, len: 0 }));
    }
}
