use std::{fmt, marker::PhantomData, ptr::NonNull};

use crate::error::StructureError;

/// Name a queue reports in [`StructureError::Empty`]
pub const STRUCTURE: &str = "queue";

/// A node in the queue
struct Node<T> {
    /// The value stored in this node
    value: T,
    /// The node behind this one, towards the rear
    next: Option<NonNull<Self>>,
}

/// A FIFO queue over a singly-linked chain of heap nodes
///
/// # Type Parameters
///
/// * `T`: The type of elements in the queue
///
/// # Safety
///
/// Nodes are allocated with `Box::leak` on enqueue and reclaimed with
/// `Box::from_raw` on dequeue, exactly once each. `front` and `rear` are both
/// `None` or both point into the same live chain; all access goes through
/// `&self` or `&mut self`, so the chain is never aliased mutably.
///
/// # Performance
///
/// * Enqueue: O(1)
/// * Dequeue: O(1)
/// * Memory usage: O(n) where n is the number of elements
pub struct Queue<T> {
    /// Oldest node, the next to be dequeued
    front: Option<NonNull<Node<T>>>,
    /// Newest node
    rear: Option<NonNull<Node<T>>>,
    /// Number of queued elements
    len: usize,
    /// The queue owns its nodes
    _marker: PhantomData<Box<Node<T>>>,
}

impl<T> Queue<T> {
    /// Creates a new empty queue.
    ///
    /// # Examples
    /// ```
    /// use library_catalog::queue::Queue;
    /// let queue: Queue<i32> = Queue::new();
    /// assert!(queue.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self { front: None, rear: None, len: 0, _marker: PhantomData }
    }

    /// Adds a value to the back of the queue.
    ///
    /// # Examples
    /// ```
    /// use library_catalog::queue::Queue;
    /// let mut queue = Queue::new();
    /// queue.enqueue(42);
    /// assert_eq!(queue.len(), 1);
    /// ```
    #[allow(clippy::arithmetic_side_effects)]
    pub fn enqueue(&mut self, value: T) {
        let node = NonNull::from(Box::leak(Box::new(Node { value, next: None })));
        match self.rear {
            // SAFETY: rear points at the live last node of this queue's chain
            Some(rear) => unsafe { (*rear.as_ptr()).next = Some(node) },
            None => self.front = Some(node),
        }
        self.rear = Some(node);
        self.len += 1;
    }

    /// Removes and returns the value at the front of the queue.
    ///
    /// # Errors
    ///
    /// Returns `StructureError::Empty` if the queue has no elements
    ///
    /// # Examples
    /// ```
    /// use library_catalog::queue::Queue;
    /// use library_catalog::StructureError;
    /// let mut queue = Queue::new();
    /// queue.enqueue(42);
    /// assert_eq!(queue.dequeue(), Ok(42));
    /// assert_eq!(queue.dequeue(), Err(StructureError::Empty { structure: "queue" }));
    /// ```
    #[allow(clippy::arithmetic_side_effects)]
    pub fn dequeue(&mut self) -> Result<T, StructureError> {
        let front = self.front.ok_or(StructureError::Empty { structure: STRUCTURE })?;
        // SAFETY: front came from Box::leak in enqueue and is unlinked here,
        // so ownership returns to a Box exactly once
        let node = unsafe { Box::from_raw(front.as_ptr()) };
        self.front = node.next;
        if self.front.is_none() {
            self.rear = None;
        }
        self.len -= 1;
        Ok(node.value)
    }

    /// Returns a reference to the value at the front without removing it.
    ///
    /// # Errors
    ///
    /// Returns `StructureError::Empty` if the queue has no elements
    pub fn peek(&self) -> Result<&T, StructureError> {
        let front = self.front.ok_or(StructureError::Empty { structure: STRUCTURE })?;
        // SAFETY: front is live for as long as the queue is borrowed
        Ok(unsafe { &(*front.as_ptr()).value })
    }

    /// Number of queued elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.front.is_none()
    }

    /// Drops every queued element
    pub fn clear(&mut self) {
        while self.dequeue().is_ok() {}
    }

    /// Iterates from front to rear without consuming
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { next: self.front, _marker: PhantomData }
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Queue<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-rear iterator over a [`Queue`]
pub struct Iter<'a, T> {
    /// Next node to yield
    next: Option<NonNull<Node<T>>>,
    /// Ties the iterator to the queue borrow
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        // SAFETY: the queue is borrowed for 'a, so no node is freed meanwhile
        let node: &'a Node<T> = unsafe { &*node.as_ptr() };
        self.next = node.next;
        Some(&node.value)
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("exhausted", &self.next.is_none()).finish()
    }
}
