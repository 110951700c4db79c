use std::fmt;

use crate::error::StructureError;

/// Name a stack reports in [`StructureError::Empty`]
pub const STRUCTURE: &str = "stack";

/// A node in the stack
///
/// Each node owns the node below it.
struct Node<T> {
    /// The value stored in this node
    value: T,
    /// The rest of the stack
    next: Option<Box<Self>>,
}

/// A LIFO stack over a singly-linked chain of owned nodes
///
/// This implementation provides O(1) push and pop operations.
///
/// # Type Parameters
/// * `T`: The type of values stored in the stack
///
/// # Examples
/// ```
/// use library_catalog::stack::Stack;
///
/// let mut stack = Stack::new();
/// stack.push(1);
/// assert_eq!(stack.pop(), Ok(1));
/// assert!(stack.pop().is_err());
/// ```
pub struct Stack<T> {
    /// Most recently pushed node
    top: Option<Box<Node<T>>>,
    /// Number of stacked elements
    len: usize,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stack<T> {
    /// Creates a new empty stack
    #[must_use]
    pub fn new() -> Self {
        Self { top: None, len: 0 }
    }

    /// Pushes a value onto the stack
    #[allow(clippy::arithmetic_side_effects)]
    pub fn push(&mut self, value: T) {
        let next = self.top.take();
        self.top = Some(Box::new(Node { value, next }));
        self.len += 1;
    }

    /// Removes and returns the top element from the stack
    ///
    /// # Errors
    ///
    /// Returns `StructureError::Empty` if the stack has no elements
    #[allow(clippy::arithmetic_side_effects)]
    pub fn pop(&mut self) -> Result<T, StructureError> {
        let node = self.top.take().ok_or(StructureError::Empty { structure: STRUCTURE })?;
        let Node { value, next } = *node;
        self.top = next;
        self.len -= 1;
        Ok(value)
    }

    /// Returns the top element without removing it
    ///
    /// # Errors
    ///
    /// Returns `StructureError::Empty` if the stack has no elements
    pub fn peek(&self) -> Result<&T, StructureError> {
        self.top
            .as_deref()
            .map(|node| &node.value)
            .ok_or(StructureError::Empty { structure: STRUCTURE })
    }

    /// Returns the current size of the stack
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the stack is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Drops every element, one node at a time
    pub fn clear(&mut self) {
        let mut current = self.top.take();
        while let Some(mut node) = current {
            current = node.next.take();
        }
        self.len = 0;
    }

    /// Iterates from top to bottom without consuming
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::successors(self.top.as_deref(), |node| node.next.as_deref())
            .map(|node| &node.value)
    }
}

impl<T> Drop for Stack<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
