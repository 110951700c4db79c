//! Unbalanced binary search tree over shared entries, keyed by a string.
//!
//! Keys compare case-insensitively. Duplicate keys are kept, not merged: an
//! entry whose key equals a node's key descends into that node's right
//! subtree. Every node therefore satisfies
//! `left keys < node key <= right keys`, and [`OrderedIndex::iter`] yields
//! entries in non-decreasing key order.
//!
//! There is no rebalancing, so operations are O(log n) on average and O(n)
//! on adversarial (for example already sorted) insertion orders.

use std::{cmp::Ordering, fmt, rc::Rc};

use crate::sequence::Sequence;

/// Supplies the string a value is ordered by
pub trait IndexKey {
    /// The ordering key
    fn index_key(&self) -> &str;
}

/// Compare two keys ignoring case
#[must_use]
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase))
}

/// Owned link to a subtree
type Link<T> = Option<Box<Node<T>>>;

/// A tree node; it exclusively owns both subtrees
struct Node<T> {
    /// The indexed entry
    entry: Rc<T>,
    /// Entries with strictly smaller keys
    left: Link<T>,
    /// Entries with greater or equal keys
    right: Link<T>,
}

impl<T> Node<T> {
    /// A leaf holding `entry`
    fn leaf(entry: Rc<T>) -> Self {
        Self { entry, left: None, right: None }
    }
}

/// Binary search tree keyed by [`IndexKey::index_key`]
pub struct OrderedIndex<T> {
    /// Root of the tree
    root: Link<T>,
    /// Number of nodes
    len: usize,
}

impl<T> Default for OrderedIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedIndex<T> {
    /// Creates an empty index
    #[must_use]
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the index holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes on the longest root-to-leaf path
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut pending: Vec<(&Node<T>, usize)> =
            self.root.as_deref().map(|root| (root, 1)).into_iter().collect();
        while let Some((node, depth)) = pending.pop() {
            height = height.max(depth);
            let below = depth.saturating_add(1);
            pending.extend(node.left.as_deref().map(|child| (child, below)));
            pending.extend(node.right.as_deref().map(|child| (child, below)));
        }
        height
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        let mut pending: Vec<Box<Node<T>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
        self.len = 0;
    }

    /// In-order iterator: ascending by key, duplicates in tree order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self.root.as_deref());
        iter
    }

    /// Entries in ascending key order, collected into a [`Sequence`]
    #[must_use]
    pub fn in_order(&self) -> Sequence<Rc<T>> {
        self.iter().cloned().collect()
    }
}

impl<T: IndexKey> OrderedIndex<T> {
    /// Inserts an entry. Equal keys go to the right, so the entry is always
    /// added, never merged.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn insert(&mut self, entry: Rc<T>) {
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = if compare_keys(entry.index_key(), node.entry.index_key()) == Ordering::Less {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        *link = Some(Box::new(Node::leaf(entry)));
        self.len += 1;
    }

    /// Finds an entry whose key matches `key`.
    ///
    /// With duplicate keys this is the first match on the root-to-leaf path,
    /// which need not be any particular instance.
    #[must_use]
    pub fn search(&self, key: &str) -> Option<&Rc<T>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match compare_keys(key, node.entry.index_key()) {
                Ordering::Equal => return Some(&node.entry),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    /// Removes the first entry matching `key` on the search path.
    ///
    /// Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.delete_where(key, |_| true).is_some()
    }

    /// Removes exactly the node holding `entry` (compared by pointer), even
    /// when other entries share its key.
    ///
    /// Returns whether the entry was found.
    pub fn delete_entry(&mut self, entry: &Rc<T>) -> bool {
        self.delete_where(entry.index_key(), |candidate| Rc::ptr_eq(candidate, entry)).is_some()
    }

    /// Removes the first node with key `key` whose entry satisfies `matches`.
    ///
    /// An equal key that does not match keeps the walk going right, where
    /// every other equal key lives.
    #[allow(clippy::arithmetic_side_effects)]
    fn delete_where<F>(&mut self, key: &str, matches: F) -> Option<Rc<T>>
    where
        F: Fn(&Rc<T>) -> bool,
    {
        let mut link = &mut self.root;
        loop {
            let node = link.as_deref()?;
            let go_left = match compare_keys(key, node.entry.index_key()) {
                Ordering::Less => true,
                Ordering::Equal if matches(&node.entry) => break,
                Ordering::Equal | Ordering::Greater => false,
            };
            let node = link.as_mut()?;
            link = if go_left { &mut node.left } else { &mut node.right };
        }
        let removed = Self::unlink(link)?;
        self.len -= 1;
        Some(removed)
    }

    /// Removes the node at `link` and returns its entry.
    ///
    /// A node with at most one child is replaced by that child. A node with two
    /// children takes over the entry of its in-order successor, the leftmost
    /// node of its right subtree, which is detached instead.
    fn unlink(link: &mut Link<T>) -> Option<Rc<T>> {
        let node = link.as_mut()?;
        if node.left.is_some() && node.right.is_some() {
            let successor = Self::take_min(&mut node.right)?;
            return Some(std::mem::replace(&mut node.entry, successor));
        }
        let node = link.take()?;
        let Node { entry, left, right } = *node;
        *link = left.or(right);
        Some(entry)
    }

    /// Detaches the leftmost node under `link`, splicing in its right child
    fn take_min(mut link: &mut Link<T>) -> Option<Rc<T>> {
        while link.as_ref()?.left.is_some() {
            link = &mut link.as_mut()?.left;
        }
        let node = link.take()?;
        let Node { entry, right, .. } = *node;
        *link = right;
        Some(entry)
    }
}

impl<T> Drop for OrderedIndex<T> {
    fn drop(&mut self) {
        // Iterative teardown; a degenerate tree would overflow the stack with
        // the default recursive Box drop.
        self.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedIndex")
            .field("entries", &self.iter().collect::<Vec<_>>())
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl<'a, T> IntoIterator for &'a OrderedIndex<T> {
    type Item = &'a Rc<T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over an [`OrderedIndex`]
pub struct Iter<'a, T> {
    /// Nodes whose left subtree has been visited but which have not been
    /// yielded yet
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    /// Push `node` and all its left descendants
    fn push_left_spine(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a Rc<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.entry)
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("pending", &self.stack.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Titled(&'static str, u32);

    impl IndexKey for Titled {
        fn index_key(&self) -> &str {
            self.0
        }
    }

    fn index_of(titles: &[&'static str]) -> OrderedIndex<Titled> {
        let mut index = OrderedIndex::new();
        for (tag, title) in (0..).zip(titles) {
            index.insert(Rc::new(Titled(*title, tag)));
        }
        index
    }

    fn keys(index: &OrderedIndex<Titled>) -> Vec<&'static str> {
        index.iter().map(|entry| entry.0).collect()
    }

    /// Checks `left < node <= right` for every node
    fn assert_ordered(index: &OrderedIndex<Titled>) {
        fn check(link: Option<&Node<Titled>>, lower: Option<&str>, upper: Option<&str>) {
            let Some(node) = link else { return };
            let key = node.entry.index_key();
            if let Some(lower) = lower {
                assert_ne!(compare_keys(key, lower), Ordering::Less, "{key} below {lower}");
            }
            if let Some(upper) = upper {
                assert_eq!(compare_keys(key, upper), Ordering::Less, "{key} not below {upper}");
            }
            check(node.left.as_deref(), lower, Some(key));
            check(node.right.as_deref(), Some(key), upper);
        }
        check(index.root.as_deref(), None, None);
        assert_eq!(index.iter().count(), index.len());
    }

    #[test]
    fn test_in_order_is_case_insensitive() {
        let index = index_of(&["delta", "Alpha", "charlie", "Bravo", "echo"]);
        assert_eq!(keys(&index), vec!["Alpha", "Bravo", "charlie", "delta", "echo"]);
        assert_eq!(index.len(), 5);
        assert_eq!(index.in_order().len(), 5);
        assert_ordered(&index);
    }

    #[test]
    fn test_search_ignores_case() {
        let index = index_of(&["Moby Dick", "Emma", "Ulysses"]);
        assert_eq!(index.search("moby dick").map(|entry| entry.1), Some(0));
        assert_eq!(index.search("ULYSSES").map(|entry| entry.1), Some(2));
        assert!(index.search("Hamlet").is_none());
    }

    #[test]
    fn test_duplicates_are_kept_to_the_right() {
        let index = index_of(&["m", "M", "a", "m"]);
        assert_eq!(index.len(), 4);
        // Each duplicate lands right of the previous one, so tags stay in
        // insertion order among equal keys
        let tags: Vec<u32> = index.iter().map(|entry| entry.1).collect();
        assert_eq!(tags, vec![2, 0, 1, 3]);
        assert_eq!(index.search("m").map(|entry| entry.1), Some(0));
        assert_ordered(&index);
    }

    #[test]
    fn test_delete_leaf_single_child_and_two_children() {
        let mut index = index_of(&["m", "f", "t", "c", "h", "p", "w", "r"]);

        assert!(index.delete("c"));
        assert_ordered(&index);
        assert!(index.delete("p"));
        assert_ordered(&index);
        assert!(index.delete("m"));
        assert_ordered(&index);

        assert_eq!(keys(&index), vec!["f", "h", "r", "t", "w"]);
        assert_eq!(index.len(), 5);
        assert!(!index.delete("m"));
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_delete_duplicate_removes_exactly_one() {
        let mut index = index_of(&["k", "d", "k", "s", "k", "a"]);
        assert!(index.delete("K"));
        assert_eq!(index.len(), 5);
        assert_eq!(keys(&index), vec!["a", "d", "k", "k", "s"]);
        assert_ordered(&index);
    }

    #[test]
    fn test_delete_entry_targets_the_instance() {
        let mut index = OrderedIndex::new();
        let first = Rc::new(Titled("same", 1));
        let second = Rc::new(Titled("same", 2));
        let third = Rc::new(Titled("Same", 3));
        index.insert(Rc::new(Titled("other", 0)));
        index.insert(Rc::clone(&first));
        index.insert(Rc::clone(&second));
        index.insert(Rc::clone(&third));

        assert!(index.delete_entry(&second));
        let tags: Vec<u32> = index.iter().map(|entry| entry.1).collect();
        assert_eq!(tags, vec![0, 1, 3]);
        assert!(!index.delete_entry(&second));
        assert_ordered(&index);

        let stranger = Rc::new(Titled("same", 1));
        assert!(!index.delete_entry(&stranger));
        assert_eq!(index.len(), 3);
    }

    impl IndexKey for String {
        fn index_key(&self) -> &str {
            self
        }
    }

    /// Runs `check` on a thread whose stack is far too small for recursion
    /// proportional to tree height
    fn on_small_stack(check: impl FnOnce() + Send + 'static) {
        let handle = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(check)
            .unwrap_or_else(|_| panic!("spawn"));
        assert!(handle.join().is_ok());
    }

    #[test]
    fn test_degenerate_tree_operations_do_not_recurse() {
        on_small_stack(|| {
            const DEPTH: usize = 8_000;
            let keys: Vec<Rc<String>> =
                (0..DEPTH).map(|i| Rc::new(format!("title{i:07}"))).collect();

            // Ascending inserts build a right-leaning chain
            let mut index = OrderedIndex::new();
            for key in &keys {
                index.insert(Rc::clone(key));
            }
            assert_eq!(index.height(), DEPTH);
            assert!(index.search("TITLE0007999").is_some());

            assert!(index.delete("title0007999"));
            assert!(index.delete_entry(&keys[DEPTH / 2]));
            assert_eq!(index.len(), DEPTH - 2);
            assert_eq!(index.iter().count(), DEPTH - 2);
            drop(index);

            // Root with a left child and a left-leaning right subtree, so
            // deleting the root walks the whole chain to find its successor
            let mut index = OrderedIndex::new();
            index.insert(Rc::clone(&keys[1]));
            index.insert(Rc::clone(&keys[0]));
            for key in keys.iter().skip(2).rev() {
                index.insert(Rc::clone(key));
            }
            assert_eq!(index.height(), DEPTH - 1);
            assert!(index.delete_entry(&keys[1]));
            assert_eq!(index.iter().next().map(|key| key.as_str()), Some("title0000000"));
            assert_eq!(index.iter().nth(1).map(|key| key.as_str()), Some("title0000002"));
            assert_eq!(index.len(), DEPTH - 1);
        });
    }

    #[test]
    fn test_borrowed_index_iterates_in_order() {
        let index = index_of(&["kilo", "Alpha", "echo"]);
        let mut seen = Vec::new();
        for entry in &index {
            seen.push(entry.0);
        }
        assert_eq!(seen, vec!["Alpha", "echo", "kilo"]);
        let debug = format!("{index:?}");
        assert!(debug.starts_with(r#"OrderedIndex { entries: [Titled("Alpha", 1),"#));
        assert!(debug.ends_with(r#"Titled("kilo", 0)], len: 3, .. }"#));
    }

    #[test]
    fn test_sorted_input_degenerates() {
        let titles: Vec<&'static str> = vec!["a", "b", "c", "d", "e", "f"];
        let mut index = index_of(&titles);
        assert_eq!(index.height(), 6);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.height(), 0);
    }
}
