//! An unbalanced [binary search tree] holding each value at most once.
//!
//! Every operation walks the tree iteratively, so a degenerate tree (for
//! example one built from an ascending insert sequence) costs *O*(*n*) time per
//! operation but never exhausts the call stack.
//!
//! [binary search tree]: https://en.wikipedia.org/wiki/Binary_search_tree

use std::collections::VecDeque;
use std::fmt;

use core::cmp::Ordering;
use core::mem;

use crate::error::{Error, Result, UpdateRejection};

/// Creates a `BinarySearchTree` containing the arguments. Duplicates are
/// skipped.
///
/// # Examples
///
/// ```
/// use dsa_engine::prelude::*;
///
/// let tree = bst![50, 30, 70, 30];
/// assert_eq!(tree.len(), 3);
/// assert!(tree.iter().eq([&30, &50, &70]));
/// ```
#[macro_export]
macro_rules! bst {
    ($($elem:expr),* $(,)?) => {{
        let mut tree = $crate::collections::bst::BinarySearchTree::new();
        $(let _ = tree.insert($elem);)*
        tree
    }};
}

/// An unbalanced binary search tree holding each value at most once.
pub struct BinarySearchTree<T> {
    /// Root of the tree, `None` for the empty tree.
    root: Link<T>,
    /// Number of nodes in the tree.
    len: usize,
}

pub(crate) type Link<T> = Option<Box<Node<T>>>;

#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    fn leaf(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }
}

/// An in-order iterator over the values of a `BinarySearchTree<T>`.
#[derive(Debug)]
pub struct Iter<'a, T> {
    /// Nodes whose value and right subtree are still to be visited.
    stack: Vec<&'a Node<T>>,
    /// Number of values not yet yielded.
    remaining: usize,
}

impl<T> BinarySearchTree<T> {
    /// Creates a new, empty `BinarySearchTree`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let tree: BinarySearchTree<i32> = BinarySearchTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Returns the number of values in the tree.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no values.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of nodes on the longest root-to-leaf path, or 0 for
    /// the empty tree.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(*n*) time, visiting every node once level by level.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<&Node<T>> = self.root.as_deref().into_iter().collect();

        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|node| [node.left.as_deref(), node.right.as_deref()])
                .flatten()
                .collect();
        }

        height
    }

    /// Returns the smallest value in the tree.
    pub fn min(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.value)
    }

    /// Returns the largest value in the tree.
    pub fn max(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.value)
    }

    /// Returns an iterator over the values in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let tree = bst![2, 1, 3];
    /// assert!(tree.iter().eq([&1, &2, &3]));
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_deref(), self.len)
    }

    /// Returns the values in pre-order (node, left subtree, right subtree).
    pub fn preorder(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node<T>> = self.root.as_deref().into_iter().collect();

        while let Some(node) = stack.pop() {
            out.push(&node.value);
            stack.extend(node.right.as_deref());
            stack.extend(node.left.as_deref());
        }

        out
    }

    /// Returns the values in post-order (left subtree, right subtree, node).
    pub fn postorder(&self) -> Vec<&T> {
        // Reversed (node, right, left) order.
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node<T>> = self.root.as_deref().into_iter().collect();

        while let Some(node) = stack.pop() {
            out.push(&node.value);
            stack.extend(node.left.as_deref());
            stack.extend(node.right.as_deref());
        }

        out.reverse();
        out
    }

    /// Returns the values level by level, left to right.
    pub fn level_order(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len);
        let mut queue: VecDeque<&Node<T>> = self.root.as_deref().into_iter().collect();

        while let Some(node) = queue.pop_front() {
            out.push(&node.value);
            queue.extend(node.left.as_deref());
            queue.extend(node.right.as_deref());
        }

        out
    }

    /// Removes every value from the tree.
    pub fn clear(&mut self) {
        drop_iteratively(self.root.take());
        self.len = 0;
    }

    /// Hands the node structure over to another tree type.
    pub(crate) fn into_root(mut self) -> (Link<T>, usize) {
        let len = mem::take(&mut self.len);
        (self.root.take(), len)
    }
}

impl<T: Ord> BinarySearchTree<T> {
    /// Inserts `value` into the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if the value is already present; the
    /// tree is left unchanged.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(*h*) time, where *h* is the height of the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    /// use dsa_engine::error::Error;
    ///
    /// let mut tree = BinarySearchTree::new();
    /// assert!(tree.insert(10).is_ok());
    /// assert_eq!(tree.insert(10), Err(Error::DuplicateKey));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> Result<()> {
        let link = find_link(&mut self.root, &value);
        if link.is_some() {
            return Err(Error::DuplicateKey);
        }

        *link = Some(Box::new(Node::leaf(value)));
        self.len += 1;

        Ok(())
    }

    /// Returns `true` if the tree contains `value`.
    pub fn contains(&self, value: &T) -> bool {
        let mut link = self.root.as_deref();

        while let Some(node) = link {
            link = match value.cmp(&node.value) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return true,
            };
        }

        false
    }

    /// Removes `value` from the tree and returns it.
    ///
    /// A leaf is dropped, a node with one child is spliced out, and a node with
    /// two children takes the value of its in-order successor (the minimum of
    /// its right subtree), which is then unlinked from that subtree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the value is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let mut tree = bst![50, 30, 70, 60, 80];
    /// assert_eq!(tree.remove(&70), Ok(70));
    /// assert!(tree.iter().eq([&30, &50, &60, &80]));
    /// ```
    pub fn remove(&mut self, value: &T) -> Result<T> {
        let link = find_link(&mut self.root, value);
        let mut node = link.take().ok_or(Error::NotFound)?;

        let removed = match (node.left.take(), node.right.take()) {
            (None, None) => node.value,
            (Some(child), None) | (None, Some(child)) => {
                *link = Some(child);
                node.value
            }
            (Some(left), Some(right)) => {
                node.left = Some(left);
                node.right = Some(right);

                let successor = match take_min(&mut node.right) {
                    Some(successor) => successor,
                    None => unreachable!("right subtree is non-empty"),
                };
                let removed = mem::replace(&mut node.value, successor);

                *link = Some(node);
                removed
            }
        };

        self.len -= 1;

        Ok(removed)
    }

    /// Replaces `old` with `new`.
    ///
    /// The replacement must be strictly between the bounds that `old`'s
    /// ancestors impose on its position (`lower < new < upper`), so that
    /// substituting it in place could not break the ordering. The change itself
    /// is carried out as a removal followed by an insertion.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if `old` is absent.
    /// - [`Error::InvalidUpdateTarget`] if `new` is already present or falls
    ///   outside the ancestor bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let mut tree = bst![50, 30, 70];
    /// assert!(tree.update(&30, 40).is_ok());
    /// assert!(tree.update(&40, 60).is_err()); // must stay below 50
    /// assert!(tree.iter().eq([&40, &50, &70]));
    /// ```
    pub fn update(&mut self, old: &T, new: T) -> Result<()> {
        let (lower, upper) = ancestor_bounds(self.root.as_deref(), old)?;

        if self.contains(&new) {
            return Err(Error::InvalidUpdateTarget {
                reason: UpdateRejection::TargetExists,
            });
        }

        check_bounds(lower, upper, &new)?;

        self.remove(old)?;
        self.insert(new)
    }
}

/// Walks from `link` towards `value`, returning the link that holds it, or the
/// empty link where it would be attached.
fn find_link<'a, T: Ord>(mut link: &'a mut Link<T>, value: &T) -> &'a mut Link<T> {
    loop {
        let ord = match link.as_deref() {
            Some(node) => value.cmp(&node.value),
            None => break,
        };
        if ord == Ordering::Equal {
            break;
        }

        link = match link {
            Some(node) => {
                if ord == Ordering::Less {
                    &mut node.left
                } else {
                    &mut node.right
                }
            }
            None => break,
        };
    }

    link
}

/// Unlinks the leftmost node below `link` and returns its value.
fn take_min<T>(mut link: &mut Link<T>) -> Option<T> {
    loop {
        let has_left = link.as_deref().is_some_and(|node| node.left.is_some());
        if !has_left {
            break;
        }

        link = match link {
            Some(node) => &mut node.left,
            None => break,
        };
    }

    let node = link.take()?;
    let Node { value, right, .. } = *node;
    *link = right;

    Some(value)
}

/// Read access to the shape of a binary tree node, shared by the tree
/// engines.
pub(crate) trait BinaryNode<T> {
    fn value(&self) -> &T;
    fn left(&self) -> Option<&Self>;
    fn right(&self) -> Option<&Self>;
}

impl<T> BinaryNode<T> for Node<T> {
    fn value(&self) -> &T {
        &self.value
    }

    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }
}

/// Returns the strict `(lower, upper)` bounds that the ancestors of `value`
/// impose on its position.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `value` is not in the tree.
pub(crate) fn ancestor_bounds<'a, T: Ord, N: BinaryNode<T>>(
    mut link: Option<&'a N>,
    value: &T,
) -> Result<(Option<&'a T>, Option<&'a T>)> {
    let (mut lower, mut upper) = (None, None);

    while let Some(node) = link {
        link = match value.cmp(node.value()) {
            Ordering::Less => {
                upper = Some(node.value());
                node.left()
            }
            Ordering::Greater => {
                lower = Some(node.value());
                node.right()
            }
            Ordering::Equal => return Ok((lower, upper)),
        };
    }

    Err(Error::NotFound)
}

/// Checks that `new` lies strictly inside `(lower, upper)`.
pub(crate) fn check_bounds<T: Ord>(lower: Option<&T>, upper: Option<&T>, new: &T) -> Result<()> {
    let above_lower = lower.map_or(true, |lower| lower < new);
    let below_upper = upper.map_or(true, |upper| new < upper);

    if above_lower && below_upper {
        Ok(())
    } else {
        Err(Error::InvalidUpdateTarget {
            reason: UpdateRejection::OutOfOrder,
        })
    }
}

/// Drops a subtree without recursing, so degenerate chains cannot overflow
/// the stack.
fn drop_iteratively<T>(root: Link<T>) {
    let mut stack: Vec<Box<Node<T>>> = root.into_iter().collect();

    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

impl<'a, T> Iter<'a, T> {
    fn new(root: Option<&'a Node<T>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<&'a Node<T>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining -= 1;

        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a BinarySearchTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Drop for BinarySearchTree<T> {
    fn drop(&mut self) {
        drop_iteratively(self.root.take());
    }
}

impl<T> Default for BinarySearchTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Extend<T> for BinarySearchTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            let _ = self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for BinarySearchTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: fmt::Debug> fmt::Debug for BinarySearchTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> BinarySearchTree<i32> {
        [50, 30, 70, 20, 40, 60, 80].into_iter().collect()
    }

    fn assert_strictly_increasing(tree: &BinarySearchTree<i32>) {
        let values: Vec<_> = tree.iter().collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]), "{values:?}");
        assert_eq!(values.len(), tree.len());
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut tree = BinarySearchTree::new();

        assert_eq!(tree.insert(10), Ok(()));
        assert_eq!(tree.insert(10), Err(Error::DuplicateKey));
        assert_eq!(tree.len(), 1);
        assert!(tree.iter().eq([&10]));
    }

    #[test]
    fn test_traversals() {
        let tree = sample();

        assert!(tree.iter().eq([&20, &30, &40, &50, &60, &70, &80]));
        assert_eq!(tree.preorder(), [&50, &30, &20, &40, &70, &60, &80]);
        assert_eq!(tree.postorder(), [&20, &40, &30, &60, &80, &70, &50]);
        assert_eq!(tree.level_order(), [&50, &30, &70, &20, &40, &60, &80]);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.min(), Some(&20));
        assert_eq!(tree.max(), Some(&80));
    }

    #[test]
    fn test_remove_leaf_single_child_and_two_children() {
        let mut tree = sample();

        // Leaf.
        assert_eq!(tree.remove(&20), Ok(20));
        assert_strictly_increasing(&tree);
        assert!(!tree.contains(&20));

        // One child (40 remains under 30).
        assert_eq!(tree.remove(&30), Ok(30));
        assert_eq!(tree.preorder(), [&50, &40, &70, &60, &80]);

        // Two children: successor 60 replaces 50.
        assert_eq!(tree.remove(&50), Ok(50));
        assert_eq!(tree.preorder(), [&60, &40, &70, &80]);
        assert_strictly_increasing(&tree);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_remove_missing() {
        let mut tree = sample();
        assert_eq!(tree.remove(&55), Err(Error::NotFound));
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_remove_sole_root_yields_empty_tree() {
        let mut tree = bst![5];
        assert_eq!(tree.remove(&5), Ok(5));
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.iter().next(), None);

        assert!(tree.insert(9).is_ok());
        assert!(tree.iter().eq([&9]));
    }

    #[test]
    fn test_update() {
        let mut tree = sample();

        assert_eq!(tree.update(&40, 45), Ok(()));
        assert!(tree.contains(&45));
        assert!(!tree.contains(&40));

        assert_eq!(tree.update(&99, 1), Err(Error::NotFound));
        assert_eq!(
            tree.update(&45, 60),
            Err(Error::InvalidUpdateTarget {
                reason: UpdateRejection::TargetExists
            })
        );
        // 45 sits between 30 and 50.
        assert_eq!(
            tree.update(&45, 55),
            Err(Error::InvalidUpdateTarget {
                reason: UpdateRejection::OutOfOrder
            })
        );
        // The bounds are strict.
        assert_eq!(
            tree.update(&45, 50),
            Err(Error::InvalidUpdateTarget {
                reason: UpdateRejection::TargetExists
            })
        );
        assert_strictly_increasing(&tree);
    }

    #[test]
    fn test_update_root_is_unbounded() {
        let mut tree = sample();
        assert_eq!(tree.update(&50, 1000), Ok(()));
        assert_strictly_increasing(&tree);
        assert!(tree.contains(&1000));
    }

    #[test]
    fn test_degenerate_chain() {
        let mut tree: BinarySearchTree<u32> = (0..10_000).collect();
        assert_eq!(tree.len(), 10_000);
        assert_eq!(tree.height(), 10_000);
        assert!(tree.contains(&9_999));
        assert_eq!(tree.remove(&0), Ok(0));
        assert_eq!(tree.iter().count(), 9_999);
        // Dropping the chain must not overflow the stack.
    }

    #[test]
    fn test_random_operations_keep_order() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut tree = BinarySearchTree::new();
        let mut model = std::collections::BTreeSet::new();

        for _ in 0..2_000 {
            let value = rng.i32(0..200);
            if rng.bool() {
                assert_eq!(tree.insert(value).is_ok(), model.insert(value));
            } else {
                assert_eq!(tree.remove(&value).is_ok(), model.remove(&value));
            }
        }

        assert_strictly_increasing(&tree);
        assert!(tree.iter().eq(model.iter()));
    }

    #[test]
    fn test_debug() {
        let tree = bst![2, 1, 3];
        assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
    }
}
