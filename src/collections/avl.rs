//! A height-balanced [AVL tree] holding each value at most once.
//!
//! Every node records the height of its subtree. After an insertion or removal
//! the heights along the modified path are recomputed bottom-up, and the first
//! ancestor whose [balance factor] leaves `-1..=1` is restored with a single or
//! double rotation. The walk continues to the root, so every ancestor ends up
//! with a correct height.
//!
//! [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
//! [balance factor]: https://en.wikipedia.org/wiki/AVL_tree#Balance_factor

use std::fmt;

use core::cmp::{self, Ordering};
use core::mem;

use tracing::trace;

use super::bst::{self, ancestor_bounds, check_bounds, BinaryNode, BinarySearchTree};
use crate::error::{Error, Result, UpdateRejection};

/// Creates an `AvlTree` containing the arguments. Duplicates are skipped.
///
/// # Examples
///
/// ```
/// use dsa_engine::prelude::*;
///
/// let tree = avl![1, 2, 3, 4, 5, 6, 7];
/// assert_eq!(tree.height(), 3);
/// assert!(tree.is_balanced());
/// ```
#[macro_export]
macro_rules! avl {
    ($($elem:expr),* $(,)?) => {{
        let mut tree = $crate::collections::avl::AvlTree::new();
        $(let _ = tree.insert($elem);)*
        tree
    }};
}

/// A height-balanced binary search tree holding each value at most once.
pub struct AvlTree<T> {
    /// Root of the tree, `None` for the empty tree.
    root: Link<T>,
    /// Number of nodes in the tree.
    len: usize,
    /// `false` only for a tree adopted from an unbalanced shape that has not
    /// been rebuilt yet.
    balanced: bool,
}

type Link<T> = Option<Box<Node<T>>>;

#[derive(Debug)]
struct Node<T> {
    value: T,
    /// Number of nodes on the longest path down to a leaf, 1 for a leaf.
    height: usize,
    left: Link<T>,
    right: Link<T>,
}

/// An in-order iterator over the values of an `AvlTree<T>`.
#[derive(Debug)]
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
    remaining: usize,
}

#[inline]
fn height<T>(link: &Link<T>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

impl<T> Node<T> {
    fn new(value: T, left: Link<T>, right: Link<T>) -> Box<Self> {
        let mut node = Box::new(Self {
            value,
            height: 1,
            left,
            right,
        });
        node.update_height();
        node
    }

    #[inline]
    fn update_height(&mut self) {
        self.height = 1 + cmp::max(height(&self.left), height(&self.right));
    }

    /// Height of the left subtree minus height of the right subtree.
    #[inline]
    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
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

/// Rotates the edge between `y` and its left child `x` so that `x` becomes the
/// subtree root and `y` its right child.
///
/// ```text
///       y            x
///      / \          / \
///     x   C  =>    A   y
///    / \              / \
///   A   B            B   C
/// ```
///
/// # Panics
///
/// `y` must have a left child. Only [`rebalance`] calls this, after the
/// balance factor proved the left subtree is taller than the right one.
fn rotate_right<T>(mut y: Box<Node<T>>) -> Box<Node<T>> {
    let mut x = y
        .left
        .take()
        .expect("right rotation requires a left child");

    y.left = x.right.take();
    y.update_height();

    x.right = Some(y);
    x.update_height();

    x
}

/// Mirror of [`rotate_right`].
///
/// # Panics
///
/// `x` must have a right child.
fn rotate_left<T>(mut x: Box<Node<T>>) -> Box<Node<T>> {
    let mut y = x
        .right
        .take()
        .expect("left rotation requires a right child");

    x.right = y.left.take();
    x.update_height();

    y.left = Some(x);
    y.update_height();

    y
}

/// Recomputes the height of `node` and, if its balance factor left
/// `-1..=1`, applies the rotation matching the shape of the taller side.
fn rebalance<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    node.update_height();
    let factor = node.balance_factor();

    if factor > 1 {
        let left_factor = node.left.as_ref().map_or(0, |left| left.balance_factor());
        if left_factor < 0 {
            trace!(factor, "left-right case");
            node.left = node.left.take().map(rotate_left);
        } else {
            trace!(factor, "left-left case");
        }
        rotate_right(node)
    } else if factor < -1 {
        let right_factor = node.right.as_ref().map_or(0, |right| right.balance_factor());
        if right_factor > 0 {
            trace!(factor, "right-left case");
            node.right = node.right.take().map(rotate_right);
        } else {
            trace!(factor, "right-right case");
        }
        rotate_left(node)
    } else {
        node
    }
}

/// Inserts `value`, which must be absent, below `link`.
fn insert_into<T: Ord>(link: Link<T>, value: T) -> Box<Node<T>> {
    match link {
        None => Node::new(value, None, None),
        Some(mut node) => {
            if value < node.value {
                node.left = Some(insert_into(node.left.take(), value));
            } else {
                node.right = Some(insert_into(node.right.take(), value));
            }
            rebalance(node)
        }
    }
}

/// Removes `value`, which must be present, from the subtree rooted at `node`.
fn remove_from<T: Ord>(mut node: Box<Node<T>>, value: &T, removed: &mut Option<T>) -> Link<T> {
    match value.cmp(&node.value) {
        Ordering::Less => {
            node.left = node
                .left
                .take()
                .and_then(|left| remove_from(left, value, removed));
        }
        Ordering::Greater => {
            node.right = node
                .right
                .take()
                .and_then(|right| remove_from(right, value, removed));
        }
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, None) => {
                *removed = Some(node.value);
                return None;
            }
            (Some(child), None) | (None, Some(child)) => {
                *removed = Some(node.value);
                return Some(child);
            }
            (Some(left), Some(right)) => {
                let (successor, rest) = take_min(right);
                node.left = Some(left);
                node.right = rest;
                *removed = Some(mem::replace(&mut node.value, successor));
            }
        },
    }

    Some(rebalance(node))
}

/// Unlinks the minimum of the subtree rooted at `node`, returning it together
/// with the rebalanced remainder of the subtree.
fn take_min<T>(mut node: Box<Node<T>>) -> (T, Link<T>) {
    match node.left.take() {
        None => {
            let Node { value, right, .. } = *node;
            (value, right)
        }
        Some(left) => {
            let (min, rest) = take_min(left);
            node.left = rest;
            (min, Some(rebalance(node)))
        }
    }
}

/// Builds a minimum-height tree from `len` ascending values, choosing the
/// middle element as the root of every subtree.
fn build_balanced<T>(values: &mut impl Iterator<Item = T>, len: usize) -> Link<T> {
    if len == 0 {
        return None;
    }

    let left_len = (len - 1) / 2;
    let left = build_balanced(values, left_len);
    let value = values.next()?;
    let right = build_balanced(values, len - left_len - 1);

    Some(Node::new(value, left, right))
}

/// Moves every value out of the tree in ascending order, without recursing.
fn into_sorted_vec<T>(root: Link<T>, len: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(len);
    let mut stack: Vec<Box<Node<T>>> = Vec::new();
    let mut curr = root;

    loop {
        while let Some(mut node) = curr {
            curr = node.left.take();
            stack.push(node);
        }

        let Some(node) = stack.pop() else {
            break;
        };

        let Node { value, right, .. } = *node;
        out.push(value);
        curr = right;
    }

    out
}

impl<T> AvlTree<T> {
    /// Creates a new, empty `AvlTree`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            root: None,
            len: 0,
            balanced: true,
        }
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

    /// Returns the height of the tree, 0 when empty.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(1) time; every node stores its height.
    #[inline]
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Returns an iterator over the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: self.len,
        };
        iter.push_left_spine(self.root.as_deref());
        iter
    }

    /// Returns the values in pre-order, which identifies the shape of the
    /// tree.
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

    /// Returns `true` if every node has correct height bookkeeping and a
    /// balance factor within `-1..=1`.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(*n*) time.
    pub fn is_balanced(&self) -> bool {
        let mut stack: Vec<&Node<T>> = self.root.as_deref().into_iter().collect();

        while let Some(node) = stack.pop() {
            let expected = 1 + cmp::max(height(&node.left), height(&node.right));
            if node.height != expected || node.balance_factor().abs() > 1 {
                return false;
            }

            stack.extend(node.left.as_deref());
            stack.extend(node.right.as_deref());
        }

        true
    }

    /// Rebuilds the tree into minimum height if any node violates the AVL
    /// invariant. Returns `true` if the tree was rebuilt, `false` if it was
    /// already balanced.
    ///
    /// The rebuild collects the values in order and recursively picks the
    /// middle value as each subtree's root, which yields a height of
    /// ⌈log2(*n* + 1)⌉.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let chain: BinarySearchTree<i32> = (1..=7).collect();
    /// let mut tree = AvlTree::from(chain);
    /// assert_eq!(tree.height(), 7);
    ///
    /// assert!(tree.balance());
    /// assert_eq!(tree.height(), 3);
    /// assert!(!tree.balance());
    /// ```
    pub fn balance(&mut self) -> bool {
        if self.is_balanced() {
            self.balanced = true;
            return false;
        }

        trace!(len = self.len, height = self.height(), "rebuilding tree");

        let values = into_sorted_vec(self.root.take(), self.len);
        self.root = build_balanced(&mut values.into_iter(), self.len);
        self.balanced = true;

        true
    }

    /// Removes every value from the tree.
    pub fn clear(&mut self) {
        drop_iteratively(self.root.take());
        self.len = 0;
        self.balanced = true;
    }

    /// Rebuilds an adopted unbalanced shape before a mutation walks it, which
    /// keeps the recursive mutation paths logarithmic.
    fn ensure_balanced(&mut self) {
        if !self.balanced {
            self.balance();
        }
    }
}

impl<T: Ord> AvlTree<T> {
    /// Inserts `value`, rebalancing along the insertion path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if the value is already present.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(log *n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let mut tree = AvlTree::new();
    /// for value in [50, 30, 70, 20, 40, 60, 80] {
    ///     tree.insert(value).unwrap();
    /// }
    /// assert!(tree.iter().eq([&20, &30, &40, &50, &60, &70, &80]));
    /// assert!(tree.is_balanced());
    /// ```
    pub fn insert(&mut self, value: T) -> Result<()> {
        if self.contains(&value) {
            return Err(Error::DuplicateKey);
        }

        self.ensure_balanced();
        self.root = Some(insert_into(self.root.take(), value));
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

    /// Removes `value` and returns it, rebalancing along the removal path.
    ///
    /// A node with two children takes the value of its in-order successor,
    /// which is then removed from the right subtree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the value is absent.
    pub fn remove(&mut self, value: &T) -> Result<T> {
        if !self.contains(value) {
            return Err(Error::NotFound);
        }

        self.ensure_balanced();

        let mut removed = None;
        self.root = self
            .root
            .take()
            .and_then(|root| remove_from(root, value, &mut removed));

        let removed = removed.ok_or(Error::NotFound)?;
        self.len -= 1;

        Ok(removed)
    }

    /// Replaces `old` with `new`, under the same rules as
    /// [`BinarySearchTree::update`]: `new` must be absent and strictly inside
    /// the bounds set by `old`'s ancestors.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if `old` is absent.
    /// - [`Error::InvalidUpdateTarget`] if `new` is present or out of bounds.
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

impl<T> From<BinarySearchTree<T>> for AvlTree<T> {
    /// Adopts the shape of `tree` as is, computing the height of every node.
    /// The result is not rebalanced; see [`AvlTree::balance`].
    fn from(tree: BinarySearchTree<T>) -> Self {
        enum Frame<T> {
            Visit(bst::Link<T>),
            Build(T),
        }

        let (root, len) = tree.into_root();

        // Post-order conversion with an explicit stack: children are finished
        // before their parent is built.
        let mut frames = vec![Frame::Visit(root)];
        let mut built: Vec<Link<T>> = Vec::new();

        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Visit(None) => built.push(None),
                Frame::Visit(Some(node)) => {
                    let bst::Node { value, left, right } = *node;
                    frames.push(Frame::Build(value));
                    frames.push(Frame::Visit(right));
                    frames.push(Frame::Visit(left));
                }
                Frame::Build(value) => {
                    let right = built.pop().flatten();
                    let left = built.pop().flatten();
                    built.push(Some(Node::new(value, left, right)));
                }
            }
        }

        let mut avl = Self {
            root: built.pop().flatten(),
            len,
            balanced: true,
        };
        avl.balanced = avl.is_balanced();
        avl
    }
}

/// Drops a subtree without recursing.
fn drop_iteratively<T>(root: Link<T>) {
    let mut stack: Vec<Box<Node<T>>> = root.into_iter().collect();

    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

impl<'a, T> Iter<'a, T> {
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

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Drop for AvlTree<T> {
    fn drop(&mut self) {
        drop_iteratively(self.root.take());
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            let _ = self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn check(tree: &AvlTree<i32>) {
        assert!(tree.is_balanced(), "unbalanced: {:?}", tree.preorder());
        let values: Vec<_> = tree.iter().collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]), "{values:?}");
        assert_eq!(values.len(), tree.len());
    }

    #[test]
    fn test_insert_balanced_sequence() {
        let tree: AvlTree<i32> = [50, 30, 70, 20, 40, 60, 80].into_iter().collect();

        check(&tree);
        assert!(tree.iter().eq([&20, &30, &40, &50, &60, &70, &80]));
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn test_left_left_rotation() {
        let tree = avl![30, 20, 10];
        assert_eq!(tree.preorder(), [&20, &10, &30]);
        check(&tree);
    }

    #[test]
    fn test_right_right_rotation() {
        let tree = avl![10, 20, 30];
        assert_eq!(tree.preorder(), [&20, &10, &30]);
        check(&tree);
    }

    #[test]
    fn test_left_right_rotation() {
        let tree = avl![30, 10, 20];
        assert_eq!(tree.preorder(), [&20, &10, &30]);
        check(&tree);
    }

    #[test]
    fn test_right_left_rotation() {
        let tree = avl![10, 30, 20];
        assert_eq!(tree.preorder(), [&20, &10, &30]);
        check(&tree);
    }

    #[test]
    fn test_duplicate_insert() {
        let mut tree = avl![1, 2, 3];
        assert_eq!(tree.insert(2), Err(Error::DuplicateKey));
        assert_eq!(tree.len(), 3);
        check(&tree);
    }

    #[test]
    fn test_remove_rebalances() {
        let mut tree = avl![20, 10, 30, 40];

        // Removing 10 leaves 20 right-heavy: right-right case.
        assert_eq!(tree.remove(&10), Ok(10));
        assert_eq!(tree.preorder(), [&30, &20, &40]);
        check(&tree);

        let mut tree = avl![20, 10, 30, 25];

        // Right-left case after the removal.
        assert_eq!(tree.remove(&10), Ok(10));
        assert_eq!(tree.preorder(), [&25, &20, &30]);
        check(&tree);
    }

    #[test]
    fn test_remove_two_children_uses_successor() {
        let mut tree = avl![50, 30, 70, 20, 40, 60, 80];

        assert_eq!(tree.remove(&50), Ok(50));
        assert_eq!(tree.preorder()[0], &60);
        assert!(!tree.contains(&50));
        check(&tree);
    }

    #[test]
    fn test_remove_sole_root() {
        let mut tree = avl![42];

        assert_eq!(tree.remove(&42), Ok(42));
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.remove(&42), Err(Error::NotFound));

        tree.insert(7).unwrap();
        assert!(tree.iter().eq([&7]));
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_update() {
        let mut tree = avl![50, 30, 70, 20, 40, 60, 80];

        assert_eq!(tree.update(&20, 25), Ok(()));
        assert!(tree.contains(&25) && !tree.contains(&20));
        assert_eq!(
            tree.update(&25, 45),
            Err(Error::InvalidUpdateTarget {
                reason: UpdateRejection::OutOfOrder
            })
        );
        assert_eq!(
            tree.update(&25, 30),
            Err(Error::InvalidUpdateTarget {
                reason: UpdateRejection::TargetExists
            })
        );
        assert_eq!(tree.update(&1, 2), Err(Error::NotFound));
        check(&tree);
    }

    #[test]
    fn test_balance_rebuilds_adopted_chain() {
        let chain: BinarySearchTree<i32> = (1..=15).collect();
        let mut tree = AvlTree::from(chain);

        assert_eq!(tree.len(), 15);
        assert_eq!(tree.height(), 15);
        assert!(!tree.is_balanced());

        assert!(tree.balance());
        check(&tree);
        assert_eq!(tree.height(), 4);
        assert_eq!(tree.preorder()[0], &8);

        // Already balanced: no-op.
        assert!(!tree.balance());
    }

    #[test]
    fn test_mutation_on_adopted_shape() {
        let chain: BinarySearchTree<i32> = (0..1_000).collect();
        let mut tree = AvlTree::from(chain);

        tree.insert(-1).unwrap();
        check(&tree);
        assert_eq!(tree.len(), 1_001);
    }

    #[test]
    fn test_random_operations() {
        let mut rng = fastrand::Rng::with_seed(0xA71);
        let mut tree = AvlTree::new();
        let mut model = std::collections::BTreeSet::new();

        for _ in 0..5_000 {
            let value = rng.i32(0..500);
            if rng.u8(0..3) > 0 {
                assert_eq!(tree.insert(value).is_ok(), model.insert(value));
            } else {
                assert_eq!(tree.remove(&value).is_ok(), model.remove(&value));
            }
        }

        check(&tree);
        assert!(tree.iter().eq(model.iter()));
        // An AVL tree of n nodes is at most ~1.44 log2(n + 2) high.
        let bound = (1.45 * ((tree.len() + 2) as f64).log2()).ceil() as usize;
        assert!(tree.height() <= bound);
    }

    #[test]
    fn test_ascending_inserts_stay_logarithmic() {
        let tree: AvlTree<i32> = (0..1_023).collect();
        check(&tree);
        assert_eq!(tree.height(), 10);
    }
}
