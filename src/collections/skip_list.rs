//! A [skip list] holding each value at most once.
//!
//! Nodes are linked at level 0 and promoted to each further level with a fixed
//! probability, which gives expected *O*(log *n*) search, insertion and
//! removal. The random source is owned by the list and can be injected, so the
//! level structure is reproducible under a fixed seed.
//!
//! [skip list]: https://en.wikipedia.org/wiki/Skip_list

use std::fmt;

use core::marker::PhantomData;
use core::ptr::NonNull;

use tracing::trace;

use crate::config::SkipListConfig;
use crate::error::{Error, Result, UpdateRejection};

/// Creates a `SkipList` containing the arguments. Duplicates are skipped.
///
/// # Examples
///
/// ```
/// use dsa_engine::prelude::*;
///
/// let list = skip_list![5, 3, 8, 3];
/// assert_eq!(list.len(), 3);
/// assert!(list.iter().eq([&3, &5, &8]));
/// ```
#[macro_export]
macro_rules! skip_list {
    ($($elem:expr),* $(,)?) => {{
        let mut list = $crate::collections::skip_list::SkipList::new();
        $(let _ = list.insert($elem);)*
        list
    }};
}

type Link<T> = Option<NonNull<Node<T>>>;

/// A probabilistic ordered set of values.
pub struct SkipList<T> {
    /// Forward links of the head sentinel, one per level up to `max_level`.
    head: Vec<Link<T>>,
    /// Highest level currently in use, 0 for an empty list.
    level: usize,
    /// Number of values in the list.
    len: usize,
    /// Number of levels a node may be linked at.
    max_level: usize,
    /// Chance of promoting a node one level further.
    promotion_probability: f64,
    /// Source of the promotion trials.
    rng: fastrand::Rng,
    /// The list owns its nodes and their values.
    _marker: PhantomData<Box<Node<T>>>,
}

struct Node<T> {
    value: T,
    /// One forward link per level the node is linked at.
    forward: Vec<Link<T>>,
}

impl<T> Node<T> {
    /// Forward link of `node` at `level`.
    ///
    /// # Safety
    ///
    /// `node` must point to a live node linked at `level`.
    unsafe fn next_at(node: NonNull<Self>, level: usize) -> Link<T> {
        let node = &*node.as_ptr();
        node.forward[level]
    }

    /// Points the forward link of `node` at `level` to `next`.
    ///
    /// # Safety
    ///
    /// `node` must point to a live node linked at `level`, with no other
    /// reference to it outstanding.
    unsafe fn link_at(node: NonNull<Self>, level: usize, next: Link<T>) {
        let node = &mut *node.as_ptr();
        node.forward[level] = next;
    }
}

/// An iterator over the values of a `SkipList<T>` in ascending order.
#[derive(Debug)]
pub struct Iter<'a, T> {
    next: Link<T>,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<T> SkipList<T> {
    /// Creates an empty list with the default parameters and a randomly
    /// seeded generator.
    pub fn new() -> Self {
        let config = SkipListConfig::default();
        Self::from_parts(config.max_level, config.promotion_probability, fastrand::Rng::new())
    }

    /// Creates an empty list from `config`, seeding the generator from
    /// `config.seed` when set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the parameters are out of range.
    pub fn with_config(config: &SkipListConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self::with_rng(config, rng)
    }

    /// Creates an empty list from `config` that draws node levels from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the parameters are out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::config::SkipListConfig;
    /// use dsa_engine::prelude::*;
    ///
    /// let config = SkipListConfig::default();
    /// let mut a = SkipList::with_rng(&config, fastrand::Rng::with_seed(1)).unwrap();
    /// let mut b = SkipList::with_rng(&config, fastrand::Rng::with_seed(1)).unwrap();
    /// for value in 0..100 {
    ///     a.insert(value).unwrap();
    ///     b.insert(value).unwrap();
    /// }
    /// assert_eq!(a.levels(), b.levels());
    /// ```
    pub fn with_rng(config: &SkipListConfig, rng: fastrand::Rng) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(
            config.max_level,
            config.promotion_probability,
            rng,
        ))
    }

    fn from_parts(max_level: usize, promotion_probability: f64, rng: fastrand::Rng) -> Self {
        Self {
            head: vec![None; max_level],
            level: 0,
            len: 0,
            max_level,
            promotion_probability,
            rng,
            _marker: PhantomData,
        }
    }

    /// Returns the number of values in the list.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no values.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the highest level currently in use.
    #[inline]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Returns an iterator over the values in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head[0],
            remaining: self.len,
            _marker: PhantomData,
        }
    }

    /// Returns the values linked at each level, from level 0 up to the highest
    /// level in use.
    pub fn levels(&self) -> Vec<Vec<&T>> {
        (0..=self.level)
            .map(|level| {
                let mut values = Vec::new();
                let mut link = self.head[level];
                while let Some(node) = link {
                    // SAFETY: every linked node is owned by the list and lives
                    // as long as `&self`.
                    unsafe {
                        values.push(&(*node.as_ptr()).value);
                        link = Node::next_at(node, level);
                    }
                }
                values
            })
            .collect()
    }

    /// Removes every value from the list.
    pub fn clear(&mut self) {
        let mut link = self.head[0];
        while let Some(node) = link {
            // SAFETY: level 0 links every node exactly once.
            unsafe {
                let boxed_node = Box::from_raw(node.as_ptr());
                link = boxed_node.forward[0];
            }
        }

        self.head.iter_mut().for_each(|link| *link = None);
        self.level = 0;
        self.len = 0;
    }

    /// Draws a level by repeated Bernoulli trials, capped at `max_level - 1`.
    fn random_level(&mut self) -> usize {
        let mut level = 0;
        while level + 1 < self.max_level && self.rng.f64() < self.promotion_probability {
            level += 1;
        }
        level
    }

    /// Forward link of `pred` at `level`, where `None` stands for the head.
    #[inline]
    fn next_of(&self, pred: Link<T>, level: usize) -> Link<T> {
        match pred {
            None => self.head[level],
            // SAFETY: `pred` is a node linked into this list.
            Some(node) => unsafe { Node::next_at(node, level) },
        }
    }

    #[inline]
    fn set_next(&mut self, pred: Link<T>, level: usize, next: Link<T>) {
        match pred {
            None => self.head[level] = next,
            // SAFETY: `pred` is a node linked into this list at `level`.
            Some(node) => unsafe { Node::link_at(node, level, next) },
        }
    }
}

impl<T: Ord> SkipList<T> {
    /// Descends from the top level, recording at each level the last node
    /// whose value is less than `value`. Levels above the current top record
    /// the head.
    fn find_predecessors(&self, value: &T) -> Vec<Link<T>> {
        let mut update = vec![None; self.max_level];
        let mut curr: Link<T> = None;

        for level in (0..=self.level).rev() {
            while let Some(next) = self.next_of(curr, level) {
                // SAFETY: `next` is linked into this list.
                if unsafe { &(*next.as_ptr()).value } < value {
                    curr = Some(next);
                } else {
                    break;
                }
            }
            update[level] = curr;
        }

        update
    }

    /// Returns the level-0 successor of `pred` if it holds `value`.
    fn matching_successor(&self, pred: Link<T>, value: &T) -> Link<T> {
        self.next_of(pred, 0)
            // SAFETY: the successor is linked into this list.
            .filter(|node| unsafe { &(*node.as_ptr()).value } == value)
    }

    /// Inserts `value` into the list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if the value is already present.
    ///
    /// # Time Complexity
    ///
    /// Takes expected *O*(log *n*) time.
    pub fn insert(&mut self, value: T) -> Result<()> {
        let update = self.find_predecessors(&value);
        if self.matching_successor(update[0], &value).is_some() {
            return Err(Error::DuplicateKey);
        }

        let level = self.random_level();
        if level > self.level {
            trace!(from = self.level, to = level, "raising skip list level");
            self.level = level;
        }

        // SAFETY: `Box::into_raw` never returns null.
        let node = unsafe {
            NonNull::new_unchecked(Box::into_raw(Box::new(Node {
                value,
                forward: vec![None; level + 1],
            })))
        };

        for (i, &pred) in update.iter().enumerate().take(level + 1) {
            let next = self.next_of(pred, i);
            // SAFETY: `node` was just allocated and is exclusively ours.
            unsafe { Node::link_at(node, i, next) };
            self.set_next(pred, i, Some(node));
        }

        self.len += 1;

        Ok(())
    }

    /// Returns `true` if the list contains `value`.
    ///
    /// # Time Complexity
    ///
    /// Takes expected *O*(log *n*) time.
    pub fn contains(&self, value: &T) -> bool {
        let update = self.find_predecessors(value);
        self.matching_successor(update[0], value).is_some()
    }

    /// Removes `value` from the list and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the value is absent.
    ///
    /// # Time Complexity
    ///
    /// Takes expected *O*(log *n*) time.
    pub fn remove(&mut self, value: &T) -> Result<T> {
        let update = self.find_predecessors(value);
        let target = self
            .matching_successor(update[0], value)
            .ok_or(Error::NotFound)?;

        for (i, &pred) in update.iter().enumerate().take(self.level + 1) {
            if self.next_of(pred, i) == Some(target) {
                // SAFETY: `target` is linked at level `i`.
                let next = unsafe { Node::next_at(target, i) };
                self.set_next(pred, i, next);
            }
        }

        // SAFETY: `target` is now unlinked from every level.
        let boxed_node = unsafe { Box::from_raw(target.as_ptr()) };

        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
            trace!(to = self.level, "lowering skip list level");
        }

        self.len -= 1;

        Ok(boxed_node.value)
    }

    /// Replaces `old` with `new`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if `old` is absent.
    /// - [`Error::InvalidUpdateTarget`] if `new` is already present.
    pub fn update(&mut self, old: &T, new: T) -> Result<()> {
        if !self.contains(old) {
            return Err(Error::NotFound);
        }
        if self.contains(&new) {
            return Err(Error::InvalidUpdateTarget {
                reason: UpdateRejection::TargetExists,
            });
        }

        self.remove(old)?;
        self.insert(new)
    }
}

impl<T> Drop for SkipList<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for SkipList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Extend<T> for SkipList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            let _ = self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for SkipList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T: fmt::Debug> fmt::Debug for SkipList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| unsafe {
            // SAFETY: the iterator borrows the list, so the node outlives 'a.
            let node = &*node.as_ptr();
            self.next = node.forward[0];
            self.remaining -= 1;
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a SkipList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
