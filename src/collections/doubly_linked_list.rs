//! A doubly-linked list with owned nodes.
//!
//! Only `next` links own their nodes; `prev` links are back-references kept in
//! lockstep with them. Positional access walks from whichever end is closer to
//! the requested index.
//!
//! Using [Learn Rust With Entirely Too Many Linked Lists]
//!
//! [Learn Rust With Entirely Too Many Linked Lists]: https://rust-unofficial.github.io/too-many-lists/

use std::fmt;

use core::marker;
use core::mem;
use core::ptr::NonNull;

use tracing::trace;

use crate::error::{Error, Result};

/// Creates a `DoublyLinked` containing the arguments.
///
/// # Examples
///
/// ```
/// use dsa_engine::prelude::*;
///
/// let list = doubly![1 => 2 => 3];
/// assert_eq!(list.len(), 3);
/// assert!(list.iter().rev().eq([&3, &2, &1]));
/// ```
#[macro_export]
macro_rules! doubly {
    () => {
        $crate::collections::doubly_linked_list::DoublyLinked::new()
    };
    ($($elem:expr)=>*) => {{
        let mut list = $crate::collections::doubly_linked_list::DoublyLinked::new();
        $(list.push_back($elem);)*
        list
    }};
}

/// A doubly-linked list with owned nodes.
pub struct DoublyLinked<T> {
    /// Pointer to the head of the list.
    head: Option<NonNull<Node<T>>>,
    /// Pointer to the tail of the list.
    tail: Option<NonNull<Node<T>>>,
    /// Number of initialized nodes.
    len: usize,
    /// In order to tell the drop checker that we do own values of type T, and
    /// therefore may drop some T's when we drop.
    _marker: marker::PhantomData<T>,
}

#[derive(Debug)]
struct Node<T> {
    /// Pointer to the next node in sequence.
    next: Option<NonNull<Node<T>>>,
    /// Pointer to the previous node in sequence.
    prev: Option<NonNull<Node<T>>>,
    /// The node's data.
    elem: T,
}

/// An iterator that borrows a `DoublyLinked<T>` immutably.
#[derive(Debug)]
pub struct Iter<'a, T> {
    /// Pointer to the head of the list.
    head: Option<NonNull<Node<T>>>,
    /// Pointer to the tail of the list.
    tail: Option<NonNull<Node<T>>>,
    /// Number of nodes not yet yielded.
    len: usize,
    _marker: marker::PhantomData<&'a T>,
}

impl<T> DoublyLinked<T> {
    /// Constructs a new, empty `DoublyLinked<T>`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            _marker: marker::PhantomData,
        }
    }

    /// Returns an immutable reference to the first element, or [`None`] if the
    /// list is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        unsafe { self.head.map(|head| &(*head.as_ptr()).elem) }
    }

    /// Returns an immutable reference to the last element, or [`None`] if the
    /// list is empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        unsafe { self.tail.map(|tail| &(*tail.as_ptr()).elem) }
    }

    /// Prepends an element to the front of the list.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(1) time.
    pub fn push_front(&mut self, elem: T) {
        unsafe {
            let new_node = NonNull::new_unchecked(Box::into_raw(Box::new(Node {
                next: None,
                prev: None,
                elem,
            })));

            if let Some(head) = self.head {
                // There is at least a valid `head` node.
                (*head.as_ptr()).prev = Some(new_node);
                (*new_node.as_ptr()).next = self.head;
            } else {
                self.tail = Some(new_node);
            }

            self.head = Some(new_node);
            self.len += 1;
        }
    }

    /// Appends an element to the back of the list.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(1) time.
    pub fn push_back(&mut self, elem: T) {
        unsafe {
            let new_node = NonNull::new_unchecked(Box::into_raw(Box::new(Node {
                next: None,
                prev: None,
                elem,
            })));

            if let Some(tail) = self.tail {
                // There is at least a valid `tail` node.
                (*tail.as_ptr()).next = Some(new_node);
                (*new_node.as_ptr()).prev = self.tail;
            } else {
                self.head = Some(new_node);
            }

            self.tail = Some(new_node);
            self.len += 1;
        }
    }

    /// Removes the first element and returns it, or [`None`] if the list is
    /// empty.
    pub fn pop_front(&mut self) -> Option<T> {
        // SAFETY: the head is a node of this list.
        self.head.map(|head| unsafe { self.unlink(head) })
    }

    /// Removes the last element and returns it, or [`None`] if the list is
    /// empty.
    pub fn pop_back(&mut self) -> Option<T> {
        // SAFETY: the tail is a node of this list.
        self.tail.map(|tail| unsafe { self.unlink(tail) })
    }

    /// Inserts an element so that it ends up at `idx`. An `idx` equal to the
    /// length appends.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] if `idx` is greater than the length.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(min(*idx*, *len* - *idx*)) time.
    pub fn insert_at(&mut self, elem: T, idx: usize) -> Result<()> {
        if idx > self.len {
            return Err(Error::InvalidPosition {
                position: idx,
                len: self.len,
            });
        }

        if idx == 0 {
            self.push_front(elem);
            return Ok(());
        } else if idx == self.len {
            self.push_back(elem);
            return Ok(());
        }

        let Some(curr) = self.node_at(idx) else {
            return Err(Error::InvalidPosition {
                position: idx,
                len: self.len,
            });
        };

        unsafe {
            // `0 < idx < len`, so the node at `idx` has a predecessor.
            let prev = (*curr.as_ptr()).prev;
            let new_node = NonNull::new_unchecked(Box::into_raw(Box::new(Node {
                next: Some(curr),
                prev,
                elem,
            })));

            if let Some(prev) = prev {
                (*prev.as_ptr()).next = Some(new_node);
            }
            (*curr.as_ptr()).prev = Some(new_node);
        }

        self.len += 1;

        Ok(())
    }

    /// Removes the element at `idx` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] if `idx` is out of range.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(min(*idx*, *len* - *idx*)) time.
    pub fn remove_at(&mut self, idx: usize) -> Result<T> {
        let node = self.node_at(idx).ok_or(Error::InvalidPosition {
            position: idx,
            len: self.len,
        })?;

        // SAFETY: `node_at` only returns nodes of this list.
        Ok(unsafe { self.unlink(node) })
    }

    /// Returns a reference to the element at `idx`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] if `idx` is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let list = doubly![10 => 20 => 30 => 40];
    /// assert_eq!(list.get(3), Ok(&40)); // walked from the tail
    /// assert!(list.get(4).is_err());
    /// ```
    pub fn get(&self, idx: usize) -> Result<&T> {
        self.node_at(idx)
            .map(|node| unsafe { &(*node.as_ptr()).elem })
            .ok_or(Error::InvalidPosition {
                position: idx,
                len: self.len,
            })
    }

    /// Returns a mutable reference to the element at `idx`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] if `idx` is out of range.
    pub fn get_mut(&mut self, idx: usize) -> Result<&mut T> {
        self.node_at(idx)
            .map(|node| unsafe { &mut (*node.as_ptr()).elem })
            .ok_or(Error::InvalidPosition {
                position: idx,
                len: self.len,
            })
    }

    /// Clears the list, removing all nodes.
    #[inline]
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Returns an iterator over the list, from head to tail or in reverse.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            head: self.head,
            tail: self.tail,
            len: self.len,
            _marker: marker::PhantomData,
        }
    }

    /// Returns the number of nodes in the list.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list contains no nodes.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the node at `idx`, walking from the head when `idx` lies in
    /// the first half and from the tail otherwise.
    fn node_at(&self, idx: usize) -> Option<NonNull<Node<T>>> {
        if idx >= self.len {
            return None;
        }

        unsafe {
            if idx < self.len / 2 {
                let mut curr = self.head?;
                for _ in 0..idx {
                    curr = (*curr.as_ptr()).next?;
                }
                Some(curr)
            } else {
                let mut curr = self.tail?;
                for _ in 0..(self.len - 1 - idx) {
                    curr = (*curr.as_ptr()).prev?;
                }
                Some(curr)
            }
        }
    }

    /// Unlinks `node` from its neighbours and returns its element.
    ///
    /// # Safety
    ///
    /// `node` must be a node of this list.
    unsafe fn unlink(&mut self, node: NonNull<Node<T>>) -> T {
        // Node is boxed before being removed so the destructor for T can be
        // invoked when returning.
        let boxed_node = Box::from_raw(node.as_ptr());

        match boxed_node.prev {
            Some(prev) => (*prev.as_ptr()).next = boxed_node.next,
            None => self.head = boxed_node.next,
        }

        match boxed_node.next {
            Some(next) => (*next.as_ptr()).prev = boxed_node.prev,
            None => self.tail = boxed_node.prev,
        }

        self.len -= 1;

        // The allocation is freed when `boxed_node` goes out of scope.
        boxed_node.elem
    }

    /// Returns the first node for which `pred` holds.
    fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<NonNull<Node<T>>> {
        let mut curr = self.head;

        while let Some(node) = curr {
            unsafe {
                if pred(&(*node.as_ptr()).elem) {
                    return Some(node);
                }
                curr = (*node.as_ptr()).next;
            }
        }

        None
    }
}

impl<T: PartialEq> DoublyLinked<T> {
    /// Returns the index of the first node holding `key`.
    pub fn search(&self, key: &T) -> Option<usize> {
        self.iter().position(|elem| elem == key)
    }

    /// Removes the first node holding `key` and returns its element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no node holds `key`.
    pub fn remove(&mut self, key: &T) -> Result<T> {
        let node = self.find(|elem| elem == key).ok_or(Error::NotFound)?;

        // SAFETY: `find` only returns nodes of this list.
        Ok(unsafe { self.unlink(node) })
    }

    /// Overwrites the first node holding `old` with `new`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no node holds `old`.
    pub fn update(&mut self, old: &T, new: T) -> Result<()> {
        let node = self.find(|elem| elem == old).ok_or(Error::NotFound)?;

        unsafe { (*node.as_ptr()).elem = new };

        Ok(())
    }

    /// Relinks the first node holding `key` at the head of the list. A node
    /// already at the head stays where it is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no node holds `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let mut list = doubly![15 => 25 => 35 => 45 => 55];
    /// list.move_to_front(&35).unwrap();
    /// assert!(list.iter().eq(&[35, 15, 25, 45, 55]));
    /// ```
    pub fn move_to_front(&mut self, key: &T) -> Result<()> {
        let node = self.find(|elem| elem == key).ok_or(Error::NotFound)?;

        unsafe {
            let Some(prev) = (*node.as_ptr()).prev else {
                return Ok(());
            };
            let next = (*node.as_ptr()).next;

            (*prev.as_ptr()).next = next;
            match next {
                Some(next) => (*next.as_ptr()).prev = Some(prev),
                None => self.tail = Some(prev),
            }

            // `node` had a predecessor, so the head is a different node.
            if let Some(head) = self.head {
                (*head.as_ptr()).prev = Some(node);
            }
            (*node.as_ptr()).prev = None;
            (*node.as_ptr()).next = self.head;
            self.head = Some(node);
        }

        trace!(len = self.len, "moved node to front");

        Ok(())
    }

    /// Swaps the element of the first node holding `key` with that of its
    /// predecessor. A node at the head stays where it is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no node holds `key`.
    pub fn transpose(&mut self, key: &T) -> Result<()> {
        let node = self.find(|elem| elem == key).ok_or(Error::NotFound)?;

        unsafe {
            if let Some(prev) = (*node.as_ptr()).prev {
                mem::swap(&mut (*prev.as_ptr()).elem, &mut (*node.as_ptr()).elem);
                trace!(len = self.len, "transposed node with predecessor");
            }
        }

        Ok(())
    }
}

impl<T> Drop for DoublyLinked<T> {
    fn drop(&mut self) {
        while self.pop_front().is_some() {}
    }
}

impl<T> Default for DoublyLinked<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DoublyLinked<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T> Extend<T> for DoublyLinked<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|elem| self.push_back(elem));
    }
}

impl<T> FromIterator<T> for DoublyLinked<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T: fmt::Debug> fmt::Debug for DoublyLinked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

impl<T: PartialEq> PartialEq for DoublyLinked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other)
    }
}

impl<T: Eq> Eq for DoublyLinked<T> {}

impl<'a, T> IntoIterator for &'a DoublyLinked<T> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len > 0 {
            self.head.map(|head| unsafe {
                self.len -= 1;
                self.head = (*head.as_ptr()).next;
                &(*head.as_ptr()).elem
            })
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len > 0 {
            self.tail.map(|tail| unsafe {
                self.len -= 1;
                self.tail = (*tail.as_ptr()).prev;
                &(*tail.as_ptr()).elem
            })
        } else {
            None
        }
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {
    fn len(&self) -> usize {
        self.len
    }
}
