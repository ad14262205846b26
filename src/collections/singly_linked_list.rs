//! A [singly-linked list] with owned nodes and self-organizing lookups.
//!
//! Besides positional access, the list supports two [self-organizing]
//! heuristics that reorder nodes on access so frequently requested values
//! drift towards the head: move-to-front and transposition.
//!
//! [singly-linked list]: https://en.wikipedia.org/wiki/Linked_list
//! [self-organizing]: https://en.wikipedia.org/wiki/Self-organizing_list

use std::fmt;

use core::marker::PhantomData;
use core::{mem, ptr};

use tracing::trace;

use crate::error::{Error, Result};

/// Creates a `SinglyLinked` containing the arguments.
///
/// # Examples
///
/// ```
/// use dsa_engine::prelude::*;
///
/// let mut list = singly![1 => 2 => 3];
/// assert_eq!(list.len(), 3);
///
/// assert_eq!(list.pop_front(), Some(1));
/// assert_eq!(list.pop_front(), Some(2));
/// assert_eq!(list.pop_front(), Some(3));
/// ```
#[macro_export]
macro_rules! singly {
    () => {
        $crate::collections::singly_linked_list::SinglyLinked::new()
    };
    ($($elem:expr)=>*) => {{
        let mut singly = $crate::collections::singly_linked_list::SinglyLinked::new();
        $(singly.push_back($elem);)*
        singly
    }};
}

/// A [singly-linked list] with owned nodes.
///
/// [singly-linked list]: https://en.wikipedia.org/wiki/Linked_list
pub struct SinglyLinked<T> {
    /// Pointer to the head of the list.
    head: *const Node<T>,
    /// Pointer to the tail of the list.
    tail: *const Node<T>,
    /// Number of allocated nodes in the list.
    len: usize,
    /// In order to tell the drop checker that we do own values of type `T`, and
    /// therefore may drop some `T`'s when we drop.
    _marker: PhantomData<T>,
}

struct Node<T> {
    /// Pointer to the next node.
    next: *const Node<T>,
    /// Data the node owns.
    data: T,
}

/// An iterator that borrows a `SinglyLinked<T>` immutably.
#[derive(Debug)]
pub struct Iter<'a, T> {
    next: *const Node<T>,
    len: usize,
    _marker: PhantomData<&'a T>,
}

impl<T> SinglyLinked<T> {
    /// Creates a new, empty `SinglyLinked`.
    ///
    /// The list will not allocate until elements are pushed onto it.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: ptr::null(),
            tail: ptr::null(),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Returns an immutable reference to the first element from the list, or
    /// [`None`] if it is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        if !self.head.is_null() {
            unsafe { Some(&(*self.head).data) }
        } else {
            None
        }
    }

    /// Returns an immutable reference to the last element of the list, or
    /// [`None`] if it is empty.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(1) time. The list maintains a reference to the `tail`, or
    /// last node.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        if !self.tail.is_null() {
            unsafe { Some(&(*self.tail).data) }
        } else {
            None
        }
    }

    /// Prepends an element to the front of the list.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(1) time.
    pub fn push_front(&mut self, data: T) {
        unsafe {
            let new_node: *const Node<T> = Box::into_raw(Box::new(Node {
                next: ptr::null(),
                data,
            }));

            if !self.head.is_null() {
                (*new_node.cast_mut()).next = self.head;
            } else {
                self.tail = new_node;
            }

            self.head = new_node;
            self.len += 1;
        }
    }

    /// Removes the first element from the list and returns it, or [`None`] if
    /// it is empty.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(1) time.
    pub fn pop_front(&mut self) -> Option<T> {
        if !self.head.is_null() {
            unsafe {
                let boxed_node = Box::from_raw(self.head.cast_mut());
                let data = boxed_node.data;

                self.head = boxed_node.next;

                if self.head.is_null() {
                    self.tail = ptr::null();
                }

                self.len -= 1;

                // The allocation is freed when `boxed_node` goes out of scope.
                Some(data)
            }
        } else {
            None
        }
    }

    /// Appends an element to the back of the list.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(1) time. The list maintains a reference to the `tail`, or
    /// last node. Without it, appending would walk the whole list.
    pub fn push_back(&mut self, data: T) {
        unsafe {
            let new_node: *const Node<T> = Box::into_raw(Box::new(Node {
                next: ptr::null(),
                data,
            }));

            if !self.tail.is_null() {
                (*self.tail.cast_mut()).next = new_node;
            } else {
                self.head = new_node;
            }

            self.tail = new_node;
            self.len += 1;
        }
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
    /// Takes *O*(*idx*) time walking from the head; the relinking itself is
    /// constant.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let mut list = singly![4 => 2 => 1];
    /// list.insert_at(3, 1).unwrap();
    /// assert!(list.iter().eq([&4, &3, &2, &1]));
    ///
    /// list.insert_at(0, 4).unwrap();
    /// assert_eq!(list.back(), Some(&0));
    /// assert!(list.insert_at(9, 9).is_err());
    /// ```
    pub fn insert_at(&mut self, data: T, idx: usize) -> Result<()> {
        if idx > self.len {
            return Err(Error::InvalidPosition {
                position: idx,
                len: self.len,
            });
        }

        if idx == 0 {
            self.push_front(data);
            return Ok(());
        } else if idx == self.len {
            self.push_back(data);
            return Ok(());
        }

        // `0 < idx < len`, so both `prev` and `curr` are non-null.
        let (prev, curr) = self.traverse(idx);

        unsafe {
            let new_node = Box::into_raw(Box::new(Node {
                next: curr, // points to the node at `idx`
                data,
            }));

            (*prev.cast_mut()).next = new_node;
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
    /// Takes *O*(*idx*) time.
    pub fn remove_at(&mut self, idx: usize) -> Result<T> {
        if idx >= self.len {
            return Err(Error::InvalidPosition {
                position: idx,
                len: self.len,
            });
        }

        let (prev, curr) = self.traverse(idx);

        // SAFETY: `idx` is in range, so `curr` is a valid node.
        Ok(unsafe { self.unlink(prev, curr) })
    }

    /// Returns a reference to the element at `idx`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] if `idx` is out of range.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(*idx*) time.
    pub fn get(&self, idx: usize) -> Result<&T> {
        let (_, curr) = self.traverse(idx);
        if curr.is_null() {
            Err(Error::InvalidPosition {
                position: idx,
                len: self.len,
            })
        } else {
            unsafe { Ok(&(*curr).data) }
        }
    }

    /// Returns a mutable reference to the element at `idx`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] if `idx` is out of range.
    pub fn get_mut(&mut self, idx: usize) -> Result<&mut T> {
        let (_, curr) = self.traverse(idx);
        if curr.is_null() {
            Err(Error::InvalidPosition {
                position: idx,
                len: self.len,
            })
        } else {
            unsafe { Ok(&mut (*curr.cast_mut()).data) }
        }
    }

    /// Returns an iterator from the head to the tail.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            len: self.len,
            _marker: PhantomData,
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

    /// Removes every node from the list.
    #[inline]
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Traverses the list to the provided `index`. This function returns a pair
    /// of pointers, one to the previous node before the index node and one to
    /// the node at the index.
    ///
    /// Caller should check from the return value `(prev, curr)`, whether `curr`
    /// equals `ptr::null`, meaning the provided index was invalid. If `prev`
    /// equals `ptr::null`, the index provided was 0.
    fn traverse(&self, mut idx: usize) -> (*const Node<T>, *const Node<T>) {
        let mut curr = self.head;
        // So we don't fall in the case where `prev` and `curr` alias.
        let mut prev = ptr::null();

        while idx > 0 && !curr.is_null() {
            unsafe {
                prev = curr;
                curr = (*curr).next;
            }
            idx -= 1;
        }

        (prev, curr)
    }

    /// Unlinks `curr`, whose predecessor is `prev` (null for the head), and
    /// returns its data.
    ///
    /// # Safety
    ///
    /// `curr` must be a node of this list and `prev` its predecessor.
    unsafe fn unlink(&mut self, prev: *const Node<T>, curr: *const Node<T>) -> T {
        let mut boxed_node = Box::from_raw(curr.cast_mut());

        if prev.is_null() {
            self.head = boxed_node.next;
        } else {
            (*prev.cast_mut()).next = boxed_node.next;
        }

        // Removing the tail.
        if boxed_node.next.is_null() {
            self.tail = prev;
        }

        boxed_node.next = ptr::null();
        self.len -= 1;

        // The allocation is freed when `boxed_node` goes out of scope.
        boxed_node.data
    }
}

impl<T: PartialEq> SinglyLinked<T> {
    /// Returns the index of the first node holding `key`.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(*n*) time.
    pub fn search(&self, key: &T) -> Option<usize> {
        self.iter().position(|data| data == key)
    }

    /// Removes the first node holding `key` and returns its data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no node holds `key`.
    pub fn remove(&mut self, key: &T) -> Result<T> {
        let (prev, curr) = self.traverse_with_key(key);

        if curr.is_null() {
            return Err(Error::NotFound);
        }

        // SAFETY: `curr` is a node of this list and `prev` its predecessor.
        Ok(unsafe { self.unlink(prev, curr) })
    }

    /// Overwrites the data of the first node holding `old` with `new`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no node holds `old`.
    pub fn update(&mut self, old: &T, new: T) -> Result<()> {
        let (_, curr) = self.traverse_with_key(old);

        if curr.is_null() {
            return Err(Error::NotFound);
        }

        unsafe { (*curr.cast_mut()).data = new };

        Ok(())
    }

    /// Moves the first node holding `key` to the head of the list.
    ///
    /// A node already at the head stays where it is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no node holds `key`.
    ///
    /// # Time Complexity
    ///
    /// Takes *O*(*n*) time to find the node; relinking is constant.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let mut list = singly![15 => 25 => 35 => 45 => 55];
    /// list.move_to_front(&35).unwrap();
    /// assert!(list.iter().eq([&35, &15, &25, &45, &55]));
    /// ```
    pub fn move_to_front(&mut self, key: &T) -> Result<()> {
        let (prev, curr) = self.traverse_with_key(key);

        if curr.is_null() {
            return Err(Error::NotFound);
        }
        if prev.is_null() {
            return Ok(());
        }

        unsafe {
            (*prev.cast_mut()).next = (*curr).next;
            if curr == self.tail {
                self.tail = prev;
            }

            (*curr.cast_mut()).next = self.head;
            self.head = curr;
        }

        trace!(len = self.len, "moved node to front");

        Ok(())
    }

    /// Swaps the first node holding `key` with its predecessor, moving it one
    /// step towards the head.
    ///
    /// A node already at the head stays where it is.
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
    /// let mut list = singly![15 => 25 => 35];
    /// list.transpose(&35).unwrap();
    /// assert!(list.iter().eq([&15, &35, &25]));
    /// ```
    pub fn transpose(&mut self, key: &T) -> Result<()> {
        let (prev, curr) = self.traverse_with_key(key);

        if curr.is_null() {
            return Err(Error::NotFound);
        }
        if prev.is_null() {
            return Ok(());
        }

        // SAFETY: `prev` and `curr` are distinct nodes of this list.
        unsafe {
            mem::swap(
                &mut (*prev.cast_mut()).data,
                &mut (*curr.cast_mut()).data,
            );
        }

        trace!(len = self.len, "transposed node with predecessor");

        Ok(())
    }

    /// Traverses the list using the provided `key`. This function returns a
    /// pair of pointers, one to the previous node before the found node and one
    /// to the node corresponding to the key.
    ///
    /// Caller should check from the return value `(prev, curr)`, whether `curr`
    /// equals `ptr::null`, meaning the provided key was not found. If `prev`
    /// equals `ptr::null`, `curr` would point to the `head` of the list, which
    /// contained a matching key.
    fn traverse_with_key(&self, key: &T) -> (*const Node<T>, *const Node<T>) {
        let mut curr = self.head;
        // So we don't fall in the case where `prev` and `curr` alias.
        let mut prev = ptr::null();

        // NOTE: Logical operators are short-circuiting, meaning the dereference
        // should always be safe.
        unsafe {
            while !curr.is_null() && (*curr).data != *key {
                prev = curr;
                curr = (*curr).next;
            }
        }

        (prev, curr)
    }
}

impl<T> Drop for SinglyLinked<T> {
    fn drop(&mut self) {
        while self.pop_front().is_some() {}
    }
}

impl<T> Default for SinglyLinked<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for SinglyLinked<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|elem| self.push_back(elem));
    }
}

impl<T> FromIterator<T> for SinglyLinked<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T: fmt::Debug> fmt::Debug for SinglyLinked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a SinglyLinked<T> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_null() {
            None
        } else {
            unsafe {
                let node = &*self.next;
                self.next = node.next;
                self.len -= 1;
                Some(&node.data)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod test {
    use super::*;

    /// The tail pointer and length agree with a walk from the head.
    fn check_links<T>(list: &SinglyLinked<T>) {
        let mut count = 0;
        let mut last = ptr::null();
        let mut curr = list.head;

        while !curr.is_null() {
            count += 1;
            last = curr;
            curr = unsafe { (*curr).next };
        }

        assert_eq!(count, list.len());
        assert_eq!(last, list.tail);
    }

    #[test]
    fn test_push_pop_keeps_tail() {
        let mut list = SinglyLinked::new();
        assert_eq!(list.pop_front(), None);
        check_links(&list);

        list.push_back(2);
        list.push_front(1);
        list.push_back(3);
        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.back(), Some(&3));
        check_links(&list);

        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_front(), Some(2));
        assert_eq!(list.back(), Some(&3));
        assert_eq!(list.pop_front(), Some(3));
        assert_eq!(list.back(), None);
        check_links(&list);

        // Appending after draining must relink from an empty tail.
        list.push_back(4);
        assert_eq!(list.front(), Some(&4));
        check_links(&list);
    }

    #[test]
    fn test_positional() {
        let mut list: SinglyLinked<i32> = (0..5).collect();

        assert_eq!(list.get(0), Ok(&0));
        assert_eq!(list.get(4), Ok(&4));
        assert_eq!(
            list.get(5),
            Err(Error::InvalidPosition {
                position: 5,
                len: 5
            })
        );

        assert_eq!(list.remove_at(4), Ok(4));
        assert_eq!(list.back(), Some(&3));
        check_links(&list);

        assert_eq!(list.remove_at(0), Ok(0));
        assert_eq!(list.front(), Some(&1));
        assert!(list.remove_at(3).is_err());

        list.insert_at(9, 1).unwrap();
        list.insert_at(8, list.len()).unwrap();
        assert!(list.iter().eq([&1, &9, &2, &3, &8]));
        check_links(&list);

        *list.get_mut(1).unwrap() = 7;
        assert_eq!(list.get(1), Ok(&7));
    }

    #[test]
    fn test_search_and_remove_by_value() {
        let mut list = singly![3 => 1 => 4 => 1 => 5];

        assert_eq!(list.search(&1), Some(1));
        assert_eq!(list.search(&9), None);

        assert_eq!(list.remove(&1), Ok(1));
        assert!(list.iter().eq([&3, &4, &1, &5]));
        assert_eq!(list.remove(&5), Ok(5));
        assert_eq!(list.back(), Some(&1));
        assert_eq!(list.remove(&5), Err(Error::NotFound));
        check_links(&list);
    }

    #[test]
    fn test_update() {
        let mut list = singly![1 => 2 => 3];
        assert_eq!(list.update(&2, 20), Ok(()));
        assert!(list.iter().eq([&1, &20, &3]));
        assert_eq!(list.update(&2, 5), Err(Error::NotFound));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = singly![15 => 25 => 35 => 45 => 55];

        list.move_to_front(&35).unwrap();
        assert!(list.iter().eq([&35, &15, &25, &45, &55]));
        assert_eq!(list.search(&35), Some(0));

        // Moving the tail updates the tail pointer.
        list.move_to_front(&55).unwrap();
        assert!(list.iter().eq([&55, &35, &15, &25, &45]));
        assert_eq!(list.back(), Some(&45));
        check_links(&list);

        // Already at the head.
        list.move_to_front(&55).unwrap();
        assert_eq!(list.front(), Some(&55));

        assert_eq!(list.move_to_front(&99), Err(Error::NotFound));
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn test_transpose() {
        let mut list = singly![15 => 25 => 35 => 45];

        list.transpose(&35).unwrap();
        assert!(list.iter().eq([&15, &35, &25, &45]));
        list.transpose(&35).unwrap();
        assert!(list.iter().eq([&35, &15, &25, &45]));

        // At the head: unchanged.
        list.transpose(&35).unwrap();
        assert!(list.iter().eq([&35, &15, &25, &45]));

        assert_eq!(list.transpose(&99), Err(Error::NotFound));
        check_links(&list);
    }

    #[test]
    fn test_single_element_reorder() {
        let mut list = singly![7];
        assert_eq!(list.move_to_front(&7), Ok(()));
        assert_eq!(list.transpose(&7), Ok(()));
        assert_eq!(list.front(), Some(&7));

        let mut empty: SinglyLinked<i32> = singly![];
        assert_eq!(empty.move_to_front(&7), Err(Error::NotFound));
    }

    #[test]
    fn test_debug() {
        let list = singly![1 => 2];
        assert_eq!(format!("{list:?}"), "[1, 2]");
    }
}
