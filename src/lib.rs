//! In-memory containers: binary search tree, AVL tree, skip list, singly and
//! doubly linked lists, and a fixed-capacity hash table with three collision
//! policies.
//!
//! Each container can be used directly through its typed API, or driven
//! through [`operation::Operation`] requests via the [`operation::Container`]
//! trait.

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod collections;
pub mod config;
pub mod error;
pub mod operation;

/// Containers Prelude
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::{avl, bst, doubly, singly, skip_list};

    #[doc(no_inline)]
    pub use super::collections::avl::AvlTree;
    #[doc(no_inline)]
    pub use super::collections::bst::BinarySearchTree;
    #[doc(no_inline)]
    pub use super::collections::doubly_linked_list::DoublyLinked;
    #[doc(no_inline)]
    pub use super::collections::hash_table::HashTable;
    #[doc(no_inline)]
    pub use super::collections::singly_linked_list::SinglyLinked;
    #[doc(no_inline)]
    pub use super::collections::skip_list::SkipList;

    #[doc(no_inline)]
    pub use super::config::CollisionPolicy;
    #[doc(no_inline)]
    pub use super::operation::{Container, ContainerKind, Operation, Outcome};
}
