//! Collection Types.

pub mod avl;
pub mod bst;
pub mod doubly_linked_list;
pub mod hash_table;
pub mod singly_linked_list;
pub mod skip_list;

/// Collection Types Prelude
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::{avl, bst, doubly, singly, skip_list};

    #[doc(no_inline)]
    pub use super::avl::AvlTree;
    #[doc(no_inline)]
    pub use super::bst::BinarySearchTree;
    #[doc(no_inline)]
    pub use super::doubly_linked_list::DoublyLinked;
    #[doc(no_inline)]
    pub use super::hash_table::HashTable;
    #[doc(no_inline)]
    pub use super::singly_linked_list::SinglyLinked;
    #[doc(no_inline)]
    pub use super::skip_list::SkipList;
}
