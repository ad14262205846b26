//! Request/response surface shared by every container.
//!
//! Callers describe what to do with an [`Operation`] and receive an
//! [`Outcome`]. Failures never escape [`Container::apply`]: they come back as
//! an outcome with `success == false` and the container left untouched.
//!
//! Both types serialize to the camelCase wire shape
//! `{"kind": "update", "value": 3, "newValue": 4}`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collections::avl::AvlTree;
use crate::collections::bst::BinarySearchTree;
use crate::collections::doubly_linked_list::DoublyLinked;
use crate::collections::hash_table::HashTable;
use crate::collections::singly_linked_list::SinglyLinked;
use crate::collections::skip_list::SkipList;
use crate::config::EngineConfig;
use crate::error::{Error, Result, UpdateRejection};

/// What an [`Operation`] asks a container to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    /// Add a value.
    Insert,
    /// Remove a value, or the node at a list position.
    Delete,
    /// Report whether a value is stored.
    Search,
    /// Replace a stored value with `new_value`.
    Update,
    /// Rebuild a tree into a height-balanced shape.
    Balance,
    /// List every stored value.
    Traverse,
    /// Self-organizing list heuristic: relink a node at the head.
    MoveToFront,
    /// Self-organizing list heuristic: swap a node with its predecessor.
    Transpose,
}

impl OperationKind {
    /// Returns the wire name of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Delete => "delete",
            OperationKind::Search => "search",
            OperationKind::Update => "update",
            OperationKind::Balance => "balance",
            OperationKind::Traverse => "traverse",
            OperationKind::MoveToFront => "moveToFront",
            OperationKind::Transpose => "transpose",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request against a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// What to do.
    pub kind: OperationKind,
    /// Target value. Required by every kind except `balance` and `traverse`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    /// Replacement value, required by `update`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<i64>,
    /// List index for positional `insert` and `delete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl Operation {
    const fn new(kind: OperationKind, value: Option<i64>) -> Self {
        Self {
            kind,
            value,
            new_value: None,
            position: None,
        }
    }

    /// Creates an `insert` request.
    pub const fn insert(value: i64) -> Self {
        Self::new(OperationKind::Insert, Some(value))
    }

    /// Creates a `delete` request.
    pub const fn delete(value: i64) -> Self {
        Self::new(OperationKind::Delete, Some(value))
    }

    /// Creates a `search` request.
    pub const fn search(value: i64) -> Self {
        Self::new(OperationKind::Search, Some(value))
    }

    /// Creates an `update` request replacing `value` with `new_value`.
    pub const fn update(value: i64, new_value: i64) -> Self {
        Self {
            new_value: Some(new_value),
            ..Self::new(OperationKind::Update, Some(value))
        }
    }

    /// Creates a `balance` request.
    pub const fn balance() -> Self {
        Self::new(OperationKind::Balance, None)
    }

    /// Creates a `traverse` request.
    pub const fn traverse() -> Self {
        Self::new(OperationKind::Traverse, None)
    }

    /// Creates a `moveToFront` request.
    pub const fn move_to_front(value: i64) -> Self {
        Self::new(OperationKind::MoveToFront, Some(value))
    }

    /// Creates a `transpose` request.
    pub const fn transpose(value: i64) -> Self {
        Self::new(OperationKind::Transpose, Some(value))
    }

    /// Targets list index `position` instead of the first matching value.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let mut list: SinglyLinked<i64> = singly![1 => 3];
    /// let outcome = list.apply(&Operation::insert(2).at(1));
    /// assert!(outcome.success);
    /// assert_eq!(Container::traverse(&list), vec![1, 2, 3]);
    /// ```
    pub const fn at(self, position: usize) -> Self {
        Self {
            position: Some(position),
            ..self
        }
    }

    fn require_value(&self) -> Result<i64> {
        self.value.ok_or(Error::MissingValue)
    }

    fn require_new_value(&self) -> Result<i64> {
        self.new_value.ok_or(Error::MissingNewValue)
    }
}

/// Result of applying an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// Whether the operation took effect, or the searched value was found.
    pub success: bool,
    /// Human-readable diagnostic.
    pub message: String,
    /// Set by `search` requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found: Option<bool>,
    /// Set by `traverse` requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<i64>>,
}

impl Outcome {
    fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            found: None,
            values: None,
        }
    }

    fn search(found: bool, message: impl Into<String>) -> Self {
        Self {
            success: found,
            message: message.into(),
            found: Some(found),
            values: None,
        }
    }

    fn values(values: Vec<i64>) -> Self {
        Self {
            values: Some(values),
            ..Self::done("traversal complete")
        }
    }

    /// Outcome reporting `err`.
    pub fn failure(err: &Error) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            found: None,
            values: None,
        }
    }
}

/// Which container an engine instance wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerKind {
    /// Unbalanced binary search tree.
    Bst,
    /// Height-balanced AVL tree.
    Avl,
    /// Probabilistic skip list.
    SkipList,
    /// Singly linked list.
    SinglyLinkedList,
    /// Doubly linked list.
    DoublyLinkedList,
    /// Fixed-capacity hash table keyed by the value's decimal rendering.
    HashTable,
}

impl ContainerKind {
    /// Every container kind, in declaration order.
    pub const ALL: [ContainerKind; 6] = [
        ContainerKind::Bst,
        ContainerKind::Avl,
        ContainerKind::SkipList,
        ContainerKind::SinglyLinkedList,
        ContainerKind::DoublyLinkedList,
        ContainerKind::HashTable,
    ];

    /// Returns the wire name of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Bst => "bst",
            ContainerKind::Avl => "avl",
            ContainerKind::SkipList => "skip-list",
            ContainerKind::SinglyLinkedList => "singly-linked-list",
            ContainerKind::DoublyLinkedList => "doubly-linked-list",
            ContainerKind::HashTable => "hash-table",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "bst" | "binary-search-tree" => Ok(ContainerKind::Bst),
            "avl" | "avl-tree" => Ok(ContainerKind::Avl),
            "skip-list" | "skiplist" => Ok(ContainerKind::SkipList),
            "singly-linked-list" | "singly" => Ok(ContainerKind::SinglyLinkedList),
            "doubly-linked-list" | "doubly" => Ok(ContainerKind::DoublyLinkedList),
            "hash-table" | "hash" => Ok(ContainerKind::HashTable),
            other => Err(Error::invalid_config(format!(
                "unknown container kind `{other}`"
            ))),
        }
    }
}

/// A container driven through [`Operation`] requests.
pub trait Container: fmt::Debug {
    /// Returns which container this is.
    fn kind(&self) -> ContainerKind;

    /// Returns the number of stored values.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns every stored value: ascending for ordered containers, insertion
    /// (or list) order otherwise.
    fn traverse(&self) -> Vec<i64>;

    /// Applies `op`, reporting failures as errors.
    ///
    /// # Errors
    ///
    /// Returns the engine error for the failed operation, or
    /// [`Error::Unsupported`] if the container does not implement `op.kind`.
    fn execute(&mut self, op: &Operation) -> Result<Outcome>;

    /// Applies `op`, folding failures into the returned outcome.
    fn apply(&mut self, op: &Operation) -> Outcome {
        let outcome = self
            .execute(op)
            .unwrap_or_else(|err| Outcome::failure(&err));

        debug!(
            container = %self.kind(),
            kind = %op.kind,
            value = ?op.value,
            success = outcome.success,
            len = self.len(),
            "applied operation"
        );

        outcome
    }
}

/// Builds an empty container of `kind` using the parameters in `config`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if `config` does not validate.
///
/// # Examples
///
/// ```
/// use dsa_engine::config::EngineConfig;
/// use dsa_engine::operation::{build, ContainerKind, Operation};
///
/// let mut tree = build(ContainerKind::Avl, &EngineConfig::default()).unwrap();
/// for value in [3, 1, 2] {
///     assert!(tree.apply(&Operation::insert(value)).success);
/// }
/// assert_eq!(tree.traverse(), vec![1, 2, 3]);
/// ```
pub fn build(kind: ContainerKind, config: &EngineConfig) -> Result<Box<dyn Container>> {
    config.validate()?;

    let container: Box<dyn Container> = match kind {
        ContainerKind::Bst => Box::new(BinarySearchTree::<i64>::new()),
        ContainerKind::Avl => Box::new(AvlTree::<i64>::new()),
        ContainerKind::SkipList => Box::new(SkipList::<i64>::with_config(&config.skip_list)?),
        ContainerKind::SinglyLinkedList => Box::new(SinglyLinked::<i64>::new()),
        ContainerKind::DoublyLinkedList => Box::new(DoublyLinked::<i64>::new()),
        ContainerKind::HashTable => Box::new(HashTable::<i64>::with_config(&config.hash_table)?),
    };

    Ok(container)
}

fn unsupported(kind: OperationKind, container: ContainerKind) -> Error {
    Error::Unsupported {
        operation: kind.as_str(),
        container: container.as_str(),
    }
}

/// Implements [`Container`] for a duplicate-free ordered set exposing
/// `insert`, `remove`, `contains`, `update` and `iter`. The closure-like tail
/// handles `balance` requests.
macro_rules! ordered_container {
    ($ty:ident, $kind:expr, |$set:ident| $balance:expr) => {
        impl Container for $ty<i64> {
            fn kind(&self) -> ContainerKind {
                $kind
            }

            fn len(&self) -> usize {
                $ty::len(self)
            }

            fn traverse(&self) -> Vec<i64> {
                self.iter().copied().collect()
            }

            fn execute(&mut self, op: &Operation) -> Result<Outcome> {
                match op.kind {
                    OperationKind::Insert => {
                        let value = op.require_value()?;
                        self.insert(value)?;
                        Ok(Outcome::done(format!("inserted {value}")))
                    }
                    OperationKind::Delete => {
                        let value = op.require_value()?;
                        self.remove(&value)?;
                        Ok(Outcome::done(format!("deleted {value}")))
                    }
                    OperationKind::Search => {
                        let value = op.require_value()?;
                        Ok(if self.contains(&value) {
                            Outcome::search(true, format!("found {value}"))
                        } else {
                            Outcome::search(false, Error::NotFound.to_string())
                        })
                    }
                    OperationKind::Update => {
                        let value = op.require_value()?;
                        let new_value = op.require_new_value()?;
                        self.update(&value, new_value)?;
                        Ok(Outcome::done(format!("updated {value} to {new_value}")))
                    }
                    OperationKind::Traverse => Ok(Outcome::values(Container::traverse(self))),
                    OperationKind::Balance => {
                        let $set = self;
                        $balance
                    }
                    kind @ (OperationKind::MoveToFront | OperationKind::Transpose) => {
                        Err(unsupported(kind, $kind))
                    }
                }
            }
        }
    };
}

ordered_container!(BinarySearchTree, ContainerKind::Bst, |_tree| Err(unsupported(
    OperationKind::Balance,
    ContainerKind::Bst
)));

ordered_container!(AvlTree, ContainerKind::Avl, |tree| Ok(if tree.balance() {
    Outcome::done("rebuilt tree into a balanced shape")
} else {
    Outcome::done("tree already balanced")
}));

ordered_container!(SkipList, ContainerKind::SkipList, |_list| Err(unsupported(
    OperationKind::Balance,
    ContainerKind::SkipList
)));

/// Implements [`Container`] for a list exposing the positional and
/// self-organizing operations.
macro_rules! list_container {
    ($ty:ident, $kind:expr) => {
        impl Container for $ty<i64> {
            fn kind(&self) -> ContainerKind {
                $kind
            }

            fn len(&self) -> usize {
                $ty::len(self)
            }

            fn traverse(&self) -> Vec<i64> {
                self.iter().copied().collect()
            }

            fn execute(&mut self, op: &Operation) -> Result<Outcome> {
                match op.kind {
                    OperationKind::Insert => {
                        let value = op.require_value()?;
                        match op.position {
                            Some(position) => {
                                self.insert_at(value, position)?;
                                Ok(Outcome::done(format!("inserted {value} at index {position}")))
                            }
                            None => {
                                self.push_back(value);
                                Ok(Outcome::done(format!("inserted {value}")))
                            }
                        }
                    }
                    OperationKind::Delete => match op.position {
                        Some(position) => {
                            let removed = self.remove_at(position)?;
                            Ok(Outcome::done(format!("deleted {removed} at index {position}")))
                        }
                        None => {
                            let value = op.require_value()?;
                            self.remove(&value)?;
                            Ok(Outcome::done(format!("deleted {value}")))
                        }
                    },
                    OperationKind::Search => {
                        let value = op.require_value()?;
                        Ok(match self.search(&value) {
                            Some(idx) => {
                                Outcome::search(true, format!("found {value} at index {idx}"))
                            }
                            None => Outcome::search(false, Error::NotFound.to_string()),
                        })
                    }
                    OperationKind::Update => {
                        let value = op.require_value()?;
                        let new_value = op.require_new_value()?;
                        self.update(&value, new_value)?;
                        Ok(Outcome::done(format!("updated {value} to {new_value}")))
                    }
                    OperationKind::Traverse => Ok(Outcome::values(Container::traverse(self))),
                    OperationKind::MoveToFront => {
                        let value = op.require_value()?;
                        self.move_to_front(&value)?;
                        Ok(Outcome::done(format!("moved {value} to front")))
                    }
                    OperationKind::Transpose => {
                        let value = op.require_value()?;
                        self.transpose(&value)?;
                        Ok(Outcome::done(format!("transposed {value} with its predecessor")))
                    }
                    OperationKind::Balance => Err(unsupported(OperationKind::Balance, $kind)),
                }
            }
        }
    };
}

list_container!(SinglyLinked, ContainerKind::SinglyLinkedList);
list_container!(DoublyLinked, ContainerKind::DoublyLinkedList);

/// The request surface treats the table as a set of values, each stored under
/// its decimal rendering.
impl Container for HashTable<i64> {
    fn kind(&self) -> ContainerKind {
        ContainerKind::HashTable
    }

    fn len(&self) -> usize {
        HashTable::len(self)
    }

    fn traverse(&self) -> Vec<i64> {
        HashTable::traverse(self)
            .into_iter()
            .map(|(_, value)| *value)
            .collect()
    }

    fn execute(&mut self, op: &Operation) -> Result<Outcome> {
        match op.kind {
            OperationKind::Insert => {
                let value = op.require_value()?;
                self.insert(value.to_string(), value)?;
                Ok(Outcome::done(format!("inserted {value}")))
            }
            OperationKind::Delete => {
                let value = op.require_value()?;
                self.remove(&value.to_string())?;
                Ok(Outcome::done(format!("deleted {value}")))
            }
            OperationKind::Search => {
                let key = op.require_value()?.to_string();
                Ok(match self.get(&key) {
                    Some(stored) => {
                        Outcome::search(true, format!("found {stored} under key {key}"))
                    }
                    None => Outcome::search(false, Error::NotFound.to_string()),
                })
            }
            OperationKind::Update => {
                let value = op.require_value()?;
                let new_value = op.require_new_value()?;
                let (key, new_key) = (value.to_string(), new_value.to_string());

                if !self.contains_key(&key) {
                    return Err(Error::NotFound);
                }
                if self.contains_key(&new_key) {
                    return Err(Error::InvalidUpdateTarget {
                        reason: UpdateRejection::TargetExists,
                    });
                }

                let previous = self.remove(&key)?;
                if let Err(err) = self.insert(new_key, new_value) {
                    // The vacated slot lies on the old key's probe path.
                    self.insert(key, previous)?;
                    return Err(err);
                }

                Ok(Outcome::done(format!("updated {value} to {new_value}")))
            }
            OperationKind::Traverse => Ok(Outcome::values(Container::traverse(self))),
            kind @ (OperationKind::Balance
            | OperationKind::MoveToFront
            | OperationKind::Transpose) => Err(unsupported(kind, ContainerKind::HashTable)),
        }
    }
}
