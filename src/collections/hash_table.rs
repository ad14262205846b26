//! [Hash Table] with a fixed number of slots and a pluggable collision policy.
//!
//! Keys are strings hashed with a polynomial rolling hash. Under
//! [`CollisionPolicy::Chaining`] each bucket holds every entry whose primary
//! hash lands on it. Under the open-addressing policies each slot holds at most
//! one entry and colliding keys walk a deterministic probe sequence:
//! `h1, h1 + step, h1 + 2 * step, ...` (mod capacity), where `step` is `1` for
//! linear probing and `h2(key)` for double hashing.
//!
//! Deleting from an open-addressed table leaves a tombstone behind, so a probe
//! that passes the vacated slot keeps going instead of concluding the key is
//! absent. Under linear probing, a run of tombstones directly followed by an
//! empty slot ends every probe that reaches it, so the run is emptied again.
//!
//! [Hash Table]: https://en.wikipedia.org/wiki/Hash_table

use std::fmt;

use core::mem;
use core::slice;

use tracing::trace;

use crate::config::{CollisionPolicy, HashTableConfig};
use crate::error::{Error, Result};

/// Multiplier of the primary rolling hash.
const PRIMARY_PRIME: usize = 31;
/// Multiplier of the secondary (step) hash used by double hashing.
const SECONDARY_PRIME: usize = 37;

/// Fixed-capacity hash table from string keys to values of type `V`.
pub struct HashTable<V> {
    buckets: Buckets<V>,
    /// Number of buckets or slots. Never zero.
    capacity: usize,
    policy: CollisionPolicy,
    /// Number of live entries.
    len: usize,
    /// Sequence number handed to the next inserted entry.
    next_seq: u64,
}

enum Buckets<V> {
    Chained(Vec<Vec<Entry<V>>>),
    Open(Vec<Slot<V>>),
}

struct Entry<V> {
    key: String,
    value: V,
    /// Insertion order, used by [`HashTable::traverse`].
    seq: u64,
}

enum Slot<V> {
    /// Never occupied. Ends every probe.
    Empty,
    /// Occupied once, since vacated. Probes walk past it.
    Tombstone,
    Occupied(Entry<V>),
}

/// Deterministic sequence of slot indices visited for one key.
#[derive(Debug, Clone, Copy)]
struct Probe {
    slot: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

impl Iterator for Probe {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;
        let slot = self.slot;
        self.slot = (self.slot + self.step) % self.capacity;

        Some(slot)
    }
}

/// An iterator over the entries of a `HashTable<V>`, in slot order.
pub struct Iter<'a, V> {
    buckets: slice::Iter<'a, Vec<Entry<V>>>,
    bucket: slice::Iter<'a, Entry<V>>,
    slots: slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

/// Polynomial rolling hash of `key`, reduced modulo `modulus` at every step.
fn rolling_hash(key: &str, prime: usize, modulus: usize) -> usize {
    key.bytes().fold(0, |hash, byte| {
        hash.wrapping_mul(prime).wrapping_add(byte as usize) % modulus
    })
}

impl<V> HashTable<V> {
    /// Creates an empty table with `capacity` buckets resolving collisions
    /// with `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let mut table = HashTable::new(5, CollisionPolicy::LinearProbing).unwrap();
    /// table.insert("a", 1).unwrap();
    /// assert_eq!(table.get("a"), Some(&1));
    /// assert!(HashTable::<i32>::new(0, CollisionPolicy::Chaining).is_err());
    /// ```
    pub fn new(capacity: usize, policy: CollisionPolicy) -> Result<Self> {
        Self::with_config(&HashTableConfig { capacity, policy })
    }

    /// Creates an empty table from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration does not validate.
    pub fn with_config(config: &HashTableConfig) -> Result<Self> {
        config.validate()?;

        let capacity = config.capacity;
        let buckets = if config.policy.is_open_addressing() {
            Buckets::Open((0..capacity).map(|_| Slot::Empty).collect())
        } else {
            Buckets::Chained((0..capacity).map(|_| Vec::new()).collect())
        };

        Ok(Self {
            buckets,
            capacity,
            policy: config.policy,
            len: 0,
            next_seq: 0,
        })
    }

    /// Inserts `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if `key` is already present, or
    /// [`Error::CapacityExhausted`] if no free slot lies on the key's probe
    /// sequence. The table is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    /// use dsa_engine::error::Error;
    ///
    /// let mut table = HashTable::new(1, CollisionPolicy::DoubleHashing).unwrap();
    /// table.insert("x", 1).unwrap();
    /// assert_eq!(table.insert("x", 2), Err(Error::DuplicateKey));
    /// assert_eq!(table.insert("y", 3), Err(Error::CapacityExhausted { capacity: 1 }));
    /// ```
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Result<()> {
        let key = key.into();
        let idx = self.slot_of(&key);
        let probe = self.probe(&key);

        match &mut self.buckets {
            Buckets::Chained(buckets) => {
                let bucket = &mut buckets[idx];

                if bucket.iter().any(|entry| entry.key == key) {
                    return Err(Error::DuplicateKey);
                }

                bucket.push(Entry {
                    key,
                    value,
                    seq: self.next_seq,
                });
            }
            Buckets::Open(slots) => {
                // The key may sit beyond a tombstone, so the whole sequence is
                // walked before a vacated slot is reused.
                let mut vacancy = None;

                for idx in probe {
                    match &slots[idx] {
                        Slot::Empty => {
                            vacancy.get_or_insert(idx);
                            break;
                        }
                        Slot::Tombstone => {
                            vacancy.get_or_insert(idx);
                        }
                        Slot::Occupied(entry) if entry.key == key => {
                            return Err(Error::DuplicateKey);
                        }
                        Slot::Occupied(_) => {}
                    }
                }

                let Some(idx) = vacancy else {
                    trace!(
                        key = %key,
                        policy = %self.policy,
                        capacity = self.capacity,
                        "probe sequence exhausted"
                    );
                    return Err(Error::CapacityExhausted {
                        capacity: self.capacity,
                    });
                };

                slots[idx] = Slot::Occupied(Entry {
                    key,
                    value,
                    seq: self.next_seq,
                });
            }
        }

        self.next_seq += 1;
        self.len += 1;

        Ok(())
    }

    /// Returns a reference to the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.find(key).map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let idx = self.slot_of(key);
        let probe = self.probe(key);

        match &mut self.buckets {
            Buckets::Chained(buckets) => buckets[idx]
                .iter_mut()
                .find(|entry| entry.key == key)
                .map(|entry| &mut entry.value),
            Buckets::Open(slots) => {
                let found = Self::locate(slots, probe, key)?;
                match &mut slots[found] {
                    Slot::Occupied(entry) => Some(&mut entry.value),
                    _ => None,
                }
            }
        }
    }

    /// Returns `true` if the table holds an entry for `key`.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Replaces the value stored under `key`, returning the previous one. The
    /// entry keeps its slot and its place in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `key` is absent.
    pub fn update(&mut self, key: &str, value: V) -> Result<V> {
        self.get_mut(key)
            .map(|slot| mem::replace(slot, value))
            .ok_or(Error::NotFound)
    }

    /// Removes the entry for `key` and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `key` is absent.
    pub fn remove(&mut self, key: &str) -> Result<V> {
        let idx = self.slot_of(key);
        let probe = self.probe(key);
        let linear = self.policy == CollisionPolicy::LinearProbing;

        let entry = match &mut self.buckets {
            Buckets::Chained(buckets) => {
                let bucket = &mut buckets[idx];
                let pos = bucket
                    .iter()
                    .position(|entry| entry.key == key)
                    .ok_or(Error::NotFound)?;
                bucket.remove(pos)
            }
            Buckets::Open(slots) => {
                let found = Self::locate(slots, probe, key).ok_or(Error::NotFound)?;
                let entry = match mem::replace(&mut slots[found], Slot::Tombstone) {
                    Slot::Occupied(entry) => entry,
                    _ => unreachable!("`locate` only returns occupied slots"),
                };

                if linear {
                    Self::reclaim_tombstones(slots, found);
                }

                entry
            }
        };

        self.len -= 1;

        Ok(entry.value)
    }

    /// Returns the slot indices visited, in order, when looking up `key`.
    ///
    /// Chaining visits the primary bucket only. Open addressing visits
    /// `capacity` indices starting at the primary hash.
    ///
    /// # Examples
    ///
    /// ```
    /// use dsa_engine::prelude::*;
    ///
    /// let table = HashTable::<i32>::new(5, CollisionPolicy::LinearProbing).unwrap();
    /// // b'a' == 97 and 97 % 5 == 2
    /// assert_eq!(table.probe_sequence("a"), vec![2, 3, 4, 0, 1]);
    /// ```
    pub fn probe_sequence(&self, key: &str) -> Vec<usize> {
        self.probe(key).collect()
    }

    /// Clears the table, keeping its capacity and policy.
    pub fn clear(&mut self) {
        match &mut self.buckets {
            Buckets::Chained(buckets) => buckets.iter_mut().for_each(Vec::clear),
            Buckets::Open(slots) => slots.iter_mut().for_each(|slot| *slot = Slot::Empty),
        }

        self.len = 0;
    }

    /// Returns an iterator over `(key, value)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        let (buckets, slots) = match &self.buckets {
            Buckets::Chained(buckets) => (buckets.iter(), [].iter()),
            Buckets::Open(slots) => ([].iter(), slots.iter()),
        };

        Iter {
            buckets,
            bucket: [].iter(),
            slots,
            remaining: self.len,
        }
    }

    /// Returns every `(key, value)` pair in the order the keys were inserted.
    pub fn traverse(&self) -> Vec<(&str, &V)> {
        let mut iter = self.iter();
        let mut entries = Vec::with_capacity(self.len);

        while let Some(entry) = iter.next_entry() {
            entries.push(entry);
        }

        entries.sort_unstable_by_key(|entry| entry.seq);
        entries
            .into_iter()
            .map(|entry| (entry.key.as_str(), &entry.value))
            .collect()
    }

    /// Returns the number of entries in the table.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the fixed number of buckets or slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the collision policy the table was built with.
    #[inline]
    pub const fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Returns the ratio of entries to buckets.
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity as f64
    }

    /// Primary hash of `key`: the bucket it belongs to, or the first slot its
    /// probe visits.
    fn slot_of(&self, key: &str) -> usize {
        rolling_hash(key, PRIMARY_PRIME, self.capacity)
    }

    /// Secondary hash of `key`, in `1..capacity` so the step is never zero.
    fn step_of(&self, key: &str) -> usize {
        if self.capacity == 1 {
            return 1;
        }

        1 + rolling_hash(key, SECONDARY_PRIME, self.capacity - 1)
    }

    fn probe(&self, key: &str) -> Probe {
        let (step, remaining) = match self.policy {
            CollisionPolicy::Chaining => (0, 1),
            CollisionPolicy::LinearProbing => (1, self.capacity),
            CollisionPolicy::DoubleHashing => (self.step_of(key), self.capacity),
        };

        Probe {
            slot: self.slot_of(key),
            step,
            capacity: self.capacity,
            remaining,
        }
    }

    /// Index of the occupied slot holding `key`, replaying `probe` until an
    /// empty slot proves absence.
    fn locate(slots: &[Slot<V>], probe: Probe, key: &str) -> Option<usize> {
        for idx in probe {
            match &slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied(entry) if entry.key == key => return Some(idx),
                Slot::Tombstone | Slot::Occupied(_) => {}
            }
        }

        None
    }

    /// Empties the run of tombstones ending at `idx` if the slot after it is
    /// empty. Only valid for linear probing, where a probe leaving a slot
    /// always visits the next one.
    fn reclaim_tombstones(slots: &mut [Slot<V>], mut idx: usize) {
        let capacity = slots.len();
        let mut reclaimed = 0;

        while reclaimed < capacity
            && matches!(slots[idx], Slot::Tombstone)
            && matches!(slots[(idx + 1) % capacity], Slot::Empty)
        {
            slots[idx] = Slot::Empty;
            idx = (idx + capacity - 1) % capacity;
            reclaimed += 1;
        }

        if reclaimed > 0 {
            trace!(reclaimed, "emptied trailing tombstones");
        }
    }

    fn find(&self, key: &str) -> Option<&Entry<V>> {
        match &self.buckets {
            Buckets::Chained(buckets) => buckets[self.slot_of(key)]
                .iter()
                .find(|entry| entry.key == key),
            Buckets::Open(slots) => {
                let idx = Self::locate(slots, self.probe(key), key)?;
                match &slots[idx] {
                    Slot::Occupied(entry) => Some(entry),
                    _ => None,
                }
            }
        }
    }
}

impl<V> Default for HashTable<V> {
    /// An empty chaining table with the default capacity.
    fn default() -> Self {
        let config = HashTableConfig::default();

        Self {
            buckets: Buckets::Chained((0..config.capacity).map(|_| Vec::new()).collect()),
            capacity: config.capacity,
            policy: config.policy,
            len: 0,
            next_seq: 0,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for HashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = (&'a str, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> Iter<'a, V> {
    fn next_entry(&mut self) -> Option<&'a Entry<V>> {
        loop {
            if let Some(entry) = self.bucket.next() {
                self.remaining -= 1;
                return Some(entry);
            }

            match self.buckets.next() {
                Some(bucket) => self.bucket = bucket.iter(),
                None => break,
            }
        }

        let entry = self.slots.find_map(|slot| match slot {
            Slot::Occupied(entry) => Some(entry),
            _ => None,
        })?;
        self.remaining -= 1;

        Some(entry)
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<'a, V> fmt::Debug for Iter<'a, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const POLICIES: [CollisionPolicy; 3] = [
        CollisionPolicy::Chaining,
        CollisionPolicy::LinearProbing,
        CollisionPolicy::DoubleHashing,
    ];

    #[test]
    fn test_chaining_collision_shares_bucket() {
        let mut table = HashTable::new(5, CollisionPolicy::Chaining).unwrap();

        assert_eq!(table.slot_of("a"), table.slot_of("f"));

        table.insert("a", 1).unwrap();
        table.insert("f", 2).unwrap();

        assert_eq!(table.get("f"), Some(&2));
        assert_eq!(table.get("a"), Some(&1));

        match &table.buckets {
            Buckets::Chained(buckets) => assert_eq!(buckets[table.slot_of("a")].len(), 2),
            Buckets::Open(_) => panic!("expected chained buckets"),
        }
    }

    #[test]
    fn test_linear_probing_places_collision_in_next_slot() {
        let mut table = HashTable::new(5, CollisionPolicy::LinearProbing).unwrap();

        table.insert("a", 1).unwrap();
        table.insert("f", 2).unwrap();

        match &table.buckets {
            Buckets::Open(slots) => {
                assert!(matches!(&slots[2], Slot::Occupied(entry) if entry.key == "a"));
                assert!(matches!(&slots[3], Slot::Occupied(entry) if entry.key == "f"));
            }
            Buckets::Chained(_) => panic!("expected open slots"),
        }
    }

    #[test]
    fn test_double_hashing_step() {
        let table = HashTable::<i32>::new(7, CollisionPolicy::DoubleHashing).unwrap();

        // b'a' == 97: h1 = 97 % 7 == 6, h2 = 1 + 97 % 6 == 2
        assert_eq!(table.probe_sequence("a"), vec![6, 1, 3, 5, 0, 2, 4]);

        let single = HashTable::<i32>::new(1, CollisionPolicy::DoubleHashing).unwrap();
        assert_eq!(single.probe_sequence("a"), vec![0]);
    }

    #[test]
    fn test_probe_sequence_covers_prime_table() {
        for policy in [CollisionPolicy::LinearProbing, CollisionPolicy::DoubleHashing] {
            let table = HashTable::<i32>::new(11, policy).unwrap();

            for key in ["", "a", "key", "another key"] {
                let mut seq = table.probe_sequence(key);
                seq.sort_unstable();
                assert_eq!(seq, (0..11).collect::<Vec<_>>(), "{policy} {key:?}");
            }
        }

        let chained = HashTable::<i32>::new(11, CollisionPolicy::Chaining).unwrap();
        assert_eq!(chained.probe_sequence("a"), vec![97 % 11]);
    }

    #[test]
    fn test_insert_get_remove_every_policy() {
        for policy in POLICIES {
            let mut table = HashTable::new(11, policy).unwrap();

            for i in 0..11 {
                table.insert(i.to_string(), i).unwrap();
            }
            assert_eq!(table.len(), 11);

            for i in 0..11 {
                assert_eq!(table.get(&i.to_string()), Some(&i), "{policy}");
            }
            assert!(!table.contains_key("11"));

            for i in (0..11).step_by(2) {
                assert_eq!(table.remove(&i.to_string()), Ok(i));
            }
            for i in 0..11 {
                assert_eq!(table.contains_key(&i.to_string()), i % 2 == 1, "{policy}");
            }
            assert_eq!(table.len(), 5);
        }
    }

    #[test]
    fn test_duplicate_key_rejected() {
        for policy in POLICIES {
            let mut table = HashTable::new(5, policy).unwrap();
            table.insert("k", 1).unwrap();

            assert_eq!(table.insert("k", 2), Err(Error::DuplicateKey));
            assert_eq!(table.get("k"), Some(&1));
            assert_eq!(table.len(), 1);
        }
    }

    #[test]
    fn test_capacity_exhausted_leaves_table_unchanged() {
        for policy in [CollisionPolicy::LinearProbing, CollisionPolicy::DoubleHashing] {
            let mut table = HashTable::new(3, policy).unwrap();
            for key in ["a", "b", "c"] {
                table.insert(key, 0).unwrap();
            }

            assert_eq!(
                table.insert("d", 0),
                Err(Error::CapacityExhausted { capacity: 3 })
            );
            assert_eq!(table.len(), 3);
            assert!(!table.contains_key("d"));
        }

        // Chaining never runs out of room.
        let mut chained = HashTable::new(1, CollisionPolicy::Chaining).unwrap();
        for i in 0..10 {
            chained.insert(i.to_string(), i).unwrap();
        }
        assert_eq!(chained.len(), 10);
        assert_eq!(chained.load_factor(), 10.0);
    }

    #[test]
    fn test_search_passes_tombstones() {
        let mut table = HashTable::new(5, CollisionPolicy::LinearProbing).unwrap();

        // "a", "f" and "k" all start probing at slot 2.
        table.insert("a", 1).unwrap();
        table.insert("f", 2).unwrap();
        table.insert("k", 3).unwrap();

        table.remove("f").unwrap();
        assert_eq!(table.get("k"), Some(&3));
        assert_eq!(table.remove("f"), Err(Error::NotFound));

        // Re-inserting a different key reuses the tombstone and does not bring
        // the deleted one back.
        table.insert("p", 4).unwrap();
        assert_eq!(table.get("f"), None);
        assert_eq!(table.get("p"), Some(&4));
        assert_eq!(table.get("k"), Some(&3));

        match &table.buckets {
            Buckets::Open(slots) => {
                assert!(matches!(&slots[3], Slot::Occupied(entry) if entry.key == "p"))
            }
            Buckets::Chained(_) => panic!("expected open slots"),
        }
    }

    #[test]
    fn test_linear_probing_empties_trailing_tombstones() {
        let mut table = HashTable::new(5, CollisionPolicy::LinearProbing).unwrap();

        // "a", "f" and "k" land in slots 2, 3 and 4.
        table.insert("a", 1).unwrap();
        table.insert("f", 2).unwrap();
        table.insert("k", 3).unwrap();

        // Slot 4 is still occupied, so slot 3 must stay a tombstone.
        table.remove("f").unwrap();
        match &table.buckets {
            Buckets::Open(slots) => assert!(matches!(slots[3], Slot::Tombstone)),
            Buckets::Chained(_) => panic!("expected open slots"),
        }

        // Slot 0 is empty, so slot 4 and the tombstone before it are emptied.
        table.remove("k").unwrap();
        match &table.buckets {
            Buckets::Open(slots) => {
                assert!(matches!(&slots[2], Slot::Occupied(entry) if entry.key == "a"));
                assert!(matches!(slots[3], Slot::Empty));
                assert!(matches!(slots[4], Slot::Empty));
            }
            Buckets::Chained(_) => panic!("expected open slots"),
        }

        assert_eq!(table.get("a"), Some(&1));
        assert_eq!(table.get("k"), None);
        assert_eq!(table.len(), 1);

        // A probe for "f" now stops at slot 3.
        table.insert("f", 4).unwrap();
        assert_eq!(table.get("f"), Some(&4));
    }

    #[test]
    fn test_double_hashing_keeps_tombstones() {
        let mut table = HashTable::new(5, CollisionPolicy::DoubleHashing).unwrap();

        table.insert("a", 1).unwrap();
        table.remove("a").unwrap();

        // Other keys may step over slot 2 along different strides.
        match &table.buckets {
            Buckets::Open(slots) => assert!(matches!(slots[2], Slot::Tombstone)),
            Buckets::Chained(_) => panic!("expected open slots"),
        }
    }

    #[test]
    fn test_insert_after_tombstone_rejects_duplicate_further_along() {
        let mut table = HashTable::new(5, CollisionPolicy::LinearProbing).unwrap();

        table.insert("a", 1).unwrap();
        table.insert("f", 2).unwrap();
        table.remove("a").unwrap();

        assert_eq!(table.insert("f", 3), Err(Error::DuplicateKey));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_full_table_with_tombstones_accepts_insert() {
        let mut table = HashTable::new(2, CollisionPolicy::DoubleHashing).unwrap();

        table.insert("a", 1).unwrap();
        table.insert("b", 2).unwrap();
        table.remove("a").unwrap();

        table.insert("c", 3).unwrap();
        assert_eq!(table.get("c"), Some(&3));
        assert_eq!(table.get("a"), None);
    }

    #[test]
    fn test_update() {
        for policy in POLICIES {
            let mut table = HashTable::new(5, policy).unwrap();
            table.insert("a", 1).unwrap();
            table.insert("f", 2).unwrap();

            assert_eq!(table.update("f", 20), Ok(2));
            assert_eq!(table.get("f"), Some(&20));
            assert_eq!(table.update("z", 0), Err(Error::NotFound));

            let order: Vec<_> = table.traverse().into_iter().map(|(k, _)| k).collect();
            assert_eq!(order, ["a", "f"]);
        }
    }

    #[test]
    fn test_traverse_insertion_order() {
        for policy in POLICIES {
            let mut table = HashTable::new(7, policy).unwrap();
            let keys = ["zeta", "alpha", "mid", "b", "omega"];

            for (i, key) in keys.iter().enumerate() {
                table.insert(*key, i).unwrap();
            }
            table.remove("mid").unwrap();
            table.insert("mid", 9).unwrap();

            let order: Vec<_> = table.traverse().into_iter().map(|(k, _)| k).collect();
            assert_eq!(order, ["zeta", "alpha", "b", "omega", "mid"], "{policy}");
            assert_eq!(table.iter().len(), 5);
        }
    }

    #[test]
    fn test_random_against_std() {
        let mut rng = fastrand::Rng::with_seed(11);

        for policy in POLICIES {
            let mut table = HashTable::new(101, policy).unwrap();
            let mut model = std::collections::HashMap::new();

            for _ in 0..2_000 {
                let key = rng.u32(0..150).to_string();
                if rng.bool() {
                    let expected = if model.contains_key(&key) {
                        Err(Error::DuplicateKey)
                    } else if policy.is_open_addressing() && model.len() == 101 {
                        Err(Error::CapacityExhausted { capacity: 101 })
                    } else {
                        Ok(())
                    };
                    assert_eq!(table.insert(key.clone(), 0), expected, "{policy}");
                    if expected.is_ok() {
                        model.insert(key, 0);
                    }
                } else {
                    let expected = model.remove(&key).ok_or(Error::NotFound);
                    assert_eq!(table.remove(&key), expected);
                }
                assert_eq!(table.len(), model.len());
            }

            for key in model.keys() {
                assert!(table.contains_key(key), "{policy} lost {key}");
            }
        }
    }

    #[test]
    fn test_invalid_capacity() {
        assert!(matches!(
            HashTable::<i32>::new(0, CollisionPolicy::LinearProbing),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_clear_and_debug() {
        let mut table = HashTable::new(3, CollisionPolicy::LinearProbing).unwrap();
        table.insert("a", 1).unwrap();
        assert_eq!(format!("{table:?}"), r#"{"a": 1}"#);

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.get("a"), None);
        table.insert("a", 2).unwrap();
        assert_eq!(table.get("a"), Some(&2));
    }
}
