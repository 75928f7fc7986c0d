//! Hash table over a single flat slot array.
//!
//! Keys live in an append-only vector that keeps insertion order, while values
//! live in `slots`, indexed by `hash(key) mod capacity`. There is no probing
//! and no chaining: whenever two distinct keys land on the same slot the whole
//! table doubles until they don't.

use crate::collections::hash;
use crate::error::TableError;
use crate::{debug, info};
use std::borrow::Borrow;
use std::fmt::{self, Debug, Display};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

const CAPACITY: usize = 1 << 8;
const LOAD_FACTOR: f64 = 0.1;
const MIN_LOAD_FACTOR: f64 = 0.01;

pub struct Table<K, V, S = hash::BuildHasher> {
    keys: Vec<K>,
    slots: Box<[Option<V>]>,
    load_factor: f64,
    hasher: S,
}

pub struct TableBuilder<K, V, S = hash::BuildHasher> {
    hasher: S,
    capacity: usize,
    load_factor: f64,
    _kv: PhantomData<(K, V)>,
}

/// Keys in insertion order. See [`Table::keys`].
pub struct Keys<'t, K> {
    inner: std::slice::Iter<'t, K>,
}

/// `(key, value)` pairs in insertion order. See [`Table::entries`].
pub struct Entries<'t, K, V, S> {
    keys: std::slice::Iter<'t, K>,
    table: &'t Table<K, V, S>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Trigger {
    Load,
    Collision,
    Explicit,
}

impl<K, V> Table<K, V> {
    #[inline]
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TableBuilder<K, V> {
        TableBuilder {
            hasher: hash::BuildHasher,
            capacity: CAPACITY,
            load_factor: LOAD_FACTOR,
            _kv: PhantomData,
        }
    }
}

impl<K, V, S> Table<K, V, S> {
    fn with_config(capacity: usize, load_factor: f64, hasher: S) -> Self {
        Self {
            keys: Vec::new(),
            slots: empty_slots(capacity),
            load_factor,
            hasher,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Lazily walks the keys in the order they were first inserted. Every
    /// call starts over from the first key.
    #[inline]
    pub fn keys(&self) -> Keys<'_, K> {
        Keys {
            inner: self.keys.iter(),
        }
    }

    #[inline]
    pub fn iter(&self) -> Keys<'_, K> {
        self.keys()
    }

    #[inline]
    fn exceeds_load(&self) -> bool {
        self.len() as f64 / self.capacity() as f64 > self.load_factor
    }
}

impl<K, V, S> Table<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Returns the value stored in the slot `key` hashes to.
    ///
    /// The occupant of the slot is never compared against `key`: lookups
    /// trust that [`set`](Self::set) never lets two distinct keys share a
    /// slot, which keeps them to one hash and one index. Asking for a key
    /// that was never inserted but hashes onto an occupied slot returns that
    /// slot's value.
    ///
    /// A miss names the key in its `Debug` form, so string keys show up
    /// quoted in [`TableError::NotFound`].
    pub fn get<Q>(&self, key: &Q) -> crate::Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        match &self.slots[self.slot(key)] {
            Some(value) => Ok(value),
            None => Err(TableError::NotFound(format!("{key:?}"))),
        }
    }

    /// Inserts or updates `key`. Passing `None` fails with
    /// [`TableError::InvalidValue`] and leaves the table untouched.
    ///
    /// A new key whose slot is already taken by another key grows the table
    /// until the two are apart, and a new key pushing the load past
    /// [`load_factor`](Self::load_factor) doubles it once.
    pub fn set(&mut self, key: K, value: impl Into<Option<V>>) -> crate::Result<()> {
        match value.into() {
            Some(value) => {
                self.insert(key, value);
                Ok(())
            }
            None => Err(TableError::InvalidValue),
        }
    }

    /// Linear scan over the keys, doesn't touch the slots.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.keys.iter().any(|k| k.borrow() == key)
    }

    /// Doubles the capacity and places every key again, doubling further for
    /// as long as the new layout puts two keys on the same slot.
    pub fn resize(&mut self) {
        self.grow(Trigger::Explicit);
    }

    pub fn entries(&self) -> Entries<'_, K, V, S> {
        Entries {
            keys: self.keys.iter(),
            table: self,
        }
    }

    fn insert(&mut self, key: K, value: V) {
        loop {
            let idx = self.slot(&key);

            if self.slots[idx].is_none() {
                self.keys.push(key);
                self.slots[idx] = Some(value);

                while self.exceeds_load() {
                    self.grow(Trigger::Load);
                }

                return;
            }

            if self.contains(&key) {
                self.slots[idx] = Some(value);
                return;
            }

            let hash = self.hasher.hash_one(&key);
            assert!(
                !self.keys.iter().any(|k| self.hasher.hash_one(k) == hash),
                "Distinct keys share the hash {hash:#x} and can never be apart"
            );

            info!("slot {idx} is taken by another key, growing from {}", self.capacity());
            self.grow(Trigger::Collision);
        }
    }

    fn grow(&mut self, trigger: Trigger) {
        let previous = self.capacity();

        let hashes: Vec<u64> = self.keys.iter().map(|k| self.hasher.hash_one(k)).collect();

        // values follow the order of `keys` and survive every failed layout
        let mut values: Vec<Option<V>> = hashes
            .iter()
            .map(|hash| self.slots[index(*hash, previous)].take())
            .collect();

        let mut capacity = previous;

        let layout = loop {
            assert!(
                capacity <= (isize::MAX as usize) >> 1,
                "Table exceeded maximum capacity"
            );

            capacity <<= 1;

            if let Some(layout) = place(&hashes, capacity) {
                break layout;
            }
        };

        let mut slots = empty_slots(capacity);
        for (idx, position) in layout.into_iter().enumerate() {
            if let Some(position) = position {
                slots[idx] = values[position].take();
            }
        }

        self.slots = slots;

        debug!(
            "resized table from {previous} to {capacity} ({} keys, {trigger:?})",
            self.len()
        );
    }

    #[inline]
    fn slot<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        index(self.hasher.hash_one(key), self.capacity())
    }
}

/// Maps each slot to the position of the key that owns it, or `None` as soon
/// as two hashes fall on the same slot. Keys apart at a power of two stay apart
/// at its double, so growing from a collision-free table succeeds first try.
fn place(hashes: &[u64], capacity: usize) -> Option<Vec<Option<usize>>> {
    let mut layout = vec![None; capacity];

    for (position, hash) in hashes.iter().enumerate() {
        let slot = &mut layout[index(*hash, capacity)];
        if slot.is_some() {
            return None;
        }

        *slot = Some(position);
    }

    Some(layout)
}

#[inline]
fn index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

fn empty_slots<V>(capacity: usize) -> Box<[Option<V>]> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

impl<K, V, S> TableBuilder<K, V, S> {
    pub fn build(self) -> Table<K, V, S> {
        Table::with_config(self.capacity, self.load_factor, self.hasher)
    }

    /// Rounded up to the next power of two.
    pub fn capacity(self, capacity: usize) -> Self {
        let capacity = capacity
            .max(1)
            .checked_next_power_of_two()
            .filter(|capacity| *capacity <= isize::MAX as usize);

        Self {
            capacity: capacity.expect("Table exceeded maximum capacity"),
            ..self
        }
    }

    /// Clamped to `[0.01, 1]`.
    pub fn load_factor(self, load_factor: f64) -> Self {
        let load_factor = match load_factor.is_nan() {
            true => LOAD_FACTOR,
            _ => load_factor.clamp(MIN_LOAD_FACTOR, 1.0),
        };

        Self {
            load_factor,
            ..self
        }
    }

    pub fn hasher<H>(self, hasher: H) -> TableBuilder<K, V, H> {
        TableBuilder {
            hasher,
            capacity: self.capacity,
            load_factor: self.load_factor,
            _kv: PhantomData,
        }
    }
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t, K> Iterator for Keys<'t, K> {
    type Item = &'t K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Keys<'_, K> {}

impl<'t, K, V, S> Iterator for Entries<'t, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'t K, &'t V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        let value = self.table.slots[self.table.slot(key)].as_ref()?;

        Some((key, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.keys.len()))
    }
}

impl<'t, K, V, S> IntoIterator for &'t Table<K, V, S> {
    type Item = &'t K;
    type IntoIter = Keys<'t, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys()
    }
}

impl<K, V, S> Extend<(K, V)> for Table<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Table<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Table::new();
        table.extend(iter);
        table
    }
}

impl<K, V, S> Display for Table<K, V, S>
where
    K: Eq + Hash + Display,
    V: Display,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Table[")?;

        for (i, (key, value)) in self.entries().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}:{value}")?;
        }

        f.write_str("]")
    }
}

impl<K, V, S> Debug for Table<K, V, S>
where
    K: Eq + Hash + Debug,
    V: Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Distinct by value, identical under every hash.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Pinned(u8);

    impl Hash for Pinned {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            state.write_u64(7);
        }
    }

    #[test]
    fn new_table_is_empty() {
        let table = Table::<u32, u32>::new();

        assert!(table.is_empty());
        assert_eq!(table.capacity(), 256);
        assert_eq!(table.keys().count(), 0);
    }

    #[test]
    fn set_and_get() {
        let mut table = Table::<i32, &str>::new();
        table.set(1, "First").unwrap();

        assert_eq!(table.get(&1), Ok(&"First"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn update_keeps_a_single_key() {
        let mut table = Table::<i32, &str>::new();
        table.set(1, "First").unwrap();
        table.set(1, "Second").unwrap();

        assert_eq!(table.get(&1), Ok(&"Second"));
        assert_eq!(table.keys().collect::<Vec<_>>(), [&1]);
    }

    #[test]
    fn get_missing() {
        let table = Table::<&str, u32>::new();

        assert_eq!(
            table.get("Lettuce"),
            Err(TableError::NotFound(String::from("\"Lettuce\"")))
        );
    }

    #[test]
    fn rejects_empty_value() {
        let mut table = Table::<u32, &str>::new();
        table.set(3, "Three").unwrap();

        assert_eq!(table.set(4, None::<&str>), Err(TableError::InvalidValue));
        assert_eq!(table.set(3, None::<&str>), Err(TableError::InvalidValue));
        assert_eq!(table.get(&3), Ok(&"Three"));
        assert_eq!(table.len(), 1);
        assert!(!table.contains(&4));
    }

    #[test]
    fn explicit_resize_doubles() {
        let mut table = Table::<i32, char>::new();
        table.set(1, 'a').unwrap();
        table.set(2, 'b').unwrap();
        table.resize();

        assert_eq!(table.capacity(), 512);
        assert_eq!(table.get(&1), Ok(&'a'));
        assert_eq!(table.get(&2), Ok(&'b'));
    }

    #[test]
    fn collision_grows_the_table() {
        let mut table = Table::<u64, &str>::builder().capacity(8).load_factor(1.0).build();
        table.set(1u64, "one").unwrap();
        table.set(9u64, "nine").unwrap();

        assert_eq!(table.capacity(), 16);
        assert_eq!(table.get(&1), Ok(&"one"));
        assert_eq!(table.get(&9), Ok(&"nine"));
    }

    #[test]
    fn colliding_insert_retries_until_apart() {
        // 1 and 33 share a slot at 16 and still do at 32
        let mut table = Table::<u64, i32>::builder().capacity(16).load_factor(1.0).build();
        table.set(1, 1).unwrap();
        table.set(33, 33).unwrap();

        assert_eq!(table.capacity(), 64);

        table.set(17, 17).unwrap();
        for key in [1u64, 33, 17] {
            assert_eq!(table.get(&key), Ok(&(key as i32)));
        }
    }

    #[test]
    fn load_factor_triggers_resize() {
        let mut table = Table::<u64, i32>::builder().capacity(16).build();
        table.set(0u64, 0).unwrap();

        assert_eq!(table.capacity(), 16);

        // 2 / 16 > 0.1
        table.set(1u64, 1).unwrap();
        assert_eq!(table.capacity(), 32);
    }

    #[test]
    fn trusting_lookup_returns_the_slot_occupant() {
        let mut table = Table::<u64, &str>::new();
        table.set(1u64, "First").unwrap();

        // 257 was never inserted but lands on slot 1
        assert_eq!(table.get(&257), Ok(&"First"));
        assert!(!table.contains(&257));
    }

    #[test]
    fn keys_keep_insertion_order_across_resizes() {
        let mut table = Table::<u64, u64>::new();
        let keys: Vec<u64> = (0..100).rev().map(|i| i * 37).collect();
        for key in &keys {
            table.set(*key, key + 1).unwrap();
        }

        assert!(table.capacity() >= 1024);
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), keys);
        for key in &keys {
            assert_eq!(table.get(key), Ok(&(key + 1)));
        }
    }

    #[test]
    fn iteration_restarts() {
        let table: Table<_, _> = [("a", 1), ("b", 2)].into_iter().collect();

        let first: Vec<_> = table.iter().collect();
        let second: Vec<_> = (&table).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(table.keys().len(), 2);
    }

    #[test]
    fn entries_follow_keys() {
        let mut table = Table::<&str, &str>::new();
        table.extend([("Hello", "World"), ("Lettuce", "orange")]);
        table.set("Hello", "WORLD!").unwrap();

        let entries: Vec<_> = table.entries().collect();
        assert_eq!(entries, [(&"Hello", &"WORLD!"), (&"Lettuce", &"orange")]);
    }

    #[test]
    fn display_in_insertion_order() {
        let mut table = Table::<i32, &str>::new();
        assert_eq!(table.to_string(), "Table[]");

        table.set(2, "Re").unwrap();
        table.set(1, "Do").unwrap();
        assert_eq!(table.to_string(), "Table[2:Re, 1:Do]");
        assert_eq!(format!("{table:?}"), r#"{2: "Re", 1: "Do"}"#);
    }

    #[test]
    fn borrowed_lookups() {
        let mut table = Table::<String, i32>::new();
        table.set(String::from("bab"), 3).unwrap();

        assert!(table.contains("bab"));
        assert_eq!(table.get("bab"), Ok(&3));
    }

    #[test]
    #[should_panic(expected = "maximum capacity")]
    fn builder_rejects_unrepresentable_capacity() {
        Table::<u8, u8>::builder().capacity((1 << 63) + 1);
    }

    #[test]
    fn grid_keys_round_trip() {
        let mut table = Table::<(u8, u8), u16>::new();
        for a in 0..40u8 {
            for b in 0..40u8 {
                table.set((a, b), a as u16 * 40 + b as u16).unwrap();
            }
        }

        assert_eq!(table.len(), 1600);
        for a in 0..40u8 {
            for b in 0..40u8 {
                assert_eq!(table.get(&(a, b)), Ok(&(a as u16 * 40 + b as u16)));
            }
        }
    }

    #[test]
    fn builder_normalises_config() {
        let table = Table::<u8, u8>::builder()
            .capacity(100)
            .load_factor(7.5)
            .build();

        assert_eq!(table.capacity(), 128);
        assert_eq!(table.load_factor(), 1.0);

        let table = Table::<u8, u8>::builder().capacity(0).load_factor(f64::NAN).build();
        assert_eq!(table.capacity(), 1);
        assert_eq!(table.load_factor(), LOAD_FACTOR);
    }

    #[test]
    fn custom_hasher() {
        let mut table = Table::<&str, &str>::builder()
            .hasher(std::hash::RandomState::new())
            .build();

        table.set("mht", "Fa").unwrap();
        assert_eq!(table.get("mht"), Ok(&"Fa"));
    }

    #[test]
    #[should_panic(expected = "can never be apart")]
    fn identical_hashes_are_never_separated() {
        let mut table = Table::<Pinned, u8>::new();
        table.set(Pinned(0), 0).unwrap();
        table.set(Pinned(1), 1).unwrap();
    }
}
