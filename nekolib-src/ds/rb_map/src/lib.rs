//! An ordered map on a red-black tree.
//!
//! Nodes live in an arena and refer to each other by index; index `0` is
//! the one sentinel standing for every missing child and for the parent of
//! the root. Lookup, insertion and removal take $O(\log n)$ time, and the
//! height of a tree with $n$ entries is at most $2\log_2(n+1)$.
//!
//! ```
//! use rb_map::{KeyNotFound, RbMap};
//!
//! let mut map = RbMap::new();
//! for k in [100, 110, 90, 80, 70, 60, 50] {
//!     map.insert(k, k / 10);
//! }
//! assert_eq!(map.len(), 7);
//! assert_eq!(map.lookup(&90), Ok(&9));
//!
//! assert_eq!(map.insert(90, 0), Some(9));
//! assert_eq!(map.remove(&90), Some(0));
//! assert_eq!(map.lookup(&90), Err(KeyNotFound));
//! assert_eq!(map.remove(&90), None);
//! ```

use std::fmt;

use log::debug;

mod compare;
mod debug;
mod error;
mod insert;
mod node;
mod remove;

pub use compare::{Compare, Natural, Reverse};
pub use error::{InvariantViolation, KeyNotFound};
pub use node::Color;

use node::{Arena, NIL};

pub struct RbMap<K, V, C = Natural> {
    arena: Arena<K, V>,
    cmp: C,
}

impl<K: Ord, V> RbMap<K, V> {
    pub fn new() -> Self { Self::with_comparator(Natural) }
    pub fn with_capacity(capacity: usize) -> Self {
        Self { arena: Arena::with_capacity(capacity), cmp: Natural }
    }
}

impl<K, V, C> RbMap<K, V, C> {
    pub fn with_comparator(cmp: C) -> Self { Self { arena: Arena::new(), cmp } }

    pub fn len(&self) -> usize { self.arena.len() }
    pub fn is_empty(&self) -> bool { self.arena.len() == 0 }

    /// Number of edges on the longest path from the root; `0` for an empty
    /// map as well as for a single entry.
    pub fn height(&self) -> usize { self.arena.height() }

    pub fn clear(&mut self) {
        debug!("clear: dropping {} entries", self.len());
        self.arena.clear();
    }

    /// Moves the whole tree out, leaving `self` empty and usable.
    pub fn take(&mut self) -> Self
    where
        C: Clone,
    {
        let arena = std::mem::take(&mut self.arena);
        Self { arena, cmp: self.cmp.clone() }
    }
}

impl<K, V, C: Compare<K>> RbMap<K, V, C> {
    pub fn lookup(&self, key: &K) -> Result<&V, KeyNotFound> {
        self.get(key).ok_or(KeyNotFound)
    }
    pub fn get(&self, key: &K) -> Option<&V> {
        match self.arena.search(key, &self.cmp) {
            (NIL, _) => None,
            (i, _) => Some(self.arena.value(i)),
        }
    }
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.arena.search(key, &self.cmp) {
            (NIL, _) => None,
            (i, _) => Some(self.arena.value_mut(i)),
        }
    }
    pub fn contains_key(&self, key: &K) -> bool {
        self.arena.search(key, &self.cmp).0 != NIL
    }
}

// Copies are built by inserting every entry again, so the copy is balanced
// on its own and need not share the source's shape.
impl<K, V, C> Clone for RbMap<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Compare<K> + Clone,
{
    fn clone(&self) -> Self {
        let mut res = Self::with_comparator(self.cmp.clone());
        res.clone_from(self);
        res
    }
    fn clone_from(&mut self, source: &Self) {
        debug!("clone: {} entries", source.len());
        self.clear();
        self.cmp = source.cmp.clone();
        for (k, v) in source.arena.entries() {
            self.insert(k.clone(), v.clone());
        }
    }
}

impl<K, V, C: Default> Default for RbMap<K, V, C> {
    fn default() -> Self { Self::with_comparator(C::default()) }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for RbMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for RbMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut res = Self::default();
        res.extend(iter);
        res
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for RbMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.arena, &other.arena);
        self.len() == other.len()
            && a.in_order()
                .zip(b.in_order())
                .all(|(i, j)| a.entry(i) == b.entry(j))
    }
}

impl<K: Eq, V: Eq, C> Eq for RbMap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RbMap<K, V, C> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = &self.arena;
        fmt.debug_map()
            .entries(arena.in_order().map(|i| arena.entry(i)))
            .finish()
    }
}

#[test]
fn empty_map() {
    let map = RbMap::<i32, i32>::new();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert_eq!(map.height(), 0);
    for k in [0, 1, -1, i32::MAX] {
        assert_eq!(map.lookup(&k), Err(KeyNotFound));
    }
    assert_eq!(map.check_invariants(), Ok(0));
    assert_eq!(format!("{map:?}"), "{}");
}

#[test]
fn descending_inserts() {
    let keys = [100, 110, 90, 80, 70, 60, 50];
    let mut map = RbMap::new();
    for (i, k) in keys.into_iter().enumerate() {
        assert_eq!(map.insert(k, i), None);
    }
    assert_eq!(map.len(), 7);
    for (i, k) in keys.into_iter().enumerate() {
        assert_eq!(map.lookup(&k), Ok(&i));
    }
    assert!(map.check_invariants().is_ok());
    assert_eq!(
        format!("{map:?}"),
        "{50: 6, 60: 5, 70: 4, 80: 3, 90: 2, 100: 0, 110: 1}"
    );
}

#[test]
fn overwrite() {
    let mut map = RbMap::new();
    assert_eq!(map.insert(100, "x"), None);
    assert_eq!(map.insert(100, "y"), Some("x"));
    assert_eq!(map.len(), 1);
    assert_eq!(map.lookup(&100), Ok(&"y"));

    *map.get_mut(&100).unwrap() = "z";
    assert_eq!(map.get(&100), Some(&"z"));
    assert!(map.contains_key(&100));
    assert!(!map.contains_key(&101));
    assert!(map.get_mut(&101).is_none());
}

#[test]
fn absent_removal_changes_nothing() {
    let mut map: RbMap<_, _> = (0..50).map(|k| (2 * k, k)).collect();
    let before = map.render();
    for k in (0..50).map(|k| 2 * k + 1) {
        assert_eq!(map.remove(&k), None);
    }
    assert_eq!(map.len(), 50);
    assert_eq!(map.render(), before);
}

#[test]
fn copies_are_independent() {
    let mut a: RbMap<_, _> = (1..12).map(|k| (k, 1)).collect();
    let mut b = a.clone();
    assert_eq!(b.len(), 11);
    assert_eq!(b.lookup(&1), Ok(&1));
    assert_eq!(a, b);
    assert!(b.check_invariants().is_ok());

    b.insert(1, 2);
    b.remove(&5);
    b.insert(20, 20);
    assert_eq!(a.lookup(&1), Ok(&1));
    assert_eq!(a.lookup(&5), Ok(&1));
    assert!(a.lookup(&20).is_err());
    assert_eq!(a.len(), 11);
    assert_ne!(a, b);

    a.remove(&1);
    assert_eq!(b.lookup(&1), Ok(&2));

    let mut c = RbMap::new();
    c.insert(-1, -1);
    c.clone_from(&a);
    assert_eq!(c, a);
    assert!(c.lookup(&-1).is_err());
}

#[test]
fn take_leaves_source_empty() {
    let mut a: RbMap<_, _> = (1..12).map(|k| (k, 1)).collect();
    let b = a.take();
    assert_eq!(b.len(), 11);
    assert_eq!(b.lookup(&1), Ok(&1));
    assert_eq!(a.len(), 0);
    assert_eq!(a.height(), 0);
    assert!(a.lookup(&1).is_err());
    assert_eq!(a.check_invariants(), Ok(0));

    a.insert(3, 3);
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 11);

    let c = std::mem::take(&mut a);
    assert!(a.is_empty());
    assert_eq!(c.lookup(&3), Ok(&3));
}

#[test]
fn clear_then_reuse() {
    let mut map: RbMap<_, _> = (0..100).map(|k| (k, k)).collect();
    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.check_invariants(), Ok(0));
    map.extend((0..10).map(|k| (k, -k)));
    assert_eq!(map.len(), 10);
    assert_eq!(map.lookup(&9), Ok(&-9));
}

#[test]
fn height_bound() {
    let mut map = RbMap::with_capacity(1 << 12);
    for n in 1..=1 << 12 {
        map.insert(n, ());
        let bound = 2.0 * ((n + 1) as f64).log2();
        assert!(map.height() as f64 <= bound, "n = {n}");
    }
    // a single entry has no edges
    let single: RbMap<_, _> = [(0, ())].into_iter().collect();
    assert_eq!(single.height(), 0);
}

#[test]
fn reversed_order() {
    let mut map = RbMap::with_comparator(Reverse(Natural));
    for k in 0..10 {
        map.insert(k, k * k);
    }
    assert!(map.check_invariants().is_ok());
    assert_eq!(map.lookup(&3), Ok(&9));
    assert_eq!(
        format!("{map:?}"),
        "{9: 81, 8: 64, 7: 49, 6: 36, 5: 25, 4: 16, 3: 9, 2: 4, 1: 1, 0: 0}"
    );
}

#[test]
fn drop_releases_every_entry_once() {
    use std::rc::Rc;

    let token = Rc::new(());
    {
        let mut map = RbMap::new();
        for k in 0..100 {
            map.insert(k, Rc::clone(&token));
        }
        for k in (0..100).step_by(3) {
            map.remove(&k);
        }
        map.insert(1, Rc::clone(&token));
        assert_eq!(Rc::strong_count(&token), 1 + map.len());
    }
    assert_eq!(Rc::strong_count(&token), 1);
}

#[test]
fn random_against_btreemap() {
    use std::collections::BTreeMap;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_seed([0; 32]);
    for &key_range in &[8, 64, 1000] {
        let mut actual = RbMap::new();
        let mut expected = BTreeMap::new();
        for _ in 0..5000 {
            let k = rng.gen_range(0..key_range);
            match rng.gen_range(0..3) {
                0 | 1 => {
                    let v = rng.gen::<u32>();
                    assert_eq!(actual.insert(k, v), expected.insert(k, v));
                }
                _ => assert_eq!(actual.remove(&k), expected.remove(&k)),
            }
            assert_eq!(actual.len(), expected.len());
            assert!(actual.check_invariants().is_ok());

            let q = rng.gen_range(0..key_range);
            assert_eq!(actual.lookup(&q).ok(), expected.get(&q));
        }
        assert_eq!(format!("{actual:?}"), format!("{expected:?}"));
    }
}

#[test]
fn shuffled_unique_keys() {
    use rand::{seq::SliceRandom, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::seed_from_u64(0x5eed);
    let n = 2000;
    let mut keys: Vec<_> = (0..n).collect();
    keys.shuffle(&mut rng);

    let mut map = RbMap::new();
    for &k in &keys {
        map.insert(k, k + 1);
    }
    assert_eq!(map.len(), n);
    assert!(map.check_invariants().is_ok());
    for &k in &keys {
        assert_eq!(map.lookup(&k), Ok(&(k + 1)));
    }

    keys.shuffle(&mut rng);
    for (i, &k) in keys.iter().enumerate() {
        assert_eq!(map.remove(&k), Some(k + 1));
        assert!(map.lookup(&k).is_err());
        assert_eq!(map.len(), n - i - 1);
        if i % 97 == 0 {
            assert!(map.check_invariants().is_ok());
        }
    }
    assert!(map.is_empty());
}
