use log::trace;

use crate::{
    compare::Compare,
    node::{Arena, Color, NodeId, Side, NIL},
    RbMap,
};

impl<K, V, C: Compare<K>> RbMap<K, V, C> {
    /// Removes `key` and returns its value. Removing an absent key is a
    /// no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let (z, _) = self.arena.search(key, &self.cmp);
        if z == NIL {
            return None;
        }
        Some(self.arena.delete(z))
    }
}

impl<K, V> Arena<K, V> {
    fn delete(&mut self, z: NodeId) -> (K, V) {
        let (left, right) = (self.left(z), self.right(z));
        let mut original = self.color(z);
        let x;

        if left == NIL {
            trace!("remove: node {z} has no left child");
            x = right;
            self.transplant(z, right);
        } else if right == NIL {
            trace!("remove: node {z} has only a left child");
            x = left;
            self.transplant(z, left);
        } else {
            let y = self.minimum(right);
            trace!("remove: node {z} replaced by its successor {y}");
            original = self.color(y);
            x = self.right(y);
            if self.parent(y) == z {
                self.set_parent(x, y);
            } else {
                self.transplant(y, x);
                self.set_child(y, Side::Right, right);
                self.set_parent(right, y);
            }
            self.transplant(z, y);
            self.set_child(y, Side::Left, left);
            self.set_parent(left, y);
            self.set_color(y, self.color(z));
        }

        if original == Color::Black {
            self.remove_fixup(x);
        }
        self.set_parent(NIL, NIL);
        self.release(z)
    }

    // `x` carries an extra black; it may be the sentinel, seated under the
    // vacated position by `transplant`.
    fn remove_fixup(&mut self, mut x: NodeId) {
        trace!("remove: fixing up from node {x}");
        while x != self.root() && self.color(x) == Color::Black {
            let side = self.side_of(x);
            let parent = self.parent(x);
            let mut s = self.child(parent, side.opposite());

            if self.color(s) == Color::Red {
                self.set_color(s, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                s = self.child(self.parent(x), side.opposite());
            }

            let near = self.child(s, side);
            let far = self.child(s, side.opposite());
            if self.color(near) == Color::Black
                && self.color(far) == Color::Black
            {
                self.set_color(s, Color::Red);
                x = self.parent(x);
                continue;
            }

            if self.color(far) == Color::Black {
                self.set_color(near, Color::Black);
                self.set_color(s, Color::Red);
                self.rotate(s, side.opposite());
                s = self.child(self.parent(x), side.opposite());
            }

            let parent = self.parent(x);
            self.set_color(s, self.color(parent));
            self.set_color(parent, Color::Black);
            let far = self.child(s, side.opposite());
            self.set_color(far, Color::Black);
            self.rotate(parent, side);
            x = self.root();
        }
        self.set_color(x, Color::Black);
    }
}

#[cfg(test)]
fn map_of(keys: impl IntoIterator<Item = i32>) -> RbMap<i32, i32> {
    keys.into_iter().map(|k| (k, k * 10)).collect()
}

#[test]
fn red_sibling_rotates_first() {
    let mut map = map_of(1..=6);
    assert_eq!(map.remove(&1), Some(10));
    assert_eq!(
        map.render(),
        [
            "    ┌── 6 (R)",
            "┌── 5 (B)",
            "4 (B)",
            "│   ┌── 3 (R)",
            "└── 2 (B)",
            "",
        ]
        .join("\n")
    );
    assert_eq!(map.check_invariants(), Ok(2));
}

#[test]
fn successor_is_right_child() {
    let mut map = map_of(1..=3);
    assert_eq!(map.remove_entry(&2), Some((2, 20)));
    assert_eq!(map.render(), "3 (B)\n└── 1 (R)\n");
    assert_eq!(map.check_invariants(), Ok(1));
}

#[test]
fn successor_deep_in_right_subtree() {
    let mut map = map_of([10, 15, 8, 13, 17, 19]);
    assert_eq!(map.len(), 6);
    assert_eq!(map.remove(&15), Some(150));
    assert_eq!(map.len(), 5);
    assert!(map.check_invariants().is_ok());
    assert!(map.lookup(&15).is_err());
    assert_eq!(map.lookup(&17), Ok(&170));
    for k in [10, 8, 13, 19] {
        assert_eq!(map.lookup(&k), Ok(&(k * 10)));
    }
}

#[test]
fn removal_scenarios() {
    let cases: [(&[i32], &[i32]); 8] = [
        (&[10], &[1]),
        (&[10, 15], &[10]),
        (&[10, 15, 8, 13], &[10]),
        (&[10, 15, 8, 13, 17, 19], &[15]),
        (&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], &[3, 2]),
        (&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], &[1, 2]),
        (&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], &[8, 9, 10]),
        (&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], &[5]),
    ];
    for (inserted, removed) in cases {
        let mut map = map_of(inserted.iter().copied());
        for k in removed {
            map.remove(k);
            assert!(map.check_invariants().is_ok());
        }
        let expected = inserted.iter().filter(|&&k| !removed.contains(&k));
        assert_eq!(map.len(), expected.clone().count());
        for &k in expected {
            assert_eq!(map.lookup(&k), Ok(&(k * 10)));
        }
        for k in removed {
            assert!(map.lookup(k).is_err());
        }
    }
}

#[test]
fn every_single_removal() {
    for n in 0..40 {
        for k in 0..n {
            let mut map = map_of(0..n);
            assert_eq!(map.remove(&k), Some(k * 10));
            assert!(map.check_invariants().is_ok());
            assert_eq!(map.len(), n as usize - 1);
            assert!(map.get(&k).is_none());
        }
    }
}

#[test]
fn drain_to_empty() {
    let keys = [100, 110, 90, 80, 70, 60, 50];
    let mut map = map_of(keys);
    assert_eq!(map.len(), 7);
    for k in keys {
        assert!(map.remove(&k).is_some());
        assert!(map.check_invariants().is_ok());
    }
    assert!(map.is_empty());
    assert_eq!(map.height(), 0);
    assert_eq!(map.remove(&100), None);

    map.insert(1, 1);
    assert_eq!(map.lookup(&1), Ok(&1));
}
