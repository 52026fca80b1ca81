use std::cmp::Ordering;

use log::trace;

use crate::{
    compare::Compare,
    node::{Arena, Color, NodeId, Side, NIL},
    RbMap,
};

impl<K, V, C: Compare<K>> RbMap<K, V, C> {
    /// Binds `value` to `key`. If `key` was present, its value is replaced
    /// in place and the old one is returned; the shape of the tree does not
    /// change.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let arena = &mut self.arena;
        if arena.root() == NIL {
            let root = arena.alloc(key, value, NIL, Color::Black);
            arena.set_root(root);
            trace!("insert: new root");
            return None;
        }

        let (node, parent) = arena.search(&key, &self.cmp);
        if node != NIL {
            trace!("insert: overwriting node {node}");
            return Some(std::mem::replace(arena.value_mut(node), value));
        }

        let side = match self.cmp.compare(&key, arena.key(parent)) {
            Ordering::Less => Side::Left,
            _ => Side::Right,
        };
        let z = arena.alloc(key, value, parent, Color::Red);
        arena.set_child(parent, side, z);
        trace!("insert: node {z} under {parent}");

        // A red child of the black root needs nothing.
        if arena.parent(parent) != NIL {
            arena.insert_fixup(z);
        }
        None
    }
}

impl<K, V> Arena<K, V> {
    fn insert_fixup(&mut self, mut z: NodeId) {
        // The sentinel above the root is black, which ends the loop there.
        while self.color(self.parent(z)) == Color::Red {
            let parent = self.parent(z);
            let grand = self.parent(parent);
            let side = self.side_of(parent);
            let uncle = self.child(grand, side.opposite());

            if self.color(uncle) == Color::Red {
                self.recolor(parent, uncle, grand);
                z = grand;
                continue;
            }

            if self.side_of(z) != side {
                z = parent;
                self.rotate(z, side);
            }
            let parent = self.parent(z);
            let grand = self.parent(parent);
            self.set_color(parent, Color::Black);
            self.set_color(grand, Color::Red);
            self.rotate(grand, side.opposite());
        }
        let root = self.root();
        self.set_color(root, Color::Black);
    }

    // The root keeps its color here; it is forced black once the loop ends.
    fn recolor(&mut self, parent: NodeId, uncle: NodeId, grand: NodeId) {
        self.set_color(uncle, Color::Black);
        self.set_color(parent, Color::Black);
        if grand != self.root() {
            self.set_color(grand, Color::Red);
        }
    }
}

#[test]
fn straight_line_rotates() {
    let mut map = RbMap::new();
    for i in 1..=3 {
        map.insert(i, i * 10);
    }
    assert_eq!(map.render(), "┌── 3 (R)\n2 (B)\n└── 1 (R)\n");
    assert_eq!(map.check_invariants(), Ok(1));

    let mut map = RbMap::new();
    for i in (1..=3).rev() {
        map.insert(i, i * 10);
    }
    assert_eq!(map.render(), "┌── 3 (R)\n2 (B)\n└── 1 (R)\n");
}

#[test]
fn zig_zag_straightens() {
    for order in [[1, 3, 2], [3, 1, 2]] {
        let mut map = RbMap::new();
        for i in order {
            map.insert(i, ());
        }
        assert_eq!(map.render(), "┌── 3 (R)\n2 (B)\n└── 1 (R)\n");
    }
}

#[test]
fn red_uncle_recolors() {
    let mut map = RbMap::new();
    for i in [2, 1, 3, 4] {
        map.insert(i, ());
    }
    // the grandparent is the root and stays black
    assert_eq!(
        map.render(),
        ["    ┌── 4 (R)", "┌── 3 (B)", "2 (B)", "└── 1 (B)", ""].join("\n")
    );

    let mut map = RbMap::new();
    for i in 1..=6 {
        map.insert(i, ());
    }
    // here the grandparent `4` is not the root and turns red
    assert_eq!(
        map.render(),
        [
            "        ┌── 6 (R)",
            "    ┌── 5 (B)",
            "┌── 4 (R)",
            "│   └── 3 (B)",
            "2 (B)",
            "└── 1 (B)",
            "",
        ]
        .join("\n")
    );
    assert_eq!(map.check_invariants(), Ok(2));
}

#[test]
fn overwrite_keeps_shape() {
    let mut map = RbMap::new();
    for i in 0..20 {
        map.insert(i, 'a');
    }
    let before = map.render();
    assert_eq!(map.insert(7, 'b'), Some('a'));
    assert_eq!(map.len(), 20);
    assert_eq!(map.render(), before);
    assert_eq!(map.lookup(&7), Ok(&'b'));
}

#[test]
fn insertion_patterns() {
    for keys in [&[1, 5, 2][..], &[10, 1, 5, 2], &[10, 1, 15, 12]] {
        let mut map = RbMap::new();
        for &k in keys {
            assert_eq!(map.insert(k, 1), None);
            assert!(map.check_invariants().is_ok());
        }
        assert_eq!(map.len(), keys.len());
    }
}
