use std::{cmp::Ordering, fmt};

use crate::compare::Compare;

pub(crate) type NodeId = usize;

/// The shared sentinel. It stands for every external leaf and for the
/// parent of the root.
pub(crate) const NIL: NodeId = 0;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => fmt.write_str("red"),
            Color::Black => fmt.write_str("black"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Link {
    pub parent: NodeId,
    pub left: NodeId,
    pub right: NodeId,
    pub color: Color,
}

impl Link {
    const SENTINEL: Self =
        Self { parent: NIL, left: NIL, right: NIL, color: Color::Black };

    fn leaf(parent: NodeId, color: Color) -> Self {
        Self { parent, left: NIL, right: NIL, color }
    }
}

// `links[0]` is the sentinel; node `i` owns `entries[i - 1]`. Both vectors
// are kept dense: every index in `1..links.len()` is a live node.
pub(crate) struct Arena<K, V> {
    links: Vec<Link>,
    entries: Vec<(K, V)>,
    root: NodeId,
}

impl<K, V> Arena<K, V> {
    pub fn new() -> Self { Self::with_capacity(0) }
    pub fn with_capacity(capacity: usize) -> Self {
        let mut links = Vec::with_capacity(capacity + 1);
        links.push(Link::SENTINEL);
        Self { links, entries: Vec::with_capacity(capacity), root: NIL }
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn root(&self) -> NodeId { self.root }
    pub fn set_root(&mut self, root: NodeId) { self.root = root; }

    pub fn link(&self, i: NodeId) -> &Link { &self.links[i] }
    pub fn parent(&self, i: NodeId) -> NodeId { self.links[i].parent }
    pub fn left(&self, i: NodeId) -> NodeId { self.links[i].left }
    pub fn right(&self, i: NodeId) -> NodeId { self.links[i].right }
    pub fn color(&self, i: NodeId) -> Color { self.links[i].color }
    pub fn child(&self, i: NodeId, side: Side) -> NodeId {
        match side {
            Side::Left => self.links[i].left,
            Side::Right => self.links[i].right,
        }
    }

    pub fn set_parent(&mut self, i: NodeId, parent: NodeId) {
        self.links[i].parent = parent;
    }
    pub fn set_color(&mut self, i: NodeId, color: Color) {
        debug_assert!(i != NIL || color == Color::Black);
        self.links[i].color = color;
    }
    pub fn set_child(&mut self, i: NodeId, side: Side, child: NodeId) {
        match side {
            Side::Left => self.links[i].left = child,
            Side::Right => self.links[i].right = child,
        }
    }

    /// Which side of its parent `i` hangs on. Meaningful for the sentinel
    /// only while its `parent` field is seated by a deletion.
    pub fn side_of(&self, i: NodeId) -> Side {
        if self.left(self.parent(i)) == i { Side::Left } else { Side::Right }
    }

    pub fn key(&self, i: NodeId) -> &K { &self.entries[i - 1].0 }
    pub fn value(&self, i: NodeId) -> &V { &self.entries[i - 1].1 }
    pub fn value_mut(&mut self, i: NodeId) -> &mut V {
        &mut self.entries[i - 1].1
    }
    pub fn entry(&self, i: NodeId) -> (&K, &V) {
        let (k, v) = &self.entries[i - 1];
        (k, v)
    }
    pub fn entries(&self) -> &[(K, V)] { &self.entries }

    pub fn alloc(
        &mut self,
        key: K,
        value: V,
        parent: NodeId,
        color: Color,
    ) -> NodeId {
        self.links.push(Link::leaf(parent, color));
        self.entries.push((key, value));
        self.links.len() - 1
    }

    /// Frees a node that is no longer referenced by any live link. The last
    /// node is moved into the vacated slot and everything pointing at it
    /// is re-pointed.
    pub fn release(&mut self, z: NodeId) -> (K, V) {
        debug_assert!(z != NIL);
        let last = self.links.len() - 1;
        if z != last {
            let Link { parent, left, right, .. } = self.links[last];
            if self.root == last {
                self.root = z;
            } else if self.left(parent) == last {
                self.links[parent].left = z;
            } else {
                self.links[parent].right = z;
            }
            if left != NIL {
                self.links[left].parent = z;
            }
            if right != NIL {
                self.links[right].parent = z;
            }
        }
        self.links.swap_remove(z);
        self.entries.swap_remove(z - 1)
    }

    pub fn clear(&mut self) {
        self.links.truncate(1);
        self.links[NIL] = Link::SENTINEL;
        self.entries.clear();
        self.root = NIL;
    }

    /// Rotates `x` towards `side`: its child on the opposite side takes
    /// its place.
    pub fn rotate(&mut self, x: NodeId, side: Side) {
        let y = self.child(x, side.opposite());
        debug_assert!(y != NIL);

        let inner = self.child(y, side);
        self.set_child(x, side.opposite(), inner);
        if inner != NIL {
            self.set_parent(inner, x);
        }

        let parent = self.parent(x);
        self.set_parent(y, parent);
        if parent == NIL {
            self.root = y;
        } else if self.left(parent) == x {
            self.links[parent].left = y;
        } else {
            self.links[parent].right = y;
        }

        self.set_child(y, side, x);
        self.set_parent(x, y);
    }

    /// Puts `v` where `u` hangs. `v` may be the sentinel, whose `parent`
    /// is seated as well.
    pub fn transplant(&mut self, u: NodeId, v: NodeId) {
        let parent = self.parent(u);
        if parent == NIL {
            self.root = v;
        } else if self.left(parent) == u {
            self.links[parent].left = v;
        } else {
            self.links[parent].right = v;
        }
        self.set_parent(v, parent);
    }

    pub fn minimum(&self, mut i: NodeId) -> NodeId {
        while self.left(i) != NIL {
            i = self.left(i);
        }
        i
    }

    /// Returns the node holding `key` (or `NIL`) together with the last
    /// node visited before it.
    pub fn search<C: Compare<K>>(&self, key: &K, cmp: &C) -> (NodeId, NodeId) {
        let (mut node, mut parent) = (self.root, NIL);
        while node != NIL {
            match cmp.compare(key, self.key(node)) {
                Ordering::Less => (parent, node) = (node, self.left(node)),
                Ordering::Greater => (parent, node) = (node, self.right(node)),
                Ordering::Equal => break,
            }
        }
        (node, parent)
    }

    /// In-order node ids, driven by an explicit stack.
    pub fn in_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![];
        let mut cur = self.root;
        std::iter::from_fn(move || {
            while cur != NIL {
                stack.push(cur);
                cur = self.left(cur);
            }
            let next = stack.pop()?;
            cur = self.right(next);
            Some(next)
        })
    }

    pub fn height(&self) -> usize {
        if self.root == NIL {
            return 0;
        }
        let mut level = vec![self.root];
        let mut height = 0;
        loop {
            let next: Vec<_> = level
                .iter()
                .flat_map(|&i| [self.left(i), self.right(i)])
                .filter(|&i| i != NIL)
                .collect();
            if next.is_empty() {
                return height;
            }
            height += 1;
            level = next;
        }
    }
}

impl<K, V> Default for Arena<K, V> {
    fn default() -> Self { Self::new() }
}

#[test]
fn rotation_round_trip() {
    let mut arena = Arena::new();
    // 2 -> (1, 4 -> (3, 5))
    let n2 = arena.alloc(2, (), NIL, Color::Black);
    arena.set_root(n2);
    let n1 = arena.alloc(1, (), n2, Color::Black);
    let n4 = arena.alloc(4, (), n2, Color::Black);
    arena.set_child(n2, Side::Left, n1);
    arena.set_child(n2, Side::Right, n4);
    let n3 = arena.alloc(3, (), n4, Color::Red);
    let n5 = arena.alloc(5, (), n4, Color::Red);
    arena.set_child(n4, Side::Left, n3);
    arena.set_child(n4, Side::Right, n5);

    arena.rotate(n2, Side::Left);
    assert_eq!(arena.root(), n4);
    assert_eq!(arena.parent(n4), NIL);
    assert_eq!((arena.left(n4), arena.right(n4)), (n2, n5));
    assert_eq!((arena.left(n2), arena.right(n2)), (n1, n3));
    assert_eq!(arena.parent(n3), n2);
    assert_eq!(arena.parent(n2), n4);
    let keys: Vec<_> = arena.in_order().map(|i| *arena.key(i)).collect();
    assert_eq!(keys, [1, 2, 3, 4, 5]);

    arena.rotate(n4, Side::Right);
    assert_eq!(arena.root(), n2);
    assert_eq!((arena.left(n2), arena.right(n2)), (n1, n4));
    assert_eq!((arena.left(n4), arena.right(n4)), (n3, n5));
    assert_eq!(arena.parent(n3), n4);
    assert_eq!(arena.height(), 2);
}

#[test]
fn release_relocates_last_node() {
    let mut arena = Arena::new();
    let a = arena.alloc('b', 0, NIL, Color::Black);
    arena.set_root(a);
    let b = arena.alloc('a', 1, a, Color::Red);
    let c = arena.alloc('c', 2, a, Color::Red);
    arena.set_child(a, Side::Left, b);
    arena.set_child(a, Side::Right, c);

    // detach `b` and free it; `c` moves into its slot
    arena.set_child(a, Side::Left, NIL);
    assert_eq!(arena.release(b), ('a', 1));
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.right(a), b);
    assert_eq!(arena.entry(b), (&'c', &2));
    assert_eq!(arena.parent(b), a);

    // a root stored in the last slot moves, and its child follows it
    let mut arena = Arena::new();
    let detached = arena.alloc(0, (), NIL, Color::Red);
    let child = arena.alloc(2, (), NIL, Color::Red);
    let root = arena.alloc(1, (), NIL, Color::Black);
    arena.set_root(root);
    arena.set_child(root, Side::Right, child);
    arena.set_parent(child, root);

    assert_eq!(arena.release(detached), (0, ()));
    assert_eq!(arena.root(), detached);
    assert_eq!(*arena.key(arena.root()), 1);
    assert_eq!(arena.right(arena.root()), child);
    assert_eq!(arena.parent(child), arena.root());
}
