use std::{
    collections::VecDeque,
    fmt::Display,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use log::debug;

use crate::{
    compare::Compare,
    error::InvariantViolation,
    node::{Color, NodeId, Side, NIL},
    RbMap,
};

impl<K: Display, V, C> RbMap<K, V, C> {
    /// Writes the tree in Graphviz `digraph` form, breadth first. Sentinel
    /// children show up as `NULL` records. Nothing is written for an empty
    /// map.
    pub fn write_dot<W: Write>(&self, mut w: W) -> io::Result<()> {
        let arena = &self.arena;
        if arena.root() == NIL {
            return Ok(());
        }

        let record = |w: &mut W, id: usize, i: NodeId| {
            let label =
                if i == NIL { "NULL".to_owned() } else { arena.key(i).to_string() };
            let color = arena.color(i);
            writeln!(w, " node{id}[label = \"<f0> |<f1>{label}|<f2>\", color={color}];")
        };

        writeln!(w, "digraph g{{")?;
        writeln!(w, "node [shape = record,height = .1];")?;
        record(&mut w, 0, arena.root())?;

        let mut next_id = 1;
        let mut queue = VecDeque::from([(arena.root(), 0)]);
        while let Some((i, id)) = queue.pop_front() {
            for (side, port) in [(Side::Left, "f0"), (Side::Right, "f2")] {
                let child = arena.child(i, side);
                let child_id = next_id;
                next_id += 1;
                record(&mut w, child_id, child)?;
                writeln!(w, "\"node{id}\":{port}->\"node{child_id}\":f1;")?;
                if child != NIL {
                    queue.push_back((child, child_id));
                }
            }
        }
        writeln!(w, "}}")?;
        let nulls = next_id - self.len();
        debug!("write_dot: {} nodes, {nulls} sentinel records", self.len());
        Ok(())
    }

    /// Saves [`write_dot`](Self::write_dot) output to `path`. No file is
    /// created for an empty map.
    pub fn save_dot<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let path = path.as_ref();
        debug!("save_dot: {}", path.display());
        let mut w = BufWriter::new(File::create(path)?);
        self.write_dot(&mut w)?;
        w.flush()
    }

    /// Sideways drawing: the right subtree above, the left one below, one
    /// `key (R|B)` per line.
    pub fn render(&self) -> String {
        #[derive(Clone, Copy, Eq, PartialEq)]
        enum Kind {
            Root,
            Upper,
            Lower,
        }
        enum Frame {
            Visit(NodeId, String, Kind),
            Emit(String),
        }

        let arena = &self.arena;
        let mut res = String::new();
        let mut stack =
            vec![Frame::Visit(arena.root(), String::new(), Kind::Root)];
        while let Some(frame) = stack.pop() {
            let (i, prefix, kind) = match frame {
                Frame::Emit(line) => {
                    res += &line;
                    res.push('\n');
                    continue;
                }
                Frame::Visit(i, ..) if i == NIL => continue,
                Frame::Visit(i, prefix, kind) => (i, prefix, kind),
            };

            let (upper, lower) = match kind {
                Kind::Root => ("", ""),
                Kind::Upper => ("    ", "│   "),
                Kind::Lower => ("│   ", "    "),
            };
            let branch = match kind {
                Kind::Root => "",
                Kind::Upper => "┌── ",
                Kind::Lower => "└── ",
            };
            let color = match arena.color(i) {
                Color::Red => 'R',
                Color::Black => 'B',
            };
            let line = format!("{prefix}{branch}{} ({color})", arena.key(i));

            let (left, right) = (arena.left(i), arena.right(i));
            stack.push(Frame::Visit(left, prefix.clone() + lower, Kind::Lower));
            stack.push(Frame::Emit(line));
            stack.push(Frame::Visit(right, prefix + upper, Kind::Upper));
        }
        res
    }
}

impl<K, V, C: Compare<K>> RbMap<K, V, C> {
    /// Checks every red-black rule and the arena bookkeeping, returning the
    /// number of black nodes on each root-to-leaf path.
    pub fn check_invariants(&self) -> Result<usize, InvariantViolation> {
        let arena = &self.arena;
        let sentinel = arena.link(NIL);
        if sentinel.color != Color::Black
            || sentinel.parent != NIL
            || sentinel.left != NIL
            || sentinel.right != NIL
        {
            return Err(InvariantViolation::Sentinel);
        }
        let root = arena.root();
        if arena.color(root) != Color::Black {
            return Err(InvariantViolation::RedRoot);
        }
        if root != NIL && arena.parent(root) != NIL {
            return Err(InvariantViolation::ParentLink);
        }

        // preorder, so that children come after their parent
        let mut order = vec![];
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            if i == NIL {
                continue;
            }
            order.push(i);
            for child in [arena.left(i), arena.right(i)] {
                if child != NIL && arena.parent(child) != i {
                    return Err(InvariantViolation::ParentLink);
                }
                stack.push(child);
            }
            if order.len() > arena.len() {
                break;
            }
        }
        if order.len() != arena.len() {
            return Err(InvariantViolation::Len {
                len: arena.len(),
                reachable: order.len(),
            });
        }

        let mut black_height = vec![0; arena.len() + 1];
        for &i in order.iter().rev() {
            let (left, right) = (arena.left(i), arena.right(i));
            if arena.color(i) == Color::Red
                && (arena.color(left) == Color::Red
                    || arena.color(right) == Color::Red)
            {
                return Err(InvariantViolation::RedRed);
            }
            let (bl, br) = (black_height[left], black_height[right]);
            if bl != br {
                return Err(InvariantViolation::BlackHeight {
                    left: bl,
                    right: br,
                });
            }
            black_height[i] = bl + (arena.color(i) == Color::Black) as usize;
        }

        let mut keys = arena.in_order().map(|i| arena.key(i));
        if let Some(mut prev) = keys.next() {
            for key in keys {
                if !self.cmp.compare(prev, key).is_lt() {
                    return Err(InvariantViolation::Unordered);
                }
                prev = key;
            }
        }
        Ok(black_height[root])
    }
}

#[test]
fn dot_export() {
    let mut map = RbMap::new();
    let mut buf = vec![];
    map.write_dot(&mut buf).unwrap();
    assert!(buf.is_empty());

    for k in 1..=3 {
        map.insert(k, ());
    }
    map.write_dot(&mut buf).unwrap();
    let expected = r#"digraph g{
node [shape = record,height = .1];
 node0[label = "<f0> |<f1>2|<f2>", color=black];
 node1[label = "<f0> |<f1>1|<f2>", color=red];
"node0":f0->"node1":f1;
 node2[label = "<f0> |<f1>3|<f2>", color=red];
"node0":f2->"node2":f1;
 node3[label = "<f0> |<f1>NULL|<f2>", color=black];
"node1":f0->"node3":f1;
 node4[label = "<f0> |<f1>NULL|<f2>", color=black];
"node1":f2->"node4":f1;
 node5[label = "<f0> |<f1>NULL|<f2>", color=black];
"node2":f0->"node5":f1;
 node6[label = "<f0> |<f1>NULL|<f2>", color=black];
"node2":f2->"node6":f1;
}
"#;
    assert_eq!(String::from_utf8(buf).unwrap(), expected);
}

#[test]
fn dot_export_counts() {
    let map: RbMap<_, _> = (0..100).map(|k| (k, k)).collect();
    let mut buf = vec![];
    map.write_dot(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    // every node plus one NULL record per sentinel child, one edge per link
    let records = text.lines().filter(|l| l.starts_with(" node")).count();
    let edges = text.lines().filter(|l| l.contains("->")).count();
    let nulls = text.lines().filter(|l| l.contains("NULL")).count();
    assert_eq!(records, 100 + 101);
    assert_eq!(edges, 200);
    assert_eq!(nulls, 101);
    assert_eq!(map.len(), 100);
}

#[test]
fn save_dot_to_file() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("rb_map-{}.dot", std::process::id()));

    let mut map = RbMap::new();
    map.save_dot(&path).unwrap();
    assert!(!path.exists());

    map.insert("k", 1);
    map.save_dot(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(text.starts_with("digraph g{\n"));
    assert!(text.contains("<f1>k|"));
    assert!(text.ends_with("}\n"));
}

#[test]
fn render_empty_and_single() {
    let mut map = RbMap::new();
    assert_eq!(map.render(), "");
    map.insert(42, ());
    assert_eq!(map.render(), "42 (B)\n");
}

#[test]
fn detects_broken_trees() {
    let healthy: RbMap<_, _> = (0..10).map(|k| (k, ())).collect();
    assert!(healthy.check_invariants().is_ok());

    let mut map = healthy.clone();
    let root = map.arena.root();
    map.arena.set_color(root, Color::Red);
    assert_eq!(map.check_invariants(), Err(InvariantViolation::RedRoot));

    // a red leaf under a red parent
    let mut map: RbMap<_, _> = (1..=6).map(|k| (k, ())).collect();
    let (four, _) = map.arena.search(&4, &crate::Natural);
    let (five, _) = map.arena.search(&5, &crate::Natural);
    map.arena.set_color(five, Color::Red);
    assert_eq!(map.check_invariants(), Err(InvariantViolation::RedRed));
    map.arena.set_color(five, Color::Black);
    map.arena.set_color(four, Color::Black);
    assert!(matches!(
        map.check_invariants(),
        Err(InvariantViolation::BlackHeight { .. })
    ));

    let mut map: RbMap<_, _> = (1..=3).map(|k| (k, ())).collect();
    let (one, _) = map.arena.search(&1, &crate::Natural);
    map.arena.set_parent(one, NIL);
    assert_eq!(map.check_invariants(), Err(InvariantViolation::ParentLink));

    let mut map: RbMap<_, _> = (1..=3).map(|k| (k, ())).collect();
    map.arena.set_parent(NIL, map.arena.root());
    assert_eq!(map.check_invariants(), Err(InvariantViolation::Sentinel));
}
