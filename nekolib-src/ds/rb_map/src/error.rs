use thiserror::Error;

/// Returned by [`RbMap::lookup`](crate::RbMap::lookup) when no entry holds
/// the key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("key not found")]
pub struct KeyNotFound;

/// A broken red-black rule, as reported by
/// [`RbMap::check_invariants`](crate::RbMap::check_invariants).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("the root is red")]
    RedRoot,
    #[error("the sentinel is red or still linked to a node")]
    Sentinel,
    #[error("a red node has a red child")]
    RedRed,
    #[error("black heights differ: {left} on the left, {right} on the right")]
    BlackHeight { left: usize, right: usize },
    #[error("keys are not strictly ascending in order")]
    Unordered,
    #[error("a child does not point back to its parent")]
    ParentLink,
    #[error("{len} entries stored but {reachable} reachable from the root")]
    Len { len: usize, reachable: usize },
}

#[test]
fn messages() {
    assert_eq!(KeyNotFound.to_string(), "key not found");
    assert_eq!(
        InvariantViolation::BlackHeight { left: 2, right: 3 }.to_string(),
        "black heights differ: 2 on the left, 3 on the right"
    );
    assert_eq!(
        InvariantViolation::Len { len: 4, reachable: 3 }.to_string(),
        "4 entries stored but 3 reachable from the root"
    );
}
