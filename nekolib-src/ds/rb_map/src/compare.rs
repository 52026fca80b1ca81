use std::cmp::Ordering;

/// A total order on keys, fixed when the map is built.
pub trait Compare<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The order given by `K: Ord`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Natural;

/// Reverses the order of the inner comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Reverse<C = Natural>(pub C);

impl<K: Ord + ?Sized> Compare<K> for Natural {
    fn compare(&self, a: &K, b: &K) -> Ordering { a.cmp(b) }
}

impl<K: ?Sized, C: Compare<K>> Compare<K> for Reverse<C> {
    fn compare(&self, a: &K, b: &K) -> Ordering { self.0.compare(b, a) }
}

#[test]
fn orders() {
    assert_eq!(Natural.compare(&1, &2), Ordering::Less);
    assert_eq!(Natural.compare("b", "a"), Ordering::Greater);
    assert_eq!(Reverse(Natural).compare(&1, &2), Ordering::Greater);
    assert_eq!(Reverse(Reverse(Natural)).compare(&1, &2), Ordering::Less);
    assert_eq!(Reverse::<Natural>::default().compare(&3, &3), Ordering::Equal);
}
