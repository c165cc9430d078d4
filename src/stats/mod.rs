//! Reductions used when turning extracted numbers into the single
//! values that the experiment driver records.

pub mod average;

/// Maximum of the values selected by `field`, or `None` when there
/// are no items where `field` returned a value.
pub fn max_by_field<T, V: Ord>(
    items: impl IntoIterator<Item = T>,
    field: impl Fn(T) -> Option<V>,
) -> Option<V> {
    items.into_iter().filter_map(field).max()
}

#[test]
fn t_max_by_field() {
    let vals = [(1, Some(10)), (2, None), (3, Some(7))];
    assert_eq!(max_by_field(vals.iter(), |(_, v)| *v), Some(10));
    assert_eq!(max_by_field(vals.iter(), |(k, _)| Some(*k)), Some(3));
    let none: [(u32, Option<u32>); 0] = [];
    assert_eq!(max_by_field(none.iter(), |(_, v)| *v), None);
}
