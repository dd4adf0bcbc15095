use std::hash::{BuildHasher, Hash};

// Positions in a header's lookup table are compared through the header's label list.
pub(crate) fn equivalent_label<'a, Q: PartialEq>(
    k: &'a Q,
    labels: &'a [Q],
) -> impl Fn(&usize) -> bool + 'a {
    move |pos| labels[*pos].eq(k)
}

pub(crate) fn make_hash<T, S>(hash_builder: &S, val: &T) -> u64
where
    T: Hash + ?Sized,
    S: BuildHasher,
{
    use core::hash::Hasher;
    let mut state = hash_builder.build_hasher();
    val.hash(&mut state);
    state.finish()
}

// Rehashes a stored position by hashing the label it points at.
pub(crate) fn make_position_hasher<'a, T, S>(
    hash_builder: &'a S,
    labels: &'a [T],
) -> impl Fn(&usize) -> u64 + 'a
where
    T: Hash,
    S: BuildHasher,
{
    move |pos| make_hash::<T, S>(hash_builder, &labels[*pos])
}
