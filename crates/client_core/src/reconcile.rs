//! Identity based merging of reference entities into selectable collections.

use shared::domain::{City, CountrySummary, Identified};

/// Returns `collection` with every present, not yet contained item of
/// `candidates` placed in front of it. Candidates are deduplicated against the
/// collection and against each other by identity; the first occurrence wins
/// and the original order of `collection` is kept.
pub fn add_to_collection_if_missing<T, I>(collection: &[T], candidates: I) -> Vec<T>
where
    T: Identified + Clone,
    I: IntoIterator<Item = Option<T>>,
{
    let mut seen: Vec<T::Id> = collection.iter().map(Identified::identity).collect();
    let mut merged = Vec::with_capacity(collection.len());

    for candidate in candidates.into_iter().flatten() {
        let id = candidate.identity();
        if seen.contains(&id) {
            continue;
        }
        seen.push(id);
        merged.push(candidate);
    }

    merged.extend_from_slice(collection);
    merged
}

/// Both absent compare equal, exactly one absent compares unequal, otherwise
/// identities decide.
pub fn same_identity<T: Identified>(left: Option<&T>, right: Option<&T>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left.identity() == right.identity(),
        (None, None) => true,
        _ => false,
    }
}

pub fn compare_city(left: Option<&City>, right: Option<&City>) -> bool {
    same_identity(left, right)
}

pub fn compare_country(left: Option<&CountrySummary>, right: Option<&CountrySummary>) -> bool {
    same_identity(left, right)
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
