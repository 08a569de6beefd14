//! Pure sort/filter/search over a catalog snapshot.
//!
//! Every function takes a view slice and returns a new ordered sequence;
//! the catalog itself is never mutated, so one consumer's sort preference
//! cannot corrupt the canonical reference order navigation depends on.

use crate::catalog::{Catalog, PokemonDetail};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One of the five fixed id ranges the gallery filters on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdBucket {
    pub low: u16,
    pub high: u16,
}

/// Fixed, non-overlapping, exhaustive partition of the 1..=251 id domain.
pub const ID_BUCKETS: [IdBucket; 5] = [
    IdBucket { low: 1, high: 50 },
    IdBucket { low: 51, high: 100 },
    IdBucket { low: 101, high: 150 },
    IdBucket { low: 151, high: 200 },
    IdBucket { low: 201, high: 251 },
];

impl IdBucket {
    pub fn contains(&self, id: u16) -> bool {
        (self.low..=self.high).contains(&id)
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.low, self.high)
    }

    /// Look up a fixed bucket by its label, e.g. `"51-100"`.
    pub fn parse(label: &str) -> Option<IdBucket> {
        ID_BUCKETS.into_iter().find(|bucket| bucket.label() == label)
    }
}

/// Stable sort: numeric for id, case-insensitive lexicographic for name.
/// Ties keep the input (canonical) order in either direction.
pub fn sort_by<'a>(
    view: &[&'a PokemonDetail],
    field: SortField,
    order: SortOrder,
) -> Vec<&'a PokemonDetail> {
    let mut sorted = view.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a
                .name
                .to_ascii_lowercase()
                .cmp(&b.name.to_ascii_lowercase()),
        };
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    sorted
}

/// Entries with `low <= id <= high`, both bounds inclusive.
pub fn filter_by_id_range<'a>(
    view: &[&'a PokemonDetail],
    low: u16,
    high: u16,
) -> Vec<&'a PokemonDetail> {
    view.iter()
        .copied()
        .filter(|detail| (low..=high).contains(&detail.id))
        .collect()
}

/// Entries carrying the given type; `None` is the identity filter.
pub fn filter_by_type<'a>(
    view: &[&'a PokemonDetail],
    type_filter: Option<&str>,
) -> Vec<&'a PokemonDetail> {
    match type_filter {
        None => view.to_vec(),
        Some(wanted) => view
            .iter()
            .copied()
            .filter(|detail| {
                detail
                    .types
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(wanted))
            })
            .collect(),
    }
}

/// Case-insensitive substring match on the name; the empty query is the
/// identity filter. The query is matched as given, whitespace included.
pub fn filter_by_name_substring<'a>(
    view: &[&'a PokemonDetail],
    query: &str,
) -> Vec<&'a PokemonDetail> {
    if query.is_empty() {
        return view.to_vec();
    }
    let query = query.to_lowercase();
    view.iter()
        .copied()
        .filter(|detail| detail.name.to_lowercase().contains(&query))
        .collect()
}

/// Sorted, deduplicated list of every type name in the view. Feeds the
/// gallery's type filter control.
pub fn type_roster(view: &[&PokemonDetail]) -> Vec<String> {
    let mut roster: Vec<String> = view
        .iter()
        .flat_map(|detail| detail.types.iter().cloned())
        .collect();
    roster.sort();
    roster.dedup();
    roster
}

/// A composed sort/filter/search request. The filters intersect (logical
/// AND), so their order of application does not affect the result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewQuery {
    pub bucket: Option<IdBucket>,
    pub type_filter: Option<String>,
    pub search: String,
    pub sort: Option<(SortField, SortOrder)>,
}

impl ViewQuery {
    /// Derive an ephemeral view from a loaded catalog snapshot.
    pub fn apply<'a>(&self, catalog: &'a Catalog) -> Vec<&'a PokemonDetail> {
        let mut view = catalog.loaded_in_order();
        if let Some(bucket) = self.bucket {
            view = filter_by_id_range(&view, bucket.low, bucket.high);
        }
        view = filter_by_type(&view, self.type_filter.as_deref());
        view = filter_by_name_substring(&view, &self.search);
        if let Some((field, order)) = self.sort {
            view = sort_by(&view, field, order);
        }
        view
    }
}
