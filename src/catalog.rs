//! In-memory catalog assembled from the remote listing and detail records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Minimal reference returned by the listing endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonSummary {
    pub name: String,
    pub url: String,
}

/// Full attribute set for one catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub id: u16,
    pub name: String,
    pub height: u16,
    pub weight: u16,
    pub abilities: Vec<String>,
    pub types: Vec<String>,
    pub artwork_url: Option<String>,
}

/// Per-entry outcome of a completed load. A failed detail fetch is kept as
/// a marker so callers can see which entries are missing and retry them
/// individually instead of losing the whole catalog.
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogEntry {
    Loaded(PokemonDetail),
    Failed(CatalogError),
}

impl CatalogEntry {
    pub fn detail(&self) -> Option<&PokemonDetail> {
        match self {
            CatalogEntry::Loaded(detail) => Some(detail),
            CatalogEntry::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CatalogError> {
        match self {
            CatalogEntry::Loaded(_) => None,
            CatalogEntry::Failed(err) => Some(err),
        }
    }
}

/// The assembled dataset: one entry per summary, keyed by name, plus the
/// canonical reference ordering (the order the listing endpoint returned
/// the summaries in, independent of any later sort).
///
/// A `Catalog` value only exists once a load has completed; the pending
/// and failed load states live in the cache slot, never here. Invariant:
/// the entry map holds exactly one entry per name in the ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    order: Vec<PokemonSummary>,
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    /// Build a catalog from the summary listing and one entry per summary,
    /// in the same order.
    pub fn assemble(summaries: Vec<PokemonSummary>, entries: Vec<CatalogEntry>) -> Self {
        debug_assert_eq!(summaries.len(), entries.len());
        let map = summaries
            .iter()
            .map(|summary| summary.name.clone())
            .zip(entries)
            .collect();
        Self {
            order: summaries,
            entries: map,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Names in canonical reference order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|summary| summary.name.as_str())
    }

    /// Summaries in canonical reference order.
    pub fn summaries(&self) -> &[PokemonSummary] {
        &self.order
    }

    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    /// Detail record for `name`, if that entry loaded successfully.
    pub fn get(&self, name: &str) -> Option<&PokemonDetail> {
        self.entries.get(name).and_then(CatalogEntry::detail)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Loaded detail records in canonical reference order. This is the
    /// snapshot the sort/filter engine operates on.
    pub fn loaded_in_order(&self) -> Vec<&PokemonDetail> {
        self.order
            .iter()
            .filter_map(|summary| self.get(&summary.name))
            .collect()
    }

    /// Entries whose detail fetch failed, in canonical reference order.
    pub fn failed(&self) -> Vec<(&PokemonSummary, &CatalogError)> {
        self.order
            .iter()
            .filter_map(|summary| {
                self.entries
                    .get(&summary.name)
                    .and_then(CatalogEntry::error)
                    .map(|err| (summary, err))
            })
            .collect()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failed()
            .into_iter()
            .map(|(summary, _)| summary.name.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failed().is_empty()
    }

    /// New catalog with the given entries replaced; everything else,
    /// including the canonical ordering, is untouched. Patches for names
    /// outside the ordering are ignored.
    pub fn with_patches(&self, patches: HashMap<String, CatalogEntry>) -> Catalog {
        let mut entries = self.entries.clone();
        for (name, entry) in patches {
            if entries.contains_key(&name) {
                entries.insert(name, entry);
            }
        }
        Catalog {
            order: self.order.clone(),
            entries,
        }
    }
}
