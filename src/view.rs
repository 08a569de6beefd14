//! Read-only projections for presentation consumers.
//!
//! Mirrors the three routes of the browsing UI: list, gallery, detail.
//! Everything here derives from one loaded snapshot; the detail page
//! resolves the record and both circular neighbours from the same
//! snapshot, so there is no window where they disagree.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogEntry, PokemonDetail};
use crate::engine::{type_roster, ViewQuery};
use crate::error::CatalogError;
use crate::nav::NavigationIndex;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: u16,
    pub name: String,
    pub artwork_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: u16,
    pub name: String,
    pub types: Vec<String>,
    pub artwork_url: Option<String>,
}

/// The gallery grid plus the roster its type filter control offers. The
/// roster always spans the whole catalog, not the filtered subset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GalleryPage {
    pub items: Vec<GalleryItem>,
    pub type_roster: Vec<String>,
}

/// One entry with its position and circular neighbours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailPage {
    pub detail: PokemonDetail,
    /// Zero-based position in the canonical reference ordering.
    pub position: usize,
    pub total: usize,
    pub previous: String,
    pub next: String,
}

pub fn list_view(catalog: &Catalog, query: &ViewQuery) -> Vec<ListItem> {
    query
        .apply(catalog)
        .into_iter()
        .map(|detail| ListItem {
            id: detail.id,
            name: detail.name.clone(),
            artwork_url: detail.artwork_url.clone(),
        })
        .collect()
}

pub fn gallery_view(catalog: &Catalog, query: &ViewQuery) -> GalleryPage {
    let items = query
        .apply(catalog)
        .into_iter()
        .map(|detail| GalleryItem {
            id: detail.id,
            name: detail.name.clone(),
            types: detail.types.clone(),
            artwork_url: detail.artwork_url.clone(),
        })
        .collect();
    GalleryPage {
        items,
        type_roster: type_roster(&catalog.loaded_in_order()),
    }
}

/// Detail page for `name`. Fails with `NotFound` for names outside the
/// catalog; an entry whose detail fetch failed surfaces its marker error
/// instead of pretending to be absent.
pub fn detail_page(
    catalog: &Catalog,
    nav: &NavigationIndex,
    name: &str,
) -> Result<DetailPage, CatalogError> {
    let detail = match catalog.entry(name) {
        Some(CatalogEntry::Loaded(detail)) => detail.clone(),
        Some(CatalogEntry::Failed(err)) => return Err(err.clone()),
        None => return Err(CatalogError::NotFound(name.to_string())),
    };
    Ok(DetailPage {
        detail,
        position: nav.position_of(name)?,
        total: nav.len(),
        previous: nav.previous(name)?.to_string(),
        next: nav.next(name)?.to_string(),
    })
}
