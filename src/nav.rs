//! Circular previous/next navigation over the canonical reference order.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::error::CatalogError;

/// Bijection between name and position in the canonical reference
/// ordering. Deliberately decoupled from any active sort or filter:
/// cycling `next` always walks the full dataset in the order the listing
/// endpoint returned it.
#[derive(Clone, Debug)]
pub struct NavigationIndex {
    order: Vec<String>,
    positions: HashMap<String, usize>,
}

impl NavigationIndex {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let order: Vec<String> = catalog.names().map(str::to_string).collect();
        let positions = order
            .iter()
            .enumerate()
            .map(|(position, name)| (name.clone(), position))
            .collect();
        Self { order, positions }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position_of(&self, name: &str) -> Result<usize, CatalogError> {
        self.positions
            .get(name)
            .copied()
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    pub fn at(&self, position: usize) -> Option<&str> {
        self.order.get(position).map(String::as_str)
    }

    /// Name after `name`; wraps from the last entry to the first.
    pub fn next(&self, name: &str) -> Result<&str, CatalogError> {
        let position = self.position_of(name)?;
        Ok(self.order[(position + 1) % self.order.len()].as_str())
    }

    /// Name before `name`; wraps from the first entry to the last.
    pub fn previous(&self, name: &str) -> Result<&str, CatalogError> {
        let position = self.position_of(name)?;
        let len = self.order.len();
        Ok(self.order[(position + len - 1) % len].as_str())
    }
}
