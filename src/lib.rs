//! Catalog aggregation core for a PokeAPI browser.
//!
//! Loads the full 251-entry dataset (summary listing plus per-entry detail
//! records) once per session into an in-memory catalog, then derives
//! sorted/filtered views and circular previous/next navigation from read
//! snapshots of it. Presentation layers consume the projections in
//! [`view`] and never touch the network themselves.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod nav;
pub mod view;
