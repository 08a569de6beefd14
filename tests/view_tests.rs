//! Consumer-facing projections: list, gallery, detail page.

use pokedex::catalog::{Catalog, CatalogEntry, PokemonDetail, PokemonSummary};
use pokedex::engine::{IdBucket, SortField, SortOrder, ViewQuery};
use pokedex::error::CatalogError;
use pokedex::nav::NavigationIndex;
use pokedex::view::{detail_page, gallery_view, list_view};

fn detail(id: u16, name: &str, types: &[&str]) -> PokemonDetail {
    PokemonDetail {
        id,
        name: name.to_string(),
        height: 7,
        weight: 69,
        abilities: vec!["overgrow".to_string()],
        types: types.iter().map(|t| t.to_string()).collect(),
        artwork_url: Some(format!("https://img.example/{id}.png")),
    }
}

fn sample_catalog() -> Catalog {
    let details = vec![
        detail(1, "bulbasaur", &["grass", "poison"]),
        detail(2, "ivysaur", &["grass", "poison"]),
        detail(3, "venusaur", &["grass", "poison"]),
        detail(4, "charmander", &["fire"]),
    ];
    let summaries = details
        .iter()
        .map(|d| PokemonSummary {
            name: d.name.clone(),
            url: format!("https://pokeapi.co/api/v2/pokemon/{}/", d.id),
        })
        .collect();
    let entries = details.into_iter().map(CatalogEntry::Loaded).collect();
    Catalog::assemble(summaries, entries)
}

#[test]
fn list_view_applies_the_query() {
    let catalog = sample_catalog();
    let query = ViewQuery {
        search: "saur".to_string(),
        sort: Some((SortField::Name, SortOrder::Ascending)),
        ..Default::default()
    };
    let items = list_view(&catalog, &query);
    let names: Vec<_> = items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["bulbasaur", "ivysaur", "venusaur"]);
    assert_eq!(items[0].id, 1);
    assert_eq!(
        items[0].artwork_url.as_deref(),
        Some("https://img.example/1.png")
    );
}

#[test]
fn gallery_view_carries_the_full_type_roster() {
    let catalog = sample_catalog();
    let query = ViewQuery {
        bucket: IdBucket::parse("1-50"),
        type_filter: Some("fire".to_string()),
        ..Default::default()
    };
    let page = gallery_view(&catalog, &query);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "charmander");
    assert_eq!(page.items[0].types, vec!["fire"]);
    // The roster spans the whole catalog, not the filtered subset.
    assert_eq!(page.type_roster, vec!["fire", "grass", "poison"]);
}

#[test]
fn detail_page_resolves_neighbours_from_the_same_snapshot() {
    let catalog = sample_catalog();
    let nav = NavigationIndex::from_catalog(&catalog);
    let page = detail_page(&catalog, &nav, "venusaur").unwrap();
    assert_eq!(page.detail.id, 3);
    assert_eq!(page.position, 2);
    assert_eq!(page.total, 4);
    assert_eq!(page.previous, "ivysaur");
    assert_eq!(page.next, "charmander");

    let first = detail_page(&catalog, &nav, "bulbasaur").unwrap();
    assert_eq!(first.previous, "charmander", "previous wraps to the last entry");
}

#[test]
fn detail_page_for_an_unknown_name_is_not_found() {
    let catalog = sample_catalog();
    let nav = NavigationIndex::from_catalog(&catalog);
    assert_eq!(
        detail_page(&catalog, &nav, "mewtwo"),
        Err(CatalogError::NotFound("mewtwo".to_string()))
    );
}

#[test]
fn detail_page_surfaces_a_failed_entry_marker() {
    let summaries = vec![
        PokemonSummary {
            name: "bulbasaur".to_string(),
            url: "https://pokeapi.co/api/v2/pokemon/1/".to_string(),
        },
        PokemonSummary {
            name: "ivysaur".to_string(),
            url: "https://pokeapi.co/api/v2/pokemon/2/".to_string(),
        },
    ];
    let entries = vec![
        CatalogEntry::Loaded(detail(1, "bulbasaur", &["grass"])),
        CatalogEntry::Failed(CatalogError::RateLimit),
    ];
    let catalog = Catalog::assemble(summaries, entries);
    let nav = NavigationIndex::from_catalog(&catalog);
    assert_eq!(
        detail_page(&catalog, &nav, "ivysaur"),
        Err(CatalogError::RateLimit)
    );
    // The failed entry still participates in navigation.
    assert_eq!(nav.next("bulbasaur"), Ok("ivysaur"));
}
