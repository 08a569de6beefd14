//! PokeAPI client: summary listing plus bounded concurrent detail fan-out.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogEntry, PokemonDetail, PokemonSummary};
use crate::error::CatalogError;

const API_BASE: &str = "https://pokeapi.co/api/v2";

/// The listing endpoint is asked for the whole dataset in one page; no
/// pagination cursor handling. Revisit if the dataset size becomes dynamic.
pub const DATASET_SIZE: usize = 251;

const DETAIL_CONCURRENCY: usize = 12;
const DETAIL_RETRY_LIMIT: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    results: Vec<SummaryResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct SummaryResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u16,
    name: String,
    height: u16,
    weight: u16,
    abilities: Vec<PokemonAbilitySlot>,
    types: Vec<PokemonTypeSlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

/// Read-only client for the remote catalog service.
#[derive(Clone, Debug)]
pub struct RemoteCatalogClient {
    base_url: String,
}

impl Default for RemoteCatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteCatalogClient {
    pub fn new() -> Self {
        Self::with_base_url(API_BASE)
    }

    /// Client against a different base URL, e.g. a local test server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Fetch the summary listing, then every detail record, and assemble
    /// the catalog keyed by name in the order the listing returned.
    ///
    /// A listing failure is fatal. A detail failure only marks that entry
    /// as failed; the load still completes with the rest loaded, so
    /// callers can retry the failed entries individually.
    pub async fn load_catalog(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Catalog, CatalogError> {
        let summaries = self.fetch_summary_list(cancel).await?;
        info!(count = summaries.len(), "catalog listing loaded");
        let entries = self.fetch_details(&summaries, cancel).await?;
        let catalog = Catalog::assemble(summaries, entries);
        let failed = catalog.failed_names().len();
        if failed > 0 {
            warn!(failed, total = catalog.len(), "catalog loaded with failed entries");
        } else {
            info!(total = catalog.len(), "catalog fully loaded");
        }
        Ok(catalog)
    }

    /// Fetch one detail record. Used for the initial fan-out and for
    /// targeted retry of failed entries.
    pub async fn fetch_detail(
        &self,
        summary: &PokemonSummary,
    ) -> Result<PokemonDetail, CatalogError> {
        let response: PokemonResponse = fetch_json_with_retry(&summary.url)
            .await
            .map_err(|err| match err {
                CatalogError::NotFound(_) => CatalogError::NotFound(summary.name.clone()),
                other => other,
            })?;
        debug!(name = %response.name, id = response.id, "detail loaded");
        Ok(detail_from_response(response))
    }

    async fn fetch_summary_list(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<PokemonSummary>, CatalogError> {
        let url = format!(
            "{}/pokemon/?limit={DATASET_SIZE}&offset=0",
            self.base_url
        );
        let response: ListResponse = tokio::select! {
            _ = cancel.cancelled() => return Err(CatalogError::Cancelled),
            result = fetch_json_with_retry(&url) => result?,
        };
        Ok(response
            .results
            .into_iter()
            .map(|entry| PokemonSummary {
                name: entry.name,
                url: entry.url,
            })
            .collect())
    }

    /// Detail fan-out bounded by [`DETAIL_CONCURRENCY`] permits; excess
    /// requests queue on the semaphore. Results carry their summary index
    /// so completion order never reorders the canonical reference order.
    async fn fetch_details(
        &self,
        summaries: &[PokemonSummary],
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let semaphore = Arc::new(Semaphore::new(DETAIL_CONCURRENCY));
        let mut join_set = JoinSet::new();
        for (index, summary) in summaries.iter().enumerate() {
            let summary = summary.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let client = self.clone();
            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, Err(CatalogError::Cancelled)),
                };
                let result = tokio::select! {
                    _ = cancel.cancelled() => Err(CatalogError::Cancelled),
                    result = client.fetch_detail(&summary) => result,
                };
                (index, result)
            });
        }

        let mut entries: Vec<Option<CatalogEntry>> = vec![None; summaries.len()];
        while let Some(joined) = join_set.join_next().await {
            let (index, result) = joined.map_err(|err| CatalogError::Network(err.to_string()))?;
            match result {
                Ok(detail) => entries[index] = Some(CatalogEntry::Loaded(detail)),
                // Dropping the join set aborts the outstanding requests
                // without awaiting them.
                Err(CatalogError::Cancelled) => return Err(CatalogError::Cancelled),
                Err(err) => {
                    warn!(name = %summaries[index].name, error = %err, "detail fetch failed");
                    entries[index] = Some(CatalogEntry::Failed(err));
                }
            }
        }

        Ok(entries
            .into_iter()
            .map(|entry| entry.unwrap_or(CatalogEntry::Failed(CatalogError::Cancelled)))
            .collect())
    }
}

fn detail_from_response(response: PokemonResponse) -> PokemonDetail {
    let artwork_url = response
        .sprites
        .pointer("/other/official-artwork/front_default")
        .and_then(|value| value.as_str())
        .map(|url| url.to_string());
    PokemonDetail {
        id: response.id,
        name: response.name,
        height: response.height,
        weight: response.weight,
        abilities: response
            .abilities
            .into_iter()
            .map(|slot| slot.ability.name)
            .collect(),
        types: response
            .types
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect(),
        artwork_url,
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, CatalogError> {
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(|err| CatalogError::Network(err.to_string()))?;
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(CatalogError::RateLimit);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(CatalogError::NotFound(url.to_string()));
    }
    if !status.is_success() {
        return Err(CatalogError::Network(format!("HTTP {status} from {url}")));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|err| CatalogError::Network(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| CatalogError::Parse(err.to_string()))
}

/// Bounded retry with doubling backoff for 429/5xx/transport failures.
async fn fetch_json_with_retry<T: serde::de::DeserializeOwned>(
    url: &str,
) -> Result<T, CatalogError> {
    let mut delay = RETRY_BASE_DELAY;
    let mut attempt = 1;
    loop {
        match fetch_json(url).await {
            Err(err) if err.is_retryable() && attempt < DETAIL_RETRY_LIMIT => {
                warn!(%url, error = %err, attempt, "request failed, backing off");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_JSON: &str = r#"{
        "id": 1,
        "name": "bulbasaur",
        "height": 7,
        "weight": 69,
        "base_experience": 64,
        "abilities": [
            {"ability": {"name": "overgrow", "url": "https://pokeapi.co/api/v2/ability/65/"}},
            {"ability": {"name": "chlorophyll", "url": "https://pokeapi.co/api/v2/ability/34/"}}
        ],
        "types": [
            {"slot": 1, "type": {"name": "grass", "url": "https://pokeapi.co/api/v2/type/12/"}},
            {"slot": 2, "type": {"name": "poison", "url": "https://pokeapi.co/api/v2/type/4/"}}
        ],
        "sprites": {
            "front_default": "https://raw.githubusercontent.com/sprites/1.png",
            "other": {
                "official-artwork": {
                    "front_default": "https://raw.githubusercontent.com/artwork/1.png"
                }
            }
        }
    }"#;

    #[test]
    fn detail_response_flattens_nested_slots() {
        let response: PokemonResponse = serde_json::from_str(DETAIL_JSON).unwrap();
        let detail = detail_from_response(response);
        assert_eq!(detail.id, 1);
        assert_eq!(detail.name, "bulbasaur");
        assert_eq!(detail.height, 7);
        assert_eq!(detail.weight, 69);
        assert_eq!(detail.abilities, vec!["overgrow", "chlorophyll"]);
        assert_eq!(detail.types, vec!["grass", "poison"]);
        assert_eq!(
            detail.artwork_url.as_deref(),
            Some("https://raw.githubusercontent.com/artwork/1.png")
        );
    }

    #[test]
    fn missing_artwork_is_absent_not_an_error() {
        let json = r#"{
            "id": 132,
            "name": "ditto",
            "height": 3,
            "weight": 40,
            "abilities": [{"ability": {"name": "limber"}}],
            "types": [{"type": {"name": "normal"}}],
            "sprites": {"front_default": null}
        }"#;
        let response: PokemonResponse = serde_json::from_str(json).unwrap();
        let detail = detail_from_response(response);
        assert_eq!(detail.artwork_url, None);
    }

    #[test]
    fn listing_response_preserves_result_order() {
        let json = r#"{
            "count": 1302,
            "next": "https://pokeapi.co/api/v2/pokemon/?offset=251&limit=251",
            "previous": null,
            "results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"}
            ]
        }"#;
        let response: ListResponse = serde_json::from_str(json).unwrap();
        let names: Vec<_> = response.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["bulbasaur", "ivysaur"]);
    }

    #[test]
    fn malformed_shape_fails_to_parse() {
        let json = r#"{"id": "one", "name": 7}"#;
        assert!(serde_json::from_str::<PokemonResponse>(json).is_err());
    }
}
