//! Process-scoped session cache with a single-flight loader.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::RemoteCatalogClient;
use crate::catalog::{Catalog, CatalogEntry, PokemonDetail, PokemonSummary};
use crate::error::CatalogError;

/// Where catalogs come from. The seam between the cache and the network,
/// so the single-flight machinery can be exercised without one.
pub trait CatalogSource: Send + Sync + 'static {
    fn load_catalog(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Catalog, CatalogError>> + Send;

    fn reload_entry(
        &self,
        summary: PokemonSummary,
    ) -> impl Future<Output = Result<PokemonDetail, CatalogError>> + Send;
}

impl CatalogSource for RemoteCatalogClient {
    async fn load_catalog(&self, cancel: CancellationToken) -> Result<Catalog, CatalogError> {
        RemoteCatalogClient::load_catalog(self, &cancel).await
    }

    async fn reload_entry(&self, summary: PokemonSummary) -> Result<PokemonDetail, CatalogError> {
        self.fetch_detail(&summary).await
    }
}

type LoadResult = Result<Arc<Catalog>, CatalogError>;

enum Slot {
    Empty,
    Loading {
        rx: watch::Receiver<Option<LoadResult>>,
        cancel: CancellationToken,
    },
    Ready(Arc<Catalog>),
}

/// The only shared mutable state of the system: empty at session start,
/// populated by the first successful load, retained for the rest of the
/// session. Concurrent [`ensure_loaded`](CatalogCache::ensure_loaded)
/// calls serialize on the in-flight load instead of racing to populate
/// the slot twice.
pub struct CatalogCache<C: CatalogSource = RemoteCatalogClient> {
    source: Arc<C>,
    slot: Mutex<Slot>,
    retry_gate: Mutex<()>,
}

impl<C: CatalogSource> CatalogCache<C> {
    pub fn new(source: C) -> Self {
        Self {
            source: Arc::new(source),
            slot: Mutex::new(Slot::Empty),
            retry_gate: Mutex::new(()),
        }
    }

    /// The underlying source.
    pub fn source_ref(&self) -> &C {
        &self.source
    }

    /// The cached catalog, if a load has completed.
    pub async fn get(&self) -> Option<Arc<Catalog>> {
        match &*self.slot.lock().await {
            Slot::Ready(catalog) => Some(catalog.clone()),
            _ => None,
        }
    }

    pub async fn set(&self, catalog: Catalog) {
        *self.slot.lock().await = Slot::Ready(Arc::new(catalog));
    }

    /// Tear down the in-flight load, if there is one. Its waiters resolve
    /// with [`CatalogError::Cancelled`] and the slot resets; each load
    /// carries its own token, so the next `ensure_loaded` starts fresh.
    pub async fn cancel(&self) {
        if let Slot::Loading { cancel, .. } = &*self.slot.lock().await {
            cancel.cancel();
        }
    }

    /// Return the cached catalog, loading it first if this session has not
    /// yet. At most one load is in flight at a time: the first caller
    /// spawns it as a cache-owned task and every concurrent caller joins
    /// the same eventual result. A fatal load error surfaces to all
    /// waiters, then the slot resets so a later call may try again.
    ///
    /// The load task is owned by the cache, not by any caller, so a
    /// consumer that stops awaiting abandons only its own join; the load
    /// still completes for everyone else.
    pub async fn ensure_loaded(&self) -> LoadResult {
        let mut rx = {
            let mut slot = self.slot.lock().await;
            match &*slot {
                Slot::Ready(catalog) => return Ok(catalog.clone()),
                Slot::Loading { rx, .. } => rx.clone(),
                Slot::Empty => {
                    let (tx, rx) = watch::channel(None);
                    // Each load gets its own token; a cancelled session
                    // must still be able to start a fresh load later.
                    let cancel = CancellationToken::new();
                    *slot = Slot::Loading {
                        rx: rx.clone(),
                        cancel: cancel.clone(),
                    };
                    let source = self.source.clone();
                    tokio::spawn(async move {
                        let result = source.load_catalog(cancel).await.map(Arc::new);
                        let _ = tx.send(Some(result));
                    });
                    rx
                }
            }
        };

        let result = loop {
            if let Some(result) = rx.borrow_and_update().clone() {
                break result;
            }
            if rx.changed().await.is_err() {
                break Err(CatalogError::Cancelled);
            }
        };

        let mut slot = self.slot.lock().await;
        // Only the waiters of this load may settle the slot; a stale
        // waiter must not clobber a newer load already in flight.
        let owns_slot =
            matches!(&*slot, Slot::Loading { rx: current, .. } if current.same_channel(&rx));
        if owns_slot {
            match &result {
                Ok(catalog) => {
                    info!(total = catalog.len(), "catalog cached for the session");
                    *slot = Slot::Ready(catalog.clone());
                }
                Err(err) => {
                    warn!(error = %err, "catalog load failed");
                    *slot = Slot::Empty;
                }
            }
        }
        drop(slot);
        result
    }

    /// Re-fetch only the entries whose detail fetch failed and swap the
    /// patched catalog into the slot. Entries marked `NotFound` are kept
    /// as-is: a 404 is a definitive answer, not worth hammering the
    /// remote for. Concurrent retries serialize on a gate.
    pub async fn retry_failed(&self) -> LoadResult {
        let _gate = self.retry_gate.lock().await;
        let catalog = self.ensure_loaded().await?;
        let retryable: Vec<PokemonSummary> = catalog
            .failed()
            .into_iter()
            .filter(|(_, err)| !matches!(err, CatalogError::NotFound(_)))
            .map(|(summary, _)| summary.clone())
            .collect();
        if retryable.is_empty() {
            return Ok(catalog);
        }

        let mut patches = std::collections::HashMap::new();
        for summary in retryable {
            let name = summary.name.clone();
            match self.source.reload_entry(summary).await {
                Ok(detail) => {
                    patches.insert(name, CatalogEntry::Loaded(detail));
                }
                Err(err) => {
                    warn!(name = %name, error = %err, "retry failed");
                    patches.insert(name, CatalogEntry::Failed(err));
                }
            }
        }

        let patched = Arc::new(catalog.with_patches(patches));
        *self.slot.lock().await = Slot::Ready(patched.clone());
        Ok(patched)
    }
}
