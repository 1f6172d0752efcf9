//! Session bootstrap: load the catalog into the store once per session.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, instrument, warn};

use yanaflow_backend::{TableSource, fetch_all_tables};
use yanaflow_shared::{Catalog, Result, SessionConfig};

use crate::join::{JoinOptions, build_catalog};
use crate::store::{LoadState, SessionStore};

/// Settings for [`bootstrap`] and [`fetch_catalog`].
#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    /// Seed for placeholder copy; `None` draws one from the OS.
    pub placeholder_seed: Option<u64>,
    /// Give courses and events without an image a random cover.
    pub fill_cover_images: bool,
}

impl From<&SessionConfig> for BootstrapOptions {
    fn from(config: &SessionConfig) -> Self {
        Self {
            placeholder_seed: config.placeholder_seed,
            fill_cover_images: config.fill_cover_images,
        }
    }
}

/// What a call to [`bootstrap`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// This call fetched the catalog and wrote it to the store.
    Loaded {
        teachers: usize,
        courses: usize,
        events: usize,
    },
    /// The store was already loaded (possibly by a concurrent call).
    AlreadyInitialized,
    /// The load failed; the store stays uninitialized and a later call retries.
    Failed { reason: String },
}

/// Fetch all tables from `source` and join them into a catalog.
///
/// Any table error aborts the whole fetch.
#[instrument(skip_all)]
pub async fn fetch_catalog<S>(source: &S, opts: &BootstrapOptions) -> Result<Catalog>
where
    S: TableSource + Sync,
{
    let tables = fetch_all_tables(source).await?;

    let mut rng = match opts.placeholder_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let join_opts = JoinOptions {
        fill_cover_images: opts.fill_cover_images,
    };

    Ok(build_catalog(tables, &join_opts, &mut rng))
}

/// Populate `store` from `source` unless it is already populated.
///
/// Errors are logged and reported in the outcome, never returned: a failed
/// load leaves the store uninitialized so the next call tries again. If
/// another call is already loading, this one waits for it instead of
/// fetching a second time.
#[instrument(skip_all)]
pub async fn bootstrap<S>(store: &SessionStore, source: &S, opts: &BootstrapOptions) -> BootstrapOutcome
where
    S: TableSource + Sync,
{
    if store.is_initialized() {
        debug!("data already loaded, skipping fetch");
        return BootstrapOutcome::AlreadyInitialized;
    }

    if !store.begin_loading() {
        debug!("load already in flight, waiting for it");
        return match store.wait_settled().await {
            LoadState::Failed(reason) => BootstrapOutcome::Failed { reason },
            _ => BootstrapOutcome::AlreadyInitialized,
        };
    }

    let mut claim = LoadingClaim::new(store);
    info!("initializing data store on first load");

    match fetch_catalog(source, opts).await {
        Ok(catalog) => {
            let outcome = BootstrapOutcome::Loaded {
                teachers: catalog.teachers.len(),
                courses: catalog.courses.len(),
                events: catalog.events.len(),
            };

            store.set_courses(catalog.courses).await;
            store.set_teachers(catalog.teachers).await;
            store.set_events(catalog.events).await;
            store.set_initialized(true);
            claim.release();

            info!(?outcome, "data store initialized");
            outcome
        }
        Err(e) => {
            error!(error = %e, "failed to initialize data store");
            store.mark_failed(e.to_string());
            claim.release();
            BootstrapOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Holds the store's `Loading` state for one bootstrap attempt. If the
/// attempt is dropped before it settles (a caller's timeout or `select!`),
/// the store is marked failed so the next call can retry.
struct LoadingClaim<'a> {
    store: &'a SessionStore,
    settled: bool,
}

impl<'a> LoadingClaim<'a> {
    fn new(store: &'a SessionStore) -> Self {
        Self {
            store,
            settled: false,
        }
    }

    fn release(&mut self) {
        self.settled = true;
    }
}

impl Drop for LoadingClaim<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("bootstrap cancelled before it finished");
            self.store.mark_failed("bootstrap cancelled");
        }
    }
}
