use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Sponsor, SponsorId},
    notify::Notifier,
    protocol::Notification,
};
use storage::SponsorStore;
use tracing::{debug, error};

use crate::fallback::default_sponsors;

pub(crate) const LOAD_FAILED: &str = "Failed to load sponsors. Using default data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSource {
    /// Nothing has been loaded yet.
    Pending,
    Remote,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct SponsorListSnapshot {
    pub sponsors: Arc<Vec<Sponsor>>,
    pub loading: bool,
    pub source: ListSource,
}

struct ListState {
    sponsors: Arc<Vec<Sponsor>>,
    source: ListSource,
    pending_loads: usize,
    attempted: bool,
}

impl ListState {
    fn snapshot(&self) -> SponsorListSnapshot {
        SponsorListSnapshot {
            sponsors: Arc::clone(&self.sponsors),
            // The page starts out loading until its first fetch is issued.
            loading: self.pending_loads > 0 || !self.attempted,
            source: self.source,
        }
    }
}

/// Owns the cached sponsor list. The list is only ever swapped wholesale and
/// the lock is never held across a store call.
pub struct SponsorListController {
    store: Arc<dyn SponsorStore>,
    state: RwLock<ListState>,
}

/// Clears the loading mark when a load finishes, including when the load
/// future is dropped before the store answers.
struct LoadingMark<'a> {
    controller: &'a SponsorListController,
}

impl Drop for LoadingMark<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.write_state();
        state.pending_loads = state.pending_loads.saturating_sub(1);
    }
}

impl SponsorListController {
    pub fn new(store: Arc<dyn SponsorStore>) -> Self {
        Self {
            store,
            state: RwLock::new(ListState {
                sponsors: Arc::new(Vec::new()),
                source: ListSource::Pending,
                pending_loads: 0,
                attempted: false,
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn SponsorStore> {
        &self.store
    }

    pub fn snapshot(&self) -> SponsorListSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    /// The cached list as of the last finished load, ignoring loads that
    /// other callers have in flight.
    pub fn settled(&self) -> SponsorListSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        SponsorListSnapshot {
            sponsors: Arc::clone(&state.sponsors),
            loading: state.source == ListSource::Pending,
            source: state.source,
        }
    }

    pub fn find(&self, id: &SponsorId) -> Option<Sponsor> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sponsors
            .iter()
            .find(|sponsor| sponsor.id.as_ref() == Some(id))
            .cloned()
    }

    /// Fetches the full list and replaces the cache with it, or with the
    /// default sponsors when the store is empty or the read fails. The
    /// returned snapshot is what this call wrote, never still loading.
    pub async fn load(&self, notifier: &dyn Notifier) -> SponsorListSnapshot {
        {
            let mut state = self.write_state();
            state.pending_loads += 1;
            state.attempted = true;
        }
        let mark = LoadingMark { controller: self };

        let (sponsors, source) = match self.store.list_sponsors().await {
            Ok(rows) if !rows.is_empty() => (rows, ListSource::Remote),
            Ok(_) => {
                debug!("sponsor store is empty; showing default sponsors");
                (default_sponsors(), ListSource::Fallback)
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to fetch sponsors");
                notifier.notify(Notification::error(LOAD_FAILED));
                (default_sponsors(), ListSource::Fallback)
            }
        };

        // Other callers may still be loading, so the shared counter does not
        // describe this load. What it wrote is final.
        let finished = {
            let mut state = self.write_state();
            state.sponsors = Arc::new(sponsors);
            state.source = source;
            SponsorListSnapshot {
                sponsors: Arc::clone(&state.sponsors),
                loading: false,
                source,
            }
        };
        drop(mark);

        finished
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ListState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
