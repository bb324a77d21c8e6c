// src/typeahead/mod.rs
//
// Debounced search-as-you-type over the dropdown endpoints. Every
// keystroke restarts the debounce window; only the last settled value
// fetches, and settled fetches go through the shared query cache so
// retyping the same prefix doesn't re-hit the backend.

use crate::cache::QueryCache;
use crate::client::{ApiClient, ApiError};
use crate::model::DropdownItem;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// Backend port for name search; implemented for both dropdown endpoints.
pub trait DropdownPort {
    fn search(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<DropdownItem>, ApiError>> + Send;
}

/// Census typeahead over `/api/dd/census`.
pub struct CensusSearch(pub ApiClient);

impl DropdownPort for CensusSearch {
    fn search(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<DropdownItem>, ApiError>> + Send {
        self.0.search_census(name)
    }
}

/// Rate-set typeahead over `/api/dd/rates`.
pub struct RateSearch(pub ApiClient);

impl DropdownPort for RateSearch {
    fn search(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<DropdownItem>, ApiError>> + Send {
        self.0.search_rates(name)
    }
}

pub struct Typeahead<P> {
    port: P,
    cache: QueryCache<String, Vec<DropdownItem>>,
    debounce: Duration,
    generation: AtomicU64,
}

impl<P: DropdownPort> Typeahead<P> {
    pub fn new(port: P) -> Self {
        Self::with_debounce(port, DEBOUNCE)
    }

    pub fn with_debounce(port: P, debounce: Duration) -> Self {
        Typeahead {
            port,
            cache: QueryCache::default(),
            debounce,
            generation: AtomicU64::new(0),
        }
    }

    /// Feed one keystroke's worth of input. Resolves to `None` when another
    /// keystroke superseded this one inside the debounce window, or when
    /// the settled input is empty (an empty search never queries).
    pub async fn input(&self, text: &str) -> Option<Result<Vec<DropdownItem>, ApiError>> {
        let seq = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != seq {
            debug!(text, "keystroke superseded before debounce settled");
            return None;
        }

        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(
            self.cache
                .ensure(text.to_string(), || self.port.search(text))
                .await,
        )
    }
}
