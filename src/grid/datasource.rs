// src/grid/datasource.rs
//
// Bridges the grid's virtualized viewport to the paginated save-age
// endpoint. Each viewport range becomes one offset/limit request, answered
// through the shared page cache; results are reported to the grid's
// range-success callback, failures to its range-failure callback. Errors
// never propagate past this adapter.

use crate::cache::QueryCache;
use crate::client::{ApiClient, ApiError, SaveAgeRequest};
use crate::grid::filter::{serialize_filters, serialize_sort, FilterModel, SortItem};
use crate::model::{SaveAgeOutput, SaveAgeRow};
use crate::params::{ReportKey, ReportSelection};
use std::future::Future;
use tracing::{debug, warn};

/// A viewport row-range request. `end_row` is exclusive; the filter and
/// sort models describe the grid's current view.
#[derive(Debug, Clone, Default)]
pub struct ViewportParams {
    pub start_row: u64,
    pub end_row: u64,
    pub filter_model: Option<FilterModel>,
    pub sort_model: Vec<SortItem>,
}

/// The grid's row-range callbacks. On success it receives the page's rows
/// and the total matching count (so it can size its virtual scroll range);
/// on failure it shows a row-level error state.
pub trait RangeCallbacks {
    fn success(&mut self, rows: Vec<SaveAgeRow>, total_count: u64);
    fn fail(&mut self);
}

/// Backend port for the save-age computation. `ApiClient` is the real
/// implementation; tests substitute a stub.
pub trait SaveAgePort {
    fn calc_save_age(
        &self,
        req: &SaveAgeRequest,
    ) -> impl Future<Output = Result<SaveAgeOutput, ApiError>> + Send;
}

impl SaveAgePort for ApiClient {
    fn calc_save_age(
        &self,
        req: &SaveAgeRequest,
    ) -> impl Future<Output = Result<SaveAgeOutput, ApiError>> + Send {
        ApiClient::calc_save_age(self, req)
    }
}

/// Cache key for one page: the validated triple plus every request knob.
/// Changing any component addresses a different entry; old entries stay
/// valid for their own key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub report: ReportKey,
    pub offset: u64,
    pub limit: u64,
    pub filters: Option<String>,
    pub sort: Option<String>,
}

pub struct SaveAgeDatasource<P> {
    port: P,
    cache: QueryCache<PageKey, SaveAgeOutput>,
    selection: ReportSelection,
}

impl<P: SaveAgePort> SaveAgeDatasource<P> {
    pub fn new(port: P, cache: QueryCache<PageKey, SaveAgeOutput>, selection: ReportSelection) -> Self {
        SaveAgeDatasource {
            port,
            cache,
            selection,
        }
    }

    /// Build the request for a viewport range, or `None` when the selection
    /// triple is incomplete or the date is not ISO — in which case no HTTP
    /// call may be issued at all.
    fn request_for(&self, params: &ViewportParams) -> Option<SaveAgeRequest> {
        let key = self.selection.validated()?;
        let filters = params
            .filter_model
            .as_ref()
            .and_then(serialize_filters)
            .filter(|f| !f.is_empty());
        let sort = match params.sort_model.as_slice() {
            [] => None,
            model => Some(serialize_sort(model)),
        };
        Some(SaveAgeRequest {
            key,
            offset: params.start_row,
            limit: params.end_row.saturating_sub(params.start_row),
            filters,
            sort,
        })
    }

    fn page_key(req: &SaveAgeRequest) -> PageKey {
        PageKey {
            report: req.key.clone(),
            offset: req.offset,
            limit: req.limit,
            filters: req.filters.clone(),
            sort: req.sort.clone(),
        }
    }

    /// Serve a viewport range. Cache-fresh pages answer without touching
    /// the network; fetch failures of any kind become `fail()`.
    pub async fn get_rows<C: RangeCallbacks>(&self, params: &ViewportParams, cb: &mut C) {
        let Some(req) = self.request_for(params) else {
            debug!("report selection incomplete; serving no rows");
            cb.fail();
            return;
        };

        let key = Self::page_key(&req);
        let result = self
            .cache
            .ensure(key, || self.port.calc_save_age(&req))
            .await;
        match result {
            Ok(page) => cb.success(page.data, page.stats.count),
            Err(err) => {
                warn!(error = %err, offset = req.offset, limit = req.limit, "save-age page fetch failed");
                cb.fail();
            }
        }
    }

    /// Last known page for this viewport, any age. Placeholder data while a
    /// refetch is in flight, so the view doesn't flicker to empty.
    pub fn cached_page(&self, params: &ViewportParams) -> Option<SaveAgeOutput> {
        let req = self.request_for(params)?;
        self.cache.get(&Self::page_key(&req))
    }
}
