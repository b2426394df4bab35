//! Generic admin data-table controller.
//!
//! One [`ResourceController`] owns the cache, filter state, page window and
//! toast channel of a single admin page. Network work is split in two phases
//! so UI code never holds a borrow across an `.await`: `begin_*`/`prepare_*`
//! produce a request, the caller runs it, and `apply_*` folds the response
//! back in. The `async` methods at the bottom chain both phases for callers
//! that own the controller outright (CLI, tests).
//!
//! Server-paginated resources only ever hold one filtered page in the cache,
//! so they keep a second, unfiltered copy of the collection (the catalog)
//! for stats and filter choices. Confirmed mutations patch both.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::{
    backend::{CollectionBackend, DeleteAction, ListQuery, RawSnapshot},
    derivation::{self, CollectionStats},
    entity::{AdminEntity, EntityId},
    error::{ApiError, ControllerError},
    filter::{DebounceToken, FilterState},
    notify::{NotificationChannel, Severity, DEFAULT_AUTO_HIDE},
    paging::{page_count, PageWindow},
};

/// Default delay between the last keystroke and the search being applied.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Where filtering and pagination happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Every filter or page change refetches; the server slices.
    ServerPaginated,
    /// The whole collection is fetched once and derived locally.
    ClientCached,
}

/// Per-page controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Where filtering and pagination happen.
    pub strategy: FetchStrategy,
    /// Rows per page, at least 1.
    pub page_size: usize,
    /// Quiet period before typed search text is applied.
    pub search_debounce: Duration,
    /// How long a toast stays visible.
    pub notification_auto_hide: Duration,
}

impl ControllerConfig {
    /// Defaults with server-side filtering and paging.
    pub fn server_paginated() -> Self {
        Self::default()
    }

    /// Defaults with the whole collection fetched once.
    pub fn client_cached() -> Self {
        Self {
            strategy: FetchStrategy::ClientCached,
            ..Self::default()
        }
    }

    /// Strategy the admin API dictates for `E`.
    pub fn for_entity<E: AdminEntity>() -> Self {
        if E::SERVER_PAGINATED {
            Self::server_paginated()
        } else {
            Self::client_cached()
        }
    }

    /// Override the page size; 0 becomes 1.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::ServerPaginated,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            notification_auto_hide: DEFAULT_AUTO_HIDE,
        }
    }
}

/// Monotonic request counter; only the latest issued request may apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    /// Issue the next sequence number, superseding every earlier one.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Whether `seq` is the most recently issued number.
    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// What the caller has to do after a state change.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Issue a new fetch with [`ResourceController::begin_fetch`].
    Refetch,
    /// The visible rows changed locally; re-render.
    Rederived,
    /// Nothing changed.
    Unchanged,
}

/// An issued list request. Consumed when its response is applied.
#[derive(Debug, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    query: ListQuery,
}

impl FetchTicket {
    /// Query to send for this request.
    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// An issued catalog request (whole collection, no filters).
#[derive(Debug, PartialEq, Eq)]
pub struct CatalogTicket {
    seq: u64,
    query: ListQuery,
}

impl CatalogTicket {
    /// Query to send for this request; always unpaged and unfiltered.
    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// Result of folding a list response into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response is now the visible state.
    Applied,
    /// Applied, but the requested page no longer exists; the controller moved
    /// to `page_index` and the caller must refetch.
    Clamped {
        /// Index the controller moved to.
        page_index: usize,
    },
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
    /// The request failed; the view shows its empty state.
    Failed,
}

/// Proof that the user confirmed a delete. Only obtainable through
/// [`ResourceController::confirm_remove`] and consumed by the removal.
#[derive(Debug, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: EntityId,
}

impl DeleteConfirmation {
    /// Entity the user agreed to delete.
    pub fn id(&self) -> &EntityId {
        &self.id
    }
}

/// A status toggle ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TogglePlan {
    /// Entity to patch.
    pub id: EntityId,
    /// Status the entity will have once the patch is confirmed.
    pub next_active: bool,
    /// PATCH body carrying only the status field.
    pub payload: Value,
}

/// Cache, filters, pagination, mutations and toasts for one resource.
#[derive(Debug, Clone)]
pub struct ResourceController<E: AdminEntity> {
    config: ControllerConfig,
    filters: FilterState,
    window: PageWindow,
    cache: Vec<E>,
    total_count: usize,
    total_pages: usize,
    loaded: bool,
    page_stale: bool,
    requests: RequestSequence,
    in_flight: Option<u64>,
    last_error: Option<ControllerError>,
    catalog: Vec<E>,
    catalog_loaded: bool,
    catalog_requests: RequestSequence,
    notifications: NotificationChannel,
}

impl<E: AdminEntity> ResourceController<E> {
    /// Empty controller; nothing is fetched until the caller asks.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            window: PageWindow::new(config.page_size),
            notifications: NotificationChannel::new(config.notification_auto_hide),
            config,
            filters: FilterState::default(),
            cache: Vec::new(),
            total_count: 0,
            total_pages: 0,
            loaded: false,
            page_stale: false,
            requests: RequestSequence::default(),
            in_flight: None,
            last_error: None,
            catalog: Vec::new(),
            catalog_loaded: false,
            catalog_requests: RequestSequence::default(),
        }
    }

    /// Settings the controller was built with.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Where filtering and pagination happen for this resource.
    pub fn strategy(&self) -> FetchStrategy {
        self.config.strategy
    }

    /// Committed and pending search plus categorical filters.
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Current page index and size.
    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// Toast slot for this page.
    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    /// Toast slot, for dismissing and expiring.
    pub fn notifications_mut(&mut self) -> &mut NotificationChannel {
        &mut self.notifications
    }

    /// True between dispatching the latest fetch and its response.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Error from the latest fetch, for the error/empty state.
    pub fn last_error(&self) -> Option<&ControllerError> {
        self.last_error.as_ref()
    }

    /// Whether a fetch is due: nothing loaded yet, or the current server page
    /// is known to be out of date.
    pub fn needs_fetch(&self) -> bool {
        !self.loaded || self.page_stale
    }

    /// Look up a cached entity.
    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.cache.iter().find(|entity| entity.id() == id)
    }

    /// Every cached entity, unfiltered.
    pub fn cache(&self) -> &[E] {
        &self.cache
    }

    /// The whole collection regardless of page and filters: the catalog for
    /// server-paginated resources, the cache otherwise.
    pub fn collection(&self) -> &[E] {
        match self.config.strategy {
            FetchStrategy::ServerPaginated => &self.catalog,
            FetchStrategy::ClientCached => &self.cache,
        }
    }

    /// Whether a catalog fetch is due. Client-cached resources never need
    /// one; their cache already is the whole collection.
    pub fn needs_catalog(&self) -> bool {
        self.config.strategy == FetchStrategy::ServerPaginated && !self.catalog_loaded
    }

    // ---- filter / search ------------------------------------------------

    /// Record search input. Commit the returned token after
    /// [`search_debounce`](Self::search_debounce).
    pub fn set_search_text(&mut self, text: impl Into<String>) -> DebounceToken {
        self.filters.set_search_text(text)
    }

    /// Configured debounce delay.
    pub fn search_debounce(&self) -> Duration {
        self.config.search_debounce
    }

    /// Debounce timer fired.
    pub fn commit_search(&mut self, token: DebounceToken) -> Reaction {
        if !self.filters.commit_search(token) {
            return Reaction::Unchanged;
        }
        self.window.reset();
        self.filters_changed()
    }

    /// Select a categorical filter value; empty clears it. Always returns to
    /// the first page when the selection changes.
    pub fn set_filter(&mut self, name: &str, value: &str) -> Reaction {
        if !self.filters.set_filter(name, value) {
            return Reaction::Unchanged;
        }
        self.window.reset();
        self.filters_changed()
    }

    /// Reset search, every filter and the page index.
    pub fn clear_all(&mut self) -> Reaction {
        let was_clear = self.filters.is_empty()
            && !self.filters.has_pending_search()
            && self.window.page_index() == 0;
        self.filters.clear();
        self.window.reset();
        if was_clear {
            Reaction::Unchanged
        } else {
            self.filters_changed()
        }
    }

    fn filters_changed(&mut self) -> Reaction {
        match self.config.strategy {
            FetchStrategy::ServerPaginated => Reaction::Refetch,
            FetchStrategy::ClientCached => {
                self.clamp_client_window();
                Reaction::Rederived
            },
        }
    }

    // ---- pagination -----------------------------------------------------

    /// Move to a 0-based page.
    pub fn set_page(&mut self, index: usize) -> Reaction {
        if !self.window.set_page(index) {
            return Reaction::Unchanged;
        }
        match self.config.strategy {
            FetchStrategy::ServerPaginated => Reaction::Refetch,
            FetchStrategy::ClientCached => {
                self.clamp_client_window();
                Reaction::Rederived
            },
        }
    }

    /// Change the page size and return to the first page.
    pub fn set_page_size(&mut self, size: usize) -> Reaction {
        if !self.window.set_page_size(size) {
            return Reaction::Unchanged;
        }
        match self.config.strategy {
            FetchStrategy::ServerPaginated => Reaction::Refetch,
            FetchStrategy::ClientCached => Reaction::Rederived,
        }
    }

    fn clamp_client_window(&mut self) {
        if self.config.strategy == FetchStrategy::ClientCached {
            let filtered_len = self.filtered().len();
            self.window.clamp_to(filtered_len);
        }
    }

    // ---- derivations ----------------------------------------------------

    /// Cached entities passing the current filters.
    pub fn filtered(&self) -> Vec<E> {
        derivation::filtered(&self.cache, &self.filters)
    }

    /// Rows for the current page.
    pub fn visible_items(&self) -> Vec<E> {
        match self.config.strategy {
            FetchStrategy::ServerPaginated => self.cache.clone(),
            FetchStrategy::ClientCached => self.window.slice(&self.filtered()).to_vec(),
        }
    }

    /// Rows matching the filters across all pages.
    pub fn total_count(&self) -> usize {
        match self.config.strategy {
            FetchStrategy::ServerPaginated => self.total_count,
            FetchStrategy::ClientCached => self.filtered().len(),
        }
    }

    /// Pages for the rows matching the filters.
    pub fn total_pages(&self) -> usize {
        match self.config.strategy {
            FetchStrategy::ServerPaginated => self.total_pages,
            FetchStrategy::ClientCached => page_count(self.filtered().len(), self.window.page_size()),
        }
    }

    /// Counts over the whole [`collection`](Self::collection); page, search
    /// and filters never change them.
    pub fn stats(&self) -> CollectionStats {
        derivation::stats(self.collection())
    }

    /// Choices for a filter dropdown. Selecting a value never removes the
    /// others: the catalog is unfiltered and the current page is merged in
    /// for rows it does not hold yet.
    pub fn filter_options(&self, name: &str) -> Vec<String> {
        match self.config.strategy {
            FetchStrategy::ServerPaginated => {
                derivation::filter_options(self.catalog.iter().chain(&self.cache), name)
            },
            FetchStrategy::ClientCached => derivation::filter_options(&self.cache, name),
        }
    }

    // ---- fetch ----------------------------------------------------------

    /// Query the next fetch should send.
    pub fn current_query(&self) -> ListQuery {
        match self.config.strategy {
            FetchStrategy::ServerPaginated => ListQuery {
                page: Some(self.window.page_index()),
                page_size: Some(self.window.page_size()),
                search: self.filters.search_text().to_string(),
                filters: self
                    .filters
                    .active_filters()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            },
            FetchStrategy::ClientCached => ListQuery::default(),
        }
    }

    /// Issue a list request. Any earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        let seq = self.requests.issue();
        self.in_flight = Some(seq);
        let query = self.current_query();
        tracing::debug!(resource = E::RESOURCE, seq, query = %query.to_query_string(), "fetch issued");
        FetchTicket {
            seq,
            query,
        }
    }

    /// Fold a list response in, unless a newer request was issued since.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<RawSnapshot, ApiError>,
    ) -> FetchOutcome {
        if !self.requests.is_latest(ticket.seq) {
            tracing::debug!(resource = E::RESOURCE, seq = ticket.seq, "discarding stale response");
            return FetchOutcome::Stale;
        }
        self.in_flight = None;
        self.loaded = true;
        self.page_stale = false;

        let raw = match result {
            Ok(raw) => raw,
            Err(source) => {
                tracing::warn!(resource = E::RESOURCE, "fetch failed: {source}");
                let message = fetch_failure_message(E::RESOURCE, &source);
                self.cache.clear();
                self.total_count = 0;
                self.total_pages = 0;
                self.last_error = Some(ControllerError::Fetch {
                    resource: E::RESOURCE,
                    source,
                });
                self.notifications.notify(message, Severity::Error);
                return FetchOutcome::Failed;
            },
        };

        let snapshot = raw.adapt::<E>(self.window.page_size());
        self.last_error = None;
        self.cache = snapshot.items;
        match self.config.strategy {
            FetchStrategy::ServerPaginated => {
                self.total_count = snapshot.total_count;
                self.total_pages = snapshot.total_pages;
                let last_index = self.total_pages.saturating_sub(1);
                if self.window.page_index() > last_index {
                    self.window.set_page(last_index);
                    self.page_stale = true;
                    tracing::debug!(resource = E::RESOURCE, page_index = last_index, "page clamped");
                    return FetchOutcome::Clamped {
                        page_index: last_index,
                    };
                }
            },
            FetchStrategy::ClientCached => {
                self.total_count = self.cache.len();
                self.total_pages = page_count(self.total_count, self.window.page_size());
                self.clamp_client_window();
            },
        }
        FetchOutcome::Applied
    }

    /// Issue a catalog request for the whole, unfiltered collection.
    pub fn begin_catalog(&mut self) -> CatalogTicket {
        let seq = self.catalog_requests.issue();
        tracing::debug!(resource = E::RESOURCE, seq, "catalog fetch issued");
        CatalogTicket {
            seq,
            query: ListQuery::default(),
        }
    }

    /// Fold a catalog response in. A failure keeps the previous catalog and
    /// shows a warning; the page itself is unaffected.
    pub fn apply_catalog(
        &mut self,
        ticket: CatalogTicket,
        result: Result<RawSnapshot, ApiError>,
    ) -> Result<FetchOutcome, ControllerError> {
        if !self.catalog_requests.is_latest(ticket.seq) {
            tracing::debug!(resource = E::RESOURCE, seq = ticket.seq, "discarding stale catalog");
            return Ok(FetchOutcome::Stale);
        }
        match result {
            Ok(raw) => {
                let snapshot = raw.adapt::<E>(self.window.page_size());
                self.catalog = snapshot.items;
                self.catalog_loaded = true;
                Ok(FetchOutcome::Applied)
            },
            Err(source) => {
                tracing::warn!(resource = E::RESOURCE, "catalog fetch failed: {source}");
                self.notifications.notify(
                    format!("Could not load {} totals", E::RESOURCE),
                    Severity::Warning,
                );
                Err(ControllerError::Fetch {
                    resource: E::RESOURCE,
                    source,
                })
            },
        }
    }

    // ---- mutations ------------------------------------------------------

    /// Fold the confirmed result of a create.
    pub fn apply_created(&mut self, result: Result<Value, ApiError>) -> Result<E, ControllerError> {
        let entity = self.confirmed(result, "create")?;
        match self.config.strategy {
            FetchStrategy::ServerPaginated => {
                if derivation::matches_filters(&entity, &self.filters) {
                    self.cache.insert(0, entity.clone());
                    self.cache.truncate(self.window.page_size());
                    self.total_count += 1;
                    self.recount_pages();
                }
            },
            FetchStrategy::ClientCached => self.cache.insert(0, entity.clone()),
        }
        self.sync_catalog(entity.id(), Some(&entity));
        tracing::info!(resource = E::RESOURCE, id = %entity.id(), "created");
        self.notifications.notify(
            format!("{} \"{}\" created", E::LABEL, entity.display_name()),
            Severity::Success,
        );
        Ok(entity)
    }

    /// Fold the confirmed result of a full update.
    pub fn apply_updated(
        &mut self,
        id: &EntityId,
        result: Result<Value, ApiError>,
    ) -> Result<E, ControllerError> {
        let entity = self.confirmed(result, "update")?;
        self.patch_in_place(id, entity.clone());
        self.sync_catalog(id, Some(&entity));
        tracing::info!(resource = E::RESOURCE, id = %id, "updated");
        self.notifications.notify(
            format!("{} \"{}\" updated", E::LABEL, entity.display_name()),
            Severity::Success,
        );
        Ok(entity)
    }

    /// Build the PATCH for flipping a cached entity's status.
    pub fn prepare_toggle(&self, id: &EntityId) -> Result<TogglePlan, ControllerError> {
        let current = self
            .get(id)
            .ok_or_else(|| ControllerError::NotInCache(id.clone()))?;
        let next_active = !current.is_active();
        let mut payload = Map::new();
        payload.insert(E::ACTIVE_FIELD.to_string(), Value::Bool(next_active));
        Ok(TogglePlan {
            id: id.clone(),
            next_active,
            payload: Value::Object(payload),
        })
    }

    /// Fold the confirmed result of a status toggle.
    pub fn apply_toggled(
        &mut self,
        plan: &TogglePlan,
        result: Result<Value, ApiError>,
    ) -> Result<E, ControllerError> {
        let mut entity = self.confirmed(result, "update")?;
        // A 2xx confirms the requested status even when the route echoes the
        // pre-update row.
        entity.set_active(plan.next_active);
        self.patch_in_place(&plan.id, entity.clone());
        self.sync_catalog(&plan.id, Some(&entity));
        let verb = if entity.is_active() { "activated" } else { "deactivated" };
        tracing::info!(resource = E::RESOURCE, id = %plan.id, verb, "status toggled");
        self.notifications.notify(
            format!("{} \"{}\" {verb}", E::LABEL, entity.display_name()),
            Severity::Success,
        );
        Ok(entity)
    }

    /// Record that the user confirmed deleting `id`. The controller never
    /// prompts; UI code calls this from its confirmation dialog.
    pub fn confirm_remove(&self, id: &EntityId) -> DeleteConfirmation {
        DeleteConfirmation {
            id: id.clone(),
        }
    }

    /// Fold the confirmed result of a delete.
    ///
    /// `Deleted` drops the row; `Deactivated` keeps it with the status flag
    /// cleared.
    pub fn apply_removed(
        &mut self,
        confirmation: DeleteConfirmation,
        result: Result<DeleteAction, ApiError>,
    ) -> Result<DeleteAction, ControllerError> {
        let id = confirmation.id;
        let known = self
            .get(&id)
            .or_else(|| self.catalog.iter().find(|entity| entity.id() == &id))
            .cloned();
        let name = known
            .as_ref()
            .map(|entity| entity.display_name().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| id.to_string());
        let action = match result {
            Ok(action) => action,
            Err(source) => return Err(self.mutation_failed("delete", source)),
        };
        match action {
            DeleteAction::Deleted => {
                if let Some(position) = self.cache.iter().position(|entity| entity.id() == &id) {
                    self.cache.remove(position);
                    self.after_removal();
                }
                self.sync_catalog(&id, None);
                self.notifications.notify(
                    format!("{} \"{name}\" deleted", E::LABEL),
                    Severity::Success,
                );
            },
            DeleteAction::Deactivated => {
                if let Some(mut entity) = known {
                    entity.set_active(false);
                    self.patch_in_place(&id, entity.clone());
                    self.sync_catalog(&id, Some(&entity));
                }
                self.notifications.notify(
                    format!(
                        "{} \"{name}\" has dependents and was deactivated instead of deleted",
                        E::LABEL
                    ),
                    Severity::Info,
                );
            },
        }
        tracing::info!(resource = E::RESOURCE, id = %id, action = action.as_str(), "removed");
        Ok(action)
    }

    /// Fold a detail response into the cache. A loaded page only has its
    /// existing row refreshed.
    pub fn apply_detail(
        &mut self,
        id: &EntityId,
        result: Result<Value, ApiError>,
    ) -> Result<E, ControllerError> {
        let raw = match result {
            Ok(raw) => raw,
            Err(source) => {
                let message = fetch_failure_message(E::RESOURCE, &source);
                self.notifications.notify(message, Severity::Error);
                return Err(ControllerError::Fetch {
                    resource: E::RESOURCE,
                    source,
                });
            },
        };
        let entity = E::from_raw(&raw).inspect_err(|err| {
            self.notifications
                .notify(format!("Could not read {}: {err}", E::LABEL), Severity::Error);
        })?;
        match self.cache.iter_mut().find(|cached| cached.id() == id) {
            Some(slot) => *slot = entity.clone(),
            // Before the first list fetch there is no page to protect; keep the
            // row so it can be toggled or removed by id.
            None if !self.loaded => self.cache.push(entity.clone()),
            None => {},
        }
        if let Some(slot) = self.catalog.iter_mut().find(|cached| cached.id() == id) {
            *slot = entity.clone();
        }
        Ok(entity)
    }

    fn confirmed(
        &mut self,
        result: Result<Value, ApiError>,
        verb: &'static str,
    ) -> Result<E, ControllerError> {
        let raw = result.map_err(|source| self.mutation_failed(verb, source))?;
        E::from_raw(&raw).map_err(|err| {
            tracing::warn!(resource = E::RESOURCE, verb, "unreadable mutation response: {err}");
            self.notifications.notify(
                format!("{} was saved but the response could not be read", E::LABEL),
                Severity::Warning,
            );
            ControllerError::Adapt(err)
        })
    }

    fn mutation_failed(&mut self, verb: &'static str, source: ApiError) -> ControllerError {
        tracing::warn!(resource = E::RESOURCE, verb, "mutation failed: {source}");
        let message = source
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Failed to {verb} {}", E::LABEL.to_lowercase()));
        self.notifications.notify(message, Severity::Error);
        ControllerError::Mutation {
            resource: E::RESOURCE,
            verb,
            source,
        }
    }

    /// Replace the cached row for `id`. On a server page, a row that no
    /// longer passes the categorical filters leaves the visible set.
    fn patch_in_place(&mut self, id: &EntityId, entity: E) {
        let Some(position) = self.cache.iter().position(|cached| cached.id() == id) else {
            return;
        };
        let keep = match self.config.strategy {
            FetchStrategy::ServerPaginated => derivation::matches_filters(&entity, &self.filters),
            FetchStrategy::ClientCached => true,
        };
        if keep {
            self.cache[position] = entity;
        } else {
            self.cache.remove(position);
            self.after_removal();
        }
    }

    /// Mirror a confirmed change into a loaded catalog; `None` drops the row.
    fn sync_catalog(&mut self, id: &EntityId, entity: Option<&E>) {
        if self.config.strategy != FetchStrategy::ServerPaginated || !self.catalog_loaded {
            return;
        }
        let position = self.catalog.iter().position(|cached| cached.id() == id);
        match (position, entity) {
            (Some(index), Some(entity)) => self.catalog[index] = entity.clone(),
            (None, Some(entity)) => self.catalog.insert(0, entity.clone()),
            (Some(index), None) => {
                self.catalog.remove(index);
            },
            (None, None) => {},
        }
    }

    fn after_removal(&mut self) {
        match self.config.strategy {
            FetchStrategy::ServerPaginated => {
                self.total_count = self.total_count.saturating_sub(1);
                self.recount_pages();
                if self.cache.is_empty() && self.total_count > 0 {
                    self.window.clamp_to(self.total_count);
                    self.page_stale = true;
                }
            },
            FetchStrategy::ClientCached => {
                self.total_count = self.cache.len();
                self.recount_pages();
                self.clamp_client_window();
            },
        }
    }

    fn recount_pages(&mut self) {
        self.total_pages = page_count(self.total_count, self.window.page_size());
    }

    // ---- async drivers --------------------------------------------------

    /// Fetch the current page, following one clamp if the page vanished.
    pub async fn refresh<B>(&mut self, backend: &B) -> FetchOutcome
    where
        B: CollectionBackend + ?Sized,
    {
        let mut outcome = FetchOutcome::Failed;
        for _ in 0..2 {
            let ticket = self.begin_fetch();
            let result = backend.fetch_page(E::RESOURCE, ticket.query()).await;
            outcome = self.apply_fetch(ticket, result);
            if !matches!(outcome, FetchOutcome::Clamped { .. }) {
                break;
            }
        }
        outcome
    }

    /// Fetch only if [`needs_fetch`](Self::needs_fetch).
    pub async fn ensure_loaded<B>(&mut self, backend: &B) -> Option<FetchOutcome>
    where
        B: CollectionBackend + ?Sized,
    {
        if self.needs_fetch() {
            Some(self.refresh(backend).await)
        } else {
            None
        }
    }

    /// Load what [`stats`](Self::stats) counts: the catalog for
    /// server-paginated resources, the whole cache otherwise.
    pub async fn refresh_catalog<B>(&mut self, backend: &B) -> Result<FetchOutcome, ControllerError>
    where
        B: CollectionBackend + ?Sized,
    {
        match self.config.strategy {
            FetchStrategy::ServerPaginated => {
                let ticket = self.begin_catalog();
                let result = backend.fetch_page(E::RESOURCE, ticket.query()).await;
                self.apply_catalog(ticket, result)
            },
            FetchStrategy::ClientCached => {
                let outcome = self.refresh(backend).await;
                match self.last_error.clone() {
                    Some(err) if outcome == FetchOutcome::Failed => Err(err),
                    _ => Ok(outcome),
                }
            },
        }
    }

    /// Fetch one entity and refresh its cached row.
    pub async fn load_detail<B>(&mut self, backend: &B, id: &EntityId) -> Result<E, ControllerError>
    where
        B: CollectionBackend + ?Sized,
    {
        let result = backend.fetch_entity(E::RESOURCE, id).await;
        self.apply_detail(id, result)
    }

    /// POST a new entity.
    pub async fn create<B>(&mut self, backend: &B, payload: &Value) -> Result<E, ControllerError>
    where
        B: CollectionBackend + ?Sized,
    {
        let result = backend.create_entity(E::RESOURCE, payload).await;
        self.apply_created(result)
    }

    /// PUT a full update.
    pub async fn update<B>(
        &mut self,
        backend: &B,
        id: &EntityId,
        payload: &Value,
    ) -> Result<E, ControllerError>
    where
        B: CollectionBackend + ?Sized,
    {
        let result = backend.update_entity(E::RESOURCE, id, payload).await;
        self.apply_updated(id, result)
    }

    /// PATCH the status flag of a cached entity.
    pub async fn toggle_active<B>(&mut self, backend: &B, id: &EntityId) -> Result<E, ControllerError>
    where
        B: CollectionBackend + ?Sized,
    {
        let plan = self.prepare_toggle(id)?;
        let result = backend.patch_entity(E::RESOURCE, &plan.id, &plan.payload).await;
        self.apply_toggled(&plan, result)
    }

    /// DELETE a confirmed entity.
    pub async fn remove<B>(
        &mut self,
        backend: &B,
        confirmation: DeleteConfirmation,
    ) -> Result<DeleteAction, ControllerError>
    where
        B: CollectionBackend + ?Sized,
    {
        let result = backend.delete_entity(E::RESOURCE, confirmation.id()).await;
        self.apply_removed(confirmation, result)
    }
}

fn fetch_failure_message(resource: &str, error: &ApiError) -> String {
    match error {
        ApiError::Timeout {
            ..
        } => format!("Loading {resource} timed out, please retry"),
        other => other
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Failed to load {resource}")),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{coerce::coerce_bool, entity::Course, entity::status_label};

    struct FakeBackend {
        rows: RefCell<Vec<Value>>,
        failure: RefCell<Option<ApiError>>,
        queries: RefCell<Vec<ListQuery>>,
    }

    impl FakeBackend {
        fn new(rows: Vec<Value>) -> Self {
            Self {
                rows: RefCell::new(rows),
                failure: RefCell::new(None),
                queries: RefCell::new(Vec::new()),
            }
        }

        fn fail_next(&self, err: ApiError) {
            *self.failure.borrow_mut() = Some(err);
        }

        fn take_failure(&self) -> Result<(), ApiError> {
            match self.failure.borrow_mut().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn fetch_count(&self) -> usize {
            self.queries.borrow().len()
        }

        fn position(&self, id: &EntityId) -> Result<usize, ApiError> {
            self.rows
                .borrow()
                .iter()
                .position(|row| row["CourseId"].to_string() == id.as_str())
                .ok_or_else(|| ApiError::from_response(404, r#"{"message":"not found"}"#))
        }

        fn patch(&self, id: &EntityId, payload: &Value) -> Result<Value, ApiError> {
            self.take_failure()?;
            let index = self.position(id)?;
            let mut rows = self.rows.borrow_mut();
            merge(&mut rows[index], payload);
            Ok(rows[index].clone())
        }
    }

    fn merge(row: &mut Value, payload: &Value) {
        let (Some(row), Some(payload)) = (row.as_object_mut(), payload.as_object()) else {
            return;
        };
        for (key, value) in payload {
            let existing = row
                .keys()
                .find(|candidate| candidate.eq_ignore_ascii_case(key))
                .cloned()
                .unwrap_or_else(|| key.clone());
            row.insert(existing, value.clone());
        }
    }

    fn server_match(row: &Value, query: &ListQuery) -> bool {
        let title = row["Title"].as_str().unwrap_or_default().to_lowercase();
        if !query.search.is_empty() && !title.contains(&query.search.to_lowercase()) {
            return false;
        }
        query.filters.iter().all(|(name, wanted)| match name.as_str() {
            "category" => row["Category"].as_str() == Some(wanted.as_str()),
            "status" => status_label(coerce_bool(row.get("IsActive"))) == wanted,
            _ => false,
        })
    }

    #[async_trait(?Send)]
    impl CollectionBackend for FakeBackend {
        async fn fetch_page(&self, _resource: &str, query: &ListQuery) -> Result<RawSnapshot, ApiError> {
            self.take_failure()?;
            self.queries.borrow_mut().push(query.clone());
            let rows: Vec<Value> = self
                .rows
                .borrow()
                .iter()
                .filter(|row| server_match(row, query))
                .cloned()
                .collect();
            let total = rows.len();
            let items = match (query.page, query.page_size) {
                (Some(page), Some(size)) => rows.into_iter().skip(page * size).take(size).collect(),
                _ => rows,
            };
            Ok(RawSnapshot {
                items,
                total_count: Some(total),
                total_pages: query.page_size.map(|size| page_count(total, size)),
            })
        }

        async fn fetch_entity(&self, _resource: &str, id: &EntityId) -> Result<Value, ApiError> {
            self.take_failure()?;
            let index = self.position(id)?;
            Ok(self.rows.borrow()[index].clone())
        }

        async fn create_entity(&self, _resource: &str, payload: &Value) -> Result<Value, ApiError> {
            self.take_failure()?;
            let mut row = json!({ "CourseId": self.rows.borrow().len() + 100, "IsActive": 1 });
            merge(&mut row, payload);
            self.rows.borrow_mut().push(row.clone());
            Ok(row)
        }

        async fn update_entity(
            &self,
            _resource: &str,
            id: &EntityId,
            payload: &Value,
        ) -> Result<Value, ApiError> {
            self.patch(id, payload)
        }

        async fn patch_entity(
            &self,
            _resource: &str,
            id: &EntityId,
            payload: &Value,
        ) -> Result<Value, ApiError> {
            self.patch(id, payload)
        }

        async fn delete_entity(&self, _resource: &str, id: &EntityId) -> Result<DeleteAction, ApiError> {
            self.take_failure()?;
            let index = self.position(id)?;
            let mut rows = self.rows.borrow_mut();
            if rows[index]["EnrolledUsers"].as_u64().unwrap_or(0) > 0 {
                rows[index]["IsActive"] = json!(0);
                Ok(DeleteAction::Deactivated)
            } else {
                rows.remove(index);
                Ok(DeleteAction::Deleted)
            }
        }
    }

    fn course_rows(count: usize) -> Vec<Value> {
        (1..=count)
            .map(|n| {
                json!({
                    "CourseId": n,
                    "Title": format!("Course {n}"),
                    "Category": if n % 2 == 0 { "Design" } else { "Programming" },
                    "IsActive": if n % 3 == 0 { 0 } else { 1 },
                    "EnrolledUsers": 0,
                })
            })
            .collect()
    }

    fn server(page_size: usize) -> ResourceController<Course> {
        ResourceController::new(ControllerConfig::server_paginated().with_page_size(page_size))
    }

    fn cached(page_size: usize) -> ResourceController<Course> {
        ResourceController::new(ControllerConfig::client_cached().with_page_size(page_size))
    }

    fn ids(items: &[Course]) -> Vec<String> {
        items.iter().map(|course| course.id.to_string()).collect()
    }

    fn toast(controller: &ResourceController<Course>) -> (String, Severity) {
        let current = controller
            .notifications()
            .current()
            .expect("a notification should be visible");
        (current.message.clone(), current.severity)
    }

    #[tokio::test]
    async fn server_refresh_sends_current_query() {
        let backend = FakeBackend::new(course_rows(25));
        let mut controller = server(10);
        assert!(controller.needs_fetch());

        assert_eq!(controller.set_filter("category", "Programming"), Reaction::Refetch);
        assert_eq!(controller.refresh(&backend).await, FetchOutcome::Applied);

        let query = backend.queries.borrow()[0].clone();
        assert_eq!(query.to_query_string(), "page=1&pageSize=10&category=Programming");
        assert_eq!(controller.total_count(), 13);
        assert_eq!(controller.total_pages(), 2);
        assert_eq!(controller.visible_items().len(), 10);
        assert!(!controller.is_loading());
        assert!(!controller.needs_fetch());
    }

    #[tokio::test]
    async fn filter_change_returns_to_first_page() {
        let backend = FakeBackend::new(course_rows(40));
        let mut controller = server(10);
        assert_eq!(controller.set_page(2), Reaction::Refetch);
        controller.refresh(&backend).await;
        assert_eq!(controller.visible_items()[0].id.as_str(), "21");

        assert_eq!(controller.set_filter("status", "inactive"), Reaction::Refetch);
        assert_eq!(controller.window().page_index(), 0);
        assert_eq!(controller.set_filter("status", "inactive"), Reaction::Unchanged);
    }

    #[tokio::test]
    async fn stale_response_does_not_overwrite_newer_state() {
        let backend = FakeBackend::new(vec![
            json!({ "CourseId": 1, "Title": "Python basics" }),
            json!({ "CourseId": 2, "Title": "Java in depth" }),
        ]);
        let mut controller = server(10);

        let token = controller.set_search_text("py");
        let _ = controller.commit_search(token);
        let request_a = controller.begin_fetch();
        let response_a = backend.fetch_page("courses", request_a.query()).await;

        let token = controller.set_search_text("java");
        let _ = controller.commit_search(token);
        let request_b = controller.begin_fetch();
        let response_b = backend.fetch_page("courses", request_b.query()).await;

        assert_eq!(controller.apply_fetch(request_b, response_b), FetchOutcome::Applied);
        assert_eq!(controller.apply_fetch(request_a, response_a), FetchOutcome::Stale);
        assert_eq!(ids(&controller.visible_items()), vec!["2"]);
        assert_eq!(controller.filters().search_text(), "java");
    }

    #[tokio::test]
    async fn loading_lasts_until_latest_response() {
        let backend = FakeBackend::new(course_rows(3));
        let mut controller = server(10);
        let first = controller.begin_fetch();
        let second = controller.begin_fetch();
        assert!(controller.is_loading());

        let stale = backend.fetch_page("courses", first.query()).await;
        assert_eq!(controller.apply_fetch(first, stale), FetchOutcome::Stale);
        assert!(controller.is_loading());

        let fresh = backend.fetch_page("courses", second.query()).await;
        assert_eq!(controller.apply_fetch(second, fresh), FetchOutcome::Applied);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn vanished_server_page_is_clamped_and_refetched() {
        let backend = FakeBackend::new(course_rows(25));
        let mut controller = server(10);
        let _ = controller.set_page(2);
        controller.refresh(&backend).await;
        assert_eq!(controller.visible_items().len(), 5);

        backend.rows.borrow_mut().truncate(12);
        assert_eq!(controller.refresh(&backend).await, FetchOutcome::Applied);
        assert_eq!(controller.window().page_index(), 1);
        assert_eq!(ids(&controller.visible_items()), vec!["11", "12"]);
        assert_eq!(backend.fetch_count(), 3);
    }

    #[tokio::test]
    async fn empty_server_result_clamps_to_first_page() {
        let backend = FakeBackend::new(Vec::new());
        let mut controller = server(10);
        let _ = controller.set_page(4);
        let ticket = controller.begin_fetch();
        let response = backend.fetch_page("courses", ticket.query()).await;
        assert_eq!(
            controller.apply_fetch(ticket, response),
            FetchOutcome::Clamped {
                page_index: 0
            }
        );
        assert!(controller.needs_fetch());
    }

    #[tokio::test]
    async fn client_cache_derives_without_refetching() {
        let backend = FakeBackend::new(course_rows(9));
        let mut controller = cached(2);
        controller.refresh(&backend).await;
        assert_eq!(backend.queries.borrow()[0], ListQuery::default());
        assert_eq!(controller.total_pages(), 5);

        assert_eq!(controller.set_page(4), Reaction::Rederived);
        assert_eq!(ids(&controller.visible_items()), vec!["9"]);

        assert_eq!(controller.set_filter("category", "design"), Reaction::Rederived);
        assert_eq!(ids(&controller.visible_items()), vec!["2", "4"]);
        assert_eq!(controller.total_count(), 4);

        let _ = controller.set_page(9);
        assert_eq!(controller.window().page_index(), 1);
        assert_eq!(ids(&controller.visible_items()), vec!["6", "8"]);
        assert_eq!(backend.fetch_count(), 1);
        assert_eq!(controller.ensure_loaded(&backend).await, None);
    }

    #[tokio::test]
    async fn clear_all_restores_whole_cache() {
        let backend = FakeBackend::new(course_rows(6));
        let mut controller = cached(4);
        controller.refresh(&backend).await;
        let _ = controller.set_filter("status", "inactive");
        let token = controller.set_search_text("course 6");
        let _ = controller.commit_search(token);
        assert_eq!(ids(&controller.filtered()), vec!["6"]);

        let _ = controller.set_page(1);
        assert_eq!(controller.clear_all(), Reaction::Rederived);
        assert_eq!(controller.filtered(), controller.cache().to_vec());
        assert_eq!(controller.window().page_index(), 0);
        assert_eq!(controller.clear_all(), Reaction::Unchanged);
    }

    #[tokio::test]
    async fn stats_ignore_paging() {
        let backend = FakeBackend::new(course_rows(9));
        let mut controller = cached(2);
        controller.refresh(&backend).await;
        let before = controller.stats();
        let _ = controller.set_page(3);
        let _ = controller.set_page_size(5);
        let _ = controller.set_filter("category", "Design");
        assert_eq!(controller.stats(), before);
        assert_eq!(before.total, 9);
        assert_eq!(before.inactive, 3);
        assert_eq!(before.by_category.get("Programming"), Some(&5));
    }

    /// Ten active design courses followed by ten inactive programming ones.
    fn split_rows() -> Vec<Value> {
        (1..=20)
            .map(|n| {
                json!({
                    "CourseId": n,
                    "Title": format!("Course {n}"),
                    "Category": if n <= 10 { "Design" } else { "Programming" },
                    "IsActive": if n <= 10 { 1 } else { 0 },
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn server_stats_survive_paging_and_filters() {
        let backend = FakeBackend::new(split_rows());
        let mut controller = server(10);
        assert!(controller.needs_catalog());
        controller.refresh(&backend).await;
        assert_eq!(controller.refresh_catalog(&backend).await, Ok(FetchOutcome::Applied));
        assert!(!controller.needs_catalog());

        let before = controller.stats();
        assert_eq!(before.total, 20);
        assert_eq!(before.active, 10);
        assert_eq!(before.by_category.get("Programming"), Some(&10));

        assert_eq!(controller.set_page(1), Reaction::Refetch);
        controller.refresh(&backend).await;
        assert_eq!(ids(&controller.visible_items())[0], "11");
        assert_eq!(controller.stats(), before);

        assert_eq!(controller.set_filter("category", "Design"), Reaction::Refetch);
        controller.refresh(&backend).await;
        assert_eq!(controller.total_count(), 10);
        assert_eq!(controller.stats(), before);
        assert_eq!(backend.queries.borrow()[1], ListQuery::default());
    }

    #[tokio::test]
    async fn server_filter_choices_survive_a_selection() {
        let backend = FakeBackend::new(split_rows());
        let mut controller = server(10);
        controller.refresh(&backend).await;
        controller.refresh_catalog(&backend).await.unwrap();
        assert_eq!(controller.filter_options("category"), vec!["Design", "Programming"]);

        let _ = controller.set_filter("category", "Design");
        controller.refresh(&backend).await;
        assert!(controller.visible_items().iter().all(|course| course.category == "Design"));
        assert_eq!(controller.filter_options("category"), vec!["Design", "Programming"]);
    }

    #[tokio::test]
    async fn server_filter_choices_include_the_page_before_the_catalog() {
        let backend = FakeBackend::new(split_rows());
        let mut controller = server(10);
        controller.refresh(&backend).await;
        assert_eq!(controller.filter_options("category"), vec!["Design"]);
        assert_eq!(controller.stats().total, 0);
    }

    #[tokio::test]
    async fn catalog_follows_confirmed_mutations() {
        let backend = FakeBackend::new(split_rows());
        let mut controller = server(10);
        controller.refresh(&backend).await;
        controller.refresh_catalog(&backend).await.unwrap();

        controller.toggle_active(&backend, &EntityId::from("1")).await.unwrap();
        let stats = controller.stats();
        assert_eq!((stats.total, stats.active, stats.inactive), (20, 9, 11));

        let confirmation = controller.confirm_remove(&EntityId::from("2"));
        controller.remove(&backend, confirmation).await.unwrap();
        assert_eq!(controller.stats().total, 19);
        assert!(!controller.collection().iter().any(|course| course.id.as_str() == "2"));

        controller
            .create(&backend, &json!({ "Title": "Typography", "Category": "Art" }))
            .await
            .unwrap();
        let stats = controller.stats();
        assert_eq!(stats.total, 20);
        assert_eq!(stats.by_category.get("Art"), Some(&1));
        assert_eq!(controller.filter_options("category"), vec!["Art", "Design", "Programming"]);
    }

    #[tokio::test]
    async fn stale_catalog_response_is_dropped() {
        let backend = FakeBackend::new(split_rows());
        let mut controller = server(10);
        let first = controller.begin_catalog();
        let second = controller.begin_catalog();
        let old = backend.fetch_page("courses", first.query()).await;
        backend.rows.borrow_mut().truncate(5);
        let fresh = backend.fetch_page("courses", second.query()).await;

        assert_eq!(controller.apply_catalog(second, fresh), Ok(FetchOutcome::Applied));
        assert_eq!(controller.apply_catalog(first, old), Ok(FetchOutcome::Stale));
        assert_eq!(controller.stats().total, 5);
    }

    #[tokio::test]
    async fn catalog_failure_leaves_the_page_alone() {
        let backend = FakeBackend::new(split_rows());
        let mut controller = server(10);
        controller.refresh(&backend).await;
        backend.fail_next(ApiError::from_response(503, ""));

        let err = controller.refresh_catalog(&backend).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(controller.needs_catalog());
        assert_eq!(controller.visible_items().len(), 10);
        assert!(controller.last_error().is_none());
        assert_eq!(toast(&controller), ("Could not load courses totals".to_string(), Severity::Warning));
    }

    #[tokio::test]
    async fn client_cache_is_its_own_catalog() {
        let backend = FakeBackend::new(split_rows());
        let mut controller = cached(10);
        assert!(!controller.needs_catalog());
        assert_eq!(controller.refresh_catalog(&backend).await, Ok(FetchOutcome::Applied));
        assert_eq!(controller.collection().len(), 20);
        assert_eq!(backend.fetch_count(), 1);

        backend.fail_next(ApiError::Network("offline".into()));
        assert!(controller.refresh_catalog(&backend).await.is_err());
    }

    #[tokio::test]
    async fn delete_with_dependents_deactivates() {
        let backend = FakeBackend::new(vec![json!({
            "CourseId": 1,
            "Title": "Rust 101",
            "IsActive": 1,
            "EnrolledUsers": 5,
        })]);
        let mut controller = cached(10);
        controller.refresh(&backend).await;

        let confirmation = controller.confirm_remove(&EntityId::from("1"));
        let action = controller.remove(&backend, confirmation).await.unwrap();

        assert_eq!(action, DeleteAction::Deactivated);
        let cached = controller.get(&EntityId::from("1")).expect("row stays cached");
        assert!(!cached.is_active);
        let (message, severity) = toast(&controller);
        assert!(message.contains("deactivated"), "{message}");
        assert!(!message.contains("\" deleted"), "{message}");
        assert_eq!(severity, Severity::Info);
    }

    #[tokio::test]
    async fn delete_without_dependents_removes() {
        let backend = FakeBackend::new(vec![json!({
            "CourseId": 1,
            "Title": "Rust 101",
            "EnrolledUsers": 0,
        })]);
        let mut controller = cached(10);
        controller.refresh(&backend).await;

        let confirmation = controller.confirm_remove(&EntityId::from("1"));
        let action = controller.remove(&backend, confirmation).await.unwrap();

        assert_eq!(action, DeleteAction::Deleted);
        assert!(controller.cache().is_empty());
        assert_eq!(toast(&controller), ("Course \"Rust 101\" deleted".to_string(), Severity::Success));
    }

    #[tokio::test]
    async fn failed_toggle_leaves_cache_untouched() {
        let backend = FakeBackend::new(course_rows(2));
        let mut controller = cached(10);
        controller.refresh(&backend).await;
        let before = controller.cache().to_vec();

        backend.fail_next(ApiError::from_response(409, r#"{"message":"Course is locked"}"#));
        let err = controller
            .toggle_active(&backend, &EntityId::from("1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ControllerError::Mutation { verb: "update", .. }));
        assert_eq!(controller.cache(), before.as_slice());
        assert_eq!(toast(&controller), ("Course is locked".to_string(), Severity::Error));
    }

    #[tokio::test]
    async fn failed_create_without_message_uses_generic_text() {
        let backend = FakeBackend::new(Vec::new());
        let mut controller = cached(10);
        controller.refresh(&backend).await;
        backend.fail_next(ApiError::Network("connection reset".into()));

        let err = controller.create(&backend, &json!({ "title": "x" })).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(toast(&controller).0, "Failed to create course");
    }

    #[tokio::test]
    async fn toggle_out_of_active_filter_leaves_server_page() {
        let backend = FakeBackend::new(course_rows(4));
        let mut controller = server(10);
        let _ = controller.set_filter("status", "active");
        controller.refresh(&backend).await;
        assert_eq!(ids(&controller.visible_items()), vec!["1", "2", "4"]);

        let toggled = controller
            .toggle_active(&backend, &EntityId::from("2"))
            .await
            .unwrap();

        assert!(!toggled.is_active);
        assert_eq!(ids(&controller.visible_items()), vec!["1", "4"]);
        assert_eq!(controller.total_count(), 2);
        assert_eq!(toast(&controller).0, "Course \"Course 2\" deactivated");
        assert_eq!(backend.fetch_count(), 1);
    }

    #[tokio::test]
    async fn toggle_patches_in_place_and_sends_flag() {
        let backend = FakeBackend::new(course_rows(3));
        let mut controller = cached(10);
        controller.refresh(&backend).await;

        let plan = controller.prepare_toggle(&EntityId::from("3")).unwrap();
        assert_eq!(plan.payload, json!({ "isActive": true }));

        let toggled = controller.toggle_active(&backend, &EntityId::from("3")).await.unwrap();
        assert!(toggled.is_active);
        assert!(controller.get(&EntityId::from("3")).unwrap().is_active);
        assert_eq!(controller.cache().len(), 3);
    }

    #[tokio::test]
    async fn toggle_of_unloaded_row_is_rejected() {
        let backend = FakeBackend::new(Vec::new());
        let mut controller = cached(10);
        let err = controller
            .toggle_active(&backend, &EntityId::from("42"))
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::NotInCache(EntityId::from("42")));
    }

    #[tokio::test]
    async fn create_and_update_patch_the_cache() {
        let backend = FakeBackend::new(course_rows(2));
        let mut controller = cached(10);
        controller.refresh(&backend).await;

        let created = controller
            .create(&backend, &json!({ "Title": "Solidity", "Category": "Blockchain" }))
            .await
            .unwrap();
        assert_eq!(controller.cache()[0].id, created.id);
        assert_eq!(toast(&controller).0, "Course \"Solidity\" created");

        let updated = controller
            .update(&backend, &created.id, &json!({ "Title": "Solidity II" }))
            .await
            .unwrap();
        assert_eq!(updated.title, "Solidity II");
        assert_eq!(controller.get(&created.id).unwrap().title, "Solidity II");
        assert_eq!(controller.cache().len(), 3);
    }

    #[tokio::test]
    async fn fetch_failure_shows_empty_state_until_next_success() {
        let backend = FakeBackend::new(course_rows(3));
        let mut controller = server(10);
        controller.refresh(&backend).await;
        assert_eq!(controller.visible_items().len(), 3);

        backend.fail_next(ApiError::Timeout {
            after_ms: 20_000,
        });
        assert_eq!(controller.refresh(&backend).await, FetchOutcome::Failed);
        assert!(controller.visible_items().is_empty());
        assert!(controller.last_error().is_some_and(ControllerError::is_retryable));
        assert_eq!(toast(&controller).0, "Loading courses timed out, please retry");

        assert_eq!(controller.refresh(&backend).await, FetchOutcome::Applied);
        assert!(controller.last_error().is_none());
        assert_eq!(controller.visible_items().len(), 3);
    }

    #[tokio::test]
    async fn detail_refreshes_one_row() {
        let backend = FakeBackend::new(course_rows(2));
        let mut controller = cached(10);
        controller.refresh(&backend).await;
        backend.rows.borrow_mut()[0]["Title"] = json!("Renamed");

        let detail = controller.load_detail(&backend, &EntityId::from("1")).await.unwrap();
        assert_eq!(detail.title, "Renamed");
        assert_eq!(controller.get(&EntityId::from("1")).unwrap().title, "Renamed");

        let missing = controller.load_detail(&backend, &EntityId::from("9")).await;
        assert!(matches!(missing, Err(ControllerError::Fetch { .. })));
    }

    #[test]
    fn debounced_search_only_commits_latest_input() {
        let mut controller = server(10);
        let first = controller.set_search_text("p");
        let second = controller.set_search_text("py");
        assert_eq!(controller.commit_search(first), Reaction::Unchanged);
        assert_eq!(controller.commit_search(second), Reaction::Refetch);
        assert_eq!(controller.current_query().search, "py");
        assert_eq!(controller.search_debounce(), DEFAULT_SEARCH_DEBOUNCE);
    }

    #[test]
    fn strategy_follows_the_resource() {
        use crate::entity::{Nft, Quest, User};

        assert_eq!(ControllerConfig::for_entity::<User>().strategy, FetchStrategy::ServerPaginated);
        assert_eq!(ControllerConfig::for_entity::<Course>().strategy, FetchStrategy::ServerPaginated);
        assert_eq!(ControllerConfig::for_entity::<Nft>().strategy, FetchStrategy::ClientCached);
        assert_eq!(ControllerConfig::for_entity::<Quest>().strategy, FetchStrategy::ClientCached);
        assert_eq!(ControllerConfig::default().with_page_size(0).page_size, 1);
    }

    #[tokio::test]
    async fn detail_before_listing_can_be_toggled() {
        let backend = FakeBackend::new(course_rows(5));
        let mut controller = server(2);
        controller.load_detail(&backend, &EntityId::from("4")).await.unwrap();
        assert!(controller.needs_fetch());

        let toggled = controller.toggle_active(&backend, &EntityId::from("4")).await.unwrap();
        assert!(!toggled.is_active);
        assert_eq!(backend.fetch_count(), 0);
    }
}
