//! Search and categorical filter state for one page.

use std::collections::BTreeMap;

/// Handle returned by [`FilterState::set_search_text`]; committing a token
/// that is no longer the latest does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceToken(u64);

/// Search text plus categorical filter selections for one resource page.
///
/// The search box writes into a pending slot on every keystroke; the applied
/// search only changes once the debounce delay elapses and the matching token
/// is committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    search_text: String,
    pending_search: Option<String>,
    filters: BTreeMap<String, String>,
    generation: u64,
}

impl FilterState {
    /// Search text currently applied to fetches and derivations.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// What the search box should display: pending input if any.
    pub fn input_text(&self) -> &str {
        self.pending_search.as_deref().unwrap_or(&self.search_text)
    }

    /// Whether a debounced search is waiting to be committed.
    pub fn has_pending_search(&self) -> bool {
        self.pending_search.is_some()
    }

    /// Record raw search input and start a new debounce window.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> DebounceToken {
        self.generation += 1;
        self.pending_search = Some(text.into());
        DebounceToken(self.generation)
    }

    /// Apply the pending search if `token` is still the latest one.
    ///
    /// Returns `true` when the applied search text actually changed.
    pub fn commit_search(&mut self, token: DebounceToken) -> bool {
        if token.0 != self.generation {
            return false;
        }
        let Some(next) = self.pending_search.take() else {
            return false;
        };
        let next = next.trim().to_string();
        if next == self.search_text {
            return false;
        }
        self.search_text = next;
        true
    }

    /// Selected value for one filter, empty when unset.
    pub fn filter(&self, name: &str) -> &str {
        self.filters.get(name).map(String::as_str).unwrap_or_default()
    }

    /// Set or clear (empty value) one categorical filter. Returns `true` when
    /// the selection changed.
    pub fn set_filter(&mut self, name: &str, value: &str) -> bool {
        let value = value.trim();
        let previous = self.filter(name).to_string();
        if previous == value {
            return false;
        }
        if value.is_empty() {
            self.filters.remove(name);
        } else {
            self.filters.insert(name.to_string(), value.to_string());
        }
        true
    }

    /// Filters that are actually set, in name order.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Whether no search and no filter is applied.
    pub fn is_empty(&self) -> bool {
        self.search_text.is_empty() && self.active_filters().next().is_none()
    }

    /// Reset search, pending search and every filter.
    ///
    /// Outstanding debounce tokens are invalidated so a late timer cannot
    /// resurrect the cleared text.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.search_text.clear();
        self.pending_search = None;
        self.filters.clear();
    }
}
