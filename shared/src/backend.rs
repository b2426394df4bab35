//! Remote collection boundary.
//!
//! Platform crates implement [`CollectionBackend`] over their HTTP stack and
//! hand back raw JSON; [`RawSnapshot::adapt`] turns it into canonical
//! entities so nothing downstream deals with wire shapes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    coerce::RawRecord,
    entity::{AdminEntity, EntityId},
    error::ApiError,
    paging::page_count,
};

/// Query for one list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// 0-based page index; `None` asks for the whole collection.
    pub page: Option<usize>,
    /// Rows per page; `None` together with `page` fetches everything.
    pub page_size: Option<usize>,
    /// Committed search text; blank is omitted.
    pub search: String,
    /// Categorical filters by name; empty values are omitted.
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// Query-string pairs in wire form: unset values are omitted and `page`
    /// is 1-based.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), (page + 1).to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("pageSize".to_string(), page_size.to_string()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search".to_string(), search.to_string()));
        }
        for (name, value) in &self.filters {
            let value = value.trim();
            if !value.is_empty() {
                pairs.push((name.clone(), value.to_string()));
            }
        }
        pairs
    }

    /// Encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// List response before adaptation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSnapshot {
    /// Records exactly as the server sent them.
    pub items: Vec<Value>,
    /// Server-reported match count, when present.
    pub total_count: Option<usize>,
    /// Server-reported page count, when present.
    pub total_pages: Option<usize>,
}

impl RawSnapshot {
    /// Decode a list body: either `{ items, totalCount, totalPages }` (keys in
    /// any casing, `data`/`results`/resource-named arrays accepted) or a bare
    /// array.
    pub fn from_body(body: Value, resource: &str) -> Result<Self, ApiError> {
        match body {
            Value::Array(items) => Ok(Self {
                items,
                total_count: None,
                total_pages: None,
            }),
            Value::Object(_) => {
                let record = RawRecord::new(&body).map_err(|err| ApiError::Decode(err.to_string()))?;
                let items = match record.field(&["items", "data", "results", "rows", resource]) {
                    Some(Value::Array(items)) => items.clone(),
                    Some(Value::Object(_)) => {
                        let nested = record
                            .field(&["data"])
                            .cloned()
                            .unwrap_or(Value::Null);
                        return Self::from_body(nested, resource);
                    },
                    _ => {
                        return Err(ApiError::Decode(format!(
                            "list response for `{resource}` has no item array"
                        )))
                    },
                };
                let total_count = optional_count(&record, &["totalCount", "total", "count"]);
                let total_pages = optional_count(&record, &["totalPages", "pages", "pageCount"]);
                Ok(Self {
                    items,
                    total_count,
                    total_pages,
                })
            },
            other => Err(ApiError::Decode(format!("unexpected list response: {other}"))),
        }
    }

    /// Adapt every record, skipping (and logging) the ones that fail.
    pub fn adapt<E: AdminEntity>(self, page_size: usize) -> CollectionSnapshot<E> {
        let raw_len = self.items.len();
        let items: Vec<E> = self
            .items
            .iter()
            .filter_map(|raw| match E::from_raw(raw) {
                Ok(entity) => Some(entity),
                Err(err) => {
                    tracing::warn!(resource = E::RESOURCE, "skipping record: {err}");
                    None
                },
            })
            .collect();
        let skipped = raw_len - items.len();
        let total_count = self
            .total_count
            .map(|total| total.saturating_sub(skipped))
            .unwrap_or(items.len());
        let total_pages = self
            .total_pages
            .unwrap_or_else(|| page_count(total_count, page_size));
        CollectionSnapshot {
            items,
            total_count,
            total_pages,
        }
    }
}

fn optional_count(record: &RawRecord<'_>, aliases: &[&str]) -> Option<usize> {
    record.field(aliases).map(|_| record.count(aliases) as usize)
}

/// Adapted list response.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot<E> {
    /// Adapted records, in server order.
    pub items: Vec<E>,
    /// Rows matching the query across all pages.
    pub total_count: usize,
    /// Pages for `total_count` at the requested size.
    pub total_pages: usize,
}

impl<E> Default for CollectionSnapshot<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
        }
    }
}

/// What the server did with a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteAction {
    /// The row is gone.
    Deleted,
    /// The row had dependents and was soft-deactivated instead.
    Deactivated,
}

impl DeleteAction {
    /// Read `{ "action": ... }` from a delete response. An empty body or an
    /// unknown action counts as a hard delete.
    pub fn from_body(body: &Value) -> Self {
        let action = RawRecord::new(body)
            .ok()
            .and_then(|record| record.text(&["action", "result", "status"]))
            .unwrap_or_default();
        if action.eq_ignore_ascii_case("deactivated") || action.eq_ignore_ascii_case("soft_deleted")
        {
            Self::Deactivated
        } else {
            Self::Deleted
        }
    }

    /// Wire spelling of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::Deactivated => "deactivated",
        }
    }
}

/// Transport for `/api/admin/{resource}` routes.
///
/// Futures are `?Send` so the same trait serves the browser (single
/// threaded, `gloo-net`) and the native client.
#[async_trait(?Send)]
pub trait CollectionBackend {
    /// `GET /{resource}?...`
    async fn fetch_page(&self, resource: &str, query: &ListQuery) -> Result<RawSnapshot, ApiError>;

    /// `GET /{resource}/{id}`
    async fn fetch_entity(&self, resource: &str, id: &EntityId) -> Result<Value, ApiError>;

    /// `POST /{resource}`
    async fn create_entity(&self, resource: &str, payload: &Value) -> Result<Value, ApiError>;

    /// `PUT /{resource}/{id}`
    async fn update_entity(
        &self,
        resource: &str,
        id: &EntityId,
        payload: &Value,
    ) -> Result<Value, ApiError>;

    /// `PATCH /{resource}/{id}`
    async fn patch_entity(
        &self,
        resource: &str,
        id: &EntityId,
        payload: &Value,
    ) -> Result<Value, ApiError>;

    /// `DELETE /{resource}/{id}`
    async fn delete_entity(&self, resource: &str, id: &EntityId) -> Result<DeleteAction, ApiError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::entity::Course;

    #[test]
    fn empty_values_are_left_out_of_the_query() {
        let mut filters = BTreeMap::new();
        filters.insert("category".to_string(), "Web Dev".to_string());
        filters.insert("difficulty".to_string(), String::new());
        filters.insert("status".to_string(), "  ".to_string());
        let query = ListQuery {
            page: Some(0),
            page_size: Some(10),
            search: " c++ ".to_string(),
            filters,
        };
        assert_eq!(query.to_query_string(), "page=1&pageSize=10&search=c%2B%2B&category=Web%20Dev");
        assert_eq!(ListQuery::default().to_query_string(), "");
    }

    #[test]
    fn snapshot_envelopes_in_any_casing() {
        let snapshot = RawSnapshot::from_body(
            json!({ "Items": [{ "id": 1 }], "TotalCount": 31, "TotalPages": 4 }),
            "courses",
        )
        .unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.total_count, Some(31));
        assert_eq!(snapshot.total_pages, Some(4));

        let named = RawSnapshot::from_body(json!({ "courses": [], "total": 0 }), "courses").unwrap();
        assert_eq!(named.total_count, Some(0));

        let nested = RawSnapshot::from_body(
            json!({ "data": { "items": [{ "id": 2 }], "totalCount": 1 } }),
            "courses",
        )
        .unwrap();
        assert_eq!(nested.items.len(), 1);

        let bare = RawSnapshot::from_body(json!([{ "id": 1 }, { "id": 2 }]), "nfts").unwrap();
        assert_eq!(bare.total_count, None);
    }

    #[test]
    fn snapshot_without_items_is_a_decode_error() {
        let err = RawSnapshot::from_body(json!({ "ok": true }), "users").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(RawSnapshot::from_body(json!("nope"), "users").is_err());
    }

    #[test]
    fn adapt_skips_bad_records_and_derives_totals() {
        let raw = RawSnapshot {
            items: vec![json!({ "id": 1 }), json!({ "title": "no id" }), json!({ "id": 3 })],
            total_count: None,
            total_pages: None,
        };
        let snapshot = raw.adapt::<Course>(2);
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.total_count, 2);
        assert_eq!(snapshot.total_pages, 1);
    }

    #[test]
    fn delete_action_parsing() {
        assert_eq!(DeleteAction::from_body(&json!({ "action": "deactivated" })), DeleteAction::Deactivated);
        assert_eq!(DeleteAction::from_body(&json!({ "Action": "Deleted" })), DeleteAction::Deleted);
        assert_eq!(DeleteAction::from_body(&Value::Null), DeleteAction::Deleted);
    }
}
