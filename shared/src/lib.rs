//! Platform-independent core of the education admin console.
//!
//! Everything here compiles for both the browser (`wasm32`) and the native
//! CLI: canonical entities and their adapters, filter/search and pagination
//! state, collection derivations, the toast channel, session resolution and
//! the [`ResourceController`] that ties them to a [`CollectionBackend`].

pub mod backend;
pub mod coerce;
pub mod controller;
pub mod derivation;
pub mod entity;
pub mod error;
pub mod filter;
pub mod notify;
pub mod paging;
pub mod session;

pub use backend::{CollectionBackend, CollectionSnapshot, DeleteAction, ListQuery, RawSnapshot};
pub use controller::{
    CatalogTicket, ControllerConfig, DeleteConfirmation, FetchOutcome, FetchStrategy, FetchTicket, Reaction,
    ResourceController, TogglePlan,
};
pub use derivation::CollectionStats;
pub use entity::{AdminEntity, Course, EntityId, Nft, Quest, User};
pub use error::{AdaptError, ApiError, ControllerError};
pub use filter::{DebounceToken, FilterState};
pub use notify::{HideToken, Notification, NotificationChannel, Severity};
pub use paging::PageWindow;
pub use session::{resolve_session, Session, SessionStore};
