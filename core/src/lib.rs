//! Client core for the lang-portal vocabulary backend.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for every
//! portal endpoint, and layers the front ends' data handling on top: a keyed
//! query cache, paginated list queries with debounced search, detail pages,
//! mutation state, the vocabulary importer, and view models.
//!
//! # Design
//! - `PortalClient` is stateless: `build_*` produces a request, `parse_*`
//!   consumes a response. `Transport` does the one network attempt between.
//! - `QueryCache` is owned by the application root and passed in; each key
//!   has a generation counter so only the latest request's result lands.
//! - Time is an argument (`Instant`), never read internally, so debounce and
//!   cache timestamps are deterministic in tests.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod importer;
pub mod mutation;
pub mod query;
pub mod transport;
pub mod types;
pub mod view;

pub use api::Api;
pub use cache::{QueryCache, QueryData, QueryKey, QueryStatus, Ticket};
pub use client::{PortalClient, DEFAULT_BASE_URL};
pub use config::PortalConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use importer::{is_import_eligible, Importer};
pub use mutation::{Mutation, MutationState, SettingsActions};
pub use query::{
    Debouncer, GroupDetailQuery, GroupsQuery, ListQuery, ListState, StudySessionsQuery,
    WordDetailQuery, WordsQuery,
};
pub use transport::{Transport, UreqTransport};
pub use types::{
    ActivityType, GenerateWordsResponse, Group, ImportWordsResponse, LastStudySession,
    PaginatedResponse, Pagination, QuickStats, StudyActivity, StudyProgress, StudySession, Word,
    WordParts,
};
