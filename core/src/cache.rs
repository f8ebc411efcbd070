//! Keyed query cache with last-request-wins semantics.
//!
//! # Design
//! The cache is an explicit context object: the application root owns one
//! `QueryCache` and hands `&mut` access to whichever view is fetching.
//! Every key carries a generation counter. `begin` bumps it and returns a
//! `Ticket`; `complete` applies a result only when the ticket's generation
//! is still the latest for that key. A superseded network call still runs
//! to completion, its result is simply dropped.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::error::ApiError;
use crate::types::{
    Group, LastStudySession, PaginatedResponse, QuickStats, StudyActivity, StudyProgress,
    StudySession, Word,
};

/// Identifies one cacheable read: endpoint plus its page, search term or id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Words { page: u32, search: String },
    Word { id: u64 },
    Groups { page: u32 },
    Group { id: u64 },
    GroupWords { id: u64 },
    StudySessions { page: u32 },
    StudyActivities,
    LastStudySession,
    QuickStats,
    StudyProgress,
}

/// Parsed payload stored for a key.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Words(PaginatedResponse<Word>),
    Word(Word),
    Groups(PaginatedResponse<Group>),
    Group(Group),
    GroupWords(PaginatedResponse<Word>),
    StudySessions(PaginatedResponse<StudySession>),
    StudyActivities(Vec<StudyActivity>),
    LastStudySession(Option<LastStudySession>),
    QuickStats(QuickStats),
    StudyProgress(StudyProgress),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    /// Flat user-facing message of the last failure.
    Error(String),
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Last successful payload; kept while a newer request is loading.
    pub data: Option<QueryData>,
    pub status: QueryStatus,
    pub generation: u64,
    pub updated_at: Option<Instant>,
}

impl CacheEntry {
    fn new() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            generation: 0,
            updated_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            QueryStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Proof that a request for `key` was issued at `generation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub key: QueryKey,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as loading and returns the ticket its response must present.
    pub fn begin(&mut self, key: QueryKey) -> Ticket {
        let entry = self.entries.entry(key.clone()).or_insert_with(CacheEntry::new);
        entry.generation += 1;
        entry.status = QueryStatus::Loading;
        Ticket {
            key,
            generation: entry.generation,
        }
    }

    /// Applies `result` if `ticket` is still current. Returns whether it was applied.
    pub fn complete(&mut self, ticket: Ticket, result: Result<QueryData, ApiError>, now: Instant) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.key) else {
            debug!(key = ?ticket.key, "dropping response for unknown key");
            return false;
        };
        if entry.generation != ticket.generation {
            debug!(
                key = ?ticket.key,
                stale = ticket.generation,
                latest = entry.generation,
                "dropping superseded response"
            );
            return false;
        }
        match result {
            Ok(data) => {
                entry.data = Some(data);
                entry.status = QueryStatus::Success;
            }
            Err(err) => entry.status = QueryStatus::Error(err.user_message()),
        }
        entry.updated_at = Some(now);
        true
    }

    pub fn get(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn data(&self, key: &QueryKey) -> Option<&QueryData> {
        self.get(key).and_then(|entry| entry.data.as_ref())
    }

    /// Latest generation issued for `key`, 0 if never requested.
    pub fn generation(&self, key: &QueryKey) -> u64 {
        self.get(key).map_or(0, |entry| entry.generation)
    }

    /// Drops the payload of `key`. In-flight responses for it become stale.
    pub fn invalidate(&mut self, key: &QueryKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.generation += 1;
            entry.data = None;
            entry.status = QueryStatus::Idle;
            entry.updated_at = None;
        }
    }

    pub fn invalidate_all(&mut self) {
        let keys: Vec<QueryKey> = self.entries.keys().cloned().collect();
        for key in &keys {
            self.invalidate(key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
