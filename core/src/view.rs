//! View models derived from query state.
//!
//! Nothing here fetches; each view is a pure function of a `ListState`,
//! `DetailState` or the dashboard queries in the cache.

use std::time::Instant;

use crate::api::Api;
use crate::cache::{QueryCache, QueryData, QueryKey};
use crate::query::{load, ListState};
use crate::transport::Transport;
use crate::types::{
    Group, LastStudySession, Pagination, QuickStats, StudyActivity, StudyProgress, StudySession,
    Word,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationControl {
    pub current_page: u32,
    pub total_pages: u32,
}

impl PaginationControl {
    /// Falls back to a single page when no metadata has arrived yet.
    pub fn new(requested_page: u32, pagination: Option<&Pagination>) -> Self {
        Self {
            current_page: requested_page,
            total_pages: pagination.map_or(1, |p| p.total_pages.max(1)),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

fn plural(count: u32, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCard {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub word_count_label: String,
}

impl From<&Group> for GroupCard {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            description: group.description.clone(),
            word_count_label: plural(group.word_count, "word"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCard {
    pub id: u64,
    pub italian: String,
    pub english: String,
    pub correct: u32,
    pub wrong: u32,
    pub success_rate: u32,
}

impl From<&Word> for WordCard {
    fn from(word: &Word) -> Self {
        Self {
            id: word.id,
            italian: word.italian.clone(),
            english: word.english.clone(),
            correct: word.correct_count,
            wrong: word.wrong_count,
            success_rate: word.success_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub id: u64,
    pub activity_name: String,
    pub group_name: String,
    pub started: String,
    pub review_items: u32,
    pub score: String,
}

impl From<&StudySession> for SessionRow {
    fn from(session: &StudySession) -> Self {
        Self {
            id: session.id,
            activity_name: session.activity_name.clone(),
            group_name: session.group_name.clone(),
            started: session.start_time.clone(),
            review_items: session.review_items_count,
            score: format!("{} / {}", session.correct_count, session.correct_count + session.wrong_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupsView {
    pub cards: Vec<GroupCard>,
    pub pagination: PaginationControl,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl GroupsView {
    pub fn new(page: u32, state: &ListState<Group>) -> Self {
        Self {
            cards: state.items.iter().map(GroupCard::from).collect(),
            pagination: PaginationControl::new(page, state.pagination.as_ref()),
            is_loading: state.is_loading,
            error: state.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordsView {
    pub cards: Vec<WordCard>,
    pub pagination: PaginationControl,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Set when there is nothing to show.
    pub empty_message: Option<&'static str>,
}

impl WordsView {
    pub fn new(page: u32, search: &str, state: &ListState<Word>) -> Self {
        let empty_message = (state.items.is_empty() && !state.is_loading).then(|| {
            if search.is_empty() {
                "No vocabulary words available"
            } else {
                "No words found matching your search"
            }
        });
        Self {
            cards: state.items.iter().map(WordCard::from).collect(),
            pagination: PaginationControl::new(page, state.pagination.as_ref()),
            is_loading: state.is_loading,
            error: state.error.clone(),
            empty_message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySessionsView {
    pub rows: Vec<SessionRow>,
    pub pagination: PaginationControl,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl StudySessionsView {
    pub fn new(page: u32, state: &ListState<StudySession>) -> Self {
        Self {
            rows: state.items.iter().map(SessionRow::from).collect(),
            pagination: PaginationControl::new(page, state.pagination.as_ref()),
            is_loading: state.is_loading,
            error: state.error.clone(),
        }
    }
}

/// The landing dashboard: three independent reads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    pub last_session: Option<LastStudySession>,
    pub quick_stats: Option<QuickStats>,
    pub progress: Option<StudyProgress>,
    /// First failure among the three reads. The other sections still render.
    pub error: Option<String>,
}

impl DashboardView {
    pub const KEYS: [QueryKey; 3] = [QueryKey::LastStudySession, QueryKey::QuickStats, QueryKey::StudyProgress];

    pub fn refresh<T: Transport>(api: &Api<T>, cache: &mut QueryCache, now: Instant) {
        for key in Self::KEYS {
            load(api, cache, key, now);
        }
    }

    /// Sections whose query has not succeeded are left empty.
    pub fn from_cache(cache: &QueryCache) -> Self {
        let mut view = Self::default();
        for key in &Self::KEYS {
            if view.error.is_none() {
                view.error = cache.get(key).and_then(|e| e.error()).map(str::to_string);
            }
            match cache.data(key) {
                Some(QueryData::LastStudySession(session)) => view.last_session = session.clone(),
                Some(QueryData::QuickStats(stats)) => view.quick_stats = Some(stats.clone()),
                Some(QueryData::StudyProgress(progress)) => view.progress = Some(*progress),
                _ => {}
            }
        }
        view
    }

    pub fn progress_percentage(&self) -> f64 {
        self.progress.map_or(0.0, |p| p.percentage())
    }
}

/// Study activities launcher cards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivitiesView {
    pub activities: Vec<StudyActivity>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl ActivitiesView {
    pub fn refresh<T: Transport>(api: &Api<T>, cache: &mut QueryCache, now: Instant) -> bool {
        load(api, cache, QueryKey::StudyActivities, now)
    }

    pub fn from_cache(cache: &QueryCache) -> Self {
        let Some(entry) = cache.get(&QueryKey::StudyActivities) else {
            return Self::default();
        };
        Self {
            activities: match &entry.data {
                Some(QueryData::StudyActivities(items)) => items.clone(),
                _ => Vec::new(),
            },
            is_loading: entry.is_loading(),
            error: entry.error().map(str::to_string),
        }
    }
}
