//! Domain DTOs for the lang-portal API.
//!
//! # Design
//! These types mirror the backend's JSON but are defined independently from
//! the mock-server crate; integration tests catch any schema drift between
//! the two. Optional grammatical fields are `Option`s that are skipped when
//! absent so an edited word list serializes back to the same shape.

use serde::{Deserialize, Serialize};

/// Grammatical details attached to a word.
///
/// The backend stores parts as a free-form object. Only `type`, `gender` and
/// `plural` are typed; everything else, including keys this client does not
/// know, is carried through `extra` so an edit or import sends it back as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordParts {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    /// `conjugation`, `irregular`, `usage` and any other key, in whatever
    /// shape the generator produced.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WordParts {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}

/// A vocabulary entry. Words produced by the generator have no id yet, so
/// `id` defaults to 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Word {
    #[serde(default)]
    pub id: u64,
    pub italian: String,
    pub english: String,
    #[serde(default)]
    pub parts: Option<WordParts>,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub wrong_count: u32,
}

impl Word {
    /// Share of correct reviews as a rounded percentage; 0 when never reviewed.
    pub fn success_rate(&self) -> u32 {
        let total = (self.correct_count + self.wrong_count).max(1);
        (f64::from(self.correct_count) / f64::from(total) * 100.0).round() as u32
    }

    /// Import gate: both texts non-empty and a parts object present.
    pub fn is_well_formed(&self) -> bool {
        !self.italian.is_empty() && !self.english.is_empty() && self.parts.is_some()
    }
}

/// A named collection of words.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "words_count")]
    pub word_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Word>>,
}

/// One completed or running study session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudySession {
    pub id: u64,
    pub activity_name: String,
    pub group_name: String,
    #[serde(default)]
    pub review_items_count: u32,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub wrong_count: u32,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
}

/// A launchable study activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudyActivity {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Coarse kind of a study activity, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    Flashcards,
    Quiz,
    Matching,
}

impl StudyActivity {
    pub fn activity_type(&self) -> ActivityType {
        let name = self.name.to_lowercase();
        if name.contains("flash") || name.contains("card") {
            ActivityType::Flashcards
        } else if name.contains("quiz") {
            ActivityType::Quiz
        } else if name.contains("match") {
            ActivityType::Matching
        } else {
            ActivityType::Flashcards
        }
    }
}

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u32,
    #[serde(default, alias = "items_per_page")]
    pub per_page: u32,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// `/study-activities` is served either bare or wrapped in a page envelope
/// depending on the backend generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ActivityList {
    Page(PaginatedResponse<StudyActivity>),
    Bare(Vec<StudyActivity>),
}

impl ActivityList {
    pub(crate) fn into_items(self) -> Vec<StudyActivity> {
        match self {
            ActivityList::Page(page) => page.items,
            ActivityList::Bare(items) => items,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastStudySession {
    pub id: u64,
    #[serde(default)]
    pub group_id: Option<u64>,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub study_activity_id: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuickStats {
    pub success_rate: f64,
    pub total_study_sessions: u32,
    pub total_active_groups: u32,
    pub study_streak_days: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudyProgress {
    pub total_words_studied: u32,
    pub total_available_words: u32,
}

impl StudyProgress {
    pub fn percentage(&self) -> f64 {
        if self.total_available_words == 0 {
            return 0.0;
        }
        f64::from(self.total_words_studied) / f64::from(self.total_available_words) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Request / response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateWordsRequest {
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateWordsResponse {
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportWordsRequest {
    pub group_id: u64,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportWordsResponse {
    pub imported_count: u32,
}
