use std::{collections::BTreeSet, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const PER_PAGE: u32 = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Word {
    /// Absent on generated and to-be-imported words.
    #[serde(default)]
    pub id: u64,
    pub italian: String,
    pub english: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<serde_json::Value>,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub wrong_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub word_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StudySession {
    pub id: u64,
    pub group_id: u64,
    pub study_activity_id: u64,
    pub activity_name: String,
    pub group_name: String,
    pub review_items_count: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StudyActivity {
    pub id: u64,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u32,
    pub per_page: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LastStudySession {
    pub id: u64,
    pub group_id: u64,
    pub group_name: String,
    pub study_activity_id: u64,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuickStats {
    pub success_rate: f64,
    pub total_study_sessions: u32,
    pub total_active_groups: u32,
    pub study_streak_days: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StudyProgress {
    pub total_words_studied: u32,
    pub total_available_words: u32,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct GenerateWords {
    pub category: String,
}

#[derive(Serialize, Deserialize)]
pub struct GeneratedWords {
    pub words: Vec<Word>,
}

#[derive(Deserialize)]
pub struct ImportWords {
    pub group_id: u64,
    pub words: Vec<Word>,
}

#[derive(Serialize, Deserialize)]
pub struct ImportResult {
    pub imported_count: u32,
}

#[derive(Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

/// In-memory backend state. Group word counts are derived from `members`.
#[derive(Debug, Default)]
pub struct Store {
    pub words: Vec<Word>,
    pub groups: Vec<Group>,
    pub members: Vec<(u64, u64)>,
    pub sessions: Vec<StudySession>,
    pub activities: Vec<StudyActivity>,
    next_id: u64,
}

impl Store {
    /// Only the built-in study activities.
    pub fn new() -> Self {
        let mut store = Self::default();
        store.activities = default_activities();
        store
    }

    /// A small vocabulary with one group and one finished session.
    pub fn seeded() -> Self {
        let mut store = Self::new();
        let food = store.add_group("Food", Some("Things to eat and drink"));
        for (italian, english) in [("pane", "bread"), ("vino", "wine"), ("formaggio", "cheese")] {
            let id = store.add_word(italian, english, serde_json::json!({"type": "noun"}));
            store.members.push((food, id));
        }
        store.add_session(food, 1, 3, 2, 1, "2025-02-01T10:00:00Z");
        store
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_group(&mut self, name: &str, description: Option<&str>) -> u64 {
        let id = self.next_id();
        self.groups.push(Group {
            id,
            name: name.to_string(),
            description: description.map(str::to_string),
            word_count: 0,
        });
        id
    }

    pub fn add_word(&mut self, italian: &str, english: &str, parts: serde_json::Value) -> u64 {
        let id = self.next_id();
        self.words.push(Word {
            id,
            italian: italian.to_string(),
            english: english.to_string(),
            parts: Some(parts),
            correct_count: 0,
            wrong_count: 0,
        });
        id
    }

    pub fn add_session(
        &mut self,
        group_id: u64,
        activity_id: u64,
        reviews: u32,
        correct: u32,
        wrong: u32,
        start_time: &str,
    ) -> u64 {
        let id = self.next_id();
        let group_name = self.group(group_id).map(|g| g.name).unwrap_or_default();
        let activity_name = self
            .activities
            .iter()
            .find(|a| a.id == activity_id)
            .map(|a| a.name.clone())
            .unwrap_or_default();
        self.sessions.push(StudySession {
            id,
            group_id,
            study_activity_id: activity_id,
            activity_name,
            group_name,
            review_items_count: reviews,
            correct_count: correct,
            wrong_count: wrong,
            start_time: start_time.to_string(),
            end_time: None,
        });
        id
    }

    pub fn group(&self, id: u64) -> Option<Group> {
        let group = self.groups.iter().find(|g| g.id == id)?;
        let word_count = self.members.iter().filter(|(g, _)| *g == id).count() as u32;
        Some(Group {
            word_count,
            ..group.clone()
        })
    }

    fn group_words(&self, id: u64) -> Vec<Word> {
        self.members
            .iter()
            .filter(|(g, _)| *g == id)
            .filter_map(|(_, w)| self.words.iter().find(|word| word.id == *w).cloned())
            .collect()
    }
}

fn default_activities() -> Vec<StudyActivity> {
    vec![
        StudyActivity {
            id: 1,
            name: "Flashcards".to_string(),
            description: "Review words with flip cards".to_string(),
            thumbnail_url: Some("/images/flashcards.png".to_string()),
        },
        StudyActivity {
            id: 2,
            name: "Vocabulary Quiz".to_string(),
            description: "Multiple-choice translations".to_string(),
            thumbnail_url: None,
        },
        StudyActivity {
            id: 3,
            name: "Word Matching".to_string(),
            description: "Pair Italian and English words".to_string(),
            thumbnail_url: None,
        },
    ]
}

pub fn paginate<T: Clone>(items: &[T], page: u32) -> Page<T> {
    let page = page.max(1);
    let total_items = items.len() as u32;
    let total_pages = total_items.div_ceil(PER_PAGE);
    let start = (page as usize - 1).saturating_mul(PER_PAGE as usize);
    let slice = items.iter().skip(start).take(PER_PAGE as usize).cloned().collect();
    Page {
        items: slice,
        pagination: Pagination {
            current_page: page,
            total_pages,
            total_items,
            per_page: PER_PAGE,
        },
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::new())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/dashboard/last_study_session", get(last_study_session))
        .route("/api/dashboard/quick-stats", get(quick_stats))
        .route("/api/dashboard/study_progress", get(study_progress))
        .route("/api/words", get(list_words))
        .route("/api/words/{id}", get(get_word))
        .route("/api/words/llm/generate-words", post(generate_words))
        .route("/api/words/import", post(import_words))
        .route("/api/groups", get(list_groups).post(create_group))
        .route("/api/groups/{id}", get(get_group))
        .route("/api/groups/{id}/words", get(list_group_words))
        .route("/api/study_sessions", get(list_study_sessions))
        .route("/api/study-activities", get(list_study_activities))
        .route("/api/reset_history", post(reset_history))
        .route("/api/full_reset", post(full_reset))
        .with_state(db)
}

pub async fn run_with(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store)).await
}

async fn last_study_session(State(db): State<Db>) -> Json<Option<LastStudySession>> {
    let store = db.read().await;
    Json(store.sessions.last().map(|s| LastStudySession {
        id: s.id,
        group_id: s.group_id,
        group_name: s.group_name.clone(),
        study_activity_id: s.study_activity_id,
        created_at: s.start_time.clone(),
    }))
}

async fn quick_stats(State(db): State<Db>) -> Json<QuickStats> {
    let store = db.read().await;
    let correct: u32 = store.sessions.iter().map(|s| s.correct_count).sum();
    let wrong: u32 = store.sessions.iter().map(|s| s.wrong_count).sum();
    let success_rate = if correct + wrong == 0 {
        0.0
    } else {
        f64::from(correct) / f64::from(correct + wrong) * 100.0
    };
    let groups: BTreeSet<u64> = store.sessions.iter().map(|s| s.group_id).collect();
    // Distinct calendar days with at least one session.
    let days: BTreeSet<&str> = store
        .sessions
        .iter()
        .map(|s| s.start_time.get(..10).unwrap_or(s.start_time.as_str()))
        .collect();
    Json(QuickStats {
        success_rate,
        total_study_sessions: store.sessions.len() as u32,
        total_active_groups: groups.len() as u32,
        study_streak_days: days.len() as u32,
    })
}

async fn study_progress(State(db): State<Db>) -> Json<StudyProgress> {
    let store = db.read().await;
    Json(StudyProgress {
        total_words_studied: store
            .words
            .iter()
            .filter(|w| w.correct_count + w.wrong_count > 0)
            .count() as u32,
        total_available_words: store.words.len() as u32,
    })
}

async fn list_words(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Page<Word>> {
    let store = db.read().await;
    let needle = params.search.unwrap_or_default().to_lowercase();
    let matches: Vec<Word> = store
        .words
        .iter()
        .filter(|w| {
            needle.is_empty()
                || w.italian.to_lowercase().contains(&needle)
                || w.english.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    Json(paginate(&matches, params.page.unwrap_or(1)))
}

async fn get_word(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Word>, StatusCode> {
    let store = db.read().await;
    store
        .words
        .iter()
        .find(|w| w.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_groups(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Page<Group>> {
    let store = db.read().await;
    let groups: Vec<Group> = store.groups.iter().filter_map(|g| store.group(g.id)).collect();
    Json(paginate(&groups, params.page.unwrap_or(1)))
}

async fn create_group(
    State(db): State<Db>,
    Json(input): Json<CreateGroup>,
) -> Result<(StatusCode, Json<Group>), StatusCode> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let id = store.add_group(name, input.description.as_deref());
    let group = store.group(id).ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn get_group(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Group>, StatusCode> {
    let store = db.read().await;
    store.group(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn list_group_words(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Word>>, StatusCode> {
    let store = db.read().await;
    if store.group(id).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(paginate(&store.group_words(id), params.page.unwrap_or(1))))
}

async fn list_study_sessions(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Json<Page<StudySession>> {
    let store = db.read().await;
    let newest_first: Vec<StudySession> = store.sessions.iter().rev().cloned().collect();
    Json(paginate(&newest_first, params.page.unwrap_or(1)))
}

async fn list_study_activities(State(db): State<Db>) -> Json<Vec<StudyActivity>> {
    Json(db.read().await.activities.clone())
}

async fn reset_history(State(db): State<Db>) -> Json<ActionResult> {
    let mut store = db.write().await;
    store.sessions.clear();
    for word in &mut store.words {
        word.correct_count = 0;
        word.wrong_count = 0;
    }
    Json(ActionResult {
        success: true,
        message: "Study history has been reset".to_string(),
    })
}

async fn full_reset(State(db): State<Db>) -> Json<ActionResult> {
    let mut store = db.write().await;
    store.words.clear();
    store.groups.clear();
    store.members.clear();
    store.sessions.clear();
    Json(ActionResult {
        success: true,
        message: "System has been fully reset".to_string(),
    })
}

const GENERATED: &[(&str, &str, &str, &str)] = &[
    ("mela", "apple", "noun", "feminine"),
    ("pane", "bread", "noun", "masculine"),
    ("mangiare", "to eat", "verb", ""),
    ("dolce", "sweet", "adjective", ""),
];

async fn generate_words(Json(input): Json<GenerateWords>) -> Result<Json<GeneratedWords>, StatusCode> {
    if input.category.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let words = GENERATED
        .iter()
        .map(|(italian, english, kind, gender)| {
            let mut parts = serde_json::json!({ "type": kind });
            if !gender.is_empty() {
                parts["gender"] = serde_json::json!(gender);
            }
            Word {
                id: 0,
                italian: italian.to_string(),
                english: english.to_string(),
                parts: Some(parts),
                correct_count: 0,
                wrong_count: 0,
            }
        })
        .collect();
    Ok(Json(GeneratedWords { words }))
}

async fn import_words(
    State(db): State<Db>,
    Json(input): Json<ImportWords>,
) -> Result<Json<ImportResult>, StatusCode> {
    let mut store = db.write().await;
    if store.group(input.group_id).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    let well_formed = input
        .words
        .iter()
        .all(|w| !w.italian.is_empty() && !w.english.is_empty() && w.parts.is_some());
    if input.words.is_empty() || !well_formed {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    for word in &input.words {
        let parts = word.parts.clone().unwrap_or_default();
        let id = store.add_word(&word.italian, &word.english, parts);
        store.members.push((input.group_id, id));
    }
    Ok(Json(ImportResult {
        imported_count: input.words.len() as u32,
    }))
}
