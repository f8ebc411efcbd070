//! Stateless request builder and response parser for the lang-portal API.
//!
//! # Design
//! `PortalClient` holds only a `base_url`. Every resource service is split
//! into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`. The round-trip in between is the
//! caller's job (usually `Api` with a `Transport`), so this module is
//! deterministic and testable against canned bodies.
//!
//! Parsing is per entity: a 2xx body that does not decode into the expected
//! type fails with `ApiError::MalformedResponse` naming that entity.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    ActivityList, CreateGroupRequest, GenerateWordsRequest, GenerateWordsResponse, Group,
    ImportWordsRequest, ImportWordsResponse, LastStudySession, PaginatedResponse, QuickStats,
    StudyActivity, StudyProgress, StudySession, Word,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone)]
pub struct PortalClient {
    base_url: String,
}

impl Default for PortalClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl PortalClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base_url}{path}`. `path` starts with `/` and may carry a query string.
    pub fn get(&self, path: &str) -> HttpRequest {
        HttpRequest::get(format!("{}{path}", self.base_url))
    }

    /// `POST {base_url}{path}` with `body` encoded as JSON.
    pub fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::post_json(format!("{}{path}", self.base_url), body))
    }

    /// `POST {base_url}{path}` with no body, for the reset actions.
    pub fn post_empty(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    // --- dashboard ---

    pub fn build_last_study_session(&self) -> HttpRequest {
        self.get("/dashboard/last_study_session")
    }

    /// `None` when the backend has no session yet and answers `null`.
    pub fn parse_last_study_session(
        &self,
        response: HttpResponse,
    ) -> Result<Option<LastStudySession>, ApiError> {
        parse_json("last study session", response)
    }

    pub fn build_quick_stats(&self) -> HttpRequest {
        self.get("/dashboard/quick-stats")
    }

    pub fn parse_quick_stats(&self, response: HttpResponse) -> Result<QuickStats, ApiError> {
        parse_json("quick stats", response)
    }

    pub fn build_study_progress(&self) -> HttpRequest {
        self.get("/dashboard/study_progress")
    }

    pub fn parse_study_progress(&self, response: HttpResponse) -> Result<StudyProgress, ApiError> {
        parse_json("study progress", response)
    }

    // --- words ---

    /// An empty `search` is omitted from the query string.
    pub fn build_list_words(&self, page: u32, search: &str) -> HttpRequest {
        if search.is_empty() {
            self.get(&format!("/words?page={page}"))
        } else {
            let search = urlencoding::encode(search);
            self.get(&format!("/words?page={page}&search={search}"))
        }
    }

    pub fn parse_list_words(&self, response: HttpResponse) -> Result<PaginatedResponse<Word>, ApiError> {
        parse_json("word page", response)
    }

    pub fn build_get_word(&self, id: u64) -> HttpRequest {
        self.get(&format!("/words/{id}"))
    }

    pub fn parse_get_word(&self, response: HttpResponse) -> Result<Word, ApiError> {
        parse_json("word", response)
    }

    // --- groups ---

    pub fn build_list_groups(&self, page: u32) -> HttpRequest {
        self.get(&format!("/groups?page={page}"))
    }

    pub fn parse_list_groups(&self, response: HttpResponse) -> Result<PaginatedResponse<Group>, ApiError> {
        parse_json("group page", response)
    }

    pub fn build_get_group(&self, id: u64) -> HttpRequest {
        self.get(&format!("/groups/{id}"))
    }

    pub fn parse_get_group(&self, response: HttpResponse) -> Result<Group, ApiError> {
        parse_json("group", response)
    }

    pub fn build_group_words(&self, id: u64) -> HttpRequest {
        self.get(&format!("/groups/{id}/words"))
    }

    pub fn parse_group_words(&self, response: HttpResponse) -> Result<PaginatedResponse<Word>, ApiError> {
        parse_json("group words page", response)
    }

    pub fn build_create_group(&self, name: &str) -> Result<HttpRequest, ApiError> {
        self.post(
            "/groups",
            &CreateGroupRequest {
                name: name.to_string(),
            },
        )
    }

    pub fn parse_create_group(&self, response: HttpResponse) -> Result<Group, ApiError> {
        parse_json("group", response)
    }

    // --- study sessions & activities ---

    pub fn build_list_study_sessions(&self, page: u32) -> HttpRequest {
        self.get(&format!("/study_sessions?page={page}"))
    }

    pub fn parse_list_study_sessions(
        &self,
        response: HttpResponse,
    ) -> Result<PaginatedResponse<StudySession>, ApiError> {
        parse_json("study session page", response)
    }

    pub fn build_list_study_activities(&self) -> HttpRequest {
        self.get("/study-activities")
    }

    pub fn parse_list_study_activities(&self, response: HttpResponse) -> Result<Vec<StudyActivity>, ApiError> {
        parse_json::<ActivityList>("study activity list", response).map(ActivityList::into_items)
    }

    // --- settings ---

    pub fn build_reset_history(&self) -> HttpRequest {
        self.post_empty("/reset_history")
    }

    pub fn build_full_reset(&self) -> HttpRequest {
        self.post_empty("/full_reset")
    }

    /// Reset actions only care about the status; the body is ignored.
    pub fn parse_action(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // --- importer ---

    pub fn build_generate_words(&self, category: &str) -> Result<HttpRequest, ApiError> {
        self.post(
            "/words/llm/generate-words",
            &GenerateWordsRequest {
                category: category.to_string(),
            },
        )
    }

    pub fn parse_generate_words(&self, response: HttpResponse) -> Result<GenerateWordsResponse, ApiError> {
        parse_json("generated words", response)
    }

    pub fn build_import_words(&self, group_id: u64, words: &[Word]) -> Result<HttpRequest, ApiError> {
        self.post(
            "/words/import",
            &ImportWordsRequest {
                group_id,
                words: words.to_vec(),
            },
        )
    }

    pub fn parse_import_words(&self, response: HttpResponse) -> Result<ImportWordsResponse, ApiError> {
        parse_json("import result", response)
    }
}

/// Any status outside 2xx is a failed request.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::RequestFailed {
        status: response.status,
        body: response.body.clone(),
    })
}

fn parse_json<T: DeserializeOwned>(entity: &'static str, response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::malformed(entity, e))
}
