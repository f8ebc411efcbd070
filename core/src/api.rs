//! Resource services: one call per backend endpoint.
//!
//! `Api` pairs a `PortalClient` with a `Transport` and runs
//! build → execute → parse for each service. It owns no state besides the
//! two, so views can share one `Api` freely.

use tracing::{debug, warn};

use crate::cache::{QueryData, QueryKey};
use crate::client::PortalClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{
    GenerateWordsResponse, Group, ImportWordsResponse, LastStudySession, PaginatedResponse,
    QuickStats, StudyActivity, StudyProgress, StudySession, Word,
};

#[derive(Debug, Clone)]
pub struct Api<T> {
    client: PortalClient,
    transport: T,
}

impl<T: Transport> Api<T> {
    pub fn new(client: PortalClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    fn call<R>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&PortalClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let request = request?;
        debug!(method = request.method.as_str(), url = %request.url, "portal request");
        let result = self
            .transport
            .execute(&request)
            .and_then(|response| parse(&self.client, response));
        if let Err(err) = &result {
            warn!(method = request.method.as_str(), url = %request.url, error = %err, "portal request failed");
        }
        result
    }

    // --- dashboard ---

    pub fn last_study_session(&self) -> Result<Option<LastStudySession>, ApiError> {
        self.call(Ok(self.client.build_last_study_session()), PortalClient::parse_last_study_session)
    }

    pub fn quick_stats(&self) -> Result<QuickStats, ApiError> {
        self.call(Ok(self.client.build_quick_stats()), PortalClient::parse_quick_stats)
    }

    pub fn study_progress(&self) -> Result<StudyProgress, ApiError> {
        self.call(Ok(self.client.build_study_progress()), PortalClient::parse_study_progress)
    }

    // --- words & groups ---

    pub fn words(&self, page: u32, search: &str) -> Result<PaginatedResponse<Word>, ApiError> {
        self.call(Ok(self.client.build_list_words(page, search)), PortalClient::parse_list_words)
    }

    pub fn word(&self, id: u64) -> Result<Word, ApiError> {
        self.call(Ok(self.client.build_get_word(id)), PortalClient::parse_get_word)
    }

    pub fn groups(&self, page: u32) -> Result<PaginatedResponse<Group>, ApiError> {
        self.call(Ok(self.client.build_list_groups(page)), PortalClient::parse_list_groups)
    }

    pub fn group(&self, id: u64) -> Result<Group, ApiError> {
        self.call(Ok(self.client.build_get_group(id)), PortalClient::parse_get_group)
    }

    pub fn group_words(&self, id: u64) -> Result<PaginatedResponse<Word>, ApiError> {
        self.call(Ok(self.client.build_group_words(id)), PortalClient::parse_group_words)
    }

    pub fn create_group(&self, name: &str) -> Result<Group, ApiError> {
        self.call(self.client.build_create_group(name), PortalClient::parse_create_group)
    }

    // --- study ---

    pub fn study_sessions(&self, page: u32) -> Result<PaginatedResponse<StudySession>, ApiError> {
        self.call(
            Ok(self.client.build_list_study_sessions(page)),
            PortalClient::parse_list_study_sessions,
        )
    }

    pub fn study_activities(&self) -> Result<Vec<StudyActivity>, ApiError> {
        self.call(
            Ok(self.client.build_list_study_activities()),
            PortalClient::parse_list_study_activities,
        )
    }

    // --- settings ---

    pub fn reset_history(&self) -> Result<(), ApiError> {
        self.call(Ok(self.client.build_reset_history()), PortalClient::parse_action)
    }

    pub fn full_reset(&self) -> Result<(), ApiError> {
        self.call(Ok(self.client.build_full_reset()), PortalClient::parse_action)
    }

    // --- importer ---

    pub fn generate_words(&self, category: &str) -> Result<GenerateWordsResponse, ApiError> {
        self.call(self.client.build_generate_words(category), PortalClient::parse_generate_words)
    }

    pub fn import_words(&self, group_id: u64, words: &[Word]) -> Result<ImportWordsResponse, ApiError> {
        self.call(
            self.client.build_import_words(group_id, words),
            PortalClient::parse_import_words,
        )
    }

    /// Runs the read identified by `key`.
    pub fn fetch(&self, key: &QueryKey) -> Result<QueryData, ApiError> {
        match key {
            QueryKey::Words { page, search } => self.words(*page, search).map(QueryData::Words),
            QueryKey::Word { id } => self.word(*id).map(QueryData::Word),
            QueryKey::Groups { page } => self.groups(*page).map(QueryData::Groups),
            QueryKey::Group { id } => self.group(*id).map(QueryData::Group),
            QueryKey::GroupWords { id } => self.group_words(*id).map(QueryData::GroupWords),
            QueryKey::StudySessions { page } => self.study_sessions(*page).map(QueryData::StudySessions),
            QueryKey::StudyActivities => self.study_activities().map(QueryData::StudyActivities),
            QueryKey::LastStudySession => self.last_study_session().map(QueryData::LastStudySession),
            QueryKey::QuickStats => self.quick_stats().map(QueryData::QuickStats),
            QueryKey::StudyProgress => self.study_progress().map(QueryData::StudyProgress),
        }
    }
}
