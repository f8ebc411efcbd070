//! Per-view query state: paginated lists, debounced search, detail pages.
//!
//! # Design
//! Views do not fetch directly. A query object knows which `QueryKey` its
//! current state maps to; `refresh` issues one fetch for that key through
//! the shared `QueryCache`, and `state` reads the cached outcome back.
//! Time is passed in explicitly (`now: Instant`) so the debounce logic is
//! deterministic under test.

use std::marker::PhantomData;
use std::time::{Duration, Instant};

use crate::api::Api;
use crate::cache::{QueryCache, QueryData, QueryKey, QueryStatus};
use crate::config::QueryConfig;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{Group, PaginatedResponse, Pagination, StudySession, Word};

/// Issues one fetch for `key` and stores the outcome. Returns whether the
/// result was applied (it always is when nothing else touched the key).
pub fn load<T: Transport>(api: &Api<T>, cache: &mut QueryCache, key: QueryKey, now: Instant) -> bool {
    let ticket = cache.begin(key);
    let result = api.fetch(&ticket.key);
    cache.complete(ticket, result, now)
}

/// Parses a route segment such as `"42"` into an entity id.
pub fn parse_route_id(raw: &str) -> Result<u64, ApiError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::Validation(format!("invalid id in route: {raw:?}"))),
    }
}

// ---------------------------------------------------------------------------
// Debounce
// ---------------------------------------------------------------------------

/// Holds a typed search value until the input has been quiet long enough.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    min_chars: usize,
    pending: Option<(String, Instant)>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::from_config(&QueryConfig::default())
    }
}

impl Debouncer {
    pub fn new(quiet: Duration, min_chars: usize) -> Self {
        Self {
            quiet,
            min_chars,
            pending: None,
        }
    }

    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(config.debounce(), config.min_search_chars)
    }

    /// Records an edit; the quiet period restarts.
    pub fn edit(&mut self, value: &str, now: Instant) {
        self.pending = Some((value.to_string(), now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Once the quiet period has elapsed, consumes the pending value and
    /// yields it if it is committable: empty, or at least `min_chars` long.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let (_, edited_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*edited_at) < self.quiet {
            return None;
        }
        let (value, _) = self.pending.take()?;
        let chars = value.chars().count();
        (chars == 0 || chars >= self.min_chars).then_some(value)
    }
}

// ---------------------------------------------------------------------------
// Paginated lists
// ---------------------------------------------------------------------------

/// A paginated endpoint the list query can drive.
pub trait ListResource {
    type Item: Clone;

    fn key(page: u32, search: &str) -> QueryKey;

    fn page(data: &QueryData) -> Option<&PaginatedResponse<Self::Item>>;
}

#[derive(Debug, Clone, Copy)]
pub struct WordList;

#[derive(Debug, Clone, Copy)]
pub struct GroupList;

#[derive(Debug, Clone, Copy)]
pub struct StudySessionList;

impl ListResource for WordList {
    type Item = Word;

    fn key(page: u32, search: &str) -> QueryKey {
        QueryKey::Words {
            page,
            search: search.to_string(),
        }
    }

    fn page(data: &QueryData) -> Option<&PaginatedResponse<Word>> {
        match data {
            QueryData::Words(page) => Some(page),
            _ => None,
        }
    }
}

impl ListResource for GroupList {
    type Item = Group;

    fn key(page: u32, _search: &str) -> QueryKey {
        QueryKey::Groups { page }
    }

    fn page(data: &QueryData) -> Option<&PaginatedResponse<Group>> {
        match data {
            QueryData::Groups(page) => Some(page),
            _ => None,
        }
    }
}

impl ListResource for StudySessionList {
    type Item = StudySession;

    fn key(page: u32, _search: &str) -> QueryKey {
        QueryKey::StudySessions { page }
    }

    fn page(data: &QueryData) -> Option<&PaginatedResponse<StudySession>> {
        match data {
            QueryData::StudySessions(page) => Some(page),
            _ => None,
        }
    }
}

/// What a list view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListQuery<R> {
    page: u32,
    search: String,
    debouncer: Debouncer,
    resource: PhantomData<R>,
}

pub type WordsQuery = ListQuery<WordList>;
pub type GroupsQuery = ListQuery<GroupList>;
pub type StudySessionsQuery = ListQuery<StudySessionList>;

impl<R: ListResource> Default for ListQuery<R> {
    fn default() -> Self {
        Self::new(Debouncer::default())
    }
}

impl<R: ListResource> ListQuery<R> {
    pub fn new(debouncer: Debouncer) -> Self {
        Self {
            page: 1,
            search: String::new(),
            debouncer,
            resource: PhantomData,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn key(&self) -> QueryKey {
        R::key(self.page, &self.search)
    }

    /// Pages beyond `total_pages` go to the backend unchanged; only 0 is lifted to 1.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn refresh<T: Transport>(&self, api: &Api<T>, cache: &mut QueryCache, now: Instant) -> bool {
        load(api, cache, self.key(), now)
    }

    pub fn state(&self, cache: &QueryCache) -> ListState<R::Item> {
        let key = self.key();
        let Some(entry) = cache.get(&key) else {
            return ListState {
                items: Vec::new(),
                pagination: None,
                is_loading: false,
                error: None,
            };
        };
        let page = entry.data.as_ref().and_then(R::page);
        ListState {
            items: page.map(|p| p.items.clone()).unwrap_or_default(),
            pagination: page.map(|p| p.pagination),
            is_loading: entry.status == QueryStatus::Loading,
            error: entry.error().map(str::to_string),
        }
    }
}

impl ListQuery<WordList> {
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Records a keystroke in the search box. Nothing is fetched yet.
    pub fn input_search(&mut self, text: &str, now: Instant) {
        self.debouncer.edit(text, now);
    }

    /// Commits a settled search. Returns `true` when the active key changed
    /// and the caller should refresh.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(committed) = self.debouncer.poll(now) else {
            return false;
        };
        let before = self.key();
        self.search = committed;
        self.page = 1;
        self.key() != before
    }
}

// ---------------------------------------------------------------------------
// Detail pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DetailState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordDetailQuery {
    pub id: u64,
}

impl WordDetailQuery {
    pub fn from_route(raw: &str) -> Result<Self, ApiError> {
        parse_route_id(raw).map(|id| Self { id })
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::Word { id: self.id }
    }

    pub fn refresh<T: Transport>(&self, api: &Api<T>, cache: &mut QueryCache, now: Instant) -> bool {
        load(api, cache, self.key(), now)
    }

    pub fn state(&self, cache: &QueryCache) -> DetailState<Word> {
        let entry = cache.get(&self.key());
        DetailState {
            data: entry.and_then(|e| match &e.data {
                Some(QueryData::Word(word)) => Some(word.clone()),
                _ => None,
            }),
            is_loading: entry.is_some_and(|e| e.is_loading()),
            error: entry.and_then(|e| e.error()).map(str::to_string),
        }
    }
}

/// Group record merged with its word list.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDetail {
    pub group: Group,
    pub words: Vec<Word>,
}

impl GroupDetail {
    pub fn has_words(&self) -> bool {
        !self.words.is_empty()
    }
}

/// The group page: the group record first, then its words once the record resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDetailQuery {
    pub id: u64,
}

impl GroupDetailQuery {
    pub fn from_route(raw: &str) -> Result<Self, ApiError> {
        parse_route_id(raw).map(|id| Self { id })
    }

    pub fn group_key(&self) -> QueryKey {
        QueryKey::Group { id: self.id }
    }

    pub fn words_key(&self) -> QueryKey {
        QueryKey::GroupWords { id: self.id }
    }

    /// The fetch the page still needs, if any. The words request is only
    /// due once the group record loaded successfully.
    pub fn next_key(&self, cache: &QueryCache) -> Option<QueryKey> {
        let group_loaded = matches!(cache.data(&self.group_key()), Some(QueryData::Group(_)));
        let group_status = cache.get(&self.group_key()).map(|e| &e.status);
        match group_status {
            None | Some(QueryStatus::Idle) => return Some(self.group_key()),
            Some(QueryStatus::Success) if group_loaded => {}
            _ => return None,
        }
        match cache.get(&self.words_key()).map(|e| &e.status) {
            None | Some(QueryStatus::Idle) => Some(self.words_key()),
            _ => None,
        }
    }

    /// Fetches the group, then (on success) its words.
    pub fn refresh<T: Transport>(&self, api: &Api<T>, cache: &mut QueryCache, now: Instant) {
        cache.invalidate(&self.group_key());
        cache.invalidate(&self.words_key());
        while let Some(key) = self.next_key(cache) {
            load(api, cache, key, now);
        }
    }

    pub fn state(&self, cache: &QueryCache) -> DetailState<GroupDetail> {
        let group_entry = cache.get(&self.group_key());
        let words_entry = cache.get(&self.words_key());
        let group = match group_entry.and_then(|e| e.data.as_ref()) {
            Some(QueryData::Group(group)) => Some(group.clone()),
            _ => None,
        };
        let words = match words_entry.and_then(|e| e.data.as_ref()) {
            Some(QueryData::GroupWords(page)) => Some(page.items.clone()),
            _ => None,
        };
        let error = group_entry
            .and_then(|e| e.error())
            .or_else(|| words_entry.and_then(|e| e.error()))
            .map(str::to_string);
        let is_loading = group_entry.is_some_and(|e| e.is_loading())
            || words_entry.is_some_and(|e| e.is_loading());
        let data = match (group, words) {
            (Some(group), Some(words)) => Some(GroupDetail { group, words }),
            _ => None,
        };
        DetailState {
            data,
            is_loading,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::client::PortalClient;
    use crate::http::{HttpRequest, HttpResponse};

    const GROUPS_BODY: &str = r#"{"items":[{"id":1,"name":"Food","word_count":3}],
        "pagination":{"current_page":1,"total_pages":2,"total_items":11,"per_page":10}}"#;

    const WORDS_BODY: &str = r#"{"items":[{"id":1,"italian":"pane","english":"bread","parts":{"type":"noun"}}],
        "pagination":{"current_page":1,"total_pages":1,"total_items":1,"per_page":10}}"#;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn route_ids() {
        assert_eq!(parse_route_id("42").unwrap(), 42);
        assert_eq!(parse_route_id(" 7 ").unwrap(), 7);
        assert!(matches!(parse_route_id("abc"), Err(ApiError::Validation(_))));
        assert!(parse_route_id("0").is_err());
        assert!(parse_route_id("-3").is_err());
    }

    #[test]
    fn single_character_search_is_never_committed() {
        let t0 = Instant::now();
        let mut q = WordsQuery::default();
        q.input_search("c", t0);
        assert!(!q.tick(t0 + ms(299)));
        assert!(!q.tick(t0 + ms(300)));
        assert!(!q.tick(t0 + ms(5000)));
        assert_eq!(q.search(), "");
    }

    #[test]
    fn settled_search_commits_and_resets_page() {
        let t0 = Instant::now();
        let mut q = WordsQuery::default();
        q.set_page(4);
        q.input_search("ca", t0);
        q.input_search("cas", t0 + ms(100));
        assert!(!q.tick(t0 + ms(350)), "quiet period restarts on each edit");
        assert!(q.tick(t0 + ms(400)));
        assert_eq!(q.search(), "cas");
        assert_eq!(q.page(), 1);
        assert_eq!(
            q.key(),
            QueryKey::Words {
                page: 1,
                search: "cas".to_string()
            }
        );
    }

    #[test]
    fn clearing_search_commits_empty_value() {
        let t0 = Instant::now();
        let mut q = WordsQuery::default();
        q.input_search("pane", t0);
        assert!(q.tick(t0 + ms(300)));
        q.set_page(2);
        q.input_search("", t0 + ms(1000));
        assert!(q.tick(t0 + ms(1300)));
        assert_eq!(q.search(), "");
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn search_length_counts_characters_not_bytes() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        d.edit("è", t0);
        assert_eq!(d.poll(t0 + ms(300)), None);
        d.edit("è!", t0);
        assert_eq!(d.poll(t0 + ms(300)).as_deref(), Some("è!"));
        assert!(!d.is_pending());
    }

    #[test]
    fn page_zero_is_lifted_and_large_pages_pass_through() {
        let mut q = GroupsQuery::default();
        q.set_page(0);
        assert_eq!(q.page(), 1);
        q.set_page(500);
        assert_eq!(q.key(), QueryKey::Groups { page: 500 });
    }

    #[test]
    fn each_page_request_issues_exactly_one_fetch() {
        let urls = RefCell::new(Vec::new());
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            urls.borrow_mut().push(req.url.clone());
            Ok(HttpResponse::new(200, GROUPS_BODY))
        };
        let api = Api::new(PortalClient::new("http://h/api"), &transport);
        let mut cache = QueryCache::new();
        let mut q = GroupsQuery::default();
        for p in 1..=3 {
            q.set_page(p);
            assert!(q.refresh(&api, &mut cache, Instant::now()));
        }
        assert_eq!(
            urls.borrow().as_slice(),
            &[
                "http://h/api/groups?page=1".to_string(),
                "http://h/api/groups?page=2".to_string(),
                "http://h/api/groups?page=3".to_string(),
            ]
        );
        assert_eq!(cache.generation(&QueryKey::Groups { page: 2 }), 1);
    }

    #[test]
    fn list_state_reflects_cache() {
        let transport =
            |_: &HttpRequest| -> Result<HttpResponse, ApiError> { Ok(HttpResponse::new(200, GROUPS_BODY)) };
        let api = Api::new(PortalClient::default(), transport);
        let mut cache = QueryCache::new();
        let q = GroupsQuery::default();

        let before = q.state(&cache);
        assert!(before.items.is_empty() && !before.is_loading && before.error.is_none());

        q.refresh(&api, &mut cache, Instant::now());
        let state = q.state(&cache);
        assert_eq!(state.items[0].name, "Food");
        assert_eq!(state.pagination.unwrap().total_pages, 2);
        assert!(!state.is_loading);
    }

    #[test]
    fn list_state_surfaces_flat_error() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("refused".to_string()))
        };
        let api = Api::new(PortalClient::default(), transport);
        let mut cache = QueryCache::new();
        let q = StudySessionsQuery::default();
        assert!(q.refresh(&api, &mut cache, Instant::now()));
        let state = q.state(&cache);
        assert_eq!(state.error.as_deref(), Some("request failed"));
        assert!(state.items.is_empty());
    }

    #[test]
    fn search_goes_into_the_request() {
        let urls = RefCell::new(Vec::new());
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            urls.borrow_mut().push(req.url.clone());
            Ok(HttpResponse::new(200, WORDS_BODY))
        };
        let api = Api::new(PortalClient::new("http://h/api"), &transport);
        let mut cache = QueryCache::new();
        let t0 = Instant::now();
        let mut q = WordsQuery::default();
        q.input_search("pa", t0);
        if q.tick(t0 + ms(300)) {
            q.refresh(&api, &mut cache, t0 + ms(300));
        }
        assert_eq!(urls.borrow().as_slice(), &["http://h/api/words?page=1&search=pa".to_string()]);
        assert_eq!(q.state(&cache).items[0].english, "bread");
    }

    #[test]
    fn group_detail_fetches_words_after_group() {
        let urls = RefCell::new(Vec::new());
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            urls.borrow_mut().push(req.url.clone());
            let body = if req.url.ends_with("/words") {
                WORDS_BODY
            } else {
                r#"{"id":5,"name":"Food","word_count":1}"#
            };
            Ok(HttpResponse::new(200, body))
        };
        let api = Api::new(PortalClient::new("http://h/api"), &transport);
        let mut cache = QueryCache::new();
        let q = GroupDetailQuery::from_route("5").unwrap();
        q.refresh(&api, &mut cache, Instant::now());

        assert_eq!(
            urls.borrow().as_slice(),
            &["http://h/api/groups/5".to_string(), "http://h/api/groups/5/words".to_string()]
        );
        let state = q.state(&cache);
        let detail = state.data.unwrap();
        assert_eq!(detail.group.name, "Food");
        assert!(detail.has_words());
        assert!(q.next_key(&cache).is_none());
    }

    #[test]
    fn group_detail_skips_words_when_group_fails() {
        let urls = RefCell::new(Vec::new());
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            urls.borrow_mut().push(req.url.clone());
            Ok(HttpResponse::new(404, "not found"))
        };
        let api = Api::new(PortalClient::new("http://h/api"), &transport);
        let mut cache = QueryCache::new();
        let q = GroupDetailQuery { id: 9 };
        q.refresh(&api, &mut cache, Instant::now());

        assert_eq!(urls.borrow().len(), 1);
        let state = q.state(&cache);
        assert!(state.data.is_none());
        assert_eq!(state.error.as_deref(), Some("request failed"));
    }

    #[test]
    fn empty_group_has_no_words() {
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            let body = if req.url.ends_with("/words") {
                r#"{"items":[],"pagination":{"current_page":1,"total_pages":0,"total_items":0,"per_page":10}}"#
            } else {
                r#"{"id":2,"name":"Empty","word_count":0}"#
            };
            Ok(HttpResponse::new(200, body))
        };
        let api = Api::new(PortalClient::default(), transport);
        let mut cache = QueryCache::new();
        let q = GroupDetailQuery { id: 2 };
        q.refresh(&api, &mut cache, Instant::now());
        assert!(!q.state(&cache).data.unwrap().has_words());
    }

    #[test]
    fn word_detail_from_route() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            Ok(HttpResponse::new(
                200,
                r#"{"id":3,"italian":"casa","english":"house","parts":{"type":"noun","gender":"feminine"},"correct_count":4,"wrong_count":1}"#,
            ))
        };
        let api = Api::new(PortalClient::default(), transport);
        let mut cache = QueryCache::new();
        let q = WordDetailQuery::from_route("3").unwrap();
        q.refresh(&api, &mut cache, Instant::now());
        let word = q.state(&cache).data.unwrap();
        assert_eq!(word.parts.unwrap().gender.as_deref(), Some("feminine"));
        assert_eq!(word.correct_count, 4);
    }
}
