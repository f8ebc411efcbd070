//! Vocabulary importer: pick a category, generate words, review, import.
//!
//! The reviewer edits the candidate list as JSON text. A parse failure
//! keeps the previous list and blocks import until the text parses again.
//! Eligibility is a client-side gate only; the backend does its own checks.

use serde_json::error::Category;
use tracing::{info, warn};

use crate::api::Api;
use crate::error::ApiError;
use crate::mutation::Mutation;
use crate::transport::Transport;
use crate::types::{GenerateWordsResponse, Group, ImportWordsResponse, Word};

/// A batch is importable iff it is non-empty and every word is well formed.
pub fn is_import_eligible(words: &[Word]) -> bool {
    !words.is_empty() && words.iter().all(Word::is_well_formed)
}

/// Parses reviewer-edited JSON text into a word list.
///
/// Broken JSON and well-formed JSON of the wrong shape (a missing `italian`,
/// a number where text belongs) are reported with different messages.
pub fn parse_word_list(text: &str) -> Result<Vec<Word>, ApiError> {
    serde_json::from_str(text).map_err(|e| match e.classify() {
        Category::Data => ApiError::Validation(format!("word is missing required fields: {e}")),
        Category::Syntax | Category::Eof | Category::Io => {
            ApiError::Validation(format!("word list is not valid JSON: {e}"))
        }
    })
}

#[derive(Debug)]
pub struct Importer {
    groups: Vec<Group>,
    groups_loading: bool,
    selected: Option<Group>,
    words: Vec<Word>,
    json_valid: bool,
    generation: Mutation<GenerateWordsResponse>,
    import: Mutation<ImportWordsResponse>,
    error: Option<String>,
    success: Option<String>,
}

impl Default for Importer {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            groups_loading: true,
            selected: None,
            words: Vec::new(),
            json_valid: true,
            generation: Mutation::default(),
            import: Mutation::default(),
            error: None,
            success: None,
        }
    }
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn is_loading_groups(&self) -> bool {
        self.groups_loading
    }

    pub fn selected(&self) -> Option<&Group> {
        self.selected.as_ref()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.generation.is_pending()
    }

    pub fn can_generate(&self) -> bool {
        self.selected.is_some() && !self.is_generating()
    }

    /// Import is enabled only for a valid JSON edit of a well-formed batch.
    pub fn can_import(&self) -> bool {
        self.json_valid && is_import_eligible(&self.words)
    }

    pub fn select(&mut self, group: Option<Group>) {
        self.selected = group;
    }

    /// Selects a loaded group by id; returns whether it was found.
    pub fn select_id(&mut self, id: u64) -> bool {
        self.selected = self.groups.iter().find(|g| g.id == id).cloned();
        self.selected.is_some()
    }

    /// Selects group `id`, fetching it when it is not on the loaded page.
    pub fn select_group<T: Transport>(&mut self, api: &Api<T>, id: u64) -> Result<(), ApiError> {
        if self.select_id(id) {
            return Ok(());
        }
        self.selected = Some(api.group(id)?);
        Ok(())
    }

    pub fn load_groups<T: Transport>(&mut self, api: &Api<T>) {
        self.groups_loading = true;
        match api.groups(1) {
            Ok(page) => self.groups = page.items,
            Err(_) => self.error = Some("Failed to load categories".to_string()),
        }
        self.groups_loading = false;
    }

    pub fn create_group<T: Transport>(&mut self, api: &Api<T>, name: &str) {
        match api.create_group(name) {
            Ok(group) => {
                self.groups.push(group.clone());
                self.selected = Some(group);
            }
            Err(_) => self.error = Some("Failed to create category".to_string()),
        }
    }

    /// Asks the backend to generate words for the selected group's name.
    pub fn generate<T: Transport>(&mut self, api: &Api<T>) {
        let Some(category) = self.selected.as_ref().map(|g| g.name.clone()) else {
            return;
        };
        self.error = None;
        self.generation.run(|| api.generate_words(&category));
        match self.generation.data() {
            Some(response) => {
                self.words = response.words.clone();
                self.json_valid = true;
            }
            None => self.error = Some("Failed to generate words".to_string()),
        }
    }

    /// Pretty-printed JSON the reviewer edits.
    pub fn words_json(&self) -> Result<String, ApiError> {
        serde_json::to_string_pretty(&self.words).map_err(|e| {
            warn!(error = %e, words = self.words.len(), "word list could not be encoded");
            ApiError::Serialization(e.to_string())
        })
    }

    /// Applies an edit of the JSON text. Invalid JSON leaves the list as it
    /// was and disables import.
    pub fn edit_json(&mut self, text: &str) -> Result<(), ApiError> {
        match parse_word_list(text) {
            Ok(words) => {
                self.words = words;
                self.json_valid = true;
                Ok(())
            }
            Err(err) => {
                self.json_valid = false;
                Err(err)
            }
        }
    }

    pub fn set_words(&mut self, words: Vec<Word>) {
        self.words = words;
        self.json_valid = true;
    }

    /// Imports the reviewed words into the selected group.
    pub fn import<T: Transport>(&mut self, api: &Api<T>) {
        let Some(group) = self.selected.clone() else {
            self.error = Some("Please select a category first".to_string());
            return;
        };
        if !self.can_import() {
            self.error = Some("Every word needs italian, english and parts before import".to_string());
            return;
        }
        self.error = None;
        self.success = None;
        let words = &self.words;
        self.import.run(|| api.import_words(group.id, words));
        match self.import.data().copied() {
            Some(response) => {
                info!(group_id = group.id, imported = response.imported_count, "words imported");
                self.success = Some(format!(
                    "Successfully imported {} words into category \"{}\"",
                    response.imported_count, group.name
                ));
                self.words.clear();
                self.selected = None;
                self.load_groups(api);
            }
            None => self.error = Some("Failed to import words".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::client::PortalClient;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::types::WordParts;

    fn word(italian: &str, english: &str) -> Word {
        Word {
            id: 0,
            italian: italian.to_string(),
            english: english.to_string(),
            parts: Some(WordParts {
                kind: Some("noun".to_string()),
                ..Default::default()
            }),
            correct_count: 0,
            wrong_count: 0,
        }
    }

    fn group(id: u64, name: &str) -> Group {
        Group {
            id,
            name: name.to_string(),
            description: None,
            word_count: 0,
            words: None,
        }
    }

    #[test]
    fn eligibility_requires_every_word_well_formed() {
        assert!(!is_import_eligible(&[]));
        assert!(is_import_eligible(&[word("pane", "bread"), word("vino", "wine")]));
        let mut bad = word("acqua", "water");
        bad.parts = None;
        assert!(!is_import_eligible(&[word("pane", "bread"), bad]));
        assert!(!is_import_eligible(&[word("pane", "")]));
    }

    #[test]
    fn json_edit_round_trips() {
        let mut importer = Importer::new();
        importer.set_words(vec![word("pane", "bread")]);
        let text = importer.words_json().unwrap();
        let edited = text.replace("bread", "loaf");
        importer.edit_json(&edited).unwrap();
        assert_eq!(importer.words()[0].english, "loaf");
        assert_eq!(parse_word_list(&importer.words_json().unwrap()).unwrap(), importer.words());
        assert!(importer.can_import());
    }

    #[test]
    fn invalid_json_keeps_words_and_blocks_import() {
        let mut importer = Importer::new();
        importer.set_words(vec![word("pane", "bread")]);
        let err = importer.edit_json("[{\"italian\": ").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(importer.words(), &[word("pane", "bread")]);
        assert!(!importer.can_import());

        let text = importer.words_json().unwrap();
        importer.edit_json(&text).unwrap();
        assert!(importer.can_import());
    }

    #[test]
    fn edit_dropping_parts_disables_import() {
        let mut importer = Importer::new();
        importer
            .edit_json(r#"[{"italian":"pane","english":"bread"}]"#)
            .unwrap();
        assert!(!importer.can_import());
    }

    #[test]
    fn import_without_selection_is_rejected_locally() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            panic!("no request expected");
        };
        let api = Api::new(PortalClient::default(), transport);
        let mut importer = Importer::new();
        importer.set_words(vec![word("pane", "bread")]);
        importer.import(&api);
        assert_eq!(importer.error(), Some("Please select a category first"));
    }

    #[test]
    fn successful_import_clears_state_and_reports_count() {
        let urls = RefCell::new(Vec::new());
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            urls.borrow_mut().push(req.url.clone());
            if req.url.ends_with("/words/import") {
                let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(body["group_id"], 5);
                assert_eq!(body["words"].as_array().unwrap().len(), 2);
                return Ok(HttpResponse::new(200, r#"{"imported_count":2}"#));
            }
            Ok(HttpResponse::new(
                200,
                r#"{"items":[{"id":5,"name":"Food","word_count":2}],
                    "pagination":{"current_page":1,"total_pages":1,"total_items":1,"per_page":10}}"#,
            ))
        };
        let api = Api::new(PortalClient::new("http://h/api"), &transport);
        let mut importer = Importer::new();
        importer.select(Some(group(5, "Food")));
        importer.set_words(vec![word("pane", "bread"), word("vino", "wine")]);
        assert!(importer.can_import());

        importer.import(&api);

        assert!(importer.words().is_empty());
        assert!(importer.selected().is_none());
        let message = importer.success_message().unwrap();
        assert!(message.contains('2'));
        assert_eq!(message, "Successfully imported 2 words into category \"Food\"");
        assert_eq!(importer.groups()[0].word_count, 2);
        assert_eq!(
            urls.borrow().as_slice(),
            &["http://h/api/words/import".to_string(), "http://h/api/groups?page=1".to_string()]
        );
    }

    #[test]
    fn failed_import_keeps_words() {
        let transport =
            |_: &HttpRequest| -> Result<HttpResponse, ApiError> { Ok(HttpResponse::new(400, "bad")) };
        let api = Api::new(PortalClient::default(), transport);
        let mut importer = Importer::new();
        importer.select(Some(group(5, "Food")));
        importer.set_words(vec![word("pane", "bread")]);
        importer.import(&api);
        assert_eq!(importer.error(), Some("Failed to import words"));
        assert_eq!(importer.words().len(), 1);
        assert!(importer.selected().is_some());
    }

    #[test]
    fn ineligible_batch_is_never_posted() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            panic!("no request expected");
        };
        let api = Api::new(PortalClient::default(), transport);
        let mut importer = Importer::new();
        importer.select(Some(group(5, "Food")));
        importer
            .edit_json(r#"[{"italian":"pane","english":"","parts":null}]"#)
            .unwrap();
        assert!(!importer.can_import());

        importer.import(&api);
        assert_eq!(
            importer.error(),
            Some("Every word needs italian, english and parts before import")
        );
        assert!(importer.success_message().is_none());
        assert_eq!(importer.words().len(), 1);
    }

    #[test]
    fn rejected_edit_blocks_import_of_previous_list() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            panic!("no request expected");
        };
        let api = Api::new(PortalClient::default(), transport);
        let mut importer = Importer::new();
        importer.select(Some(group(5, "Food")));
        importer.set_words(vec![word("pane", "bread")]);
        assert!(importer.edit_json("[{").is_err());

        importer.import(&api);
        assert!(importer.error().is_some());
        assert_eq!(importer.words().len(), 1);
    }

    #[test]
    fn import_forwards_parts_unchanged() {
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            if req.url.ends_with("/words/import") {
                let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(
                    body["words"][0]["parts"],
                    serde_json::json!({"type": "verb", "notes": "irregular in present", "irregular": "yes"})
                );
                return Ok(HttpResponse::new(200, r#"{"imported_count":1}"#));
            }
            Ok(HttpResponse::new(
                200,
                r#"{"items":[],"pagination":{"current_page":1,"total_pages":0,"total_items":0,"per_page":10}}"#,
            ))
        };
        let api = Api::new(PortalClient::default(), &transport);
        let mut importer = Importer::new();
        importer.select(Some(group(5, "Food")));
        importer
            .edit_json(
                r#"[{"italian":"andare","english":"to go",
                     "parts":{"type":"verb","notes":"irregular in present","irregular":"yes"}}]"#,
            )
            .unwrap();
        assert!(importer.words_json().unwrap().contains("irregular in present"));

        importer.import(&api);
        assert_eq!(importer.error(), None);
        assert!(importer.success_message().is_some());
    }

    #[test]
    fn missing_fields_are_not_reported_as_bad_json() {
        let err = parse_word_list(r#"[{"english":"bread","parts":{}}]"#).unwrap_err();
        assert!(err.user_message().starts_with("word is missing required fields"));

        let err = parse_word_list("[{\"italian\": ").unwrap_err();
        assert!(err.user_message().starts_with("word list is not valid JSON"));
    }

    #[test]
    fn generate_uses_selected_group_name() {
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(body["category"], "Food");
            Ok(HttpResponse::new(
                200,
                r#"{"words":[{"italian":"pane","english":"bread","parts":{"type":"noun"}}]}"#,
            ))
        };
        let api = Api::new(PortalClient::default(), transport);
        let mut importer = Importer::new();
        assert!(!importer.can_generate());
        importer.select(Some(group(1, "Food")));
        assert!(importer.can_generate());
        importer.generate(&api);
        assert_eq!(importer.words().len(), 1);
        assert!(importer.can_import());
        assert!(!importer.is_generating());
    }

    #[test]
    fn generate_accepts_free_form_parts() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            Ok(HttpResponse::new(
                200,
                r#"{"words":[{"italian":"andare","english":"to go",
                    "parts":{"type":"verb","irregular":"yes","conjugation":{"io":"vado"}}}]}"#,
            ))
        };
        let api = Api::new(PortalClient::default(), transport);
        let mut importer = Importer::new();
        importer.select(Some(group(1, "Verbs")));
        importer.generate(&api);
        assert_eq!(importer.error(), None);
        assert_eq!(importer.words().len(), 1);
        let parts = importer.words()[0].parts.as_ref().unwrap();
        assert_eq!(parts.get("conjugation"), Some(&serde_json::json!({"io": "vado"})));
    }

    #[test]
    fn generate_failure_sets_error() {
        let transport =
            |_: &HttpRequest| -> Result<HttpResponse, ApiError> { Err(ApiError::Transport("x".to_string())) };
        let api = Api::new(PortalClient::default(), transport);
        let mut importer = Importer::new();
        importer.select(Some(group(1, "Food")));
        importer.generate(&api);
        assert_eq!(importer.error(), Some("Failed to generate words"));
        assert!(importer.words().is_empty());
    }

    #[test]
    fn load_and_create_groups() {
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            if req.body.is_some() {
                return Ok(HttpResponse::new(201, r#"{"id":9,"name":"Travel","word_count":0}"#));
            }
            Ok(HttpResponse::new(
                200,
                r#"{"items":[{"id":1,"name":"Food","word_count":3}],
                    "pagination":{"current_page":1,"total_pages":1,"total_items":1,"per_page":10}}"#,
            ))
        };
        let api = Api::new(PortalClient::default(), transport);
        let mut importer = Importer::new();
        assert!(importer.is_loading_groups());
        importer.load_groups(&api);
        assert!(!importer.is_loading_groups());
        assert!(importer.select_id(1));
        importer.create_group(&api, "Travel");
        assert_eq!(importer.groups().len(), 2);
        assert_eq!(importer.selected().unwrap().name, "Travel");
    }

    #[test]
    fn select_group_fetches_groups_beyond_the_loaded_page() {
        let urls = RefCell::new(Vec::new());
        let transport = |req: &HttpRequest| -> Result<HttpResponse, ApiError> {
            urls.borrow_mut().push(req.url.clone());
            match req.url.as_str() {
                "http://h/api/groups/11" => Ok(HttpResponse::new(200, r#"{"id":11,"name":"Travel","word_count":0}"#)),
                "http://h/api/groups/12" => Ok(HttpResponse::new(404, "")),
                _ => Ok(HttpResponse::new(
                    200,
                    r#"{"items":[{"id":1,"name":"Food","word_count":3}],
                        "pagination":{"current_page":1,"total_pages":2,"total_items":11,"per_page":10}}"#,
                )),
            }
        };
        let api = Api::new(PortalClient::new("http://h/api"), &transport);
        let mut importer = Importer::new();
        importer.load_groups(&api);

        importer.select_group(&api, 1).unwrap();
        assert_eq!(urls.borrow().len(), 1, "loaded group needs no request");

        importer.select_group(&api, 11).unwrap();
        assert_eq!(importer.selected().unwrap().name, "Travel");

        let err = importer.select_group(&api, 12).unwrap_err();
        assert!(matches!(err, ApiError::RequestFailed { status: 404, .. }));
    }

    #[test]
    fn load_groups_failure_message() {
        let transport =
            |_: &HttpRequest| -> Result<HttpResponse, ApiError> { Ok(HttpResponse::new(500, "")) };
        let api = Api::new(PortalClient::default(), transport);
        let mut importer = Importer::new();
        importer.load_groups(&api);
        assert_eq!(importer.error(), Some("Failed to load categories"));
        importer.create_group(&api, "Travel");
        assert_eq!(importer.error(), Some("Failed to create category"));
    }
}
