use crate::constants::template::TERM_PLACEHOLDER;
use crate::errors::EngineError;
use std::collections::BTreeMap;
use url::form_urlencoded;

/// A fully built remote lookup for one term. `url` carries the final query
/// string with every `{{term}}` placeholder substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub term: String,
    pub url: String,
}

impl SuggestionRequest {
    pub fn build(
        url: &str,
        params: &BTreeMap<String, String>,
        term: &str,
    ) -> Result<Self, EngineError> {
        if params.is_empty() {
            return Err(EngineError::config("Params is missing from config").with_hint(
                "Remote lookups need at least one query parameter; use {{term}} where the typed term should go."
                    .to_string(),
            ));
        }

        let base = if url.contains('?') {
            if url.ends_with('?') || url.ends_with('&') {
                url.to_string()
            } else {
                format!("{}&", url)
            }
        } else {
            format!("{}?", url)
        };

        let encoded = encode_term(term);
        let parts: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value.replace(TERM_PLACEHOLDER, &encoded)))
            .collect();

        Ok(Self {
            term: term.to_string(),
            url: format!("{}{}", base, parts.join("&")),
        })
    }
}

/// Form-encodes a term for query-string use; spaces become `+`.
pub fn encode_term(term: &str) -> String {
    form_urlencoded::byte_serialize(term.as_bytes()).collect()
}
