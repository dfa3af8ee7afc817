use crate::errors::EngineError;
use crate::services::http::SuggestClient;
use crate::services::logger::Logger;
use crate::services::rate_limiter::Debounce;
use crate::services::term_cache::TermCache;
use crate::utils::request::SuggestionRequest;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type ResultHook = Arc<dyn Fn(Vec<Value>, String) + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(EngineError) + Send + Sync>;

/// Resolves a term into a raw candidate set: static data wins outright,
/// otherwise the remote path runs behind the debounce gate with the term
/// cache consulted first. Results and failures are pushed through the
/// controller-supplied hooks.
pub struct DataSource {
    logger: Logger,
    data: Vec<Value>,
    url: Option<String>,
    params: BTreeMap<String, String>,
    data_key: Option<String>,
    cache: TermCache,
    debounce: Debounce,
    client: Arc<dyn SuggestClient>,
    on_result: ResultHook,
    on_error: ErrorHook,
}

impl DataSource {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        logger: Logger,
        data: Vec<Value>,
        url: Option<String>,
        params: BTreeMap<String, String>,
        data_key: Option<String>,
        cache: TermCache,
        debounce: Debounce,
        client: Arc<dyn SuggestClient>,
        on_result: ResultHook,
        on_error: ErrorHook,
    ) -> Self {
        Self {
            logger: logger.child("source"),
            data,
            url,
            params,
            data_key,
            cache,
            debounce,
            client,
            on_result,
            on_error,
        }
    }

    pub fn cache_stats(&self) -> Value {
        self.cache.stats()
    }

    /// Kicks off resolution for `term`. Configuration problems surface
    /// synchronously; everything downstream of the debounce gate reports
    /// through the result/error hooks.
    pub fn search(&self, term: &str) -> Result<(), EngineError> {
        if !self.data.is_empty() {
            (self.on_result)(self.data.clone(), term.to_string());
            return Ok(());
        }
        let Some(url) = &self.url else {
            return Ok(());
        };

        let request = SuggestionRequest::build(url, &self.params, term)?;
        let cache = self.cache.clone();
        let client = self.client.clone();
        let data_key = self.data_key.clone();
        let on_result = self.on_result.clone();
        let on_error = self.on_error.clone();
        let logger = self.logger.clone();
        let term = term.to_string();

        self.debounce.call(async move {
            if let Some(cached) = cache.get(&term) {
                client.abort();
                on_result(cached, term);
                return;
            }
            match client.get(&request.url).await {
                Ok(body) => match extract_result_set(body, data_key.as_deref()) {
                    Some(rows) => {
                        cache.put(&term, rows.clone());
                        on_result(rows, term);
                    }
                    None => {
                        logger.debug(
                            "No results in response",
                            Some(&serde_json::json!({ "term": term })),
                        );
                        on_result(Vec::new(), term);
                    }
                },
                Err(err) => {
                    logger.warn(
                        "Suggestion fetch failed",
                        Some(&serde_json::json!({ "url": request.url, "error": err.to_string() })),
                    );
                    on_error(err);
                }
            }
        });
        Ok(())
    }
}

/// Pulls the candidate array out of a response body. A non-array body is
/// resolved through `data_key`; anything that still is not an array counts
/// as "no results".
fn extract_result_set(body: Value, data_key: Option<&str>) -> Option<Vec<Value>> {
    match body {
        Value::Array(rows) => Some(rows),
        other => match other.get(data_key?)? {
            Value::Array(rows) => Some(rows.clone()),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::extract_result_set;
    use serde_json::json;

    #[test]
    fn arrays_pass_through_without_data_key() {
        let rows = extract_result_set(json!([{"Title": "Batman"}]), None).expect("rows");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn data_key_extracts_nested_array() {
        let body = json!({"Search": [{"Title": "Batman"}, {"Title": "Batman Begins"}]});
        let rows = extract_result_set(body, Some("Search")).expect("rows");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn missing_or_non_array_extraction_is_no_results() {
        assert_eq!(extract_result_set(json!({}), Some("Search")), None);
        assert_eq!(
            extract_result_set(json!({"Search": "nope"}), Some("Search")),
            None
        );
        assert_eq!(extract_result_set(json!({"Search": []}), None), None);
    }
}
