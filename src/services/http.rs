use crate::constants::network;
use crate::errors::EngineError;
use crate::services::logger::Logger;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::AbortHandle;

/// Injected transport capability for remote suggestion lookups. A rejection
/// is terminal for that request; the engine never retries.
#[async_trait]
pub trait SuggestClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<Value, EngineError>;

    /// Cancels the most recent outstanding call, if any.
    fn abort(&self);
}

pub struct HttpSuggestClient {
    logger: Logger,
    client: reqwest::Client,
    timeout: Duration,
    current: Arc<Mutex<Option<AbortHandle>>>,
}

impl HttpSuggestClient {
    pub fn new(logger: Logger) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(
                network::MAX_REDIRECTS,
            ))
            .build()
            .map_err(|err| {
                EngineError::internal(format!("Failed to build HTTP client: {}", err))
            })?;
        Ok(Self {
            logger: logger.child("http"),
            client,
            timeout: Duration::from_millis(network::TIMEOUT_SUGGEST_REQUEST_MS),
            current: Arc::new(Mutex::new(None)),
        })
    }
}

#[async_trait]
impl SuggestClient for HttpSuggestClient {
    async fn get(&self, url: &str) -> Result<Value, EngineError> {
        self.logger
            .debug("GET", Some(&serde_json::json!({ "url": url })));
        let request = self.client.get(url).timeout(self.timeout);

        let handle = tokio::spawn(async move {
            let response = request.send().await.map_err(map_transport_error)?;
            let status = response.status().as_u16();
            if !(200..300).contains(&status) {
                return Err(status_error(status));
            }
            response.json::<Value>().await.map_err(|err| {
                EngineError::transport(format!("Failed to parse response body: {}", err))
            })
        });

        {
            let mut current = self.current.lock().unwrap_or_else(|err| err.into_inner());
            *current = Some(handle.abort_handle());
        }

        match handle.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => {
                Err(EngineError::aborted("Suggestion request aborted"))
            }
            Err(err) => Err(EngineError::internal(format!(
                "Suggestion request task failed: {}",
                err
            ))),
        }
    }

    fn abort(&self) {
        let mut current = self.current.lock().unwrap_or_else(|err| err.into_inner());
        if let Some(handle) = current.take() {
            self.logger.debug("Aborting in-flight request", None);
            handle.abort();
        }
    }
}

pub(crate) fn map_transport_error(err: reqwest::Error) -> EngineError {
    if err.is_timeout() {
        return EngineError::timeout("Suggestion request timed out");
    }
    EngineError::transport(err.to_string())
}

fn status_error(status: u16) -> EngineError {
    let details = serde_json::json!({ "status": status });
    let err = EngineError::transport(format!("Suggestion source failed ({})", status));
    if status == 401 || status == 403 {
        err.with_hint("Check auth configuration for the suggestion endpoint.".to_string())
            .with_details(details)
    } else if status == 404 {
        err.with_hint("Verify the suggestion URL and params are correct.".to_string())
            .with_details(details)
    } else {
        err.with_details(details)
    }
}
