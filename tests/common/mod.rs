#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::Mutex;
use typeahead::{EngineError, SuggestClient};

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct MockRule {
    needle: String,
    delay: Duration,
    body: Value,
}

/// Scripted transport: rules are matched against the requested URL in
/// insertion order; an unmatched URL fails the request.
#[derive(Default)]
pub struct MockClient {
    rules: StdMutex<Vec<MockRule>>,
    calls: StdMutex<Vec<String>>,
    aborts: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, needle: &str, delay_ms: u64, body: Value) {
        let mut rules = self.rules.lock().expect("rules lock");
        rules.push(MockRule {
            needle: needle.to_string(),
            delay: Duration::from_millis(delay_ms),
            body,
        });
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn aborts(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SuggestClient for MockClient {
    async fn get(&self, url: &str) -> Result<Value, EngineError> {
        self.calls.lock().expect("calls lock").push(url.to_string());
        let rule = {
            let rules = self.rules.lock().expect("rules lock");
            rules
                .iter()
                .find(|rule| url.contains(&rule.needle))
                .map(|rule| (rule.delay, rule.body.clone()))
        };
        match rule {
            Some((delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            None => Err(EngineError::transport(format!("no mock response for {}", url))),
        }
    }

    fn abort(&self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
    }
}
