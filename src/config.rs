use crate::constants::defaults;
use crate::errors::EngineError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type InputCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type SelectCallback = Arc<dyn Fn(&Value) + Send + Sync>;
pub type HideCallback = Arc<dyn Fn() + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&EngineError) + Send + Sync>;

/// Engine construction options. Deserializable from the JSON option names
/// (`displayKey`, `suggestAfter`, ...); observer callbacks are attached via
/// the `with_*` builders.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub url: Option<String>,
    pub params: BTreeMap<String, String>,
    pub data: Vec<Value>,
    pub data_key: Option<String>,
    pub display_key: String,
    pub suggest_after: usize,
    pub max: usize,
    pub multiple: bool,
    pub duplicate: bool,
    pub hilight_term: bool,
    pub debounce_ms: u64,
    #[serde(skip)]
    pub on_input: Option<InputCallback>,
    #[serde(skip)]
    pub on_select: Option<SelectCallback>,
    #[serde(skip)]
    pub on_hide: Option<HideCallback>,
    #[serde(skip)]
    pub on_error: Option<ErrorCallback>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: None,
            params: BTreeMap::new(),
            data: Vec::new(),
            data_key: None,
            display_key: String::new(),
            suggest_after: defaults::SUGGEST_AFTER,
            max: defaults::MAX_SELECTED,
            multiple: false,
            duplicate: false,
            hilight_term: false,
            debounce_ms: defaults::DEBOUNCE_DELAY_MS,
            on_input: None,
            on_select: None,
            on_hide: None,
            on_error: None,
        }
    }
}

impl EngineConfig {
    pub fn from_value(value: Value) -> Result<Self, EngineError> {
        serde_json::from_value(value)
            .map_err(|err| EngineError::config(format!("Invalid engine config: {}", err)))
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.display_key.trim().is_empty() {
            return Err(EngineError::config("displayKey must be a non-empty string")
                .with_hint("Name the item field used for matching and display.".to_string()));
        }
        if self.max == 0 {
            return Err(EngineError::config("max must be at least 1"));
        }
        if self.suggest_after == 0 {
            return Err(EngineError::config("suggestAfter must be at least 1"));
        }
        Ok(())
    }

    pub fn with_on_input(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_input = Some(Arc::new(callback));
        self
    }

    pub fn with_on_select(mut self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_select = Some(Arc::new(callback));
        self
    }

    pub fn with_on_hide(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_hide = Some(Arc::new(callback));
        self
    }

    pub fn with_on_error(
        mut self,
        callback: impl Fn(&EngineError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}
