use crate::config::{EngineConfig, HideCallback, InputCallback, SelectCallback};
use crate::errors::EngineError;
use crate::managers::data_source::{DataSource, ErrorHook, ResultHook};
use crate::managers::filter::{FilterEngine, FilterOutcome};
use crate::managers::navigation::{Key, NavCommand, NavigationStateMachine};
use crate::managers::selection::{SelectOutcome, SelectionManager};
use crate::services::http::SuggestClient;
use crate::services::logger::Logger;
use crate::services::rate_limiter::Debounce;
use crate::services::term_cache::TermCache;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

/// Externally observable snapshot; recomputed whole on every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineState {
    pub term: String,
    pub filtered: Vec<Value>,
    pub suggestions_visible: bool,
    pub selected: Vec<Value>,
    pub selection_full: bool,
    pub navigation: Option<usize>,
    pub input_empty: bool,
    /// Character count of the live input, for multi-select width sizing.
    pub input_width_hint: Option<usize>,
}

/// External collaborator effects requested by a navigation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEffect {
    FocusCandidate(usize),
}

struct EngineInner {
    input_value: String,
    show: bool,
    filtered: Vec<Value>,
    selection: SelectionManager,
    nav: NavigationStateMachine,
}

struct EngineShared {
    logger: Logger,
    filter: FilterEngine,
    multiple: bool,
    inner: Mutex<EngineInner>,
    watch: watch::Sender<EngineState>,
    on_select: Option<SelectCallback>,
    on_hide: Option<HideCallback>,
}

/// Orchestrates input, retrieval, filtering, selection and navigation, and
/// publishes one consistent [`EngineState`] per transition.
pub struct Engine {
    logger: Logger,
    suggest_after: usize,
    on_input: Option<InputCallback>,
    data_source: DataSource,
    shared: Arc<EngineShared>,
}

impl Engine {
    /// Must be constructed inside a tokio runtime; the debounce gate and the
    /// remote fetch path spawn tasks on it.
    pub fn new(config: EngineConfig, client: Arc<dyn SuggestClient>) -> Result<Self, EngineError> {
        config.validate()?;
        let logger = Logger::new("typeahead");

        let selection = SelectionManager::new(
            logger.clone(),
            config.display_key.clone(),
            config.max,
            config.multiple,
            config.duplicate,
        );
        let inner = EngineInner {
            input_value: String::new(),
            show: false,
            filtered: Vec::new(),
            selection,
            nav: NavigationStateMachine::new(),
        };
        let (watch_tx, _) = watch::channel(build_state(&inner, config.multiple));

        let shared = Arc::new(EngineShared {
            logger: logger.child("state"),
            filter: FilterEngine::new(
                logger.clone(),
                config.display_key.clone(),
                config.hilight_term,
                config.duplicate,
            ),
            multiple: config.multiple,
            inner: Mutex::new(inner),
            watch: watch_tx,
            on_select: config.on_select.clone(),
            on_hide: config.on_hide.clone(),
        });

        let on_result: ResultHook = {
            let shared = shared.clone();
            Arc::new(move |rows, term| shared.apply_results(rows, &term))
        };
        let on_error: ErrorHook = {
            let callback = config.on_error.clone();
            Arc::new(move |err| {
                if let Some(callback) = &callback {
                    callback(&err);
                }
            })
        };

        let data_source = DataSource::new(
            logger.clone(),
            config.data,
            config.url,
            config.params,
            config.data_key,
            TermCache::new(logger.clone()),
            Debounce::new(Duration::from_millis(config.debounce_ms)),
            client,
            on_result,
            on_error,
        );

        Ok(Self {
            logger,
            suggest_after: config.suggest_after,
            on_input: config.on_input,
            data_source,
            shared,
        })
    }

    /// Text input event: updates the term, hides suggestions preemptively,
    /// and triggers a search once the term is long enough.
    pub fn handle_input(&self, value: &str) -> Result<(), EngineError> {
        {
            let mut inner = self.shared.lock();
            inner.input_value = value.to_string();
            inner.show = false;
            inner.nav.on_hide();
            self.shared.publish(&inner);
        }
        if let Some(callback) = &self.on_input {
            callback(value);
        }
        if value.chars().count() >= self.suggest_after {
            self.data_source.search(value)?;
        }
        Ok(())
    }

    /// Programmatic selection of an arbitrary item.
    pub fn select(&self, item: Value) {
        self.shared.select_item(item);
    }

    /// Selects the i-th filtered candidate.
    pub fn select_index(&self, index: usize) -> Result<(), EngineError> {
        let item = {
            let inner = self.shared.lock();
            match inner.filtered.get(index) {
                Some(item) => item.clone(),
                None => {
                    return Err(
                        EngineError::invalid_index("Suggestion index out of range").with_details(
                            serde_json::json!({ "index": index, "count": inner.filtered.len() }),
                        ),
                    )
                }
            }
        };
        self.shared.select_item(item);
        Ok(())
    }

    pub fn remove(&self, index: usize) -> Result<(), EngineError> {
        let mut inner = self.shared.lock();
        let outcome = inner.selection.remove(index)?;
        if outcome.reenabled {
            self.logger.debug(
                "Selection re-enabled",
                Some(&serde_json::json!({ "len": inner.selection.len() })),
            );
        }
        inner.show = false;
        inner.nav.on_hide();
        self.shared.publish(&inner);
        Ok(())
    }

    pub fn handle_key(&self, key: Key) -> Result<Option<NavEffect>, EngineError> {
        let command = {
            let mut inner = self.shared.lock();
            let count = if inner.show { inner.filtered.len() } else { 0 };
            inner.nav.on_key(key, count)
        };
        match command {
            NavCommand::None => Ok(None),
            NavCommand::Focus(index) => {
                let inner = self.shared.lock();
                self.shared.publish(&inner);
                Ok(Some(NavEffect::FocusCandidate(index)))
            }
            NavCommand::Select(index) => {
                self.select_index(index)?;
                Ok(None)
            }
            NavCommand::Hide => {
                self.shared.hide();
                Ok(None)
            }
        }
    }

    /// Force-hides the suggestion list and notifies the hide observer.
    pub fn hide(&self) {
        self.shared.hide();
    }

    pub fn state(&self) -> EngineState {
        self.shared.watch.borrow().clone()
    }

    /// Snapshot stream for the view layer; the receiver always holds the
    /// latest state.
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.shared.watch.subscribe()
    }

    pub fn cache_stats(&self) -> Value {
        self.data_source.cache_stats()
    }
}

impl EngineShared {
    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn publish(&self, inner: &EngineInner) {
        self.watch.send_replace(build_state(inner, self.multiple));
    }

    /// Delivery point for a resolved result set; stale sets hide the list
    /// without touching the current candidates.
    fn apply_results(&self, data: Vec<Value>, term: &str) {
        let mut inner = self.lock();
        let live = inner.input_value.clone();
        match self.filter.filter(&data, term, &live, inner.selection.items()) {
            FilterOutcome::Stale => {
                inner.show = false;
                inner.nav.on_hide();
            }
            FilterOutcome::Filtered(items) => {
                inner.show = !items.is_empty();
                inner.filtered = items;
                if inner.show {
                    inner.nav.on_show();
                } else {
                    inner.nav.on_hide();
                }
            }
        }
        self.publish(&inner);
    }

    fn select_item(&self, item: Value) {
        let selected = {
            let mut inner = self.lock();
            let outcome = inner.selection.select(item.clone());
            let selected = match outcome {
                SelectOutcome::ReplaceInput(text) => {
                    inner.input_value = text;
                    true
                }
                SelectOutcome::Appended { full } => {
                    inner.input_value.clear();
                    if full {
                        self.logger.info(
                            "Selection reached capacity",
                            Some(&serde_json::json!({ "len": inner.selection.len() })),
                        );
                    }
                    true
                }
                SelectOutcome::AtCapacity | SelectOutcome::DuplicateRejected => false,
            };
            inner.show = false;
            inner.nav.on_hide();
            self.publish(&inner);
            selected
        };
        if selected {
            if let Some(callback) = &self.on_select {
                callback(&item);
            }
        }
    }

    fn hide(&self) {
        {
            let mut inner = self.lock();
            inner.show = false;
            inner.nav.on_hide();
            self.publish(&inner);
        }
        if let Some(callback) = &self.on_hide {
            callback();
        }
    }
}

fn build_state(inner: &EngineInner, multiple: bool) -> EngineState {
    EngineState {
        term: inner.input_value.clone(),
        filtered: inner.filtered.clone(),
        suggestions_visible: inner.show,
        selected: inner.selection.items().to_vec(),
        selection_full: inner.selection.is_full(),
        navigation: inner.nav.index(),
        input_empty: inner.input_value.is_empty() && inner.selection.is_empty(),
        input_width_hint: if multiple {
            Some(inner.input_value.chars().count())
        } else {
            None
        },
    }
}
