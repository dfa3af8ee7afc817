mod common;
use common::{MockClient, ENV_LOCK};

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use typeahead::{Engine, EngineConfig, EngineErrorKind, Key, NavEffect};

fn movie_config(extra: Value) -> EngineConfig {
    let mut base = json!({
        "data": [
            {"Title": "Part One"},
            {"Title": "Part Two"},
            {"Title": "Part Three"}
        ],
        "displayKey": "Title"
    });
    if let (Value::Object(base_map), Value::Object(extra_map)) = (&mut base, extra) {
        for (key, value) in extra_map {
            base_map.insert(key, value);
        }
    }
    EngineConfig::from_value(base).expect("config")
}

#[tokio::test]
async fn multi_select_accumulates_and_signals_capacity() {
    let _guard = ENV_LOCK.lock().await;

    let selects = Arc::new(AtomicUsize::new(0));
    let counter = selects.clone();
    let config = movie_config(json!({ "multiple": true, "max": 2 }))
        .with_on_select(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    let engine = Engine::new(config, Arc::new(MockClient::new())).expect("engine");

    engine.select(json!({"Title": "Part One"}));
    assert!(!engine.state().selection_full);

    engine.select(json!({"Title": "Part Two"}));
    assert!(engine.state().selection_full);

    // Third select at capacity: size stays put, observer not notified.
    engine.select(json!({"Title": "Part Three"}));
    let state = engine.state();
    assert_eq!(state.selected.len(), 2);
    assert!(state.selection_full);
    assert_eq!(selects.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn multi_select_clears_input_and_hides_suggestions() {
    let _guard = ENV_LOCK.lock().await;

    let config = movie_config(json!({ "multiple": true }));
    let engine = Engine::new(config, Arc::new(MockClient::new())).expect("engine");

    engine.handle_input("par").expect("input");
    assert!(engine.state().suggestions_visible);

    engine.select_index(1).expect("select");
    let state = engine.state();
    assert_eq!(state.term, "");
    assert!(!state.suggestions_visible);
    assert_eq!(state.navigation, None);
    assert_eq!(
        state.selected[0].get("Title").and_then(Value::as_str),
        Some("Part Two")
    );
    assert!(!state.input_empty, "tags present, input not considered empty");
}

#[tokio::test]
async fn single_select_replaces_the_input_text() {
    let _guard = ENV_LOCK.lock().await;

    let engine =
        Engine::new(movie_config(json!({})), Arc::new(MockClient::new())).expect("engine");

    engine.handle_input("par").expect("input");
    engine.select_index(0).expect("select");

    let state = engine.state();
    assert_eq!(state.term, "Part One");
    assert!(state.selected.is_empty());
    assert!(!state.suggestions_visible);
}

#[tokio::test]
async fn selected_duplicates_are_filtered_out_of_candidates() {
    let _guard = ENV_LOCK.lock().await;

    let config = EngineConfig::from_value(json!({
        "data": [
            {"Title": "Dune", "Year": "1984"},
            {"Title": "Dune", "Year": "2021"},
            {"Title": "Dune Part Two"}
        ],
        "displayKey": "Title",
        "multiple": true
    }))
    .expect("config");
    let engine = Engine::new(config, Arc::new(MockClient::new())).expect("engine");

    engine.select(json!({"Title": "Dune", "Year": "1984"}));

    engine.handle_input("dun").expect("input");
    let state = engine.state();
    let titles: Vec<&str> = state
        .filtered
        .iter()
        .filter_map(|item| item.get("Title").and_then(Value::as_str))
        .collect();
    assert_eq!(titles, vec!["Dune Part Two"]);
}

#[tokio::test]
async fn remove_rejects_out_of_range_and_reenables_below_capacity() {
    let _guard = ENV_LOCK.lock().await;

    let config = movie_config(json!({ "multiple": true, "max": 2 }));
    let engine = Engine::new(config, Arc::new(MockClient::new())).expect("engine");

    engine.select(json!({"Title": "Part One"}));
    engine.select(json!({"Title": "Part Two"}));
    assert!(engine.state().selection_full);

    let err = engine.remove(7).unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::InvalidIndex);
    assert_eq!(engine.state().selected.len(), 2);

    engine.remove(0).expect("remove");
    let state = engine.state();
    assert_eq!(state.selected.len(), 1);
    assert!(!state.selection_full);
    assert_eq!(
        state.selected[0].get("Title").and_then(Value::as_str),
        Some("Part Two")
    );
}

#[tokio::test]
async fn arrow_keys_clamp_to_candidate_bounds() {
    let _guard = ENV_LOCK.lock().await;

    let engine =
        Engine::new(movie_config(json!({})), Arc::new(MockClient::new())).expect("engine");

    engine.handle_input("par").expect("input");
    assert_eq!(engine.state().navigation, Some(0));

    assert_eq!(
        engine.handle_key(Key::ArrowDown).expect("key"),
        Some(NavEffect::FocusCandidate(1))
    );
    assert_eq!(
        engine.handle_key(Key::ArrowDown).expect("key"),
        Some(NavEffect::FocusCandidate(2))
    );
    assert_eq!(engine.handle_key(Key::ArrowDown).expect("key"), None);
    assert_eq!(engine.state().navigation, Some(2));

    assert_eq!(
        engine.handle_key(Key::ArrowUp).expect("key"),
        Some(NavEffect::FocusCandidate(1))
    );
    assert_eq!(
        engine.handle_key(Key::ArrowUp).expect("key"),
        Some(NavEffect::FocusCandidate(0))
    );
    assert_eq!(engine.handle_key(Key::ArrowUp).expect("key"), None);
    assert_eq!(engine.state().navigation, Some(0));
}

#[tokio::test]
async fn enter_selects_the_focused_candidate() {
    let _guard = ENV_LOCK.lock().await;

    let engine =
        Engine::new(movie_config(json!({})), Arc::new(MockClient::new())).expect("engine");

    engine.handle_input("par").expect("input");
    engine.handle_key(Key::ArrowDown).expect("key");
    engine.handle_key(Key::Enter).expect("key");

    let state = engine.state();
    assert_eq!(state.term, "Part Two");
    assert!(!state.suggestions_visible);
}

#[tokio::test]
async fn escape_force_hides_and_notifies_observer() {
    let _guard = ENV_LOCK.lock().await;

    let hides = Arc::new(AtomicUsize::new(0));
    let counter = hides.clone();
    let config = movie_config(json!({})).with_on_hide(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let engine = Engine::new(config, Arc::new(MockClient::new())).expect("engine");

    engine.handle_input("par").expect("input");
    assert!(engine.state().suggestions_visible);

    engine.handle_key(Key::Escape).expect("key");
    let state = engine.state();
    assert!(!state.suggestions_visible);
    assert_eq!(state.navigation, None);
    assert_eq!(hides.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn keys_are_inert_while_suggestions_are_hidden() {
    let _guard = ENV_LOCK.lock().await;

    let engine =
        Engine::new(movie_config(json!({})), Arc::new(MockClient::new())).expect("engine");

    assert_eq!(engine.handle_key(Key::ArrowDown).expect("key"), None);
    assert_eq!(engine.handle_key(Key::Enter).expect("key"), None);

    let err = engine.select_index(0).unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::InvalidIndex);
}
