use crate::constants::markup;
use crate::services::logger::Logger;
use regex::Regex;
use serde_json::Value;

#[derive(Debug, PartialEq)]
pub enum FilterOutcome {
    /// The live input moved on while this result set was in flight; the
    /// caller must hide suggestions and leave the candidate list untouched.
    Stale,
    Filtered(Vec<Value>),
}

pub struct FilterEngine {
    logger: Logger,
    display_key: String,
    hilight_term: bool,
    duplicate: bool,
}

impl FilterEngine {
    pub fn new(logger: Logger, display_key: String, hilight_term: bool, duplicate: bool) -> Self {
        Self {
            logger: logger.child("filter"),
            display_key,
            hilight_term,
            duplicate,
        }
    }

    /// Case-insensitive substring filter over `data`, deduplicated against
    /// the current selection, with optional highlight augmentation on a copy
    /// of each matching item. Source order is preserved.
    pub fn filter(
        &self,
        data: &[Value],
        term: &str,
        live_term: &str,
        selected: &[Value],
    ) -> FilterOutcome {
        if live_term != term {
            self.logger.debug(
                "Discarding stale result set",
                Some(&serde_json::json!({ "term": term, "live": live_term })),
            );
            return FilterOutcome::Stale;
        }

        let needle = term.to_lowercase();
        let mut filtered = Vec::new();
        for item in data {
            let Some(display) = item.get(&self.display_key).and_then(Value::as_str) else {
                continue;
            };
            if !display.to_lowercase().contains(&needle) {
                continue;
            }
            if !self.duplicate
                && selected.iter().any(|chosen| {
                    chosen.get(&self.display_key).and_then(Value::as_str) == Some(display)
                })
            {
                continue;
            }

            let mut candidate = item.clone();
            if self.hilight_term {
                if let Some(marked) = highlight_first(display, term) {
                    if let Value::Object(map) = &mut candidate {
                        map.insert(format!("_{}", self.display_key), Value::String(marked));
                    }
                }
            }
            filtered.push(candidate);
        }
        FilterOutcome::Filtered(filtered)
    }
}

/// Wraps exactly the first case-insensitive occurrence of `term` in the
/// hilight markers. The term is used as a raw regex pattern; a pattern that
/// fails to compile yields no highlight.
fn highlight_first(text: &str, term: &str) -> Option<String> {
    let pattern = Regex::new(&format!("(?i){}", term)).ok()?;
    let found = pattern.find(text)?;
    Some(format!(
        "{}{}{}{}{}",
        &text[..found.start()],
        markup::HILIGHT_OPEN,
        found.as_str(),
        markup::HILIGHT_CLOSE,
        &text[found.end()..]
    ))
}
