use crate::errors::EngineError;
use crate::services::logger::Logger;
use serde_json::Value;

#[derive(Debug, PartialEq)]
pub enum SelectOutcome {
    /// Single-selection mode: the input text becomes the display value; the
    /// selection set itself stays empty.
    ReplaceInput(String),
    /// Multi-selection mode: the item was appended; `full` signals that the
    /// configured capacity has now been reached.
    Appended { full: bool },
    /// The selection was already at capacity; size is unchanged.
    AtCapacity,
    /// An equal display value is already selected and duplicates are
    /// disallowed.
    DuplicateRejected,
}

#[derive(Debug, PartialEq)]
pub struct RemoveOutcome {
    pub removed: Value,
    /// True when the removal brought the selection back below capacity.
    pub reenabled: bool,
}

pub struct SelectionManager {
    logger: Logger,
    display_key: String,
    max: usize,
    multiple: bool,
    duplicate: bool,
    items: Vec<Value>,
}

impl SelectionManager {
    pub fn new(
        logger: Logger,
        display_key: String,
        max: usize,
        multiple: bool,
        duplicate: bool,
    ) -> Self {
        Self {
            logger: logger.child("selection"),
            display_key,
            max,
            multiple,
            duplicate,
            items: Vec::new(),
        }
    }

    fn display_of<'a>(&self, item: &'a Value) -> &'a str {
        item.get(&self.display_key)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn select(&mut self, item: Value) -> SelectOutcome {
        let display = self.display_of(&item).to_string();
        if !self.multiple {
            return SelectOutcome::ReplaceInput(display);
        }
        if self.items.len() >= self.max {
            self.logger.warn(
                "Selection is full",
                Some(&serde_json::json!({ "max": self.max })),
            );
            return SelectOutcome::AtCapacity;
        }
        if !self.duplicate
            && self
                .items
                .iter()
                .any(|chosen| self.display_of(chosen) == display)
        {
            self.logger.debug(
                "Duplicate selection rejected",
                Some(&serde_json::json!({ "display": display })),
            );
            return SelectOutcome::DuplicateRejected;
        }
        self.items.push(item);
        SelectOutcome::Appended {
            full: self.items.len() >= self.max,
        }
    }

    pub fn remove(&mut self, index: usize) -> Result<RemoveOutcome, EngineError> {
        if index >= self.items.len() {
            return Err(
                EngineError::invalid_index("Selection index out of range").with_details(
                    serde_json::json!({ "index": index, "len": self.items.len() }),
                ),
            );
        }
        let removed = self.items.remove(index);
        Ok(RemoveOutcome {
            removed,
            reenabled: self.items.len() < self.max,
        })
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max
    }
}
