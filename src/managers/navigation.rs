use serde::Serialize;

/// Keyboard events the candidate list reacts to. Each handled key consumes
/// the key's default action on the caller's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    ArrowDown,
    ArrowUp,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    Unfocused,
    Focused(usize),
}

/// What the controller must do after a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    None,
    /// Move input focus to the i-th rendered candidate.
    Focus(usize),
    Select(usize),
    Hide,
}

pub struct NavigationStateMachine {
    state: Navigation,
}

impl NavigationStateMachine {
    pub fn new() -> Self {
        Self {
            state: Navigation::Unfocused,
        }
    }

    /// Suggestions became visible: focus resets to the first candidate.
    pub fn on_show(&mut self) {
        self.state = Navigation::Focused(0);
    }

    pub fn on_hide(&mut self) {
        self.state = Navigation::Unfocused;
    }

    pub fn state(&self) -> Navigation {
        self.state
    }

    pub fn index(&self) -> Option<usize> {
        match self.state {
            Navigation::Focused(index) => Some(index),
            Navigation::Unfocused => None,
        }
    }

    pub fn on_key(&mut self, key: Key, count: usize) -> NavCommand {
        match key {
            Key::Escape => {
                self.state = Navigation::Unfocused;
                NavCommand::Hide
            }
            _ if count == 0 => NavCommand::None,
            Key::Enter => match self.state {
                Navigation::Focused(index) if index < count => NavCommand::Select(index),
                _ => NavCommand::None,
            },
            Key::ArrowDown => {
                let next = match self.state {
                    Navigation::Focused(index) => (index + 1).min(count - 1),
                    Navigation::Unfocused => 0,
                };
                self.transition(next)
            }
            Key::ArrowUp => {
                let next = match self.state {
                    Navigation::Focused(index) => index.saturating_sub(1),
                    Navigation::Unfocused => 0,
                };
                self.transition(next)
            }
        }
    }

    fn transition(&mut self, next: usize) -> NavCommand {
        let changed = self.state != Navigation::Focused(next);
        self.state = Navigation::Focused(next);
        if changed {
            NavCommand::Focus(next)
        } else {
            NavCommand::None
        }
    }
}

impl Default for NavigationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
