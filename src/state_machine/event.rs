//! Events that can occur in a dialog

/// Events that trigger stage transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Free text typed by the user
    UserMessage { text: String },

    /// Explicit return to the main menu (menu tool, server reset command)
    Reset,
}

impl Event {
    pub fn user_message(text: impl Into<String>) -> Self {
        Event::UserMessage { text: text.into() }
    }
}
