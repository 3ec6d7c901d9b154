//! Tournament event model.

use serde::{Deserialize, Serialize};

/// A tournament listed on a format page.
///
/// Events synthesized from explicit event ids carry empty `name`/`date`
/// until a deck page fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: u64,
    pub format_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
}

impl Event {
    /// Create a new event.
    pub fn new(event_id: u64, format_id: impl Into<String>) -> Self {
        Self {
            event_id,
            format_id: format_id.into(),
            name: String::new(),
            date: String::new(),
        }
    }

    /// Builder method to set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder method to set the date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }
}
