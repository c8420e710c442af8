//! Browser tab snapshot held by the dispatcher.

use serde::{Deserialize, Serialize};

/// One browser tab as reported by the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub host: String,
}

impl Tab {
    #[cfg(test)]
    pub fn new(id: i64, title: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            host: host.into(),
        }
    }

    /// Render the tab as one `list` response line, newline included.
    ///
    /// Fields are joined with commas as-is; a comma inside the title is not
    /// escaped and clients split on the first three commas only.
    pub fn list_line(&self, pid: u32) -> String {
        format!("{pid},{},{},{}\n", self.id, self.host, self.title)
    }
}

/// The current complete tab list.
///
/// Owned by the dispatcher and never shared: the snapshot is only ever swapped
/// wholesale, so a reader sees either the previous list or the new one.
#[derive(Debug, Default)]
pub struct TabRegistry {
    tabs: Vec<Tab>,
}

impl TabRegistry {
    pub const fn new() -> Self {
        Self { tabs: Vec::new() }
    }

    /// Replace the snapshot, discarding everything known before.
    pub fn replace(&mut self, tabs: Vec<Tab>) {
        self.tabs = tabs;
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Full `list` response for the current snapshot.
    pub fn render_list(&self, pid: u32) -> String {
        self.tabs.iter().map(|tab| tab.list_line(pid)).collect()
    }
}
