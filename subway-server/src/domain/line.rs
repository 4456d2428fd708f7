//! Line container type.

use super::ids::LineId;

/// A named, colored subway line.
///
/// A line owns exactly one section chain; the chain's sections live in the
/// section store, keyed by this line's id. Renaming or recoloring a line
/// never touches its sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    id: LineId,
    name: String,
    color: String,
}

impl Line {
    /// Create a line with the given id, name and color.
    pub fn new(id: LineId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }

    /// Returns the line id.
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Returns the line name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display color (e.g. `"bg-red-600"`).
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Replace the name and color.
    pub fn rename(&mut self, name: impl Into<String>, color: impl Into<String>) {
        self.name = name.into();
        self.color = color.into();
    }
}
