//! Station registry entry.

use super::ids::StationId;

/// A station known to the registry.
///
/// Sections reference stations by id only; the name exists for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    id: StationId,
    name: String,
}

impl Station {
    /// Create a station with the given id and display name.
    pub fn new(id: StationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the station id.
    pub fn id(&self) -> StationId {
        self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
