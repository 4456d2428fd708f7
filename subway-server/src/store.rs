//! In-memory storage for stations, lines and sections.
//!
//! Stands in for the persistence layer: three keyed collections with
//! monotonically allocated ids. The state is plain data with no locking of
//! its own; synchronization is the service layer's job.

use std::collections::HashMap;

use crate::domain::{Line, LineId, Section, SectionId, Station, StationId};

/// Everything the server stores.
#[derive(Debug, Default)]
pub struct SubwayState {
    stations: HashMap<StationId, Station>,
    lines: HashMap<LineId, Line>,
    sections: HashMap<SectionId, Section>,
    next_station: u64,
    next_line: u64,
    next_section: u64,
}

impl SubwayState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id and insert a new station.
    pub fn new_station(&mut self, name: &str) -> Station {
        self.next_station += 1;
        let station = Station::new(StationId(self.next_station), name);
        self.stations.insert(station.id(), station.clone());
        station
    }

    /// Look up a station.
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    /// All stations, ordered by id.
    pub fn stations(&self) -> Vec<Station> {
        let mut stations: Vec<Station> = self.stations.values().cloned().collect();
        stations.sort_by_key(Station::id);
        stations
    }

    /// Remove a station from the registry.
    pub fn remove_station(&mut self, id: StationId) -> Option<Station> {
        self.stations.remove(&id)
    }

    /// Returns true if any section on any line references the station.
    pub fn station_in_use(&self, id: StationId) -> bool {
        self.sections
            .values()
            .any(|s| s.up() == id || s.down() == id)
    }

    /// Allocate a line id without inserting anything.
    ///
    /// Lets the caller validate and build the line's first section before
    /// committing either of them.
    pub fn allocate_line_id(&mut self) -> LineId {
        self.next_line += 1;
        LineId(self.next_line)
    }

    /// Insert a line built from a previously allocated id.
    pub fn put_line(&mut self, line: Line) {
        self.lines.insert(line.id(), line);
    }

    /// Look up a line.
    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(&id)
    }

    /// Look up a line for mutation.
    pub fn line_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.lines.get_mut(&id)
    }

    /// All lines, ordered by id.
    pub fn lines(&self) -> Vec<Line> {
        let mut lines: Vec<Line> = self.lines.values().cloned().collect();
        lines.sort_by_key(Line::id);
        lines
    }

    /// Remove a line and every section it owns.
    pub fn remove_line(&mut self, id: LineId) -> Option<Line> {
        let line = self.lines.remove(&id)?;
        self.sections.retain(|_, s| s.line() != id);
        Some(line)
    }

    /// Allocate a section id without inserting anything.
    pub fn allocate_section_id(&mut self) -> SectionId {
        self.next_section += 1;
        SectionId(self.next_section)
    }

    /// Insert or overwrite a section.
    ///
    /// Overwriting is how a split's adjusted section is persisted: same id,
    /// new endpoint and distance.
    pub fn put_section(&mut self, section: Section) {
        self.sections.insert(section.id(), section);
    }

    /// Remove a section.
    pub fn remove_section(&mut self, id: SectionId) -> Option<Section> {
        self.sections.remove(&id)
    }

    /// All sections belonging to a line, ordered by id.
    ///
    /// The order is only for determinism; the chain reconstructs topology
    /// from the up/down links.
    pub fn sections_for_line(&self, line: LineId) -> Vec<Section> {
        let mut sections: Vec<Section> = self
            .sections
            .values()
            .filter(|s| s.line() == line)
            .cloned()
            .collect();
        sections.sort_by_key(Section::id);
        sections
    }
}
