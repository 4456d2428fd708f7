//! Line orchestration service.
//!
//! Loads a line's sections, runs one chain operation, and persists the
//! resulting deltas. Every mutating operation holds the write lock for the
//! whole load → mutate → persist cycle, so concurrent edits to the same
//! line cannot interleave and corrupt the single-path invariant.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::domain::{
    AddOutcome, CorruptChainError, Distance, InvalidSection, Line, LineId, Section,
    SectionAddError, SectionChain, SectionId, SectionRemoveError, Station, StationId,
};
use crate::store::SubwayState;

/// Errors surfaced by the service layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// No line with this id
    #[error("line {0} does not exist")]
    UnknownLine(LineId),

    /// No station with this id in the registry
    #[error("station {0} does not exist")]
    UnknownStation(StationId),

    /// The station is still referenced by a line's sections
    #[error("station {0} is still used by a line")]
    StationInUse(StationId),

    /// Malformed section data
    #[error(transparent)]
    InvalidSection(#[from] InvalidSection),

    /// The section cannot be placed on the line
    #[error(transparent)]
    Add(#[from] SectionAddError),

    /// The station cannot be removed from the line
    #[error(transparent)]
    Remove(#[from] SectionRemoveError),

    /// The stored sections no longer form a single path
    #[error(transparent)]
    Corrupt(#[from] CorruptChainError),
}

/// A line together with its stations in path order, head to tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDetail {
    pub line: Line,
    pub stations: Vec<Station>,
}

/// Handle to the line and station services.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone, Default)]
pub struct LineService {
    state: Arc<RwLock<SubwayState>>,
}

impl LineService {
    /// Create a service over an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a station.
    pub async fn create_station(&self, name: &str) -> Station {
        let mut state = self.state.write().await;
        let station = state.new_station(name);
        debug!(station = %station.id(), name, "station created");
        station
    }

    /// All registered stations, ordered by id.
    pub async fn stations(&self) -> Vec<Station> {
        self.state.read().await.stations()
    }

    /// Delete a station from the registry.
    ///
    /// Refused while any section still references the station, since a
    /// dangling station id would corrupt the owning chain.
    pub async fn delete_station(&self, id: StationId) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        if state.station(id).is_none() {
            return Err(ServiceError::UnknownStation(id));
        }
        if state.station_in_use(id) {
            return Err(ServiceError::StationInUse(id));
        }
        state.remove_station(id);
        debug!(station = %id, "station deleted");
        Ok(())
    }

    /// Create a line with its first section.
    ///
    /// Both stations must already exist in the registry. The first section
    /// is the add operation applied to an empty chain, so a stored line
    /// always has at least one section.
    pub async fn create_line(
        &self,
        name: &str,
        color: &str,
        up: StationId,
        down: StationId,
        distance_meters: u64,
    ) -> Result<LineDetail, ServiceError> {
        let mut state = self.state.write().await;
        require_station(&state, up)?;
        require_station(&state, down)?;
        let distance = Distance::new(distance_meters)?;

        let line_id = state.allocate_line_id();
        let section = Section::new(state.allocate_section_id(), line_id, up, down, distance)?;
        let mut chain = SectionChain::default();
        let outcome = chain.add(section)?;

        let line = Line::new(line_id, name, color);
        state.put_line(line.clone());
        state.put_section(outcome.inserted);
        debug!(line = %line_id, name, "line created");

        detail_of(&state, line)
    }

    /// All lines with their ordered stations, ordered by line id.
    pub async fn lines(&self) -> Result<Vec<LineDetail>, ServiceError> {
        let state = self.state.read().await;
        state
            .lines()
            .into_iter()
            .map(|line| detail_of(&state, line))
            .collect()
    }

    /// One line with its ordered stations.
    pub async fn line(&self, id: LineId) -> Result<LineDetail, ServiceError> {
        let state = self.state.read().await;
        let line = state
            .line(id)
            .cloned()
            .ok_or(ServiceError::UnknownLine(id))?;
        detail_of(&state, line)
    }

    /// Rename and recolor a line.
    pub async fn update_line(
        &self,
        id: LineId,
        name: &str,
        color: &str,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        let line = state.line_mut(id).ok_or(ServiceError::UnknownLine(id))?;
        line.rename(name, color);
        debug!(line = %id, name, "line updated");
        Ok(())
    }

    /// Delete a line and every section it owns.
    pub async fn delete_line(&self, id: LineId) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        state
            .remove_line(id)
            .ok_or(ServiceError::UnknownLine(id))?;
        debug!(line = %id, "line deleted");
        Ok(())
    }

    /// Add a section to a line.
    ///
    /// Returns the persistence deltas: the inserted section and, for a
    /// split, the adjusted existing section.
    pub async fn add_section(
        &self,
        line_id: LineId,
        up: StationId,
        down: StationId,
        distance_meters: u64,
    ) -> Result<AddOutcome, ServiceError> {
        let mut state = self.state.write().await;
        if state.line(line_id).is_none() {
            return Err(ServiceError::UnknownLine(line_id));
        }
        require_station(&state, up)?;
        require_station(&state, down)?;
        let distance = Distance::new(distance_meters)?;

        let section = Section::new(state.allocate_section_id(), line_id, up, down, distance)?;
        let mut chain = SectionChain::new(state.sections_for_line(line_id));
        let outcome = chain.add(section)?;

        state.put_section(outcome.inserted.clone());
        if let Some(adjusted) = &outcome.adjusted {
            state.put_section(adjusted.clone());
        }
        debug!(line = %line_id, up = %up, down = %down, "section added");
        Ok(outcome)
    }

    /// Remove a station (and its last edge) from a line.
    ///
    /// Returns the id of the deleted section.
    pub async fn remove_section(
        &self,
        line_id: LineId,
        station: StationId,
    ) -> Result<SectionId, ServiceError> {
        let mut state = self.state.write().await;
        if state.line(line_id).is_none() {
            return Err(ServiceError::UnknownLine(line_id));
        }

        let mut chain = SectionChain::new(state.sections_for_line(line_id));
        let removed = chain.remove(station)?;

        state.remove_section(removed);
        debug!(line = %line_id, station = %station, section = %removed, "section removed");
        Ok(removed)
    }
}

fn require_station(state: &SubwayState, id: StationId) -> Result<(), ServiceError> {
    if state.station(id).is_none() {
        return Err(ServiceError::UnknownStation(id));
    }
    Ok(())
}

/// Resolve a line's ordered station ids to registry entries.
///
/// A corrupt chain is logged before the error propagates; ordering must
/// never be guessed.
fn detail_of(state: &SubwayState, line: Line) -> Result<LineDetail, ServiceError> {
    let chain = SectionChain::new(state.sections_for_line(line.id()));
    let ordered = match chain.flatten() {
        Ok(ordered) => ordered,
        Err(e) => {
            error!(line = %line.id(), error = %e, "stored sections are corrupt; refusing to order stations");
            return Err(e.into());
        }
    };
    let stations = ordered
        .into_iter()
        .map(|id| {
            state
                .station(id)
                .cloned()
                .ok_or(ServiceError::UnknownStation(id))
        })
        .collect::<Result<Vec<Station>, ServiceError>>()?;
    Ok(LineDetail { line, stations })
}
