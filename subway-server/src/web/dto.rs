//! Data transfer objects for web requests and responses.
//!
//! Wire field names are camelCase (`upStationId`, `downStationId`).

use serde::{Deserialize, Serialize};

use crate::domain::Station;
use crate::service::LineDetail;

/// Request to register a station.
#[derive(Debug, Deserialize)]
pub struct StationRequest {
    /// Display name
    pub name: String,
}

/// A station in responses.
#[derive(Debug, Serialize)]
pub struct StationResponse {
    pub id: u64,
    pub name: String,
}

impl StationResponse {
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id().0,
            name: station.name().to_string(),
        }
    }
}

/// Request to create a line with its first section.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCreateRequest {
    pub name: String,

    /// Display color (e.g. "bg-red-600")
    pub color: String,

    pub up_station_id: u64,

    pub down_station_id: u64,

    /// First section length in meters
    pub distance: u64,
}

/// Request to rename/recolor a line.
#[derive(Debug, Deserialize)]
pub struct LineUpdateRequest {
    pub name: String,
    pub color: String,
}

/// A line with its stations in path order.
#[derive(Debug, Serialize)]
pub struct LineResponse {
    pub id: u64,
    pub name: String,
    pub color: String,

    /// Stations from head to tail
    pub stations: Vec<StationResponse>,
}

impl LineResponse {
    pub fn from_detail(detail: &LineDetail) -> Self {
        Self {
            id: detail.line.id().0,
            name: detail.line.name().to_string(),
            color: detail.line.color().to_string(),
            stations: detail
                .stations
                .iter()
                .map(StationResponse::from_station)
                .collect(),
        }
    }
}

/// Request to add a section to a line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRequest {
    pub up_station_id: u64,

    pub down_station_id: u64,

    /// Section length in meters
    pub distance: u64,
}

/// Query parameters for removing a section.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRemoveQuery {
    /// The station to remove; must be the line's terminal station
    pub station_id: u64,
}

/// Error body for failed requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
