//! Section value types.
//!
//! A section is one directed edge of a line: up station → down station with
//! a strictly positive distance. Both `Distance` and `Section` validate at
//! construction, so any value of these types can be trusted downstream.

use std::fmt;

use super::ids::{LineId, SectionId, StationId};

/// Error returned for malformed section data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSection {
    /// The two endpoints are the same station
    #[error("section endpoints must be two different stations")]
    SameStation,

    /// The distance is zero
    #[error("section distance must be greater than zero")]
    ZeroDistance,
}

/// A section length in meters, guaranteed strictly positive.
///
/// # Examples
///
/// ```
/// use subway_server::domain::Distance;
///
/// let d = Distance::new(5).unwrap();
/// assert_eq!(d.meters(), 5);
///
/// // Zero is rejected
/// assert!(Distance::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Distance(u64);

impl Distance {
    /// Construct a distance from a length in meters.
    ///
    /// Fails with [`InvalidSection::ZeroDistance`] if `meters` is zero.
    pub fn new(meters: u64) -> Result<Self, InvalidSection> {
        if meters == 0 {
            return Err(InvalidSection::ZeroDistance);
        }
        Ok(Distance(meters))
    }

    /// Returns the length in meters.
    pub fn meters(&self) -> u64 {
        self.0
    }

    /// Subtract `other`, refusing any remainder that is not strictly
    /// positive.
    ///
    /// This is the arithmetic behind a split-insert: the remainder of a
    /// divided segment must itself be a valid distance, so `other` must be
    /// strictly smaller than `self`.
    pub fn checked_sub(self, other: Distance) -> Option<Distance> {
        self.0
            .checked_sub(other.0)
            .and_then(|rest| (rest > 0).then_some(Distance(rest)))
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

/// One directed edge of a line's section chain.
///
/// # Invariants
///
/// - `up != down`
/// - `distance` is strictly positive (guaranteed by [`Distance`])
///
/// A section is immutable from outside the domain; only a chain split
/// adjusts an existing section, through the crate-internal `replace_*`
/// methods, and a split preserves both invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    id: SectionId,
    line: LineId,
    up: StationId,
    down: StationId,
    distance: Distance,
}

impl Section {
    /// Construct a section, validating that the endpoints differ.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSection::SameStation`] if `up == down`.
    pub fn new(
        id: SectionId,
        line: LineId,
        up: StationId,
        down: StationId,
        distance: Distance,
    ) -> Result<Self, InvalidSection> {
        if up == down {
            return Err(InvalidSection::SameStation);
        }
        Ok(Self {
            id,
            line,
            up,
            down,
            distance,
        })
    }

    /// Returns the section id.
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Returns the owning line id.
    pub fn line(&self) -> LineId {
        self.line
    }

    /// Returns the up (origin) station id.
    pub fn up(&self) -> StationId {
        self.up
    }

    /// Returns the down (destination) station id.
    pub fn down(&self) -> StationId {
        self.down
    }

    /// Returns the section distance.
    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// Shrink this section to start at `up`, used when a split inserts a
    /// new section upstream of it.
    pub(crate) fn replace_up(&mut self, up: StationId, distance: Distance) {
        debug_assert_ne!(up, self.down);
        self.up = up;
        self.distance = distance;
    }

    /// Shrink this section to end at `down`, used when a split inserts a
    /// new section downstream of it.
    pub(crate) fn replace_down(&mut self, down: StationId, distance: Distance) {
        debug_assert_ne!(down, self.up);
        self.down = down;
        self.distance = distance;
    }
}
