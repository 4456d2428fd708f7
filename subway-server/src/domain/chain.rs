//! Section chain aggregate.
//!
//! A line's sections form a single unbranching path. The sections are kept
//! as an unordered edge list; path order is derived on demand by walking
//! station-id lookup maps (station → outgoing edge, station → incoming
//! edge), never node objects with next/prev references.
//!
//! All mutation is validate-then-commit: a rejected add or remove leaves
//! the chain exactly as it was.

use std::collections::{HashMap, HashSet};

use super::ids::{SectionId, StationId};
use super::section::{Distance, Section};

/// Error returned when an add would break the single-path topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SectionAddError {
    /// Both endpoints are already on the line; accepting the section would
    /// create a cycle or a duplicate edge
    #[error("stations {up} and {down} are both already on the line")]
    BothEndpointsPresent { up: StationId, down: StationId },

    /// Neither endpoint touches the line; accepting the section would
    /// create a disconnected fragment
    #[error("neither station {up} nor station {down} is on the line")]
    Disconnected { up: StationId, down: StationId },

    /// A split must leave a strictly positive remainder on the divided
    /// segment
    #[error("new section ({new}) must be shorter than the segment it splits ({existing})")]
    SplitTooLong { new: Distance, existing: Distance },
}

/// Error returned when a remove is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SectionRemoveError {
    /// A line must keep at least one section
    #[error("a line must keep at least one section")]
    LastSection,

    /// The station is nowhere on the line
    #[error("station {0} is not on the line")]
    StationNotOnLine(StationId),

    /// Only the terminal down-station may be removed
    #[error("station {0} is not the terminal station of the line")]
    NotTerminal(StationId),
}

/// Invariant violation detected while deriving the station order.
///
/// These are never user errors: they indicate that a previous mutation
/// corrupted the stored sections. Callers should log loudly and refuse to
/// serve a result rather than guess an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CorruptChainError {
    /// A station has more than one outgoing section
    #[error("station {0} has more than one outgoing section")]
    Forked(StationId),

    /// A station has more than one incoming section
    #[error("station {0} has more than one incoming section")]
    Merged(StationId),

    /// The number of stations without an incoming section is not one
    #[error("expected exactly one head station, found {0}")]
    AmbiguousHead(usize),

    /// Traversal did not visit every section exactly once
    #[error("cycle detected while walking the line")]
    Cycle,
}

/// Result of a successful add: the deltas the caller must persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// The newly inserted section.
    pub inserted: Section,

    /// The existing section that was shrunk to make room, when the add was
    /// a split. `None` for a bootstrap or an extension at either end.
    pub adjusted: Option<Section>,
}

/// The set of sections belonging to one line, constrained to a single
/// simple path.
///
/// Storage order is irrelevant; [`SectionChain::flatten`] reconstructs the
/// path from the up/down links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionChain {
    sections: Vec<Section>,
}

impl SectionChain {
    /// Build a chain from stored sections, in any order.
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Returns the number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns true if the chain has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns the sections in storage order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns every station referenced by the chain.
    pub fn station_ids(&self) -> HashSet<StationId> {
        self.sections
            .iter()
            .flat_map(|s| [s.up(), s.down()])
            .collect()
    }

    /// Returns the sum of all section distances in meters.
    pub fn total_distance(&self) -> u64 {
        self.sections.iter().map(|s| s.distance().meters()).sum()
    }

    /// Add a section to the chain.
    ///
    /// The decision procedure, evaluated in order:
    ///
    /// 1. An empty chain accepts unconditionally (bootstraps the line).
    /// 2. If exactly the up endpoint is known and it has no outgoing edge,
    ///    it is the tail: append. Symmetrically, if exactly the down
    ///    endpoint is known and it has no incoming edge, it is the head:
    ///    prepend.
    /// 3. If the up endpoint already has an outgoing edge, split that edge:
    ///    `U→X` becomes `U→D` + `D→X`, distances summing to the original.
    /// 4. If the down endpoint already has an incoming edge, split that
    ///    edge: `Y→D` becomes `Y→U` + `U→D`.
    /// 5. Everything else is rejected: both endpoints known, or neither.
    ///
    /// # Errors
    ///
    /// Returns [`SectionAddError`] without mutating the chain when the
    /// section cannot be placed, including a split whose distance is not
    /// strictly smaller than the segment being divided.
    pub fn add(&mut self, section: Section) -> Result<AddOutcome, SectionAddError> {
        if self.sections.is_empty() {
            self.sections.push(section.clone());
            return Ok(AddOutcome {
                inserted: section,
                adjusted: None,
            });
        }

        let stations = self.station_ids();
        let up_on_line = stations.contains(&section.up());
        let down_on_line = stations.contains(&section.down());

        match (up_on_line, down_on_line) {
            (true, true) => Err(SectionAddError::BothEndpointsPresent {
                up: section.up(),
                down: section.down(),
            }),
            (false, false) => Err(SectionAddError::Disconnected {
                up: section.up(),
                down: section.down(),
            }),
            (true, false) => {
                match self.sections.iter().position(|s| s.up() == section.up()) {
                    // No outgoing edge: the up endpoint is the tail.
                    None => Ok(self.append(section)),
                    // U→X exists: insert U→D and shrink the edge to D→X.
                    Some(idx) => {
                        let remainder = self.split_remainder(idx, section.distance())?;
                        self.sections[idx].replace_up(section.down(), remainder);
                        let adjusted = Some(self.sections[idx].clone());
                        self.sections.push(section.clone());
                        Ok(AddOutcome {
                            inserted: section,
                            adjusted,
                        })
                    }
                }
            }
            (false, true) => {
                match self.sections.iter().position(|s| s.down() == section.down()) {
                    // No incoming edge: the down endpoint is the head.
                    None => Ok(self.append(section)),
                    // Y→D exists: shrink the edge to Y→U and insert U→D.
                    Some(idx) => {
                        let remainder = self.split_remainder(idx, section.distance())?;
                        self.sections[idx].replace_down(section.up(), remainder);
                        let adjusted = Some(self.sections[idx].clone());
                        self.sections.push(section.clone());
                        Ok(AddOutcome {
                            inserted: section,
                            adjusted,
                        })
                    }
                }
            }
        }
    }

    /// Remove a station from the chain by dropping its last edge.
    ///
    /// Only the terminal down-station may be removed, and never the last
    /// remaining section. On success the removed section's id is returned
    /// for the caller to persist as a delete.
    ///
    /// # Errors
    ///
    /// Returns [`SectionRemoveError`] without mutating the chain.
    pub fn remove(&mut self, station: StationId) -> Result<SectionId, SectionRemoveError> {
        if self.sections.len() <= 1 {
            return Err(SectionRemoveError::LastSection);
        }
        if self.sections.iter().any(|s| s.up() == station) {
            // An outgoing edge means the station is the head or interior.
            return Err(SectionRemoveError::NotTerminal(station));
        }
        let idx = self
            .sections
            .iter()
            .position(|s| s.down() == station)
            .ok_or(SectionRemoveError::StationNotOnLine(station))?;
        Ok(self.sections.remove(idx).id())
    }

    /// Derive the ordered station sequence from head to tail.
    ///
    /// The head is the unique station with no incoming edge; the walk
    /// follows outgoing edges until no edge remains. An empty chain yields
    /// an empty sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CorruptChainError`] if the sections do not form a single
    /// simple path. This indicates invariant breakage upstream, not a user
    /// error.
    pub fn flatten(&self) -> Result<Vec<StationId>, CorruptChainError> {
        if self.sections.is_empty() {
            return Ok(Vec::new());
        }

        let mut outgoing: HashMap<StationId, &Section> =
            HashMap::with_capacity(self.sections.len());
        let mut incoming: HashSet<StationId> = HashSet::with_capacity(self.sections.len());
        for section in &self.sections {
            if outgoing.insert(section.up(), section).is_some() {
                return Err(CorruptChainError::Forked(section.up()));
            }
            if !incoming.insert(section.down()) {
                return Err(CorruptChainError::Merged(section.down()));
            }
        }

        let heads: Vec<StationId> = outgoing
            .keys()
            .copied()
            .filter(|station| !incoming.contains(station))
            .collect();
        let &[head] = heads.as_slice() else {
            return Err(CorruptChainError::AmbiguousHead(heads.len()));
        };

        let mut ordered = Vec::with_capacity(self.sections.len() + 1);
        ordered.push(head);
        let mut current = head;
        while let Some(section) = outgoing.get(&current) {
            // Loop guard; unreachable once the maps above are consistent.
            if ordered.len() > self.sections.len() {
                return Err(CorruptChainError::Cycle);
            }
            current = section.down();
            ordered.push(current);
        }

        // A short walk means a fragment (necessarily cyclic) was never
        // reached from the head.
        if ordered.len() != self.sections.len() + 1 {
            return Err(CorruptChainError::Cycle);
        }
        Ok(ordered)
    }

    fn append(&mut self, section: Section) -> AddOutcome {
        self.sections.push(section.clone());
        AddOutcome {
            inserted: section,
            adjusted: None,
        }
    }

    fn split_remainder(
        &self,
        idx: usize,
        new_distance: Distance,
    ) -> Result<Distance, SectionAddError> {
        let existing = self.sections[idx].distance();
        existing
            .checked_sub(new_distance)
            .ok_or(SectionAddError::SplitTooLong {
                new: new_distance,
                existing,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::LineId;

    fn st(n: u64) -> StationId {
        StationId(n)
    }

    fn meters(n: u64) -> Distance {
        Distance::new(n).unwrap()
    }

    fn section(id: u64, up: u64, down: u64, distance: u64) -> Section {
        Section::new(SectionId(id), LineId(1), st(up), st(down), meters(distance)).unwrap()
    }

    fn flat(chain: &SectionChain) -> Vec<u64> {
        chain.flatten().unwrap().iter().map(|s| s.0).collect()
    }

    #[test]
    fn bootstrap_accepts_any_section() {
        let mut chain = SectionChain::default();
        let outcome = chain.add(section(1, 1, 2, 5)).unwrap();

        assert_eq!(outcome.adjusted, None);
        assert_eq!(chain.len(), 1);
        assert_eq!(flat(&chain), vec![1, 2]);
    }

    #[test]
    fn append_at_tail() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5)]);
        let outcome = chain.add(section(2, 2, 3, 10)).unwrap();

        assert_eq!(outcome.adjusted, None);
        assert_eq!(flat(&chain), vec![1, 2, 3]);
        assert_eq!(chain.total_distance(), 15);
    }

    #[test]
    fn prepend_at_head() {
        let mut chain = SectionChain::new(vec![section(1, 2, 3, 5)]);
        let outcome = chain.add(section(2, 1, 2, 7)).unwrap();

        assert_eq!(outcome.adjusted, None);
        assert_eq!(flat(&chain), vec![1, 2, 3]);
        assert_eq!(chain.total_distance(), 12);
    }

    // Literal scenario: A(1)-B(2) at distance 5; adding A-C at 3 splits the
    // segment into A-C (3) and C-B (2).
    #[test]
    fn split_upstream() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5)]);
        let outcome = chain.add(section(2, 1, 3, 3)).unwrap();

        assert_eq!(flat(&chain), vec![1, 3, 2]);
        assert_eq!(chain.total_distance(), 5);

        let adjusted = outcome.adjusted.unwrap();
        assert_eq!(adjusted.id(), SectionId(1));
        assert_eq!(adjusted.up(), st(3));
        assert_eq!(adjusted.down(), st(2));
        assert_eq!(adjusted.distance(), meters(2));
        assert_eq!(outcome.inserted.distance(), meters(3));
    }

    #[test]
    fn split_downstream() {
        // A→B at 5; adding C→B at 2 gives A→C (3), C→B (2).
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5)]);
        let outcome = chain.add(section(2, 3, 2, 2)).unwrap();

        assert_eq!(flat(&chain), vec![1, 3, 2]);
        assert_eq!(chain.total_distance(), 5);

        let adjusted = outcome.adjusted.unwrap();
        assert_eq!(adjusted.id(), SectionId(1));
        assert_eq!(adjusted.up(), st(1));
        assert_eq!(adjusted.down(), st(3));
        assert_eq!(adjusted.distance(), meters(3));
    }

    #[test]
    fn split_in_the_middle_of_a_longer_line() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5), section(2, 2, 3, 10)]);
        chain.add(section(3, 2, 4, 4)).unwrap();

        assert_eq!(flat(&chain), vec![1, 2, 4, 3]);
        assert_eq!(chain.total_distance(), 15);
    }

    // Literal scenario: splitting a 5m segment with an equal 5m section is
    // rejected and the chain is unchanged.
    #[test]
    fn split_rejects_equal_distance() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5)]);
        let before = chain.clone();

        let err = chain.add(section(2, 1, 3, 5)).unwrap_err();
        assert_eq!(
            err,
            SectionAddError::SplitTooLong {
                new: meters(5),
                existing: meters(5),
            }
        );
        assert_eq!(chain, before);
    }

    #[test]
    fn split_rejects_longer_distance() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5)]);
        let before = chain.clone();

        let err = chain.add(section(2, 3, 2, 8)).unwrap_err();
        assert!(matches!(err, SectionAddError::SplitTooLong { .. }));
        assert_eq!(chain, before);
    }

    #[test]
    fn reject_when_both_endpoints_present() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5), section(2, 2, 3, 10)]);
        let before = chain.clone();

        // Reversed edge between existing stations
        let err = chain.add(section(3, 3, 1, 4)).unwrap_err();
        assert_eq!(
            err,
            SectionAddError::BothEndpointsPresent {
                up: st(3),
                down: st(1),
            }
        );
        assert_eq!(chain, before);

        // Duplicate of an existing edge
        let err = chain.add(section(3, 1, 2, 5)).unwrap_err();
        assert!(matches!(err, SectionAddError::BothEndpointsPresent { .. }));
        assert_eq!(chain, before);
    }

    #[test]
    fn reject_when_disconnected() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5)]);
        let before = chain.clone();

        let err = chain.add(section(2, 8, 9, 3)).unwrap_err();
        assert_eq!(
            err,
            SectionAddError::Disconnected {
                up: st(8),
                down: st(9),
            }
        );
        assert_eq!(chain, before);
    }

    #[test]
    fn rejection_is_idempotent() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5)]);
        let before = chain.clone();

        let first = chain.add(section(2, 2, 1, 3)).unwrap_err();
        let second = chain.add(section(2, 2, 1, 3)).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(chain, before);
    }

    // Literal scenario: [A-B(5), B-C(10)] — removing B fails, removing C
    // succeeds and leaves [A-B(5)].
    #[test]
    fn remove_tail_drops_last_edge() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5), section(2, 2, 3, 10)]);

        let err = chain.remove(st(2)).unwrap_err();
        assert_eq!(err, SectionRemoveError::NotTerminal(st(2)));

        let removed = chain.remove(st(3)).unwrap();
        assert_eq!(removed, SectionId(2));
        assert_eq!(flat(&chain), vec![1, 2]);
        assert_eq!(chain.total_distance(), 5);
    }

    #[test]
    fn remove_head_is_rejected() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5), section(2, 2, 3, 10)]);
        let before = chain.clone();

        let err = chain.remove(st(1)).unwrap_err();
        assert_eq!(err, SectionRemoveError::NotTerminal(st(1)));
        assert_eq!(chain, before);
    }

    #[test]
    fn remove_unknown_station_is_rejected() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5), section(2, 2, 3, 10)]);

        let err = chain.remove(st(9)).unwrap_err();
        assert_eq!(err, SectionRemoveError::StationNotOnLine(st(9)));
    }

    // Literal scenario: a single-section chain refuses removal entirely.
    #[test]
    fn remove_last_section_is_rejected() {
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5)]);
        let before = chain.clone();

        let err = chain.remove(st(2)).unwrap_err();
        assert_eq!(err, SectionRemoveError::LastSection);
        assert_eq!(chain, before);
    }

    #[test]
    fn no_distance_recombination_on_removal() {
        // Removing the tail drops the 10m edge outright; the 5m edge is
        // untouched.
        let mut chain = SectionChain::new(vec![section(1, 1, 2, 5), section(2, 2, 3, 10)]);
        chain.remove(st(3)).unwrap();
        assert_eq!(chain.sections()[0].distance(), meters(5));
    }

    #[test]
    fn flatten_is_storage_order_independent() {
        let chain = SectionChain::new(vec![
            section(3, 3, 4, 1),
            section(1, 1, 2, 1),
            section(2, 2, 3, 1),
        ]);
        assert_eq!(flat(&chain), vec![1, 2, 3, 4]);
    }

    #[test]
    fn flatten_empty_chain() {
        let chain = SectionChain::default();
        assert_eq!(chain.flatten().unwrap(), Vec::<StationId>::new());
    }

    #[test]
    fn flatten_detects_fork() {
        let chain = SectionChain::new(vec![section(1, 1, 2, 5), section(2, 1, 3, 5)]);
        assert_eq!(chain.flatten(), Err(CorruptChainError::Forked(st(1))));
    }

    #[test]
    fn flatten_detects_merge() {
        let chain = SectionChain::new(vec![section(1, 1, 3, 5), section(2, 2, 3, 5)]);
        assert_eq!(chain.flatten(), Err(CorruptChainError::Merged(st(3))));
    }

    #[test]
    fn flatten_detects_two_fragments() {
        let chain = SectionChain::new(vec![section(1, 1, 2, 5), section(2, 3, 4, 5)]);
        assert_eq!(chain.flatten(), Err(CorruptChainError::AmbiguousHead(2)));
    }

    #[test]
    fn flatten_detects_pure_cycle() {
        // Every station has an incoming edge, so no head exists.
        let chain = SectionChain::new(vec![
            section(1, 1, 2, 5),
            section(2, 2, 3, 5),
            section(3, 3, 1, 5),
        ]);
        assert_eq!(chain.flatten(), Err(CorruptChainError::AmbiguousHead(0)));
    }

    #[test]
    fn flatten_detects_unreachable_cycle() {
        // A valid path plus a detached 2-cycle: the head is unique but the
        // walk cannot cover every section.
        let chain = SectionChain::new(vec![
            section(1, 1, 2, 5),
            section(2, 3, 4, 5),
            section(3, 4, 3, 5),
        ]);
        assert_eq!(chain.flatten(), Err(CorruptChainError::Cycle));
    }

    #[test]
    fn error_display() {
        let err = SectionAddError::SplitTooLong {
            new: meters(5),
            existing: meters(5),
        };
        assert_eq!(
            err.to_string(),
            "new section (5m) must be shorter than the segment it splits (5m)"
        );

        let err = SectionRemoveError::NotTerminal(st(2));
        assert_eq!(
            err.to_string(),
            "station 2 is not the terminal station of the line"
        );

        let err = CorruptChainError::AmbiguousHead(2);
        assert_eq!(err.to_string(), "expected exactly one head station, found 2");
    }
}
