use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::error::ScoringError;
use super::event::{score_phase, PhaseScore};
use super::options::ScoringOptions;
use super::table::PointsTable;
use crate::meet::{normalize, EventInfo, MeetInfo, ParsedMeet, Phase, Swimmer};

/// One swimmer's row in one event, all phases folded together.
///
/// A phase is `None` when the swimmer did not swim it, which is distinct
/// from swimming it and scoring zero.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoredEntry {
    pub swimmer: Swimmer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prelim: Option<PhaseScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swimoff: Option<PhaseScore>,
    #[serde(rename = "final", default, skip_serializing_if = "Option::is_none")]
    pub finals: Option<PhaseScore>,
    pub best_points: f64,
}

impl ScoredEntry {
    pub fn new(swimmer: Swimmer) -> Self {
        Self {
            swimmer,
            prelim: None,
            swimoff: None,
            finals: None,
            best_points: 0.0,
        }
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseScore> {
        match phase {
            Phase::Prelim => self.prelim.as_ref(),
            Phase::Swimoff => self.swimoff.as_ref(),
            Phase::Final => self.finals.as_ref(),
        }
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut Option<PhaseScore> {
        match phase {
            Phase::Prelim => &mut self.prelim,
            Phase::Swimoff => &mut self.swimoff,
            Phase::Final => &mut self.finals,
        }
    }

    pub fn points(&self, phase: Phase) -> Option<f64> {
        self.phase(phase).map(|p| p.points)
    }

    pub fn prelim_points(&self) -> Option<f64> {
        self.points(Phase::Prelim)
    }

    pub fn swimoff_points(&self) -> Option<f64> {
        self.points(Phase::Swimoff)
    }

    pub fn final_points(&self) -> Option<f64> {
        self.points(Phase::Final)
    }

    /// True if any phase earned more than zero points
    pub fn has_points(&self) -> bool {
        Phase::ALL
            .iter()
            .any(|&p| self.points(p).is_some_and(|pts| pts > 0.0))
    }

    /// Place used for ordering: the latest phase swum, export place first,
    /// computed place as a fallback.
    pub fn sort_place(&self) -> Option<u32> {
        [Phase::Final, Phase::Swimoff, Phase::Prelim]
            .iter()
            .find_map(|&p| self.phase(p))
            .and_then(|score| score.source_place.or(score.place))
    }

    fn refresh_best(&mut self) {
        self.best_points = Phase::ALL
            .iter()
            .filter_map(|&p| self.points(p))
            .fold(0.0, f64::max);
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventResult {
    pub event: EventInfo,
    pub entries: Vec<ScoredEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MeetResult {
    pub meet: MeetInfo,
    pub events: Vec<EventResult>,
}

impl MeetResult {
    /// Look an event up by name, ignoring case and spacing
    pub fn event(&self, name: &str) -> Option<&EventResult> {
        let key = normalize(name);
        self.events.iter().find(|e| e.event.key() == key)
    }
}

/// Score a meet with default options.
pub fn score_meet(meet: &ParsedMeet, table: &PointsTable) -> (MeetResult, Vec<ScoringError>) {
    score_meet_with(meet, table, &ScoringOptions::default())
}

/// Score every individual event of a meet.
///
/// Relay events are dropped before scoring. Each phase is ranked on its
/// own, then a swimmer's phases are folded into one row whose
/// `best_points` is the best phase. Events keep the meet's order; rows are
/// ordered by best points, then place.
pub fn score_meet_with(
    meet: &ParsedMeet,
    table: &PointsTable,
    options: &ScoringOptions,
) -> (MeetResult, Vec<ScoringError>) {
    let mut errors: Vec<ScoringError> = Vec::new();
    let mut events = Vec::with_capacity(meet.events.len());

    for parsed in &meet.events {
        if parsed.info.is_relay(&options.relay_patterns) {
            tracing::debug!(
                meet = %meet.info.name,
                event = %parsed.info.display_name(),
                "skipping relay event"
            );
            continue;
        }

        let mut rows: Vec<ScoredEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut missing_reported = false;

        for phase in Phase::ALL {
            let entries = parsed.phase_entries(phase);
            if entries.is_empty() {
                continue;
            }

            let scoring = score_phase(&parsed.info, phase, &entries, table, options);
            for error in scoring.errors {
                // One missing category per event is enough
                if error.is_config() {
                    if missing_reported {
                        continue;
                    }
                    missing_reported = true;
                }
                errors.push(error);
            }

            for row in scoring.rows {
                let idx = *index
                    .entry(row.swimmer.identity_key())
                    .or_insert_with(|| {
                        rows.push(ScoredEntry::new(row.swimmer.clone()));
                        rows.len() - 1
                    });

                // score_phase has already collapsed duplicate swims
                *rows[idx].phase_mut(phase) = Some(row.score);
            }
        }

        for row in &mut rows {
            row.refresh_best();
        }
        rows.sort_by(compare_entries);

        events.push(EventResult {
            event: parsed.info.clone(),
            entries: rows,
        });
    }

    tracing::debug!(
        meet = %meet.info.name,
        events = events.len(),
        errors = errors.len(),
        "scored meet"
    );

    (
        MeetResult {
            meet: meet.info.clone(),
            events,
        },
        errors,
    )
}

/// Best points descending, then place ascending (unplaced last), then name.
pub(crate) fn compare_entries(a: &ScoredEntry, b: &ScoredEntry) -> Ordering {
    b.best_points
        .total_cmp(&a.best_points)
        .then_with(|| compare_places(a.sort_place(), b.sort_place()))
        .then_with(|| a.swimmer.name.cmp(&b.swimmer.name))
}

pub(crate) fn compare_places(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
