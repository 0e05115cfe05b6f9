use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::ScoringError;
use super::meet::{compare_entries, compare_places, MeetResult, ScoredEntry};

/// A scored row tagged with the meet it came from
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CombinedEntry {
    pub meet: String,
    #[serde(flatten)]
    pub entry: ScoredEntry,
}

/// The same event gathered across meets
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CombinedEvent {
    /// Normalised event name shared by every meet in the group
    pub key: String,
    /// Event name as first seen
    pub name: String,
    pub entries: Vec<CombinedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CombinedResult {
    pub events: Vec<CombinedEvent>,
}

impl CombinedResult {
    pub fn event(&self, key: &str) -> Option<&CombinedEvent> {
        let key = crate::meet::normalize(key);
        self.events.iter().find(|e| e.key == key)
    }
}

/// Merge several meets into one result.
///
/// Events with the same normalised name are grouped together, in the order
/// they are first seen. Inside a group rows are ordered by best points,
/// then meet name, then place. Groups where nobody scored a point are
/// left out.
pub fn combine_meets(results: &[MeetResult]) -> CombinedResult {
    let mut events: Vec<CombinedEvent> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in results {
        for event_result in &result.events {
            let key = event_result.event.key();
            let idx = *index.entry(key.clone()).or_insert_with(|| {
                events.push(CombinedEvent {
                    key,
                    name: event_result.event.display_name(),
                    entries: Vec::new(),
                });
                events.len() - 1
            });

            events[idx]
                .entries
                .extend(event_result.entries.iter().map(|entry| CombinedEntry {
                    meet: result.meet.name.clone(),
                    entry: entry.clone(),
                }));
        }
    }

    let total = events.len();
    events.retain(|group| group.entries.iter().any(|e| e.entry.has_points()));
    tracing::debug!(
        meets = results.len(),
        groups = total,
        kept = events.len(),
        "combined meets"
    );

    for group in &mut events {
        group.entries.sort_by(|a, b| {
            b.entry
                .best_points
                .total_cmp(&a.entry.best_points)
                .then_with(|| a.meet.cmp(&b.meet))
                .then_with(|| compare_places(a.entry.sort_place(), b.entry.sort_place()))
                .then_with(|| compare_entries(&a.entry, &b.entry))
        });
    }

    CombinedResult { events }
}

/// Combine scored meets and pass their errors through unchanged.
pub fn combine_runs(runs: &[(MeetResult, Vec<ScoringError>)]) -> (CombinedResult, Vec<ScoringError>) {
    let results: Vec<MeetResult> = runs.iter().map(|(result, _)| result.clone()).collect();
    let errors = runs
        .iter()
        .flat_map(|(_, errors)| errors.iter().cloned())
        .collect();
    (combine_meets(&results), errors)
}
