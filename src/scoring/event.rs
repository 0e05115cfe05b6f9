use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::error::ScoringError;
use super::options::ScoringOptions;
use super::table::PointsTable;
use super::time::SwimTime;
use crate::meet::{EventInfo, Phase, RawEntry, Swimmer};

/// A phase time as it should be shown: the parsed time, or the raw token
/// when it could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeCell {
    Parsed(SwimTime),
    Unparseable(String),
}

impl TimeCell {
    pub fn time(&self) -> Option<&SwimTime> {
        match self {
            TimeCell::Parsed(t) => Some(t),
            TimeCell::Unparseable(_) => None,
        }
    }
}

impl fmt::Display for TimeCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeCell::Parsed(t) => write!(f, "{}", t),
            TimeCell::Unparseable(raw) => write!(f, "{}", raw),
        }
    }
}

/// Outcome of one phase for one swimmer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PhaseScore {
    pub time: TimeCell,
    /// Place computed from the times; none for sentinels, unreadable
    /// times and exhibition swims
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<u32>,
    /// Place reported by the export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_place: Option<u32>,
    pub points: f64,
    #[serde(default)]
    pub exhibition: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseRow {
    pub swimmer: Swimmer,
    pub score: PhaseScore,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseScoring {
    pub rows: Vec<PhaseRow>,
    pub errors: Vec<ScoringError>,
}

/// Rank one phase of one event and award points.
///
/// Valid times are placed fastest first using standard competition
/// ranking: tied times share the place and its points, and the next time
/// takes the place it would have had without the tie (1, 1, 3).
/// Everything else stays in the output with zero points. Placed rows come
/// first in place order, the rest follow in input order.
pub fn score_phase(
    event: &EventInfo,
    phase: Phase,
    entries: &[&RawEntry],
    table: &PointsTable,
    options: &ScoringOptions,
) -> PhaseScoring {
    let mut errors = Vec::new();
    if entries.is_empty() {
        return PhaseScoring::default();
    }

    let event_name = event.display_name();
    let scheme = match table.category_for(event) {
        Some(category) => Some(category.scheme()),
        None => {
            tracing::warn!(event = %event_name, "no points category, event scores zero");
            errors.push(ScoringError::MissingCategory {
                event: event_name.clone(),
            });
            None
        }
    };

    let mut rows: Vec<Option<PhaseRow>> = Vec::with_capacity(entries.len());
    let mut race_times: Vec<Option<Duration>> = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let time = if entry.dq {
            TimeCell::Parsed(SwimTime::Disqualified)
        } else {
            match SwimTime::parse(&entry.time) {
                Ok(t) => TimeCell::Parsed(t),
                Err(e) => {
                    tracing::warn!(
                        event = %event_name,
                        %phase,
                        swimmer = %entry.swimmer.name,
                        "unreadable time: {}",
                        e
                    );
                    errors.push(ScoringError::InvalidTime {
                        field: "time".to_string(),
                        event: event_name.clone(),
                        phase,
                        swimmer: entry.swimmer.name.clone(),
                        value: e.value,
                        reason: e.reason,
                    });
                    TimeCell::Unparseable(entry.time.clone())
                }
            }
        };

        let competes = !entry.exhibition || options.include_exhibition;
        race_times.push(match (competes, time.time()) {
            (true, Some(SwimTime::Valid(d))) => Some(*d),
            _ => None,
        });

        rows.push(Some(PhaseRow {
            swimmer: entry.swimmer.clone(),
            score: PhaseScore {
                time,
                place: None,
                source_place: entry.place,
                points: 0.0,
                exhibition: entry.exhibition,
            },
        }));
    }

    // A swimmer listed twice keeps only the faster swim, so the other
    // copy never takes a place
    let mut kept: HashMap<String, usize> = HashMap::new();
    for (i, entry) in entries.iter().enumerate() {
        let key = entry.swimmer.identity_key();
        let j = match kept.get(&key).copied() {
            Some(j) => j,
            None => {
                kept.insert(key, i);
                continue;
            }
        };
        let faster = match (race_times[i], race_times[j]) {
            (Some(a), Some(b)) => a < b,
            (Some(_), None) => true,
            _ => false,
        };
        let dropped = if faster {
            kept.insert(key, i);
            j
        } else {
            i
        };
        tracing::debug!(
            event = %event_name,
            %phase,
            swimmer = %entry.swimmer.name,
            "duplicate swim, keeping the faster one"
        );
        rows[dropped] = None;
        race_times[dropped] = None;
    }

    let mut ranked: Vec<(usize, Duration)> = race_times
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.map(|d| (i, d)))
        .collect();
    // Equal times keep input order
    ranked.sort_by_key(|&(i, d)| (d, i));

    if let Some(ref scheme) = scheme {
        let mut place = 0;
        let mut previous: Option<Duration> = None;
        for (position, &(i, d)) in ranked.iter().enumerate() {
            if previous != Some(d) {
                place = position as u32 + 1;
                previous = Some(d);
            }
            if let Some(row) = rows[i].as_mut() {
                row.score.place = Some(place);
                row.score.points = scheme.points(place, &SwimTime::Valid(d));
            }
        }
    }

    let mut ordered = Vec::with_capacity(rows.len());
    if scheme.is_some() {
        ordered.extend(ranked.iter().filter_map(|&(i, _)| rows[i].take()));
    }
    ordered.extend(rows.into_iter().flatten());

    let placed = ordered.iter().filter(|r| r.score.place.is_some()).count();
    tracing::debug!(
        event = %event_name,
        %phase,
        entries = ordered.len(),
        placed,
        "scored phase"
    );

    PhaseScoring {
        rows: ordered,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meet::{Course, Gender, Stroke};
    use crate::scoring::PointsCategory;

    fn event() -> EventInfo {
        EventInfo {
            number: 1,
            name: "50 Free Boys 10U".to_string(),
            gender: Gender::Male,
            stroke: Some(Stroke::Freestyle),
            distance: Some(50),
            course: Some(Course::ShortCourseYards),
            min_age: None,
            max_age: Some(10),
            relay: false,
        }
    }

    fn table(points: &[f64]) -> PointsTable {
        PointsTable {
            categories: vec![PointsCategory {
                name: "Test".to_string(),
                gender: None,
                ages: None,
                events: None,
                places: Some(points.to_vec()),
                time_standard: None,
            }],
        }
    }

    fn entry(name: &str, time: &str) -> RawEntry {
        RawEntry {
            swimmer: Swimmer {
                name: name.to_string(),
                age: Some(10),
                team: "PCS".to_string(),
                id: None,
            },
            phase: Phase::Final,
            time: time.to_string(),
            place: None,
            dq: false,
            exhibition: false,
            heat: None,
            lane: None,
        }
    }

    fn score(entries: &[RawEntry], points: &[f64]) -> PhaseScoring {
        let refs: Vec<&RawEntry> = entries.iter().collect();
        score_phase(
            &event(),
            Phase::Final,
            &refs,
            &table(points),
            &ScoringOptions::default(),
        )
    }

    fn summary(scoring: &PhaseScoring) -> Vec<(String, Option<u32>, f64)> {
        scoring
            .rows
            .iter()
            .map(|r| (r.swimmer.name.clone(), r.score.place, r.score.points))
            .collect()
    }

    #[test]
    fn test_ranks_fastest_first() {
        let entries = vec![entry("C", "31.00"), entry("A", "28.50"), entry("B", "29.10")];
        let scoring = score(&entries, &[9.0, 7.0, 6.0]);
        assert!(scoring.errors.is_empty());
        assert_eq!(
            summary(&scoring),
            vec![
                ("A".to_string(), Some(1), 9.0),
                ("B".to_string(), Some(2), 7.0),
                ("C".to_string(), Some(3), 6.0),
            ]
        );
    }

    #[test]
    fn test_tie_shares_place_and_skips_next() {
        let entries = vec![entry("A", "28.50"), entry("B", "28.50"), entry("C", "29.10")];
        let scoring = score(&entries, &[9.0, 7.0, 6.0]);
        assert_eq!(
            summary(&scoring),
            vec![
                ("A".to_string(), Some(1), 9.0),
                ("B".to_string(), Some(1), 9.0),
                ("C".to_string(), Some(3), 6.0),
            ]
        );
    }

    #[test]
    fn test_sentinels_kept_with_zero_points() {
        let mut dq = entry("D", "27.00");
        dq.dq = true;
        let entries = vec![
            entry("A", "28.50"),
            dq,
            entry("N", "NS"),
            entry("S", "SCR"),
            entry("T", "NT"),
        ];
        let scoring = score(&entries, &[9.0, 7.0, 6.0, 5.0, 4.0]);
        assert!(scoring.errors.is_empty());
        let rows = summary(&scoring);
        assert_eq!(rows[0], ("A".to_string(), Some(1), 9.0));
        for (name, place, points) in &rows[1..] {
            assert_eq!(*place, None, "{} should be unplaced", name);
            assert_eq!(*points, 0.0);
        }
        assert_eq!(scoring.rows[1].score.time, TimeCell::Parsed(SwimTime::Disqualified));
        assert_eq!(scoring.rows[1].score.time.to_string(), "DQ");
    }

    #[test]
    fn test_empty_phase() {
        let scoring = score(&[], &[9.0]);
        assert!(scoring.rows.is_empty());
        assert!(scoring.errors.is_empty());
    }

    #[test]
    fn test_fewer_entries_than_places() {
        let entries = vec![entry("A", "28.50")];
        let scoring = score(&entries, &[9.0, 7.0, 6.0, 5.0]);
        assert_eq!(summary(&scoring), vec![("A".to_string(), Some(1), 9.0)]);
    }

    #[test]
    fn test_places_past_table_score_zero() {
        let entries = vec![entry("A", "28.50"), entry("B", "29.00"), entry("C", "30.00")];
        let scoring = score(&entries, &[9.0, 7.0]);
        let rows = summary(&scoring);
        assert_eq!(rows[2], ("C".to_string(), Some(3), 0.0));
    }

    #[test]
    fn test_bad_time_isolated() {
        let entries = vec![entry("A", "28.50"), entry("B", "2x.11"), entry("C", "29.10")];
        let scoring = score(&entries, &[9.0, 7.0, 6.0]);

        assert_eq!(scoring.errors.len(), 1);
        match &scoring.errors[0] {
            ScoringError::InvalidTime {
                field,
                event,
                swimmer,
                value,
                ..
            } => {
                assert_eq!(field, "time");
                assert_eq!(event, "50 Free Boys 10U");
                assert_eq!(swimmer, "B");
                assert_eq!(value, "2x.11");
            }
            other => panic!("unexpected error {:?}", other),
        }

        assert_eq!(
            summary(&scoring),
            vec![
                ("A".to_string(), Some(1), 9.0),
                ("C".to_string(), Some(2), 7.0),
                ("B".to_string(), None, 0.0),
            ]
        );
        assert_eq!(
            scoring.rows[2].score.time,
            TimeCell::Unparseable("2x.11".to_string())
        );
    }

    #[test]
    fn test_missing_category_scores_zero() {
        let entries = vec![entry("A", "28.50"), entry("B", "29.10")];
        let refs: Vec<&RawEntry> = entries.iter().collect();
        let scoring = score_phase(
            &event(),
            Phase::Final,
            &refs,
            &PointsTable { categories: vec![] },
            &ScoringOptions::default(),
        );

        assert_eq!(scoring.errors.len(), 1);
        assert!(scoring.errors[0].is_config());
        assert_eq!(scoring.rows.len(), 2);
        assert!(scoring.rows.iter().all(|r| r.score.points == 0.0));
        assert!(scoring.rows.iter().all(|r| r.score.place.is_none()));
    }

    #[test]
    fn test_exhibition_does_not_take_a_place() {
        let mut exhibition = entry("X", "27.00");
        exhibition.exhibition = true;
        let entries = vec![exhibition, entry("A", "28.50"), entry("B", "29.10")];

        let scoring = score(&entries, &[9.0, 7.0, 6.0]);
        assert_eq!(
            summary(&scoring),
            vec![
                ("A".to_string(), Some(1), 9.0),
                ("B".to_string(), Some(2), 7.0),
                ("X".to_string(), None, 0.0),
            ]
        );
        assert!(scoring.rows[2].score.exhibition);
    }

    #[test]
    fn test_exhibition_included_when_enabled() {
        let mut exhibition = entry("X", "27.00");
        exhibition.exhibition = true;
        let entries = vec![exhibition, entry("A", "28.50")];
        let refs: Vec<&RawEntry> = entries.iter().collect();
        let options = ScoringOptions {
            include_exhibition: true,
            ..Default::default()
        };

        let scoring = score_phase(&event(), Phase::Final, &refs, &table(&[9.0, 7.0]), &options);
        assert_eq!(scoring.rows[0].swimmer.name, "X");
        assert_eq!(scoring.rows[0].score.points, 9.0);
    }

    #[test]
    fn test_duplicate_swim_does_not_take_a_place() {
        let entries = vec![entry("A", "28.50"), entry("A", "28.00"), entry("B", "29.00")];
        let scoring = score(&entries, &[9.0, 7.0, 6.0]);
        assert_eq!(
            summary(&scoring),
            vec![
                ("A".to_string(), Some(1), 9.0),
                ("B".to_string(), Some(2), 7.0),
            ]
        );
        assert_eq!(scoring.rows[0].score.time.to_string(), "28.00");
    }

    #[test]
    fn test_duplicate_swim_prefers_valid_time() {
        let entries = vec![entry("A", "DQ"), entry("B", "29.00"), entry("A", "30.00")];
        let scoring = score(&entries, &[9.0, 7.0, 6.0]);
        assert_eq!(
            summary(&scoring),
            vec![
                ("B".to_string(), Some(1), 9.0),
                ("A".to_string(), Some(2), 7.0),
            ]
        );
    }

    #[test]
    fn test_source_place_carried() {
        let mut a = entry("A", "28.50");
        a.place = Some(4);
        let scoring = score(&[a], &[9.0]);
        assert_eq!(scoring.rows[0].score.source_place, Some(4));
        assert_eq!(scoring.rows[0].score.place, Some(1));
    }
}
