use glob::Pattern;
use serde::{Deserialize, Serialize};

use super::error::ScoringError;
use super::range::AgeRange;
use super::time::SwimTime;
use crate::meet::{EventInfo, Gender};

/// Points table.
///
/// An ordered list of categories; the first category matching an event
/// decides how that event scores. Each category awards points either by
/// place or by time against a time standard.
///
/// Example YAML:
/// ```yaml
/// categories:
///   - name: "8 & Under"
///     ages: "<=8"
///     places: [9, 7, 6, 5, 4, 3, 2, 1]
///   - name: "Women's 50 free"
///     gender: F
///     events: ["*50 Free*"]
///     time_standard:
///       - { time: "25.00", points: 1000 }
///       - { time: "35.00", points: 500 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PointsTable {
    pub categories: Vec<PointsCategory>,
}

impl Default for PointsTable {
    fn default() -> Self {
        Self {
            categories: vec![PointsCategory {
                name: "Individual".to_string(),
                gender: None,
                ages: None,
                events: None,
                places: Some(vec![9.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]),
                time_standard: None,
            }],
        }
    }
}

/// One scoring rule set and the events it applies to.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PointsCategory {
    pub name: String,

    /// Event gender this category applies to (M, F, X)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    /// Age range matched against the event's age group bound
    /// Example: "<=10", "11-12", ">=15"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ages: Option<String>,

    /// Glob patterns matched against the event name
    /// Example: ["*Free*", "*IM*"]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,

    /// Points by place, first entry is 1st place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub places: Option<Vec<f64>>,

    /// Time/points anchors, interpolated linearly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_standard: Option<Vec<TimeAnchor>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TimeAnchor {
    pub time: String,
    pub points: f64,
}

/// How a resolved category turns a place or a time into points
#[derive(Debug, Clone, PartialEq)]
pub enum Scheme<'a> {
    Places(&'a [f64]),
    /// (seconds, points) sorted fastest first
    TimeStandard(Vec<(f64, f64)>),
}

impl PointsTable {
    pub fn category_for(&self, event: &EventInfo) -> Option<&PointsCategory> {
        self.categories.iter().find(|c| c.matches(event))
    }

    /// Points for a place in the given event; 0 past the scored places.
    pub fn points_for_place(&self, event: &EventInfo, place: u32) -> Result<f64, ScoringError> {
        let category = self
            .category_for(event)
            .ok_or_else(|| ScoringError::MissingCategory {
                event: event.display_name(),
            })?;
        match category.scheme() {
            Scheme::Places(places) => Ok(place_points(places, place)),
            Scheme::TimeStandard(_) => Ok(0.0),
        }
    }
}

impl PointsCategory {
    pub fn matches(&self, event: &EventInfo) -> bool {
        if let Some(gender) = self.gender {
            let event_gender = match event.gender {
                Gender::Unknown => Gender::Mixed,
                g => g,
            };
            if gender != event_gender {
                return false;
            }
        }

        if let Some(ref ages) = self.ages {
            let Ok(range) = AgeRange::parse(ages) else {
                return false;
            };
            match event.age_bound() {
                Some(age) if range.matches(age) => {}
                _ => return false,
            }
        }

        if let Some(ref patterns) = self.events {
            let name = event.display_name();
            let matched = patterns
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .any(|p| p.matches(&name));
            if !matched {
                return false;
            }
        }

        true
    }

    /// Places win when both are configured; validation rejects that anyway.
    pub fn scheme(&self) -> Scheme<'_> {
        if let Some(ref places) = self.places {
            return Scheme::Places(places);
        }
        let mut anchors: Vec<(f64, f64)> = self
            .time_standard
            .iter()
            .flatten()
            .filter_map(|a| {
                SwimTime::parse(&a.time)
                    .ok()
                    .and_then(|t| t.seconds())
                    .map(|secs| (secs, a.points))
            })
            .collect();
        anchors.sort_by(|a, b| a.0.total_cmp(&b.0));
        Scheme::TimeStandard(anchors)
    }
}

impl Scheme<'_> {
    /// Points for one swim. Sentinel times never score.
    pub fn points(&self, place: u32, time: &SwimTime) -> f64 {
        let Some(seconds) = time.seconds() else {
            return 0.0;
        };
        match self {
            Scheme::Places(places) => place_points(places, place),
            Scheme::TimeStandard(anchors) => interpolate(anchors, seconds),
        }
    }
}

fn place_points(places: &[f64], place: u32) -> f64 {
    if place == 0 {
        return 0.0;
    }
    places.get(place as usize - 1).copied().unwrap_or(0.0)
}

/// Linear interpolation over the anchors. Faster than the fastest anchor
/// earns the top points; slower than the slowest extrapolates along the
/// last segment. Never negative.
fn interpolate(anchors: &[(f64, f64)], seconds: f64) -> f64 {
    let Some(&(fastest, top)) = anchors.first() else {
        return 0.0;
    };
    if seconds <= fastest {
        return top.max(0.0);
    }
    if anchors.len() == 1 {
        return 0.0;
    }

    let segment = anchors
        .windows(2)
        .find(|w| seconds <= w[1].0)
        .unwrap_or(&anchors[anchors.len() - 2..]);
    let (t0, p0) = segment[0];
    let (t1, p1) = segment[1];
    let points = if t1 == t0 {
        p1
    } else {
        p0 + (seconds - t0) * (p1 - p0) / (t1 - t0)
    };
    points.max(0.0)
}
