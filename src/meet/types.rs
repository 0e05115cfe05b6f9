use chrono::NaiveDate;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum Gender {
    #[serde(rename = "M", alias = "male")]
    Male,
    #[serde(rename = "F", alias = "female")]
    Female,
    #[serde(rename = "X", alias = "mixed")]
    Mixed,
    #[default]
    #[serde(rename = "U")]
    Unknown,
}

impl Gender {
    fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Men's",
            Gender::Female => "Women's",
            Gender::Mixed | Gender::Unknown => "Mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Stroke {
    #[serde(rename = "FR")]
    Freestyle,
    #[serde(rename = "BK")]
    Backstroke,
    #[serde(rename = "BR")]
    Breaststroke,
    #[serde(rename = "FL")]
    Butterfly,
    #[serde(rename = "IM")]
    IndividualMedley,
    #[serde(rename = "MR")]
    MedleyRelay,
    #[serde(rename = "FRR")]
    FreestyleRelay,
}

impl Stroke {
    pub fn is_relay(&self) -> bool {
        matches!(self, Stroke::MedleyRelay | Stroke::FreestyleRelay)
    }

    fn label(&self) -> &'static str {
        match self {
            Stroke::Freestyle => "Freestyle",
            Stroke::Backstroke => "Backstroke",
            Stroke::Breaststroke => "Breaststroke",
            Stroke::Butterfly => "Butterfly",
            Stroke::IndividualMedley => "Individual Medley",
            Stroke::MedleyRelay => "Medley Relay",
            Stroke::FreestyleRelay => "Freestyle Relay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Course {
    #[serde(rename = "SCY", alias = "Y")]
    ShortCourseYards,
    #[serde(rename = "SCM", alias = "S")]
    ShortCourseMeters,
    #[serde(rename = "LCM", alias = "L")]
    LongCourseMeters,
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Course::ShortCourseYards => "SCY",
            Course::ShortCourseMeters => "SCM",
            Course::LongCourseMeters => "LCM",
        };
        write!(f, "{}", code)
    }
}

/// A round within an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[serde(alias = "prelims")]
    Prelim,
    #[serde(alias = "swim_off", alias = "swim-off")]
    Swimoff,
    #[serde(alias = "finals")]
    Final,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Prelim, Phase::Swimoff, Phase::Final];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Prelim => "prelim",
            Phase::Swimoff => "swimoff",
            Phase::Final => "final",
        };
        write!(f, "{}", name)
    }
}

/// Swimmer identity as carried by the meet export
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Swimmer {
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub team: String,
    /// Per-meet swimmer id from the export, when the parser provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Swimmer {
    /// Key identifying the same swimmer across the phases of one event.
    /// The export id wins; otherwise the normalised name plus team code.
    pub fn identity_key(&self) -> String {
        match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => format!("id:{}", id),
            _ => format!(
                "name:{}|{}",
                normalize(&self.name),
                self.team.trim().to_lowercase()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MeetInfo {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventInfo {
    pub number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    #[serde(default)]
    pub relay: bool,
}

impl EventInfo {
    /// Event name, composed from the event attributes when the export
    /// left it blank (e.g. "Women's 11-12 100 Butterfly (SCY)").
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.trim().to_string();
        }

        let mut parts = vec![self.gender.label().to_string()];
        if let Some(group) = self.age_group_label() {
            parts.push(group);
        }
        if let Some(distance) = self.distance {
            parts.push(distance.to_string());
        }
        if let Some(stroke) = self.stroke {
            parts.push(stroke.label().to_string());
        }
        if let Some(course) = self.course {
            parts.push(format!("({})", course));
        }
        parts.join(" ")
    }

    /// "10 & Under", "11-12", "15 & Over", or None for open events
    pub fn age_group_label(&self) -> Option<String> {
        match (self.min_age.filter(|&a| a > 0), self.max_age.filter(|&a| a < 109)) {
            (None, Some(max)) => Some(format!("{} & Under", max)),
            (Some(min), None) => Some(format!("{} & Over", min)),
            (Some(min), Some(max)) => Some(format!("{}-{}", min, max)),
            (None, None) => None,
        }
    }

    /// Age used to select a points category: the upper bound of the age
    /// group when there is one, otherwise the lower bound.
    pub fn age_bound(&self) -> Option<u32> {
        self.max_age
            .filter(|&a| a < 109)
            .or(self.min_age.filter(|&a| a > 0))
    }

    /// Grouping key for combining the same event across meets
    pub fn key(&self) -> String {
        normalize(&self.display_name())
    }

    /// Relay events are recognised by flag, by relay stroke code, by
    /// "relay" in the name, or by any of the extra name patterns.
    pub fn is_relay(&self, patterns: &[Pattern]) -> bool {
        if self.relay || self.stroke.is_some_and(|s| s.is_relay()) {
            return true;
        }
        let name = self.display_name();
        name.to_lowercase().contains("relay") || patterns.iter().any(|p| p.matches(&name))
    }
}

/// One swimmer's swim in one phase of one event, as exported
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawEntry {
    pub swimmer: Swimmer,
    pub phase: Phase,
    /// Raw time token; parsed during scoring so one bad token cannot sink
    /// the whole event
    #[serde(default)]
    pub time: String,
    /// Place as reported by the export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<u32>,
    #[serde(default)]
    pub dq: bool,
    #[serde(default)]
    pub exhibition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ParsedEvent {
    #[serde(flatten)]
    pub info: EventInfo,
    #[serde(default)]
    pub entries: Vec<RawEntry>,
}

impl ParsedEvent {
    pub fn phase_entries(&self, phase: Phase) -> Vec<&RawEntry> {
        self.entries.iter().filter(|e| e.phase == phase).collect()
    }
}

/// A meet as handed over by the export parser
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ParsedMeet {
    #[serde(flatten)]
    pub info: MeetInfo,
    #[serde(default)]
    pub events: Vec<ParsedEvent>,
}

/// Trim, collapse inner whitespace, lowercase
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
