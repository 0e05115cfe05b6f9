pub mod combine;
pub mod error;
pub mod event;
pub mod meet;
pub mod options;
pub mod range;
pub mod table;
pub mod time;
pub mod validation;

pub use combine::{combine_meets, combine_runs, CombinedEntry, CombinedEvent, CombinedResult};
pub use error::ScoringError;
pub use event::{score_phase, PhaseRow, PhaseScore, PhaseScoring, TimeCell};
pub use meet::{score_meet, score_meet_with, EventResult, MeetResult, ScoredEntry};
pub use options::ScoringOptions;
pub use range::AgeRange;
pub use table::{PointsCategory, PointsTable, Scheme, TimeAnchor};
pub use time::{SwimTime, TimeParseError};
pub use validation::validate_points_table;
