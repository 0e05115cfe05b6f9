pub mod load;
pub mod types;

pub use load::load_parsed_meet;
pub use types::{
    normalize, Course, EventInfo, Gender, MeetInfo, ParsedEvent, ParsedMeet, Phase, RawEntry,
    Stroke, Swimmer,
};
