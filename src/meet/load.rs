use super::types::ParsedMeet;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a parsed meet from the JSON emitted by the export parser
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened
/// - The JSON does not describe a meet
pub fn load_parsed_meet(path: &Path) -> Result<ParsedMeet> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open meet file at {}", path.display()))?;

    let meet: ParsedMeet = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse meet: invalid JSON in {}", path.display()))?;

    tracing::debug!(
        meet = %meet.info.name,
        events = meet.events.len(),
        "loaded meet from {}",
        path.display()
    );

    Ok(meet)
}
