use glob::Pattern;

/// Per-run scoring switches that sit next to the points table
#[derive(Debug, Clone, Default)]
pub struct ScoringOptions {
    /// Extra event name patterns that mark an event as a relay
    pub relay_patterns: Vec<Pattern>,
    /// Let exhibition swims take places and points
    pub include_exhibition: bool,
}
