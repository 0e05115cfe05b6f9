use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::scoring::{validate_points_table, PointsTable, ScoringOptions};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub points: PointsTable,

    /// Extra event name globs treated as relays, on top of the relay flag
    /// and relay stroke codes in the meet file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_patterns: Option<Vec<String>>,

    #[serde(default)]
    pub include_exhibition: bool,
}

impl Config {
    /// Compile the run options. Assumes `validate_config` has passed, but
    /// still reports a bad pattern instead of panicking.
    pub fn scoring_options(&self) -> Result<ScoringOptions> {
        let relay_patterns = self
            .relay_patterns
            .iter()
            .flatten()
            .map(|p| Pattern::new(p).with_context(|| format!("Invalid relay pattern '{}'", p)))
            .collect::<Result<Vec<_>>>()?;

        Ok(ScoringOptions {
            relay_patterns,
            include_exhibition: self.include_exhibition,
        })
    }
}

/// Validate the whole config, collecting every problem.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = match validate_points_table(&config.points) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    for (i, pattern) in config.relay_patterns.iter().flatten().enumerate() {
        if pattern.trim().is_empty() {
            errors.push(format!("relay_patterns[{}]: must not be empty", i));
        } else if let Err(e) = Pattern::new(pattern) {
            errors.push(format!(
                "relay_patterns[{}]: invalid pattern '{}' - {}",
                i, pattern, e
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meet::Gender;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = serde_saphyr::from_str("include_exhibition: true\n").unwrap();
        assert_eq!(config.points, PointsTable::default());
        assert!(config.relay_patterns.is_none());
        assert!(config.include_exhibition);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
points:
  categories:
    - name: "Girls 10 & Under"
      gender: F
      ages: "<=10"
      places: [9, 7, 6, 5, 4, 3, 2, 1]
    - name: "Open"
      time_standard:
        - { time: "25.00", points: 1000 }
        - { time: "35.00", points: 500 }
relay_patterns:
  - "*Medley*"
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.points.categories.len(), 2);
        assert_eq!(config.points.categories[0].gender, Some(Gender::Female));
        assert_eq!(
            config.points.categories[1].time_standard.as_ref().map(|a| a.len()),
            Some(2)
        );
        assert!(!config.include_exhibition);
        assert!(validate_config(&config).is_ok());

        let options = config.scoring_options().unwrap();
        assert_eq!(options.relay_patterns.len(), 1);
        assert!(options.relay_patterns[0].matches("Boys 200 Medley"));
    }

    #[test]
    fn test_unknown_category_field_rejected() {
        let yaml = r#"
points:
  categories:
    - name: "Open"
      places: [1]
      bonus: 5
"#;
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_validate_collects_table_and_pattern_errors() {
        let config = Config {
            points: PointsTable { categories: vec![] },
            relay_patterns: Some(vec!["[oops".to_string(), " ".to_string()]),
            include_exhibition: false,
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("points.categories"));
        assert!(errors[1].starts_with("relay_patterns[0]"));
        assert!(errors[2].starts_with("relay_patterns[1]"));
    }

    #[test]
    fn test_scoring_options_reports_bad_pattern() {
        let config = Config {
            relay_patterns: Some(vec!["[oops".to_string()]),
            ..Config::default()
        };
        assert!(config.scoring_options().is_err());
    }
}
