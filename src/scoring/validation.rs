use glob::Pattern;
use std::collections::HashSet;

use super::range::AgeRange;
use super::table::PointsTable;
use super::time::SwimTime;

/// Validate a points table at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_points_table(table: &PointsTable) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if table.categories.is_empty() {
        errors.push("points.categories: at least one category is required".to_string());
    }

    let mut seen_names = HashSet::new();
    for (i, category) in table.categories.iter().enumerate() {
        let path = format!("points.categories[{}]", i);

        if category.name.trim().is_empty() {
            errors.push(format!("{}.name: must not be empty", path));
        } else if !seen_names.insert(category.name.trim().to_lowercase()) {
            errors.push(format!("{}.name: duplicate category '{}'", path, category.name));
        }

        if let Some(ref ages) = category.ages {
            if let Err(e) = AgeRange::parse(ages) {
                errors.push(format!("{}.{}", path, e));
            }
        }

        if let Some(ref patterns) = category.events {
            for (j, pattern) in patterns.iter().enumerate() {
                if let Err(e) = Pattern::new(pattern) {
                    errors.push(format!(
                        "{}.events[{}]: invalid pattern '{}' - {}",
                        path, j, pattern, e
                    ));
                }
            }
        }

        match (&category.places, &category.time_standard) {
            (None, None) => errors.push(format!(
                "{}: one of 'places' or 'time_standard' is required",
                path
            )),
            (Some(_), Some(_)) => errors.push(format!(
                "{}: 'places' and 'time_standard' are mutually exclusive",
                path
            )),
            (Some(places), None) => {
                if places.is_empty() {
                    errors.push(format!("{}.places: must list at least one place", path));
                }
                for (j, points) in places.iter().enumerate() {
                    if !points.is_finite() || *points < 0.0 {
                        errors.push(format!("{}.places[{}]: must be non-negative", path, j));
                    }
                }
            }
            (None, Some(anchors)) => {
                if anchors.len() < 2 {
                    errors.push(format!(
                        "{}.time_standard: needs at least two anchors",
                        path
                    ));
                }
                let mut seen_times = HashSet::new();
                for (j, anchor) in anchors.iter().enumerate() {
                    match SwimTime::parse(&anchor.time) {
                        Ok(SwimTime::Valid(d)) => {
                            if !seen_times.insert(d) {
                                errors.push(format!(
                                    "{}.time_standard[{}].time: duplicate time '{}'",
                                    path, j, anchor.time
                                ));
                            }
                        }
                        Ok(_) => errors.push(format!(
                            "{}.time_standard[{}].time: '{}' is not a swim time",
                            path, j, anchor.time
                        )),
                        Err(e) => errors.push(format!(
                            "{}.time_standard[{}].time: {}",
                            path, j, e
                        )),
                    }
                    if !anchor.points.is_finite() || anchor.points < 0.0 {
                        errors.push(format!(
                            "{}.time_standard[{}].points: must be non-negative",
                            path, j
                        ));
                    }
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
