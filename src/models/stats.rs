//! Aggregate outreach statistics (homepage and per chapter).

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::ValidationError;
use crate::validation::Schema;

/// Singleton statistics document. Every write replaces it whole.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub schools_visited: i64,
    pub classes_taught: i64,
    pub students_inspired: i64,
}

/// Request body for replacing a statistics document. All three figures are required.
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StatsInput {
    #[validate(
        required(message = "Schools visited is required"),
        range(min = 0, message = "Schools visited must be a non-negative whole number")
    )]
    pub schools_visited: Option<i64>,
    #[validate(
        required(message = "Classes taught is required"),
        range(min = 0, message = "Classes taught must be a non-negative whole number")
    )]
    pub classes_taught: Option<i64>,
    #[validate(
        required(message = "Students inspired is required"),
        range(min = 0, message = "Students inspired must be a non-negative whole number")
    )]
    pub students_inspired: Option<i64>,
}

impl StatsInput {
    /// Validate and build the document to store.
    pub fn into_stats(self) -> Result<Stats, ValidationError> {
        self.check()?;
        match (self.schools_visited, self.classes_taught, self.students_inspired) {
            (Some(schools_visited), Some(classes_taught), Some(students_inspired)) => Ok(Stats {
                schools_visited,
                classes_taught,
                students_inspired,
            }),
            _ => Err(ValidationError::new("input", "Statistics are incomplete")),
        }
    }
}

impl Schema for StatsInput {
    const FIELDS: &'static [&'static str] = &["schools_visited", "classes_taught", "students_inspired"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_figure_is_reported() {
        let input = StatsInput {
            schools_visited: Some(11),
            ..StatsInput::default()
        };
        let err = input.into_stats().unwrap_err();
        assert_eq!(err.field, "classesTaught");
        assert_eq!(err.message, "Classes taught is required");
    }

    #[test]
    fn test_partial_json_deserializes_as_missing() {
        let input: StatsInput = serde_json::from_str(r#"{"schoolsVisited": 11}"#).unwrap();
        assert_eq!(input.schools_visited, Some(11));
        assert_eq!(input.students_inspired, None);
        assert!(input.into_stats().is_err());
    }
}
