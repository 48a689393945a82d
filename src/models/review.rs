//! Review (testimonial) model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Record;
use crate::validation::{trim, trim_optional, Schema};

/// A testimonial from a teacher, parent or student.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub school: String,
    pub content: String,
    pub rating: i64,
    /// Free text, e.g. "March 2024"
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Record for Review {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Request body for adding or fully replacing a review.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ReviewInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub role: Option<String>,
    #[validate(length(min = 1, message = "School is required"))]
    pub school: String,
    #[validate(length(min = 1, message = "Review content is required"))]
    pub content: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be a whole number from 1 to 5"))]
    pub rating: i64,
    pub date: Option<String>,
    pub source: Option<String>,
}

impl ReviewInput {
    pub fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.school);
        trim(&mut self.content);
        trim_optional(&mut self.role);
        trim_optional(&mut self.date);
        trim_optional(&mut self.source);
    }
}

impl Schema for ReviewInput {
    const FIELDS: &'static [&'static str] = &["name", "role", "school", "content", "rating", "date", "source"];
}
