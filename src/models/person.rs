//! Team member model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Record;
use crate::validation::{trim, trim_optional, Schema};

/// Stored when a person is created without any image.
pub const PERSON_PLACEHOLDER_IMAGE: &str = "/images/team-placeholder.png";

/// A team member shown on a chapter page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    pub role: String,
    /// Chapter display name, e.g. "Ellicott City"
    pub chapter: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display rank within the chapter
    #[serde(default)]
    pub order: i64,
}

impl Record for Person {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Request body for adding or fully replacing a person.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PersonInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
    #[validate(
        length(min = 1, message = "Chapter is required"),
        custom(function = "crate::validation::validate_chapter")
    )]
    pub chapter: String,
    pub image: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Order must be a non-negative whole number"))]
    pub order: Option<i64>,
}

impl PersonInput {
    pub fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.role);
        trim(&mut self.chapter);
        trim_optional(&mut self.image);
        trim_optional(&mut self.description);
    }
}

impl Schema for PersonInput {
    const FIELDS: &'static [&'static str] = &["name", "role", "chapter", "image", "description", "order"];
}

/// One entry of a bulk reorder request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderUpdate {
    pub id: String,
    pub order: i64,
}

/// Request body for a bulk reorder.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReorderRequest {
    pub items: Vec<OrderUpdate>,
}

/// Direction for a single-step move within a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Request body for a single-step move.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}
