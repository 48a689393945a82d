//! News article model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Record;
use crate::validation::{trim, trim_optional, Schema};

/// Stored when an article is created without any image.
pub const ARTICLE_PLACEHOLDER_IMAGE: &str = "/images/news-placeholder.jpg";

/// A news article. `content` is free text and may embed `**bold**` markup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    /// Unique across the collection
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    /// Absolute URL or root-relative path
    pub image: String,
    pub author: String,
    pub date: String,
    pub read_time: String,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub published: bool,
}

impl Record for NewsArticle {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Request body for adding or fully replacing an article.
///
/// `views` and `comments` are optional: add starts them at zero, update keeps the
/// stored values unless given.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ArticleInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(
        length(min = 1, message = "Slug is required"),
        custom(function = "crate::validation::validate_slug")
    )]
    pub slug: String,
    #[validate(length(min = 1, message = "Excerpt is required"))]
    pub excerpt: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub date: Option<String>,
    #[validate(length(min = 1, message = "Read time is required"))]
    pub read_time: String,
    pub image: Option<String>,
    pub published: bool,
    #[validate(range(min = 0, message = "Views must be a non-negative whole number"))]
    pub views: Option<i64>,
    #[validate(range(min = 0, message = "Comments must be a non-negative whole number"))]
    pub comments: Option<i64>,
}

impl ArticleInput {
    pub fn normalize(&mut self) {
        trim(&mut self.title);
        trim(&mut self.slug);
        trim(&mut self.excerpt);
        trim(&mut self.content);
        trim(&mut self.author);
        trim(&mut self.read_time);
        trim_optional(&mut self.date);
        trim_optional(&mut self.image);
    }
}

impl Schema for ArticleInput {
    const FIELDS: &'static [&'static str] = &[
        "title", "slug", "excerpt", "content", "author", "date", "read_time", "image",
        "published", "views", "comments",
    ];
}
