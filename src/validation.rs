//! Schema validation for admin writes.
//!
//! Input structs derive [`validator::Validate`]; [`Schema::check`] turns the result into
//! the single first failing field the admin UI shows inline.

use std::borrow::Cow;

use validator::{Validate, ValidationErrors};

use crate::errors::ValidationError;
use crate::models::Chapter;

/// An input type with a declared field order for error reporting.
pub trait Schema: Validate {
    /// Rust field names in the order they should be reported.
    const FIELDS: &'static [&'static str];

    /// Validate and report the first failing field (camelCase, as the client sends it).
    fn check(&self) -> Result<(), ValidationError> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => Err(first_error(&errors, Self::FIELDS)),
        }
    }
}

fn first_error(errors: &ValidationErrors, order: &[&'static str]) -> ValidationError {
    let by_field = errors.field_errors();

    let found = order
        .iter()
        .find_map(|name| by_field.get(*name).map(|list| (name.to_string(), *list)))
        .or_else(|| {
            let mut names: Vec<_> = by_field.iter().collect();
            names.sort_by(|a, b| a.0.cmp(b.0));
            names
                .into_iter()
                .next()
                .map(|(name, list)| (name.to_string(), *list))
        });

    match found {
        Some((name, list)) => {
            let field = to_camel_case(&name);
            let message = list
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            ValidationError::new(field, message)
        }
        None => ValidationError::new("input", "Input is invalid"),
    }
}

fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn invalid(code: &'static str, message: &'static str) -> validator::ValidationError {
    let mut err = validator::ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Slugs are lowercase words joined by single hyphens. Emptiness is reported by the
/// `length` rule.
pub fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if slug.is_empty() {
        return Ok(());
    }
    let well_formed = slug
        .split('-')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    if well_formed {
        Ok(())
    } else {
        Err(invalid(
            "slug_format",
            "Slug may only contain lowercase letters, digits and single hyphens",
        ))
    }
}

pub fn validate_chapter(chapter: &str) -> Result<(), validator::ValidationError> {
    if chapter.is_empty() || Chapter::parse(chapter).is_some() {
        return Ok(());
    }
    Err(invalid(
        "chapter",
        "Chapter must be one of California, Calgary, Ellicott City",
    ))
}

/// Images are either absolute http(s) URLs or root-relative paths.
pub fn validate_image_ref(field: &str, image: &str) -> Result<(), ValidationError> {
    let ok = image.starts_with("https://")
        || image.starts_with("http://")
        || (image.starts_with('/') && !image.starts_with("//"));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            "Image must be an http(s) URL or a path starting with /",
        ))
    }
}

/// Trim a required string in place.
pub fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trim an optional string, dropping it when blank.
pub fn trim_optional(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        trim(v);
        if v.is_empty() {
            *value = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        assert!(validate_slug("spring-2024-recap").is_ok());
        assert!(validate_slug("x").is_ok());
        assert!(validate_slug("Upper-Case").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("has space").is_err());
    }

    #[test]
    fn test_chapter_rules() {
        assert!(validate_chapter("California").is_ok());
        assert!(validate_chapter("Ellicott City").is_ok());
        assert!(validate_chapter("Toronto").is_err());
    }

    #[test]
    fn test_image_refs() {
        assert!(validate_image_ref("image", "/images/team/jane.jpg").is_ok());
        assert!(validate_image_ref("image", "https://cdn.example.org/a.png").is_ok());
        assert!(validate_image_ref("image", "javascript:alert(1)").is_err());
        assert!(validate_image_ref("image", "//evil.example/a.png").is_err());
    }

    #[test]
    fn test_camel_case_field_names() {
        assert_eq!(to_camel_case("read_time"), "readTime");
        assert_eq!(to_camel_case("students_inspired"), "studentsInspired");
        assert_eq!(to_camel_case("slug"), "slug");
    }

    #[test]
    fn test_trim_optional_drops_blank() {
        let mut role = Some("   ".to_string());
        trim_optional(&mut role);
        assert_eq!(role, None);

        let mut source = Some(" Google ".to_string());
        trim_optional(&mut source);
        assert_eq!(source.as_deref(), Some("Google"));
    }
}
