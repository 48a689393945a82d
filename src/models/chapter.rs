//! Chapters of the organization.

use serde::Serialize;

/// A local chapter. People are grouped and ordered per chapter, and each chapter
/// has its own stats singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Chapter {
    California,
    Calgary,
    #[serde(rename = "Ellicott City")]
    EllicottCity,
}

impl Chapter {
    pub const ALL: [Chapter; 3] = [Chapter::California, Chapter::Calgary, Chapter::EllicottCity];

    pub fn as_str(&self) -> &'static str {
        match self {
            Chapter::California => "California",
            Chapter::Calgary => "Calgary",
            Chapter::EllicottCity => "Ellicott City",
        }
    }

    /// Accepts display names and URL forms: "Ellicott City", "ellicott-city", "ellicott_city".
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Chapter::ALL
            .into_iter()
            .find(|c| c.as_str().to_ascii_lowercase() == normalized)
    }

    /// Store key of this chapter's stats singleton.
    pub fn stats_key(&self) -> String {
        format!("{}_stats", self.as_str().to_ascii_lowercase().replace(' ', "_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Chapter::parse("California"), Some(Chapter::California));
        assert_eq!(Chapter::parse("calgary"), Some(Chapter::Calgary));
        assert_eq!(Chapter::parse("ellicott-city"), Some(Chapter::EllicottCity));
        assert_eq!(Chapter::parse("Ellicott City"), Some(Chapter::EllicottCity));
        assert_eq!(Chapter::parse("Boston"), None);
    }

    #[test]
    fn test_stats_keys() {
        assert_eq!(Chapter::California.stats_key(), "california_stats");
        assert_eq!(Chapter::EllicottCity.stats_key(), "ellicott_city_stats");
    }
}
