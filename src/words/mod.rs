//! Word catalog data model
//!
//! A catalog is a list of categories; each category holds contrast groups
//! either through named subcategories or directly. A contrast is a labeled
//! set of two-word minimal pairs drilled together.

pub mod loader;

use crate::Result;
use serde::Deserialize;

/// One minimal pair, e.g. ["pat", "bat"]
pub type WordPair = [String; 2];

/// A labeled set of minimal pairs, e.g. the p/b contrast
#[derive(Debug, Clone, Deserialize)]
pub struct Contrast {
    pub description: String,
    #[serde(default)]
    pub pairs: Vec<WordPair>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subcategory {
    pub name: String,
    #[serde(default)]
    pub contrasts: Vec<Contrast>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub category: String,
    #[serde(default)]
    pub subcategories: Option<Vec<Subcategory>>,
    #[serde(default)]
    pub contrasts: Option<Vec<Contrast>>,
}

impl Category {
    /// Contrast groups under this category: the explicit subcategories, or
    /// the category's own contrasts under an implicit unnamed group.
    pub fn groups(&self) -> Vec<(&str, &[Contrast])> {
        match &self.subcategories {
            Some(subs) => subs
                .iter()
                .map(|s| (s.name.as_str(), s.contrasts.as_slice()))
                .collect(),
            None => match &self.contrasts {
                Some(contrasts) => vec![("", contrasts.as_slice())],
                None => Vec::new(),
            },
        }
    }
}

/// The loaded catalog; read-only after load, replaced wholesale on reload
#[derive(Debug, Clone, Default)]
pub struct WordCatalog {
    pub categories: Vec<Category>,
}

impl WordCatalog {
    pub fn from_json(text: &str) -> Result<Self> {
        let categories: Vec<Category> = serde_json::from_str(text)?;
        Ok(Self { categories })
    }

    /// Total number of pairs across all groups
    pub fn pair_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.groups())
            .flat_map(|(_, contrasts)| contrasts)
            .map(|contrast| contrast.pairs.len())
            .sum()
    }

    /// A catalog with nothing to drill counts as empty
    pub fn is_empty(&self) -> bool {
        self.pair_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_catalog() {
        let json = r#"[
            {
                "category": "Stops",
                "subcategories": [
                    {
                        "name": "Initial",
                        "contrasts": [
                            { "description": "p/b", "pairs": [["pat", "bat"], ["pin", "bin"]] }
                        ]
                    }
                ]
            }
        ]"#;
        let catalog = WordCatalog::from_json(json).unwrap();
        assert_eq!(catalog.categories.len(), 1);
        assert_eq!(catalog.pair_count(), 2);

        let groups = catalog.categories[0].groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "Initial");
        assert_eq!(groups[0].1[0].pairs[0], ["pat", "bat"]);
    }

    #[test]
    fn test_contrasts_without_subcategories_get_implicit_group() {
        let json = r#"[
            {
                "category": "Animals",
                "contrasts": [
                    { "description": "p/b", "pairs": [["pat", "bat"]] }
                ]
            }
        ]"#;
        let catalog = WordCatalog::from_json(json).unwrap();
        let groups = catalog.categories[0].groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "");
        assert_eq!(groups[0].1.len(), 1);
    }

    #[test]
    fn test_category_with_neither_field_has_no_groups() {
        let json = r#"[ { "category": "Empty" } ]"#;
        let catalog = WordCatalog::from_json(json).unwrap();
        assert!(catalog.categories[0].groups().is_empty());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(WordCatalog::from_json("not json").is_err());
        assert!(WordCatalog::from_json(r#"{"category": "x"}"#).is_err()); // not an array
    }

    #[test]
    fn test_pair_must_have_two_words() {
        let json = r#"[
            { "category": "Bad", "contrasts": [ { "description": "x", "pairs": [["one"]] } ] }
        ]"#;
        assert!(WordCatalog::from_json(json).is_err());
    }
}
