//! Product categories.
//!
//! The catalog is split into a small fixed set of categories. The stored
//! value is the lowercase slug (`camisas`, `tenis`, `acessorios`), which is
//! also what category listings filter on.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a category slug is not one of the known categories.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0} (expected one of: camisas, tenis, acessorios)")]
pub struct CategoryError(pub String);

/// A catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Camisas,
    Tenis,
    Acessorios,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Self; 3] = [Self::Camisas, Self::Tenis, Self::Acessorios];

    /// The stored slug.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Camisas => "camisas",
            Self::Tenis => "tenis",
            Self::Acessorios => "acessorios",
        }
    }

    /// Human-readable label (capitalized slug).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Camisas => "Camisas",
            Self::Tenis => "Tenis",
            Self::Acessorios => "Acessorios",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    /// Parse a slug, ignoring surrounding whitespace and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == slug)
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_slugs() {
        assert_eq!("camisas".parse::<Category>().unwrap(), Category::Camisas);
        assert_eq!(" Tenis ".parse::<Category>().unwrap(), Category::Tenis);
        assert_eq!(
            "ACESSORIOS".parse::<Category>().unwrap(),
            Category::Acessorios
        );
    }

    #[test]
    fn test_parse_unknown() {
        let err = "sapatos".parse::<Category>().unwrap_err();
        assert_eq!(err, CategoryError("sapatos".to_owned()));
    }

    #[test]
    fn test_serde_uses_slug() {
        let json = serde_json::to_string(&Category::Acessorios).unwrap();
        assert_eq!(json, "\"acessorios\"");
        let parsed: Category = serde_json::from_str("\"tenis\"").unwrap();
        assert_eq!(parsed, Category::Tenis);
    }

    #[test]
    fn test_label() {
        assert_eq!(Category::Camisas.label(), "Camisas");
    }
}
