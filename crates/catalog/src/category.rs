use core::str::FromStr;

use serde::{Deserialize, Serialize};

use sweetshop_core::DomainError;

/// Fixed set of catalog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sweets,
    Snacks,
    PremiumSweets,
    GiftBoxes,
    Seasonal,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Sweets,
        Category::Snacks,
        Category::PremiumSweets,
        Category::GiftBoxes,
        Category::Seasonal,
    ];

    /// Stored/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sweets => "sweets",
            Category::Snacks => "snacks",
            Category::PremiumSweets => "premium_sweets",
            Category::GiftBoxes => "gift_boxes",
            Category::Seasonal => "seasonal",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown category '{s}' (expected one of: sweets, snacks, premium_sweets, gift_boxes, seasonal)"
                ))
            })
    }
}

/// Category constraint of a listing query.
///
/// Query strings are not validated against the fixed set: a value that names
/// no category is kept as-is and simply matches no item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    Any,
    Only(Category),
    Unrecognized(String),
}

impl CategoryFilter {
    /// Parse a query value; `all` (any case) or blank means no constraint.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return CategoryFilter::Any;
        }
        match s.parse() {
            Ok(category) => CategoryFilter::Only(category),
            Err(_) => CategoryFilter::Unrecognized(s.to_string()),
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::Any => true,
            CategoryFilter::Only(c) => *c == category,
            CategoryFilter::Unrecognized(_) => false,
        }
    }

    /// Value compared against the stored `category` column; `None` means no
    /// constraint.
    pub fn as_column_value(&self) -> Option<&str> {
        match self {
            CategoryFilter::Any => None,
            CategoryFilter::Only(c) => Some(c.as_str()),
            CategoryFilter::Unrecognized(raw) => Some(raw.as_str()),
        }
    }
}
