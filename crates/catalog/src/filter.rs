//! Catalog filter evaluation.
//!
//! `ItemFilter` is the storefront's query: every field is optional and an
//! absent field imposes no constraint. Stores may push the predicates down
//! (e.g. into SQL); `matches` and `apply` are the reference semantics.

use core::cmp::Ordering;

use rust_decimal::Decimal;

use sweetshop_core::Entity;

use crate::{Category, CategoryFilter, Item};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Case-insensitive substring of the item name.
    pub search: Option<String>,
    pub category: CategoryFilter,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = CategoryFilter::Only(category);
        self
    }

    pub fn with_min_price(mut self, min: Decimal) -> Self {
        self.min_price = Some(min);
        self
    }

    pub fn with_max_price(mut self, max: Decimal) -> Self {
        self.max_price = Some(max);
        self
    }

    /// Search term with surrounding whitespace removed; blank means no search.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// `ILIKE` pattern for the search term, with `%`, `_` and `\` escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search_term().map(|term| {
            let mut pattern = String::with_capacity(term.len() + 2);
            pattern.push('%');
            for ch in term.chars() {
                if matches!(ch, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(ch);
            }
            pattern.push('%');
            pattern
        })
    }

    pub fn matches(&self, item: &Item) -> bool {
        if !self.category.matches(item.category()) {
            return false;
        }

        let price = item.price().amount();
        if let Some(min) = self.min_price {
            if price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if price > max {
                return false;
            }
        }

        if let Some(term) = self.search_term() {
            if !item.name().to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }

        true
    }

    /// Keep matching items, newest first.
    pub fn apply<I>(&self, items: I) -> Vec<Item>
    where
        I: IntoIterator<Item = Item>,
    {
        let mut out: Vec<Item> = items.into_iter().filter(|i| self.matches(i)).collect();
        out.sort_by(newest_first);
        out
    }
}

/// Listing order: creation time descending, then id descending so equal
/// timestamps still sort deterministically.
pub fn newest_first(a: &Item, b: &Item) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().cmp(a.id()))
}
