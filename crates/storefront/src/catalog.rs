//! The invitation collections offered in the shop.

use crate::Money;
use serde::{Deserialize, Serialize};

/// Pseudo-category matching every collection.
pub const ALL_CATEGORIES: &str = "All";

/// A purchasable invitation collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: Money,
    /// Style category, e.g. "Floral".
    pub category: String,
}

impl Collection {
    fn new(
        id: &str,
        title: &str,
        description: &str,
        image_url: &str,
        cents: u64,
        category: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            image_url: image_url.to_string(),
            price: Money::from_cents(cents),
            category: category.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    collections: Vec<Collection>,
}

impl Catalog {
    pub fn new(collections: Vec<Collection>) -> Self {
        Self { collections }
    }

    /// The collections shipped with the shop.
    pub fn builtin() -> Self {
        Self::new(vec![
            Collection::new(
                "1",
                "Elegant Florals",
                "Romantic floral invitation designs with delicate illustration",
                "https://plus.unsplash.com/premium_photo-1676836153320-bb844231a5c7?w=900&auto=format&fit=crop&q=60",
                3999,
                "Floral",
            ),
            Collection::new(
                "2",
                "Modern Minimalist",
                "Clean, contemporary designs with stylish typography",
                "https://plus.unsplash.com/premium_photo-1673548916575-c86ff6a1dbd3?w=900&auto=format&fit=crop&q=60",
                3499,
                "Minimalist",
            ),
            Collection::new(
                "3",
                "Rustic Charm",
                "Warm, natural designs with a handcrafted feel",
                "https://images.unsplash.com/photo-1527529482837-4698179dc6ce?auto=format&fit=crop&w=500&q=80",
                2999,
                "Rustic",
            ),
            Collection::new(
                "4",
                "Art Deco Glamour",
                "Bold geometric patterns and vintage-inspired elegance",
                "https://images.unsplash.com/photo-1510076857177-7470076d4098?auto=format&fit=crop&w=500&q=80",
                4499,
                "Vintage",
            ),
            Collection::new(
                "5",
                "Bohemian Dreams",
                "Free-spirited designs with whimsical elements",
                "https://images.unsplash.com/photo-1465495976277-4387d4b0b4c6?auto=format&fit=crop&w=500&q=80",
                3699,
                "Bohemian",
            ),
            Collection::new(
                "6",
                "Classic Romance",
                "Timeless designs with elegant calligraphy",
                "https://images.unsplash.com/photo-1511184150666-9bb7d41a88f4?auto=format&fit=crop&w=500&q=80",
                3999,
                "Classic",
            ),
        ])
    }

    pub fn all(&self) -> &[Collection] {
        &self.collections
    }

    /// `"All"` followed by each category in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories = vec![ALL_CATEGORIES];
        for collection in &self.collections {
            if !categories.contains(&collection.category.as_str()) {
                categories.push(&collection.category);
            }
        }
        categories
    }

    /// Collections in `category`, compared case-insensitively.
    pub fn filter(&self, category: &str) -> Vec<&Collection> {
        let category = category.trim();
        if category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            return self.collections.iter().collect();
        }
        self.collections
            .iter()
            .filter(|c| c.category.eq_ignore_ascii_case(category))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }
}
