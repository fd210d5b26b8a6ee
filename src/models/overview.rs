use serde::Serialize;

use crate::models::rating::{Category, Weekday};

/// Aggregate figures for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: Category,
    pub label: &'static str,
    pub emoji: &'static str,
    /// `None` when no record rated this category ("no data", never `0.0`).
    pub average: Option<f64>,
    /// One decimal, or "—" without data.
    pub average_display: String,
    pub filled_stars: u8,
    pub count: usize,
    pub count_label: String,
    /// Width of the progress bar, absent without data.
    pub bar_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentEntry {
    pub day: Weekday,
    pub comment: String,
}

/// Everything the overview screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total: usize,
    pub total_label: String,
    pub categories: Vec<CategoryStats>,
    pub comments: Vec<CommentEntry>,
}

impl Overview {
    pub fn category(&self, category: Category) -> Option<&CategoryStats> {
        self.categories.iter().find(|s| s.category == category)
    }
}
