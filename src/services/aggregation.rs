use crate::models::{
    overview::{CategoryStats, CommentEntry, Overview},
    rating::{Category, RatingRecord, MAX_SCORE},
};

/// Placeholder shown instead of an average when a category has no ratings.
pub const NO_DATA: &str = "—";

/// Rounds half up: `3.5` → `4`, `4.5` → `5`.
///
/// Averages are never negative, so `f64::round` (half away from zero) is
/// exactly half up here.
pub fn round_half_up(value: f64) -> f64 {
    value.round()
}

/// Number of filled stars for an average; `0` without data.
pub fn filled_stars(average: Option<f64>) -> u8 {
    match average {
        Some(avg) => round_half_up(avg).clamp(0.0, f64::from(MAX_SCORE)) as u8,
        None => 0,
    }
}

/// One decimal place, rounded half up like the stars (`4.25` → `4.3`).
pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(avg) => format!("{:.1}", round_half_up(avg * 10.0) / 10.0),
        None => NO_DATA.to_string(),
    }
}

pub fn ratings_label(count: usize) -> String {
    if count == 1 {
        "1 Bewertung".to_string()
    } else {
        format!("{count} Bewertungen")
    }
}

/// Average and count of the non-zero scores of one category.
pub fn category_average(records: &[RatingRecord], category: Category) -> (Option<f64>, usize) {
    let (sum, count) = records
        .iter()
        .map(|r| r.categories.get(category))
        .filter(|score| *score > 0)
        .fold((0u64, 0usize), |(sum, count), score| (sum + u64::from(score), count + 1));

    if count == 0 {
        (None, 0)
    } else {
        (Some(sum as f64 / count as f64), count)
    }
}

pub fn category_stats(records: &[RatingRecord], category: Category) -> CategoryStats {
    let (average, count) = category_average(records, category);
    CategoryStats {
        category,
        label: category.label(),
        emoji: category.emoji(),
        average,
        average_display: format_average(average),
        filled_stars: filled_stars(average),
        count,
        count_label: ratings_label(count),
        bar_percent: average.map(|avg| avg * 100.0 / f64::from(MAX_SCORE)),
    }
}

/// `(day, trimmed comment)` for every record with a non-blank comment, in collection order.
pub fn comments(records: &[RatingRecord]) -> Vec<CommentEntry> {
    records
        .iter()
        .filter_map(|r| {
            r.display_comment().map(|comment| CommentEntry {
                day: r.day,
                comment: comment.to_string(),
            })
        })
        .collect()
}

pub fn overview(records: &[RatingRecord]) -> Overview {
    let total = records.len();
    Overview {
        total,
        total_label: format!("Basierend auf {}", ratings_label(total)),
        categories: Category::ALL
            .into_iter()
            .map(|c| category_stats(records, c))
            .collect(),
        comments: comments(records),
    }
}
