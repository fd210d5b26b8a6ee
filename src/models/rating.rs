use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ValidationError;

/// Highest score a category can receive.
pub const MAX_SCORE: u8 = 5;

/// The five canteen days a rating can be given for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[default]
    Montag,
    Dienstag,
    Mittwoch,
    Donnerstag,
    Freitag,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Montag,
        Weekday::Dienstag,
        Weekday::Mittwoch,
        Weekday::Donnerstag,
        Weekday::Freitag,
    ];

    /// Display label, also the value stored in `ratings.day`.
    pub fn label(self) -> &'static str {
        match self {
            Weekday::Montag => "Montag",
            Weekday::Dienstag => "Dienstag",
            Weekday::Mittwoch => "Mittwoch",
            Weekday::Donnerstag => "Donnerstag",
            Weekday::Freitag => "Freitag",
        }
    }

    /// Lowercase selector key (`montag`, `dienstag`, ...).
    pub fn key(self) -> &'static str {
        match self {
            Weekday::Montag => "montag",
            Weekday::Dienstag => "dienstag",
            Weekday::Mittwoch => "mittwoch",
            Weekday::Donnerstag => "donnerstag",
            Weekday::Freitag => "freitag",
        }
    }

    pub fn from_label(label: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|d| d.label() == label)
            .ok_or_else(|| ValidationError::UnknownDay(label.to_string()))
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Entry of GET /weekdays.
#[derive(Debug, Serialize)]
pub struct WeekdayOption {
    pub key: &'static str,
    pub label: &'static str,
}

impl From<Weekday> for WeekdayOption {
    fn from(day: Weekday) -> Self {
        Self {
            key: day.key(),
            label: day.label(),
        }
    }
}

/// The five food categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Vegan,
    Vegetarian,
    MeatFish,
    Salad,
    Dessert,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Vegan,
        Category::Vegetarian,
        Category::MeatFish,
        Category::Salad,
        Category::Dessert,
    ];

    /// Identifier used on the wire (`meatFish`, not `meat_fish`).
    pub fn key(self) -> &'static str {
        match self {
            Category::Vegan => "vegan",
            Category::Vegetarian => "vegetarian",
            Category::MeatFish => "meatFish",
            Category::Salad => "salad",
            Category::Dessert => "dessert",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Vegan => "Vegan",
            Category::Vegetarian => "Vegetarisch",
            Category::MeatFish => "Fleisch/Fisch",
            Category::Salad => "Salat",
            Category::Dessert => "Dessert",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::Vegan => "🌱",
            Category::Vegetarian => "🥗",
            Category::MeatFish => "🍖",
            Category::Salad => "🥬",
            Category::Dessert => "🍰",
        }
    }

    /// Column name in the `ratings` table.
    pub fn column(self) -> &'static str {
        match self {
            Category::Vegan => "vegan",
            Category::Vegetarian => "vegetarian",
            Category::MeatFish => "meat_fish",
            Category::Salad => "salad",
            Category::Dessert => "dessert",
        }
    }
}

/// Score per category. `0` means "not rated" and is excluded from averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub vegan: u8,
    pub vegetarian: u8,
    pub meat_fish: u8,
    pub salad: u8,
    pub dessert: u8,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Vegan => self.vegan,
            Category::Vegetarian => self.vegetarian,
            Category::MeatFish => self.meat_fish,
            Category::Salad => self.salad,
            Category::Dessert => self.dessert,
        }
    }

    fn slot(&mut self, category: Category) -> &mut u8 {
        match category {
            Category::Vegan => &mut self.vegan,
            Category::Vegetarian => &mut self.vegetarian,
            Category::MeatFish => &mut self.meat_fish,
            Category::Salad => &mut self.salad,
            Category::Dessert => &mut self.dessert,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for category in Category::ALL {
            let score = self.get(category);
            if score > MAX_SCORE {
                return Err(ValidationError::ScoreOutOfRange { category, score });
            }
        }
        Ok(())
    }
}

/// One user's submission for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub day: Weekday,
    pub date: DateTime<Utc>,
    pub categories: CategoryScores,
    pub comment: String,
}

impl RatingRecord {
    /// Builds a validated record stamped with `date`.
    pub fn new(
        day: Weekday,
        date: DateTime<Utc>,
        categories: CategoryScores,
        comment: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            day,
            date,
            categories,
            comment: comment.into(),
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.categories.validate()
    }

    /// The comment as shown to readers, `None` when blank.
    pub fn display_comment(&self) -> Option<&str> {
        let trimmed = self.comment.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// In-progress form values. Star clicks always set the exact value clicked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatingDraft {
    pub categories: CategoryScores,
    pub comment: String,
}

impl RatingDraft {
    pub fn score(&self, category: Category) -> u8 {
        self.categories.get(category)
    }

    /// Clicking star `stars` sets the category to exactly `stars`.
    pub fn set_score(&mut self, category: Category, stars: u8) -> Result<(), ValidationError> {
        if !(1..=MAX_SCORE).contains(&stars) {
            return Err(ValidationError::StarOutOfRange { category, stars });
        }
        *self.categories.slot(category) = stars;
        Ok(())
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn build(&self, day: Weekday, now: DateTime<Utc>) -> Result<RatingRecord, ValidationError> {
        RatingRecord::new(day, now, self.categories, self.comment.clone())
    }
}

/// Body for POST /ratings. The server stamps the submission date.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRatingRequest {
    pub day: String,
    #[serde(default)]
    pub categories: CategoryScores,
    #[serde(default)]
    pub comment: String,
}

impl CreateRatingRequest {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<RatingRecord, ValidationError> {
        let day = Weekday::from_label(&self.day)?;
        RatingRecord::new(day, now, self.categories, self.comment)
    }
}

/// DB row of `ratings`.
#[derive(Debug, Clone, FromRow)]
pub struct RatingRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub day: String,
    pub date: DateTime<Utc>,
    pub vegan: i16,
    pub vegetarian: i16,
    pub meat_fish: i16,
    pub salad: i16,
    pub dessert: i16,
    pub comment: String,
}

fn column_score(category: Category, value: i16) -> Result<u8, ValidationError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= MAX_SCORE)
        .ok_or(ValidationError::StoredScoreOutOfRange { category, value })
}

impl TryFrom<RatingRow> for RatingRecord {
    type Error = ValidationError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        let categories = CategoryScores {
            vegan: column_score(Category::Vegan, row.vegan)?,
            vegetarian: column_score(Category::Vegetarian, row.vegetarian)?,
            meat_fish: column_score(Category::MeatFish, row.meat_fish)?,
            salad: column_score(Category::Salad, row.salad)?,
            dessert: column_score(Category::Dessert, row.dessert)?,
        };
        RatingRecord::new(Weekday::from_label(&row.day)?, row.date, categories, row.comment)
    }
}
