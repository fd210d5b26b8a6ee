use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::StoreError,
    models::rating::{Category, RatingRecord, RatingRow},
    services::store::RatingStore,
};

/// PostgreSQL-backed rating store (`ratings` table).
#[derive(Clone)]
pub struct PgRatingStore {
    pool: PgPool,
}

impl PgRatingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row columns in `RatingRow` order, one score column per category.
fn returned_columns() -> String {
    let scores: Vec<&str> = Category::ALL.into_iter().map(Category::column).collect();
    format!("id, created_at, day, date, {}, comment", scores.join(", "))
}

fn select_sql() -> String {
    format!("SELECT {} FROM ratings ORDER BY seq", returned_columns())
}

fn insert_sql() -> String {
    let scores: Vec<&str> = Category::ALL.into_iter().map(Category::column).collect();
    let placeholders: Vec<String> = (1..=scores.len() + 3).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO ratings (day, date, {}, comment) VALUES ({}) RETURNING {}",
        scores.join(", "),
        placeholders.join(", "),
        returned_columns()
    )
}

#[async_trait]
impl RatingStore for PgRatingStore {
    /// Rows come back in insertion order. Rows failing validation are skipped.
    async fn fetch_all(&self) -> Result<Vec<RatingRecord>, StoreError> {
        let rows = sqlx::query_as::<_, RatingRow>(&select_sql())
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match RatingRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("skipping rating {id}: {e}"),
            }
        }
        Ok(records)
    }

    async fn insert(&self, record: &RatingRecord) -> Result<RatingRecord, StoreError> {
        record.validate()?;
        let sql = insert_sql();
        let mut query = sqlx::query_as::<_, RatingRow>(&sql)
            .bind(record.day.label())
            .bind(record.date);
        for category in Category::ALL {
            query = query.bind(i16::from(record.categories.get(category)));
        }
        let row = query.bind(&record.comment).fetch_one(&self.pool).await?;

        tracing::info!("Stored rating {} for {}", row.id, row.day);
        Ok(RatingRecord::try_from(row)?)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM ratings")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_lists_every_category_in_insertion_order() {
        assert_eq!(
            select_sql(),
            "SELECT id, created_at, day, date, vegan, vegetarian, meat_fish, salad, dessert, comment \
             FROM ratings ORDER BY seq"
        );
    }

    #[test]
    fn insert_binds_one_placeholder_per_column() {
        let sql = insert_sql();
        assert!(sql.starts_with(
            "INSERT INTO ratings (day, date, vegan, vegetarian, meat_fish, salad, dessert, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id, created_at,"
        ));
        assert!(!sql.contains("$9"));
    }
}
