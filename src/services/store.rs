use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{error::StoreError, models::rating::RatingRecord};

/// Durable home of all ratings. Implementations only ever append.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// All stored ratings, oldest first.
    async fn fetch_all(&self) -> Result<Vec<RatingRecord>, StoreError>;

    /// Persist one rating and return it as stored.
    async fn insert(&self, record: &RatingRecord) -> Result<RatingRecord, StoreError>;

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.fetch_all().await?.len())
    }

    /// Cheap liveness probe for /health.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Process-local store, used with `RATING_STORE=memory` and in tests.
#[derive(Default)]
pub struct MemoryRatingStore {
    records: RwLock<Vec<RatingRecord>>,
}

impl MemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<RatingRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl RatingStore for MemoryRatingStore {
    async fn fetch_all(&self) -> Result<Vec<RatingRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn insert(&self, record: &RatingRecord) -> Result<RatingRecord, StoreError> {
        record.validate()?;
        self.records.write().await.push(record.clone());
        Ok(record.clone())
    }
}
