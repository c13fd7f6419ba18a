use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CycleRecord, SettingsPatch, SymptomLog, UserCycleSettings};

pub mod memory;
pub mod postgres;

/// Ordering for record listings. Callers depend on both: cycle numbering
/// follows insertion order, statistics and history follow start dates.
/// Neither implies the other once dates are logged out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrder {
    CreatedAtDesc,
    StartDateDesc,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Period records and symptom logs for one user. Upsert semantics by
/// record id; no delete path (removal is an operator concern).
#[async_trait]
pub trait PeriodStore: Send + Sync {
    async fn list_records(
        &self,
        user_id: Uuid,
        order: RecordOrder,
        limit: Option<i64>,
    ) -> Result<Vec<CycleRecord>, StorageError>;

    async fn get_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
    ) -> Result<Option<CycleRecord>, StorageError>;

    async fn put_record(&self, record: CycleRecord) -> Result<(), StorageError>;

    async fn put_symptom_log(&self, log: SymptomLog) -> Result<(), StorageError>;

    async fn list_symptom_logs(&self, user_id: Uuid) -> Result<Vec<SymptomLog>, StorageError>;
}

/// Per-user settings with shallow field-level merge, last write wins.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_settings(&self, user_id: Uuid) -> Result<UserCycleSettings, StorageError>;

    async fn merge_settings(
        &self,
        user_id: Uuid,
        patch: SettingsPatch,
    ) -> Result<(), StorageError>;
}
