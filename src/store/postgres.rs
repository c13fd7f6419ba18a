use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CycleRecord, SettingsPatch, SymptomLog, UserCycleSettings};
use crate::store::{PeriodStore, RecordOrder, SettingsStore, StorageError};

/// Postgres-backed store. Schema lives under `migrations/`; queries are
/// bound at runtime so the crate builds without a live database.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CycleRecordRow {
    id: Uuid,
    user_id: Uuid,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    duration: Option<i64>,
    cycle_number: i64,
    created_at: DateTime<Utc>,
}

impl From<CycleRecordRow> for CycleRecord {
    fn from(row: CycleRecordRow) -> Self {
        CycleRecord {
            id: row.id,
            user_id: row.user_id,
            start_date: row.start_date,
            end_date: row.end_date,
            duration: row.duration,
            cycle_number: row.cycle_number,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SymptomLogRow {
    id: Uuid,
    user_id: Uuid,
    date: DateTime<Utc>,
    symptoms: Vec<String>,
    severity: String,
    created_at: DateTime<Utc>,
}

impl From<SymptomLogRow> for SymptomLog {
    fn from(row: SymptomLogRow) -> Self {
        SymptomLog {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            symptoms: row.symptoms,
            severity: row.severity,
            created_at: row.created_at,
        }
    }
}

const SELECT_RECORDS: &str =
    "SELECT id, user_id, start_date, end_date, duration, cycle_number, created_at
     FROM cycle_records WHERE user_id = $1";

#[async_trait]
impl PeriodStore for PostgresStore {
    async fn list_records(
        &self,
        user_id: Uuid,
        order: RecordOrder,
        limit: Option<i64>,
    ) -> Result<Vec<CycleRecord>, StorageError> {
        // Both orderings are part of the contract; created_at ties break
        // on cycle_number so concurrent same-instant inserts stay stable.
        let sql = match order {
            RecordOrder::CreatedAtDesc => format!(
                "{SELECT_RECORDS} ORDER BY created_at DESC, cycle_number DESC LIMIT $2"
            ),
            RecordOrder::StartDateDesc => {
                format!("{SELECT_RECORDS} ORDER BY start_date DESC LIMIT $2")
            }
        };

        let rows = sqlx::query_as::<_, CycleRecordRow>(&sql)
            .bind(user_id)
            .bind(limit.unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(CycleRecord::from).collect())
    }

    async fn get_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
    ) -> Result<Option<CycleRecord>, StorageError> {
        let row = sqlx::query_as::<_, CycleRecordRow>(&format!("{SELECT_RECORDS} AND id = $2"))
            .bind(user_id)
            .bind(record_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CycleRecord::from))
    }

    async fn put_record(&self, record: CycleRecord) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO cycle_records
                 (id, user_id, start_date, end_date, duration, cycle_number, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO UPDATE SET
                 end_date = EXCLUDED.end_date,
                 duration = EXCLUDED.duration",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.duration)
        .bind(record.cycle_number)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("cycle record upsert failed: {e}");
            e
        })?;

        Ok(())
    }

    async fn put_symptom_log(&self, log: SymptomLog) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO symptom_logs (id, user_id, date, symptoms, severity, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(log.date)
        .bind(&log.symptoms)
        .bind(&log.severity)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_symptom_logs(&self, user_id: Uuid) -> Result<Vec<SymptomLog>, StorageError> {
        let rows = sqlx::query_as::<_, SymptomLogRow>(
            "SELECT id, user_id, date, symptoms, severity, created_at
             FROM symptom_logs WHERE user_id = $1 ORDER BY date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SymptomLog::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct SettingsRow {
    last_period: Option<DateTime<Utc>>,
    cycle_length: Option<i64>,
}

#[async_trait]
impl SettingsStore for PostgresStore {
    async fn get_settings(&self, user_id: Uuid) -> Result<UserCycleSettings, StorageError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT last_period, cycle_length FROM cycle_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|r| UserCycleSettings {
                last_period: r.last_period,
                cycle_length: r.cycle_length,
            })
            .unwrap_or_default())
    }

    async fn merge_settings(
        &self,
        user_id: Uuid,
        patch: SettingsPatch,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO cycle_settings (user_id, last_period, cycle_length)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE SET
                 last_period = COALESCE($2, cycle_settings.last_period),
                 cycle_length = COALESCE($3, cycle_settings.cycle_length)",
        )
        .bind(user_id)
        .bind(patch.last_period)
        .bind(patch.cycle_length)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("settings merge failed: {e}");
            e
        })?;

        Ok(())
    }
}
