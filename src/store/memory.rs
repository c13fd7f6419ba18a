use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{CycleRecord, SettingsPatch, SymptomLog, UserCycleSettings};
use crate::store::{PeriodStore, RecordOrder, SettingsStore, StorageError};

#[derive(Default)]
struct UserData {
    records: Vec<CycleRecord>,
    symptom_logs: Vec<SymptomLog>,
    settings: UserCycleSettings,
}

/// In-process fallback store, used when no `DATABASE_URL` is configured
/// and throughout the test suite. Records are kept in insertion order so
/// `CreatedAtDesc` reproduces the upsert sequence exactly even when two
/// records share a `created_at` instant.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, UserData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PeriodStore for MemoryStore {
    async fn list_records(
        &self,
        user_id: Uuid,
        order: RecordOrder,
        limit: Option<i64>,
    ) -> Result<Vec<CycleRecord>, StorageError> {
        let users = self.users.read().await;
        let mut records = users
            .get(&user_id)
            .map(|u| u.records.clone())
            .unwrap_or_default();

        match order {
            RecordOrder::CreatedAtDesc => records.reverse(),
            RecordOrder::StartDateDesc => {
                records.sort_by(|a, b| b.start_date.cmp(&a.start_date))
            }
        }

        if let Some(limit) = limit {
            records.truncate(limit.max(0) as usize);
        }
        Ok(records)
    }

    async fn get_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
    ) -> Result<Option<CycleRecord>, StorageError> {
        let users = self.users.read().await;
        Ok(users
            .get(&user_id)
            .and_then(|u| u.records.iter().find(|r| r.id == record_id))
            .cloned())
    }

    async fn put_record(&self, record: CycleRecord) -> Result<(), StorageError> {
        let mut users = self.users.write().await;
        let user = users.entry(record.user_id).or_default();
        match user.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => user.records.push(record),
        }
        Ok(())
    }

    async fn put_symptom_log(&self, log: SymptomLog) -> Result<(), StorageError> {
        let mut users = self.users.write().await;
        users.entry(log.user_id).or_default().symptom_logs.push(log);
        Ok(())
    }

    async fn list_symptom_logs(&self, user_id: Uuid) -> Result<Vec<SymptomLog>, StorageError> {
        let users = self.users.read().await;
        let mut logs = users
            .get(&user_id)
            .map(|u| u.symptom_logs.clone())
            .unwrap_or_default();
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get_settings(&self, user_id: Uuid) -> Result<UserCycleSettings, StorageError> {
        let users = self.users.read().await;
        Ok(users
            .get(&user_id)
            .map(|u| u.settings.clone())
            .unwrap_or_default())
    }

    async fn merge_settings(
        &self,
        user_id: Uuid,
        patch: SettingsPatch,
    ) -> Result<(), StorageError> {
        let mut users = self.users.write().await;
        let settings = &mut users.entry(user_id).or_default().settings;
        if let Some(last_period) = patch.last_period {
            settings.last_period = Some(last_period);
        }
        if let Some(cycle_length) = patch.cycle_length {
            settings.cycle_length = Some(cycle_length);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(user_id: Uuid, start_day: u32, created_day: u32, cycle_number: i64) -> CycleRecord {
        CycleRecord {
            id: Uuid::new_v4(),
            user_id,
            start_date: Utc.with_ymd_and_hms(2024, 1, start_day, 0, 0, 0).unwrap(),
            end_date: None,
            duration: None,
            cycle_number,
            created_at: Utc.with_ymd_and_hms(2024, 2, created_day, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn orderings_are_independent() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        // Backfill scenario: the later-created record has the earlier start.
        store.put_record(record(user, 20, 1, 1)).await.unwrap();
        store.put_record(record(user, 5, 2, 2)).await.unwrap();

        let by_creation = store
            .list_records(user, RecordOrder::CreatedAtDesc, None)
            .await
            .unwrap();
        assert_eq!(by_creation[0].cycle_number, 2);

        let by_start = store
            .list_records(user, RecordOrder::StartDateDesc, None)
            .await
            .unwrap();
        assert_eq!(by_start[0].cycle_number, 1);
    }

    #[tokio::test]
    async fn put_record_upserts_by_id() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let mut rec = record(user, 1, 1, 1);
        store.put_record(rec.clone()).await.unwrap();

        rec.duration = Some(5);
        store.put_record(rec.clone()).await.unwrap();

        let records = store
            .list_records(user, RecordOrder::CreatedAtDesc, None)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration, Some(5));
    }

    #[tokio::test]
    async fn limit_bounds_the_listing() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        for day in 1..=5 {
            store.put_record(record(user, day, day, day as i64)).await.unwrap();
        }
        let records = store
            .list_records(user, RecordOrder::CreatedAtDesc, Some(3))
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].cycle_number, 5);
    }

    #[tokio::test]
    async fn merge_settings_is_field_level() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        store
            .merge_settings(
                user,
                SettingsPatch {
                    cycle_length: Some(30),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .merge_settings(
                user,
                SettingsPatch {
                    last_period: Some(date),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let settings = store.get_settings(user).await.unwrap();
        assert_eq!(settings.cycle_length, Some(30));
        assert_eq!(settings.last_period, Some(date));
    }

    #[tokio::test]
    async fn missing_user_reads_as_empty() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        assert!(store
            .list_records(user, RecordOrder::StartDateDesc, None)
            .await
            .unwrap()
            .is_empty());
        assert!(store.get_record(user, Uuid::new_v4()).await.unwrap().is_none());
        let settings = store.get_settings(user).await.unwrap();
        assert!(settings.last_period.is_none());
    }
}
