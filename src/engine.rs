use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CyclePhase, CycleRecord, CycleStats, CycleStatus, FertileWindow, OvulationPrediction,
    PeriodPrediction, Regularity, SettingsPatch, SymptomLog,
};
use crate::store::{PeriodStore, RecordOrder, SettingsStore, StorageError};

/// Tunables for prediction and classification. Defaults mirror the
/// standard clinical assumptions the tracker has always shipped with.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Assumed cycle length when the user has not configured one.
    pub default_cycle_length: i64,
    /// Ovulation is predicted this many days before the next period.
    pub luteal_phase_days: i64,
    /// Fertile window opens this many days before ovulation.
    pub fertile_days_before: i64,
    /// Fertile window closes this many days after ovulation.
    pub fertile_days_after: i64,
    /// An open-ended period counts as ongoing for this many days when
    /// deriving status. Approximation only; never written to `duration`.
    pub open_period_fallback_days: i64,
    /// Exclusive regularity band: average lengths strictly inside
    /// (min, max) classify as regular, the bounds themselves do not.
    pub regular_cycle_min: i64,
    pub regular_cycle_max: i64,
    /// How many records feed the statistics and status queries.
    pub stats_window: i64,
    pub status_window: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_cycle_length: 28,
            luteal_phase_days: 14,
            fertile_days_before: 3,
            fertile_days_after: 2,
            open_period_fallback_days: 7,
            regular_cycle_min: 21,
            regular_cycle_max: 35,
            stats_window: 6,
            status_window: 3,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid date range: {0}")]
    Validation(String),
}

/// Ceiling day count of a signed duration, matching the tracker's
/// historical arithmetic: any fraction of a day rounds up, including
/// for negative (overdue) spans.
fn ceil_days(delta: Duration) -> i64 {
    (delta.num_milliseconds() + 86_399_999).div_euclid(86_400_000)
}

/// Inclusive span in days, so a period starting and ending on the same
/// instant lasts 1 day.
fn days_between_inclusive(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    ceil_days(end - start) + 1
}

fn round_mean(values: &[i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    let sum: i64 = values.iter().sum();
    (sum as f64 / values.len() as f64).round() as i64
}

/// The period-tracking domain: start/end logging, phase derivation,
/// next-period and ovulation prediction, and regularity statistics.
/// Stores are injected; the engine holds no other state.
#[derive(Clone)]
pub struct CycleEngine {
    records: Arc<dyn PeriodStore>,
    settings: Arc<dyn SettingsStore>,
    config: EngineConfig,
}

impl CycleEngine {
    pub fn new(
        records: Arc<dyn PeriodStore>,
        settings: Arc<dyn SettingsStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            records,
            settings,
            config,
        }
    }

    /// Creates a new open-ended record and overwrites the user's
    /// last-period setting. The new cycle number continues from the most
    /// recently *created* record, whatever its start date, so backfilled
    /// periods get numbers that do not follow chronology. That matches
    /// the numbering users already have; do not "fix" it here.
    pub async fn log_period_start(
        &self,
        user_id: Uuid,
        date: DateTime<Utc>,
    ) -> Result<CycleRecord, EngineError> {
        let cycle_number = self.next_cycle_number(user_id).await?;
        let record = CycleRecord {
            id: Uuid::new_v4(),
            user_id,
            start_date: date,
            end_date: None,
            duration: None,
            cycle_number,
            created_at: Utc::now(),
        };

        self.records.put_record(record.clone()).await?;
        self.settings
            .merge_settings(
                user_id,
                SettingsPatch {
                    last_period: Some(date),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(%user_id, cycle_number, "period start logged");
        Ok(record)
    }

    /// Closes a record, computing its inclusive duration. An unknown
    /// record id is a silent no-op (`Ok(None)`); callers get no
    /// not-found signal on this path.
    pub async fn log_period_end(
        &self,
        user_id: Uuid,
        record_id: Uuid,
        date: DateTime<Utc>,
    ) -> Result<Option<CycleRecord>, EngineError> {
        let Some(mut record) = self.records.get_record(user_id, record_id).await? else {
            tracing::warn!(%user_id, %record_id, "period end for unknown record, ignoring");
            return Ok(None);
        };

        if date < record.start_date {
            return Err(EngineError::Validation(format!(
                "end date {date} precedes start date {}",
                record.start_date
            )));
        }

        record.end_date = Some(date);
        record.duration = Some(days_between_inclusive(record.start_date, date));
        self.records.put_record(record.clone()).await?;
        Ok(Some(record))
    }

    async fn next_cycle_number(&self, user_id: Uuid) -> Result<i64, EngineError> {
        let latest = self
            .records
            .list_records(user_id, RecordOrder::CreatedAtDesc, Some(1))
            .await?;
        Ok(latest.first().map(|r| r.cycle_number + 1).unwrap_or(1))
    }

    /// Next expected period from the last logged start plus the
    /// configured (or default) cycle length. `None` until a first period
    /// is logged. `days_until` goes negative once the period is overdue.
    pub async fn predict_next_period(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<PeriodPrediction>, EngineError> {
        let settings = self.settings.get_settings(user_id).await?;
        let Some(last_period) = settings.last_period else {
            return Ok(None);
        };

        let cycle_length = settings
            .cycle_length
            .unwrap_or(self.config.default_cycle_length);
        let predicted_date = last_period + Duration::days(cycle_length);

        Ok(Some(PeriodPrediction {
            predicted_date,
            days_until: ceil_days(predicted_date - now),
            cycle_length,
        }))
    }

    /// Ovulation at a fixed luteal offset before the predicted period,
    /// not derived from history. Returns `None` whenever the period
    /// prediction does.
    pub async fn predict_ovulation(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<OvulationPrediction>, EngineError> {
        let Some(prediction) = self.predict_next_period(user_id, now).await? else {
            return Ok(None);
        };

        let ovulation_date =
            prediction.predicted_date - Duration::days(self.config.luteal_phase_days);

        Ok(Some(OvulationPrediction {
            predicted_date: ovulation_date,
            fertile_window: FertileWindow {
                start: ovulation_date - Duration::days(self.config.fertile_days_before),
                end: ovulation_date + Duration::days(self.config.fertile_days_after),
            },
            days_until: ceil_days(ovulation_date - now),
        }))
    }

    /// Current phase plus countdowns, composed from recent records and
    /// both predictions. Phase collapses to three states: everything
    /// outside the period and fertile window reads as follicular.
    pub async fn current_cycle_status(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CycleStatus, EngineError> {
        let prediction = self.predict_next_period(user_id, now).await?;
        let ovulation = self.predict_ovulation(user_id, now).await?;
        let recent = self
            .records
            .list_records(
                user_id,
                RecordOrder::CreatedAtDesc,
                Some(self.config.status_window),
            )
            .await?;

        let is_period = recent.iter().any(|record| {
            let end = record.end_date.unwrap_or(
                record.start_date + Duration::days(self.config.open_period_fallback_days),
            );
            now >= record.start_date && now <= end
        });

        let is_ovulating = ovulation.as_ref().is_some_and(|o| {
            now >= o.fertile_window.start && now <= o.fertile_window.end
        });

        let current_phase = if is_period {
            CyclePhase::Period
        } else if is_ovulating {
            CyclePhase::Ovulation
        } else {
            CyclePhase::Follicular
        };

        Ok(CycleStatus {
            is_period,
            is_ovulating,
            days_until_period: prediction.map(|p| p.days_until),
            days_until_ovulation: ovulation.map(|o| o.days_until),
            current_phase,
        })
    }

    /// Regularity statistics over the recent history, windowed by start
    /// date. Needs at least two records to form one cycle-length sample;
    /// otherwise `None`. Open records contribute no duration sample.
    pub async fn cycle_stats(&self, user_id: Uuid) -> Result<Option<CycleStats>, EngineError> {
        let records = self
            .records
            .list_records(
                user_id,
                RecordOrder::StartDateDesc,
                Some(self.config.stats_window),
            )
            .await?;
        if records.len() < 2 {
            return Ok(None);
        }

        // records is newest-first, so each sample is next-start minus
        // previous-start, plain difference, not inclusive.
        let cycle_lengths: Vec<i64> = records
            .windows(2)
            .map(|pair| ceil_days(pair[0].start_date - pair[1].start_date))
            .collect();

        let durations: Vec<i64> = records.iter().filter_map(|r| r.duration).collect();

        let average_cycle_length = round_mean(&cycle_lengths);
        let min = cycle_lengths.iter().min().copied().unwrap_or(0);
        let max = cycle_lengths.iter().max().copied().unwrap_or(0);

        let regularity = if average_cycle_length > self.config.regular_cycle_min
            && average_cycle_length < self.config.regular_cycle_max
        {
            Regularity::Regular
        } else {
            Regularity::Irregular
        };

        Ok(Some(CycleStats {
            average_cycle_length,
            average_period_duration: round_mean(&durations),
            cycle_variation: max - min,
            regularity,
        }))
    }

    /// Records newest-first by start date, default window of 12.
    pub async fn period_history(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<CycleRecord>, EngineError> {
        Ok(self
            .records
            .list_records(user_id, RecordOrder::StartDateDesc, Some(limit.unwrap_or(12)))
            .await?)
    }

    /// Sibling write path; symptoms never feed the predictions.
    pub async fn log_symptoms(
        &self,
        user_id: Uuid,
        date: DateTime<Utc>,
        symptoms: Vec<String>,
    ) -> Result<SymptomLog, EngineError> {
        let log = SymptomLog {
            id: Uuid::new_v4(),
            user_id,
            date,
            symptoms,
            severity: "medium".to_string(),
            created_at: Utc::now(),
        };
        self.records.put_symptom_log(log.clone()).await?;
        Ok(log)
    }

    pub async fn symptom_history(&self, user_id: Uuid) -> Result<Vec<SymptomLog>, EngineError> {
        Ok(self.records.list_symptom_logs(user_id).await?)
    }
}
