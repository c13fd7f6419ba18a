use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One menstrual period instance. `end_date` and `duration` stay unset
/// while the period is ongoing; both are written together by the end-log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    /// Inclusive day count, so a same-day start and end is 1.
    pub duration: Option<i64>,
    /// Assigned in insertion order, not start-date order. A backfilled
    /// earlier period keeps whatever number insertion gave it.
    pub cycle_number: i64,
    pub created_at: DateTime<Utc>,
}

/// Per-user tracking settings. `last_period` is overwritten on every
/// period-start log (last write wins, never reconciled against history).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserCycleSettings {
    pub last_period: Option<DateTime<Utc>>,
    pub cycle_length: Option<i64>,
}

/// Partial settings update; unset fields leave the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub last_period: Option<DateTime<Utc>>,
    pub cycle_length: Option<i64>,
}

/// Append-only symptom entry, kept alongside period records but never
/// consulted by the prediction maths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub symptoms: Vec<String>,
    pub severity: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodPrediction {
    pub predicted_date: DateTime<Utc>,
    /// Negative when the predicted date has already passed (overdue).
    pub days_until: i64,
    pub cycle_length: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FertileWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OvulationPrediction {
    pub predicted_date: DateTime<Utc>,
    pub fertile_window: FertileWindow,
    pub days_until: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Period,
    Ovulation,
    /// Everything outside the period and fertile window. No separate
    /// luteal state is distinguished.
    Follicular,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleStatus {
    pub is_period: bool,
    pub is_ovulating: bool,
    pub days_until_period: Option<i64>,
    pub days_until_ovulation: Option<i64>,
    pub current_phase: CyclePhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Regularity {
    Regular,
    Irregular,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleStats {
    pub average_cycle_length: i64,
    pub average_period_duration: i64,
    pub cycle_variation: i64,
    pub regularity: Regularity,
}
