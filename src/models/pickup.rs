use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Binds a booking to a branch and field executive with a scheduled window.
/// Keyed 1:1 by booking number; re-assignment overwrites and pushes the
/// prior assignment onto `history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupAssignment {
    pub booking_no: String,
    pub branch_id: Uuid,
    pub executive_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    pub notes: Option<String>,
    pub assigned_at: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<PickupAudit>,
}

/// Audit snapshot of an overwritten assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupAudit {
    pub executive_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    pub replaced_at: DateTime<Utc>,
}

impl PickupAssignment {
    /// Overwrite with a new executive/schedule, keeping the old one as audit.
    pub fn superseded_by(mut self, next: PickupAssignment) -> PickupAssignment {
        let mut history = std::mem::take(&mut self.history);
        history.push(PickupAudit {
            executive_id: self.executive_id,
            scheduled_date: self.scheduled_date,
            window_start: self.window_start,
            window_end: self.window_end,
            replaced_at: Utc::now(),
        });
        PickupAssignment { history, ..next }
    }
}
