//! Core task types and timing profiles.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// What a task simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// OCR/data extraction of uploaded bills.
    BillExtraction,
    /// Tally-ready spreadsheet generation.
    TallyExport,
    /// GST-ready JSON generation.
    GstExport,
    /// Submission of validated invoices to the GST portal.
    PortalUpload,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::BillExtraction => "bill_extraction",
            TaskKind::TallyExport => "tally_export",
            TaskKind::GstExport => "gst_export",
            TaskKind::PortalUpload => "portal_upload",
        }
    }

    /// Real-time profile of the simulated work.
    pub fn profile(&self) -> TaskProfile {
        match self {
            TaskKind::BillExtraction => {
                TaskProfile::new(Duration::from_millis(2500), Duration::from_millis(200), 10)
            }
            TaskKind::TallyExport | TaskKind::GstExport => {
                TaskProfile::new(Duration::from_millis(1500), Duration::from_millis(1500), 100)
            }
            TaskKind::PortalUpload => {
                TaskProfile::new(Duration::from_millis(3000), Duration::from_millis(150), 5)
            }
        }
    }
}

/// Simulated duration plus progress cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskProfile {
    pub duration: Duration,
    /// Interval between progress updates.
    pub tick: Duration,
    /// Percentage points added per tick (progress saturates at 100).
    pub step: u8,
}

impl TaskProfile {
    pub fn new(duration: Duration, tick: Duration, step: u8) -> Self {
        Self {
            duration,
            tick,
            step,
        }
    }

    /// An instant profile (no waiting at all).
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::from_millis(1), 100)
    }

    /// Scale duration and tick by `factor` (0 = instant). Ticks never drop
    /// below one millisecond so the loop cannot spin. A factor whose result
    /// does not fit in a `Duration` also yields the instant profile.
    pub fn scaled(self, factor: f64) -> Self {
        if factor <= 0.0 || !factor.is_finite() {
            return Self::instant();
        }
        let scale = |d: Duration| Duration::try_from_secs_f64(d.as_secs_f64() * factor);
        match (scale(self.duration), scale(self.tick)) {
            (Ok(duration), Ok(tick)) => {
                Self::new(duration, tick.max(Duration::from_millis(1)), self.step)
            }
            _ => Self::instant(),
        }
    }
}

/// Task lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskPhase::Running)
    }
}

/// Snapshot of a task's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    pub task_id: TaskId,
    pub kind: TaskKind,
    /// 0..=100
    pub percent: u8,
    pub phase: TaskPhase,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Why a task did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task cancelled")]
    Cancelled,
    #[error("task failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_follow_the_simulated_timings() {
        let extraction = TaskKind::BillExtraction.profile();
        assert_eq!(extraction.duration, Duration::from_millis(2500));
        assert_eq!(extraction.step, 10);

        let portal = TaskKind::PortalUpload.profile();
        assert_eq!(portal.tick, Duration::from_millis(150));
        assert_eq!(portal.step, 5);
    }

    #[test]
    fn scaling_shrinks_durations_and_clamps_tick() {
        let halved = TaskKind::PortalUpload.profile().scaled(0.5);
        assert_eq!(halved.duration, Duration::from_millis(1500));
        assert_eq!(halved.step, 5);

        let tiny = TaskKind::PortalUpload.profile().scaled(0.001);
        assert_eq!(tiny.tick, Duration::from_millis(1));
        assert!(tiny.duration < Duration::from_millis(4));

        assert_eq!(TaskKind::GstExport.profile().scaled(0.0), TaskProfile::instant());
        assert_eq!(TaskKind::GstExport.profile().scaled(f64::NAN), TaskProfile::instant());
    }

    #[test]
    fn overflowing_scale_falls_back_to_instant() {
        assert_eq!(TaskKind::PortalUpload.profile().scaled(1e300), TaskProfile::instant());
        assert_eq!(TaskKind::BillExtraction.profile().scaled(f64::MAX), TaskProfile::instant());
    }

    #[test]
    fn only_running_is_non_terminal() {
        assert!(!TaskPhase::Running.is_terminal());
        assert!(TaskPhase::Completed.is_terminal());
        assert!(TaskPhase::Cancelled.is_terminal());
    }
}
