use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::api::{ApiResult, Backend};
use crate::session::InterviewType;

/// Aggregate statistics shown on the dashboard. Zeroed when the fetch
/// fails; absence of data never blocks the view.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DashboardStats {
    pub total_interviews: u32,
    pub average_score: f32,
    pub best_score: f32,
    pub hours_spent: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InterviewHistoryEntry {
    pub id: String,
    pub job_title: String,
    pub interview_type: InterviewType,
    pub overall_score: f32,
    pub duration_minutes: u32,
    pub completed_at: DateTime<Utc>,
}

/// Merged view-model. Best-effort by construction: partial outages
/// degrade to defaults plus a warning, and starting a new interview stays
/// available in every case.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub history: Vec<InterviewHistoryEntry>,
    pub warning: Option<String>,
    pub new_interview_enabled: bool,
}

/// Pure reducer joining the two independent fetch results. One source
/// failing defaults that source and appends a single warning line; both
/// failing produces a combined error string. The page itself never fails
/// for a partial outage, and the same policy extends to any read-only view
/// over N independent sources: render the survivors, default the rest.
pub fn merge_dashboard(
    stats: ApiResult<DashboardStats>,
    history: ApiResult<Vec<InterviewHistoryEntry>>,
) -> DashboardView {
    let (stats, history, warning) = match (stats, history) {
        (Ok(stats), Ok(history)) => (stats, history, None),
        (Err(_), Ok(history)) => (
            DashboardStats::default(),
            history,
            Some("Statistics could not be loaded. Some data may be unavailable.".to_string()),
        ),
        (Ok(stats), Err(_)) => (
            stats,
            Vec::new(),
            Some("Interview history could not be loaded. Some data may be unavailable.".to_string()),
        ),
        (Err(stats_err), Err(history_err)) => (
            DashboardStats::default(),
            Vec::new(),
            Some(format!(
                "Failed to load dashboard data: {}; {}",
                stats_err, history_err
            )),
        ),
    };

    DashboardView {
        stats,
        history,
        warning,
        new_interview_enabled: true,
    }
}

/// Fetch both sources concurrently and reduce. Neither fetch blocks the
/// other; they are joined only to decide the warning text.
pub async fn load_dashboard(backend: &dyn Backend) -> DashboardView {
    let (stats, history) = futures::join!(
        backend.get_dashboard_stats(),
        backend.get_interview_history()
    );

    if let Err(e) = &stats {
        warn!("Dashboard stats fetch failed: {}", e);
    }
    if let Err(e) = &history {
        warn!("Interview history fetch failed: {}", e);
    }

    merge_dashboard(stats, history)
}
