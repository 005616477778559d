//! In-memory state store shared by the refresh loop and the API.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Notify;

use sector_core::{CycleReport, MonitorSession};

/// Health of the refresh cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleStatus {
    pub last_update: Option<DateTime<Utc>>,
    pub next_update: Option<DateTime<Utc>>,
    pub flight_count: usize,
    pub last_error: Option<String>,
    pub cycles_completed: u64,
    pub logging: bool,
    pub groups_active: bool,
}

/// Application state: latest cycle report, cycle status and the monitoring session.
pub struct AppState {
    report: RwLock<Option<Arc<CycleReport>>>,
    status: RwLock<CycleStatus>,
    session: Mutex<MonitorSession>,
    refresh: Notify,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_session(MonitorSession::new())
    }

    pub fn with_session(session: MonitorSession) -> Self {
        Self {
            report: RwLock::new(None),
            status: RwLock::new(CycleStatus::default()),
            session: Mutex::new(session),
            refresh: Notify::new(),
        }
    }

    /// Most recent successful report, if any cycle has completed.
    pub fn latest_report(&self) -> Option<Arc<CycleReport>> {
        self.report
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Publish a finished cycle: store it, log it and clear the error.
    pub fn publish_report(&self, report: CycleReport, next_update: Option<DateTime<Utc>>) {
        let logged = self.session().record_cycle(&report);
        if logged {
            tracing::debug!("Logged occupancy at {}", report.generated_at);
        }

        {
            let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
            status.last_update = Some(report.generated_at);
            status.next_update = next_update;
            status.flight_count = report.flights.len();
            status.last_error = None;
            status.cycles_completed += 1;
        }

        *self.report.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(report));
    }

    /// Record a failed cycle. The previous report stays visible.
    pub fn record_failure(&self, error: String, next_update: Option<DateTime<Utc>>) {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        status.last_error = Some(error);
        status.next_update = next_update;
    }

    pub fn status(&self) -> CycleStatus {
        let mut status = self
            .status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let session = self.session();
        status.logging = session.is_logging();
        status.groups_active = session.groups().is_some();
        status
    }

    /// Exclusive access to the monitoring session.
    pub fn session(&self) -> MutexGuard<'_, MonitorSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wake the refresh loop ahead of its next tick.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    pub async fn refresh_requested(&self) {
        self.refresh.notified().await;
    }
}
