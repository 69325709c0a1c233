//! Analysis sessions: per-session run state: Idle → Running → {Succeeded, Failed}.
//!
//! A session runs one analysis at a time; starting another while one is running is
//! rejected. Only the state is kept, never the report. Finished sessions are evicted
//! oldest-first once the registry reaches capacity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::analysis::analyzer::{ensure_not_blank, ResumeAnalyzer};
use crate::analysis::models::{Backend, Report};
use crate::errors::AppError;

const ABANDONED: &str = "analysis was abandoned before completing";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnalysisState {
    Idle,
    Running {
        backend: Backend,
        started_at: DateTime<Utc>,
    },
    Succeeded {
        backend: Backend,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    },
    Failed {
        backend: Backend,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        error: String,
    },
}

impl AnalysisState {
    pub fn is_running(&self) -> bool {
        matches!(self, AnalysisState::Running { .. })
    }

    fn finished_at(&self) -> Option<DateTime<Utc>> {
        match self {
            AnalysisState::Succeeded { finished_at, .. } | AnalysisState::Failed { finished_at, .. } => {
                Some(*finished_at)
            }
            _ => None,
        }
    }
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, AnalysisState>>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Unknown sessions are `Idle`.
    pub fn state(&self, session_id: Uuid) -> AnalysisState {
        self.lock()
            .get(&session_id)
            .cloned()
            .unwrap_or(AnalysisState::Idle)
    }

    /// Moves the session to `Running`. The returned guard must be completed with
    /// `succeed` or `fail`; dropping it first marks the session failed.
    pub fn begin(self: &Arc<Self>, session_id: Uuid, backend: Backend) -> Result<RunGuard, AppError> {
        let started_at = Utc::now();
        let mut sessions = self.lock();

        if sessions.get(&session_id).is_some_and(AnalysisState::is_running) {
            return Err(AppError::AnalysisInProgress(session_id));
        }

        if !sessions.contains_key(&session_id) && sessions.len() >= self.capacity {
            let excess = sessions.len() + 1 - self.capacity;
            evict_finished(&mut sessions, excess);
        }

        sessions.insert(
            session_id,
            AnalysisState::Running {
                backend,
                started_at,
            },
        );
        debug!("Session {session_id} running ({backend:?})");

        Ok(RunGuard {
            registry: Arc::clone(self),
            session_id,
            backend,
            started_at,
            finished: false,
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn finish(&self, session_id: Uuid, state: AnalysisState) {
        self.lock().insert(session_id, state);
    }

    // A poisoned lock only means another request panicked mid-update; the map is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, AnalysisState>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn evict_finished(sessions: &mut HashMap<Uuid, AnalysisState>, count: usize) {
    let mut finished: Vec<(Uuid, DateTime<Utc>)> = sessions
        .iter()
        .filter_map(|(id, state)| state.finished_at().map(|t| (*id, t)))
        .collect();
    finished.sort_by_key(|(_, t)| *t);

    for (id, _) in finished.into_iter().take(count) {
        sessions.remove(&id);
    }
}

/// Owns the `Running` state of one session until it is completed or dropped.
pub struct RunGuard {
    registry: Arc<SessionRegistry>,
    session_id: Uuid,
    backend: Backend,
    started_at: DateTime<Utc>,
    finished: bool,
}

impl RunGuard {
    pub fn succeed(mut self) {
        self.complete(None);
    }

    pub fn fail(mut self, error: String) {
        self.complete(Some(error));
    }

    fn complete(&mut self, error: Option<String>) {
        self.finished = true;
        let finished_at = Utc::now();
        let state = match error {
            None => AnalysisState::Succeeded {
                backend: self.backend,
                started_at: self.started_at,
                finished_at,
            },
            Some(error) => AnalysisState::Failed {
                backend: self.backend,
                started_at: self.started_at,
                finished_at,
                error,
            },
        };
        self.registry.finish(self.session_id, state);
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Session {} dropped while running", self.session_id);
            self.complete(Some(ABANDONED.to_string()));
        }
    }
}

/// Runs one analysis inside a session. Blank text is rejected before the session
/// leaves `Idle`.
pub async fn run_analysis(
    sessions: &Arc<SessionRegistry>,
    analyzer: &dyn ResumeAnalyzer,
    session_id: Uuid,
    resume_text: &str,
) -> Result<Report, AppError> {
    ensure_not_blank(resume_text)?;

    let guard = sessions.begin(session_id, analyzer.backend())?;
    let result = analyzer.analyze(resume_text).await;

    match &result {
        Ok(_) => guard.succeed(),
        Err(e) => guard.fail(e.to_string()),
    }
    result
}
