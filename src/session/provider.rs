use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use super::archive::{archive_path, read_session};
use super::{Lap, QuickLapPredicate, Session, SessionKey};
use crate::errors::PaddockError;

/// Laps slower than this ratio of the session's fastest lap are not quick laps
pub const DEFAULT_QUICK_LAP_THRESHOLD: f64 = 1.07;

/// Source of complete session timing data.
///
/// Implementations return sessions carrying their own quick lap predicate;
/// validation and caching are left to [`super::SessionRepository`].
pub trait TimingProvider {
    fn fetch_session(
        &self,
        key: &SessionKey,
    ) -> impl Future<Output = Result<Session, PaddockError>> + Send;
}

/// Quick lap classification based on pace: a lap is quick when its time is
/// below `threshold` times the fastest timed lap of the session.
pub fn pace_threshold_predicate(laps: &[Lap], threshold: f64) -> QuickLapPredicate {
    let fastest = laps
        .iter()
        .filter_map(|lap| lap.lap_time_s)
        .min_by(f64::total_cmp);
    match fastest {
        Some(fastest) => {
            let limit = fastest * threshold;
            Arc::new(move |lap: &Lap| lap.lap_time_s.is_some_and(|t| t < limit))
        }
        None => Arc::new(|_: &Lap| false),
    }
}

/// Timing provider backed by a local directory of archived sessions
#[derive(Clone, Debug)]
pub struct ArchiveProvider {
    root: PathBuf,
    quick_lap_threshold: f64,
}

impl ArchiveProvider {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            quick_lap_threshold: DEFAULT_QUICK_LAP_THRESHOLD,
        }
    }

    pub fn with_quick_lap_threshold(mut self, threshold: f64) -> Self {
        self.quick_lap_threshold = threshold;
        self
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl TimingProvider for ArchiveProvider {
    async fn fetch_session(&self, key: &SessionKey) -> Result<Session, PaddockError> {
        let path = archive_path(&self.root, key);
        if !path.exists() {
            debug!("Archive file does not exist: {:?}", path);
            return Err(PaddockError::SessionNotFound { key: key.clone() });
        }

        // archive reads block the calling thread
        let session_key = key.clone();
        let session = tokio::task::spawn_blocking(move || read_session(&path, &session_key))
            .await
            .map_err(|e| PaddockError::SessionLoad {
                key: key.clone(),
                reason: format!("archive reader stopped: {}", e),
            })??;
        let predicate = pace_threshold_predicate(session.laps(), self.quick_lap_threshold);
        Ok(session.with_quick_lap_predicate(predicate))
    }
}
