// Memoizing session repository in front of a timing provider

use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::{Instant, timeout};

use super::provider::TimingProvider;
use super::{Session, SessionKey};
use crate::errors::{ErrorKind, PaddockError};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_CACHE_CAPACITY: usize = 8;
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(60);

struct CachedSession {
    session: Arc<Session>,
    expires_at: Instant,
}

/// Loads sessions through a [`TimingProvider`] and keeps them for a fixed
/// time-to-live, so that each key reaches the provider at most once per TTL.
///
/// The cache lock is never held while the provider runs. Two cold loads of
/// the same key may both fetch; the later one replaces the earlier entry.
pub struct SessionRepository<P> {
    provider: P,
    ttl: Duration,
    capacity: usize,
    load_timeout: Duration,
    cache: Mutex<HashMap<SessionKey, CachedSession>>,
}

impl<P: TimingProvider> SessionRepository<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            ttl: DEFAULT_CACHE_TTL,
            capacity: DEFAULT_CACHE_CAPACITY,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_load_timeout(mut self, load_timeout: Duration) -> Self {
        self.load_timeout = load_timeout;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn load_session(
        &self,
        year: i32,
        circuit: &str,
        session_type: &str,
    ) -> Result<Arc<Session>, PaddockError> {
        self.load(&SessionKey::new(year, circuit, session_type))
            .await
    }

    pub async fn load(&self, key: &SessionKey) -> Result<Arc<Session>, PaddockError> {
        if let Some(session) = self.cached(key) {
            debug!("Session cache hit for {}", key);
            return Ok(session);
        }
        debug!("Session cache miss for {}, fetching from provider", key);

        let session = match timeout(self.load_timeout, self.provider.fetch_session(key)).await {
            Ok(result) => result.map_err(|e| load_failure(key, e))?,
            Err(_) => {
                return Err(PaddockError::Timeout {
                    operation: format!("loading session {}", key),
                    seconds: self.load_timeout.as_secs(),
                });
            }
        };
        session
            .validate()
            .map_err(|reason| PaddockError::SessionLoad {
                key: key.clone(),
                reason,
            })?;

        info!(
            "Loaded session {} with {} laps and {} weather samples",
            key,
            session.laps().len(),
            session.weather().len()
        );
        let session = Arc::new(session);
        self.store(key.clone(), session.clone());
        Ok(session)
    }

    /// Drop the cached entry for a key, returning whether one existed
    pub fn invalidate(&self, key: &SessionKey) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of entries currently held, expired or not
    pub fn cached_len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionKey, CachedSession>> {
        // entries are immutable once stored, so a poisoned map is still consistent
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached(&self, key: &SessionKey) -> Option<Arc<Session>> {
        let mut cache = self.lock();
        let entry = cache.get(key)?;
        if entry.expires_at > Instant::now() {
            return Some(entry.session.clone());
        }
        warn!("Cached session {} expired, evicting", key);
        cache.remove(key);
        None
    }

    fn store(&self, key: SessionKey, session: Arc<Session>) {
        let now = Instant::now();
        let mut cache = self.lock();
        cache.retain(|_, entry| entry.expires_at > now);
        cache.insert(
            key,
            CachedSession {
                session,
                expires_at: now + self.ttl,
            },
        );

        while cache.len() > self.capacity {
            let oldest = cache
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(oldest) => {
                    warn!("Session cache full, evicting {}", oldest);
                    cache.remove(&oldest);
                }
                None => break,
            }
        }
    }
}

fn load_failure(key: &SessionKey, error: PaddockError) -> PaddockError {
    if error.kind() != ErrorKind::DataShape || matches!(error, PaddockError::SessionLoad { .. }) {
        return error;
    }
    let mut reason = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    PaddockError::SessionLoad {
        key: key.clone(),
        reason,
    }
}
