use std::{collections::HashMap, sync::Arc, time::Instant};

use axum::http::{header, HeaderMap};
use evaluator_client::SessionState;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "assessor_session";

pub type SessionHandle = Arc<Mutex<SessionState>>;

struct SessionEntry {
    state: SessionHandle,
    last_seen: Instant,
}

/// Browser sessions keyed by cookie id. Holds at most `max_sessions` entries.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    max_sessions: usize,
}

pub struct ResolvedSession {
    pub id: Uuid,
    pub state: SessionHandle,
    pub created: bool,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Looks up `id`, or starts a fresh session when it is missing or unknown.
    pub async fn resolve(&self, id: Option<Uuid>) -> ResolvedSession {
        let mut sessions = self.inner.write().await;
        let now = Instant::now();

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return ResolvedSession {
                    id,
                    state: entry.state.clone(),
                    created: false,
                };
            }
        }

        if sessions.len() >= self.max_sessions {
            if let Some(evicted) = eviction_candidate(&sessions) {
                sessions.remove(&evicted);
                debug!(session_id = %evicted, "evicted least recently seen session");
            }
        }

        let id = Uuid::new_v4();
        let state: SessionHandle = Arc::new(Mutex::new(SessionState::new()));
        sessions.insert(
            id,
            SessionEntry {
                state: state.clone(),
                last_seen: now,
            },
        );
        debug!(session_id = %id, sessions = sessions.len(), "session started");
        ResolvedSession {
            id,
            state,
            created: true,
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Least recently seen idle session, falling back to the least recently seen one overall.
fn eviction_candidate(sessions: &HashMap<Uuid, SessionEntry>) -> Option<Uuid> {
    let is_idle = |entry: &SessionEntry| {
        entry
            .state
            .try_lock()
            .map(|state| !state.is_in_flight())
            .unwrap_or(false)
    };

    sessions
        .iter()
        .filter(|(_, entry)| is_idle(entry))
        .min_by_key(|(_, entry)| entry.last_seen)
        .or_else(|| sessions.iter().min_by_key(|(_, entry)| entry.last_seen))
        .map(|(id, _)| *id)
}

pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn unknown_id_starts_a_new_session() {
        let registry = SessionRegistry::new(8);
        let first = registry.resolve(None).await;
        assert!(first.created);

        let again = registry.resolve(Some(first.id)).await;
        assert!(!again.created);
        assert_eq!(again.id, first.id);
        assert!(Arc::ptr_eq(&again.state, &first.state));

        let stranger = registry.resolve(Some(Uuid::new_v4())).await;
        assert!(stranger.created);
        assert_ne!(stranger.id, first.id);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn full_registry_evicts_oldest_session() {
        let registry = SessionRegistry::new(2);
        let oldest = registry.resolve(None).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = registry.resolve(None).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        registry.resolve(Some(newer.id)).await;

        registry.resolve(None).await;
        assert_eq!(registry.len().await, 2);
        assert!(registry.resolve(Some(oldest.id)).await.created);
    }

    #[test]
    fn cookie_header_parsing_finds_session_id() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; other=1"))
                .expect("header"),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));

        let mut garbage = HeaderMap::new();
        garbage.insert(
            header::COOKIE,
            HeaderValue::from_static("assessor_session=not-a-uuid"),
        );
        assert_eq!(session_id_from_headers(&garbage), None);
    }
}
