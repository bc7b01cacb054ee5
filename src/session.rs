//! Server-side sessions keyed by a signed cookie.
//!
//! The cookie only carries an opaque random id; identity and form echoes stay in
//! [`SessionStore`]. Handlers receive a [`Session`] per request and must hand the jar
//! returned by [`Session::commit`] back in their response when they changed anything.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use rand::{distributions::Alphanumeric, Rng};
use tokio::sync::RwLock;

use crate::models::account::SessionUser;
use crate::models::word::WordForm;
use crate::AppState;

pub const SESSION_COOKIE: &str = "dictionary_session";
const SESSION_ID_LEN: usize = 48;
/// Idle time after which a session is forgotten.
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);
pub const MAX_SESSIONS: usize = 10_000;

/// Values the user typed into the signup form. Passwords are never echoed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupDraft {
    pub fname: String,
    pub mname: String,
    pub lname: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub user: Option<SessionUser>,
    pub signup_draft: Option<SignupDraft>,
    pub login_email: Option<String>,
    pub new_word_draft: Option<WordForm>,
    /// Edit form values together with the id of the word being edited.
    pub edit_word_draft: Option<(i64, WordForm)>,
    pub category_draft: Option<String>,
}

impl SessionData {
    /// Nothing here is worth a store entry: an anonymous visitor with no form to refill.
    pub fn is_empty(&self) -> bool {
        self.user.is_none()
            && self.signup_draft.is_none()
            && self.login_email.is_none()
            && self.new_word_draft.is_none()
            && self.edit_word_draft.is_none()
            && self.category_draft.is_none()
    }
}

struct StoredSession {
    data: SessionData,
    last_seen: Instant,
}

/// In-memory session table. Entries idle for longer than the ttl are dropped, and once
/// `capacity` is exceeded the least recently seen entries are evicted.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, StoredSession>>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SESSION_TTL, MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Returns the data of a live session and marks it as seen.
    pub async fn load(&self, id: &str) -> Option<SessionData> {
        let mut sessions = self.inner.write().await;
        if sessions.get(id)?.last_seen.elapsed() >= self.ttl {
            sessions.remove(id);
            tracing::debug!("--- Session expired");
            return None;
        }
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.data.clone())
    }

    pub async fn save(&self, id: &str, data: SessionData) {
        let mut sessions = self.inner.write().await;
        let ttl = self.ttl;
        sessions.retain(|_, entry| entry.last_seen.elapsed() < ttl);
        sessions.insert(
            id.to_string(),
            StoredSession {
                data,
                last_seen: Instant::now(),
            },
        );

        if sessions.len() > self.capacity {
            let mut by_age: Vec<(Instant, String)> = sessions
                .iter()
                .map(|(key, entry)| (entry.last_seen, key.clone()))
                .collect();
            by_age.sort();
            let excess = sessions.len() - self.capacity;
            for (_, key) in by_age.into_iter().take(excess) {
                sessions.remove(&key);
            }
            tracing::warn!("--- Session store full, evicted {} idle sessions", excess);
        }
    }

    pub async fn remove(&self, id: &str) {
        self.inner.write().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

fn new_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Per-request view of the caller's session.
pub struct Session {
    id: String,
    data: SessionData,
    store: SessionStore,
    jar: SignedCookieJar,
}

impl Session {
    pub fn user(&self) -> Option<&SessionUser> {
        self.data.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.user.is_some()
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SessionData {
        &mut self.data
    }

    /// Drops the pre-login id and continues under a fresh one, so an id handed out
    /// to an anonymous visitor never becomes an authenticated session.
    pub async fn renew(&mut self) {
        self.store.remove(&self.id).await;
        self.id = new_session_id();
    }

    /// Persists the data and returns the jar carrying the session cookie.
    ///
    /// An anonymous session with nothing to remember is not stored and gets no cookie.
    pub async fn commit(self) -> SignedCookieJar {
        if self.data.is_empty() {
            self.store.remove(&self.id).await;
            return self.jar;
        }
        self.store.save(&self.id, self.data).await;
        let cookie = Cookie::build((SESSION_COOKIE, self.id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        self.jar.add(cookie)
    }

    /// Drops every session-scoped value and expires the cookie.
    pub async fn clear(self) -> SignedCookieJar {
        self.store.remove(&self.id).await;
        self.jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_request_parts(parts, state).await?;
        let store = state.sessions.clone();

        if let Some(id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
            if let Some(data) = store.load(&id).await {
                return Ok(Session { id, data, store, jar });
            }
            tracing::debug!("--- Unknown session id presented, starting a new session");
        }

        Ok(Session {
            id: new_session_id(),
            data: SessionData::default(),
            store,
            jar,
        })
    }
}
