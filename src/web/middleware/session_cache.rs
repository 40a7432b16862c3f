use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CachedSession {
    user_id: String,
    expires_at: Instant,
}

/// Process-wide token → user id cache in front of JWT decoding.
#[derive(Debug, Clone)]
pub struct SessionCache {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, CachedSession>>>,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn get(&self, token: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        let hit = entries.get(token).cloned()?;
        if hit.expires_at > Instant::now() {
            return Some(hit.user_id);
        }
        entries.remove(token);
        None
    }

    /// `valid_for` caps the entry at the token's own remaining lifetime.
    pub fn insert(&self, token: &str, user_id: &str, valid_for: Option<Duration>) {
        let ttl = valid_for.map_or(self.ttl, |d| d.min(self.ttl));
        if ttl.is_zero() {
            return;
        }
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        let now = Instant::now();
        entries.retain(|_, s| s.expires_at > now);
        entries.insert(
            token.to_string(),
            CachedSession {
                user_id: user_id.to_string(),
                expires_at: now + ttl,
            },
        );
    }

    pub fn evict(&self, token: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(token);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
