use std::collections::HashMap;
use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;

use crate::db::models::User;
use crate::db::types::UserRole;

#[derive(Debug, Clone)]
pub(crate) struct PresenceEntry {
    pub(crate) user_id: String,
    pub(crate) full_name: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) last_seen: OffsetDateTime,
}

/// In-process registry of recently-seen authenticated users. Entries older
/// than the TTL are pruned on every write and on every snapshot, so the map
/// never grows past the set of users active within one TTL window. Held in
/// `AppState`; single-process by design.
#[derive(Clone)]
pub(crate) struct PresenceRegistry {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, PresenceEntry>>>,
}

impl PresenceRegistry {
    pub(crate) fn new(ttl_minutes: u64) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes as i64),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub(crate) async fn touch(&self, user: &User) {
        self.touch_at(user, OffsetDateTime::now_utc()).await;
    }

    pub(crate) async fn remove(&self, user_id: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(user_id);
    }

    pub(crate) async fn snapshot(&self) -> Vec<PresenceEntry> {
        self.snapshot_at(OffsetDateTime::now_utc()).await
    }

    async fn touch_at(&self, user: &User, now: OffsetDateTime) {
        let mut entries = self.entries.write().await;
        entries.insert(
            user.id.clone(),
            PresenceEntry {
                user_id: user.id.clone(),
                full_name: user.full_name.clone(),
                email: user.email.clone(),
                role: user.role,
                last_seen: now,
            },
        );
        entries.retain(|_, entry| now - entry.last_seen < self.ttl);
    }

    async fn snapshot_at(&self, now: OffsetDateTime) -> Vec<PresenceEntry> {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| now - entry.last_seen < self.ttl);

        let mut listed: Vec<PresenceEntry> = entries.values().cloned().collect();
        listed.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        listed
    }
}
